//! AST node set for the Hanami language.
//!
//! Every node serializes to a JSON object carrying a `type`
//! discriminator, which is the transport format later stages accept in
//! place of source text. Nodes own their children exclusively; the tree
//! is immutable once the parser returns it.

use serde::ser::SerializeStruct;
use serde::{Deserialize, Serialize, Serializer};

/// Root of every parse: exactly one garden (namespace) per program.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Program {
    pub garden: Namespace,
}

impl Serialize for Program {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut s = serializer.serialize_struct("Program", 2)?;
        s.serialize_field("type", "Program")?;
        s.serialize_field("garden", &self.garden)?;
        s.end()
    }
}

/// The `garden` declaration and everything it contains.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Namespace {
    pub name: String,
    #[serde(default)]
    pub includes: Vec<String>,
    pub declarations: Vec<Decl>,
}

impl Serialize for Namespace {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut s = serializer.serialize_struct("Namespace", 4)?;
        s.serialize_field("type", "Namespace")?;
        s.serialize_field("name", &self.name)?;
        s.serialize_field("includes", &self.includes)?;
        s.serialize_field("declarations", &self.declarations)?;
        s.end()
    }
}

/// Garden- and species-level declarations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Decl {
    ClassDecl(ClassDecl),
    FunctionDecl(FunctionDecl),
    VariableDeclaration(VarDecl),
}

/// A `species` with its visibility-sectioned member list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassDecl {
    pub name: String,
    pub sections: Vec<VisibilitySection>,
    pub line: u32,
    pub column: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Visibility {
    Open,
    Hidden,
    Guarded,
}

impl Visibility {
    pub fn keyword(self) -> &'static str {
        match self {
            Visibility::Open => "open",
            Visibility::Hidden => "hidden",
            Visibility::Guarded => "guarded",
        }
    }
}

/// One `open:` / `hidden:` / `guarded:` run of members inside a species.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct VisibilitySection {
    pub visibility: Visibility,
    pub members: Vec<Decl>,
}

impl Serialize for VisibilitySection {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut s = serializer.serialize_struct("VisibilitySection", 3)?;
        s.serialize_field("type", "VisibilitySection")?;
        s.serialize_field("visibility", &self.visibility)?;
        s.serialize_field("members", &self.members)?;
        s.end()
    }
}

/// `grow name(params) -> type { body }`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FunctionDecl {
    pub name: String,
    #[serde(rename = "returnType")]
    pub return_type: String,
    pub parameters: Vec<Parameter>,
    pub body: Block,
    pub line: u32,
    pub column: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Parameter {
    #[serde(rename = "dataType")]
    pub data_type: String,
    pub name: String,
}

/// `type name = initializer;` — also used for `auto`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VarDecl {
    #[serde(rename = "dataType")]
    pub data_type: String,
    pub name: String,
    pub initializer: Option<Expr>,
    pub line: u32,
    pub column: u32,
}

/// A brace-delimited, ordered statement sequence.
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
pub struct Block {
    pub statements: Vec<Stmt>,
}

impl Serialize for Block {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut s = serializer.serialize_struct("Block", 2)?;
        s.serialize_field("type", "Block")?;
        s.serialize_field("statements", &self.statements)?;
        s.end()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Stmt {
    VariableDeclaration(VarDecl),
    /// `bloom << e << e ...;`
    OutputStatement { expressions: Vec<Expr> },
    /// `water >> target >> target ...;`
    InputStatement { targets: Vec<Expr> },
    /// `blossom expr?;`
    ReturnStatement {
        expression: Option<Expr>,
        line: u32,
        column: u32,
    },
    /// `branch (..) {..} else branch (..) {..} else {..}` — one arm per
    /// clause, the final bare `else` arm has no condition.
    IfStatement { arms: Vec<IfArm> },
    WhileStatement { condition: Expr, body: Block },
    ExpressionStatement { expression: Expr },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IfArm {
    pub condition: Option<Expr>,
    pub body: Block,
}

/// Expression node: a kind plus the source position it started at.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Expr {
    #[serde(flatten)]
    pub kind: ExprKind,
    pub line: u32,
    pub column: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ExprKind {
    /// Operator kept as its exact source spelling, never desugared.
    BinaryExpression {
        operator: String,
        left: Box<Expr>,
        right: Box<Expr>,
    },
    UnaryExpression {
        operator: String,
        prefix: bool,
        operand: Box<Expr>,
    },
    Identifier { name: String },
    Literal { value: LiteralValue },
    Call {
        callee: Box<Expr>,
        arguments: Vec<Expr>,
    },
    MemberAccess { object: Box<Expr>, member: String },
    /// `=` and the compound assignments; `operator` is the spelling.
    Assignment {
        operator: String,
        target: Box<Expr>,
        value: Box<Expr>,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum LiteralValue {
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
    Null,
}

impl Expr {
    pub fn new(kind: ExprKind, line: u32, column: u32) -> Self {
        Expr { kind, line, column }
    }

    /// Reconstruct source-like text for this expression, inserting only
    /// the parentheses required to preserve precedence. Used for the
    /// `expression` field of type-checking trace entries.
    pub fn to_text(&self) -> String {
        match &self.kind {
            ExprKind::Identifier { name } => name.clone(),
            ExprKind::Literal { value } => match value {
                LiteralValue::Bool(b) => b.to_string(),
                LiteralValue::Int(n) => n.to_string(),
                LiteralValue::Float(f) => format_float(*f),
                LiteralValue::Str(s) => format!("\"{s}\""),
                LiteralValue::Null => "null".to_string(),
            },
            ExprKind::BinaryExpression {
                operator,
                left,
                right,
            } => {
                let prec = binary_precedence(operator);
                let lhs = parenthesize_child(left, prec, false);
                let rhs = parenthesize_child(right, prec, true);
                format!("{lhs} {operator} {rhs}")
            }
            ExprKind::UnaryExpression {
                operator,
                prefix,
                operand,
            } => {
                let inner = match operand.kind {
                    ExprKind::BinaryExpression { .. } | ExprKind::Assignment { .. } => {
                        format!("({})", operand.to_text())
                    }
                    _ => operand.to_text(),
                };
                if *prefix {
                    format!("{operator}{inner}")
                } else {
                    format!("{inner}{operator}")
                }
            }
            ExprKind::Call { callee, arguments } => {
                let args: Vec<String> = arguments.iter().map(Expr::to_text).collect();
                format!("{}({})", callee.to_text(), args.join(", "))
            }
            ExprKind::MemberAccess { object, member } => {
                format!("{}.{member}", object.to_text())
            }
            ExprKind::Assignment {
                operator,
                target,
                value,
            } => format!("{} {operator} {}", target.to_text(), value.to_text()),
        }
    }
}

fn parenthesize_child(child: &Expr, parent_prec: u8, is_right: bool) -> String {
    match &child.kind {
        ExprKind::BinaryExpression { operator, .. } => {
            let child_prec = binary_precedence(operator);
            // Left-associative operators: the right child needs parens at
            // equal precedence, the left child does not.
            if child_prec < parent_prec || (child_prec == parent_prec && is_right) {
                format!("({})", child.to_text())
            } else {
                child.to_text()
            }
        }
        ExprKind::Assignment { .. } => format!("({})", child.to_text()),
        _ => child.to_text(),
    }
}

/// Binding strength of a binary operator, low to high. Shared with the
/// emitters so generated output carries the same minimal parentheses.
pub fn binary_precedence(operator: &str) -> u8 {
    match operator {
        "||" => 1,
        "&&" => 2,
        "==" | "!=" => 3,
        "<" | "<=" | ">" | ">=" => 4,
        "+" | "-" => 5,
        "*" | "/" | "%" => 6,
        _ => 7,
    }
}

/// Render an f64 so it still reads as a floating-point literal ("5.0",
/// not "5").
pub fn format_float(value: f64) -> String {
    let text = value.to_string();
    if text.contains('.') || text.contains('e') || text.contains("inf") || text.contains("NaN") {
        text
    } else {
        format!("{text}.0")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ident(name: &str, line: u32, column: u32) -> Expr {
        Expr::new(
            ExprKind::Identifier {
                name: name.to_string(),
            },
            line,
            column,
        )
    }

    fn int(value: i64, line: u32, column: u32) -> Expr {
        Expr::new(
            ExprKind::Literal {
                value: LiteralValue::Int(value),
            },
            line,
            column,
        )
    }

    fn binary(op: &str, left: Expr, right: Expr) -> Expr {
        let (line, column) = (left.line, left.column);
        Expr::new(
            ExprKind::BinaryExpression {
                operator: op.to_string(),
                left: Box::new(left),
                right: Box::new(right),
            },
            line,
            column,
        )
    }

    #[test]
    fn expression_text_inserts_minimal_parentheses() {
        // 5 * (a - 3)
        let expr = binary("*", int(5, 1, 1), binary("-", ident("a", 1, 6), int(3, 1, 10)));
        assert_eq!(expr.to_text(), "5 * (a - 3)");

        // (a + b) % 8
        let expr = binary("%", binary("+", ident("a", 1, 2), ident("b", 1, 6)), int(8, 1, 11));
        assert_eq!(expr.to_text(), "(a + b) % 8");

        // a - 3 stays bare
        let expr = binary("-", ident("a", 1, 1), int(3, 1, 5));
        assert_eq!(expr.to_text(), "a - 3");
    }

    #[test]
    fn expr_json_carries_type_discriminator() {
        let expr = binary("+", ident("a", 2, 1), int(1, 2, 5));
        let json = serde_json::to_value(&expr).expect("serialize");
        assert_eq!(json["type"], "BinaryExpression");
        assert_eq!(json["operator"], "+");
        assert_eq!(json["left"]["type"], "Identifier");
        assert_eq!(json["right"]["value"], 1);
    }

    #[test]
    fn program_round_trips_through_json() {
        let program = Program {
            garden: Namespace {
                name: "MathTest".to_string(),
                includes: vec!["garden_math".to_string()],
                declarations: vec![Decl::VariableDeclaration(VarDecl {
                    data_type: "int".to_string(),
                    name: "a".to_string(),
                    initializer: Some(int(10, 2, 9)),
                    line: 2,
                    column: 1,
                })],
            },
        };
        let json = serde_json::to_string(&program).expect("serialize");
        let back: Program = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(back, program);

        let value: serde_json::Value = serde_json::from_str(&json).expect("value");
        assert_eq!(value["type"], "Program");
        assert_eq!(value["garden"]["type"], "Namespace");
        assert_eq!(value["garden"]["declarations"][0]["type"], "VariableDeclaration");
        assert_eq!(value["garden"]["declarations"][0]["dataType"], "int");
    }

    #[test]
    fn literal_values_serialize_untagged() {
        let cases = [
            (LiteralValue::Int(10), "10"),
            (LiteralValue::Bool(true), "true"),
            (LiteralValue::Str("hi".to_string()), "\"hi\""),
            (LiteralValue::Null, "null"),
        ];
        for (value, expected) in cases {
            assert_eq!(serde_json::to_string(&value).expect("serialize"), expected);
        }
    }
}
