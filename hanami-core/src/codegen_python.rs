//! Python backend.
//!
//! Species become classes whose members are initialized in `__init__`;
//! visibility sections have no Python equivalent and are kept as
//! comment markers. Output statements print with `sep=''`/`end=''` so
//! the stream operands concatenate exactly as `bloom <<` sequences
//! them, and the entry function runs under the `__main__` guard.

use std::collections::{HashMap, HashSet};

use crate::ast::{
    Block, ClassDecl, Decl, Expr, ExprKind, FunctionDecl, LiteralValue, Program, Stmt, VarDecl,
    binary_precedence, format_float,
};
use crate::codegen::entry_function;
use crate::error::CodegenError;

pub fn emit(program: &Program) -> Result<String, CodegenError> {
    let mut emitter = Emitter {
        out: String::new(),
        indent: 0,
        members: HashSet::new(),
        locals: HashSet::new(),
        local_types: HashMap::new(),
        markers: Vec::new(),
    };
    emitter.emit_program(program)?;
    Ok(emitter.out)
}

struct Emitter {
    out: String,
    indent: usize,
    /// Member names of the species currently being emitted; references
    /// to them inside methods get a `self.` prefix.
    members: HashSet<String>,
    /// Parameters and locals of the function currently being emitted.
    locals: HashSet<String>,
    local_types: HashMap<String, String>,
    /// Comment markers queued while rendering an expression, flushed
    /// just before the line that triggered them.
    markers: Vec<String>,
}

impl Emitter {
    fn line(&mut self, text: &str) {
        for marker in std::mem::take(&mut self.markers) {
            self.raw_line(&marker);
        }
        self.raw_line(text);
    }

    fn raw_line(&mut self, text: &str) {
        for _ in 0..self.indent {
            self.out.push_str("    ");
        }
        self.out.push_str(text);
        self.out.push('\n');
    }

    fn blank(&mut self) {
        self.out.push('\n');
    }

    fn emit_program(&mut self, program: &Program) -> Result<(), CodegenError> {
        let garden = &program.garden;

        for include in &garden.includes {
            self.line(&format!("# style: {include}"));
        }

        for decl in &garden.declarations {
            match decl {
                Decl::ClassDecl(species) => self.emit_species(species)?,
                Decl::FunctionDecl(function) => self.emit_function(function, false)?,
                Decl::VariableDeclaration(var) => self.emit_var_decl(var, false),
            }
        }

        if let Some(entry) = entry_function(garden) {
            self.blank();
            self.line("if __name__ == \"__main__\":");
            self.indent += 1;
            let call = format!("{}()", entry.name);
            self.line(&call);
            self.indent -= 1;
        }
        Ok(())
    }

    fn emit_species(&mut self, species: &ClassDecl) -> Result<(), CodegenError> {
        self.line(&format!("class {}:", species.name));
        self.indent += 1;

        self.members = species
            .sections
            .iter()
            .flat_map(|s| s.members.iter())
            .filter_map(|member| match member {
                Decl::VariableDeclaration(var) => Some(var.name.clone()),
                Decl::FunctionDecl(function) => Some(function.name.clone()),
                Decl::ClassDecl(_) => None,
            })
            .collect();

        let fields: Vec<&VarDecl> = species
            .sections
            .iter()
            .flat_map(|s| s.members.iter())
            .filter_map(|member| match member {
                Decl::VariableDeclaration(var) => Some(var),
                _ => None,
            })
            .collect();

        let mut emitted_anything = false;
        if !fields.is_empty() {
            self.line("def __init__(self):");
            self.indent += 1;
            for field in fields {
                self.emit_var_decl(field, true);
            }
            self.indent -= 1;
            self.blank();
            emitted_anything = true;
        }

        for section in &species.sections {
            let methods: Vec<&FunctionDecl> = section
                .members
                .iter()
                .filter_map(|member| match member {
                    Decl::FunctionDecl(function) => Some(function),
                    _ => None,
                })
                .collect();
            if methods.is_empty() {
                continue;
            }
            // No access control in Python; keep the section visible.
            self.line(&format!("# {}:", section.visibility.keyword()));
            for method in methods {
                self.emit_function(method, true)?;
                emitted_anything = true;
            }
        }

        if !emitted_anything {
            self.line("pass");
        }
        self.indent -= 1;
        self.blank();
        self.members.clear();
        Ok(())
    }

    fn emit_function(&mut self, function: &FunctionDecl, is_method: bool) -> Result<(), CodegenError> {
        self.locals = function.parameters.iter().map(|p| p.name.clone()).collect();
        self.local_types = function
            .parameters
            .iter()
            .map(|p| (p.name.clone(), p.data_type.clone()))
            .collect();

        let mut params: Vec<String> = Vec::new();
        if is_method {
            params.push("self".to_string());
        }
        params.extend(function.parameters.iter().map(|p| p.name.clone()));
        self.line(&format!("def {}({}):", function.name, params.join(", ")));

        self.indent += 1;
        if function.body.statements.is_empty() {
            self.line("pass");
        } else {
            self.emit_block_body(&function.body)?;
        }
        self.indent -= 1;
        self.blank();

        self.locals.clear();
        self.local_types.clear();
        Ok(())
    }

    fn emit_block_body(&mut self, block: &Block) -> Result<(), CodegenError> {
        for stmt in &block.statements {
            self.emit_stmt(stmt)?;
        }
        Ok(())
    }

    fn emit_body_or_pass(&mut self, block: &Block) -> Result<(), CodegenError> {
        self.indent += 1;
        if block.statements.is_empty() {
            self.line("pass");
        } else {
            self.emit_block_body(block)?;
        }
        self.indent -= 1;
        Ok(())
    }

    fn emit_stmt(&mut self, stmt: &Stmt) -> Result<(), CodegenError> {
        match stmt {
            Stmt::VariableDeclaration(var) => self.emit_var_decl(var, false),
            Stmt::OutputStatement { expressions } => {
                let operands: Vec<String> = expressions.iter().map(|e| self.expr(e)).collect();
                let text = if operands.len() == 1 {
                    format!("print({}, end='')", operands[0])
                } else {
                    format!("print({}, sep='', end='')", operands.join(", "))
                };
                self.line(&text);
            }
            Stmt::InputStatement { targets } => {
                for target in targets {
                    let read = self.typed_input(target);
                    let target_text = self.expr(target);
                    self.line(&format!("{target_text} = {read}"));
                }
            }
            Stmt::ReturnStatement { expression, .. } => match expression {
                Some(expr) => {
                    let text = self.expr(expr);
                    self.line(&format!("return {text}"));
                }
                None => self.line("return"),
            },
            Stmt::IfStatement { arms } => {
                for (index, arm) in arms.iter().enumerate() {
                    let header = match (&arm.condition, index) {
                        (Some(condition), 0) => format!("if {}:", self.expr(condition)),
                        (Some(condition), _) => format!("elif {}:", self.expr(condition)),
                        (None, _) => "else:".to_string(),
                    };
                    self.line(&header);
                    self.emit_body_or_pass(&arm.body)?;
                }
            }
            Stmt::WhileStatement { condition, body } => {
                let header = format!("while {}:", self.expr(condition));
                self.line(&header);
                self.emit_body_or_pass(body)?;
            }
            Stmt::ExpressionStatement { expression } => {
                // `x++;` as a whole statement has a direct spelling.
                if let ExprKind::UnaryExpression {
                    operator, operand, ..
                } = &expression.kind
                {
                    if operator == "++" || operator == "--" {
                        let target = self.expr(operand);
                        let step = if operator == "++" { "+=" } else { "-=" };
                        self.line(&format!("{target} {step} 1"));
                        return Ok(());
                    }
                }
                let text = self.expr(expression);
                self.line(&text);
            }
        }
        Ok(())
    }

    fn emit_var_decl(&mut self, var: &VarDecl, as_member: bool) {
        let name = if as_member {
            format!("self.{}", var.name)
        } else {
            self.locals.insert(var.name.clone());
            self.local_types
                .insert(var.name.clone(), var.data_type.clone());
            var.name.clone()
        };
        let value = match &var.initializer {
            Some(init) => self.expr(init),
            None => default_value(&var.data_type).to_string(),
        };
        self.line(&format!("{name} = {value}"));
    }

    /// Wrap `input()` in the conversion the declared target type needs.
    fn typed_input(&self, target: &Expr) -> String {
        let declared = match &target.kind {
            ExprKind::Identifier { name } => self.local_types.get(name).map(String::as_str),
            _ => None,
        };
        match declared {
            Some("int") => "int(input())".to_string(),
            Some("float") | Some("double") => "float(input())".to_string(),
            _ => "input()".to_string(),
        }
    }

    fn expr(&mut self, expr: &Expr) -> String {
        match &expr.kind {
            ExprKind::Identifier { name } => {
                if self.members.contains(name) && !self.locals.contains(name) {
                    format!("self.{name}")
                } else {
                    name.clone()
                }
            }
            ExprKind::Literal { value } => match value {
                LiteralValue::Int(n) => n.to_string(),
                LiteralValue::Float(f) => format_float(*f),
                LiteralValue::Str(s) => format!("\"{s}\""),
                LiteralValue::Bool(true) => "True".to_string(),
                LiteralValue::Bool(false) => "False".to_string(),
                LiteralValue::Null => "None".to_string(),
            },
            ExprKind::BinaryExpression {
                operator,
                left,
                right,
            } => {
                let spelled = match operator.as_str() {
                    "&&" => "and",
                    "||" => "or",
                    other => other,
                };
                let prec = binary_precedence(operator);
                let lhs = self.child(left, prec, false);
                let rhs = self.child(right, prec, true);
                format!("{lhs} {spelled} {rhs}")
            }
            ExprKind::UnaryExpression {
                operator,
                prefix,
                operand,
            } => {
                let inner = self.operand_text(operand);
                match operator.as_str() {
                    "!" => format!("not {inner}"),
                    "++" | "--" => {
                        // Only meaningful as a whole statement, which
                        // emit_stmt already rewrote; anywhere else there
                        // is no Python spelling.
                        self.markers
                            .push(format!("# unsupported: '{operator}' inside an expression"));
                        inner
                    }
                    op => {
                        if *prefix {
                            format!("{op}{inner}")
                        } else {
                            format!("{inner}{op}")
                        }
                    }
                }
            }
            ExprKind::Call { callee, arguments } => {
                let args: Vec<String> = arguments.iter().map(|a| self.expr(a)).collect();
                format!("{}({})", self.expr(callee), args.join(", "))
            }
            ExprKind::MemberAccess { object, member } => {
                format!("{}.{member}", self.expr(object))
            }
            ExprKind::Assignment {
                operator,
                target,
                value,
            } => format!("{} {operator} {}", self.expr(target), self.expr(value)),
        }
    }

    fn child(&mut self, child: &Expr, parent_prec: u8, is_right: bool) -> String {
        let needs_parens = match &child.kind {
            ExprKind::BinaryExpression { operator, .. } => {
                let child_prec = binary_precedence(operator);
                child_prec < parent_prec || (child_prec == parent_prec && is_right)
            }
            ExprKind::UnaryExpression { operator, .. } if operator == "!" => true,
            ExprKind::Assignment { .. } => true,
            _ => false,
        };
        let text = self.expr(child);
        if needs_parens { format!("({text})") } else { text }
    }

    fn operand_text(&mut self, operand: &Expr) -> String {
        let text = self.expr(operand);
        if matches!(
            operand.kind,
            ExprKind::BinaryExpression { .. } | ExprKind::Assignment { .. }
        ) {
            format!("({text})")
        } else {
            text
        }
    }
}

/// Default initial value for an uninitialized declaration. Species
/// types default-construct so later member calls work.
fn default_value(data_type: &str) -> String {
    match data_type {
        "int" => "0".to_string(),
        "float" | "double" => "0.0".to_string(),
        "string" => "\"\"".to_string(),
        "bool" => "False".to_string(),
        "auto" | "void" => "None".to_string(),
        species => format!("{species}()"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexer::lex;
    use crate::parser::parse;

    fn emit_source(source: &str) -> String {
        emit(&parse(&lex(source).expect("lex")).expect("parse")).expect("emit")
    }

    #[test]
    fn math_test_prints_without_extra_separators() {
        let code = emit_source(
            r#"garden MathTest
grow calculate() -> int {
    int a = 10;
    int b = 5 * (a - 3);
    int c = (a + b) % 8;
    bloom << "Result: " << c;
    blossom c;
}
"#,
        );
        assert!(code.contains("def calculate():"));
        assert!(code.contains("a = 10"));
        assert!(code.contains("b = 5 * (a - 3)"));
        assert!(code.contains("c = (a + b) % 8"));
        assert!(code.contains("print(\"Result: \", c, sep='', end='')"));
        assert!(code.contains("return c"));
        assert!(code.contains("if __name__ == \"__main__\":"));
        assert!(code.contains("    calculate()"));
    }

    #[test]
    fn species_members_move_into_init_and_methods_use_self() {
        let code = emit_source(
            r#"garden G
species Pet {
open:
    grow birthday() -> void { age = age + 1; }
hidden:
    int age = 0;
    string name = "Unknown";
}
"#,
        );
        assert!(code.contains("class Pet:"));
        assert!(code.contains("def __init__(self):"));
        assert!(code.contains("self.age = 0"));
        assert!(code.contains("self.name = \"Unknown\""));
        assert!(code.contains("def birthday(self):"));
        assert!(code.contains("self.age = self.age + 1"));
        // Visibility survives as a marker, not silently dropped.
        assert!(code.contains("# open:"));
    }

    #[test]
    fn logical_operators_use_python_spellings() {
        let code = emit_source(
            "garden G\ngrow f(bool a, bool b) -> bool { blossom a && !b || false; }",
        );
        assert!(code.contains("a and (not b) or False"));
    }

    #[test]
    fn species_locals_default_construct() {
        let code = emit_source(
            r#"garden G
species Rose {
open:
    grow hello() -> void { bloom << "hi"; }
}
grow mainGarden() -> void {
    Rose g;
    g.hello();
}
"#,
        );
        assert!(code.contains("g = Rose()"));
        assert!(code.contains("g.hello()"));
    }

    #[test]
    fn typed_input_converts() {
        let code = emit_source(
            "garden G\ngrow f() -> void { int x = 0; string s = \"\"; water >> x >> s; }",
        );
        assert!(code.contains("x = int(input())"));
        assert!(code.contains("s = input()"));
    }

    #[test]
    fn increment_statement_becomes_augmented_assignment() {
        let code = emit_source("garden G\ngrow f() -> void { int x = 0; x++; }");
        assert!(code.contains("x += 1"));
    }
}
