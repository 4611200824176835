//! Java backend.
//!
//! The whole garden becomes one public class, species become static
//! nested classes, and member visibility maps straight onto Java's
//! access modifiers. String equality is rewritten to `.equals`, input
//! reads go through a shared `Scanner`, and the entry function is
//! invoked from `public static void main(String[] args)`.
//!
//! `auto` declarations without an initializer (and `auto` fields, where
//! Java's `var` is not allowed) cannot be expressed; they fail this
//! backend without affecting the others.

use std::collections::HashMap;

use crate::ast::{
    Block, ClassDecl, Decl, Expr, ExprKind, FunctionDecl, LiteralValue, Program, Stmt, VarDecl,
    Visibility, binary_precedence, format_float,
};
use crate::codegen::entry_function;
use crate::error::CodegenError;

pub fn emit(program: &Program) -> Result<String, CodegenError> {
    let mut emitter = Emitter {
        out: String::new(),
        indent: 0,
        local_types: HashMap::new(),
        member_types: HashMap::new(),
    };
    emitter.emit_program(program)?;
    Ok(emitter.out)
}

struct Emitter {
    out: String,
    indent: usize,
    /// Declared types of parameters and locals in the current function,
    /// used for `.equals` rewriting and typed Scanner reads.
    local_types: HashMap<String, String>,
    member_types: HashMap<String, String>,
}

impl Emitter {
    fn line(&mut self, text: &str) {
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

        self.line("// Converting Hanami code to Java");
        self.line("import java.util.Scanner;");
        for include in &garden.includes {
            self.line(&format!("// style: {include}"));
        }
        self.blank();

        self.line(&format!("public class {} {{", garden.name));
        self.indent += 1;
        self.line("private static Scanner inputScanner = new Scanner(System.in);");
        self.blank();

        for decl in &garden.declarations {
            match decl {
                Decl::ClassDecl(species) => self.emit_species(species)?,
                Decl::FunctionDecl(function) => self.emit_function(function, None)?,
                Decl::VariableDeclaration(var) => {
                    let field = self.field_decl(var, "static")?;
                    self.line(&field);
                }
            }
        }

        if let Some(entry) = entry_function(garden) {
            let call = format!("{}();", emitted_name(&entry.name));
            self.line("public static void main(String[] args) {");
            self.indent += 1;
            self.line(&call);
            self.indent -= 1;
            self.line("}");
        }

        self.indent -= 1;
        self.line("}");
        Ok(())
    }

    fn emit_species(&mut self, species: &ClassDecl) -> Result<(), CodegenError> {
        self.line(&format!("static class {} {{", species.name));
        self.indent += 1;

        self.member_types = species
            .sections
            .iter()
            .flat_map(|s| s.members.iter())
            .filter_map(|member| match member {
                Decl::VariableDeclaration(var) => {
                    Some((var.name.clone(), var.data_type.clone()))
                }
                _ => None,
            })
            .collect();

        for section in &species.sections {
            let modifier = match section.visibility {
                Visibility::Open => "public",
                Visibility::Hidden => "private",
                Visibility::Guarded => "protected",
            };
            for member in &section.members {
                match member {
                    Decl::VariableDeclaration(var) => {
                        let field = self.field_decl(var, modifier)?;
                        self.line(&field);
                    }
                    Decl::FunctionDecl(function) => {
                        self.emit_function(function, Some(modifier))?;
                    }
                    Decl::ClassDecl(nested) => {
                        self.line(&format!("// unsupported: nested species '{}'", nested.name));
                    }
                }
            }
        }

        self.indent -= 1;
        self.line("}");
        self.blank();
        self.member_types.clear();
        Ok(())
    }

    fn field_decl(&mut self, var: &VarDecl, modifier: &str) -> Result<String, CodegenError> {
        if var.data_type == "auto" {
            return Err(CodegenError::Unsupported {
                target: "java",
                construct: format!("'auto' field '{}' (fields cannot use var)", var.name),
            });
        }
        let java_type = map_type(&var.data_type).to_string();
        let value = match &var.initializer {
            Some(init) => self.expr(init),
            None => default_value(&var.data_type),
        };
        Ok(format!("{modifier} {java_type} {} = {};", var.name, value))
    }

    fn emit_function(
        &mut self,
        function: &FunctionDecl,
        modifier: Option<&str>,
    ) -> Result<(), CodegenError> {
        self.local_types = function
            .parameters
            .iter()
            .map(|p| (p.name.clone(), p.data_type.clone()))
            .collect();

        let params: Vec<String> = function
            .parameters
            .iter()
            .map(|p| format!("{} {}", map_type(&p.data_type), p.name))
            .collect();
        let name = emitted_name(&function.name);
        if name != function.name {
            self.line(&format!(
                "// renamed from '{}': 'main' collides with the Java entry point",
                function.name
            ));
        }
        let header = match modifier {
            Some(modifier) => format!(
                "{modifier} {} {}({}) {{",
                map_type(&function.return_type),
                name,
                params.join(", ")
            ),
            None => format!(
                "public static {} {}({}) {{",
                map_type(&function.return_type),
                name,
                params.join(", ")
            ),
        };
        self.line(&header);
        self.indent += 1;
        self.emit_block_body(&function.body)?;
        self.indent -= 1;
        self.line("}");
        self.blank();
        self.local_types.clear();
        Ok(())
    }

    fn emit_block_body(&mut self, block: &Block) -> Result<(), CodegenError> {
        for stmt in &block.statements {
            self.emit_stmt(stmt)?;
        }
        Ok(())
    }

    fn emit_stmt(&mut self, stmt: &Stmt) -> Result<(), CodegenError> {
        match stmt {
            Stmt::VariableDeclaration(var) => {
                let text = self.local_decl(var)?;
                self.line(&text);
            }
            Stmt::OutputStatement { expressions } => {
                let operands: Vec<String> = expressions
                    .iter()
                    .map(|e| self.concat_operand(e))
                    .collect();
                self.line(&format!("System.out.print({});", operands.join(" + ")));
            }
            Stmt::InputStatement { targets } => {
                for target in targets {
                    let read = self.typed_read(target);
                    let text = self.expr(target);
                    self.line(&format!("{text} = {read};"));
                }
            }
            Stmt::ReturnStatement { expression, .. } => match expression {
                Some(expr) => {
                    let text = self.expr(expr);
                    self.line(&format!("return {text};"));
                }
                None => self.line("return;"),
            },
            Stmt::IfStatement { arms } => {
                for (index, arm) in arms.iter().enumerate() {
                    let header = match (&arm.condition, index) {
                        (Some(condition), 0) => format!("if ({}) {{", self.expr(condition)),
                        (Some(condition), _) => {
                            format!("else if ({}) {{", self.expr(condition))
                        }
                        (None, _) => "else {".to_string(),
                    };
                    self.line(&header);
                    self.indent += 1;
                    self.emit_block_body(&arm.body)?;
                    self.indent -= 1;
                    self.line("}");
                }
            }
            Stmt::WhileStatement { condition, body } => {
                let header = format!("while ({}) {{", self.expr(condition));
                self.line(&header);
                self.indent += 1;
                self.emit_block_body(body)?;
                self.indent -= 1;
                self.line("}");
            }
            Stmt::ExpressionStatement { expression } => {
                let text = self.expr(expression);
                self.line(&format!("{text};"));
            }
        }
        Ok(())
    }

    fn local_decl(&mut self, var: &VarDecl) -> Result<String, CodegenError> {
        self.local_types
            .insert(var.name.clone(), var.data_type.clone());

        if var.data_type == "auto" {
            return match &var.initializer {
                Some(init) => {
                    let value = self.expr(init);
                    Ok(format!("var {} = {};", var.name, value))
                }
                None => Err(CodegenError::Unsupported {
                    target: "java",
                    construct: format!("'auto' variable '{}' without an initializer", var.name),
                }),
            };
        }

        let java_type = map_type(&var.data_type).to_string();
        let value = match &var.initializer {
            Some(init) => self.expr(init),
            None => default_value(&var.data_type),
        };
        Ok(format!("{java_type} {} = {};", var.name, value))
    }

    fn typed_read(&self, target: &Expr) -> &'static str {
        match self.declared_type(target).as_deref() {
            Some("int") => "inputScanner.nextInt()",
            Some("float") => "inputScanner.nextFloat()",
            Some("double") => "inputScanner.nextDouble()",
            Some("bool") => "inputScanner.nextBoolean()",
            _ => "inputScanner.nextLine()",
        }
    }

    fn declared_type(&self, expr: &Expr) -> Option<String> {
        match &expr.kind {
            ExprKind::Identifier { name } => self
                .local_types
                .get(name)
                .or_else(|| self.member_types.get(name))
                .cloned(),
            ExprKind::Literal {
                value: LiteralValue::Str(_),
            } => Some("string".to_string()),
            _ => None,
        }
    }

    fn is_string(&self, expr: &Expr) -> bool {
        self.declared_type(expr).as_deref() == Some("string")
    }

    fn concat_operand(&mut self, expr: &Expr) -> String {
        let text = self.expr(expr);
        if matches!(
            expr.kind,
            ExprKind::BinaryExpression { .. } | ExprKind::Assignment { .. }
        ) {
            format!("({text})")
        } else {
            text
        }
    }

    fn expr(&mut self, expr: &Expr) -> String {
        match &expr.kind {
            ExprKind::Identifier { name } => name.clone(),
            ExprKind::Literal { value } => match value {
                LiteralValue::Int(n) => n.to_string(),
                LiteralValue::Float(f) => format_float(*f),
                LiteralValue::Str(s) => format!("\"{s}\""),
                LiteralValue::Bool(b) => b.to_string(),
                LiteralValue::Null => "null".to_string(),
            },
            ExprKind::BinaryExpression {
                operator,
                left,
                right,
            } => {
                // Reference equality is wrong for strings; rewrite to
                // .equals when either side is known to be one.
                if (operator == "==" || operator == "!=")
                    && (self.is_string(left) || self.is_string(right))
                {
                    let lhs = self.equals_receiver(left);
                    let rhs = self.expr(right);
                    return if operator == "==" {
                        format!("{lhs}.equals({rhs})")
                    } else {
                        format!("!{lhs}.equals({rhs})")
                    };
                }
                let prec = binary_precedence(operator);
                let lhs = self.child(left, prec, false);
                let rhs = self.child(right, prec, true);
                format!("{lhs} {operator} {rhs}")
            }
            ExprKind::UnaryExpression {
                operator,
                prefix,
                operand,
            } => {
                let inner = self.operand_text(operand);
                if *prefix {
                    format!("{operator}{inner}")
                } else {
                    format!("{inner}{operator}")
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

    fn equals_receiver(&mut self, expr: &Expr) -> String {
        let text = self.expr(expr);
        match expr.kind {
            ExprKind::Identifier { .. }
            | ExprKind::MemberAccess { .. }
            | ExprKind::Literal { .. }
            | ExprKind::Call { .. } => text,
            _ => format!("({text})"),
        }
    }

    fn child(&mut self, child: &Expr, parent_prec: u8, is_right: bool) -> String {
        let needs_parens = match &child.kind {
            ExprKind::BinaryExpression { operator, .. } => {
                let child_prec = binary_precedence(operator);
                child_prec < parent_prec || (child_prec == parent_prec && is_right)
            }
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

fn map_type(name: &str) -> &str {
    match name {
        "string" => "String",
        "bool" => "boolean",
        other => other,
    }
}

fn default_value(data_type: &str) -> String {
    match data_type {
        "int" => "0".to_string(),
        "float" => "0.0f".to_string(),
        "double" => "0.0".to_string(),
        "string" => "\"\"".to_string(),
        "bool" => "false".to_string(),
        "char" => "'\\0'".to_string(),
        species => format!("new {species}()"),
    }
}

/// A user function named `main` would collide with the generated Java
/// entry point.
fn emitted_name(name: &str) -> String {
    if name == "main" {
        "hanamiMain".to_string()
    } else {
        name.to_string()
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
    fn math_test_wraps_everything_in_the_garden_class() {
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
        assert!(code.contains("public class MathTest {"));
        assert!(code.contains("public static int calculate() {"));
        assert!(code.contains("int b = 5 * (a - 3);"));
        assert!(code.contains("System.out.print(\"Result: \" + c);"));
        assert!(code.contains("public static void main(String[] args) {"));
        assert!(code.contains("calculate();"));
        assert_eq!(
            code.matches('{').count(),
            code.matches('}').count(),
            "braces must balance:\n{code}"
        );
    }

    #[test]
    fn species_members_carry_access_modifiers() {
        let code = emit_source(
            r#"garden G
species Pet {
open:
    grow introduce() -> void { bloom << name; }
hidden:
    string name = "Unknown";
guarded:
    int age = 0;
}
"#,
        );
        assert!(code.contains("static class Pet {"));
        assert!(code.contains("private String name = \"Unknown\";"));
        assert!(code.contains("protected int age = 0;"));
        assert!(code.contains("public void introduce() {"));
    }

    #[test]
    fn string_equality_rewrites_to_equals() {
        let code = emit_source(
            r#"garden G
grow f(string owner) -> void {
    branch (owner == "Hanami") { bloom << "hello"; }
    else branch (owner != "Buddy") { bloom << "stranger"; }
    else { bloom << "dog"; }
}
"#,
        );
        assert!(code.contains("if (owner.equals(\"Hanami\")) {"));
        assert!(code.contains("else if (!owner.equals(\"Buddy\")) {"));
    }

    #[test]
    fn typed_scanner_reads_match_the_declared_type() {
        let code = emit_source(
            "garden G\ngrow f() -> void { int x = 0; string s = \"\"; water >> x >> s; }",
        );
        assert!(code.contains("x = inputScanner.nextInt();"));
        assert!(code.contains("s = inputScanner.nextLine();"));
    }

    #[test]
    fn auto_without_initializer_fails_this_backend_only() {
        let source = "garden G\ngrow f() -> void { auto x; }";
        let program = parse(&lex(source).expect("lex")).expect("parse");
        let err = emit(&program).unwrap_err();
        assert!(matches!(err, CodegenError::Unsupported { target: "java", .. }));

        // The same program still emits for Python.
        assert!(crate::codegen_python::emit(&program).is_ok());
    }

    #[test]
    fn user_main_is_renamed_out_of_the_way() {
        let code = emit_source("garden G\ngrow main() -> void { bloom << \"hi\"; }");
        assert!(code.contains("public static void hanamiMain() {"));
        assert!(code.contains("// renamed from 'main'"));
        assert!(code.contains("hanamiMain();"));
    }
}
