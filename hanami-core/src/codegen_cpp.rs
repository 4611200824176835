//! C++ backend: the most direct translation, since Hanami's surface
//! syntax is already C++-shaped. Gardens become namespaces, species
//! become classes with access labels, streams become `std::cout` /
//! `std::cin`, and the entry function is called from `int main()`.

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
    };
    emitter.emit_program(program)?;
    Ok(emitter.out)
}

struct Emitter {
    out: String,
    indent: usize,
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

        self.line("#include <iostream>");
        self.line("#include <string>");
        for include in &garden.includes {
            self.line(&format!("// style: {include}"));
        }
        self.blank();

        self.line(&format!("namespace {} {{", garden.name));
        self.indent += 1;
        for decl in &garden.declarations {
            self.emit_decl(decl)?;
        }
        self.indent -= 1;
        self.line("}");

        if let Some(entry) = entry_function(garden) {
            self.blank();
            self.line("int main() {");
            self.indent += 1;
            let call = format!("{}::{}()", garden.name, entry.name);
            if entry.return_type == "int" {
                self.line(&format!("return {call};"));
            } else {
                self.line(&format!("{call};"));
                self.line("return 0;");
            }
            self.indent -= 1;
            self.line("}");
        }
        Ok(())
    }

    fn emit_decl(&mut self, decl: &Decl) -> Result<(), CodegenError> {
        match decl {
            Decl::ClassDecl(species) => self.emit_species(species),
            Decl::FunctionDecl(function) => self.emit_function(function),
            Decl::VariableDeclaration(var) => {
                let text = self.var_decl(var);
                self.line(&text);
                Ok(())
            }
        }
    }

    fn emit_species(&mut self, species: &ClassDecl) -> Result<(), CodegenError> {
        self.line(&format!("class {} {{", species.name));
        for section in &species.sections {
            let label = match section.visibility {
                Visibility::Open => "public:",
                Visibility::Hidden => "private:",
                Visibility::Guarded => "protected:",
            };
            self.line(label);
            self.indent += 1;
            for member in &section.members {
                self.emit_decl(member)?;
            }
            self.indent -= 1;
        }
        self.line("};");
        self.blank();
        Ok(())
    }

    fn emit_function(&mut self, function: &FunctionDecl) -> Result<(), CodegenError> {
        let params: Vec<String> = function
            .parameters
            .iter()
            .map(|p| format!("{} {}", map_type(&p.data_type), p.name))
            .collect();
        self.line(&format!(
            "{} {}({}) {{",
            map_type(&function.return_type),
            function.name,
            params.join(", ")
        ));
        self.indent += 1;
        self.emit_block_body(&function.body)?;
        self.indent -= 1;
        self.line("}");
        self.blank();
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
                let text = self.var_decl(var);
                self.line(&text);
            }
            Stmt::OutputStatement { expressions } => {
                let operands: Vec<String> = expressions.iter().map(|e| self.expr(e)).collect();
                self.line(&format!("std::cout << {};", operands.join(" << ")));
            }
            Stmt::InputStatement { targets } => {
                let operands: Vec<String> = targets.iter().map(|e| self.expr(e)).collect();
                self.line(&format!("std::cin >> {};", operands.join(" >> ")));
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
                        (Some(condition), _) => format!("else if ({}) {{", self.expr(condition)),
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

    fn var_decl(&mut self, var: &VarDecl) -> String {
        match &var.initializer {
            Some(init) => format!(
                "{} {} = {};",
                map_type(&var.data_type),
                var.name,
                self.expr(init)
            ),
            None => format!("{} {};", map_type(&var.data_type), var.name),
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
                LiteralValue::Null => "nullptr".to_string(),
            },
            ExprKind::BinaryExpression {
                operator,
                left,
                right,
            } => {
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
                let inner = self.operand(operand);
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

    fn operand(&mut self, operand: &Expr) -> String {
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
        "string" => "std::string",
        other => other,
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
    fn math_test_emits_a_runnable_translation_unit() {
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
        assert!(code.contains("#include <iostream>"));
        assert!(code.contains("namespace MathTest {"));
        assert!(code.contains("int calculate() {"));
        assert!(code.contains("int b = 5 * (a - 3);"));
        assert!(code.contains("int c = (a + b) % 8;"));
        assert!(code.contains("std::cout << \"Result: \" << c;"));
        assert!(code.contains("return c;"));
        assert!(code.contains("return MathTest::calculate();"));
        assert_eq!(
            code.matches('{').count(),
            code.matches('}').count(),
            "braces must balance:\n{code}"
        );
    }

    #[test]
    fn species_sections_become_access_labels() {
        let code = emit_source(
            r#"garden G
species Rose {
open:
    grow sayHello() -> void { bloom << "hi"; }
hidden:
    int secretNumber = 42;
guarded:
    bool isFriendly = true;
}
"#,
        );
        assert!(code.contains("class Rose {"));
        assert!(code.contains("public:"));
        assert!(code.contains("private:"));
        assert!(code.contains("protected:"));
        assert!(code.contains("int secretNumber = 42;"));
        assert!(code.contains("};"));
    }

    #[test]
    fn string_type_maps_to_std_string() {
        let code = emit_source(
            "garden G\ngrow f(string name) -> string { blossom name; }",
        );
        assert!(code.contains("std::string f(std::string name) {"));
    }

    #[test]
    fn non_int_entry_returns_zero_explicitly() {
        let code = emit_source("garden G\ngrow mainGarden() -> void { bloom << \"x\"; }");
        assert!(code.contains("G::mainGarden();"));
        assert!(code.contains("return 0;"));
    }

    #[test]
    fn while_and_branch_translate_structurally() {
        let code = emit_source(
            r#"garden G
grow f(int x) -> void {
    while (x > 0) { x = x - 1; }
    branch (x == 0) { bloom << "done"; }
    else { bloom << "odd"; }
}
"#,
        );
        assert!(code.contains("while (x > 0) {"));
        assert!(code.contains("if (x == 0) {"));
        assert!(code.contains("else {"));
    }
}
