//! JavaScript backend.
//!
//! There is no namespace construct to map a garden onto, so the garden
//! survives as a banner comment. Species become classes whose fields
//! are assigned in the constructor, equality uses the strict `===`
//! spelling, and `water >>` falls back to `prompt()` input.

use std::collections::HashSet;

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
    };
    emitter.emit_program(program)?;
    Ok(emitter.out)
}

struct Emitter {
    out: String,
    indent: usize,
    members: HashSet<String>,
    locals: HashSet<String>,
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

        self.line("// Generated Hanami Code (JavaScript)");
        self.blank();
        self.line(&format!("// Garden: {}", garden.name));
        for include in &garden.includes {
            self.line(&format!("// style: {include}"));
        }

        for decl in &garden.declarations {
            match decl {
                Decl::ClassDecl(species) => self.emit_species(species)?,
                Decl::FunctionDecl(function) => self.emit_function(function, false)?,
                Decl::VariableDeclaration(var) => {
                    let text = self.var_decl(var);
                    self.line(&text);
                }
            }
        }

        if let Some(entry) = entry_function(garden) {
            self.blank();
            self.line(&format!("{}();", entry.name));
        }
        Ok(())
    }

    fn emit_species(&mut self, species: &ClassDecl) -> Result<(), CodegenError> {
        self.line(&format!("class {} {{", species.name));
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

        if !fields.is_empty() {
            self.line("constructor() {");
            self.indent += 1;
            for field in fields {
                let value = match &field.initializer {
                    Some(init) => self.expr(init),
                    None => default_value(&field.data_type),
                };
                self.line(&format!("this.{} = {};", field.name, value));
            }
            self.indent -= 1;
            self.line("}");
            self.blank();
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
            // No access control on JS class members; keep the section
            // visible as a marker.
            self.line(&format!("// {}:", section.visibility.keyword()));
            for method in methods {
                self.emit_function(method, true)?;
            }
        }

        self.indent -= 1;
        self.line("}");
        self.blank();
        self.members.clear();
        Ok(())
    }

    fn emit_function(
        &mut self,
        function: &FunctionDecl,
        is_method: bool,
    ) -> Result<(), CodegenError> {
        self.locals = function.parameters.iter().map(|p| p.name.clone()).collect();

        let params: Vec<String> = function.parameters.iter().map(|p| p.name.clone()).collect();
        let header = if is_method {
            format!("{}({}) {{", function.name, params.join(", "))
        } else {
            format!("function {}({}) {{", function.name, params.join(", "))
        };
        self.line(&header);
        self.indent += 1;
        self.emit_block_body(&function.body)?;
        self.indent -= 1;
        self.line("}");
        self.blank();
        self.locals.clear();
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
                let operands: Vec<String> = expressions
                    .iter()
                    .map(|e| self.concat_operand(e))
                    .collect();
                self.line(&format!("console.log({});", operands.join(" + ")));
            }
            Stmt::InputStatement { targets } => {
                self.line("// Basic input using prompt:");
                for target in targets {
                    let text = self.expr(target);
                    self.line(&format!("{text} = prompt();"));
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

    fn var_decl(&mut self, var: &VarDecl) -> String {
        self.locals.insert(var.name.clone());
        let value = match &var.initializer {
            Some(init) => self.expr(init),
            None => default_value(&var.data_type),
        };
        format!("let {} = {};", var.name, value)
    }

    /// Operand of a `+`-joined console.log chain; binary operands keep
    /// their own parentheses so mixed arithmetic is not re-associated
    /// into string concatenation.
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
            ExprKind::Identifier { name } => {
                if self.members.contains(name) && !self.locals.contains(name) {
                    format!("this.{name}")
                } else {
                    name.clone()
                }
            }
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
                let spelled = match operator.as_str() {
                    "==" => "===",
                    "!=" => "!==",
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

/// Species-typed declarations construct an instance so member calls on
/// them work; everything else gets the matching JS zero value.
fn default_value(data_type: &str) -> String {
    match data_type {
        "int" | "float" | "double" => "0".to_string(),
        "string" => "\"\"".to_string(),
        "bool" => "false".to_string(),
        "auto" | "void" => "undefined".to_string(),
        species => format!("new {species}()"),
    }
}
