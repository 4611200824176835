//! Semantic analysis: symbol table construction, type checking, and
//! visibility enforcement.
//!
//! Unlike the scanner and parser, analysis never fails fast. The
//! analyzer walks the whole tree once, accumulates every error it can
//! find, and always returns a usable report: the symbol table as built,
//! the ordered type-checking trace, and the error list. The input AST
//! is never mutated.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::ast::{
    Block, ClassDecl, Decl, Expr, ExprKind, FunctionDecl, LiteralValue, Program, Stmt, VarDecl,
    Visibility,
};
use crate::error::{SemanticError, SemanticErrorKind};
use crate::types::{Type, assignable, binary_result, unary_result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SymbolCategory {
    Garden,
    Species,
    Function,
    Variable,
}

/// One entry in the symbol table, in the shape the report serializes.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SymbolInfo {
    #[serde(rename = "type")]
    pub category: SymbolCategory,
    #[serde(rename = "dataType", skip_serializing_if = "Option::is_none")]
    pub data_type: Option<String>,
    #[serde(rename = "returnType", skip_serializing_if = "Option::is_none")]
    pub return_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parameters: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub visibility: Option<Visibility>,
    pub scope: String,
}

/// Scope name to (name to symbol). Built once per `analyze` call and
/// returned to the caller; nothing is retained across calls.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct SymbolTable {
    pub scopes: BTreeMap<String, BTreeMap<String, SymbolInfo>>,
}

impl SymbolTable {
    fn define(&mut self, scope: &str, name: &str, info: SymbolInfo) -> bool {
        let entries = self.scopes.entry(scope.to_string()).or_default();
        if entries.contains_key(name) {
            return false;
        }
        entries.insert(name.to_string(), info);
        true
    }

    pub fn get(&self, scope: &str, name: &str) -> Option<&SymbolInfo> {
        self.scopes.get(scope).and_then(|entries| entries.get(name))
    }
}

/// One entry of the type-checking trace, in program order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TypeCheckRecord {
    pub expression: String,
    #[serde(rename = "expectedType")]
    pub expected_type: String,
    #[serde(rename = "actualType")]
    pub actual_type: String,
    pub valid: bool,
}

#[derive(Debug, Serialize)]
pub struct AnalysisReport {
    #[serde(rename = "symbolTable")]
    pub symbol_table: SymbolTable,
    #[serde(rename = "typeChecking")]
    pub type_checking: Vec<TypeCheckRecord>,
    pub errors: Vec<SemanticError>,
}

/// Analyze a program: build the symbol table, type-check every
/// expression, and collect all semantic errors in one pass.
pub fn analyze(program: &Program) -> AnalysisReport {
    let mut analyzer = Analyzer::default();
    analyzer.run(program);
    AnalysisReport {
        symbol_table: analyzer.table,
        type_checking: analyzer.records,
        errors: analyzer.errors,
    }
}

#[derive(Default)]
struct Analyzer {
    table: SymbolTable,
    /// Active scope names, innermost last.
    stack: Vec<String>,
    current_species: Option<String>,
    current_function_return: Option<Type>,
    records: Vec<TypeCheckRecord>,
    errors: Vec<SemanticError>,
    /// Per-parent counters for naming anonymous block scopes.
    block_counters: BTreeMap<String, u32>,
}

impl Analyzer {
    fn run(&mut self, program: &Program) {
        self.stack.push("global".to_string());
        self.table.scopes.entry("global".to_string()).or_default();

        let garden = &program.garden;
        self.define(
            &garden.name,
            SymbolInfo {
                category: SymbolCategory::Garden,
                data_type: None,
                return_type: None,
                parameters: None,
                visibility: None,
                scope: "global".to_string(),
            },
            1,
            1,
        );

        self.stack.push(garden.name.clone());
        self.table.scopes.entry(garden.name.clone()).or_default();
        for decl in &garden.declarations {
            self.visit_decl(decl);
        }
        self.stack.pop();
        self.stack.pop();
    }

    // ------------------------------------------------------------------
    // Scope helpers
    // ------------------------------------------------------------------

    fn current_scope(&self) -> &str {
        self.stack.last().expect("scope stack is never empty")
    }

    fn define(&mut self, name: &str, info: SymbolInfo, line: u32, column: u32) -> bool {
        let scope = self.current_scope().to_string();
        let category = info.category;
        if self.table.define(&scope, name, info) {
            return true;
        }
        let what = match category {
            SymbolCategory::Garden => "garden",
            SymbolCategory::Species => "species",
            SymbolCategory::Function => "function",
            SymbolCategory::Variable => "variable",
        };
        self.errors.push(SemanticError::new(
            SemanticErrorKind::DuplicateSymbol,
            format!("{what} '{name}' already declared in this scope"),
            line,
            column,
        ));
        false
    }

    /// Resolve a name by walking the scope stack outward.
    fn lookup(&self, name: &str) -> Option<&SymbolInfo> {
        self.stack
            .iter()
            .rev()
            .find_map(|scope| self.table.get(scope, name))
    }

    fn species_exists(&self, name: &str) -> bool {
        self.lookup(name)
            .is_some_and(|info| info.category == SymbolCategory::Species)
    }

    fn block_scope_name(&mut self) -> String {
        let parent = self.current_scope().to_string();
        let counter = self.block_counters.entry(parent.clone()).or_insert(0);
        *counter += 1;
        format!("{parent}.block{counter}")
    }

    fn error(&mut self, kind: SemanticErrorKind, message: String, line: u32, column: u32) {
        self.errors
            .push(SemanticError::new(kind, message, line, column));
    }

    fn record(&mut self, expression: String, expected: &Type, actual: &Type, valid: bool) {
        self.records.push(TypeCheckRecord {
            expression,
            expected_type: expected.name().to_string(),
            actual_type: actual.name().to_string(),
            valid,
        });
    }

    /// Check that a declared type name resolves to a primitive or a
    /// known species.
    fn check_type_exists(&mut self, name: &str, line: u32, column: u32) {
        if let Type::Species(species) = Type::from_name(name) {
            if !self.species_exists(&species) {
                self.error(
                    SemanticErrorKind::UndeclaredIdentifier,
                    format!("unknown type '{species}'"),
                    line,
                    column,
                );
            }
        }
    }

    // ------------------------------------------------------------------
    // Declarations
    // ------------------------------------------------------------------

    fn visit_decl(&mut self, decl: &Decl) {
        match decl {
            Decl::ClassDecl(species) => self.visit_species(species),
            Decl::FunctionDecl(function) => {
                self.declare_function(function, None);
                self.visit_function_body(function, None);
            }
            Decl::VariableDeclaration(var) => self.visit_var_decl(var),
        }
    }

    fn declare_function(&mut self, function: &FunctionDecl, visibility: Option<Visibility>) {
        let parameters: Vec<String> = function
            .parameters
            .iter()
            .map(|p| p.data_type.clone())
            .collect();
        let scope = self.current_scope().to_string();
        self.define(
            &function.name,
            SymbolInfo {
                category: SymbolCategory::Function,
                data_type: None,
                return_type: Some(function.return_type.clone()),
                parameters: Some(parameters),
                visibility,
                scope,
            },
            function.line,
            function.column,
        );
    }

    fn visit_function_body(&mut self, function: &FunctionDecl, species: Option<&str>) {
        self.check_type_exists(&function.return_type, function.line, function.column);

        let scope_name = match species {
            Some(species) => format!("{species}.{}", function.name),
            None => function.name.clone(),
        };
        self.stack.push(scope_name.clone());
        self.table.scopes.entry(scope_name.clone()).or_default();

        for param in &function.parameters {
            self.check_type_exists(&param.data_type, function.line, function.column);
            self.define(
                &param.name,
                SymbolInfo {
                    category: SymbolCategory::Variable,
                    data_type: Some(param.data_type.clone()),
                    return_type: None,
                    parameters: None,
                    visibility: None,
                    scope: scope_name.clone(),
                },
                function.line,
                function.column,
            );
        }

        let previous_return = self
            .current_function_return
            .replace(Type::from_name(&function.return_type));
        // The body block shares the function's own scope; only nested
        // blocks open fresh ones.
        for stmt in &function.body.statements {
            self.visit_stmt(stmt);
        }
        self.current_function_return = previous_return;
        self.stack.pop();
    }

    fn visit_species(&mut self, species: &ClassDecl) {
        let scope = self.current_scope().to_string();
        self.define(
            &species.name,
            SymbolInfo {
                category: SymbolCategory::Species,
                data_type: None,
                return_type: None,
                parameters: None,
                visibility: None,
                scope,
            },
            species.line,
            species.column,
        );

        let previous_species = self.current_species.replace(species.name.clone());
        self.stack.push(species.name.clone());
        self.table.scopes.entry(species.name.clone()).or_default();

        // First pass: declare every member so method bodies can refer to
        // members declared after them.
        for section in &species.sections {
            for member in &section.members {
                match member {
                    Decl::FunctionDecl(function) => {
                        self.declare_function(function, Some(section.visibility));
                    }
                    Decl::VariableDeclaration(var) => {
                        let scope = self.current_scope().to_string();
                        self.check_type_exists(&var.data_type, var.line, var.column);
                        self.define(
                            &var.name,
                            SymbolInfo {
                                category: SymbolCategory::Variable,
                                data_type: Some(var.data_type.clone()),
                                return_type: None,
                                parameters: None,
                                visibility: Some(section.visibility),
                                scope,
                            },
                            var.line,
                            var.column,
                        );
                    }
                    Decl::ClassDecl(nested) => {
                        self.error(
                            SemanticErrorKind::DuplicateSymbol,
                            format!("species '{}' cannot be nested", nested.name),
                            nested.line,
                            nested.column,
                        );
                    }
                }
            }
        }

        // Second pass: check member initializers and method bodies.
        for section in &species.sections {
            for member in &section.members {
                match member {
                    Decl::FunctionDecl(function) => {
                        let name = species.name.clone();
                        self.visit_function_body(function, Some(&name));
                    }
                    Decl::VariableDeclaration(var) => {
                        if let Some(init) = &var.initializer {
                            self.check_initializer(var, init);
                        }
                    }
                    Decl::ClassDecl(_) => {}
                }
            }
        }

        self.stack.pop();
        self.current_species = previous_species;
    }

    fn check_initializer(&mut self, var: &VarDecl, init: &Expr) {
        let declared = Type::from_name(&var.data_type);
        if let Some(actual) = self.infer(init) {
            let valid = assignable(&declared, &actual);
            self.record(
                format!("{} = {}", var.name, init.to_text()),
                &declared,
                &actual,
                valid,
            );
            if !valid {
                self.error(
                    SemanticErrorKind::TypeMismatch,
                    format!(
                        "cannot initialize variable '{}' of type '{}' with expression of type '{}'",
                        var.name, declared, actual
                    ),
                    var.line,
                    var.column,
                );
            }
        }
    }

    fn visit_var_decl(&mut self, var: &VarDecl) {
        let scope = self.current_scope().to_string();

        // `auto` takes whatever type the initializer produces.
        let declared_name = if var.data_type == "auto" {
            match var.initializer.as_ref().and_then(|init| self.infer(init)) {
                Some(inferred) => {
                    self.record(
                        format!(
                            "{} = {}",
                            var.name,
                            var.initializer.as_ref().expect("checked above").to_text()
                        ),
                        &inferred,
                        &inferred,
                        true,
                    );
                    inferred.name().to_string()
                }
                None => {
                    self.error(
                        SemanticErrorKind::TypeMismatch,
                        format!("cannot infer a type for 'auto' variable '{}'", var.name),
                        var.line,
                        var.column,
                    );
                    return;
                }
            }
        } else {
            self.check_type_exists(&var.data_type, var.line, var.column);
            if let Some(init) = &var.initializer {
                self.check_initializer(var, init);
            }
            var.data_type.clone()
        };

        self.define(
            &var.name,
            SymbolInfo {
                category: SymbolCategory::Variable,
                data_type: Some(declared_name),
                return_type: None,
                parameters: None,
                visibility: None,
                scope,
            },
            var.line,
            var.column,
        );
    }

    // ------------------------------------------------------------------
    // Statements
    // ------------------------------------------------------------------

    fn visit_block(&mut self, block: &Block) {
        let name = self.block_scope_name();
        self.stack.push(name.clone());
        self.table.scopes.entry(name).or_default();
        for stmt in &block.statements {
            self.visit_stmt(stmt);
        }
        self.stack.pop();
    }

    fn visit_stmt(&mut self, stmt: &Stmt) {
        match stmt {
            Stmt::VariableDeclaration(var) => self.visit_var_decl(var),
            Stmt::OutputStatement { expressions } => {
                for expr in expressions {
                    if let Some(ty) = self.infer(expr) {
                        if ty == Type::Void || matches!(ty, Type::Species(_)) {
                            self.error(
                                SemanticErrorKind::TypeMismatch,
                                format!("cannot stream a value of type '{ty}' with 'bloom <<'"),
                                expr.line,
                                expr.column,
                            );
                        }
                    }
                }
            }
            Stmt::InputStatement { targets } => {
                for target in targets {
                    if !matches!(
                        target.kind,
                        ExprKind::Identifier { .. } | ExprKind::MemberAccess { .. }
                    ) {
                        self.error(
                            SemanticErrorKind::TypeMismatch,
                            "'water >>' can only read into variables or assignable members"
                                .to_string(),
                            target.line,
                            target.column,
                        );
                        continue;
                    }
                    self.infer(target);
                }
            }
            Stmt::ReturnStatement {
                expression,
                line,
                column,
            } => self.visit_return(expression.as_ref(), *line, *column),
            Stmt::IfStatement { arms } => {
                for arm in arms {
                    if let Some(condition) = &arm.condition {
                        self.check_condition(condition, "branch");
                    }
                    self.visit_block(&arm.body);
                }
            }
            Stmt::WhileStatement { condition, body } => {
                self.check_condition(condition, "while");
                self.visit_block(body);
            }
            Stmt::ExpressionStatement { expression } => {
                self.infer(expression);
            }
        }
    }

    fn check_condition(&mut self, condition: &Expr, construct: &str) {
        if let Some(ty) = self.infer(condition) {
            if ty != Type::Bool {
                self.error(
                    SemanticErrorKind::TypeMismatch,
                    format!("condition for '{construct}' must be of type bool, got '{ty}'"),
                    condition.line,
                    condition.column,
                );
            }
        }
    }

    fn visit_return(&mut self, expression: Option<&Expr>, line: u32, column: u32) {
        let Some(expected) = self.current_function_return.clone() else {
            self.error(
                SemanticErrorKind::TypeMismatch,
                "'blossom' outside of a function".to_string(),
                line,
                column,
            );
            return;
        };

        match expression {
            Some(expr) => {
                if let Some(actual) = self.infer(expr) {
                    let valid = expected != Type::Void && assignable(&expected, &actual);
                    self.record(format!("return {}", expr.to_text()), &expected, &actual, valid);
                    if expected == Type::Void {
                        self.error(
                            SemanticErrorKind::TypeMismatch,
                            "cannot return a value from a 'void' function".to_string(),
                            line,
                            column,
                        );
                    } else if !valid {
                        self.error(
                            SemanticErrorKind::TypeMismatch,
                            format!(
                                "cannot return a value of type '{actual}' from a function expecting '{expected}'"
                            ),
                            line,
                            column,
                        );
                    }
                }
            }
            None => {
                if expected != Type::Void {
                    self.error(
                        SemanticErrorKind::TypeMismatch,
                        format!("must return a value of type '{expected}' from a non-void function"),
                        line,
                        column,
                    );
                }
            }
        }
    }

    // ------------------------------------------------------------------
    // Expression type inference
    // ------------------------------------------------------------------

    /// Infer an expression's type bottom-up. Returns None once a
    /// sub-expression has already failed, so one mistake does not
    /// cascade into a chain of follow-up errors.
    fn infer(&mut self, expr: &Expr) -> Option<Type> {
        match &expr.kind {
            ExprKind::Literal { value } => match value {
                LiteralValue::Int(_) => Some(Type::Int),
                LiteralValue::Float(_) => Some(Type::Double),
                LiteralValue::Str(_) => Some(Type::Str),
                LiteralValue::Bool(_) => Some(Type::Bool),
                LiteralValue::Null => None,
            },
            ExprKind::Identifier { name } => match self.lookup(name) {
                Some(info) => match info.category {
                    SymbolCategory::Variable => {
                        Some(Type::from_name(info.data_type.as_deref().unwrap_or("void")))
                    }
                    SymbolCategory::Function => {
                        Some(Type::from_name(info.return_type.as_deref().unwrap_or("void")))
                    }
                    SymbolCategory::Species => Some(Type::Species(name.clone())),
                    SymbolCategory::Garden => None,
                },
                None => {
                    self.error(
                        SemanticErrorKind::UndeclaredIdentifier,
                        format!("undeclared identifier '{name}'"),
                        expr.line,
                        expr.column,
                    );
                    None
                }
            },
            ExprKind::BinaryExpression {
                operator,
                left,
                right,
            } => {
                let left_ty = self.infer(left);
                let right_ty = self.infer(right);
                let (left_ty, right_ty) = (left_ty?, right_ty?);

                match binary_result(operator, &left_ty, &right_ty) {
                    Some(result) => {
                        self.record(expr.to_text(), &result, &result, true);
                        Some(result)
                    }
                    None => {
                        let expected = match operator.as_str() {
                            "&&" | "||" => Type::Bool,
                            "%" => Type::Int,
                            _ => left_ty.clone(),
                        };
                        self.record(expr.to_text(), &expected, &right_ty, false);
                        self.error(
                            SemanticErrorKind::TypeMismatch,
                            format!(
                                "operator '{operator}' cannot combine '{left_ty}' and '{right_ty}'"
                            ),
                            expr.line,
                            expr.column,
                        );
                        None
                    }
                }
            }
            ExprKind::UnaryExpression {
                operator, operand, ..
            } => {
                let operand_ty = self.infer(operand)?;
                match unary_result(operator, &operand_ty) {
                    Some(result) => Some(result),
                    None => {
                        self.error(
                            SemanticErrorKind::TypeMismatch,
                            format!("operator '{operator}' cannot be applied to '{operand_ty}'"),
                            expr.line,
                            expr.column,
                        );
                        None
                    }
                }
            }
            ExprKind::Assignment {
                operator,
                target,
                value,
            } => {
                if !matches!(
                    target.kind,
                    ExprKind::Identifier { .. } | ExprKind::MemberAccess { .. }
                ) {
                    self.error(
                        SemanticErrorKind::TypeMismatch,
                        "invalid left-hand side for assignment".to_string(),
                        target.line,
                        target.column,
                    );
                    return None;
                }
                let target_ty = self.infer(target);
                let value_ty = self.infer(value);
                let (target_ty, value_ty) = (target_ty?, value_ty?);

                // Compound forms must also satisfy the base operator.
                let effective = if let Some(base) = operator.strip_suffix('=').filter(|b| !b.is_empty()) {
                    match binary_result(base, &target_ty, &value_ty) {
                        Some(ty) => ty,
                        None => {
                            self.record(expr.to_text(), &target_ty, &value_ty, false);
                            self.error(
                                SemanticErrorKind::TypeMismatch,
                                format!(
                                    "operator '{operator}' cannot combine '{target_ty}' and '{value_ty}'"
                                ),
                                expr.line,
                                expr.column,
                            );
                            return None;
                        }
                    }
                } else {
                    value_ty.clone()
                };

                let valid = assignable(&target_ty, &effective);
                self.record(expr.to_text(), &target_ty, &value_ty, valid);
                if !valid {
                    self.error(
                        SemanticErrorKind::TypeMismatch,
                        format!(
                            "cannot assign a value of type '{value_ty}' to a target of type '{target_ty}'"
                        ),
                        expr.line,
                        expr.column,
                    );
                    return None;
                }
                Some(value_ty)
            }
            ExprKind::Call { callee, arguments } => self.infer_call(expr, callee, arguments),
            ExprKind::MemberAccess { object, member } => {
                let object_ty = self.infer(object)?;
                let info = self.member_info(&object_ty, member, expr)?;
                if info.category == SymbolCategory::Function {
                    self.error(
                        SemanticErrorKind::TypeMismatch,
                        format!("cannot use method '{member}' as a value; call it with '()'"),
                        expr.line,
                        expr.column,
                    );
                    return None;
                }
                Some(Type::from_name(info.data_type.as_deref().unwrap_or("void")))
            }
        }
    }

    fn infer_call(&mut self, expr: &Expr, callee: &Expr, arguments: &[Expr]) -> Option<Type> {
        let (info, name) = match &callee.kind {
            ExprKind::Identifier { name } => {
                let Some(info) = self.lookup(name).cloned() else {
                    self.error(
                        SemanticErrorKind::UndeclaredIdentifier,
                        format!("call to undeclared function '{name}'"),
                        callee.line,
                        callee.column,
                    );
                    return None;
                };
                if info.category != SymbolCategory::Function {
                    self.error(
                        SemanticErrorKind::TypeMismatch,
                        format!("'{name}' is not a function"),
                        callee.line,
                        callee.column,
                    );
                    return None;
                }
                (info, name.clone())
            }
            ExprKind::MemberAccess { object, member } => {
                let object_ty = self.infer(object)?;
                let info = self.member_info(&object_ty, member, callee)?;
                if info.category != SymbolCategory::Function {
                    self.error(
                        SemanticErrorKind::TypeMismatch,
                        format!("member '{member}' is not a method"),
                        callee.line,
                        callee.column,
                    );
                    return None;
                }
                (info, member.clone())
            }
            _ => {
                self.error(
                    SemanticErrorKind::TypeMismatch,
                    "expression is not callable".to_string(),
                    callee.line,
                    callee.column,
                );
                return None;
            }
        };

        let params = info.parameters.clone().unwrap_or_default();
        if arguments.len() != params.len() {
            self.error(
                SemanticErrorKind::TypeMismatch,
                format!(
                    "function '{name}' expects {} argument(s), but got {}",
                    params.len(),
                    arguments.len()
                ),
                expr.line,
                expr.column,
            );
        }
        for (argument, param) in arguments.iter().zip(params.iter()) {
            if let Some(arg_ty) = self.infer(argument) {
                let param_ty = Type::from_name(param);
                if !assignable(&param_ty, &arg_ty) {
                    self.error(
                        SemanticErrorKind::TypeMismatch,
                        format!(
                            "argument type mismatch in call to '{name}': expected '{param_ty}', got '{arg_ty}'"
                        ),
                        argument.line,
                        argument.column,
                    );
                }
            }
        }
        // Extra arguments beyond the parameter list are still inferred
        // so their own errors surface.
        for argument in arguments.iter().skip(params.len()) {
            self.infer(argument);
        }

        Some(Type::from_name(info.return_type.as_deref().unwrap_or("void")))
    }

    /// Look up a species member, enforcing visibility from the access
    /// site: `hidden` and `guarded` members are reachable only from
    /// inside the declaring species.
    fn member_info(&mut self, object_ty: &Type, member: &str, site: &Expr) -> Option<SymbolInfo> {
        let Type::Species(species) = object_ty else {
            self.error(
                SemanticErrorKind::TypeMismatch,
                format!("cannot access member '{member}' on non-species type '{object_ty}'"),
                site.line,
                site.column,
            );
            return None;
        };

        let Some(info) = self.table.get(species, member).cloned() else {
            self.error(
                SemanticErrorKind::UndeclaredIdentifier,
                format!("species '{species}' has no member '{member}'"),
                site.line,
                site.column,
            );
            return None;
        };

        let inside = self.current_species.as_deref() == Some(species.as_str());
        match info.visibility {
            Some(section @ (Visibility::Hidden | Visibility::Guarded)) if !inside => {
                self.error(
                    SemanticErrorKind::AccessViolation,
                    format!(
                        "member '{member}' of species '{species}' is {} and cannot be accessed here",
                        section.keyword()
                    ),
                    site.line,
                    site.column,
                );
                None
            }
            _ => Some(info),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexer::lex;
    use crate::parser::parse;

    fn analyze_source(source: &str) -> AnalysisReport {
        let program = parse(&lex(source).expect("lex")).expect("parse");
        analyze(&program)
    }

    const MATH_TEST: &str = r#"garden MathTest

grow calculate() -> int {
    int a = 10;
    int b = 5 * (a - 3);
    int c = (a + b) % 8;
    bloom << "Result: " << c;
    blossom c;
}
"#;

    #[test]
    fn math_test_analyzes_cleanly() {
        let report = analyze_source(MATH_TEST);
        assert!(report.errors.is_empty(), "errors: {:?}", report.errors);

        let c = report.symbol_table.get("calculate", "c").expect("c");
        assert_eq!(c.category, SymbolCategory::Variable);
        assert_eq!(c.data_type.as_deref(), Some("int"));

        let expressions: Vec<&str> = report
            .type_checking
            .iter()
            .map(|r| r.expression.as_str())
            .collect();
        assert_eq!(
            expressions,
            vec![
                "a = 10",
                "a - 3",
                "5 * (a - 3)",
                "b = 5 * (a - 3)",
                "a + b",
                "(a + b) % 8",
                "c = (a + b) % 8",
                "return c",
            ]
        );
        assert!(report.type_checking.iter().all(|r| r.valid));
    }

    #[test]
    fn duplicate_declaration_keeps_the_first_type() {
        let report = analyze_source(
            "garden G\ngrow f() -> void { int x = 1; string x = \"two\"; }",
        );
        let duplicates: Vec<_> = report
            .errors
            .iter()
            .filter(|e| e.kind == SemanticErrorKind::DuplicateSymbol)
            .collect();
        assert_eq!(duplicates.len(), 1);
        let x = report.symbol_table.get("f", "x").expect("x");
        assert_eq!(x.data_type.as_deref(), Some("int"));
    }

    #[test]
    fn every_error_is_reported_in_one_pass() {
        // One type mismatch and one undeclared identifier.
        let report = analyze_source(
            "garden G\ngrow f() -> void { int x = \"text\"; bloom << missing; }",
        );
        assert_eq!(report.errors.len(), 2, "errors: {:?}", report.errors);
        assert_eq!(report.errors[0].kind, SemanticErrorKind::TypeMismatch);
        assert_eq!(
            report.errors[1].kind,
            SemanticErrorKind::UndeclaredIdentifier
        );
    }

    #[test]
    fn invalid_expressions_stay_in_the_trace() {
        let report = analyze_source("garden G\ngrow f() -> void { bool b = true && 1; }");
        let invalid: Vec<_> = report.type_checking.iter().filter(|r| !r.valid).collect();
        assert_eq!(invalid.len(), 1);
        assert_eq!(invalid[0].expression, "true && 1");
        assert_eq!(invalid[0].expected_type, "bool");
    }

    #[test]
    fn shadowing_across_scopes_is_permitted() {
        let report = analyze_source(
            "garden G\ngrow f() -> void { int x = 1; branch (x == 1) { int x = 2; } }",
        );
        assert!(report.errors.is_empty(), "errors: {:?}", report.errors);
        assert!(report.symbol_table.get("f", "x").is_some());
        assert!(report.symbol_table.get("f.block1", "x").is_some());
    }

    #[test]
    fn hidden_members_are_blocked_from_outside() {
        let source = r#"garden G
species Rose {
open:
    grow sayHello() -> void { bloom << secretNumber; }
hidden:
    int secretNumber = 42;
}
grow f() -> void {
    Rose g;
    bloom << g.secretNumber;
}
"#;
        let report = analyze_source(source);
        let violations: Vec<_> = report
            .errors
            .iter()
            .filter(|e| e.kind == SemanticErrorKind::AccessViolation)
            .collect();
        // The method's own use of secretNumber is fine; only the outside
        // access is flagged.
        assert_eq!(violations.len(), 1, "errors: {:?}", report.errors);
        assert!(violations[0].message.contains("secretNumber"));
    }

    #[test]
    fn methods_see_members_declared_after_them() {
        let source = r#"garden G
species Pet {
open:
    grow birthday() -> void { age = age + 1; }
hidden:
    int age = 0;
}
"#;
        let report = analyze_source(source);
        assert!(report.errors.is_empty(), "errors: {:?}", report.errors);
    }

    #[test]
    fn return_type_mismatch_is_flagged() {
        let report = analyze_source("garden G\ngrow f() -> int { blossom \"no\"; }");
        assert_eq!(report.errors.len(), 1);
        assert_eq!(report.errors[0].kind, SemanticErrorKind::TypeMismatch);
        let record = report.type_checking.last().expect("trace entry");
        assert_eq!(record.expression, "return \"no\"");
        assert!(!record.valid);
    }

    #[test]
    fn call_arity_and_argument_types_are_checked() {
        let source = r#"garden G
grow add(int a, int b) -> int { blossom a + b; }
grow f() -> void {
    add(1);
    add(1, "two");
}
"#;
        let report = analyze_source(source);
        assert_eq!(report.errors.len(), 2, "errors: {:?}", report.errors);
        assert!(report.errors[0].message.contains("expects 2 argument(s)"));
        assert!(report.errors[1].message.contains("argument type mismatch"));
    }

    #[test]
    fn water_targets_must_be_assignable() {
        let report =
            analyze_source("garden G\ngrow f() -> void { int x = 1; water >> x + 1; }");
        assert_eq!(report.errors.len(), 1);
        assert!(report.errors[0].message.contains("water"));
    }

    #[test]
    fn auto_takes_the_initializer_type() {
        let report = analyze_source("garden G\ngrow f() -> void { auto x = 3.5; bloom << x; }");
        assert!(report.errors.is_empty(), "errors: {:?}", report.errors);
        let x = report.symbol_table.get("f", "x").expect("x");
        assert_eq!(x.data_type.as_deref(), Some("double"));
    }

    #[test]
    fn mixed_numeric_arithmetic_promotes_silently() {
        let report =
            analyze_source("garden G\ngrow f() -> void { double d = 1 + 2.5; bloom << d; }");
        assert!(report.errors.is_empty(), "errors: {:?}", report.errors);
        let record = &report.type_checking[0];
        assert_eq!(record.expression, "1 + 2.5");
        assert_eq!(record.actual_type, "double");
    }

    #[test]
    fn symbol_table_serializes_in_the_transport_shape() {
        let report = analyze_source(MATH_TEST);
        let json = serde_json::to_value(&report).expect("serialize");
        assert_eq!(json["symbolTable"]["global"]["MathTest"]["type"], "garden");
        assert_eq!(
            json["symbolTable"]["MathTest"]["calculate"]["returnType"],
            "int"
        );
        assert_eq!(
            json["symbolTable"]["calculate"]["a"]["dataType"],
            "int"
        );
        assert_eq!(json["typeChecking"][0]["expression"], "a = 10");
        assert_eq!(json["typeChecking"][0]["expectedType"], "int");
        assert_eq!(json["errors"], serde_json::json!([]));
    }
}
