//! Recursive-descent parser: token sequence to AST.
//!
//! Parsing is fail-fast: the first malformed construct aborts the parse
//! with an error carrying the offending token's position and an
//! expectation message. Partial trees are never returned, since the
//! downstream stages cannot use them.

use crate::ast::{
    Block, ClassDecl, Decl, Expr, ExprKind, FunctionDecl, IfArm, LiteralValue, Namespace,
    Parameter, Program, Stmt, VarDecl, Visibility, VisibilitySection,
};
use crate::error::{ParseError, ParseErrorKind};
use crate::lexer::{Token, TokenKind, spelling};

/// Parse a token sequence (as produced by `lexer::lex`) into a program.
pub fn parse(tokens: &[Token]) -> Result<Program, ParseError> {
    let mut parser = Parser {
        tokens,
        position: 0,
    };
    parser.parse_program()
}

struct Parser<'t> {
    tokens: &'t [Token],
    position: usize,
}

impl<'t> Parser<'t> {
    // ------------------------------------------------------------------
    // Token cursor
    // ------------------------------------------------------------------

    fn peek(&self) -> &Token {
        self.tokens
            .get(self.position)
            .unwrap_or_else(|| self.tokens.last().expect("token stream ends with EOF"))
    }

    fn peek_kind(&self) -> TokenKind {
        self.peek().kind
    }

    fn peek_next_kind(&self) -> TokenKind {
        self.tokens
            .get(self.position + 1)
            .map(|t| t.kind)
            .unwrap_or(TokenKind::Eof)
    }

    fn advance(&mut self) -> &Token {
        let token = self
            .tokens
            .get(self.position)
            .unwrap_or_else(|| self.tokens.last().expect("token stream ends with EOF"));
        if token.kind != TokenKind::Eof {
            self.position += 1;
        }
        token
    }

    fn check(&mut self, kind: TokenKind) -> bool {
        if self.peek_kind() == kind {
            self.advance();
            true
        } else {
            false
        }
    }

    fn expect(&mut self, kind: TokenKind, expectation: &str) -> Result<&Token, ParseError> {
        if self.peek_kind() == kind {
            Ok(self.advance())
        } else {
            Err(self.unexpected(expectation))
        }
    }

    fn unexpected(&self, expectation: &str) -> ParseError {
        let token = self.peek();
        if token.kind == TokenKind::Eof {
            ParseError::new(
                ParseErrorKind::UnexpectedEof,
                format!("{expectation}, found end of input"),
                token.line,
                token.column,
            )
        } else {
            ParseError::new(
                ParseErrorKind::UnexpectedToken,
                format!("{expectation}, found '{}'", token.text()),
                token.line,
                token.column,
            )
        }
    }

    fn unclosed(&self, construct: &str) -> ParseError {
        let token = self.peek();
        ParseError::new(
            ParseErrorKind::UnexpectedEof,
            format!("unexpected end of input: {construct} is missing its closing '}}'"),
            token.line,
            token.column,
        )
    }

    // ------------------------------------------------------------------
    // Program structure
    // ------------------------------------------------------------------

    fn parse_program(&mut self) -> Result<Program, ParseError> {
        let mut includes = Vec::new();
        while self.peek_kind() == TokenKind::StyleInclude {
            let token = self.advance();
            includes.push(token.value.clone().unwrap_or_default());
        }

        self.expect(TokenKind::Garden, "expected 'garden' declaration")?;
        let name = self
            .expect(TokenKind::Identifier, "expected garden name")?
            .value
            .clone()
            .unwrap_or_default();

        // The usual form is brace-less: declarations run to end of input.
        // A braced garden body is accepted too.
        let mut declarations = Vec::new();
        if self.check(TokenKind::LeftBrace) {
            while self.peek_kind() != TokenKind::RightBrace {
                if self.peek_kind() == TokenKind::Eof {
                    return Err(self.unclosed(&format!("garden '{name}'")));
                }
                declarations.push(self.parse_declaration()?);
            }
            self.advance(); // '}'
        } else {
            while self.peek_kind() != TokenKind::Eof {
                declarations.push(self.parse_declaration()?);
            }
        }

        self.expect(TokenKind::Eof, "expected end of input after garden")?;
        Ok(Program {
            garden: Namespace {
                name,
                includes,
                declarations,
            },
        })
    }

    fn parse_declaration(&mut self) -> Result<Decl, ParseError> {
        match self.peek_kind() {
            TokenKind::Species => self.parse_species().map(Decl::ClassDecl),
            TokenKind::Grow => self.parse_function().map(Decl::FunctionDecl),
            kind if kind.is_type_name() => self.parse_var_decl().map(Decl::VariableDeclaration),
            TokenKind::Identifier if self.peek_next_kind() == TokenKind::Identifier => {
                self.parse_var_decl().map(Decl::VariableDeclaration)
            }
            _ => Err(self.unexpected("expected 'species', 'grow', or a variable declaration")),
        }
    }

    fn parse_species(&mut self) -> Result<ClassDecl, ParseError> {
        let keyword = self.advance();
        let (line, column) = (keyword.line, keyword.column);
        let name = self
            .expect(TokenKind::Identifier, "expected species name")?
            .value
            .clone()
            .unwrap_or_default();
        self.expect(TokenKind::LeftBrace, "expected '{' after species name")?;

        let mut sections: Vec<VisibilitySection> = Vec::new();
        loop {
            match self.peek_kind() {
                TokenKind::RightBrace => {
                    self.advance();
                    break;
                }
                TokenKind::Eof => return Err(self.unclosed(&format!("species '{name}'"))),
                TokenKind::Open | TokenKind::Hidden | TokenKind::Guarded => {
                    let visibility = match self.advance().kind {
                        TokenKind::Open => Visibility::Open,
                        TokenKind::Hidden => Visibility::Hidden,
                        _ => Visibility::Guarded,
                    };
                    self.expect(TokenKind::Colon, "expected ':' after visibility keyword")?;
                    sections.push(VisibilitySection {
                        visibility,
                        members: Vec::new(),
                    });
                }
                _ => {
                    let member = match self.peek_kind() {
                        TokenKind::Grow => self.parse_function().map(Decl::FunctionDecl)?,
                        kind if kind.is_type_name() => {
                            self.parse_var_decl().map(Decl::VariableDeclaration)?
                        }
                        TokenKind::Identifier
                            if self.peek_next_kind() == TokenKind::Identifier =>
                        {
                            self.parse_var_decl().map(Decl::VariableDeclaration)?
                        }
                        _ => {
                            return Err(self.unexpected(
                                "expected 'open:', 'hidden:', 'guarded:', or a species member",
                            ));
                        }
                    };
                    match sections.last_mut() {
                        Some(section) => section.members.push(member),
                        None => {
                            return Err(self.unexpected(
                                "expected a visibility section before the first species member",
                            ));
                        }
                    }
                }
            }
        }

        Ok(ClassDecl {
            name,
            sections,
            line,
            column,
        })
    }

    fn parse_function(&mut self) -> Result<FunctionDecl, ParseError> {
        let keyword = self.advance();
        let (line, column) = (keyword.line, keyword.column);
        let name = self
            .expect(TokenKind::Identifier, "expected function name after 'grow'")?
            .value
            .clone()
            .unwrap_or_default();
        self.expect(TokenKind::LeftParen, "expected '(' after function name")?;

        let mut parameters = Vec::new();
        if self.peek_kind() != TokenKind::RightParen {
            loop {
                let (data_type, _, _) = self.parse_type_name("expected parameter type")?;
                let param_name = self
                    .expect(TokenKind::Identifier, "expected parameter name")?
                    .value
                    .clone()
                    .unwrap_or_default();
                parameters.push(Parameter {
                    data_type,
                    name: param_name,
                });
                if !self.check(TokenKind::Comma) {
                    break;
                }
            }
        }
        self.expect(TokenKind::RightParen, "expected ')' after parameter list")?;
        self.expect(TokenKind::Arrow, "expected '->' before return type")?;
        let (return_type, _, _) = self.parse_type_name("expected return type after '->'")?;
        let body = self.parse_block(&format!("function '{name}'"))?;

        Ok(FunctionDecl {
            name,
            return_type,
            parameters,
            body,
            line,
            column,
        })
    }

    fn parse_type_name(&mut self, expectation: &str) -> Result<(String, u32, u32), ParseError> {
        let token = self.peek();
        let (line, column) = (token.line, token.column);
        if token.kind.is_type_name() {
            let name = spelling(token.kind).to_string();
            self.advance();
            Ok((name, line, column))
        } else if token.kind == TokenKind::Identifier {
            let name = token.value.clone().unwrap_or_default();
            self.advance();
            Ok((name, line, column))
        } else {
            Err(self.unexpected(expectation))
        }
    }

    fn parse_var_decl(&mut self) -> Result<VarDecl, ParseError> {
        let (data_type, line, column) = self.parse_type_name("expected type name")?;
        let name = self
            .expect(TokenKind::Identifier, "expected variable name")?
            .value
            .clone()
            .unwrap_or_default();
        let initializer = if self.check(TokenKind::Assign) {
            Some(self.parse_expression()?)
        } else {
            None
        };
        self.expect(
            TokenKind::Semicolon,
            "expected ';' after variable declaration",
        )?;
        Ok(VarDecl {
            data_type,
            name,
            initializer,
            line,
            column,
        })
    }

    // ------------------------------------------------------------------
    // Statements
    // ------------------------------------------------------------------

    fn parse_block(&mut self, construct: &str) -> Result<Block, ParseError> {
        self.expect(TokenKind::LeftBrace, "expected '{'")?;
        let mut statements = Vec::new();
        loop {
            match self.peek_kind() {
                TokenKind::RightBrace => {
                    self.advance();
                    return Ok(Block { statements });
                }
                TokenKind::Eof => return Err(self.unclosed(construct)),
                _ => statements.push(self.parse_statement()?),
            }
        }
    }

    fn parse_statement(&mut self) -> Result<Stmt, ParseError> {
        match self.peek_kind() {
            kind if kind.is_type_name() => self.parse_var_decl().map(Stmt::VariableDeclaration),
            TokenKind::Identifier if self.peek_next_kind() == TokenKind::Identifier => {
                self.parse_var_decl().map(Stmt::VariableDeclaration)
            }
            TokenKind::Bloom => self.parse_output(),
            TokenKind::Water => self.parse_input(),
            TokenKind::Blossom => self.parse_return(),
            TokenKind::Branch => self.parse_branch(),
            TokenKind::While => self.parse_while(),
            _ => {
                let expression = self.parse_expression()?;
                self.expect(TokenKind::Semicolon, "expected ';' after expression")?;
                Ok(Stmt::ExpressionStatement { expression })
            }
        }
    }

    fn parse_output(&mut self) -> Result<Stmt, ParseError> {
        self.advance(); // 'bloom'
        self.expect(TokenKind::StreamOut, "expected '<<' after 'bloom'")?;
        let mut expressions = vec![self.parse_expression()?];
        while self.check(TokenKind::StreamOut) {
            expressions.push(self.parse_expression()?);
        }
        self.expect(TokenKind::Semicolon, "expected ';' after output statement")?;
        Ok(Stmt::OutputStatement { expressions })
    }

    fn parse_input(&mut self) -> Result<Stmt, ParseError> {
        self.advance(); // 'water'
        self.expect(TokenKind::StreamIn, "expected '>>' after 'water'")?;
        let mut targets = vec![self.parse_expression()?];
        while self.check(TokenKind::StreamIn) {
            targets.push(self.parse_expression()?);
        }
        self.expect(TokenKind::Semicolon, "expected ';' after input statement")?;
        Ok(Stmt::InputStatement { targets })
    }

    fn parse_return(&mut self) -> Result<Stmt, ParseError> {
        let keyword = self.advance();
        let (line, column) = (keyword.line, keyword.column);
        let expression = if self.peek_kind() == TokenKind::Semicolon {
            None
        } else {
            Some(self.parse_expression()?)
        };
        self.expect(TokenKind::Semicolon, "expected ';' after 'blossom'")?;
        Ok(Stmt::ReturnStatement {
            expression,
            line,
            column,
        })
    }

    fn parse_branch(&mut self) -> Result<Stmt, ParseError> {
        let mut arms = Vec::new();
        self.advance(); // 'branch'
        arms.push(self.parse_branch_arm()?);

        while self.peek_kind() == TokenKind::Else {
            if self.peek_next_kind() == TokenKind::Branch {
                self.advance(); // 'else'
                self.advance(); // 'branch'
                arms.push(self.parse_branch_arm()?);
            } else {
                self.advance(); // 'else'
                let body = self.parse_block("'else' arm")?;
                arms.push(IfArm {
                    condition: None,
                    body,
                });
                break;
            }
        }
        Ok(Stmt::IfStatement { arms })
    }

    fn parse_branch_arm(&mut self) -> Result<IfArm, ParseError> {
        self.expect(TokenKind::LeftParen, "expected '(' after 'branch'")?;
        let condition = self.parse_expression()?;
        self.expect(TokenKind::RightParen, "expected ')' after branch condition")?;
        let body = self.parse_block("'branch' arm")?;
        Ok(IfArm {
            condition: Some(condition),
            body,
        })
    }

    fn parse_while(&mut self) -> Result<Stmt, ParseError> {
        self.advance(); // 'while'
        self.expect(TokenKind::LeftParen, "expected '(' after 'while'")?;
        let condition = self.parse_expression()?;
        self.expect(TokenKind::RightParen, "expected ')' after while condition")?;
        let body = self.parse_block("'while' body")?;
        Ok(Stmt::WhileStatement { condition, body })
    }

    // ------------------------------------------------------------------
    // Expressions, lowest precedence first
    // ------------------------------------------------------------------

    fn parse_expression(&mut self) -> Result<Expr, ParseError> {
        self.parse_assignment()
    }

    fn parse_assignment(&mut self) -> Result<Expr, ParseError> {
        let target = self.parse_binary(0)?;
        let operator = match self.peek_kind() {
            TokenKind::Assign
            | TokenKind::PlusAssign
            | TokenKind::MinusAssign
            | TokenKind::StarAssign
            | TokenKind::SlashAssign
            | TokenKind::PercentAssign => spelling(self.advance().kind).to_string(),
            _ => return Ok(target),
        };
        // Right-associative: `a = b = 1` assigns b first.
        let value = self.parse_assignment()?;
        let (line, column) = (target.line, target.column);
        Ok(Expr::new(
            ExprKind::Assignment {
                operator,
                target: Box::new(target),
                value: Box::new(value),
            },
            line,
            column,
        ))
    }

    /// Precedence climbing over the binary tiers: logical-or, logical-and,
    /// equality, relational, additive, multiplicative.
    fn parse_binary(&mut self, min_tier: usize) -> Result<Expr, ParseError> {
        const TIERS: &[&[TokenKind]] = &[
            &[TokenKind::OrOr],
            &[TokenKind::AndAnd],
            &[TokenKind::EqualEqual, TokenKind::NotEqual],
            &[
                TokenKind::Less,
                TokenKind::LessEqual,
                TokenKind::Greater,
                TokenKind::GreaterEqual,
            ],
            &[TokenKind::Plus, TokenKind::Minus],
            &[TokenKind::Star, TokenKind::Slash, TokenKind::Percent],
        ];

        if min_tier >= TIERS.len() {
            return self.parse_unary();
        }

        let mut left = self.parse_binary(min_tier + 1)?;
        while TIERS[min_tier].contains(&self.peek_kind()) {
            let operator = spelling(self.advance().kind).to_string();
            let right = self.parse_binary(min_tier + 1)?;
            let (line, column) = (left.line, left.column);
            left = Expr::new(
                ExprKind::BinaryExpression {
                    operator,
                    left: Box::new(left),
                    right: Box::new(right),
                },
                line,
                column,
            );
        }
        Ok(left)
    }

    fn parse_unary(&mut self) -> Result<Expr, ParseError> {
        match self.peek_kind() {
            TokenKind::Not | TokenKind::Minus | TokenKind::Plus
            | TokenKind::Increment | TokenKind::Decrement => {
                let token = self.advance();
                let (line, column) = (token.line, token.column);
                let operator = spelling(token.kind).to_string();
                let operand = self.parse_unary()?;
                Ok(Expr::new(
                    ExprKind::UnaryExpression {
                        operator,
                        prefix: true,
                        operand: Box::new(operand),
                    },
                    line,
                    column,
                ))
            }
            _ => self.parse_postfix(),
        }
    }

    fn parse_postfix(&mut self) -> Result<Expr, ParseError> {
        let mut expr = self.parse_primary()?;
        loop {
            match self.peek_kind() {
                TokenKind::LeftParen => {
                    self.advance();
                    let mut arguments = Vec::new();
                    if self.peek_kind() != TokenKind::RightParen {
                        loop {
                            arguments.push(self.parse_expression()?);
                            if !self.check(TokenKind::Comma) {
                                break;
                            }
                        }
                    }
                    self.expect(TokenKind::RightParen, "expected ')' after arguments")?;
                    let (line, column) = (expr.line, expr.column);
                    expr = Expr::new(
                        ExprKind::Call {
                            callee: Box::new(expr),
                            arguments,
                        },
                        line,
                        column,
                    );
                }
                TokenKind::Dot => {
                    self.advance();
                    let member = self
                        .expect(TokenKind::Identifier, "expected member name after '.'")?
                        .value
                        .clone()
                        .unwrap_or_default();
                    let (line, column) = (expr.line, expr.column);
                    expr = Expr::new(
                        ExprKind::MemberAccess {
                            object: Box::new(expr),
                            member,
                        },
                        line,
                        column,
                    );
                }
                TokenKind::Increment | TokenKind::Decrement => {
                    let operator = spelling(self.advance().kind).to_string();
                    let (line, column) = (expr.line, expr.column);
                    expr = Expr::new(
                        ExprKind::UnaryExpression {
                            operator,
                            prefix: false,
                            operand: Box::new(expr),
                        },
                        line,
                        column,
                    );
                }
                _ => return Ok(expr),
            }
        }
    }

    fn parse_primary(&mut self) -> Result<Expr, ParseError> {
        let token = self.peek().clone();
        let (line, column) = (token.line, token.column);
        match token.kind {
            TokenKind::Number => {
                self.advance();
                let text = token.value.as_deref().unwrap_or_default();
                let value: i64 = text.parse().map_err(|_| {
                    ParseError::new(
                        ParseErrorKind::UnexpectedToken,
                        format!("integer literal '{text}' is out of range"),
                        line,
                        column,
                    )
                })?;
                Ok(Expr::new(
                    ExprKind::Literal {
                        value: LiteralValue::Int(value),
                    },
                    line,
                    column,
                ))
            }
            TokenKind::DoubleLiteral => {
                self.advance();
                let text = token.value.as_deref().unwrap_or_default();
                let value: f64 = text.parse().unwrap_or(0.0);
                Ok(Expr::new(
                    ExprKind::Literal {
                        value: LiteralValue::Float(value),
                    },
                    line,
                    column,
                ))
            }
            TokenKind::Str => {
                self.advance();
                Ok(Expr::new(
                    ExprKind::Literal {
                        value: LiteralValue::Str(token.value.clone().unwrap_or_default()),
                    },
                    line,
                    column,
                ))
            }
            TokenKind::True | TokenKind::False => {
                self.advance();
                Ok(Expr::new(
                    ExprKind::Literal {
                        value: LiteralValue::Bool(token.kind == TokenKind::True),
                    },
                    line,
                    column,
                ))
            }
            TokenKind::Null => {
                self.advance();
                Ok(Expr::new(
                    ExprKind::Literal {
                        value: LiteralValue::Null,
                    },
                    line,
                    column,
                ))
            }
            TokenKind::Identifier => {
                self.advance();
                Ok(Expr::new(
                    ExprKind::Identifier {
                        name: token.value.clone().unwrap_or_default(),
                    },
                    line,
                    column,
                ))
            }
            TokenKind::LeftParen => {
                self.advance();
                let expr = self.parse_expression()?;
                self.expect(TokenKind::RightParen, "expected ')' after expression")?;
                // The grouping resets precedence; the inner node is enough.
                Ok(expr)
            }
            _ => Err(self.unexpected("expected expression")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexer::lex;

    const MATH_TEST: &str = r#"garden MathTest

grow calculate() -> int {
    int a = 10;
    int b = 5 * (a - 3);
    int c = (a + b) % 8;
    bloom << "Result: " << c;
    blossom c;
}
"#;

    fn parse_source(source: &str) -> Result<Program, ParseError> {
        parse(&lex(source).expect("lex"))
    }

    #[test]
    fn parses_the_math_test_program() {
        let program = parse_source(MATH_TEST).expect("parse");
        assert_eq!(program.garden.name, "MathTest");
        assert_eq!(program.garden.declarations.len(), 1);

        let Decl::FunctionDecl(function) = &program.garden.declarations[0] else {
            panic!("expected a function declaration");
        };
        assert_eq!(function.name, "calculate");
        assert_eq!(function.return_type, "int");
        assert!(function.parameters.is_empty());

        let statements = &function.body.statements;
        assert_eq!(statements.len(), 5);
        assert!(matches!(statements[0], Stmt::VariableDeclaration(_)));
        assert!(matches!(statements[1], Stmt::VariableDeclaration(_)));
        assert!(matches!(statements[2], Stmt::VariableDeclaration(_)));
        assert!(matches!(statements[3], Stmt::OutputStatement { .. }));
        assert!(matches!(statements[4], Stmt::ReturnStatement { .. }));
    }

    #[test]
    fn binary_operators_keep_their_spelling_and_precedence() {
        let program = parse_source("garden G\nint x = 1 + 2 * 3;").expect("parse");
        let Decl::VariableDeclaration(decl) = &program.garden.declarations[0] else {
            panic!("expected a variable declaration");
        };
        let init = decl.initializer.as_ref().expect("initializer");
        let ExprKind::BinaryExpression {
            operator, right, ..
        } = &init.kind
        else {
            panic!("expected binary expression");
        };
        assert_eq!(operator, "+");
        assert!(matches!(
            right.kind,
            ExprKind::BinaryExpression { ref operator, .. } if operator == "*"
        ));
    }

    #[test]
    fn assignment_is_right_associative() {
        let program = parse_source("garden G\ngrow f() -> void { a = b = 1; }").expect("parse");
        let Decl::FunctionDecl(function) = &program.garden.declarations[0] else {
            panic!("expected function");
        };
        let Stmt::ExpressionStatement { expression } = &function.body.statements[0] else {
            panic!("expected expression statement");
        };
        let ExprKind::Assignment { value, .. } = &expression.kind else {
            panic!("expected assignment");
        };
        assert!(matches!(value.kind, ExprKind::Assignment { .. }));
    }

    #[test]
    fn branch_chain_builds_one_arm_per_clause() {
        let source = r#"garden G
grow f(int x) -> void {
    branch (x < 0) { bloom << "neg"; }
    else branch (x == 0) { bloom << "zero"; }
    else { bloom << "pos"; }
}
"#;
        let program = parse_source(source).expect("parse");
        let Decl::FunctionDecl(function) = &program.garden.declarations[0] else {
            panic!("expected function");
        };
        let Stmt::IfStatement { arms } = &function.body.statements[0] else {
            panic!("expected branch statement");
        };
        assert_eq!(arms.len(), 3);
        assert!(arms[0].condition.is_some());
        assert!(arms[1].condition.is_some());
        assert!(arms[2].condition.is_none());
    }

    #[test]
    fn species_sections_group_members_by_visibility() {
        let source = r#"garden G
species Rose {
open:
    grow sayHello() -> void { bloom << "hi"; }
hidden:
    int secretNumber = 42;
}
"#;
        let program = parse_source(source).expect("parse");
        let Decl::ClassDecl(species) = &program.garden.declarations[0] else {
            panic!("expected species");
        };
        assert_eq!(species.name, "Rose");
        assert_eq!(species.sections.len(), 2);
        assert_eq!(species.sections[0].visibility, Visibility::Open);
        assert_eq!(species.sections[1].visibility, Visibility::Hidden);
        assert_eq!(species.sections[1].members.len(), 1);
    }

    #[test]
    fn missing_closing_brace_names_the_open_construct() {
        let err = parse_source("garden G\ngrow f() -> int { blossom 1;").unwrap_err();
        assert_eq!(err.kind, ParseErrorKind::UnexpectedEof);
        assert!(err.message.contains("function 'f'"), "{}", err.message);
    }

    #[test]
    fn missing_paren_reports_position_and_expectation() {
        let err = parse_source("garden G\nint x = (1 + 2;").unwrap_err();
        assert_eq!(err.kind, ParseErrorKind::UnexpectedToken);
        assert!(err.message.contains("expected ')' after expression"));
        assert_eq!(err.line, 2);
    }

    #[test]
    fn first_error_aborts_the_parse() {
        // Both statements are malformed; only the first is reported.
        let err = parse_source("garden G\ngrow f() -> int { int = 1; int = 2; }").unwrap_err();
        assert!(err.message.contains("expected variable name"));
        assert_eq!(err.line, 2);
    }

    #[test]
    fn species_typed_locals_parse_as_declarations() {
        let source = "garden G\ngrow f() -> void { Rose g; g.sayHello(); }";
        let program = parse_source(source).expect("parse");
        let Decl::FunctionDecl(function) = &program.garden.declarations[0] else {
            panic!("expected function");
        };
        assert!(matches!(
            &function.body.statements[0],
            Stmt::VariableDeclaration(decl) if decl.data_type == "Rose"
        ));
        let Stmt::ExpressionStatement { expression } = &function.body.statements[1] else {
            panic!("expected expression statement");
        };
        let ExprKind::Call { callee, .. } = &expression.kind else {
            panic!("expected call");
        };
        assert!(matches!(callee.kind, ExprKind::MemberAccess { .. }));
    }

    #[test]
    fn style_includes_are_collected_before_the_garden() {
        let program =
            parse_source("style <garden_math>\nstyle \"pots\"\ngarden G\n").expect("parse");
        assert_eq!(program.garden.includes, vec!["garden_math", "pots"]);
    }

    #[test]
    fn input_statement_chains_targets() {
        let program =
            parse_source("garden G\ngrow f() -> void { water >> a >> b; }").expect("parse");
        let Decl::FunctionDecl(function) = &program.garden.declarations[0] else {
            panic!("expected function");
        };
        let Stmt::InputStatement { targets } = &function.body.statements[0] else {
            panic!("expected input statement");
        };
        assert_eq!(targets.len(), 2);
    }
}
