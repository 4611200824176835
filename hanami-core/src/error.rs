use serde::Serialize;
use thiserror::Error;

/// Lexical errors are fail-fast: `lexer::lex` stops at the first one.
/// Every variant carries the position of the offending text so a caller
/// can highlight it without re-scanning.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LexError {
    #[error("unterminated string literal at line {line}, column {column}")]
    UnterminatedString { line: u32, column: u32 },
    #[error("malformed number '{lexeme}' at line {line}, column {column}")]
    MalformedNumber {
        lexeme: String,
        line: u32,
        column: u32,
    },
    #[error("unterminated block comment at line {line}, column {column}")]
    UnterminatedComment { line: u32, column: u32 },
    #[error("unexpected character '{ch}' at line {line}, column {column}")]
    UnexpectedCharacter { ch: char, line: u32, column: u32 },
}

impl LexError {
    pub fn position(&self) -> (u32, u32) {
        match *self {
            LexError::UnterminatedString { line, column }
            | LexError::MalformedNumber { line, column, .. }
            | LexError::UnterminatedComment { line, column }
            | LexError::UnexpectedCharacter { line, column, .. } => (line, column),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ParseErrorKind {
    UnexpectedToken,
    UnexpectedEof,
    MissingDelimiter,
}

/// A parse error aborts the parse; partial ASTs are not produced.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message} at line {line}, column {column}")]
pub struct ParseError {
    pub kind: ParseErrorKind,
    pub message: String,
    pub line: u32,
    pub column: u32,
}

impl ParseError {
    pub fn new(kind: ParseErrorKind, message: impl Into<String>, line: u32, column: u32) -> Self {
        ParseError {
            kind,
            message: message.into(),
            line,
            column,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum SemanticErrorKind {
    DuplicateSymbol,
    UndeclaredIdentifier,
    TypeMismatch,
    AccessViolation,
}

/// Semantic errors are accumulated, never fail-fast: one analysis pass
/// reports every problem it can find. Serialized into the `errors`
/// array of the analysis report.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize)]
#[error("{message} at line {line}, column {column}")]
pub struct SemanticError {
    pub kind: SemanticErrorKind,
    pub message: String,
    pub line: u32,
    pub column: u32,
}

impl SemanticError {
    pub fn new(
        kind: SemanticErrorKind,
        message: impl Into<String>,
        line: u32,
        column: u32,
    ) -> Self {
        SemanticError {
            kind,
            message: message.into(),
            line,
            column,
        }
    }
}

/// Code-generation errors are isolated per target; one backend failing
/// never suppresses the output of the others.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CodegenError {
    #[error("construct not supported by the {target} backend: {construct}")]
    Unsupported {
        target: &'static str,
        construct: String,
    },
}

/// The high-level error type used by the CLI and by callers that drive
/// whole-pipeline operations.
#[derive(Debug, Error)]
pub enum CoreError {
    #[error("failed to read source: {0}")]
    SourceIo(#[from] std::io::Error),
    #[error(transparent)]
    Lex(#[from] LexError),
    #[error(transparent)]
    Parse(#[from] ParseError),
    #[error("invalid AST input: {0}")]
    AstJson(#[from] serde_json::Error),
    #[error("malformed token dump on line {0}: {1}")]
    TokenDump(usize, String),
    #[error("unknown target language: {0}")]
    UnknownTarget(String),
}
