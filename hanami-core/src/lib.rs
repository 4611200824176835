//! Core compiler pipeline for the Hanami language.
//!
//! The pipeline is roughly:
//!
//!   source .hanami
//!     -> lexer     (tokens)
//!     -> parser    (AST)
//!     -> analysis  (symbol table + type-checking trace + errors)
//!     -> codegen   (C++ / Python / JavaScript / Java source text)
//!
//! Every stage is a pure function of its input and independently
//! invocable: later stages accept the serialized artifact of an earlier
//! one (token dump, AST JSON) in place of source text. Higher-level
//! tools (CLI, editors, transports) should depend on this crate rather
//! than reimplementing the pipeline.

// ---------------------------------------------------------------------
// Error handling
// ---------------------------------------------------------------------

pub mod error;

// ---------------------------------------------------------------------
// Front-end: lexing and parsing
// ---------------------------------------------------------------------

pub mod lexer;
pub mod parser;
pub mod ast;

// ---------------------------------------------------------------------
// Semantic analysis
// ---------------------------------------------------------------------

pub mod types;
pub mod analysis;

// ---------------------------------------------------------------------
// Back-end: code generation and pipeline orchestration
// ---------------------------------------------------------------------

pub mod codegen;
pub mod codegen_cpp;
pub mod codegen_python;
pub mod codegen_js;
pub mod codegen_java;
pub mod compiler;

// ---------------------------------------------------------------------
// Public API re-exports
// ---------------------------------------------------------------------

pub use analysis::{AnalysisReport, analyze};
pub use ast::Program;
pub use codegen::{GeneratedCode, Target, generate};
pub use error::{CodegenError, CoreError, LexError, ParseError, SemanticError};
pub use lexer::{Token, TokenKind, lex, lex_permissive};
pub use parser::parse;
