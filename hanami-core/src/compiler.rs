//! Whole-pipeline entry points.
//!
//! The four operations (lex, parse, analyze, generate) are each
//! independently invocable, and the later ones accept either raw source
//! text or the serialized artifact of an earlier stage: a token dump in
//! the `KIND [VALUE] LINE COLUMN` format, or the AST as `type`-tagged
//! JSON. That lets external callers feed one stage's output straight
//! into the next without re-running the front end.

use crate::analysis::{AnalysisReport, analyze};
use crate::ast::Program;
use crate::codegen::{GeneratedCode, Target, generate};
use crate::error::CoreError;
use crate::lexer::{Token, TokenKind, lex};
use crate::parser::parse;

/// Lex source text and render the transport dump, one token per line.
pub fn lex_to_dump(source: &str) -> Result<String, CoreError> {
    let tokens = lex(source)?;
    Ok(tokens_to_dump(&tokens))
}

pub fn tokens_to_dump(tokens: &[Token]) -> String {
    let mut out = String::new();
    for token in tokens {
        out.push_str(&token.to_string());
        out.push('\n');
    }
    out
}

/// Reconstruct a token sequence from its textual dump.
///
/// The VALUE field is everything between the kind and the trailing
/// `LINE COLUMN` pair, preserved verbatim (string values may contain
/// spaces). A missing end-of-input token is restored, since the parser
/// relies on the stream being terminated.
pub fn tokens_from_dump(dump: &str) -> Result<Vec<Token>, CoreError> {
    let mut tokens = Vec::new();
    for (index, raw) in dump.lines().enumerate() {
        if raw.trim().is_empty() {
            continue;
        }
        let line_number = index + 1;
        let mut fields = raw.rsplitn(3, ' ');
        let column = fields.next().and_then(|f| f.parse::<u32>().ok());
        let line = fields.next().and_then(|f| f.parse::<u32>().ok());
        let head = fields.next();
        let (Some(column), Some(line), Some(head)) = (column, line, head) else {
            return Err(CoreError::TokenDump(
                line_number,
                format!("expected 'KIND [VALUE] LINE COLUMN', got '{raw}'"),
            ));
        };

        let (kind_name, value) = match head.split_once(' ') {
            Some((kind, value)) => (kind, Some(value.to_string())),
            None => (head, None),
        };
        let Some(kind) = TokenKind::from_dump_name(kind_name) else {
            return Err(CoreError::TokenDump(
                line_number,
                format!("unknown token kind '{kind_name}'"),
            ));
        };
        if kind.has_value() && value.is_none() {
            return Err(CoreError::TokenDump(
                line_number,
                format!("token kind '{kind_name}' requires a value"),
            ));
        }

        tokens.push(Token {
            kind,
            value,
            line,
            column,
        });
    }

    if tokens.last().map(|t| t.kind) != Some(TokenKind::Eof) {
        let (line, column) = tokens
            .last()
            .map(|t| (t.line, t.column + 1))
            .unwrap_or((1, 1));
        tokens.push(Token::new(TokenKind::Eof, line, column));
    }
    Ok(tokens)
}

/// Parse raw source text (lexing it first).
pub fn parse_source(source: &str) -> Result<Program, CoreError> {
    let tokens = lex(source)?;
    Ok(parse(&tokens)?)
}

/// Parse a pre-lexed token dump.
pub fn parse_dump(dump: &str) -> Result<Program, CoreError> {
    let tokens = tokens_from_dump(dump)?;
    Ok(parse(&tokens)?)
}

pub fn program_to_json(program: &Program) -> String {
    serde_json::to_string_pretty(program).expect("AST serialization cannot fail")
}

pub fn program_from_json(json: &str) -> Result<Program, CoreError> {
    Ok(serde_json::from_str(json)?)
}

/// Analyze raw source text.
pub fn analyze_source(source: &str) -> Result<AnalysisReport, CoreError> {
    Ok(analyze(&parse_source(source)?))
}

/// Analyze a pre-parsed AST supplied as JSON.
pub fn analyze_json(ast_json: &str) -> Result<AnalysisReport, CoreError> {
    Ok(analyze(&program_from_json(ast_json)?))
}

pub fn report_to_json(report: &AnalysisReport) -> String {
    serde_json::to_string_pretty(report).expect("report serialization cannot fail")
}

/// Generate code for the requested targets from raw source text.
pub fn generate_source(source: &str, targets: &[Target]) -> Result<GeneratedCode, CoreError> {
    Ok(generate(&parse_source(source)?, targets))
}

/// Generate code for the requested targets from AST JSON.
pub fn generate_json(ast_json: &str, targets: &[Target]) -> Result<GeneratedCode, CoreError> {
    Ok(generate(&program_from_json(ast_json)?, targets))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codegen::Target;

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
    fn token_dump_round_trips_exactly() {
        let tokens = lex(MATH_TEST).expect("lex");
        let dump = tokens_to_dump(&tokens);
        let restored = tokens_from_dump(&dump).expect("restore");
        assert_eq!(restored, tokens);
        // The string literal's trailing space survives the round trip.
        assert!(dump.contains("STRING Result:  "));
    }

    #[test]
    fn parsing_source_and_parsing_tokens_agree() {
        let from_source = parse_source(MATH_TEST).expect("parse source");
        let dump = lex_to_dump(MATH_TEST).expect("lex");
        let from_dump = parse_dump(&dump).expect("parse dump");
        assert_eq!(from_source, from_dump);
    }

    #[test]
    fn ast_json_round_trips_into_later_stages() {
        let program = parse_source(MATH_TEST).expect("parse");
        let json = program_to_json(&program);

        let report = analyze_json(&json).expect("analyze");
        assert!(report.errors.is_empty());

        let generated = generate_json(&json, &Target::all()).expect("generate");
        assert_eq!(generated.len(), 4);
        for result in generated.values() {
            assert!(result.is_ok());
        }
    }

    #[test]
    fn analysis_does_not_disturb_generation() {
        // `analyze` borrows the AST immutably, so generating before and
        // after it must produce identical text.
        let program = parse_source(MATH_TEST).expect("parse");
        let before = generate(&program, &Target::all());
        let report = analyze(&program);
        assert!(report.errors.is_empty());
        let after = generate(&program, &Target::all());
        assert_eq!(before, after);
    }

    #[test]
    fn malformed_dump_lines_are_rejected_with_their_line_number() {
        let err = tokens_from_dump("GARDEN 1 1\nWHATEVER 2 1\n").unwrap_err();
        match err {
            CoreError::TokenDump(line, message) => {
                assert_eq!(line, 2);
                assert!(message.contains("WHATEVER"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn dump_without_eof_is_terminated() {
        let tokens = tokens_from_dump("GARDEN 1 1\nIDENTIFIER G 1 8\n").expect("restore");
        assert_eq!(tokens.last().map(|t| t.kind), Some(TokenKind::Eof));
    }

    #[test]
    fn lex_errors_fail_the_source_entry_points() {
        let err = parse_source("garden G\nint x = \"oops;").unwrap_err();
        assert!(matches!(err, CoreError::Lex(_)));
    }
}
