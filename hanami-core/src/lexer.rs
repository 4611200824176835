//! Scanner for Hanami source text.
//!
//! A single left-to-right pass over the source bytes, tracking line and
//! column (tabs count as one column). Multi-character operators are
//! matched greedily before their single-character prefixes. Comments and
//! whitespace never produce tokens; the stream always ends with exactly
//! one `EOF_TOKEN`.

use crate::error::LexError;

/// Kind of a token produced by the scanner.
///
/// This is a closed set: keywords, type names, literals, identifiers,
/// operators, delimiters, and end-of-input. The scanner attaches no
/// meaning beyond classification; higher layers interpret the kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    // Hanami keywords
    Garden,
    Species,
    Open,
    Hidden,
    Guarded,
    Grow,
    Blossom,
    Bloom,
    Water,
    Branch,
    Else,
    While,

    // Type-name keywords
    IntType,
    FloatType,
    DoubleType,
    StringType,
    BoolType,
    CharType,
    VoidType,
    Auto,

    // Literals and identifiers
    Number,
    DoubleLiteral,
    Str,
    True,
    False,
    Null,
    Identifier,

    // Operators
    Plus,
    Minus,
    Star,
    Slash,
    Percent,
    Assign,
    PlusAssign,
    MinusAssign,
    StarAssign,
    SlashAssign,
    PercentAssign,
    Increment,
    Decrement,
    EqualEqual,
    NotEqual,
    Less,
    LessEqual,
    Greater,
    GreaterEqual,
    AndAnd,
    OrOr,
    Not,
    StreamOut,
    StreamIn,
    Arrow,
    ScopeResolution,

    // Delimiters
    LeftParen,
    RightParen,
    LeftBrace,
    RightBrace,
    LeftBracket,
    RightBracket,
    Comma,
    Dot,
    Colon,
    Semicolon,

    // `style <path>` / `style "path"` include directive; the path is the
    // token's value.
    StyleInclude,

    Eof,
}

/// Transport names, one entry per kind. Shared by `Display` and by the
/// token-dump reader in `compiler`.
const DUMP_NAMES: &[(TokenKind, &str)] = &[
    (TokenKind::Garden, "GARDEN"),
    (TokenKind::Species, "SPECIES"),
    (TokenKind::Open, "OPEN"),
    (TokenKind::Hidden, "HIDDEN"),
    (TokenKind::Guarded, "GUARDED"),
    (TokenKind::Grow, "GROW"),
    (TokenKind::Blossom, "BLOSSOM"),
    (TokenKind::Bloom, "BLOOM"),
    (TokenKind::Water, "WATER"),
    (TokenKind::Branch, "BRANCH"),
    (TokenKind::Else, "ELSE"),
    (TokenKind::While, "WHILE"),
    (TokenKind::IntType, "INT_TYPE"),
    (TokenKind::FloatType, "FLOAT_TYPE"),
    (TokenKind::DoubleType, "DOUBLE_TYPE"),
    (TokenKind::StringType, "STRING_TYPE"),
    (TokenKind::BoolType, "BOOL_TYPE"),
    (TokenKind::CharType, "CHAR_TYPE"),
    (TokenKind::VoidType, "VOID_TYPE"),
    (TokenKind::Auto, "AUTO"),
    (TokenKind::Number, "NUMBER"),
    (TokenKind::DoubleLiteral, "DOUBLE_LITERAL"),
    (TokenKind::Str, "STRING"),
    (TokenKind::True, "TRUE"),
    (TokenKind::False, "FALSE"),
    (TokenKind::Null, "NULL"),
    (TokenKind::Identifier, "IDENTIFIER"),
    (TokenKind::Plus, "PLUS"),
    (TokenKind::Minus, "MINUS"),
    (TokenKind::Star, "STAR"),
    (TokenKind::Slash, "SLASH"),
    (TokenKind::Percent, "MODULO"),
    (TokenKind::Assign, "ASSIGN"),
    (TokenKind::PlusAssign, "PLUS_ASSIGN"),
    (TokenKind::MinusAssign, "MINUS_ASSIGN"),
    (TokenKind::StarAssign, "STAR_ASSIGN"),
    (TokenKind::SlashAssign, "SLASH_ASSIGN"),
    (TokenKind::PercentAssign, "MODULO_ASSIGN"),
    (TokenKind::Increment, "INCREMENT"),
    (TokenKind::Decrement, "DECREMENT"),
    (TokenKind::EqualEqual, "EQUAL"),
    (TokenKind::NotEqual, "NOT_EQUAL"),
    (TokenKind::Less, "LESS"),
    (TokenKind::LessEqual, "LESS_EQUAL"),
    (TokenKind::Greater, "GREATER"),
    (TokenKind::GreaterEqual, "GREATER_EQUAL"),
    (TokenKind::AndAnd, "AND"),
    (TokenKind::OrOr, "OR"),
    (TokenKind::Not, "NOT"),
    (TokenKind::StreamOut, "STREAM_OUT"),
    (TokenKind::StreamIn, "STREAM_IN"),
    (TokenKind::Arrow, "ARROW"),
    (TokenKind::ScopeResolution, "SCOPE_RESOLUTION"),
    (TokenKind::LeftParen, "LEFT_PAREN"),
    (TokenKind::RightParen, "RIGHT_PAREN"),
    (TokenKind::LeftBrace, "LEFT_BRACE"),
    (TokenKind::RightBrace, "RIGHT_BRACE"),
    (TokenKind::LeftBracket, "LEFT_BRACKET"),
    (TokenKind::RightBracket, "RIGHT_BRACKET"),
    (TokenKind::Comma, "COMMA"),
    (TokenKind::Dot, "DOT"),
    (TokenKind::Colon, "COLON"),
    (TokenKind::Semicolon, "SEMICOLON"),
    (TokenKind::StyleInclude, "STYLE_INCLUDE"),
    (TokenKind::Eof, "EOF_TOKEN"),
];

impl TokenKind {
    pub fn dump_name(self) -> &'static str {
        DUMP_NAMES
            .iter()
            .find(|(kind, _)| *kind == self)
            .map(|(_, name)| *name)
            .expect("every kind has a dump name")
    }

    pub fn from_dump_name(name: &str) -> Option<TokenKind> {
        DUMP_NAMES
            .iter()
            .find(|(_, n)| *n == name)
            .map(|(kind, _)| *kind)
    }

    /// True for the kinds whose textual form carries a VALUE field.
    pub fn has_value(self) -> bool {
        matches!(
            self,
            TokenKind::Number
                | TokenKind::DoubleLiteral
                | TokenKind::Str
                | TokenKind::Identifier
                | TokenKind::StyleInclude
        )
    }

    /// True for `int`, `float`, `double`, `string`, `bool`, `char`,
    /// `void`, and `auto`.
    pub fn is_type_name(self) -> bool {
        matches!(
            self,
            TokenKind::IntType
                | TokenKind::FloatType
                | TokenKind::DoubleType
                | TokenKind::StringType
                | TokenKind::BoolType
                | TokenKind::CharType
                | TokenKind::VoidType
                | TokenKind::Auto
        )
    }
}

/// A single token with its source position (1-based line and column).
///
/// `value` is populated only for literals, identifiers, and style
/// includes; for all other kinds the kind itself is the full content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub value: Option<String>,
    pub line: u32,
    pub column: u32,
}

impl Token {
    pub fn new(kind: TokenKind, line: u32, column: u32) -> Self {
        Token {
            kind,
            value: None,
            line,
            column,
        }
    }

    pub fn with_value(kind: TokenKind, value: impl Into<String>, line: u32, column: u32) -> Self {
        Token {
            kind,
            value: Some(value.into()),
            line,
            column,
        }
    }

    pub fn text(&self) -> &str {
        self.value.as_deref().unwrap_or_else(|| spelling(self.kind))
    }
}

/// Transport format: `KIND [VALUE] LINE COLUMN`, one token per line.
impl std::fmt::Display for Token {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.value {
            Some(value) => write!(
                f,
                "{} {} {} {}",
                self.kind.dump_name(),
                value,
                self.line,
                self.column
            ),
            None => write!(f, "{} {} {}", self.kind.dump_name(), self.line, self.column),
        }
    }
}

/// Source spelling of value-less kinds, used when reconstructing
/// expression text for the type-checking trace.
pub fn spelling(kind: TokenKind) -> &'static str {
    match kind {
        TokenKind::Garden => "garden",
        TokenKind::Species => "species",
        TokenKind::Open => "open",
        TokenKind::Hidden => "hidden",
        TokenKind::Guarded => "guarded",
        TokenKind::Grow => "grow",
        TokenKind::Blossom => "blossom",
        TokenKind::Bloom => "bloom",
        TokenKind::Water => "water",
        TokenKind::Branch => "branch",
        TokenKind::Else => "else",
        TokenKind::While => "while",
        TokenKind::IntType => "int",
        TokenKind::FloatType => "float",
        TokenKind::DoubleType => "double",
        TokenKind::StringType => "string",
        TokenKind::BoolType => "bool",
        TokenKind::CharType => "char",
        TokenKind::VoidType => "void",
        TokenKind::Auto => "auto",
        TokenKind::True => "true",
        TokenKind::False => "false",
        TokenKind::Null => "null",
        TokenKind::Plus => "+",
        TokenKind::Minus => "-",
        TokenKind::Star => "*",
        TokenKind::Slash => "/",
        TokenKind::Percent => "%",
        TokenKind::Assign => "=",
        TokenKind::PlusAssign => "+=",
        TokenKind::MinusAssign => "-=",
        TokenKind::StarAssign => "*=",
        TokenKind::SlashAssign => "/=",
        TokenKind::PercentAssign => "%=",
        TokenKind::Increment => "++",
        TokenKind::Decrement => "--",
        TokenKind::EqualEqual => "==",
        TokenKind::NotEqual => "!=",
        TokenKind::Less => "<",
        TokenKind::LessEqual => "<=",
        TokenKind::Greater => ">",
        TokenKind::GreaterEqual => ">=",
        TokenKind::AndAnd => "&&",
        TokenKind::OrOr => "||",
        TokenKind::Not => "!",
        TokenKind::StreamOut => "<<",
        TokenKind::StreamIn => ">>",
        TokenKind::Arrow => "->",
        TokenKind::ScopeResolution => "::",
        TokenKind::LeftParen => "(",
        TokenKind::RightParen => ")",
        TokenKind::LeftBrace => "{",
        TokenKind::RightBrace => "}",
        TokenKind::LeftBracket => "[",
        TokenKind::RightBracket => "]",
        TokenKind::Comma => ",",
        TokenKind::Dot => ".",
        TokenKind::Colon => ":",
        TokenKind::Semicolon => ";",
        TokenKind::Number
        | TokenKind::DoubleLiteral
        | TokenKind::Str
        | TokenKind::Identifier
        | TokenKind::StyleInclude => "",
        TokenKind::Eof => "",
    }
}

/// Result of a permissive scan: every token that could be recognized
/// plus every lexical error encountered along the way.
#[derive(Debug)]
pub struct LexOutcome {
    pub tokens: Vec<Token>,
    pub errors: Vec<LexError>,
}

/// Lex a source string, failing on the first lexical error.
pub fn lex(source: &str) -> Result<Vec<Token>, LexError> {
    let outcome = lex_permissive(source);
    match outcome.errors.into_iter().next() {
        Some(err) => Err(err),
        None => Ok(outcome.tokens),
    }
}

/// Lex a source string, continuing past errors so that a full token
/// dump can still be produced for hosting contexts that want one.
pub fn lex_permissive(source: &str) -> LexOutcome {
    let mut lexer = Lexer {
        source,
        bytes: source.as_bytes(),
        index: 0,
        line: 1,
        column: 1,
        errors: Vec::new(),
    };
    lexer.run()
}

struct Lexer<'src> {
    source: &'src str,
    bytes: &'src [u8],
    index: usize,
    line: u32,
    column: u32,
    errors: Vec<LexError>,
}

impl<'src> Lexer<'src> {
    fn run(&mut self) -> LexOutcome {
        let mut tokens = Vec::new();

        while let Some(ch) = self.peek() {
            if matches!(ch, b' ' | b'\t' | b'\r' | b'\n') {
                self.consume();
                continue;
            }
            if ch == b'/' && self.peek_next() == Some(b'/') {
                while let Some(c) = self.peek() {
                    if c == b'\n' {
                        break;
                    }
                    self.consume();
                }
                continue;
            }
            if ch == b'/' && self.peek_next() == Some(b'*') {
                self.skip_block_comment();
                continue;
            }

            let (line, column) = (self.line, self.column);
            let token = match ch {
                b'"' => self.lex_string(line, column),
                b'0'..=b'9' => self.lex_number(line, column),
                _ if ch == b'_' || ch.is_ascii_alphabetic() => {
                    self.lex_ident_or_keyword(line, column)
                }
                _ => self.lex_operator(ch, line, column),
            };
            if let Some(tok) = token {
                tokens.push(tok);
            }
        }

        tokens.push(Token::new(TokenKind::Eof, self.line, self.column));
        LexOutcome {
            tokens,
            errors: std::mem::take(&mut self.errors),
        }
    }

    fn lex_operator(&mut self, ch: u8, line: u32, column: u32) -> Option<Token> {
        self.consume();
        let kind = match ch {
            b'+' => match self.peek() {
                Some(b'+') => self.longer(TokenKind::Increment),
                Some(b'=') => self.longer(TokenKind::PlusAssign),
                _ => TokenKind::Plus,
            },
            b'-' => match self.peek() {
                Some(b'>') => self.longer(TokenKind::Arrow),
                Some(b'-') => self.longer(TokenKind::Decrement),
                Some(b'=') => self.longer(TokenKind::MinusAssign),
                _ => TokenKind::Minus,
            },
            b'*' => match self.peek() {
                Some(b'=') => self.longer(TokenKind::StarAssign),
                _ => TokenKind::Star,
            },
            b'/' => match self.peek() {
                Some(b'=') => self.longer(TokenKind::SlashAssign),
                _ => TokenKind::Slash,
            },
            b'%' => match self.peek() {
                Some(b'=') => self.longer(TokenKind::PercentAssign),
                _ => TokenKind::Percent,
            },
            b'=' => match self.peek() {
                Some(b'=') => self.longer(TokenKind::EqualEqual),
                _ => TokenKind::Assign,
            },
            b'!' => match self.peek() {
                Some(b'=') => self.longer(TokenKind::NotEqual),
                _ => TokenKind::Not,
            },
            b'<' => match self.peek() {
                Some(b'<') => self.longer(TokenKind::StreamOut),
                Some(b'=') => self.longer(TokenKind::LessEqual),
                _ => TokenKind::Less,
            },
            b'>' => match self.peek() {
                Some(b'>') => self.longer(TokenKind::StreamIn),
                Some(b'=') => self.longer(TokenKind::GreaterEqual),
                _ => TokenKind::Greater,
            },
            b':' => match self.peek() {
                Some(b':') => self.longer(TokenKind::ScopeResolution),
                _ => TokenKind::Colon,
            },
            b'&' => {
                if self.peek() == Some(b'&') {
                    self.longer(TokenKind::AndAnd)
                } else {
                    return self.unexpected('&', line, column);
                }
            }
            b'|' => {
                if self.peek() == Some(b'|') {
                    self.longer(TokenKind::OrOr)
                } else {
                    return self.unexpected('|', line, column);
                }
            }
            b'(' => TokenKind::LeftParen,
            b')' => TokenKind::RightParen,
            b'{' => TokenKind::LeftBrace,
            b'}' => TokenKind::RightBrace,
            b'[' => TokenKind::LeftBracket,
            b']' => TokenKind::RightBracket,
            b',' => TokenKind::Comma,
            b'.' => TokenKind::Dot,
            b';' => TokenKind::Semicolon,
            other => return self.unexpected(other as char, line, column),
        };
        Some(Token::new(kind, line, column))
    }

    fn longer(&mut self, kind: TokenKind) -> TokenKind {
        self.consume();
        kind
    }

    fn unexpected(&mut self, ch: char, line: u32, column: u32) -> Option<Token> {
        self.errors
            .push(LexError::UnexpectedCharacter { ch, line, column });
        None
    }

    fn skip_block_comment(&mut self) {
        let (line, column) = (self.line, self.column);
        self.consume(); // '/'
        self.consume(); // '*'
        loop {
            match self.peek() {
                Some(b'*') if self.peek_next() == Some(b'/') => {
                    self.consume();
                    self.consume();
                    return;
                }
                Some(_) => {
                    self.consume();
                }
                None => {
                    self.errors.push(LexError::UnterminatedComment { line, column });
                    return;
                }
            }
        }
    }

    fn lex_string(&mut self, line: u32, column: u32) -> Option<Token> {
        self.consume(); // opening quote
        let start = self.index;
        loop {
            match self.peek() {
                Some(b'"') => {
                    let value = self.source[start..self.index].to_string();
                    self.consume(); // closing quote
                    return Some(Token::with_value(TokenKind::Str, value, line, column));
                }
                Some(b'\\') => {
                    // Keep the escape sequence verbatim; emitters translate
                    // it into each target's own escape syntax.
                    self.consume();
                    if self.peek().is_some() {
                        self.consume();
                    }
                }
                Some(b'\n') | None => {
                    self.errors
                        .push(LexError::UnterminatedString { line, column });
                    return None;
                }
                Some(_) => {
                    self.consume();
                }
            }
        }
    }

    fn lex_number(&mut self, line: u32, column: u32) -> Option<Token> {
        let start = self.index;
        while matches!(self.peek(), Some(b'0'..=b'9')) {
            self.consume();
        }

        let mut kind = TokenKind::Number;
        if self.peek() == Some(b'.') {
            if matches!(self.peek_next(), Some(b'0'..=b'9')) {
                kind = TokenKind::DoubleLiteral;
                self.consume(); // '.'
                while matches!(self.peek(), Some(b'0'..=b'9')) {
                    self.consume();
                }
                // A second decimal point glued onto the fraction makes the
                // whole run malformed ("1.2.3"), not two tokens.
                if self.peek() == Some(b'.') && matches!(self.peek_next(), Some(b'0'..=b'9')) {
                    self.consume();
                    while matches!(self.peek(), Some(b'0'..=b'9' | b'.')) {
                        self.consume();
                    }
                    return self.malformed_number(start, line, column);
                }
            } else {
                // Trailing dot with no digit after it: "12."
                self.consume();
                return self.malformed_number(start, line, column);
            }
        }

        let value = self.source[start..self.index].to_string();
        Some(Token::with_value(kind, value, line, column))
    }

    fn malformed_number(&mut self, start: usize, line: u32, column: u32) -> Option<Token> {
        self.errors.push(LexError::MalformedNumber {
            lexeme: self.source[start..self.index].to_string(),
            line,
            column,
        });
        None
    }

    fn lex_ident_or_keyword(&mut self, line: u32, column: u32) -> Option<Token> {
        let start = self.index;
        while let Some(ch) = self.peek() {
            if ch == b'_' || ch.is_ascii_alphanumeric() {
                self.consume();
            } else {
                break;
            }
        }
        let text = &self.source[start..self.index];

        let kind = match text {
            "garden" => TokenKind::Garden,
            "species" => TokenKind::Species,
            "open" => TokenKind::Open,
            "hidden" => TokenKind::Hidden,
            "guarded" => TokenKind::Guarded,
            "grow" => TokenKind::Grow,
            "blossom" => TokenKind::Blossom,
            "bloom" => TokenKind::Bloom,
            "water" => TokenKind::Water,
            "branch" => TokenKind::Branch,
            "else" => TokenKind::Else,
            "while" => TokenKind::While,
            "int" => TokenKind::IntType,
            "float" => TokenKind::FloatType,
            "double" => TokenKind::DoubleType,
            "string" => TokenKind::StringType,
            "bool" => TokenKind::BoolType,
            "char" => TokenKind::CharType,
            "void" => TokenKind::VoidType,
            "auto" => TokenKind::Auto,
            "true" => TokenKind::True,
            "false" => TokenKind::False,
            "null" => TokenKind::Null,
            "style" => return self.lex_style_include(line, column),
            _ => {
                return Some(Token::with_value(
                    TokenKind::Identifier,
                    text,
                    line,
                    column,
                ));
            }
        };
        Some(Token::new(kind, line, column))
    }

    /// `style <iostream>` or `style "garden_utils"`: the path becomes the
    /// token value. The directive only ever appears before the garden
    /// declaration, so the whole form is handled here in the scanner.
    fn lex_style_include(&mut self, line: u32, column: u32) -> Option<Token> {
        while matches!(self.peek(), Some(b' ' | b'\t')) {
            self.consume();
        }
        let (close, path_line, path_column) = match self.peek() {
            Some(b'<') => (b'>', self.line, self.column),
            Some(b'"') => (b'"', self.line, self.column),
            _ => {
                let ch = self.peek().map(|b| b as char).unwrap_or('\0');
                return self.unexpected(ch, self.line, self.column);
            }
        };
        self.consume(); // opening delimiter
        let start = self.index;
        loop {
            match self.peek() {
                Some(ch) if ch == close => {
                    let path = self.source[start..self.index].to_string();
                    self.consume();
                    return Some(Token::with_value(
                        TokenKind::StyleInclude,
                        path,
                        line,
                        column,
                    ));
                }
                Some(b'\n') | None => {
                    self.errors.push(LexError::UnterminatedString {
                        line: path_line,
                        column: path_column,
                    });
                    return None;
                }
                Some(_) => {
                    self.consume();
                }
            }
        }
    }

    fn peek(&self) -> Option<u8> {
        self.bytes.get(self.index).copied()
    }

    fn peek_next(&self) -> Option<u8> {
        self.bytes.get(self.index + 1).copied()
    }

    fn consume(&mut self) {
        if let Some(ch) = self.peek() {
            self.index += 1;
            if ch == b'\n' {
                self.line += 1;
                self.column = 1;
            } else {
                self.column += 1;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(source: &str) -> Vec<TokenKind> {
        lex(source)
            .expect("lex")
            .into_iter()
            .map(|t| t.kind)
            .collect()
    }

    #[test]
    fn lexes_garden_header() {
        let tokens = lex("garden MathTest").expect("lex");
        assert_eq!(tokens[0].kind, TokenKind::Garden);
        assert_eq!((tokens[0].line, tokens[0].column), (1, 1));
        assert_eq!(tokens[1].kind, TokenKind::Identifier);
        assert_eq!(tokens[1].value.as_deref(), Some("MathTest"));
        assert_eq!((tokens[1].line, tokens[1].column), (1, 8));
        assert_eq!(tokens[2].kind, TokenKind::Eof);
    }

    #[test]
    fn stream_statement_tokens() {
        assert_eq!(
            kinds("bloom << \"Result: \" << c;"),
            vec![
                TokenKind::Bloom,
                TokenKind::StreamOut,
                TokenKind::Str,
                TokenKind::StreamOut,
                TokenKind::Identifier,
                TokenKind::Semicolon,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn longest_match_wins() {
        assert_eq!(
            kinds("<= << < ++ += + -- -> -="),
            vec![
                TokenKind::LessEqual,
                TokenKind::StreamOut,
                TokenKind::Less,
                TokenKind::Increment,
                TokenKind::PlusAssign,
                TokenKind::Plus,
                TokenKind::Decrement,
                TokenKind::Arrow,
                TokenKind::MinusAssign,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn keywords_are_case_sensitive() {
        let tokens = lex("Garden garden").expect("lex");
        assert_eq!(tokens[0].kind, TokenKind::Identifier);
        assert_eq!(tokens[1].kind, TokenKind::Garden);
    }

    #[test]
    fn comments_and_whitespace_do_not_change_the_stream() {
        let plain = lex("int a = 10;").expect("lex");
        let noisy = lex("int /* type */ a\t=  10; // trailing").expect("lex");
        let strip = |tokens: Vec<Token>| {
            tokens
                .into_iter()
                .map(|t| (t.kind, t.value))
                .collect::<Vec<_>>()
        };
        assert_eq!(strip(plain), strip(noisy));
    }

    #[test]
    fn numbers_integer_and_double() {
        let tokens = lex("10 3.14").expect("lex");
        assert_eq!(tokens[0].kind, TokenKind::Number);
        assert_eq!(tokens[0].value.as_deref(), Some("10"));
        assert_eq!(tokens[1].kind, TokenKind::DoubleLiteral);
        assert_eq!(tokens[1].value.as_deref(), Some("3.14"));
    }

    #[test]
    fn trailing_dot_is_malformed() {
        let err = lex("int a = 12.;").unwrap_err();
        assert!(matches!(err, LexError::MalformedNumber { ref lexeme, .. } if lexeme == "12."));
    }

    #[test]
    fn unterminated_string_reports_opening_position() {
        let err = lex("bloom << \"oops").unwrap_err();
        assert_eq!(err, LexError::UnterminatedString { line: 1, column: 10 });
    }

    #[test]
    fn permissive_scan_continues_past_bad_characters() {
        let outcome = lex_permissive("int a = 1 @ 2;");
        assert_eq!(outcome.errors.len(), 1);
        assert!(matches!(
            outcome.errors[0],
            LexError::UnexpectedCharacter { ch: '@', .. }
        ));
        // Both numbers survive the bad character between them.
        let numbers: Vec<_> = outcome
            .tokens
            .iter()
            .filter(|t| t.kind == TokenKind::Number)
            .collect();
        assert_eq!(numbers.len(), 2);
    }

    #[test]
    fn style_include_carries_path() {
        let tokens = lex("style <garden_math>\ngarden G").expect("lex");
        assert_eq!(tokens[0].kind, TokenKind::StyleInclude);
        assert_eq!(tokens[0].value.as_deref(), Some("garden_math"));
    }

    #[test]
    fn stream_always_ends_with_eof() {
        let tokens = lex("").expect("lex");
        assert_eq!(tokens.len(), 1);
        assert_eq!(tokens[0].kind, TokenKind::Eof);
    }

    #[test]
    fn display_matches_transport_format() {
        let tokens = lex("garden MathTest").expect("lex");
        assert_eq!(tokens[0].to_string(), "GARDEN 1 1");
        assert_eq!(tokens[1].to_string(), "IDENTIFIER MathTest 1 8");
    }
}
