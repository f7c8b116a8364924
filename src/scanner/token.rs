use std::fmt;

/// Lexical class of a token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display)]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum TokenKind {
    Number,
    Float,
    String,
    Identifier,
    Keyword,
    Operator,
}

/// Index of a token in the scanned sequence.
pub type TokenId = usize;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Span {
    pub offset: usize,
    pub len: usize,
}

impl Span {
    pub fn new(offset: usize, len: usize) -> Self {
        Self { offset, len }
    }
}

impl From<Span> for miette::SourceSpan {
    fn from(span: Span) -> Self {
        miette::SourceSpan::new(span.offset.into(), span.len)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    /// Source text, or the decoded contents for string literals.
    pub lexeme: String,
    pub line: usize,
    pub column: usize,
    pub span: Span,
}

impl Token {
    pub fn new(
        kind: TokenKind,
        lexeme: impl Into<String>,
        line: usize,
        column: usize,
        span: Span,
    ) -> Self {
        Self {
            kind,
            lexeme: lexeme.into(),
            line,
            column,
            span,
        }
    }

    /// True for an OPERATOR token spelled exactly `text`.
    pub fn is_operator(&self, text: &str) -> bool {
        self.kind == TokenKind::Operator && self.lexeme == text
    }

    pub fn is_keyword(&self, keyword: Keyword) -> bool {
        self.kind == TokenKind::Keyword && self.lexeme == keyword.as_ref()
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}:{} at line {}, column {}]",
            self.kind, self.lexeme, self.line, self.column
        )
    }
}

/// Reserved control-flow words.
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::AsRefStr, strum::EnumString)]
#[strum(serialize_all = "lowercase")]
pub enum Keyword {
    Si,
    Sino,
    Mientras,
    Para,
}

pub fn is_keyword(ident: &str) -> bool {
    ident.parse::<Keyword>().is_ok()
}

/// Single-character punctuation and operator symbols.
pub const SINGLE_CHAR_OPERATORS: &str = "{}();+-*/%=<>!";

/// Marker introducing a comment that runs to end of line.
pub const LINE_COMMENT: &str = "TATIANA";

/// Marker opening and closing a block comment.
pub const BLOCK_COMMENT: &str = "OSCAR";
