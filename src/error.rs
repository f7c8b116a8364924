use miette::{Diagnostic, NamedSource, SourceSpan};
use thiserror::Error;

use crate::scanner::token::{Span, Token};

/// Pipeline stage a failure came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display)]
#[strum(serialize_all = "lowercase")]
pub enum Stage {
    Lexical,
    Syntax,
    Runtime,
}

// ============= Compile-time errors (with miette diagnostics) =============

#[derive(Error, Debug, Diagnostic)]
pub enum CompileError {
    #[error("unrecognized character '{ch}' at line {line}, column {column}")]
    #[diagnostic(code(si::lex::character))]
    UnexpectedCharacter {
        ch: char,
        line: usize,
        column: usize,
        #[label("here")]
        span: SourceSpan,
        #[source_code]
        src: NamedSource<String>,
    },

    #[error("unterminated string starting at line {line}, column {column}")]
    #[diagnostic(code(si::lex::string), help("close the string with '\"'"))]
    UnterminatedString {
        line: usize,
        column: usize,
        #[label("string starts here")]
        span: SourceSpan,
        #[source_code]
        src: NamedSource<String>,
    },

    #[error("malformed number at line {line}, column {column}: more than one decimal point")]
    #[diagnostic(code(si::lex::number))]
    MalformedNumber {
        line: usize,
        column: usize,
        #[label("this number")]
        span: SourceSpan,
        #[source_code]
        src: NamedSource<String>,
    },

    #[error("expected {expected}, found {found} (line {line}, column {column})")]
    #[diagnostic(code(si::parse::expected))]
    UnexpectedToken {
        expected: String,
        found: String,
        line: usize,
        column: usize,
        #[label("near here")]
        span: SourceSpan,
        #[source_code]
        src: NamedSource<String>,
    },

    #[error("unexpected trailing input {found} at line {line}, column {column}")]
    #[diagnostic(code(si::parse::trailing), help("a statement cannot start here"))]
    TrailingInput {
        found: String,
        line: usize,
        column: usize,
        #[label("here")]
        span: SourceSpan,
        #[source_code]
        src: NamedSource<String>,
    },
}

fn unnamed() -> NamedSource<String> {
    NamedSource::new("input", String::new())
}

impl CompileError {
    pub fn unexpected_character(ch: char, line: usize, column: usize, span: Span) -> Self {
        Self::UnexpectedCharacter {
            ch,
            line,
            column,
            span: span.into(),
            src: unnamed(),
        }
    }

    pub fn unterminated_string(line: usize, column: usize, span: Span) -> Self {
        Self::UnterminatedString {
            line,
            column,
            span: span.into(),
            src: unnamed(),
        }
    }

    pub fn malformed_number(line: usize, column: usize, span: Span) -> Self {
        Self::MalformedNumber {
            line,
            column,
            span: span.into(),
            src: unnamed(),
        }
    }

    /// `anchor` is the token the failure is reported against.
    pub fn unexpected_token(
        expected: impl Into<String>,
        found: impl Into<String>,
        anchor: Option<&Token>,
    ) -> Self {
        let (line, column, span) = anchor_position(anchor);
        Self::UnexpectedToken {
            expected: expected.into(),
            found: found.into(),
            line,
            column,
            span,
            src: unnamed(),
        }
    }

    pub fn trailing_input(token: &Token) -> Self {
        Self::TrailingInput {
            found: format!("'{}'", token.lexeme),
            line: token.line,
            column: token.column,
            span: token.span.into(),
            src: unnamed(),
        }
    }

    pub fn stage(&self) -> Stage {
        match self {
            Self::UnexpectedCharacter { .. }
            | Self::UnterminatedString { .. }
            | Self::MalformedNumber { .. } => Stage::Lexical,
            Self::UnexpectedToken { .. } | Self::TrailingInput { .. } => Stage::Syntax,
        }
    }

    pub fn line(&self) -> usize {
        match self {
            Self::UnexpectedCharacter { line, .. }
            | Self::UnterminatedString { line, .. }
            | Self::MalformedNumber { line, .. }
            | Self::UnexpectedToken { line, .. }
            | Self::TrailingInput { line, .. } => *line,
        }
    }

    pub fn column(&self) -> usize {
        match self {
            Self::UnexpectedCharacter { column, .. }
            | Self::UnterminatedString { column, .. }
            | Self::MalformedNumber { column, .. }
            | Self::UnexpectedToken { column, .. }
            | Self::TrailingInput { column, .. } => *column,
        }
    }

    /// Attach source code for fancy miette diagnostics
    pub fn with_source_code(mut self, name: impl Into<String>, source: impl Into<String>) -> Self {
        let named = NamedSource::new(name.into(), source.into());
        match &mut self {
            Self::UnexpectedCharacter { src, .. }
            | Self::UnterminatedString { src, .. }
            | Self::MalformedNumber { src, .. }
            | Self::UnexpectedToken { src, .. }
            | Self::TrailingInput { src, .. } => *src = named,
        }
        self
    }
}

fn anchor_position(anchor: Option<&Token>) -> (usize, usize, SourceSpan) {
    match anchor {
        Some(token) => (token.line, token.column, token.span.into()),
        None => (1, 1, Span::new(0, 0).into()),
    }
}

// ============= Runtime errors (simple, no miette) =============

/// Source position of the node a runtime failure was raised on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Position {
    pub line: usize,
    pub column: usize,
}

impl From<&Token> for Position {
    fn from(token: &Token) -> Self {
        Self {
            line: token.line,
            column: token.column,
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum RuntimeError {
    #[error("undefined variable '{name}'")]
    UndefinedVariable {
        name: String,
        position: Option<Position>,
    },

    #[error("unsupported operation: {left} {operator} {right}")]
    UnsupportedOperation {
        operator: String,
        left: &'static str,
        right: &'static str,
        position: Option<Position>,
    },

    #[error("division by zero")]
    DivisionByZero { position: Option<Position> },

    #[error("modulo by zero")]
    ModuloByZero { position: Option<Position> },

    #[error("integer overflow in '{operator}'")]
    IntegerOverflow {
        operator: String,
        position: Option<Position>,
    },

    #[error("invalid literal '{text}'")]
    InvalidLiteral {
        text: String,
        position: Option<Position>,
    },

    #[error("unsupported node kind {kind}")]
    UnsupportedNode {
        kind: String,
        position: Option<Position>,
    },
}

impl RuntimeError {
    pub fn position(&self) -> Option<Position> {
        match self {
            Self::UndefinedVariable { position, .. }
            | Self::UnsupportedOperation { position, .. }
            | Self::DivisionByZero { position }
            | Self::ModuloByZero { position }
            | Self::IntegerOverflow { position, .. }
            | Self::InvalidLiteral { position, .. }
            | Self::UnsupportedNode { position, .. } => *position,
        }
    }

    /// Fill in the position if the error does not carry one yet.
    pub fn or_at(mut self, at: Option<Position>) -> Self {
        match &mut self {
            Self::UndefinedVariable { position, .. }
            | Self::UnsupportedOperation { position, .. }
            | Self::DivisionByZero { position }
            | Self::ModuloByZero { position }
            | Self::IntegerOverflow { position, .. }
            | Self::InvalidLiteral { position, .. }
            | Self::UnsupportedNode { position, .. } => {
                if position.is_none() {
                    *position = at;
                }
            }
        }
        self
    }

    pub fn display_with_line(&self) -> String {
        match self.position() {
            Some(Position { line, column }) => {
                format!("Error: line {line}, column {column}: {self}")
            }
            None => format!("Error: {self}"),
        }
    }
}

// ============= Whole-run failure =============

#[derive(Error, Debug)]
pub enum SiError {
    #[error(transparent)]
    Compile(#[from] CompileError),

    #[error(transparent)]
    Runtime(#[from] RuntimeError),
}

impl SiError {
    pub fn stage(&self) -> Stage {
        match self {
            Self::Compile(e) => e.stage(),
            Self::Runtime(_) => Stage::Runtime,
        }
    }

    pub fn line(&self) -> Option<usize> {
        match self {
            Self::Compile(e) => Some(e.line()),
            Self::Runtime(e) => e.position().map(|p| p.line),
        }
    }

    pub fn column(&self) -> Option<usize> {
        match self {
            Self::Compile(e) => Some(e.column()),
            Self::Runtime(e) => e.position().map(|p| p.column),
        }
    }

    /// Human-readable report; compile errors get a miette source excerpt.
    pub fn render(self, name: &str, source: &str) -> String {
        match self {
            Self::Compile(e) => {
                let report = miette::Report::new(e.with_source_code(name, source));
                format!("{report:?}")
            }
            Self::Runtime(e) => e.display_with_line(),
        }
    }
}

// ============= Tests =============

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scanner::token::TokenKind;

    #[test]
    fn compile_error_implements_diagnostic() {
        let err = CompileError::unexpected_character('@', 1, 3, Span::new(2, 1));
        let diag: &dyn Diagnostic = &err;
        assert!(diag.code().is_some());
    }

    #[test]
    fn compile_error_with_source() {
        let err = CompileError::malformed_number(1, 5, Span::new(4, 5))
            .with_source_code("test.si", "x = 1.2.3\n");
        assert!(matches!(err, CompileError::MalformedNumber { .. }));
        assert_eq!(err.stage(), Stage::Lexical);
    }

    #[test]
    fn unexpected_token_uses_anchor_position() {
        let anchor = Token::new(TokenKind::Operator, "(", 3, 7, Span::new(20, 1));
        let err = CompileError::unexpected_token("')'", "end of input", Some(&anchor));
        assert_eq!(err.line(), 3);
        assert_eq!(err.column(), 7);
        assert_eq!(err.stage(), Stage::Syntax);
        assert!(err.to_string().contains("expected ')'"));
    }

    #[test]
    fn unexpected_token_without_anchor_defaults_to_origin() {
        let err = CompileError::unexpected_token("a statement", "end of input", None);
        assert_eq!((err.line(), err.column()), (1, 1));
    }

    #[test]
    fn runtime_error_display_with_line() {
        let err = RuntimeError::UndefinedVariable {
            name: "z".into(),
            position: Some(Position { line: 2, column: 9 }),
        };
        assert_eq!(
            err.display_with_line(),
            "Error: line 2, column 9: undefined variable 'z'"
        );
    }

    #[test]
    fn runtime_error_display_no_position() {
        let err = RuntimeError::DivisionByZero { position: None };
        assert_eq!(err.display_with_line(), "Error: division by zero");
    }

    #[test]
    fn or_at_keeps_existing_position() {
        let first = Position { line: 1, column: 1 };
        let second = Position { line: 4, column: 2 };
        let err = RuntimeError::ModuloByZero {
            position: Some(first),
        }
        .or_at(Some(second));
        assert_eq!(err.position(), Some(first));

        let err = RuntimeError::ModuloByZero { position: None }.or_at(Some(second));
        assert_eq!(err.position(), Some(second));
    }

    #[test]
    fn si_error_reports_stage() {
        let err: SiError = RuntimeError::DivisionByZero { position: None }.into();
        assert_eq!(err.stage(), Stage::Runtime);
        assert_eq!(err.line(), None);
        let err: SiError = CompileError::unterminated_string(4, 1, Span::new(30, 3)).into();
        assert_eq!(err.stage(), Stage::Lexical);
        assert_eq!(err.line(), Some(4));
    }
}
