use winnow::ascii::{digit0, digit1};
use winnow::combinator::{alt, opt};
use winnow::error::{ContextError, ErrMode};
use winnow::prelude::*;
use winnow::stream::{LocatingSlice, Location};
use winnow::token::{any, literal, one_of, rest, take_till, take_until, take_while};

use crate::error::CompileError;
use crate::scanner::token::{
    BLOCK_COMMENT, LINE_COMMENT, SINGLE_CHAR_OPERATORS, Span, Token, TokenKind, is_keyword,
};

type Input<'a> = LocatingSlice<&'a str>;

/// Byte offsets of every line start, for offset -> (line, column) lookups.
struct LineIndex<'a> {
    source: &'a str,
    starts: Vec<usize>,
}

impl<'a> LineIndex<'a> {
    fn new(source: &'a str) -> Self {
        let starts = std::iter::once(0)
            .chain(source.match_indices('\n').map(|(i, _)| i + 1))
            .collect();
        Self { source, starts }
    }

    /// 1-based line and column (in characters) of a byte offset.
    fn position(&self, offset: usize) -> (usize, usize) {
        let line = self.starts.partition_point(|&start| start <= offset);
        let line_start = self.starts[line - 1];
        let column = self.source[line_start..offset].chars().count() + 1;
        (line, column)
    }
}

fn block_comment(input: &mut Input<'_>) -> ModalResult<()> {
    literal(BLOCK_COMMENT).void().parse_next(input)?;
    let closed = opt((take_until(0.., BLOCK_COMMENT), literal(BLOCK_COMMENT)).void())
        .parse_next(input)?;
    if closed.is_none() {
        // An unclosed block comment swallows the rest of the input.
        rest.void().parse_next(input)?;
    }
    Ok(())
}

fn whitespace_and_comments(input: &mut Input<'_>) -> ModalResult<()> {
    loop {
        let before = input.current_token_start();
        take_while(0.., |c: char| c.is_whitespace())
            .void()
            .parse_next(input)?;

        if input.starts_with(LINE_COMMENT) {
            (literal(LINE_COMMENT), take_till(0.., '\n'))
                .void()
                .parse_next(input)?;
        } else if input.starts_with(BLOCK_COMMENT) {
            block_comment.parse_next(input)?;
        } else if input.current_token_start() == before {
            break;
        }
    }
    Ok(())
}

fn string_literal(input: &mut Input<'_>) -> ModalResult<(TokenKind, String)> {
    '"'.parse_next(input)?;
    let mut s = String::new();
    loop {
        let c = any
            .parse_next(input)
            .map_err(|_: ErrMode<ContextError>| ErrMode::Cut(ContextError::new()))?;
        match c {
            '"' => break,
            '\\' => {
                let esc = any
                    .parse_next(input)
                    .map_err(|_: ErrMode<ContextError>| ErrMode::Cut(ContextError::new()))?;
                match esc {
                    'n' => s.push('\n'),
                    't' => s.push('\t'),
                    '\\' => s.push('\\'),
                    '"' => s.push('"'),
                    other => {
                        s.push('\\');
                        s.push(other);
                    }
                }
            }
            other => s.push(other),
        }
    }
    Ok((TokenKind::String, s))
}

fn number_literal(input: &mut Input<'_>) -> ModalResult<(TokenKind, String)> {
    let whole: &str = digit1.parse_next(input)?;
    let mut lexeme = whole.to_string();
    let mut kind = TokenKind::Number;

    if opt('.').parse_next(input)?.is_some() {
        let fraction: &str = digit0.parse_next(input)?;
        lexeme.push('.');
        lexeme.push_str(fraction);
        kind = TokenKind::Float;
    }
    Ok((kind, lexeme))
}

fn identifier_or_keyword(input: &mut Input<'_>) -> ModalResult<(TokenKind, String)> {
    let text: &str = (
        one_of(|c: char| c.is_alphabetic() || c == '_'),
        take_while(0.., |c: char| c.is_alphanumeric() || c == '_'),
    )
        .take()
        .parse_next(input)?;
    let kind = if is_keyword(text) {
        TokenKind::Keyword
    } else {
        TokenKind::Identifier
    };
    Ok((kind, text.to_string()))
}

fn operator(input: &mut Input<'_>) -> ModalResult<(TokenKind, String)> {
    let text: &str = alt((
        alt(("==", "!=", "<=", ">=", "&&", "||")),
        one_of(|c: char| SINGLE_CHAR_OPERATORS.contains(c)).take(),
    ))
    .parse_next(input)?;
    Ok((TokenKind::Operator, text.to_string()))
}

/// Length in bytes of the digit-and-point run starting at `offset`.
fn numeric_run_len(source: &str, offset: usize) -> usize {
    let tail = &source[offset..];
    tail.find(|c: char| !(c.is_ascii_digit() || c == '.'))
        .unwrap_or(tail.len())
}

/// Scan all tokens from source, stopping at the first lexical error.
pub fn scan_all(source: &str) -> Result<Vec<Token>, CompileError> {
    let lines = LineIndex::new(source);
    let mut input = LocatingSlice::new(source);
    let mut tokens = Vec::new();

    loop {
        if whitespace_and_comments(&mut input).is_err() {
            break;
        }
        let Some(first) = input.chars().next() else {
            break;
        };
        let start = input.current_token_start();
        let (line, column) = lines.position(start);

        let (kind, lexeme) = if first == '"' {
            string_literal(&mut input).map_err(|_| {
                CompileError::unterminated_string(line, column, Span::new(start, 1))
            })?
        } else if first.is_ascii_digit() {
            let number = number_literal(&mut input).map_err(|_| {
                CompileError::malformed_number(line, column, Span::new(start, 1))
            })?;
            if input.starts_with('.') {
                let len = numeric_run_len(source, start);
                return Err(CompileError::malformed_number(
                    line,
                    column,
                    Span::new(start, len),
                ));
            }
            number
        } else if first.is_alphabetic() || first == '_' {
            identifier_or_keyword(&mut input).map_err(|_| {
                CompileError::unexpected_character(
                    first,
                    line,
                    column,
                    Span::new(start, first.len_utf8()),
                )
            })?
        } else {
            operator(&mut input).map_err(|_| {
                CompileError::unexpected_character(
                    first,
                    line,
                    column,
                    Span::new(start, first.len_utf8()),
                )
            })?
        };

        let end = input.current_token_start();
        tokens.push(Token::new(
            kind,
            lexeme,
            line,
            column,
            Span::new(start, end - start),
        ));
    }

    tracing::debug!(count = tokens.len(), "scan complete");
    Ok(tokens)
}
