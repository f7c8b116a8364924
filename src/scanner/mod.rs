pub mod lexer;
pub mod token;

use std::io::{self, Write};

use crate::error::CompileError;
use token::Token;

/// Scan source code into a list of tokens.
pub fn scan(source: &str) -> Result<Vec<Token>, CompileError> {
    lexer::scan_all(source)
}

/// Write one token per line in its display form.
pub fn write_tokens<W: Write>(out: &mut W, tokens: &[Token]) -> io::Result<()> {
    for token in tokens {
        writeln!(out, "{token}")?;
    }
    Ok(())
}
