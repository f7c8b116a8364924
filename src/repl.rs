use std::io::{self, Write};

use rustyline::DefaultEditor;
use rustyline::error::ReadlineError;

use crate::error::SiError;
use crate::interpreter::Assignment;
use crate::scanner;

/// Output switches shared by interactive mode and file runs.
#[derive(Debug, Clone, Copy, Default)]
pub struct ReplOptions {
    /// Print the token list before running each program.
    pub show_tokens: bool,
    /// Do not echo assignments.
    pub quiet: bool,
}

/// Run the interactive loop. Lines are collected until an empty line, then
/// run as one program with a fresh store. Ctrl-C discards the pending
/// program; Ctrl-D exits.
pub fn run_repl(options: ReplOptions) -> Result<(), ReadlineError> {
    let mut editor = DefaultEditor::new()?;
    println!("Enter a program; an empty line runs it, Ctrl-D exits.");

    while let Some(source) = read_program(&mut editor)? {
        if source.trim().is_empty() {
            continue;
        }
        let _ = editor.add_history_entry(source.trim_end());

        let failure = run_buffer(&source, options, &mut io::stdout().lock())?;
        if let Some(err) = failure {
            eprintln!("{}", err.render("<repl>", &source));
        }
    }
    Ok(())
}

/// Run one program, writing tokens (when asked) and assignment events to
/// `out`. The failure, if any, is handed back for the caller to report.
pub fn run_buffer<W: Write>(
    source: &str,
    options: ReplOptions,
    out: &mut W,
) -> io::Result<Option<SiError>> {
    if options.show_tokens {
        match scanner::scan(source) {
            Ok(tokens) => scanner::write_tokens(out, &tokens)?,
            Err(e) => return Ok(Some(e.into())),
        }
    }

    let mut written = Ok(());
    let run = crate::run(source, |e: &Assignment| {
        if !options.quiet && written.is_ok() {
            written = writeln!(out, "{} = {}", e.name, e.value);
        }
    });
    written?;
    Ok(run.result.err())
}

/// Read one program. `None` once input is exhausted with nothing pending.
fn read_program(editor: &mut DefaultEditor) -> Result<Option<String>, ReadlineError> {
    let mut source = String::new();
    loop {
        let prompt = if source.is_empty() { "> " } else { ". " };
        match editor.readline(prompt) {
            Ok(line) => {
                if accumulate(&mut source, &line) {
                    return Ok(Some(source));
                }
            }
            Err(ReadlineError::Interrupted) => return Ok(Some(String::new())),
            Err(ReadlineError::Eof) => return Ok((!source.is_empty()).then_some(source)),
            Err(e) => return Err(e),
        }
    }
}

/// Append `line` to the pending program. Returns true when the line was
/// blank, which ends the program.
fn accumulate(source: &mut String, line: &str) -> bool {
    if line.trim().is_empty() {
        return true;
    }
    source.push_str(line);
    source.push('\n');
    false
}
