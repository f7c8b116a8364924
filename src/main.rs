use std::io;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;

use si_lang::ast::printer;
use si_lang::repl::{self, ReplOptions};
use si_lang::{SiError, parser, scanner};

#[derive(Parser, Debug)]
#[command(name = "si-lang", about = "An interpreter for the Si teaching language")]
struct Cli {
    /// Si source file to run (omit for interactive mode)
    file: Option<PathBuf>,

    /// Dump tokens and exit
    #[arg(long, requires = "file")]
    dump_tokens: bool,

    /// Dump syntax tree and exit
    #[arg(long, requires = "file")]
    dump_ast: bool,

    /// Syntax tree output format
    #[arg(long, default_value = "sexp", value_parser = ["sexp", "json"])]
    ast_format: String,

    /// Print the token list before running
    #[arg(long)]
    show_tokens: bool,

    /// Do not echo assignments
    #[arg(long)]
    quiet: bool,
}

impl Cli {
    fn options(&self) -> ReplOptions {
        ReplOptions {
            show_tokens: self.show_tokens,
            quiet: self.quiet,
        }
    }
}

fn init_tracing() {
    use tracing_subscriber::{EnvFilter, fmt, prelude::*};

    // Only initialize if RUST_LOG is set
    if std::env::var("RUST_LOG").is_ok() {
        tracing_subscriber::registry()
            .with(fmt::layer().with_writer(std::io::stderr).with_target(true))
            .with(EnvFilter::from_default_env())
            .init();
    }
}

fn read_source(path: &Path) -> Result<String> {
    std::fs::read_to_string(path)
        .with_context(|| format!("read source file '{}'", path.display()))
}

/// Dump tokens or the syntax tree. `Ok(false)` means the source failed to
/// scan or parse and the diagnostic has already been printed.
fn dump(cli: &Cli, name: &str, source: &str) -> Result<bool> {
    let report = |err: SiError| eprintln!("{}", err.render(name, source));

    let tokens = match scanner::scan(source) {
        Ok(tokens) => tokens,
        Err(e) => {
            report(e.into());
            return Ok(false);
        }
    };
    if cli.dump_tokens {
        scanner::write_tokens(&mut io::stdout().lock(), &tokens).context("write tokens")?;
        return Ok(true);
    }

    let program = match parser::parse(&tokens) {
        Ok(program) => program,
        Err(e) => {
            report(e.into());
            return Ok(false);
        }
    };
    match cli.ast_format.as_str() {
        "json" => {
            let json = printer::to_json(&program).context("serialize syntax tree")?;
            println!("{json}");
        }
        _ => print!("{}", printer::to_sexp(&program)),
    }
    Ok(true)
}

/// Run a source file. `Ok(false)` means the program itself failed and the
/// diagnostic has already been printed.
fn run_file(cli: &Cli, path: &Path) -> Result<bool> {
    let source = read_source(path)?;
    let name = path.display().to_string();
    if cli.dump_tokens || cli.dump_ast {
        return dump(cli, &name, &source);
    }

    let failure = repl::run_buffer(&source, cli.options(), &mut io::stdout().lock())
        .context("write program output")?;
    match failure {
        None => Ok(true),
        Some(err) => {
            eprintln!("{}", err.render(&name, &source));
            Ok(false)
        }
    }
}

fn main() -> Result<ExitCode> {
    let cli = Cli::parse();
    init_tracing();

    match &cli.file {
        Some(path) => {
            let ok = run_file(&cli, path)?;
            Ok(if ok { ExitCode::SUCCESS } else { ExitCode::FAILURE })
        }
        None => {
            repl::run_repl(cli.options()).context("interactive session")?;
            Ok(ExitCode::SUCCESS)
        }
    }
}
