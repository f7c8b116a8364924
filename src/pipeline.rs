use crate::error::SiError;
use crate::interpreter::environment::SymbolTable;
use crate::interpreter::value::Value;
use crate::interpreter::{AssignmentObserver, Interpreter};
use crate::parser;
use crate::scanner;

/// Result of one interpretation run.
///
/// `symbols` holds every write committed before the run stopped, including
/// when `result` is a runtime failure.
#[derive(Debug)]
pub struct Run {
    pub symbols: SymbolTable,
    pub result: Result<Option<Value>, SiError>,
}

/// Scan, parse and evaluate `source` against a fresh store. The first failure
/// in any stage ends the run.
pub fn run<O: AssignmentObserver>(source: &str, observer: O) -> Run {
    let mut symbols = SymbolTable::new();
    let result = run_stages(source, &mut symbols, observer);
    match &result {
        Ok(_) => tracing::debug!(variables = symbols.len(), "run complete"),
        Err(e) => tracing::debug!(stage = %e.stage(), error = %e, "run aborted"),
    }
    Run { symbols, result }
}

fn run_stages<O: AssignmentObserver>(
    source: &str,
    symbols: &mut SymbolTable,
    observer: O,
) -> Result<Option<Value>, SiError> {
    let tokens = scanner::scan(source)?;
    let program = parser::parse(&tokens)?;
    let value = Interpreter::new(&tokens, symbols, observer).interpret(&program)?;
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Stage;
    use crate::interpreter::Assignment;

    #[test]
    fn lexical_failure_stops_before_parsing() {
        let mut count = 0;
        let run = run("x = 1 $", |_: &Assignment| count += 1);
        let err = run.result.unwrap_err();
        assert_eq!(err.stage(), Stage::Lexical);
        assert_eq!((err.line(), err.column()), (Some(1), Some(7)));
        assert_eq!(count, 0);
        assert!(run.symbols.is_empty());
    }

    #[test]
    fn syntax_failure_stops_before_evaluation() {
        let mut count = 0;
        let run = run("x = 1 y = (2", |_: &Assignment| count += 1);
        assert_eq!(run.result.unwrap_err().stage(), Stage::Syntax);
        assert_eq!(count, 0);
    }

    #[test]
    fn runtime_failure_keeps_partial_store() {
        let run = run("x = 1 y = x / 0 z = 3", |_: &Assignment| {});
        assert_eq!(run.result.unwrap_err().stage(), Stage::Runtime);
        assert_eq!(run.symbols.get("x"), Some(&Value::Integer(1)));
        assert!(!run.symbols.contains("y"));
        assert!(!run.symbols.contains("z"));
    }

    #[test]
    fn successful_run_returns_last_value() {
        let run = run("a = 2 b = a * 21 b", |_: &Assignment| {});
        assert_eq!(run.result.unwrap(), Some(Value::Integer(42)));
        assert_eq!(run.symbols.len(), 2);
    }
}
