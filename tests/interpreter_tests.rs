use rstest::rstest;
use si_lang::error::Stage;
use si_lang::interpreter::Assignment;
use si_lang::interpreter::value::Value;

/// Run `source` and render every assignment event as `name = value`.
fn run_fixture(source: &str) -> (Vec<String>, si_lang::Run) {
    let mut events = Vec::new();
    let run = si_lang::run(source, |e: &Assignment| {
        events.push(format!("{} = {}", e.name, e.value))
    });
    (events, run)
}

#[rstest]
#[case::arithmetic(
    include_str!("../fixtures/arithmetic.si"),
    include_str!("../fixtures/arithmetic.expected")
)]
#[case::control_flow(
    include_str!("../fixtures/control_flow.si"),
    include_str!("../fixtures/control_flow.expected")
)]
#[case::logic(
    include_str!("../fixtures/logic.si"),
    include_str!("../fixtures/logic.expected")
)]
fn fixture_events(#[case] source: &str, #[case] expected: &str) {
    let (events, run) = run_fixture(source);
    assert!(run.result.is_ok(), "run failed: {:?}", run.result);
    let expected_lines: Vec<&str> = expected.lines().collect();
    assert_eq!(events, expected_lines);
}

#[test]
fn fixture_runtime_error_keeps_earlier_writes() {
    let source = include_str!("../fixtures/runtime_error.si");
    let expected = include_str!("../fixtures/runtime_error.expected");
    let (events, run) = run_fixture(source);

    let expected_lines: Vec<&str> = expected.lines().collect();
    assert_eq!(events, expected_lines);

    let err = run.result.unwrap_err();
    assert_eq!(err.stage(), Stage::Runtime);
    assert_eq!(err.line(), Some(3));
    assert!(err.to_string().contains("division by zero"));

    assert_eq!(run.symbols.get("y"), Some(&Value::Integer(10)));
    assert!(!run.symbols.contains("z"));
    assert!(!run.symbols.contains("w"));
}

#[test]
fn final_store_lists_every_variable_once() {
    let (_, run) = run_fixture(include_str!("../fixtures/control_flow.si"));
    assert_eq!(run.symbols.len(), 5);
    for name in ["i", "j", "msg", "ok", "total"] {
        assert!(run.symbols.contains(name), "missing {name}");
    }
    assert_eq!(run.symbols.get("total"), Some(&Value::Integer(10)));
}

#[test]
fn each_run_starts_with_an_empty_store() {
    let (_, first) = run_fixture("x = 1");
    assert!(first.result.is_ok());
    let (_, second) = run_fixture("y = x");
    assert!(matches!(
        second.result,
        Err(si_lang::SiError::Runtime(si_lang::RuntimeError::UndefinedVariable { .. }))
    ));
}

#[rstest]
#[case("x = 9223372036854775807 + 1", "integer overflow")]
#[case("x = 5 % 0", "modulo by zero")]
#[case("x = \"a\" - 1", "unsupported operation")]
#[case("x = y + 1", "undefined variable 'y'")]
fn runtime_failures(#[case] source: &str, #[case] message: &str) {
    let (events, run) = run_fixture(source);
    assert!(events.is_empty());
    let err = run.result.unwrap_err();
    assert_eq!(err.stage(), Stage::Runtime);
    assert!(
        err.to_string().contains(message),
        "expected '{message}' in '{err}'"
    );
}
