use rstest::rstest;
use si_lang::CompileError;
use si_lang::error::Stage;
use si_lang::{parser, scanner};

fn compile_error(source: &str) -> CompileError {
    match scanner::scan(source) {
        Ok(tokens) => parser::parse(&tokens).unwrap_err(),
        Err(e) => e,
    }
}

#[rstest]
#[case::unclosed_paren("x = (1 + 2", "')' after expression")]
#[case::missing_block("si (x) y = 1", "'{'")]
#[case::unclosed_block("mientras (1) { x = 1", "'}' to close block")]
#[case::missing_for_separator("para (i = 0 i < 3; i = i + 1) { }", "';' after loop initializer")]
#[case::dangling_assignment("x =", "an expression")]
#[case::keyword_as_operand("x = para", "an expression")]
fn syntax_errors_name_what_was_expected(#[case] source: &str, #[case] expected: &str) {
    let err = compile_error(source);
    assert_eq!(err.stage(), Stage::Syntax);
    assert!(
        err.to_string().contains(expected),
        "expected '{expected}' in '{err}'"
    );
}

#[test]
fn stray_closing_paren_is_trailing_input() {
    let err = compile_error("x = 1\n)");
    assert!(matches!(err, CompileError::TrailingInput { .. }));
    assert_eq!((err.line(), err.column()), (2, 1));
}

#[test]
fn sino_without_si_is_trailing_input() {
    let err = compile_error("sino { x = 1 }");
    assert!(matches!(err, CompileError::TrailingInput { .. }));
}

#[rstest]
#[case::bad_character("x = 1 @ 2", 1, 7)]
#[case::unterminated_string("x = 1\ny = \"abc", 2, 5)]
#[case::two_decimal_points("x = 1.2.3", 1, 5)]
fn lexical_errors_report_position(
    #[case] source: &str,
    #[case] line: usize,
    #[case] column: usize,
) {
    let err = compile_error(source);
    assert_eq!(err.stage(), Stage::Lexical);
    assert_eq!((err.line(), err.column()), (line, column));
}

#[test]
fn rendered_report_includes_file_name() {
    let err: si_lang::SiError = compile_error("x = (1").into();
    let rendered = err.render("broken.si", "x = (1");
    assert!(rendered.contains("broken.si"), "{rendered}");
    assert!(rendered.contains("expected"), "{rendered}");
}

#[rstest]
#[case::parentheses(format!("x = {}1{}", "(".repeat(10_000), ")".repeat(10_000)))]
#[case::negations(format!("y = {}0", "!".repeat(10_000)))]
fn deep_nesting_is_rejected_before_running(#[case] source: String) {
    let run = si_lang::run(&source, |_: &si_lang::interpreter::Assignment| {});
    let err = run.result.unwrap_err();
    assert_eq!(err.stage(), Stage::Syntax);
    assert!(run.symbols.is_empty());
}
