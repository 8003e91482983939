use rocks::Outcome;

#[test]
fn bare_expression_falls_back_to_evaluate_and_print() {
    let mut output = Vec::new();
    let mut rocks = rocks::new(&mut output);
    let outcome = rocks.run_prompt_line("1 + 2");
    drop(rocks);
    assert_eq!(outcome, Outcome::Success);
    assert_eq!(String::from_utf8(output).unwrap(), "3\n");
}

#[test]
fn a_complete_statement_runs_normally_without_the_fallback() {
    let mut output = Vec::new();
    let mut rocks = rocks::new(&mut output);
    let outcome = rocks.run_prompt_line("print \"hi\";");
    drop(rocks);
    assert_eq!(outcome, Outcome::Success);
    assert_eq!(String::from_utf8(output).unwrap(), "hi\n");
}

#[test]
fn state_persists_across_lines_in_the_same_session() {
    let mut output = Vec::new();
    let mut rocks = rocks::new(&mut output);
    assert_eq!(rocks.run_prompt_line("var a = 1;"), Outcome::Success);
    assert_eq!(rocks.run_prompt_line("a = a + 1;"), Outcome::Success);
    assert_eq!(rocks.run_prompt_line("print a;"), Outcome::Success);
    drop(rocks);
    assert_eq!(String::from_utf8(output).unwrap(), "2\n");
}

#[test]
fn bare_expression_that_also_fails_reports_a_runtime_error() {
    let mut output = Vec::new();
    let mut rocks = rocks::new(&mut output);
    let outcome = rocks.run_prompt_line("undefinedVariable");
    drop(rocks);
    assert_eq!(outcome, Outcome::RuntimeError);
}
