mod common;

use common::{run, run_ok};
use rocks::Outcome;

#[test]
fn addition_of_two_literals() {
    assert_eq!(run_ok("print 1 + 2;"), "3\n");
}

#[test]
fn string_concatenation() {
    assert_eq!(run_ok(r#"print "foo" + "bar";"#), "foobar\n");
}

#[test]
fn mixed_string_and_number_addition_coerces_the_number_side() {
    assert_eq!(run_ok(r#"print "a" + 1;"#), "a1\n");
    assert_eq!(run_ok(r#"print 1 + "a";"#), "1a\n");
}

#[test]
fn string_comparison_is_lexicographic() {
    assert_eq!(run_ok(r#"print "a" < "b";"#), "true\n");
    assert_eq!(run_ok(r#"print "b" <= "a";"#), "false\n");
}

#[test]
fn division_by_zero_is_a_runtime_error() {
    let (outcome, _) = run("print 1 / 0;");
    assert_eq!(outcome, Outcome::RuntimeError);
}

#[test]
fn string_minus_number_is_a_type_error() {
    let (outcome, _) = run(r#""a" - 1;"#);
    assert_eq!(outcome, Outcome::RuntimeError);
}

#[test]
fn equality_never_errors_across_types() {
    assert_eq!(run_ok(r#"print 1 == "1";"#), "false\n");
    assert_eq!(run_ok("print nil == false;"), "false\n");
}

#[test]
fn integer_and_float_literals_print_distinctly() {
    assert_eq!(run_ok("print 3;"), "3\n");
    assert_eq!(run_ok("print 3.5;"), "3.5\n");
}

#[test]
fn calling_with_wrong_arity_is_a_runtime_error() {
    let (outcome, _) = run("fun add(a, b) { return a + b; } add(1);");
    assert_eq!(outcome, Outcome::RuntimeError);
}

#[test]
fn calling_a_non_callable_value_is_a_runtime_error() {
    let (outcome, _) = run("var x = 1; x();");
    assert_eq!(outcome, Outcome::RuntimeError);
}

#[test]
fn reading_an_undefined_global_is_a_runtime_error() {
    let (outcome, _) = run("print x;");
    assert_eq!(outcome, Outcome::RuntimeError);
}

#[test]
fn unbounded_recursion_is_a_reported_runtime_error_not_a_crash() {
    let source = r#"
        fun recurse(n) { return recurse(n + 1); }
        recurse(0);
    "#;
    let (outcome, _) = run(source);
    assert_eq!(outcome, Outcome::RuntimeError);
}
