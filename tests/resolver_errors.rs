mod common;

use common::run;
use rocks::Outcome;

#[test]
fn return_at_top_level_is_a_static_error() {
    let (outcome, _) = run("return 1;");
    assert_eq!(outcome, Outcome::StaticError);
}

#[test]
fn break_outside_a_loop_is_a_static_error() {
    let (outcome, _) = run("break;");
    assert_eq!(outcome, Outcome::StaticError);
}

#[test]
fn break_inside_a_function_nested_in_a_loop_is_a_static_error() {
    let source = r#"
        while (true) {
            fun f() { break; }
            f();
        }
    "#;
    let (outcome, _) = run(source);
    assert_eq!(outcome, Outcome::StaticError);
}

#[test]
fn returning_a_value_from_an_initializer_is_a_static_error() {
    let source = r#"
        class Thing {
            init() { return 1; }
        }
    "#;
    let (outcome, _) = run(source);
    assert_eq!(outcome, Outcome::StaticError);
}

#[test]
fn this_outside_a_class_is_a_static_error() {
    let (outcome, _) = run("print this;");
    assert_eq!(outcome, Outcome::StaticError);
}

#[test]
fn redeclaring_a_local_in_the_same_scope_is_a_static_error() {
    let source = r#"
        {
            var a = 1;
            var a = 2;
        }
    "#;
    let (outcome, _) = run(source);
    assert_eq!(outcome, Outcome::StaticError);
}

#[test]
fn reading_a_local_in_its_own_initializer_is_a_static_error() {
    let source = "{ var a = a; }";
    let (outcome, _) = run(source);
    assert_eq!(outcome, Outcome::StaticError);
}

#[test]
fn getter_named_init_is_a_static_error() {
    let source = r#"
        class Thing {
            init { return 1; }
        }
    "#;
    let (outcome, _) = run(source);
    assert_eq!(outcome, Outcome::StaticError);
}

#[test]
fn class_inheriting_from_itself_is_a_static_error() {
    let (outcome, _) = run("class A < A {}");
    assert_eq!(outcome, Outcome::StaticError);
}

#[test]
fn super_outside_a_subclass_is_a_static_error() {
    let source = r#"
        class A {
            m() { super.m(); }
        }
    "#;
    let (outcome, _) = run(source);
    assert_eq!(outcome, Outcome::StaticError);
}

#[test]
fn unused_local_is_a_warning_not_an_error() {
    let source = "{ var unused = 1; }";
    let (outcome, _) = run(source);
    assert_eq!(outcome, Outcome::Success);
}

#[test]
fn declaration_without_initializer_is_a_warning_not_an_error() {
    let source = "var a; print a;";
    let (outcome, output) = run(source);
    assert_eq!(outcome, Outcome::Success);
    assert_eq!(output, "nil\n");
}
