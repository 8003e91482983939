mod common;

use common::run_ok;

#[test]
fn counter_retains_independent_state_across_calls() {
    let source = r#"
        fun makeCounter() {
            var n = 0;
            fun count() {
                n = n + 1;
                return n;
            }
            return count;
        }

        var a = makeCounter();
        var b = makeCounter();
        print a();
        print a();
        print b();
    "#;
    assert_eq!(run_ok(source), "1\n2\n1\n");
}

#[test]
fn global_shadowed_by_block_local_is_restored_on_exit() {
    let source = r#"
        var a = 1;
        {
            var a = 2;
            print a;
        }
        print a;
    "#;
    assert_eq!(run_ok(source), "2\n1\n");
}

#[test]
fn function_captures_environment_at_definition_not_call() {
    let source = r#"
        var a = "global";
        fun show() { print a; }
        fun run(f) { f(); }
        {
            var a = "local";
            run(show);
        }
    "#;
    assert_eq!(run_ok(source), "global\n");
}

#[test]
fn curried_function_returns_a_closure() {
    let source = r#"
        fun make(n) {
            fun add(x) { return x + n; }
            return add;
        }
        print make(10)(5);
    "#;
    assert_eq!(run_ok(source), "15\n");
}

#[test]
fn anonymous_function_expression_is_callable() {
    let source = r#"
        var square = fun(x) { return x * x; };
        print square(4);
    "#;
    assert_eq!(run_ok(source), "16\n");
}
