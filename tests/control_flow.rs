mod common;

use common::run_ok;

#[test]
fn for_loop_desugars_and_break_unwinds_it() {
    let source = r#"
        for (var i = 0; i < 3; i = i + 1) {
            if (i == 2) break;
            print i;
        }
    "#;
    assert_eq!(run_ok(source), "0\n1\n");
}

#[test]
fn while_loop_break_stops_only_the_innermost_loop() {
    let source = r#"
        var i = 0;
        while (i < 5) {
            i = i + 1;
            if (i == 2) break;
        }
        print i;
    "#;
    assert_eq!(run_ok(source), "2\n");
}

#[test]
fn ternary_evaluates_exactly_one_branch() {
    let source = r#"
        fun loud(label, value) { print label; return value; }
        print true ? loud("then", 1) : loud("else", 2);
    "#;
    assert_eq!(run_ok(source), "then\n1\n");
}

#[test]
fn or_short_circuits_and_returns_the_operand_itself() {
    let source = r#"print false or "x";"#;
    assert_eq!(run_ok(source), "x\n");
}

#[test]
fn and_short_circuits_and_returns_the_operand_itself() {
    let source = r#"print true and nil;"#;
    assert_eq!(run_ok(source), "nil\n");
}

#[test]
fn and_does_not_evaluate_its_right_operand_when_short_circuited() {
    let source = r#"
        fun boom() { return 1 / 0; }
        print false and boom();
    "#;
    assert_eq!(run_ok(source), "false\n");
}

#[test]
fn truthiness_only_nil_and_false_are_falsey() {
    let source = r#"
        if (0) print "zero is truthy"; else print "zero is falsey";
        if ("") print "empty string is truthy"; else print "empty string is falsey";
        if (0.0) print "zero point zero is truthy"; else print "zero point zero is falsey";
        if (nil) print "nil is truthy"; else print "nil is falsey";
        if (false) print "false is truthy"; else print "false is falsey";
    "#;
    assert_eq!(
        run_ok(source),
        "zero is truthy\nempty string is truthy\nzero point zero is truthy\nnil is falsey\nfalse is falsey\n"
    );
}
