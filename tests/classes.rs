mod common;

use common::{run, run_ok, warning_count};
use rocks::Outcome;

#[test]
fn inheritance_dispatches_through_super() {
    let source = r#"
        class A {
            m() { print "A"; }
        }
        class B < A {
            m() {
                super.m();
                print "B";
            }
        }
        B().m();
    "#;
    assert_eq!(run_ok(source), "A\nB\n");
}

#[test]
fn method_reference_keeps_its_bound_receiver() {
    let source = r#"
        class Thing {
            getName() { return this.name; }
        }
        var t = Thing();
        t.name = "widget";
        var getName = t.getName;
        print getName();
    "#;
    assert_eq!(run_ok(source), "widget\n");
}

#[test]
fn getter_is_invoked_without_call_parens() {
    let source = r#"
        class Counter {
            init() { this.n = 0; }
            tick {
                this.n = this.n + 1;
                return this.n;
            }
        }
        var c = Counter();
        print c.tick;
        print c.tick;
    "#;
    assert_eq!(run_ok(source), "1\n2\n");
}

#[test]
fn bare_return_in_initializer_yields_the_instance() {
    let source = r#"
        class Box {
            init(value) {
                this.value = value;
                return;
            }
        }
        print Box(7).value;
    "#;
    assert_eq!(run_ok(source), "7\n");
}

#[test]
fn field_assignment_and_instance_stringification() {
    let source = r#"
        class Point {}
        var p = Point();
        p.x = 1;
        print p;
    "#;
    assert_eq!(run_ok(source), "Point instance\n");
}

#[test]
fn subclass_inherits_unoverridden_methods() {
    let source = r#"
        class Animal {
            speak() { print "..."; }
        }
        class Dog < Animal {}
        Dog().speak();
    "#;
    assert_eq!(run_ok(source), "...\n");
}

#[test]
fn unbounded_getter_recursion_is_a_reported_runtime_error_not_a_crash() {
    let source = r#"
        class Loop {
            again { return this.again; }
        }
        Loop().again;
    "#;
    let (outcome, _) = run(source);
    assert_eq!(outcome, Outcome::RuntimeError);
}

#[test]
fn a_class_whose_methods_never_read_this_gets_no_unused_variable_warning() {
    let source = r#"
        class Point {
            describe() { print "a point"; }
        }
        Point().describe();
    "#;
    assert_eq!(warning_count(source), 0);
}

#[test]
fn a_subclass_whose_method_never_reads_super_gets_no_unused_variable_warning() {
    let source = r#"
        class A {
            m() { print "A"; }
        }
        class B < A {
            n() { print "B"; }
        }
        B().n();
    "#;
    assert_eq!(warning_count(source), 0);
}

#[test]
fn class_can_construct_sibling_instance_of_itself() {
    let source = r#"
        class Node {
            init(v) { this.v = v; }
            twin() { return Node(this.v); }
        }
        print Node(9).twin().v;
    "#;
    assert_eq!(run_ok(source), "9\n");
}
