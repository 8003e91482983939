use rocks::Outcome;

/// Runs `source` to completion and returns whatever it wrote to stdout,
/// decoded as UTF-8. Panics if the run didn't succeed, since most tests
/// only care about comparing output for programs that are expected to
/// run cleanly.
#[allow(dead_code)]
pub fn run_ok(source: &str) -> String {
    let mut output = Vec::new();
    let mut rocks = rocks::new(&mut output);
    let outcome = rocks.run(source);
    drop(rocks);
    assert_eq!(outcome, Outcome::Success, "expected {source:?} to run without error");
    String::from_utf8(output).expect("interpreter output must be valid UTF-8")
}

/// Runs `source` and returns its outcome plus whatever it printed,
/// without asserting success — for tests that expect a static or
/// runtime error.
#[allow(dead_code)]
pub fn run(source: &str) -> (Outcome, String) {
    let mut output = Vec::new();
    let mut rocks = rocks::new(&mut output);
    let outcome = rocks.run(source);
    drop(rocks);
    (outcome, String::from_utf8(output).expect("interpreter output must be valid UTF-8"))
}

/// Runs `source` and returns the resolver's warning count — for tests
/// asserting that a program triggers (or doesn't trigger) a warning
/// without caring about its stdout.
#[allow(dead_code)]
pub fn warning_count(source: &str) -> usize {
    let mut output = Vec::new();
    let mut rocks = rocks::new(&mut output);
    rocks.run(source);
    rocks.warning_count()
}
