use assert_cmd::Command;

#[test]
fn clean_script_exits_zero_and_prints_its_output() {
    Command::cargo_bin("rocks")
        .unwrap()
        .arg("tests/fixtures/clean_run.lox")
        .assert()
        .success()
        .stdout("hello, rocks\n");
}

#[test]
fn undefined_variable_exits_seventy() {
    Command::cargo_bin("rocks")
        .unwrap()
        .arg("tests/fixtures/undefined_variable.lox")
        .assert()
        .code(70);
}

#[test]
fn type_error_exits_seventy() {
    Command::cargo_bin("rocks")
        .unwrap()
        .arg("tests/fixtures/type_error.lox")
        .assert()
        .code(70);
}

#[test]
fn return_at_top_level_exits_sixty_five() {
    Command::cargo_bin("rocks")
        .unwrap()
        .arg("tests/fixtures/return_at_top_level.lox")
        .assert()
        .code(65);
}

#[test]
fn too_many_arguments_exits_sixty_four() {
    Command::cargo_bin("rocks")
        .unwrap()
        .arg("tests/fixtures/clean_run.lox")
        .arg("extra")
        .assert()
        .code(64);
}

#[test]
fn missing_script_exits_with_an_io_error() {
    Command::cargo_bin("rocks")
        .unwrap()
        .arg("tests/fixtures/does_not_exist.lox")
        .assert()
        .code(74);
}
