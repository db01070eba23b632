//! Tests of the `interop-template` binary.

use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};

use tempfile::{Builder, NamedTempFile};

fn binary() -> Command {
    let mut command = Command::new(env!("CARGO_BIN_EXE_interop-template"));
    command.env_remove("RUST_LOG");
    command
}

fn source(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("test_sources").join(name)
}

fn run(args: &[&str], file: &Path) -> Output {
    binary().arg(file).args(args).output().expect("binary runs")
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).into_owned()
}

fn temp_source(text: &str) -> NamedTempFile {
    let mut file = Builder::new().suffix(".h").tempfile().expect("temp file");
    file.write_all(text.as_bytes()).expect("write source");
    file
}

#[test]
fn default_run_specializes_foo() {
    let output = run(&[], &source("test.h"));
    assert_eq!(output.status.code(), Some(0), "stderr: {}", stderr(&output));

    let out = stdout(&output);
    let lines: Vec<&str> = out.lines().collect();
    assert_eq!(lines[0], "Found: Foo(@#0) ClassTemplate");
    assert_eq!(lines[1], "Canonical template specialization:");
    assert_eq!(lines[2], "TemplateSpecializationType 'Foo<int, 4>' canonical");
    assert!(out.contains("Size of `Foo<int, 4>` is `4` bytes"));
    assert!(out.contains("target triple = \"x86_64-unknown-linux-gnu\""));
    assert!(out.contains("%\"struct.Foo<int, 4>\" = type { i32 }"));
}

#[test]
fn missing_file_argument_is_a_usage_error() {
    let output = binary().output().expect("binary runs");
    assert_eq!(output.status.code(), Some(1));
    assert!(stdout(&output).is_empty());
    assert!(stderr(&output).contains("SOURCE_FILE"));
}

#[test]
fn help_exits_cleanly() {
    let output = binary().arg("--help").output().expect("binary runs");
    assert_eq!(output.status.code(), Some(0));
    assert!(stdout(&output).contains("--symbol"));
}

#[test]
fn unreadable_file_fails() {
    let output = run(&[], Path::new("/nonexistent/test.h"));
    assert_eq!(output.status.code(), Some(1));
    assert!(stdout(&output).is_empty());
    assert!(stderr(&output).contains("cannot read '/nonexistent/test.h'"));
}

#[test]
fn non_template_symbol_is_rejected() {
    let file = temp_source("struct Foo { int x; };\n");
    let output = run(&[], file.path());
    assert_eq!(output.status.code(), Some(1));
    assert!(stdout(&output).starts_with("Found: Foo(@#0) Record"));
    assert!(!stdout(&output).contains("Canonical"));
    assert!(stderr(&output).contains("`Foo` is not a template class, can't specialize"));
}

#[test]
fn unknown_symbol_is_reported() {
    let output = run(&["--symbol", "Bar"], &source("test.h"));
    assert_eq!(output.status.code(), Some(1));
    assert!(stdout(&output).starts_with("Not found: Bar"));
    assert!(stderr(&output).contains("`Bar`"));
}

#[test]
fn argument_count_must_match() {
    let output = run(&["--arg", "int"], &source("test.h"));
    assert_eq!(output.status.code(), Some(1));
    assert!(stderr(&output).contains("requested 1 template arguments but declaration `Foo` has 2"));
}

#[test]
fn unresolvable_token_is_named() {
    let output = run(&["--arg", "Widget", "--arg", "4"], &source("test.h"));
    assert_eq!(output.status.code(), Some(1));
    assert!(stderr(&output).contains("Widget"));
    assert!(!stdout(&output).contains("Canonical"));
}

#[test]
fn front_end_errors_have_locations() {
    let file = temp_source("template<class T> struct Foo { Missing m; };\n");
    let output = run(&[], file.path());
    assert_eq!(output.status.code(), Some(1));
    let err = stderr(&output);
    assert!(err.contains(&format!("{}:1:", file.path().display())), "{err}");
    assert!(err.contains("error: unknown type name 'Missing'"), "{err}");
}

#[test]
fn instantiation_failures_exit_nonzero() {
    let output = run(
        &["--symbol", "Countdown", "--arg", "3", "--max-depth", "8"],
        &source("containers.h"),
    );
    assert_eq!(output.status.code(), Some(1));
    assert!(stdout(&output).contains("Canonical template specialization:"));
    assert!(!stdout(&output).contains("Size of"));
    assert!(stderr(&output).contains("exceeded maximum depth of 8"));
}

#[test]
fn options_select_symbol_arguments_and_target() {
    let output = run(
        &["--symbol", "geo::Array", "--arg", "long", "--arg", "3", "--target", "i686"],
        &source("containers.h"),
    );
    assert_eq!(output.status.code(), Some(0), "stderr: {}", stderr(&output));
    let out = stdout(&output);
    assert!(out.contains("Size of `geo::Array<long, 3>` is `12` bytes"));
    assert!(out.contains("target triple = \"i686-unknown-linux-gnu\""));
    assert!(out.contains("@_ZNK3geo5ArrayIlLi3EE4sizeEv"));
}
