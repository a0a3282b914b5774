use std::fs;
use std::path::Path;
use std::process::{Command, Output};

use pretty_assertions::assert_eq;

fn preproc(dir: &Path, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_preproc"))
        .current_dir(dir)
        .env_remove("PREPROC_LOG")
        .args(args)
        .output()
        .unwrap()
}

fn stdout(output: &Output) -> String {
    String::from_utf8(output.stdout.clone()).unwrap()
}

#[test]
fn defines_apply_in_command_line_order() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("main.c"), "A B C\n").unwrap();

    let output = preproc(
        dir.path(),
        &["-D", "A=1", "-U", "A", "-D", "B=2", "--define", "C", "main.c"],
    );

    assert_eq!(output.status.code(), Some(0));
    assert_eq!(stdout(&output), "# 1 \"main.c\" 1\nA 2 \n");
}

#[test]
fn missing_input_exits_with_io_code() {
    let dir = tempfile::tempdir().unwrap();

    let output = preproc(dir.path(), &["missing.c"]);

    assert_eq!(output.status.code(), Some(2));
    assert_eq!(stdout(&output), "");
    assert!(String::from_utf8_lossy(&output.stderr).contains("missing.c"));
}

#[test]
fn errors_in_the_source_exit_with_one() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("main.c"), "#ifdef OPEN\n").unwrap();

    let output = preproc(dir.path(), &["--color", "never", "main.c"]);

    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("unterminated conditional directive"));
    assert!(stderr.contains("main.c:1:1"));
}

#[test]
fn warnings_fail_only_when_treated_as_errors() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("main.c"), "#define X 1\n#define X 2\nX\n").unwrap();

    let output = preproc(dir.path(), &["--color", "never", "--pedantic", "main.c"]);
    assert_eq!(output.status.code(), Some(0));
    assert!(String::from_utf8_lossy(&output.stderr).contains("`X` redefined"));

    let output = preproc(
        dir.path(),
        &["--color", "never", "--pedantic", "--warnings-as-errors", "main.c"],
    );
    assert_eq!(output.status.code(), Some(1));
    assert_eq!(stdout(&output), "# 1 \"main.c\" 1\n\n\n2\n");
}

#[test]
fn output_file_and_temp_output() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("main.c"), "#define V 7\nV\n").unwrap();

    let output = preproc(dir.path(), &["-o", "main.i", "main.c"]);
    assert_eq!(output.status.code(), Some(0));
    assert_eq!(stdout(&output), "");
    assert_eq!(
        fs::read_to_string(dir.path().join("main.i")).unwrap(),
        "# 1 \"main.c\" 1\n\n7\n"
    );

    let output = preproc(dir.path(), &["--temp-output", "abc", "main.c"]);
    assert_eq!(output.status.code(), Some(0));
    let printed = stdout(&output);
    let path = Path::new(printed.trim_end());
    assert!(path
        .file_name()
        .and_then(|name| name.to_str())
        .map_or(false, |name| name.starts_with("abc.")));
    assert_eq!(fs::read_to_string(path).unwrap(), "# 1 \"main.c\" 1\n\n7\n");
}

#[test]
fn stdin_is_read_without_a_path() {
    use std::io::Write;
    use std::process::Stdio;

    let dir = tempfile::tempdir().unwrap();
    let mut child = Command::new(env!("CARGO_BIN_EXE_preproc"))
        .current_dir(dir.path())
        .args(["-D", "X=y", "-"])
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .spawn()
        .unwrap();
    child.stdin.take().unwrap().write_all(b"X\n").unwrap();
    let output = child.wait_with_output().unwrap();

    assert_eq!(output.status.code(), Some(0));
    assert_eq!(stdout(&output), "# 1 \"\" 1\ny\n");
}

#[test]
fn bad_arguments_use_clap_exit() {
    let dir = tempfile::tempdir().unwrap();

    let output = preproc(dir.path(), &["--color", "sometimes"]);

    assert_eq!(output.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&output.stderr).contains("sometimes"));
}
