// Exit status and output of the pm0vm binary

use std::fs;
use std::path::PathBuf;
use std::process::{Command, Output, Stdio};

/// Write `source` to a per-test file in the system temp directory
fn program_file(name: &str, source: &str) -> PathBuf {
    let path = std::env::temp_dir().join(format!("pm0vm-{}-{}.txt", std::process::id(), name));
    fs::write(&path, source).expect("Failed to write program file");
    path
}

fn run(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_pm0vm"))
        .args(args)
        .stdin(Stdio::null())
        .output()
        .expect("Failed to start pm0vm")
}

fn run_program(name: &str, source: &str, flags: &[&str]) -> Output {
    let path = program_file(name, source);
    let path_arg = path.to_string_lossy().into_owned();
    let mut args = vec![path_arg.as_str()];
    args.extend_from_slice(flags);
    let output = run(&args);
    let _ = fs::remove_file(&path);
    output
}

fn stdout_lines(output: &Output) -> Vec<String> {
    String::from_utf8_lossy(&output.stdout)
        .lines()
        .map(str::to_string)
        .collect()
}

#[test]
fn test_normal_halt_exits_zero() {
    let output = run(&["demos/add.txt"]);

    assert_eq!(output.status.code(), Some(0));
    let lines = stdout_lines(&output);
    assert_eq!(lines[0], "\t\t\t\tPC\tBP\tSP\tstack");
    assert_eq!(lines[1], "Initial values:\t\t\t10\t499\t500");
    assert!(lines.iter().any(|line| line == "Output result is: 8"));
}

#[test]
fn test_quiet_prints_only_program_output() {
    let output = run(&["demos/countdown.txt", "--quiet"]);

    assert_eq!(output.status.code(), Some(0));
    assert_eq!(
        stdout_lines(&output),
        vec![
            "Output result is: 3",
            "Output result is: 2",
            "Output result is: 1",
        ]
    );
}

#[test]
fn test_unknown_instruction_exit_status() {
    let output = run_program("unknown", "99 0 0\n", &[]);
    assert_eq!(output.status.code(), Some(0));
    assert!(stdout_lines(&output)
        .iter()
        .any(|line| line == "Error: Unknown instruction 99"));
    assert!(String::from_utf8_lossy(&output.stderr).contains("after 0 steps"));

    let output = run_program("unknown-strict", "99 0 0\n", &["--strict"]);
    assert_eq!(output.status.code(), Some(2));
}

#[test]
fn test_runtime_fault_exits_two() {
    let output = run_program("div-zero", "1 0 7\n1 0 0\n2 0 4\n9 0 3\n", &[]);

    assert_eq!(output.status.code(), Some(2));
    assert!(String::from_utf8_lossy(&output.stderr).contains("Division by zero"));
}

#[test]
fn test_missing_input_exits_two() {
    // stdin is closed, so SYS input cannot be satisfied
    let output = run_program("no-input", "9 0 2\n9 0 1\n9 0 3\n", &[]);
    assert_eq!(output.status.code(), Some(2));
}

#[test]
fn test_load_errors_exit_one() {
    assert_eq!(run(&[]).status.code(), Some(1));
    assert_eq!(run(&["demos/add.txt", "--bogus"]).status.code(), Some(1));
    assert_eq!(
        run(&["demos/does-not-exist.txt"]).status.code(),
        Some(1)
    );

    let output = run_program("parse-error", "1 0 5\n9 x 1\n", &[]);
    assert_eq!(output.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&output.stderr).contains("line 2"));

    let too_big = "9 0 3\n".repeat(164);
    let output = run_program("too-big", &too_big, &[]);
    assert_eq!(output.status.code(), Some(1));
}
