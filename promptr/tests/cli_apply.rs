//! CLI tests for execute (direct-apply) mode.
//!
//! Spawns the promptr binary with a payload piped on stdin and verifies
//! file-system effects and exit codes.

use std::io::Write;
use std::path::Path;
use std::process::{Command, Output, Stdio};

use promptr::exit_codes;
use promptr::test_support::project_dir;

fn run_execute(dir: &Path, payload: &str, extra_args: &[&str]) -> Output {
    let mut child = Command::new(env!("CARGO_BIN_EXE_promptr"))
        .current_dir(dir)
        .args(["-m", "execute"])
        .args(extra_args)
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .expect("spawn promptr");
    child
        .stdin
        .as_mut()
        .expect("stdin")
        .write_all(payload.as_bytes())
        .expect("write payload");
    child.wait_with_output().expect("wait for promptr")
}

#[test]
fn piped_batch_is_applied_with_soft_delete_warning() {
    let temp = project_dir();
    let payload =
        r#"{"operations":[{"kind":"create","path":"a.txt","content":"hi"},{"kind":"delete","path":"b.txt"}]}"#;

    let output = run_execute(temp.path(), payload, &[]);

    assert_eq!(output.status.code(), Some(exit_codes::OK));
    assert_eq!(
        std::fs::read_to_string(temp.path().join("a.txt")).expect("read"),
        "hi"
    );
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("create a.txt: applied"));
    assert!(stdout.contains("delete b.txt: skipped (file does not exist)"));
    assert!(stdout.contains("1 created, 0 updated, 0 deleted, 0 failed"));
}

#[test]
fn empty_batch_succeeds_with_no_effects() {
    let temp = project_dir();

    let output = run_execute(temp.path(), r#"{"operations":[]}"#, &[]);

    assert_eq!(output.status.code(), Some(exit_codes::OK));
    assert_eq!(std::fs::read_dir(temp.path()).expect("read dir").count(), 0);
}

#[test]
fn malformed_payload_exits_invalid() {
    let temp = project_dir();

    let output = run_execute(temp.path(), "this is not a payload", &[]);

    assert_eq!(output.status.code(), Some(exit_codes::INVALID));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("decode piped operations payload"));
}

#[test]
fn traversal_path_rejects_whole_batch_without_effects() {
    let temp = project_dir();
    let payload = r#"{"operations":[{"kind":"create","path":"ok.txt","content":"x"},{"kind":"update","path":"../../etc/passwd","content":"x"}]}"#;

    let output = run_execute(temp.path(), payload, &[]);

    assert_eq!(output.status.code(), Some(exit_codes::INVALID));
    assert!(!temp.path().join("ok.txt").exists());
}

#[test]
fn unsupported_kind_rejects_whole_batch() {
    let temp = project_dir();
    let payload = r#"{"operations":[{"kind":"rename","path":"a.txt","content":"x"}]}"#;

    let output = run_execute(temp.path(), payload, &[]);

    assert_eq!(output.status.code(), Some(exit_codes::INVALID));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("unsupported operation kind 'rename'"));
}

#[test]
fn dry_run_prints_batch_without_applying() {
    let temp = project_dir();
    let payload = r#"{"operations":[{"kind":"create","path":"a.txt","content":"hi"}]}"#;

    let output = run_execute(temp.path(), payload, &["--dry-run"]);

    assert_eq!(output.status.code(), Some(exit_codes::OK));
    assert!(!temp.path().join("a.txt").exists());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains(r#""kind": "create""#));
    assert!(stdout.contains(r#""path": "a.txt""#));
}

#[test]
fn reapplying_the_same_batch_is_idempotent() {
    let temp = project_dir();
    let payload =
        r#"{"operations":[{"kind":"create","path":"a.txt","content":"hi"},{"kind":"delete","path":"gone.txt"}]}"#;

    let first = run_execute(temp.path(), payload, &[]);
    let second = run_execute(temp.path(), payload, &[]);

    assert_eq!(first.status.code(), Some(exit_codes::OK));
    assert_eq!(second.status.code(), Some(exit_codes::OK));
    assert_eq!(
        std::fs::read_to_string(temp.path().join("a.txt")).expect("read"),
        "hi"
    );
}
