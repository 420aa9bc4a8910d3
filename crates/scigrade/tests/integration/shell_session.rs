//! End-to-end evaluations through the real shell runner, with `/bin/sh`
//! standing in for the interpreter

#![cfg(unix)]

use std::path::PathBuf;
#[cfg(target_os = "linux")]
use std::time::Duration;

use scigrade::{Evaluator, Submission, TERMINATION_WARNING, TestCase};

use super::{entries, test_config};

fn fake_interpreter(root: &std::path::Path, script: &str) -> Evaluator {
    let mut config = test_config(root);
    config.interpreter.binary = PathBuf::from("/bin/sh");
    config.interpreter.args = vec!["-c".to_owned(), script.to_owned()];
    Evaluator::new(config)
}

#[tokio::test]
async fn test_interpreter_receives_directives() {
    let root = tempfile::TempDir::new().unwrap();
    let evaluator = fake_interpreter(root.path(), "cat; exit 3");

    let verdict = evaluator
        .evaluate(&Submission::new("x = 1"), &TestCase::new("/srv/tests/test.sci"))
        .await
        .unwrap();

    assert!(!verdict.success);
    assert_eq!(
        verdict.error.as_deref(),
        Some("Message\nlines(0)\nexec('/srv/tests/test.sci',2);\nquit();")
    );
    assert_eq!(entries(root.path()), 0);
}

#[tokio::test]
async fn test_reserved_status_passes() {
    let root = tempfile::TempDir::new().unwrap();
    let evaluator = fake_interpreter(root.path(), "cat > /dev/null; exit 5");

    let verdict = evaluator
        .evaluate(
            &Submission::new("x = 1").with_partial_grading(true),
            &TestCase::new("/srv/tests/test.sci"),
        )
        .await
        .unwrap();

    assert!(verdict.success);
    assert_eq!(verdict.mark_fraction, 1.0);
}

#[tokio::test]
async fn test_interpreter_runs_in_staging_dir() {
    let root = tempfile::TempDir::new().unwrap();
    let evaluator = fake_interpreter(root.path(), "cat function.sci; exit 3");

    let verdict = evaluator
        .evaluate(
            &Submission::new("disp('hello')\nquit\n"),
            &TestCase::new("/srv/tests/test.sci"),
        )
        .await
        .unwrap();

    let error = verdict.error.unwrap();
    assert!(error.starts_with(TERMINATION_WARNING));
    assert!(error.ends_with("Message\ndisp('hello')"));
}

#[tokio::test]
async fn test_error_record_from_interpreter() {
    let root = tempfile::TempDir::new().unwrap();
    let evaluator = fake_interpreter(
        root.path(),
        "printf '  !--error 4 \\nUndefined variable: d\\n'; exit 5",
    );

    let verdict = evaluator
        .evaluate(&Submission::new("x = 1"), &TestCase::new("/srv/tests/test.sci"))
        .await
        .unwrap();

    assert!(!verdict.success);
    assert_eq!(
        verdict.error.as_deref(),
        Some("!--error 4 \nUndefined variable: d")
    );
}

#[tokio::test]
async fn test_stderr_does_not_affect_verdict() {
    let root = tempfile::TempDir::new().unwrap();
    let evaluator = fake_interpreter(root.path(), "echo '!warning' >&2; echo 'noise' >&2; exit 5");

    let verdict = evaluator
        .evaluate(&Submission::new("x = 1"), &TestCase::new("/srv/tests/test.sci"))
        .await
        .unwrap();

    assert!(verdict.success);
}

/// Whether `pid` is still running (zombies count as gone)
#[cfg(target_os = "linux")]
fn process_alive(pid: i32) -> bool {
    match std::fs::read_to_string(format!("/proc/{pid}/stat")) {
        Ok(stat) => stat
            .rsplit_once(')')
            .is_some_and(|(_, rest)| !rest.trim_start().starts_with('Z')),
        Err(_) => false,
    }
}

#[cfg(target_os = "linux")]
async fn wait_for_pid(path: &std::path::Path) -> i32 {
    for _ in 0..250 {
        if let Ok(content) = std::fs::read_to_string(path)
            && let Ok(pid) = content.trim().parse()
        {
            return pid;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
    panic!("no pid written to {}", path.display());
}

#[cfg(target_os = "linux")]
#[tokio::test]
async fn test_cancelled_evaluation_leaves_nothing_behind() {
    let root = tempfile::TempDir::new().unwrap();
    let scratch = tempfile::TempDir::new().unwrap();
    let pid_file = scratch.path().join("interpreter.pid");

    // The interpreter records its pid, then hangs in the staging directory
    let script = format!(
        "echo $$ > '{}'; exec sleep 30",
        pid_file.display()
    );
    let evaluator = fake_interpreter(root.path(), &script);
    let submission = Submission::new("x = 1");
    let test_case = TestCase::new("/srv/tests/test.sci");

    let mut evaluation = Box::pin(evaluator.evaluate(&submission, &test_case));
    let pid = tokio::select! {
        _ = &mut evaluation => panic!("evaluation finished before it was cancelled"),
        pid = wait_for_pid(&pid_file) => pid,
    };
    assert!(process_alive(pid));
    assert_eq!(entries(root.path()), 1);

    let cancelled = tokio::time::timeout(Duration::from_millis(200), &mut evaluation).await;
    assert!(cancelled.is_err());
    drop(evaluation);

    assert_eq!(entries(root.path()), 0);

    let mut alive = true;
    for _ in 0..100 {
        alive = process_alive(pid);
        if !alive {
            break;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
    assert!(!alive, "interpreter {pid} survived cancellation");
    assert_eq!(entries(root.path()), 0);
}
