//! Evaluations against a real `scilab-cli`

use scigrade::{Evaluator, Submission, TERMINATION_WARNING, TestCase};

use super::{entries, fixture_path, fixture_source, test_config};

fn reference() -> TestCase {
    TestCase::new(fixture_path("test_add.sci").to_string_lossy())
}

#[tokio::test]
#[ignore = "requires scilab-cli"]
async fn test_correct_submission_passes() {
    let root = tempfile::TempDir::new().unwrap();
    let evaluator = Evaluator::new(test_config(root.path()));

    let verdict = evaluator
        .evaluate(
            &Submission::new(fixture_source("add_correct.sci")).with_partial_grading(true),
            &reference(),
        )
        .await
        .expect("Evaluation failed");

    assert!(verdict.success, "unexpected failure: {:?}", verdict.error);
    assert_eq!(verdict.mark_fraction, 1.0);
    assert_eq!(entries(root.path()), 0);
}

#[tokio::test]
#[ignore = "requires scilab-cli"]
async fn test_wrong_submission_reports_output() {
    let root = tempfile::TempDir::new().unwrap();
    let evaluator = Evaluator::new(test_config(root.path()));

    let verdict = evaluator
        .evaluate(&Submission::new(fixture_source("add_wrong.sci")), &reference())
        .await
        .expect("Evaluation failed");

    assert!(!verdict.success);
    let error = verdict.error.unwrap();
    assert!(error.starts_with("Message\n"));
    assert!(error.contains("Expected output: 8"));
}

#[tokio::test]
#[ignore = "requires scilab-cli"]
async fn test_undefined_variable_reports_error_record() {
    let root = tempfile::TempDir::new().unwrap();
    let evaluator = Evaluator::new(test_config(root.path()));

    let verdict = evaluator
        .evaluate(&Submission::new(fixture_source("add_undefined.sci")), &reference())
        .await
        .expect("Evaluation failed");

    assert!(!verdict.success);
    assert!(verdict.error.unwrap().starts_with('!'));
}

#[tokio::test]
#[ignore = "requires scilab-cli"]
async fn test_submission_cannot_fake_success() {
    let root = tempfile::TempDir::new().unwrap();
    let evaluator = Evaluator::new(test_config(root.path()));

    // Correct code plus a stray exit(5): the exit is stripped and the
    // reference decides
    let verdict = evaluator
        .evaluate(&Submission::new(fixture_source("add_with_exit.sci")), &reference())
        .await
        .expect("Evaluation failed");
    assert!(verdict.success, "unexpected failure: {:?}", verdict.error);

    // Wrong code with an exit(5) appended must still fail, with the warning
    let cheat = format!("{}\nexit(5)\n", fixture_source("add_wrong.sci"));
    let verdict = evaluator
        .evaluate(&Submission::new(cheat), &reference())
        .await
        .expect("Evaluation failed");
    assert!(!verdict.success);
    assert!(verdict.error.unwrap().starts_with(TERMINATION_WARNING));
}
