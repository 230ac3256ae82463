//! Pipeline scenarios against a real temporary git repository.
//!
//! These drive `run_pipeline` with the `Git` adapter to verify branch policy
//! side effects alongside the stage report.

use sentinel::core::branch::BranchDescriptor;
use sentinel::core::report::{Stage, StageStatus};
use sentinel::core::rules::RuleSet;
use sentinel::error::ErrorKind;
use sentinel::io::git::Vcs;
use sentinel::pipeline::run_pipeline;
use sentinel::provider::MockProvider;
use sentinel::test_support::{ScriptedProvider, TestRepo};

#[test]
fn login_form_on_feature_branch_passes_all_stages() {
    let repo = TestRepo::new().expect("repo");
    repo.checkout_new("feature/x").expect("checkout");

    let report = run_pipeline(
        "a login form",
        &RuleSet::default(),
        &MockProvider::new(),
        &repo.vcs(),
        None,
    );

    assert!(report.is_success());
    assert!(report.entries().iter().all(|e| e.status == StageStatus::Ok));
    let findings = report
        .get(Stage::Audit)
        .and_then(|e| e.payload.as_findings())
        .expect("audit findings");
    assert!(findings.iter().all(|f| !f.is_empty()));
    assert_eq!(repo.current_branch().expect("branch"), "feature/x");
}

#[test]
fn protected_branch_creates_requested_branch_then_generates() {
    let repo = TestRepo::new().expect("repo");
    let branch = BranchDescriptor::new("feature", "add-login-form");

    let report = run_pipeline(
        "a login form",
        &RuleSet::default(),
        &MockProvider::new(),
        &repo.vcs(),
        Some(&branch),
    );

    assert!(report.is_success());
    assert_eq!(
        repo.current_branch().expect("branch"),
        "feature/add-login-form"
    );
}

#[test]
fn branch_creation_is_idempotent() {
    let repo = TestRepo::new().expect("repo");
    let git = repo.vcs();
    let branch = BranchDescriptor::new("bugfix", "crash");

    let first = run_pipeline("p", &RuleSet::default(), &MockProvider::new(), &git, Some(&branch));
    assert!(first.is_success());

    // Back on main, the branch now exists and is only checked out.
    git.checkout_branch("main").expect("back to main");
    let second = run_pipeline("p", &RuleSet::default(), &MockProvider::new(), &git, Some(&branch));
    assert!(second.is_success());
    assert_eq!(repo.current_branch().expect("branch"), "bugfix/crash");
}

#[test]
fn blocked_run_leaves_repository_untouched() {
    let repo = TestRepo::new().expect("repo");
    let provider = ScriptedProvider::new();

    let report = run_pipeline("p", &RuleSet::default(), &provider, &repo.vcs(), None);

    assert_eq!(report.entries().len(), 2);
    let err = report.failure().and_then(|e| e.error.as_ref()).expect("error");
    assert_eq!(err.kind, ErrorKind::BranchPolicy);
    assert_eq!(repo.current_branch().expect("branch"), "main");
    assert!(provider.generate_calls().is_empty());
}

#[test]
fn provider_failure_after_branch_switch_keeps_branch() {
    let repo = TestRepo::new().expect("repo");
    let provider = ScriptedProvider::new().generate_fails("503 service unavailable");
    let branch = BranchDescriptor::new("feature", "x");

    let report = run_pipeline("p", &RuleSet::default(), &provider, &repo.vcs(), Some(&branch));

    assert_eq!(report.failure().map(|e| e.stage), Some(Stage::TestGen));
    assert_eq!(repo.current_branch().expect("branch"), "feature/x");
}
