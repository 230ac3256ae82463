//! Orchestration for `sentinel create`.
//!
//! Five stages run strictly in order: rules → branch check → test generation
//! → code generation → security audit. The first failed stage ends the run;
//! everything recorded up to and including that stage stays in the report.

use tracing::{info, instrument, warn};

use crate::core::branch::{BranchDecision, BranchDescriptor};
use crate::core::report::{PipelineReport, Stage, StagePayload, StageResult};
use crate::core::rules::RuleSet;
use crate::error::SentinelError;
use crate::governor::enforce_branch_policy;
use crate::io::git::Vcs;
use crate::prompt::{PromptEngine, test_request};
use crate::provider::{Provider, ProviderError};

/// Run the governance pipeline and return the report of every attempted
/// stage.
///
/// This never returns early with an error: failures are recorded as the
/// last entry of the report.
#[instrument(skip_all, fields(provider = provider.name()))]
pub fn run_pipeline<V: Vcs + ?Sized>(
    prompt: &str,
    rules: &RuleSet,
    provider: &dyn Provider,
    vcs: &V,
    branch: Option<&BranchDescriptor>,
) -> PipelineReport {
    let prompts = PromptEngine::new();
    let mut report = PipelineReport::new();

    report.push(StageResult::ok(
        Stage::Rules,
        StagePayload::Text(rules.summary()),
    ));

    let Some(switched_to) = record(
        &mut report,
        Stage::BranchCheck,
        check_branch(rules, vcs, branch),
        |switched: &Option<String>| match switched {
            Some(target) => StagePayload::Text(target.clone()),
            None => StagePayload::Empty,
        },
    ) else {
        return report;
    };
    if let Some(target) = &switched_to {
        info!(branch = %target, "working branch ready");
    }

    let Some(tests) = record(
        &mut report,
        Stage::TestGen,
        generate_tests(&prompts, provider, prompt, rules),
        |tests: &String| StagePayload::Text(tests.clone()),
    ) else {
        return report;
    };

    let Some(code) = record(
        &mut report,
        Stage::CodeGen,
        generate_code(&prompts, provider, prompt, rules, &tests),
        |code: &String| StagePayload::Text(code.clone()),
    ) else {
        return report;
    };

    record(
        &mut report,
        Stage::Audit,
        provider.audit_security(&code).map_err(SentinelError::from),
        |findings: &Vec<String>| StagePayload::Findings(findings.clone()),
    );

    report
}

/// Append the stage outcome; `None` means the stage failed and the run ends.
fn record<T>(
    report: &mut PipelineReport,
    stage: Stage,
    outcome: Result<T, SentinelError>,
    payload: impl FnOnce(&T) -> StagePayload,
) -> Option<T> {
    match outcome {
        Ok(value) => {
            info!(stage = stage.label(), "stage ok");
            report.push(StageResult::ok(stage, payload(&value)));
            Some(value)
        }
        Err(err) => {
            warn!(stage = stage.label(), kind = err.kind().as_str(), error = %err, "stage failed");
            report.push(StageResult::failed(stage, &err));
            None
        }
    }
}

fn check_branch<V: Vcs + ?Sized>(
    rules: &RuleSet,
    vcs: &V,
    branch: Option<&BranchDescriptor>,
) -> Result<Option<String>, SentinelError> {
    match enforce_branch_policy(rules, vcs, branch)? {
        BranchDecision::Allowed { switched_to } => Ok(switched_to),
        BranchDecision::Blocked(reason) => Err(SentinelError::BranchPolicy(reason)),
    }
}

fn generate_tests(
    prompts: &PromptEngine,
    provider: &dyn Provider,
    prompt: &str,
    rules: &RuleSet,
) -> Result<String, SentinelError> {
    let context = prompts.test_context(rules).map_err(context_error)?;
    Ok(provider.generate_code(&test_request(prompt), &context)?)
}

fn generate_code(
    prompts: &PromptEngine,
    provider: &dyn Provider,
    prompt: &str,
    rules: &RuleSet,
    tests: &str,
) -> Result<String, SentinelError> {
    let context = prompts.code_context(rules, tests).map_err(context_error)?;
    Ok(provider.generate_code(prompt, &context)?)
}

fn context_error(err: anyhow::Error) -> SentinelError {
    SentinelError::Provider(ProviderError::Other(format!("build context: {err:#}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::report::StageStatus;
    use crate::core::rules::BranchCheck;
    use crate::error::ErrorKind;
    use crate::provider::MockProvider;
    use crate::test_support::{ScriptedProvider, ScriptedVcs, VcsCall};

    fn stages(report: &PipelineReport) -> Vec<(Stage, StageStatus)> {
        report
            .entries()
            .iter()
            .map(|entry| (entry.stage, entry.status))
            .collect()
    }

    #[test]
    fn all_stages_pass_on_unprotected_branch() {
        let vcs = ScriptedVcs::on_branch("feature/x");
        let provider = ScriptedProvider::new()
            .generates("def test_login(): ...")
            .generates("def login(): ...")
            .audits(&["A01: broken access control"]);

        let report = run_pipeline("a login form", &RuleSet::default(), &provider, &vcs, None);

        assert!(report.is_success());
        let expected: Vec<_> = Stage::ALL.iter().map(|s| (*s, StageStatus::Ok)).collect();
        assert_eq!(stages(&report), expected);
        assert_eq!(
            report.get(Stage::CodeGen).and_then(|e| e.payload.as_text()),
            Some("def login(): ...")
        );
        assert_eq!(
            report.get(Stage::Audit).and_then(|e| e.payload.as_findings()),
            Some(&["A01: broken access control".to_string()][..])
        );
        assert_eq!(report.get(Stage::BranchCheck).map(|e| &e.payload), Some(&StagePayload::Empty));
    }

    #[test]
    fn stages_call_provider_in_test_first_order() {
        let vcs = ScriptedVcs::on_branch("feature/x");
        let provider = ScriptedProvider::new()
            .generates("TESTS-123")
            .generates("CODE-456");

        run_pipeline("a login form", &RuleSet::default(), &provider, &vcs, None);

        let calls = provider.generate_calls();
        assert_eq!(calls.len(), 2);
        assert_eq!(calls[0].prompt, "Write tests for: a login form");
        assert!(calls[0].context.contains("BEFORE any implementation"));
        assert_eq!(calls[1].prompt, "a login form");
        assert!(calls[1].context.contains("TESTS-123"));
        assert_eq!(provider.audit_calls(), vec!["CODE-456".to_string()]);
    }

    #[test]
    fn empty_audit_is_ok_with_empty_findings() {
        let vcs = ScriptedVcs::on_branch("feature/x");
        let provider = ScriptedProvider::new().generates("t").generates("c");

        let report = run_pipeline("p", &RuleSet::default(), &provider, &vcs, None);

        assert!(report.is_success());
        assert_eq!(
            report.get(Stage::Audit).map(|e| &e.payload),
            Some(&StagePayload::Findings(Vec::new()))
        );
    }

    #[test]
    fn test_gen_failure_short_circuits() {
        let vcs = ScriptedVcs::on_branch("feature/x");
        let provider = ScriptedProvider::new().generate_fails("401 unauthorized");

        let report = run_pipeline("p", &RuleSet::default(), &provider, &vcs, None);

        assert_eq!(
            stages(&report),
            vec![
                (Stage::Rules, StageStatus::Ok),
                (Stage::BranchCheck, StageStatus::Ok),
                (Stage::TestGen, StageStatus::Failed),
            ]
        );
        let failure = report.failure().and_then(|e| e.error.as_ref()).expect("error");
        assert_eq!(failure.kind, ErrorKind::Provider);
        assert!(failure.message.contains("401 unauthorized"));
        assert!(report.get(Stage::CodeGen).is_none());
        assert!(provider.audit_calls().is_empty());
    }

    #[test]
    fn code_gen_failure_keeps_generated_tests() {
        let vcs = ScriptedVcs::on_branch("feature/x");
        let provider = ScriptedProvider::new()
            .generates("tests")
            .generate_fails("timeout");

        let report = run_pipeline("p", &RuleSet::default(), &provider, &vcs, None);

        assert_eq!(report.entries().len(), 4);
        assert_eq!(
            report.get(Stage::TestGen).and_then(|e| e.payload.as_text()),
            Some("tests")
        );
        assert_eq!(report.failure().map(|e| e.stage), Some(Stage::CodeGen));
    }

    #[test]
    fn audit_failure_is_last_entry() {
        let vcs = ScriptedVcs::on_branch("feature/x");
        let provider = ScriptedProvider::new()
            .generates("t")
            .generates("c")
            .audit_fails("malformed response");

        let report = run_pipeline("p", &RuleSet::default(), &provider, &vcs, None);

        assert_eq!(report.entries().len(), 5);
        assert!(!report.is_success());
        assert_eq!(report.failure().map(|e| e.stage), Some(Stage::Audit));
    }

    #[test]
    fn blocked_branch_is_policy_failure_and_provider_untouched() {
        let vcs = ScriptedVcs::on_branch("main");
        let provider = ScriptedProvider::new();

        let report = run_pipeline("p", &RuleSet::default(), &provider, &vcs, None);

        assert_eq!(report.entries().len(), 2);
        let err = report.failure().and_then(|e| e.error.as_ref()).expect("error");
        assert_eq!(err.kind, ErrorKind::BranchPolicy);
        assert!(err.message.contains("--branch-name"));
        assert!(provider.generate_calls().is_empty());
    }

    #[test]
    fn invalid_prefix_is_recorded_on_branch_stage() {
        let vcs = ScriptedVcs::on_branch("main");
        let provider = ScriptedProvider::new();
        let branch = BranchDescriptor::new("release", "add-login-form");

        let report = run_pipeline("p", &RuleSet::default(), &provider, &vcs, Some(&branch));

        let failure = report.failure().expect("failure");
        assert_eq!(failure.stage, Stage::BranchCheck);
        assert_eq!(
            failure.error.as_ref().map(|e| e.kind),
            Some(ErrorKind::InvalidBranchPrefix)
        );
    }

    #[test]
    fn vcs_failure_is_branch_check_error() {
        let vcs = ScriptedVcs::unreachable("not a git repository");
        let report = run_pipeline("p", &RuleSet::default(), &MockProvider::new(), &vcs, None);
        assert_eq!(report.exit_code(), crate::exit_codes::BRANCH_CHECK);
    }

    #[test]
    fn created_branch_is_branch_stage_payload() {
        let vcs = ScriptedVcs::on_branch("main");
        let branch = BranchDescriptor::new("feature", "add-login-form");

        let report = run_pipeline(
            "a login form",
            &RuleSet::default(),
            &MockProvider::new(),
            &vcs,
            Some(&branch),
        );

        assert!(report.is_success());
        assert_eq!(
            report.get(Stage::BranchCheck).and_then(|e| e.payload.as_text()),
            Some("feature/add-login-form")
        );
        assert!(vcs.calls().contains(&VcsCall::CheckoutNew("feature/add-login-form".to_string())));
    }

    #[test]
    fn disabled_branch_check_runs_on_main() {
        let vcs = ScriptedVcs::on_branch("main");
        let rules = RuleSet {
            branch_check: BranchCheck {
                enabled: false,
                ..BranchCheck::default()
            },
            ..RuleSet::default()
        };

        let report = run_pipeline("p", &rules, &MockProvider::new(), &vcs, None);

        assert!(report.is_success());
        assert!(vcs.calls().is_empty());
    }

    #[test]
    fn mock_provider_runs_are_reproducible() {
        let run = || {
            let vcs = ScriptedVcs::on_branch("feature/x");
            run_pipeline("a login form", &RuleSet::default(), &MockProvider::new(), &vcs, None)
        };
        assert_eq!(run(), run());
    }
}
