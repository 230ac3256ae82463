//! Branch governor: enforce branch policy before any generation.
//!
//! Runs once per invocation. When branch checks are disabled no git query is
//! made at all; otherwise the current branch is read once and, if the caller
//! asked for a working branch, that branch is created or checked out.

use tracing::{debug, info, instrument, warn};

use crate::core::branch::{BranchDecision, BranchDescriptor, BranchPlan, plan_branch};
use crate::core::rules::RuleSet;
use crate::error::SentinelError;
use crate::io::git::Vcs;

/// Decide whether the pipeline may proceed, switching branches if requested.
///
/// `Blocked` is a normal outcome, not an error. Errors are reserved for bad
/// branch arguments and version-control failures.
#[instrument(skip_all, fields(enabled = rules.branch_check.enabled))]
pub fn enforce_branch_policy<V: Vcs + ?Sized>(
    rules: &RuleSet,
    vcs: &V,
    intent: Option<&BranchDescriptor>,
) -> Result<BranchDecision, SentinelError> {
    if !rules.branch_check.enabled {
        debug!("branch check disabled");
        return Ok(BranchDecision::Allowed { switched_to: None });
    }

    let current = vcs.current_branch().map_err(vcs_error)?;
    match plan_branch(&rules.branch_check, &current, intent)? {
        BranchPlan::Proceed => {
            debug!(branch = %current, "branch not protected");
            Ok(BranchDecision::Allowed { switched_to: None })
        }
        BranchPlan::Block(reason) => {
            warn!(branch = %current, "blocked on protected branch");
            Ok(BranchDecision::Blocked(reason))
        }
        BranchPlan::SwitchTo(target) => {
            switch_to(vcs, &target)?;
            info!(from = %current, to = %target, "switched to working branch");
            Ok(BranchDecision::Allowed {
                switched_to: Some(target),
            })
        }
    }
}

/// Create-or-checkout: an existing branch is only checked out.
fn switch_to<V: Vcs + ?Sized>(vcs: &V, target: &str) -> Result<(), SentinelError> {
    if vcs.branch_exists(target).map_err(vcs_error)? {
        vcs.checkout_branch(target).map_err(vcs_error)
    } else {
        vcs.checkout_new_branch(target).map_err(vcs_error)
    }
}

fn vcs_error(err: anyhow::Error) -> SentinelError {
    SentinelError::BranchCheck(format!("{err:#}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::rules::BranchCheck;
    use crate::error::ErrorKind;
    use crate::test_support::{ScriptedVcs, VcsCall};

    fn rules_with_check(enabled: bool) -> RuleSet {
        RuleSet {
            branch_check: BranchCheck {
                enabled,
                ..BranchCheck::default()
            },
            ..RuleSet::default()
        }
    }

    #[test]
    fn disabled_check_allows_without_querying_git() {
        let vcs = ScriptedVcs::on_branch("main");
        let decision = enforce_branch_policy(&rules_with_check(false), &vcs, None).expect("decide");
        assert_eq!(decision, BranchDecision::Allowed { switched_to: None });
        assert!(vcs.calls().is_empty());
    }

    #[test]
    fn protected_branch_without_intent_is_blocked() {
        let vcs = ScriptedVcs::on_branch("main");
        let decision = enforce_branch_policy(&RuleSet::default(), &vcs, None).expect("decide");
        assert!(matches!(decision, BranchDecision::Blocked(reason) if reason.contains("'main'")));
        assert_eq!(vcs.calls(), vec![VcsCall::CurrentBranch]);
    }

    #[test]
    fn protected_branch_with_intent_creates_branch() {
        let vcs = ScriptedVcs::on_branch("main");
        let intent = BranchDescriptor::new("feature", "add-login-form");
        let decision =
            enforce_branch_policy(&RuleSet::default(), &vcs, Some(&intent)).expect("decide");

        assert_eq!(
            decision,
            BranchDecision::Allowed {
                switched_to: Some("feature/add-login-form".to_string())
            }
        );
        assert_eq!(
            vcs.calls(),
            vec![
                VcsCall::CurrentBranch,
                VcsCall::BranchExists("feature/add-login-form".to_string()),
                VcsCall::CheckoutNew("feature/add-login-form".to_string()),
            ]
        );
        assert_eq!(vcs.current().as_deref(), Some("feature/add-login-form"));
    }

    #[test]
    fn existing_target_branch_is_only_checked_out() {
        let vcs = ScriptedVcs::on_branch("main").with_branch("feature/add-login-form");
        let intent = BranchDescriptor::new("feature", "add-login-form");
        enforce_branch_policy(&RuleSet::default(), &vcs, Some(&intent)).expect("decide");

        assert_eq!(
            vcs.calls().last(),
            Some(&VcsCall::Checkout("feature/add-login-form".to_string()))
        );
    }

    #[test]
    fn invalid_prefix_fails_without_touching_branches() {
        let vcs = ScriptedVcs::on_branch("main");
        let intent = BranchDescriptor::new("release", "add-login-form");
        let err = enforce_branch_policy(&RuleSet::default(), &vcs, Some(&intent)).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidBranchPrefix);
        assert_eq!(vcs.calls(), vec![VcsCall::CurrentBranch]);
    }

    #[test]
    fn unreachable_git_is_branch_check_error() {
        let vcs = ScriptedVcs::unreachable("not a git repository");
        let err = enforce_branch_policy(&RuleSet::default(), &vcs, None).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::BranchCheck);
        assert!(err.to_string().contains("not a git repository"));
    }

    #[test]
    fn failed_checkout_is_branch_check_error() {
        let vcs = ScriptedVcs::on_branch("main").failing_checkout("index.lock exists");
        let intent = BranchDescriptor::new("bugfix", "crash");
        let err = enforce_branch_policy(&RuleSet::default(), &vcs, Some(&intent)).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::BranchCheck);
        assert!(err.to_string().contains("index.lock exists"));
    }
}
