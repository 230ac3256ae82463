//! Pure branch-policy decisions.
//!
//! The governor queries version control and then asks [`plan_branch`] what to
//! do; nothing here touches git.

use std::sync::LazyLock;

use regex::Regex;

use crate::core::rules::BranchCheck;
use crate::error::SentinelError;

/// Characters and sequences git refuses in ref names.
static UNSAFE_REF_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[~^:?*\[\\]|\.\.|@\{|^[-.]|\.lock$|\.$").unwrap());

/// User-supplied branch intent: `--branch-type` and `--branch-name`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BranchDescriptor {
    pub prefix: String,
    pub name: String,
}

impl BranchDescriptor {
    pub fn new(prefix: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            name: name.into(),
        }
    }

    /// Build a descriptor only when both halves were supplied.
    pub fn from_parts(prefix: Option<&str>, name: Option<&str>) -> Option<Self> {
        match (prefix, name) {
            (Some(prefix), Some(name)) => Some(Self::new(prefix, name)),
            _ => None,
        }
    }

    /// The branch to create or switch to: `prefix/name`.
    pub fn target(&self) -> String {
        format!("{}/{}", self.prefix, self.name)
    }
}

/// Outcome of the branch governor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BranchDecision {
    /// Generation may proceed. Carries the branch that was created or
    /// checked out, if any.
    Allowed { switched_to: Option<String> },
    /// Generation must not proceed; the reason is shown to the user.
    Blocked(String),
}

/// What the governor should do given the current branch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BranchPlan {
    Proceed,
    SwitchTo(String),
    Block(String),
}

/// Check a single branch-name token. Returns a human-readable reason on
/// rejection.
pub fn validate_token(token: &str) -> Result<(), String> {
    if token.is_empty() {
        return Err("must not be empty".to_string());
    }
    if token.contains('/') {
        return Err("must not contain '/'".to_string());
    }
    if token.chars().any(char::is_whitespace) {
        return Err("must not contain whitespace".to_string());
    }
    if token.chars().any(char::is_control) || UNSAFE_REF_RE.is_match(token) {
        return Err("is not a valid git ref component".to_string());
    }
    Ok(())
}

pub fn validate_branch_name(name: &str) -> Result<(), SentinelError> {
    validate_token(name).map_err(|reason| SentinelError::InvalidBranchName {
        name: name.to_string(),
        reason,
    })
}

/// Decide how to satisfy branch policy while standing on `current`.
pub fn plan_branch(
    check: &BranchCheck,
    current: &str,
    intent: Option<&BranchDescriptor>,
) -> Result<BranchPlan, SentinelError> {
    if !check.enabled || !check.is_protected(current) {
        return Ok(BranchPlan::Proceed);
    }

    let Some(intent) = intent else {
        return Ok(BranchPlan::Block(blocked_reason(check, current)));
    };

    if !check.allows_prefix(&intent.prefix) {
        return Err(SentinelError::InvalidBranchPrefix {
            prefix: intent.prefix.clone(),
            allowed: check.prefixes.iter().cloned().collect(),
        });
    }
    validate_branch_name(&intent.name)?;

    Ok(BranchPlan::SwitchTo(intent.target()))
}

fn blocked_reason(check: &BranchCheck, current: &str) -> String {
    let prefixes: Vec<&str> = check.prefixes.iter().map(String::as_str).collect();
    format!(
        "refusing to generate on protected branch '{current}': pass --branch-type <{}> and --branch-name <name> to work on a new branch",
        prefixes.join("|")
    )
}
