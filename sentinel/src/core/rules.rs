//! Governance rule set: defaults, parsing, and validation.
//!
//! The rule document is YAML with a single top-level `rules` mapping. Parsing
//! merges at the field level: any key the document omits keeps its default,
//! and keys this version does not know are ignored.

use std::collections::BTreeSet;

use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize};

use crate::core::branch::validate_token;
use crate::error::SentinelError;

pub const DEFAULT_PROTECTED_BRANCHES: [&str; 2] = ["main", "master"];
pub const DEFAULT_PREFIXES: [&str; 4] = ["feature", "bugfix", "refactor", "hotfix"];

/// How generated code should be documented.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Documentation {
    #[default]
    Auto,
    Manual,
    Off,
}

impl Documentation {
    pub fn as_str(self) -> &'static str {
        match self {
            Documentation::Auto => "auto",
            Documentation::Manual => "manual",
            Documentation::Off => "off",
        }
    }
}

/// Branch policy enforced before any generation happens.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BranchCheck {
    pub enabled: bool,
    pub protected_branches: BTreeSet<String>,
    pub prefixes: BTreeSet<String>,
}

impl Default for BranchCheck {
    fn default() -> Self {
        Self {
            enabled: true,
            protected_branches: DEFAULT_PROTECTED_BRANCHES
                .iter()
                .map(|s| s.to_string())
                .collect(),
            prefixes: DEFAULT_PREFIXES.iter().map(|s| s.to_string()).collect(),
        }
    }
}

impl BranchCheck {
    pub fn is_protected(&self, branch: &str) -> bool {
        self.protected_branches.contains(branch)
    }

    pub fn allows_prefix(&self, prefix: &str) -> bool {
        self.prefixes.contains(prefix)
    }
}

/// Validated, immutable governance configuration for one invocation.
///
/// The advisory flags (`tdd`, `owasp`, `atomic_design`, `documentation`) are
/// not enforced at runtime; they are forwarded to the provider as context.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RuleSet {
    pub tdd: bool,
    pub owasp: bool,
    pub atomic_design: bool,
    pub documentation: Documentation,
    #[serde(deserialize_with = "deserialize_branch_check")]
    pub branch_check: BranchCheck,
}

impl Default for RuleSet {
    fn default() -> Self {
        Self {
            tdd: true,
            owasp: true,
            atomic_design: true,
            documentation: Documentation::Auto,
            branch_check: BranchCheck::default(),
        }
    }
}

impl RuleSet {
    pub fn validate(&self) -> Result<(), SentinelError> {
        let bc = &self.branch_check;
        if bc.enabled && bc.prefixes.is_empty() {
            return Err(SentinelError::ConfigValidation(
                "branch_check.prefixes must not be empty when branch_check.enabled is true"
                    .to_string(),
            ));
        }
        for prefix in &bc.prefixes {
            validate_token(prefix).map_err(|reason| {
                SentinelError::ConfigValidation(format!(
                    "branch_check.prefixes entry '{prefix}' {reason}"
                ))
            })?;
        }
        Ok(())
    }

    /// Prefixes that are also protected branch names. Legal, but suspicious.
    pub fn prefix_smells(&self) -> Vec<&str> {
        let bc = &self.branch_check;
        bc.prefixes
            .intersection(&bc.protected_branches)
            .map(String::as_str)
            .collect()
    }

    /// Names of the rules currently in effect, in a stable order.
    pub fn active_rules(&self) -> Vec<&'static str> {
        let mut active = Vec::new();
        if self.tdd {
            active.push("tdd");
        }
        if self.owasp {
            active.push("owasp");
        }
        if self.atomic_design {
            active.push("atomic_design");
        }
        if self.documentation != Documentation::Off {
            active.push("documentation");
        }
        if self.branch_check.enabled {
            active.push("branch_check");
        }
        active
    }

    /// One-line description used for the `Rules` stage of a report.
    pub fn summary(&self) -> String {
        let active = self.active_rules();
        if active.is_empty() {
            return "using 0 active rules".to_string();
        }
        format!(
            "using {} active rules ({})",
            active.len(),
            active.join(", ")
        )
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RuleDocument {
    rules: Option<RuleSet>,
}

/// `branch_check` may be a full mapping, a bare boolean toggle, or empty
/// (every sub-key commented out), which means all defaults.
fn deserialize_branch_check<'de, D>(deserializer: D) -> Result<BranchCheck, D::Error>
where
    D: Deserializer<'de>,
{
    match serde_yaml::Value::deserialize(deserializer)? {
        serde_yaml::Value::Null => Ok(BranchCheck::default()),
        serde_yaml::Value::Bool(enabled) => Ok(BranchCheck {
            enabled,
            ..BranchCheck::default()
        }),
        value @ serde_yaml::Value::Mapping(_) => serde_yaml::from_value(value)
            .map_err(|err| D::Error::custom(format!("branch_check: {err}"))),
        other => Err(D::Error::custom(format!(
            "branch_check must be a boolean or a mapping, found {}",
            yaml_type_name(&other)
        ))),
    }
}

fn yaml_type_name(value: &serde_yaml::Value) -> &'static str {
    match value {
        serde_yaml::Value::Null => "null",
        serde_yaml::Value::Bool(_) => "a boolean",
        serde_yaml::Value::Number(_) => "a number",
        serde_yaml::Value::String(_) => "a string",
        serde_yaml::Value::Sequence(_) => "a list",
        serde_yaml::Value::Mapping(_) => "a mapping",
        serde_yaml::Value::Tagged(_) => "a tagged value",
    }
}

/// Parse and validate a rule document. `source` names the document in errors.
pub fn parse_rules(source: &str, text: &str) -> Result<RuleSet, SentinelError> {
    let parse_error = |message: String| SentinelError::ConfigParse {
        path: source.to_string(),
        message,
    };

    let rules = if text.trim().is_empty() {
        RuleSet::default()
    } else {
        let value: serde_yaml::Value =
            serde_yaml::from_str(text).map_err(|err| parse_error(err.to_string()))?;
        if value.is_null() {
            RuleSet::default()
        } else {
            let doc: RuleDocument =
                serde_yaml::from_value(value).map_err(|err| parse_error(err.to_string()))?;
            doc.rules.unwrap_or_default()
        }
    };

    rules.validate()?;
    Ok(rules)
}
