//! Rule file loading (`.sentinel/rules.yml`).

use std::fs;
use std::path::Path;

use tracing::{debug, instrument, warn};

use crate::core::rules::{RuleSet, parse_rules};
use crate::error::SentinelError;

/// Load the rule set from `path`.
///
/// A missing path, or a path with no file behind it, yields
/// `RuleSet::default()`. The file is only read, never written.
#[instrument(skip_all)]
pub fn load_rules(path: Option<&Path>) -> Result<RuleSet, SentinelError> {
    let Some(path) = path.filter(|p| p.exists()) else {
        debug!("no rule file, using defaults");
        return Ok(RuleSet::default());
    };

    let source = path.display().to_string();
    let bytes =
        fs::read(path).map_err(|err| SentinelError::Io(format!("read {source}: {err}")))?;
    // Non-UTF-8 content is a malformed document.
    let text = String::from_utf8(bytes).map_err(|err| SentinelError::ConfigParse {
        path: source.clone(),
        message: format!("not valid UTF-8: {}", err.utf8_error()),
    })?;
    let rules = parse_rules(&source, &text)?;

    for prefix in rules.prefix_smells() {
        warn!(prefix, "branch prefix is also a protected branch name");
    }
    debug!(path = %path.display(), active = rules.active_rules().len(), "loaded rules");
    Ok(rules)
}
