//! `sentinel init`: scaffold `.sentinel/rules.yml`.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, anyhow};
use tracing::info;

pub const SENTINEL_DIR: &str = ".sentinel";
pub const RULES_FILE: &str = "rules.yml";

/// Canonical paths within `.sentinel/` for a project root.
#[derive(Debug, Clone)]
pub struct SentinelPaths {
    pub root: PathBuf,
    pub sentinel_dir: PathBuf,
    pub rules_path: PathBuf,
}

impl SentinelPaths {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        let root = root.into();
        let sentinel_dir = root.join(SENTINEL_DIR);
        Self {
            root,
            rules_path: sentinel_dir.join(RULES_FILE),
            sentinel_dir,
        }
    }
}

/// Options for `init_sentinel`.
#[derive(Debug, Clone)]
pub struct InitOptions {
    /// If true, replace an existing rule file.
    pub force: bool,
}

/// Write the default rule file under `root`.
///
/// Fails if the rule file already exists unless `options.force` is set. The
/// file is replaced atomically, so a failed overwrite leaves the old file
/// intact.
pub fn init_sentinel(root: &Path, options: &InitOptions) -> Result<SentinelPaths> {
    let paths = SentinelPaths::new(root);
    if paths.rules_path.exists() && !options.force {
        return Err(anyhow!(
            "sentinel init: {} already exists (use --force to overwrite)",
            paths.rules_path.display()
        ));
    }
    if paths.sentinel_dir.exists() && !paths.sentinel_dir.is_dir() {
        return Err(anyhow!(
            "sentinel init: {} exists but is not a directory",
            paths.sentinel_dir.display()
        ));
    }

    write_atomic(&paths.rules_path, DEFAULT_RULES)?;
    info!(path = %paths.rules_path.display(), force = options.force, "wrote rule file");
    Ok(paths)
}

fn write_atomic(path: &Path, contents: &str) -> Result<()> {
    let parent = path
        .parent()
        .with_context(|| format!("rule file path missing parent {}", path.display()))?;
    fs::create_dir_all(parent).with_context(|| format!("create directory {}", parent.display()))?;
    let tmp_path = path.with_extension("yml.tmp");
    fs::write(&tmp_path, contents)
        .with_context(|| format!("write temp rule file {}", tmp_path.display()))?;
    fs::rename(&tmp_path, path).with_context(|| format!("replace rule file {}", path.display()))?;
    Ok(())
}

pub const DEFAULT_RULES: &str = "\
# Sentinel governance rules.
#
# Missing keys fall back to the defaults shown here; unknown keys are ignored.
rules:
  # Generate tests before the implementation.
  tdd: true
  # Ask for OWASP-aware code and run the security audit stage.
  owasp: true
  # Structure UI code with Atomic Design.
  atomic_design: true
  # auto | manual | off
  documentation: auto
  branch_check:
    enabled: true
    # Generation is refused on these branches unless a working branch is requested.
    protected_branches:
      - main
      - master
    # Allowed values for --branch-type; the branch becomes <prefix>/<name>.
    prefixes:
      - feature
      - bugfix
      - refactor
      - hotfix
";
