//! Git adapter for the branch governor.
//!
//! Only branch inspection and switching are needed, so the [`Vcs`] seam stays
//! small and scripted implementations can stand in for it in tests.

use std::path::PathBuf;
use std::process::{Command, Output};

use anyhow::{Context, Result, anyhow};
use tracing::{debug, instrument, warn};

/// Version-control operations the governor relies on.
pub trait Vcs {
    /// Name of the checked-out branch. Errors on detached HEAD.
    fn current_branch(&self) -> Result<String>;
    /// True if a local branch with this name exists.
    fn branch_exists(&self, branch: &str) -> Result<bool>;
    /// Create `branch` at HEAD and check it out.
    fn checkout_new_branch(&self, branch: &str) -> Result<()>;
    /// Check out an existing `branch`.
    fn checkout_branch(&self, branch: &str) -> Result<()>;
}

/// Wrapper for executing git commands in a working directory.
#[derive(Debug, Clone)]
pub struct Git {
    workdir: PathBuf,
}

impl Git {
    pub fn new(workdir: impl Into<PathBuf>) -> Self {
        Self {
            workdir: workdir.into(),
        }
    }

    fn run_capture(&self, args: &[&str]) -> Result<String> {
        let output = self.run_checked(args)?;
        Ok(String::from_utf8_lossy(&output.stdout).to_string())
    }

    fn run_checked(&self, args: &[&str]) -> Result<Output> {
        let output = self.run(args)?;
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(anyhow!("git {} failed: {}", args.join(" "), stderr.trim()));
        }
        Ok(output)
    }

    fn run(&self, args: &[&str]) -> Result<Output> {
        Command::new("git")
            .args(args)
            .current_dir(&self.workdir)
            .output()
            .with_context(|| format!("spawn git {}", args.join(" ")))
    }
}

impl Vcs for Git {
    // `symbolic-ref` also works on an unborn branch, where `rev-parse HEAD` does not.
    #[instrument(skip_all)]
    fn current_branch(&self) -> Result<String> {
        let name = self
            .run_capture(&["symbolic-ref", "--quiet", "--short", "HEAD"])
            .context("read current branch (detached HEAD or not a git repository?)")?
            .trim()
            .to_string();
        if name.is_empty() {
            warn!("git reported an empty branch name");
            return Err(anyhow!("git reported an empty branch name"));
        }
        debug!(branch = %name, "current branch");
        Ok(name)
    }

    fn branch_exists(&self, branch: &str) -> Result<bool> {
        let status = self
            .run(&[
                "show-ref",
                "--verify",
                "--quiet",
                &format!("refs/heads/{branch}"),
            ])?
            .status;
        Ok(status.success())
    }

    #[instrument(skip_all, fields(branch))]
    fn checkout_new_branch(&self, branch: &str) -> Result<()> {
        debug!(branch, "creating and checking out new branch");
        self.run_checked(&["checkout", "-b", branch])?;
        Ok(())
    }

    #[instrument(skip_all, fields(branch))]
    fn checkout_branch(&self, branch: &str) -> Result<()> {
        debug!(branch, "checking out branch");
        self.run_checked(&["checkout", branch])?;
        Ok(())
    }
}
