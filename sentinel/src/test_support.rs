//! Test-only collaborators: scripted git, scripted provider, and a throwaway
//! git repository.

use std::cell::RefCell;
use std::collections::{BTreeSet, VecDeque};
use std::path::Path;
use std::process::Command;

use anyhow::{Context, Result, anyhow};
use tempfile::TempDir;

use crate::io::git::{Git, Vcs};
use crate::provider::{Provider, ProviderError};

/// A recorded call against [`ScriptedVcs`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VcsCall {
    CurrentBranch,
    BranchExists(String),
    CheckoutNew(String),
    Checkout(String),
}

/// In-memory [`Vcs`] that records every call.
#[derive(Debug, Default)]
pub struct ScriptedVcs {
    current: RefCell<Option<String>>,
    unreachable: Option<String>,
    checkout_failure: Option<String>,
    branches: RefCell<BTreeSet<String>>,
    calls: RefCell<Vec<VcsCall>>,
}

impl ScriptedVcs {
    pub fn on_branch(name: &str) -> Self {
        Self {
            current: RefCell::new(Some(name.to_string())),
            branches: RefCell::new(BTreeSet::from([name.to_string()])),
            ..Self::default()
        }
    }

    /// Every query fails with `message`.
    pub fn unreachable(message: &str) -> Self {
        Self {
            unreachable: Some(message.to_string()),
            ..Self::default()
        }
    }

    pub fn with_branch(self, name: &str) -> Self {
        self.branches.borrow_mut().insert(name.to_string());
        self
    }

    /// Checkouts (new or existing) fail with `message`.
    pub fn failing_checkout(mut self, message: &str) -> Self {
        self.checkout_failure = Some(message.to_string());
        self
    }

    pub fn calls(&self) -> Vec<VcsCall> {
        self.calls.borrow().clone()
    }

    pub fn current(&self) -> Option<String> {
        self.current.borrow().clone()
    }

    fn record(&self, call: VcsCall) -> Result<()> {
        self.calls.borrow_mut().push(call);
        match &self.unreachable {
            Some(message) => Err(anyhow!("{message}")),
            None => Ok(()),
        }
    }

    fn switch(&self, branch: &str) -> Result<()> {
        if let Some(message) = &self.checkout_failure {
            return Err(anyhow!("git checkout failed: {message}"));
        }
        self.branches.borrow_mut().insert(branch.to_string());
        *self.current.borrow_mut() = Some(branch.to_string());
        Ok(())
    }
}

impl Vcs for ScriptedVcs {
    fn current_branch(&self) -> Result<String> {
        self.record(VcsCall::CurrentBranch)?;
        self.current()
            .ok_or_else(|| anyhow!("detached HEAD (refuse to run)"))
    }

    fn branch_exists(&self, branch: &str) -> Result<bool> {
        self.record(VcsCall::BranchExists(branch.to_string()))?;
        Ok(self.branches.borrow().contains(branch))
    }

    fn checkout_new_branch(&self, branch: &str) -> Result<()> {
        self.record(VcsCall::CheckoutNew(branch.to_string()))?;
        if self.branches.borrow().contains(branch) {
            return Err(anyhow!("a branch named '{branch}' already exists"));
        }
        self.switch(branch)
    }

    fn checkout_branch(&self, branch: &str) -> Result<()> {
        self.record(VcsCall::Checkout(branch.to_string()))?;
        if !self.branches.borrow().contains(branch) {
            return Err(anyhow!("pathspec '{branch}' did not match"));
        }
        self.switch(branch)
    }
}

/// A recorded `generate_code` request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerateCall {
    pub prompt: String,
    pub context: String,
}

/// [`Provider`] that replays queued responses in order.
#[derive(Debug, Default)]
pub struct ScriptedProvider {
    generated: RefCell<VecDeque<Result<String, String>>>,
    audit: Option<Result<Vec<String>, String>>,
    generate_calls: RefCell<Vec<GenerateCall>>,
    audit_calls: RefCell<Vec<String>>,
}

impl ScriptedProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn generates(self, output: &str) -> Self {
        self.generated
            .borrow_mut()
            .push_back(Ok(output.to_string()));
        self
    }

    pub fn generate_fails(self, message: &str) -> Self {
        self.generated
            .borrow_mut()
            .push_back(Err(message.to_string()));
        self
    }

    pub fn audits(mut self, findings: &[&str]) -> Self {
        self.audit = Some(Ok(findings.iter().map(|f| f.to_string()).collect()));
        self
    }

    pub fn audit_fails(mut self, message: &str) -> Self {
        self.audit = Some(Err(message.to_string()));
        self
    }

    pub fn generate_calls(&self) -> Vec<GenerateCall> {
        self.generate_calls.borrow().clone()
    }

    pub fn audit_calls(&self) -> Vec<String> {
        self.audit_calls.borrow().clone()
    }
}

impl Provider for ScriptedProvider {
    fn name(&self) -> &str {
        "scripted"
    }

    fn generate_code(&self, prompt: &str, context: &str) -> Result<String, ProviderError> {
        self.generate_calls.borrow_mut().push(GenerateCall {
            prompt: prompt.to_string(),
            context: context.to_string(),
        });
        match self.generated.borrow_mut().pop_front() {
            Some(Ok(output)) => Ok(output),
            Some(Err(message)) => Err(ProviderError::Other(message)),
            None => Err(ProviderError::Other("no scripted response left".to_string())),
        }
    }

    fn audit_security(&self, code: &str) -> Result<Vec<String>, ProviderError> {
        self.audit_calls.borrow_mut().push(code.to_string());
        match &self.audit {
            Some(Ok(findings)) => Ok(findings.clone()),
            Some(Err(message)) => Err(ProviderError::Other(message.clone())),
            None => Ok(Vec::new()),
        }
    }
}

/// Temporary git repository with one empty commit on `main`.
pub struct TestRepo {
    dir: TempDir,
}

impl TestRepo {
    pub fn new() -> Result<Self> {
        let dir = tempfile::tempdir().context("create temp repo dir")?;
        let repo = Self { dir };
        repo.git(&["init", "--quiet"])?;
        repo.git(&["symbolic-ref", "HEAD", "refs/heads/main"])?;
        repo.git(&["config", "user.email", "sentinel@example.com"])?;
        repo.git(&["config", "user.name", "Sentinel Tests"])?;
        repo.git(&["config", "commit.gpgsign", "false"])?;
        repo.git(&["commit", "--quiet", "--allow-empty", "-m", "initial"])?;
        Ok(repo)
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    pub fn vcs(&self) -> Git {
        Git::new(self.path())
    }

    /// Create `branch` from HEAD and check it out.
    pub fn checkout_new(&self, branch: &str) -> Result<()> {
        self.git(&["checkout", "--quiet", "-b", branch])
    }

    pub fn current_branch(&self) -> Result<String> {
        let out = Command::new("git")
            .args(["symbolic-ref", "--short", "HEAD"])
            .current_dir(self.path())
            .output()
            .context("spawn git symbolic-ref")?;
        Ok(String::from_utf8_lossy(&out.stdout).trim().to_string())
    }

    fn git(&self, args: &[&str]) -> Result<()> {
        let status = Command::new("git")
            .args(args)
            .current_dir(self.path())
            .status()
            .with_context(|| format!("spawn git {}", args.join(" ")))?;
        if !status.success() {
            return Err(anyhow!("git {} failed", args.join(" ")));
        }
        Ok(())
    }
}
