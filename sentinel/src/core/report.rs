//! Ordered record of pipeline stage outcomes.
//!
//! A report only grows by appending; the orchestrator stops appending after
//! the first failed stage.

use serde::Serialize;

use crate::error::{ErrorKind, SentinelError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    Rules,
    BranchCheck,
    TestGen,
    CodeGen,
    Audit,
}

impl Stage {
    pub const ALL: [Stage; 5] = [
        Stage::Rules,
        Stage::BranchCheck,
        Stage::TestGen,
        Stage::CodeGen,
        Stage::Audit,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Stage::Rules => "rules",
            Stage::BranchCheck => "branch check",
            Stage::TestGen => "test generation",
            Stage::CodeGen => "code generation",
            Stage::Audit => "security audit",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StageStatus {
    Ok,
    Failed,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase", tag = "type", content = "value")]
pub enum StagePayload {
    Empty,
    Text(String),
    Findings(Vec<String>),
}

impl StagePayload {
    pub fn as_text(&self) -> Option<&str> {
        match self {
            StagePayload::Text(text) => Some(text),
            _ => None,
        }
    }

    pub fn as_findings(&self) -> Option<&[String]> {
        match self {
            StagePayload::Findings(findings) => Some(findings),
            _ => None,
        }
    }
}

/// Failure details recorded for a stage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StageError {
    #[serde(serialize_with = "serialize_kind")]
    pub kind: ErrorKind,
    pub message: String,
}

fn serialize_kind<S: serde::Serializer>(kind: &ErrorKind, s: S) -> Result<S::Ok, S::Error> {
    s.serialize_str(kind.as_str())
}

impl From<&SentinelError> for StageError {
    fn from(err: &SentinelError) -> Self {
        Self {
            kind: err.kind(),
            message: err.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StageResult {
    pub stage: Stage,
    pub status: StageStatus,
    pub payload: StagePayload,
    pub error: Option<StageError>,
}

impl StageResult {
    pub fn ok(stage: Stage, payload: StagePayload) -> Self {
        Self {
            stage,
            status: StageStatus::Ok,
            payload,
            error: None,
        }
    }

    pub fn failed(stage: Stage, err: &SentinelError) -> Self {
        Self {
            stage,
            status: StageStatus::Failed,
            payload: StagePayload::Empty,
            error: Some(err.into()),
        }
    }

    pub fn is_ok(&self) -> bool {
        self.status == StageStatus::Ok
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PipelineReport {
    entries: Vec<StageResult>,
}

impl PipelineReport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Report for a run that never got past loading its rules.
    pub fn rules_failed(err: &SentinelError) -> Self {
        let mut report = Self::new();
        report.push(StageResult::failed(Stage::Rules, err));
        report
    }

    pub(crate) fn push(&mut self, result: StageResult) {
        self.entries.push(result);
    }

    pub fn entries(&self) -> &[StageResult] {
        &self.entries
    }

    pub fn get(&self, stage: Stage) -> Option<&StageResult> {
        self.entries.iter().find(|entry| entry.stage == stage)
    }

    pub fn failure(&self) -> Option<&StageResult> {
        self.entries.iter().find(|entry| !entry.is_ok())
    }

    /// True only when every stage ran and passed.
    pub fn is_success(&self) -> bool {
        self.entries.len() == Stage::ALL.len() && self.failure().is_none()
    }

    pub fn exit_code(&self) -> i32 {
        match self.failure().and_then(|entry| entry.error.as_ref()) {
            Some(err) => err.kind.exit_code(),
            None if self.is_success() => crate::exit_codes::OK,
            None => crate::exit_codes::INVALID,
        }
    }
}
