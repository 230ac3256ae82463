//! Error taxonomy for the governance pipeline.
//!
//! Every failure the pipeline can report maps onto exactly one [`ErrorKind`],
//! which in turn maps onto a stable process exit code.

use thiserror::Error;

use crate::exit_codes;
use crate::provider::ProviderError;

/// Stable classification of a [`SentinelError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    ConfigParse,
    ConfigValidation,
    InvalidBranchName,
    InvalidBranchPrefix,
    BranchPolicy,
    BranchCheck,
    UnknownProvider,
    Provider,
    Io,
}

impl ErrorKind {
    pub fn exit_code(self) -> i32 {
        match self {
            ErrorKind::ConfigParse | ErrorKind::ConfigValidation => exit_codes::CONFIG,
            ErrorKind::InvalidBranchName | ErrorKind::InvalidBranchPrefix => {
                exit_codes::BRANCH_ARGS
            }
            ErrorKind::BranchPolicy => exit_codes::BRANCH_POLICY,
            ErrorKind::BranchCheck => exit_codes::BRANCH_CHECK,
            ErrorKind::UnknownProvider => exit_codes::UNKNOWN_PROVIDER,
            ErrorKind::Provider => exit_codes::PROVIDER,
            ErrorKind::Io => exit_codes::INVALID,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ErrorKind::ConfigParse => "ConfigParseError",
            ErrorKind::ConfigValidation => "ConfigValidationError",
            ErrorKind::InvalidBranchName => "InvalidBranchName",
            ErrorKind::InvalidBranchPrefix => "InvalidBranchPrefix",
            ErrorKind::BranchPolicy => "BranchPolicyError",
            ErrorKind::BranchCheck => "BranchCheckError",
            ErrorKind::UnknownProvider => "UnknownProviderError",
            ErrorKind::Provider => "ProviderError",
            ErrorKind::Io => "IoError",
        }
    }
}

#[derive(Debug, Error)]
pub enum SentinelError {
    #[error("failed to parse rule file {path}: {message}")]
    ConfigParse { path: String, message: String },

    #[error("invalid rule configuration: {0}")]
    ConfigValidation(String),

    #[error("invalid branch name '{name}': {reason}")]
    InvalidBranchName { name: String, reason: String },

    #[error("invalid branch type '{prefix}' (allowed: {})", .allowed.join(", "))]
    InvalidBranchPrefix { prefix: String, allowed: Vec<String> },

    #[error("{0}")]
    BranchPolicy(String),

    #[error("branch check failed: {0}")]
    BranchCheck(String),

    #[error("unknown provider '{key}' (available: {})", .available.join(", "))]
    UnknownProvider { key: String, available: Vec<String> },

    #[error("provider error: {0}")]
    Provider(#[from] ProviderError),

    #[error("{0}")]
    Io(String),
}

impl SentinelError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            SentinelError::ConfigParse { .. } => ErrorKind::ConfigParse,
            SentinelError::ConfigValidation(_) => ErrorKind::ConfigValidation,
            SentinelError::InvalidBranchName { .. } => ErrorKind::InvalidBranchName,
            SentinelError::InvalidBranchPrefix { .. } => ErrorKind::InvalidBranchPrefix,
            SentinelError::BranchPolicy(_) => ErrorKind::BranchPolicy,
            SentinelError::BranchCheck(_) => ErrorKind::BranchCheck,
            SentinelError::UnknownProvider { .. } => ErrorKind::UnknownProvider,
            SentinelError::Provider(_) => ErrorKind::Provider,
            SentinelError::Io(_) => ErrorKind::Io,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_provider_lists_available_keys() {
        let err = SentinelError::UnknownProvider {
            key: "gemini".to_string(),
            available: vec!["copilot".to_string(), "mock".to_string()],
        };
        assert_eq!(
            err.to_string(),
            "unknown provider 'gemini' (available: copilot, mock)"
        );
        assert_eq!(err.kind(), ErrorKind::UnknownProvider);
    }

    #[test]
    fn branch_kinds_share_exit_code() {
        assert_eq!(
            ErrorKind::InvalidBranchName.exit_code(),
            ErrorKind::InvalidBranchPrefix.exit_code()
        );
        assert_ne!(
            ErrorKind::BranchPolicy.exit_code(),
            ErrorKind::BranchCheck.exit_code()
        );
    }
}
