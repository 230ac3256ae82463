//! Code-generation providers.
//!
//! The [`Provider`] trait decouples the pipeline from the actual generation
//! backend. Backends are selected by key through the [`ProviderRegistry`];
//! tests use scripted providers that return predetermined outputs.

use thiserror::Error;

pub mod copilot;
pub mod mock;
pub mod registry;

pub use copilot::CopilotProvider;
pub use mock::MockProvider;
pub use registry::ProviderRegistry;

/// Failure of a provider capability call.
#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("endpoint returned {status}: {body}")]
    Status { status: u16, body: String },

    #[error("malformed response: {0}")]
    MalformedResponse(String),

    #[error("{0} is not set")]
    MissingCredential(&'static str),

    #[error("{0}")]
    Other(String),
}

/// Capabilities every generation backend provides.
pub trait Provider {
    /// Registry key of this provider (e.g. `"mock"`).
    fn name(&self) -> &str;

    /// Generate code (or tests) for `prompt`, guided by `context`.
    fn generate_code(&self, prompt: &str, context: &str) -> Result<String, ProviderError>;

    /// Review `code` and return security findings. An empty list means no
    /// findings.
    fn audit_security(&self, code: &str) -> Result<Vec<String>, ProviderError>;
}
