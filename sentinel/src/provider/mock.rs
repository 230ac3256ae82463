//! Offline provider with fixed, deterministic responses.

use super::{Provider, ProviderError};

/// Returns canned code and findings. Useful without an API key and for
/// regression tests of the pipeline.
#[derive(Debug, Clone, Copy, Default)]
pub struct MockProvider;

impl MockProvider {
    pub const KEY: &'static str = "mock";

    pub fn new() -> Self {
        Self
    }
}

impl Provider for MockProvider {
    fn name(&self) -> &str {
        Self::KEY
    }

    fn generate_code(&self, prompt: &str, context: &str) -> Result<String, ProviderError> {
        let prompt = prompt.lines().next().unwrap_or_default();
        Ok(format!(
            "# Auto-generated mock code\n\
             # Prompt: {prompt}\n\
             # Context lines: {}\n\
             def hello():\n    return \"Hello from sentinel mock provider!\"\n",
            context.lines().count()
        ))
    }

    fn audit_security(&self, _code: &str) -> Result<Vec<String>, ProviderError> {
        Ok(vec![
            "MOCK-001: No critical vulnerabilities found (simulated).".to_string(),
            "MOCK-002: Remember to sanitize user input (simulated).".to_string(),
        ])
    }
}
