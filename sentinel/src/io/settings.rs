//! Connection settings for providers, read once from the environment.

pub const ENV_GITHUB_TOKEN: &str = "SENTINEL_GITHUB_TOKEN";
pub const ENV_AI_PROVIDER: &str = "SENTINEL_AI_PROVIDER";
pub const ENV_AI_ENDPOINT: &str = "SENTINEL_AI_ENDPOINT";
pub const ENV_AI_MODEL: &str = "SENTINEL_AI_MODEL";

pub const DEFAULT_PROVIDER: &str = "mock";
pub const DEFAULT_ENDPOINT: &str = "https://models.inference.ai.azure.com";
pub const DEFAULT_MODEL: &str = "gpt-4o";

/// Immutable provider connection settings.
#[derive(Clone, PartialEq, Eq)]
pub struct ConnectionSettings {
    pub github_token: Option<String>,
    pub ai_provider: String,
    pub ai_endpoint: String,
    pub ai_model: String,
}

impl Default for ConnectionSettings {
    fn default() -> Self {
        Self {
            github_token: None,
            ai_provider: DEFAULT_PROVIDER.to_string(),
            ai_endpoint: DEFAULT_ENDPOINT.to_string(),
            ai_model: DEFAULT_MODEL.to_string(),
        }
    }
}

// Keeps the token out of logs.
impl std::fmt::Debug for ConnectionSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConnectionSettings")
            .field("github_token", &self.github_token.as_ref().map(|_| "<redacted>"))
            .field("ai_provider", &self.ai_provider)
            .field("ai_endpoint", &self.ai_endpoint)
            .field("ai_model", &self.ai_model)
            .finish()
    }
}

impl ConnectionSettings {
    /// Read settings from the process environment.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build settings from an arbitrary key lookup. Empty values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| {
            lookup(key)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };
        let defaults = Self::default();
        Self {
            github_token: get(ENV_GITHUB_TOKEN),
            ai_provider: get(ENV_AI_PROVIDER).unwrap_or(defaults.ai_provider),
            ai_endpoint: get(ENV_AI_ENDPOINT).unwrap_or(defaults.ai_endpoint),
            ai_model: get(ENV_AI_MODEL).unwrap_or(defaults.ai_model),
        }
    }
}
