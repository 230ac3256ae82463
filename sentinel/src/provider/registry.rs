//! Provider lookup by key.
//!
//! The registry is an explicit key → constructor table. Adding a backend
//! means registering a constructor; the pipeline never changes.

use std::collections::BTreeMap;

use tracing::debug;

use super::{CopilotProvider, MockProvider, Provider};
use crate::error::SentinelError;
use crate::io::settings::ConnectionSettings;

/// Builds a provider from connection settings without performing I/O.
pub type ProviderConstructor = fn(&ConnectionSettings) -> Result<Box<dyn Provider>, SentinelError>;

#[derive(Debug, Clone)]
pub struct ProviderRegistry {
    constructors: BTreeMap<&'static str, ProviderConstructor>,
}

impl Default for ProviderRegistry {
    fn default() -> Self {
        Self::builtin()
    }
}

impl ProviderRegistry {
    pub fn empty() -> Self {
        Self {
            constructors: BTreeMap::new(),
        }
    }

    /// Registry with the `mock` and `copilot` providers.
    pub fn builtin() -> Self {
        let mut registry = Self::empty();
        registry.register(MockProvider::KEY, build_mock);
        registry.register(CopilotProvider::KEY, build_copilot);
        registry
    }

    /// Register `constructor` under `key`, returning any constructor it
    /// replaces.
    pub fn register(
        &mut self,
        key: &'static str,
        constructor: ProviderConstructor,
    ) -> Option<ProviderConstructor> {
        self.constructors.insert(key, constructor)
    }

    /// Registered keys in sorted order.
    pub fn keys(&self) -> Vec<&'static str> {
        self.constructors.keys().copied().collect()
    }

    pub fn contains(&self, key: &str) -> bool {
        self.constructors.contains_key(key)
    }

    pub fn resolve(
        &self,
        key: &str,
        settings: &ConnectionSettings,
    ) -> Result<Box<dyn Provider>, SentinelError> {
        let constructor =
            self.constructors
                .get(key)
                .ok_or_else(|| SentinelError::UnknownProvider {
                    key: key.to_string(),
                    available: self.keys().into_iter().map(str::to_string).collect(),
                })?;
        debug!(provider = key, "resolving provider");
        constructor(settings)
    }
}

fn build_mock(_settings: &ConnectionSettings) -> Result<Box<dyn Provider>, SentinelError> {
    Ok(Box::new(MockProvider::new()))
}

fn build_copilot(settings: &ConnectionSettings) -> Result<Box<dyn Provider>, SentinelError> {
    Ok(Box::new(CopilotProvider::from_settings(settings)?))
}
