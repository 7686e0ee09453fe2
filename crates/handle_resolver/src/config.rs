//! Resolver configuration

use crate::validation::HandleRules;
use serde::{Deserialize, Serialize};
use std::time::Duration;

pub const DEFAULT_DEBOUNCE_MS: u64 = 500;

/// Tunables for [`crate::HandleResolver`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResolverConfig {
    /// Quiet period after the last keystroke before the availability query
    pub debounce_ms: u64,
    /// Reserved words on top of the built-in set
    pub extra_reserved: Vec<String>,
}

impl ResolverConfig {
    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }

    pub fn rules(&self) -> HandleRules {
        HandleRules::with_extra_reserved(&self.extra_reserved)
    }
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            debounce_ms: DEFAULT_DEBOUNCE_MS,
            extra_reserved: Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_config_falls_back_to_defaults() {
        let config: ResolverConfig =
            serde_json::from_str(r#"{ "extra_reserved": ["founder"] }"#).unwrap();
        assert_eq!(config.debounce(), Duration::from_millis(500));
        assert!(config.rules().is_reserved("founder"));
    }
}
