//! Configuration for the handle picker binary

use anyhow::{bail, Context, Result};
use config::{Config, Environment, File as ConfigFile};
use ippan_handle_resolver::{normalize, Handle, ResolverConfig};
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    // Logging
    pub log_level: String,
    pub log_format: String,

    // Local registry
    pub taken: Vec<String>,
    pub latency_ms: u64,

    pub resolver: ResolverConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_format: "pretty".to_string(),
            taken: Vec::new(),
            latency_ms: 150,
            resolver: ResolverConfig::default(),
        }
    }
}

impl AppConfig {
    /// Optional TOML file, then `IPPAN_HANDLE_*` environment variables.
    /// Nested keys use `__`, e.g. `IPPAN_HANDLE_RESOLVER__DEBOUNCE_MS`; list
    /// keys take comma-separated values, e.g. `IPPAN_HANDLE_TAKEN=alice,bob`.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut builder = Config::builder();

        if let Some(path) = path {
            if !path.exists() {
                bail!(
                    "Configuration file {} not found (specified via --config)",
                    path.display()
                );
            }
            builder = builder.add_source(ConfigFile::from(path));
        }

        builder = builder.add_source(
            Environment::with_prefix("IPPAN_HANDLE")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true)
                .list_separator(",")
                .with_list_parse_key("taken")
                .with_list_parse_key("resolver.extra_reserved"),
        );

        let config = builder.build().context("failed to assemble configuration")?;
        config
            .try_deserialize()
            .context("invalid handle picker configuration")
    }

    pub fn latency(&self) -> Duration {
        Duration::from_millis(self.latency_ms)
    }

    pub fn taken_handles(&self) -> Vec<Handle> {
        self.taken
            .iter()
            .map(|raw| normalize(raw))
            .filter(|name| !name.is_empty())
            .map(Handle::new)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::sync::Mutex;
    use tempfile::tempdir;

    // `load` reads the process environment; keep env-mutating tests apart.
    static ENV_LOCK: Mutex<()> = Mutex::new(());

    #[test]
    fn loads_toml_file() {
        let _env = ENV_LOCK.lock().unwrap_or_else(|e| e.into_inner());
        let dir = tempdir().unwrap();
        let path = dir.path().join("handle.toml");
        fs::write(
            &path,
            r#"
log_level = "debug"
taken = ["@Alice", "bob", "  "]

[resolver]
debounce_ms = 250
extra_reserved = ["founder"]
"#,
        )
        .unwrap();

        let config = AppConfig::load(Some(path.as_path())).unwrap();
        assert_eq!(config.log_level, "debug");
        assert_eq!(config.log_format, "pretty");
        assert_eq!(config.resolver.debounce_ms, 250);
        assert_eq!(
            config.taken_handles(),
            vec![Handle::new("alice"), Handle::new("bob")]
        );
    }

    #[test]
    fn environment_overrides_lists_and_numbers() {
        let _env = ENV_LOCK.lock().unwrap_or_else(|e| e.into_inner());
        std::env::set_var("IPPAN_HANDLE_TAKEN", "alice,@Bob");
        std::env::set_var("IPPAN_HANDLE_RESOLVER__EXTRA_RESERVED", "founder");
        std::env::set_var("IPPAN_HANDLE_RESOLVER__DEBOUNCE_MS", "300");

        let loaded = AppConfig::load(None);

        std::env::remove_var("IPPAN_HANDLE_TAKEN");
        std::env::remove_var("IPPAN_HANDLE_RESOLVER__EXTRA_RESERVED");
        std::env::remove_var("IPPAN_HANDLE_RESOLVER__DEBOUNCE_MS");

        let config = loaded.unwrap();
        assert_eq!(
            config.taken_handles(),
            vec![Handle::new("alice"), Handle::new("bob")]
        );
        assert_eq!(config.resolver.debounce_ms, 300);
        assert!(config.resolver.rules().is_reserved("founder"));
    }

    #[test]
    fn missing_file_is_an_error() {
        let dir = tempdir().unwrap();
        let err = AppConfig::load(Some(dir.path().join("absent.toml").as_path())).unwrap_err();
        assert!(err.to_string().contains("not found"));
    }
}
