//! Configuration file loading with environment variable overrides.

use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::provider::Provider;

/// Default address the proxy server binds to.
pub const DEFAULT_BIND: &str = "127.0.0.1:3000";

/// Generic key variable, consulted after the provider-specific one.
const GENERIC_KEY_VAR: &str = "API_KEY";

/// Top-level configuration.
#[derive(Debug, Default, Deserialize)]
pub struct Config {
    /// HTTP server settings.
    #[serde(default)]
    pub server: ServerConfig,

    /// Which provider backs the proxy.
    #[serde(default)]
    pub provider: ProviderConfig,

    /// API key configuration.
    #[serde(default)]
    pub keys: KeysConfig,
}

/// HTTP server settings.
#[derive(Debug, Deserialize)]
pub struct ServerConfig {
    /// Socket address to bind, e.g. `"0.0.0.0:8080"`.
    pub bind: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: DEFAULT_BIND.to_string(),
        }
    }
}

/// Provider selection.
#[derive(Debug, Deserialize)]
pub struct ProviderConfig {
    /// Provider name or alias (`stability`, `modelslab`, ...).
    pub name: String,
    /// Override for the provider's fixed endpoint.
    #[serde(default)]
    pub endpoint: Option<String>,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            name: Provider::Stability.name().to_string(),
            endpoint: None,
        }
    }
}

/// API key configuration.
#[derive(Debug, Default, Deserialize)]
pub struct KeysConfig {
    /// Stability API key.
    pub stability: Option<String>,
    /// `ModelsLab` API key.
    pub modelslab: Option<String>,
}

impl Config {
    /// Load configuration from the given path, or return defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be parsed.
    pub fn load(path: &Path) -> Result<Self, String> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let contents = std::fs::read_to_string(path)
            .map_err(|e| format!("Failed to read config {}: {e}", path.display()))?;
        toml::from_str(&contents)
            .map_err(|e| format!("Failed to parse config {}: {e}", path.display()))
    }

    /// The configured provider.
    ///
    /// # Errors
    ///
    /// Returns an error if the provider name is unknown.
    pub fn provider(&self) -> Result<Provider, String> {
        self.provider.name.parse()
    }

    /// Get the API key for `provider`, preferring its environment variable,
    /// then `API_KEY`, then the config file.
    #[must_use]
    pub fn api_key(&self, provider: Provider) -> Option<String> {
        let from_file = match provider {
            Provider::Stability => self.keys.stability.clone(),
            Provider::ModelsLab => self.keys.modelslab.clone(),
        };
        non_empty_env(provider.env_var())
            .or_else(|| non_empty_env(GENERIC_KEY_VAR))
            .or(from_file)
    }
}

fn non_empty_env(name: &str) -> Option<String> {
    std::env::var(name)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Discover the config file path using the resolution order:
/// 1. Explicit path (from `--config` flag)
/// 2. `PROMPTFORGE_CONFIG` environment variable
/// 3. `~/.config/promptforge/config.toml`
#[must_use]
pub fn discover_config_path(explicit: Option<&str>) -> PathBuf {
    if let Some(p) = explicit {
        return PathBuf::from(p);
    }

    if let Ok(p) = std::env::var("PROMPTFORGE_CONFIG") {
        return PathBuf::from(p);
    }

    default_config_path()
}

/// Default config path: `~/.config/promptforge/config.toml`.
fn default_config_path() -> PathBuf {
    if let Ok(home) = std::env::var("HOME") {
        PathBuf::from(home).join(".config/promptforge/config.toml")
    } else {
        PathBuf::from("promptforge.toml")
    }
}
