//! Configuration file support for cmdtree registries.
//!
//! Loads optional `.cmdtree/config.toml` from a root directory.

use serde::Deserialize;
use std::path::Path;
use tracing::warn;

use crate::registry::RegistrationPolicy;

/// Root configuration structure
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RegistryConfig {
    /// What happens when a top-level command name is registered twice
    pub policy: RegistrationPolicy,
    /// Attach a "did you mean" hint to unknown subcommand errors
    pub suggest_similar: bool,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            policy: RegistrationPolicy::default(),
            suggest_similar: true,
        }
    }
}

impl RegistryConfig {
    /// Load config from `.cmdtree/config.toml` in the given root directory.
    /// Returns default config if file doesn't exist or is invalid.
    pub fn load(root: &Path) -> Self {
        let config_path = root.join(".cmdtree").join("config.toml");
        Self::load_from_path(&config_path)
    }

    /// Load config from a specific path.
    pub fn load_from_path(path: &Path) -> Self {
        if !path.exists() {
            return Self::default();
        }

        match std::fs::read_to_string(path) {
            Ok(content) => match toml::from_str(&content) {
                Ok(config) => config,
                Err(e) => {
                    warn!("Failed to parse {}: {}", path.display(), e);
                    Self::default()
                }
            },
            Err(e) => {
                warn!("Failed to read {}: {}", path.display(), e);
                Self::default()
            }
        }
    }
}
