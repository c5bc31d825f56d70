//! Configuration module for cipherpipe
//!
//! A [`CipherPipeConfig`] bundles the settings used to build graphs and
//! keystream engines. It can be stored as JSON or TOML; the format is chosen
//! from the file extension (`.toml` for TOML, anything else is JSON).
//!
//! # Example
//!
//! ```ignore
//! use cipherpipe::config::CipherPipeConfig;
//!
//! let config = CipherPipeConfig::load_or_default("cipherpipe.toml");
//! let graph = cipherpipe::FilterGraph::with_settings(config.graph.clone());
//! ```

pub mod settings;

pub use settings::*;

use crate::error::{CipherPipeError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Extension selecting the TOML format
pub const TOML_EXTENSION: &str = "toml";

/// Top-level configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CipherPipeConfig {
    pub graph: GraphSettings,
    pub keystream: KeystreamSettings,
}

fn is_toml(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case(TOML_EXTENSION))
}

impl CipherPipeConfig {
    /// Load a configuration file from disk and validate it
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            CipherPipeError::Config(format!("Failed to read config file {:?}: {}", path, e))
        })?;

        let config: Self = if is_toml(path) {
            toml::from_str(&content).map_err(|e| {
                CipherPipeError::Config(format!("Failed to parse config file {:?}: {}", path, e))
            })?
        } else {
            serde_json::from_str(&content).map_err(|e| {
                CipherPipeError::Config(format!("Failed to parse config file {:?}: {}", path, e))
            })?
        };

        config.validate()?;
        Ok(config)
    }

    /// Load a configuration file, returning defaults on any error
    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        Self::load(path).unwrap_or_else(|e| {
            tracing::warn!("Failed to load config, using defaults: {}", e);
            Self::default()
        })
    }

    /// Save the configuration to disk
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).map_err(|e| {
                    CipherPipeError::Config(format!("Failed to create config directory: {}", e))
                })?;
            }
        }

        let content = if is_toml(path) {
            toml::to_string_pretty(self)
                .map_err(|e| CipherPipeError::Config(format!("Failed to serialize config: {}", e)))?
        } else {
            serde_json::to_string_pretty(self)
                .map_err(|e| CipherPipeError::Config(format!("Failed to serialize config: {}", e)))?
        };

        std::fs::write(path, content).map_err(|e| {
            CipherPipeError::Config(format!("Failed to write config file {:?}: {}", path, e))
        })
    }

    /// Reject settings no engine or graph can run with
    pub fn validate(&self) -> Result<()> {
        if self.keystream.block_size == 0 {
            return Err(CipherPipeError::Config(
                "keystream.block_size must be non-zero".to_string(),
            ));
        }
        Ok(())
    }
}
