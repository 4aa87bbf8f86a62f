//! Privacy Shield configuration management

use crate::error::{Error, Result};
use crate::privacy::compliance::{ComplianceFramework, ComplianceRuleSet};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Default environment variable holding the field-encryption secret
pub const DEFAULT_KEY_ENV: &str = "ENCRYPTION_KEY";

/// Main Privacy Shield configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ShieldConfig {
    /// HTTP server configuration
    pub server: ServerConfig,

    /// Compliance rule set registration
    pub compliance: ComplianceConfig,

    /// Field encryption configuration
    pub encryption: EncryptionConfig,
}

impl ShieldConfig {
    /// Load configuration from a TOML file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)?;
        Self::from_toml(&content)
            .map_err(|e| Error::Config(format!("{}: {}", path.display(), e)))
    }

    /// Parse configuration from TOML text
    pub fn from_toml(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| Error::Config(e.to_string()))
    }

    /// Render the configuration as TOML
    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).map_err(|e| Error::Config(e.to_string()))
    }
}

/// HTTP server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Host to bind to
    pub host: String,

    /// Port to listen on
    pub port: u16,

    /// Optional prefix every handler route is mounted under
    /// (e.g. `/functions`). Empty mounts at the root.
    pub base_path: String,

    /// Allowed CORS origins (empty = any origin)
    pub cors_origins: Vec<String>,

    /// Maximum accepted request body size in bytes
    pub max_body_bytes: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8787,
            base_path: String::new(),
            cors_origins: Vec::new(),
            max_body_bytes: 2 * 1024 * 1024,
        }
    }
}

/// Compliance rule set registration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ComplianceConfig {
    /// Built-in frameworks to register
    pub frameworks: Vec<ComplianceFramework>,

    /// Additional rule sets registered at start-up
    pub custom: Vec<ComplianceRuleSet>,
}

impl Default for ComplianceConfig {
    fn default() -> Self {
        Self {
            frameworks: vec![ComplianceFramework::Gdpr, ComplianceFramework::Ccpa],
            custom: Vec::new(),
        }
    }
}

/// Field encryption configuration
///
/// The secret itself never lives in the config file; only the name of the
/// environment variable it is read from.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EncryptionConfig {
    /// Environment variable holding the 32-byte secret
    pub key_env: String,
}

impl Default for EncryptionConfig {
    fn default() -> Self {
        Self {
            key_env: DEFAULT_KEY_ENV.to_string(),
        }
    }
}
