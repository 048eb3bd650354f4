//! Error taxonomy for the agent
//!
//! - `ConfigurationError`: the configuration document is missing or unreadable
//! - `PluginError`: a single plugin call failed (validation, HTTP status, IO, other)
//! - `AgentError`: the registry could not start or dispatch

use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum ConfigurationError {
    #[error("Configuration file not found: {}", .0.display())]
    NotFound(PathBuf),
    #[error("Failed to read configuration from {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to parse configuration from {origin}: {source}")]
    Parse {
        origin: String,
        #[source]
        source: serde_yaml::Error,
    },
    #[error("Invalid auth entry for '{endpoint}': {reason}")]
    InvalidAuth { endpoint: String, reason: String },
}

/// Failure of one plugin operation.
///
/// Every variant carries the plugin name and the operation label, so the
/// rendered message always reads `Plugin '<name>' operation '<op>' failed: ...`.
#[derive(Debug, thiserror::Error)]
pub enum PluginError {
    #[error("Plugin '{plugin}' operation '{operation}' failed: {message}")]
    Validation {
        plugin: String,
        operation: String,
        message: String,
    },
    #[error("Plugin '{plugin}' operation '{operation}' failed: HTTP {status}: {body}")]
    Status {
        plugin: String,
        operation: String,
        status: u16,
        body: String,
    },
    #[error("Plugin '{plugin}' operation '{operation}' failed: IO error")]
    Io {
        plugin: String,
        operation: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("Plugin '{plugin}' operation '{operation}' failed: Unexpected error ({detail})")]
    Unexpected {
        plugin: String,
        operation: String,
        detail: String,
    },
}

impl PluginError {
    pub fn validation(
        plugin: impl Into<String>,
        operation: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self::Validation {
            plugin: plugin.into(),
            operation: operation.into(),
            message: message.into(),
        }
    }

    pub fn unexpected(
        plugin: impl Into<String>,
        operation: impl Into<String>,
        detail: impl std::fmt::Display,
    ) -> Self {
        Self::Unexpected {
            plugin: plugin.into(),
            operation: operation.into(),
            detail: detail.to_string(),
        }
    }

    pub fn plugin(&self) -> &str {
        match self {
            Self::Validation { plugin, .. }
            | Self::Status { plugin, .. }
            | Self::Io { plugin, .. }
            | Self::Unexpected { plugin, .. } => plugin,
        }
    }

    pub fn operation(&self) -> &str {
        match self {
            Self::Validation { operation, .. }
            | Self::Status { operation, .. }
            | Self::Io { operation, .. }
            | Self::Unexpected { operation, .. } => operation,
        }
    }

    /// HTTP status for non-2xx responses
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation { .. })
    }
}

#[derive(Debug, thiserror::Error)]
pub enum AgentError {
    #[error(transparent)]
    Configuration(#[from] ConfigurationError),
    #[error("Failed to register plugin {plugin}: {reason}")]
    Registration { plugin: String, reason: String },
    #[error("Plugin not registered: {0}")]
    UnknownPlugin(String),
    #[error("Agent is not running")]
    NotRunning,
    #[error(transparent)]
    Plugin(#[from] PluginError),
}
