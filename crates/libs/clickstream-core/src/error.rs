use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use thiserror::Error;

pub mod code {
    pub const INITIALISATION_FAILED: &str = "CLICKSTREAM_INITIALISATION_FAILED";
    pub const DEPENDENCY_INVALID_CONFIGURATION: &str = "CLICKSTREAM_DEPENDENCY_INVALID_CONFIGURATION";
    pub const DEPENDENCY_TRANSPORT: &str = "CLICKSTREAM_DEPENDENCY_TRANSPORT";
    pub const DEPENDENCY_STORAGE: &str = "CLICKSTREAM_DEPENDENCY_STORAGE";
    pub const DEPENDENCY_INTERNAL: &str = "CLICKSTREAM_DEPENDENCY_INTERNAL";
    pub const CONFIG_IO: &str = "CLICKSTREAM_CONFIG_IO";
    pub const CONFIG_PARSE: &str = "CLICKSTREAM_CONFIG_PARSE";
}

/// Failures reported while building the session's collaborators.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq, Error)]
#[non_exhaustive]
pub enum DependencyError {
    #[error("invalid configuration for '{field}': {message}")]
    InvalidConfiguration { field: String, message: String },

    #[error("transport error: {message}")]
    Transport { message: String },

    #[error("storage error: {message}")]
    Storage { message: String },

    #[error("internal error: {message}")]
    Internal { message: String },
}

impl DependencyError {
    pub fn invalid_configuration(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidConfiguration { field: field.into(), message: message.into() }
    }

    pub fn transport(message: impl Into<String>) -> Self {
        Self::Transport { message: message.into() }
    }

    pub fn storage(message: impl Into<String>) -> Self {
        Self::Storage { message: message.into() }
    }

    pub fn code(&self) -> &'static str {
        match self {
            Self::InvalidConfiguration { .. } => code::DEPENDENCY_INVALID_CONFIGURATION,
            Self::Transport { .. } => code::DEPENDENCY_TRANSPORT,
            Self::Storage { .. } => code::DEPENDENCY_STORAGE,
            Self::Internal { .. } => code::DEPENDENCY_INTERNAL,
        }
    }

    /// Transport and storage failures may clear up on a later attempt.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Transport { .. } | Self::Storage { .. })
    }
}

/// Errors surfaced by the public entry points.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ClickstreamError {
    /// The session could not be built; nothing was registered.
    #[error("clickstream initialisation error: {message}")]
    Initialisation {
        message: String,
        #[source]
        source: DependencyError,
    },
}

impl ClickstreamError {
    pub fn initialisation(source: DependencyError) -> Self {
        Self::Initialisation { message: source.to_string(), source }
    }

    pub fn code(&self) -> &'static str {
        match self {
            Self::Initialisation { .. } => code::INITIALISATION_FAILED,
        }
    }

    pub fn cause(&self) -> &DependencyError {
        match self {
            Self::Initialisation { source, .. } => source,
        }
    }
}

#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ConfigError {
    #[error("failed to read config file {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
}

impl ConfigError {
    pub fn code(&self) -> &'static str {
        match self {
            Self::Io { .. } => code::CONFIG_IO,
            Self::Parse(_) => code::CONFIG_PARSE,
        }
    }
}
