use super::health::HealthTrackingConfigurations;
use crate::error::{ConfigError, DependencyError};
use crate::logging::LogLevel;
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::fs;
use std::path::Path;
use zeroize::Zeroizing;

/// Secret presented to the event endpoint. Wiped on drop, never printed.
#[derive(Clone, PartialEq, Eq)]
pub struct AuthCredential(Zeroizing<String>);

impl AuthCredential {
    pub fn new(secret: impl Into<String>) -> Self {
        Self(Zeroizing::new(secret.into()))
    }

    pub fn expose(&self) -> &str {
        self.0.as_str()
    }

    pub fn is_empty(&self) -> bool {
        self.0.trim().is_empty()
    }
}

impl fmt::Debug for AuthCredential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("AuthCredential(<redacted>)")
    }
}

impl<'de> Deserialize<'de> for AuthCredential {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        String::deserialize(deserializer).map(Self::new)
    }
}

#[derive(Clone, Debug, Deserialize, PartialEq, Eq)]
#[non_exhaustive]
pub struct NetworkConfiguration {
    pub endpoint: String,
    pub credential: AuthCredential,
    #[serde(default)]
    pub headers: BTreeMap<String, String>,
}

impl NetworkConfiguration {
    pub fn new(endpoint: impl Into<String>, credential: AuthCredential) -> Self {
        Self { endpoint: endpoint.into(), credential, headers: BTreeMap::new() }
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    pub fn validate(&self) -> Result<(), DependencyError> {
        let endpoint = self.endpoint.trim();
        if endpoint.is_empty() {
            return Err(DependencyError::invalid_configuration(
                "network.endpoint",
                "endpoint must not be empty",
            ));
        }
        let lowered = endpoint.to_ascii_lowercase();
        if !(lowered.starts_with("ws://") || lowered.starts_with("wss://")) {
            return Err(DependencyError::invalid_configuration(
                "network.endpoint",
                format!("endpoint '{endpoint}' must use the ws:// or wss:// scheme"),
            ));
        }
        if self.credential.is_empty() {
            return Err(DependencyError::invalid_configuration(
                "network.credential",
                "credential must not be empty",
            ));
        }
        Ok(())
    }
}

/// Limits handed to the transport and warehouser.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(default)]
#[non_exhaustive]
pub struct ClickstreamConstraints {
    pub max_connection_retries: u32,
    pub max_connection_retry_interval_ms: u64,
    pub max_retry_interval_post_primary_failure_ms: u64,
    pub flush_on_background: bool,
    pub connection_termination_timer_wait_ms: u64,
    pub max_request_ack_timeout_ms: u64,
    pub max_retries_per_batch: u32,
    pub max_retry_cache_size: usize,
    pub connection_retry_duration_ms: u64,
    pub flush_on_app_launch: bool,
    pub min_battery_level_percent: f32,
}

impl Default for ClickstreamConstraints {
    fn default() -> Self {
        Self {
            max_connection_retries: 30,
            max_connection_retry_interval_ms: 30_000,
            max_retry_interval_post_primary_failure_ms: 10_000,
            flush_on_background: true,
            connection_termination_timer_wait_ms: 2_000,
            max_request_ack_timeout_ms: 6_000,
            max_retries_per_batch: 20,
            max_retry_cache_size: 5_000_000,
            connection_retry_duration_ms: 3_000,
            flush_on_app_launch: false,
            min_battery_level_percent: 10.0,
        }
    }
}

impl ClickstreamConstraints {
    pub fn validate(&self) -> Result<(), DependencyError> {
        if self.max_request_ack_timeout_ms == 0 {
            return Err(DependencyError::invalid_configuration(
                "constraints.max_request_ack_timeout_ms",
                "must be greater than zero",
            ));
        }
        if self.max_connection_retry_interval_ms < self.connection_retry_duration_ms {
            return Err(DependencyError::invalid_configuration(
                "constraints.max_connection_retry_interval_ms",
                "must not be shorter than connection_retry_duration_ms",
            ));
        }
        if !(0.0..=100.0).contains(&self.min_battery_level_percent) {
            return Err(DependencyError::invalid_configuration(
                "constraints.min_battery_level_percent",
                "must be within 0..=100",
            ));
        }
        Ok(())
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[non_exhaustive]
pub struct EventClassifier {
    pub identifier: String,
    #[serde(default)]
    pub event_names: Vec<String>,
}

impl EventClassifier {
    pub fn new(identifier: impl Into<String>, event_names: Vec<String>) -> Self {
        Self { identifier: identifier.into(), event_names }
    }
}

/// Maps event names onto the classifier that decides how they are shipped.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
#[non_exhaustive]
pub struct EventClassification {
    pub event_types: Vec<EventClassifier>,
}

impl EventClassification {
    pub fn new(event_types: Vec<EventClassifier>) -> Self {
        Self { event_types }
    }

    pub fn classify(&self, event_name: &str) -> Option<&str> {
        self.event_types
            .iter()
            .find(|classifier| classifier.event_names.iter().any(|name| name == event_name))
            .map(|classifier| classifier.identifier.as_str())
    }

    pub fn validate(&self) -> Result<(), DependencyError> {
        let mut seen = BTreeSet::new();
        for classifier in &self.event_types {
            let identifier = classifier.identifier.trim();
            if identifier.is_empty() {
                return Err(DependencyError::invalid_configuration(
                    "event_classification.identifier",
                    "classifier identifiers must not be empty",
                ));
            }
            if !seen.insert(identifier) {
                return Err(DependencyError::invalid_configuration(
                    "event_classification.identifier",
                    format!("duplicate classifier identifier '{identifier}'"),
                ));
            }
        }
        Ok(())
    }
}

/// File form of everything `initialise` needs apart from the host objects.
#[derive(Clone, Debug, Deserialize, PartialEq)]
#[non_exhaustive]
pub struct TrackerConfig {
    pub app_prefix: String,
    pub network: NetworkConfiguration,
    #[serde(default)]
    pub log_level: Option<LogLevel>,
    #[serde(default)]
    pub relay_connection_status: bool,
    #[serde(default)]
    pub constraints: ClickstreamConstraints,
    #[serde(default)]
    pub event_classification: EventClassification,
    #[serde(default)]
    pub health_tracking: Option<HealthTrackingConfigurations>,
}

impl TrackerConfig {
    pub fn from_toml(input: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(input)?)
    }

    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path)
            .map_err(|source| ConfigError::Io { path: path.to_path_buf(), source })?;
        Self::from_toml(&contents)
    }
}
