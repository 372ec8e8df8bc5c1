use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

const ALL_USERS: &str = "*";

#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
#[non_exhaustive]
pub enum HealthVerbosity {
    #[default]
    Minimum,
    Maximum,
}

/// Decides which hosts run the health tracker in debug mode.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
#[non_exhaustive]
pub struct HealthTrackingConfigurations {
    /// Lowest app version (dotted numeric) that reports health events.
    pub minimum_tracked_version: String,
    /// Customer identities enabled for debug mode; `"*"` enables everyone.
    pub whitelisted_users: Vec<String>,
    pub destination: Vec<String>,
    pub verbosity: HealthVerbosity,
}

impl HealthTrackingConfigurations {
    pub fn new(minimum_tracked_version: impl Into<String>, whitelisted_users: Vec<String>) -> Self {
        Self {
            minimum_tracked_version: minimum_tracked_version.into(),
            whitelisted_users,
            destination: Vec::new(),
            verbosity: HealthVerbosity::Minimum,
        }
    }

    pub fn debug_mode(&self, user_id: &str, current_app_version: &str) -> bool {
        let user_enabled = self
            .whitelisted_users
            .iter()
            .any(|candidate| candidate == ALL_USERS || candidate == user_id);
        user_enabled
            && compare_versions(current_app_version, &self.minimum_tracked_version)
                != Ordering::Less
    }
}

// Missing or non-numeric components count as zero, so "4.2" == "4.2.0".
fn compare_versions(left: &str, right: &str) -> Ordering {
    let parse = |version: &str| -> Vec<u64> {
        version
            .trim()
            .split('.')
            .map(|part| {
                let digits: String = part.chars().take_while(char::is_ascii_digit).collect();
                digits.parse().unwrap_or(0)
            })
            .collect()
    };
    let left = parse(left);
    let right = parse(right);
    let len = left.len().max(right.len());
    for idx in 0..len {
        let l = left.get(idx).copied().unwrap_or(0);
        let r = right.get(idx).copied().unwrap_or(0);
        match l.cmp(&r) {
            Ordering::Equal => continue,
            other => return other,
        }
    }
    Ordering::Equal
}

/// A health event describing SDK-internal behaviour (drops, socket failures).
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
#[non_exhaustive]
pub struct HealthTrackerDto {
    pub event_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub failure_reason: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time_to_connection: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub event_guids: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub event_batch_guids: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub event_count: Option<u64>,
}

impl HealthTrackerDto {
    pub fn new(event_name: impl Into<String>) -> Self {
        Self { event_name: event_name.into(), ..Self::default() }
    }

    pub fn with_failure_reason(mut self, reason: impl Into<String>) -> Self {
        self.failure_reason = Some(reason.into());
        self
    }

    pub fn with_time_to_connection(mut self, elapsed: impl Into<String>) -> Self {
        self.time_to_connection = Some(elapsed.into());
        self
    }

    pub fn with_event_guids(mut self, guids: Vec<String>) -> Self {
        self.event_count = Some(guids.len() as u64);
        self.event_guids = Some(guids);
        self
    }

    pub fn with_event_batch_guids(mut self, guids: Vec<String>) -> Self {
        self.event_batch_guids = Some(guids);
        self
    }

    pub fn with_session_id(mut self, session_id: impl Into<String>) -> Self {
        self.session_id = Some(session_id.into());
        self
    }

    pub fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or(serde_json::Value::Null)
    }
}
