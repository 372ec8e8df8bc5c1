use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

/// One trackable event as handed over by the host.
///
/// `payload` is already serialized; the core never looks inside it.
#[derive(Clone, Debug, PartialEq, Eq)]
#[non_exhaustive]
pub struct ClickstreamEvent {
    pub guid: String,
    pub event_name: String,
    pub payload: Vec<u8>,
    pub timestamp: OffsetDateTime,
}

impl ClickstreamEvent {
    pub fn new(
        guid: impl Into<String>,
        event_name: impl Into<String>,
        payload: Vec<u8>,
        timestamp: OffsetDateTime,
    ) -> Self {
        Self { guid: guid.into(), event_name: event_name.into(), payload, timestamp }
    }
}

/// Progress of an event through processing, as reported to a state viewer.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
#[non_exhaustive]
pub enum EventState {
    Received,
    Cached,
    Sent,
    Acknowledged,
    Dropped,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct VisualizerTracking {
    pub guid: String,
    pub event_timestamp: String,
}
