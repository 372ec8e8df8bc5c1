//! Contracts implemented by the host application.
//!
//! The session keeps only `Weak` references to these objects. A host that
//! drops its implementation simply stops receiving calls; the core treats
//! the missing object the same as an implementation that returns `None`.

use crate::connection::ConnectionState;
use crate::types::{EventState, Location};
use time::OffsetDateTime;

/// Context the host can supply to enrich tracked events.
pub trait ClickstreamDataSource: Send + Sync {
    /// Current user location. Hosts without location-aware tracking keep the
    /// default.
    fn current_location(&self) -> Option<Location> {
        None
    }

    /// Network-synchronised wall clock, if the host has one.
    fn current_timestamp(&self) -> Option<OffsetDateTime>;
}

/// Observer of connection-state transitions.
///
/// Called on whichever thread delivers the write, with no core lock held.
/// Implementations may call back into the core, including reading the
/// current state.
pub trait ClickstreamDelegate: Send + Sync {
    fn on_connection_state_changed(&self, state: ConnectionState);
}

/// Observer for the event visualizer: receives per-event progress updates.
pub trait EventStateViewable: Send + Sync {
    fn on_event_state_changed(&self, guids: &[String], batch_id: Option<&str>, state: EventState);
}
