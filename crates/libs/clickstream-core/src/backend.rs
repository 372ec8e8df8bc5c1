use crate::connection::ConnectionStateController;
use crate::error::DependencyError;
use crate::types::{
    ClickstreamConstraints, ClickstreamEvent, CommonProperties, EventClassification,
    HealthTrackerDto, Location, NetworkConfiguration,
};
use std::fmt;
use std::sync::Arc;

/// Socket/connection management owned by the session.
pub trait NetworkBuildable: Send + Sync {
    fn is_connected(&self) -> bool;
}

/// Builds and classifies trackable events. Must not block on network I/O.
pub trait EventProcessor: Send + Sync {
    fn create_event(&self, event: ClickstreamEvent);
}

/// Batching, persistence and flushing of processed events.
pub trait EventWarehouser: Send + Sync {
    fn stop(&self);
}

pub trait HealthTracking: Send + Sync {
    fn set_debug_mode(&self, enabled: bool);

    fn set_common_properties(&self, _properties: Option<&CommonProperties>) {}

    fn set_location(&self, _location: Option<Location>) {}

    fn record(&self, event: HealthTrackerDto);
}

/// The collaborators a session owns exclusively.
pub struct Dependencies {
    pub network: Box<dyn NetworkBuildable>,
    pub event_processor: Box<dyn EventProcessor>,
    pub event_warehouser: Box<dyn EventWarehouser>,
    pub health_tracker: Option<Box<dyn HealthTracking>>,
}

impl Dependencies {
    pub fn new(
        network: Box<dyn NetworkBuildable>,
        event_processor: Box<dyn EventProcessor>,
        event_warehouser: Box<dyn EventWarehouser>,
    ) -> Self {
        Self { network, event_processor, event_warehouser, health_tracker: None }
    }

    pub fn with_health_tracker(mut self, tracker: Box<dyn HealthTracking>) -> Self {
        self.health_tracker = Some(tracker);
        self
    }
}

impl fmt::Debug for Dependencies {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Dependencies")
            .field("health_tracker", &self.health_tracker.is_some())
            .finish_non_exhaustive()
    }
}

/// Inputs available while building dependencies.
///
/// `connection` is the transport's only way to publish state changes.
pub struct DependencyContext<'a> {
    pub network: &'a NetworkConfiguration,
    pub constraints: &'a ClickstreamConstraints,
    pub event_classification: &'a EventClassification,
    pub app_prefix: &'a str,
    pub connection: Arc<ConnectionStateController>,
}

/// Builds the collaborators for a new session.
///
/// Runs while the registry's initialization lock is held: keep it fast and
/// never call back into `Clickstream::initialise` or `Clickstream::destroy`.
pub trait DependencyFactory: Send + Sync {
    fn build(&self, context: DependencyContext<'_>) -> Result<Dependencies, DependencyError>;
}

impl<T> DependencyFactory for Arc<T>
where
    T: DependencyFactory + ?Sized,
{
    fn build(&self, context: DependencyContext<'_>) -> Result<Dependencies, DependencyError> {
        (**self).build(context)
    }
}
