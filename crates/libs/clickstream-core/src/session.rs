use crate::backend::{
    Dependencies, EventProcessor, EventWarehouser, HealthTracking, NetworkBuildable,
};
use crate::delegate::{ClickstreamDataSource, ClickstreamDelegate, EventStateViewable};
use crate::sync::{AtomicBool, Mutex, Ordering, RwLock};
use crate::types::{
    ClickstreamConstraints, ClickstreamEvent, CommonProperties, EventClassification, EventState,
    HealthTrackerDto, HealthTrackingConfigurations, Location, VisualizerTracking,
};
use std::fmt;
use std::sync::{Arc, Weak};
use time::OffsetDateTime;

/// Lower-cases the prefix and drops every space character.
pub fn normalize_app_prefix(raw: &str) -> String {
    raw.chars().filter(|ch| *ch != ' ').collect::<String>().to_lowercase()
}

/// Read-only settings captured when the session is built.
#[derive(Clone, Debug, PartialEq)]
#[non_exhaustive]
pub struct SessionConfiguration {
    pub constraints: ClickstreamConstraints,
    pub event_classification: EventClassification,
    pub health_tracking: Option<HealthTrackingConfigurations>,
    pub relay_connection_status: bool,
    pub app_prefix: String,
}

/// One live tracking session: the owned collaborators plus host context.
pub struct TrackingSession {
    network: Box<dyn NetworkBuildable>,
    event_processor: Box<dyn EventProcessor>,
    event_warehouser: Box<dyn EventWarehouser>,
    health_tracker: Option<Box<dyn HealthTracking>>,
    data_source: Weak<dyn ClickstreamDataSource>,
    delegate: Option<Weak<dyn ClickstreamDelegate>>,
    state_viewer: RwLock<Option<Weak<dyn EventStateViewable>>>,
    configuration: SessionConfiguration,
    common_properties: Mutex<Option<CommonProperties>>,
    visualizer_tracking: Mutex<Option<VisualizerTracking>>,
    health_debug_mode: AtomicBool,
    stopped: AtomicBool,
}

impl TrackingSession {
    pub(crate) fn new(
        dependencies: Dependencies,
        data_source: Weak<dyn ClickstreamDataSource>,
        delegate: Option<Weak<dyn ClickstreamDelegate>>,
        configuration: SessionConfiguration,
    ) -> Self {
        let Dependencies { network, event_processor, event_warehouser, health_tracker } =
            dependencies;
        let session = Self {
            network,
            event_processor,
            event_warehouser,
            health_tracker,
            data_source,
            delegate,
            state_viewer: RwLock::new(None),
            configuration,
            common_properties: Mutex::new(None),
            visualizer_tracking: Mutex::new(None),
            health_debug_mode: AtomicBool::new(false),
            stopped: AtomicBool::new(false),
        };
        session.configure_health_tracker(None);
        session
    }

    /// Hands `event` to the processor. Never blocks on delivery.
    pub fn track_event(&self, event: ClickstreamEvent) {
        log::trace!("session: track {} ({})", event.guid, event.event_name);
        self.event_processor.create_event(event);
    }

    pub fn is_connected_to_network(&self) -> bool {
        self.network.is_connected()
    }

    /// Stops the warehouser. Later calls do nothing.
    pub fn stop(&self) {
        if self.stopped.swap(true, Ordering::SeqCst) {
            return;
        }
        log::info!("session: stopping event warehouser");
        self.event_warehouser.stop();
    }

    pub fn is_stopped(&self) -> bool {
        self.stopped.load(Ordering::SeqCst)
    }

    pub fn app_prefix(&self) -> &str {
        &self.configuration.app_prefix
    }

    pub fn configuration(&self) -> &SessionConfiguration {
        &self.configuration
    }

    pub fn relays_connection_status(&self) -> bool {
        self.configuration.relay_connection_status
    }

    pub fn data_source(&self) -> Option<Arc<dyn ClickstreamDataSource>> {
        self.data_source.upgrade()
    }

    pub fn delegate(&self) -> Option<Arc<dyn ClickstreamDelegate>> {
        self.delegate.as_ref()?.upgrade()
    }

    pub fn current_timestamp(&self) -> Option<OffsetDateTime> {
        self.data_source()?.current_timestamp()
    }

    /// Asks the data source for a location; in health debug mode the result
    /// is mirrored to the health tracker.
    pub fn location(&self) -> Option<Location> {
        let location = self.data_source()?.current_location();
        if self.health_debug_mode() {
            if let Some(tracker) = self.health_tracker.as_deref() {
                tracker.set_location(location);
            }
        }
        location
    }

    pub fn common_properties(&self) -> Option<CommonProperties> {
        self.common_properties.lock().expect("common properties mutex poisoned").clone()
    }

    /// Replaces the common properties and re-evaluates health debug mode
    /// before returning.
    pub fn set_common_properties(&self, properties: CommonProperties) {
        *self.common_properties.lock().expect("common properties mutex poisoned") =
            Some(properties.clone());
        self.configure_health_tracker(Some(&properties));
    }

    pub fn health_debug_mode(&self) -> bool {
        self.health_debug_mode.load(Ordering::SeqCst)
    }

    /// Forwards `event` to the health tracker while debug mode is on.
    pub fn record_health_event(&self, event: HealthTrackerDto) {
        if !self.health_debug_mode() {
            return;
        }
        if let Some(tracker) = self.health_tracker.as_deref() {
            tracker.record(event);
        }
    }

    pub fn set_state_viewer(&self, viewer: Option<&Arc<dyn EventStateViewable>>) {
        *self.state_viewer.write().expect("state viewer lock poisoned") =
            viewer.map(Arc::downgrade);
    }

    pub fn state_viewer(&self) -> Option<Arc<dyn EventStateViewable>> {
        self.state_viewer.read().expect("state viewer lock poisoned").as_ref()?.upgrade()
    }

    pub fn notify_event_state(&self, guids: &[String], batch_id: Option<&str>, state: EventState) {
        if let Some(viewer) = self.state_viewer() {
            viewer.on_event_state_changed(guids, batch_id, state);
        }
    }

    pub fn set_event_visualizer_state_tracking(
        &self,
        guid: impl Into<String>,
        event_timestamp: impl Into<String>,
    ) {
        *self.visualizer_tracking.lock().expect("visualizer tracking mutex poisoned") =
            Some(VisualizerTracking { guid: guid.into(), event_timestamp: event_timestamp.into() });
    }

    pub fn event_visualizer_state_tracking(&self) -> Option<VisualizerTracking> {
        self.visualizer_tracking.lock().expect("visualizer tracking mutex poisoned").clone()
    }

    fn configure_health_tracker(&self, properties: Option<&CommonProperties>) {
        let Some(tracker) = self.health_tracker.as_deref() else {
            return;
        };
        let debug_mode = match (properties, self.configuration.health_tracking.as_ref()) {
            (Some(properties), Some(configs)) => {
                configs.debug_mode(&properties.customer.identity, &properties.app.version)
            }
            _ => self.health_debug_mode(),
        };
        self.health_debug_mode.store(debug_mode, Ordering::SeqCst);
        log::debug!("session: health tracking debug mode = {debug_mode}");
        tracker.set_debug_mode(debug_mode);
        if debug_mode {
            tracker.set_common_properties(properties);
        }
    }
}

impl fmt::Debug for TrackingSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TrackingSession")
            .field("app_prefix", &self.configuration.app_prefix)
            .field("relay_connection_status", &self.configuration.relay_connection_status)
            .field("health_debug_mode", &self.health_debug_mode())
            .field("stopped", &self.is_stopped())
            .finish_non_exhaustive()
    }
}
