use crate::backend::{EventProcessor, EventWarehouser, HealthTracking, NetworkBuildable};
use crate::connection::ConnectionState;
use crate::delegate::{ClickstreamDataSource, ClickstreamDelegate, EventStateViewable};
use crate::types::{ClickstreamEvent, CommonProperties, EventState, HealthTrackerDto, Location};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use time::OffsetDateTime;

#[derive(Clone, Default)]
pub(crate) struct MockNetwork {
    connected: Arc<AtomicBool>,
}

impl MockNetwork {
    pub(crate) fn new(connected: bool) -> Self {
        Self { connected: Arc::new(AtomicBool::new(connected)) }
    }
}

impl NetworkBuildable for MockNetwork {
    fn is_connected(&self) -> bool {
        self.connected.load(Ordering::SeqCst)
    }
}

#[derive(Clone, Default)]
pub(crate) struct MockProcessor {
    events: Arc<Mutex<Vec<ClickstreamEvent>>>,
}

impl MockProcessor {
    pub(crate) fn guids(&self) -> Vec<String> {
        self.events
            .lock()
            .expect("events mutex poisoned")
            .iter()
            .map(|event| event.guid.clone())
            .collect()
    }
}

impl EventProcessor for MockProcessor {
    fn create_event(&self, event: ClickstreamEvent) {
        self.events.lock().expect("events mutex poisoned").push(event);
    }
}

#[derive(Clone, Default)]
pub(crate) struct MockWarehouser {
    stop_calls: Arc<AtomicUsize>,
}

impl MockWarehouser {
    pub(crate) fn stop_calls(&self) -> usize {
        self.stop_calls.load(Ordering::SeqCst)
    }
}

impl EventWarehouser for MockWarehouser {
    fn stop(&self) {
        self.stop_calls.fetch_add(1, Ordering::SeqCst);
    }
}

#[derive(Default)]
struct HealthLog {
    debug_modes: Vec<bool>,
    properties: Option<CommonProperties>,
    locations: Vec<Option<Location>>,
    recorded: Vec<String>,
}

#[derive(Clone, Default)]
pub(crate) struct MockHealthTracker {
    log: Arc<Mutex<HealthLog>>,
}

impl MockHealthTracker {
    pub(crate) fn debug_modes(&self) -> Vec<bool> {
        self.log.lock().expect("health log mutex poisoned").debug_modes.clone()
    }

    pub(crate) fn last_properties(&self) -> Option<CommonProperties> {
        self.log.lock().expect("health log mutex poisoned").properties.clone()
    }

    pub(crate) fn locations(&self) -> Vec<Option<Location>> {
        self.log.lock().expect("health log mutex poisoned").locations.clone()
    }

    pub(crate) fn recorded(&self) -> Vec<String> {
        self.log.lock().expect("health log mutex poisoned").recorded.clone()
    }
}

impl HealthTracking for MockHealthTracker {
    fn set_debug_mode(&self, enabled: bool) {
        self.log.lock().expect("health log mutex poisoned").debug_modes.push(enabled);
    }

    fn set_common_properties(&self, properties: Option<&CommonProperties>) {
        self.log.lock().expect("health log mutex poisoned").properties = properties.cloned();
    }

    fn set_location(&self, location: Option<Location>) {
        self.log.lock().expect("health log mutex poisoned").locations.push(location);
    }

    fn record(&self, event: HealthTrackerDto) {
        self.log.lock().expect("health log mutex poisoned").recorded.push(event.event_name);
    }
}

pub(crate) struct FixedDataSource {
    location: Option<Location>,
    timestamp: Option<OffsetDateTime>,
}

impl FixedDataSource {
    pub(crate) fn new(location: Option<Location>, timestamp: Option<OffsetDateTime>) -> Self {
        Self { location, timestamp }
    }

    pub(crate) fn empty() -> Self {
        Self::new(None, None)
    }
}

impl ClickstreamDataSource for FixedDataSource {
    fn current_location(&self) -> Option<Location> {
        self.location
    }

    fn current_timestamp(&self) -> Option<OffsetDateTime> {
        self.timestamp
    }
}

type ViewerUpdate = (Vec<String>, Option<String>, EventState);

#[derive(Default)]
pub(crate) struct RecordingViewer {
    updates: Mutex<Vec<ViewerUpdate>>,
}

impl RecordingViewer {
    pub(crate) fn updates(&self) -> Vec<ViewerUpdate> {
        self.updates.lock().expect("viewer mutex poisoned").clone()
    }
}

impl EventStateViewable for RecordingViewer {
    fn on_event_state_changed(&self, guids: &[String], batch_id: Option<&str>, state: EventState) {
        self.updates.lock().expect("viewer mutex poisoned").push((
            guids.to_vec(),
            batch_id.map(str::to_owned),
            state,
        ));
    }
}

#[derive(Default)]
pub(crate) struct RecordingDelegate {
    states: Mutex<Vec<ConnectionState>>,
}

impl RecordingDelegate {
    pub(crate) fn states(&self) -> Vec<ConnectionState> {
        self.states.lock().expect("delegate mutex poisoned").clone()
    }
}

impl ClickstreamDelegate for RecordingDelegate {
    fn on_connection_state_changed(&self, state: ConnectionState) {
        self.states.lock().expect("delegate mutex poisoned").push(state);
    }
}
