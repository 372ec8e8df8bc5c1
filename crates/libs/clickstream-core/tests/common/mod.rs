#![allow(dead_code)]

use clickstream_core::{
    AuthCredential, ClickstreamDataSource, ClickstreamDelegate, ClickstreamEvent, ConnectionState,
    ConnectionStateController, Dependencies, DependencyContext, DependencyError,
    DependencyFactory, EventProcessor, EventWarehouser, NetworkBuildable, NetworkConfiguration,
};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;
use time::OffsetDateTime;

pub struct NoopNetwork;

impl NetworkBuildable for NoopNetwork {
    fn is_connected(&self) -> bool {
        false
    }
}

#[derive(Clone, Default)]
pub struct CountingProcessor {
    pub events: Arc<AtomicUsize>,
}

impl EventProcessor for CountingProcessor {
    fn create_event(&self, _event: ClickstreamEvent) {
        self.events.fetch_add(1, Ordering::SeqCst);
    }
}

#[derive(Clone, Default)]
pub struct CountingWarehouser {
    pub stops: Arc<AtomicUsize>,
}

impl EventWarehouser for CountingWarehouser {
    fn stop(&self) {
        self.stops.fetch_add(1, Ordering::SeqCst);
    }
}

/// Factory that sleeps while building so concurrent callers pile up on the
/// initialization lock.
#[derive(Default)]
pub struct SlowFactory {
    pub builds: AtomicUsize,
    pub fail: bool,
    pub build_delay: Duration,
    pub processor: CountingProcessor,
    pub warehouser: CountingWarehouser,
    pub controller: Mutex<Option<Arc<ConnectionStateController>>>,
}

impl SlowFactory {
    pub fn new(build_delay: Duration) -> Self {
        Self { build_delay, ..Self::default() }
    }

    pub fn failing(build_delay: Duration) -> Self {
        Self { fail: true, ..Self::new(build_delay) }
    }

    pub fn builds(&self) -> usize {
        self.builds.load(Ordering::SeqCst)
    }

    pub fn controller(&self) -> Arc<ConnectionStateController> {
        self.controller
            .lock()
            .expect("controller mutex poisoned")
            .clone()
            .expect("factory has built at least once")
    }
}

impl DependencyFactory for SlowFactory {
    fn build(&self, context: DependencyContext<'_>) -> Result<Dependencies, DependencyError> {
        self.builds.fetch_add(1, Ordering::SeqCst);
        *self.controller.lock().expect("controller mutex poisoned") =
            Some(Arc::clone(&context.connection));
        thread::sleep(self.build_delay);
        if self.fail {
            return Err(DependencyError::storage("event store unavailable"));
        }
        Ok(Dependencies::new(
            Box::new(NoopNetwork),
            Box::new(self.processor.clone()),
            Box::new(self.warehouser.clone()),
        ))
    }
}

pub struct EpochSource;

impl ClickstreamDataSource for EpochSource {
    fn current_timestamp(&self) -> Option<OffsetDateTime> {
        Some(OffsetDateTime::UNIX_EPOCH)
    }
}

#[derive(Default)]
pub struct RecordingDelegate {
    pub states: Mutex<Vec<ConnectionState>>,
}

impl ClickstreamDelegate for RecordingDelegate {
    fn on_connection_state_changed(&self, state: ConnectionState) {
        self.states.lock().expect("delegate mutex poisoned").push(state);
    }
}

pub fn network() -> NetworkConfiguration {
    NetworkConfiguration::new("wss://events.example.com/v1", AuthCredential::new("token"))
}

pub fn data_source() -> Arc<dyn ClickstreamDataSource> {
    Arc::new(EpochSource)
}

pub fn event(guid: &str) -> ClickstreamEvent {
    ClickstreamEvent::new(guid, "Tap", Vec::new(), OffsetDateTime::UNIX_EPOCH)
}
