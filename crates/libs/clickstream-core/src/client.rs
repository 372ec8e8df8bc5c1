use crate::backend::{DependencyContext, DependencyFactory};
use crate::connection::{ConnectionState, ConnectionStateController};
use crate::delegate::{ClickstreamDataSource, ClickstreamDelegate};
use crate::error::{ClickstreamError, DependencyError};
use crate::logging::set_log_level;
use crate::registry::SessionRegistry;
use crate::session::{normalize_app_prefix, SessionConfiguration, TrackingSession};
use crate::types::{
    ClickstreamConstraints, ClickstreamEvent, EventClassification, HealthTrackingConfigurations,
    NetworkConfiguration, TrackerConfig,
};
use std::fmt;
use std::sync::{Arc, Weak};
use time::OffsetDateTime;

/// Arguments for [`Clickstream::initialise`].
#[derive(Clone)]
#[non_exhaustive]
pub struct InitialiseRequest {
    pub network: NetworkConfiguration,
    pub constraints: ClickstreamConstraints,
    pub event_classification: EventClassification,
    pub health_tracking: Option<HealthTrackingConfigurations>,
    pub data_source: Weak<dyn ClickstreamDataSource>,
    pub delegate: Option<Weak<dyn ClickstreamDelegate>>,
    pub relay_connection_status: bool,
    pub app_prefix: String,
}

impl InitialiseRequest {
    pub fn new(
        network: NetworkConfiguration,
        data_source: &Arc<dyn ClickstreamDataSource>,
        app_prefix: impl Into<String>,
    ) -> Self {
        Self {
            network,
            constraints: ClickstreamConstraints::default(),
            event_classification: EventClassification::default(),
            health_tracking: None,
            data_source: Arc::downgrade(data_source),
            delegate: None,
            relay_connection_status: false,
            app_prefix: app_prefix.into(),
        }
    }

    pub fn from_config(config: TrackerConfig, data_source: &Arc<dyn ClickstreamDataSource>) -> Self {
        Self {
            network: config.network,
            constraints: config.constraints,
            event_classification: config.event_classification,
            health_tracking: config.health_tracking,
            data_source: Arc::downgrade(data_source),
            delegate: None,
            relay_connection_status: config.relay_connection_status,
            app_prefix: config.app_prefix,
        }
    }

    pub fn with_constraints(mut self, constraints: ClickstreamConstraints) -> Self {
        self.constraints = constraints;
        self
    }

    pub fn with_event_classification(mut self, classification: EventClassification) -> Self {
        self.event_classification = classification;
        self
    }

    pub fn with_health_tracking(mut self, configs: HealthTrackingConfigurations) -> Self {
        self.health_tracking = Some(configs);
        self
    }

    pub fn with_delegate(mut self, delegate: &Arc<dyn ClickstreamDelegate>) -> Self {
        self.delegate = Some(Arc::downgrade(delegate));
        self
    }

    pub fn with_relay_connection_status(mut self, relay: bool) -> Self {
        self.relay_connection_status = relay;
        self
    }

    pub fn validate(&self) -> Result<(), DependencyError> {
        if self.data_source.strong_count() == 0 {
            return Err(DependencyError::invalid_configuration(
                "data_source",
                "a live data source is required",
            ));
        }
        self.network.validate()?;
        self.constraints.validate()?;
        self.event_classification.validate()
    }
}

impl fmt::Debug for InitialiseRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InitialiseRequest")
            .field("network", &self.network)
            .field("app_prefix", &self.app_prefix)
            .field("relay_connection_status", &self.relay_connection_status)
            .field("has_delegate", &self.delegate.is_some())
            .finish_non_exhaustive()
    }
}

/// Composition root for the tracking SDK.
///
/// Owns the session registry, the connection-state controller and the
/// factory that builds each session's collaborators. Hosts normally create
/// one and keep it for the life of the process; tests create as many
/// independent instances as they need.
pub struct Clickstream {
    registry: Arc<SessionRegistry<TrackingSession>>,
    connection: Arc<ConnectionStateController>,
    factory: Box<dyn DependencyFactory>,
}

impl Clickstream {
    pub fn new(factory: impl DependencyFactory + 'static) -> Self {
        let registry = Arc::new(SessionRegistry::new());
        let connection = Arc::new(ConnectionStateController::new(Arc::downgrade(&registry)));
        Self { registry, connection, factory: Box::new(factory) }
    }

    /// Builds the session, or returns the live one untouched.
    ///
    /// While a session is live the arguments of later calls are ignored,
    /// credentials and configuration included. Call [`Clickstream::destroy`]
    /// first to apply new settings.
    pub fn initialise(
        &self,
        request: InitialiseRequest,
    ) -> Result<Arc<TrackingSession>, ClickstreamError> {
        let mut built = false;
        let result = self.registry.create_if_absent(|| {
            built = true;
            self.build_session(request)
        });

        match result {
            Ok(session) if built => {
                log::info!("clickstream: session initialised (app_prefix={})", session.app_prefix());
                Ok(session)
            }
            Ok(session) => {
                log::warn!(
                    "clickstream: initialise called while a session is active; keeping app_prefix={} and ignoring new arguments",
                    session.app_prefix()
                );
                Ok(session)
            }
            Err(failure) => {
                match &failure {
                    BuildFailure::Rejected(source) => {
                        log::error!("clickstream: cannot initialise, request rejected: {source}")
                    }
                    BuildFailure::Dependencies(source) => log::error!(
                        "clickstream: cannot initialise, dependencies could not be built: {source}"
                    ),
                }
                Err(ClickstreamError::initialisation(failure.into_source()))
            }
        }
    }

    /// Applies the config's log level, then initialises from it.
    pub fn initialise_from_config(
        &self,
        config: TrackerConfig,
        data_source: &Arc<dyn ClickstreamDataSource>,
        delegate: Option<&Arc<dyn ClickstreamDelegate>>,
    ) -> Result<Arc<TrackingSession>, ClickstreamError> {
        if let Some(level) = config.log_level {
            set_log_level(level);
        }
        let mut request = InitialiseRequest::from_config(config, data_source);
        if let Some(delegate) = delegate {
            request = request.with_delegate(delegate);
        }
        self.initialise(request)
    }

    pub fn get_instance(&self) -> Option<Arc<TrackingSession>> {
        self.registry.get()
    }

    pub fn is_initialised(&self) -> bool {
        self.registry.is_active()
    }

    pub fn track_event(&self, event: ClickstreamEvent) {
        match self.registry.get() {
            Some(session) => session.track_event(event),
            None => log::debug!("clickstream: dropping event {}, not initialised", event.guid),
        }
    }

    pub fn stop_tracking(&self) {
        if let Some(session) = self.registry.get() {
            session.stop();
        }
    }

    /// Stops the warehouser, releases the session, and reports `Closed` to
    /// the released session's delegate.
    ///
    /// The delegate is called after the registry's locks are released, so it
    /// may initialise a new session or call `destroy` again.
    pub fn destroy(&self) {
        let connection = &self.connection;
        let released = self.registry.destroy_with(|session| {
            session.stop();
            connection.close_for_released(session);
        });
        if released.is_some() {
            log::info!("clickstream: session destroyed");
        }
        connection.flush();
    }

    pub fn connection_state(&self) -> ConnectionState {
        self.connection.current_state()
    }

    pub fn is_connected_to_network(&self) -> bool {
        self.registry.get().is_some_and(|session| session.is_connected_to_network())
    }

    pub fn current_timestamp(&self) -> Option<OffsetDateTime> {
        self.registry.get()?.current_timestamp()
    }

    fn build_session(&self, request: InitialiseRequest) -> Result<TrackingSession, BuildFailure> {
        request.validate().map_err(BuildFailure::Rejected)?;
        let app_prefix = normalize_app_prefix(&request.app_prefix);
        let dependencies = self
            .factory
            .build(DependencyContext {
                network: &request.network,
                constraints: &request.constraints,
                event_classification: &request.event_classification,
                app_prefix: &app_prefix,
                connection: Arc::clone(&self.connection),
            })
            .map_err(BuildFailure::Dependencies)?;
        let configuration = SessionConfiguration {
            constraints: request.constraints,
            event_classification: request.event_classification,
            health_tracking: request.health_tracking,
            relay_connection_status: request.relay_connection_status,
            app_prefix,
        };
        Ok(TrackingSession::new(dependencies, request.data_source, request.delegate, configuration))
    }
}

// Why a session could not be built; both surface as the same error.
#[derive(Debug)]
enum BuildFailure {
    /// The request failed validation; the factory never ran.
    Rejected(DependencyError),
    Dependencies(DependencyError),
}

impl BuildFailure {
    fn into_source(self) -> DependencyError {
        match self {
            Self::Rejected(source) | Self::Dependencies(source) => source,
        }
    }
}

impl fmt::Debug for Clickstream {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Clickstream")
            .field("session", &self.registry.get())
            .field("connection_state", &self.connection.current_state())
            .finish_non_exhaustive()
    }
}
