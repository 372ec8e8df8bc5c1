//! Lifecycle and state-coordination core of the clickstream tracking SDK.
//!
//! - [`Clickstream`] is the composition root: it builds at most one
//!   [`TrackingSession`] at a time through a host-supplied
//!   [`DependencyFactory`] and tears it down again.
//! - [`ConnectionStateController`] holds the transport's connection state in
//!   an [`AtomicStateCell`] and relays every change, in commit order, to the
//!   live session's [`ClickstreamDelegate`].
//! - [`ClickstreamDataSource`], [`ClickstreamDelegate`] and
//!   [`EventStateViewable`] are implemented by the host and held weakly.
//!
//! Transport, warehousing, event processing and health tracking live behind
//! the traits in this crate and are supplied by the host.

mod backend;
mod client;
mod connection;
pub mod delegate;
mod error;
mod logging;
mod registry;
mod session;
mod state_cell;
mod sync;
pub mod types;

#[cfg(all(test, not(feature = "loom-tests")))]
mod mocks;

pub use backend::{
    Dependencies, DependencyContext, DependencyFactory, EventProcessor, EventWarehouser,
    HealthTracking, NetworkBuildable,
};
pub use client::{Clickstream, InitialiseRequest};
pub use connection::{ConnectionState, ConnectionStateController};
pub use delegate::{ClickstreamDataSource, ClickstreamDelegate, EventStateViewable};
pub use error::{code as error_code, ClickstreamError, ConfigError, DependencyError};
pub use logging::{set_log_level, LogLevel};
pub use registry::SessionRegistry;
pub use session::{normalize_app_prefix, SessionConfiguration, TrackingSession};
pub use state_cell::AtomicStateCell;
pub use types::{
    AppProperties, AuthCredential, ClickstreamConstraints, ClickstreamEvent, CommonProperties,
    CustomerProperties, EventClassification, EventClassifier, EventState, HealthTrackerDto,
    HealthTrackingConfigurations, HealthVerbosity, Location, NetworkConfiguration, TrackerConfig,
    VisualizerTracking,
};
