mod config;
mod context;
mod event;
mod health;

pub use config::{
    AuthCredential, ClickstreamConstraints, EventClassification, EventClassifier,
    NetworkConfiguration, TrackerConfig,
};
pub use context::{AppProperties, CommonProperties, CustomerProperties, Location};
pub use event::{ClickstreamEvent, EventState, VisualizerTracking};
pub use health::{HealthTrackerDto, HealthTrackingConfigurations, HealthVerbosity};
