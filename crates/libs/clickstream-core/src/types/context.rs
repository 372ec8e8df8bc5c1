use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use std::collections::BTreeMap;

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq)]
pub struct Location {
    pub latitude: f64,
    pub longitude: f64,
}

impl Location {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self { latitude, longitude }
    }
}

#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
#[non_exhaustive]
pub struct CustomerProperties {
    pub identity: String,
    #[serde(default)]
    pub signed_up_country: Option<String>,
    #[serde(default)]
    pub current_country: Option<String>,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
#[non_exhaustive]
pub struct AppProperties {
    pub version: String,
    #[serde(default)]
    pub name: Option<String>,
}

/// Host identity and app metadata attached to the session.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
#[non_exhaustive]
pub struct CommonProperties {
    pub customer: CustomerProperties,
    pub app: AppProperties,
    #[serde(default)]
    pub extensions: BTreeMap<String, JsonValue>,
}

impl CommonProperties {
    pub fn new(customer_identity: impl Into<String>, app_version: impl Into<String>) -> Self {
        Self {
            customer: CustomerProperties {
                identity: customer_identity.into(),
                ..CustomerProperties::default()
            },
            app: AppProperties { version: app_version.into(), name: None },
            extensions: BTreeMap::new(),
        }
    }

    pub fn with_app_name(mut self, name: impl Into<String>) -> Self {
        self.app.name = Some(name.into());
        self
    }

    pub fn with_extension(mut self, key: impl Into<String>, value: JsonValue) -> Self {
        self.extensions.insert(key.into(), value);
        self
    }
}
