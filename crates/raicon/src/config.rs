//! Registration configuration.
//!
//! Defaults match the Rails helper that renders `data-raicon-controller` and
//! `data-raicon-action` onto `<body>`, and a page running Turbolinks.
//! A configuration can also be loaded from JSON, with any field omitted:
//!
//! ```rust
//! use raicon::{Config, ReadySignal};
//!
//! let config = Config::from_json(r#"{ "ready": "dom-content-loaded" }"#)?;
//! assert_eq!(config.ready, ReadySignal::DomContentLoaded);
//! assert_eq!(config.namespace, "raicon");
//! # Ok::<(), raicon::RaiconError>(())
//! ```

use serde::{Deserialize, Serialize};

use crate::document::ReadySignal;
use crate::error::{RaiconError, Result};

/// Default prefix of every lifecycle event name.
pub const DEFAULT_NAMESPACE: &str = "raicon";

/// Default root-element attribute holding the controller name.
pub const DEFAULT_CONTROLLER_ATTRIBUTE: &str = "data-raicon-controller";

/// Default root-element attribute holding the action name.
pub const DEFAULT_ACTION_ATTRIBUTE: &str = "data-raicon-action";

/// Settings shared by a registration's listener and its broadcast events.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Prefix of the lifecycle events, e.g. `raicon` in `raicon:before:users#show`.
    pub namespace: String,
    /// Root-element attribute holding the controller name.
    pub controller_attribute: String,
    /// Root-element attribute holding the action name.
    pub action_attribute: String,
    /// The signal that triggers dispatch.
    pub ready: ReadySignal,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            namespace: DEFAULT_NAMESPACE.to_string(),
            controller_attribute: DEFAULT_CONTROLLER_ATTRIBUTE.to_string(),
            action_attribute: DEFAULT_ACTION_ATTRIBUTE.to_string(),
            ready: ReadySignal::default(),
        }
    }
}

impl Config {
    /// Creates the default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses a configuration from JSON. Missing fields take their defaults.
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(RaiconError::Config)
    }

    /// Sets the event namespace.
    pub fn with_namespace(mut self, namespace: impl Into<String>) -> Self {
        self.namespace = namespace.into();
        self
    }

    /// Sets the attribute names read from the root element.
    pub fn with_attributes(
        mut self,
        controller_attribute: impl Into<String>,
        action_attribute: impl Into<String>,
    ) -> Self {
        self.controller_attribute = controller_attribute.into();
        self.action_attribute = action_attribute.into();
        self
    }

    /// Sets the ready signal.
    pub fn with_ready(mut self, ready: ReadySignal) -> Self {
        self.ready = ready;
        self
    }
}
