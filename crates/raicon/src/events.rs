//! Lifecycle events broadcast around each action.
//!
//! For every action other than `beforeEach`, a registration publishes two
//! events on the document:
//!
//! ```text
//! raicon:before:admin/users#show   ← published before the action runs
//! admin/users → show()
//! raicon:after:admin/users#show    ← published once it returns successfully
//! ```
//!
//! These names are the crate's only outward contract. Any code with access to
//! the document can subscribe to them, for example through [`on_lifecycle`].

use std::fmt;
use std::rc::Rc;

use crate::config::Config;
use crate::document::Document;
use crate::error::Result;

/// Whether an event precedes or follows the action.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecyclePhase {
    /// Published immediately before the action callback.
    Before,
    /// Published immediately after the action callback returned.
    After,
}

impl fmt::Display for LifecyclePhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LifecyclePhase::Before => write!(f, "before"),
            LifecyclePhase::After => write!(f, "after"),
        }
    }
}

/// Builds a lifecycle event name: `{namespace}:{phase}:{controller}#{action}`.
///
/// ```rust
/// use raicon::{event_name, LifecyclePhase};
///
/// assert_eq!(
///     event_name("raicon", LifecyclePhase::Before, "users", "show"),
///     "raicon:before:users#show"
/// );
/// ```
pub fn event_name(
    namespace: &str,
    phase: LifecyclePhase,
    controller: &str,
    action: &str,
) -> String {
    format!("{namespace}:{phase}:{controller}#{action}")
}

/// Subscribes `callback` to one lifecycle event of `controller#action`.
///
/// The event name uses `config.namespace`, so observers must pass the same
/// configuration as the registration they watch.
pub fn on_lifecycle<D, F>(
    document: &D,
    config: &Config,
    phase: LifecyclePhase,
    controller: &str,
    action: &str,
    callback: F,
) where
    D: Document + ?Sized,
    F: Fn() -> Result<()> + 'static,
{
    let name = event_name(&config.namespace, phase, controller, action);
    document.add_event_listener(&name, Rc::new(callback));
}
