//! The document port.
//!
//! Registrations never talk to a browser directly. They read the page
//! identity and subscribe to and publish events through [`Document`], which a
//! host implements on top of its real DOM bindings.
//!
//! [`MemoryDocument`] is an in-memory implementation for headless hosts and
//! tests: attributes are a plain map, listeners run synchronously in
//! subscription order, and every dispatched event name is recorded. A failing
//! listener does not keep later listeners from running.

use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

use log::warn;
use serde::{Deserialize, Serialize};

use crate::config::Config;
use crate::error::Result;

/// Event fired by Turbolinks after every page load, including pseudo-navigations.
pub const TURBOLINKS_LOAD: &str = "turbolinks:load";

/// Event fired by the browser once the initial document has been parsed.
pub const DOM_CONTENT_LOADED: &str = "DOMContentLoaded";

/// Callback registered on a document event.
///
/// An error returned by a listener is reported by the dispatch that invoked
/// it; the remaining listeners still run.
pub type Listener = Rc<dyn Fn() -> Result<()>>;

/// Abstraction over the page document.
pub trait Document {
    /// Reads an attribute from the document's root element.
    fn attribute(&self, name: &str) -> Option<String>;

    /// Subscribes a listener to the named event.
    fn add_event_listener(&self, event: &str, listener: Listener);

    /// Publishes the named event to every subscribed listener.
    ///
    /// Every listener runs, even after an earlier one failed. The first
    /// error is returned once all of them have run.
    fn dispatch_event(&self, event: &str) -> Result<()>;
}

impl<D: Document + ?Sized> Document for Rc<D> {
    fn attribute(&self, name: &str) -> Option<String> {
        (**self).attribute(name)
    }

    fn add_event_listener(&self, event: &str, listener: Listener) {
        (**self).add_event_listener(event, listener)
    }

    fn dispatch_event(&self, event: &str) -> Result<()> {
        (**self).dispatch_event(event)
    }
}

/// Which signal marks the page as ready for dispatch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ReadySignal {
    /// `turbolinks:load`, fired on the first load and after each visit.
    #[default]
    Turbolinks,
    /// `DOMContentLoaded`, fired once per full page load.
    DomContentLoaded,
}

impl ReadySignal {
    /// Picks the signal from the "uses navigation library" flag.
    pub fn from_uses_navigation_library(uses_navigation_library: bool) -> Self {
        if uses_navigation_library {
            ReadySignal::Turbolinks
        } else {
            ReadySignal::DomContentLoaded
        }
    }

    /// The document event name for this signal.
    pub fn event_name(self) -> &'static str {
        match self {
            ReadySignal::Turbolinks => TURBOLINKS_LOAD,
            ReadySignal::DomContentLoaded => DOM_CONTENT_LOADED,
        }
    }
}

impl fmt::Display for ReadySignal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.event_name())
    }
}

/// In-memory document.
///
/// # Example
///
/// ```rust
/// use raicon::{Document, MemoryDocument};
/// use std::cell::Cell;
/// use std::rc::Rc;
///
/// let doc = MemoryDocument::new().with_attribute("data-raicon-controller", "users");
/// let fired = Rc::new(Cell::new(0));
/// let counter = fired.clone();
/// doc.add_event_listener("turbolinks:load", Rc::new(move || {
///     counter.set(counter.get() + 1);
///     Ok(())
/// }));
///
/// doc.dispatch_event("turbolinks:load")?;
/// assert_eq!(fired.get(), 1);
/// assert_eq!(doc.dispatched(), vec!["turbolinks:load"]);
/// # Ok::<(), raicon::RaiconError>(())
/// ```
#[derive(Default)]
pub struct MemoryDocument {
    attributes: RefCell<HashMap<String, String>>,
    listeners: RefCell<Vec<(String, Listener)>>,
    dispatched: RefCell<Vec<String>>,
}

impl MemoryDocument {
    /// Creates an empty document with no attributes and no listeners.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a root-element attribute.
    pub fn with_attribute(self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.set_attribute(name, value);
        self
    }

    /// Sets a root-element attribute, replacing any previous value.
    pub fn set_attribute(&self, name: impl Into<String>, value: impl Into<String>) {
        self.attributes
            .borrow_mut()
            .insert(name.into(), value.into());
    }

    /// Removes a root-element attribute.
    pub fn remove_attribute(&self, name: &str) -> Option<String> {
        self.attributes.borrow_mut().remove(name)
    }

    /// Number of listeners subscribed to `event`.
    pub fn listener_count(&self, event: &str) -> usize {
        self.listeners
            .borrow()
            .iter()
            .filter(|(name, _)| name == event)
            .count()
    }

    /// Every event dispatched so far, oldest first.
    pub fn dispatched(&self) -> Vec<String> {
        self.dispatched.borrow().clone()
    }

    /// Forgets the dispatched-event log.
    pub fn clear_dispatched(&self) {
        self.dispatched.borrow_mut().clear();
    }

    /// Simulates a Turbolinks visit with the default attribute names.
    pub fn visit(&self, controller: &str, action: &str) -> Result<()> {
        self.visit_with(&Config::default(), controller, action)
    }

    /// Simulates a visit: swaps in the new identity attributes and fires the
    /// configured ready signal.
    pub fn visit_with(&self, config: &Config, controller: &str, action: &str) -> Result<()> {
        self.set_attribute(config.controller_attribute.as_str(), controller);
        self.set_attribute(config.action_attribute.as_str(), action);
        self.dispatch_event(config.ready.event_name())
    }
}

impl Document for MemoryDocument {
    fn attribute(&self, name: &str) -> Option<String> {
        self.attributes.borrow().get(name).cloned()
    }

    fn add_event_listener(&self, event: &str, listener: Listener) {
        self.listeners
            .borrow_mut()
            .push((event.to_string(), listener));
    }

    fn dispatch_event(&self, event: &str) -> Result<()> {
        self.dispatched.borrow_mut().push(event.to_string());

        // Snapshot so listeners may subscribe or dispatch while we iterate.
        let listeners: Vec<Listener> = self
            .listeners
            .borrow()
            .iter()
            .filter(|(name, _)| name == event)
            .map(|(_, listener)| Rc::clone(listener))
            .collect();

        let mut first_error = None;
        for listener in listeners {
            if let Err(err) = listener() {
                if first_error.is_none() {
                    first_error = Some(err);
                } else {
                    warn!("listener for {event} failed: {err}");
                }
            }
        }
        first_error.map_or(Ok(()), Err)
    }
}

impl fmt::Debug for MemoryDocument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MemoryDocument")
            .field("attributes", &self.attributes.borrow())
            .field("listener_count", &self.listeners.borrow().len())
            .field("dispatched", &self.dispatched.borrow())
            .finish()
    }
}
