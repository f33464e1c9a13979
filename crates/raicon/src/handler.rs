//! Handler types.
//!
//! A handler is the application object whose actions run when its controller
//! is on screen. The set of actions is open-ended and named by the server, so
//! the dispatcher only ever asks two questions of a handler: does it respond
//! to `action`, and if so, perform it.
//!
//! # Core Types
//!
//! - [`Handler`]: the capability every handler implements
//! - [`Actions`]: a ready-made handler built from named closures over shared state
//! - [`HandlerSource`]: what a caller hands to a registration (a constructor,
//!   an instance, or a runtime-typed value), resolved once into an instance
//!
//! # Example
//!
//! ```rust
//! use raicon::{Actions, Handler};
//!
//! #[derive(Default)]
//! struct Page { visits: u32 }
//!
//! let mut handler = Actions::new(Page::default())
//!     .before_each(|page| { page.visits += 1; Ok(()) })
//!     .action("show", |_page| Ok(()));
//!
//! assert!(handler.responds_to("show"));
//! assert!(!handler.responds_to("edit"));
//! handler.perform("beforeEach")?;
//! assert_eq!(handler.state().visits, 1);
//! # Ok::<(), anyhow::Error>(())
//! ```

use std::any::Any;
use std::collections::BTreeMap;
use std::fmt;

use log::debug;

use crate::error::{RaiconError, Result};

/// Name of the action run before every matched action.
pub const BEFORE_EACH: &str = "beforeEach";

/// An object exposing named, zero-argument actions.
pub trait Handler {
    /// Returns true if the handler has a callable action with exactly this name.
    fn responds_to(&self, action: &str) -> bool;

    /// Runs the named action.
    ///
    /// Only called after [`responds_to`](Self::responds_to) returned true.
    fn perform(&mut self, action: &str) -> anyhow::Result<()>;
}

impl<H: Handler + ?Sized> Handler for Box<H> {
    fn responds_to(&self, action: &str) -> bool {
        (**self).responds_to(action)
    }

    fn perform(&mut self, action: &str) -> anyhow::Result<()> {
        (**self).perform(action)
    }
}

/// Boxed action closure over handler state `S`.
pub type ActionFn<S> = Box<dyn FnMut(&mut S) -> anyhow::Result<()>>;

/// A handler assembled from named closures that share one piece of state.
///
/// Names are matched exactly: an action registered as `createPost` is not
/// found under `create_post`.
pub struct Actions<S = ()> {
    state: S,
    actions: BTreeMap<String, ActionFn<S>>,
}

impl<S> Actions<S> {
    /// Creates a handler with no actions around `state`.
    pub fn new(state: S) -> Self {
        Self {
            state,
            actions: BTreeMap::new(),
        }
    }

    /// Adds an action, replacing any action already registered under `name`.
    pub fn action<F>(mut self, name: impl Into<String>, f: F) -> Self
    where
        F: FnMut(&mut S) -> anyhow::Result<()> + 'static,
    {
        self.actions.insert(name.into(), Box::new(f));
        self
    }

    /// Adds the `beforeEach` action.
    pub fn before_each<F>(self, f: F) -> Self
    where
        F: FnMut(&mut S) -> anyhow::Result<()> + 'static,
    {
        self.action(BEFORE_EACH, f)
    }

    /// Shared state.
    pub fn state(&self) -> &S {
        &self.state
    }

    /// Mutable shared state.
    pub fn state_mut(&mut self) -> &mut S {
        &mut self.state
    }

    /// Registered action names, sorted.
    pub fn action_names(&self) -> impl Iterator<Item = &str> {
        self.actions.keys().map(String::as_str)
    }
}

impl<S: Default> Default for Actions<S> {
    fn default() -> Self {
        Self::new(S::default())
    }
}

impl<S> Handler for Actions<S> {
    fn responds_to(&self, action: &str) -> bool {
        self.actions.contains_key(action)
    }

    fn perform(&mut self, action: &str) -> anyhow::Result<()> {
        match self.actions.get_mut(action) {
            Some(f) => f(&mut self.state),
            None => Err(anyhow::anyhow!("no action named `{action}`")),
        }
    }
}

impl<S: fmt::Debug> fmt::Debug for Actions<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Actions")
            .field("state", &self.state)
            .field("actions", &self.actions.keys().collect::<Vec<_>>())
            .finish()
    }
}

/// Boxed constructor producing a handler.
pub type HandlerFactory<H> = Box<dyn FnOnce() -> H>;

/// The handler as supplied to a registration.
///
/// Resolved exactly once, when the registration is created; afterwards only
/// the instance remains.
pub enum HandlerSource<H> {
    /// Called once, with no arguments, to build the instance.
    Constructor(HandlerFactory<H>),
    /// Used as-is.
    Instance(H),
    /// A runtime-typed value. It must hold an `H`, a [`HandlerFactory<H>`]
    /// or a `fn() -> H`; anything else is rejected with
    /// [`RaiconError::InvalidHandler`].
    Dynamic {
        value: Box<dyn Any>,
        type_name: &'static str,
    },
}

impl<H: 'static> HandlerSource<H> {
    /// Wraps a constructor.
    pub fn constructor<F>(f: F) -> Self
    where
        F: FnOnce() -> H + 'static,
    {
        HandlerSource::Constructor(Box::new(f))
    }

    /// Wraps an existing instance.
    pub fn instance(handler: H) -> Self {
        HandlerSource::Instance(handler)
    }

    /// Wraps a value whose kind is only known at runtime.
    pub fn dynamic<T: Any>(value: T) -> Self {
        HandlerSource::Dynamic {
            value: Box::new(value),
            type_name: std::any::type_name::<T>(),
        }
    }

    /// Produces the handler instance for `controller`.
    pub(crate) fn resolve(self, controller: &str) -> Result<H> {
        match self {
            HandlerSource::Constructor(factory) => {
                debug!("constructing handler for controller `{controller}`");
                Ok(factory())
            }
            HandlerSource::Instance(handler) => Ok(handler),
            HandlerSource::Dynamic { value, type_name } => {
                let value = match value.downcast::<H>() {
                    Ok(handler) => return Ok(*handler),
                    Err(value) => value,
                };
                let value = match value.downcast::<HandlerFactory<H>>() {
                    Ok(factory) => {
                        debug!("constructing handler for controller `{controller}`");
                        let factory = *factory;
                        return Ok(factory());
                    }
                    Err(value) => value,
                };
                match value.downcast::<fn() -> H>() {
                    Ok(ctor) => {
                        debug!("constructing handler for controller `{controller}`");
                        Ok((*ctor)())
                    }
                    Err(_) => Err(RaiconError::InvalidHandler {
                        controller: controller.to_string(),
                        found: type_name,
                    }),
                }
            }
        }
    }
}

impl<S> From<Actions<S>> for HandlerSource<Actions<S>> {
    fn from(handler: Actions<S>) -> Self {
        HandlerSource::Instance(handler)
    }
}

impl From<Box<dyn Handler>> for HandlerSource<Box<dyn Handler>> {
    fn from(handler: Box<dyn Handler>) -> Self {
        HandlerSource::Instance(handler)
    }
}

impl<H> fmt::Debug for HandlerSource<H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HandlerSource::Constructor(_) => f.write_str("Constructor(..)"),
            HandlerSource::Instance(_) => f.write_str("Instance(..)"),
            HandlerSource::Dynamic { type_name, .. } => {
                f.debug_tuple("Dynamic").field(type_name).finish()
            }
        }
    }
}
