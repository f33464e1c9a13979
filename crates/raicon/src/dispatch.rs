//! Registration and dispatch.
//!
//! A [`Raicon`] binds one handler to one controller. Registering it subscribes
//! a single listener to the ready signal; every time the signal fires, the
//! page identity is read back off the root element and, when the controller
//! matches, the handler runs:
//!
//! ```text
//! ready signal (turbolinks:load | DOMContentLoaded)
//!   → read + normalize controller/action
//!   → controller != target?  → nothing happens
//!   → handler.beforeEach()
//!   → raicon:before:{controller}#{action}
//!   → handler.{action}()
//!   → raicon:after:{controller}#{action}
//! ```
//!
//! Any failure of the handler stops the sequence where it happened. In
//! particular a failing action never gets its `after` event. Subscribers to
//! the lifecycle events cannot stop it: their errors are logged and dropped.

use std::cell::{Ref, RefCell};
use std::fmt;
use std::rc::Rc;

use log::{debug, trace, warn};

use crate::config::Config;
use crate::document::{Document, ReadySignal};
use crate::error::{RaiconError, Result};
use crate::events::{event_name, LifecyclePhase};
use crate::handler::{Handler, HandlerSource, BEFORE_EACH};
use crate::naming::PageIdentity;

struct Inner<H> {
    target_controller: String,
    config: Config,
    handler: RefCell<H>,
    current: RefCell<Option<PageIdentity>>,
    document: Rc<dyn Document>,
}

/// A live handler registration.
///
/// Cloning yields another handle to the same registration. The document's
/// listener holds one of these handles, so the registration lives as long as
/// the document does; there is no way to unsubscribe.
///
/// # Example
///
/// ```rust
/// use raicon::{Actions, MemoryDocument, Raicon};
/// use std::rc::Rc;
///
/// let doc = Rc::new(MemoryDocument::new());
/// let users = Raicon::register(
///     "admin/users",
///     Actions::new(Vec::new())
///         .before_each(|log: &mut Vec<&str>| { log.push("beforeEach"); Ok(()) })
///         .action("bulkEdit", |log| { log.push("bulkEdit"); Ok(()) }),
///     &doc,
/// )?;
///
/// doc.visit("admin/users", "bulk_edit")?;
/// assert_eq!(users.handler().state(), &["beforeEach", "bulkEdit"]);
/// assert!(doc.dispatched().contains(&"raicon:after:admin/users#bulkEdit".to_string()));
/// # Ok::<(), raicon::RaiconError>(())
/// ```
pub struct Raicon<H> {
    inner: Rc<Inner<H>>,
}

impl<H> Clone for Raicon<H> {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

impl<H: Handler + 'static> Raicon<H> {
    /// Registers `handler` for `target_controller` on `document`, listening
    /// for `turbolinks:load`.
    ///
    /// Fails with [`RaiconError::InvalidArguments`] if the controller is empty
    /// and with [`RaiconError::InvalidHandler`] if a dynamic handler value
    /// cannot be resolved.
    pub fn register<D>(
        target_controller: impl Into<String>,
        handler: impl Into<HandlerSource<H>>,
        document: &Rc<D>,
    ) -> Result<Self>
    where
        D: Document + 'static,
    {
        Self::builder()
            .controller(target_controller)
            .handler(handler)
            .register(document)
    }

    /// Starts a registration with non-default settings.
    pub fn builder() -> RaiconBuilder<H> {
        RaiconBuilder::new()
    }

    /// The controller this registration responds to.
    pub fn target_controller(&self) -> &str {
        &self.inner.target_controller
    }

    /// The resolved handler instance.
    ///
    /// # Panics
    ///
    /// Panics if called from inside one of this handler's own actions.
    ///
    /// The returned `Ref` must be dropped before the next ready signal or
    /// direct call to [`execute_handler_on_action`](Self::execute_handler_on_action);
    /// dispatching while it is held panics when the action borrows the
    /// handler mutably.
    pub fn handler(&self) -> Ref<'_, H> {
        self.inner.handler.borrow()
    }

    /// The signal this registration listens for.
    pub fn ready_signal(&self) -> ReadySignal {
        self.inner.config.ready
    }

    /// The configuration this registration was created with.
    pub fn config(&self) -> &Config {
        &self.inner.config
    }

    /// The identity read on the most recent ready signal, if any has fired.
    pub fn current_identity(&self) -> Option<PageIdentity> {
        self.inner.current.borrow().clone()
    }

    fn setup(&self) {
        let event = self.inner.config.ready.event_name();
        let registration = self.clone();
        self.inner
            .document
            .add_event_listener(event, Rc::new(move || registration.on_ready()));
        debug!(
            "registered handler for controller `{}` on {event}",
            self.inner.target_controller
        );
    }

    /// Handles one ready signal.
    ///
    /// Normally invoked by the document listener; hosts that drive page
    /// lifecycles themselves may call it directly.
    ///
    /// # Panics
    ///
    /// Panics if a [`handler`](Self::handler) borrow is still alive, or if one
    /// of this handler's actions synchronously fires the ready signal again:
    /// the handler is already mutably borrowed in both cases.
    pub fn on_ready(&self) -> Result<()> {
        let identity = PageIdentity::read(self.inner.document.as_ref(), &self.inner.config);
        *self.inner.current.borrow_mut() = Some(identity.clone());

        if identity.controller != self.inner.target_controller {
            trace!(
                "page controller `{}` does not match `{}`",
                identity.controller,
                self.inner.target_controller
            );
            return Ok(());
        }

        debug!("dispatching {}#{}", identity.controller, identity.action);
        self.execute_handler_on_action(BEFORE_EACH)?;
        self.execute_handler_on_action(&identity.action)
    }

    /// Runs one action on the handler.
    ///
    /// `beforeEach` runs bare; every other action is bracketed by its
    /// `before` and `after` lifecycle events. Failures of event subscribers
    /// are logged and never stop the action.
    ///
    /// # Panics
    ///
    /// Same conditions as [`on_ready`](Self::on_ready).
    pub fn execute_handler_on_action(&self, action: &str) -> Result<()> {
        if !self.inner.handler.borrow().responds_to(action) {
            return Err(RaiconError::invalid_action(
                action,
                self.inner.target_controller.as_str(),
            ));
        }

        if action == BEFORE_EACH {
            self.inner.handler.borrow_mut().perform(action)?;
            return Ok(());
        }

        self.publish(LifecyclePhase::Before, action);
        self.inner.handler.borrow_mut().perform(action)?;
        self.publish(LifecyclePhase::After, action);
        Ok(())
    }

    fn publish(&self, phase: LifecyclePhase, action: &str) {
        let name = event_name(
            &self.inner.config.namespace,
            phase,
            &self.inner.target_controller,
            action,
        );
        if let Err(err) = self.inner.document.dispatch_event(&name) {
            warn!("subscriber to {name} failed: {err}");
        }
    }
}

impl<H> fmt::Debug for Raicon<H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Raicon")
            .field("target_controller", &self.inner.target_controller)
            .field("ready", &self.inner.config.ready)
            .field("current", &self.inner.current.borrow())
            .finish_non_exhaustive()
    }
}

/// Builder for [`Raicon`] registrations.
///
/// ```rust
/// use raicon::{Actions, Config, MemoryDocument, Raicon, ReadySignal};
/// use std::rc::Rc;
///
/// let doc = Rc::new(MemoryDocument::new());
/// let posts = Raicon::builder()
///     .controller("posts")
///     .handler(Actions::new(()).before_each(|_| Ok(())))
///     .config(Config::new().with_namespace("blog"))
///     .uses_navigation_library(false)
///     .register(&doc)?;
///
/// assert_eq!(posts.ready_signal(), ReadySignal::DomContentLoaded);
/// assert_eq!(doc.listener_count("DOMContentLoaded"), 1);
/// # Ok::<(), raicon::RaiconError>(())
/// ```
pub struct RaiconBuilder<H> {
    controller: Option<String>,
    handler: Option<HandlerSource<H>>,
    config: Config,
}

impl<H: Handler + 'static> RaiconBuilder<H> {
    /// Creates a builder with the default configuration.
    pub fn new() -> Self {
        Self {
            controller: None,
            handler: None,
            config: Config::default(),
        }
    }

    /// Sets the target controller, in its normalized (camel) form.
    pub fn controller(mut self, controller: impl Into<String>) -> Self {
        self.controller = Some(controller.into());
        self
    }

    /// Sets the handler source.
    pub fn handler(mut self, handler: impl Into<HandlerSource<H>>) -> Self {
        self.handler = Some(handler.into());
        self
    }

    /// Replaces the whole configuration, including the ready signal.
    pub fn config(mut self, config: Config) -> Self {
        self.config = config;
        self
    }

    /// Sets the ready signal.
    pub fn ready(mut self, ready: ReadySignal) -> Self {
        self.config.ready = ready;
        self
    }

    /// Listens for `turbolinks:load` when true, `DOMContentLoaded` otherwise.
    pub fn uses_navigation_library(self, uses_navigation_library: bool) -> Self {
        self.ready(ReadySignal::from_uses_navigation_library(
            uses_navigation_library,
        ))
    }

    /// Resolves the handler and subscribes the registration to `document`.
    pub fn register<D>(self, document: &Rc<D>) -> Result<Raicon<H>>
    where
        D: Document + 'static,
    {
        let target_controller = self
            .controller
            .filter(|controller| !controller.is_empty())
            .ok_or_else(|| RaiconError::missing("target controller"))?;
        let source = self
            .handler
            .ok_or_else(|| RaiconError::missing("handler"))?;

        let handler = source.resolve(&target_controller)?;
        let document: Rc<dyn Document> = document.clone();

        let registration = Raicon {
            inner: Rc::new(Inner {
                target_controller,
                config: self.config,
                handler: RefCell::new(handler),
                current: RefCell::new(None),
                document,
            }),
        };
        registration.setup();
        Ok(registration)
    }
}

impl<H: Handler + 'static> Default for RaiconBuilder<H> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::MemoryDocument;
    use crate::handler::Actions;

    type Log = Rc<RefCell<Vec<String>>>;

    fn recording_handler(log: &Log, actions: &[&'static str]) -> Actions<Log> {
        let handler = Actions::new(Rc::clone(log));
        actions.iter().fold(handler, |handler, &name| {
            handler.action(name, move |log: &mut Log| {
                log.borrow_mut().push(name.to_string());
                Ok(())
            })
        })
    }

    #[test]
    fn test_register_subscribes_once() {
        let doc = Rc::new(MemoryDocument::new());
        let handler = Actions::new(()).before_each(|_| Ok(()));
        let registration = Raicon::register("users", handler, &doc).unwrap();

        assert_eq!(registration.target_controller(), "users");
        assert_eq!(registration.ready_signal(), ReadySignal::Turbolinks);
        assert_eq!(doc.listener_count("turbolinks:load"), 1);
        assert_eq!(doc.listener_count("DOMContentLoaded"), 0);
        assert!(registration.current_identity().is_none());
    }

    #[test]
    fn test_register_rejects_empty_controller() {
        let doc = Rc::new(MemoryDocument::new());
        let result = Raicon::register("", Actions::new(()), &doc);
        assert!(matches!(result, Err(RaiconError::InvalidArguments { .. })));
        assert_eq!(doc.listener_count("turbolinks:load"), 0);
    }

    #[test]
    fn test_builder_requires_handler() {
        let doc = Rc::new(MemoryDocument::new());
        let builder = Raicon::<Actions>::builder().controller("users");
        match builder.register(&doc) {
            Err(RaiconError::InvalidArguments { missing }) => assert_eq!(missing, "handler"),
            other => panic!("expected InvalidArguments, got {other:?}"),
        }
    }

    #[test]
    fn test_builder_requires_controller() {
        let doc = Rc::new(MemoryDocument::new());
        let result = Raicon::builder().handler(Actions::new(())).register(&doc);
        assert!(matches!(
            result,
            Err(RaiconError::InvalidArguments {
                missing: "target controller"
            })
        ));
    }

    #[test]
    fn test_matching_page_runs_before_each_then_action() {
        let log = Log::default();
        let doc = Rc::new(MemoryDocument::new());
        let handler = recording_handler(&log, &["beforeEach", "show"]);
        Raicon::register("users", handler, &doc).unwrap();

        doc.visit("users", "show").unwrap();

        assert_eq!(*log.borrow(), vec!["beforeEach", "show"]);
        assert_eq!(
            doc.dispatched(),
            vec![
                "turbolinks:load",
                "raicon:before:users#show",
                "raicon:after:users#show",
            ]
        );
    }

    #[test]
    fn test_mismatch_is_silent() {
        let log = Log::default();
        let doc = Rc::new(MemoryDocument::new());
        let handler = recording_handler(&log, &["beforeEach", "show"]);
        let registration = Raicon::register("users", handler, &doc).unwrap();

        doc.visit("admin", "show").unwrap();

        assert!(log.borrow().is_empty());
        assert_eq!(doc.dispatched(), vec!["turbolinks:load"]);
        assert_eq!(
            registration.current_identity(),
            Some(PageIdentity::new("admin", "show"))
        );
    }

    #[test]
    fn test_missing_before_each_is_invalid_action() {
        let log = Log::default();
        let doc = Rc::new(MemoryDocument::new());
        let handler = recording_handler(&log, &["show"]);
        Raicon::register("users", handler, &doc).unwrap();

        let err = doc.visit("users", "show").unwrap_err();
        match err {
            RaiconError::InvalidAction { action, controller } => {
                assert_eq!(action, "beforeEach");
                assert_eq!(controller, "users");
            }
            other => panic!("expected InvalidAction, got {other:?}"),
        }
        assert!(log.borrow().is_empty());
    }

    #[test]
    fn test_execute_before_each_is_not_bracketed() {
        let log = Log::default();
        let doc = Rc::new(MemoryDocument::new());
        let handler = recording_handler(&log, &["beforeEach"]);
        let registration = Raicon::register("users", handler, &doc).unwrap();

        registration.execute_handler_on_action(BEFORE_EACH).unwrap();

        assert_eq!(*log.borrow(), vec!["beforeEach"]);
        assert!(doc.dispatched().is_empty());
    }

    #[test]
    fn test_failing_action_skips_after_event() {
        let doc = Rc::new(MemoryDocument::new());
        let handler = Actions::new(())
            .before_each(|_| Ok(()))
            .action("destroy", |_| Err(anyhow::anyhow!("record is locked")));
        Raicon::register("posts", handler, &doc).unwrap();

        let err = doc.visit("posts", "destroy").unwrap_err();

        assert!(matches!(err, RaiconError::Handler(_)));
        assert_eq!(err.to_string(), "record is locked");
        assert_eq!(
            doc.dispatched(),
            vec!["turbolinks:load", "raicon:before:posts#destroy"]
        );
    }

    #[test]
    fn test_failing_subscriber_does_not_stop_action() {
        let log = Log::default();
        let doc = Rc::new(MemoryDocument::new());
        let handler = recording_handler(&log, &["beforeEach", "show"]);
        Raicon::register("users", handler, &doc).unwrap();
        doc.add_event_listener(
            "raicon:before:users#show",
            Rc::new(|| Err(RaiconError::missing("analytics"))),
        );
        doc.add_event_listener(
            "raicon:after:users#show",
            Rc::new(|| Err(RaiconError::missing("analytics"))),
        );

        doc.visit("users", "show").unwrap();

        assert_eq!(*log.borrow(), vec!["beforeEach", "show"]);
        assert_eq!(
            doc.dispatched(),
            vec![
                "turbolinks:load",
                "raicon:before:users#show",
                "raicon:after:users#show",
            ]
        );
    }

    #[test]
    fn test_failing_registration_does_not_block_others() {
        let log = Log::default();
        let doc = Rc::new(MemoryDocument::new());
        let broken = recording_handler(&log, &["show"]);
        Raicon::register("users", broken, &doc).unwrap();
        let later = Rc::new(RefCell::new(false));
        let flag = Rc::clone(&later);
        doc.add_event_listener(
            "turbolinks:load",
            Rc::new(move || {
                *flag.borrow_mut() = true;
                Ok(())
            }),
        );

        let err = doc.visit("users", "show").unwrap_err();

        assert!(matches!(err, RaiconError::InvalidAction { .. }));
        assert!(*later.borrow());
    }

    #[test]
    fn test_on_ready_can_be_driven_directly() {
        let log = Log::default();
        let doc = Rc::new(
            MemoryDocument::new()
                .with_attribute("data-raicon-controller", "users")
                .with_attribute("data-raicon-action", "index"),
        );
        let handler = recording_handler(&log, &["beforeEach", "index"]);
        let registration = Raicon::register("users", handler, &doc).unwrap();

        registration.on_ready().unwrap();

        assert_eq!(*log.borrow(), vec!["beforeEach", "index"]);
    }

    #[test]
    fn test_observers_can_inspect_registration_during_events() {
        let doc = Rc::new(MemoryDocument::new());
        let handler = Actions::new(0u32)
            .before_each(|_| Ok(()))
            .action("show", |n| {
                *n += 1;
                Ok(())
            });
        let registration = Raicon::register("users", handler, &doc).unwrap();

        let seen = Rc::new(RefCell::new(Vec::new()));
        let (observer, sink) = (registration.clone(), Rc::clone(&seen));
        doc.add_event_listener(
            "raicon:after:users#show",
            Rc::new(move || {
                sink.borrow_mut().push(*observer.handler().state());
                Ok(())
            }),
        );

        doc.visit("users", "show").unwrap();
        doc.visit("users", "show").unwrap();

        assert_eq!(*seen.borrow(), vec![1, 2]);
    }

    #[test]
    fn test_debug_output() {
        let doc = Rc::new(MemoryDocument::new());
        let registration = Raicon::register("users", Actions::new(()), &doc).unwrap();
        let debug = format!("{registration:?}");
        assert!(debug.contains("users"));
        assert!(debug.contains("Turbolinks"));
    }
}
