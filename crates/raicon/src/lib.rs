//! Page-lifecycle dispatch for server-rendered pages.
//!
//! `raicon` runs per-page code in applications where the server renders each
//! page and a pseudo-navigation layer (Turbolinks) swaps page bodies instead
//! of doing full reloads. The server stamps the current controller and action
//! onto the root element; a handler registered for that controller has its
//! `beforeEach` action and the current action invoked each time the page
//! becomes ready.
//!
//! # Features
//!
//! - **Flat routing**: one handler per controller, matched on the normalized
//!   controller name (`admin/blog_posts` → `admin/blogPosts`)
//! - **Open-ended handlers**: any type implementing [`Handler`], or an
//!   [`Actions`] table of closures
//! - **Lifecycle events**: `raicon:before:{controller}#{action}` and
//!   `raicon:after:{controller}#{action}` around every action
//! - **Pluggable document**: all page access goes through the [`Document`]
//!   port; [`MemoryDocument`] covers headless hosts and tests
//!
//! # Usage
//!
//! ```rust
//! use raicon::{Actions, MemoryDocument, Raicon};
//! use std::rc::Rc;
//!
//! let doc = Rc::new(MemoryDocument::new());
//!
//! Raicon::register(
//!     "posts",
//!     Actions::new(0u32)
//!         .before_each(|_| Ok(()))
//!         .action("createPost", |count| { *count += 1; Ok(()) }),
//!     &doc,
//! )?;
//!
//! // The server rendered data-raicon-controller="posts" data-raicon-action="create_post"
//! doc.visit("posts", "create_post")?;
//!
//! assert_eq!(
//!     doc.dispatched(),
//!     vec![
//!         "turbolinks:load",
//!         "raicon:before:posts#createPost",
//!         "raicon:after:posts#createPost",
//!     ]
//! );
//! # Ok::<(), raicon::RaiconError>(())
//! ```
//!
//! # Errors
//!
//! Registration fails on a missing controller or handler, or on a dynamic
//! handler value that is neither a constructor nor an instance. Dispatch
//! fails when a matched handler lacks `beforeEach` or the current action.
//! Failures raised by handler actions are returned unchanged. See
//! [`RaiconError`].

mod config;
mod dispatch;
mod document;
mod error;
mod events;
mod handler;
mod naming;

pub use config::{
    Config, DEFAULT_ACTION_ATTRIBUTE, DEFAULT_CONTROLLER_ATTRIBUTE, DEFAULT_NAMESPACE,
};

pub use dispatch::{Raicon, RaiconBuilder};

pub use document::{
    Document, Listener, MemoryDocument, ReadySignal, DOM_CONTENT_LOADED, TURBOLINKS_LOAD,
};

pub use error::{RaiconError, Result};

pub use events::{event_name, on_lifecycle, LifecyclePhase};

pub use handler::{ActionFn, Actions, Handler, HandlerFactory, HandlerSource, BEFORE_EACH};

pub use naming::{camelize, normalize_action, normalize_controller, PageIdentity};
