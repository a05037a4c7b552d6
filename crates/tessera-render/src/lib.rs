//! Rendering engine for Tessera UI configs.
//!
//! This crate turns a validated [`tessera_types::UiConfig`] plus a state bag
//! into a host-independent [`RenderTree`], and routes user actions to their
//! handlers:
//!
//! - [`visibility`]: role gates and state conditions
//! - [`widget`]: the [`Widget`] trait, the built-in widgets and the
//!   [`WidgetRegistry`] dispatching component types to them
//! - [`layout`]: single / split / tabs / dashboard composition
//! - [`action`]: the [`ActionDispatcher`] with its [`Transport`] and
//!   [`CustomHandler`] seams
//! - [`session`]: the [`RenderSession`] owning state, principal and local
//!   input for one mounted config
//!
//! # Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use tessera_render::{ActionDispatcher, RenderSession};
//! use tessera_types::{State, UiConfig, ValidationOptions};
//!
//! let config = UiConfig::from_path("pdf-processor.json".as_ref())?
//!     .validate(ValidationOptions::default())?;
//! let mut session = RenderSession::new(config, State::new());
//!
//! let dispatcher = ActionDispatcher::new().with_transport(Arc::new(client));
//! session.dispatch(&dispatcher, "file-input", "process").await?;
//! println!("{:#?}", session.render());
//! ```

pub mod action;
pub mod binding;
pub mod error;
pub mod layout;
pub mod session;
pub mod visibility;
pub mod widget;

pub use action::{
    ActionDispatcher, ActionOutcome, CustomCall, CustomHandler, CustomHandlerRegistry,
    DEFAULT_METHOD, NavigationIntent, PreparedAction, Transport, TransportError,
};
pub use binding::{RefreshTarget, api_state_key, resolve_binding};
pub use error::{ActionDispatchError, Result, SessionError, VisibilityEvaluationError};
pub use layout::{GridCell, LayoutView, RenderTree, RenderedComponent, Tab, compose};
pub use session::RenderSession;
pub use visibility::{evaluate_condition, evaluate_visibility, is_component_visible};
pub use widget::{
    ChartPoint, DatedEntry, FieldView, FilterView, KanbanLane, RowActionView, StatView, Widget,
    WidgetContext, WidgetRegistry, WidgetView, WizardStepView, display_value, format_stat,
};
