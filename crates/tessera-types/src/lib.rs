//! Shared types for the Tessera declarative UI renderer.
//!
//! A [`UiConfig`] describes a layout of typed components, their data bindings,
//! visibility gates and actions. Configs are authored elsewhere, parsed here,
//! and validated once into a [`ValidatedConfig`] before a rendering session
//! mounts them. The session's mutable data lives in a [`State`] bag.

pub mod action;
pub mod component;
pub mod config;
pub mod error;
pub mod options;
pub mod state;

pub use action::{Action, ActionKind, ActionStyle, Handler, HandlerConfig, HandlerKind};
pub use component::{
    Component, ComponentKind, Condition, DataBinding, DataSource, GRID_COLUMNS, Operator,
    Position, Visibility,
};
pub use config::{Layout, LayoutKind, Theme, UiConfig, ValidatedConfig, ValidationOptions};
pub use error::{ConfigError, Result};
pub use options::{
    CalendarOptions, ChartKind, ChartOptions, ColumnKind, ColumnSpec, ComponentOptions,
    DashboardOptions, FieldKind, FileUploadOptions, FilterSpec, FormField, FormOptions,
    KanbanColumn, KanbanOptions, RowAction, SelectOption, StatFormat, StatSpec, StatsOptions,
    TableOptions, TimelineOptions, WizardOptions, WizardStep,
};
pub use state::{Principal, State, StatePatch};
