//! API endpoint implementations.

mod actions;
mod data;
mod workflows;

pub use actions::ActionsApi;
pub use data::DataApi;
pub use workflows::WorkflowsApi;
