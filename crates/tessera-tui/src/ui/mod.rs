//! UI rendering components.

mod layout;
pub mod logs;
pub mod theme;
pub mod widgets;

pub use layout::{grid_rect, render};
