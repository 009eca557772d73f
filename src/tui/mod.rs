//! TUI module: Terminal User Interface using Ratatui.
//!
//! Two screens:
//! - Survey form with numeric inputs and choice selectors
//! - Prediction result with BMI and advice

mod app;
mod styles;
mod ui;

pub use app::{App, Screen};
pub use styles::Theme;
