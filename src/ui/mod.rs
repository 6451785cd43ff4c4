//! User interface rendering and input handling.
//!
//! This module provides all UI-related functionality:
//!
//! - **renderer**: document view, status line, input line, link hit map
//! - **input**: single-line editor with history recall

pub mod input;
pub mod renderer;

pub use input::InputLine;
pub use renderer::Renderer;
