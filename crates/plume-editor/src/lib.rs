//! Editor core: document model, viewport, and modes.
//!
//! This crate holds everything about *what* is being edited, independent
//! of the terminal it's drawn on:
//!
//! - [`document`]: the line buffer, file binding, and dirty tracking
//! - [`visual`]: tab expansion and visual-column arithmetic
//! - [`mode`]: the edit/command mode switch
//! - [`view`]: cursor movement, scrolling, and frame painting
//!
//! The terminal backend lives in `plume-term`; the binary wires the two
//! together.

pub mod document;
pub mod mode;
pub mod view;
pub mod visual;

pub use document::{Document, FileState};
pub use mode::Mode;
pub use view::{Cursor, View};
