//! Pointer input: cursor position, primary-button drags, and wheel scroll.

pub mod mouse;

pub use mouse::{PointerButton, PointerState};
