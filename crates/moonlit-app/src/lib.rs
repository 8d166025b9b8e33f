//! Moonlit application: a textured moon in a starfield, orbit controls,
//! an intro timeline and a pointer-driven color effect.
//!
//! [`window::run`] opens the window and drives everything else through
//! [`showcase::Showcase`].

pub mod controls;
pub mod intro;
pub mod overlay;
pub mod platform;
pub mod pointer;
pub mod render_loop;
pub mod showcase;
pub mod stage;
pub mod window;

pub use platform::{AppError, PlatformDirs};
pub use showcase::Showcase;
pub use window::run;
