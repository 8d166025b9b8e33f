//! Property tweening: easing curves, typed accessor tweens, and sequential
//! timelines that drive them from the frame clock.

pub mod easing;
pub mod timeline;
pub mod tween;

pub use easing::Ease;
pub use timeline::{Timeline, TimelineEvent};
pub use tween::{Lerp, Tween};
