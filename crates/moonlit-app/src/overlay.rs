//! Screen-space UI drawn over the 3D frame: a navigation bar that slides in
//! from above and a title panel that fades in.

use moonlit_render::{OverlayQuad, Viewport};

/// Nav bar height in logical pixels.
pub const NAV_HEIGHT: f32 = 64.0;

const NAV_COLOR: [f32; 4] = [0.02, 0.02, 0.03, 0.65];
const TITLE_COLOR: [f32; 4] = [1.0, 0.97, 0.85, 0.18];
const TITLE_MAX_WIDTH: f32 = 520.0;
const TITLE_HEIGHT: f32 = 120.0;

/// Animatable overlay properties.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct OverlayState {
    /// Vertical offset of the nav bar in percent of its own height.
    /// -100 is fully above the window, 0 is in place.
    pub nav_offset: f32,
    /// Title opacity in `[0, 1]`.
    pub title_opacity: f32,
}

impl Default for OverlayState {
    fn default() -> Self {
        Self {
            nav_offset: 0.0,
            title_opacity: 1.0,
        }
    }
}

impl OverlayState {
    /// Panels for the current state in logical pixels.
    pub fn quads(&self, viewport: &Viewport) -> Vec<OverlayQuad> {
        let width = viewport.width() as f32;
        let height = viewport.height() as f32;

        let nav = OverlayQuad {
            x: 0.0,
            y: NAV_HEIGHT * self.nav_offset / 100.0,
            width,
            height: NAV_HEIGHT,
            color: NAV_COLOR,
        };

        let title_width = TITLE_MAX_WIDTH.min(width * 0.8);
        let [r, g, b, a] = TITLE_COLOR;
        let title = OverlayQuad {
            x: (width - title_width) / 2.0,
            y: height * 0.22,
            width: title_width,
            height: TITLE_HEIGHT.min(height * 0.3),
            color: [r, g, b, a * self.title_opacity.clamp(0.0, 1.0)],
        };

        vec![nav, title]
    }
}
