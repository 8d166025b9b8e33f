//! Frame-coherent pointer state.
//!
//! [`PointerState`] accumulates winit cursor events between redraws. The
//! orbit camera reads the drag delta, the color effect reads the raw cursor
//! position, and both are reset by [`PointerState::clear_transients`] once a
//! frame has consumed them.

use glam::Vec2;
use tracing::trace;
use winit::event::{ElementState, MouseButton, MouseScrollDelta};

/// Pointer buttons the viewer distinguishes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PointerButton {
    /// Left mouse button or primary touch contact.
    Primary,
    Secondary,
    Middle,
}

impl PointerButton {
    /// Map a winit button. Back/forward and vendor buttons are ignored.
    pub fn from_winit(button: MouseButton) -> Option<Self> {
        match button {
            MouseButton::Left => Some(Self::Primary),
            MouseButton::Right => Some(Self::Secondary),
            MouseButton::Middle => Some(Self::Middle),
            _ => None,
        }
    }

    fn index(self) -> usize {
        match self {
            Self::Primary => 0,
            Self::Secondary => 1,
            Self::Middle => 2,
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
struct ButtonFrame {
    pressed: bool,
    just_pressed: bool,
    just_released: bool,
}

/// Pointer state in logical window coordinates.
#[derive(Debug, Clone)]
pub struct PointerState {
    position: Vec2,
    has_position: bool,
    drag_delta: Vec2,
    buttons: [ButtonFrame; 3],
    scroll: f32,
    cursor_in_window: bool,
}

impl Default for PointerState {
    fn default() -> Self {
        Self::new()
    }
}

impl PointerState {
    #[must_use]
    pub fn new() -> Self {
        Self {
            position: Vec2::ZERO,
            has_position: false,
            drag_delta: Vec2::ZERO,
            buttons: [ButtonFrame::default(); 3],
            scroll: 0.0,
            cursor_in_window: false,
        }
    }

    /// Process a `CursorMoved` event, already converted to logical pixels.
    ///
    /// Movement only counts toward the drag delta while the primary button
    /// is held, and never for the first position the window reports.
    pub fn on_cursor_moved(&mut self, x: f64, y: f64) {
        let new_pos = Vec2::new(x as f32, y as f32);
        if self.has_position && self.is_pressed(PointerButton::Primary) {
            self.drag_delta += new_pos - self.position;
        }
        self.position = new_pos;
        self.has_position = true;
    }

    /// Process a `MouseInput` event.
    pub fn on_button(&mut self, button: MouseButton, state: ElementState) {
        let Some(button) = PointerButton::from_winit(button) else {
            return;
        };
        let frame = &mut self.buttons[button.index()];
        match state {
            ElementState::Pressed => {
                frame.pressed = true;
                frame.just_pressed = true;
            }
            ElementState::Released => {
                frame.pressed = false;
                frame.just_released = true;
            }
        }
        trace!(?button, ?state, x = self.position.x, y = self.position.y, "pointer button");
    }

    /// Process a `MouseWheel` event.
    pub fn on_scroll(&mut self, delta: MouseScrollDelta) {
        match delta {
            MouseScrollDelta::LineDelta(_x, y) => {
                self.scroll += y;
            }
            MouseScrollDelta::PixelDelta(pos) => {
                // ~40 pixels per line
                self.scroll += (pos.y / 40.0) as f32;
            }
        }
    }

    pub fn on_cursor_entered(&mut self) {
        self.cursor_in_window = true;
    }

    /// Process a `CursorLeft` event. Held buttons are released so a drag
    /// cannot stick once the pointer leaves the window.
    pub fn on_cursor_left(&mut self) {
        self.cursor_in_window = false;
        for frame in &mut self.buttons {
            if frame.pressed {
                frame.pressed = false;
                frame.just_released = true;
            }
        }
    }

    /// Clears per-frame transients: drag delta, scroll, edge flags.
    pub fn clear_transients(&mut self) {
        self.drag_delta = Vec2::ZERO;
        self.scroll = 0.0;
        for frame in &mut self.buttons {
            frame.just_pressed = false;
            frame.just_released = false;
        }
    }

    /// Last known cursor position in logical pixels.
    #[must_use]
    pub fn position(&self) -> Vec2 {
        self.position
    }

    /// Whether any cursor position has been reported yet.
    #[must_use]
    pub fn has_position(&self) -> bool {
        self.has_position
    }

    /// Cursor movement with the primary button held, since the last clear.
    #[must_use]
    pub fn drag_delta(&self) -> Vec2 {
        self.drag_delta
    }

    #[must_use]
    pub fn is_pressed(&self, button: PointerButton) -> bool {
        self.buttons[button.index()].pressed
    }

    #[must_use]
    pub fn just_pressed(&self, button: PointerButton) -> bool {
        self.buttons[button.index()].just_pressed
    }

    #[must_use]
    pub fn just_released(&self, button: PointerButton) -> bool {
        self.buttons[button.index()].just_released
    }

    /// Wheel delta accumulated since the last clear (positive = up).
    #[must_use]
    pub fn scroll(&self) -> f32 {
        self.scroll
    }

    #[must_use]
    pub fn is_cursor_in_window(&self) -> bool {
        self.cursor_in_window
    }
}
