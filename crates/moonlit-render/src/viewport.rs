//! Viewport sizing and the pixel-ratio backing buffer.
//!
//! The viewport is measured in logical pixels. The 3D frame is drawn into a
//! backing buffer `pixel_ratio` times larger in each dimension and then
//! scaled onto the window surface, independent of the display's own scale
//! factor. Zero dimensions (Wayland windows before the compositor assigns a
//! size, minimized windows on Windows) are clamped to 1.

/// Minimum viewport and backing dimension.
pub const MIN_VIEWPORT_DIMENSION: u32 = 1;

/// Texel dimensions of the backing buffer.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BackingSize {
    pub width: u32,
    pub height: u32,
}

/// Produced when [`Viewport::resize`] actually changes the size.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ViewportResizeEvent {
    pub width: u32,
    pub height: u32,
    pub aspect: f32,
    pub backing: BackingSize,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Viewport {
    width: u32,
    height: u32,
    pixel_ratio: f64,
}

impl Viewport {
    /// A non-positive or non-finite `pixel_ratio` is treated as 1.
    pub fn new(width: u32, height: u32, pixel_ratio: f64) -> Self {
        let pixel_ratio = if pixel_ratio.is_finite() && pixel_ratio > 0.0 {
            pixel_ratio
        } else {
            log::warn!("Invalid pixel ratio {pixel_ratio}, using 1.0");
            1.0
        };
        Self {
            width: width.max(MIN_VIEWPORT_DIMENSION),
            height: height.max(MIN_VIEWPORT_DIMENSION),
            pixel_ratio,
        }
    }

    /// Viewport for a window reporting physical pixels at `scale_factor`.
    pub fn from_physical(
        physical_width: u32,
        physical_height: u32,
        scale_factor: f64,
        pixel_ratio: f64,
    ) -> Self {
        let (width, height) = logical_from_physical(physical_width, physical_height, scale_factor);
        Self::new(width, height, pixel_ratio)
    }

    /// Set a new logical size. Returns `None` if nothing changed.
    pub fn resize(&mut self, width: u32, height: u32) -> Option<ViewportResizeEvent> {
        let width = width.max(MIN_VIEWPORT_DIMENSION);
        let height = height.max(MIN_VIEWPORT_DIMENSION);
        if width == self.width && height == self.height {
            return None;
        }
        self.width = width;
        self.height = height;
        log::debug!(
            "Viewport resized to {width}x{height}, backing {:?}",
            self.backing_size()
        );
        Some(ViewportResizeEvent {
            width,
            height,
            aspect: self.aspect(),
            backing: self.backing_size(),
        })
    }

    /// Resize from a window's physical size and scale factor.
    pub fn resize_physical(
        &mut self,
        physical_width: u32,
        physical_height: u32,
        scale_factor: f64,
    ) -> Option<ViewportResizeEvent> {
        let (width, height) = logical_from_physical(physical_width, physical_height, scale_factor);
        self.resize(width, height)
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn pixel_ratio(&self) -> f64 {
        self.pixel_ratio
    }

    pub fn aspect(&self) -> f32 {
        self.width as f32 / self.height as f32
    }

    pub fn backing_size(&self) -> BackingSize {
        let scale = |v: u32| ((v as f64 * self.pixel_ratio).round() as u32).max(MIN_VIEWPORT_DIMENSION);
        BackingSize {
            width: scale(self.width),
            height: scale(self.height),
        }
    }
}

fn logical_from_physical(width: u32, height: u32, scale_factor: f64) -> (u32, u32) {
    let scale = if scale_factor.is_finite() && scale_factor > 0.0 {
        scale_factor
    } else {
        1.0
    };
    (
        (width as f64 / scale).round() as u32,
        (height as f64 / scale).round() as u32,
    )
}
