//! Offscreen backing targets the 3D scene is drawn into.
//!
//! Depth uses reverse-Z: the near plane maps to 1.0 and the far plane to
//! 0.0, so the buffer is cleared to 0.0 and fragments pass with
//! `GreaterEqual`.

use crate::viewport::BackingSize;

/// Color format of the backing buffer. Shaders write linear values and the
/// hardware encodes to sRGB on store.
pub const BACKING_COLOR_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Rgba8UnormSrgb;

/// 32-bit float depth format.
pub const DEPTH_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth32Float;

/// Reverse-Z clear value: 0.0 represents the far plane.
pub const DEPTH_CLEAR_VALUE: f32 = 0.0;

/// Reverse-Z depth comparison: closer objects have higher depth values.
pub const DEPTH_COMPARE: wgpu::CompareFunction = wgpu::CompareFunction::GreaterEqual;

/// Color and depth textures sized to the viewport's backing buffer.
pub struct BackingTargets {
    pub color: wgpu::Texture,
    pub color_view: wgpu::TextureView,
    pub depth: wgpu::Texture,
    pub depth_view: wgpu::TextureView,
    size: BackingSize,
}

impl BackingTargets {
    pub fn new(device: &wgpu::Device, size: BackingSize) -> Self {
        let size = clamp_to_limits(device, size);
        let extent = wgpu::Extent3d {
            width: size.width,
            height: size.height,
            depth_or_array_layers: 1,
        };

        let color = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("backing-color"),
            size: extent,
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: BACKING_COLOR_FORMAT,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::TEXTURE_BINDING,
            view_formats: &[],
        });
        let depth = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("backing-depth"),
            size: extent,
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: DEPTH_FORMAT,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            view_formats: &[],
        });

        let color_view = color.create_view(&wgpu::TextureViewDescriptor::default());
        let depth_view = depth.create_view(&wgpu::TextureViewDescriptor::default());

        Self {
            color,
            color_view,
            depth,
            depth_view,
            size,
        }
    }

    /// Recreate both targets at `size`. Returns false if the size was
    /// unchanged and nothing was reallocated.
    pub fn resize(&mut self, device: &wgpu::Device, size: BackingSize) -> bool {
        if clamp_to_limits(device, size) == self.size {
            return false;
        }
        *self = Self::new(device, size);
        log::debug!(
            "Backing targets recreated at {}x{}",
            self.size.width,
            self.size.height
        );
        true
    }

    pub fn size(&self) -> BackingSize {
        self.size
    }
}

/// Large windows at pixel ratio 2 can exceed the device's texture limit.
fn clamp_to_limits(device: &wgpu::Device, size: BackingSize) -> BackingSize {
    let max = device.limits().max_texture_dimension_2d;
    let clamped = BackingSize {
        width: size.width.clamp(1, max),
        height: size.height.clamp(1, max),
    };
    if clamped != size {
        log::warn!(
            "Backing size {}x{} exceeds device limit {max}, clamping",
            size.width,
            size.height
        );
    }
    clamped
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_gpu::create_test_device;

    fn size(width: u32, height: u32) -> BackingSize {
        BackingSize { width, height }
    }

    #[test]
    fn test_depth_format_is_depth32float() {
        assert_eq!(DEPTH_FORMAT, wgpu::TextureFormat::Depth32Float);
    }

    #[test]
    fn test_reverse_z_constants() {
        assert_eq!(DEPTH_CLEAR_VALUE, 0.0);
        assert_eq!(DEPTH_COMPARE, wgpu::CompareFunction::GreaterEqual);
    }

    #[test]
    fn test_targets_match_backing_size() {
        let Some((device, _queue)) = create_test_device() else {
            return;
        };
        let targets = BackingTargets::new(&device, size(1600, 1200));
        assert_eq!(targets.size(), size(1600, 1200));
        assert_eq!(targets.color.width(), 1600);
        assert_eq!(targets.depth.height(), 1200);
        assert!(
            targets
                .color
                .usage()
                .contains(wgpu::TextureUsages::TEXTURE_BINDING)
        );
    }

    #[test]
    fn test_resize_noop_when_same_dimensions() {
        let Some((device, _queue)) = create_test_device() else {
            return;
        };
        let mut targets = BackingTargets::new(&device, size(800, 600));
        assert!(!targets.resize(&device, size(800, 600)));
        assert!(targets.resize(&device, size(1024, 768)));
        assert_eq!(targets.depth.width(), 1024);
    }

    #[test]
    fn test_oversized_backing_is_clamped() {
        let Some((device, _queue)) = create_test_device() else {
            return;
        };
        let max = device.limits().max_texture_dimension_2d;
        let targets = BackingTargets::new(&device, size(max + 10, 4));
        assert_eq!(targets.size().width, max);
    }
}
