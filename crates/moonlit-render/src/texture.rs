//! GPU texture management: upload, mipmap generation, placeholders and
//! material bind groups.
//!
//! Decoded images arrive from the background loader keyed by
//! [`TextureHandle`]. Until a handle has been uploaded, materials bind a 1×1
//! placeholder instead: opaque white for color maps and a flat
//! `(128, 128, 255)` tangent-space normal for normal maps.

use std::collections::HashMap;

use moonlit_scene::{ColorSpace, DecodedImage, TextureHandle};

/// A GPU texture with its default view and metadata.
pub struct GpuTexture {
    pub texture: wgpu::Texture,
    pub view: wgpu::TextureView,
    /// Width and height in texels.
    pub dimensions: (u32, u32),
    pub format: wgpu::TextureFormat,
    /// Number of mip levels (1 if mipmaps were not generated).
    pub mip_level_count: u32,
}

/// Errors that can occur during texture creation.
#[derive(Debug, thiserror::Error)]
pub enum TextureError {
    /// Pixel data length doesn't match the expected size for the given dimensions and format.
    #[error(
        "texture data size ({actual}) does not match expected ({expected}) for {width}x{height} {format:?}"
    )]
    DataSizeMismatch {
        actual: usize,
        expected: usize,
        width: u32,
        height: u32,
        format: wgpu::TextureFormat,
    },

    /// Width or height is zero.
    #[error("texture dimensions must be non-zero, got {width}x{height}")]
    ZeroDimensions { width: u32, height: u32 },

    /// Larger than the device allows.
    #[error("texture {width}x{height} exceeds device limit {max}")]
    TooLarge { width: u32, height: u32, max: u32 },
}

/// Which material slot a texture fills; selects the placeholder.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MapSlot {
    Color,
    Normal,
}

/// The textures a material binds. Also the bind group cache key.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct MaterialTextures {
    pub color: Option<TextureHandle>,
    pub normal: Option<TextureHandle>,
}

/// Calculates the number of mip levels for the given dimensions.
pub fn mip_level_count(width: u32, height: u32) -> u32 {
    (width.max(height) as f32).log2().floor() as u32 + 1
}

/// Texture format for a loaded image's color space.
pub fn format_for(color_space: ColorSpace) -> wgpu::TextureFormat {
    match color_space {
        ColorSpace::Srgb => wgpu::TextureFormat::Rgba8UnormSrgb,
        ColorSpace::Linear => wgpu::TextureFormat::Rgba8Unorm,
    }
}

pub struct TextureManager {
    textures: HashMap<TextureHandle, GpuTexture>,
    white: GpuTexture,
    flat_normal: GpuTexture,
    sampler: wgpu::Sampler,
    material_layout: wgpu::BindGroupLayout,
    material_bind_groups: HashMap<MaterialTextures, wgpu::BindGroup>,
    blit_shader: wgpu::ShaderModule,
    blit_pipeline_layout: wgpu::PipelineLayout,
    blit_bind_group_layout: wgpu::BindGroupLayout,
    blit_sampler: wgpu::Sampler,
}

/// WGSL shader for mipmap generation via fullscreen blit.
const BLIT_SHADER_SOURCE: &str = r#"
@group(0) @binding(0) var src_texture: texture_2d<f32>;
@group(0) @binding(1) var src_sampler: sampler;

struct VertexOutput {
    @builtin(position) position: vec4<f32>,
    @location(0) uv: vec2<f32>,
};

@vertex
fn vs_main(@builtin(vertex_index) idx: u32) -> VertexOutput {
    // Full-screen triangle
    let uv = vec2<f32>(f32((idx << 1u) & 2u), f32(idx & 2u));
    var out: VertexOutput;
    out.position = vec4<f32>(uv * 2.0 - 1.0, 0.0, 1.0);
    out.uv = vec2<f32>(uv.x, 1.0 - uv.y);
    return out;
}

@fragment
fn fs_main(in: VertexOutput) -> @location(0) vec4<f32> {
    return textureSample(src_texture, src_sampler, in.uv);
}
"#;

fn texture_entry(binding: u32) -> wgpu::BindGroupLayoutEntry {
    wgpu::BindGroupLayoutEntry {
        binding,
        visibility: wgpu::ShaderStages::FRAGMENT,
        ty: wgpu::BindingType::Texture {
            sample_type: wgpu::TextureSampleType::Float { filterable: true },
            view_dimension: wgpu::TextureViewDimension::D2,
            multisampled: false,
        },
        count: None,
    }
}

fn sampler_entry(binding: u32) -> wgpu::BindGroupLayoutEntry {
    wgpu::BindGroupLayoutEntry {
        binding,
        visibility: wgpu::ShaderStages::FRAGMENT,
        ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
        count: None,
    }
}

impl TextureManager {
    pub fn new(device: &wgpu::Device, queue: &wgpu::Queue) -> Self {
        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("material-sampler"),
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            mipmap_filter: wgpu::MipmapFilterMode::Linear,
            ..Default::default()
        });

        // color map, normal map, sampler
        let material_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("material-texture-layout"),
            entries: &[texture_entry(0), texture_entry(1), sampler_entry(2)],
        });

        let blit_bind_group_layout =
            device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                label: Some("blit-bind-group-layout"),
                entries: &[texture_entry(0), sampler_entry(1)],
            });

        let blit_shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("blit-shader"),
            source: wgpu::ShaderSource::Wgsl(BLIT_SHADER_SOURCE.into()),
        });

        let blit_pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("blit-pipeline-layout"),
            bind_group_layouts: &[&blit_bind_group_layout],
            immediate_size: 0,
        });

        let blit_sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("blit-sampler"),
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            ..Default::default()
        });

        let white = solid_texture(
            device,
            queue,
            "placeholder-white",
            [255, 255, 255, 255],
            format_for(ColorSpace::Srgb),
        );
        let flat_normal = solid_texture(
            device,
            queue,
            "placeholder-normal",
            [128, 128, 255, 255],
            format_for(ColorSpace::Linear),
        );

        Self {
            textures: HashMap::new(),
            white,
            flat_normal,
            sampler,
            material_layout,
            material_bind_groups: HashMap::new(),
            blit_shader,
            blit_pipeline_layout,
            blit_bind_group_layout,
            blit_sampler,
        }
    }

    /// Upload a decoded image for `handle` with a full mip chain. Replaces
    /// any earlier upload for the same handle.
    pub fn upload(
        &mut self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        handle: TextureHandle,
        image: &DecodedImage,
    ) -> Result<&GpuTexture, TextureError> {
        let (width, height) = (image.width, image.height);
        let format = format_for(handle.color_space());
        validate_dimensions(width, height)?;
        validate_data_size(&image.rgba, width, height, format)?;
        let max = device.limits().max_texture_dimension_2d;
        if width > max || height > max {
            return Err(TextureError::TooLarge { width, height, max });
        }

        let label = format!("texture-{}", handle.id());
        let mip_levels = mip_level_count(width, height);

        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some(&label),
            size: wgpu::Extent3d {
                width,
                height,
                depth_or_array_layers: 1,
            },
            mip_level_count: mip_levels,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format,
            usage: wgpu::TextureUsages::TEXTURE_BINDING
                | wgpu::TextureUsages::COPY_DST
                | wgpu::TextureUsages::RENDER_ATTACHMENT,
            view_formats: &[],
        });

        write_level0(queue, &texture, &image.rgba, width, height, format);

        if mip_levels > 1 {
            self.generate_mipmaps(device, queue, &texture, format, mip_levels);
        }

        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        log::info!("Uploaded {label} ({width}x{height} {format:?}, {mip_levels} mips)");

        // Bind groups referencing the placeholder are stale now.
        self.material_bind_groups
            .retain(|key, _| key.color != Some(handle) && key.normal != Some(handle));

        self.textures.insert(
            handle,
            GpuTexture {
                texture,
                view,
                dimensions: (width, height),
                format,
                mip_level_count: mip_levels,
            },
        );
        Ok(&self.textures[&handle])
    }

    pub fn get(&self, handle: TextureHandle) -> Option<&GpuTexture> {
        self.textures.get(&handle)
    }

    pub fn is_uploaded(&self, handle: TextureHandle) -> bool {
        self.textures.contains_key(&handle)
    }

    /// The texture bound for `handle` in `slot`: the upload if present,
    /// otherwise the slot's placeholder.
    pub fn resolve(&self, handle: Option<TextureHandle>, slot: MapSlot) -> &GpuTexture {
        handle
            .and_then(|h| self.textures.get(&h))
            .unwrap_or(match slot {
                MapSlot::Color => &self.white,
                MapSlot::Normal => &self.flat_normal,
            })
    }

    /// Layout of bind group 2 in the standard pipeline.
    pub fn material_layout(&self) -> &wgpu::BindGroupLayout {
        &self.material_layout
    }

    /// Build (or reuse) the bind group for `textures`.
    pub fn prepare_material(&mut self, device: &wgpu::Device, textures: MaterialTextures) {
        if self.material_bind_groups.contains_key(&textures) {
            return;
        }
        let color = &self.resolve(textures.color, MapSlot::Color).view;
        let normal = &self.resolve(textures.normal, MapSlot::Normal).view;
        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("material-bind-group"),
            layout: &self.material_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: wgpu::BindingResource::TextureView(color),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::TextureView(normal),
                },
                wgpu::BindGroupEntry {
                    binding: 2,
                    resource: wgpu::BindingResource::Sampler(&self.sampler),
                },
            ],
        });
        self.material_bind_groups.insert(textures, bind_group);
    }

    /// Bind group built by [`prepare_material`](Self::prepare_material).
    pub fn material_bind_group(&self, textures: &MaterialTextures) -> Option<&wgpu::BindGroup> {
        self.material_bind_groups.get(textures)
    }

    /// Generate mipmaps for a texture using render passes.
    fn generate_mipmaps(
        &self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        texture: &wgpu::Texture,
        format: wgpu::TextureFormat,
        mip_count: u32,
    ) {
        let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("mipmap-pipeline"),
            layout: Some(&self.blit_pipeline_layout),
            vertex: wgpu::VertexState {
                module: &self.blit_shader,
                entry_point: Some("vs_main"),
                buffers: &[],
                compilation_options: wgpu::PipelineCompilationOptions::default(),
            },
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                ..Default::default()
            },
            depth_stencil: None,
            multisample: wgpu::MultisampleState::default(),
            fragment: Some(wgpu::FragmentState {
                module: &self.blit_shader,
                entry_point: Some("fs_main"),
                targets: &[Some(wgpu::ColorTargetState {
                    format,
                    blend: None,
                    write_mask: wgpu::ColorWrites::ALL,
                })],
                compilation_options: wgpu::PipelineCompilationOptions::default(),
            }),
            multiview_mask: None,
            cache: None,
        });

        let mut encoder = device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("mipmap-encoder"),
        });

        for level in 1..mip_count {
            let src_view = texture.create_view(&wgpu::TextureViewDescriptor {
                base_mip_level: level - 1,
                mip_level_count: Some(1),
                ..Default::default()
            });

            let dst_view = texture.create_view(&wgpu::TextureViewDescriptor {
                base_mip_level: level,
                mip_level_count: Some(1),
                ..Default::default()
            });

            let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
                label: Some("mipmap-bind-group"),
                layout: &self.blit_bind_group_layout,
                entries: &[
                    wgpu::BindGroupEntry {
                        binding: 0,
                        resource: wgpu::BindingResource::TextureView(&src_view),
                    },
                    wgpu::BindGroupEntry {
                        binding: 1,
                        resource: wgpu::BindingResource::Sampler(&self.blit_sampler),
                    },
                ],
            });

            let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("mipmap-pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &dst_view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color::BLACK),
                        store: wgpu::StoreOp::Store,
                    },
                    depth_slice: None,
                })],
                depth_stencil_attachment: None,
                ..Default::default()
            });

            pass.set_pipeline(&pipeline);
            pass.set_bind_group(0, &bind_group, &[]);
            pass.draw(0..3, 0..1);
        }

        queue.submit(std::iter::once(encoder.finish()));
    }
}

fn solid_texture(
    device: &wgpu::Device,
    queue: &wgpu::Queue,
    label: &str,
    rgba: [u8; 4],
    format: wgpu::TextureFormat,
) -> GpuTexture {
    let texture = device.create_texture(&wgpu::TextureDescriptor {
        label: Some(label),
        size: wgpu::Extent3d {
            width: 1,
            height: 1,
            depth_or_array_layers: 1,
        },
        mip_level_count: 1,
        sample_count: 1,
        dimension: wgpu::TextureDimension::D2,
        format,
        usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
        view_formats: &[],
    });
    write_level0(queue, &texture, &rgba, 1, 1, format);
    let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
    GpuTexture {
        texture,
        view,
        dimensions: (1, 1),
        format,
        mip_level_count: 1,
    }
}

fn write_level0(
    queue: &wgpu::Queue,
    texture: &wgpu::Texture,
    data: &[u8],
    width: u32,
    height: u32,
    format: wgpu::TextureFormat,
) {
    queue.write_texture(
        wgpu::TexelCopyTextureInfo {
            texture,
            mip_level: 0,
            origin: wgpu::Origin3d::ZERO,
            aspect: wgpu::TextureAspect::All,
        },
        data,
        wgpu::TexelCopyBufferLayout {
            offset: 0,
            bytes_per_row: Some(bytes_per_row(width, format)),
            rows_per_image: None,
        },
        wgpu::Extent3d {
            width,
            height,
            depth_or_array_layers: 1,
        },
    );
}

/// Calculate the expected byte size for a texture.
fn expected_byte_size(width: u32, height: u32, format: wgpu::TextureFormat) -> usize {
    let bpp = format.block_copy_size(None).unwrap_or(4) as usize;
    width as usize * height as usize * bpp
}

/// Calculate bytes per row for a texture.
fn bytes_per_row(width: u32, format: wgpu::TextureFormat) -> u32 {
    let bpp = format.block_copy_size(None).unwrap_or(4);
    width * bpp
}

fn validate_dimensions(width: u32, height: u32) -> Result<(), TextureError> {
    if width == 0 || height == 0 {
        return Err(TextureError::ZeroDimensions { width, height });
    }
    Ok(())
}

fn validate_data_size(
    data: &[u8],
    width: u32,
    height: u32,
    format: wgpu::TextureFormat,
) -> Result<(), TextureError> {
    let expected = expected_byte_size(width, height, format);
    if data.len() != expected {
        return Err(TextureError::DataSizeMismatch {
            actual: data.len(),
            expected,
            width,
            height,
            format,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_gpu::create_test_device;
    use moonlit_scene::TextureLoader;

    fn handles() -> (TextureHandle, TextureHandle) {
        // Handles are only minted by the loader; the files need not exist.
        let mut loader = TextureLoader::new().unwrap();
        let color = loader.load("moon.jpg");
        let normal = loader.load_with("normal.jpg", ColorSpace::Linear);
        loader.shutdown();
        (color, normal)
    }

    fn image(width: u32, height: u32) -> DecodedImage {
        DecodedImage {
            width,
            height,
            rgba: vec![200; (width * height * 4) as usize],
        }
    }

    #[test]
    fn test_mipmap_level_count_calculation() {
        assert_eq!(mip_level_count(1, 1), 1);
        assert_eq!(mip_level_count(2, 2), 2);
        assert_eq!(mip_level_count(4, 4), 3);
        assert_eq!(mip_level_count(256, 256), 9);
        assert_eq!(mip_level_count(512, 256), 10);
        assert_eq!(mip_level_count(1024, 1024), 11);
    }

    #[test]
    fn test_format_follows_color_space() {
        assert_eq!(
            format_for(ColorSpace::Srgb),
            wgpu::TextureFormat::Rgba8UnormSrgb
        );
        assert_eq!(format_for(ColorSpace::Linear), wgpu::TextureFormat::Rgba8Unorm);
    }

    #[test]
    fn test_validation_errors() {
        assert!(matches!(
            validate_dimensions(0, 4),
            Err(TextureError::ZeroDimensions { .. })
        ));
        assert!(matches!(
            validate_data_size(&[0; 32], 4, 4, wgpu::TextureFormat::Rgba8Unorm),
            Err(TextureError::DataSizeMismatch { expected: 64, .. })
        ));
    }

    #[test]
    fn test_placeholders_until_upload() {
        let Some((device, queue)) = create_test_device() else {
            return;
        };
        let (color, normal) = handles();
        let mut manager = TextureManager::new(&device, &queue);

        let placeholder = manager.resolve(Some(color), MapSlot::Color);
        assert_eq!(placeholder.dimensions, (1, 1));
        assert_eq!(placeholder.format, wgpu::TextureFormat::Rgba8UnormSrgb);
        let flat = manager.resolve(Some(normal), MapSlot::Normal);
        assert_eq!(flat.format, wgpu::TextureFormat::Rgba8Unorm);

        manager.upload(&device, &queue, color, &image(256, 256)).unwrap();
        let uploaded = manager.resolve(Some(color), MapSlot::Color);
        assert_eq!(uploaded.dimensions, (256, 256));
        assert_eq!(uploaded.mip_level_count, 9);
        assert!(!manager.is_uploaded(normal));
    }

    #[test]
    fn test_upload_invalidates_material_bind_group() {
        let Some((device, queue)) = create_test_device() else {
            return;
        };
        let (color, normal) = handles();
        let mut manager = TextureManager::new(&device, &queue);
        let key = MaterialTextures {
            color: Some(color),
            normal: Some(normal),
        };

        manager.prepare_material(&device, key);
        assert!(manager.material_bind_group(&key).is_some());

        manager.upload(&device, &queue, normal, &image(4, 4)).unwrap();
        assert!(manager.material_bind_group(&key).is_none());

        manager.prepare_material(&device, key);
        assert!(manager.material_bind_group(&key).is_some());
    }

    #[test]
    fn test_bad_image_is_rejected() {
        let Some((device, queue)) = create_test_device() else {
            return;
        };
        let (color, _) = handles();
        let mut manager = TextureManager::new(&device, &queue);
        let mut bad = image(4, 4);
        bad.rgba.truncate(10);
        assert!(matches!(
            manager.upload(&device, &queue, color, &bad),
            Err(TextureError::DataSizeMismatch { .. })
        ));
        assert!(!manager.is_uploaded(color));
    }
}
