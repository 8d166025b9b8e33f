//! Lit pipeline for standard-material spheres.
//!
//! Cook-Torrance GGX specular with a Lambert diffuse term, one point light
//! and an ambient term. The color map modulates the material color, and the
//! normal map perturbs the surface normal in a tangent frame derived from
//! the sphere's own normal.
//!
//! Bind groups:
//! - 0: [`FrameUniform`] (camera, light, ambient)
//! - 1: [`ObjectUniform`] array, one slot per mesh, selected by dynamic offset
//! - 2: color map, normal map, sampler (from the texture manager)

use std::num::NonZeroU64;

use bytemuck::{Pod, Zeroable};
use glam::Vec3;
use moonlit_scene::{Scene, StandardMaterial, Transform};

use crate::buffer::sphere_vertex_layout;
use crate::camera::Camera;
use crate::targets::{BACKING_COLOR_FORMAT, DEPTH_COMPARE, DEPTH_FORMAT};

/// Per-frame uniform. Colors are linear RGB.
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, Pod, Zeroable)]
pub struct FrameUniform {
    pub view_proj: [[f32; 4]; 4],
    pub camera_position: [f32; 4],
    /// xyz = world position, w = range (0 = unlimited).
    pub light_position_range: [f32; 4],
    /// rgb = color * intensity, w = decay exponent.
    pub light_color_decay: [f32; 4],
    /// rgb = summed ambient radiance.
    pub ambient: [f32; 4],
}

impl FrameUniform {
    /// Gather the camera and the scene's lights. Only the first point light
    /// is used; without one the direct term is black.
    pub fn new(camera: &Camera, scene: &Scene) -> Self {
        let (light_position_range, light_color_decay) = scene
            .point_lights()
            .next()
            .map(|(position, light)| {
                let color = Vec3::from(light.color.to_linear()) * light.intensity;
                (
                    position.extend(light.distance).to_array(),
                    color.extend(light.decay).to_array(),
                )
            })
            .unwrap_or_default();

        Self {
            view_proj: camera.view_projection_matrix().to_cols_array_2d(),
            camera_position: camera.position.extend(1.0).to_array(),
            light_position_range,
            light_color_decay,
            ambient: scene.ambient().extend(0.0).to_array(),
        }
    }
}

/// Per-mesh uniform.
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, Pod, Zeroable)]
pub struct ObjectUniform {
    pub model: [[f32; 4]; 4],
    /// rgb = linear base color, w = roughness.
    pub color_roughness: [f32; 4],
}

impl ObjectUniform {
    pub fn new(transform: &Transform, material: &StandardMaterial) -> Self {
        let [r, g, b] = material.color.to_linear();
        Self {
            model: transform.matrix().to_cols_array_2d(),
            color_roughness: [r, g, b, material.roughness.clamp(0.04, 1.0)],
        }
    }
}

/// Round `size` up to a multiple of `alignment`.
pub fn align_to(size: u64, alignment: u64) -> u64 {
    size.div_ceil(alignment) * alignment
}

pub struct StandardPipeline {
    pub pipeline: wgpu::RenderPipeline,
    frame_buffer: wgpu::Buffer,
    frame_bind_group: wgpu::BindGroup,
    object_layout: wgpu::BindGroupLayout,
    object_buffer: wgpu::Buffer,
    object_bind_group: wgpu::BindGroup,
    object_stride: u64,
    object_capacity: usize,
}

impl StandardPipeline {
    const INITIAL_OBJECTS: usize = 256;

    pub fn new(
        device: &wgpu::Device,
        shader: &wgpu::ShaderModule,
        material_layout: &wgpu::BindGroupLayout,
    ) -> Self {
        let frame_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("standard-frame-layout"),
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX_FRAGMENT,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size: NonZeroU64::new(std::mem::size_of::<FrameUniform>() as u64),
                },
                count: None,
            }],
        });

        let object_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("standard-object-layout"),
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX_FRAGMENT,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: true,
                    min_binding_size: NonZeroU64::new(std::mem::size_of::<ObjectUniform>() as u64),
                },
                count: None,
            }],
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("standard-pipeline-layout"),
            bind_group_layouts: &[&frame_layout, &object_layout, material_layout],
            immediate_size: 0,
        });

        let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("standard-pipeline"),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: shader,
                entry_point: Some("vs_main"),
                buffers: &[sphere_vertex_layout()],
                compilation_options: wgpu::PipelineCompilationOptions::default(),
            },
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                strip_index_format: None,
                front_face: wgpu::FrontFace::Ccw,
                cull_mode: Some(wgpu::Face::Back),
                unclipped_depth: false,
                polygon_mode: wgpu::PolygonMode::Fill,
                conservative: false,
            },
            depth_stencil: Some(wgpu::DepthStencilState {
                format: DEPTH_FORMAT,
                depth_write_enabled: true,
                depth_compare: DEPTH_COMPARE,
                stencil: wgpu::StencilState::default(),
                bias: wgpu::DepthBiasState::default(),
            }),
            multisample: wgpu::MultisampleState::default(),
            fragment: Some(wgpu::FragmentState {
                module: shader,
                entry_point: Some("fs_main"),
                targets: &[Some(wgpu::ColorTargetState {
                    format: BACKING_COLOR_FORMAT,
                    blend: None,
                    write_mask: wgpu::ColorWrites::ALL,
                })],
                compilation_options: wgpu::PipelineCompilationOptions::default(),
            }),
            multiview_mask: None,
            cache: None,
        });

        let frame_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("standard-frame-uniform"),
            size: std::mem::size_of::<FrameUniform>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        let frame_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("standard-frame-bind-group"),
            layout: &frame_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: frame_buffer.as_entire_binding(),
            }],
        });

        let object_stride = align_to(
            std::mem::size_of::<ObjectUniform>() as u64,
            u64::from(device.limits().min_uniform_buffer_offset_alignment),
        );
        let object_capacity = Self::INITIAL_OBJECTS;
        let (object_buffer, object_bind_group) =
            Self::allocate_objects(device, &object_layout, object_stride, object_capacity);

        Self {
            pipeline,
            frame_buffer,
            frame_bind_group,
            object_layout,
            object_buffer,
            object_bind_group,
            object_stride,
            object_capacity,
        }
    }

    fn allocate_objects(
        device: &wgpu::Device,
        layout: &wgpu::BindGroupLayout,
        stride: u64,
        capacity: usize,
    ) -> (wgpu::Buffer, wgpu::BindGroup) {
        let buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("standard-object-uniforms"),
            size: stride * capacity as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("standard-object-bind-group"),
            layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: wgpu::BindingResource::Buffer(wgpu::BufferBinding {
                    buffer: &buffer,
                    offset: 0,
                    size: NonZeroU64::new(std::mem::size_of::<ObjectUniform>() as u64),
                }),
            }],
        });
        (buffer, bind_group)
    }

    pub fn write_frame(&self, queue: &wgpu::Queue, frame: &FrameUniform) {
        queue.write_buffer(&self.frame_buffer, 0, bytemuck::bytes_of(frame));
    }

    /// Upload one uniform per mesh, padded to the dynamic offset stride.
    pub fn write_objects(
        &mut self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        objects: &[ObjectUniform],
    ) {
        if objects.len() > self.object_capacity {
            self.object_capacity = objects.len().next_power_of_two();
            (self.object_buffer, self.object_bind_group) = Self::allocate_objects(
                device,
                &self.object_layout,
                self.object_stride,
                self.object_capacity,
            );
            log::debug!("Object uniform buffer grown to {}", self.object_capacity);
        }
        if objects.is_empty() {
            return;
        }

        let stride = self.object_stride as usize;
        let mut staging = vec![0u8; stride * objects.len()];
        for (chunk, object) in staging.chunks_exact_mut(stride).zip(objects) {
            chunk[..std::mem::size_of::<ObjectUniform>()].copy_from_slice(bytemuck::bytes_of(object));
        }
        queue.write_buffer(&self.object_buffer, 0, &staging);
    }

    /// Dynamic offset of object slot `index`.
    pub fn object_offset(&self, index: usize) -> u32 {
        (index as u64 * self.object_stride) as u32
    }

    /// Bind the pipeline and the per-frame group.
    pub fn begin(&self, render_pass: &mut wgpu::RenderPass<'_>) {
        render_pass.set_pipeline(&self.pipeline);
        render_pass.set_bind_group(0, &self.frame_bind_group, &[]);
    }

    /// Select object slot `index` for the next draw.
    pub fn bind_object(&self, render_pass: &mut wgpu::RenderPass<'_>, index: usize) {
        render_pass.set_bind_group(1, &self.object_bind_group, &[self.object_offset(index)]);
    }
}

/// The WGSL source code for the standard material shader.
pub const STANDARD_SHADER_SOURCE: &str = include_str!("standard.wgsl");

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_gpu::create_test_device;
    use moonlit_scene::{AmbientLight, Color, Light, Node, PointLight};

    fn lit_scene() -> Scene {
        let mut scene = Scene::new();
        scene.add(
            Node::light(
                "point",
                Light::Point(PointLight::new(Color::WHITE, 1.5, 100.0)),
            )
            .at(Vec3::new(0.0, 10.0, 10.0)),
        );
        scene.add(Node::light(
            "ambient",
            Light::Ambient(AmbientLight::new(Color::WHITE, 0.1)),
        ));
        scene
    }

    #[test]
    fn test_uniform_sizes() {
        assert_eq!(std::mem::size_of::<FrameUniform>(), 128);
        assert_eq!(std::mem::size_of::<ObjectUniform>(), 80);
    }

    #[test]
    fn test_align_to() {
        assert_eq!(align_to(80, 256), 256);
        assert_eq!(align_to(256, 256), 256);
        assert_eq!(align_to(257, 256), 512);
    }

    #[test]
    fn test_frame_uniform_collects_light() {
        let frame = FrameUniform::new(&Camera::default(), &lit_scene());
        assert_eq!(frame.light_position_range, [0.0, 10.0, 10.0, 100.0]);
        assert!((frame.light_color_decay[0] - 1.5).abs() < 1e-6);
        assert_eq!(frame.light_color_decay[3], 1.0);
        assert!((frame.ambient[0] - 0.1).abs() < 1e-6);
    }

    #[test]
    fn test_frame_uniform_without_point_light() {
        let frame = FrameUniform::new(&Camera::default(), &Scene::new());
        assert_eq!(frame.light_color_decay, [0.0; 4]);
        assert_eq!(frame.ambient[..3], [0.0; 3]);
    }

    #[test]
    fn test_object_uniform_carries_scale() {
        let transform = Transform {
            position: Vec3::ZERO,
            scale: Vec3::ZERO,
        };
        let material = StandardMaterial::with_color(Color::WHITE).roughness(0.8);
        let object = ObjectUniform::new(&transform, &material);
        assert_eq!(object.model[0][0], 0.0);
        assert_eq!(object.color_roughness, [1.0, 1.0, 1.0, 0.8]);
    }

    #[test]
    fn test_pipeline_creation_and_object_growth() {
        let Some((device, queue)) = create_test_device() else {
            return;
        };
        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("standard"),
            source: wgpu::ShaderSource::Wgsl(STANDARD_SHADER_SOURCE.into()),
        });
        let textures = crate::texture::TextureManager::new(&device, &queue);
        let mut pipeline = StandardPipeline::new(&device, &shader, textures.material_layout());

        let object = ObjectUniform::new(&Transform::default(), &StandardMaterial::default());
        pipeline.write_objects(&device, &queue, &vec![object; 300]);
        assert!(pipeline.object_capacity >= 300);
        assert_eq!(
            u64::from(pipeline.object_offset(1)) % u64::from(device.limits().min_uniform_buffer_offset_alignment),
            0
        );
    }
}
