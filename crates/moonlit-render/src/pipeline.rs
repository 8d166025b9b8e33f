//! Unlit, alpha-blended pipeline for 2D overlay panels drawn over the
//! presented frame.

use crate::buffer::{BufferAllocator, VertexPositionColor};

/// Axis-aligned rectangle in logical pixels, origin top-left.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct OverlayQuad {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    /// Linear RGB with straight alpha.
    pub color: [f32; 4],
}

impl OverlayQuad {
    const VERTICES: usize = 6;

    /// Two counter-clockwise triangles in NDC for a `width` x `height`
    /// logical viewport. Fully transparent or empty quads produce nothing.
    pub fn to_vertices(&self, viewport_width: f32, viewport_height: f32) -> Option<[VertexPositionColor; 6]> {
        if self.color[3] <= 0.0 || self.width <= 0.0 || self.height <= 0.0 {
            return None;
        }
        let to_ndc = |x: f32, y: f32| [x / viewport_width * 2.0 - 1.0, 1.0 - y / viewport_height * 2.0];
        let tl = to_ndc(self.x, self.y);
        let br = to_ndc(self.x + self.width, self.y + self.height);
        let bl = [tl[0], br[1]];
        let tr = [br[0], tl[1]];
        let v = |position| VertexPositionColor {
            position,
            color: self.color,
        };
        Some([v(tl), v(bl), v(br), v(tl), v(br), v(tr)])
    }
}

pub struct OverlayPipeline {
    pub pipeline: wgpu::RenderPipeline,
    vertex_buffer: wgpu::Buffer,
    capacity: usize,
    vertex_count: u32,
}

impl OverlayPipeline {
    const INITIAL_QUADS: usize = 8;

    pub fn new(
        device: &wgpu::Device,
        shader: &wgpu::ShaderModule,
        target_format: wgpu::TextureFormat,
    ) -> Self {
        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("overlay-pipeline-layout"),
            bind_group_layouts: &[],
            immediate_size: 0,
        });

        let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("overlay-pipeline"),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: shader,
                entry_point: Some("vs_main"),
                buffers: &[VertexPositionColor::layout()],
                compilation_options: wgpu::PipelineCompilationOptions::default(),
            },
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                front_face: wgpu::FrontFace::Ccw,
                cull_mode: None,
                ..Default::default()
            },
            depth_stencil: None,
            multisample: wgpu::MultisampleState::default(),
            fragment: Some(wgpu::FragmentState {
                module: shader,
                entry_point: Some("fs_main"),
                targets: &[Some(wgpu::ColorTargetState {
                    format: target_format,
                    blend: Some(wgpu::BlendState::ALPHA_BLENDING),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
                compilation_options: wgpu::PipelineCompilationOptions::default(),
            }),
            multiview_mask: None,
            cache: None,
        });

        let capacity = Self::INITIAL_QUADS;
        let vertex_buffer = Self::allocate(device, capacity);

        Self {
            pipeline,
            vertex_buffer,
            capacity,
            vertex_count: 0,
        }
    }

    fn allocate(device: &wgpu::Device, quads: usize) -> wgpu::Buffer {
        let bytes = quads * OverlayQuad::VERTICES * std::mem::size_of::<VertexPositionColor>();
        BufferAllocator::new(device).create_streaming_vertex_buffer("overlay-vertices", bytes as u64)
    }

    /// Upload this frame's quads, growing the vertex buffer if needed.
    pub fn prepare(
        &mut self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        quads: &[OverlayQuad],
        viewport_width: f32,
        viewport_height: f32,
    ) {
        let vertices: Vec<VertexPositionColor> = quads
            .iter()
            .filter_map(|q| q.to_vertices(viewport_width, viewport_height))
            .flatten()
            .collect();

        let needed = vertices.len() / OverlayQuad::VERTICES;
        if needed > self.capacity {
            self.capacity = needed.next_power_of_two();
            self.vertex_buffer = Self::allocate(device, self.capacity);
            log::debug!("Overlay buffer grown to {} quads", self.capacity);
        }
        if !vertices.is_empty() {
            queue.write_buffer(&self.vertex_buffer, 0, bytemuck::cast_slice(&vertices));
        }
        self.vertex_count = vertices.len() as u32;
    }

    /// Draw whatever the last [`prepare`](Self::prepare) uploaded.
    pub fn draw(&self, render_pass: &mut wgpu::RenderPass<'_>) {
        if self.vertex_count == 0 {
            return;
        }
        render_pass.set_pipeline(&self.pipeline);
        render_pass.set_vertex_buffer(0, self.vertex_buffer.slice(..));
        render_pass.draw(0..self.vertex_count, 0..1);
    }

    pub fn vertex_count(&self) -> u32 {
        self.vertex_count
    }
}

/// The WGSL source code for the overlay shader.
pub const OVERLAY_SHADER_SOURCE: &str = r#"
struct VertexInput {
    @location(0) position: vec2<f32>,
    @location(1) color: vec4<f32>,
};

struct VertexOutput {
    @builtin(position) clip_position: vec4<f32>,
    @location(0) color: vec4<f32>,
};

@vertex
fn vs_main(in: VertexInput) -> VertexOutput {
    var out: VertexOutput;
    out.clip_position = vec4<f32>(in.position, 0.0, 1.0);
    out.color = in.color;
    return out;
}

@fragment
fn fs_main(in: VertexOutput) -> @location(0) vec4<f32> {
    return in.color;
}
"#;
