//! wgpu rendering for the moon scene: surface management, the lit sphere
//! pipeline, the high-density backing target and the overlay panels.

pub mod buffer;
pub mod camera;
pub mod gpu;
pub mod pass;
pub mod pipeline;
pub mod present;
pub mod scene_renderer;
pub mod shader;
pub mod standard_pipeline;
pub mod targets;
pub mod texture;
pub mod viewport;

#[cfg(test)]
mod test_gpu;

pub use buffer::{BufferAllocator, MeshBuffer, VertexPositionColor, sphere_vertex_layout};
pub use camera::Camera;
pub use gpu::{RenderContext, RenderContextError, SurfaceError, init_render_context_blocking};
pub use pass::{DepthAttachmentConfig, FrameEncoder, NIGHT_BLACK, RenderPassBuilder};
pub use pipeline::{OverlayPipeline, OverlayQuad};
pub use present::PresentPipeline;
pub use scene_renderer::{DrawItem, SceneRenderer, collect_draws};
pub use shader::{ShaderError, ShaderLibrary};
pub use standard_pipeline::{FrameUniform, ObjectUniform, StandardPipeline};
pub use targets::BackingTargets;
pub use texture::{GpuTexture, MapSlot, MaterialTextures, TextureError, TextureManager};
pub use viewport::{BackingSize, Viewport, ViewportResizeEvent};
