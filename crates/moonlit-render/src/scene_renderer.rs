//! Frame orchestration for the moon scene.
//!
//! Each frame draws every scene mesh into the high-density backing target,
//! then presents that target to the swapchain and composites the overlay
//! panels on top.

use std::collections::HashMap;

use moonlit_scene::{DecodedImage, GeometryKey, Scene, TextureHandle};

use crate::buffer::{BufferAllocator, MeshBuffer};
use crate::camera::Camera;
use crate::gpu::{RenderContext, SurfaceError};
use crate::pass::{FrameEncoder, RenderPassBuilder};
use crate::pipeline::{OverlayPipeline, OverlayQuad};
use crate::present::PresentPipeline;
use crate::shader::{OVERLAY_SHADER, PRESENT_SHADER, STANDARD_SHADER, ShaderError, ShaderLibrary};
use crate::standard_pipeline::{FrameUniform, ObjectUniform, StandardPipeline};
use crate::targets::BackingTargets;
use crate::texture::{MaterialTextures, TextureError, TextureManager};
use crate::viewport::Viewport;

/// One mesh draw, in the same order as its object uniform slot.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DrawItem {
    pub geometry: GeometryKey,
    pub textures: MaterialTextures,
}

/// Flatten the scene's meshes into object uniforms and matching draw items.
pub fn collect_draws(scene: &Scene) -> (Vec<ObjectUniform>, Vec<DrawItem>) {
    scene
        .meshes()
        .map(|(_, transform, mesh)| {
            (
                ObjectUniform::new(transform, &mesh.material),
                DrawItem {
                    geometry: mesh.geometry.cache_key(),
                    textures: MaterialTextures {
                        color: mesh.material.map,
                        normal: mesh.material.normal_map,
                    },
                },
            )
        })
        .unzip()
}

pub struct SceneRenderer {
    standard: StandardPipeline,
    overlay: OverlayPipeline,
    present: PresentPipeline,
    textures: TextureManager,
    targets: BackingTargets,
    geometry: HashMap<GeometryKey, MeshBuffer>,
    clear_color: wgpu::Color,
}

impl SceneRenderer {
    pub fn new(
        ctx: &RenderContext,
        viewport: &Viewport,
        clear_color: wgpu::Color,
    ) -> Result<Self, ShaderError> {
        let device = &ctx.device;
        let shaders = ShaderLibrary::with_builtins(device);
        let textures = TextureManager::new(device, &ctx.queue);
        let targets = BackingTargets::new(device, viewport.backing_size());

        let standard =
            StandardPipeline::new(device, &*shaders.require(STANDARD_SHADER)?, textures.material_layout());
        let overlay = OverlayPipeline::new(device, &*shaders.require(OVERLAY_SHADER)?, ctx.surface_format);
        let present = PresentPipeline::new(
            device,
            &*shaders.require(PRESENT_SHADER)?,
            ctx.surface_format,
            &targets.color_view,
        );

        log::info!(
            "Scene renderer ready: {}x{} viewport, backing {:?}",
            viewport.width(),
            viewport.height(),
            targets.size()
        );

        Ok(Self {
            standard,
            overlay,
            present,
            textures,
            targets,
            geometry: HashMap::new(),
            clear_color,
        })
    }

    /// Match the backing target to the viewport's current backing size.
    pub fn resize(&mut self, ctx: &RenderContext, viewport: &Viewport) {
        if self.targets.resize(&ctx.device, viewport.backing_size()) {
            self.present.set_source(&ctx.device, &self.targets.color_view);
        }
    }

    pub fn upload_texture(
        &mut self,
        ctx: &RenderContext,
        handle: TextureHandle,
        image: &DecodedImage,
    ) -> Result<(), TextureError> {
        self.textures
            .upload(&ctx.device, &ctx.queue, handle, image)
            .map(|_| ())
    }

    pub fn textures(&self) -> &TextureManager {
        &self.textures
    }

    pub fn targets(&self) -> &BackingTargets {
        &self.targets
    }

    /// Number of distinct sphere buffers built so far.
    pub fn geometry_count(&self) -> usize {
        self.geometry.len()
    }

    /// Render and present one frame. A surface timeout skips the frame.
    pub fn render(
        &mut self,
        ctx: &RenderContext,
        scene: &Scene,
        camera: &Camera,
        overlay: &[OverlayQuad],
        viewport: &Viewport,
    ) -> Result<(), SurfaceError> {
        let device = &ctx.device;
        let (objects, draws) = collect_draws(scene);

        for (item, (_, _, mesh)) in draws.iter().zip(scene.meshes()) {
            self.geometry.entry(item.geometry).or_insert_with(|| {
                log::debug!("Building sphere buffers for {:?}", item.geometry);
                BufferAllocator::new(device).create_sphere("sphere", &mesh.geometry.build())
            });
            self.textures.prepare_material(device, item.textures);
        }

        self.standard.write_frame(&ctx.queue, &FrameUniform::new(camera, scene));
        self.standard.write_objects(device, &ctx.queue, &objects);
        self.overlay.prepare(
            device,
            &ctx.queue,
            overlay,
            viewport.width() as f32,
            viewport.height() as f32,
        );

        let surface_texture = match ctx.get_current_texture() {
            Ok(texture) => texture,
            Err(SurfaceError::Timeout) => {
                log::debug!("Surface timeout, skipping frame");
                return Ok(());
            }
            Err(e) => return Err(e),
        };
        let mut frame = FrameEncoder::new(device, surface_texture);

        {
            let builder = RenderPassBuilder::new()
                .clear_color(self.clear_color)
                .depth(self.targets.depth_view.clone())
                .label("scene-pass");
            let mut pass = frame.begin_pass(&builder, &self.targets.color_view);
            self.standard.begin(&mut pass);
            for (index, item) in draws.iter().enumerate() {
                let (Some(mesh), Some(material)) = (
                    self.geometry.get(&item.geometry),
                    self.textures.material_bind_group(&item.textures),
                ) else {
                    continue;
                };
                self.standard.bind_object(&mut pass, index);
                pass.set_bind_group(2, material, &[]);
                mesh.bind(&mut pass);
                mesh.draw(&mut pass);
            }
        }

        {
            let builder = RenderPassBuilder::new().label("present-pass");
            let mut pass = frame.begin_surface_pass(&builder);
            self.present.draw(&mut pass);
            self.overlay.draw(&mut pass);
        }

        frame.submit(&ctx.queue);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec3;
    use moonlit_scene::{
        AmbientLight, Color, Light, Node, NodeTag, PointLight, SphereGeometry, StandardMaterial,
        StarfieldGenerator,
    };

    fn moon_scene() -> Scene {
        let mut scene = Scene::new();
        scene.add(Node::mesh(
            NodeTag::Moon,
            "moon",
            SphereGeometry::new(3.0, 64, 64),
            StandardMaterial::with_color(Color::from_hex(0xfffde7)).roughness(0.8),
        ));
        StarfieldGenerator::new(200, 100.0)
            .with_seed(Some(7))
            .populate(&mut scene);
        scene.add(
            Node::light(
                "point",
                Light::Point(PointLight::new(Color::from_hex(0xffecaf), 1.5, 100.0)),
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
    fn test_one_draw_per_mesh() {
        let (objects, draws) = collect_draws(&moon_scene());
        assert_eq!(objects.len(), 201);
        assert_eq!(draws.len(), 201);
    }

    #[test]
    fn test_stars_share_one_geometry() {
        let (_, draws) = collect_draws(&moon_scene());
        let moon = draws[0].geometry;
        let star = draws[1].geometry;
        assert_ne!(moon, star);
        assert!(draws[1..].iter().all(|d| d.geometry == star));
    }

    #[test]
    fn test_draw_order_matches_scene_order() {
        let scene = moon_scene();
        let (objects, _) = collect_draws(&scene);
        let (_, transform, _) = scene.meshes().nth(5).unwrap();
        assert_eq!(objects[5].model, transform.matrix().to_cols_array_2d());
    }

    #[test]
    fn test_untextured_draws_have_no_handles() {
        let (_, draws) = collect_draws(&moon_scene());
        assert!(draws.iter().all(|d| d.textures == MaterialTextures::default()));
    }
}
