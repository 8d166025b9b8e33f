//! Application state and the event handlers that mutate it.
//!
//! [`Showcase`] owns everything except the window and the GPU: the stage,
//! camera, orbit controls, viewport, pointer input, the intro timeline and
//! the pointer color effect. Window events are forwarded to its `on_*`
//! methods as they arrive and each redraw calls [`Showcase::frame`], so
//! every event is fully applied before the frame that shows it.

use std::time::Instant;

use glam::{Vec2, Vec3};
use moonlit_animation::{Timeline, TimelineEvent};
use moonlit_config::Config;
use moonlit_input::{PointerButton, PointerState};
use moonlit_render::{Camera, OverlayQuad, Viewport, ViewportResizeEvent};
use moonlit_scene::{Scene, TextureLoader};
use tracing::{debug, info};
use winit::event::{ElementState, MouseButton, MouseScrollDelta};

use crate::controls::OrbitControls;
use crate::intro::intro_timeline;
use crate::pointer::PointerColor;
use crate::render_loop::{FrameTick, LoopHandle, RenderLoop};
use crate::stage::{Stage, StageTextures};

pub struct Showcase {
    stage: Stage,
    textures: StageTextures,
    camera: Camera,
    controls: OrbitControls,
    viewport: Viewport,
    pointer: PointerState,
    color: PointerColor,
    intro: Timeline<Stage>,
    render_loop: RenderLoop,
}

impl Showcase {
    /// Build the stage, place the camera and start the intro timeline.
    pub fn new(config: &Config, loader: &mut TextureLoader) -> Self {
        let (mut stage, textures) = Stage::build(&config.scene, loader);

        let viewport = Viewport::new(
            config.window.width,
            config.window.height,
            config.render.pixel_ratio,
        );

        let mut camera = Camera::perspective(
            config.camera.fov_y_degrees,
            viewport.aspect(),
            config.camera.near,
            config.camera.far,
        );
        camera.position = Vec3::new(0.0, 0.0, config.camera.distance);
        camera.look_at(Vec3::ZERO);
        let controls = OrbitControls::new(&config.controls, &camera, Vec3::ZERO);

        let mut intro = intro_timeline(config.animation.step_duration);
        intro.play(&mut stage);

        info!(
            width = viewport.width(),
            height = viewport.height(),
            pixel_ratio = viewport.pixel_ratio(),
            "showcase ready"
        );

        Self {
            stage,
            textures,
            camera,
            controls,
            viewport,
            pointer: PointerState::new(),
            color: PointerColor::new(&config.pointer, config.animation.color_duration),
            intro,
            render_loop: RenderLoop::new(),
        }
    }

    /// New logical viewport size. Updates the camera aspect.
    pub fn on_resize(&mut self, width: u32, height: u32) -> Option<ViewportResizeEvent> {
        let event = self.viewport.resize(width, height)?;
        self.apply_resize(event);
        Some(event)
    }

    /// New physical window size at `scale_factor`.
    pub fn on_resize_physical(
        &mut self,
        physical_width: u32,
        physical_height: u32,
        scale_factor: f64,
    ) -> Option<ViewportResizeEvent> {
        let event = self
            .viewport
            .resize_physical(physical_width, physical_height, scale_factor)?;
        self.apply_resize(event);
        Some(event)
    }

    fn apply_resize(&mut self, event: ViewportResizeEvent) {
        self.camera
            .set_aspect_ratio(event.width as f32, event.height as f32);
        info!(
            width = event.width,
            height = event.height,
            aspect = event.aspect,
            backing_width = event.backing.width,
            backing_height = event.backing.height,
            "viewport resized"
        );
    }

    /// Cursor moved to `(x, y)` logical pixels.
    pub fn on_pointer_moved(&mut self, x: f64, y: f64) {
        let previous = self
            .pointer
            .has_position()
            .then(|| self.pointer.position());
        self.pointer.on_cursor_moved(x, y);
        let position = self.pointer.position();

        if let Some(previous) = previous
            && self.pointer.is_pressed(PointerButton::Secondary)
        {
            self.controls.pan(
                position - previous,
                self.viewport.height() as f32,
                &self.camera,
            );
        }

        if let Some(rgb) = self.color.on_move(
            position,
            self.viewport.width() as f32,
            self.viewport.height() as f32,
            &self.stage,
        ) {
            debug!(r = rgb[0], g = rgb[1], b = rgb[2], "moon color target");
        }
    }

    pub fn on_pointer_button(&mut self, button: MouseButton, state: ElementState) {
        self.pointer.on_button(button, state);
        if PointerButton::from_winit(button) == Some(PointerButton::Primary) {
            match state {
                ElementState::Pressed => self.color.on_press(),
                ElementState::Released => self.color.on_release(),
            }
        }
    }

    pub fn on_scroll(&mut self, delta: MouseScrollDelta) {
        self.pointer.on_scroll(delta);
    }

    pub fn on_cursor_entered(&mut self) {
        self.pointer.on_cursor_entered();
    }

    /// Leaving the window releases held buttons, the primary one included.
    pub fn on_cursor_left(&mut self) {
        let primary_held = self.pointer.is_pressed(PointerButton::Primary);
        self.pointer.on_cursor_left();
        if primary_held {
            self.color.on_release();
        }
    }

    /// Start the frame observed at `now` and advance the simulation.
    /// Returns `None` once the render loop has been stopped.
    pub fn frame(&mut self, now: Instant) -> Option<FrameTick> {
        let tick = self.render_loop.next_frame(now)?;
        for event in self.tick(tick.dt as f32) {
            debug!(?event, "intro");
        }
        Some(tick)
    }

    /// Advance by `dt` seconds: controls first, then the intro timeline and
    /// the color tween. Consumes this frame's pointer transients.
    pub fn tick(&mut self, dt: f32) -> Vec<TimelineEvent> {
        let height = self.viewport.height() as f32;
        self.controls.on_drag(self.pointer.drag_delta(), height);
        self.controls.zoom(self.pointer.scroll());
        self.controls.update(dt, &mut self.camera);

        let events = self.intro.advance(dt, &mut self.stage);
        self.color.step(dt, &mut self.stage);
        self.pointer.clear_transients();
        events
    }

    pub fn overlay_quads(&self) -> Vec<OverlayQuad> {
        self.stage.overlay.quads(&self.viewport)
    }

    pub fn loop_handle(&self) -> LoopHandle {
        self.render_loop.handle()
    }

    pub fn stage(&self) -> &Stage {
        &self.stage
    }

    pub fn scene(&self) -> &Scene {
        &self.stage.scene
    }

    pub fn textures(&self) -> StageTextures {
        self.textures
    }

    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    pub fn controls(&self) -> &OrbitControls {
        &self.controls
    }

    pub fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    pub fn pointer_color(&self) -> &PointerColor {
        &self.color
    }

    pub fn intro(&self) -> &Timeline<Stage> {
        &self.intro
    }

    /// Current pointer position in logical pixels.
    pub fn pointer_position(&self) -> Vec2 {
        self.pointer.position()
    }
}
