//! Window creation and event handling via winit.
//!
//! [`App`] implements winit's [`ApplicationHandler`]: it opens the window
//! and GPU context on `resumed`, forwards input and resize events to the
//! [`Showcase`], and renders one frame per `RedrawRequested`.

use std::sync::Arc;
use std::time::Instant;

use moonlit_config::Config;
use moonlit_render::{
    RenderContext, SceneRenderer, SurfaceError, init_render_context_blocking,
};
use moonlit_scene::{Color, TextureLoader};
use tracing::{debug, error, info, instrument, warn};
use winit::application::ApplicationHandler;
use winit::dpi::LogicalSize;
use winit::event::WindowEvent;
use winit::event_loop::{ActiveEventLoop, EventLoop};
use winit::window::{Window, WindowAttributes, WindowId};

use crate::platform::AppError;
use crate::showcase::Showcase;

/// Returns [`WindowAttributes`] based on the given configuration.
pub fn window_attributes_from_config(config: &Config) -> WindowAttributes {
    WindowAttributes::default()
        .with_title(config.window.title.clone())
        .with_inner_size(LogicalSize::new(
            config.window.width as f64,
            config.window.height as f64,
        ))
}

/// Configured background as a linear clear color.
pub fn clear_color_from_config(config: &Config) -> wgpu::Color {
    let [r, g, b] = config.render.clear_color;
    let [r, g, b] = Color::new(r as f32, g as f32, b as f32).to_linear();
    wgpu::Color {
        r: r as f64,
        g: g as f64,
        b: b as f64,
        a: 1.0,
    }
}

struct Gpu {
    window: Arc<Window>,
    ctx: RenderContext,
    renderer: SceneRenderer,
}

pub struct App {
    config: Config,
    showcase: Showcase,
    loader: TextureLoader,
    gpu: Option<Gpu>,
    fatal: Option<AppError>,
}

impl App {
    pub fn new(config: Config) -> Result<Self, AppError> {
        let mut loader = TextureLoader::new()?;
        let showcase = Showcase::new(&config, &mut loader);
        Ok(Self {
            config,
            showcase,
            loader,
            gpu: None,
            fatal: None,
        })
    }

    pub fn showcase(&self) -> &Showcase {
        &self.showcase
    }

    fn init_gpu(&mut self, event_loop: &ActiveEventLoop) -> Result<Gpu, AppError> {
        let window = Arc::new(event_loop.create_window(window_attributes_from_config(&self.config))?);
        let size = window.inner_size();
        let scale_factor = window.scale_factor();
        info!(
            "Window created: {}x{} physical (scale: {:.2})",
            size.width, size.height, scale_factor
        );

        let ctx = init_render_context_blocking(window.clone(), self.config.window.vsync)?;
        self.showcase
            .on_resize_physical(size.width, size.height, scale_factor);
        let renderer = SceneRenderer::new(
            &ctx,
            self.showcase.viewport(),
            clear_color_from_config(&self.config),
        )?;
        Ok(Gpu {
            window,
            ctx,
            renderer,
        })
    }

    /// Apply a physical window size at `scale_factor` to the surface, the
    /// viewport and the backing targets.
    fn handle_resize(&mut self, physical_width: u32, physical_height: u32, scale_factor: f64) {
        if let Some(gpu) = &mut self.gpu {
            gpu.ctx.resize(physical_width, physical_height);
        }
        let changed = self
            .showcase
            .on_resize_physical(physical_width, physical_height, scale_factor)
            .is_some();
        if changed && let Some(gpu) = &mut self.gpu {
            gpu.renderer.resize(&gpu.ctx, self.showcase.viewport());
        }
    }

    fn current_scale_factor(&self) -> f64 {
        self.gpu.as_ref().map_or(1.0, |g| g.window.scale_factor())
    }

    /// Upload every texture the loader finished since the last frame.
    fn upload_textures(&mut self) {
        let Some(gpu) = &mut self.gpu else {
            return;
        };
        for loaded in self.loader.drain() {
            let Ok(image) = loaded.result else {
                continue;
            };
            if let Err(e) = gpu.renderer.upload_texture(&gpu.ctx, loaded.handle, &image) {
                warn!(path = %loaded.path.display(), error = %e, "texture upload failed");
            }
        }
    }

    fn redraw(&mut self, event_loop: &ActiveEventLoop) {
        if self.showcase.frame(Instant::now()).is_none() {
            info!("Render loop stopped, exiting");
            event_loop.exit();
            return;
        }
        self.upload_textures();

        let Some(gpu) = &mut self.gpu else {
            return;
        };
        let overlay = self.showcase.overlay_quads();
        let result = gpu.renderer.render(
            &gpu.ctx,
            self.showcase.scene(),
            self.showcase.camera(),
            &overlay,
            self.showcase.viewport(),
        );
        match result {
            Ok(()) => {}
            Err(SurfaceError::Lost) => {
                warn!("Surface lost, reconfiguring");
                gpu.ctx.reconfigure();
            }
            Err(SurfaceError::OutOfMemory) => {
                error!("GPU out of memory");
                self.showcase.loop_handle().stop();
                event_loop.exit();
                return;
            }
            Err(SurfaceError::Timeout) => {
                debug!("Surface timeout, skipping frame");
            }
        }

        gpu.window.request_redraw();
    }

    fn fail(&mut self, event_loop: &ActiveEventLoop, err: AppError) {
        error!("{err}");
        self.fatal = Some(err);
        self.showcase.loop_handle().stop();
        event_loop.exit();
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.gpu.is_some() {
            return;
        }
        match self.init_gpu(event_loop) {
            Ok(gpu) => {
                gpu.window.request_redraw();
                self.gpu = Some(gpu);
            }
            Err(e) => self.fail(event_loop, e),
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        match event {
            WindowEvent::CloseRequested => {
                info!("Close requested, shutting down");
                self.showcase.loop_handle().stop();
                event_loop.exit();
            }
            WindowEvent::Resized(size) => {
                let scale_factor = self.current_scale_factor();
                self.handle_resize(size.width, size.height, scale_factor);
            }
            WindowEvent::ScaleFactorChanged { scale_factor, .. } => {
                // A size change, if any, arrives as a separate `Resized`.
                if let Some((width, height)) = self.gpu.as_ref().map(|g| g.ctx.surface_size()) {
                    self.handle_resize(width, height, scale_factor);
                }
            }
            WindowEvent::CursorMoved { position, .. } => {
                let scale_factor = self.current_scale_factor();
                let logical = position.to_logical::<f64>(scale_factor);
                self.showcase.on_pointer_moved(logical.x, logical.y);
            }
            WindowEvent::MouseInput { state, button, .. } => {
                self.showcase.on_pointer_button(button, state);
            }
            WindowEvent::MouseWheel { delta, .. } => {
                self.showcase.on_scroll(delta);
            }
            WindowEvent::CursorEntered { .. } => {
                self.showcase.on_cursor_entered();
            }
            WindowEvent::CursorLeft { .. } => {
                self.showcase.on_cursor_left();
            }
            WindowEvent::RedrawRequested => {
                self.redraw(event_loop);
            }
            _ => {}
        }
    }

    fn exiting(&mut self, _event_loop: &ActiveEventLoop) {
        self.loader.shutdown();
    }
}

/// Creates an event loop and runs the application until the window closes.
#[instrument(skip_all)]
pub fn run(config: Config) -> Result<(), AppError> {
    let event_loop = EventLoop::new()?;
    let mut app = App::new(config)?;
    event_loop.run_app(&mut app)?;
    match app.fatal.take() {
        Some(err) => Err(err),
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use moonlit_render::BackingSize;

    #[test]
    fn test_black_clear_color() {
        let color = clear_color_from_config(&Config::default());
        assert_eq!(color, wgpu::Color::BLACK);
    }

    #[test]
    fn test_clear_color_is_linearized() {
        let mut config = Config::default();
        config.render.clear_color = [0.5, 1.0, 0.0];
        let color = clear_color_from_config(&config);
        assert!((color.r - 0.214).abs() < 1e-3);
        assert!((color.g - 1.0).abs() < 1e-6);
        assert_eq!(color.b, 0.0);
    }

    #[test]
    fn test_app_viewport_is_double_density() {
        let app = App::new(Config::default()).unwrap();
        let viewport = app.showcase().viewport();
        assert_eq!((viewport.width(), viewport.height()), (1280, 720));
        assert_eq!(
            viewport.backing_size(),
            BackingSize {
                width: 2560,
                height: 1440,
            }
        );
    }

    #[test]
    fn test_scale_change_uses_event_scale_factor() {
        let mut app = App::new(Config::default()).unwrap();
        app.handle_resize(2560, 1440, 2.0);
        assert_eq!(app.showcase().viewport().width(), 1280);

        // Same physical size at scale 1.0 doubles the logical size.
        app.handle_resize(2560, 1440, 1.0);
        let viewport = app.showcase().viewport();
        assert_eq!((viewport.width(), viewport.height()), (2560, 1440));
        assert!((app.showcase().camera().aspect_ratio - 2560.0 / 1440.0).abs() < 1e-6);
    }

    #[test]
    fn test_window_attributes_do_not_panic() {
        let _attrs = window_attributes_from_config(&Config::default());
    }

    #[test]
    fn test_app_starts_without_window() {
        let app = App::new(Config::default()).unwrap();
        assert!(app.gpu.is_none());
        assert!(app.showcase().intro().is_playing());
    }
}
