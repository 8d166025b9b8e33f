//! Orbit camera controls.
//!
//! The camera sits on a sphere around a fixed target. Primary-button drags
//! push angular deltas into a pending buffer that [`OrbitControls::update`]
//! drains every frame, either all at once or, with damping, a fraction at a
//! time so rotation glides to rest. Auto-rotation advances the azimuth at a
//! constant angular speed regardless of input.

use std::f32::consts::{PI, TAU};

use glam::{Vec2, Vec3};
use moonlit_config::ControlsConfig;
use moonlit_render::Camera;
use tracing::debug;

/// Polar angle is kept this far from the poles so the look-at basis
/// never degenerates.
const POLAR_EPSILON: f32 = 1e-6;

/// Radius multiplier per wheel step while zoom is enabled.
const ZOOM_SCALE: f32 = 0.95;

/// Closest the camera may dolly toward the target.
const MIN_DISTANCE: f32 = 0.5;

/// Spherical coordinates about the target. `theta` is the azimuth measured
/// from +Z toward +X, `phi` the polar angle from +Y.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Spherical {
    pub radius: f32,
    pub theta: f32,
    pub phi: f32,
}

impl Spherical {
    pub fn from_offset(offset: Vec3) -> Self {
        let radius = offset.length();
        if radius <= f32::EPSILON {
            return Self {
                radius: 0.0,
                theta: 0.0,
                phi: PI / 2.0,
            };
        }
        Self {
            radius,
            theta: offset.x.atan2(offset.z),
            phi: (offset.y / radius).clamp(-1.0, 1.0).acos(),
        }
    }

    pub fn to_offset(self) -> Vec3 {
        let sin_phi = self.phi.sin();
        Vec3::new(
            self.radius * sin_phi * self.theta.sin(),
            self.radius * self.phi.cos(),
            self.radius * sin_phi * self.theta.cos(),
        )
    }
}

#[derive(Clone, Debug)]
pub struct OrbitControls {
    target: Vec3,
    spherical: Spherical,
    /// Rotation requested by input and not yet applied, as (theta, phi).
    pending: Vec2,
    pub enable_damping: bool,
    pub damping_factor: f32,
    pub auto_rotate: bool,
    /// 2.0 is one revolution every 30 seconds.
    pub auto_rotate_speed: f32,
    pub rotate_speed: f32,
    pub enable_zoom: bool,
    pub enable_pan: bool,
}

impl OrbitControls {
    /// Orbit `target` starting from wherever `camera` currently is.
    pub fn new(config: &ControlsConfig, camera: &Camera, target: Vec3) -> Self {
        Self {
            target,
            spherical: Spherical::from_offset(camera.position - target),
            pending: Vec2::ZERO,
            enable_damping: config.enable_damping,
            damping_factor: config.damping_factor.clamp(0.0, 1.0),
            auto_rotate: config.auto_rotate,
            auto_rotate_speed: config.auto_rotate_speed,
            rotate_speed: config.rotate_speed,
            enable_zoom: config.enable_zoom,
            enable_pan: config.enable_pan,
        }
    }

    pub fn target(&self) -> Vec3 {
        self.target
    }

    pub fn spherical(&self) -> Spherical {
        self.spherical
    }

    /// Current camera distance from the target.
    pub fn distance(&self) -> f32 {
        self.spherical.radius
    }

    pub fn pending_rotation(&self) -> Vec2 {
        self.pending
    }

    pub fn rotate_left(&mut self, angle: f32) {
        self.pending.x -= angle;
    }

    pub fn rotate_up(&mut self, angle: f32) {
        self.pending.y -= angle;
    }

    /// Feed a primary-button drag of `delta` logical pixels. A drag across
    /// the full viewport height turns one full revolution.
    pub fn on_drag(&mut self, delta: Vec2, viewport_height: f32) {
        if delta == Vec2::ZERO || viewport_height <= 0.0 {
            return;
        }
        self.rotate_left(TAU * delta.x / viewport_height * self.rotate_speed);
        self.rotate_up(TAU * delta.y / viewport_height * self.rotate_speed);
    }

    /// Dolly by `steps` wheel notches (positive = in). No-op unless zoom is
    /// enabled.
    pub fn zoom(&mut self, steps: f32) {
        if !self.enable_zoom || steps == 0.0 {
            return;
        }
        self.spherical.radius = (self.spherical.radius * ZOOM_SCALE.powf(steps)).max(MIN_DISTANCE);
        debug!(radius = self.spherical.radius, "orbit zoom");
    }

    /// Move the target in the camera plane by `delta` logical pixels. No-op
    /// unless pan is enabled.
    pub fn pan(&mut self, delta: Vec2, viewport_height: f32, camera: &Camera) {
        if !self.enable_pan || delta == Vec2::ZERO || viewport_height <= 0.0 {
            return;
        }
        // World units per pixel at the target's depth.
        let scale = 2.0 * self.spherical.radius * (camera.fov_y / 2.0).tan() / viewport_height;
        self.target += (camera.up() * delta.y - camera.right() * delta.x) * scale;
        debug!(target = ?self.target, "orbit pan");
    }

    /// Apply pending input and auto-rotation, then place `camera`.
    pub fn update(&mut self, dt: f32, camera: &mut Camera) {
        if self.enable_damping {
            self.spherical.theta += self.pending.x * self.damping_factor;
            self.spherical.phi += self.pending.y * self.damping_factor;
            self.pending *= 1.0 - self.damping_factor;
        } else {
            self.spherical.theta += self.pending.x;
            self.spherical.phi += self.pending.y;
            self.pending = Vec2::ZERO;
        }

        if self.auto_rotate {
            self.spherical.theta -= self.auto_rotate_angle(dt);
        }

        self.spherical.theta %= TAU;
        self.spherical.phi = self
            .spherical
            .phi
            .clamp(POLAR_EPSILON, PI - POLAR_EPSILON);

        camera.position = self.target + self.spherical.to_offset();
        camera.look_at(self.target);
    }

    fn auto_rotate_angle(&self, dt: f32) -> f32 {
        TAU / 60.0 * self.auto_rotate_speed * dt.max(0.0)
    }
}
