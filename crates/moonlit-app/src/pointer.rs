//! Pointer-driven moon color.
//!
//! Pressing the primary button arms the effect. While armed, every pointer
//! move maps the cursor position to an RGB target and eases the moon's
//! material color toward it, re-targeting any tween already in flight.
//!
//! Two legacy quirks are reproduced unless configured away: releasing the
//! button leaves the effect armed, and the green channel is derived from
//! the x coordinate (divided by the viewport height).

use glam::{Vec2, Vec3};
use moonlit_animation::{Ease, Tween};
use moonlit_config::PointerConfig;
use moonlit_scene::Color;
use tracing::debug;

use crate::stage::Stage;

/// Fixed blue channel of every target.
pub const BLUE_CHANNEL: u8 = 150;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PointerPhase {
    Idle,
    Active,
}

pub struct PointerColor {
    phase: PointerPhase,
    last_target: Option<[u8; 3]>,
    release_returns_idle: bool,
    green_from_y: bool,
    duration: f32,
    tween: Option<Tween<Stage, Vec3>>,
}

impl PointerColor {
    pub fn new(config: &PointerConfig, duration: f32) -> Self {
        Self {
            phase: PointerPhase::Idle,
            last_target: None,
            release_returns_idle: config.release_returns_idle,
            green_from_y: config.green_from_y,
            duration: duration.max(0.0),
            tween: None,
        }
    }

    pub fn phase(&self) -> PointerPhase {
        self.phase
    }

    /// The most recent target, as 8-bit channels.
    pub fn last_target(&self) -> Option<[u8; 3]> {
        self.last_target
    }

    pub fn is_animating(&self) -> bool {
        self.tween.as_ref().is_some_and(|t| !t.is_finished())
    }

    pub fn on_press(&mut self) {
        if self.phase == PointerPhase::Idle {
            debug!("pointer color armed");
        }
        self.phase = PointerPhase::Active;
    }

    pub fn on_release(&mut self) {
        if self.release_returns_idle {
            self.phase = PointerPhase::Idle;
            debug!("pointer color disarmed");
        } else {
            // Legacy: release sets the same flag as press.
            self.phase = PointerPhase::Active;
        }
    }

    /// Target color for a cursor at `position` in a `width` x `height`
    /// viewport, channels clamped to `0..=255`.
    pub fn target_for(&self, position: Vec2, width: f32, height: f32) -> [u8; 3] {
        let channel = |num: f32, den: f32| {
            if den <= 0.0 {
                return 0;
            }
            (num / den * 255.0).round().clamp(0.0, 255.0) as u8
        };
        let green_source = if self.green_from_y { position.y } else { position.x };
        [
            channel(position.x, width),
            channel(green_source, height),
            BLUE_CHANNEL,
        ]
    }

    /// Handle a pointer move. Returns the new target when armed.
    pub fn on_move(
        &mut self,
        position: Vec2,
        width: f32,
        height: f32,
        stage: &Stage,
    ) -> Option<[u8; 3]> {
        if self.phase == PointerPhase::Idle {
            return None;
        }
        let rgb = self.target_for(position, width, height);
        let [r, g, b] = rgb;
        let to = Color::from_rgb8(r, g, b).to_vec3();

        match &mut self.tween {
            Some(tween) => tween.retarget(stage, to),
            None => {
                self.tween = Some(
                    Tween::to(
                        "moon-color",
                        |s: &Stage| s.moon_color().to_vec3(),
                        |s: &mut Stage, v: Vec3| s.set_moon_color(Color::from_vec3(v)),
                        to,
                    )
                    .with_duration(self.duration)
                    .with_ease(Ease::Power1Out),
                );
            }
        }
        self.last_target = Some(rgb);
        Some(rgb)
    }

    /// Advance the color tween by `dt` seconds.
    pub fn step(&mut self, dt: f32, stage: &mut Stage) {
        if let Some(tween) = &mut self.tween {
            tween.step(dt, stage);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use moonlit_config::SceneConfig;
    use moonlit_scene::TextureLoader;

    fn stage() -> Stage {
        let mut loader = TextureLoader::new().unwrap();
        let config = SceneConfig {
            star_count: 0,
            ..SceneConfig::default()
        };
        Stage::build(&config, &mut loader).0
    }

    fn legacy() -> PointerColor {
        PointerColor::new(&PointerConfig::default(), 0.5)
    }

    #[test]
    fn test_target_mapping_uses_x_twice() {
        let pointer = legacy();
        assert_eq!(
            pointer.target_for(Vec2::new(300.0, 40.0), 1000.0, 500.0),
            [77, 153, 150]
        );
    }

    #[test]
    fn test_green_from_y_switch() {
        let pointer = PointerColor::new(
            &PointerConfig {
                green_from_y: true,
                ..PointerConfig::default()
            },
            0.5,
        );
        assert_eq!(
            pointer.target_for(Vec2::new(300.0, 250.0), 1000.0, 500.0),
            [77, 128, 150]
        );
    }

    #[test]
    fn test_channels_are_clamped() {
        let pointer = legacy();
        // x / height exceeds 1 on wide viewports.
        assert_eq!(
            pointer.target_for(Vec2::new(800.0, 0.0), 1000.0, 500.0),
            [204, 255, 150]
        );
        assert_eq!(pointer.target_for(Vec2::new(-5.0, 0.0), 1000.0, 500.0)[0], 0);
    }

    #[test]
    fn test_moves_without_press_change_nothing() {
        let mut stage = stage();
        let initial = stage.moon_color();
        let mut pointer = legacy();
        for i in 0..50 {
            let p = Vec2::new(i as f32 * 20.0, i as f32 * 10.0);
            assert!(pointer.on_move(p, 1000.0, 500.0, &stage).is_none());
            pointer.step(1.0 / 60.0, &mut stage);
        }
        assert_eq!(stage.moon_color(), initial);
        assert_eq!(pointer.phase(), PointerPhase::Idle);
        assert_eq!(pointer.last_target(), None);
    }

    #[test]
    fn test_press_then_move_eases_to_target() {
        let mut stage = stage();
        let initial = stage.moon_color();
        let mut pointer = legacy();
        pointer.on_press();
        let rgb = pointer
            .on_move(Vec2::new(300.0, 0.0), 1000.0, 500.0, &stage)
            .unwrap();
        assert_eq!(rgb, [77, 153, 150]);

        pointer.step(0.25, &mut stage);
        let mid = stage.moon_color();
        assert_ne!(mid, initial);
        assert!(pointer.is_animating());

        pointer.step(0.25, &mut stage);
        assert_eq!(stage.moon_color(), Color::from_rgb8(77, 153, 150));
        assert!(!pointer.is_animating());
    }

    #[test]
    fn test_release_keeps_effect_armed_by_default() {
        let mut stage = stage();
        let mut pointer = legacy();
        pointer.on_press();
        pointer.on_release();
        assert_eq!(pointer.phase(), PointerPhase::Active);
        assert!(
            pointer
                .on_move(Vec2::new(100.0, 0.0), 1000.0, 500.0, &stage)
                .is_some()
        );
        pointer.step(1.0, &mut stage);
        assert_eq!(stage.moon_color(), Color::from_rgb8(26, 51, 150));
    }

    #[test]
    fn test_release_returns_idle_switch() {
        let stage = stage();
        let mut pointer = PointerColor::new(
            &PointerConfig {
                release_returns_idle: true,
                ..PointerConfig::default()
            },
            0.5,
        );
        pointer.on_press();
        pointer.on_release();
        assert_eq!(pointer.phase(), PointerPhase::Idle);
        assert!(
            pointer
                .on_move(Vec2::new(100.0, 0.0), 1000.0, 500.0, &stage)
                .is_none()
        );
    }

    #[test]
    fn test_release_before_press_stays_idle_when_fixed() {
        let mut pointer = PointerColor::new(
            &PointerConfig {
                release_returns_idle: true,
                ..PointerConfig::default()
            },
            0.5,
        );
        pointer.on_release();
        assert_eq!(pointer.phase(), PointerPhase::Idle);
    }

    #[test]
    fn test_new_target_retargets_in_flight_tween() {
        let mut stage = stage();
        let mut pointer = legacy();
        pointer.on_press();
        pointer.on_move(Vec2::new(1000.0, 0.0), 1000.0, 500.0, &stage);
        pointer.step(0.2, &mut stage);
        let before = stage.moon_color();

        pointer.on_move(Vec2::new(0.0, 0.0), 1000.0, 500.0, &stage);
        // The new run starts from the current color, not the old start.
        pointer.step(0.0, &mut stage);
        assert_eq!(stage.moon_color(), before);

        pointer.step(0.5, &mut stage);
        assert_eq!(stage.moon_color(), Color::from_rgb8(0, 0, 150));
        assert_eq!(pointer.last_target(), Some([0, 0, 150]));
    }
}
