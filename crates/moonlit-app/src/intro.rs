//! Startup reveal: the moon scales in, then the nav bar slides down, then
//! the title fades in.

use glam::Vec3;
use moonlit_animation::{Ease, Timeline, Tween};

use crate::stage::Stage;

pub const MOON_SCALE_STEP: usize = 0;
pub const NAV_SLIDE_STEP: usize = 1;
pub const TITLE_FADE_STEP: usize = 2;

/// The three-step intro timeline. Each step lasts `step_duration` seconds
/// and eases with `power1.out`.
pub fn intro_timeline(step_duration: f32) -> Timeline<Stage> {
    let mut timeline = Timeline::new(step_duration);
    timeline.push_eased(
        Tween::from_to(
            "moon-scale",
            Stage::moon_scale,
            Stage::set_moon_scale,
            Vec3::ZERO,
            Vec3::ONE,
        ),
        Ease::Power1Out,
    );
    timeline.push_eased(
        Tween::from_to(
            "nav-slide",
            |s: &Stage| s.overlay.nav_offset,
            |s: &mut Stage, v| s.overlay.nav_offset = v,
            -100.0,
            0.0,
        ),
        Ease::Power1Out,
    );
    timeline.push_eased(
        Tween::from_to(
            "title-fade",
            |s: &Stage| s.overlay.title_opacity,
            |s: &mut Stage, v| s.overlay.title_opacity = v,
            0.0,
            1.0,
        ),
        Ease::Power1Out,
    );
    timeline
}

#[cfg(test)]
mod tests {
    use super::*;
    use moonlit_animation::TimelineEvent;
    use moonlit_config::SceneConfig;
    use moonlit_scene::TextureLoader;

    fn stage() -> Stage {
        let mut loader = TextureLoader::new().unwrap();
        let config = SceneConfig {
            star_count: 4,
            star_seed: Some(1),
            ..SceneConfig::default()
        };
        Stage::build(&config, &mut loader).0
    }

    #[test]
    fn test_play_hides_everything() {
        let mut stage = stage();
        let mut timeline = intro_timeline(1.0);
        timeline.play(&mut stage);
        assert_eq!(stage.moon_scale(), Vec3::ZERO);
        assert_eq!(stage.overlay.nav_offset, -100.0);
        assert_eq!(stage.overlay.title_opacity, 0.0);
    }

    #[test]
    fn test_steps_are_strictly_sequential() {
        let mut stage = stage();
        let mut timeline = intro_timeline(1.0);
        assert_eq!(timeline.schedule(), vec![(0.0, 1.0), (1.0, 2.0), (2.0, 3.0)]);

        timeline.play(&mut stage);
        let mut events = Vec::new();
        for _ in 0..240 {
            events.extend(timeline.advance(1.0 / 60.0, &mut stage));
        }
        assert!(timeline.is_finished());

        let time_of = |wanted: fn(&TimelineEvent) -> bool| {
            events
                .iter()
                .find(|e| wanted(e))
                .map(|e| match *e {
                    TimelineEvent::Started { at, .. }
                    | TimelineEvent::Completed { at, .. }
                    | TimelineEvent::Finished { at } => at,
                })
                .unwrap()
        };
        let moon_start = time_of(|e| matches!(e, TimelineEvent::Started { index: 0, .. }));
        let moon_end = time_of(|e| matches!(e, TimelineEvent::Completed { index: 0, .. }));
        let nav_start = time_of(|e| matches!(e, TimelineEvent::Started { index: 1, .. }));
        let nav_end = time_of(|e| matches!(e, TimelineEvent::Completed { index: 1, .. }));
        let title_start = time_of(|e| matches!(e, TimelineEvent::Started { index: 2, .. }));
        let title_end = time_of(|e| matches!(e, TimelineEvent::Completed { index: 2, .. }));

        assert!(moon_start <= moon_end);
        assert!(moon_end <= nav_start);
        assert!(nav_start <= nav_end);
        assert!(nav_end <= title_start);
        assert!(title_start <= title_end);
        assert!((title_end - 3.0).abs() < 1e-3);
    }

    #[test]
    fn test_later_steps_wait_for_earlier_ones() {
        let mut stage = stage();
        let mut timeline = intro_timeline(1.0);
        timeline.play(&mut stage);

        timeline.advance(0.5, &mut stage);
        let scale = stage.moon_scale().x;
        assert!(scale > 0.0 && scale < 1.0);
        assert_eq!(stage.overlay.nav_offset, -100.0);
        assert_eq!(stage.overlay.title_opacity, 0.0);

        timeline.advance(1.0, &mut stage);
        assert_eq!(stage.moon_scale(), Vec3::ONE);
        assert!(stage.overlay.nav_offset > -100.0 && stage.overlay.nav_offset < 0.0);
        assert_eq!(stage.overlay.title_opacity, 0.0);
        assert_eq!(timeline.current_step(), Some(NAV_SLIDE_STEP));
    }

    #[test]
    fn test_power1_out_midpoint() {
        let mut stage = stage();
        let mut timeline = intro_timeline(1.0);
        timeline.play(&mut stage);
        timeline.advance(0.5, &mut stage);
        assert!((stage.moon_scale().x - 0.75).abs() < 1e-5);
        assert_eq!(timeline.current_step(), Some(MOON_SCALE_STEP));
    }

    #[test]
    fn test_final_state_fully_revealed() {
        let mut stage = stage();
        let mut timeline = intro_timeline(1.0);
        timeline.play(&mut stage);
        let events = timeline.advance(10.0, &mut stage);
        assert!(matches!(events.last(), Some(TimelineEvent::Finished { .. })));
        assert_eq!(stage.moon_scale(), Vec3::ONE);
        assert_eq!(stage.overlay.nav_offset, 0.0);
        assert_eq!(stage.overlay.title_opacity, 1.0);
        assert_eq!(timeline.current_step(), None);
        assert!(timeline.advance(1.0, &mut stage).is_empty());
        assert_eq!(TITLE_FADE_STEP, timeline.len() - 1);
    }
}
