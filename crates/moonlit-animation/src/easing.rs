//! Easing curves.

/// Maps linear progress in `0.0..=1.0` to eased progress.
///
/// The `Power1*` family is quadratic; `Power1Out` is the default curve for
/// every tween.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Ease {
    /// Constant speed.
    Linear,
    /// Slow start, fast end.
    Power1In,
    /// Fast start, slow end.
    #[default]
    Power1Out,
    /// Slow start, fast middle, slow end.
    Power1InOut,
}

impl Ease {
    pub fn apply(&self, t: f32) -> f32 {
        let t = t.clamp(0.0, 1.0);
        match self {
            Ease::Linear => t,
            Ease::Power1In => t * t,
            Ease::Power1Out => 1.0 - (1.0 - t) * (1.0 - t),
            Ease::Power1InOut => {
                if t < 0.5 {
                    2.0 * t * t
                } else {
                    1.0 - (-2.0 * t + 2.0).powi(2) / 2.0
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL: [Ease; 4] = [
        Ease::Linear,
        Ease::Power1In,
        Ease::Power1Out,
        Ease::Power1InOut,
    ];

    #[test]
    fn test_endpoints_are_fixed() {
        for ease in ALL {
            assert!(ease.apply(0.0).abs() < 1e-6, "{ease:?}");
            assert!((ease.apply(1.0) - 1.0).abs() < 1e-6, "{ease:?}");
        }
    }

    #[test]
    fn test_input_is_clamped() {
        for ease in ALL {
            assert_eq!(ease.apply(-2.0), ease.apply(0.0));
            assert_eq!(ease.apply(3.0), ease.apply(1.0));
        }
    }

    #[test]
    fn test_power1_out_is_front_loaded() {
        assert!((Ease::Power1Out.apply(0.5) - 0.75).abs() < 1e-6);
        assert!((Ease::Power1In.apply(0.5) - 0.25).abs() < 1e-6);
        assert!((Ease::Power1InOut.apply(0.5) - 0.5).abs() < 1e-6);
    }

    #[test]
    fn test_curves_are_monotonic() {
        for ease in ALL {
            let mut prev = ease.apply(0.0);
            for i in 1..=100 {
                let v = ease.apply(i as f32 / 100.0);
                assert!(v >= prev, "{ease:?} decreased at step {i}");
                prev = v;
            }
        }
    }

    #[test]
    fn test_default_is_power1_out() {
        assert_eq!(Ease::default(), Ease::Power1Out);
    }
}
