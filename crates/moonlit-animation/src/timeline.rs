//! Sequential timelines: tweens played back-to-back against one target.

use tracing::debug;

use crate::{Ease, Lerp, Tween};

/// Something a [`Timeline`] can sequence. Implemented for every [`Tween`].
pub trait Step<T> {
    fn label(&self) -> &str;
    fn duration(&self) -> f32;
    fn render_from(&self, target: &mut T);
    fn begin(&mut self, target: &mut T);
    fn step(&mut self, dt: f32, target: &mut T) -> Option<f32>;
}

impl<T, V: Lerp> Step<T> for Tween<T, V> {
    fn label(&self) -> &str {
        Tween::label(self)
    }

    fn duration(&self) -> f32 {
        Tween::duration(self)
    }

    fn render_from(&self, target: &mut T) {
        Tween::render_from(self, target);
    }

    fn begin(&mut self, target: &mut T) {
        Tween::begin(self, target);
    }

    fn step(&mut self, dt: f32, target: &mut T) -> Option<f32> {
        Tween::step(self, dt, target)
    }
}

/// Something that happened while advancing a timeline. `at` is the
/// timeline-local time in seconds.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum TimelineEvent {
    Started { index: usize, at: f32 },
    Completed { index: usize, at: f32 },
    Finished { at: f32 },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum PlayState {
    Idle,
    Playing { index: usize, entered: bool },
    Finished,
}

/// An ordered list of tweens where each one starts exactly when the
/// previous one completes.
///
/// Tweens added without an explicit duration take the timeline's default
/// duration. Playback is one-shot: once finished, further calls to
/// [`advance`](Self::advance) do nothing.
pub struct Timeline<T> {
    steps: Vec<Box<dyn Step<T>>>,
    default_duration: f32,
    state: PlayState,
    time: f32,
}

impl<T: 'static> Timeline<T> {
    /// Create an empty timeline whose steps default to `default_duration`
    /// seconds.
    pub fn new(default_duration: f32) -> Self {
        Self {
            steps: Vec::new(),
            default_duration: default_duration.max(0.0),
            state: PlayState::Idle,
            time: 0.0,
        }
    }

    /// Append a tween after everything already on the timeline.
    #[must_use]
    pub fn then<V: Lerp + 'static>(mut self, tween: Tween<T, V>) -> Self {
        self.push(tween);
        self
    }

    pub fn push<V: Lerp + 'static>(&mut self, mut tween: Tween<T, V>) {
        tween.set_default_duration(self.default_duration);
        self.steps.push(Box::new(tween));
    }

    /// Append a tween using `ease` when it was left at the default curve.
    pub fn push_eased<V: Lerp + 'static>(&mut self, tween: Tween<T, V>, ease: Ease) {
        let tween = if tween.easing() == Ease::default() {
            tween.with_ease(ease)
        } else {
            tween
        };
        self.push(tween);
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Sum of all step durations.
    pub fn total_duration(&self) -> f32 {
        self.steps.iter().map(|s| s.duration()).sum()
    }

    /// Scheduled `(start, end)` times of every step.
    pub fn schedule(&self) -> Vec<(f32, f32)> {
        let mut t = 0.0;
        self.steps
            .iter()
            .map(|s| {
                let start = t;
                t += s.duration();
                (start, t)
            })
            .collect()
    }

    /// Start playback and immediately write every explicit `from` value, so
    /// properties revealed by later steps stay hidden until their turn.
    ///
    /// Calling `play` on a timeline that already started is a no-op.
    pub fn play(&mut self, target: &mut T) {
        if self.state != PlayState::Idle {
            return;
        }
        for step in &self.steps {
            step.render_from(target);
        }
        self.state = PlayState::Playing {
            index: 0,
            entered: false,
        };
        self.time = 0.0;
        debug!(steps = self.steps.len(), total = self.total_duration(), "timeline playing");
    }

    /// Advance playback by `dt` seconds.
    ///
    /// Time left over when a step completes flows into the next step, so a
    /// large `dt` can start and complete several steps in one call.
    pub fn advance(&mut self, dt: f32, target: &mut T) -> Vec<TimelineEvent> {
        let mut events = Vec::new();
        let PlayState::Playing {
            mut index,
            mut entered,
        } = self.state
        else {
            return events;
        };

        let mut remaining = dt.max(0.0);
        loop {
            let Some(step) = self.steps.get_mut(index) else {
                self.state = PlayState::Finished;
                events.push(TimelineEvent::Finished { at: self.time });
                debug!(at = self.time, "timeline finished");
                return events;
            };

            if !entered {
                step.begin(target);
                entered = true;
                events.push(TimelineEvent::Started {
                    index,
                    at: self.time,
                });
                debug!(index, label = step.label(), at = self.time, "timeline step started");
            }

            match step.step(remaining, target) {
                Some(leftover) => {
                    self.time += remaining - leftover;
                    remaining = leftover;
                    events.push(TimelineEvent::Completed {
                        index,
                        at: self.time,
                    });
                    index += 1;
                    entered = false;
                }
                None => {
                    self.time += remaining;
                    break;
                }
            }
        }

        self.state = PlayState::Playing { index, entered };
        events
    }

    /// Timeline-local time in seconds.
    pub fn time(&self) -> f32 {
        self.time
    }

    pub fn is_playing(&self) -> bool {
        matches!(self.state, PlayState::Playing { .. })
    }

    pub fn is_finished(&self) -> bool {
        self.state == PlayState::Finished
    }

    /// Index of the step currently running, if any.
    pub fn current_step(&self) -> Option<usize> {
        match self.state {
            PlayState::Playing { index, .. } if index < self.steps.len() => Some(index),
            _ => None,
        }
    }
}

impl<T> std::fmt::Debug for Timeline<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Timeline")
            .field("steps", &self.steps.len())
            .field("state", &self.state)
            .field("time", &self.time)
            .finish()
    }
}
