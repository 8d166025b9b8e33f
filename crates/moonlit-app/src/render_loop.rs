//! Variable-rate render loop driven by redraw requests.
//!
//! The window's surface presents in `Fifo` mode, so each redraw arrives
//! once per display refresh. [`RenderLoop::next_frame`] measures the time
//! since the previous frame and hands out a [`FrameTick`] until the loop's
//! [`LoopHandle`] is stopped.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Instant;

use tracing::{info, warn};

/// Maximum frame delta in seconds (4 FPS).
pub const MAX_FRAME_TIME: f64 = 0.25;

/// Cloneable stop switch for a [`RenderLoop`].
#[derive(Clone, Debug)]
pub struct LoopHandle {
    running: Arc<AtomicBool>,
}

impl LoopHandle {
    fn new() -> Self {
        Self {
            running: Arc::new(AtomicBool::new(true)),
        }
    }

    pub fn stop(&self) {
        if self.running.swap(false, Ordering::AcqRel) {
            info!("Render loop stop requested");
        }
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Acquire)
    }
}

/// One iteration of the loop.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FrameTick {
    /// Seconds since the previous frame, clamped to [`MAX_FRAME_TIME`].
    pub dt: f64,
    /// Zero-based frame number.
    pub frame: u64,
}

pub struct RenderLoop {
    previous_time: Option<Instant>,
    frame_count: u64,
    elapsed: f64,
    handle: LoopHandle,
}

impl RenderLoop {
    pub fn new() -> Self {
        Self {
            previous_time: None,
            frame_count: 0,
            elapsed: 0.0,
            handle: LoopHandle::new(),
        }
    }

    pub fn handle(&self) -> LoopHandle {
        self.handle.clone()
    }

    pub fn is_running(&self) -> bool {
        self.handle.is_running()
    }

    /// Begin the frame observed at `now`. The first frame has `dt == 0`.
    /// Returns `None` once the loop has been stopped.
    pub fn next_frame(&mut self, now: Instant) -> Option<FrameTick> {
        if !self.handle.is_running() {
            return None;
        }

        let mut dt = self
            .previous_time
            .map(|prev| now.saturating_duration_since(prev).as_secs_f64())
            .unwrap_or(0.0);
        self.previous_time = Some(now);

        if dt > MAX_FRAME_TIME {
            warn!(
                "Frame time {:.1}ms exceeds maximum, clamping to {:.1}ms",
                dt * 1000.0,
                MAX_FRAME_TIME * 1000.0
            );
            dt = MAX_FRAME_TIME;
        }

        let tick = FrameTick {
            dt,
            frame: self.frame_count,
        };
        self.frame_count += 1;
        self.elapsed += dt;
        Some(tick)
    }

    /// Frames handed out so far.
    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }

    /// Sum of all clamped frame deltas in seconds.
    pub fn elapsed(&self) -> f64 {
        self.elapsed
    }
}

impl Default for RenderLoop {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_first_frame_has_zero_dt() {
        let mut lp = RenderLoop::new();
        let tick = lp.next_frame(Instant::now()).unwrap();
        assert_eq!(tick.dt, 0.0);
        assert_eq!(tick.frame, 0);
    }

    #[test]
    fn test_dt_measures_gap() {
        let mut lp = RenderLoop::new();
        let t0 = Instant::now();
        lp.next_frame(t0);
        let tick = lp.next_frame(t0 + Duration::from_millis(16)).unwrap();
        assert!((tick.dt - 0.016).abs() < 1e-9);
        assert_eq!(tick.frame, 1);
    }

    #[test]
    fn test_max_frame_time_clamp() {
        let mut lp = RenderLoop::new();
        let t0 = Instant::now();
        lp.next_frame(t0);
        let tick = lp.next_frame(t0 + Duration::from_secs(3)).unwrap();
        assert_eq!(tick.dt, MAX_FRAME_TIME);
        assert!((lp.elapsed() - MAX_FRAME_TIME).abs() < 1e-12);
    }

    #[test]
    fn test_time_going_backwards_is_zero() {
        let mut lp = RenderLoop::new();
        let t0 = Instant::now() + Duration::from_secs(1);
        lp.next_frame(t0);
        let tick = lp.next_frame(t0 - Duration::from_millis(500)).unwrap();
        assert_eq!(tick.dt, 0.0);
    }

    #[test]
    fn test_frame_count_increments() {
        let mut lp = RenderLoop::new();
        let t0 = Instant::now();
        for i in 0..10 {
            lp.next_frame(t0 + Duration::from_millis(16 * i));
        }
        assert_eq!(lp.frame_count(), 10);
    }

    #[test]
    fn test_stopped_loop_yields_nothing() {
        let mut lp = RenderLoop::new();
        let handle = lp.handle();
        assert!(lp.next_frame(Instant::now()).is_some());
        handle.stop();
        assert!(!lp.is_running());
        assert!(lp.next_frame(Instant::now()).is_none());
        assert_eq!(lp.frame_count(), 1);
    }

    #[test]
    fn test_handles_share_state() {
        let lp = RenderLoop::new();
        let a = lp.handle();
        let b = a.clone();
        b.stop();
        assert!(!a.is_running());
        assert!(!lp.is_running());
    }
}
