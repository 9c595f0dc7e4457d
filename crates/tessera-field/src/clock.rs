//! Frame clock and pointer input sampling.

use std::time::Instant;

use tessera_core::{MAX_FRAME_SECONDS, NOMINAL_FPS, PointerSample};

/// Latest pointer observation plus the wall-clock timestamp of the last frame.
///
/// Pointer handlers only overwrite plain fields here, so they are safe to run
/// between frames without touching any tile state.
#[derive(Debug, Default, Clone)]
pub struct InputSampler {
    pointer: PointerSample,
    last_frame: Option<Instant>,
}

impl InputSampler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a pointer move in surface-logical coordinates.
    pub fn pointer_moved(&mut self, x: f64, y: f64) {
        self.pointer = PointerSample { x, y, inside: true };
    }

    /// The pointer left the surface. The last position is kept.
    pub fn pointer_left(&mut self) {
        self.pointer.inside = false;
    }

    pub fn pointer(&self) -> PointerSample {
        self.pointer
    }

    /// Normalized delta since the previous call, in nominal 1/60 s frames.
    ///
    /// The first call establishes the baseline and returns 0.
    pub fn frame_delta(&mut self, now: Instant) -> f64 {
        match self.last_frame.replace(now) {
            Some(previous) => normalize_delta(now.saturating_duration_since(previous).as_secs_f64()),
            None => 0.0,
        }
    }
}

/// Clamp a wall-clock gap to [`MAX_FRAME_SECONDS`] and express it in nominal frames.
pub fn normalize_delta(seconds: f64) -> f64 {
    seconds.clamp(0.0, MAX_FRAME_SECONDS) * NOMINAL_FPS
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;

    #[test]
    fn test_first_delta_is_zero() {
        let mut sampler = InputSampler::new();
        assert_eq!(sampler.frame_delta(Instant::now()), 0.0);
    }

    #[test]
    fn test_delta_normalized_to_nominal_frames() {
        let mut sampler = InputSampler::new();
        let start = Instant::now();
        sampler.frame_delta(start);
        let delta = sampler.frame_delta(start + Duration::from_secs_f64(1.0 / 30.0));
        assert!((delta - 2.0).abs() < 1e-6);
    }

    #[test]
    fn test_delta_clamped_after_long_pause() {
        let mut sampler = InputSampler::new();
        let start = Instant::now();
        sampler.frame_delta(start);
        let delta = sampler.frame_delta(start + Duration::from_secs(5));
        assert!((delta - 4.0).abs() < 1e-9);
        assert_eq!(normalize_delta(-1.0), 0.0);
    }

    #[test]
    fn test_pointer_leave_keeps_position() {
        let mut sampler = InputSampler::new();
        sampler.pointer_moved(12.0, 34.0);
        assert!(sampler.pointer().inside);
        sampler.pointer_left();
        let pointer = sampler.pointer();
        assert!(!pointer.inside);
        assert_eq!((pointer.x, pointer.y), (12.0, 34.0));
    }
}
