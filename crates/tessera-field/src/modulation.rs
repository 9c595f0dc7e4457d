//! Stateless per-tile modulation (computed from position and time only).

use glam::DVec2;

/// Size multiplier: a slow breathing wave travelling along the lattice diagonal.
pub fn tile_scale(position: DVec2, time: f64, amplitude: f64) -> f64 {
    let phase = (position.x + position.y) * 0.011 + time * 0.035;
    1.0 + amplitude * phase.sin()
}

/// Opacity in 0.0-1.0, drifting independently of the size wave.
pub fn tile_opacity(position: DVec2, time: f64, base: f64, swing: f64) -> f64 {
    let phase = position.x * 0.007 - position.y * 0.013 + time * 0.021;
    (base + swing * phase.sin()).clamp(0.0, 1.0)
}
