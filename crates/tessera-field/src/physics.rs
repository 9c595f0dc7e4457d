//! Rotational physics of a single tile.

use tessera_core::FieldConfig;

/// Tuned spin constants, per nominal frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpinParams {
    /// Angular velocity a hovered tile approaches.
    pub target: f64,
    /// Fraction of the gap to `target` closed per nominal frame.
    pub blend: f64,
    /// Fraction of velocity retained per nominal frame when idle.
    pub damping: f64,
}

impl From<&FieldConfig> for SpinParams {
    fn from(config: &FieldConfig) -> Self {
        Self {
            target: config.target_spin,
            blend: config.hover_blend,
            damping: config.damping,
        }
    }
}

/// Persistent angle and angular velocity of one tile.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct TileState {
    /// Radians.
    pub angle: f64,
    /// Radians per nominal frame.
    pub velocity: f64,
}

impl TileState {
    /// Advance by `dt` nominal frames.
    ///
    /// Both branches are exponential in `dt` and the angle takes the exact
    /// integral of velocity over the step, so the outcome depends only on
    /// the total time elapsed and not on how it was split into frames.
    pub fn step(&mut self, hovered: bool, dt: f64, params: &SpinParams) {
        if dt <= 0.0 {
            return;
        }

        if hovered {
            let retain = 1.0 - params.blend;
            let gap = self.velocity - params.target;
            self.angle += params.target * dt + gap * decay_integral(retain, dt);
            self.velocity = params.target + gap * retain.powf(dt);
        } else {
            self.angle += self.velocity * decay_integral(params.damping, dt);
            self.velocity *= params.damping.powf(dt);
        }
    }
}

/// Integral of `retain^s` over `s` in `0..dt`.
fn decay_integral(retain: f64, dt: f64) -> f64 {
    let rate = retain.ln();
    if rate.abs() < 1e-12 {
        dt
    } else {
        (retain.powf(dt) - 1.0) / rate
    }
}
