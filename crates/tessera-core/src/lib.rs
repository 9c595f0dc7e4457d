//! Core types shared by the tessera engine and application.

use serde::{Deserialize, Serialize};

/// Rotation applied to the whole lattice about the surface center (-45°).
pub const LATTICE_ROTATION: f64 = -std::f64::consts::FRAC_PI_4;

/// Nominal update rate that physics constants are expressed against.
pub const NOMINAL_FPS: f64 = 60.0;

/// Longest wall-clock gap a single frame may integrate, in seconds.
pub const MAX_FRAME_SECONDS: f64 = 1.0 / 15.0;

/// Tracked tile records above which invisible entries are purged.
pub const RETENTION_CEILING: usize = 800;

/// Integer coordinate of a cell in the infinite rotated lattice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TileId {
    pub x: i64,
    pub y: i64,
}

impl TileId {
    pub const fn new(x: i64, y: i64) -> Self {
        Self { x, y }
    }
}

/// Last known pointer position in surface-logical coordinates.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PointerSample {
    pub x: f64,
    pub y: f64,
    /// Whether the pointer is currently over the surface.
    pub inside: bool,
}

/// Straight-alpha RGBA color.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: f32,
}

impl Rgba {
    pub const TRANSPARENT: Rgba = Rgba::new(0, 0, 0, 0.0);
    pub const BLACK: Rgba = Rgba::opaque(0, 0, 0);

    pub const fn new(r: u8, g: u8, b: u8, a: f32) -> Self {
        Self { r, g, b, a }
    }

    pub const fn opaque(r: u8, g: u8, b: u8) -> Self {
        Self::new(r, g, b, 1.0)
    }

    /// Same color with alpha multiplied by `factor`.
    pub fn fade(self, factor: f32) -> Self {
        Self {
            a: (self.a * factor).clamp(0.0, 1.0),
            ..self
        }
    }

    /// Linear interpolation between two colors, `t` in 0.0-1.0.
    pub fn lerp(self, other: Rgba, t: f32) -> Self {
        let t = t.clamp(0.0, 1.0);
        let mix = |a: u8, b: u8| (a as f32 + (b as f32 - a as f32) * t).round() as u8;
        Self {
            r: mix(self.r, other.r),
            g: mix(self.g, other.g),
            b: mix(self.b, other.b),
            a: self.a + (other.a - self.a) * t,
        }
    }
}

/// Animation speed presets.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnimationSpeed {
    Slow,
    #[default]
    Medium,
    Fast,
}

impl AnimationSpeed {
    /// Cycle to the next speed.
    pub fn next(self) -> Self {
        match self {
            AnimationSpeed::Slow => AnimationSpeed::Medium,
            AnimationSpeed::Medium => AnimationSpeed::Fast,
            AnimationSpeed::Fast => AnimationSpeed::Slow,
        }
    }

    /// Multiplier applied to the configured scroll speed.
    pub fn scroll_multiplier(self) -> f64 {
        match self {
            AnimationSpeed::Slow => 0.5,
            AnimationSpeed::Medium => 1.0,
            AnimationSpeed::Fast => 2.0,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            AnimationSpeed::Slow => "slow",
            AnimationSpeed::Medium => "medium",
            AnimationSpeed::Fast => "fast",
        }
    }
}

/// Background color themes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColorTheme {
    #[default]
    Dusk,
    Ocean,
    Ember,
    Forest,
    Mono,
}

impl ColorTheme {
    /// Cycle to the next theme.
    pub fn next(self) -> Self {
        match self {
            ColorTheme::Dusk => ColorTheme::Ocean,
            ColorTheme::Ocean => ColorTheme::Ember,
            ColorTheme::Ember => ColorTheme::Forest,
            ColorTheme::Forest => ColorTheme::Mono,
            ColorTheme::Mono => ColorTheme::Dusk,
        }
    }

    /// Base hue in degrees, or `None` for the grayscale theme.
    pub fn hue(self) -> Option<f32> {
        match self {
            ColorTheme::Dusk => Some(265.0),
            ColorTheme::Ocean => Some(205.0),
            ColorTheme::Ember => Some(18.0),
            ColorTheme::Forest => Some(140.0),
            ColorTheme::Mono => None,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            ColorTheme::Dusk => "dusk",
            ColorTheme::Ocean => "ocean",
            ColorTheme::Ember => "ember",
            ColorTheme::Forest => "forest",
            ColorTheme::Mono => "mono",
        }
    }
}

/// Tuned constants of the tile field.
///
/// Distances are logical units, rates are per nominal 1/60 s frame.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FieldConfig {
    /// Lattice cell size.
    pub tile_size: f64,
    /// Scroll advance per nominal frame.
    pub scroll_speed: f64,
    /// Lattice offset per unit of pointer displacement from center.
    pub parallax: f64,
    /// Angular velocity a hovered tile approaches (radians per frame).
    pub target_spin: f64,
    /// Fraction of the gap to `target_spin` closed per nominal frame.
    pub hover_blend: f64,
    /// Velocity retained per nominal frame when not hovered.
    pub damping: f64,
    /// Drawn image size relative to `tile_size`.
    pub image_scale: f64,
    /// Relative amplitude of the size pulsation.
    pub pulse_amplitude: f64,
    pub base_opacity: f64,
    pub opacity_swing: f64,
    /// Device pixels per logical unit.
    pub pixel_ratio: f64,
}

impl Default for FieldConfig {
    fn default() -> Self {
        Self {
            tile_size: 64.0,
            scroll_speed: 0.35,
            parallax: 0.02,
            target_spin: 0.12,
            hover_blend: 0.08,
            damping: 0.94,
            image_scale: 0.72,
            pulse_amplitude: 0.08,
            base_opacity: 0.7,
            opacity_swing: 0.25,
            pixel_ratio: 0.25,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_speed_cycle() {
        let speed = AnimationSpeed::default();
        assert_eq!(speed, AnimationSpeed::Medium);
        assert_eq!(speed.next().next().next(), speed);
        assert!(AnimationSpeed::Fast.scroll_multiplier() > AnimationSpeed::Slow.scroll_multiplier());
    }

    #[test]
    fn test_theme_cycle() {
        let mut theme = ColorTheme::Dusk;
        for _ in 0..5 {
            theme = theme.next();
        }
        assert_eq!(theme, ColorTheme::Dusk);
        assert!(ColorTheme::Mono.hue().is_none());
    }

    #[test]
    fn test_field_config_partial_toml() {
        let config: FieldConfig = toml::from_str("tile_size = 32.0\ndamping = 0.9").unwrap();
        assert_eq!(config.tile_size, 32.0);
        assert_eq!(config.damping, 0.9);
        assert_eq!(config.hover_blend, FieldConfig::default().hover_blend);
    }

    #[test]
    fn test_rgba_lerp_and_fade() {
        let mid = Rgba::BLACK.lerp(Rgba::opaque(200, 100, 0), 0.5);
        assert_eq!((mid.r, mid.g, mid.b), (100, 50, 0));
        assert_eq!(Rgba::BLACK.fade(0.25).a, 0.25);
        assert_eq!(Rgba::BLACK.fade(4.0).a, 1.0);
    }
}
