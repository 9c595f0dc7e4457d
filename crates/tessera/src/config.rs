//! Configuration file loading.

use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use color_eyre::eyre::{WrapErr, eyre};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use tessera_core::{AnimationSpeed, ColorTheme, FieldConfig};

/// Environment variable overriding the config file location.
const CONFIG_ENV: &str = "TESSERA_CONFIG";

/// Smallest accepted `field.tile_size`, in logical units.
const MIN_TILE_SIZE: f64 = 8.0;

/// Application settings read from `config.toml`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub speed: AnimationSpeed,
    pub theme: ColorTheme,
    /// Target frames per second.
    pub fps: u32,
    /// Optional text mask to use as the tile image.
    pub sprite: Option<PathBuf>,
    /// Default `tracing` filter when `TESSERA_LOG` is unset.
    pub log_filter: String,
    pub field: FieldConfig,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            speed: AnimationSpeed::default(),
            theme: ColorTheme::default(),
            fps: 60,
            sprite: None,
            log_filter: "info".to_string(),
            field: FieldConfig::default(),
        }
    }
}

impl Settings {
    /// Load from the default location; a missing file yields defaults.
    pub fn load() -> color_eyre::Result<Self> {
        match config_path() {
            Some(path) => Self::load_from(&path),
            None => Ok(Self::default()),
        }
    }

    pub fn load_from(path: &Path) -> color_eyre::Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let text = fs::read_to_string(path)
            .wrap_err_with(|| format!("failed to read config file {}", path.display()))?;
        Self::parse(&text)
            .wrap_err_with(|| format!("invalid config file {}", path.display()))
    }

    pub fn parse(text: &str) -> color_eyre::Result<Self> {
        let settings: Self = toml::from_str(text)?;
        settings.validate()?;
        Ok(settings)
    }

    /// Reject field values the engine cannot animate.
    fn validate(&self) -> color_eyre::Result<()> {
        let field = &self.field;
        let finite = [
            ("scroll_speed", field.scroll_speed),
            ("parallax", field.parallax),
            ("target_spin", field.target_spin),
            ("image_scale", field.image_scale),
            ("pulse_amplitude", field.pulse_amplitude),
            ("base_opacity", field.base_opacity),
            ("opacity_swing", field.opacity_swing),
        ];
        if let Some((name, value)) = finite.iter().find(|(_, value)| !value.is_finite()) {
            return Err(eyre!("field.{name} must be a finite number, got {value}"));
        }
        if !(field.tile_size.is_finite() && field.tile_size >= MIN_TILE_SIZE) {
            return Err(eyre!(
                "field.tile_size must be at least {MIN_TILE_SIZE}, got {}",
                field.tile_size
            ));
        }
        if !(field.pixel_ratio.is_finite() && field.pixel_ratio > 0.0) {
            return Err(eyre!(
                "field.pixel_ratio must be positive, got {}",
                field.pixel_ratio
            ));
        }
        for (name, value) in [
            ("hover_blend", field.hover_blend),
            ("damping", field.damping),
        ] {
            if !(value > 0.0 && value <= 1.0) {
                return Err(eyre!("field.{name} must be in (0, 1], got {value}"));
            }
        }
        Ok(())
    }

    /// Time allotted to one frame.
    pub fn frame_budget(&self) -> Duration {
        Duration::from_secs_f64(1.0 / self.fps.clamp(1, 240) as f64)
    }
}

/// Config file path: `$TESSERA_CONFIG`, else the platform config directory.
pub fn config_path() -> Option<PathBuf> {
    env::var_os(CONFIG_ENV)
        .map(PathBuf::from)
        .or_else(|| project_dirs().map(|dirs| dirs.config_dir().join("config.toml")))
}

pub fn project_dirs() -> Option<ProjectDirs> {
    ProjectDirs::from("", "", "tessera")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_config_uses_defaults() {
        assert_eq!(Settings::parse("").unwrap(), Settings::default());
    }

    #[test]
    fn test_parse_full_config() {
        let settings = Settings::parse(
            r#"
            speed = "fast"
            theme = "ember"
            fps = 30
            sprite = "/tmp/coin.txt"
            log_filter = "tessera_field=debug"

            [field]
            tile_size = 48.0
            parallax = 0.0
            "#,
        )
        .unwrap();

        assert_eq!(settings.speed, AnimationSpeed::Fast);
        assert_eq!(settings.theme, ColorTheme::Ember);
        assert_eq!(settings.fps, 30);
        assert_eq!(settings.sprite, Some(PathBuf::from("/tmp/coin.txt")));
        assert_eq!(settings.field.tile_size, 48.0);
        assert_eq!(settings.field.parallax, 0.0);
        assert_eq!(settings.field.damping, FieldConfig::default().damping);
    }

    #[test]
    fn test_invalid_config_is_error() {
        assert!(Settings::parse("speed = \"warp\"").is_err());
        assert!(Settings::parse("fps = ").is_err());
    }

    #[test]
    fn test_out_of_range_field_rejected() {
        for (text, name) in [
            ("[field]\nhover_blend = 1.5", "hover_blend"),
            ("[field]\nhover_blend = 0.0", "hover_blend"),
            ("[field]\ndamping = 1.2", "damping"),
            ("[field]\ntile_size = 0.05", "tile_size"),
            ("[field]\ntile_size = -64.0", "tile_size"),
            ("[field]\npixel_ratio = 0.0", "pixel_ratio"),
            ("[field]\nscroll_speed = nan", "scroll_speed"),
        ] {
            let err = Settings::parse(text).unwrap_err();
            assert!(err.to_string().contains(name), "{text}: {err}");
        }
    }

    #[test]
    fn test_boundary_field_values_accepted() {
        let settings = Settings::parse(
            "[field]\nhover_blend = 1.0\ndamping = 1.0\ntile_size = 8.0\npixel_ratio = 2.0",
        )
        .unwrap();
        assert_eq!(settings.field.hover_blend, 1.0);
        assert_eq!(settings.field.tile_size, 8.0);
    }

    #[test]
    fn test_invalid_file_names_path() {
        let path = env::temp_dir().join(format!("tessera-bad-{}.toml", std::process::id()));
        fs::write(&path, "[field]\ndamping = 3.0").unwrap();
        let err = Settings::load_from(&path).unwrap_err();
        fs::remove_file(&path).unwrap();
        assert!(err.to_string().contains("invalid config file"));
        assert!(format!("{err:?}").contains("damping"));
    }

    #[test]
    fn test_missing_file_yields_defaults() {
        let path = Path::new("/nonexistent/tessera/config.toml");
        assert_eq!(Settings::load_from(path).unwrap(), Settings::default());
    }

    #[test]
    fn test_frame_budget_clamped() {
        let settings = Settings {
            fps: 0,
            ..Settings::default()
        };
        assert_eq!(settings.frame_budget(), Duration::from_secs(1));
        assert_eq!(Settings::default().frame_budget(), Duration::from_secs_f64(1.0 / 60.0));
    }
}
