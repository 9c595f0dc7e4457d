//! Background loading of the tile image.

use std::fs;
use std::path::{Path, PathBuf};
use std::thread;

use color_eyre::eyre::{WrapErr, eyre};
use tessera_field::{Sprite, SpriteSlot};
use tracing::{info, warn};

/// Start loading the tile image on a background thread.
///
/// The returned slot reports not-ready until the loader stores a sprite.
pub fn spawn(path: Option<PathBuf>) -> SpriteSlot {
    let slot = SpriteSlot::new();
    let target = slot.clone();
    thread::spawn(move || {
        target.set(load(path.as_deref()));
    });
    slot
}

/// Read the configured mask, falling back to the built-in sprite.
fn load(path: Option<&Path>) -> Sprite {
    if let Some(path) = path {
        match read_mask(path) {
            Ok(sprite) => {
                info!(path = %path.display(), "loaded tile sprite");
                return sprite;
            }
            Err(err) => warn!("using built-in sprite: {err:#}"),
        }
    }
    Sprite::builtin()
}

fn read_mask(path: &Path) -> color_eyre::Result<Sprite> {
    let text = fs::read_to_string(path)
        .wrap_err_with(|| format!("failed to read sprite {}", path.display()))?;
    Sprite::from_mask(&text).ok_or_else(|| eyre!("sprite mask {} is empty", path.display()))
}

#[cfg(test)]
mod tests {
    use std::time::{Duration, Instant};

    use tessera_field::ImageResource;

    use super::*;

    #[test]
    fn test_missing_file_falls_back_to_builtin() {
        let sprite = load(Some(Path::new("/nonexistent/sprite.txt")));
        assert_eq!(sprite, Sprite::builtin());
    }

    #[test]
    fn test_reads_mask_file() {
        let path = std::env::temp_dir().join(format!("tessera-sprite-{}.txt", std::process::id()));
        fs::write(&path, "#.#\n.#.\n").unwrap();
        let sprite = load(Some(&path));
        fs::remove_file(&path).ok();
        assert_eq!(sprite.dimensions(), (3, 2));
    }

    #[test]
    fn test_spawn_eventually_ready() {
        let slot = spawn(None);
        let deadline = Instant::now() + Duration::from_secs(5);
        while !slot.is_ready() && Instant::now() < deadline {
            thread::sleep(Duration::from_millis(5));
        }
        assert!(slot.is_ready());
    }
}
