//! The tile image and its load-once slot.

use std::sync::{Arc, OnceLock};

use tessera_core::Rgba;

use crate::draw::ImageResource;

/// Built-in tile image: a faceted coin.
pub const BUILTIN_MASK: &str = "\
....oooooo....
..oo######oo..
.o##++++++##o.
.o#+**####+#o.
o#+*#oooo##+#o
o#+#o####o#+#o
o#+#o#....##+o
o#+#o#....##+o
o#+#o####o#+#o
o#+##oooo##+#o
.o#+######+#o.
.o##++++++##o.
..oo######oo..
....oooooo....";

/// Map a mask character to a color; `.` and space are transparent.
fn mask_color(ch: char) -> Rgba {
    match ch {
        '.' | ' ' => Rgba::TRANSPARENT,
        'o' => Rgba::opaque(122, 84, 18),
        '+' => Rgba::opaque(255, 221, 120),
        '*' => Rgba::opaque(255, 250, 235),
        _ => Rgba::opaque(232, 176, 48),
    }
}

/// RGBA bitmap parsed from a text mask, one character per pixel.
#[derive(Debug, Clone, PartialEq)]
pub struct Sprite {
    width: usize,
    height: usize,
    pixels: Vec<Rgba>,
}

impl Sprite {
    /// Parse a mask. Short rows are padded with transparency; blank lines are
    /// ignored. Returns `None` when the mask has no pixels.
    pub fn from_mask(mask: &str) -> Option<Self> {
        let rows: Vec<&str> = mask
            .lines()
            .map(str::trim_end)
            .filter(|line| !line.is_empty())
            .collect();
        let width = rows.iter().map(|row| row.chars().count()).max()?;
        if width == 0 {
            return None;
        }

        let mut pixels = Vec::with_capacity(width * rows.len());
        for row in &rows {
            let mut count = 0;
            for ch in row.chars() {
                pixels.push(mask_color(ch));
                count += 1;
            }
            pixels.extend(std::iter::repeat_n(Rgba::TRANSPARENT, width - count));
        }

        Some(Self {
            width,
            height: rows.len(),
            pixels,
        })
    }

    pub fn builtin() -> Self {
        Self::from_mask(BUILTIN_MASK).unwrap_or(Self {
            width: 1,
            height: 1,
            pixels: vec![mask_color('#')],
        })
    }
}

impl ImageResource for Sprite {
    fn is_ready(&self) -> bool {
        true
    }

    fn dimensions(&self) -> (usize, usize) {
        (self.width, self.height)
    }

    fn pixel(&self, x: usize, y: usize) -> Rgba {
        self.pixels
            .get(y * self.width + x)
            .copied()
            .unwrap_or(Rgba::TRANSPARENT)
    }
}

/// Shared slot filled once by a loader; not ready until then.
#[derive(Debug, Clone, Default)]
pub struct SpriteSlot {
    inner: Arc<OnceLock<Sprite>>,
}

impl SpriteSlot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store the loaded sprite. Returns `false` if the slot was already filled.
    pub fn set(&self, sprite: Sprite) -> bool {
        self.inner.set(sprite).is_ok()
    }
}

impl ImageResource for SpriteSlot {
    fn is_ready(&self) -> bool {
        self.inner.get().is_some()
    }

    fn dimensions(&self) -> (usize, usize) {
        self.inner.get().map_or((0, 0), Sprite::dimensions)
    }

    fn pixel(&self, x: usize, y: usize) -> Rgba {
        self.inner
            .get()
            .map_or(Rgba::TRANSPARENT, |sprite| sprite.pixel(x, y))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_mask_parses() {
        let sprite = Sprite::builtin();
        assert_eq!(sprite.dimensions(), (14, 14));
        assert_eq!(sprite.pixel(0, 0), Rgba::TRANSPARENT);
        assert_eq!(sprite.pixel(4, 0), mask_color('o'));
    }

    #[test]
    fn test_ragged_rows_padded() {
        let sprite = Sprite::from_mask("##\n#\n\n###\n").unwrap();
        assert_eq!(sprite.dimensions(), (3, 3));
        assert_eq!(sprite.pixel(2, 0), Rgba::TRANSPARENT);
        assert_eq!(sprite.pixel(0, 1), mask_color('#'));
        assert_eq!(sprite.pixel(2, 2), mask_color('#'));
    }

    #[test]
    fn test_empty_mask_rejected() {
        assert!(Sprite::from_mask("").is_none());
        assert!(Sprite::from_mask("\n   \n").is_none());
    }

    #[test]
    fn test_slot_ready_after_set() {
        let slot = SpriteSlot::new();
        let shared = slot.clone();
        assert!(!slot.is_ready());
        assert_eq!(slot.dimensions(), (0, 0));
        assert!(shared.set(Sprite::builtin()));
        assert!(slot.is_ready());
        assert_eq!(slot.dimensions(), (14, 14));
        assert!(!shared.set(Sprite::builtin()));
    }
}
