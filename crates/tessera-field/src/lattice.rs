//! Geometry of the rotated, scrolling tile lattice.

use glam::DVec2;
use tessera_core::TileId;

/// Coordinate frame of the lattice for a single frame.
///
/// Grid space is the drawing space before the lattice rotation is applied
/// about the surface center: `screen = R(angle) * (grid - center) + center`.
/// A grid point belongs to tile `floor((grid - parallax + scroll) / tile)`,
/// with `scroll` applied equally on both axes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Lattice {
    center: DVec2,
    forward: DVec2,
    inverse: DVec2,
    tile: f64,
    scroll: f64,
    parallax: DVec2,
}

impl Lattice {
    pub fn new(center: DVec2, angle: f64, tile: f64, scroll: f64, parallax: DVec2) -> Self {
        Self {
            center,
            forward: DVec2::from_angle(angle),
            inverse: DVec2::from_angle(-angle),
            tile,
            scroll,
            parallax,
        }
    }

    pub fn tile_size(&self) -> f64 {
        self.tile
    }

    /// Map a screen point into grid space (inverse rotation about the center).
    pub fn to_grid(&self, screen: DVec2) -> DVec2 {
        self.inverse.rotate(screen - self.center) + self.center
    }

    /// Map a grid point onto the screen.
    pub fn to_screen(&self, grid: DVec2) -> DVec2 {
        self.forward.rotate(grid - self.center) + self.center
    }

    /// Tile containing a grid-space point.
    pub fn identity_at_grid(&self, grid: DVec2) -> TileId {
        let cell = (grid - self.parallax + DVec2::splat(self.scroll)) / self.tile;
        TileId::new(cell.x.floor() as i64, cell.y.floor() as i64)
    }

    /// Tile under a screen-space point.
    pub fn identity_at_screen(&self, screen: DVec2) -> TileId {
        self.identity_at_grid(self.to_grid(screen))
    }

    /// Grid-space center of a tile at the current scroll and parallax.
    #[cfg(test)]
    pub fn center_of(&self, id: TileId) -> DVec2 {
        (DVec2::new(id.x as f64, id.y as f64) + 0.5) * self.tile + self.parallax
            - DVec2::splat(self.scroll)
    }

    /// Grid-space tile centers covering a `width` x `height` surface under any rotation.
    ///
    /// The sweep starts at least one tile beyond the diagonal padding
    /// `ceil(hypot(width, height))` and is phase-aligned with scroll and
    /// parallax so every candidate sits on a tile center.
    pub fn sweep(&self, width: f64, height: f64) -> impl Iterator<Item = DVec2> + use<> {
        let tile = self.tile;
        let pad = width.hypot(height).ceil();
        let margin = ((pad / tile).ceil() + 1.0) * tile;
        let phase = DVec2::new(
            (self.parallax.x - self.scroll).rem_euclid(tile),
            (self.parallax.y - self.scroll).rem_euclid(tile),
        );
        let start = phase - DVec2::splat(margin);
        let columns = ((width + pad - start.x) / tile).ceil().max(0.0) as u32;
        let rows = ((height + pad - start.y) / tile).ceil().max(0.0) as u32;

        (0..rows).flat_map(move |row| {
            (0..columns).map(move |column| {
                start + (DVec2::new(column as f64, row as f64) + 0.5) * tile
            })
        })
    }
}
