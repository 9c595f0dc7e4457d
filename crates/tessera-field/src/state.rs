//! Tile field engine state.

use std::collections::{HashMap, HashSet};
use std::time::Instant;

use glam::DVec2;
use tessera_core::{
    AnimationSpeed, ColorTheme, FieldConfig, LATTICE_ROTATION, PointerSample, RETENTION_CEILING,
    Rgba, TileId,
};
use tracing::{debug, trace};

use crate::clock::InputSampler;
use crate::color::background_stops;
use crate::draw::{Bounds, ColorStop, DrawContext, ImageResource, Paint};
use crate::lattice::Lattice;
use crate::modulation::{tile_opacity, tile_scale};
use crate::physics::{SpinParams, TileState};

/// Render target dimensions.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Surface {
    pixel_width: u32,
    pixel_height: u32,
    /// Device pixels per logical unit.
    pixel_ratio: f64,
}

impl Surface {
    pub fn new(pixel_width: u32, pixel_height: u32, pixel_ratio: f64) -> Self {
        Self {
            pixel_width,
            pixel_height,
            pixel_ratio,
        }
    }

    pub fn pixel_width(&self) -> u32 {
        self.pixel_width
    }

    pub fn pixel_height(&self) -> u32 {
        self.pixel_height
    }

    pub fn pixel_ratio(&self) -> f64 {
        self.pixel_ratio
    }

    pub fn logical_width(&self) -> f64 {
        self.pixel_width as f64 / self.pixel_ratio
    }

    pub fn logical_height(&self) -> f64 {
        self.pixel_height as f64 / self.pixel_ratio
    }

    pub fn center(&self) -> DVec2 {
        DVec2::new(self.logical_width(), self.logical_height()) / 2.0
    }

    /// Whether a logical point lies on the surface (half-open).
    pub fn contains(&self, point: DVec2) -> bool {
        point.x >= 0.0
            && point.y >= 0.0
            && point.x < self.logical_width()
            && point.y < self.logical_height()
    }
}

/// What happened during one [`TileField::advance`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FrameReport {
    pub hovered: Option<TileId>,
    /// Tiles on screen this frame.
    pub visible: usize,
    /// Tile records held after eviction.
    pub tracked: usize,
    pub evicted: usize,
    /// Tile images drawn (0 while the image is not ready).
    pub drawn: usize,
}

/// A tile found on screen during the sweep.
#[derive(Debug, Clone, Copy)]
struct SweptTile {
    id: TileId,
    /// Center in grid space.
    grid: DVec2,
}

/// The animated tile field.
///
/// Owns the surface, pointer sample, animation clock and the table of
/// per-tile physical state.
#[derive(Debug)]
pub struct TileField {
    config: FieldConfig,
    spin: SpinParams,
    surface: Surface,
    input: InputSampler,
    speed: AnimationSpeed,
    theme: ColorTheme,
    /// Animation clock in nominal frames.
    time: f64,
    /// Accumulated scroll distance in logical units.
    scroll: f64,
    tiles: HashMap<TileId, TileState>,
    visible: HashSet<TileId>,
    swept: Vec<SweptTile>,
}

impl TileField {
    pub fn new(config: FieldConfig, pixel_width: u32, pixel_height: u32) -> Self {
        Self {
            spin: SpinParams::from(&config),
            surface: Surface::new(pixel_width, pixel_height, config.pixel_ratio),
            config,
            input: InputSampler::new(),
            speed: AnimationSpeed::default(),
            theme: ColorTheme::default(),
            time: 0.0,
            scroll: 0.0,
            tiles: HashMap::new(),
            visible: HashSet::new(),
            swept: Vec::new(),
        }
    }

    pub fn config(&self) -> &FieldConfig {
        &self.config
    }

    pub fn surface(&self) -> Surface {
        self.surface
    }

    /// Re-provision the surface. Tile state is kept.
    pub fn resize(&mut self, pixel_width: u32, pixel_height: u32) {
        if (pixel_width, pixel_height) == (self.surface.pixel_width, self.surface.pixel_height) {
            return;
        }
        debug!(pixel_width, pixel_height, "surface resized");
        self.surface = Surface::new(pixel_width, pixel_height, self.config.pixel_ratio);
    }

    pub fn pointer_moved(&mut self, x: f64, y: f64) {
        self.input.pointer_moved(x, y);
    }

    pub fn pointer_left(&mut self) {
        self.input.pointer_left();
    }

    pub fn pointer(&self) -> PointerSample {
        self.input.pointer()
    }

    pub fn speed(&self) -> AnimationSpeed {
        self.speed
    }

    pub fn set_speed(&mut self, speed: AnimationSpeed) {
        self.speed = speed;
    }

    pub fn theme(&self) -> ColorTheme {
        self.theme
    }

    pub fn set_theme(&mut self, theme: ColorTheme) {
        self.theme = theme;
    }

    /// Animation clock in nominal frames.
    pub fn time(&self) -> f64 {
        self.time
    }

    pub fn scroll(&self) -> f64 {
        self.scroll
    }

    pub fn tile_state(&self, id: TileId) -> Option<TileState> {
        self.tiles.get(&id).copied()
    }

    pub fn is_visible(&self, id: TileId) -> bool {
        self.visible.contains(&id)
    }

    /// Pointer position when it is over the current surface.
    ///
    /// A pointer left behind by a shrinking resize counts as outside.
    fn pointer_on_surface(&self) -> Option<DVec2> {
        let pointer = self.input.pointer();
        let point = DVec2::new(pointer.x, pointer.y);
        (pointer.inside && self.surface.contains(point)).then_some(point)
    }

    /// Lattice frame for the current scroll and pointer.
    pub fn lattice(&self) -> Lattice {
        let center = self.surface.center();
        let parallax = self
            .pointer_on_surface()
            .map_or(DVec2::ZERO, |point| (point - center) * self.config.parallax);
        Lattice::new(
            center,
            LATTICE_ROTATION,
            self.config.tile_size,
            self.scroll,
            parallax,
        )
    }

    /// Tile under the pointer, if the pointer is over the surface.
    pub fn hovered_tile(&self) -> Option<TileId> {
        self.pointer_on_surface()
            .map(|point| self.lattice().identity_at_screen(point))
    }

    /// Run one frame: advance the clock, sweep the visible window, integrate
    /// tile physics, draw, then evict off-screen state when over the ceiling.
    ///
    /// Physics and bookkeeping run even when `image` is not ready; only the
    /// tile draws are skipped.
    pub fn advance(
        &mut self,
        now: Instant,
        image: &dyn ImageResource,
        ctx: &mut dyn DrawContext,
    ) -> FrameReport {
        let dt = self.input.frame_delta(now);
        self.time += dt;
        self.scroll += dt * self.config.scroll_speed * self.speed.scroll_multiplier();

        let lattice = self.lattice();
        let hovered = self.hovered_tile();
        self.sweep(&lattice);

        for tile in &self.swept {
            let is_hovered = hovered == Some(tile.id);
            self.tiles
                .entry(tile.id)
                .or_default()
                .step(is_hovered, dt, &self.spin);
        }

        let drawn = self.render(image, ctx);
        let evicted = self.evict();

        let report = FrameReport {
            hovered,
            visible: self.visible.len(),
            tracked: self.tiles.len(),
            evicted,
            drawn,
        };
        trace!(?report, dt, "frame");
        report
    }

    /// Collect tiles whose screen position falls within the surface padded
    /// by one tile on every side.
    fn sweep(&mut self, lattice: &Lattice) {
        self.swept.clear();
        self.visible.clear();

        let width = self.surface.logical_width();
        let height = self.surface.logical_height();
        let margin = lattice.tile_size();

        for grid in lattice.sweep(width, height) {
            let screen = lattice.to_screen(grid);
            if screen.x < -margin
                || screen.y < -margin
                || screen.x > width + margin
                || screen.y > height + margin
            {
                continue;
            }
            let id = lattice.identity_at_grid(grid);
            if self.visible.insert(id) {
                self.swept.push(SweptTile { id, grid });
            }
        }
    }

    fn render(&self, image: &dyn ImageResource, ctx: &mut dyn DrawContext) -> usize {
        let width = self.surface.logical_width();
        let height = self.surface.logical_height();
        let full = Bounds::new(0.0, 0.0, width, height);
        let center = self.surface.center();
        let ratio = self.surface.pixel_ratio();

        ctx.save();
        ctx.scale(ratio, ratio);
        ctx.clear_rect(full);

        let [top, bottom] = background_stops(self.theme);
        ctx.fill_rect(
            full,
            &Paint::Linear {
                start: DVec2::ZERO,
                end: DVec2::new(0.0, height),
                stops: vec![ColorStop::new(0.0, top), ColorStop::new(1.0, bottom)],
            },
        );

        let mut drawn = 0;
        if image.is_ready() {
            ctx.save();
            ctx.translate(center.x, center.y);
            ctx.rotate(LATTICE_ROTATION);
            ctx.translate(-center.x, -center.y);

            for tile in &self.swept {
                let Some(state) = self.tiles.get(&tile.id) else {
                    continue;
                };
                let size = self.config.tile_size
                    * self.config.image_scale
                    * tile_scale(tile.grid, self.time, self.config.pulse_amplitude);
                let alpha = tile_opacity(
                    tile.grid,
                    self.time,
                    self.config.base_opacity,
                    self.config.opacity_swing,
                );

                ctx.save();
                ctx.translate(tile.grid.x, tile.grid.y);
                ctx.rotate(state.angle);
                ctx.set_global_alpha(alpha);
                ctx.draw_image(image, Bounds::centered(size));
                ctx.restore();
                drawn += 1;
            }
            ctx.restore();
        }

        let diagonal = width.hypot(height);
        ctx.fill_rect(
            full,
            &Paint::Radial {
                center,
                inner: diagonal * 0.3,
                outer: diagonal * 0.6,
                stops: vec![
                    ColorStop::new(0.0, Rgba::TRANSPARENT),
                    ColorStop::new(1.0, Rgba::BLACK.fade(0.55)),
                ],
            },
        );
        ctx.restore();

        drawn
    }

    /// Drop every record not visible this frame once the table exceeds
    /// [`RETENTION_CEILING`].
    fn evict(&mut self) -> usize {
        if self.tiles.len() <= RETENTION_CEILING {
            return 0;
        }
        let before = self.tiles.len();
        let visible = &self.visible;
        self.tiles.retain(|id, _| visible.contains(id));
        let evicted = before - self.tiles.len();
        debug!(evicted, remaining = self.tiles.len(), "evicted off-screen tile state");
        evicted
    }
}
