//! Software framebuffer rendered to the terminal with half-block cells.

use glam::{DAffine2, DVec2};
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::Color,
    widgets::Widget,
};
use tessera_core::Rgba;

use crate::draw::{Bounds, DrawContext, ImageResource, Paint};

/// Each terminal cell shows two vertically stacked pixels.
const HALF_BLOCK: &str = "▀";

/// Opaque RGB pixel buffer.
///
/// A terminal of `cols x rows` cells maps to a raster of `cols x 2*rows`
/// square-ish pixels.
#[derive(Debug, Clone)]
pub struct Raster {
    width: usize,
    height: usize,
    pixels: Vec<Rgba>,
    clear_color: Rgba,
}

impl Raster {
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            pixels: vec![Rgba::BLACK; width * height],
            clear_color: Rgba::BLACK,
        }
    }

    /// Raster covering a terminal area of `cols x rows` cells.
    pub fn for_cells(cols: u16, rows: u16) -> Self {
        Self::new(cols as usize, rows as usize * 2)
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// Reallocate for new dimensions; contents reset to the clear color.
    pub fn resize(&mut self, width: usize, height: usize) {
        if width == self.width && height == self.height {
            return;
        }
        self.width = width;
        self.height = height;
        self.pixels = vec![self.clear_color; width * height];
    }

    pub fn pixel(&self, x: usize, y: usize) -> Option<Rgba> {
        (x < self.width && y < self.height).then(|| self.pixels[y * self.width + x])
    }

    /// Start drawing with an identity transform and full alpha.
    pub fn painter(&mut self) -> Painter<'_> {
        Painter {
            raster: self,
            state: PaintState::default(),
            stack: Vec::new(),
        }
    }
}

impl Widget for &Raster {
    fn render(self, area: Rect, buf: &mut Buffer) {
        for row in 0..area.height {
            for col in 0..area.width {
                let (x, y) = (col as usize, row as usize * 2);
                let (Some(top), Some(bottom)) = (self.pixel(x, y), self.pixel(x, y + 1)) else {
                    continue;
                };
                if let Some(cell) = buf.cell_mut((area.x + col, area.y + row)) {
                    cell.set_symbol(HALF_BLOCK)
                        .set_fg(Color::Rgb(top.r, top.g, top.b))
                        .set_bg(Color::Rgb(bottom.r, bottom.g, bottom.b));
                }
            }
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct PaintState {
    transform: DAffine2,
    alpha: f64,
}

impl Default for PaintState {
    fn default() -> Self {
        Self {
            transform: DAffine2::IDENTITY,
            alpha: 1.0,
        }
    }
}

/// [`DrawContext`] painting into a [`Raster`].
///
/// Pixels are sampled at their centers, no anti-aliasing.
#[derive(Debug)]
pub struct Painter<'a> {
    raster: &'a mut Raster,
    state: PaintState,
    stack: Vec<PaintState>,
}

impl Painter<'_> {
    /// Visit every raster pixel whose center falls inside `rect` in user space.
    ///
    /// `shade` receives the user-space position and the current pixel color
    /// and returns the new color.
    fn cover(&mut self, rect: Bounds, mut shade: impl FnMut(DVec2, Rgba) -> Rgba) {
        let transform = self.state.transform;
        if transform.matrix2.determinant().abs() < f64::EPSILON {
            return;
        }
        let inverse = transform.inverse();

        let corners = rect.corners().map(|corner| transform.transform_point2(corner));
        let min = corners.iter().fold(DVec2::INFINITY, |acc, c| acc.min(*c));
        let max = corners.iter().fold(DVec2::NEG_INFINITY, |acc, c| acc.max(*c));
        if !min.is_finite() || !max.is_finite() {
            return;
        }

        let x0 = min.x.floor().max(0.0) as usize;
        let y0 = min.y.floor().max(0.0) as usize;
        let x1 = (max.x.ceil().max(0.0) as usize).min(self.raster.width);
        let y1 = (max.y.ceil().max(0.0) as usize).min(self.raster.height);

        for y in y0..y1 {
            for x in x0..x1 {
                let local = inverse.transform_point2(DVec2::new(x as f64 + 0.5, y as f64 + 0.5));
                if rect.contains(local) {
                    let index = y * self.raster.width + x;
                    self.raster.pixels[index] = shade(local, self.raster.pixels[index]);
                }
            }
        }
    }
}

/// Source-over blend of `src` (with extra `alpha`) onto an opaque pixel.
fn blend(dst: Rgba, src: Rgba, alpha: f64) -> Rgba {
    let coverage = src.a * alpha as f32;
    if coverage <= 0.0 {
        return dst;
    }
    dst.lerp(Rgba { a: 1.0, ..src }, coverage)
}

impl DrawContext for Painter<'_> {
    fn clear_rect(&mut self, rect: Bounds) {
        let clear = self.raster.clear_color;
        self.cover(rect, |_, _| clear);
    }

    fn fill_rect(&mut self, rect: Bounds, paint: &Paint) {
        let alpha = self.state.alpha;
        self.cover(rect, |local, dst| blend(dst, paint.color_at(local), alpha));
    }

    fn draw_image(&mut self, image: &dyn ImageResource, rect: Bounds) {
        if !image.is_ready() || rect.width <= 0.0 || rect.height <= 0.0 {
            return;
        }
        let (width, height) = image.dimensions();
        if width == 0 || height == 0 {
            return;
        }
        let alpha = self.state.alpha;
        self.cover(rect, |local, dst| {
            let u = ((local.x - rect.x) / rect.width * width as f64) as usize;
            let v = ((local.y - rect.y) / rect.height * height as f64) as usize;
            blend(dst, image.pixel(u.min(width - 1), v.min(height - 1)), alpha)
        });
    }

    fn save(&mut self) {
        self.stack.push(self.state);
    }

    fn restore(&mut self) {
        if let Some(state) = self.stack.pop() {
            self.state = state;
        }
    }

    fn translate(&mut self, dx: f64, dy: f64) {
        self.state.transform = self.state.transform * DAffine2::from_translation(DVec2::new(dx, dy));
    }

    fn rotate(&mut self, radians: f64) {
        self.state.transform = self.state.transform * DAffine2::from_angle(radians);
    }

    fn scale(&mut self, sx: f64, sy: f64) {
        self.state.transform = self.state.transform * DAffine2::from_scale(DVec2::new(sx, sy));
    }

    fn set_global_alpha(&mut self, alpha: f64) {
        self.state.alpha = alpha.clamp(0.0, 1.0);
    }
}
