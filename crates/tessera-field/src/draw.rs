//! Drawing seam between the engine and a render surface.

use glam::DVec2;
use tessera_core::Rgba;

/// Axis-aligned rectangle in the current user space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Bounds {
    pub const fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Square of side `size` centered on the origin.
    pub fn centered(size: f64) -> Self {
        Self::new(-size / 2.0, -size / 2.0, size, size)
    }

    pub fn corners(&self) -> [DVec2; 4] {
        [
            DVec2::new(self.x, self.y),
            DVec2::new(self.x + self.width, self.y),
            DVec2::new(self.x, self.y + self.height),
            DVec2::new(self.x + self.width, self.y + self.height),
        ]
    }

    /// Half-open containment test.
    pub fn contains(&self, point: DVec2) -> bool {
        point.x >= self.x
            && point.y >= self.y
            && point.x < self.x + self.width
            && point.y < self.y + self.height
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ColorStop {
    /// Position along the gradient, 0.0-1.0.
    pub offset: f64,
    pub color: Rgba,
}

impl ColorStop {
    pub const fn new(offset: f64, color: Rgba) -> Self {
        Self { offset, color }
    }
}

/// Fill style for [`DrawContext::fill_rect`].
#[derive(Debug, Clone, PartialEq)]
pub enum Paint {
    Solid(Rgba),
    Linear {
        start: DVec2,
        end: DVec2,
        stops: Vec<ColorStop>,
    },
    Radial {
        center: DVec2,
        inner: f64,
        outer: f64,
        stops: Vec<ColorStop>,
    },
}

impl Paint {
    /// Color of the paint at a user-space point.
    pub fn color_at(&self, point: DVec2) -> Rgba {
        match self {
            Paint::Solid(color) => *color,
            Paint::Linear { start, end, stops } => {
                let axis = *end - *start;
                let length_sq = axis.length_squared();
                let t = if length_sq > 0.0 {
                    (point - *start).dot(axis) / length_sq
                } else {
                    0.0
                };
                sample_stops(stops, t)
            }
            Paint::Radial {
                center,
                inner,
                outer,
                stops,
            } => {
                let span = outer - inner;
                let t = if span > 0.0 {
                    (point.distance(*center) - inner) / span
                } else {
                    0.0
                };
                sample_stops(stops, t)
            }
        }
    }
}

fn sample_stops(stops: &[ColorStop], t: f64) -> Rgba {
    let t = t.clamp(0.0, 1.0);
    let (Some(first), Some(last)) = (stops.first(), stops.last()) else {
        return Rgba::TRANSPARENT;
    };
    if t <= first.offset {
        return first.color;
    }
    stops
        .windows(2)
        .find(|pair| t <= pair[1].offset)
        .map(|pair| {
            let span = pair[1].offset - pair[0].offset;
            let local = if span > 0.0 {
                (t - pair[0].offset) / span
            } else {
                1.0
            };
            pair[0].color.lerp(pair[1].color, local as f32)
        })
        .unwrap_or(last.color)
}

/// An image the engine can draw once it has finished loading.
pub trait ImageResource {
    fn is_ready(&self) -> bool;

    /// Width and height in image pixels; `(0, 0)` while not ready.
    fn dimensions(&self) -> (usize, usize);

    fn pixel(&self, x: usize, y: usize) -> Rgba;
}

/// Canvas-style 2D drawing context with a save/restore transform stack.
pub trait DrawContext {
    /// Reset the covered area to the surface clear color.
    fn clear_rect(&mut self, rect: Bounds);
    fn fill_rect(&mut self, rect: Bounds, paint: &Paint);
    /// Draw `image` stretched over `rect`.
    fn draw_image(&mut self, image: &dyn ImageResource, rect: Bounds);
    fn save(&mut self);
    fn restore(&mut self);
    fn translate(&mut self, dx: f64, dy: f64);
    /// Rotate user space by `radians` (clockwise on a y-down surface).
    fn rotate(&mut self, radians: f64);
    fn scale(&mut self, sx: f64, sy: f64);
    fn set_global_alpha(&mut self, alpha: f64);
}

/// A single call recorded by [`RecordingContext`].
#[derive(Debug, Clone, PartialEq)]
pub enum DrawOp {
    Clear(Bounds),
    Fill(Bounds, Paint),
    Image { rect: Bounds, alpha: f64 },
    Save,
    Restore,
    Translate(f64, f64),
    Rotate(f64),
    Scale(f64, f64),
    Alpha(f64),
}

/// Draw context that records calls instead of painting; used for headless runs.
#[derive(Debug, Clone)]
pub struct RecordingContext {
    pub ops: Vec<DrawOp>,
    alpha: f64,
    alpha_stack: Vec<f64>,
}

impl Default for RecordingContext {
    fn default() -> Self {
        Self::new()
    }
}

impl RecordingContext {
    pub fn new() -> Self {
        Self {
            ops: Vec::new(),
            alpha: 1.0,
            alpha_stack: Vec::new(),
        }
    }

    pub fn images(&self) -> impl Iterator<Item = (&Bounds, f64)> {
        self.ops.iter().filter_map(|op| match op {
            DrawOp::Image { rect, alpha } => Some((rect, *alpha)),
            _ => None,
        })
    }

    pub fn clear(&mut self) {
        self.ops.clear();
        self.alpha = 1.0;
        self.alpha_stack.clear();
    }
}

impl DrawContext for RecordingContext {
    fn clear_rect(&mut self, rect: Bounds) {
        self.ops.push(DrawOp::Clear(rect));
    }

    fn fill_rect(&mut self, rect: Bounds, paint: &Paint) {
        self.ops.push(DrawOp::Fill(rect, paint.clone()));
    }

    fn draw_image(&mut self, image: &dyn ImageResource, rect: Bounds) {
        if image.is_ready() {
            self.ops.push(DrawOp::Image {
                rect,
                alpha: self.alpha,
            });
        }
    }

    fn save(&mut self) {
        self.alpha_stack.push(self.alpha);
        self.ops.push(DrawOp::Save);
    }

    fn restore(&mut self) {
        if let Some(alpha) = self.alpha_stack.pop() {
            self.alpha = alpha;
        }
        self.ops.push(DrawOp::Restore);
    }

    fn translate(&mut self, dx: f64, dy: f64) {
        self.ops.push(DrawOp::Translate(dx, dy));
    }

    fn rotate(&mut self, radians: f64) {
        self.ops.push(DrawOp::Rotate(radians));
    }

    fn scale(&mut self, sx: f64, sy: f64) {
        self.ops.push(DrawOp::Scale(sx, sy));
    }

    fn set_global_alpha(&mut self, alpha: f64) {
        self.alpha = alpha.clamp(0.0, 1.0);
        self.ops.push(DrawOp::Alpha(self.alpha));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const RED: Rgba = Rgba::opaque(255, 0, 0);
    const BLUE: Rgba = Rgba::opaque(0, 0, 255);

    #[test]
    fn test_linear_gradient_endpoints_and_middle() {
        let paint = Paint::Linear {
            start: DVec2::ZERO,
            end: DVec2::new(0.0, 10.0),
            stops: vec![ColorStop::new(0.0, RED), ColorStop::new(1.0, BLUE)],
        };
        assert_eq!(paint.color_at(DVec2::new(3.0, -5.0)), RED);
        assert_eq!(paint.color_at(DVec2::new(3.0, 50.0)), BLUE);
        let middle = paint.color_at(DVec2::new(0.0, 5.0));
        assert_eq!((middle.r, middle.b), (128, 128));
    }

    #[test]
    fn test_radial_gradient_by_distance() {
        let paint = Paint::Radial {
            center: DVec2::ZERO,
            inner: 2.0,
            outer: 4.0,
            stops: vec![ColorStop::new(0.0, RED), ColorStop::new(1.0, BLUE)],
        };
        assert_eq!(paint.color_at(DVec2::new(1.0, 0.0)), RED);
        assert_eq!(paint.color_at(DVec2::new(0.0, 9.0)), BLUE);
    }

    #[test]
    fn test_empty_stops_transparent() {
        let paint = Paint::Linear {
            start: DVec2::ZERO,
            end: DVec2::X,
            stops: Vec::new(),
        };
        assert_eq!(paint.color_at(DVec2::ZERO), Rgba::TRANSPARENT);
    }

    #[test]
    fn test_recording_alpha_follows_save_restore() {
        struct Ready;
        impl ImageResource for Ready {
            fn is_ready(&self) -> bool {
                true
            }
            fn dimensions(&self) -> (usize, usize) {
                (1, 1)
            }
            fn pixel(&self, _x: usize, _y: usize) -> Rgba {
                RED
            }
        }

        let mut ctx = RecordingContext::new();
        ctx.save();
        ctx.set_global_alpha(0.5);
        ctx.draw_image(&Ready, Bounds::centered(2.0));
        ctx.restore();
        ctx.draw_image(&Ready, Bounds::centered(2.0));
        let alphas: Vec<f64> = ctx.images().map(|(_, alpha)| alpha).collect();
        assert_eq!(alphas, vec![0.5, 1.0]);
    }

    #[test]
    fn test_bounds_contains_half_open() {
        let bounds = Bounds::new(0.0, 0.0, 2.0, 2.0);
        assert!(bounds.contains(DVec2::ZERO));
        assert!(!bounds.contains(DVec2::new(2.0, 1.0)));
    }
}
