//! Tile-field animation engine for the tessera background.
//!
//! A rotated, infinitely tiling lattice of images scrolls continuously,
//! shifts with pointer parallax and spins individual tiles with damped
//! rotational physics while they are hovered. [`TileField`] owns the
//! surface, pointer sample, clock and per-tile state and advances them one
//! frame at a time. Drawing goes through the [`DrawContext`] seam; [`Raster`]
//! implements it as a half-block terminal framebuffer.

mod clock;
mod color;
mod draw;
mod lattice;
mod modulation;
mod physics;
mod raster;
mod sprite;
mod state;

pub use clock::{InputSampler, normalize_delta};
pub use color::{background_stops, hsl_to_rgb};
pub use draw::{Bounds, ColorStop, DrawContext, DrawOp, ImageResource, Paint, RecordingContext};
pub use lattice::Lattice;
pub use modulation::{tile_opacity, tile_scale};
pub use physics::{SpinParams, TileState};
pub use raster::{Painter, Raster};
pub use sprite::{Sprite, SpriteSlot};
pub use state::{FrameReport, Surface, TileField};
