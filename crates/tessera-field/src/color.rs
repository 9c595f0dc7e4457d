//! Color utility functions for the tile field.

use tessera_core::{ColorTheme, Rgba};

/// Top and bottom colors of the background gradient for a theme.
pub fn background_stops(theme: ColorTheme) -> [Rgba; 2] {
    match theme.hue() {
        Some(hue) => [
            hsl_to_rgb(hue, 0.45, 0.16),
            hsl_to_rgb((hue + 25.0) % 360.0, 0.5, 0.06),
        ],
        None => [Rgba::opaque(38, 38, 42), Rgba::opaque(10, 10, 12)],
    }
}

/// Opaque color from hue in degrees, saturation and lightness in 0.0-1.0.
///
/// Chroma is spread over the hue's sector of the color wheel and the
/// lightness offset is added to every channel.
pub fn hsl_to_rgb(hue: f32, saturation: f32, lightness: f32) -> Rgba {
    let chroma = (1.0 - (2.0 * lightness - 1.0).abs()) * saturation;
    let sector = hue.rem_euclid(360.0) / 60.0;
    let second = chroma * (1.0 - (sector % 2.0 - 1.0).abs());
    let (r, g, b) = match sector as u8 {
        0 => (chroma, second, 0.0),
        1 => (second, chroma, 0.0),
        2 => (0.0, chroma, second),
        3 => (0.0, second, chroma),
        4 => (second, 0.0, chroma),
        _ => (chroma, 0.0, second),
    };
    let offset = lightness - chroma / 2.0;
    let channel = |value: f32| ((value + offset).clamp(0.0, 1.0) * 255.0).round() as u8;
    Rgba::opaque(channel(r), channel(g), channel(b))
}
