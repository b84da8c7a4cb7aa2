use serde::Deserialize;

use crate::mask::{MaskImage, MaskSource};
use crate::utils::drawing::{draw_border, stroke_circle};
use crate::utils::font::{draw_text, text_width, FONT_HEIGHT};

const SOLID: u8 = 255;
/// Approximate glyph height of the text preset, in mask pixels.
const TEXT_HEIGHT: usize = 100;
const RING_RADIUS: f32 = 150.0;
const RING_WIDTH: f32 = 10.0;

/// Built-in obstacle layouts. Every layout is enclosed by a one-pixel wall.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ObstaclePreset {
    Empty,
    /// Text in the middle of the domain.
    Hello,
    /// A ring in the middle of the domain.
    Circle,
}

impl ObstaclePreset {
    pub const ALL: [ObstaclePreset; 3] = [Self::Hello, Self::Empty, Self::Circle];

    pub fn label(&self) -> &'static str {
        match self {
            ObstaclePreset::Empty => "Empty",
            ObstaclePreset::Hello => "Text",
            ObstaclePreset::Circle => "Ring",
        }
    }
}

/// A preset together with the text it draws, ready to rasterize at any size.
#[derive(Debug, Clone)]
pub struct PresetMask<'a> {
    pub preset: ObstaclePreset,
    pub text: &'a str,
}

impl MaskSource for PresetMask<'_> {
    fn rasterize(&self, width: usize, height: usize) -> MaskImage {
        let mut image = MaskImage::new(width, height);
        draw_border(&mut image, SOLID);

        match self.preset {
            ObstaclePreset::Empty => {}
            ObstaclePreset::Hello => {
                let cell = (TEXT_HEIGHT / FONT_HEIGHT).max(1);
                let text_w = text_width(self.text, cell) as isize;
                let text_h = (FONT_HEIGHT * cell) as isize;
                let x = width as isize / 2 - text_w / 2;
                let y = height as isize / 2 - text_h / 2;
                draw_text(&mut image, self.text, x, y, cell, SOLID);
            }
            ObstaclePreset::Circle => {
                let cx = width as f32 / 2.0;
                let cy = height as f32 / 2.0;
                stroke_circle(&mut image, cx, cy, RING_RADIUS, RING_WIDTH, SOLID);
            }
        }
        image
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn solid(image: &MaskImage) -> usize {
        image.pixels.iter().filter(|&&p| p == SOLID).count()
    }

    fn border_pixels(width: usize, height: usize) -> usize {
        2 * width + 2 * height - 4
    }

    #[test]
    fn test_empty_is_only_border() {
        let image = PresetMask { preset: ObstaclePreset::Empty, text: "" }.rasterize(40, 30);
        assert_eq!((image.width, image.height), (40, 30));
        assert_eq!(solid(&image), border_pixels(40, 30));
    }

    #[test]
    fn test_text_is_centered() {
        let image = PresetMask { preset: ObstaclePreset::Hello, text: "Hello!" }.rasterize(800, 400);
        assert!(solid(&image) > border_pixels(800, 400));
        // Nothing drawn in the interior corners.
        assert_eq!(image.get(10, 10), 0);
        assert_eq!(image.get(790, 390), 0);
        // Glyph boxes are centered; inked columns on the middle row land
        // within a font pixel or two of that.
        let row = 200;
        let first = (1..799).find(|&x| image.get(x, row) == SOLID).unwrap();
        let last = (1..799).rev().find(|&x| image.get(x, row) == SOLID).unwrap();
        let center = (first + last) / 2;
        assert!((center as isize - 400).abs() <= 40, "text centered at {center}");
    }

    #[test]
    fn test_ring_has_open_middle() {
        let image = PresetMask { preset: ObstaclePreset::Circle, text: "" }.rasterize(400, 400);
        assert_eq!(image.get(200, 200), 0);
        assert_eq!(image.get(350, 200), SOLID);
        assert_eq!(image.get(200, 50), SOLID);
    }

    #[test]
    fn test_tiny_grid_does_not_panic() {
        for preset in ObstaclePreset::ALL {
            let image = PresetMask { preset, text: "Hello!" }.rasterize(3, 2);
            assert_eq!(image.pixels.len(), 6);
        }
    }
}
