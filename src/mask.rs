use crate::error::{PipelineError, Result};
use crate::grid::{allocate_field, GridSize};

/// Single-channel obstacle image as produced by a rasterizer.
///
/// Stored in image order: row 0 is the top row. 0 means fluid, anything
/// above the threshold is solid.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MaskImage {
    pub width: usize,
    pub height: usize,
    pub pixels: Vec<u8>,
}

impl MaskImage {
    pub fn new(width: usize, height: usize) -> Self {
        Self::filled(width, height, 0)
    }

    pub fn filled(width: usize, height: usize, value: u8) -> Self {
        Self {
            width,
            height,
            pixels: vec![value; width * height],
        }
    }

    #[inline]
    pub fn set(&mut self, x: isize, y: isize, value: u8) {
        if x >= 0 && x < self.width as isize && y >= 0 && y < self.height as isize {
            let idx = x as usize + y as usize * self.width;
            self.pixels[idx] = value;
        }
    }

    pub fn get(&self, x: usize, y: usize) -> u8 {
        self.pixels[x + y * self.width]
    }
}

/// Anything that can paint an obstacle image for a given grid size.
pub trait MaskSource {
    fn rasterize(&self, width: usize, height: usize) -> MaskImage;
}

/// A fixed image: reused as-is whatever size is asked for, so a size change
/// surfaces as a dimension mismatch.
impl MaskSource for MaskImage {
    fn rasterize(&self, _width: usize, _height: usize) -> MaskImage {
        self.clone()
    }
}

/// Binary per-cell obstacle flags in grid order (row 0 at the bottom).
///
/// Immutable once built; a reset replaces it wholesale.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObstacleMask {
    grid: GridSize,
    cells: Vec<u8>,
}

impl ObstacleMask {
    pub fn empty(grid: GridSize) -> Result<Self> {
        Ok(Self {
            grid,
            cells: allocate_field(grid)?,
        })
    }

    /// Builds the mask from an image, flipping rows into grid order and
    /// binarizing against `threshold` (a fraction of full scale).
    pub fn from_image(grid: GridSize, image: &MaskImage, threshold: f32) -> Result<Self> {
        if image.width != grid.width
            || image.height != grid.height
            || image.pixels.len() != grid.len()
        {
            return Err(PipelineError::DimensionMismatch {
                grid_width: grid.width,
                grid_height: grid.height,
                mask_width: image.width,
                mask_height: image.height,
            });
        }

        let mut cells: Vec<u8> = allocate_field(grid)?;
        for y in 0..grid.height {
            let image_row = grid.height - 1 - y;
            for x in 0..grid.width {
                let coverage = image.get(x, image_row) as f32 / 255.0;
                cells[grid.index(x, y)] = u8::from(coverage > threshold);
            }
        }
        Ok(Self { grid, cells })
    }

    pub fn grid(&self) -> GridSize {
        self.grid
    }

    #[inline(always)]
    pub fn is_solid(&self, idx: usize) -> bool {
        self.cells[idx] != 0
    }

    /// 1.0 for solid cells, 0.0 for fluid.
    #[inline(always)]
    pub fn value(&self, idx: usize) -> f32 {
        self.cells[idx] as f32
    }

    pub fn solid_count(&self) -> usize {
        self.cells.iter().filter(|&&c| c != 0).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rows_are_flipped() {
        let grid = GridSize::new(2, 2).unwrap();
        let mut image = MaskImage::new(2, 2);
        // Top-left pixel of the image.
        image.set(0, 0, 255);

        let mask = ObstacleMask::from_image(grid, &image, 0.5).unwrap();
        assert!(mask.is_solid(grid.index(0, 1)));
        assert!(!mask.is_solid(grid.index(0, 0)));
        assert_eq!(mask.solid_count(), 1);
    }

    #[test]
    fn test_threshold_binarizes() {
        let grid = GridSize::new(3, 1).unwrap();
        let image = MaskImage {
            width: 3,
            height: 1,
            pixels: vec![127, 128, 255],
        };
        let mask = ObstacleMask::from_image(grid, &image, 0.5).unwrap();
        assert_eq!(mask.value(0), 0.0);
        assert_eq!(mask.value(1), 1.0);
        assert_eq!(mask.value(2), 1.0);
    }

    #[test]
    fn test_mismatched_image_is_rejected() {
        let grid = GridSize::new(4, 4).unwrap();
        let image = MaskImage::new(4, 3);
        assert!(matches!(
            ObstacleMask::from_image(grid, &image, 0.5),
            Err(PipelineError::DimensionMismatch { mask_height: 3, .. })
        ));
    }

    #[test]
    fn test_set_ignores_out_of_bounds() {
        let mut image = MaskImage::new(2, 2);
        image.set(-1, 0, 255);
        image.set(2, 1, 255);
        assert!(image.pixels.iter().all(|&p| p == 0));
    }
}
