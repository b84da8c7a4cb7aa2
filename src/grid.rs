use crate::error::{PipelineError, Result};

/// Dimensions of the simulation grid.
///
/// Cells are stored row-major, `x + y * width`, with row 0 at the bottom of
/// the displayed image.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GridSize {
    pub width: usize,
    pub height: usize,
}

impl GridSize {
    pub fn new(width: usize, height: usize) -> Result<Self> {
        if width.checked_mul(height).is_none() {
            return Err(PipelineError::ResourceAllocation {
                width,
                height,
                reason: "cell count overflows usize".to_owned(),
            });
        }
        let grid = Self { width, height };
        if grid.is_empty() {
            return Err(PipelineError::ResourceAllocation {
                width,
                height,
                reason: "grid dimensions must be positive".to_owned(),
            });
        }
        Ok(grid)
    }

    /// Derives the grid from a display surface size and a resolution scale.
    pub fn from_display(display_width: f32, display_height: f32, scale: f32) -> Result<Self> {
        let width = (display_width * scale).floor().max(0.0) as usize;
        let height = (display_height * scale).floor().max(0.0) as usize;
        Self::new(width, height)
    }

    pub fn len(&self) -> usize {
        self.width * self.height
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    #[inline(always)]
    pub fn index(&self, x: usize, y: usize) -> usize {
        x + y * self.width
    }

    /// Edge-extended addressing: out-of-range coordinates snap to the
    /// nearest border cell.
    #[inline(always)]
    pub fn clamped_index(&self, x: isize, y: isize) -> usize {
        let x = x.clamp(0, self.width as isize - 1) as usize;
        let y = y.clamp(0, self.height as isize - 1) as usize;
        self.index(x, y)
    }

    /// Size of one cell in normalised texture space.
    pub fn spacing(&self) -> (f32, f32) {
        (1.0 / self.width as f32, 1.0 / self.height as f32)
    }

    #[inline(always)]
    pub fn cell_center(&self, x: usize, y: usize) -> egui::Pos2 {
        egui::pos2(x as f32 + 0.5, y as f32 + 0.5)
    }
}

/// Allocates a zeroed field, reporting allocation failure instead of aborting.
pub(crate) fn allocate_field<T: Clone + Default>(grid: GridSize) -> Result<Vec<T>> {
    let mut field = Vec::new();
    field
        .try_reserve_exact(grid.len())
        .map_err(|e| PipelineError::ResourceAllocation {
            width: grid.width,
            height: grid.height,
            reason: e.to_string(),
        })?;
    field.resize(grid.len(), T::default());
    Ok(field)
}

/// Final per-cell output of a tick: linear RGBA, not clamped.
#[derive(Clone, Debug)]
pub struct ColorBuffer {
    pub grid: GridSize,
    pub pixels: Vec<[f32; 4]>,
}

impl ColorBuffer {
    pub(crate) fn new(grid: GridSize) -> Result<Self> {
        Ok(Self {
            grid,
            pixels: allocate_field(grid)?,
        })
    }

    pub fn get(&self, x: usize, y: usize) -> [f32; 4] {
        self.pixels[self.grid.index(x, y)]
    }

    /// Converts to an 8-bit image for presentation. Channels are clamped to
    /// [0, 1] and rows are flipped so that row 0 is the top of the image.
    pub fn to_color_image(&self) -> egui::ColorImage {
        let GridSize { width, height } = self.grid;
        let mut pixels = Vec::with_capacity(width * height);
        for row in (0..height).rev() {
            for &[r, g, b, a] in &self.pixels[row * width..(row + 1) * width] {
                pixels.push(egui::Color32::from_rgba_unmultiplied(
                    to_byte(r),
                    to_byte(g),
                    to_byte(b),
                    to_byte(a),
                ));
            }
        }
        egui::ColorImage {
            size: [width, height],
            pixels,
        }
    }
}

fn to_byte(channel: f32) -> u8 {
    // NaN maps to 0 through the saturating cast.
    (channel.clamp(0.0, 1.0) * 255.0).round() as u8
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_dimension_is_allocation_failure() {
        assert!(matches!(
            GridSize::new(0, 4),
            Err(PipelineError::ResourceAllocation { .. })
        ));
        assert!(matches!(
            GridSize::new(4, 0),
            Err(PipelineError::ResourceAllocation { .. })
        ));
    }

    #[test]
    fn test_from_display_applies_scale() {
        let grid = GridSize::from_display(800.0, 600.0, 0.5).unwrap();
        assert_eq!(grid, GridSize { width: 400, height: 300 });
    }

    #[test]
    fn test_clamped_index_extends_edges() {
        let grid = GridSize::new(3, 2).unwrap();
        assert_eq!(grid.clamped_index(-1, 0), grid.index(0, 0));
        assert_eq!(grid.clamped_index(3, 1), grid.index(2, 1));
        assert_eq!(grid.clamped_index(1, -5), grid.index(1, 0));
        assert_eq!(grid.clamped_index(1, 7), grid.index(1, 1));
    }

    #[test]
    fn test_oversized_allocation_is_reported() {
        // 2^62 cells of 8 bytes overflow the address space.
        let grid = GridSize {
            width: 1 << 31,
            height: 1 << 31,
        };
        assert!(matches!(
            allocate_field::<egui::Vec2>(grid),
            Err(PipelineError::ResourceAllocation { .. })
        ));
    }

    #[test]
    fn test_color_image_flips_rows_and_clamps() {
        let grid = GridSize::new(1, 2).unwrap();
        let mut buffer = ColorBuffer::new(grid).unwrap();
        buffer.pixels[grid.index(0, 0)] = [2.0, -1.0, 0.5, 1.0];
        buffer.pixels[grid.index(0, 1)] = [0.0, 0.0, 0.0, 1.0];

        let image = buffer.to_color_image();
        assert_eq!(image.size, [1, 2]);
        // Bottom grid row ends up last in image order.
        assert_eq!(image.pixels[1], egui::Color32::from_rgba_unmultiplied(255, 0, 128, 255));
        assert_eq!(image.pixels[0], egui::Color32::from_rgba_unmultiplied(0, 0, 0, 255));
    }
}
