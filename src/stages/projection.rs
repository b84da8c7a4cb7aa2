use egui::Vec2;

use super::Kernel;
use crate::config::SolverParams;
use crate::grid::GridSize;
use crate::mask::ObstacleMask;

/// Removes the pressure gradient from the advected velocity and pins solid
/// cells to zero.
#[derive(Debug, Clone)]
pub struct Projection;

pub struct ProjectionInputs<'a> {
    pub velocity: &'a [Vec2],
    pub pressure: &'a [f32],
    pub obstacles: &'a ObstacleMask,
}

impl Projection {
    pub fn run(&self, grid: GridSize, inputs: &ProjectionInputs<'_>, out: &mut [Vec2]) {
        super::dispatch(self, grid, inputs, out);
    }
}

impl Kernel for Projection {
    const NAME: &'static str = "projection";
    type Inputs<'a> = ProjectionInputs<'a>;
    type Cell = Vec2;

    fn compile(_params: &SolverParams) -> crate::error::Result<Self> {
        Ok(Self)
    }

    fn eval(&self, grid: GridSize, inputs: &ProjectionInputs<'_>, x: usize, y: usize) -> Vec2 {
        let idx = grid.index(x, y);
        if inputs.obstacles.is_solid(idx) {
            return Vec2::ZERO;
        }
        let (xi, yi) = (x as isize, y as isize);
        let p = inputs.pressure;
        let north = p[grid.clamped_index(xi, yi + 1)];
        let south = p[grid.clamped_index(xi, yi - 1)];
        let east = p[grid.clamped_index(xi + 1, yi)];
        let west = p[grid.clamped_index(xi - 1, yi)];
        inputs.velocity[idx] - 0.5 * Vec2::new(east - west, north - south)
    }
}
