use egui::Vec2;

use super::Kernel;
use crate::config::SolverParams;
use crate::grid::GridSize;

/// Central-difference divergence, negated and halved so it can feed the
/// Jacobi solve directly.
#[derive(Debug, Clone)]
pub struct Divergence;

pub struct DivergenceInputs<'a> {
    pub velocity: &'a [Vec2],
}

impl Divergence {
    pub fn run(&self, grid: GridSize, inputs: &DivergenceInputs<'_>, out: &mut [f32]) {
        super::dispatch(self, grid, inputs, out);
    }
}

impl Kernel for Divergence {
    const NAME: &'static str = "divergence";
    type Inputs<'a> = DivergenceInputs<'a>;
    type Cell = f32;

    fn compile(_params: &SolverParams) -> crate::error::Result<Self> {
        Ok(Self)
    }

    fn eval(&self, grid: GridSize, inputs: &DivergenceInputs<'_>, x: usize, y: usize) -> f32 {
        let (x, y) = (x as isize, y as isize);
        let v = inputs.velocity;
        let x0 = v[grid.clamped_index(x - 1, y)].x;
        let x1 = v[grid.clamped_index(x + 1, y)].x;
        let y0 = v[grid.clamped_index(x, y - 1)].y;
        let y1 = v[grid.clamped_index(x, y + 1)].y;
        -0.5 * (x1 - x0 + y1 - y0)
    }
}
