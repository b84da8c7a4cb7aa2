use super::{ensure, Kernel};
use crate::buffers::DoubleBuffer;
use crate::config::SolverParams;
use crate::grid::GridSize;

/// Fixed-count Jacobi relaxation of the pressure Poisson equation.
///
/// Pressure is never cleared between ticks: whatever the last sweep left in
/// the front buffer seeds the next solve. There is no convergence test; the
/// residual after the fixed sweep count is part of the look.
#[derive(Debug, Clone)]
pub struct PressureSolve {
    iterations: usize,
}

pub struct JacobiInputs<'a> {
    pub divergence: &'a [f32],
    pub pressure: &'a [f32],
}

impl PressureSolve {
    pub fn iterations(&self) -> usize {
        self.iterations
    }

    /// Runs every sweep, swapping `pressure` after each one. On return the
    /// front buffer holds the result.
    pub fn run(&self, grid: GridSize, divergence: &[f32], pressure: &mut DoubleBuffer<f32>) {
        for _ in 0..self.iterations {
            let (front, back) = pressure.split();
            let inputs = JacobiInputs {
                divergence,
                pressure: front,
            };
            super::dispatch(self, grid, &inputs, back);
            pressure.swap();
        }
    }
}

impl Kernel for PressureSolve {
    const NAME: &'static str = "pressure_jacobi";
    type Inputs<'a> = JacobiInputs<'a>;
    type Cell = f32;

    fn compile(params: &SolverParams) -> crate::error::Result<Self> {
        let iterations = params.jacobi_iterations;
        ensure(Self::NAME, iterations > 0, || {
            "at least one Jacobi sweep is required".to_owned()
        })?;
        Ok(Self { iterations })
    }

    fn eval(&self, grid: GridSize, inputs: &JacobiInputs<'_>, x: usize, y: usize) -> f32 {
        let (xi, yi) = (x as isize, y as isize);
        let p = inputs.pressure;
        let north = p[grid.clamped_index(xi, yi + 1)];
        let south = p[grid.clamped_index(xi, yi - 1)];
        let east = p[grid.clamped_index(xi + 1, yi)];
        let west = p[grid.clamped_index(xi - 1, yi)];
        let d = inputs.divergence[grid.index(x, y)];
        (north + south + east + west + d) / 4.0
    }
}
