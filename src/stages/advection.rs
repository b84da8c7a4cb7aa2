use egui::Vec2;

use super::{ensure, Kernel};
use crate::config::SolverParams;
use crate::grid::GridSize;
use crate::mask::ObstacleMask;

/// Semi-Lagrangian self-advection with nearest-neighbour sampling.
#[derive(Debug, Clone)]
pub struct Advection {
    time_step: f32,
    scale: f32,
}

pub struct AdvectionInputs<'a> {
    pub velocity: &'a [Vec2],
    pub obstacles: &'a ObstacleMask,
}

impl Advection {
    pub fn run(&self, grid: GridSize, inputs: &AdvectionInputs<'_>, out: &mut [Vec2]) {
        super::dispatch(self, grid, inputs, out);
    }

    /// Where the fluid now at the center of `(x, y)` came from, in grid
    /// units.
    ///
    /// The backtrace is `dt * v * spacing * scale` in texture space, which
    /// is `dt * v * scale` cells.
    fn departure_point(&self, grid: GridSize, velocity: Vec2, x: usize, y: usize) -> egui::Pos2 {
        let (sx, sy) = grid.spacing();
        let center = grid.cell_center(x, y);
        let uv = egui::pos2(center.x * sx, center.y * sy);
        let offset = velocity * self.time_step * self.scale;
        let uv = egui::pos2(uv.x - offset.x * sx, uv.y - offset.y * sy);
        egui::pos2(uv.x * grid.width as f32, uv.y * grid.height as f32)
    }
}

impl Kernel for Advection {
    const NAME: &'static str = "advection";
    type Inputs<'a> = AdvectionInputs<'a>;
    type Cell = Vec2;

    fn compile(params: &SolverParams) -> crate::error::Result<Self> {
        let time_step = params.time_step;
        let scale = params.advection_scale;
        ensure(Self::NAME, time_step.is_finite() && time_step > 0.0, || {
            format!("time step must be positive, got {time_step}")
        })?;
        ensure(Self::NAME, scale.is_finite(), || {
            format!("advection scale must be finite, got {scale}")
        })?;
        Ok(Self { time_step, scale })
    }

    fn eval(&self, grid: GridSize, inputs: &AdvectionInputs<'_>, x: usize, y: usize) -> Vec2 {
        let idx = grid.index(x, y);
        if inputs.obstacles.is_solid(idx) {
            return Vec2::ZERO;
        }
        let from = self.departure_point(grid, inputs.velocity[idx], x, y);
        // Nearest texel with clamp-to-edge; `as` saturates NaN to 0.
        let source = grid.clamped_index(from.x.floor() as isize, from.y.floor() as isize);
        inputs.velocity[source]
    }
}
