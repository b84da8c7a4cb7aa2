use egui::{Pos2, Vec2};

use super::{ensure, Kernel};
use crate::config::SolverParams;
use crate::grid::GridSize;
use crate::pointer::is_unset;
use crate::utils::geometry::distance_to_segment;

/// Pushes fluid along the pointer's path since the previous tick.
#[derive(Debug, Clone)]
pub struct ForceInjection {
    radius: f32,
    gain: f32,
}

pub struct ForceInputs<'a> {
    pub velocity: &'a [Vec2],
    pub previous: Pos2,
    pub current: Pos2,
}

impl ForceInputs<'_> {
    /// No motion, or no earlier sample to measure motion from.
    pub fn is_still(&self) -> bool {
        is_unset(self.previous) || self.previous == self.current
    }
}

impl ForceInjection {
    pub fn run(&self, grid: GridSize, inputs: &ForceInputs<'_>, out: &mut [Vec2]) {
        super::dispatch(self, grid, inputs, out);
    }
}

impl Kernel for ForceInjection {
    const NAME: &'static str = "force_injection";
    type Inputs<'a> = ForceInputs<'a>;
    type Cell = Vec2;

    fn compile(params: &SolverParams) -> crate::error::Result<Self> {
        let radius = params.forcing_radius;
        let gain = params.forcing_gain;
        ensure(Self::NAME, radius.is_finite() && radius > 0.0, || {
            format!("forcing radius must be positive, got {radius}")
        })?;
        ensure(Self::NAME, gain.is_finite(), || {
            format!("forcing gain must be finite, got {gain}")
        })?;
        Ok(Self { radius, gain })
    }

    fn eval(&self, grid: GridSize, inputs: &ForceInputs<'_>, x: usize, y: usize) -> Vec2 {
        let velocity = inputs.velocity[grid.index(x, y)];
        if inputs.is_still() {
            return velocity;
        }

        let d = distance_to_segment(grid.cell_center(x, y), inputs.previous, inputs.current);
        if d > self.radius {
            return velocity;
        }
        let motion = inputs.current - inputs.previous;
        velocity + motion * self.gain * (self.radius - d) / self.radius
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pointer::UNSET;
    use egui::{pos2, vec2};

    fn run(grid: GridSize, velocity: &[Vec2], previous: Pos2, current: Pos2) -> Vec<Vec2> {
        let kernel = ForceInjection::compile(&SolverParams::default()).unwrap();
        let mut out = vec![Vec2::splat(f32::NAN); grid.len()];
        let inputs = ForceInputs { velocity, previous, current };
        kernel.run(grid, &inputs, &mut out);
        out
    }

    #[test]
    fn test_unset_previous_suppresses_force() {
        let grid = GridSize::new(4, 4).unwrap();
        let velocity = vec![Vec2::ZERO; grid.len()];
        let out = run(grid, &velocity, UNSET, pos2(2.0, 2.0));
        assert_eq!(out, velocity);
    }

    #[test]
    fn test_still_pointer_copies_velocity() {
        let grid = GridSize::new(3, 2).unwrap();
        let velocity: Vec<Vec2> = (0..grid.len()).map(|i| vec2(i as f32, -(i as f32))).collect();
        let out = run(grid, &velocity, pos2(1.0, 1.0), pos2(1.0, 1.0));
        assert_eq!(out, velocity);
    }

    #[test]
    fn test_vertical_stroke_on_small_grid() {
        let grid = GridSize::new(4, 4).unwrap();
        let velocity = vec![Vec2::ZERO; grid.len()];
        let previous = pos2(2.0, 2.0);
        let current = pos2(2.0, 3.0);
        let out = run(grid, &velocity, previous, current);

        for y in 0..4 {
            for x in 0..4 {
                let d = distance_to_segment(grid.cell_center(x, y), previous, current);
                let expected = 0.05 * (50.0 - d) / 50.0;
                let v = out[grid.index(x, y)];
                assert_eq!(v.x, 0.0);
                assert!(v.y > 0.0);
                assert!((v.y - expected).abs() < 1e-6, "cell ({x},{y}): {} vs {expected}", v.y);
            }
        }
    }

    #[test]
    fn test_cells_outside_radius_untouched() {
        let grid = GridSize::new(120, 1).unwrap();
        let velocity = vec![vec2(0.25, 0.0); grid.len()];
        let out = run(grid, &velocity, pos2(0.0, 0.5), pos2(1.0, 0.5));

        // Cell 51 has its center 50.5 past the stroke's end.
        assert_eq!(out[grid.index(51, 0)], vec2(0.25, 0.0));
        assert_eq!(out[grid.index(119, 0)], vec2(0.25, 0.0));
        assert!(out[grid.index(0, 0)].x > 0.25);
    }

    #[test]
    fn test_direct_dispatch_honours_unset_sentinel() {
        let grid = GridSize::new(3, 3).unwrap();
        let kernel = ForceInjection::compile(&SolverParams::default()).unwrap();
        let velocity = vec![vec2(0.5, -0.5); grid.len()];
        let inputs = ForceInputs {
            velocity: &velocity,
            previous: UNSET,
            current: pos2(1.0, 1.0),
        };
        let mut out = vec![Vec2::ZERO; grid.len()];
        crate::stages::dispatch(&kernel, grid, &inputs, &mut out);
        assert_eq!(out, velocity);
    }

    #[test]
    fn test_rejects_non_positive_radius() {
        let params = SolverParams {
            forcing_radius: 0.0,
            ..SolverParams::default()
        };
        assert!(ForceInjection::compile(&params).is_err());
    }
}
