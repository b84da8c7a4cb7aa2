use std::f32::consts::{FRAC_PI_2, PI, TAU};

use egui::Vec2;

use super::Kernel;
use crate::config::SolverParams;
use crate::grid::GridSize;
use crate::mask::ObstacleMask;

/// Colors each cell by flow direction (hue) and pressure (lightness).
#[derive(Debug, Clone)]
pub struct Visualization;

pub struct VisualizationInputs<'a> {
    pub velocity: &'a [Vec2],
    pub pressure: &'a [f32],
    pub obstacles: &'a ObstacleMask,
}

impl Visualization {
    pub fn run(&self, grid: GridSize, inputs: &VisualizationInputs<'_>, out: &mut [[f32; 4]]) {
        super::dispatch(self, grid, inputs, out);
    }
}

impl Kernel for Visualization {
    const NAME: &'static str = "visualization";
    type Inputs<'a> = VisualizationInputs<'a>;
    type Cell = [f32; 4];

    fn compile(_params: &SolverParams) -> crate::error::Result<Self> {
        Ok(Self)
    }

    fn eval(&self, grid: GridSize, inputs: &VisualizationInputs<'_>, x: usize, y: usize) -> [f32; 4] {
        let idx = grid.index(x, y);
        let velocity = inputs.velocity[idx];
        let lightness = inputs.pressure[idx] * (1.0 - inputs.obstacles.value(idx));
        let [r, g, b] = hsl_to_rgb(hue_degrees(velocity), 1.0, lightness);
        // The raw velocity is added on top of the color as-is.
        [r + velocity.x, g + velocity.y, b, 1.0]
    }
}

/// Flow direction in degrees, [0, 360).
///
/// A zero x component is special-cased: straight up is 90°, everything else
/// (including no flow at all) is 270°.
pub fn hue_degrees(velocity: Vec2) -> f32 {
    let radians = if velocity.x == 0.0 {
        if velocity.y > 0.0 {
            FRAC_PI_2
        } else {
            1.5 * PI
        }
    } else {
        velocity.y.atan2(velocity.x).rem_euclid(TAU)
    };
    radians.to_degrees()
}

/// Sector-based HSL to RGB. Lightness is not clamped.
pub fn hsl_to_rgb(h: f32, s: f32, l: f32) -> [f32; 3] {
    let c = (1.0 - (2.0 * l - 1.0).abs()) * s;
    let x = c * (1.0 - ((h / 60.0).rem_euclid(2.0) - 1.0).abs());
    let m = l - c / 2.0;
    let (r, g, b) = if h < 60.0 {
        (c, x, 0.0)
    } else if h < 120.0 {
        (x, c, 0.0)
    } else if h < 180.0 {
        (0.0, c, x)
    } else if h < 240.0 {
        (0.0, x, c)
    } else if h < 300.0 {
        (x, 0.0, c)
    } else {
        (c, 0.0, x)
    };
    [r + m, g + m, b + m]
}
