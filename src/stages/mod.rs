//! Solver stages.
//!
//! Every stage is a per-cell function ([`Kernel::eval`]) evaluated over the
//! whole grid by [`dispatch`]. Cells within a stage are independent, so rows
//! are handed to rayon; `dispatch` returning is the barrier between stages.

use rayon::prelude::*;

use crate::config::SolverParams;
use crate::error::{PipelineError, Result};
use crate::grid::GridSize;

pub mod advection;
pub mod divergence;
pub mod force;
pub mod pressure;
pub mod projection;
pub mod visualization;

pub use advection::{Advection, AdvectionInputs};
pub use divergence::{Divergence, DivergenceInputs};
pub use force::{ForceInjection, ForceInputs};
pub use pressure::{JacobiInputs, PressureSolve};
pub use projection::{Projection, ProjectionInputs};
pub use visualization::{Visualization, VisualizationInputs};

/// A compiled per-cell program.
pub trait Kernel: Sized + Sync {
    const NAME: &'static str;

    /// Read-only fields the kernel samples from.
    type Inputs<'a>: Sync;

    /// Value written to the output buffer for one cell.
    type Cell: Send;

    /// Validates parameters and bakes them into the kernel. Runs once, when
    /// the pipeline is built.
    fn compile(params: &SolverParams) -> Result<Self>;

    fn eval(&self, grid: GridSize, inputs: &Self::Inputs<'_>, x: usize, y: usize) -> Self::Cell;
}

/// Evaluates `kernel` for every cell, writing into `out`.
pub fn dispatch<K: Kernel>(kernel: &K, grid: GridSize, inputs: &K::Inputs<'_>, out: &mut [K::Cell]) {
    debug_assert_eq!(out.len(), grid.len());
    out.par_chunks_mut(grid.width)
        .enumerate()
        .for_each(|(y, row)| {
            for (x, cell) in row.iter_mut().enumerate() {
                *cell = kernel.eval(grid, inputs, x, y);
            }
        });
}

pub(crate) fn ensure(kernel: &'static str, ok: bool, reason: impl FnOnce() -> String) -> Result<()> {
    if ok {
        Ok(())
    } else {
        Err(PipelineError::KernelCompilation {
            kernel,
            reason: reason(),
        })
    }
}

/// Every stage of one tick, compiled together.
#[derive(Debug)]
pub struct KernelSet {
    pub force: ForceInjection,
    pub advection: Advection,
    pub divergence: Divergence,
    pub pressure: PressureSolve,
    pub projection: Projection,
    pub visualization: Visualization,
}

impl KernelSet {
    pub fn compile(params: &SolverParams) -> Result<Self> {
        let threshold = params.obstacle_threshold;
        ensure("obstacle_mask", (0.0..1.0).contains(&threshold), || {
            format!("obstacle threshold must lie in [0, 1), got {threshold}")
        })?;
        let set = Self {
            force: ForceInjection::compile(params)?,
            advection: Advection::compile(params)?,
            divergence: Divergence::compile(params)?,
            pressure: PressureSolve::compile(params)?,
            projection: Projection::compile(params)?,
            visualization: Visualization::compile(params)?,
        };
        log::debug!("compiled solver kernels: {params:?}");
        Ok(set)
    }
}
