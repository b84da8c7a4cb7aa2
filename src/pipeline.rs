use std::time::Instant;

use egui::Vec2;

use crate::buffers::{FieldKind, GridBufferSet};
use crate::config::SolverParams;
use crate::error::{PipelineError, Result};
use crate::grid::{ColorBuffer, GridSize};
use crate::mask::{MaskImage, MaskSource, ObstacleMask};
use crate::pointer::{PointerHistory, SharedPointer};
use crate::stages::{
    AdvectionInputs, DivergenceInputs, ForceInputs, KernelSet, ProjectionInputs,
    VisualizationInputs,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineState {
    Uninitialized,
    Running,
    Resetting,
    /// A reset failed to allocate; only another reset can recover.
    Failed,
}

impl PipelineState {
    pub fn name(&self) -> &'static str {
        match self {
            PipelineState::Uninitialized => "uninitialized",
            PipelineState::Running => "running",
            PipelineState::Resetting => "resetting",
            PipelineState::Failed => "failed",
        }
    }
}

/// Permission to run exactly one tick. Invalidated by any reset.
#[derive(Debug)]
#[must_use = "a frame ticket does nothing until passed to `tick`"]
pub struct FrameTicket {
    generation: u64,
}

/// Owns the grid, the compiled stages and the pointer history, and runs the
/// stages in their fixed order once per frame.
pub struct SimulationPipeline {
    kernels: KernelSet,
    params: SolverParams,
    state: PipelineState,
    buffers: Option<GridBufferSet>,
    output: Option<ColorBuffer>,
    pointer: SharedPointer,
    history: PointerHistory,
    scale: f32,
    generation: u64,
    pending: Option<u64>,
    ticks: u64,
}

impl SimulationPipeline {
    /// Compiles every stage. Nothing is allocated until the first reset.
    pub fn new(params: SolverParams) -> Result<Self> {
        let kernels = KernelSet::compile(&params).inspect_err(|e| {
            log::error!("failed to build solver: {e}");
        })?;
        if !params.is_reference() {
            log::warn!("solver constants differ from the reference set: {params:?}");
        }
        log::info!(
            "solver ready ({} Jacobi sweeps per tick)",
            kernels.pressure.iterations()
        );
        Ok(Self {
            kernels,
            params,
            state: PipelineState::Uninitialized,
            buffers: None,
            output: None,
            pointer: SharedPointer::default(),
            history: PointerHistory::default(),
            scale: 1.0,
            generation: 0,
            pending: None,
            ticks: 0,
        })
    }

    pub fn state(&self) -> PipelineState {
        self.state
    }

    pub fn params(&self) -> &SolverParams {
        &self.params
    }

    /// Handle for the input side to publish pointer positions through.
    pub fn pointer(&self) -> SharedPointer {
        self.pointer.clone()
    }

    pub fn grid(&self) -> Option<GridSize> {
        self.buffers.as_ref().map(GridBufferSet::grid)
    }

    pub fn scale(&self) -> f32 {
        self.scale
    }

    /// Ticks completed since the last reset.
    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    /// Derives the grid from the display size and `scale`, asks `source` for
    /// a matching obstacle image and resets onto it.
    pub fn reset_for_display(
        &mut self,
        display: Vec2,
        scale: f32,
        source: &dyn MaskSource,
    ) -> Result<()> {
        let grid = GridSize::from_display(display.x, display.y, scale)?;
        let image = source.rasterize(grid.width, grid.height);
        self.reset(grid, &image)?;
        self.scale = scale;
        Ok(())
    }

    /// Discards every field and starts over on `grid` with obstacles from
    /// `image`.
    ///
    /// A mask of the wrong size is rejected before anything is released, so
    /// the pipeline keeps running on its old state. Any outstanding frame
    /// ticket is cancelled.
    pub fn reset(&mut self, grid: GridSize, image: &MaskImage) -> Result<()> {
        if image.width != grid.width
            || image.height != grid.height
            || image.pixels.len() != grid.len()
        {
            log::warn!(
                "rejecting reset: grid {}x{} vs mask {}x{}",
                grid.width,
                grid.height,
                image.width,
                image.height
            );
            return Err(PipelineError::DimensionMismatch {
                grid_width: grid.width,
                grid_height: grid.height,
                mask_width: image.width,
                mask_height: image.height,
            });
        }

        self.cancel_frame();
        self.generation += 1;
        self.state = PipelineState::Resetting;
        self.buffers = None;
        self.output = None;

        match Self::allocate(grid, image, self.params.obstacle_threshold) {
            Ok((buffers, output)) => {
                log::info!(
                    "reset to {}x{} grid, {} solid cells",
                    grid.width,
                    grid.height,
                    buffers.obstacles().solid_count()
                );
                self.buffers = Some(buffers);
                self.output = Some(output);
                self.history = PointerHistory::default();
                self.ticks = 0;
                self.state = PipelineState::Running;
                Ok(())
            }
            Err(e) => {
                log::error!("reset failed: {e}");
                self.state = PipelineState::Failed;
                Err(e)
            }
        }
    }

    fn allocate(
        grid: GridSize,
        image: &MaskImage,
        threshold: f32,
    ) -> Result<(GridBufferSet, ColorBuffer)> {
        let obstacles = ObstacleMask::from_image(grid, image, threshold)?;
        let buffers = GridBufferSet::new(grid, obstacles)?;
        let output = ColorBuffer::new(grid)?;
        Ok((buffers, output))
    }

    /// Schedules the next tick. Returns `None` unless the pipeline is
    /// running. Requesting again replaces the earlier ticket.
    pub fn request_frame(&mut self) -> Option<FrameTicket> {
        if self.state != PipelineState::Running {
            return None;
        }
        self.pending = Some(self.generation);
        Some(FrameTicket {
            generation: self.generation,
        })
    }

    pub fn cancel_frame(&mut self) {
        if self.pending.take().is_some() {
            log::debug!("cancelled pending frame");
        }
    }

    /// Runs one full tick: force, advection, divergence, pressure solve,
    /// projection, visualization.
    ///
    /// Returns `Ok(None)` without touching any buffer if the ticket was
    /// cancelled or issued before the last reset.
    pub fn tick(&mut self, ticket: FrameTicket) -> Result<Option<&ColorBuffer>> {
        if self.pending != Some(ticket.generation) || ticket.generation != self.generation {
            log::debug!("dropping stale frame ticket");
            return Ok(None);
        }
        self.pending = None;

        let (Some(buffers), Some(output), PipelineState::Running) =
            (self.buffers.as_mut(), self.output.as_mut(), self.state)
        else {
            return Err(PipelineError::NotRunning {
                state: self.state.name(),
            });
        };

        let start = Instant::now();
        self.history.advance(self.pointer.load());
        run_stages(&self.kernels, self.history, buffers, output);
        self.ticks += 1;
        log::trace!("tick {} took {:?}", self.ticks, start.elapsed());

        Ok(Some(output))
    }

    /// Latest color buffer, if a tick has run since the last reset.
    pub fn output(&self) -> Option<&ColorBuffer> {
        self.output.as_ref().filter(|_| self.ticks > 0)
    }

    /// Front velocity, i.e. the projected result of the last tick.
    pub fn velocity(&self) -> Option<&[Vec2]> {
        self.buffers.as_ref().map(GridBufferSet::velocity)
    }

    /// Front pressure; also the seed of the next solve.
    pub fn pressure(&self) -> Option<&[f32]> {
        self.buffers.as_ref().map(GridBufferSet::pressure)
    }

    pub fn obstacles(&self) -> Option<&ObstacleMask> {
        self.buffers.as_ref().map(GridBufferSet::obstacles)
    }
}

fn run_stages(
    kernels: &KernelSet,
    pointer: PointerHistory,
    buffers: &mut GridBufferSet,
    output: &mut ColorBuffer,
) {
    let grid = buffers.grid;

    {
        let (front, back) = buffers.velocity.split();
        let inputs = ForceInputs {
            velocity: front,
            previous: pointer.previous,
            current: pointer.current,
        };
        kernels.force.run(grid, &inputs, back);
    }
    buffers.swap(FieldKind::Velocity);

    {
        let (front, back) = buffers.velocity.split();
        let inputs = AdvectionInputs {
            velocity: front,
            obstacles: &buffers.obstacles,
        };
        kernels.advection.run(grid, &inputs, back);
    }
    buffers.swap(FieldKind::Velocity);

    {
        let inputs = DivergenceInputs {
            velocity: buffers.velocity.front(),
        };
        kernels.divergence.run(grid, &inputs, &mut buffers.divergence);
    }

    kernels
        .pressure
        .run(grid, &buffers.divergence, &mut buffers.pressure);

    {
        let (front, back) = buffers.velocity.split();
        let inputs = ProjectionInputs {
            velocity: front,
            pressure: buffers.pressure.front(),
            obstacles: &buffers.obstacles,
        };
        kernels.projection.run(grid, &inputs, back);
    }
    buffers.swap(FieldKind::Velocity);

    let inputs = VisualizationInputs {
        velocity: buffers.velocity.front(),
        pressure: buffers.pressure.front(),
        obstacles: &buffers.obstacles,
    };
    kernels.visualization.run(grid, &inputs, &mut output.pixels);
}

#[cfg(test)]
mod tests {
    use super::*;
    use egui::pos2;

    fn running(width: usize, height: usize) -> SimulationPipeline {
        let mut pipeline = SimulationPipeline::new(SolverParams::default()).unwrap();
        let grid = GridSize::new(width, height).unwrap();
        pipeline.reset(grid, &MaskImage::new(width, height)).unwrap();
        pipeline
    }

    fn bits<T: Copy>(slots: &[Vec<T>; 2], to_bits: impl Fn(T) -> Vec<u32>) -> Vec<u32> {
        slots.iter().flatten().flat_map(|&v| to_bits(v)).collect()
    }

    fn snapshot(pipeline: &SimulationPipeline) -> (Vec<u32>, Vec<u32>) {
        let buffers = pipeline.buffers.as_ref().unwrap();
        (
            bits(buffers.velocity.slots(), |v: Vec2| vec![v.x.to_bits(), v.y.to_bits()]),
            bits(buffers.pressure.slots(), |p: f32| vec![p.to_bits()]),
        )
    }

    #[test]
    fn test_new_pipeline_is_uninitialized() {
        let mut pipeline = SimulationPipeline::new(SolverParams::default()).unwrap();
        assert_eq!(pipeline.state(), PipelineState::Uninitialized);
        assert!(pipeline.request_frame().is_none());
        assert!(pipeline.velocity().is_none());
    }

    #[test]
    fn test_reset_restores_identical_zero_state() {
        let mut pipeline = running(8, 6);
        let fresh = snapshot(&pipeline);

        let pointer = pipeline.pointer();
        for step in 0..5 {
            pointer.store(pos2(1.0 + step as f32, 3.0));
            let ticket = pipeline.request_frame().unwrap();
            pipeline.tick(ticket).unwrap();
        }
        assert_ne!(snapshot(&pipeline), fresh);

        let grid = pipeline.grid().unwrap();
        pipeline.reset(grid, &MaskImage::new(8, 6)).unwrap();
        assert_eq!(snapshot(&pipeline), fresh);
        assert_eq!(pipeline.ticks(), 0);
    }

    #[test]
    fn test_reset_cancels_outstanding_ticket() {
        let mut pipeline = running(4, 4);
        let ticket = pipeline.request_frame().unwrap();
        let grid = pipeline.grid().unwrap();
        pipeline.reset(grid, &MaskImage::new(4, 4)).unwrap();

        assert!(pipeline.tick(ticket).unwrap().is_none());
        assert_eq!(pipeline.ticks(), 0);
    }

    #[test]
    fn test_cancelled_ticket_does_nothing() {
        let mut pipeline = running(4, 4);
        let ticket = pipeline.request_frame().unwrap();
        pipeline.cancel_frame();
        assert!(pipeline.tick(ticket).unwrap().is_none());
    }

    #[test]
    fn test_mismatched_reset_keeps_last_good_state() {
        let mut pipeline = running(4, 4);
        let ticket = pipeline.request_frame().unwrap();
        pipeline.tick(ticket).unwrap();

        let bigger = GridSize::new(8, 8).unwrap();
        let result = pipeline.reset(bigger, &MaskImage::new(4, 4));
        assert!(matches!(result, Err(PipelineError::DimensionMismatch { .. })));
        assert_eq!(pipeline.state(), PipelineState::Running);
        assert_eq!(pipeline.grid(), Some(GridSize::new(4, 4).unwrap()));
        assert_eq!(pipeline.ticks(), 1);
    }

    #[test]
    fn test_tick_output_is_opaque() {
        let mut pipeline = running(3, 3);
        let ticket = pipeline.request_frame().unwrap();
        let output = pipeline.tick(ticket).unwrap().unwrap();
        assert!(output.pixels.iter().all(|p| p[3] == 1.0));
    }
}
