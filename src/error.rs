/// Failures surfaced by the simulation pipeline.
///
/// None of these are retried. Allocation and kernel failures leave the
/// pipeline unusable until a successful re-initialisation; a dimension
/// mismatch is rejected before anything is touched.
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error("failed to allocate {width}x{height} grid: {reason}")]
    ResourceAllocation {
        width: usize,
        height: usize,
        reason: String,
    },

    #[error("kernel `{kernel}` failed to build: {reason}")]
    KernelCompilation {
        kernel: &'static str,
        reason: String,
    },

    #[error("grid is {grid_width}x{grid_height} but obstacle mask is {mask_width}x{mask_height}")]
    DimensionMismatch {
        grid_width: usize,
        grid_height: usize,
        mask_width: usize,
        mask_height: usize,
    },

    #[error("pipeline is not running (state: {state})")]
    NotRunning { state: &'static str },
}

pub type Result<T> = std::result::Result<T, PipelineError>;
