//! Real-time 2D stable-fluids simulation.
//!
//! A [`SimulationPipeline`] owns a double-buffered velocity/pressure grid and
//! advances it once per frame: pointer forcing, self-advection, divergence,
//! Jacobi pressure solve, projection, and finally a color pass whose output
//! is the only thing the outside world sees.

mod app;
pub mod buffers;
pub mod config;
pub mod error;
pub mod grid;
pub mod mask;
pub mod pipeline;
pub mod pointer;
pub mod presets;
pub mod stages;
pub mod utils;

pub use app::App;
pub use error::{PipelineError, Result};
pub use grid::{ColorBuffer, GridSize};
pub use mask::{MaskImage, MaskSource, ObstacleMask};
pub use pipeline::{FrameTicket, PipelineState, SimulationPipeline};
pub use presets::{ObstaclePreset, PresetMask};
