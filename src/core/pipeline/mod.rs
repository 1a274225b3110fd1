//! Chunk Pipeline (C7) and Worker Pool (C8): the streaming execution
//! substrate shared by all three [`mode::ExecutionMode`]s.

pub mod chunk;
pub mod executor;
pub mod memory_guard;
pub mod mode;
pub mod summary;
pub mod workers;

pub use executor::{run_pipeline, CancellationToken, PipelineConfig, PipelineStatus, ProgressUpdate};
pub use mode::{select_mode, ExecutionMode, ModeFlags};
pub use summary::AnalysisSummary;
