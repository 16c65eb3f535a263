mod batch;
pub mod config;
mod observation;
mod types;

pub use batch::run_batch;
pub use observation::{load_observation, process_observation, reduce_observation};
pub use types::{BatchSummary, NoOpReporter, ObservationOutput, PipelineStage, ProgressReporter};
