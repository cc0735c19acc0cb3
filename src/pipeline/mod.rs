// Pipeline orchestration.

pub mod workflow;

pub use workflow::{run, run_with_progress, WorkflowOutcome, WorkflowParams};
