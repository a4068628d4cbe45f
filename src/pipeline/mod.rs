//! Document pipeline: identifier derivation, orchestration, and result types.

pub mod identifier;
pub mod service;
pub mod types;

pub use identifier::derive_identifier;
pub use service::SearchPipeline;
pub use types::{PipelineError, PipelineOptions, PipelineOutcome};
