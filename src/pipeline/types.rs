//! Data types and error definitions for the document pipeline.

use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

use crate::config::Config;
use crate::gemini::GeminiError;

/// Errors emitted by the document pipeline, one variant per failing step.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// Local file was missing or the supplied path was empty.
    #[error("Local file not found at {0}")]
    FileMissing(PathBuf),
    /// Local file exceeds the configured upload size gate.
    #[error("File is {size_mb} MB, above the {limit_mb} MB limit")]
    FileTooLarge {
        /// Size of the rejected file in megabytes.
        size_mb: u64,
        /// Configured limit in megabytes.
        limit_mb: u64,
    },
    /// Upload step failed.
    #[error("Upload failed: {0}")]
    Upload(#[source] GeminiError),
    /// Store listing, deletion, or creation failed.
    #[error("Store management failed: {0}")]
    Store(#[source] GeminiError),
    /// Import submission or poll refresh failed.
    #[error("Import failed: {0}")]
    Import(#[source] GeminiError),
    /// Import job did not settle within the injected poll bound.
    #[error("Import job still running after {polls} polls")]
    ImportUnfinished {
        /// Number of polls performed before giving up.
        polls: usize,
    },
    /// Grounded generation request failed.
    #[error("Generation failed: {0}")]
    Generate(#[source] GeminiError),
    /// Summary could not be written to disk.
    #[error("Failed to save summary: {0}")]
    WriteSummary(#[source] std::io::Error),
}

/// Immutable options snapshot handed to the pipeline at construction.
#[derive(Debug, Clone)]
pub struct PipelineOptions {
    /// Directory summaries are written into.
    pub summary_dir: PathBuf,
    /// Largest accepted upload, in megabytes.
    pub max_file_size_mb: u64,
    /// Fixed wait between import status polls.
    pub poll_interval: Duration,
    /// Optional bound on poll iterations. `None` polls indefinitely, matching
    /// the service's documented behavior; tests inject a bound instead.
    pub max_polls: Option<usize>,
}

impl PipelineOptions {
    /// Derive pipeline options from the process configuration.
    pub fn from_config(config: &Config) -> Self {
        Self {
            summary_dir: PathBuf::from("summary"),
            max_file_size_mb: config.max_file_size_mb,
            poll_interval: Duration::from_secs(2),
            max_polls: None,
        }
    }
}

/// Summary of a completed pipeline run.
#[derive(Debug, Clone)]
pub struct PipelineOutcome {
    /// Identifier derived from the filename, shared by the file and its store.
    pub identifier: String,
    /// Resource name of the store created for this run.
    pub store_name: String,
    /// Path of the written summary, or `None` when generation returned no text.
    pub summary_path: Option<PathBuf>,
}
