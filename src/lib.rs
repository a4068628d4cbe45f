#![deny(missing_docs)]

//! Core library for the docsum file-search summarizer.

/// Environment-driven configuration management.
pub mod config;
/// Gemini File Search HTTP client and API seam.
pub mod gemini;
/// Structured logging and tracing setup.
pub mod logging;
/// Native file dialog wrapper.
pub mod picker;
/// Upload, indexing, and summary pipeline.
pub mod pipeline;
/// Summary persistence helpers.
pub mod summary;
