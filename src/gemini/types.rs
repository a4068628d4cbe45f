//! Shared types used by the Gemini File Search client.

use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors returned while interacting with the Gemini API.
#[derive(Debug, Error)]
pub enum GeminiError {
    /// Base URL failed to parse or normalize.
    #[error("Invalid Gemini endpoint URL: {0}")]
    InvalidUrl(String),
    /// HTTP layer failed before receiving a response.
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),
    /// Local file could not be read for upload.
    #[error("Failed to read local file: {0}")]
    Io(#[from] std::io::Error),
    /// Gemini responded with an unexpected status code.
    #[error("Unexpected Gemini response ({status}): {body}")]
    UnexpectedStatus {
        /// HTTP status returned from the service.
        status: StatusCode,
        /// Body payload associated with the failing response.
        body: String,
    },
}

/// Remote file resource handle returned by the files surface.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileMetadata {
    /// Full resource name, e.g. `files/ticket-to-ride`.
    pub name: String,
    /// Human-readable name supplied at upload time.
    #[serde(default)]
    pub display_name: Option<String>,
}

/// File Search store handle.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoreMetadata {
    /// Full resource name, e.g. `fileSearchStores/abc123`.
    pub name: String,
    /// Display name the store was created with.
    #[serde(default)]
    pub display_name: Option<String>,
}

/// Long-running operation handle returned by import requests.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Operation {
    /// Operation resource name used for poll refreshes.
    pub name: String,
    /// Terminal flag; absent in the wire format until the job settles.
    #[serde(default)]
    pub done: bool,
}

/// Custom metadata attached to an imported document.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomMetadata {
    /// Metadata key, filterable at generation time.
    pub key: String,
    /// String value stored under the key.
    pub string_value: String,
}

/// Parameters for a grounded generation request.
#[derive(Debug, Clone)]
pub struct GenerateRequest {
    /// Instructional prompt sent as the sole content part.
    pub prompt: String,
    /// Store the file-search tool is restricted to.
    pub store_name: String,
    /// Metadata filter expression, e.g. `filename=ticket-to-ride`.
    pub metadata_filter: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct UploadResponse {
    pub(crate) file: FileMetadata,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ListStoresResponse {
    #[serde(default)]
    pub(crate) file_search_stores: Vec<StoreMetadata>,
    #[serde(default)]
    pub(crate) next_page_token: Option<String>,
}

#[derive(Deserialize)]
pub(crate) struct GenerateContentResponse {
    #[serde(default)]
    pub(crate) candidates: Vec<Candidate>,
}

#[derive(Deserialize)]
pub(crate) struct Candidate {
    #[serde(default)]
    pub(crate) content: Option<CandidateContent>,
}

#[derive(Deserialize)]
pub(crate) struct CandidateContent {
    #[serde(default)]
    pub(crate) parts: Vec<ContentPart>,
}

#[derive(Deserialize)]
pub(crate) struct ContentPart {
    #[serde(default)]
    pub(crate) text: Option<String>,
}
