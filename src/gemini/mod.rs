//! Gemini File Search integration.

pub mod client;
pub mod types;

use std::path::Path;

use async_trait::async_trait;

pub use client::GeminiService;
pub use types::{
    CustomMetadata, FileMetadata, GeminiError, GenerateRequest, Operation, StoreMetadata,
};

/// Interface over the hosted File Search surface used by the pipeline.
///
/// Implemented by [`GeminiService`] in production and by stub backends in tests.
#[async_trait]
pub trait FileSearchApi: Send + Sync {
    /// Look up a previously uploaded file by identifier; `None` when absent.
    async fn get_file(&self, identifier: &str) -> Result<Option<FileMetadata>, GeminiError>;

    /// Delete an uploaded file by identifier.
    async fn delete_file(&self, identifier: &str) -> Result<(), GeminiError>;

    /// Upload a local file under the given identifier, returning its resource handle.
    async fn upload_file(
        &self,
        path: &Path,
        identifier: &str,
    ) -> Result<FileMetadata, GeminiError>;

    /// Enumerate every File Search store visible to the API key.
    async fn list_stores(&self) -> Result<Vec<StoreMetadata>, GeminiError>;

    /// Create a store with the given display name.
    async fn create_store(&self, display_name: &str) -> Result<StoreMetadata, GeminiError>;

    /// Force-delete a store by its full resource name.
    async fn delete_store(&self, name: &str) -> Result<(), GeminiError>;

    /// Submit an asynchronous import of an uploaded file into a store.
    async fn import_file(
        &self,
        store_name: &str,
        file_name: &str,
        metadata: Vec<CustomMetadata>,
    ) -> Result<Operation, GeminiError>;

    /// Refresh the status of a long-running operation.
    async fn get_operation(&self, name: &str) -> Result<Operation, GeminiError>;

    /// Issue a grounded generation request; `None` when the response carries no text.
    async fn generate(&self, request: GenerateRequest) -> Result<Option<String>, GeminiError>;
}
