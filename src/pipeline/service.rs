//! Pipeline orchestrator coordinating upload, indexing, and grounded generation.

use std::io::Write as _;
use std::path::Path;

use crate::gemini::{CustomMetadata, FileSearchApi, GenerateRequest, StoreMetadata};
use crate::pipeline::identifier::derive_identifier;
use crate::pipeline::types::{PipelineError, PipelineOptions, PipelineOutcome};
use crate::summary::write_summary;

/// Instructional prompt issued with every grounded generation request.
const SUMMARY_PROMPT: &str = "You are a helpful assistant. You have access to the provided files.
Summarize the file based on the information in these files.
Keep the summary concise and to the point.
When citing sources, use the format (p. X) for page references, where X is the page number.
Format your responses in a clear, readable style that works well with markdown rendering.
Finally make key takeaways Q&A from the file.
";

/// Coordinates the single-shot document workflow: upload, store replacement,
/// import with polling, grounded generation, and summary persistence.
///
/// Each run owns its remote resources exclusively; the uploaded file and its
/// store share the identifier derived from the filename, so re-running on the
/// same file replaces the previous pair instead of accumulating duplicates.
pub struct SearchPipeline {
    backend: Box<dyn FileSearchApi>,
    options: PipelineOptions,
}

impl SearchPipeline {
    /// Build a pipeline around the given backend and options snapshot.
    pub fn new(backend: Box<dyn FileSearchApi>, options: PipelineOptions) -> Self {
        Self { backend, options }
    }

    /// Run the full pipeline for one local document.
    ///
    /// Strictly forward progression; the first failing step aborts the run and
    /// already-created remote resources are left in place. An empty generation
    /// response is not an error: the outcome simply carries no summary path.
    pub async fn run(&self, path: &Path) -> Result<PipelineOutcome, PipelineError> {
        self.check_local_file(path).await?;

        let filename = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();
        let identifier = derive_identifier(&filename);
        tracing::info!(path = %path.display(), identifier, "Selected file");

        let uploaded_name = self.upload(path, &identifier).await?;
        let store = self.replace_store(&identifier).await?;
        self.import(&store.name, &uploaded_name, &identifier).await?;
        let text = self.generate(&store.name, &identifier).await?;

        let summary_path = match text {
            Some(content) => {
                let written = write_summary(&self.options.summary_dir, &identifier, &content)
                    .map_err(PipelineError::WriteSummary)?;
                tracing::info!(path = %written.display(), "Summary saved");
                Some(written)
            }
            None => {
                tracing::warn!("Generation returned no text; nothing saved");
                None
            }
        };

        Ok(PipelineOutcome {
            identifier,
            store_name: store.name,
            summary_path,
        })
    }

    /// Validate the local path before any remote call is made.
    async fn check_local_file(&self, path: &Path) -> Result<(), PipelineError> {
        if path.as_os_str().is_empty() {
            return Err(PipelineError::FileMissing(path.to_path_buf()));
        }

        let metadata = tokio::fs::metadata(path)
            .await
            .map_err(|_| PipelineError::FileMissing(path.to_path_buf()))?;

        let size_mb = metadata.len() / (1024 * 1024);
        if size_mb > self.options.max_file_size_mb {
            return Err(PipelineError::FileTooLarge {
                size_mb,
                limit_mb: self.options.max_file_size_mb,
            });
        }

        Ok(())
    }

    /// Upload the file under the identifier, replacing any previous upload.
    ///
    /// The existence lookup and stale-file deletion are best effort: a failed
    /// lookup is indistinguishable from "doesn't exist" and is only debug-logged.
    async fn upload(&self, path: &Path, identifier: &str) -> Result<String, PipelineError> {
        match self.backend.get_file(identifier).await {
            Ok(Some(existing)) => {
                tracing::info!(file = %existing.name, "File already exists, deleting");
                match self.backend.delete_file(identifier).await {
                    Ok(()) => tracing::info!(identifier, "Stale file deleted"),
                    Err(err) => tracing::debug!(identifier, error = %err, "Stale file cleanup failed"),
                }
            }
            Ok(None) => {}
            Err(err) => {
                tracing::debug!(identifier, error = %err, "File lookup failed (likely doesn't exist)");
            }
        }

        tracing::info!(path = %path.display(), "Uploading file");
        let uploaded = self
            .backend
            .upload_file(path, identifier)
            .await
            .map_err(PipelineError::Upload)?;
        tracing::info!(file = %uploaded.name, "Uploaded");
        Ok(uploaded.name)
    }

    /// Delete every store sharing the identifier's display name, then create a fresh one.
    async fn replace_store(&self, identifier: &str) -> Result<StoreMetadata, PipelineError> {
        let stores = self
            .backend
            .list_stores()
            .await
            .map_err(PipelineError::Store)?;

        for store in stores {
            if store.display_name.as_deref() == Some(identifier) {
                tracing::info!(store = %store.name, "Found existing store, deleting");
                self.backend
                    .delete_store(&store.name)
                    .await
                    .map_err(PipelineError::Store)?;
                tracing::info!(store = %store.name, "Deleted store");
            }
        }

        tracing::info!(display_name = identifier, "Creating File Search store");
        let store = self
            .backend
            .create_store(identifier)
            .await
            .map_err(PipelineError::Store)?;
        tracing::info!(store = %store.name, "Created store");
        Ok(store)
    }

    /// Submit the import job and poll until it settles.
    ///
    /// The 2-second poll loop has no timeout by default: a job that never
    /// reports done is waited on indefinitely. `PipelineOptions::max_polls`
    /// bounds the loop when set.
    async fn import(
        &self,
        store_name: &str,
        file_name: &str,
        identifier: &str,
    ) -> Result<(), PipelineError> {
        tracing::info!(store = store_name, file = file_name, "Importing file to store");
        let metadata = vec![CustomMetadata {
            key: "filename".into(),
            string_value: identifier.into(),
        }];

        let mut operation = self
            .backend
            .import_file(store_name, file_name, metadata)
            .await
            .map_err(PipelineError::Import)?;

        let mut polls = 0usize;
        while !operation.done {
            if let Some(max_polls) = self.options.max_polls
                && polls >= max_polls
            {
                return Err(PipelineError::ImportUnfinished { polls });
            }

            tokio::time::sleep(self.options.poll_interval).await;
            operation = self
                .backend
                .get_operation(&operation.name)
                .await
                .map_err(PipelineError::Import)?;
            polls += 1;
            print!(".");
            let _ = std::io::stdout().flush();
        }
        if polls > 0 {
            println!();
        }

        tracing::info!("Import complete");
        Ok(())
    }

    /// Issue the grounded generation request scoped to the run's store.
    async fn generate(
        &self,
        store_name: &str,
        identifier: &str,
    ) -> Result<Option<String>, PipelineError> {
        tracing::info!(store = store_name, "Generating content");
        self.backend
            .generate(GenerateRequest {
                prompt: SUMMARY_PROMPT.to_string(),
                store_name: store_name.to_string(),
                metadata_filter: format!("filename={identifier}"),
            })
            .await
            .map_err(PipelineError::Generate)
    }
}
