//! Pipeline behavior against a stub File Search backend tracking call sequences.

use std::collections::HashSet;
use std::path::Path;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use docsum::gemini::{
    CustomMetadata, FileMetadata, FileSearchApi, GeminiError, GenerateRequest, Operation,
    StoreMetadata,
};
use docsum::pipeline::{PipelineError, PipelineOptions, SearchPipeline};

#[derive(Default)]
struct StubState {
    calls: Mutex<Vec<String>>,
    files: Mutex<HashSet<String>>,
    stores: Mutex<Vec<StoreMetadata>>,
    store_counter: Mutex<usize>,
    operation_fetches: Mutex<usize>,
    fail_upload: bool,
    /// Number of `get_operation` fetches before the import reports done.
    /// `usize::MAX` models a job that never settles.
    polls_until_done: usize,
    generation_text: Option<String>,
}

#[derive(Clone)]
struct StubBackend(Arc<StubState>);

impl StubBackend {
    fn new(state: StubState) -> (Self, Arc<StubState>) {
        let shared = Arc::new(state);
        (Self(shared.clone()), shared)
    }
}

impl StubState {
    fn record(&self, call: impl Into<String>) {
        self.calls.lock().unwrap().push(call.into());
    }

    fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl FileSearchApi for StubBackend {
    async fn get_file(&self, identifier: &str) -> Result<Option<FileMetadata>, GeminiError> {
        self.0.record(format!("get_file:{identifier}"));
        let exists = self.0.files.lock().unwrap().contains(identifier);
        Ok(exists.then(|| FileMetadata {
            name: format!("files/{identifier}"),
            display_name: None,
        }))
    }

    async fn delete_file(&self, identifier: &str) -> Result<(), GeminiError> {
        self.0.record(format!("delete_file:{identifier}"));
        self.0.files.lock().unwrap().remove(identifier);
        Ok(())
    }

    async fn upload_file(
        &self,
        _path: &Path,
        identifier: &str,
    ) -> Result<FileMetadata, GeminiError> {
        self.0.record(format!("upload_file:{identifier}"));
        if self.0.fail_upload {
            return Err(GeminiError::Io(std::io::Error::other("upload refused")));
        }
        self.0.files.lock().unwrap().insert(identifier.to_string());
        Ok(FileMetadata {
            name: format!("files/{identifier}"),
            display_name: Some(identifier.to_string()),
        })
    }

    async fn list_stores(&self) -> Result<Vec<StoreMetadata>, GeminiError> {
        self.0.record("list_stores");
        Ok(self.0.stores.lock().unwrap().clone())
    }

    async fn create_store(&self, display_name: &str) -> Result<StoreMetadata, GeminiError> {
        self.0.record(format!("create_store:{display_name}"));
        let mut counter = self.0.store_counter.lock().unwrap();
        let store = StoreMetadata {
            name: format!("fileSearchStores/store-{}", *counter),
            display_name: Some(display_name.to_string()),
        };
        *counter += 1;
        self.0.stores.lock().unwrap().push(store.clone());
        Ok(store)
    }

    async fn delete_store(&self, name: &str) -> Result<(), GeminiError> {
        self.0.record(format!("delete_store:{name}"));
        self.0.stores.lock().unwrap().retain(|store| store.name != name);
        Ok(())
    }

    async fn import_file(
        &self,
        store_name: &str,
        file_name: &str,
        _metadata: Vec<CustomMetadata>,
    ) -> Result<Operation, GeminiError> {
        self.0.record(format!("import_file:{store_name}:{file_name}"));
        Ok(Operation {
            name: "operations/import-1".to_string(),
            done: self.0.polls_until_done == 0,
        })
    }

    async fn get_operation(&self, name: &str) -> Result<Operation, GeminiError> {
        self.0.record(format!("get_operation:{name}"));
        let mut fetches = self.0.operation_fetches.lock().unwrap();
        *fetches += 1;
        Ok(Operation {
            name: name.to_string(),
            done: *fetches >= self.0.polls_until_done,
        })
    }

    async fn generate(&self, request: GenerateRequest) -> Result<Option<String>, GeminiError> {
        self.0.record(format!(
            "generate:{}:{}",
            request.store_name, request.metadata_filter
        ));
        Ok(self.0.generation_text.clone())
    }
}

fn test_options(summary_dir: &Path) -> PipelineOptions {
    PipelineOptions {
        summary_dir: summary_dir.to_path_buf(),
        max_file_size_mb: 20,
        poll_interval: Duration::ZERO,
        max_polls: None,
    }
}

fn stub_state(generation_text: Option<&str>) -> StubState {
    StubState {
        polls_until_done: 1,
        generation_text: generation_text.map(str::to_string),
        ..StubState::default()
    }
}

#[tokio::test]
async fn missing_file_makes_zero_remote_calls() {
    let workdir = tempfile::tempdir().expect("tempdir");
    let (backend, state) = StubBackend::new(stub_state(Some("Summary.")));
    let pipeline = SearchPipeline::new(Box::new(backend), test_options(workdir.path()));

    let err = pipeline
        .run(&workdir.path().join("does-not-exist.txt"))
        .await
        .expect_err("missing file must fail");

    assert!(matches!(err, PipelineError::FileMissing(_)));
    assert!(state.calls().is_empty(), "no remote call expected");

    let err = pipeline
        .run(Path::new(""))
        .await
        .expect_err("empty path must fail");
    assert!(matches!(err, PipelineError::FileMissing(_)));
    assert!(state.calls().is_empty());
}

#[tokio::test]
async fn upload_failure_short_circuits_store_and_import() {
    let workdir = tempfile::tempdir().expect("tempdir");
    let document = workdir.path().join("report.txt");
    std::fs::write(&document, "quarterly numbers").expect("write document");

    let (backend, state) = StubBackend::new(StubState {
        fail_upload: true,
        ..stub_state(Some("Summary."))
    });
    let pipeline =
        SearchPipeline::new(Box::new(backend), test_options(&workdir.path().join("summary")));

    let err = pipeline.run(&document).await.expect_err("upload must fail");
    assert!(matches!(err, PipelineError::Upload(_)));

    let calls = state.calls();
    assert!(calls.contains(&"upload_file:report".to_string()));
    assert!(
        !calls.iter().any(|call| call.starts_with("list_stores")
            || call.starts_with("create_store")
            || call.starts_with("import_file")),
        "store and import steps must not run after a failed upload: {calls:?}"
    );
}

#[tokio::test]
async fn end_to_end_run_writes_summary_file() {
    let workdir = tempfile::tempdir().expect("tempdir");
    let document = workdir.path().join("report.txt");
    std::fs::write(&document, "quarterly numbers").expect("write document");
    let summary_dir = workdir.path().join("summary");

    let (backend, state) = StubBackend::new(stub_state(Some("Summary.")));
    let pipeline = SearchPipeline::new(Box::new(backend), test_options(&summary_dir));

    let outcome = pipeline.run(&document).await.expect("pipeline run");

    assert_eq!(outcome.identifier, "report");
    let summary_path = outcome.summary_path.expect("summary written");
    assert_eq!(summary_path, summary_dir.join("report_summary.md"));
    assert_eq!(
        std::fs::read_to_string(&summary_path).expect("read summary"),
        "Summary."
    );

    // One poll refresh was needed before the import settled.
    assert_eq!(*state.operation_fetches.lock().unwrap(), 1);
    assert!(
        state
            .calls()
            .contains(&"generate:fileSearchStores/store-0:filename=report".to_string())
    );
}

#[tokio::test]
async fn rerun_replaces_remote_file_and_store() {
    let workdir = tempfile::tempdir().expect("tempdir");
    let document = workdir.path().join("report.txt");
    std::fs::write(&document, "quarterly numbers").expect("write document");

    let (backend, state) = StubBackend::new(stub_state(Some("Summary.")));
    let pipeline =
        SearchPipeline::new(Box::new(backend), test_options(&workdir.path().join("summary")));

    pipeline.run(&document).await.expect("first run");
    pipeline.run(&document).await.expect("second run");

    let files = state.files.lock().unwrap();
    assert_eq!(files.len(), 1, "rerun must not accumulate remote files");
    assert!(files.contains("report"));

    let stores = state.stores.lock().unwrap();
    let matching: Vec<_> = stores
        .iter()
        .filter(|store| store.display_name.as_deref() == Some("report"))
        .collect();
    assert_eq!(matching.len(), 1, "rerun must not accumulate stores");
    assert_eq!(matching[0].name, "fileSearchStores/store-1");

    // The second run cleans up the first run's resources before recreating them.
    let calls = state.calls();
    let delete_file = calls
        .iter()
        .position(|call| call == "delete_file:report")
        .expect("stale file deleted on rerun");
    let second_upload = calls
        .iter()
        .rposition(|call| call == "upload_file:report")
        .expect("second upload");
    assert!(delete_file < second_upload);

    let delete_store = calls
        .iter()
        .position(|call| call == "delete_store:fileSearchStores/store-0")
        .expect("stale store deleted on rerun");
    let second_create = calls
        .iter()
        .rposition(|call| call == "create_store:report")
        .expect("second create");
    assert!(delete_store < second_create);
}

#[tokio::test]
async fn bounded_poll_surfaces_unfinished_import() {
    let workdir = tempfile::tempdir().expect("tempdir");
    let document = workdir.path().join("report.txt");
    std::fs::write(&document, "quarterly numbers").expect("write document");

    let (backend, state) = StubBackend::new(StubState {
        polls_until_done: usize::MAX,
        generation_text: Some("Summary.".to_string()),
        ..StubState::default()
    });
    let pipeline =
        SearchPipeline::new(Box::new(backend), PipelineOptions {
            max_polls: Some(3),
            ..test_options(&workdir.path().join("summary"))
        });

    let err = pipeline
        .run(&document)
        .await
        .expect_err("bounded poll must give up");

    assert!(matches!(err, PipelineError::ImportUnfinished { polls: 3 }));
    assert_eq!(*state.operation_fetches.lock().unwrap(), 3);
    assert!(!state.calls().iter().any(|call| call.starts_with("generate")));
}

#[tokio::test]
async fn empty_generation_writes_nothing_and_is_not_an_error() {
    let workdir = tempfile::tempdir().expect("tempdir");
    let document = workdir.path().join("report.txt");
    std::fs::write(&document, "quarterly numbers").expect("write document");
    let summary_dir = workdir.path().join("summary");

    let (backend, _state) = StubBackend::new(stub_state(None));
    let pipeline = SearchPipeline::new(Box::new(backend), test_options(&summary_dir));

    let outcome = pipeline.run(&document).await.expect("run succeeds");

    assert!(outcome.summary_path.is_none());
    assert!(
        !summary_dir.join("report_summary.md").exists(),
        "no summary file may be written for an empty response"
    );
}
