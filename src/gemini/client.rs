//! HTTP client wrapper for the Gemini File Search REST surface.

use std::path::Path;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Method, StatusCode, multipart};
use serde_json::json;

use crate::config::get_config;
use crate::gemini::FileSearchApi;
use crate::gemini::types::{
    CustomMetadata, FileMetadata, GeminiError, GenerateContentResponse, GenerateRequest,
    ListStoresResponse, Operation, StoreMetadata, UploadResponse,
};

const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com";

/// Generation parameters forwarded verbatim to generateContent.
#[derive(Debug, Clone, Copy)]
pub(crate) struct GenerationParams {
    pub(crate) temperature: f32,
    pub(crate) top_p: f32,
    pub(crate) top_k: i32,
    pub(crate) max_output_tokens: i32,
}

/// Lightweight HTTP client for Gemini file, store, and generation operations.
pub struct GeminiService {
    pub(crate) client: Client,
    pub(crate) base_url: String,
    pub(crate) api_key: String,
    pub(crate) model: String,
    pub(crate) generation: GenerationParams,
    pub(crate) upload_timeout: Duration,
}

impl GeminiService {
    /// Construct a new client using configuration derived from the environment.
    pub fn new() -> Result<Self, GeminiError> {
        let config = get_config();
        let client = Client::builder().user_agent("docsum/0.1").build()?;

        let base_url = normalize_base_url(config.base_url.as_deref().unwrap_or(DEFAULT_BASE_URL))
            .map_err(GeminiError::InvalidUrl)?;
        tracing::debug!(url = %base_url, model = %config.gemini_model, "Initialized Gemini HTTP client");

        Ok(Self {
            client,
            base_url,
            api_key: config.google_api_key.clone(),
            model: config.gemini_model.clone(),
            generation: GenerationParams {
                temperature: config.temperature,
                top_p: config.top_p,
                top_k: config.top_k,
                max_output_tokens: config.max_output_tokens,
            },
            upload_timeout: Duration::from_secs(config.upload_timeout_secs),
        })
    }

    fn request(&self, method: Method, path: &str) -> reqwest::RequestBuilder {
        let url = format_endpoint(&self.base_url, path);
        self.client
            .request(method, url)
            .header("x-goog-api-key", &self.api_key)
    }

    async fn ensure_success<F>(
        &self,
        response: reqwest::Response,
        on_success: F,
    ) -> Result<reqwest::Response, GeminiError>
    where
        F: FnOnce(),
    {
        if response.status().is_success() {
            on_success();
            Ok(response)
        } else {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            let error = GeminiError::UnexpectedStatus { status, body };
            tracing::error!(error = %error, "Gemini request failed");
            Err(error)
        }
    }
}

#[async_trait]
impl FileSearchApi for GeminiService {
    async fn get_file(&self, identifier: &str) -> Result<Option<FileMetadata>, GeminiError> {
        let response = self
            .request(Method::GET, &format!("v1beta/files/{identifier}"))
            .send()
            .await?;

        match response.status() {
            StatusCode::NOT_FOUND => Ok(None),
            status if status.is_success() => Ok(Some(response.json().await?)),
            status => {
                let body = response.text().await.unwrap_or_default();
                Err(GeminiError::UnexpectedStatus { status, body })
            }
        }
    }

    async fn delete_file(&self, identifier: &str) -> Result<(), GeminiError> {
        let response = self
            .request(Method::DELETE, &format!("v1beta/files/{identifier}"))
            .send()
            .await?;
        self.ensure_success(response, || {
            tracing::debug!(identifier, "Remote file deleted");
        })
        .await?;
        Ok(())
    }

    async fn upload_file(
        &self,
        path: &Path,
        identifier: &str,
    ) -> Result<FileMetadata, GeminiError> {
        let bytes = tokio::fs::read(path).await?;
        let file_name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| identifier.to_string());
        let mime = mime_guess::from_path(path).first_or_octet_stream();

        let metadata = json!({
            "file": {
                "name": format!("files/{identifier}"),
                "displayName": file_name,
            }
        });

        let form = multipart::Form::new()
            .part(
                "metadata",
                multipart::Part::text(metadata.to_string()).mime_str("application/json")?,
            )
            .part(
                "file",
                multipart::Part::bytes(bytes)
                    .file_name(file_name)
                    .mime_str(mime.essence_str())?,
            );

        let response = self
            .request(Method::POST, "upload/v1beta/files")
            .query(&[("uploadType", "multipart")])
            .timeout(self.upload_timeout)
            .multipart(form)
            .send()
            .await?;

        let response = self
            .ensure_success(response, || {
                tracing::debug!(identifier, "File uploaded");
            })
            .await?;
        let payload: UploadResponse = response.json().await?;
        Ok(payload.file)
    }

    async fn list_stores(&self) -> Result<Vec<StoreMetadata>, GeminiError> {
        let mut stores = Vec::new();
        let mut page_token: Option<String> = None;

        loop {
            let mut request = self.request(Method::GET, "v1beta/fileSearchStores");
            if let Some(token) = &page_token {
                request = request.query(&[("pageToken", token)]);
            }

            let response = request.send().await?;
            let response = self.ensure_success(response, || {}).await?;
            let payload: ListStoresResponse = response.json().await?;
            stores.extend(payload.file_search_stores);

            match payload.next_page_token {
                Some(token) if !token.is_empty() => page_token = Some(token),
                _ => break,
            }
        }

        Ok(stores)
    }

    async fn create_store(&self, display_name: &str) -> Result<StoreMetadata, GeminiError> {
        let response = self
            .request(Method::POST, "v1beta/fileSearchStores")
            .json(&json!({ "displayName": display_name }))
            .send()
            .await?;

        let response = self
            .ensure_success(response, || {
                tracing::debug!(display_name, "Store created");
            })
            .await?;
        Ok(response.json().await?)
    }

    async fn delete_store(&self, name: &str) -> Result<(), GeminiError> {
        let response = self
            .request(Method::DELETE, &format!("v1beta/{name}"))
            .query(&[("force", "true")])
            .send()
            .await?;
        self.ensure_success(response, || {
            tracing::debug!(store = name, "Store deleted");
        })
        .await?;
        Ok(())
    }

    async fn import_file(
        &self,
        store_name: &str,
        file_name: &str,
        metadata: Vec<CustomMetadata>,
    ) -> Result<Operation, GeminiError> {
        let response = self
            .request(Method::POST, &format!("v1beta/{store_name}:importFile"))
            .json(&json!({
                "fileName": file_name,
                "customMetadata": metadata,
            }))
            .send()
            .await?;

        let response = self
            .ensure_success(response, || {
                tracing::debug!(store = store_name, file = file_name, "Import submitted");
            })
            .await?;
        Ok(response.json().await?)
    }

    async fn get_operation(&self, name: &str) -> Result<Operation, GeminiError> {
        let response = self
            .request(Method::GET, &format!("v1beta/{name}"))
            .send()
            .await?;
        let response = self.ensure_success(response, || {}).await?;
        Ok(response.json().await?)
    }

    async fn generate(&self, request: GenerateRequest) -> Result<Option<String>, GeminiError> {
        let body = json!({
            "contents": [
                { "parts": [{ "text": request.prompt }] }
            ],
            "generationConfig": {
                "temperature": self.generation.temperature,
                "topP": self.generation.top_p,
                "topK": self.generation.top_k,
                "maxOutputTokens": self.generation.max_output_tokens,
            },
            "tools": [
                {
                    "fileSearch": {
                        "fileSearchStoreNames": [request.store_name],
                        "metadataFilter": request.metadata_filter,
                    }
                }
            ],
        });

        let response = self
            .request(
                Method::POST,
                &format!("v1beta/models/{}:generateContent", self.model),
            )
            .json(&body)
            .send()
            .await?;

        let response = self
            .ensure_success(response, || {
                tracing::debug!(model = %self.model, "Generation completed");
            })
            .await?;
        let payload: GenerateContentResponse = response.json().await?;
        Ok(extract_text(payload))
    }
}

fn extract_text(payload: GenerateContentResponse) -> Option<String> {
    let mut text = String::new();
    for candidate in payload.candidates {
        let Some(content) = candidate.content else {
            continue;
        };
        for part in content.parts {
            if let Some(fragment) = part.text {
                text.push_str(&fragment);
            }
        }
    }

    if text.trim().is_empty() { None } else { Some(text) }
}

fn normalize_base_url(url: &str) -> Result<String, String> {
    let mut parsed = reqwest::Url::parse(url).map_err(|err| err.to_string())?;
    let path = parsed.path().trim_end_matches('/').to_string();
    parsed.set_path(&path);
    Ok(parsed.to_string())
}

fn format_endpoint(base: &str, path: &str) -> String {
    let base = base.trim_end_matches('/');
    let path = path.trim_start_matches('/');
    format!("{base}/{path}")
}
