//! Gemini File Search API client
//!
//! Implements `FileSearchProvider` against the v1beta REST surface:
//! store CRUD under `fileSearchStores`, documents under
//! `{store}/documents`, uploads through the media-upload endpoint, and
//! grounded generation through `models/{model}:generateContent` with a
//! `file_search` or `google_search` tool.

use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::StatusCode;
use serde::Deserialize;

use crate::config::ServiceConfig;
use crate::error::{Error, Result};
use crate::types::{ChatMessage, DocumentStatus, GroundingRef, MetadataEntry, Role};

use super::file_search::{
    DocumentStatusUpdate, DocumentUpload, FileSearchProvider, GroundedReply,
    GroundingAttribution, RemoteDocument, RemoteStore,
};

/// Gemini File Search client
pub struct GeminiFileSearch {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
    model: String,
    upload_timeout: Duration,
    generate_timeout: Duration,
}

impl GeminiFileSearch {
    /// Create a client from service configuration
    ///
    /// The API key is resolved from the configured environment variable.
    pub fn new(config: &ServiceConfig) -> Result<Self> {
        let api_key = config.resolve_api_key()?;
        Self::with_api_key(config, api_key)
    }

    /// Create a client with an explicit API key
    pub fn with_api_key(config: &ServiceConfig, api_key: String) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()
            .map_err(|e| Error::Config(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key,
            model: config.model.clone(),
            upload_timeout: Duration::from_secs(config.upload_timeout_secs),
            generate_timeout: Duration::from_secs(config.generate_timeout_secs),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}/v1beta/{}?key={}", self.base_url, path, self.api_key)
    }

    fn upload_url(&self, store_id: &str) -> String {
        format!(
            "{}/upload/v1beta/{}:uploadToFileSearchStore?key={}",
            self.base_url, store_id, self.api_key
        )
    }

    /// Map a non-success HTTP status to the error taxonomy
    fn error_for_status(operation: &str, status: StatusCode, body: &str) -> Error {
        let message = format!("{} failed ({}): {}", operation, status, body);
        match status {
            StatusCode::NOT_FOUND => Error::NotFound(message),
            StatusCode::TOO_MANY_REQUESTS => Error::QuotaExceeded(message),
            StatusCode::BAD_REQUEST => Error::InvalidArgument(message),
            StatusCode::GATEWAY_TIMEOUT => Error::Timeout(message),
            _ => Error::ServiceUnavailable(message),
        }
    }

    async fn check(operation: &str, response: reqwest::Response) -> Result<reqwest::Response> {
        if response.status().is_success() {
            return Ok(response);
        }
        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        Err(Self::error_for_status(operation, status, &body))
    }
}

// ---- Wire types ----

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WireStore {
    name: String,
    display_name: Option<String>,
    create_time: Option<DateTime<Utc>>,
}

impl WireStore {
    fn into_remote(self) -> RemoteStore {
        let display_name = self
            .display_name
            .unwrap_or_else(|| self.name.rsplit('/').next().unwrap_or(&self.name).to_string());
        RemoteStore {
            id: self.name,
            display_name,
            created_at: self.create_time.unwrap_or_else(Utc::now),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ListStoresResponse {
    #[serde(default)]
    file_search_stores: Vec<WireStore>,
    next_page_token: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WireMetadata {
    key: String,
    string_value: Option<String>,
    numeric_value: Option<f64>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WireDocument {
    name: String,
    display_name: Option<String>,
    mime_type: Option<String>,
    #[serde(default, deserialize_with = "de_string_or_u64")]
    size_bytes: u64,
    state: Option<String>,
    #[serde(default)]
    custom_metadata: Vec<WireMetadata>,
    create_time: Option<DateTime<Utc>>,
    update_time: Option<DateTime<Utc>>,
}

impl WireDocument {
    fn into_remote(self) -> RemoteDocument {
        let status = self
            .state
            .as_deref()
            .and_then(DocumentStatus::from_service_state)
            .unwrap_or(DocumentStatus::Pending);
        let display_name = self
            .display_name
            .unwrap_or_else(|| self.name.rsplit('/').next().unwrap_or(&self.name).to_string());
        let custom_metadata = self
            .custom_metadata
            .into_iter()
            .map(|m| {
                let value = m
                    .string_value
                    .or_else(|| m.numeric_value.map(|n| n.to_string()))
                    .unwrap_or_default();
                MetadataEntry::new(m.key, value)
            })
            .collect();
        let created_at = self.create_time.unwrap_or_else(Utc::now);
        RemoteDocument {
            id: self.name,
            display_name,
            mime_type: self.mime_type.unwrap_or_default(),
            size_bytes: self.size_bytes,
            status,
            custom_metadata,
            created_at,
            updated_at: self.update_time.unwrap_or(created_at),
        }
    }
}

/// Google APIs serialize int64 fields as JSON strings
fn de_string_or_u64<'de, D>(deserializer: D) -> std::result::Result<u64, D::Error>
where
    D: serde::Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum StringOrU64 {
        String(String),
        Number(u64),
    }

    match Option::<StringOrU64>::deserialize(deserializer)? {
        None => Ok(0),
        Some(StringOrU64::Number(n)) => Ok(n),
        Some(StringOrU64::String(s)) => s.parse().map_err(serde::de::Error::custom),
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ListDocumentsResponse {
    #[serde(default)]
    documents: Vec<WireDocument>,
    next_page_token: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UploadOperation {
    /// Document resource, present once the service has registered the upload
    document: Option<WireDocument>,
    response: Option<UploadOperationResponse>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UploadOperationResponse {
    document: Option<WireDocument>,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Candidate {
    content: Option<CandidateContent>,
    grounding_metadata: Option<GroundingMetadata>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Debug, Deserialize)]
struct CandidatePart {
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GroundingMetadata {
    #[serde(default)]
    grounding_chunks: Vec<GroundingChunk>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GroundingChunk {
    retrieved_context: Option<GroundingSource>,
    web: Option<GroundingSource>,
}

#[derive(Debug, Deserialize)]
struct GroundingSource {
    uri: Option<String>,
    title: Option<String>,
    text: Option<String>,
}

impl GroundingChunk {
    fn into_attribution(self) -> Option<GroundingAttribution> {
        let source = self.retrieved_context.or(self.web)?;
        if source.uri.is_none() && source.title.is_none() && source.text.is_none() {
            return None;
        }
        Some(GroundingAttribution {
            title: source.title,
            uri: source.uri,
            snippet: source.text,
        })
    }
}

#[async_trait]
impl FileSearchProvider for GeminiFileSearch {
    async fn create_store(&self, display_name: &str) -> Result<RemoteStore> {
        let response = self
            .http
            .post(self.url("fileSearchStores"))
            .json(&serde_json::json!({ "displayName": display_name }))
            .send()
            .await?;
        let response = Self::check("Create store", response).await?;
        let store: WireStore = response.json().await?;
        Ok(store.into_remote())
    }

    async fn list_stores(&self) -> Result<Vec<RemoteStore>> {
        let mut stores = Vec::new();
        let mut page_token: Option<String> = None;

        loop {
            let mut request = self.http.get(self.url("fileSearchStores"));
            if let Some(token) = &page_token {
                request = request.query(&[("pageToken", token.as_str())]);
            }
            let response = Self::check("List stores", request.send().await?).await?;
            let page: ListStoresResponse = response.json().await?;
            stores.extend(page.file_search_stores.into_iter().map(WireStore::into_remote));
            match page.next_page_token {
                Some(token) if !token.is_empty() => page_token = Some(token),
                _ => break,
            }
        }

        Ok(stores)
    }

    async fn delete_store(&self, store_id: &str) -> Result<()> {
        let response = self
            .http
            .delete(self.url(store_id))
            .query(&[("force", "true")])
            .send()
            .await?;
        Self::check("Delete store", response).await?;
        Ok(())
    }

    async fn upload_document(
        &self,
        store_id: &str,
        upload: DocumentUpload,
    ) -> Result<RemoteDocument> {
        let metadata: Vec<serde_json::Value> = upload
            .metadata
            .iter()
            .map(|m| serde_json::json!({ "key": m.key, "stringValue": m.value }))
            .collect();

        let config = serde_json::json!({
            "displayName": upload.display_name,
            "customMetadata": metadata,
            "chunkingConfig": {
                "whiteSpaceConfig": {
                    "maxTokensPerChunk": upload.chunking.chunk_size_tokens,
                    "maxOverlapTokens": upload.chunking.chunk_overlap_tokens,
                }
            }
        });

        let metadata_part = reqwest::multipart::Part::text(config.to_string())
            .mime_str("application/json")
            .map_err(|e| Error::ServiceUnavailable(format!("Invalid metadata part: {}", e)))?;
        let file_part = reqwest::multipart::Part::bytes(upload.bytes.to_vec())
            .file_name(upload.display_name.clone())
            .mime_str(&upload.mime_type)
            .map_err(|_| Error::UnsupportedType(upload.mime_type.clone()))?;

        let form = reqwest::multipart::Form::new()
            .part("metadata", metadata_part)
            .part("file", file_part);

        let response = self
            .http
            .post(self.upload_url(store_id))
            .timeout(self.upload_timeout)
            .multipart(form)
            .send()
            .await?;
        let response = Self::check("Upload", response).await?;

        let operation: UploadOperation = response.json().await?;
        operation
            .document
            .or(operation.response.and_then(|r| r.document))
            .map(WireDocument::into_remote)
            .ok_or_else(|| {
                Error::service_unavailable("Upload response did not include a document")
            })
    }

    async fn get_document_status(&self, document_id: &str) -> Result<DocumentStatusUpdate> {
        let response = self.http.get(self.url(document_id)).send().await?;
        let response = Self::check("Status query", response).await?;
        let doc: WireDocument = response.json().await?;
        let remote = doc.into_remote();
        Ok(DocumentStatusUpdate {
            status: remote.status,
            updated_at: remote.updated_at,
        })
    }

    async fn list_documents(&self, store_id: &str) -> Result<Vec<RemoteDocument>> {
        let mut documents = Vec::new();
        let mut page_token: Option<String> = None;

        loop {
            let mut request = self
                .http
                .get(self.url(&format!("{}/documents", store_id)));
            if let Some(token) = &page_token {
                request = request.query(&[("pageToken", token.as_str())]);
            }
            let response = Self::check("List documents", request.send().await?).await?;
            let page: ListDocumentsResponse = response.json().await?;
            documents.extend(page.documents.into_iter().map(WireDocument::into_remote));
            match page.next_page_token {
                Some(token) if !token.is_empty() => page_token = Some(token),
                _ => break,
            }
        }

        Ok(documents)
    }

    async fn delete_document(&self, document_id: &str) -> Result<()> {
        let response = self.http.delete(self.url(document_id)).send().await?;
        Self::check("Delete document", response).await?;
        Ok(())
    }

    async fn generate_grounded(
        &self,
        query: &str,
        grounding: &GroundingRef,
        history: &[ChatMessage],
    ) -> Result<GroundedReply> {
        // Exactly one grounding tool per call; the service offers no
        // combined store + web mode.
        let tool = match grounding {
            GroundingRef::Store { store_id } => serde_json::json!({
                "fileSearch": { "fileSearchStoreNames": [store_id] }
            }),
            GroundingRef::WebSearch => serde_json::json!({ "googleSearch": {} }),
        };

        let mut contents: Vec<serde_json::Value> = history
            .iter()
            .map(|message| {
                let role = match message.role {
                    Role::User => "user",
                    Role::Assistant => "model",
                };
                serde_json::json!({
                    "role": role,
                    "parts": [{ "text": message.content }],
                })
            })
            .collect();
        contents.push(serde_json::json!({
            "role": "user",
            "parts": [{ "text": query }],
        }));

        let request = serde_json::json!({
            "contents": contents,
            "tools": [tool],
        });

        let response = self
            .http
            .post(self.url(&format!("models/{}:generateContent", self.model)))
            .timeout(self.generate_timeout)
            .json(&request)
            .send()
            .await?;
        let response = Self::check("Generation", response).await?;

        let generated: GenerateResponse = response
            .json()
            .await
            .map_err(|e| Error::generation_failed(format!("Unparseable response: {}", e)))?;

        let candidate = generated
            .candidates
            .into_iter()
            .next()
            .ok_or_else(|| Error::generation_failed("No candidates in response"))?;

        let text = candidate
            .content
            .map(|content| {
                content
                    .parts
                    .into_iter()
                    .filter_map(|p| p.text)
                    .collect::<Vec<_>>()
                    .join("")
            })
            .filter(|t| !t.is_empty())
            .ok_or_else(|| Error::generation_failed("No text in response"))?;

        let attributions = candidate
            .grounding_metadata
            .map(|metadata| {
                metadata
                    .grounding_chunks
                    .into_iter()
                    .filter_map(GroundingChunk::into_attribution)
                    .collect()
            })
            .unwrap_or_default();

        Ok(GroundedReply { text, attributions })
    }

    fn name(&self) -> &str {
        "gemini-file-search"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_wire_document() {
        let doc: WireDocument = serde_json::from_str(
            r#"{
                "name": "fileSearchStores/abc/documents/def",
                "displayName": "notes.txt",
                "mimeType": "text/plain",
                "sizeBytes": "2048",
                "state": "STATE_PENDING",
                "customMetadata": [{"key": "author", "stringValue": "maria"}],
                "createTime": "2025-01-10T12:00:00Z",
                "updateTime": "2025-01-10T12:00:05Z"
            }"#,
        )
        .expect("valid document");

        let remote = doc.into_remote();
        assert_eq!(remote.id, "fileSearchStores/abc/documents/def");
        assert_eq!(remote.display_name, "notes.txt");
        assert_eq!(remote.size_bytes, 2048);
        assert_eq!(remote.status, DocumentStatus::Pending);
        assert_eq!(remote.custom_metadata[0].key, "author");
        assert!(remote.updated_at > remote.created_at);
    }

    #[test]
    fn size_bytes_accepts_number_or_string() {
        let as_number: WireDocument =
            serde_json::from_str(r#"{"name": "d", "sizeBytes": 7}"#).unwrap();
        assert_eq!(as_number.size_bytes, 7);

        let as_string: WireDocument =
            serde_json::from_str(r#"{"name": "d", "sizeBytes": "7"}"#).unwrap();
        assert_eq!(as_string.size_bytes, 7);

        let absent: WireDocument = serde_json::from_str(r#"{"name": "d"}"#).unwrap();
        assert_eq!(absent.size_bytes, 0);
    }

    #[test]
    fn grounding_chunk_prefers_retrieved_context() {
        let chunk: GroundingChunk = serde_json::from_str(
            r#"{"retrievedContext": {"title": "notes.txt", "text": "passage"}}"#,
        )
        .unwrap();
        let attribution = chunk.into_attribution().expect("attribution");
        assert_eq!(attribution.title.as_deref(), Some("notes.txt"));
        assert_eq!(attribution.snippet.as_deref(), Some("passage"));

        let empty: GroundingChunk = serde_json::from_str(r#"{}"#).unwrap();
        assert!(empty.into_attribution().is_none());
    }

    #[test]
    fn status_mapping_covers_taxonomy() {
        let err = GeminiFileSearch::error_for_status(
            "Create store",
            StatusCode::TOO_MANY_REQUESTS,
            "RESOURCE_EXHAUSTED",
        );
        assert!(matches!(err, Error::QuotaExceeded(_)));

        let err =
            GeminiFileSearch::error_for_status("Status query", StatusCode::NOT_FOUND, "gone");
        assert!(matches!(err, Error::NotFound(_)));

        let err = GeminiFileSearch::error_for_status(
            "List stores",
            StatusCode::INTERNAL_SERVER_ERROR,
            "boom",
        );
        assert!(matches!(err, Error::ServiceUnavailable(_)));
    }
}
