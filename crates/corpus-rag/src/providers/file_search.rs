//! File search provider trait: the single point of contact with the
//! managed retrieval/generation service
//!
//! The core never assumes a particular transport. It requires stable
//! opaque ids, a monotonic `updated_at` per document, grounding metadata
//! attributable to documents, and a timeout on every call.

use async_trait::async_trait;
use bytes::Bytes;
use chrono::{DateTime, Utc};

use crate::error::Result;
use crate::types::{
    ChatMessage, ChunkingConfig, DocumentStatus, GroundingRef, MetadataEntry,
};

/// A store as reported by the service
#[derive(Debug, Clone)]
pub struct RemoteStore {
    /// Opaque resource id
    pub id: String,
    /// Display name
    pub display_name: String,
    /// Creation time
    pub created_at: DateTime<Utc>,
}

/// A document as reported by the service
#[derive(Debug, Clone)]
pub struct RemoteDocument {
    pub id: String,
    pub display_name: String,
    pub mime_type: String,
    pub size_bytes: u64,
    pub status: DocumentStatus,
    pub custom_metadata: Vec<MetadataEntry>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Result of a single status query
#[derive(Debug, Clone, Copy)]
pub struct DocumentStatusUpdate {
    pub status: DocumentStatus,
    /// Service-side update time; the tracker discards updates older than
    /// what it already holds
    pub updated_at: DateTime<Utc>,
}

/// Payload for a document upload, already validated by the tracker
#[derive(Debug, Clone)]
pub struct DocumentUpload {
    pub bytes: Bytes,
    pub mime_type: String,
    pub display_name: String,
    pub metadata: Vec<MetadataEntry>,
    pub chunking: ChunkingConfig,
}

/// One grounding attribution from a generation response
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GroundingAttribution {
    /// Source title; for store grounding this is the document display name
    pub title: Option<String>,
    /// Source URI or resource name
    pub uri: Option<String>,
    /// Retrieved passage text
    pub snippet: Option<String>,
}

/// Reply from a grounded generation call
#[derive(Debug, Clone)]
pub struct GroundedReply {
    pub text: String,
    pub attributions: Vec<GroundingAttribution>,
}

/// Trait for the managed file search and grounded generation API
///
/// Implementations:
/// - `GeminiFileSearch`: Gemini File Search API over HTTPS
/// - `providers::mock::MockFileSearch`: programmable in-memory service
///   used by tests
#[async_trait]
pub trait FileSearchProvider: Send + Sync {
    /// Create a new store with the given display name
    async fn create_store(&self, display_name: &str) -> Result<RemoteStore>;

    /// List all stores in the account
    async fn list_stores(&self) -> Result<Vec<RemoteStore>>;

    /// Delete a store and its documents
    async fn delete_store(&self, store_id: &str) -> Result<()>;

    /// Upload a document into a store
    ///
    /// Returns the created document; the service reports it `Pending`
    /// until asynchronous processing completes.
    async fn upload_document(
        &self,
        store_id: &str,
        upload: DocumentUpload,
    ) -> Result<RemoteDocument>;

    /// Query current processing status of a document
    async fn get_document_status(&self, document_id: &str) -> Result<DocumentStatusUpdate>;

    /// List all documents in a store
    async fn list_documents(&self, store_id: &str) -> Result<Vec<RemoteDocument>>;

    /// Delete a document
    async fn delete_document(&self, document_id: &str) -> Result<()>;

    /// Run one grounded generation call scoped to the given grounding mode
    async fn generate_grounded(
        &self,
        query: &str,
        grounding: &GroundingRef,
        history: &[ChatMessage],
    ) -> Result<GroundedReply>;

    /// Provider name for logging
    fn name(&self) -> &str;
}
