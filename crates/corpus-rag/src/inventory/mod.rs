//! Document lifecycle tracker
//!
//! Owns the canonical local view of uploaded documents and their
//! processing state. Uploads are validated before any network call;
//! state transitions are only ever observed from the service by polling,
//! guarded by monotonic `updated_at` timestamps; a local delete is
//! authoritative over any in-flight refresh.

pub mod view;

use std::sync::Arc;

use bytes::Bytes;
use dashmap::DashMap;
use serde::Serialize;

use crate::config::LimitsConfig;
use crate::error::{Error, Result};
use crate::providers::{DocumentUpload, FileSearchProvider};
use crate::types::{
    validate_metadata, ChunkingConfig, Document, DocumentStatus, FileKind, MetadataEntry,
};

pub use view::{paginate, DocumentPage, ListQuery, SortBy, PAGE_SIZE};

/// Parameters for one upload
#[derive(Debug, Clone, Default)]
pub struct UploadRequest {
    pub display_name: Option<String>,
    pub metadata: Vec<MetadataEntry>,
    pub chunking: Option<ChunkingConfig>,
}

/// Outcome of a `refresh_all` sweep; transient failures are counted, not
/// raised
#[derive(Debug, Clone, Copy, Default, Serialize)]
pub struct RefreshSummary {
    /// Documents whose status or timestamp advanced
    pub updated: usize,
    /// Documents adopted from the service that were not tracked locally
    pub discovered: usize,
    /// Service results discarded as stale or deleted-locally
    pub discarded: usize,
    /// True when the listing call itself failed; prior state is kept
    pub fetch_failed: bool,
}

/// Tracks documents for all stores in the session
pub struct DocumentTracker {
    provider: Arc<dyn FileSearchProvider>,
    documents: DashMap<String, Document>,
    /// Ids deleted locally; refresh results for these are discarded
    tombstones: DashMap<String, ()>,
    limits: LimitsConfig,
}

impl DocumentTracker {
    pub fn new(provider: Arc<dyn FileSearchProvider>, limits: LimitsConfig) -> Self {
        Self {
            provider,
            documents: DashMap::new(),
            tombstones: DashMap::new(),
            limits,
        }
    }

    /// Upload a file into a store
    ///
    /// All client-side limits are checked before the service is contacted;
    /// on success the returned document is `Pending` and already tracked.
    pub async fn upload(
        &self,
        store_id: &str,
        bytes: Bytes,
        mime_type: &str,
        request: UploadRequest,
    ) -> Result<Document> {
        let size = bytes.len() as u64;
        if size > self.limits.max_payload_bytes {
            return Err(Error::PayloadTooLarge {
                size,
                limit: self.limits.max_payload_bytes,
            });
        }

        let display_name = request
            .display_name
            .filter(|name| !name.trim().is_empty())
            .unwrap_or_else(|| "untitled".to_string());

        let kind = if mime_type.is_empty() {
            FileKind::from_display_name(&display_name)
        } else {
            FileKind::from_mime(mime_type)
        };
        if !kind.is_supported() {
            return Err(Error::UnsupportedType(mime_type.to_string()));
        }

        validate_metadata(&request.metadata)?;

        let chunking = request.chunking.unwrap_or_default();
        chunking.validate()?;

        let remote = self
            .provider
            .upload_document(
                store_id,
                DocumentUpload {
                    bytes,
                    mime_type: mime_type.to_string(),
                    display_name,
                    metadata: request.metadata,
                    chunking,
                },
            )
            .await?;

        let document = Document {
            id: remote.id,
            store_id: store_id.to_string(),
            display_name: remote.display_name,
            mime_type: remote.mime_type,
            size_bytes: remote.size_bytes,
            status: remote.status,
            custom_metadata: remote.custom_metadata,
            created_at: remote.created_at,
            updated_at: remote.updated_at,
        };

        tracing::info!(
            "Uploaded {} ({} bytes) to {} as {}",
            document.display_name,
            document.size_bytes,
            store_id,
            document.id
        );
        self.documents.insert(document.id.clone(), document.clone());
        Ok(document)
    }

    /// Re-query the service for one document's status
    ///
    /// Transient failures keep the last known status and return it.
    /// A result older than the local `updated_at` is discarded, so a
    /// stale response can never regress an `Active` document.
    pub async fn refresh_status(&self, document_id: &str) -> Result<DocumentStatus> {
        let current = self
            .get(document_id)
            .ok_or_else(|| Error::not_found(format!("Document {}", document_id)))?;

        let update = match self.provider.get_document_status(document_id).await {
            Ok(update) => update,
            Err(err) if err.is_retryable() => {
                tracing::warn!(
                    "Status refresh for {} failed, keeping last known state: {}",
                    document_id,
                    err
                );
                return Ok(current.status);
            }
            Err(err) => {
                tracing::warn!(
                    "Status refresh for {} rejected ({}), keeping last known state",
                    document_id,
                    err
                );
                return Ok(current.status);
            }
        };

        // The delete may have landed while the query was in flight
        if self.tombstones.contains_key(document_id) {
            tracing::debug!("Discarding refresh for deleted document {}", document_id);
            return Ok(current.status);
        }

        let mut applied = current.status;
        if let Some(mut doc) = self.documents.get_mut(document_id) {
            if update.updated_at < doc.updated_at {
                tracing::debug!(
                    "Discarding stale refresh for {} ({} < {})",
                    document_id,
                    update.updated_at,
                    doc.updated_at
                );
            } else {
                doc.status = update.status;
                doc.updated_at = update.updated_at;
                applied = update.status;
            }
        }
        Ok(applied)
    }

    /// Refresh every document of a store from the service listing
    ///
    /// Idempotent; never raises on a transient failure, prior known-good
    /// state stays intact.
    pub async fn refresh_all(&self, store_id: &str) -> RefreshSummary {
        let mut summary = RefreshSummary::default();

        let remote_docs = match self.provider.list_documents(store_id).await {
            Ok(docs) => docs,
            Err(err) => {
                tracing::warn!(
                    "Document listing for {} failed, keeping local state: {}",
                    store_id,
                    err
                );
                summary.fetch_failed = true;
                return summary;
            }
        };

        for remote in remote_docs {
            if self.tombstones.contains_key(&remote.id) {
                summary.discarded += 1;
                continue;
            }

            if let Some(mut doc) = self.documents.get_mut(&remote.id) {
                if remote.updated_at < doc.updated_at {
                    summary.discarded += 1;
                } else if remote.status != doc.status || remote.updated_at > doc.updated_at {
                    doc.status = remote.status;
                    doc.updated_at = remote.updated_at;
                    doc.display_name = remote.display_name;
                    summary.updated += 1;
                }
                continue;
            }

            // Present remotely but unknown locally, e.g. after a restart
            self.documents.insert(
                remote.id.clone(),
                Document {
                    id: remote.id,
                    store_id: store_id.to_string(),
                    display_name: remote.display_name,
                    mime_type: remote.mime_type,
                    size_bytes: remote.size_bytes,
                    status: remote.status,
                    custom_metadata: remote.custom_metadata,
                    created_at: remote.created_at,
                    updated_at: remote.updated_at,
                },
            );
            summary.discovered += 1;
        }

        summary
    }

    /// Delete a document
    ///
    /// Idempotent from the caller's perspective: an id that is already
    /// absent locally is a no-op success. Returns whether anything was
    /// removed. On a service failure the document is left untouched.
    pub async fn delete(&self, document_id: &str) -> Result<bool> {
        if !self.documents.contains_key(document_id) {
            return Ok(false);
        }

        match self.provider.delete_document(document_id).await {
            Ok(()) => {}
            // Already gone remotely counts as success
            Err(Error::NotFound(_)) => {}
            Err(err) => return Err(err),
        }

        self.tombstones.insert(document_id.to_string(), ());
        let removed = self.documents.remove(document_id).is_some();
        if removed {
            tracing::info!("Deleted document {}", document_id);
        }
        Ok(removed)
    }

    /// Get one tracked document
    pub fn get(&self, document_id: &str) -> Option<Document> {
        self.documents.get(document_id).map(|d| d.clone())
    }

    /// Find a document in a store by its display name
    pub fn find_by_display_name(&self, store_id: &str, display_name: &str) -> Option<Document> {
        self.documents
            .iter()
            .find(|entry| {
                entry.value().store_id == store_id && entry.value().display_name == display_name
            })
            .map(|entry| entry.value().clone())
    }

    /// Snapshot of all documents in a store
    pub fn documents_for(&self, store_id: &str) -> Vec<Document> {
        self.documents
            .iter()
            .filter(|entry| entry.value().store_id == store_id)
            .map(|entry| entry.value().clone())
            .collect()
    }

    /// Filtered, sorted, paginated listing; pure local snapshot
    pub fn list(&self, store_id: &str, query: &ListQuery) -> DocumentPage {
        paginate(self.documents_for(store_id), query)
    }

    /// Drop all local state for a store (used after store deletion)
    pub fn forget_store(&self, store_id: &str) {
        let ids: Vec<String> = self
            .documents
            .iter()
            .filter(|entry| entry.value().store_id == store_id)
            .map(|entry| entry.key().clone())
            .collect();
        for id in ids {
            self.tombstones.insert(id.clone(), ());
            self.documents.remove(&id);
        }
    }
}
