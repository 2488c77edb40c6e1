//! Programmable in-memory provider for exercising the registry, tracker,
//! and session without a network

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use async_trait::async_trait;
use chrono::{DateTime, Duration as ChronoDuration, Utc};
use dashmap::DashMap;
use parking_lot::Mutex;
use uuid::Uuid;

use crate::error::{Error, Result};
use crate::types::{ChatMessage, DocumentStatus, GroundingRef};

use super::file_search::{
    DocumentStatusUpdate, DocumentUpload, FileSearchProvider, GroundedReply,
    GroundingAttribution, RemoteDocument, RemoteStore,
};

/// A scripted generation outcome, consumed in order by `generate_grounded`
#[derive(Debug, Clone)]
pub struct ScriptedReply {
    /// Delay before the reply lands, for exercising interleaved sends
    pub delay_ms: u64,
    /// When false, the call fails with `GenerationFailed`
    pub succeed: bool,
    pub text: String,
    pub attributions: Vec<GroundingAttribution>,
}

impl ScriptedReply {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            delay_ms: 0,
            succeed: true,
            text: text.into(),
            attributions: Vec::new(),
        }
    }

    pub fn with_delay_ms(mut self, delay_ms: u64) -> Self {
        self.delay_ms = delay_ms;
        self
    }

    pub fn with_attribution(mut self, title: &str) -> Self {
        self.attributions.push(GroundingAttribution {
            title: Some(title.to_string()),
            uri: None,
            snippet: None,
        });
        self
    }

    pub fn failing() -> Self {
        Self {
            delay_ms: 0,
            succeed: false,
            text: String::new(),
            attributions: Vec::new(),
        }
    }
}

/// In-memory stand-in for the managed file search service
#[derive(Default)]
pub struct MockFileSearch {
    stores: DashMap<String, RemoteStore>,
    documents: DashMap<String, RemoteDocument>,
    /// Scripted status updates keyed by document id, drained per refresh
    status_script: DashMap<String, VecDeque<DocumentStatusUpdate>>,
    replies: Mutex<VecDeque<ScriptedReply>>,
    /// When set, store creation fails with `QuotaExceeded`
    store_quota: Option<usize>,
    listing_unavailable: AtomicBool,
    status_unavailable: AtomicBool,
    /// Acknowledge deletes but keep serving the document in listings,
    /// simulating service-side propagation lag
    retain_on_delete: AtomicBool,
    store_seq: AtomicUsize,
    pub delete_document_calls: AtomicUsize,
    pub generate_calls: AtomicUsize,
}

impl MockFileSearch {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fail store creation once the account holds this many stores
    pub fn with_store_quota(mut self, quota: usize) -> Self {
        self.store_quota = Some(quota);
        self
    }

    /// Make the next listing calls fail with `ServiceUnavailable`
    pub fn set_listing_unavailable(&self, unavailable: bool) {
        self.listing_unavailable.store(unavailable, Ordering::SeqCst);
    }

    /// Make status queries fail with `ServiceUnavailable`
    pub fn set_status_unavailable(&self, unavailable: bool) {
        self.status_unavailable.store(unavailable, Ordering::SeqCst);
    }

    /// Acknowledge deletes without removing the document from listings
    pub fn set_retain_on_delete(&self, retain: bool) {
        self.retain_on_delete.store(retain, Ordering::SeqCst);
    }

    /// Queue a scripted generation reply
    pub fn push_reply(&self, reply: ScriptedReply) {
        self.replies.lock().push_back(reply);
    }

    /// Queue the next status report for a document
    pub fn push_status(&self, document_id: &str, status: DocumentStatus, updated_at: DateTime<Utc>) {
        self.status_script
            .entry(document_id.to_string())
            .or_default()
            .push_back(DocumentStatusUpdate { status, updated_at });
        // Keep the stored document in sync with the latest scripted state
        if let Some(mut doc) = self.documents.get_mut(document_id) {
            doc.status = status;
            doc.updated_at = updated_at;
        }
    }

    /// Number of documents the service currently holds
    pub fn remote_document_count(&self) -> usize {
        self.documents.len()
    }
}

#[async_trait]
impl FileSearchProvider for MockFileSearch {
    async fn create_store(&self, display_name: &str) -> Result<RemoteStore> {
        if let Some(quota) = self.store_quota {
            if self.stores.len() >= quota {
                return Err(Error::QuotaExceeded(format!(
                    "Account limit of {} stores reached",
                    quota
                )));
            }
        }
        let seq = self.store_seq.fetch_add(1, Ordering::SeqCst);
        let store = RemoteStore {
            id: format!("fileSearchStores/store-{}", seq),
            display_name: display_name.to_string(),
            // Spread creation times so ordering assertions are stable
            created_at: Utc::now() + ChronoDuration::milliseconds(seq as i64),
        };
        self.stores.insert(store.id.clone(), store.clone());
        Ok(store)
    }

    async fn list_stores(&self) -> Result<Vec<RemoteStore>> {
        if self.listing_unavailable.load(Ordering::SeqCst) {
            return Err(Error::service_unavailable("Listing call failed"));
        }
        Ok(self.stores.iter().map(|e| e.value().clone()).collect())
    }

    async fn delete_store(&self, store_id: &str) -> Result<()> {
        if self.stores.remove(store_id).is_none() {
            return Err(Error::not_found(format!("Store {}", store_id)));
        }
        self.documents
            .retain(|_, doc| !doc.id.starts_with(store_id));
        Ok(())
    }

    async fn upload_document(
        &self,
        store_id: &str,
        upload: DocumentUpload,
    ) -> Result<RemoteDocument> {
        if !self.stores.contains_key(store_id) {
            return Err(Error::not_found(format!("Store {}", store_id)));
        }
        let now = Utc::now();
        let doc = RemoteDocument {
            id: format!("{}/documents/{}", store_id, Uuid::new_v4()),
            display_name: upload.display_name,
            mime_type: upload.mime_type,
            size_bytes: upload.bytes.len() as u64,
            status: DocumentStatus::Pending,
            custom_metadata: upload.metadata,
            created_at: now,
            updated_at: now,
        };
        self.documents.insert(doc.id.clone(), doc.clone());
        Ok(doc)
    }

    async fn get_document_status(&self, document_id: &str) -> Result<DocumentStatusUpdate> {
        if self.status_unavailable.load(Ordering::SeqCst) {
            return Err(Error::service_unavailable("Status query failed"));
        }
        if let Some(mut script) = self.status_script.get_mut(document_id) {
            if let Some(update) = script.pop_front() {
                return Ok(update);
            }
        }
        self.documents
            .get(document_id)
            .map(|doc| DocumentStatusUpdate {
                status: doc.status,
                updated_at: doc.updated_at,
            })
            .ok_or_else(|| Error::not_found(format!("Document {}", document_id)))
    }

    async fn list_documents(&self, store_id: &str) -> Result<Vec<RemoteDocument>> {
        if self.listing_unavailable.load(Ordering::SeqCst) {
            return Err(Error::service_unavailable("Listing call failed"));
        }
        Ok(self
            .documents
            .iter()
            .filter(|e| e.key().starts_with(store_id))
            .map(|e| e.value().clone())
            .collect())
    }

    async fn delete_document(&self, document_id: &str) -> Result<()> {
        self.delete_document_calls.fetch_add(1, Ordering::SeqCst);
        if self.retain_on_delete.load(Ordering::SeqCst) {
            return if self.documents.contains_key(document_id) {
                Ok(())
            } else {
                Err(Error::not_found(format!("Document {}", document_id)))
            };
        }
        if self.documents.remove(document_id).is_none() {
            return Err(Error::not_found(format!("Document {}", document_id)));
        }
        Ok(())
    }

    async fn generate_grounded(
        &self,
        _query: &str,
        _grounding: &GroundingRef,
        _history: &[ChatMessage],
    ) -> Result<GroundedReply> {
        self.generate_calls.fetch_add(1, Ordering::SeqCst);
        let scripted = self.replies.lock().pop_front();
        let reply = scripted.unwrap_or_else(|| ScriptedReply::text("(no scripted reply)"));
        if reply.delay_ms > 0 {
            tokio::time::sleep(std::time::Duration::from_millis(reply.delay_ms)).await;
        }
        if !reply.succeed {
            return Err(Error::generation_failed("Scripted failure"));
        }
        Ok(GroundedReply {
            text: reply.text,
            attributions: reply.attributions,
        })
    }

    fn name(&self) -> &str {
        "mock"
    }
}
