//! Store registry
//!
//! Tracks the stores known to this session and which one is active.
//! Switching the active store is a pure local pointer change; everything
//! else goes through the provider.

use std::sync::Arc;

use dashmap::DashMap;
use parking_lot::RwLock;

use crate::config::LimitsConfig;
use crate::error::{Error, Result};
use crate::inventory::DocumentTracker;
use crate::providers::FileSearchProvider;
use crate::types::{DocumentStatus, StatusBreakdown, Store, StoreStats};

/// Maximum length of a store display name
pub const MAX_STORE_NAME_CHARS: usize = 512;

/// Registry of retrieval stores for one session
pub struct StoreRegistry {
    provider: Arc<dyn FileSearchProvider>,
    stores: DashMap<String, Store>,
    active: RwLock<Option<String>>,
    storage_warn_bytes: u64,
}

impl StoreRegistry {
    pub fn new(provider: Arc<dyn FileSearchProvider>, limits: &LimitsConfig) -> Self {
        Self {
            provider,
            stores: DashMap::new(),
            active: RwLock::new(None),
            storage_warn_bytes: limits.storage_warn_bytes,
        }
    }

    /// List all stores, ordered by creation time ascending
    ///
    /// Refreshes the local mirror from the service; a failed listing call
    /// surfaces as `ServiceUnavailable` and the caller may retry.
    pub async fn list_stores(&self) -> Result<Vec<Store>> {
        let remote = self.provider.list_stores().await.map_err(|err| {
            if err.is_retryable() {
                err
            } else {
                Error::service_unavailable(format!("Store listing failed: {}", err))
            }
        })?;

        // Mirror the service view: adopt new stores, drop vanished ones
        let remote_ids: std::collections::HashSet<&str> =
            remote.iter().map(|s| s.id.as_str()).collect();
        self.stores.retain(|id, _| remote_ids.contains(id.as_str()));
        for store in remote {
            self.stores.insert(
                store.id.clone(),
                Store {
                    id: store.id,
                    display_name: store.display_name,
                    created_at: store.created_at,
                },
            );
        }

        let mut stores: Vec<Store> = self.stores.iter().map(|e| e.value().clone()).collect();
        stores.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        Ok(stores)
    }

    /// Create a new store
    ///
    /// The display name must be non-empty and at most 512 characters.
    /// The service enforces the 10-store account limit, surfaced as
    /// `QuotaExceeded`.
    pub async fn create_store(&self, display_name: &str) -> Result<Store> {
        let display_name = display_name.trim();
        if display_name.is_empty() {
            return Err(Error::invalid_argument("Store display name must not be empty"));
        }
        if display_name.chars().count() > MAX_STORE_NAME_CHARS {
            return Err(Error::invalid_argument(format!(
                "Store display name exceeds {} characters",
                MAX_STORE_NAME_CHARS
            )));
        }

        let remote = self.provider.create_store(display_name).await?;
        let store = Store {
            id: remote.id,
            display_name: remote.display_name,
            created_at: remote.created_at,
        };
        tracing::info!("Created store {} ({})", store.display_name, store.id);
        self.stores.insert(store.id.clone(), store.clone());
        Ok(store)
    }

    /// Make a store the active one for this session; pure local change
    pub fn set_active_store(&self, store_id: &str) -> Result<()> {
        if !self.stores.contains_key(store_id) {
            return Err(Error::not_found(format!("Store {}", store_id)));
        }
        *self.active.write() = Some(store_id.to_string());
        Ok(())
    }

    /// Currently active store, if one is selected
    pub fn active_store(&self) -> Option<Store> {
        let active = self.active.read();
        active
            .as_deref()
            .and_then(|id| self.stores.get(id).map(|s| s.clone()))
    }

    /// Look up a store by id
    pub fn get(&self, store_id: &str) -> Option<Store> {
        self.stores.get(store_id).map(|s| s.clone())
    }

    /// Delete a store and forget its documents
    ///
    /// Clears the active pointer when it referenced the deleted store.
    pub async fn delete_store(&self, store_id: &str, tracker: &DocumentTracker) -> Result<()> {
        if !self.stores.contains_key(store_id) {
            return Err(Error::not_found(format!("Store {}", store_id)));
        }

        match self.provider.delete_store(store_id).await {
            Ok(()) => {}
            // Already gone remotely; proceed with local cleanup
            Err(Error::NotFound(_)) => {}
            Err(err) => return Err(err),
        }

        self.stores.remove(store_id);
        tracker.forget_store(store_id);

        let mut active = self.active.write();
        if active.as_deref() == Some(store_id) {
            *active = None;
        }
        tracing::info!("Deleted store {}", store_id);
        Ok(())
    }

    /// Aggregate statistics for a store from the tracker's view
    ///
    /// Warns (non-fatally) when storage exceeds the soft threshold.
    pub fn store_stats(&self, store_id: &str, tracker: &DocumentTracker) -> Result<StoreStats> {
        if !self.stores.contains_key(store_id) {
            return Err(Error::not_found(format!("Store {}", store_id)));
        }

        let documents = tracker.documents_for(store_id);
        let mut breakdown = StatusBreakdown::default();
        let mut storage_bytes = 0u64;
        for doc in &documents {
            storage_bytes += doc.size_bytes;
            match doc.status {
                DocumentStatus::Pending => breakdown.pending += 1,
                DocumentStatus::Active => breakdown.active += 1,
                DocumentStatus::Failed => breakdown.failed += 1,
            }
        }

        let over_soft_limit = storage_bytes > self.storage_warn_bytes;
        if over_soft_limit {
            tracing::warn!(
                "Store {} holds {} bytes, above the soft threshold of {}",
                store_id,
                storage_bytes,
                self.storage_warn_bytes
            );
        }

        Ok(StoreStats {
            store_id: store_id.to_string(),
            document_count: documents.len(),
            storage_bytes,
            status_breakdown: breakdown,
            over_soft_limit,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::inventory::UploadRequest;
    use crate::providers::mock::MockFileSearch;
    use bytes::Bytes;

    fn registry(provider: Arc<MockFileSearch>) -> StoreRegistry {
        StoreRegistry::new(provider, &LimitsConfig::default())
    }

    #[tokio::test]
    async fn create_and_list_in_creation_order() {
        let provider = Arc::new(MockFileSearch::new());
        let registry = registry(provider);

        let first = registry.create_store("alpha").await.unwrap();
        let second = registry.create_store("beta").await.unwrap();

        let stores = registry.list_stores().await.unwrap();
        assert_eq!(stores.len(), 2);
        assert_eq!(stores[0].id, first.id);
        assert_eq!(stores[1].id, second.id);
    }

    #[tokio::test]
    async fn create_rejects_bad_names() {
        let provider = Arc::new(MockFileSearch::new());
        let registry = registry(provider);

        assert!(matches!(
            registry.create_store("   ").await,
            Err(Error::InvalidArgument(_))
        ));

        let long_name = "x".repeat(513);
        assert!(matches!(
            registry.create_store(&long_name).await,
            Err(Error::InvalidArgument(_))
        ));
    }

    #[tokio::test]
    async fn quota_limit_surfaces_as_quota_exceeded() {
        let provider = Arc::new(MockFileSearch::new().with_store_quota(2));
        let registry = registry(provider);

        registry.create_store("one").await.unwrap();
        registry.create_store("two").await.unwrap();
        assert!(matches!(
            registry.create_store("three").await,
            Err(Error::QuotaExceeded(_))
        ));
    }

    #[tokio::test]
    async fn listing_outage_is_service_unavailable() {
        let provider = Arc::new(MockFileSearch::new());
        let registry = registry(provider.clone());
        registry.create_store("alpha").await.unwrap();

        provider.set_listing_unavailable(true);
        assert!(matches!(
            registry.list_stores().await,
            Err(Error::ServiceUnavailable(_))
        ));

        // the caller can retry once the outage clears
        provider.set_listing_unavailable(false);
        assert_eq!(registry.list_stores().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn set_active_requires_known_store() {
        let provider = Arc::new(MockFileSearch::new());
        let registry = registry(provider);

        assert!(matches!(
            registry.set_active_store("fileSearchStores/ghost"),
            Err(Error::NotFound(_))
        ));

        let store = registry.create_store("alpha").await.unwrap();
        registry.set_active_store(&store.id).unwrap();
        assert_eq!(registry.active_store().unwrap().id, store.id);
    }

    #[tokio::test]
    async fn stats_aggregate_the_tracker_view() {
        let provider = Arc::new(MockFileSearch::new());
        let registry = registry(provider.clone());
        let tracker = DocumentTracker::new(provider.clone(), LimitsConfig::default());

        let store = registry.create_store("alpha").await.unwrap();
        for name in ["a.txt", "b.txt", "c.txt"] {
            tracker
                .upload(
                    &store.id,
                    Bytes::from_static(b"0123456789"),
                    "text/plain",
                    UploadRequest {
                        display_name: Some(name.to_string()),
                        ..Default::default()
                    },
                )
                .await
                .unwrap();
        }

        let stats = registry.store_stats(&store.id, &tracker).unwrap();
        assert_eq!(stats.document_count, 3);
        assert_eq!(stats.storage_bytes, 30);
        assert_eq!(stats.status_breakdown.pending, 3);
        assert_eq!(stats.status_breakdown.total(), 3);
        assert!(!stats.over_soft_limit);
    }

    #[tokio::test]
    async fn stats_flag_soft_storage_threshold() {
        let provider = Arc::new(MockFileSearch::new());
        let limits = LimitsConfig {
            storage_warn_bytes: 5,
            ..LimitsConfig::default()
        };
        let registry = StoreRegistry::new(provider.clone(), &limits);
        let tracker = DocumentTracker::new(provider.clone(), LimitsConfig::default());

        let store = registry.create_store("alpha").await.unwrap();
        tracker
            .upload(
                &store.id,
                Bytes::from_static(b"0123456789"),
                "text/plain",
                UploadRequest::default(),
            )
            .await
            .unwrap();

        let stats = registry.store_stats(&store.id, &tracker).unwrap();
        assert!(stats.over_soft_limit);
    }

    #[tokio::test]
    async fn deleting_active_store_clears_the_pointer() {
        let provider = Arc::new(MockFileSearch::new());
        let registry = registry(provider.clone());
        let tracker = DocumentTracker::new(provider.clone(), LimitsConfig::default());

        let store = registry.create_store("alpha").await.unwrap();
        registry.set_active_store(&store.id).unwrap();

        registry.delete_store(&store.id, &tracker).await.unwrap();
        assert!(registry.active_store().is_none());
        assert!(registry.get(&store.id).is_none());
    }
}
