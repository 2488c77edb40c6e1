//! Store types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A named, service-managed collection of documents used for grounding
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Store {
    /// Opaque id assigned by the external service, immutable
    pub id: String,
    /// Display name chosen by the user
    pub display_name: String,
    /// Creation timestamp
    pub created_at: DateTime<Utc>,
}

/// Per-status document counts for a store
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct StatusBreakdown {
    pub pending: usize,
    pub active: usize,
    pub failed: usize,
}

impl StatusBreakdown {
    pub fn total(&self) -> usize {
        self.pending + self.active + self.failed
    }
}

/// Aggregated statistics for one store, derived from the tracker's view
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreStats {
    pub store_id: String,
    pub document_count: usize,
    pub storage_bytes: u64,
    pub status_breakdown: StatusBreakdown,
    /// Set when storage_bytes exceeds the configured soft threshold;
    /// informational, never fails the call
    pub over_soft_limit: bool,
}
