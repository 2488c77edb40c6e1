//! Core data model: stores, documents, chat messages, citations

pub mod chat;
pub mod document;
pub mod store;

pub use chat::{ChatMessage, Citation, GroundingRef, Role, GENERATION_FAILURE_PLACEHOLDER};
pub use document::{
    validate_metadata, ChunkingConfig, Document, DocumentStatus, FileKind, MetadataEntry,
    MAX_METADATA_ENTRIES, MAX_PAYLOAD_BYTES,
};
pub use store::{StatusBreakdown, Store, StoreStats};
