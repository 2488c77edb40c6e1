//! corpus-rag: document lifecycle and retrieval-augmented chat with
//! source citations
//!
//! The crate tracks uploaded documents through the asynchronous
//! processing states of a managed file search service, keeps a registry
//! of retrieval stores with one active per session, and mediates chat
//! turns whose answers are grounded in the active store (or web search)
//! and carry citations back to the supporting documents. All extraction,
//! chunking, embedding, search, and generation happens in the external
//! service; this crate owns the state, the failure handling, and the API
//! surface.

pub mod config;
pub mod error;
pub mod inventory;
pub mod providers;
pub mod registry;
pub mod server;
pub mod session;
pub mod types;

pub use config::AppConfig;
pub use error::{Error, Result};
pub use inventory::{DocumentTracker, ListQuery, SortBy, UploadRequest};
pub use providers::{FileSearchProvider, GeminiFileSearch};
pub use registry::StoreRegistry;
pub use session::{ChatSession, SendOutcome};
pub use types::{
    ChatMessage, ChunkingConfig, Citation, Document, DocumentStatus, GroundingRef, MetadataEntry,
    Store, StoreStats,
};
