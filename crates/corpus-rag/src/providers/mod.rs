//! External service providers
//!
//! The `FileSearchProvider` trait is the only way the core talks to the
//! managed retrieval/generation service.

pub mod file_search;
pub mod gemini;
#[cfg(test)]
pub mod mock;

pub use file_search::{
    DocumentStatusUpdate, DocumentUpload, FileSearchProvider, GroundedReply,
    GroundingAttribution, RemoteDocument, RemoteStore,
};
pub use gemini::GeminiFileSearch;
