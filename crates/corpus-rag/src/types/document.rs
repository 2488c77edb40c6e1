//! Document types and the upload-time validation rules
//!
//! A document is created `Pending` on a successful upload request and only
//! ever moves to `Active` or `Failed` as observed from the service.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Maximum upload size enforced client-side (100 MB)
pub const MAX_PAYLOAD_BYTES: u64 = 100 * 1024 * 1024;

/// Maximum number of custom metadata entries per document
pub const MAX_METADATA_ENTRIES: usize = 20;

/// Processing state of a document in the external store
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum DocumentStatus {
    /// Uploaded, waiting for the service to finish indexing
    Pending,
    /// Indexed and searchable
    Active,
    /// Processing failed; the user must re-upload
    Failed,
}

impl DocumentStatus {
    /// Map a service-reported state string to a status
    ///
    /// The wire format uses `STATE_PENDING` style names; bare names are
    /// accepted too.
    pub fn from_service_state(state: &str) -> Option<Self> {
        match state {
            "STATE_PENDING" | "PENDING" => Some(Self::Pending),
            "STATE_ACTIVE" | "ACTIVE" => Some(Self::Active),
            "STATE_FAILED" | "FAILED" => Some(Self::Failed),
            _ => None,
        }
    }

    /// Human-readable label
    pub fn label(&self) -> &'static str {
        match self {
            Self::Pending => "Pending",
            Self::Active => "Active",
            Self::Failed => "Failed",
        }
    }
}

/// Supported upload formats, detected from the declared mime type
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum FileKind {
    Pdf,
    Doc,
    Docx,
    Txt,
    Markdown,
    Html,
    Csv,
    Xls,
    Xlsx,
    Pptx,
    /// Source code file with language
    Code(String),
    Unknown,
}

impl FileKind {
    /// Detect kind from a mime type string
    pub fn from_mime(mime: &str) -> Self {
        // Strip parameters like "; charset=utf-8"
        let mime = mime.split(';').next().unwrap_or(mime).trim();
        match mime {
            "application/pdf" => Self::Pdf,
            "application/msword" => Self::Doc,
            "application/vnd.openxmlformats-officedocument.wordprocessingml.document" => Self::Docx,
            "text/plain" => Self::Txt,
            "text/markdown" | "text/x-markdown" => Self::Markdown,
            "text/html" | "application/xhtml+xml" => Self::Html,
            "text/csv" => Self::Csv,
            "application/vnd.ms-excel" => Self::Xls,
            "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet" => Self::Xlsx,
            "application/vnd.openxmlformats-officedocument.presentationml.presentation" => {
                Self::Pptx
            }
            "text/x-python" | "application/x-python-code" => Self::Code("python".to_string()),
            "text/javascript" | "application/javascript" => Self::Code("javascript".to_string()),
            "text/x-typescript" => Self::Code("typescript".to_string()),
            "text/x-rust" | "text/rust" => Self::Code("rust".to_string()),
            "text/x-go" => Self::Code("go".to_string()),
            "text/x-java" | "text/x-java-source" => Self::Code("java".to_string()),
            "text/x-c" | "text/x-csrc" => Self::Code("c".to_string()),
            "application/json" => Self::Code("json".to_string()),
            "application/xml" | "text/xml" => Self::Code("xml".to_string()),
            "application/x-yaml" | "text/yaml" => Self::Code("yaml".to_string()),
            "application/toml" | "text/x-toml" => Self::Code("toml".to_string()),
            "application/x-sh" | "text/x-shellscript" => Self::Code("bash".to_string()),
            _ => Self::Unknown,
        }
    }

    /// Guess kind from a display name when no mime type was supplied
    pub fn from_display_name(name: &str) -> Self {
        let mime = mime_guess::from_path(name).first_raw().unwrap_or("");
        let kind = Self::from_mime(mime);
        if kind != Self::Unknown {
            return kind;
        }
        // mime_guess misses a few text extensions we accept
        match name.rsplit('.').next().unwrap_or("").to_lowercase().as_str() {
            "md" | "markdown" => Self::Markdown,
            "rs" => Self::Code("rust".to_string()),
            "py" => Self::Code("python".to_string()),
            "go" => Self::Code("go".to_string()),
            "toml" => Self::Code("toml".to_string()),
            _ => Self::Unknown,
        }
    }

    /// Check if this kind is accepted for upload
    pub fn is_supported(&self) -> bool {
        !matches!(self, Self::Unknown)
    }

    /// Get display name
    pub fn display_name(&self) -> &str {
        match self {
            Self::Pdf => "PDF",
            Self::Doc => "Word Document (.doc)",
            Self::Docx => "Word Document (.docx)",
            Self::Txt => "Text File",
            Self::Markdown => "Markdown",
            Self::Html => "HTML",
            Self::Csv => "CSV",
            Self::Xls => "Excel Spreadsheet (.xls)",
            Self::Xlsx => "Excel Spreadsheet (.xlsx)",
            Self::Pptx => "PowerPoint (.pptx)",
            Self::Code(lang) => lang.as_str(),
            Self::Unknown => "Unknown",
        }
    }
}

/// One custom metadata entry; order is preserved, keys are unique
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct MetadataEntry {
    pub key: String,
    pub value: String,
}

impl MetadataEntry {
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }
}

/// Validate a metadata sequence: at most 20 entries, unique non-empty keys
pub fn validate_metadata(entries: &[MetadataEntry]) -> Result<()> {
    if entries.len() > MAX_METADATA_ENTRIES {
        return Err(Error::invalid_argument(format!(
            "{} metadata entries exceed the limit of {}",
            entries.len(),
            MAX_METADATA_ENTRIES
        )));
    }
    let mut seen = std::collections::HashSet::with_capacity(entries.len());
    for entry in entries {
        if entry.key.is_empty() {
            return Err(Error::invalid_argument("Metadata key must not be empty"));
        }
        if !seen.insert(entry.key.as_str()) {
            return Err(Error::invalid_argument(format!(
                "Duplicate metadata key: {}",
                entry.key
            )));
        }
    }
    Ok(())
}

/// Whitespace chunking configuration attached to a single upload
///
/// Immutable after upload; it applies to exactly the document it was
/// supplied with.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct ChunkingConfig {
    /// Target chunk size in tokens (100-2000)
    #[serde(default = "default_chunk_size")]
    pub chunk_size_tokens: u32,
    /// Overlap between chunks in tokens (0-200, less than chunk size)
    #[serde(default = "default_chunk_overlap")]
    pub chunk_overlap_tokens: u32,
}

fn default_chunk_size() -> u32 {
    400
}

fn default_chunk_overlap() -> u32 {
    40
}

impl Default for ChunkingConfig {
    fn default() -> Self {
        Self {
            chunk_size_tokens: 400,
            chunk_overlap_tokens: 40,
        }
    }
}

impl ChunkingConfig {
    pub const MIN_CHUNK_TOKENS: u32 = 100;
    pub const MAX_CHUNK_TOKENS: u32 = 2000;
    pub const MAX_OVERLAP_TOKENS: u32 = 200;

    /// Check bounds; rejected uploads never reach the service
    pub fn validate(&self) -> Result<()> {
        if self.chunk_size_tokens < Self::MIN_CHUNK_TOKENS
            || self.chunk_size_tokens > Self::MAX_CHUNK_TOKENS
        {
            return Err(Error::invalid_argument(format!(
                "chunk_size_tokens {} outside [{}, {}]",
                self.chunk_size_tokens,
                Self::MIN_CHUNK_TOKENS,
                Self::MAX_CHUNK_TOKENS
            )));
        }
        if self.chunk_overlap_tokens > Self::MAX_OVERLAP_TOKENS {
            return Err(Error::invalid_argument(format!(
                "chunk_overlap_tokens {} exceeds {}",
                self.chunk_overlap_tokens,
                Self::MAX_OVERLAP_TOKENS
            )));
        }
        if self.chunk_overlap_tokens >= self.chunk_size_tokens {
            return Err(Error::invalid_argument(format!(
                "chunk_overlap_tokens {} must be less than chunk_size_tokens {}",
                self.chunk_overlap_tokens, self.chunk_size_tokens
            )));
        }
        Ok(())
    }
}

/// A tracked document in a retrieval store
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Document {
    /// Opaque id assigned by the external service on upload
    pub id: String,
    /// Store the document belongs to (exactly one, immutable)
    pub store_id: String,
    /// Display name shown in listings and citations
    pub display_name: String,
    /// Declared mime type
    pub mime_type: String,
    /// File size in bytes
    pub size_bytes: u64,
    /// Processing status, refreshed by polling
    pub status: DocumentStatus,
    /// Custom metadata, ordered, unique keys
    #[serde(default)]
    pub custom_metadata: Vec<MetadataEntry>,
    /// Upload timestamp
    pub created_at: DateTime<Utc>,
    /// Last service-reported update; monotonic per document
    pub updated_at: DateTime<Utc>,
}
