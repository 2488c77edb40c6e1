//! Filtering, sorting, and pagination over the local document snapshot
//!
//! Pure functions; listing never touches the network.

use serde::{Deserialize, Serialize};

use crate::types::{Document, DocumentStatus};

/// Fixed page size for document listings
pub const PAGE_SIZE: usize = 20;

/// Sort key for document listings
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum SortBy {
    /// Upload time (the default; descending shows newest first)
    #[default]
    UploadTime,
    Name,
    Size,
}

/// Listing parameters
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ListQuery {
    /// Keep only documents in this status
    #[serde(default)]
    pub status: Option<DocumentStatus>,
    /// Case-insensitive substring match on the display name
    #[serde(default)]
    pub search: Option<String>,
    #[serde(default)]
    pub sort_by: SortBy,
    /// Sort ascending; the default is descending (newest/largest first)
    #[serde(default)]
    pub ascending: bool,
    /// Zero-based page index
    #[serde(default)]
    pub page: usize,
}

/// One page of the filtered listing
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentPage {
    pub documents: Vec<Document>,
    /// Total matches before pagination
    pub total: usize,
    pub page: usize,
    pub page_size: usize,
}

/// Apply filter, sort, and pagination to a snapshot
pub fn paginate(mut documents: Vec<Document>, query: &ListQuery) -> DocumentPage {
    if let Some(status) = query.status {
        documents.retain(|d| d.status == status);
    }

    if let Some(term) = query.search.as_deref() {
        let term = term.to_lowercase();
        if !term.is_empty() {
            documents.retain(|d| d.display_name.to_lowercase().contains(&term));
        }
    }

    match query.sort_by {
        SortBy::UploadTime => documents.sort_by(|a, b| a.created_at.cmp(&b.created_at)),
        SortBy::Name => documents.sort_by(|a, b| a.display_name.cmp(&b.display_name)),
        SortBy::Size => documents.sort_by(|a, b| a.size_bytes.cmp(&b.size_bytes)),
    }
    if !query.ascending {
        documents.reverse();
    }

    let total = documents.len();
    let documents: Vec<Document> = documents
        .into_iter()
        .skip(query.page * PAGE_SIZE)
        .take(PAGE_SIZE)
        .collect();

    DocumentPage {
        documents,
        total,
        page: query.page,
        page_size: PAGE_SIZE,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};

    fn doc(name: &str, size: u64, status: DocumentStatus, age_secs: i64) -> Document {
        let created = Utc::now() - Duration::seconds(age_secs);
        Document {
            id: format!("docs/{}", name),
            store_id: "stores/s".to_string(),
            display_name: name.to_string(),
            mime_type: "text/plain".to_string(),
            size_bytes: size,
            status,
            custom_metadata: Vec::new(),
            created_at: created,
            updated_at: created,
        }
    }

    #[test]
    fn filters_by_status_and_search() {
        let docs = vec![
            doc("notes.txt", 10, DocumentStatus::Active, 30),
            doc("report.pdf", 20, DocumentStatus::Pending, 20),
            doc("summary-notes.md", 30, DocumentStatus::Active, 10),
        ];

        let page = paginate(
            docs,
            &ListQuery {
                status: Some(DocumentStatus::Active),
                search: Some("NOTES".to_string()),
                ..Default::default()
            },
        );
        assert_eq!(page.total, 2);
        // default order is newest first
        assert_eq!(page.documents[0].display_name, "summary-notes.md");
        assert_eq!(page.documents[1].display_name, "notes.txt");
    }

    #[test]
    fn sorts_by_name_and_size() {
        let docs = vec![
            doc("b.txt", 5, DocumentStatus::Active, 1),
            doc("a.txt", 50, DocumentStatus::Active, 2),
            doc("c.txt", 20, DocumentStatus::Active, 3),
        ];

        let by_name = paginate(
            docs.clone(),
            &ListQuery {
                sort_by: SortBy::Name,
                ascending: true,
                ..Default::default()
            },
        );
        let names: Vec<&str> = by_name
            .documents
            .iter()
            .map(|d| d.display_name.as_str())
            .collect();
        assert_eq!(names, vec!["a.txt", "b.txt", "c.txt"]);

        let by_size_desc = paginate(
            docs,
            &ListQuery {
                sort_by: SortBy::Size,
                ..Default::default()
            },
        );
        assert_eq!(by_size_desc.documents[0].size_bytes, 50);
    }

    #[test]
    fn pages_hold_twenty_documents() {
        let docs: Vec<Document> = (0..45)
            .map(|i| doc(&format!("doc-{:02}.txt", i), i, DocumentStatus::Active, i as i64))
            .collect();

        let first = paginate(docs.clone(), &ListQuery::default());
        assert_eq!(first.total, 45);
        assert_eq!(first.documents.len(), PAGE_SIZE);

        let last = paginate(
            docs,
            &ListQuery {
                page: 2,
                ..Default::default()
            },
        );
        assert_eq!(last.documents.len(), 5);
        assert_eq!(last.page, 2);
    }
}
