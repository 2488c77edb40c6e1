//! Citation extraction from grounding attributions
//!
//! Each attribution becomes a short human-readable label; labels are
//! deduplicated preserving first appearance, and resolved back to tracked
//! documents where possible.

use std::collections::HashSet;

use crate::inventory::DocumentTracker;
use crate::providers::GroundingAttribution;
use crate::types::Citation;

/// Maximum label length when falling back to a passage snippet
const SNIPPET_LABEL_LEN: usize = 80;

/// Build the citation list for an assistant message
///
/// Label preference order: source title, then URI, then a snippet prefix.
/// Attribution titles are matched against document display names in the
/// grounded store to recover document ids.
pub fn from_attributions(
    attributions: &[GroundingAttribution],
    tracker: &DocumentTracker,
    store_id: Option<&str>,
) -> Vec<Citation> {
    let mut citations = Vec::new();
    let mut seen = HashSet::new();

    for attribution in attributions {
        let label = match label_for(attribution) {
            Some(label) => label,
            None => continue,
        };
        if !seen.insert(label.clone()) {
            continue;
        }

        let document_id = resolve_document_id(attribution, tracker, store_id);
        citations.push(Citation { document_id, label });
    }

    citations
}

fn label_for(attribution: &GroundingAttribution) -> Option<String> {
    if let Some(title) = non_empty(attribution.title.as_deref()) {
        return Some(title.to_string());
    }
    if let Some(uri) = non_empty(attribution.uri.as_deref()) {
        return Some(uri.to_string());
    }
    non_empty(attribution.snippet.as_deref()).map(|text| truncate_label(text, SNIPPET_LABEL_LEN))
}

fn resolve_document_id(
    attribution: &GroundingAttribution,
    tracker: &DocumentTracker,
    store_id: Option<&str>,
) -> Option<String> {
    // A URI that names a tracked document is authoritative
    if let Some(uri) = non_empty(attribution.uri.as_deref()) {
        if tracker.get(uri).is_some() {
            return Some(uri.to_string());
        }
    }
    let store_id = store_id?;
    let title = non_empty(attribution.title.as_deref())?;
    tracker
        .find_by_display_name(store_id, title)
        .map(|doc| doc.id)
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

/// Truncate at a char boundary, preferring a word boundary
fn truncate_label(text: &str, max_len: usize) -> String {
    if text.len() <= max_len {
        return text.to_string();
    }

    let mut end = max_len;
    while end > 0 && !text.is_char_boundary(end) {
        end -= 1;
    }

    if let Some(pos) = text[..end].rfind(' ') {
        return format!("{}...", &text[..pos]);
    }
    format!("{}...", &text[..end])
}
