//! Retrieval-augmented chat session
//!
//! Owns the ordered message history for one conversation. Each user turn
//! issues a single grounded-generation call; generation failures become a
//! fixed placeholder reply instead of breaking the conversation. When
//! sends overlap, a reply is applied only if no later-started request has
//! already applied its own; stale completions are discarded.

pub mod citation;

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;

use crate::error::{Error, Result};
use crate::inventory::DocumentTracker;
use crate::providers::FileSearchProvider;
use crate::types::{ChatMessage, GroundingRef};

/// Outcome of one `send_message` call
#[derive(Debug, Clone)]
pub enum SendOutcome {
    /// The assistant reply (or failure placeholder) was appended
    Replied(ChatMessage),
    /// A later request completed first; this reply was discarded
    Superseded,
}

impl SendOutcome {
    /// The appended message, if this call produced one
    pub fn message(&self) -> Option<&ChatMessage> {
        match self {
            Self::Replied(message) => Some(message),
            Self::Superseded => None,
        }
    }
}

/// One conversation bound to the caller-supplied grounding scope
pub struct ChatSession {
    provider: Arc<dyn FileSearchProvider>,
    tracker: Arc<DocumentTracker>,
    messages: Mutex<Vec<ChatMessage>>,
    /// Sequence assigned to each request at start; strictly increasing
    next_seq: AtomicU64,
    /// Highest sequence whose reply has been applied
    last_applied: AtomicU64,
}

impl ChatSession {
    pub fn new(provider: Arc<dyn FileSearchProvider>, tracker: Arc<DocumentTracker>) -> Self {
        Self {
            provider,
            tracker,
            messages: Mutex::new(Vec::new()),
            next_seq: AtomicU64::new(1),
            last_applied: AtomicU64::new(0),
        }
    }

    /// Send one user message and wait for the grounded reply
    ///
    /// The user message is appended synchronously, in call order, before
    /// the generation call is issued. An empty message is rejected with
    /// `InvalidArgument` before anything is appended. Zero active
    /// documents in the store is not an error here; the service simply
    /// replies without citations.
    pub async fn send_message(&self, text: &str, grounding: GroundingRef) -> Result<SendOutcome> {
        let text = text.trim();
        if text.is_empty() {
            return Err(Error::invalid_argument("Message must not be empty"));
        }

        let seq = self.next_seq.fetch_add(1, Ordering::SeqCst);

        // Snapshot history and append the user turn under one lock so
        // interleaved sends keep their call order.
        let history = {
            let mut messages = self.messages.lock();
            let history = messages.clone();
            messages.push(ChatMessage::user(text));
            history
        };

        let store_id = match &grounding {
            GroundingRef::Store { store_id } => Some(store_id.clone()),
            GroundingRef::WebSearch => None,
        };

        let reply = match self
            .provider
            .generate_grounded(text, &grounding, &history)
            .await
        {
            Ok(reply) => {
                let citations = citation::from_attributions(
                    &reply.attributions,
                    &self.tracker,
                    store_id.as_deref(),
                );
                ChatMessage::assistant(reply.text, citations)
            }
            Err(err) => {
                // Swallowed: the conversation continues with a placeholder
                tracing::warn!("Grounded generation failed: {}", err);
                ChatMessage::generation_failure()
            }
        };

        // Apply only if no later-started request has already applied.
        let mut last = self.last_applied.load(Ordering::Acquire);
        loop {
            if last >= seq {
                tracing::debug!(
                    "Discarding reply for request {} (request {} already applied)",
                    seq,
                    last
                );
                return Ok(SendOutcome::Superseded);
            }
            match self.last_applied.compare_exchange(
                last,
                seq,
                Ordering::AcqRel,
                Ordering::Acquire,
            ) {
                Ok(_) => break,
                Err(current) => last = current,
            }
        }

        self.messages.lock().push(reply.clone());
        Ok(SendOutcome::Replied(reply))
    }

    /// Reset the conversation to empty; stored documents are untouched
    pub fn clear_history(&self) {
        self.messages.lock().clear();
        tracing::info!("Chat history cleared");
    }

    /// Snapshot of the ordered message history
    pub fn history(&self) -> Vec<ChatMessage> {
        self.messages.lock().clone()
    }
}
