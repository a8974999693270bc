//! Knowledge retrieval for CropSage.
//!
//! Index backends implement `cropsage_core::KnowledgeIndex`; the
//! [`ContextRetriever`] wraps whichever backend is configured and turns a
//! free-text query into a single ranked context block for the composer.

pub mod in_memory;
pub mod loader;

pub use in_memory::InMemoryIndex;
pub use loader::load_passages;

use std::sync::Arc;

use tracing::{debug, info};

use cropsage_config::AppConfig;
use cropsage_core::error::RetrievalError;
use cropsage_core::{KnowledgeIndex, Passage};

/// The literal block handed to the composer when nothing relevant was
/// found. Downstream composition never sees an empty context.
pub const NO_RELEVANT_INFORMATION: &str = "No relevant information found.";

/// Turns free text into a ranked concatenation of background passages.
#[derive(Clone)]
pub struct ContextRetriever {
    index: Arc<dyn KnowledgeIndex>,
    top_k: usize,
}

impl ContextRetriever {
    pub fn new(index: Arc<dyn KnowledgeIndex>, top_k: usize) -> Self {
        Self { index, top_k }
    }

    /// Retrieve the ranked passages for a query, most relevant first.
    pub async fn retrieve(&self, query: &str) -> Result<Vec<Passage>, RetrievalError> {
        let passages = self.index.search(query, self.top_k).await?;
        debug!(
            index = self.index.name(),
            count = passages.len(),
            "Retrieved passages"
        );
        Ok(passages)
    }

    /// Retrieve and concatenate into one context block: rank order, blank
    /// line separated, no dedup. Zero matches yields the
    /// [`NO_RELEVANT_INFORMATION`] placeholder, which is a normal result —
    /// only a broken backend produces an error.
    pub async fn retrieve_block(&self, query: &str) -> Result<String, RetrievalError> {
        let passages = self.retrieve(query).await?;
        Ok(concatenate(&passages))
    }

    /// Number of passages behind the index. Probes the backend; a broken
    /// index surfaces here the same way it does on search.
    pub async fn count(&self) -> Result<usize, RetrievalError> {
        self.index.count().await
    }

    pub fn index_name(&self) -> &str {
        self.index.name()
    }
}

/// Concatenate passages in rank order, separated by a blank line.
pub fn concatenate(passages: &[Passage]) -> String {
    if passages.is_empty() {
        return NO_RELEVANT_INFORMATION.to_string();
    }
    passages
        .iter()
        .map(|p| p.content.as_str())
        .collect::<Vec<_>>()
        .join("\n\n")
}

/// Build the knowledge index from configuration.
///
/// Returns `Ok(None)` when retrieval is disabled; an unreadable corpus
/// file is a hard startup failure, never a silent fallback.
pub fn build_from_config(
    config: &AppConfig,
) -> Result<Option<Arc<dyn KnowledgeIndex>>, RetrievalError> {
    let Some(path) = &config.retrieval.knowledge_path else {
        return Ok(None);
    };

    let passages = load_passages(std::path::Path::new(path))?;
    info!(path = %path, passages = passages.len(), "Loaded knowledge corpus");
    Ok(Some(Arc::new(InMemoryIndex::new(passages))))
}
