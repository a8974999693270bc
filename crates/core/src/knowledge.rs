//! Knowledge index trait — similarity search over background passages.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::RetrievalError;

/// A retrieved text excerpt used to ground generation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Passage {
    /// The excerpt content.
    pub content: String,

    /// Where the excerpt came from, when known.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,

    /// Relevance score assigned by the search (higher = more relevant).
    #[serde(default)]
    pub score: f32,
}

/// The similarity index backend.
///
/// `search` returns passages in descending relevance order. An empty
/// result is a normal outcome, not a failure; `Unavailable` is reserved
/// for a backend that is disabled or unreachable.
#[async_trait]
pub trait KnowledgeIndex: Send + Sync {
    /// A human-readable name for this backend (e.g. "in_memory").
    fn name(&self) -> &str;

    /// Search for the `top_k` most relevant passages.
    async fn search(&self, query: &str, top_k: usize) -> Result<Vec<Passage>, RetrievalError>;

    /// Number of indexed passages.
    async fn count(&self) -> Result<usize, RetrievalError>;
}
