//! In-memory keyword index over the loaded corpus.
//!
//! Scores passages by query-term occurrence density. Good enough for a
//! corpus of a few thousand passages; the trait seam leaves room for a
//! vector-store backend without touching callers.

use async_trait::async_trait;

use cropsage_core::error::RetrievalError;
use cropsage_core::{KnowledgeIndex, Passage};

pub struct InMemoryIndex {
    passages: Vec<Passage>,
}

impl InMemoryIndex {
    pub fn new(passages: Vec<Passage>) -> Self {
        Self { passages }
    }
}

#[async_trait]
impl KnowledgeIndex for InMemoryIndex {
    fn name(&self) -> &str {
        "in_memory"
    }

    async fn search(&self, query: &str, top_k: usize) -> Result<Vec<Passage>, RetrievalError> {
        let terms: Vec<String> = query
            .to_lowercase()
            .split_whitespace()
            .filter(|t| t.len() > 2)
            .map(str::to_string)
            .collect();

        if terms.is_empty() {
            return Ok(Vec::new());
        }

        let mut scored: Vec<Passage> = self
            .passages
            .iter()
            .filter_map(|p| {
                let haystack = p.content.to_lowercase();
                let occurrences: usize = terms.iter().map(|t| haystack.matches(t).count()).sum();
                if occurrences == 0 {
                    return None;
                }
                let mut hit = p.clone();
                hit.score = occurrences as f32 / (haystack.len() as f32 / 100.0).max(1.0);
                Some(hit)
            })
            .collect();

        scored.sort_by(|a, b| {
            b.score
                .partial_cmp(&a.score)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        scored.truncate(top_k);

        Ok(scored)
    }

    async fn count(&self) -> Result<usize, RetrievalError> {
        Ok(self.passages.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn index() -> InMemoryIndex {
        InMemoryIndex::new(vec![
            Passage {
                content: "Rice requires standing water and high humidity during the growing season. Paddy rice is transplanted by hand.".into(),
                source: Some("corpus#0".into()),
                score: 0.0,
            },
            Passage {
                content: "Maize prefers well-drained loam and moderate rainfall.".into(),
                source: Some("corpus#1".into()),
                score: 0.0,
            },
            Passage {
                content: "Cotton tolerates drought but needs warm temperatures.".into(),
                source: Some("corpus#2".into()),
                score: 0.0,
            },
        ])
    }

    #[tokio::test]
    async fn finds_matching_passages_ranked() {
        let results = index().search("rice humidity", 3).await.unwrap();
        assert_eq!(results.len(), 1);
        assert!(results[0].content.contains("Rice"));
        assert!(results[0].score > 0.0);
    }

    #[tokio::test]
    async fn zero_matches_is_an_empty_result() {
        let results = index().search("submarine navigation", 3).await.unwrap();
        assert!(results.is_empty());
    }

    #[tokio::test]
    async fn respects_top_k() {
        let results = index().search("rainfall temperatures water", 1).await.unwrap();
        assert_eq!(results.len(), 1);
    }

    #[tokio::test]
    async fn short_terms_are_ignored() {
        // "is" and "a" are too short to be meaningful search terms
        let results = index().search("is a", 3).await.unwrap();
        assert!(results.is_empty());
    }

    #[tokio::test]
    async fn count_reports_corpus_size() {
        assert_eq!(index().count().await.unwrap(), 3);
    }
}
