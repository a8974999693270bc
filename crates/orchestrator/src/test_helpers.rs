//! Canned backends for exercising the orchestrator without real services.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use serde_json::json;

use cropsage_core::error::{ClassifierError, GenerationError, RetrievalError};
use cropsage_core::{CropClassifier, FeatureVector, Generator, KnowledgeIndex, Passage, Prediction};
use cropsage_retrieval::ContextRetriever;

/// Always predicts the same label.
pub struct FixedClassifier {
    label: String,
}

impl FixedClassifier {
    pub fn new(label: &str) -> Self {
        Self {
            label: label.to_string(),
        }
    }
}

#[async_trait]
impl CropClassifier for FixedClassifier {
    fn name(&self) -> &str {
        "fixed"
    }

    async fn predict(&self, _features: &FeatureVector) -> Result<Prediction, ClassifierError> {
        Ok(Prediction {
            label: self.label.clone(),
            raw: json!({"prediction": [self.label]}),
        })
    }
}

/// Returns each label once, in order; panics if called too often.
pub struct SequentialClassifier {
    labels: Vec<&'static str>,
    calls: AtomicUsize,
}

impl SequentialClassifier {
    pub fn new(labels: Vec<&'static str>) -> Self {
        Self {
            labels,
            calls: AtomicUsize::new(0),
        }
    }
}

#[async_trait]
impl CropClassifier for SequentialClassifier {
    fn name(&self) -> &str {
        "sequential"
    }

    async fn predict(&self, _features: &FeatureVector) -> Result<Prediction, ClassifierError> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst);
        let label = self.labels[call];
        Ok(Prediction {
            label: label.to_string(),
            raw: json!({"prediction": [label]}),
        })
    }
}

/// Fails every prediction with a backend inference error.
pub struct FailingClassifier;

#[async_trait]
impl CropClassifier for FailingClassifier {
    fn name(&self) -> &str {
        "failing"
    }

    async fn predict(&self, _features: &FeatureVector) -> Result<Prediction, ClassifierError> {
        Err(ClassifierError::Inference("model server returned 500".into()))
    }

    async fn health_check(&self) -> Result<bool, ClassifierError> {
        Err(ClassifierError::Network("connection refused".into()))
    }
}

/// Serves the same passages for every query.
pub struct FixedIndex {
    passages: Vec<Passage>,
}

#[async_trait]
impl KnowledgeIndex for FixedIndex {
    fn name(&self) -> &str {
        "fixed"
    }

    async fn search(&self, _query: &str, top_k: usize) -> Result<Vec<Passage>, RetrievalError> {
        Ok(self.passages.iter().take(top_k).cloned().collect())
    }

    async fn count(&self) -> Result<usize, RetrievalError> {
        Ok(self.passages.len())
    }
}

pub fn passage(content: &str) -> Passage {
    Passage {
        content: content.to_string(),
        source: None,
        score: 1.0,
    }
}

pub fn retriever_with(passages: Vec<Passage>) -> ContextRetriever {
    ContextRetriever::new(Arc::new(FixedIndex { passages }), 3)
}

/// Returns the prompt it was given, so tests can inspect composition.
pub struct EchoGenerator;

#[async_trait]
impl Generator for EchoGenerator {
    fn name(&self) -> &str {
        "echo"
    }

    async fn generate(&self, prompt: &str) -> Result<String, GenerationError> {
        Ok(prompt.to_string())
    }
}

/// Fails every generation with a backend API error.
pub struct FailingGenerator;

#[async_trait]
impl Generator for FailingGenerator {
    fn name(&self) -> &str {
        "failing"
    }

    async fn generate(&self, _prompt: &str) -> Result<String, GenerationError> {
        Err(GenerationError::ApiError {
            status_code: 402,
            message: "quota exhausted".into(),
        })
    }

    async fn health_check(&self) -> Result<bool, GenerationError> {
        Err(GenerationError::Network("connection refused".into()))
    }
}
