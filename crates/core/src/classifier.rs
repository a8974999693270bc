//! Classifier trait — the abstraction over the crop prediction model.
//!
//! A classifier turns a positional feature vector into a crop label.
//! The model itself is an external collaborator (typically a model-serving
//! endpoint); the core only sees this trait.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::ClassifierError;
use crate::features::FeatureVector;

/// The outcome of a single inference call.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Prediction {
    /// The predicted crop label.
    pub label: String,

    /// The backend's raw output, returned to callers for audit display.
    pub raw: serde_json::Value,
}

/// The crop classification backend.
///
/// Implementations: HTTP client to a model-serving endpoint, mocks for
/// tests. `predict` may block on unbounded network/compute latency and is
/// treated as a cancellable boundary — dropping the future abandons the
/// call without applying its result.
#[async_trait]
pub trait CropClassifier: Send + Sync {
    /// A human-readable name for this backend (e.g. "remote").
    fn name(&self) -> &str;

    /// Run inference on one feature vector.
    async fn predict(&self, features: &FeatureVector) -> Result<Prediction, ClassifierError>;

    /// Health check — can we reach the backend?
    async fn health_check(&self) -> Result<bool, ClassifierError> {
        Ok(true)
    }
}
