//! Classifier backend implementations for CropSage.
//!
//! All classifiers implement the `cropsage_core::CropClassifier` trait.
//! The only production backend is [`RemoteClassifier`], an HTTP client to
//! a model-serving endpoint; tests use mocks built on the same trait.

pub mod remote;

pub use remote::RemoteClassifier;

use std::sync::Arc;

use cropsage_config::AppConfig;
use cropsage_core::CropClassifier;

/// Build the classifier backend from configuration.
///
/// Returns `None` when no endpoint is configured — the caller surfaces
/// this as a service-level "model unavailable" state, checked once.
pub fn build_from_config(config: &AppConfig) -> Option<Arc<dyn CropClassifier>> {
    config.classifier.endpoint.as_ref().map(|endpoint| {
        Arc::new(RemoteClassifier::new(
            endpoint,
            config.classifier.timeout_secs,
        )) as Arc<dyn CropClassifier>
    })
}
