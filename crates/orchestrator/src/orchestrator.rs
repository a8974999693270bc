//! The orchestrator — the only stateful coordination point in CropSage.
//!
//! Backends are wired in once at startup; any of them may be absent, and
//! absence is a stable, service-level state (never re-probed per request).
//! The session store is the single piece of mutable shared state; all
//! external calls happen outside its lock.

use std::sync::Arc;
use std::time::Instant;

use serde::Serialize;
use tracing::{info, warn};

use cropsage_core::error::{ClassifierError, GenerationError, RetrievalError};
use cropsage_core::{CropClassifier, FeatureVector, Generator, Result, SessionRecord};
use cropsage_retrieval::ContextRetriever;
use cropsage_session::SessionStore;

use crate::prompt;

/// What `predict` hands back to the caller: the label plus the backend's
/// raw output for audit display.
#[derive(Debug, Clone, Serialize)]
pub struct PredictOutcome {
    pub label: String,
    pub raw_prediction: serde_json::Value,
}

/// One backend's live probe result.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum BackendProbe {
    Disabled,
    Healthy { detail: String },
    Unhealthy { detail: String },
}

impl BackendProbe {
    pub fn is_healthy(&self) -> bool {
        matches!(self, BackendProbe::Healthy { .. })
    }
}

/// Live diagnostics across all wired backends.
#[derive(Debug, Clone, Serialize)]
pub struct DoctorReport {
    pub classifier: BackendProbe,
    pub knowledge_index: BackendProbe,
    pub generator: BackendProbe,
}

/// Startup-resolved capability report, served by the status operation.
#[derive(Debug, Clone, Serialize)]
pub struct StatusReport {
    pub status: &'static str,
    pub service: &'static str,
    pub classifier_enabled: bool,
    pub knowledge_index_enabled: bool,
    pub generator_enabled: bool,
    pub sessions: usize,
}

/// Coordinates classifier, retriever, and generator around the session
/// store. Cheap to clone; all fields are shared handles.
#[derive(Clone)]
pub struct Orchestrator {
    sessions: Arc<SessionStore>,
    classifier: Option<Arc<dyn CropClassifier>>,
    retriever: Option<ContextRetriever>,
    generator: Option<Arc<dyn Generator>>,
}

impl Orchestrator {
    pub fn new(
        sessions: Arc<SessionStore>,
        classifier: Option<Arc<dyn CropClassifier>>,
        retriever: Option<ContextRetriever>,
        generator: Option<Arc<dyn Generator>>,
    ) -> Self {
        Self {
            sessions,
            classifier,
            retriever,
            generator,
        }
    }

    /// Run a prediction for `client_id` from raw JSON fields.
    ///
    /// On success the client's session record is overwritten whole; on any
    /// failure no session write happens.
    pub async fn predict(
        &self,
        client_id: &str,
        raw_fields: &serde_json::Map<String, serde_json::Value>,
    ) -> Result<PredictOutcome> {
        let classifier = self
            .classifier
            .as_ref()
            .ok_or(ClassifierError::NotConfigured)?;

        let features = FeatureVector::from_raw(raw_fields)?;

        let start = Instant::now();
        let prediction = classifier.predict(&features).await?;
        info!(
            client_id,
            label = %prediction.label,
            elapsed = ?start.elapsed(),
            "Prediction made"
        );

        let record = SessionRecord::new(features, &prediction.label, prediction.raw.clone());
        self.sessions.put(client_id, record).await;

        Ok(PredictOutcome {
            label: prediction.label,
            raw_prediction: prediction.raw,
        })
    }

    /// Compose the structured-recommendation prompt for a client.
    ///
    /// Never fails: a client with no prediction yet gets the zero-valued
    /// template with the "Unknown" label. Stateless read — the session is
    /// not transitioned.
    pub async fn compose_prompt(&self, client_id: &str, user_query: &str) -> String {
        let record = self.sessions.get(client_id).await;
        if record.is_none() {
            warn!(client_id, "Composing prompt without a prior prediction");
        }
        info!(client_id, "Composed structured prompt");
        prompt::compose_structured(record.as_ref(), user_query)
    }

    /// Structured recommendation: compose the session-grounded prompt and
    /// dispatch it to the generation backend. The composed prompt is never
    /// stored; the client's last question is annotated on its record.
    pub async fn recommend(&self, client_id: &str, user_query: &str) -> Result<String> {
        let generator = self.generator.as_ref().ok_or_else(|| {
            GenerationError::Unconfigured("generation backend disabled at startup".into())
        })?;

        let composed = self.compose_prompt(client_id, user_query).await;

        let start = Instant::now();
        let answer = generator.generate(&composed).await?;

        // Only an answered question is recorded on the session.
        self.sessions.set_last_query(client_id, user_query).await;
        info!(
            client_id,
            backend = generator.name(),
            elapsed = ?start.elapsed(),
            "Recommendation generated"
        );
        Ok(answer)
    }

    /// Retrieval-augmented chat, independent of any session.
    pub async fn chat(&self, user_query: &str) -> Result<String> {
        let retriever = self.retriever.as_ref().ok_or_else(|| {
            RetrievalError::Unavailable("knowledge index disabled at startup".into())
        })?;
        let generator = self.generator.as_ref().ok_or_else(|| {
            GenerationError::Unconfigured("generation backend disabled at startup".into())
        })?;

        let start = Instant::now();
        let context_block = retriever.retrieve_block(user_query).await?;

        let composed = prompt::compose_open(user_query, &context_block);
        let answer = generator.generate(&composed).await?;

        info!(
            backend = generator.name(),
            answer_len = answer.len(),
            elapsed = ?start.elapsed(),
            "Chat response generated"
        );
        Ok(answer)
    }

    /// Read back the client's latest prediction, if any. Idempotent.
    pub async fn latest(&self, client_id: &str) -> Option<SessionRecord> {
        self.sessions.get(client_id).await
    }

    /// Probe each wired backend for liveness. Unlike [`status`], this
    /// reaches out over the network, so it belongs on a diagnostic
    /// surface rather than a monitoring poll.
    ///
    /// [`status`]: Orchestrator::status
    pub async fn doctor(&self) -> DoctorReport {
        let classifier = match &self.classifier {
            None => BackendProbe::Disabled,
            Some(classifier) => match classifier.health_check().await {
                Ok(true) => BackendProbe::Healthy {
                    detail: format!("{} responding", classifier.name()),
                },
                Ok(false) => BackendProbe::Unhealthy {
                    detail: format!("{} reachable but reported unhealthy", classifier.name()),
                },
                Err(e) => BackendProbe::Unhealthy {
                    detail: e.to_string(),
                },
            },
        };

        let knowledge_index = match &self.retriever {
            None => BackendProbe::Disabled,
            Some(retriever) => match retriever.count().await {
                Ok(count) => BackendProbe::Healthy {
                    detail: format!("{count} passages via {}", retriever.index_name()),
                },
                Err(e) => BackendProbe::Unhealthy {
                    detail: e.to_string(),
                },
            },
        };

        let generator = match &self.generator {
            None => BackendProbe::Disabled,
            Some(generator) => match generator.health_check().await {
                Ok(true) => BackendProbe::Healthy {
                    detail: format!("{} responding", generator.name()),
                },
                Ok(false) => BackendProbe::Unhealthy {
                    detail: format!("{} reachable but reported unhealthy", generator.name()),
                },
                Err(e) => BackendProbe::Unhealthy {
                    detail: e.to_string(),
                },
            },
        };

        DoctorReport {
            classifier,
            knowledge_index,
            generator,
        }
    }

    /// Capability snapshot. Backend presence was resolved once at startup,
    /// so only the session count varies between calls.
    pub async fn status(&self) -> StatusReport {
        StatusReport {
            status: "healthy",
            service: "cropsage",
            classifier_enabled: self.classifier.is_some(),
            knowledge_index_enabled: self.retriever.is_some(),
            generator_enabled: self.generator.is_some(),
            sessions: self.sessions.len().await,
        }
    }
}
