//! HTTP client for a crop-classification model-serving endpoint.
//!
//! The endpoint receives the positional feature array and answers with a
//! label. Two response shapes are accepted: `{"label": "rice"}` and the
//! scikit-style `{"prediction": ["rice"]}`; whichever arrives is carried
//! through verbatim as the raw prediction for audit display.

use async_trait::async_trait;
use serde::Deserialize;
use tracing::debug;

use cropsage_core::error::ClassifierError;
use cropsage_core::{CropClassifier, FeatureVector, Prediction};

pub struct RemoteClassifier {
    base_url: String,
    client: reqwest::Client,
}

impl RemoteClassifier {
    pub fn new(base_url: impl Into<String>, timeout_secs: u64) -> Self {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(timeout_secs))
            .build()
            .expect("Failed to create HTTP client");

        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            client,
        }
    }
}

#[async_trait]
impl CropClassifier for RemoteClassifier {
    fn name(&self) -> &str {
        "remote"
    }

    async fn predict(&self, features: &FeatureVector) -> Result<Prediction, ClassifierError> {
        let url = format!("{}/predict", self.base_url);
        let body = serde_json::json!({ "features": features.as_array() });

        debug!(url = %url, "Sending inference request");

        let response = self
            .client
            .post(&url)
            .header("Content-Type", "application/json")
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    ClassifierError::Network(format!("inference request timed out: {e}"))
                } else {
                    ClassifierError::Network(e.to_string())
                }
            })?;

        let status = response.status().as_u16();
        if status != 200 {
            let error_body = response.text().await.unwrap_or_default();
            return Err(ClassifierError::Inference(format!(
                "classifier returned status {status}: {error_body}"
            )));
        }

        let raw: serde_json::Value = response
            .json()
            .await
            .map_err(|e| ClassifierError::MalformedResponse(e.to_string()))?;

        let label = extract_label(&raw)?;
        Ok(Prediction { label, raw })
    }

    async fn health_check(&self) -> Result<bool, ClassifierError> {
        let url = format!("{}/health", self.base_url);
        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| ClassifierError::Network(e.to_string()))?;
        Ok(response.status().is_success())
    }
}

#[derive(Debug, Deserialize)]
struct LabelResponse {
    #[serde(default)]
    label: Option<String>,
    #[serde(default)]
    prediction: Option<Vec<String>>,
}

fn extract_label(raw: &serde_json::Value) -> Result<String, ClassifierError> {
    let parsed: LabelResponse = serde_json::from_value(raw.clone())
        .map_err(|e| ClassifierError::MalformedResponse(e.to_string()))?;

    if let Some(label) = parsed.label {
        if !label.is_empty() {
            return Ok(label);
        }
    }
    if let Some(prediction) = parsed.prediction {
        if let Some(first) = prediction.into_iter().next() {
            return Ok(first);
        }
    }

    Err(ClassifierError::MalformedResponse(
        "response carried neither 'label' nor a non-empty 'prediction'".into(),
    ))
}
