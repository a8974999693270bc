//! Per-client session state — the most recent prediction.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::features::FeatureVector;

/// Per-client cached result of the most recent prediction.
///
/// Written as a unit: `predicted_label` always belongs to the same
/// prediction as `features`. Overwritten whole on each new prediction,
/// never merged.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionRecord {
    /// The validated input that produced the prediction.
    pub features: FeatureVector,

    /// The crop label the classifier returned.
    pub predicted_label: String,

    /// The raw classifier output, kept for audit/debug display.
    pub raw_prediction: serde_json::Value,

    /// The most recent free-text query, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_query: Option<String>,

    /// When the prediction was made.
    pub predicted_at: DateTime<Utc>,
}

impl SessionRecord {
    pub fn new(
        features: FeatureVector,
        predicted_label: impl Into<String>,
        raw_prediction: serde_json::Value,
    ) -> Self {
        Self {
            features,
            predicted_label: predicted_label.into(),
            raw_prediction,
            last_query: None,
            predicted_at: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn record_serializes_roundtrip() {
        let record = SessionRecord::new(
            FeatureVector::new(90.0, 42.0, 43.0, 20.9, 82.0, 6.5, 202.9),
            "rice",
            serde_json::json!(["rice"]),
        );
        let json = serde_json::to_string(&record).unwrap();
        let parsed: SessionRecord = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.predicted_label, "rice");
        assert_eq!(parsed.features.rainfall, 202.9);
        assert!(parsed.last_query.is_none());
    }
}
