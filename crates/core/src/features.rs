//! The feature vector — the 7-value numeric soil/weather input.
//!
//! Field order is load-bearing: the classifier is positional, not named.
//! `as_array()` is the only way the vector leaves this module, so the
//! ordering lives in exactly one place.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::ValidationError;

/// Canonical field names, in classifier input order.
pub const FEATURE_FIELDS: [&str; 7] = [
    "nitrogen",
    "phosphorus",
    "potassium",
    "temperature",
    "humidity",
    "ph",
    "rainfall",
];

/// Accepted spellings per field. Clients historically sent `pH_Level`.
const FIELD_ALIASES: [&[&str]; 7] = [
    &["nitrogen"],
    &["phosphorus"],
    &["potassium"],
    &["temperature"],
    &["humidity"],
    &["ph", "pH", "pH_Level", "ph_level"],
    &["rainfall"],
];

/// Validated numeric tuple of 7 agronomic features. Immutable once built.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FeatureVector {
    pub nitrogen: f64,
    pub phosphorus: f64,
    pub potassium: f64,
    pub temperature: f64,
    pub humidity: f64,
    pub ph: f64,
    pub rainfall: f64,
}

impl FeatureVector {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        nitrogen: f64,
        phosphorus: f64,
        potassium: f64,
        temperature: f64,
        humidity: f64,
        ph: f64,
        rainfall: f64,
    ) -> Self {
        Self {
            nitrogen,
            phosphorus,
            potassium,
            temperature,
            humidity,
            ph,
            rainfall,
        }
    }

    /// Build a vector from raw JSON fields of unconstrained type.
    ///
    /// Numbers and numeric strings coerce to f64; missing or null fields
    /// default to 0.0; anything else fails with a [`ValidationError`]
    /// naming the offending field.
    pub fn from_raw(raw: &serde_json::Map<String, Value>) -> Result<Self, ValidationError> {
        let mut values = [0.0f64; 7];
        for (i, aliases) in FIELD_ALIASES.iter().enumerate() {
            let found = aliases.iter().find_map(|a| raw.get(*a));
            values[i] = coerce(FEATURE_FIELDS[i], found)?;
        }
        let [n, p, k, temperature, humidity, ph, rainfall] = values;
        Ok(Self::new(n, p, k, temperature, humidity, ph, rainfall))
    }

    /// The positional form fed to the classifier. Order matches
    /// [`FEATURE_FIELDS`].
    pub fn as_array(&self) -> [f64; 7] {
        [
            self.nitrogen,
            self.phosphorus,
            self.potassium,
            self.temperature,
            self.humidity,
            self.ph,
            self.rainfall,
        ]
    }
}

impl Default for FeatureVector {
    fn default() -> Self {
        Self::new(0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0)
    }
}

fn coerce(field: &'static str, value: Option<&Value>) -> Result<f64, ValidationError> {
    match value {
        None | Some(Value::Null) => Ok(0.0),
        Some(Value::Number(n)) => n.as_f64().ok_or_else(|| ValidationError::NonNumericField {
            field,
            value: n.to_string(),
        }),
        Some(Value::String(s)) => {
            s.trim()
                .parse::<f64>()
                .map_err(|_| ValidationError::NonNumericField {
                    field,
                    value: format!("\"{s}\""),
                })
        }
        Some(other) => Err(ValidationError::NonNumericField {
            field,
            value: other.to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn raw(value: Value) -> serde_json::Map<String, Value> {
        value.as_object().unwrap().clone()
    }

    #[test]
    fn builds_from_numbers_and_numeric_strings() {
        let fv = FeatureVector::from_raw(&raw(json!({
            "nitrogen": 90,
            "phosphorus": "42",
            "potassium": 43,
            "temperature": 20.9,
            "humidity": 82,
            "pH_Level": 6.5,
            "rainfall": " 202.9 ",
        })))
        .unwrap();

        assert_eq!(
            fv.as_array(),
            [90.0, 42.0, 43.0, 20.9, 82.0, 6.5, 202.9]
        );
    }

    #[test]
    fn missing_fields_default_to_zero() {
        let fv = FeatureVector::from_raw(&raw(json!({"nitrogen": 12}))).unwrap();
        assert_eq!(fv.nitrogen, 12.0);
        assert_eq!(fv.rainfall, 0.0);
        assert_eq!(fv.ph, 0.0);
    }

    #[test]
    fn non_numeric_field_is_named_in_the_error() {
        let err = FeatureVector::from_raw(&raw(json!({"humidity": "very humid"}))).unwrap_err();
        match err {
            ValidationError::NonNumericField { field, .. } => assert_eq!(field, "humidity"),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn array_order_matches_field_order() {
        let fv = FeatureVector::new(1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0);
        assert_eq!(fv.as_array(), [1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0]);
        assert_eq!(FEATURE_FIELDS[0], "nitrogen");
        assert_eq!(FEATURE_FIELDS[6], "rainfall");
    }

    #[test]
    fn ph_aliases_accepted() {
        for key in ["ph", "pH", "pH_Level", "ph_level"] {
            let fv = FeatureVector::from_raw(&raw(json!({key: 6.5}))).unwrap();
            assert_eq!(fv.ph, 6.5, "alias {key} should map to ph");
        }
    }
}
