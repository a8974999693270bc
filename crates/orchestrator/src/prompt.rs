//! Prompt composition — pure functions, no I/O, no randomness.
//!
//! Two templates:
//! - **Structured mode** cites the session's prediction with explicit
//!   units and asks for key-value farming suggestions.
//! - **Open mode** frames the generator as a domain expert grounded in
//!   the retrieved knowledge block; no session state is referenced.
//!
//! A composed prompt is built fresh per request and consumed exactly once.

use cropsage_core::{FeatureVector, SessionRecord};

/// Label sentinel used when a client has no prediction yet.
pub const UNKNOWN_CROP: &str = "Unknown";

/// Render the structured-recommendation prompt.
///
/// A missing session never fails composition: all feature fields default
/// to 0 and the label to [`UNKNOWN_CROP`].
pub fn compose_structured(record: Option<&SessionRecord>, user_query: &str) -> String {
    let default_features = FeatureVector::default();
    let (features, label) = match record {
        Some(r) => (&r.features, r.predicted_label.as_str()),
        None => (&default_features, UNKNOWN_CROP),
    };

    format!(
        "You are an assistant for an agricultural application. Based on the \
         grower's soil and weather conditions, generate structured farming \
         suggestions aligned with the predicted crop. Provide only relevant \
         details.\n\n\
         ### Input Conditions ###\n\
         - Nitrogen: {n}ppm\n\
         - Phosphorus: {p}ppm\n\
         - Potassium: {k}ppm\n\
         - Temperature: {temperature}°C\n\
         - Humidity: {humidity}%\n\
         - pH Level: {ph}\n\
         - Rainfall: {rainfall}mm\n\n\
         Primary Crop: {label}\n\n\
         ### Grower's Question ###\n\
         {user_query}\n\n\
         ### Generate Suggestions ###\n\
         Provide:\n\
         - Secondary Crop\n\
         - Best Irrigation Method\n\
         - Fertilizer Type & Dosage\n\
         - Essential Care Tips\n\n\
         Address the grower's question directly, and output in key-value pairs.",
        n = features.nitrogen,
        p = features.phosphorus,
        k = features.potassium,
        temperature = features.temperature,
        humidity = features.humidity,
        ph = features.ph,
        rainfall = features.rainfall,
    )
}

/// Render the open-chat prompt around a retrieved knowledge block.
pub fn compose_open(user_query: &str, context_block: &str) -> String {
    format!(
        "Act as an agriculture expert and AI assistant. Answer using only \
         the retrieved knowledge below and general agronomic competence; \
         give only suitable information.\n\n\
         User Query: {user_query}\n\n\
         ### Retrieved Knowledge ###\n\
         {context_block}"
    )
}
