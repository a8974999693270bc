//! Error types for the CropSage domain.
//!
//! Uses `thiserror` for ergonomic error definitions.
//! Each backend has its own error variant; the gateway flattens everything
//! into a single `{error, details}` payload via [`Error::kind`].

use thiserror::Error;

/// The top-level error type for all CropSage operations.
#[derive(Debug, Error)]
pub enum Error {
    // --- Caller input errors ---
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    // --- Classifier errors ---
    #[error("Classifier error: {0}")]
    Classifier(#[from] ClassifierError),

    // --- Knowledge index errors ---
    #[error("Retrieval error: {0}")]
    Retrieval(#[from] RetrievalError),

    // --- Generation backend errors ---
    #[error("Generation error: {0}")]
    Generation(#[from] GenerationError),

    // --- Configuration errors ---
    #[error("Configuration error: {message}")]
    Config { message: String },

    // --- Serialization ---
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    // --- Generic ---
    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    /// A stable, machine-readable error kind for wire payloads.
    ///
    /// Hard failures always serialize as `{error: kind, details: message}`;
    /// the kind never changes between releases even if messages do.
    pub fn kind(&self) -> &'static str {
        match self {
            Error::Validation(_) => "validation_error",
            Error::Classifier(ClassifierError::NotConfigured) => "model_unavailable",
            Error::Classifier(_) => "inference_error",
            Error::Retrieval(RetrievalError::Unavailable(_)) => "retrieval_unavailable",
            Error::Retrieval(_) => "retrieval_error",
            Error::Generation(GenerationError::Unconfigured(_)) => "backend_unconfigured",
            Error::Generation(_) => "backend_error",
            Error::Config { .. } => "config_error",
            Error::Serialization(_) => "serialization_error",
            Error::Internal(_) => "internal_error",
        }
    }
}

/// Result type alias using our Error.
pub type Result<T> = std::result::Result<T, Error>;

// --- Bounded context errors ---

/// Bad or missing caller input. Always surfaced, never retried.
#[derive(Debug, Clone, Error)]
pub enum ValidationError {
    #[error("Field '{field}' is not numeric (got {value})")]
    NonNumericField { field: &'static str, value: String },

    #[error("Missing required input: {0}")]
    MissingInput(String),
}

#[derive(Debug, Clone, Error)]
pub enum ClassifierError {
    /// No classifier backend was enabled at startup. Service-level, not
    /// per-request; checked once per process.
    #[error("Classifier backend not configured")]
    NotConfigured,

    #[error("Inference failed: {0}")]
    Inference(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Malformed classifier response: {0}")]
    MalformedResponse(String),
}

#[derive(Debug, Clone, Error)]
pub enum RetrievalError {
    /// The index backend is disabled or cannot be reached. Distinct from
    /// "zero matches", which is a normal empty result.
    #[error("Knowledge index unavailable: {0}")]
    Unavailable(String),

    #[error("Query failed: {0}")]
    QueryFailed(String),
}

#[derive(Debug, Clone, Error)]
pub enum GenerationError {
    /// No credentials/model available at startup. Checked once, cached.
    #[error("Generation backend not configured: {0}")]
    Unconfigured(String),

    #[error("API request failed: {message} (status: {status_code})")]
    ApiError { status_code: u16, message: String },

    #[error("Rate limited by backend, retry after {retry_after_secs}s")]
    RateLimited { retry_after_secs: u64 },

    #[error("Authentication failed: {0}")]
    AuthenticationFailed(String),

    #[error("Request timed out: {0}")]
    Timeout(String),

    #[error("Network error: {0}")]
    Network(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_error_names_the_field() {
        let err = Error::Validation(ValidationError::NonNumericField {
            field: "rainfall",
            value: "\"wet\"".into(),
        });
        assert!(err.to_string().contains("rainfall"));
        assert_eq!(err.kind(), "validation_error");
    }

    #[test]
    fn unavailable_kinds_are_distinct_from_runtime_failures() {
        let unavailable = Error::Classifier(ClassifierError::NotConfigured);
        let inference = Error::Classifier(ClassifierError::Inference("boom".into()));
        assert_eq!(unavailable.kind(), "model_unavailable");
        assert_eq!(inference.kind(), "inference_error");

        let disabled = Error::Retrieval(RetrievalError::Unavailable("disabled".into()));
        assert_eq!(disabled.kind(), "retrieval_unavailable");

        let unconfigured = Error::Generation(GenerationError::Unconfigured("no key".into()));
        let api = Error::Generation(GenerationError::ApiError {
            status_code: 500,
            message: "quota".into(),
        });
        assert_eq!(unconfigured.kind(), "backend_unconfigured");
        assert_eq!(api.kind(), "backend_error");
    }

    #[test]
    fn generation_error_carries_backend_detail() {
        let err = Error::Generation(GenerationError::ApiError {
            status_code: 429,
            message: "Too many requests".into(),
        });
        assert!(err.to_string().contains("429"));
        assert!(err.to_string().contains("Too many requests"));
    }
}
