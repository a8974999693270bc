//! # CropSage Core
//!
//! Domain types, traits, and error definitions for the CropSage advisory
//! runtime. This crate has **zero framework dependencies** — it defines the
//! domain model that all other crates implement against.
//!
//! ## Design Philosophy
//!
//! Every backend is defined as a trait here. Implementations live in their
//! respective crates. This enables:
//! - Swapping backends via configuration
//! - Easy testing with mock/stub implementations
//! - Clean dependency graph (all crates depend inward on core)

pub mod classifier;
pub mod error;
pub mod features;
pub mod generator;
pub mod knowledge;
pub mod session;

// Re-export key types at crate root for ergonomics
pub use classifier::{CropClassifier, Prediction};
pub use error::{
    ClassifierError, Error, GenerationError, Result, RetrievalError, ValidationError,
};
pub use features::{FEATURE_FIELDS, FeatureVector};
pub use generator::Generator;
pub use knowledge::{KnowledgeIndex, Passage};
pub use session::SessionRecord;
