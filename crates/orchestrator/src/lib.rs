//! # CropSage Orchestrator
//!
//! The session-scoped recommendation core. Coordinates the three external
//! backends (classifier, knowledge index, generator) around the per-client
//! session store:
//!
//! 1. `predict` — validate 7 raw fields, run inference, cache the result
//! 2. `compose_prompt` — fuse the cached prediction with a free-text
//!    question into one grounded prompt
//! 3. `recommend` — dispatch the composed prompt to the generator
//! 4. `chat` — retrieval-augmented generation, session-independent
//! 5. `latest` — read back the cached prediction
//! 6. `status` — report startup-resolved backend capabilities
//! 7. `doctor` — probe the wired backends for liveness

pub mod orchestrator;
pub mod prompt;

pub use orchestrator::{BackendProbe, DoctorReport, Orchestrator, PredictOutcome, StatusReport};
pub use prompt::{UNKNOWN_CROP, compose_open, compose_structured};

#[cfg(test)]
pub(crate) mod test_helpers;
