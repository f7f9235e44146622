//! Fieldgate Guard
//!
//! A per-device, per-field telemetry sharing policy engine with durable
//! record trails.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                     Simulation Engine                        │
//! │  ┌────────────┐   ┌────────────┐   ┌──────────────────────┐  │
//! │  │ Telemetry  │ → │ Classifier │ → │ Policy Evaluator     │  │
//! │  │ (reading)  │   │ (tags)     │   │ (rules + override)   │  │
//! │  └────────────┘   └────────────┘   └──────────────────────┘  │
//! │                          │                                   │
//! │            shared (digested) / violations / tags             │
//! │                          │                                   │
//! │  ┌───────────────────────▼──────────────────────────────┐    │
//! │  │  Record Sinks: cloud upload │ audit │ trust │ violation   │
//! │  └──────────────────────────────────────────────────────┘    │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! Every field of a reading lands in exactly one of three buckets: shared
//! (digested and recorded), violation (a rule's precondition could not be
//! evaluated against the value), or silently dropped (policy-compliant
//! non-sharing). Shared values leave the evaluator only as one-way
//! SHA-256 digests — anonymization, not encryption.

pub mod classify;
pub mod digest;
pub mod engine;
pub mod evaluate;
pub mod policy;
pub mod records;
pub mod telemetry;

pub use classify::*;
pub use digest::*;
pub use engine::*;
pub use evaluate::*;
pub use policy::*;
pub use records::*;
pub use telemetry::*;

use thiserror::Error;

/// Errors from guard operations
#[derive(Debug, Error)]
pub enum GuardError {
    #[error("unrecognized rule '{rule}' for field '{field}' on device '{device}'")]
    UnknownRule {
        device: String,
        field: String,
        rule: String,
    },
    #[error("policy document parse error: {0}")]
    PolicyParse(String),
    #[error("registry error: {0}")]
    Registry(#[from] fieldgate_registry::RegistryError),
    #[error("record sink error: {0}")]
    Sink(String),
}

impl From<std::io::Error> for GuardError {
    fn from(e: std::io::Error) -> Self {
        GuardError::Sink(e.to_string())
    }
}

impl From<csv::Error> for GuardError {
    fn from(e: csv::Error) -> Self {
        GuardError::Sink(e.to_string())
    }
}

/// Result type for guard operations
pub type Result<T> = std::result::Result<T, GuardError>;
