//! Error types for kheight-cases.

use kheight_core::BlockError;
use thiserror::Error;

/// Errors produced while running proof cases.
#[derive(Debug, Error)]
pub enum CaseError {
    /// The core engine failed on a case. Carries enough context to find it.
    #[error("case '{label}' (k = {k}) failed: {source}")]
    Block {
        label: String,
        k: u8,
        #[source]
        source: BlockError,
    },

    /// A family name did not match any known family.
    #[error("unknown case family: '{name}'")]
    UnknownFamily { name: String },

    /// JSON serialization or deserialization failed.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
