//! Error types for effect derivation.

use std::fmt;

use serde::Serialize;
use stellar_effects_common::NetworkError;
use thiserror::Error;

/// Which of the three binary inputs failed to decode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum XdrInput {
    Envelope,
    Result,
    Meta,
}

impl fmt::Display for XdrInput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            XdrInput::Envelope => "transaction envelope",
            XdrInput::Result => "transaction result",
            XdrInput::Meta => "transaction meta",
        };
        f.write_str(name)
    }
}

/// Fatal errors: no partial result is returned.
#[derive(Debug, Error)]
pub enum EffectsError {
    /// A binary input is not a valid XDR value of the expected type.
    #[error("failed to decode {input}: {source}")]
    Decode {
        input: XdrInput,
        #[source]
        source: stellar_xdr::curr::Error,
    },

    /// A binary input is not valid base64.
    #[error("invalid base64 for {input}: {reason}")]
    Base64 { input: XdrInput, reason: String },

    /// The metadata does not describe the envelope's operations.
    #[error("transaction meta has {actual} operation entries, envelope has {expected}")]
    MetaMismatch { expected: usize, actual: usize },

    /// Options rejected at the entry point.
    #[error("invalid options: {0}")]
    InvalidOptions(String),

    #[error(transparent)]
    Network(#[from] NetworkError),
}

/// Decoder output that contradicts the operation's declared type.
///
/// Reported as a warning on the affected operation; sibling operations are
/// still derived.
#[derive(Debug, Clone, Error, PartialEq, Eq, Serialize)]
#[error("operation {operation} ({kind}): {reason}")]
pub struct DerivationInconsistency {
    pub operation: usize,
    pub kind: &'static str,
    pub reason: String,
}

impl DerivationInconsistency {
    pub fn new(operation: usize, kind: &'static str, reason: impl Into<String>) -> Self {
        Self {
            operation,
            kind,
            reason: reason.into(),
        }
    }
}
