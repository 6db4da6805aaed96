use thiserror::Error;

/// Errors produced while encoding or decoding keys.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CryptoError {
    #[error("invalid strkey: {0}")]
    InvalidStrKey(String),
}
