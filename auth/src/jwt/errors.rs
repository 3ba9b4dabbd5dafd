use thiserror::Error;

/// Error type for JWT operations.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum JwtError {
    #[error("Failed to encode token: {0}")]
    EncodingFailed(String),

    #[error("Token is malformed: {0}")]
    Malformed(String),

    #[error("Token signature does not match")]
    InvalidSignature,

    #[error("Token is expired")]
    TokenExpired,

    /// Payload does not deserialize into the expected claims (missing or mistyped field)
    #[error("Token claims are invalid: {0}")]
    InvalidClaims(String),
}
