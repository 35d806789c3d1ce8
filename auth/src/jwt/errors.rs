use thiserror::Error;

/// Error type for token verification and issuance.
///
/// Verification failures are deliberately precise here; the HTTP surface
/// collapses them all to a generic "unauthorized" and only the logs keep
/// the sub-case.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TokenError {
    #[error("token signature does not match the configured key")]
    InvalidSignature,

    #[error("token issuer does not match the configured issuer")]
    InvalidIssuer,

    #[error("token is expired")]
    Expired,

    #[error("token is not yet valid")]
    NotYetValid,

    #[error("token payload is malformed: {0}")]
    Malformed(String),

    #[error("failed to sign token: {0}")]
    Signing(String),
}

/// Error type for signing-secret configuration.
///
/// Surfaces at process startup only; a secret that fails to decode is a
/// fatal misconfiguration, never a per-request condition.
#[derive(Debug, Clone, Error)]
pub enum SecretError {
    #[error("jwt secret is not valid base64: {0}")]
    InvalidBase64(String),

    #[error("jwt secret is empty")]
    Empty,
}
