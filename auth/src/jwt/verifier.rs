use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use chrono::Utc;
use jsonwebtoken::decode;
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::Algorithm;
use jsonwebtoken::DecodingKey;
use jsonwebtoken::Validation;

use super::claims::Claims;
use super::errors::TokenError;

/// Validates bearer tokens against the shared signing key.
///
/// Checks, in order: signature, issuer, and the time window
/// `[iat - leeway, exp + leeway]`. Returns the full claim set on success;
/// freshness of the underlying account is the caller's concern, no storage
/// lookup happens here.
pub struct TokenVerifier {
    decoding_key: DecodingKey,
    validation: Validation,
    leeway: i64,
}

impl TokenVerifier {
    /// Create a verifier for the given secret and issuer.
    ///
    /// # Arguments
    /// * `secret` - Raw signing key bytes, same key the issuer signs with
    /// * `issuer` - Expected `iss` claim value
    /// * `leeway_seconds` - Tolerated clock skew on both window edges
    pub fn new(secret: &[u8], issuer: String, leeway_seconds: i64) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = leeway_seconds.max(0) as u64;
        validation.validate_exp = true;
        validation.set_issuer(&[issuer]);

        Self {
            decoding_key: DecodingKey::from_secret(secret),
            validation,
            leeway: leeway_seconds,
        }
    }

    /// Verify a token and return its claim set.
    ///
    /// # Errors
    /// * `InvalidSignature` - Signature does not match the key, or the
    ///   signature segment itself is corrupt
    /// * `InvalidIssuer` - `iss` differs from the configured issuer
    /// * `Expired` - `exp` is more than the leeway in the past
    /// * `NotYetValid` - `iat` is more than the leeway in the future
    /// * `Malformed` - Payload is not decodable as the claim contract
    pub fn verify(&self, token: &str) -> Result<Claims, TokenError> {
        let data = decode::<Claims>(token, &self.decoding_key, &self.validation).map_err(|e| {
            match e.kind() {
                ErrorKind::InvalidSignature => TokenError::InvalidSignature,
                ErrorKind::InvalidIssuer => TokenError::InvalidIssuer,
                ErrorKind::ExpiredSignature => TokenError::Expired,
                ErrorKind::ImmatureSignature => TokenError::NotYetValid,
                // A corrupted signature segment can fail base64 decoding
                // (non-canonical trailing bits) before any comparison runs.
                // When the signed part is intact this is still a signature
                // mismatch, not a malformed token.
                ErrorKind::Base64(_) if signed_part_decodes(token) => {
                    TokenError::InvalidSignature
                }
                _ => TokenError::Malformed(e.to_string()),
            }
        })?;

        // jsonwebtoken does not validate iat; enforce the lower window edge
        let claims = data.claims;
        if claims.iat - self.leeway > Utc::now().timestamp() {
            return Err(TokenError::NotYetValid);
        }

        Ok(claims)
    }
}

/// Whether the header and payload segments of a three-part token decode
/// as base64url, isolating corruption to the signature segment.
fn signed_part_decodes(token: &str) -> bool {
    let mut segments = token.split('.');
    match (
        segments.next(),
        segments.next(),
        segments.next(),
        segments.next(),
    ) {
        (Some(header), Some(payload), Some(_), None) => {
            URL_SAFE_NO_PAD.decode(header).is_ok() && URL_SAFE_NO_PAD.decode(payload).is_ok()
        }
        _ => false,
    }
}
