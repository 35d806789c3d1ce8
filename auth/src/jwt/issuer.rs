use chrono::Duration;
use chrono::Utc;
use jsonwebtoken::encode;
use jsonwebtoken::Algorithm;
use jsonwebtoken::EncodingKey;
use jsonwebtoken::Header;

use super::claims::Claims;
use super::errors::TokenError;

/// Builds and signs bearer tokens for authenticated accounts.
///
/// Stateless with respect to request data; the only side effect of
/// issuance is reading the clock. Safe to share across request tasks.
pub struct TokenIssuer {
    encoding_key: EncodingKey,
    issuer: String,
    lifetime: Duration,
}

/// A freshly signed token plus its lifetime for client display.
#[derive(Debug, Clone)]
pub struct IssuedToken {
    pub token: String,
    /// Configured token lifetime in seconds
    pub expires_in: i64,
}

impl TokenIssuer {
    /// Create an issuer signing with HS256 over the given secret.
    ///
    /// # Arguments
    /// * `secret` - Raw signing key bytes (see [`super::decode_secret`])
    /// * `issuer` - Value of the `iss` claim
    /// * `lifetime` - Validity window applied to every issued token
    pub fn new(secret: &[u8], issuer: String, lifetime: Duration) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret),
            issuer,
            lifetime,
        }
    }

    /// Issue a signed token for an account.
    ///
    /// Subject is the stringified account id; `iat` is now and `exp` is
    /// now plus the configured lifetime. An empty role set omits the
    /// `roles` claim entirely.
    ///
    /// # Errors
    /// * `Signing` - Serialization or signing failed; cannot happen with a
    ///   valid key and is not part of the per-request contract
    pub fn issue(
        &self,
        user_id: i64,
        username: &str,
        roles: &[String],
    ) -> Result<IssuedToken, TokenError> {
        let now = Utc::now();

        let claims = Claims {
            sub: user_id.to_string(),
            iss: self.issuer.clone(),
            iat: now.timestamp(),
            exp: (now + self.lifetime).timestamp(),
            user_id,
            username: username.to_string(),
            roles: if roles.is_empty() {
                None
            } else {
                Some(roles.to_vec())
            },
        };

        let token = encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| TokenError::Signing(e.to_string()))?;

        Ok(IssuedToken {
            token,
            expires_in: self.lifetime.num_seconds(),
        })
    }

    /// Configured lifetime in seconds.
    pub fn expires_in_seconds(&self) -> i64 {
        self.lifetime.num_seconds()
    }
}
