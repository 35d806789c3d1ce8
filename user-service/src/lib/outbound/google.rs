use jsonwebtoken::decode;
use jsonwebtoken::decode_header;
use jsonwebtoken::Algorithm;
use jsonwebtoken::DecodingKey;
use jsonwebtoken::Validation;
use serde::Deserialize;
use thiserror::Error;

use crate::config::GoogleConfig;
use crate::domain::user::models::ExternalIdentity;

/// Leeway applied to the provider token's timestamp checks.
const ID_TOKEN_LEEWAY_SECONDS: u64 = 60;

/// Error type for the external identity provider exchange.
#[derive(Debug, Error)]
pub enum OidcError {
    #[error("authorization code exchange failed: {0}")]
    Exchange(String),

    #[error("token response carried no id_token")]
    MissingIdToken,

    #[error("provider id token rejected: {0}")]
    InvalidAssertion(String),

    #[error("provider request failed: {0}")]
    Http(#[from] reqwest::Error),
}

/// Token endpoint response, Google's field names.
#[derive(Debug, Deserialize)]
struct GoogleTokenResponse {
    #[serde(default)]
    id_token: Option<String>,
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    error_description: Option<String>,
}

#[derive(Debug, Deserialize)]
struct JwkSet {
    keys: Vec<Jwk>,
}

#[derive(Debug, Deserialize)]
struct Jwk {
    #[serde(default)]
    kid: Option<String>,
    n: String,
    e: String,
}

/// Claims extracted from a Google ID token after validation.
#[derive(Debug, Deserialize)]
struct GoogleIdClaims {
    sub: String,
    #[serde(default)]
    email: Option<String>,
    #[serde(default)]
    email_verified: bool,
    #[serde(default)]
    name: Option<String>,
}

impl GoogleIdClaims {
    fn into_identity(self) -> ExternalIdentity {
        ExternalIdentity {
            provider: "google".to_string(),
            subject: self.sub,
            email: self.email,
            email_verified: self.email_verified,
            name: self.name,
        }
    }
}

/// External identity provider collaborator.
///
/// Exchanges the OAuth authorization code for Google's token response and
/// validates the returned ID token (signature against the published JWKS,
/// issuer, audience, freshness) before anything downstream sees it. The
/// linker only ever receives the resulting [`ExternalIdentity`].
pub struct GoogleAuthClient {
    http: reqwest::Client,
    config: GoogleConfig,
}

impl GoogleAuthClient {
    pub fn new(config: GoogleConfig) -> Self {
        Self {
            http: reqwest::Client::new(),
            config,
        }
    }

    /// Exchange an authorization code (+ PKCE verifier) for an ID token.
    ///
    /// # Errors
    /// * `Exchange` - The provider rejected the code
    /// * `MissingIdToken` - Response carried no `id_token`
    /// * `Http` - Transport failure
    pub async fn exchange_code(
        &self,
        code: &str,
        code_verifier: &str,
    ) -> Result<String, OidcError> {
        let form = [
            ("grant_type", "authorization_code"),
            ("code", code),
            ("client_id", &self.config.client_id),
            ("client_secret", &self.config.client_secret),
            ("redirect_uri", &self.config.redirect_uri),
            ("code_verifier", code_verifier),
        ];

        let response: GoogleTokenResponse = self
            .http
            .post(&self.config.token_uri)
            .form(&form)
            .send()
            .await?
            .json()
            .await?;

        if let Some(error) = response.error {
            let description = response.error_description.unwrap_or_default();
            return Err(OidcError::Exchange(format!("{error}: {description}")));
        }

        response.id_token.ok_or(OidcError::MissingIdToken)
    }

    /// Validate an ID token and extract the identity assertion.
    ///
    /// # Errors
    /// * `InvalidAssertion` - Signature, issuer, audience or timestamp
    ///   check failed
    /// * `Http` - JWKS fetch failed
    pub async fn verify_id_token(&self, id_token: &str) -> Result<ExternalIdentity, OidcError> {
        let header = decode_header(id_token)
            .map_err(|e| OidcError::InvalidAssertion(format!("undecodable header: {e}")))?;

        let jwks: JwkSet = self
            .http
            .get(&self.config.jwks_uri)
            .send()
            .await?
            .json()
            .await?;

        let jwk = jwks
            .keys
            .iter()
            .find(|k| k.kid == header.kid)
            .ok_or_else(|| OidcError::InvalidAssertion("no JWKS key for token kid".to_string()))?;

        let key = DecodingKey::from_rsa_components(&jwk.n, &jwk.e)
            .map_err(|e| OidcError::InvalidAssertion(format!("bad JWKS key: {e}")))?;

        let mut validation = Validation::new(Algorithm::RS256);
        validation.leeway = ID_TOKEN_LEEWAY_SECONDS;
        validation.set_audience(&[self.config.client_id.as_str()]);
        validation.set_issuer(&[self.config.issuer.as_str(), "accounts.google.com"]);

        let data = decode::<GoogleIdClaims>(id_token, &key, &validation)
            .map_err(|e| OidcError::InvalidAssertion(e.to_string()))?;

        Ok(data.claims.into_identity())
    }
}
