use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;

use super::ApiError;
use super::ApiSuccess;
use super::AuthResponseData;
use crate::inbound::http::router::AppState;
use crate::outbound::google::OidcError;

/// Complete a federated login: exchange the authorization code, validate
/// the provider assertion, resolve it to a local account and issue our
/// own token for it.
pub async fn oauth_exchange(
    State(state): State<AppState>,
    Json(body): Json<OauthExchangeRequestBody>,
) -> Result<ApiSuccess<AuthResponseData>, ApiError> {
    let id_token = state
        .google_client
        .exchange_code(&body.code, &body.code_verifier)
        .await
        .map_err(ApiError::from)?;

    let identity = state
        .google_client
        .verify_id_token(&id_token)
        .await
        .map_err(ApiError::from)?;

    let user = state
        .oidc_service
        .link_or_create(&identity)
        .await
        .map_err(ApiError::from)?;

    let issued = state
        .token_issuer
        .issue(
            user.id.0,
            user.username.as_str(),
            &[user.role.as_str().to_string()],
        )
        .map_err(|e| ApiError::InternalServerError(format!("Token generation failed: {e}")))?;

    Ok(ApiSuccess::new(
        StatusCode::CREATED,
        AuthResponseData {
            token: issued.token,
            expires_in: issued.expires_in,
        },
    ))
}

impl From<OidcError> for ApiError {
    fn from(err: OidcError) -> Self {
        match err {
            OidcError::Exchange(_) | OidcError::MissingIdToken | OidcError::InvalidAssertion(_) => {
                tracing::warn!(cause = %err, "federated login rejected");
                ApiError::Unauthorized("Invalid authorization code".to_string())
            }
            OidcError::Http(_) => ApiError::ServiceUnavailable(
                "Identity provider unreachable, please retry".to_string(),
            ),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct OauthExchangeRequestBody {
    code: String,
    code_verifier: String,
}
