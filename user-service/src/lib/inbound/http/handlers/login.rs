use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;

use super::ApiError;
use super::ApiSuccess;
use super::AuthResponseData;
use crate::domain::user::models::Username;
use crate::inbound::http::router::AppState;

pub async fn login(
    State(state): State<AppState>,
    Json(body): Json<LoginRequestBody>,
) -> Result<ApiSuccess<AuthResponseData>, ApiError> {
    // A username that cannot even be constructed matches no account, so
    // it gets the same generic rejection as a wrong password.
    let username = Username::new(body.username)
        .map_err(|_| ApiError::Unauthorized("Invalid username or password".to_string()))?;

    let user = state
        .user_service
        .authenticate(&username, &body.password)
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
        StatusCode::OK,
        AuthResponseData {
            token: issued.token,
            expires_in: issued.expires_in,
        },
    ))
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LoginRequestBody {
    username: String,
    password: String,
}
