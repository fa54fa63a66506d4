use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use axum_extra::extract::WithRejection;

use agora_types::api::CreateUserRequest;

use crate::auth::{AppState, with_credentials, with_store};
use crate::error::{ApiError, ApiResult};
use crate::identity::{self, BearerToken};
use crate::service;

/// Duplicate check, hash, insert: three steps so the store is never held
/// while Argon2 runs.
pub async fn create_user(
    State(state): State<AppState>,
    WithRejection(Json(req), _): WithRejection<Json<CreateUserRequest>, ApiError>,
) -> ApiResult<impl IntoResponse> {
    let email = req.email.clone();
    with_store(&state, move |conn, _| service::check_registration(conn, &email)).await?;

    let password = req.password.clone();
    let password_hash =
        with_credentials(&state, move |credentials| Ok(credentials.hash_password(&password)?)).await?;

    let user = with_store(&state, move |conn, _| {
        service::create_user(conn, &req, &password_hash)
    })
    .await?;

    Ok((StatusCode::CREATED, Json(user)))
}

pub async fn read_me(
    State(state): State<AppState>,
    BearerToken(token): BearerToken,
) -> ApiResult<impl IntoResponse> {
    let user = with_store(&state, move |conn, credentials| {
        identity::resolve(conn, credentials, &token)
    })
    .await?;

    Ok(Json(service::user_response(user)))
}
