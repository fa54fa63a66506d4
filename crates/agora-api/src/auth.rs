use std::sync::Arc;

use axum::{
    Form, Json,
    extract::{FromRequest, Multipart, Request, State},
    http::header,
    response::IntoResponse,
};
use tokio::task::JoinError;
use tracing::error;

use agora_db::{Connection, Database};
use agora_types::api::LoginForm;

use crate::credentials::Credentials;
use crate::error::{ApiError, ApiResult};
use crate::service;

pub type AppState = Arc<AppStateInner>;

pub struct AppStateInner {
    pub db: Database,
    pub credentials: Credentials,
}

/// Run `f` with the store handle on the blocking pool. The handle is
/// acquired inside the task and released when `f` returns.
pub async fn with_store<F, T>(state: &AppState, f: F) -> ApiResult<T>
where
    F: FnOnce(&Connection, &Credentials) -> ApiResult<T> + Send + 'static,
    T: Send + 'static,
{
    let state = state.clone();
    tokio::task::spawn_blocking(move || state.db.with_conn(|conn| f(conn, &state.credentials)))
        .await
        .map_err(join_error)?
}

/// Run password hashing or verification on the blocking pool without
/// touching the store.
pub async fn with_credentials<F, T>(state: &AppState, f: F) -> ApiResult<T>
where
    F: FnOnce(&Credentials) -> ApiResult<T> + Send + 'static,
    T: Send + 'static,
{
    let state = state.clone();
    tokio::task::spawn_blocking(move || f(&state.credentials))
        .await
        .map_err(join_error)?
}

fn join_error(e: JoinError) -> ApiError {
    error!("spawn_blocking join error: {}", e);
    ApiError::Store(anyhow::anyhow!("blocking task failed: {}", e))
}

/// Login form sent either urlencoded or as `multipart/form-data` (what a
/// browser `FormData` body produces).
#[derive(Debug)]
pub struct LoginCredentials(pub LoginForm);

impl<S> FromRequest<S> for LoginCredentials
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let is_multipart = req
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .is_some_and(|ct| ct.to_ascii_lowercase().starts_with("multipart/form-data"));

        if !is_multipart {
            let Form(form) = Form::<LoginForm>::from_request(req, state).await?;
            return Ok(Self(form));
        }

        let mut multipart = Multipart::from_request(req, state).await?;
        let mut username = None;
        let mut password = None;
        while let Some(field) = multipart.next_field().await? {
            let name = field.name().map(str::to_owned);
            match name.as_deref() {
                Some("username") => username = Some(field.text().await?),
                Some("password") => password = Some(field.text().await?),
                // grant_type, scope, client_id, client_secret
                _ => {}
            }
        }

        match (username, password) {
            (Some(username), Some(password)) => Ok(Self(LoginForm { username, password })),
            (None, _) => Err(ApiError::Validation("username is required".to_string())),
            (_, None) => Err(ApiError::Validation("password is required".to_string())),
        }
    }
}

pub async fn login(
    State(state): State<AppState>,
    LoginCredentials(form): LoginCredentials,
) -> ApiResult<impl IntoResponse> {
    let LoginForm { username, password } = form;

    let email = username.clone();
    let user = with_store(&state, move |conn, _| service::user_for_login(conn, &email)).await?;

    let token = with_credentials(&state, move |credentials| {
        service::verify_login(credentials, user, &username, &password)
    })
    .await?;

    Ok(Json(token))
}
