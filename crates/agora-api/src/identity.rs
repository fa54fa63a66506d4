use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use axum_extra::TypedHeader;
use axum_extra::headers::{Authorization, authorization::Bearer};
use tracing::debug;

use agora_db::{Connection, models::UserRow, queries};

use crate::credentials::Credentials;
use crate::error::{ApiError, ApiResult};

/// Raw token from `Authorization: Bearer <token>`. Extraction only checks
/// the header shape; the token is validated by [`resolve`] inside the
/// request's store scope.
#[derive(Debug, Clone)]
pub struct BearerToken(pub String);

impl<S> FromRequestParts<S> for BearerToken
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let TypedHeader(Authorization(bearer)) =
            TypedHeader::<Authorization<Bearer>>::from_request_parts(parts, state)
                .await
                .map_err(|_| ApiError::Unauthenticated)?;

        Ok(Self(bearer.token().to_string()))
    }
}

/// Map a bearer token to the user it was issued for.
pub fn resolve(conn: &Connection, credentials: &Credentials, token: &str) -> ApiResult<UserRow> {
    let email = credentials
        .validate_token(token)
        .map_err(|_| ApiError::Unauthenticated)?;

    queries::user_by_email(conn, &email)?.ok_or_else(|| {
        debug!("Token subject {} has no user record", email);
        ApiError::Unauthenticated
    })
}
