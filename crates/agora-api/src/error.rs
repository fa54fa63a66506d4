use axum::Json;
use axum::extract::multipart::{MultipartError, MultipartRejection};
use axum::extract::rejection::{FormRejection, JsonRejection, PathRejection, QueryRejection};
use axum::http::{StatusCode, header};
use axum::response::{IntoResponse, Response};

use agora_types::api::ErrorResponse;

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// Missing, malformed, expired or otherwise unusable bearer token, or a
    /// token whose subject no longer exists.
    #[error("Could not validate credentials")]
    Unauthenticated,

    /// Same message for an unknown email and a wrong password.
    #[error("Incorrect email or password")]
    InvalidCredentials,

    #[error("Email already registered")]
    Conflict,

    #[error("{0} not found")]
    NotFound(&'static str),

    #[error("Not permitted to modify this {0}")]
    Forbidden(&'static str),

    #[error("{0}")]
    Validation(String),

    #[error("Store error: {0}")]
    Store(#[from] anyhow::Error),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Unauthenticated => StatusCode::UNAUTHORIZED,
            ApiError::InvalidCredentials | ApiError::Conflict => StatusCode::BAD_REQUEST,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Forbidden(_) => StatusCode::FORBIDDEN,
            ApiError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let detail = match &self {
            ApiError::Store(e) => {
                tracing::error!("Store error: {:#}", e);
                "Internal server error".to_string()
            }
            other => other.to_string(),
        };

        let body = Json(ErrorResponse { detail });
        match self {
            ApiError::Unauthenticated => {
                (status, [(header::WWW_AUTHENTICATE, "Bearer")], body).into_response()
            }
            _ => (status, body).into_response(),
        }
    }
}

pub type ApiResult<T> = Result<T, ApiError>;

// Extractor rejections become 422s with the same `{"detail"}` body as
// every other error.

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::Validation(rejection.body_text())
    }
}

impl From<PathRejection> for ApiError {
    fn from(rejection: PathRejection) -> Self {
        ApiError::Validation(rejection.body_text())
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        ApiError::Validation(rejection.body_text())
    }
}

impl From<FormRejection> for ApiError {
    fn from(rejection: FormRejection) -> Self {
        ApiError::Validation(rejection.body_text())
    }
}

impl From<MultipartRejection> for ApiError {
    fn from(rejection: MultipartRejection) -> Self {
        ApiError::Validation(rejection.body_text())
    }
}

impl From<MultipartError> for ApiError {
    fn from(err: MultipartError) -> Self {
        ApiError::Validation(err.body_text())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn response(err: ApiError) -> Response {
        err.into_response()
    }

    #[test]
    fn unauthenticated_challenges_for_bearer() {
        let res = response(ApiError::Unauthenticated);
        assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(res.headers()[header::WWW_AUTHENTICATE], "Bearer");
    }

    #[test]
    fn login_and_registration_failures_are_bad_requests() {
        assert_eq!(response(ApiError::InvalidCredentials).status(), StatusCode::BAD_REQUEST);
        assert_eq!(response(ApiError::Conflict).status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn ownership_failures_map_to_404_and_403() {
        assert_eq!(response(ApiError::NotFound("Message")).status(), StatusCode::NOT_FOUND);
        assert_eq!(response(ApiError::Forbidden("message")).status(), StatusCode::FORBIDDEN);
    }

    #[test]
    fn validation_errors_are_unprocessable() {
        let res = response(ApiError::Validation("email is not a valid address".into()));
        assert_eq!(res.status(), StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[test]
    fn store_errors_hide_their_cause() {
        let err = ApiError::from(anyhow::anyhow!("disk I/O error"));
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert!(!response(err).headers().contains_key(header::WWW_AUTHENTICATE));
    }
}
