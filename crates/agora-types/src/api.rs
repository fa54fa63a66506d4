use serde::{Deserialize, Serialize};

// -- JWT Claims --

/// Bearer token claims. `sub` carries the user's email, which the server
/// re-resolves against the store on every authenticated request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub iat: usize,
    pub exp: usize,
}

// -- Auth --

/// OAuth2 password-flow form. Clients may also send `grant_type`, `scope`,
/// `client_id` and `client_secret`; those are accepted and ignored.
#[derive(Debug, Deserialize)]
pub struct LoginForm {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub token_type: String,
}

impl TokenResponse {
    pub fn bearer(access_token: String) -> Self {
        Self {
            access_token,
            token_type: "bearer".to_string(),
        }
    }
}

// -- Users --

#[derive(Debug, Clone, Deserialize)]
pub struct CreateUserRequest {
    pub user_name: String,
    pub email: String,
    pub password: String,
}

/// Public view of a user. The password hash never leaves the server.
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct UserResponse {
    pub id: i64,
    pub user_name: String,
    pub email: String,
}

// -- Messages --

/// Body for both creating and editing a message. Like every request body,
/// unknown keys are ignored.
#[derive(Debug, Deserialize)]
pub struct MessageRequest {
    pub user_message: String,
}

#[derive(Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct MessageResponse {
    pub id: i64,
    pub user_id: i64,
    pub user_message: String,
    pub user_name: String,
}

// -- Comments --

#[derive(Debug, Deserialize)]
pub struct CreateCommentRequest {
    pub message_id: i64,
    pub comment: String,
}

#[derive(Debug, Deserialize)]
pub struct UpdateCommentRequest {
    pub comment: String,
}

#[derive(Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct CommentResponse {
    pub id: i64,
    pub message_id: i64,
    pub user_id: i64,
    pub comment: String,
    pub user_name: String,
}

// -- Errors --

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub detail: String,
}
