//! Ownership-enforced operations.
//!
//! Everything but [`verify_login`] runs against a store handle. Mutations of
//! a message or comment check, in order: the target exists (`NotFound`),
//! then the actor owns it (`Forbidden`). A non-owner asking for a missing id
//! therefore sees `NotFound`. The actor itself has already been resolved
//! from the bearer token by the time these run.

use tracing::{info, warn};

use agora_db::{
    Connection,
    models::{CommentRow, MessageRow, UserRow},
    queries,
};
use agora_types::api::{
    CommentResponse, CreateUserRequest, MessageResponse, TokenResponse, UserResponse,
};

use crate::credentials::Credentials;
use crate::error::{ApiError, ApiResult};

const MESSAGE: &str = "message";
const COMMENT: &str = "comment";

// -- Users --
//
// Registration and login never hold the store while hashing or verifying a
// password: the handler looks up in one store scope, does the Argon2 work on
// its own, then (for registration) inserts in a second scope.

/// Reject a registration before any hashing happens.
pub fn check_registration(conn: &Connection, email: &str) -> ApiResult<()> {
    validate_email(email)?;

    if queries::user_by_email(conn, email)?.is_some() {
        return Err(ApiError::Conflict);
    }
    Ok(())
}

pub fn create_user(conn: &Connection, req: &CreateUserRequest, password_hash: &str) -> ApiResult<UserResponse> {
    // The unique index catches a registration racing in since the check.
    let user = queries::insert_user(conn, &req.user_name, &req.email, password_hash)?
        .ok_or(ApiError::Conflict)?;

    info!("Registered user {} ({})", user.id, user.email);
    Ok(user_response(user))
}

pub fn user_for_login(conn: &Connection, email: &str) -> ApiResult<Option<UserRow>> {
    Ok(queries::user_by_email(conn, email)?)
}

/// Unknown user and wrong password fail identically.
pub fn verify_login(
    credentials: &Credentials,
    user: Option<UserRow>,
    email: &str,
    password: &str,
) -> ApiResult<TokenResponse> {
    match user {
        Some(user) if credentials.verify_password(password, &user.password_hash) => {
            let token = credentials.issue_token(&user.email)?;
            Ok(TokenResponse::bearer(token))
        }
        _ => {
            warn!("Failed login for {}", email);
            Err(ApiError::InvalidCredentials)
        }
    }
}

pub fn user_response(user: UserRow) -> UserResponse {
    UserResponse {
        id: user.id,
        user_name: user.user_name,
        email: user.email,
    }
}

// -- Messages --

pub fn list_messages(conn: &Connection, skip: u32, limit: u32) -> ApiResult<Vec<MessageResponse>> {
    let rows = queries::list_messages(conn, skip, limit)?;
    Ok(rows.into_iter().map(message_response).collect())
}

pub fn create_message(conn: &Connection, actor: &UserRow, text: &str) -> ApiResult<MessageResponse> {
    let row = queries::insert_message(conn, actor.id, text)?;
    Ok(message_response(row))
}

pub fn update_message(
    conn: &Connection,
    actor: &UserRow,
    message_id: i64,
    text: &str,
) -> ApiResult<MessageResponse> {
    let message = owned_message(conn, actor, message_id)?;
    let row = queries::update_message(conn, message.id, text)?.ok_or(ApiError::NotFound("Message"))?;
    Ok(message_response(row))
}

pub fn delete_message(conn: &Connection, actor: &UserRow, message_id: i64) -> ApiResult<()> {
    let message = owned_message(conn, actor, message_id)?;

    if !queries::delete_message(conn, message.id)? {
        return Err(ApiError::NotFound("Message"));
    }
    info!("User {} deleted message {}", actor.id, message.id);
    Ok(())
}

fn owned_message(conn: &Connection, actor: &UserRow, message_id: i64) -> ApiResult<MessageRow> {
    let message = queries::message_by_id(conn, message_id)?.ok_or(ApiError::NotFound("Message"))?;
    ensure_owner(actor, message.user_id, MESSAGE, message.id)?;
    Ok(message)
}

fn message_response(row: MessageRow) -> MessageResponse {
    MessageResponse {
        id: row.id,
        user_id: row.user_id,
        user_message: row.user_message,
        user_name: row.user_name,
    }
}

// -- Comments --

/// Public: no identity needed. An unknown message simply has no comments.
pub fn list_comments(conn: &Connection, message_id: i64) -> ApiResult<Vec<CommentResponse>> {
    let rows = queries::comments_for_message(conn, message_id)?;
    Ok(rows.into_iter().map(comment_response).collect())
}

pub fn create_comment(
    conn: &Connection,
    actor: &UserRow,
    message_id: i64,
    text: &str,
) -> ApiResult<CommentResponse> {
    if queries::message_by_id(conn, message_id)?.is_none() {
        return Err(ApiError::NotFound("Message"));
    }

    let row = queries::insert_comment(conn, message_id, actor.id, text)?;
    Ok(comment_response(row))
}

pub fn update_comment(
    conn: &Connection,
    actor: &UserRow,
    comment_id: i64,
    text: &str,
) -> ApiResult<CommentResponse> {
    let comment = owned_comment(conn, actor, comment_id)?;
    let row = queries::update_comment(conn, comment.id, text)?.ok_or(ApiError::NotFound("Comment"))?;
    Ok(comment_response(row))
}

pub fn delete_comment(conn: &Connection, actor: &UserRow, comment_id: i64) -> ApiResult<()> {
    let comment = owned_comment(conn, actor, comment_id)?;

    if !queries::delete_comment(conn, comment.id)? {
        return Err(ApiError::NotFound("Comment"));
    }
    Ok(())
}

fn owned_comment(conn: &Connection, actor: &UserRow, comment_id: i64) -> ApiResult<CommentRow> {
    let comment = queries::comment_by_id(conn, comment_id)?.ok_or(ApiError::NotFound("Comment"))?;
    ensure_owner(actor, comment.user_id, COMMENT, comment.id)?;
    Ok(comment)
}

fn comment_response(row: CommentRow) -> CommentResponse {
    CommentResponse {
        id: row.id,
        message_id: row.message_id,
        user_id: row.user_id,
        comment: row.comment,
        user_name: row.user_name,
    }
}

// -- Checks --

fn ensure_owner(actor: &UserRow, owner_id: i64, kind: &'static str, id: i64) -> ApiResult<()> {
    if actor.id != owner_id {
        warn!("User {} denied access to {} {} owned by {}", actor.id, kind, id, owner_id);
        return Err(ApiError::Forbidden(kind));
    }
    Ok(())
}

fn validate_email(email: &str) -> ApiResult<()> {
    let valid = match email.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && !domain.is_empty()
                && !domain.contains('@')
                && !email.chars().any(char::is_whitespace)
        }
        None => false,
    };

    if !valid {
        return Err(ApiError::Validation("email is not a valid address".to_string()));
    }
    Ok(())
}
