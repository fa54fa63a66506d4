pub mod auth;
pub mod comments;
pub mod credentials;
pub mod error;
pub mod identity;
pub mod messages;
pub mod service;
pub mod users;

use axum::{
    Router,
    routing::{get, post, put},
};

use crate::auth::AppState;

/// All feed routes. Listings are public; everything else resolves the
/// bearer token inside its handler.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/login", post(auth::login))
        .route("/users/", post(users::create_user))
        .route("/users/me/", get(users::read_me))
        .route(
            "/messages/",
            get(messages::list_messages).post(messages::create_message),
        )
        .route(
            "/messages/{message_id}",
            put(messages::update_message).delete(messages::delete_message),
        )
        .route("/messages/{message_id}/comments/", get(comments::list_comments))
        .route("/comments/", post(comments::create_comment))
        .route(
            "/comments/{comment_id}",
            put(comments::update_comment).delete(comments::delete_comment),
        )
        .with_state(state)
}
