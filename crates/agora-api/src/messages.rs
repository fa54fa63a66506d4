use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use axum_extra::extract::WithRejection;
use serde::Deserialize;

use agora_types::api::MessageRequest;

use crate::auth::{AppState, with_store};
use crate::error::{ApiError, ApiResult};
use crate::identity::{self, BearerToken};
use crate::service;

#[derive(Debug, Deserialize)]
pub struct MessageQuery {
    #[serde(default)]
    pub skip: u32,
    #[serde(default = "default_limit")]
    pub limit: u32,
}

fn default_limit() -> u32 {
    100
}

/// Public feed, newest first.
pub async fn list_messages(
    State(state): State<AppState>,
    WithRejection(Query(query), _): WithRejection<Query<MessageQuery>, ApiError>,
) -> ApiResult<impl IntoResponse> {
    let messages = with_store(&state, move |conn, _| {
        service::list_messages(conn, query.skip, query.limit)
    })
    .await?;

    Ok(Json(messages))
}

pub async fn create_message(
    State(state): State<AppState>,
    BearerToken(token): BearerToken,
    WithRejection(Json(req), _): WithRejection<Json<MessageRequest>, ApiError>,
) -> ApiResult<impl IntoResponse> {
    let message = with_store(&state, move |conn, credentials| {
        let actor = identity::resolve(conn, credentials, &token)?;
        service::create_message(conn, &actor, &req.user_message)
    })
    .await?;

    Ok((StatusCode::CREATED, Json(message)))
}

pub async fn update_message(
    State(state): State<AppState>,
    BearerToken(token): BearerToken,
    WithRejection(Path(message_id), _): WithRejection<Path<i64>, ApiError>,
    WithRejection(Json(req), _): WithRejection<Json<MessageRequest>, ApiError>,
) -> ApiResult<impl IntoResponse> {
    let message = with_store(&state, move |conn, credentials| {
        let actor = identity::resolve(conn, credentials, &token)?;
        service::update_message(conn, &actor, message_id, &req.user_message)
    })
    .await?;

    Ok(Json(message))
}

pub async fn delete_message(
    State(state): State<AppState>,
    BearerToken(token): BearerToken,
    WithRejection(Path(message_id), _): WithRejection<Path<i64>, ApiError>,
) -> ApiResult<impl IntoResponse> {
    with_store(&state, move |conn, credentials| {
        let actor = identity::resolve(conn, credentials, &token)?;
        service::delete_message(conn, &actor, message_id)
    })
    .await?;

    Ok(StatusCode::NO_CONTENT)
}
