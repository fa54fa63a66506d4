use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use axum_extra::extract::WithRejection;

use agora_types::api::{CreateCommentRequest, UpdateCommentRequest};

use crate::auth::{AppState, with_store};
use crate::error::{ApiError, ApiResult};
use crate::identity::{self, BearerToken};
use crate::service;

/// Public, oldest first.
pub async fn list_comments(
    State(state): State<AppState>,
    WithRejection(Path(message_id), _): WithRejection<Path<i64>, ApiError>,
) -> ApiResult<impl IntoResponse> {
    let comments = with_store(&state, move |conn, _| service::list_comments(conn, message_id)).await?;

    Ok(Json(comments))
}

pub async fn create_comment(
    State(state): State<AppState>,
    BearerToken(token): BearerToken,
    WithRejection(Json(req), _): WithRejection<Json<CreateCommentRequest>, ApiError>,
) -> ApiResult<impl IntoResponse> {
    let comment = with_store(&state, move |conn, credentials| {
        let actor = identity::resolve(conn, credentials, &token)?;
        service::create_comment(conn, &actor, req.message_id, &req.comment)
    })
    .await?;

    Ok((StatusCode::CREATED, Json(comment)))
}

pub async fn update_comment(
    State(state): State<AppState>,
    BearerToken(token): BearerToken,
    WithRejection(Path(comment_id), _): WithRejection<Path<i64>, ApiError>,
    WithRejection(Json(req), _): WithRejection<Json<UpdateCommentRequest>, ApiError>,
) -> ApiResult<impl IntoResponse> {
    let comment = with_store(&state, move |conn, credentials| {
        let actor = identity::resolve(conn, credentials, &token)?;
        service::update_comment(conn, &actor, comment_id, &req.comment)
    })
    .await?;

    Ok(Json(comment))
}

pub async fn delete_comment(
    State(state): State<AppState>,
    BearerToken(token): BearerToken,
    WithRejection(Path(comment_id), _): WithRejection<Path<i64>, ApiError>,
) -> ApiResult<impl IntoResponse> {
    with_store(&state, move |conn, credentials| {
        let actor = identity::resolve(conn, credentials, &token)?;
        service::delete_comment(conn, &actor, comment_id)
    })
    .await?;

    Ok(StatusCode::NO_CONTENT)
}
