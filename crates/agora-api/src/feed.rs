use axum::{
    Extension, Json,
    extract::{Path, State},
    response::IntoResponse,
};
use tracing::info;

use agora_types::api::{Ack, Claims, PostMessageRequest};
use agora_types::validate::{self, MAX_POST_CHARS};

use crate::auth::{AppState, blocking};
use crate::error::ApiError;
use crate::extract::JsonBody;
use crate::rows;

const NOT_FOUND_OR_FOREIGN: &str = "Message not found or not authorized";

/// GET /api/messages: whole public feed, newest first. No auth.
pub async fn list_messages(State(state): State<AppState>) -> Result<impl IntoResponse, ApiError> {
    let feed = blocking(&state, "Failed to retrieve messages", |s| s.db.list_feed()).await?;
    Ok(Json(feed.into_iter().map(rows::feed_message).collect::<Vec<_>>()))
}

/// GET /api/my-messages
pub async fn my_messages(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse, ApiError> {
    let own = blocking(&state, "Failed to retrieve my messages", move |s| {
        s.db.list_messages_by_author(claims.id)
    })
    .await?;
    Ok(Json(own.into_iter().map(rows::own_message).collect::<Vec<_>>()))
}

/// POST /api/messages
pub async fn post_message(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    JsonBody(req): JsonBody<PostMessageRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let content = req.content.unwrap_or_default();
    validate::content(&content, MAX_POST_CHARS)?;

    let author_id = claims.id;
    let id = blocking(&state, "Failed to submit message", move |s| {
        s.db.insert_message(author_id, &content)
    })
    .await?;

    info!(message_id = id, author_id, "Public message posted");
    Ok(Json(Ack::new("Message submitted")))
}

/// DELETE /api/messages/{id}: author only. Someone else's message looks
/// exactly like a missing one.
pub async fn delete_message(
    State(state): State<AppState>,
    Path(raw_id): Path<String>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse, ApiError> {
    let message_id: i64 = raw_id
        .parse()
        .map_err(|_| ApiError::NotFound(NOT_FOUND_OR_FOREIGN))?;

    let author_id = claims.id;
    let deleted = blocking(&state, "Failed to delete message", move |s| {
        s.db.delete_message(message_id, author_id)
    })
    .await?;

    if !deleted {
        return Err(ApiError::NotFound(NOT_FOUND_OR_FOREIGN));
    }

    info!(message_id, author_id, "Public message deleted");
    Ok(Json(Ack::new("Message deleted successfully")))
}
