//! Direct messages and read state.
//!
//! Unread counts are never stored. They are derived on every request from
//! the message rows and the per-pair read marker, so there is no counter to
//! drift when sends and reads interleave.

use axum::{
    Extension, Json,
    extract::{Path, State},
    response::IntoResponse,
};
use tracing::{debug, info};

use agora_types::api::{Ack, Claims, SendDirectMessageRequest};
use agora_types::validate::{self, MAX_DM_CHARS, ValidationError};

use crate::auth::{AppState, blocking};
use crate::error::ApiError;
use crate::extract::JsonBody;
use crate::rows;

/// POST /api/dm
pub async fn send_dm(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    JsonBody(req): JsonBody<SendDirectMessageRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let content = req.content.unwrap_or_default();
    validate::content(&content, MAX_DM_CHARS)?;

    let to_id = req.to_id.filter(|id| *id != 0);
    let to_handle = req.to_email.filter(|h| !h.is_empty());
    if to_id.is_none() && to_handle.is_none() {
        return Err(ValidationError::MissingRecipient.into());
    }
    if to_id == Some(claims.id) {
        return Err(ApiError::BadRequest("Cannot message yourself"));
    }

    let sender_id = claims.id;
    let sent = blocking(&state, "Failed to send direct message", move |s| {
        let recipient_id = match to_id {
            Some(id) => s.db.user_exists(id)?.then_some(id),
            None => match to_handle.as_deref() {
                Some(handle) => s.db.find_user_id_by_handle(handle)?,
                None => None,
            },
        };
        let Some(recipient_id) = recipient_id else {
            return Ok(Err(ApiError::NotFound("Recipient not found")));
        };
        if recipient_id == sender_id {
            return Ok(Err(ApiError::BadRequest("Cannot message yourself")));
        }
        let id = s.db.insert_direct_message(sender_id, recipient_id, &content)?;
        Ok(Ok((id, recipient_id)))
    })
    .await??;

    let (message_id, recipient_id) = sent;
    info!(message_id, sender_id, recipient_id, "Direct message sent");
    Ok(Json(Ack::new("Direct message sent")))
}

/// GET /api/dm/{user_id}: full thread with one user, oldest first.
pub async fn get_conversation(
    State(state): State<AppState>,
    Path(raw_id): Path<String>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse, ApiError> {
    let other_id = validate::user_id(&raw_id)?;
    let viewer_id = claims.id;

    let thread = blocking(&state, "Failed to retrieve conversation", move |s| {
        if !s.db.user_exists(other_id)? {
            return Ok(None);
        }
        s.db.get_conversation(viewer_id, other_id).map(Some)
    })
    .await?
    .ok_or(ApiError::NotFound("User not found"))?;

    Ok(Json(thread.into_iter().map(rows::direct_message).collect::<Vec<_>>()))
}

/// POST /api/dm/read/{user_id}: move the caller's read marker for this
/// counterpart to now.
pub async fn mark_read(
    State(state): State<AppState>,
    Path(raw_id): Path<String>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse, ApiError> {
    let other_id = validate::user_id(&raw_id)?;
    let viewer_id = claims.id;

    let marked = blocking(&state, "Failed to mark conversation as read", move |s| {
        if !s.db.user_exists(other_id)? {
            return Ok(None);
        }
        s.db.mark_read(viewer_id, other_id).map(Some)
    })
    .await?;

    match marked {
        Some(at) => {
            debug!(viewer_id, other_id, at, "Conversation marked read");
            Ok(Json(Ack::new("Conversation marked as read")))
        }
        None => Err(ApiError::NotFound("User not found")),
    }
}

/// GET /api/dm/unread-counts: one row per other user, by username.
pub async fn unread_counts(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse, ApiError> {
    let viewer_id = claims.id;
    let counts = blocking(&state, "Failed to retrieve unread counts", move |s| {
        s.db.unread_counts(viewer_id)
    })
    .await?;
    Ok(Json(counts.into_iter().map(rows::unread_count).collect::<Vec<_>>()))
}
