use axum::{Extension, Json, extract::State, response::IntoResponse};

use agora_types::api::{Ack, Claims, HealthResponse};

use crate::auth::{AppState, blocking};
use crate::error::ApiError;
use crate::rows;

pub async fn root() -> &'static str {
    "Welcome to the Agora API! Try /api/health for a health check."
}

pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".into(),
    })
}

/// GET /api/protected: token smoke test.
pub async fn protected(Extension(claims): Extension<Claims>) -> Json<Ack> {
    Json(Ack::new(format!(
        "Hello, {}! This is a protected route.",
        claims.display_name()
    )))
}

/// GET /api/users: everyone but the caller, for starting a conversation.
pub async fn list_users(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse, ApiError> {
    let viewer_id = claims.id;
    let users = blocking(&state, "Failed to retrieve users", move |s| {
        s.db.list_other_users(viewer_id)
    })
    .await?;
    Ok(Json(users.into_iter().map(rows::user_summary).collect::<Vec<_>>()))
}
