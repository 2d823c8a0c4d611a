use axum::{
    Router, middleware,
    routing::{delete, get, post},
};

use crate::auth::{self, AppState};
use crate::middleware::require_auth;
use crate::{dm, feed, users};

/// Every API route. Transport layers (CORS, tracing) are added by the binary.
pub fn router(state: AppState) -> Router {
    let public_routes = Router::new()
        .route("/", get(users::root))
        .route("/api/health", get(users::health))
        .route("/api/register", post(auth::register))
        .route("/api/login", post(auth::login))
        .route("/api/messages", get(feed::list_messages));

    let protected_routes = Router::new()
        .route("/api/protected", get(users::protected))
        .route("/api/users", get(users::list_users))
        .route("/api/dm", post(dm::send_dm))
        .route("/api/dm/unread-counts", get(dm::unread_counts))
        .route("/api/dm/{user_id}", get(dm::get_conversation))
        .route("/api/dm/read/{user_id}", post(dm::mark_read))
        .route("/api/messages", post(feed::post_message))
        .route("/api/messages/{id}", delete(feed::delete_message))
        .route("/api/my-messages", get(feed::my_messages))
        .route_layer(middleware::from_fn_with_state(state.clone(), require_auth));

    Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        .with_state(state)
}
