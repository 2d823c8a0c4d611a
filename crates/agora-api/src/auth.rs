use std::sync::Arc;

use axum::{Json, extract::State, response::IntoResponse};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use tracing::info;

use agora_db::{Database, UniqueViolation};
use agora_types::api::{Ack, Claims, LoginRequest, RegisterRequest, TokenResponse};
use agora_types::validate;

use crate::error::ApiError;
use crate::extract::JsonBody;
use crate::password::PasswordHasher;

/// Tokens live for two hours; re-login is the only renewal.
pub const DEFAULT_TOKEN_TTL_MINUTES: i64 = 120;

pub type AppState = Arc<AppStateInner>;

pub struct AppStateInner {
    pub db: Database,
    pub jwt_secret: String,
    pub token_ttl: chrono::Duration,
    pub hasher: PasswordHasher,
}

impl AppStateInner {
    pub fn new(db: Database, jwt_secret: impl Into<String>) -> AppState {
        Arc::new(Self {
            db,
            jwt_secret: jwt_secret.into(),
            token_ttl: chrono::Duration::minutes(DEFAULT_TOKEN_TTL_MINUTES),
            hasher: PasswordHasher::new(),
        })
    }
}

/// Run store and hashing work off the async runtime.
pub(crate) async fn blocking<F, T>(
    state: &AppState,
    context: &'static str,
    f: F,
) -> Result<T, ApiError>
where
    F: FnOnce(&AppStateInner) -> anyhow::Result<T> + Send + 'static,
    T: Send + 'static,
{
    let state = state.clone();
    tokio::task::spawn_blocking(move || f(&state))
        .await
        .map_err(|e| ApiError::Internal {
            context,
            cause: e.into(),
        })?
        .map_err(ApiError::internal(context))
}

pub async fn register(
    State(state): State<AppState>,
    JsonBody(req): JsonBody<RegisterRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let email = req.email.unwrap_or_default();
    let password = req.password.unwrap_or_default();
    let username = req.username;

    validate::registration(&email, username.as_deref(), &password)?;

    let (em, un) = (email.clone(), username);
    let created = blocking(&state, "Registration failed", move |s| {
        if s.db.get_user_by_email(&em)?.is_some() {
            return Ok(Err(UniqueViolation::Email));
        }
        if let Some(name) = un.as_deref() {
            if s.db.get_user_by_username(name)?.is_some() {
                return Ok(Err(UniqueViolation::Username));
            }
        }

        let password_hash = s.hasher.hash(&password)?;

        // A concurrent registration can still win the race past the checks
        // above; the unique indexes have the final word.
        match s.db.create_user(&em, un.as_deref(), &password_hash) {
            Ok(id) => Ok(Ok(id)),
            Err(e) => match UniqueViolation::classify(&e) {
                Some(violation) => Ok(Err(violation)),
                None => Err(e),
            },
        }
    })
    .await?;

    match created {
        Ok(user_id) => {
            info!(user_id, "Registered {}", email);
            Ok(Json(Ack::new("Registration successful")))
        }
        Err(UniqueViolation::Email) => Err(ApiError::Conflict("Email already registered")),
        Err(UniqueViolation::Username) => Err(ApiError::Conflict("Username already taken")),
    }
}

pub async fn login(
    State(state): State<AppState>,
    JsonBody(req): JsonBody<LoginRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let email = req.email.unwrap_or_default();
    let password = req.password.unwrap_or_default();

    let user = blocking(&state, "Login failed", move |s| {
        let Some(user) = s.db.get_user_by_email(&email)? else {
            return Ok(None);
        };
        let valid = s.hasher.verify(&password, &user.password_hash)?;
        Ok(valid.then_some(user))
    })
    .await?
    .ok_or(ApiError::InvalidCredentials)?;

    let token = create_token(
        &state.jwt_secret,
        state.token_ttl,
        user.id,
        &user.email,
        user.username.as_deref(),
    )
    .map_err(ApiError::internal("Login failed"))?;

    info!(user_id = user.id, "Login succeeded");
    Ok(Json(TokenResponse { token }))
}

pub fn create_token(
    secret: &str,
    ttl: chrono::Duration,
    user_id: i64,
    email: &str,
    username: Option<&str>,
) -> anyhow::Result<String> {
    let claims = Claims {
        id: user_id,
        email: email.to_string(),
        username: username.map(str::to_string),
        exp: (chrono::Utc::now() + ttl).timestamp() as usize,
    };

    let token = encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )?;

    Ok(token)
}

/// Check signature and expiry.
pub fn verify_token(secret: &str, token: &str) -> Result<Claims, jsonwebtoken::errors::Error> {
    let data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )?;
    Ok(data.claims)
}
