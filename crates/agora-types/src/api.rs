use serde::{Deserialize, Serialize};

// -- JWT Claims --

/// Identity carried by every bearer token. Shared by the REST middleware
/// (which verifies it) and the client (which only reads it).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    pub id: i64,
    pub email: String,
    pub username: Option<String>,
    pub exp: usize,
}

impl Claims {
    /// Name shown to other users: the username, or the email for accounts
    /// created before usernames existed.
    pub fn display_name(&self) -> &str {
        self.username.as_deref().unwrap_or(&self.email)
    }
}

// -- Auth --

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct RegisterRequest {
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct TokenResponse {
    pub token: String,
}

// -- Messages --

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct PostMessageRequest {
    #[serde(default)]
    pub content: Option<String>,
}

/// Recipient is addressed either by id or by an email/username string.
/// `toId` wins when both are present.
#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SendDirectMessageRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub to_id: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub to_email: Option<String>,
    #[serde(default)]
    pub content: Option<String>,
}

// -- Generic envelopes --

/// `{"message": ...}` acknowledgment returned by every write endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ack {
    pub message: String,
}

impl Ack {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
}
