use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD as B64;
use reqwest::{Method, RequestBuilder, Response};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::debug;

use agora_types::api::{
    Ack, Claims, ErrorResponse, HealthResponse, LoginRequest, PostMessageRequest, RegisterRequest,
    SendDirectMessageRequest, TokenResponse,
};
use agora_types::models::{DirectMessage, FeedMessage, OwnMessage, UnreadCount, UserSummary};
use agora_types::validate::{self, MAX_DM_CHARS, MAX_POST_CHARS, ValidationError};

use crate::error::ClientError;

pub type Result<T> = std::result::Result<T, ClientError>;

/// How a DM recipient is addressed.
#[derive(Debug, Clone)]
pub enum Recipient {
    Id(i64),
    /// Email address or username.
    Handle(String),
}

/// Client-side session context: server location plus the bearer token once
/// logged in.
#[derive(Debug, Clone)]
pub struct Session {
    base_url: String,
    http: reqwest::Client,
    token: Option<String>,
}

impl Session {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            http: reqwest::Client::new(),
            token: None,
        }
    }

    /// Resume a session from a previously issued token.
    pub fn with_token(base_url: impl Into<String>, token: impl Into<String>) -> Self {
        let mut session = Self::new(base_url);
        session.token = Some(token.into());
        session
    }

    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    pub fn is_logged_in(&self) -> bool {
        self.token.is_some()
    }

    pub fn logout(&mut self) {
        self.token = None;
    }

    /// Who this session belongs to, read from the token payload. The
    /// signature is not checked here; the server does that on every call.
    pub fn identity(&self) -> Result<Claims> {
        let token = self.token.as_deref().ok_or(ClientError::NotLoggedIn)?;
        decode_claims(token)
    }

    // -- Auth --

    pub async fn health(&self) -> Result<HealthResponse> {
        self.send(self.request(Method::GET, "/api/health")).await
    }

    pub async fn register(&self, email: &str, username: &str, password: &str) -> Result<Ack> {
        validate::registration(email, Some(username), password)?;
        let body = RegisterRequest {
            email: Some(email.to_string()),
            username: Some(username.to_string()),
            password: Some(password.to_string()),
        };
        self.send(self.request(Method::POST, "/api/register").json(&body))
            .await
    }

    /// Log in and keep the token. Returns the identity it carries.
    pub async fn login(&mut self, email: &str, password: &str) -> Result<Claims> {
        validate::login(email, password)?;
        let body = LoginRequest {
            email: Some(email.to_string()),
            password: Some(password.to_string()),
        };
        let resp: TokenResponse = self
            .send(self.request(Method::POST, "/api/login").json(&body))
            .await?;

        let claims = decode_claims(&resp.token)?;
        self.token = Some(resp.token);
        Ok(claims)
    }

    pub async fn protected(&self) -> Result<Ack> {
        self.send(self.authed(Method::GET, "/api/protected")?).await
    }

    // -- Public feed --

    pub async fn feed(&self) -> Result<Vec<FeedMessage>> {
        self.send(self.request(Method::GET, "/api/messages")).await
    }

    pub async fn my_messages(&self) -> Result<Vec<OwnMessage>> {
        self.send(self.authed(Method::GET, "/api/my-messages")?).await
    }

    pub async fn post_message(&self, content: &str) -> Result<Ack> {
        validate::content(content, MAX_POST_CHARS)?;
        let body = PostMessageRequest {
            content: Some(content.to_string()),
        };
        self.send_json(Method::POST, "/api/messages", &body).await
    }

    pub async fn delete_message(&self, message_id: i64) -> Result<Ack> {
        self.send(self.authed(Method::DELETE, &format!("/api/messages/{message_id}"))?)
            .await
    }

    // -- Direct messages --

    pub async fn users(&self) -> Result<Vec<UserSummary>> {
        self.send(self.authed(Method::GET, "/api/users")?).await
    }

    pub async fn send_dm(&self, to: Recipient, content: &str) -> Result<Ack> {
        validate::content(content, MAX_DM_CHARS)?;
        let mut body = SendDirectMessageRequest {
            content: Some(content.to_string()),
            ..Default::default()
        };
        match to {
            Recipient::Id(id) => body.to_id = Some(id),
            Recipient::Handle(h) if h.is_empty() => {
                return Err(ValidationError::MissingRecipient.into());
            }
            Recipient::Handle(h) => body.to_email = Some(h),
        }
        self.send_json(Method::POST, "/api/dm", &body).await
    }

    pub async fn conversation(&self, user_id: i64) -> Result<Vec<DirectMessage>> {
        self.send(self.authed(Method::GET, &format!("/api/dm/{user_id}"))?)
            .await
    }

    pub async fn mark_read(&self, user_id: i64) -> Result<Ack> {
        self.send(self.authed(Method::POST, &format!("/api/dm/read/{user_id}"))?)
            .await
    }

    /// Open a thread the way the DM view does: load it, then mark it read.
    pub async fn open_conversation(&self, user_id: i64) -> Result<Vec<DirectMessage>> {
        let thread = self.conversation(user_id).await?;
        self.mark_read(user_id).await?;
        Ok(thread)
    }

    pub async fn unread_counts(&self) -> Result<Vec<UnreadCount>> {
        self.send(self.authed(Method::GET, "/api/dm/unread-counts")?)
            .await
    }

    // -- Plumbing --

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        self.http.request(method, format!("{}{}", self.base_url, path))
    }

    fn authed(&self, method: Method, path: &str) -> Result<RequestBuilder> {
        let token = self.token.as_deref().ok_or(ClientError::NotLoggedIn)?;
        Ok(self.request(method, path).bearer_auth(token))
    }

    async fn send_json<B: Serialize, T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        body: &B,
    ) -> Result<T> {
        self.send(self.authed(method, path)?.json(body)).await
    }

    async fn send<T: DeserializeOwned>(&self, req: RequestBuilder) -> Result<T> {
        let resp = req.send().await?;
        debug!("{} {}", resp.status(), resp.url().path());
        parse(resp).await
    }
}

async fn parse<T: DeserializeOwned>(resp: Response) -> Result<T> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp.json::<T>().await?);
    }

    let bytes = resp.bytes().await?;
    let message = serde_json::from_slice::<ErrorResponse>(&bytes)
        .map(|e| e.error)
        .unwrap_or_else(|_| {
            status
                .canonical_reason()
                .unwrap_or("Request failed")
                .to_string()
        });
    Err(ClientError::Api { status, message })
}

fn decode_claims(token: &str) -> Result<Claims> {
    let payload = token.split('.').nth(1).ok_or(ClientError::MalformedToken)?;
    let bytes = B64
        .decode(payload)
        .map_err(|_| ClientError::MalformedToken)?;
    serde_json::from_slice(&bytes).map_err(|_| ClientError::MalformedToken)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fake_token(claims: &serde_json::Value) -> String {
        let header = B64.encode(br#"{"alg":"HS256","typ":"JWT"}"#);
        let payload = B64.encode(serde_json::to_vec(claims).unwrap());
        format!("{header}.{payload}.c2lnbmF0dXJl")
    }

    #[test]
    fn identity_reads_token_payload() {
        let token = fake_token(&serde_json::json!({
            "id": 3,
            "email": "carol@example.com",
            "username": "carol",
            "exp": 1_900_000_000u64,
        }));
        let session = Session::with_token("http://localhost:4000/", token);

        let me = session.identity().unwrap();
        assert_eq!(me.id, 3);
        assert_eq!(me.display_name(), "carol");
    }

    #[test]
    fn identity_falls_back_to_email() {
        let token = fake_token(&serde_json::json!({
            "id": 4,
            "email": "legacy@example.com",
            "username": null,
            "exp": 1_900_000_000u64,
        }));
        let me = Session::with_token("http://x", token).identity().unwrap();
        assert_eq!(me.display_name(), "legacy@example.com");
    }

    #[test]
    fn logged_out_session_has_no_identity() {
        let mut session = Session::with_token("http://x", "a.b.c");
        assert!(matches!(session.identity(), Err(ClientError::MalformedToken)));

        session.logout();
        assert!(!session.is_logged_in());
        assert!(matches!(session.identity(), Err(ClientError::NotLoggedIn)));
    }

    #[test]
    fn base_url_trailing_slash_trimmed() {
        let session = Session::new("http://localhost:4000/");
        assert_eq!(session.base_url, "http://localhost:4000");
    }
}
