use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Entry in the DM user picker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserSummary {
    pub id: i64,
    pub username: Option<String>,
}

/// Public feed entry. `author` is the username, or the email when the
/// author has none.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeedMessage {
    pub id: i64,
    pub content: String,
    pub created_at: DateTime<Utc>,
    pub author: String,
}

/// One of the caller's own public messages.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OwnMessage {
    pub id: i64,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DirectMessage {
    pub id: i64,
    pub sender_id: i64,
    pub recipient_id: i64,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnreadCount {
    pub other_user_id: i64,
    pub username: Option<String>,
    pub unread_count: i64,
}
