//! Database row types: these map directly to SQLite rows.
//! Timestamps are microseconds since the Unix epoch, see [`crate::Clock`].

pub struct UserRow {
    pub id: i64,
    pub email: String,
    pub username: Option<String>,
    pub password_hash: String,
    pub created_at: i64,
}

pub struct UserSummaryRow {
    pub id: i64,
    pub username: Option<String>,
}

/// Public message joined with its author's display name.
pub struct FeedRow {
    pub id: i64,
    pub content: String,
    pub created_at: i64,
    pub author: String,
}

pub struct MessageRow {
    pub id: i64,
    pub content: String,
    pub created_at: i64,
}

pub struct DirectMessageRow {
    pub id: i64,
    pub sender_id: i64,
    pub recipient_id: i64,
    pub content: String,
    pub created_at: i64,
}

pub struct UnreadRow {
    pub other_user_id: i64,
    pub username: Option<String>,
    pub unread_count: i64,
}
