use crate::Database;
use crate::models::{DirectMessageRow, FeedRow, MessageRow, UnreadRow, UserRow, UserSummaryRow};
use anyhow::Result;
use rusqlite::{Connection, OptionalExtension, params};

/// Which unique column an insert collided with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UniqueViolation {
    Email,
    Username,
}

impl UniqueViolation {
    /// Classify a store error. `None` for anything that is not a unique
    /// constraint failure on the users table.
    pub fn classify(err: &anyhow::Error) -> Option<Self> {
        let Some(rusqlite::Error::SqliteFailure(code, Some(msg))) =
            err.downcast_ref::<rusqlite::Error>()
        else {
            return None;
        };
        if code.code != rusqlite::ErrorCode::ConstraintViolation {
            return None;
        }
        if msg.contains("users.email") {
            Some(Self::Email)
        } else if msg.contains("users.username") {
            Some(Self::Username)
        } else {
            None
        }
    }
}

impl Database {
    // -- Users --

    pub fn create_user(
        &self,
        email: &str,
        username: Option<&str>,
        password_hash: &str,
    ) -> Result<i64> {
        self.with_timestamp(|conn, now| {
            conn.execute(
                "INSERT INTO users (email, username, password_hash, created_at) VALUES (?1, ?2, ?3, ?4)",
                params![email, username, password_hash, now],
            )?;
            Ok(conn.last_insert_rowid())
        })
    }

    pub fn get_user_by_email(&self, email: &str) -> Result<Option<UserRow>> {
        self.with_conn(|conn| query_user(conn, "email", email))
    }

    pub fn get_user_by_username(&self, username: &str) -> Result<Option<UserRow>> {
        self.with_conn(|conn| query_user(conn, "username", username))
    }

    pub fn user_exists(&self, id: i64) -> Result<bool> {
        self.with_conn(|conn| {
            let found = conn
                .query_row("SELECT 1 FROM users WHERE id = ?1", [id], |_| Ok(()))
                .optional()?;
            Ok(found.is_some())
        })
    }

    /// Resolve a DM recipient typed as either an email or a username.
    pub fn find_user_id_by_handle(&self, handle: &str) -> Result<Option<i64>> {
        self.with_conn(|conn| {
            let id = conn
                .query_row(
                    "SELECT id FROM users WHERE email = ?1 OR username = ?1 ORDER BY id LIMIT 1",
                    [handle],
                    |row| row.get(0),
                )
                .optional()?;
            Ok(id)
        })
    }

    pub fn list_other_users(&self, viewer_id: i64) -> Result<Vec<UserSummaryRow>> {
        self.with_conn(|conn| {
            let mut stmt =
                conn.prepare("SELECT id, username FROM users WHERE id <> ?1 ORDER BY id")?;
            let rows = stmt
                .query_map([viewer_id], |row| {
                    Ok(UserSummaryRow {
                        id: row.get(0)?,
                        username: row.get(1)?,
                    })
                })?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }

    // -- Public messages --

    pub fn insert_message(&self, author_id: i64, content: &str) -> Result<i64> {
        self.with_timestamp(|conn, now| {
            conn.execute(
                "INSERT INTO messages (user_id, content, created_at) VALUES (?1, ?2, ?3)",
                params![author_id, content, now],
            )?;
            Ok(conn.last_insert_rowid())
        })
    }

    /// Whole feed, newest first.
    pub fn list_feed(&self) -> Result<Vec<FeedRow>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT m.id, m.content, m.created_at, COALESCE(u.username, u.email)
                 FROM messages m
                 JOIN users u ON m.user_id = u.id
                 ORDER BY m.created_at DESC, m.id DESC",
            )?;
            let rows = stmt
                .query_map([], |row| {
                    Ok(FeedRow {
                        id: row.get(0)?,
                        content: row.get(1)?,
                        created_at: row.get(2)?,
                        author: row.get(3)?,
                    })
                })?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }

    pub fn list_messages_by_author(&self, author_id: i64) -> Result<Vec<MessageRow>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT id, content, created_at FROM messages
                 WHERE user_id = ?1
                 ORDER BY created_at DESC, id DESC",
            )?;
            let rows = stmt
                .query_map([author_id], |row| {
                    Ok(MessageRow {
                        id: row.get(0)?,
                        content: row.get(1)?,
                        created_at: row.get(2)?,
                    })
                })?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }

    /// Delete a message only if `author_id` wrote it. Returns false when the
    /// message is missing or belongs to someone else.
    pub fn delete_message(&self, message_id: i64, author_id: i64) -> Result<bool> {
        self.with_conn(|conn| {
            let deleted = conn.execute(
                "DELETE FROM messages WHERE id = ?1 AND user_id = ?2",
                params![message_id, author_id],
            )?;
            Ok(deleted > 0)
        })
    }

    // -- Direct messages --

    pub fn insert_direct_message(
        &self,
        sender_id: i64,
        recipient_id: i64,
        content: &str,
    ) -> Result<i64> {
        self.with_timestamp(|conn, now| {
            conn.execute(
                "INSERT INTO private_messages (sender_id, recipient_id, content, created_at)
                 VALUES (?1, ?2, ?3, ?4)",
                params![sender_id, recipient_id, content, now],
            )?;
            Ok(conn.last_insert_rowid())
        })
    }

    /// Both directions of the thread between `a` and `b`, oldest first.
    pub fn get_conversation(&self, a: i64, b: i64) -> Result<Vec<DirectMessageRow>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT id, sender_id, recipient_id, content, created_at
                 FROM private_messages
                 WHERE (sender_id = ?1 AND recipient_id = ?2)
                    OR (sender_id = ?2 AND recipient_id = ?1)
                 ORDER BY created_at ASC, id ASC",
            )?;
            let rows = stmt
                .query_map(params![a, b], |row| {
                    Ok(DirectMessageRow {
                        id: row.get(0)?,
                        sender_id: row.get(1)?,
                        recipient_id: row.get(2)?,
                        content: row.get(3)?,
                        created_at: row.get(4)?,
                    })
                })?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }

    /// Move `viewer`'s read marker for `counterpart` to now. Returns the
    /// marker's new timestamp.
    pub fn mark_read(&self, viewer_id: i64, counterpart_id: i64) -> Result<i64> {
        self.with_timestamp(|conn, now| {
            conn.execute(
                "INSERT INTO dm_read_state (user_id, other_user_id, last_read_at)
                 VALUES (?1, ?2, ?3)
                 ON CONFLICT (user_id, other_user_id)
                 DO UPDATE SET last_read_at = MAX(COALESCE(last_read_at, 0), excluded.last_read_at)",
                params![viewer_id, counterpart_id, now],
            )?;
            Ok(now)
        })
    }

    pub fn get_last_read(&self, viewer_id: i64, counterpart_id: i64) -> Result<Option<i64>> {
        self.with_conn(|conn| {
            let last = conn
                .query_row(
                    "SELECT last_read_at FROM dm_read_state WHERE user_id = ?1 AND other_user_id = ?2",
                    params![viewer_id, counterpart_id],
                    |row| row.get::<_, Option<i64>>(0),
                )
                .optional()?;
            Ok(last.flatten())
        })
    }

    /// Unread messages per counterpart: everything `V` sent `viewer` after
    /// `viewer`'s read marker for `V`, or everything if there is no marker.
    /// Every other user appears, including those with nothing unread.
    pub fn unread_counts(&self, viewer_id: i64) -> Result<Vec<UnreadRow>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT u.id, u.username, COUNT(pm.id)
                 FROM users u
                 LEFT JOIN dm_read_state r
                   ON r.user_id = ?1 AND r.other_user_id = u.id
                 LEFT JOIN private_messages pm
                   ON pm.recipient_id = ?1 AND pm.sender_id = u.id
                  AND (r.last_read_at IS NULL OR pm.created_at > r.last_read_at)
                 WHERE u.id <> ?1
                 GROUP BY u.id, u.username
                 ORDER BY u.username ASC, u.id ASC",
            )?;
            let rows = stmt
                .query_map([viewer_id], |row| {
                    Ok(UnreadRow {
                        other_user_id: row.get(0)?,
                        username: row.get(1)?,
                        unread_count: row.get(2)?,
                    })
                })?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }
}

fn query_user(conn: &Connection, column: &'static str, value: &str) -> Result<Option<UserRow>> {
    let sql = format!(
        "SELECT id, email, username, password_hash, created_at FROM users WHERE {column} = ?1"
    );
    let row = conn
        .query_row(&sql, [value], |row| {
            Ok(UserRow {
                id: row.get(0)?,
                email: row.get(1)?,
                username: row.get(2)?,
                password_hash: row.get(3)?,
                created_at: row.get(4)?,
            })
        })
        .optional()?;

    Ok(row)
}
