//! Store rows to wire models.

use chrono::{DateTime, Utc};
use tracing::warn;

use agora_db::clock::to_datetime;
use agora_db::models::{DirectMessageRow, FeedRow, MessageRow, UnreadRow, UserSummaryRow};
use agora_types::models::{DirectMessage, FeedMessage, OwnMessage, UnreadCount, UserSummary};

fn timestamp(micros: i64, table: &str, id: i64) -> DateTime<Utc> {
    to_datetime(micros).unwrap_or_else(|| {
        warn!("Corrupt created_at {} on {} row {}", micros, table, id);
        DateTime::default()
    })
}

pub(crate) fn feed_message(row: FeedRow) -> FeedMessage {
    FeedMessage {
        created_at: timestamp(row.created_at, "messages", row.id),
        id: row.id,
        content: row.content,
        author: row.author,
    }
}

pub(crate) fn own_message(row: MessageRow) -> OwnMessage {
    OwnMessage {
        created_at: timestamp(row.created_at, "messages", row.id),
        id: row.id,
        content: row.content,
    }
}

pub(crate) fn direct_message(row: DirectMessageRow) -> DirectMessage {
    DirectMessage {
        created_at: timestamp(row.created_at, "private_messages", row.id),
        id: row.id,
        sender_id: row.sender_id,
        recipient_id: row.recipient_id,
        content: row.content,
    }
}

pub(crate) fn user_summary(row: UserSummaryRow) -> UserSummary {
    UserSummary {
        id: row.id,
        username: row.username,
    }
}

pub(crate) fn unread_count(row: UnreadRow) -> UnreadCount {
    UnreadCount {
        other_user_id: row.other_user_id,
        username: row.username,
        unread_count: row.unread_count,
    }
}
