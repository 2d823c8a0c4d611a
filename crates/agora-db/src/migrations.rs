use anyhow::Result;
use rusqlite::Connection;
use tracing::info;

pub fn run(conn: &Connection) -> Result<()> {
    conn.execute_batch("CREATE TABLE IF NOT EXISTS schema_version (version INTEGER NOT NULL);")?;

    let version: i64 =
        conn.query_row("SELECT COALESCE(MAX(version), 0) FROM schema_version", [], |r| r.get(0))?;

    if version < 1 {
        info!("Running migration v1 (users, public messages)");
        conn.execute_batch(
            "
            CREATE TABLE users (
                id              INTEGER PRIMARY KEY AUTOINCREMENT,
                email           TEXT NOT NULL UNIQUE,
                password_hash   TEXT NOT NULL,
                created_at      INTEGER NOT NULL
            );

            CREATE TABLE messages (
                id          INTEGER PRIMARY KEY AUTOINCREMENT,
                user_id     INTEGER NOT NULL REFERENCES users(id) ON DELETE CASCADE,
                content     TEXT NOT NULL CHECK (length(content) BETWEEN 1 AND 250),
                created_at  INTEGER NOT NULL
            );

            CREATE INDEX idx_messages_author
                ON messages(user_id, created_at);

            INSERT INTO schema_version (version) VALUES (1);
            ",
        )?;
    }

    if version < 2 {
        info!("Running migration v2 (usernames, direct messages, read state)");
        conn.execute_batch(
            "
            ALTER TABLE users ADD COLUMN username TEXT;

            CREATE UNIQUE INDEX idx_users_username
                ON users(username);

            CREATE TABLE private_messages (
                id              INTEGER PRIMARY KEY AUTOINCREMENT,
                sender_id       INTEGER NOT NULL REFERENCES users(id) ON DELETE CASCADE,
                recipient_id    INTEGER NOT NULL REFERENCES users(id) ON DELETE CASCADE,
                content         TEXT NOT NULL CHECK (length(content) BETWEEN 1 AND 500),
                created_at      INTEGER NOT NULL,
                CHECK (sender_id <> recipient_id)
            );

            CREATE INDEX idx_private_messages_inbox
                ON private_messages(recipient_id, sender_id, created_at);

            CREATE INDEX idx_private_messages_outbox
                ON private_messages(sender_id, recipient_id, created_at);

            CREATE TABLE dm_read_state (
                user_id         INTEGER NOT NULL REFERENCES users(id) ON DELETE CASCADE,
                other_user_id   INTEGER NOT NULL REFERENCES users(id) ON DELETE CASCADE,
                last_read_at    INTEGER,
                PRIMARY KEY (user_id, other_user_id)
            );

            INSERT INTO schema_version (version) VALUES (2);
            ",
        )?;
    }

    info!("Database migrations complete");
    Ok(())
}

/// Newest timestamp written to any table, or 0 for an empty database.
pub fn latest_timestamp(conn: &Connection) -> Result<i64> {
    let latest = conn.query_row(
        "SELECT MAX(
            COALESCE((SELECT MAX(created_at) FROM users), 0),
            COALESCE((SELECT MAX(created_at) FROM messages), 0),
            COALESCE((SELECT MAX(created_at) FROM private_messages), 0),
            COALESCE((SELECT MAX(last_read_at) FROM dm_read_state), 0)
        )",
        [],
        |r| r.get(0),
    )?;
    Ok(latest)
}
