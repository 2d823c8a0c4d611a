//! End-to-end: serve the real router on a loopback port and drive it
//! through `Session`, two users at a time.

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Result;
use reqwest::StatusCode;

use agora_api::auth::AppStateInner;
use agora_api::password::PasswordHasher;
use agora_api::router::router;
use agora_client::session::Recipient;
use agora_client::{ClientError, Session};
use agora_db::Database;

async fn spawn_server() -> Result<String> {
    let state = Arc::new(AppStateInner {
        db: Database::open_in_memory()?,
        jwt_secret: "client-test-secret".to_string(),
        token_ttl: chrono::Duration::hours(2),
        hasher: PasswordHasher::with_params(1024, 1, 1)?,
    });

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await?;
    let addr: SocketAddr = listener.local_addr()?;
    tokio::spawn(async move {
        let _ = axum::serve(listener, router(state)).await;
    });
    Ok(format!("http://{addr}"))
}

async fn logged_in(base: &str, username: &str) -> Result<Session> {
    let email = format!("{username}@example.com");
    let mut session = Session::new(base);
    session.register(&email, username, "password1").await?;
    session.login(&email, "password1").await?;
    Ok(session)
}

#[tokio::test]
async fn health_needs_no_session() -> Result<()> {
    let base = spawn_server().await?;
    let health = Session::new(&base).health().await?;
    assert_eq!(health.status, "ok");
    Ok(())
}

#[tokio::test]
async fn login_stores_token_and_identity() -> Result<()> {
    let base = spawn_server().await?;
    let mut session = Session::new(&base);
    session.register("alice@example.com", "alice", "password1").await?;

    let me = session.login("alice@example.com", "password1").await?;
    assert!(session.is_logged_in());
    assert_eq!(me.username.as_deref(), Some("alice"));
    assert_eq!(session.identity()?.id, me.id);

    let greeting = session.protected().await?;
    assert_eq!(greeting.message, "Hello, alice! This is a protected route.");

    session.logout();
    assert!(matches!(session.protected().await, Err(ClientError::NotLoggedIn)));
    Ok(())
}

#[tokio::test]
async fn server_errors_surface_status_and_message() -> Result<()> {
    let base = spawn_server().await?;
    let session = Session::new(&base);
    session.register("alice@example.com", "alice", "password1").await?;

    let err = session
        .register("alice@example.com", "alice2", "password1")
        .await
        .unwrap_err();
    match err {
        ClientError::Api { status, message } => {
            assert_eq!(status, StatusCode::CONFLICT);
            assert_eq!(message, "Email already registered");
        }
        other => panic!("expected API error, got {other:?}"),
    }

    let mut session = Session::new(&base);
    let err = session.login("alice@example.com", "wrongpass").await.unwrap_err();
    assert_eq!(err.status(), Some(StatusCode::UNAUTHORIZED));
    assert!(!session.is_logged_in());
    Ok(())
}

#[tokio::test]
async fn invalid_input_never_leaves_the_client() -> Result<()> {
    // Nothing is listening here; a request would fail with a network error
    let session = Session::with_token("http://127.0.0.1:9", "a.b.c");

    assert!(matches!(
        session.register("bad", "alice", "password1").await,
        Err(ClientError::Validation(_))
    ));
    assert!(matches!(
        session.post_message(&"x".repeat(251)).await,
        Err(ClientError::Validation(_))
    ));
    assert!(matches!(
        session.send_dm(Recipient::Id(2), "").await,
        Err(ClientError::Validation(_))
    ));
    assert!(matches!(
        session.send_dm(Recipient::Handle(String::new()), "hi").await,
        Err(ClientError::Validation(_))
    ));
    Ok(())
}

#[tokio::test]
async fn feed_post_and_delete() -> Result<()> {
    let base = spawn_server().await?;
    let alice = logged_in(&base, "alice").await?;
    let bob = logged_in(&base, "bob").await?;

    alice.post_message("hello world").await?;
    let feed = Session::new(&base).feed().await?;
    assert_eq!(feed.len(), 1);
    assert_eq!(feed[0].author, "alice");

    let id = alice.my_messages().await?[0].id;
    let err = bob.delete_message(id).await.unwrap_err();
    assert_eq!(err.status(), Some(StatusCode::NOT_FOUND));

    alice.delete_message(id).await?;
    assert!(alice.my_messages().await?.is_empty());
    Ok(())
}

#[tokio::test]
async fn direct_message_walkthrough() -> Result<()> {
    let base = spawn_server().await?;
    let alice = logged_in(&base, "alice").await?;
    let bob = logged_in(&base, "bob").await?;
    let alice_id = alice.identity()?.id;
    let bob_id = bob.identity()?.id;

    let others = alice.users().await?;
    assert_eq!(others.len(), 1);
    assert_eq!(others[0].id, bob_id);

    alice.send_dm(Recipient::Handle("bob".into()), "hi").await?;
    alice.send_dm(Recipient::Id(bob_id), "there").await?;

    let unread = bob.unread_counts().await?;
    assert_eq!(unread[0].other_user_id, alice_id);
    assert_eq!(unread[0].unread_count, 2);

    let thread = bob.open_conversation(alice_id).await?;
    let contents: Vec<&str> = thread.iter().map(|m| m.content.as_str()).collect();
    assert_eq!(contents, ["hi", "there"]);
    assert_eq!(bob.unread_counts().await?[0].unread_count, 0);

    alice.send_dm(Recipient::Id(bob_id), "again").await?;
    assert_eq!(bob.unread_counts().await?[0].unread_count, 1);

    let err = alice.send_dm(Recipient::Id(alice_id), "me").await.unwrap_err();
    assert_eq!(err.status(), Some(StatusCode::BAD_REQUEST));
    Ok(())
}
