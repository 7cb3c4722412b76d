//! E2E tests for the protected secrets listing and submission routes

mod common;

use common::{cookie_value, location, TestServer};

#[tokio::test]
async fn test_secrets_requires_session() {
    let server = TestServer::new().await;

    let response = server
        .client
        .get(server.url("/secrets"))
        .send()
        .await
        .expect("request succeeds");

    assert!(response.status().is_redirection());
    assert_eq!(location(&response), "/login");
    assert!(cookie_value(&response, "flash").is_some());
}

#[tokio::test]
async fn test_submit_form_requires_session() {
    let server = TestServer::new().await;

    let response = server
        .client
        .get(server.url("/submit"))
        .send()
        .await
        .expect("request succeeds");

    assert!(response.status().is_redirection());
    assert_eq!(location(&response), "/login");
    assert!(cookie_value(&response, "flash").is_some());
}

#[tokio::test]
async fn test_submit_post_requires_session() {
    let server = TestServer::new().await;

    let response = server
        .client
        .post(server.url("/submit"))
        .form(&[("secret", "sneaky")])
        .send()
        .await
        .expect("request succeeds");

    assert!(response.status().is_redirection());
    assert_eq!(location(&response), "/login");

    // Nothing was stored
    assert!(server
        .state
        .db
        .list_secrets_with_authors()
        .await
        .unwrap()
        .is_empty());
}

#[tokio::test]
async fn test_stale_session_for_deleted_user_is_anonymous() {
    let server = TestServer::new().await;

    // Token signed with the right secret but pointing at a user id that
    // was never created
    let session = secretden::auth::Session::new(9999, 3600);
    let token = secretden::auth::create_session_token(
        &session,
        &server.state.config.auth.session_secret,
    )
    .unwrap();

    let response = server
        .client
        .get(server.url("/secrets"))
        .header("Cookie", format!("session={token}"))
        .send()
        .await
        .expect("request succeeds");

    assert!(response.status().is_redirection());
    assert_eq!(location(&response), "/login");
}

#[tokio::test]
async fn test_submit_and_list_round_trip() {
    let server = TestServer::new().await;
    let session = server.register_and_session("a@x.com", "pw1").await;

    let response = server
        .client
        .post(server.url("/submit"))
        .header("Cookie", &session)
        .form(&[("secret", "hello")])
        .send()
        .await
        .expect("request succeeds");
    assert!(response.status().is_redirection());
    assert_eq!(location(&response), "/secrets");

    let response = server
        .client
        .get(server.url("/secrets"))
        .header("Cookie", &session)
        .send()
        .await
        .expect("request succeeds");
    assert_eq!(response.status(), 200);
    let body = response.text().await.unwrap();
    assert!(body.contains("hello"));
    assert!(body.contains("a@x.com"));
}

#[tokio::test]
async fn test_secret_is_attributed_to_its_owner_only() {
    let server = TestServer::new().await;
    let alice = server.register_and_session("alice@x.com", "pw1").await;
    let bob = server.register_and_session("bob@x.com", "pw2").await;

    server
        .client
        .post(server.url("/submit"))
        .header("Cookie", &alice)
        .form(&[("secret", "alices-secret")])
        .send()
        .await
        .expect("request succeeds");

    // Bob sees the listing too, with the secret attributed to Alice
    let response = server
        .client
        .get(server.url("/secrets"))
        .header("Cookie", &bob)
        .send()
        .await
        .expect("request succeeds");
    let body = response.text().await.unwrap();
    assert!(body.contains("alices-secret"));

    let listing = server.state.db.list_secrets_with_authors().await.unwrap();
    assert_eq!(listing.len(), 1);
    assert_eq!(listing[0].email, "alice@x.com");
}

#[tokio::test]
async fn test_submit_form_renders_for_authenticated_user() {
    let server = TestServer::new().await;
    let session = server.register_and_session("a@x.com", "pw1").await;

    let response = server
        .client
        .get(server.url("/submit"))
        .header("Cookie", &session)
        .send()
        .await
        .expect("request succeeds");

    assert_eq!(response.status(), 200);
    let body = response.text().await.unwrap();
    assert!(body.contains("form"));
    assert!(body.contains("a@x.com"));
}
