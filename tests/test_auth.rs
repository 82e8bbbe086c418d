//! Token acquisition and bearer attachment against a mock token endpoint.

use std::time::{Duration, Instant};

use redwire::models::Account;
use redwire::{ClientConfig, Credentials, Error, RedditClient};
use reqwest::StatusCode;
use serde_json::json;
use wiremock::matchers::{body_string_contains, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

mod common;
use common::{mount_token, oauth_client, oauth_client_with, token_response, BASIC_AUTH, TOKEN_PATH};

fn me() -> serde_json::Value {
    json!({"id": "abc", "name": "alice", "link_karma": 1, "comment_karma": 2})
}

#[tokio::test]
async fn token_is_fetched_once_and_reused() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(TOKEN_PATH))
        .and(header("authorization", BASIC_AUTH))
        .and(body_string_contains("grant_type=client_credentials"))
        .respond_with(ResponseTemplate::new(200).set_body_json(token_response("tok-1")))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/v1/me"))
        .and(header("authorization", "Bearer tok-1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(me()))
        .expect(3)
        .mount(&server)
        .await;

    let client = oauth_client(&server);
    for _ in 0..3 {
        let account: Account = client.get("api/v1/me", None).await.unwrap();
        assert_eq!(account.name, "alice");
    }
}

#[tokio::test]
async fn oauth_host_gets_no_json_suffix() {
    let server = MockServer::start().await;
    mount_token(&server, "tok").await;

    Mock::given(method("GET"))
        .and(path("/r/rust/about"))
        .respond_with(ResponseTemplate::new(200).set_body_json(common::subreddit_about("rust")))
        .expect(1)
        .mount(&server)
        .await;

    let client = oauth_client(&server);
    assert!(client.get_thing("r/rust/about", None).await.is_ok());
}

#[tokio::test]
async fn user_credentials_use_password_grant() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(TOKEN_PATH))
        .and(body_string_contains("grant_type=password"))
        .and(body_string_contains("username=alice"))
        .and(body_string_contains("password=hunter2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(token_response("user-tok")))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/v1/me"))
        .and(header("authorization", "Bearer user-tok"))
        .respond_with(ResponseTemplate::new(200).set_body_json(me()))
        .expect(1)
        .mount(&server)
        .await;

    let client = oauth_client_with(
        &server,
        Credentials::new("id", "secret").with_user("alice", "hunter2"),
    );
    let _: Account = client.get("api/v1/me", None).await.unwrap();
}

#[tokio::test]
async fn token_error_field_is_authentication_error() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(TOKEN_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"error": "invalid_grant"})))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(me()))
        .expect(0)
        .mount(&server)
        .await;

    let client = oauth_client(&server);
    let err = client.get::<Account>("api/v1/me", None).await.unwrap_err();
    match err {
        Error::Authentication(message) => assert!(message.contains("invalid_grant")),
        other => panic!("expected authentication error, got {:?}", other),
    }
}

#[tokio::test]
async fn rejected_client_is_authentication_error() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(TOKEN_PATH))
        .respond_with(ResponseTemplate::new(401).set_body_string("unauthorized"))
        .mount(&server)
        .await;

    let client = oauth_client(&server);
    let err = client.get_thing("r/rust/about", None).await.unwrap_err();
    assert!(matches!(err, Error::Authentication(_)));
}

#[tokio::test]
async fn unauthorized_response_drops_the_token() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(TOKEN_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(token_response("tok")))
        .expect(2)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/v1/me"))
        .respond_with(ResponseTemplate::new(401).set_body_string("expired"))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/v1/me"))
        .respond_with(ResponseTemplate::new(200).set_body_json(me()))
        .mount(&server)
        .await;

    let client = oauth_client(&server);
    let err = client.get::<Account>("api/v1/me", None).await.unwrap_err();
    assert_eq!(err.status(), Some(StatusCode::UNAUTHORIZED));

    let account: Account = client.get("api/v1/me", None).await.unwrap();
    assert_eq!(account.id, "abc");
}

#[tokio::test]
async fn slow_token_endpoint_is_bounded_by_client_timeout() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(TOKEN_PATH))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(token_response("tok"))
                .set_delay(Duration::from_secs(3)),
        )
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(me()))
        .expect(0)
        .mount(&server)
        .await;

    let client = RedditClient::new(
        Credentials::new("id", "secret"),
        ClientConfig {
            base_url: server.uri(),
            token_url: format!("{}{}", server.uri(), TOKEN_PATH),
            timeout: Some(Duration::from_millis(200)),
            ..Default::default()
        },
    )
    .unwrap();

    let started = Instant::now();
    let err = client.get::<Account>("api/v1/me", None).await.unwrap_err();
    assert!(started.elapsed() < Duration::from_secs(2));
    match err {
        Error::Transport { source, .. } => assert!(source.is_timeout()),
        other => panic!("expected a timeout, got {:?}", other),
    }
}

#[tokio::test]
async fn short_lived_token_is_reused_within_its_lifetime() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(TOKEN_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access_token": "short",
            "token_type": "bearer",
            "expires_in": 120,
            "scope": "*"
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/v1/me"))
        .and(header("authorization", "Bearer short"))
        .respond_with(ResponseTemplate::new(200).set_body_json(me()))
        .expect(3)
        .mount(&server)
        .await;

    let client = oauth_client(&server);
    for _ in 0..3 {
        let _: Account = client.get("api/v1/me", None).await.unwrap();
    }
}
