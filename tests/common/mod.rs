//! Shared fixtures for the wiremock-backed integration tests.

#![allow(dead_code)]

use redwire::{ClientConfig, Credentials, RedditClient};
use serde_json::{json, Value};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

pub const TOKEN_PATH: &str = "/api/v1/access_token";
/// base64("id:secret")
pub const BASIC_AUTH: &str = "Basic aWQ6c2VjcmV0";

/// A read-only client whose read-only host is the mock server.
pub fn readonly_client(server: &MockServer) -> RedditClient {
    RedditClient::readonly(ClientConfig {
        readonly_base_url: server.uri(),
        ..Default::default()
    })
    .unwrap()
}

/// An authenticated client whose OAuth host and token endpoint are the mock server.
pub fn oauth_client(server: &MockServer) -> RedditClient {
    oauth_client_with(server, Credentials::new("id", "secret"))
}

pub fn oauth_client_with(server: &MockServer, credentials: Credentials) -> RedditClient {
    RedditClient::new(
        credentials,
        ClientConfig {
            base_url: server.uri(),
            token_url: format!("{}{}", server.uri(), TOKEN_PATH),
            ..Default::default()
        },
    )
    .unwrap()
}

pub async fn mount_token(server: &MockServer, access_token: &str) {
    Mock::given(method("POST"))
        .and(path(TOKEN_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(token_response(access_token)))
        .mount(server)
        .await;
}

pub fn token_response(access_token: &str) -> Value {
    json!({
        "access_token": access_token,
        "token_type": "bearer",
        "expires_in": 3600,
        "scope": "*"
    })
}

pub fn rate_headers(template: ResponseTemplate, remaining: &str, used: &str, reset: &str) -> ResponseTemplate {
    template
        .insert_header("x-ratelimit-remaining", remaining)
        .insert_header("x-ratelimit-used", used)
        .insert_header("x-ratelimit-reset", reset)
}

pub fn link(id: &str, title: &str) -> Value {
    json!({
        "kind": "t3",
        "data": {
            "id": id,
            "name": format!("t3_{}", id),
            "title": title,
            "author": "alice",
            "subreddit": "rust",
            "subreddit_name_prefixed": "r/rust",
            "permalink": format!("/r/rust/comments/{}/", id),
            "url": format!("https://reddit.com/r/rust/comments/{}/", id),
            "is_self": true,
            "selftext": "body",
            "score": 42,
            "created_utc": 1704067200.0
        }
    })
}

pub fn listing(children: Vec<Value>, after: Option<&str>) -> Value {
    json!({
        "kind": "Listing",
        "data": {
            "after": after,
            "before": null,
            "modhash": "",
            "dist": children.len(),
            "children": children
        }
    })
}

pub fn subreddit_about(name: &str) -> Value {
    json!({
        "kind": "t5",
        "data": {
            "id": "2qh1i",
            "name": "t5_2qh1i",
            "display_name": name,
            "display_name_prefixed": format!("r/{}", name),
            "title": "The Rust Programming Language",
            "subscribers": 300000,
            "subreddit_type": "public",
            "created_utc": 1262304000.0
        }
    })
}

/// A comment; `replies` is a nested listing or `""` when there are none.
pub fn comment(id: &str, parent_id: &str, body: &str, replies: Value) -> Value {
    json!({
        "kind": "t1",
        "data": {
            "id": id,
            "name": format!("t1_{}", id),
            "parent_id": parent_id,
            "author": "bob",
            "body": body,
            "subreddit": "rust",
            "score": 3,
            "created_utc": 1704067260.0,
            "replies": replies
        }
    })
}
