//! The request/response pipeline every endpoint goes through.
//!
//! `RedditClient` builds requests against one of two hosts, gates them on the
//! last known rate budget, attaches a bearer token when it has credentials,
//! and classifies/decodes the response.

mod auth;
mod error;
mod rate;
mod request;

pub use auth::{Credentials, Token, TokenManager};
pub use error::{Error, ResponseContext, Result};
pub use rate::{
    Rate, RateLimiter, HEADER_RATELIMIT_REMAINING, HEADER_RATELIMIT_RESET, HEADER_RATELIMIT_USED,
};
pub use request::{add_options, form_body, Request, HEADER_MODHASH, MEDIA_TYPE_FORM, MEDIA_TYPE_JSON};

use crate::models::{Listing, ListingOptions, Thing};
use log::{debug, warn};
use reqwest::header::HeaderMap;
use reqwest::{Client, Method, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::io::Write;
use std::sync::Arc;
use std::time::Duration;
use url::Url;

pub const LIBRARY_NAME: &str = env!("CARGO_PKG_NAME");
pub const LIBRARY_VERSION: &str = env!("CARGO_PKG_VERSION");

pub const DEFAULT_BASE_URL: &str = "https://oauth.reddit.com";
pub const DEFAULT_READONLY_BASE_URL: &str = "https://reddit.com";
pub const DEFAULT_TOKEN_URL: &str = "https://www.reddit.com/api/v1/access_token";

/// Where and how a client talks to Reddit. Built by the caller and passed in;
/// nothing here is process-wide.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub base_url: String,
    pub readonly_base_url: String,
    pub token_url: String,
    /// Overrides the computed `User-Agent`.
    pub user_agent: Option<String>,
    /// Applied to requests that don't set their own timeout.
    pub timeout: Option<Duration>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            readonly_base_url: DEFAULT_READONLY_BASE_URL.to_string(),
            token_url: DEFAULT_TOKEN_URL.to_string(),
            user_agent: None,
            timeout: None,
        }
    }
}

/// Called after every response that reached the client, before it is classified.
pub type RequestCompletionCallback = Arc<dyn Fn(&Method, &Url, StatusCode, &HeaderMap) + Send + Sync>;

/// A response that passed classification.
#[derive(Debug, Clone)]
pub struct Response {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Vec<u8>,
}

/// Clones share the rate record and the token.
#[derive(Clone)]
pub struct RedditClient {
    http: Client,
    base_url: Url,
    readonly_base_url: Url,
    user_agent: String,
    timeout: Option<Duration>,
    auth: Option<Arc<TokenManager>>,
    rate: Arc<RateLimiter>,
    on_request_completed: Option<RequestCompletionCallback>,
}

impl RedditClient {
    /// An authenticated client against the OAuth host.
    pub fn new(credentials: Credentials, config: ClientConfig) -> Result<Self> {
        let token_url = parse_url("token_url", &config.token_url)?;
        let user_agent = config
            .user_agent
            .clone()
            .unwrap_or_else(|| default_user_agent(credentials.username.as_deref()));
        let auth = TokenManager::new(credentials, token_url);
        let base_url = parse_url("base_url", &config.base_url)?;
        Self::build(base_url, &config, user_agent, Some(Arc::new(auth)))
    }

    /// An anonymous client against the read-only host.
    pub fn readonly(config: ClientConfig) -> Result<Self> {
        let user_agent = config
            .user_agent
            .clone()
            .unwrap_or_else(|| default_user_agent(None));
        let base_url = parse_url("readonly_base_url", &config.readonly_base_url)?;
        Self::build(base_url, &config, user_agent, None)
    }

    fn build(
        base_url: Url,
        config: &ClientConfig,
        user_agent: String,
        auth: Option<Arc<TokenManager>>,
    ) -> Result<Self> {
        debug!("Creating RedditClient for {} with user_agent: {}", base_url, user_agent);
        let http = Client::builder()
            .user_agent(user_agent.as_str())
            .build()
            .map_err(|e| Error::internal_with("cannot build HTTP client", e))?;

        Ok(Self {
            http,
            base_url,
            readonly_base_url: parse_url("readonly_base_url", &config.readonly_base_url)?,
            user_agent,
            timeout: config.timeout,
            auth,
            rate: Arc::new(RateLimiter::new()),
            on_request_completed: None,
        })
    }

    pub fn on_request_completed<F>(&mut self, callback: F)
    where
        F: Fn(&Method, &Url, StatusCode, &HeaderMap) + Send + Sync + 'static,
    {
        self.on_request_completed = Some(Arc::new(callback));
    }

    pub fn user_agent(&self) -> &str {
        &self.user_agent
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    pub fn is_readonly(&self) -> bool {
        self.auth.is_none()
    }

    /// The rate budget reported by the last response.
    pub fn rate(&self) -> Rate {
        self.rate.snapshot()
    }

    /// Build a request whose body, if any, is already form-encoded.
    pub fn new_request(&self, method: Method, path: &str, form: Option<Vec<u8>>) -> Result<Request> {
        let req = request::build(
            &self.base_url,
            &self.readonly_base_url,
            method,
            path,
            form.map(|bytes| (bytes, MEDIA_TYPE_FORM)),
        )?;
        debug!("Built request {} {}", req.method, req.url);
        Ok(req)
    }

    /// Build a request with a JSON-encoded body.
    pub fn new_json_request<B>(&self, method: Method, path: &str, body: Option<&B>) -> Result<Request>
    where
        B: Serialize + ?Sized,
    {
        let body = body
            .map(|b| request::encode_json(b).map(|bytes| (bytes, MEDIA_TYPE_JSON)))
            .transpose()?;
        let req = request::build(&self.base_url, &self.readonly_base_url, method, path, body)?;
        debug!("Built JSON request {} {}", req.method, req.url);
        Ok(req)
    }

    /// Send a request and classify the response.
    ///
    /// Nothing goes out while the rate budget is known to be spent. Rate
    /// headers are recorded from every response that arrives. A response is
    /// rate-limited when `x-ratelimit-remaining` is zero, whatever its status,
    /// and an error when its status is anything other than 200.
    pub async fn send(&self, req: Request) -> Result<Response> {
        if let Some(rate) = self.rate.check_before_send() {
            warn!(
                "Rate limit exhausted until {:?}, not sending {} {}",
                rate.reset, req.method, req.url
            );
            let message = format!(
                "API rate limit still exceeded until {}, not making remote request.",
                describe_reset(&rate)
            );
            return Err(Error::RateLimit {
                context: ResponseContext {
                    method: req.method,
                    url: req.url,
                    status: StatusCode::TOO_MANY_REQUESTS,
                    message,
                },
                rate,
            });
        }

        let Request {
            method,
            url,
            headers,
            body,
            timeout,
        } = req;

        let mut builder = self
            .http
            .request(method.clone(), url.clone())
            .headers(headers)
            .body(body);

        let timeout = timeout.or(self.timeout);
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }

        if let Some(auth) = &self.auth {
            let token = auth.bearer(&self.http, timeout).await?;
            builder = builder.bearer_auth(token);
        }

        let res = builder.send().await.map_err(|source| Error::Transport {
            method: method.clone(),
            url: url.clone(),
            source,
        })?;

        let status = res.status();
        let headers = res.headers().clone();
        debug!("{} {} -> {}", method, url, status);

        let rate = Rate::from_headers(&headers);
        self.rate.update(rate.clone());

        if let Some(callback) = &self.on_request_completed {
            callback(&method, &url, status, &headers);
        }

        let body = res.bytes().await.map_err(|source| Error::Transport {
            method: method.clone(),
            url: url.clone(),
            source,
        })?;

        if rate::headers_signal_exhaustion(&headers) {
            let message = format!(
                "API rate limit has been exceeded until {}.",
                describe_reset(&rate)
            );
            return Err(Error::RateLimit {
                context: ResponseContext {
                    method,
                    url,
                    status,
                    message,
                },
                rate,
            });
        }

        if status != StatusCode::OK {
            if status == StatusCode::UNAUTHORIZED {
                if let Some(auth) = &self.auth {
                    auth.invalidate().await;
                }
            }
            return Err(Error::Response(ResponseContext {
                method,
                url,
                status,
                message: String::from_utf8_lossy(&body).into_owned(),
            }));
        }

        Ok(Response {
            status,
            headers,
            body: body.to_vec(),
        })
    }

    /// Send a request and decode the JSON body into `T`.
    pub async fn execute<T: DeserializeOwned>(&self, req: Request) -> Result<T> {
        let res = self.send(req).await?;
        decode(res.body)
    }

    /// Send a request and copy the body verbatim into `sink`.
    pub async fn execute_raw<W: Write>(&self, req: Request, sink: &mut W) -> Result<usize> {
        let res = self.send(req).await?;
        sink.write_all(&res.body)
            .map_err(|e| Error::internal_with("cannot write response body", e))?;
        Ok(res.body.len())
    }

    /// GET `path` with optional listing options and decode into `T`.
    pub async fn get<T: DeserializeOwned>(
        &self,
        path: &str,
        opts: Option<&ListingOptions>,
    ) -> Result<T> {
        let path = add_options(path, opts)?;
        let req = self.new_request(Method::GET, &path, None)?;
        self.execute(req).await
    }

    pub async fn get_thing(&self, path: &str, opts: Option<&ListingOptions>) -> Result<Thing> {
        self.get(path, opts).await
    }

    /// GET a thing and insist on one concrete kind.
    pub async fn get_typed<T>(&self, path: &str, opts: Option<&ListingOptions>) -> Result<T>
    where
        T: TryFrom<Thing, Error = Thing>,
    {
        let thing = self.get_thing(path, opts).await?;
        T::try_from(thing).map_err(|other| Error::Json {
            message: format!("unexpected thing kind {}", other.kind()),
            data: serde_json::to_vec(&other).unwrap_or_default(),
        })
    }

    pub async fn get_listing(&self, path: &str, opts: Option<&ListingOptions>) -> Result<Listing> {
        self.get_typed(path, opts).await
    }

    /// GET an endpoint that answers with one listing or an array of them.
    ///
    /// Comment pages (`r/<sub>/comments/<id>`) return two listings: the post,
    /// then its comment tree.
    pub async fn get_listings(
        &self,
        path: &str,
        opts: Option<&ListingOptions>,
    ) -> Result<Vec<Listing>> {
        let path = add_options(path, opts)?;
        let req = self.new_request(Method::GET, &path, None)?;
        let res = self.send(req).await?;

        let is_array = res
            .body
            .iter()
            .find(|b| !b.is_ascii_whitespace())
            .map_or(false, |b| *b == b'[');
        let things: Vec<Thing> = if is_array {
            decode(res.body)?
        } else {
            vec![decode(res.body)?]
        };

        things
            .into_iter()
            .map(|thing| {
                Listing::try_from(thing).map_err(|other| Error::Json {
                    message: format!("expected a Listing, found {}", other.kind()),
                    data: serde_json::to_vec(&other).unwrap_or_default(),
                })
            })
            .collect()
    }

    /// POST a form body and decode the JSON response into `T`.
    pub async fn post_form_json<T: DeserializeOwned>(
        &self,
        path: &str,
        form: Vec<u8>,
        modhash: Option<&str>,
    ) -> Result<T> {
        let res = self.post_form(path, form, modhash).await?;
        decode(res.body)
    }

    /// POST a form body and return the response without decoding it.
    pub async fn post_form(&self, path: &str, form: Vec<u8>, modhash: Option<&str>) -> Result<Response> {
        let mut req = self.new_request(Method::POST, path, Some(form))?;
        if let Some(modhash) = modhash {
            req = req.with_modhash(modhash)?;
        }
        self.send(req).await
    }
}

pub(crate) fn decode<T: DeserializeOwned>(body: Vec<u8>) -> Result<T> {
    serde_json::from_slice(&body).map_err(|e| {
        debug!("Error decoding response: {}", e);
        debug!(
            "First 100 chars: {}",
            String::from_utf8_lossy(&body[..body.len().min(100)])
        );
        Error::Json {
            message: e.to_string(),
            data: body,
        }
    })
}

fn default_user_agent(username: Option<&str>) -> String {
    let mut user_agent = format!("rust:{}:v{}", LIBRARY_NAME, LIBRARY_VERSION);
    if let Some(username) = username.filter(|u| !u.is_empty()) {
        user_agent.push_str(&format!(" (by /u/{})", username));
    }
    user_agent
}

fn describe_reset(rate: &Rate) -> String {
    match rate.reset {
        Some(reset) => reset.to_rfc3339(),
        None => "an unknown time".to_string(),
    }
}

fn parse_url(field: &'static str, value: &str) -> Result<Url> {
    Url::parse(value).map_err(|e| Error::internal_with(format!("invalid {}: {:?}", field, value), e))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn user_agent_names_library_and_user() {
        assert_eq!(
            default_user_agent(Some("alice")),
            format!("rust:redwire:v{} (by /u/alice)", LIBRARY_VERSION)
        );
        assert_eq!(
            default_user_agent(None),
            format!("rust:redwire:v{}", LIBRARY_VERSION)
        );
    }

    #[test]
    fn configured_user_agent_wins() {
        let config = ClientConfig {
            user_agent: Some("my-bot/1.0".to_string()),
            ..Default::default()
        };
        let client = RedditClient::readonly(config).unwrap();
        assert_eq!(client.user_agent(), "my-bot/1.0");
        assert!(client.is_readonly());
    }

    #[test]
    fn readonly_client_targets_readonly_host() {
        let client = RedditClient::readonly(ClientConfig::default()).unwrap();
        let req = client.new_request(Method::GET, "r/foo/about", None).unwrap();
        assert_eq!(req.url().as_str(), "https://reddit.com/r/foo/about.json");
    }

    #[test]
    fn authenticated_client_targets_oauth_host() {
        let client = RedditClient::new(
            Credentials::new("id", "secret").with_user("alice", "pw"),
            ClientConfig::default(),
        )
        .unwrap();
        let req = client.new_request(Method::GET, "r/foo/about", None).unwrap();
        assert_eq!(req.url().as_str(), "https://oauth.reddit.com/r/foo/about");
        assert!(client.user_agent().ends_with("(by /u/alice)"));
    }

    #[test]
    fn json_request_encodes_body() {
        #[derive(Serialize)]
        struct Widget<'a> {
            kind: &'a str,
            short_name: &'a str,
        }

        let client = RedditClient::readonly(ClientConfig::default()).unwrap();
        let req = client
            .new_json_request(
                Method::POST,
                "api/widget",
                Some(&Widget {
                    kind: "textarea",
                    short_name: "Rules",
                }),
            )
            .unwrap();
        assert_eq!(
            req.headers()[reqwest::header::CONTENT_TYPE],
            MEDIA_TYPE_JSON
        );
        assert_eq!(req.body(), br#"{"kind":"textarea","short_name":"Rules"}"#);
    }

    #[test]
    fn bad_base_url_is_internal_error() {
        let config = ClientConfig {
            readonly_base_url: "not a url".to_string(),
            ..Default::default()
        };
        assert!(matches!(
            RedditClient::readonly(config),
            Err(Error::Internal { .. })
        ));
    }

    #[test]
    fn decode_failure_keeps_raw_bytes() {
        let err = decode::<Thing>(b"<html>oops</html>".to_vec()).unwrap_err();
        assert_eq!(err.data(), Some(&b"<html>oops</html>"[..]));
    }
}
