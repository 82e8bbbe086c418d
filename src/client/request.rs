//! Request construction: path resolution, body encoding, query options.

use super::error::{Error, Result};
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, ACCEPT, CONTENT_TYPE};
use reqwest::Method;
use serde::Serialize;
use std::time::Duration;
use url::form_urlencoded;
use url::Url;

pub const MEDIA_TYPE_JSON: &str = "application/json";
pub const MEDIA_TYPE_FORM: &str = "application/x-www-form-urlencoded";
pub const HEADER_MODHASH: &str = "X-Modhash";

/// A fully formed request, ready to be handed to [`RedditClient::send`].
///
/// [`RedditClient::send`]: crate::client::RedditClient::send
#[derive(Debug, Clone)]
pub struct Request {
    pub(crate) method: Method,
    pub(crate) url: Url,
    pub(crate) headers: HeaderMap,
    pub(crate) body: Vec<u8>,
    pub(crate) timeout: Option<Duration>,
}

impl Request {
    pub fn method(&self) -> &Method {
        &self.method
    }

    pub fn url(&self) -> &Url {
        &self.url
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    pub fn body(&self) -> &[u8] {
        &self.body
    }

    /// Set or replace a header.
    pub fn header(mut self, name: &str, value: &str) -> Result<Self> {
        let name = HeaderName::from_bytes(name.as_bytes())
            .map_err(|e| Error::internal_with(format!("invalid header name {:?}", name), e))?;
        let value = HeaderValue::from_str(value)
            .map_err(|e| Error::internal_with(format!("invalid value for header {}", name), e))?;
        self.headers.insert(name, value);
        Ok(self)
    }

    /// Attach the anti-CSRF token required by write endpoints.
    pub fn with_modhash(self, modhash: &str) -> Result<Self> {
        self.header(HEADER_MODHASH, modhash)
    }

    /// Abort the call if no response arrives within `timeout`.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }
}

pub(crate) fn build(
    base: &Url,
    readonly_base: &Url,
    method: Method,
    path: &str,
    body: Option<(Vec<u8>, &'static str)>,
) -> Result<Request> {
    let mut url = base
        .join(path)
        .map_err(|e| Error::internal_with(format!("cannot resolve path {:?}", path), e))?;

    append_json_extension(&mut url, readonly_base);

    let mut headers = HeaderMap::new();
    headers.insert(ACCEPT, HeaderValue::from_static(MEDIA_TYPE_JSON));

    let body = match body {
        Some((bytes, content_type)) => {
            headers.insert(CONTENT_TYPE, HeaderValue::from_static(content_type));
            bytes
        }
        None => Vec::new(),
    };

    Ok(Request {
        method,
        url,
        headers,
        body,
        timeout: None,
    })
}

/// The read-only host serves HTML unless the path ends in `.json`.
fn append_json_extension(url: &mut Url, readonly_base: &Url) {
    if url.origin() != readonly_base.origin() {
        return;
    }
    if url.path().ends_with(".json") {
        return;
    }
    let path = format!("{}.json", url.path());
    url.set_path(&path);
}

pub(crate) fn encode_json<B: Serialize + ?Sized>(body: &B) -> Result<Vec<u8>> {
    serde_json::to_vec(body).map_err(|e| Error::Json {
        message: format!("encoding request body: {}", e),
        data: Vec::new(),
    })
}

/// Url-encode key/value pairs for a form body.
pub fn form_body<K, V>(pairs: &[(K, V)]) -> Vec<u8>
where
    K: AsRef<str>,
    V: AsRef<str>,
{
    form_urlencoded::Serializer::new(String::new())
        .extend_pairs(pairs.iter().map(|(k, v)| (k.as_ref(), v.as_ref())))
        .finish()
        .into_bytes()
}

/// Merge the fields of `opts` into the query string of `path`.
///
/// Null fields are skipped, arrays become repeated keys, and a key already
/// present in `path` is replaced. Keys come out sorted.
pub fn add_options<O: Serialize + ?Sized>(path: &str, opts: Option<&O>) -> Result<String> {
    let opts = match opts {
        Some(opts) => opts,
        None => return Ok(path.to_string()),
    };

    let value = serde_json::to_value(opts)
        .map_err(|e| Error::internal_with("cannot encode query options", e))?;
    let fields = match value {
        serde_json::Value::Object(fields) => fields,
        serde_json::Value::Null => return Ok(path.to_string()),
        other => {
            return Err(Error::internal(format!(
                "query options must be a struct or map, got {}",
                other
            )))
        }
    };

    let (base, existing) = match path.split_once('?') {
        Some((base, query)) => (base, query),
        None => (path, ""),
    };

    let mut pairs: Vec<(String, String)> = form_urlencoded::parse(existing.as_bytes())
        .into_owned()
        .filter(|(k, _)| !fields.contains_key(k))
        .collect();

    for (key, value) in fields {
        match value {
            serde_json::Value::Null => {}
            serde_json::Value::Array(items) => {
                for item in items {
                    pairs.push((key.clone(), scalar(&key, item)?));
                }
            }
            value => {
                let rendered = scalar(&key, value)?;
                pairs.push((key, rendered));
            }
        }
    }

    if pairs.is_empty() {
        return Ok(base.to_string());
    }

    pairs.sort_by(|a, b| a.0.cmp(&b.0));
    let query = form_urlencoded::Serializer::new(String::new())
        .extend_pairs(pairs)
        .finish();
    Ok(format!("{}?{}", base, query))
}

fn scalar(key: &str, value: serde_json::Value) -> Result<String> {
    match value {
        serde_json::Value::String(s) => Ok(s),
        serde_json::Value::Number(n) => Ok(n.to_string()),
        serde_json::Value::Bool(b) => Ok(b.to_string()),
        other => Err(Error::internal(format!(
            "query option {} must be a scalar, got {}",
            key, other
        ))),
    }
}
