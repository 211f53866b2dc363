//! Minimal HTTP client with safe logging and flexible auth.
//!
//! - Request options: headers, bearer `Auth`, timeout
//! - JSON helpers for API calls and a text helper for fetching pages
//! - Redacts sensitive query params of fetched URLs and never logs secret values
//! - Optional *raw* request/response logging via `PRECIS_HTTP_RAW=1`
//!
//! Requests are sent exactly once. Failures are reported to the caller and
//! never retried here.
//!
//! Example (no_run):
//! ```rust
//! # async fn demo() -> Result<(), precis_http::HttpError> {
//! let client = precis_http::HttpClient::new("https://api.example.com")?;
//! let got: serde_json::Value = client
//!     .get_json("v1/items", precis_http::RequestOpts::default())
//!     .await?;
//! # Ok(()) }
//! ```
//!
//! Security: `Auth::Bearer` values are sanitized before use, and logs only
//! ever include the auth kind (bearer/none), not the secret.

use encoding_rs::{Encoding, UTF_8};
use reqwest::header::{HeaderMap, HeaderValue, USER_AGENT};
use reqwest::{Client, Method, StatusCode, Url};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::env;
use std::time::Duration;
use thiserror::Error;

pub use reqwest::StatusCode as HttpStatus;

// ==============================
// Raw logging toggles
// ==============================

const RAW_ENV: &str = "PRECIS_HTTP_RAW";
const RAW_MAX_BODY: usize = 64 * 1024; // cap raw body logs (64 KiB)

const SECRET_QUERY_KEYS: &[&str] = &[
    "access_token",
    "authorization",
    "auth",
    "key",
    "api_key",
    "token",
    "secret",
    "client_secret",
    "bearer",
];

fn raw_enabled() -> bool {
    matches!(
        env::var(RAW_ENV).as_deref(),
        Ok("1") | Ok("true") | Ok("yes")
    )
}

/// Render a best-effort curl command for repro/debug, with secrets redacted.
fn make_curl(method: &Method, url: &Url, headers: &HeaderMap, body: Option<&[u8]>) -> String {
    let mut parts = vec!["curl".to_string(), format!("-X{}", method)];
    for (name, val) in redact_headers(headers) {
        parts.push(format!("-H '{}: {}'", name, val.replace('\'', r"'\''")));
    }
    if let Some(bytes) = body {
        if let Ok(s) = std::str::from_utf8(bytes) {
            let mut s = s.to_string();
            if s.len() > RAW_MAX_BODY {
                s.truncate(floor_char_boundary(&s, RAW_MAX_BODY));
                s.push('…');
            }
            parts.push(format!("-d '{}'", s.replace('\'', r"'\''")));
        } else {
            parts.push(format!("--data-binary @- # ({} bytes)", bytes.len()));
        }
    }
    let (host_path, query) = redact_query(url);
    let query = query
        .iter()
        .map(|(k, v)| format!("{k}={v}"))
        .collect::<Vec<_>>()
        .join("&");
    let scheme = url.scheme();
    if query.is_empty() {
        parts.push(format!("'{scheme}://{host_path}'"));
    } else {
        parts.push(format!("'{scheme}://{host_path}?{query}'"));
    }
    parts.join(" ")
}

/// Redact sensitive headers for logging
fn redact_headers(h: &HeaderMap) -> Vec<(String, String)> {
    h.iter()
        .map(|(k, v)| {
            let key = k.as_str().to_string();
            let mut val = v.to_str().unwrap_or("").to_string();
            if key.eq_ignore_ascii_case("authorization") {
                val = "Bearer <redacted>".into();
            }
            (key, val)
        })
        .collect()
}

fn is_secret_key(k: &str) -> bool {
    SECRET_QUERY_KEYS.contains(&k.to_ascii_lowercase().as_str())
}

// ==============================
// Errors
// ==============================

#[derive(Debug, Error)]
pub enum HttpError {
    #[error("invalid URL: {0}")]
    Url(String),
    #[error("request build failed: {0}")]
    Build(String),
    #[error("network error: {0}")]
    Network(String),
    #[error("decode error: {0}, body_snippet: {1}")]
    Decode(String, String),
    #[error("server returned error {status}: {message}, request_id={request_id}")]
    Api {
        status: StatusCode,
        message: String,
        request_id: String,
    },
}

impl HttpError {
    /// HTTP status of an API error, if the server answered at all.
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            Self::Api { status, .. } => Some(*status),
            _ => None,
        }
    }
}

// ==============================
// Auth & Request Options
// ==============================

/// How a request authenticates.
#[derive(Clone, Copy, Debug)]
pub enum Auth<'a> {
    /// Authorization: Bearer <token>
    Bearer(&'a str),
    None,
}

impl Auth<'_> {
    fn kind(&self) -> &'static str {
        match self {
            Auth::Bearer(_) => "bearer",
            Auth::None => "none",
        }
    }
}

/// Per-request tuning knobs for the HTTP client.
///
/// ```
/// use precis_http::{Auth, RequestOpts};
/// use std::time::Duration;
///
/// let opts = RequestOpts {
///     timeout: Some(Duration::from_secs(30)),
///     auth: Some(Auth::Bearer("sk-demo")),
///     ..Default::default()
/// };
///
/// assert_eq!(opts.timeout.unwrap().as_secs(), 30);
/// assert!(!opts.allow_absolute);
/// ```
#[derive(Clone, Debug, Default)]
pub struct RequestOpts<'a> {
    pub timeout: Option<Duration>,
    pub auth: Option<Auth<'a>>,
    pub headers: Option<HeaderMap>,
    /// If true and `path` is an absolute URL, use it as-is (ignore base).
    pub allow_absolute: bool,
}

/// A fetched text document.
#[derive(Debug, Clone)]
pub struct TextResponse {
    /// Final URL after redirects.
    pub url: Url,
    pub status: StatusCode,
    pub content_type: Option<String>,
    pub body: String,
}

// ==============================
// Client
// ==============================

#[derive(Clone)]
pub struct HttpClient {
    base: Option<Url>,
    inner: Client,
    user_agent: Option<HeaderValue>,
    pub default_timeout: Duration,
}

impl HttpClient {
    /// Construct a client anchored to a base URL.
    ///
    /// ```no_run
    /// use precis_http::{HttpClient, HttpError};
    /// use std::time::Duration;
    ///
    /// let client = HttpClient::new("https://api.example.com")?;
    /// assert_eq!(client.default_timeout, Duration::from_secs(15));
    /// # Ok::<(), HttpError>(())
    /// ```
    pub fn new(base: &str) -> Result<Self, HttpError> {
        let base = Url::parse(base).map_err(|e| HttpError::Url(e.to_string()))?;
        let mut client = Self::detached()?;
        client.base = Some(base);
        Ok(client)
    }

    /// Construct a client with no base URL; every path must be absolute.
    ///
    /// ```no_run
    /// use precis_http::{HttpClient, HttpError};
    ///
    /// let client = HttpClient::detached()?.with_user_agent("Mozilla/5.0")?;
    /// # Ok::<(), HttpError>(())
    /// ```
    pub fn detached() -> Result<Self, HttpError> {
        let inner = Client::builder()
            .connect_timeout(Duration::from_secs(5))
            .build()
            .map_err(|e| HttpError::Build(e.to_string()))?;
        Ok(Self {
            base: None,
            inner,
            user_agent: None,
            default_timeout: Duration::from_secs(15),
        })
    }

    /// Override the default timeout returned by [`HttpClient::new`].
    ///
    /// ```no_run
    /// use precis_http::{HttpClient, HttpError};
    /// use std::time::Duration;
    ///
    /// let client = HttpClient::new("https://api.example.com")?
    ///     .with_timeout(Duration::from_secs(2));
    /// assert_eq!(client.default_timeout, Duration::from_secs(2));
    /// # Ok::<(), HttpError>(())
    /// ```
    pub fn with_timeout(mut self, dur: Duration) -> Self {
        self.default_timeout = dur;
        self
    }

    /// Send `User-Agent: <ua>` on every request.
    pub fn with_user_agent(mut self, ua: &str) -> Result<Self, HttpError> {
        let value = HeaderValue::from_str(ua)
            .map_err(|e| HttpError::Build(format!("invalid User-Agent: {e}")))?;
        self.user_agent = Some(value);
        Ok(self)
    }

    /// POST JSON using optional Bearer auth.
    pub async fn post_json<B, T>(
        &self,
        path: &str,
        bearer: Option<&str>,
        body: &B,
    ) -> Result<T, HttpError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let auth = bearer.map(Auth::Bearer);
        let opts = RequestOpts {
            auth,
            ..Default::default()
        };
        self.post_json_opts(path, body, opts).await
    }

    /// GET JSON with per-request options (headers/query/auth/timeout).
    pub async fn get_json<T>(&self, path: &str, opts: RequestOpts<'_>) -> Result<T, HttpError>
    where
        T: DeserializeOwned,
    {
        let raw = self.send::<()>(Method::GET, path, None, opts).await?;
        decode_json(&raw)
    }

    /// POST JSON with per-request options (headers/query/auth/timeout).
    pub async fn post_json_opts<B, T>(
        &self,
        path: &str,
        body: &B,
        opts: RequestOpts<'_>,
    ) -> Result<T, HttpError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let raw = self.send(Method::POST, path, Some(body), opts).await?;
        decode_json(&raw)
    }

    /// GET a document and decode it as text (charset from `Content-Type`,
    /// then `<meta charset>`).
    ///
    /// Any non-2xx status is returned as [`HttpError::Api`].
    pub async fn get_text(
        &self,
        path: &str,
        opts: RequestOpts<'_>,
    ) -> Result<TextResponse, HttpError> {
        let raw = self.send::<()>(Method::GET, path, None, opts).await?;
        let content_type = raw
            .headers
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        let body = decode_text(&raw.bytes, content_type.as_deref());
        Ok(TextResponse {
            url: raw.url,
            status: raw.status,
            content_type,
            body,
        })
    }

    fn resolve(&self, path: &str, allow_absolute: bool) -> Result<Url, HttpError> {
        match &self.base {
            Some(base) => {
                if allow_absolute {
                    if let Ok(abs) = Url::parse(path) {
                        return Ok(abs);
                    }
                }
                base.join(path).map_err(|e| HttpError::Url(e.to_string()))
            }
            None => Url::parse(path).map_err(|e| HttpError::Url(format!("{path}: {e}"))),
        }
    }

    // ==============================
    // Core request implementation
    // ==============================

    async fn send<B>(
        &self,
        method: Method,
        path: &str,
        body: Option<&B>,
        opts: RequestOpts<'_>,
    ) -> Result<RawResponse, HttpError>
    where
        B: Serialize + ?Sized,
    {
        let url = self.resolve(path, opts.allow_absolute)?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(HttpError::Url(format!(
                "unsupported scheme `{}` in {}",
                url.scheme(),
                url
            )));
        }

        let mut rb = self.inner.request(method.clone(), url.clone());

        let timeout = opts.timeout.unwrap_or(self.default_timeout);
        rb = rb.timeout(timeout);

        // body (serialize up front so we can log exact bytes)
        let mut request_body_bytes: Option<Vec<u8>> = None;
        if let Some(b) = body {
            let bytes = serde_json::to_vec(b).map_err(|e| HttpError::Build(e.to_string()))?;
            request_body_bytes = Some(bytes.clone());
            rb = rb
                .header(reqwest::header::CONTENT_TYPE, "application/json")
                .body(bytes);
        }

        let mut merged = HeaderMap::new();
        if let Some(ua) = &self.user_agent {
            merged.insert(USER_AGENT, ua.clone());
        }
        if let Some(hdrs) = &opts.headers {
            for (k, v) in hdrs.iter() {
                merged.insert(k, v.clone());
            }
        }
        rb = rb.headers(merged.clone());

        if let Some(Auth::Bearer(tok)) = opts.auth {
            rb = rb.bearer_auth(sanitize_api_key(tok)?);
        }

        // ----- Safe request logging (pre-send) -----
        let auth_kind = opts.auth.as_ref().map(Auth::kind).unwrap_or("none");
        let (host_path, redacted_q) = redact_query(&url);

        let req_id = format!("r{}", uuid::Uuid::new_v4().simple());

        tracing::debug!(
            req_id=%req_id,
            method=%method,
            host_path=%host_path,
            query=?redacted_q,
            timeout_ms=timeout.as_millis() as u64,
            auth_kind,
            has_body=%body.is_some(),
            "http.request.start"
        );

        if raw_enabled() {
            let curl = make_curl(&method, &url, &merged, request_body_bytes.as_deref());
            tracing::debug!(target: "http.raw", %req_id, %curl, "request");
        }

        // ----- Send -----
        let t0 = std::time::Instant::now();
        let resp = rb.send().await.map_err(|err| {
            let message = describe_reqwest_error(&err);
            tracing::warn!(req_id=%req_id, message=%message, "http.network_error.send");
            HttpError::Network(message)
        })?;
        let status = resp.status();
        let final_url = resp.url().clone();
        let headers = resp.headers().clone();
        let bytes = resp.bytes().await.map_err(|err| {
            let message = describe_reqwest_error(&err);
            tracing::warn!(req_id=%req_id, message=%message, "http.network_error.body");
            HttpError::Network(message)
        })?;
        let dur_ms = t0.elapsed().as_millis() as u64;

        let req_hdr_id = headers
            .get("x-request-id")
            .or_else(|| headers.get("x-correlation-id"))
            .and_then(|v| v.to_str().ok())
            .unwrap_or("-")
            .to_string();

        tracing::debug!(
            req_id=%req_id,
            %status,
            duration_ms=dur_ms,
            body_len=bytes.len(),
            x_request_id=%req_hdr_id,
            "http.response.headers"
        );

        if raw_enabled() {
            let hdrs = redact_headers(&headers);
            let truncated = bytes.len() > RAW_MAX_BODY;
            let text = String::from_utf8_lossy(&bytes[..bytes.len().min(RAW_MAX_BODY)]);
            tracing::info!(
                target:"http.raw",
                %req_id,
                status=%status,
                duration_ms=dur_ms,
                headers=?hdrs,
                body=%text,
                truncated
            );
        }

        if status.is_success() {
            return Ok(RawResponse {
                req_id,
                url: final_url,
                status,
                headers,
                bytes: bytes.to_vec(),
            });
        }

        let message = extract_error_message_multi(&bytes);
        tracing::warn!(
            req_id=%req_id,
            %status,
            message=%message,
            x_request_id=%req_hdr_id,
            body_snippet=%snip_body(&bytes),
            "http.error"
        );
        Err(HttpError::Api {
            status,
            message,
            request_id: req_hdr_id,
        })
    }
}

struct RawResponse {
    req_id: String,
    url: Url,
    status: StatusCode,
    headers: HeaderMap,
    bytes: Vec<u8>,
}

// ==============================
// Helpers
// ==============================

fn decode_json<T: DeserializeOwned>(raw: &RawResponse) -> Result<T, HttpError> {
    serde_json::from_slice::<T>(&raw.bytes).map_err(|e| {
        let snippet = snip_body(&raw.bytes);
        tracing::warn!(
            req_id=%raw.req_id,
            serde_line=%e.line(),
            serde_col=%e.column(),
            serde_err=%e.to_string(),
            body_snippet=%snippet,
            "http.response.decode_error"
        );
        HttpError::Decode(e.to_string(), snippet)
    })
}

/// Decode a fetched document. The label comes from the `Content-Type`
/// charset, then from a `<meta charset>` near the top of the document, and
/// defaults to UTF-8. A byte order mark overrides both.
fn decode_text(bytes: &[u8], content_type: Option<&str>) -> String {
    let encoding = content_type
        .and_then(charset_param)
        .or_else(|| sniff_meta_charset(bytes))
        .and_then(|label| Encoding::for_label(label.as_bytes()))
        .unwrap_or(UTF_8);
    let (text, used, malformed) = encoding.decode(bytes);
    if malformed {
        tracing::debug!(encoding = used.name(), "http.decode.replaced_malformed");
    }
    text.into_owned()
}

fn charset_param(content_type: &str) -> Option<String> {
    content_type.split(';').skip(1).find_map(|param| {
        let (name, value) = param.split_once('=')?;
        name.trim()
            .eq_ignore_ascii_case("charset")
            .then(|| value.trim().trim_matches(|c| c == '"' || c == '\'').to_string())
    })
}

/// Bytes scanned for a `<meta>` charset declaration.
const META_SNIFF_LEN: usize = 1024;

/// Label from `<meta charset=..>` or `<meta http-equiv content="..; charset=..">`.
fn sniff_meta_charset(bytes: &[u8]) -> Option<String> {
    let head = &bytes[..bytes.len().min(META_SNIFF_LEN)];
    let head = String::from_utf8_lossy(head).to_ascii_lowercase();
    let mut rest = head.as_str();
    while let Some(at) = rest.find("<meta") {
        rest = &rest[at + "<meta".len()..];
        let tag = &rest[..rest.find('>').unwrap_or(rest.len())];
        if let Some(pos) = tag.find("charset=") {
            let label: String = tag[pos + "charset=".len()..]
                .trim_start_matches(|c| c == '"' || c == '\'')
                .chars()
                .take_while(|c| !matches!(c, '"' | '\'' | ';' | '/' | '>') && !c.is_whitespace())
                .collect();
            if !label.is_empty() {
                return Some(label);
            }
        }
    }
    None
}

fn describe_reqwest_error(err: &reqwest::Error) -> String {
    let kind = if err.is_timeout() {
        "timeout"
    } else if err.is_connect() {
        "connect"
    } else if err.is_redirect() {
        "redirect"
    } else if err.is_body() || err.is_decode() {
        "body"
    } else {
        "request"
    };
    let mut message = format!("{kind}: {err}");
    let mut source = std::error::Error::source(err);
    while let Some(cause) = source {
        message.push_str(&format!(": {cause}"));
        source = cause.source();
    }
    message
}

fn extract_error_message_multi(body: &[u8]) -> String {
    // OpenAI style: {"error":{"message":"..."}}
    #[derive(Deserialize)]
    struct OpenAiEnv {
        error: OpenAiDetail,
    }
    #[derive(Deserialize)]
    struct OpenAiDetail {
        message: String,
    }

    // Generic: {"message":"..."} or {"detail":"..."} or {"error":"..."}
    #[derive(Deserialize)]
    struct Msg {
        #[serde(default)]
        message: String,
        #[serde(default)]
        detail: String,
        #[serde(default)]
        error: String,
    }

    if let Ok(env) = serde_json::from_slice::<OpenAiEnv>(body) {
        return env.error.message;
    }
    if let Ok(m) = serde_json::from_slice::<Msg>(body) {
        if !m.message.is_empty() {
            return m.message;
        }
        if !m.detail.is_empty() {
            return m.detail;
        }
        if !m.error.is_empty() {
            return m.error;
        }
    }
    snip_body(body)
}

fn floor_char_boundary(s: &str, max: usize) -> usize {
    let mut idx = max.min(s.len());
    while !s.is_char_boundary(idx) {
        idx -= 1;
    }
    idx
}

fn snip_body(body: &[u8]) -> String {
    let mut snip = String::from_utf8_lossy(body).to_string();
    if snip.len() > 500 {
        snip.truncate(floor_char_boundary(&snip, 500));
        snip.push_str("...");
    }
    snip
}

/// Normalise an API key for use in a bearer header.
///
/// Strips quotes and whitespace picked up from `.env` files and rejects keys
/// that could never form a valid header.
///
/// ```
/// assert_eq!(precis_http::sanitize_api_key(" \"sk-abc\"\n").unwrap(), "sk-abc");
/// assert!(precis_http::sanitize_api_key("sk-\u{e9}").is_err());
/// ```
pub fn sanitize_api_key(raw: &str) -> Result<String, HttpError> {
    let mut s = raw
        .trim()
        .trim_matches(|c| c == '"' || c == '\'')
        .to_string();

    s.retain(|ch| !ch.is_ascii_whitespace());

    if s.is_empty() {
        return Err(HttpError::Build("API key is empty".into()));
    }
    if !s.is_ascii() {
        return Err(HttpError::Build("API key contains non-ASCII bytes".into()));
    }
    if s.bytes().any(|b| b < 0x20 || b == 0x7F) {
        return Err(HttpError::Build(
            "API key contains control characters".into(),
        ));
    }

    HeaderValue::from_str(&format!("Bearer {}", s))
        .map_err(|e| HttpError::Build(format!("invalid Authorization header: {e}")))?;
    Ok(s)
}

fn redact_query(url: &Url) -> (String, Vec<(String, String)>) {
    let host_path = format!("{}{}", url.host_str().unwrap_or("-"), url.path());
    let redacted = url
        .query_pairs()
        .map(|(k, v)| {
            let k = k.to_string();
            let v = v.to_string();
            let secret = is_secret_key(&k);
            (k, if secret { "<redacted>".into() } else { v })
        })
        .collect::<Vec<_>>();
    (host_path, redacted)
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[test]
    fn openai_error_message_is_extracted() {
        let body = br#"{"error":{"message":"You exceeded your current quota","type":"insufficient_quota"}}"#;
        assert_eq!(
            extract_error_message_multi(body),
            "You exceeded your current quota"
        );
    }

    #[test]
    fn plain_body_falls_back_to_snippet() {
        assert_eq!(extract_error_message_multi(b"bad gateway"), "bad gateway");
    }

    #[test]
    fn curl_redacts_secrets() {
        let url = Url::parse("https://api.example.com/v1/x?api_key=hunter2&q=rust").unwrap();
        let mut headers = HeaderMap::new();
        headers.insert("authorization", HeaderValue::from_static("Bearer sk-live"));
        let curl = make_curl(&Method::GET, &url, &headers, None);
        assert!(!curl.contains("hunter2"));
        assert!(!curl.contains("sk-live"));
        assert!(curl.contains("q=rust"));
    }

    #[test]
    fn charset_labels_follow_whatwg_mapping() {
        let quoted = [0x93, b'q', 0x94];
        assert_eq!(
            decode_text(&quoted, Some("text/html; charset=windows-1252")),
            "\u{201c}q\u{201d}"
        );
        // ISO-8859-1 is an alias of windows-1252, not a byte-to-code-point map.
        assert_eq!(
            decode_text(&quoted, Some("text/html; Charset=\"ISO-8859-1\"")),
            "\u{201c}q\u{201d}"
        );
        assert_eq!(
            decode_text(&[0x63, 0x61, 0x66, 0xE9], Some("text/html; charset=latin1")),
            "café"
        );
        assert_eq!(decode_text("café".as_bytes(), Some("text/html")), "café");
    }

    #[test]
    fn shift_jis_is_decoded() {
        let nihon = [0x93, 0xFA, 0x96, 0x7B];
        assert_eq!(
            decode_text(&nihon, Some("text/html; charset=Shift_JIS")),
            "日本"
        );
    }

    #[test]
    fn meta_charset_is_used_without_header_charset() {
        let mut doc = b"<html><head><meta charset=\"shift_jis\"><title>".to_vec();
        doc.extend_from_slice(&[0x93, 0xFA, 0x96, 0x7B]);
        doc.extend_from_slice(b"</title></head></html>");
        assert!(decode_text(&doc, Some("text/html")).contains("<title>日本</title>"));

        let mut legacy =
            b"<meta http-equiv=\"Content-Type\" content=\"text/html; charset=windows-1252\">"
                .to_vec();
        legacy.extend_from_slice(&[0x93, b'q', 0x94]);
        assert!(decode_text(&legacy, None).ends_with("\u{201c}q\u{201d}"));
    }

    #[test]
    fn header_charset_wins_over_meta() {
        let doc = "<meta charset=\"windows-1252\"><p>日本</p>";
        assert_eq!(
            decode_text(doc.as_bytes(), Some("text/html; charset=utf-8")),
            doc
        );
    }

    #[test]
    fn unknown_label_falls_back_to_utf8() {
        assert_eq!(
            decode_text("naïve".as_bytes(), Some("text/html; charset=x-made-up")),
            "naïve"
        );
    }

    #[test]
    fn snip_respects_char_boundaries() {
        let long = "é".repeat(400);
        let snip = snip_body(long.as_bytes());
        assert!(snip.ends_with("..."));
    }

    #[test]
    fn detached_client_requires_absolute_urls() {
        let client = HttpClient::detached().unwrap();
        assert!(matches!(
            client.resolve("relative/path", false),
            Err(HttpError::Url(_))
        ));
        assert!(client.resolve("https://example.com/a", false).is_ok());
    }

    #[tokio::test]
    async fn get_text_sends_user_agent() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/page"))
            .and(header("user-agent", "Mozilla/5.0"))
            .respond_with(
                ResponseTemplate::new(200)
                    .insert_header("content-type", "text/html; charset=utf-8")
                    .set_body_string("<p>hi</p>"),
            )
            .expect(1)
            .mount(&server)
            .await;

        let client = HttpClient::detached()
            .unwrap()
            .with_user_agent("Mozilla/5.0")
            .unwrap();
        let resp = client
            .get_text(&format!("{}/page", server.uri()), RequestOpts::default())
            .await
            .unwrap();
        assert_eq!(resp.body, "<p>hi</p>");
        assert_eq!(resp.status, StatusCode::OK);
    }

    #[tokio::test]
    async fn error_status_is_not_retried() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .respond_with(
                ResponseTemplate::new(503)
                    .set_body_string(r#"{"error":{"message":"overloaded"}}"#),
            )
            .expect(1)
            .mount(&server)
            .await;

        let client = HttpClient::new(&format!("{}/v1/", server.uri())).unwrap();
        let err = client
            .post_json::<_, serde_json::Value>(
                "chat/completions",
                Some("sk-test"),
                &serde_json::json!({}),
            )
            .await
            .unwrap_err();
        assert_eq!(err.status(), Some(StatusCode::SERVICE_UNAVAILABLE));
        assert!(err.to_string().contains("overloaded"));
    }
}
