//! API client for communicating with the Nextrep REST API.
//!
//! Every call goes through [`ApiClient::request`], which attaches the
//! session token, marks anonymous calls, and normalizes the response into
//! either an [`ApiResponse`] or an [`ApiError`].

use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use reqwest::header::{self, HeaderMap, HeaderName, HeaderValue};
use reqwest::{Client, Method, Url};
use serde::de::DeserializeOwned;
use serde_json::{json, Value};
use tracing::{debug, warn};

use super::request::{ApiResponse, Payload, RequestOptions};
use super::ApiError;
use crate::auth::{ListenerId, SessionEvents, SessionStore};
use crate::config::Config;

// ============================================================================
// Constants
// ============================================================================

/// Query/body field the backend uses to tell anonymous callers apart
const ANONYMOUS_FIELD: &str = "user_id";

/// Value of `ANONYMOUS_FIELD` for callers without a session
const ANONYMOUS_USER_ID: i64 = -1;

const JSON_CONTENT_TYPE: &str = "application/json";

/// API client for Nextrep.
/// Clone is cheap - reqwest::Client uses Arc internally for connection pooling,
/// and clones share the session store and expiry listeners.
#[derive(Clone)]
pub struct ApiClient {
    client: Client,
    base_url: String,
    session: Arc<dyn SessionStore>,
    events: SessionEvents,
}

impl ApiClient {
    /// Create a new API client. Cookies are never stored or sent.
    pub fn new(base_url: impl Into<String>, session: Arc<dyn SessionStore>) -> Result<Self> {
        let client = Client::builder().build()?;
        Ok(Self::with_http_client(client, base_url, session))
    }

    /// Create a client from the loaded configuration.
    pub fn from_config(config: &Config, session: Arc<dyn SessionStore>) -> Result<Self> {
        let mut builder = Client::builder();
        if let Some(secs) = config.request_timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }
        Ok(Self::with_http_client(
            builder.build()?,
            config.api_base_url(),
            session,
        ))
    }

    /// Create a client around an existing connection pool.
    pub fn with_http_client(
        client: Client,
        base_url: impl Into<String>,
        session: Arc<dyn SessionStore>,
    ) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self {
            client,
            base_url,
            session,
            events: SessionEvents::new(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn session(&self) -> &Arc<dyn SessionStore> {
        &self.session
    }

    /// Register a callback run when the server rejects the session token.
    pub fn on_session_expired<F>(&self, listener: F) -> ListenerId
    where
        F: Fn() + Send + Sync + 'static,
    {
        self.events.subscribe(listener)
    }

    pub fn is_authenticated(&self) -> bool {
        self.session.is_authenticated()
    }

    /// End the session locally. The backend keeps no logout state.
    pub fn logout(&self) -> Result<()> {
        debug!("Logging out");
        self.session.clear()
    }

    /// Store a freshly issued token. If the store rejects it, the session
    /// is left anonymous and the failure is returned.
    pub(crate) fn start_session(&self, token: &str) -> Result<(), ApiError> {
        if let Err(e) = self.session.set_token(token) {
            warn!(error = %e, "Failed to persist session token");
            if let Err(e) = self.session.clear() {
                warn!(error = %e, "Failed to clear session");
            }
            return Err(ApiError::session_not_saved(&format!("{:#}", e)));
        }
        Ok(())
    }

    fn expire_session(&self) {
        warn!("Server rejected session token, clearing session");
        if let Err(e) = self.session.clear() {
            warn!(error = %e, "Failed to clear session");
        }
        self.events.notify_expired();
    }

    /// Build the full URL for a call, including extra query pairs and the
    /// anonymous marker for reads made without a session.
    pub(crate) fn resolve_url(
        &self,
        path: &str,
        options: &RequestOptions,
        anonymous: bool,
    ) -> Result<Url, ApiError> {
        let full = format!("{}{}", self.base_url, normalize_path(path));
        let mut url = Url::parse(&full).map_err(|e| {
            warn!(url = %full, error = %e, "Invalid request URL");
            ApiError::network()
        })?;

        if !options.query.is_empty() {
            let mut pairs = url.query_pairs_mut();
            for (name, value) in &options.query {
                pairs.append_pair(name, value);
            }
        }

        if anonymous
            && is_read(&options.method)
            && !url.query_pairs().any(|(k, _)| k == ANONYMOUS_FIELD)
        {
            url.query_pairs_mut()
                .append_pair(ANONYMOUS_FIELD, &ANONYMOUS_USER_ID.to_string());
        }
        Ok(url)
    }

    /// Perform a call and normalize the outcome.
    ///
    /// A 401 clears the session and notifies expiry listeners before the
    /// error is returned. Nothing is retried.
    pub async fn request(
        &self,
        path: &str,
        mut options: RequestOptions,
    ) -> Result<ApiResponse, ApiError> {
        let token = self.session.token();
        let anonymous = token.is_none();

        let url = self.resolve_url(path, &options, anonymous)?;
        if anonymous {
            mark_anonymous_payload(&mut options.payload);
        }

        // The transport writes the multipart boundary itself
        if matches!(options.payload, Some(Payload::Form(_))) {
            options.remove_header(header::CONTENT_TYPE.as_str());
        } else if options.payload.is_some() && !options.has_header(header::CONTENT_TYPE.as_str()) {
            options
                .headers
                .push((header::CONTENT_TYPE.to_string(), JSON_CONTENT_TYPE.to_string()));
        }

        let headers = build_headers(&options.headers, token.as_deref())?;

        debug!(method = %options.method, url = %url, anonymous = anonymous, "Sending request");

        let mut builder = self
            .client
            .request(options.method.clone(), url.clone())
            .headers(headers);
        builder = match options.payload {
            Some(Payload::Json(ref body)) => builder.body(body.to_string()),
            Some(Payload::Form(ref form)) => builder.multipart(form.to_multipart()?),
            None => builder,
        };

        let response = builder.send().await.map_err(|e| {
            warn!(url = %url, error = %e, "Request failed before a response was received");
            ApiError::network()
        })?;

        let status = response.status();
        let code = status.as_u16();
        let text = response.text().await.map_err(|e| {
            warn!(url = %url, status = code, error = %e, "Failed to read response body");
            ApiError::network()
        })?;

        debug!(url = %url, status = code, bytes = text.len(), "Response received");

        if status == reqwest::StatusCode::UNAUTHORIZED {
            self.expire_session();
            let message = serde_json::from_str::<Value>(&text)
                .ok()
                .and_then(|v| v.get("message").and_then(Value::as_str).map(String::from));
            return Err(ApiError::request_failed(
                code,
                message.as_deref(),
                status.canonical_reason(),
            ));
        }

        let body = if text.trim().is_empty() {
            // Some endpoints (DELETE) answer 200 with no body
            if code == 200 {
                json!({ "message": "Success" })
            } else {
                return Err(ApiError::empty_response(code));
            }
        } else {
            serde_json::from_str::<Value>(&text).map_err(|_| {
                warn!(
                    url = %url,
                    status = code,
                    body = %ApiError::truncate_body(&text),
                    "Response is not JSON"
                );
                ApiError::invalid_format(code)
            })?
        };

        if !status.is_success() {
            let message = body.get("message").and_then(Value::as_str);
            debug!(url = %url, status = code, message = ?message, "Request rejected");
            return Err(ApiError::request_failed(
                code,
                message,
                status.canonical_reason(),
            ));
        }

        Ok(ApiResponse { status: code, body })
    }

    // ===== Typed helpers used by the endpoint modules =====

    pub(crate) async fn get_data<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        self.request(path, RequestOptions::get()).await?.data(path)
    }

    pub(crate) async fn send_data<T: DeserializeOwned>(
        &self,
        path: &str,
        options: RequestOptions,
    ) -> Result<T, ApiError> {
        self.request(path, options).await?.data(path)
    }
}

/// Ensure the path starts with exactly one `/`.
fn normalize_path(path: &str) -> String {
    format!("/{}", path.trim_start_matches('/'))
}

fn is_read(method: &Method) -> bool {
    *method == Method::GET || *method == Method::HEAD
}

/// Add the anonymous marker to JSON objects and forms that lack one.
fn mark_anonymous_payload(payload: &mut Option<Payload>) {
    match payload {
        Some(Payload::Json(Value::Object(map))) => {
            map.entry(ANONYMOUS_FIELD)
                .or_insert_with(|| json!(ANONYMOUS_USER_ID));
        }
        Some(Payload::Json(other)) => {
            debug!(kind = ?json_kind(other), "Non-object JSON payload left unmarked");
        }
        Some(Payload::Form(form)) => {
            if !form.contains(ANONYMOUS_FIELD) {
                form.push_text(ANONYMOUS_FIELD, ANONYMOUS_USER_ID.to_string());
            }
        }
        None => {}
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

fn build_headers(pairs: &[(String, String)], token: Option<&str>) -> Result<HeaderMap, ApiError> {
    let mut headers = HeaderMap::new();
    for (name, value) in pairs {
        let name = HeaderName::from_bytes(name.as_bytes()).map_err(|e| {
            warn!(header = %name, error = %e, "Invalid header name");
            ApiError::network()
        })?;
        let value = HeaderValue::from_str(value).map_err(|e| {
            warn!(header = %name, error = %e, "Invalid header value");
            ApiError::network()
        })?;
        headers.append(name, value);
    }
    if let Some(token) = token {
        let value = HeaderValue::from_str(&format!("Bearer {}", token)).map_err(|e| {
            warn!(error = %e, "Session token is not a valid header value");
            ApiError::network()
        })?;
        headers.insert(header::AUTHORIZATION, value);
    }
    Ok(headers)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::FormData;
    use crate::auth::MemorySessionStore;

    fn client(base: &str) -> ApiClient {
        ApiClient::new(base, Arc::new(MemorySessionStore::new())).unwrap()
    }

    #[test]
    fn test_normalize_path() {
        assert_eq!(normalize_path("feed/posts"), "/feed/posts");
        assert_eq!(normalize_path("/feed/posts"), "/feed/posts");
        assert_eq!(normalize_path("//feed/posts"), "/feed/posts");
        assert_eq!(normalize_path(""), "/");
    }

    #[test]
    fn test_base_url_trailing_slash_is_trimmed() {
        let api = client("http://localhost:3000/");
        assert_eq!(api.base_url(), "http://localhost:3000");
        let url = api
            .resolve_url("assets/1", &RequestOptions::get(), false)
            .unwrap();
        assert_eq!(url.as_str(), "http://localhost:3000/assets/1");
    }

    #[test]
    fn test_anonymous_get_gets_marker_once() {
        let api = client("http://localhost:3000");
        let url = api
            .resolve_url("/feed/posts/post?order=ascending", &RequestOptions::get(), true)
            .unwrap();
        assert_eq!(url.query(), Some("order=ascending&user_id=-1"));

        let url = api
            .resolve_url("/feed/posts/post?user_id=7", &RequestOptions::get(), true)
            .unwrap();
        assert_eq!(url.query(), Some("user_id=7"));
    }

    #[test]
    fn test_authenticated_get_has_no_marker() {
        let api = client("http://localhost:3000");
        let url = api
            .resolve_url("/user/auth/self", &RequestOptions::get(), false)
            .unwrap();
        assert_eq!(url.query(), None);
    }

    #[test]
    fn test_writes_never_get_query_marker() {
        let api = client("http://localhost:3000");
        let url = api
            .resolve_url("/user/follow/follow/3", &RequestOptions::post(), true)
            .unwrap();
        assert_eq!(url.query(), None);
    }

    #[test]
    fn test_extra_query_pairs_are_encoded() {
        let api = client("http://localhost:3000");
        let options = RequestOptions::get().query("search_term", "rust & tea");
        let url = api.resolve_url("/feed/posts/post", &options, false).unwrap();
        assert_eq!(url.query(), Some("search_term=rust+%26+tea"));
    }

    #[test]
    fn test_invalid_base_url_is_network_error() {
        let api = client("not a url");
        let err = api
            .resolve_url("/x", &RequestOptions::get(), false)
            .unwrap_err();
        assert_eq!(err.status(), 0);
        assert!(matches!(err, ApiError::NetworkError { .. }));
    }

    #[test]
    fn test_mark_anonymous_json_merges_field() {
        let mut payload = Some(Payload::Json(json!({"body": "hi"})));
        mark_anonymous_payload(&mut payload);
        assert_eq!(
            payload,
            Some(Payload::Json(json!({"body": "hi", "user_id": -1})))
        );
    }

    #[test]
    fn test_mark_anonymous_keeps_existing_field() {
        let mut payload = Some(Payload::Json(json!({"user_id": 5})));
        mark_anonymous_payload(&mut payload);
        assert_eq!(payload, Some(Payload::Json(json!({"user_id": 5}))));
    }

    #[test]
    fn test_mark_anonymous_form() {
        let mut payload = Some(Payload::Form(FormData::new().text("title", "t")));
        mark_anonymous_payload(&mut payload);
        match payload {
            Some(Payload::Form(form)) => assert_eq!(form.text_value("user_id"), Some("-1")),
            other => panic!("unexpected payload {:?}", other),
        }
    }

    #[test]
    fn test_mark_anonymous_leaves_arrays_alone() {
        let mut payload = Some(Payload::Json(json!([1, 2])));
        mark_anonymous_payload(&mut payload);
        assert_eq!(payload, Some(Payload::Json(json!([1, 2]))));
    }

    #[test]
    fn test_build_headers_adds_bearer() {
        let headers = build_headers(&[("X-Trace".to_string(), "1".to_string())], Some("tok")).unwrap();
        assert_eq!(headers.get(header::AUTHORIZATION).unwrap(), "Bearer tok");
        assert_eq!(headers.get("x-trace").unwrap(), "1");

        let headers = build_headers(&[], None).unwrap();
        assert!(headers.get(header::AUTHORIZATION).is_none());
    }

    #[test]
    fn test_build_headers_keeps_repeated_caller_headers() {
        let pairs = vec![
            ("Accept".to_string(), "application/json".to_string()),
            ("accept".to_string(), "text/plain".to_string()),
            ("Authorization".to_string(), "Basic old".to_string()),
        ];
        let headers = build_headers(&pairs, Some("tok")).unwrap();
        let accepts: Vec<_> = headers.get_all(header::ACCEPT).iter().collect();
        assert_eq!(accepts, vec!["application/json", "text/plain"]);

        // The session token replaces any caller-supplied authorization
        let auth: Vec<_> = headers.get_all(header::AUTHORIZATION).iter().collect();
        assert_eq!(auth, vec!["Bearer tok"]);
    }

    #[test]
    fn test_build_headers_rejects_bad_names() {
        let err = build_headers(&[("bad header".to_string(), "v".to_string())], None).unwrap_err();
        assert_eq!(err.status(), 0);
    }
}
