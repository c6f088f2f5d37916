use thiserror::Error;

/// Generic message used when a failed response carries nothing better.
const FALLBACK_FAILURE_MESSAGE: &str = "Request failed";

/// Maximum length for response bodies quoted in log lines
const MAX_ERROR_BODY_LENGTH: usize = 500;

/// Normalized failure of a request. Every variant carries the HTTP status
/// (0 when no response was received) and a human-readable message.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ApiError {
    #[error("{message}")]
    EmptyResponse { status: u16, message: String },

    #[error("{message}")]
    InvalidFormat { status: u16, message: String },

    #[error("{message}")]
    RequestFailed { status: u16, message: String },

    #[error("{message}")]
    NetworkError { status: u16, message: String },
}

impl ApiError {
    pub fn empty_response(status: u16) -> Self {
        ApiError::EmptyResponse {
            status,
            message: "Empty response from server".to_string(),
        }
    }

    pub fn invalid_format(status: u16) -> Self {
        ApiError::InvalidFormat {
            status,
            message: format!(
                "Invalid response format: Server returned non-JSON data. Status: {}",
                status
            ),
        }
    }

    /// A JSON body that does not match the schema expected for an endpoint.
    pub fn unexpected_schema(status: u16, path: &str, detail: &str) -> Self {
        ApiError::InvalidFormat {
            status,
            message: format!("Unexpected response from {}: {}", path, detail),
        }
    }

    /// Build a `RequestFailed`, preferring the server's message, then the
    /// status text, then a generic fallback.
    pub fn request_failed(status: u16, message: Option<&str>, status_text: Option<&str>) -> Self {
        let message = message
            .filter(|m| !m.is_empty())
            .or(status_text.filter(|t| !t.is_empty()))
            .unwrap_or(FALLBACK_FAILURE_MESSAGE)
            .to_string();
        ApiError::RequestFailed { status, message }
    }

    /// The server issued a token but the session store could not keep it.
    /// Status is 0 because the HTTP exchange itself succeeded.
    pub fn session_not_saved(detail: &str) -> Self {
        ApiError::RequestFailed {
            status: 0,
            message: format!("Failed to save session: {}", detail),
        }
    }

    pub fn network() -> Self {
        ApiError::NetworkError {
            status: 0,
            message: "Network error".to_string(),
        }
    }

    pub fn status(&self) -> u16 {
        match self {
            ApiError::EmptyResponse { status, .. }
            | ApiError::InvalidFormat { status, .. }
            | ApiError::RequestFailed { status, .. }
            | ApiError::NetworkError { status, .. } => *status,
        }
    }

    pub fn message(&self) -> &str {
        match self {
            ApiError::EmptyResponse { message, .. }
            | ApiError::InvalidFormat { message, .. }
            | ApiError::RequestFailed { message, .. }
            | ApiError::NetworkError { message, .. } => message,
        }
    }

    pub fn is_unauthorized(&self) -> bool {
        matches!(self, ApiError::RequestFailed { status: 401, .. })
    }

    /// Truncate a response body to avoid logging excessive data
    pub(crate) fn truncate_body(body: &str) -> String {
        if body.len() <= MAX_ERROR_BODY_LENGTH {
            body.to_string()
        } else {
            let mut end = MAX_ERROR_BODY_LENGTH;
            while !body.is_char_boundary(end) {
                end -= 1;
            }
            format!("{}... (truncated, {} total bytes)", &body[..end], body.len())
        }
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(_: reqwest::Error) -> Self {
        ApiError::network()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_failed_prefers_server_message() {
        let err = ApiError::request_failed(400, Some("Title is required"), Some("Bad Request"));
        assert_eq!(err.message(), "Title is required");
        assert_eq!(err.status(), 400);
    }

    #[test]
    fn test_request_failed_falls_back_to_status_text() {
        let err = ApiError::request_failed(503, None, Some("Service Unavailable"));
        assert_eq!(err.message(), "Service Unavailable");

        let err = ApiError::request_failed(503, Some(""), Some("Service Unavailable"));
        assert_eq!(err.message(), "Service Unavailable");
    }

    #[test]
    fn test_request_failed_generic_fallback() {
        let err = ApiError::request_failed(599, None, None);
        assert_eq!(err.message(), "Request failed");
    }

    #[test]
    fn test_network_error_has_zero_status() {
        let err = ApiError::network();
        assert_eq!(err.status(), 0);
        assert_eq!(err.to_string(), "Network error");
    }

    #[test]
    fn test_invalid_format_mentions_status() {
        let err = ApiError::invalid_format(200);
        assert!(err.message().contains("Status: 200"));
    }

    #[test]
    fn test_is_unauthorized() {
        assert!(ApiError::request_failed(401, None, None).is_unauthorized());
        assert!(!ApiError::empty_response(401).is_unauthorized());
        assert!(!ApiError::request_failed(403, None, None).is_unauthorized());
    }

    #[test]
    fn test_truncate_body() {
        let short = "short body";
        assert_eq!(ApiError::truncate_body(short), short);

        let long = "x".repeat(600);
        let truncated = ApiError::truncate_body(&long);
        assert!(truncated.starts_with(&"x".repeat(500)));
        assert!(truncated.ends_with("(truncated, 600 total bytes)"));
    }
}
