use reqwest::StatusCode;
use std::path::PathBuf;
use thiserror::Error as ThisError;

#[derive(ThisError, Debug)]
pub enum Error {
    /// The request never produced an HTTP response (connection refused, timeout, TLS, ...)
    #[error("Request to {url} failed: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    /// The server answered with a non-2xx status
    #[error("{method} {path} returned {status}: {message}")]
    Status {
        method: String,
        path: String,
        status: StatusCode,
        message: String,
    },

    /// The body could not be decoded into the expected type
    #[error("Failed to decode response from {path}: {source}")]
    Decode {
        path: String,
        #[source]
        source: serde_json::Error,
    },

    /// The body decoded but violates the response contract
    #[error("Invalid response from {path}: {reason}")]
    InvalidResponse { path: String, reason: String },

    /// The request could not be assembled (e.g. an unparsable MIME type on an upload)
    #[error("Invalid request: {message}")]
    InvalidRequest { message: String },

    /// A URL could not be constructed from the configured base
    #[error("Invalid URL: {message}")]
    Url { message: String },

    /// A local file selected for upload could not be read
    #[error("Failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Configuration is inconsistent or incomplete
    #[error("Config validation: {message}")]
    Config { message: String },

    /// A cached value was stored under this key with a different type
    #[error("Cached value for {key} has an unexpected type")]
    CacheType { key: String },
}

impl Error {
    /// HTTP status of the failed call, if the server answered at all.
    pub fn status_code(&self) -> Option<StatusCode> {
        match self {
            Error::Status { status, .. } => Some(*status),
            Error::Transport { source, .. } => source.status(),
            _ => None,
        }
    }

    pub fn is_not_found(&self) -> bool {
        self.status_code() == Some(StatusCode::NOT_FOUND)
    }

    /// Returns a message suitable for showing to an operator.
    pub fn user_message(&self) -> String {
        match self {
            Error::Transport { source, .. } if source.is_timeout() => "The server did not respond in time".to_string(),
            Error::Transport { .. } => "Could not reach the server".to_string(),
            Error::Status { message, .. } => message.clone(),
            Error::Decode { .. } | Error::InvalidResponse { .. } => "The server returned an unexpected response".to_string(),
            Error::InvalidRequest { message } => message.clone(),
            Error::Url { message } => format!("Invalid address: {message}"),
            Error::Io { path, .. } => format!("Could not read {}", path.display()),
            Error::Config { message } => message.clone(),
            Error::CacheType { .. } => "Internal cache error".to_string(),
        }
    }
}

/// Pull a human readable message out of an error body.
///
/// Accepts `{"message": "..."}`, `{"message": ["a", "b"]}` and `{"error": "..."}`, falling back
/// to the raw text and finally to the canonical reason for the status.
pub(crate) fn server_message(status: StatusCode, body: &str) -> String {
    if let Ok(value) = serde_json::from_str::<serde_json::Value>(body) {
        match value.get("message") {
            Some(serde_json::Value::String(message)) if !message.is_empty() => return message.clone(),
            Some(serde_json::Value::Array(parts)) => {
                let joined = parts.iter().filter_map(|p| p.as_str()).collect::<Vec<_>>().join(", ");
                if !joined.is_empty() {
                    return joined;
                }
            }
            _ => {}
        }
        if let Some(error) = value.get("error").and_then(|e| e.as_str()) {
            return error.to_string();
        }
    }

    let trimmed = body.trim();
    if !trimmed.is_empty() {
        return trimmed.to_string();
    }

    status.canonical_reason().unwrap_or("Unknown error").to_string()
}

/// Type alias for client operation results
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_message_from_string_field() {
        let msg = server_message(StatusCode::NOT_FOUND, r#"{"statusCode":404,"message":"Category not found"}"#);
        assert_eq!(msg, "Category not found");
    }

    #[test]
    fn test_message_from_array_field() {
        let msg = server_message(
            StatusCode::BAD_REQUEST,
            r#"{"message":["name should not be empty","name must be a string"],"error":"Bad Request"}"#,
        );
        assert_eq!(msg, "name should not be empty, name must be a string");
    }

    #[test]
    fn test_message_falls_back_to_error_field() {
        let msg = server_message(StatusCode::PAYLOAD_TOO_LARGE, r#"{"error":"File too large"}"#);
        assert_eq!(msg, "File too large");
    }

    #[test]
    fn test_message_falls_back_to_text_then_reason() {
        assert_eq!(server_message(StatusCode::BAD_GATEWAY, "upstream down\n"), "upstream down");
        assert_eq!(server_message(StatusCode::SERVICE_UNAVAILABLE, ""), "Service Unavailable");
    }

    #[test]
    fn test_status_error_reports_code() {
        let err = Error::Status {
            method: "DELETE".to_string(),
            path: "/categories/missing".to_string(),
            status: StatusCode::NOT_FOUND,
            message: "Category not found".to_string(),
        };
        assert!(err.is_not_found());
        assert_eq!(err.user_message(), "Category not found");
        assert_eq!(err.to_string(), "DELETE /categories/missing returned 404 Not Found: Category not found");
    }
}
