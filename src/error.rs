//! Error types for the WeCom client.
//!
//! This module defines `WecomError`, the unified error type returned by
//! every operation. Variants follow the three failure families of the API:
//! transport failures, decode failures and application errors signalled by
//! a non-zero `errcode`.
//!
//! # Security
//!
//! The corp secret travels as a query parameter of the token call, so any
//! text that may echo a URL back (HTTP error bodies in particular) is run
//! through `sanitize_message()` before it is stored in an error.

use std::time::Duration;
use thiserror::Error;

use crate::models::ErrCode;

/// Well-known WeCom error codes.
pub mod codes {
    /// Success response.
    pub const SUCCESS: i64 = 0;
    /// System busy.
    pub const SYSTEM_BUSY: i64 = -1;
    /// Invalid credential (corp secret or token).
    pub const INVALID_CREDENTIAL: i64 = 40001;
    /// Invalid corp id.
    pub const INVALID_CORP_ID: i64 = 40013;
    /// Invalid access token.
    pub const INVALID_ACCESS_TOKEN: i64 = 40014;
    /// Access token expired.
    pub const ACCESS_TOKEN_EXPIRED: i64 = 42001;
    /// API frequency limit reached.
    pub const API_FREQ_OUT_OF_LIMIT: i64 = 45009;
    /// User not found in the directory.
    pub const USER_NOT_FOUND: i64 = 60111;
}

/// Unified error type for all WeCom operations.
#[derive(Error, Debug)]
pub enum WecomError {
    /// Configuration error - missing or invalid settings.
    #[error("configuration error: {0}")]
    Config(String),

    /// HTTP request failed during transmission (DNS, connect, read).
    #[error("HTTP request failed: {0}")]
    Http(#[source] reqwest::Error),

    /// HTTP client initialization failed.
    #[error("HTTP client error: {0}")]
    HttpClient(#[source] reqwest::Error),

    /// HTTP response returned a status outside the 2xx range.
    #[error("StatusCode is {status}, Error: {body}")]
    HttpStatus {
        /// The HTTP status code returned.
        status: reqwest::StatusCode,
        /// The response body text, verbatim except that the corp secret
        /// is replaced with `[REDACTED]`.
        body: String,
    },

    /// Request exceeded the client's timeout ceiling.
    #[error("request timed out after {duration:?} ({operation})")]
    Timeout {
        /// How long we waited before giving up.
        duration: Duration,
        /// The operation that timed out, e.g. `GET user/get`.
        operation: String,
    },

    /// A response body could not be decoded.
    ///
    /// The message is fixed per operation; the serde diagnostic is kept
    /// as the error source.
    #[error("{operation} failed")]
    Decode {
        /// Human-readable operation name, e.g. `get department`.
        operation: &'static str,
        /// The underlying decode failure.
        #[source]
        source: serde_json::Error,
    },

    /// A request body could not be serialized.
    #[error("JSON serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// WeCom returned a non-zero `errcode`.
    #[error("WeCom API error {code}: {message}")]
    Api {
        /// The normalized error code.
        code: ErrCode,
        /// The `errmsg` field from the response.
        message: String,
    },

    /// The token endpoint reported success but returned no token.
    #[error("get access_token failed: response did not include a token")]
    EmptyToken,

    /// Input validation failed.
    #[error("validation error: {0}")]
    Validation(String),
}

impl WecomError {
    /// Creates a configuration error for a missing environment variable.
    pub fn missing_env(var_name: &str) -> Self {
        WecomError::Config(format!(
            "missing required environment variable: {}",
            var_name
        ))
    }

    /// Creates a configuration error for an invalid value.
    pub fn invalid_config(message: impl Into<String>) -> Self {
        WecomError::Config(message.into())
    }

    /// Creates a validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        WecomError::Validation(message.into())
    }

    /// Creates a timeout error.
    pub fn timeout(duration: Duration, operation: impl Into<String>) -> Self {
        WecomError::Timeout {
            duration,
            operation: operation.into(),
        }
    }

    /// Creates a decode error for the named operation.
    pub fn decode(operation: &'static str, source: serde_json::Error) -> Self {
        WecomError::Decode { operation, source }
    }

    /// Creates an application error from a response envelope.
    pub fn api(code: ErrCode, message: impl Into<String>) -> Self {
        WecomError::Api {
            code,
            message: message.into(),
        }
    }

    /// Returns true if the failure happened before a response could be decoded:
    /// network failures, timeouts and non-2xx statuses.
    #[must_use]
    pub fn is_transport(&self) -> bool {
        matches!(
            self,
            WecomError::Http(_) | WecomError::Timeout { .. } | WecomError::HttpStatus { .. }
        )
    }

    /// Returns true if WeCom answered with a non-zero `errcode`.
    #[must_use]
    pub fn is_api(&self) -> bool {
        matches!(self, WecomError::Api { .. })
    }

    /// Returns the application error code, if this is an API error.
    #[must_use]
    pub fn api_code(&self) -> Option<&ErrCode> {
        match self {
            WecomError::Api { code, .. } => Some(code),
            _ => None,
        }
    }

    /// Returns true if WeCom rejected the access token or the credentials behind it.
    #[must_use]
    pub fn is_token_rejected(&self) -> bool {
        matches!(
            self.api_code().and_then(ErrCode::value),
            Some(codes::INVALID_CREDENTIAL)
                | Some(codes::INVALID_ACCESS_TOKEN)
                | Some(codes::ACCESS_TOKEN_EXPIRED)
        )
    }

    /// Replaces every occurrence of `secret` in `message` with `[REDACTED]`.
    #[must_use]
    pub fn sanitize_message(message: &str, secret: &str) -> String {
        if secret.is_empty() {
            return message.to_string();
        }
        message.replace(secret, "[REDACTED]")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn decode_failure() -> serde_json::Error {
        serde_json::from_str::<serde_json::Value>("{not json").unwrap_err()
    }

    #[test]
    fn test_missing_env_error() {
        let err = WecomError::missing_env("WECOM_CORP_SECRET");
        assert!(err.to_string().contains("WECOM_CORP_SECRET"));
        assert!(err.to_string().contains("missing"));
    }

    #[test]
    fn test_http_status_display_carries_code_and_body() {
        let err = WecomError::HttpStatus {
            status: reqwest::StatusCode::BAD_GATEWAY,
            body: "upstream down".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("502"));
        assert!(msg.contains("upstream down"));
        assert!(err.is_transport());
    }

    #[test]
    fn test_decode_error_has_fixed_message_and_source() {
        use std::error::Error as _;

        let err = WecomError::decode("get department", decode_failure());
        assert_eq!(err.to_string(), "get department failed");
        assert!(err.source().is_some());
        assert!(!err.is_transport());
    }

    #[test]
    fn test_api_error() {
        let err = WecomError::api(ErrCode::Code(60111), "userid not found");
        assert!(err.is_api());
        assert_eq!(err.api_code(), Some(&ErrCode::Code(60111)));
        assert!(err.to_string().contains("60111"));
        assert!(!err.is_token_rejected());
    }

    #[test]
    fn test_token_rejected_codes() {
        for code in [
            codes::INVALID_CREDENTIAL,
            codes::INVALID_ACCESS_TOKEN,
            codes::ACCESS_TOKEN_EXPIRED,
        ] {
            assert!(WecomError::api(ErrCode::Code(code), "").is_token_rejected());
        }
        assert!(!WecomError::validation("x").is_token_rejected());
    }

    #[test]
    fn test_timeout_error() {
        let err = WecomError::timeout(Duration::from_secs(600), "GET department/list");
        let msg = err.to_string();
        assert!(msg.contains("timed out"));
        assert!(msg.contains("600s"));
        assert!(err.is_transport());
    }

    #[test]
    fn test_sanitize_message_removes_secret() {
        let secret = "super_secret_12345";
        let message = format!("bad request: corpsecret={}", secret);
        let sanitized = WecomError::sanitize_message(&message, secret);
        assert!(!sanitized.contains(secret));
        assert!(sanitized.contains("[REDACTED]"));
    }

    #[test]
    fn test_sanitize_message_empty_secret() {
        let message = "Some error message";
        assert_eq!(WecomError::sanitize_message(message, ""), message);
    }
}
