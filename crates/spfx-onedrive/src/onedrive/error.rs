//! Error types for the SharePoint / OneDrive data layer.
//!
//! Transport-level calls return `OneDriveResult<T>`.  The two picker
//! operations absorb those errors and report typed failure values instead:
//! [`ResolutionFailure`] for root resolution and [`ListFailure`] for paged
//! listing.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Convenience alias.
pub type OneDriveResult<T> = Result<T, OneDriveError>;

/// Error codes for SharePoint REST calls.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OneDriveErrorCode {
    /// Token rejected (HTTP 401).
    AuthFailed,
    /// Caller lacks rights on the web or list (HTTP 403).
    InsufficientPermissions,
    /// Web, list or folder not found (HTTP 404).
    NotFound,
    /// Throttled (HTTP 429).
    RateLimited,
    /// Bad request / invalid parameter.
    InvalidRequest,
    /// Network / connectivity error.
    NetworkError,
    /// (De)serialization error.
    SerializationError,
    /// Catch-all internal error.
    InternalError,
}

impl fmt::Display for OneDriveErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self)
    }
}

/// Structured transport error.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OneDriveError {
    pub code: OneDriveErrorCode,
    pub message: String,
    pub status: Option<u16>,
    pub sp_error_code: Option<String>,
}

impl fmt::Display for OneDriveError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{:?}] {}", self.code, self.message)?;
        if let Some(ref sc) = self.sp_error_code {
            write!(f, " (sharepoint: {})", sc)?;
        }
        Ok(())
    }
}

impl std::error::Error for OneDriveError {}

impl OneDriveError {
    /// Create from a code + message.
    pub fn new(code: OneDriveErrorCode, msg: impl Into<String>) -> Self {
        Self {
            code,
            message: msg.into(),
            status: None,
            sp_error_code: None,
        }
    }

    /// Shortcut: network error.
    pub fn network(msg: impl Into<String>) -> Self {
        Self::new(OneDriveErrorCode::NetworkError, msg)
    }

    /// Shortcut: internal error.
    pub fn internal(msg: impl Into<String>) -> Self {
        Self::new(OneDriveErrorCode::InternalError, msg)
    }

    /// Build an error from a non-success SharePoint response.
    pub fn from_response(status: u16, body: &str) -> Self {
        let code = match status {
            401 => OneDriveErrorCode::AuthFailed,
            403 => OneDriveErrorCode::InsufficientPermissions,
            404 => OneDriveErrorCode::NotFound,
            429 => OneDriveErrorCode::RateLimited,
            _ if status >= 500 => OneDriveErrorCode::InternalError,
            _ => OneDriveErrorCode::InvalidRequest,
        };

        let (sp_code, sp_message) = Self::parse_sp_error_body(body);
        let message =
            sp_message.unwrap_or_else(|| format!("SharePoint REST error (HTTP {})", status));

        Self {
            code,
            message,
            status: Some(status),
            sp_error_code: sp_code,
        }
    }

    /// Extract `{ "odata.error": { "code": "...", "message": { "value": "..." } } }`.
    /// Verbose responses use `error` instead of `odata.error`.
    fn parse_sp_error_body(body: &str) -> (Option<String>, Option<String>) {
        let Ok(v) = serde_json::from_str::<serde_json::Value>(body) else {
            return (None, None);
        };
        let err = if v["odata.error"].is_object() {
            &v["odata.error"]
        } else {
            &v["error"]
        };
        let code = err["code"].as_str().map(String::from);
        let msg = err["message"]["value"]
            .as_str()
            .or_else(|| err["message"].as_str())
            .map(String::from);
        (code, msg)
    }
}

impl From<reqwest::Error> for OneDriveError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::network(format!("Request timed out: {}", err))
        } else if err.is_connect() {
            Self::network(format!("Connection failed: {}", err))
        } else {
            Self::internal(format!("HTTP error: {}", err))
        }
    }
}

impl From<serde_json::Error> for OneDriveError {
    fn from(err: serde_json::Error) -> Self {
        Self::new(
            OneDriveErrorCode::SerializationError,
            format!("JSON error: {}", err),
        )
    }
}

// ═══════════════════════════════════════════════════════════════════════
//  Operation failures
// ═══════════════════════════════════════════════════════════════════════

/// Why the personal-storage root could not be resolved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "reason", rename_all = "camelCase")]
pub enum ResolutionFailure {
    /// The profile carried no `FollowPersonalSiteUrl`.
    NoPersonalUrl,
    /// A lookup failed in transport or returned a non-success status.
    RequestFailed {
        status: Option<u16>,
        message: String,
    },
    /// The remote web has no personal documents library.
    EmptyResult,
}

impl fmt::Display for ResolutionFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoPersonalUrl => write!(f, "no personal url"),
            Self::RequestFailed {
                status: Some(status),
                message,
            } => write!(f, "request failed: Status='{}' {}", status, message),
            Self::RequestFailed {
                status: None,
                message,
            } => write!(f, "request failed: {}", message),
            Self::EmptyResult => write!(f, "empty result"),
        }
    }
}

impl std::error::Error for ResolutionFailure {}

impl From<OneDriveError> for ResolutionFailure {
    fn from(err: OneDriveError) -> Self {
        Self::RequestFailed {
            status: err.status,
            message: err.to_string(),
        }
    }
}

/// Why a listing page could not be produced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "reason", rename_all = "camelCase")]
pub enum ListFailure {
    /// The personal-storage root is needed for the list URL.
    Resolution { failure: ResolutionFailure },
    /// Transport failure or non-success status.
    RequestFailed {
        status: Option<u16>,
        message: String,
    },
    /// Body is not a `ListData.Row` payload.
    MalformedResponse { message: String },
}

impl fmt::Display for ListFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Resolution { failure } => write!(f, "root resolution failed: {}", failure),
            Self::RequestFailed {
                status: Some(status),
                message,
            } => write!(f, "request failed: Status='{}' {}", status, message),
            Self::RequestFailed {
                status: None,
                message,
            } => write!(f, "request failed: {}", message),
            Self::MalformedResponse { message } => write!(f, "malformed response: {}", message),
        }
    }
}

impl std::error::Error for ListFailure {}

impl From<OneDriveError> for ListFailure {
    fn from(err: OneDriveError) -> Self {
        Self::RequestFailed {
            status: err.status,
            message: err.to_string(),
        }
    }
}

impl From<ResolutionFailure> for ListFailure {
    fn from(failure: ResolutionFailure) -> Self {
        Self::Resolution { failure }
    }
}

// ═══════════════════════════════════════════════════════════════════════
//  Tests
// ═══════════════════════════════════════════════════════════════════════
