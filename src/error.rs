//! Error types for ticketlink
//!
//! Provides a unified error type for all client operations, and the
//! symbolic error code vocabulary shared with the server.

use std::borrow::Cow;
use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::protocol::RequestId;

/// Result type alias using ClientError
pub type Result<T> = std::result::Result<T, ClientError>;

/// Boxed lower-level cause carried by wrapping errors
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

// =============================================================================
// Error Codes
// =============================================================================

/// A symbolic error code, transmitted as a string (e.g. `error-io`)
///
/// Codes the client does not know are carried through unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ErrorCode(Cow<'static, str>);

impl ErrorCode {
    pub const PROTOCOL: ErrorCode = ErrorCode::from_static("error-protocol");
    pub const AUTHENTICATION: ErrorCode = ErrorCode::from_static("error-authentication");
    pub const IO: ErrorCode = ErrorCode::from_static("error-io");
    pub const SERIALIZATION: ErrorCode = ErrorCode::from_static("error-serialization");
    pub const HTTP_METHOD: ErrorCode = ErrorCode::from_static("error-http-method");
    pub const HTTP_PARAMETER_NONEXISTENT: ErrorCode =
        ErrorCode::from_static("error-http-parameter-nonexistent");
    pub const HTTP_PARAMETER_INVALID: ErrorCode =
        ErrorCode::from_static("error-http-parameter-invalid");
    pub const HTTP_SIZE_LIMIT: ErrorCode = ErrorCode::from_static("error-http-size-limit");
    pub const OPERATION_NOT_PERMITTED: ErrorCode =
        ErrorCode::from_static("error-operation-not-permitted");
    pub const SECURITY_POLICY_DENIED: ErrorCode =
        ErrorCode::from_static("error-security-policy-denied");

    // Client-local codes, never sent by a server
    pub const INTERRUPTED: ErrorCode = ErrorCode::from_static("error-interrupted");
    pub const CONFIGURATION: ErrorCode = ErrorCode::from_static("error-configuration");
    pub const PAGE_NONEXISTENT: ErrorCode = ErrorCode::from_static("error-page-nonexistent");
    pub const SEARCH_NOT_STARTED: ErrorCode = ErrorCode::from_static("error-search-not-started");

    /// Create a code from a static string
    pub const fn from_static(code: &'static str) -> Self {
        ErrorCode(Cow::Borrowed(code))
    }

    /// Create a code from any string
    pub fn new(code: impl Into<String>) -> Self {
        ErrorCode(Cow::Owned(code.into()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// =============================================================================
// Client Error
// =============================================================================

/// Unified error type for ticketlink operations
#[derive(Debug, Error)]
pub enum ClientError {
    // -------------------------------------------------------------------------
    // Contract Errors
    // -------------------------------------------------------------------------
    /// Malformed or unsupported message shape, or incompatible version
    #[error("Protocol error: {message}")]
    Protocol {
        message: String,
        #[source]
        source: Option<BoxError>,
    },

    /// Decode failure on an otherwise well-formed transport response
    #[error("Serialization error: {message}")]
    Serialization {
        message: String,
        #[source]
        source: Option<BoxError>,
    },

    // -------------------------------------------------------------------------
    // Session Errors
    // -------------------------------------------------------------------------
    /// Login failed, or the session is invalid or expired
    #[error("Authentication error: {message}")]
    Authentication {
        message: String,
        #[source]
        source: Option<BoxError>,
    },

    // -------------------------------------------------------------------------
    // Transport Errors
    // -------------------------------------------------------------------------
    #[error("IO error: {message}")]
    Io {
        message: String,
        #[source]
        source: Option<BoxError>,
    },

    /// The caller asked the pending operation to stop waiting
    #[error("Operation interrupted")]
    Interrupted,

    // -------------------------------------------------------------------------
    // Domain Errors
    // -------------------------------------------------------------------------
    /// Domain-level rejection carrying a code from the shared vocabulary
    #[error("Operation failed [{code}]: {message}")]
    Operation {
        code: ErrorCode,
        message: String,
        request_id: Option<RequestId>,
    },

    // -------------------------------------------------------------------------
    // Configuration Errors
    // -------------------------------------------------------------------------
    #[error("Configuration error: {0}")]
    Config(String),
}

impl ClientError {
    pub fn protocol(message: impl Into<String>) -> Self {
        ClientError::Protocol {
            message: message.into(),
            source: None,
        }
    }

    pub fn serialization(message: impl Into<String>) -> Self {
        ClientError::Serialization {
            message: message.into(),
            source: None,
        }
    }

    pub fn authentication(message: impl Into<String>) -> Self {
        ClientError::Authentication {
            message: message.into(),
            source: None,
        }
    }

    pub fn io(message: impl Into<String>) -> Self {
        ClientError::Io {
            message: message.into(),
            source: None,
        }
    }

    /// Domain error raised locally, without a server round trip
    pub fn operation(code: ErrorCode, message: impl Into<String>) -> Self {
        ClientError::Operation {
            code,
            message: message.into(),
            request_id: None,
        }
    }

    /// Attach a lower-level cause
    ///
    /// Variants that do not carry a cause are returned unchanged.
    pub fn with_source(mut self, cause: impl Into<BoxError>) -> Self {
        match &mut self {
            ClientError::Protocol { source, .. }
            | ClientError::Serialization { source, .. }
            | ClientError::Authentication { source, .. }
            | ClientError::Io { source, .. } => *source = Some(cause.into()),
            ClientError::Interrupted | ClientError::Operation { .. } | ClientError::Config(_) => {}
        }
        self
    }

    /// Map a server error-response onto the taxonomy
    ///
    /// The four transport-level codes become their matching kind; every
    /// other code, domain codes included, is passed through as `Operation`.
    pub fn from_error_response(code: ErrorCode, message: String, request_id: RequestId) -> Self {
        let context = |message: String| format!("{} (request {})", message, request_id);
        match code.as_str() {
            "error-protocol" => ClientError::protocol(context(message)),
            "error-authentication" => ClientError::authentication(context(message)),
            "error-io" => ClientError::io(context(message)),
            "error-serialization" => ClientError::serialization(context(message)),
            _ => ClientError::Operation {
                code,
                message,
                request_id: Some(request_id),
            },
        }
    }

    /// The symbolic code of this error
    pub fn code(&self) -> ErrorCode {
        match self {
            ClientError::Protocol { .. } => ErrorCode::PROTOCOL,
            ClientError::Serialization { .. } => ErrorCode::SERIALIZATION,
            ClientError::Authentication { .. } => ErrorCode::AUTHENTICATION,
            ClientError::Io { .. } => ErrorCode::IO,
            ClientError::Interrupted => ErrorCode::INTERRUPTED,
            ClientError::Operation { code, .. } => code.clone(),
            ClientError::Config(_) => ErrorCode::CONFIGURATION,
        }
    }

    pub fn is_interrupted(&self) -> bool {
        matches!(self, ClientError::Interrupted)
    }
}

impl From<std::io::Error> for ClientError {
    fn from(error: std::io::Error) -> Self {
        if error.kind() == std::io::ErrorKind::Interrupted {
            return ClientError::Interrupted;
        }
        ClientError::io(error.to_string()).with_source(error)
    }
}
