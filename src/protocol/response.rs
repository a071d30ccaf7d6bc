//! Response definitions
//!
//! Represents responses from the server, including the error-response shape.

use serde::{Deserialize, Serialize};

use crate::error::{ClientError, ErrorCode, Result};

use super::command::{CommandType, RequestId};
use super::model::{Page, TicketSummary};

/// The error-response shape shared by every protocol version
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub request_id: RequestId,
    pub error_code: ErrorCode,
    pub message: String,
}

/// A response
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Response {
    TicketCreate {
        request_id: RequestId,
        ticket: TicketSummary,
    },

    TicketSearchBegin {
        request_id: RequestId,
        page: Page<TicketSummary>,
    },

    TicketSearchNext {
        request_id: RequestId,
        page: Page<TicketSummary>,
    },

    TicketSearchPrevious {
        request_id: RequestId,
        page: Page<TicketSummary>,
    },

    PermissionGrant {
        request_id: RequestId,
    },

    /// The command failed on the server
    Error(ErrorResponse),
}

impl Response {
    pub fn request_id(&self) -> RequestId {
        match self {
            Response::TicketCreate { request_id, .. }
            | Response::TicketSearchBegin { request_id, .. }
            | Response::TicketSearchNext { request_id, .. }
            | Response::TicketSearchPrevious { request_id, .. }
            | Response::PermissionGrant { request_id } => *request_id,
            Response::Error(error) => error.request_id,
        }
    }

    /// The command type this response answers, or `None` for an error
    pub fn answers(&self) -> Option<CommandType> {
        match self {
            Response::TicketCreate { .. } => Some(CommandType::TicketCreate),
            Response::TicketSearchBegin { .. } => Some(CommandType::TicketSearchBegin),
            Response::TicketSearchNext { .. } => Some(CommandType::TicketSearchNext),
            Response::TicketSearchPrevious { .. } => Some(CommandType::TicketSearchPrevious),
            Response::PermissionGrant { .. } => Some(CommandType::PermissionGrant),
            Response::Error(_) => None,
        }
    }

    /// Create an error response
    pub fn error(request_id: RequestId, error_code: ErrorCode, message: impl Into<String>) -> Self {
        Response::Error(ErrorResponse {
            request_id,
            error_code,
            message: message.into(),
        })
    }

    /// Check invariants serde cannot express
    pub fn validate(&self) -> Result<()> {
        match self {
            Response::TicketSearchBegin { page, .. }
            | Response::TicketSearchNext { page, .. }
            | Response::TicketSearchPrevious { page, .. } => page.validate(),
            Response::TicketCreate { .. } | Response::PermissionGrant { .. } => Ok(()),
            Response::Error(error) if error.error_code.as_str().is_empty() => {
                Err(ClientError::protocol("error response without an error code"))
            }
            Response::Error(_) => Ok(()),
        }
    }
}
