//! Command definitions
//!
//! Represents commands sent to the server.

use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::model::{PermissionGrant, TicketCreation, TicketSearchParameters};

/// Unique identifier of one call, echoed by its response
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RequestId(pub Uuid);

impl RequestId {
    /// A fresh random id
    pub fn new() -> Self {
        RequestId(Uuid::new_v4())
    }
}

impl Default for RequestId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Command types
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandType {
    TicketCreate,
    TicketSearchBegin,
    TicketSearchNext,
    TicketSearchPrevious,
    PermissionGrant,
}

/// A command
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Command {
    /// Create a ticket
    TicketCreate {
        request_id: RequestId,
        ticket: TicketCreation,
    },

    /// Start a search, returning its first page
    TicketSearchBegin {
        request_id: RequestId,
        parameters: TicketSearchParameters,
    },

    /// Fetch the page after `page_index`
    TicketSearchNext {
        request_id: RequestId,
        parameters: TicketSearchParameters,
        page_index: u64,
    },

    /// Fetch the page before `page_index`
    TicketSearchPrevious {
        request_id: RequestId,
        parameters: TicketSearchParameters,
        page_index: u64,
    },

    /// Grant a permission to a user
    PermissionGrant {
        request_id: RequestId,
        grant: PermissionGrant,
    },
}

impl Command {
    /// Get the command type
    pub fn command_type(&self) -> CommandType {
        match self {
            Command::TicketCreate { .. } => CommandType::TicketCreate,
            Command::TicketSearchBegin { .. } => CommandType::TicketSearchBegin,
            Command::TicketSearchNext { .. } => CommandType::TicketSearchNext,
            Command::TicketSearchPrevious { .. } => CommandType::TicketSearchPrevious,
            Command::PermissionGrant { .. } => CommandType::PermissionGrant,
        }
    }

    pub fn request_id(&self) -> RequestId {
        match self {
            Command::TicketCreate { request_id, .. }
            | Command::TicketSearchBegin { request_id, .. }
            | Command::TicketSearchNext { request_id, .. }
            | Command::TicketSearchPrevious { request_id, .. }
            | Command::PermissionGrant { request_id, .. } => *request_id,
        }
    }

    pub fn ticket_create(ticket: TicketCreation) -> Self {
        Command::TicketCreate {
            request_id: RequestId::new(),
            ticket,
        }
    }

    pub fn ticket_search_begin(parameters: TicketSearchParameters) -> Self {
        Command::TicketSearchBegin {
            request_id: RequestId::new(),
            parameters,
        }
    }

    pub fn ticket_search_next(parameters: TicketSearchParameters, page_index: u64) -> Self {
        Command::TicketSearchNext {
            request_id: RequestId::new(),
            parameters,
            page_index,
        }
    }

    pub fn ticket_search_previous(parameters: TicketSearchParameters, page_index: u64) -> Self {
        Command::TicketSearchPrevious {
            request_id: RequestId::new(),
            parameters,
            page_index,
        }
    }

    pub fn permission_grant(grant: PermissionGrant) -> Self {
        Command::PermissionGrant {
            request_id: RequestId::new(),
            grant,
        }
    }
}
