//! Domain payloads
//!
//! Values carried inside commands and responses. The session machinery
//! treats them as opaque; only `Page` has an invariant the client checks.

use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{ClientError, Result};

/// Largest page size a search may request
pub const MAX_PAGE_SIZE: u32 = 1000;

// =============================================================================
// Tickets
// =============================================================================

/// Ticket identifier, displayed as `PROJECT-123`
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TicketId {
    pub project: String,
    pub number: u64,
}

impl fmt::Display for TicketId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.project, self.number)
    }
}

/// A ticket to create
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TicketCreation {
    pub project: String,
    pub title: String,
    pub description: String,
}

/// A ticket as listed by the server
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TicketSummary {
    pub id: TicketId,
    pub title: String,
    pub description: String,
    pub reporter: Uuid,
}

// =============================================================================
// Search
// =============================================================================

/// Column a search is ordered by
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TicketColumn {
    Id,
    Title,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TicketOrdering {
    pub column: TicketColumn,
    pub ascending: bool,
}

impl Default for TicketOrdering {
    fn default() -> Self {
        Self {
            column: TicketColumn::Id,
            ascending: true,
        }
    }
}

/// Parameters of a ticket search, resent with every page request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TicketSearchParameters {
    pub title_contains: Option<String>,
    pub description_contains: Option<String>,
    pub reporter: Option<Uuid>,
    pub ordering: TicketOrdering,
    pub page_size: u32,
}

impl Default for TicketSearchParameters {
    fn default() -> Self {
        Self {
            title_contains: None,
            description_contains: None,
            reporter: None,
            ordering: TicketOrdering::default(),
            page_size: 50,
        }
    }
}

impl TicketSearchParameters {
    /// Check the parameters before they are sent
    pub fn validate(&self) -> Result<()> {
        if self.page_size == 0 || self.page_size > MAX_PAGE_SIZE {
            return Err(ClientError::operation(
                crate::error::ErrorCode::HTTP_PARAMETER_INVALID,
                format!(
                    "page size must be between 1 and {}, got {}",
                    MAX_PAGE_SIZE, self.page_size
                ),
            ));
        }
        Ok(())
    }
}

/// One slice of a paginated result set
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub page_index: u64,
    pub page_count: u64,
}

impl<T> Page<T> {
    /// Build a page, checking `page_index < page_count`
    pub fn new(items: Vec<T>, page_index: u64, page_count: u64) -> Result<Self> {
        let page = Self {
            items,
            page_index,
            page_count,
        };
        page.validate()?;
        Ok(page)
    }

    /// The empty result set
    pub fn empty() -> Self {
        Self {
            items: Vec::new(),
            page_index: 0,
            page_count: 0,
        }
    }

    /// `0 <= page_index < page_count`, or `0 == page_index == page_count`
    pub fn validate(&self) -> Result<()> {
        let valid = self.page_index < self.page_count
            || (self.page_count == 0 && self.page_index == 0);
        if !valid {
            return Err(ClientError::protocol(format!(
                "invalid page: index {} of {} pages",
                self.page_index, self.page_count
            )));
        }
        Ok(())
    }
}

// =============================================================================
// Permissions
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Permission {
    TicketRead,
    TicketWrite,
    TicketCreate,
    ProjectCreate,
    PermissionGrant,
}

impl Permission {
    pub fn as_str(&self) -> &'static str {
        match self {
            Permission::TicketRead => "ticket-read",
            Permission::TicketWrite => "ticket-write",
            Permission::TicketCreate => "ticket-create",
            Permission::ProjectCreate => "project-create",
            Permission::PermissionGrant => "permission-grant",
        }
    }
}

impl std::str::FromStr for Permission {
    type Err = ClientError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "ticket-read" => Ok(Permission::TicketRead),
            "ticket-write" => Ok(Permission::TicketWrite),
            "ticket-create" => Ok(Permission::TicketCreate),
            "project-create" => Ok(Permission::ProjectCreate),
            "permission-grant" => Ok(Permission::PermissionGrant),
            other => Err(ClientError::operation(
                crate::error::ErrorCode::HTTP_PARAMETER_INVALID,
                format!("unknown permission: {}", other),
            )),
        }
    }
}

/// What a permission applies to
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PermissionScope {
    Global,
    Project(String),
    Ticket(TicketId),
}

/// A permission to grant to a user
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PermissionGrant {
    pub user: Uuid,
    pub permission: Permission,
    pub scope: PermissionScope,
}
