//! Protocol Version Module
//!
//! Discovery and selection of the wire-protocol version spoken with a server.
//!
//! ## Discovery Document
//! ```text
//! GET {base}
//! [
//!   {"ID": "tickets", "VersionMajor": 1, "VersionMinor": 1, "EndpointPath": "tickets/1/1/"},
//!   {"ID": "tickets", "VersionMajor": 2, "VersionMinor": 0, "EndpointPath": "tickets/2/0/"}
//! ]
//! ```
//!
//! Entries arrive in arbitrary order; the client sorts and selects itself.

mod number;
mod registry;
mod negotiator;

use std::cmp::Ordering;
use std::fmt;

use serde::{Deserialize, Serialize};

pub use number::{ParseVersionNumberError, VersionNumber};
pub use registry::{RegisteredVersion, VersionRegistry, TICKETS_PROTOCOL_ID};
pub use negotiator::{select_version, VersionNegotiator};

/// One wire-protocol revision advertised by a server
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ProtocolVersion {
    /// Protocol family identifier
    #[serde(rename = "ID")]
    pub id: String,

    #[serde(rename = "VersionMajor")]
    pub major: VersionNumber,

    #[serde(rename = "VersionMinor")]
    pub minor: VersionNumber,

    /// Command endpoint, relative to the server's base URI
    #[serde(rename = "EndpointPath")]
    pub endpoint_path: String,
}

impl ProtocolVersion {
    pub fn new(
        id: impl Into<String>,
        major: impl Into<VersionNumber>,
        minor: impl Into<VersionNumber>,
        endpoint_path: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            major: major.into(),
            minor: minor.into(),
            endpoint_path: endpoint_path.into(),
        }
    }

    /// Lexicographic order on `(major, minor)`, ignoring id and endpoint
    pub fn cmp_precedence(&self, other: &Self) -> Ordering {
        (&self.major, &self.minor).cmp(&(&other.major, &other.minor))
    }

    /// True if this version has the given id and `(major, minor)` pair
    pub fn is(&self, id: &str, major: &VersionNumber, minor: &VersionNumber) -> bool {
        self.id == id && &self.major == major && &self.minor == minor
    }
}

impl fmt::Display for ProtocolVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}.{}", self.id, self.major, self.minor)
    }
}

/// Versions a server advertises for one protocol id
pub type SupportedVersionSet = Vec<ProtocolVersion>;
