//! Client-side version registry
//!
//! The static list of protocol versions this client implements, and the
//! encodings each of them can speak.

use crate::error::{ClientError, Result};
use crate::protocol::{codec_for, CommandCodec, Encoding};

use super::{ProtocolVersion, VersionNumber};

/// Protocol id of the ticket tracker command protocol
pub const TICKETS_PROTOCOL_ID: &str = "tickets";

/// A version this client implements
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegisteredVersion {
    pub id: String,
    pub major: VersionNumber,
    pub minor: VersionNumber,

    /// Encodings this revision can speak
    pub encodings: Vec<Encoding>,
}

impl RegisteredVersion {
    pub fn new(
        id: impl Into<String>,
        major: impl Into<VersionNumber>,
        minor: impl Into<VersionNumber>,
        encodings: &[Encoding],
    ) -> Self {
        Self {
            id: id.into(),
            major: major.into(),
            minor: minor.into(),
            encodings: encodings.to_vec(),
        }
    }

    /// True if a server advertisement refers to this revision
    pub fn matches(&self, advertised: &ProtocolVersion) -> bool {
        advertised.is(&self.id, &self.major, &self.minor)
    }

    /// Build the codec for one of this revision's encodings
    pub fn codec(&self, encoding: Encoding) -> Result<Box<dyn CommandCodec>> {
        if !self.encodings.contains(&encoding) {
            return Err(ClientError::protocol(format!(
                "{} {}.{} does not support the {} encoding",
                self.id, self.major, self.minor, encoding
            )));
        }
        Ok(codec_for(encoding))
    }
}

/// Versions known to this client
#[derive(Debug, Clone, Default)]
pub struct VersionRegistry {
    versions: Vec<RegisteredVersion>,
}

impl VersionRegistry {
    /// Empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// The versions compiled into this client
    ///
    /// - tickets 1.0: text only
    /// - tickets 1.1: text and binary
    pub fn builtin() -> Self {
        Self::new()
            .with(RegisteredVersion::new(
                TICKETS_PROTOCOL_ID,
                1u64,
                0u64,
                &[Encoding::Text],
            ))
            .with(RegisteredVersion::new(
                TICKETS_PROTOCOL_ID,
                1u64,
                1u64,
                &[Encoding::Text, Encoding::Binary],
            ))
    }

    /// Add a version
    pub fn with(mut self, version: RegisteredVersion) -> Self {
        self.versions.push(version);
        self
    }

    /// Versions registered under a protocol id
    pub fn versions_for<'a>(&'a self, id: &'a str) -> impl Iterator<Item = &'a RegisteredVersion> {
        self.versions.iter().filter(move |v| v.id == id)
    }

    /// The registered entry for an advertised version, if any
    pub fn find(&self, advertised: &ProtocolVersion) -> Option<&RegisteredVersion> {
        self.versions.iter().find(|v| v.matches(advertised))
    }
}
