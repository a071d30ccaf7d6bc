//! Version negotiation
//!
//! Fetches a server's advertised versions and picks the greatest
//! `(major, minor)` pair both sides support.

use std::collections::HashSet;

use reqwest::Url;

use crate::error::{ClientError, Result};
use crate::transport::{CancelToken, Transport};

use super::{ProtocolVersion, SupportedVersionSet, VersionNumber, VersionRegistry};

/// Negotiates a protocol version against a server
///
/// Negotiation has no side effect beyond the discovery read, so it may be
/// repeated freely.
#[derive(Debug, Clone, Copy)]
pub struct VersionNegotiator<'a> {
    registry: &'a VersionRegistry,
}

impl<'a> VersionNegotiator<'a> {
    pub fn new(registry: &'a VersionRegistry) -> Self {
        Self { registry }
    }

    /// Fetch and decode the discovery document at `base`
    pub fn discover<T: Transport + ?Sized>(
        &self,
        transport: &mut T,
        base: &Url,
        cancel: &CancelToken,
    ) -> Result<SupportedVersionSet> {
        tracing::debug!(url = %base, "Fetching protocol versions");

        let reply = transport.get(base, cancel)?;
        if !reply.is_success() {
            return Err(ClientError::io(format!(
                "version discovery at {} returned HTTP {}",
                base, reply.status
            )));
        }

        serde_json::from_slice(&reply.body).map_err(|e| {
            ClientError::serialization(format!("undecodable version discovery document: {}", e))
                .with_source(e)
        })
    }

    /// Discover the server's versions and select one for protocol `id`
    pub fn negotiate<T: Transport + ?Sized>(
        &self,
        transport: &mut T,
        base: &Url,
        id: &str,
        cancel: &CancelToken,
    ) -> Result<ProtocolVersion> {
        let advertised = self.discover(transport, base, cancel)?;
        let selected = select_version(self.registry, id, &advertised)?;

        tracing::info!(
            "Negotiated protocol {} (server offered {} versions)",
            selected,
            advertised.len()
        );
        Ok(selected)
    }
}

/// Pick the greatest mutually supported version for protocol `id`
///
/// Advertisements for other ids are ignored. A server advertising the same
/// `(major, minor)` twice for one id violates the discovery contract.
pub fn select_version(
    registry: &VersionRegistry,
    id: &str,
    advertised: &[ProtocolVersion],
) -> Result<ProtocolVersion> {
    let mut seen: HashSet<(&VersionNumber, &VersionNumber)> = HashSet::new();
    for version in advertised.iter().filter(|v| v.id == id) {
        if !seen.insert((&version.major, &version.minor)) {
            return Err(ClientError::protocol(format!(
                "server advertised {} more than once",
                version
            )));
        }
    }

    advertised
        .iter()
        .filter(|v| v.id == id)
        .filter(|v| registry.find(v).is_some())
        .max_by(|a, b| a.cmp_precedence(b))
        .cloned()
        .ok_or_else(|| ClientError::protocol("no compatible version"))
}
