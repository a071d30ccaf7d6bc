//! Session state
//!
//! The two observable states of a client and the session that exists only
//! while connected.

use reqwest::Url;

use crate::identity::{AuthToken, Principal};
use crate::protocol::CommandCodec;
use crate::version::ProtocolVersion;

/// An authenticated, version-bound connection
#[derive(Debug)]
pub struct Session {
    /// Negotiated version
    pub(crate) version: ProtocolVersion,

    /// Server base URI the session was negotiated against
    pub(crate) server_base: Url,

    /// `endpoint_path` resolved against the base URI
    pub(crate) endpoint: Url,

    pub(crate) token: AuthToken,

    pub(crate) principal: Principal,

    /// Codec of the negotiated version in the configured encoding
    pub(crate) codec: Box<dyn CommandCodec>,
}

impl Session {
    pub fn version(&self) -> &ProtocolVersion {
        &self.version
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    pub fn principal(&self) -> &Principal {
        &self.principal
    }

    pub fn codec(&self) -> &dyn CommandCodec {
        self.codec.as_ref()
    }
}

/// Connection state of a session handler
#[derive(Debug, Default)]
pub enum SessionState {
    #[default]
    Disconnected,
    Connected(Session),
}

impl SessionState {
    pub fn is_connected(&self) -> bool {
        matches!(self, SessionState::Connected(_))
    }

    pub fn session(&self) -> Option<&Session> {
        match self {
            SessionState::Connected(session) => Some(session),
            SessionState::Disconnected => None,
        }
    }
}
