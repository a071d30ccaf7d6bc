//! Identity collaborator
//!
//! Login and logout are owned by an external identity provider. The session
//! handler only needs a token to attach to later requests and the principal
//! it belongs to.
//!
//! ## HTTP Identity Exchange
//! ```text
//! POST {base}login   {"userName": "…", "password": "…"}
//!   200 → {"token": "…", "principal": {"id": "<uuid>", "name": "…"}}
//!   401 / 403 → authentication failure
//! POST {base}logout  {}   (token attached by the transport)
//! ```

use std::fmt;

use reqwest::Url;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::config::ClientConfig;
use crate::error::{ClientError, Result};
use crate::protocol::TEXT_MEDIA_TYPE;
use crate::transport::{CancelToken, Transport};

// =============================================================================
// Values
// =============================================================================

/// User name and password
pub struct Credentials {
    pub username: String,
    password: SecretString,
}

impl Credentials {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: SecretString::from(password.into()),
        }
    }

    pub fn password(&self) -> &str {
        self.password.expose_secret()
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Opaque session token issued at login
#[derive(Clone, PartialEq, Eq, Deserialize)]
#[serde(transparent)]
pub struct AuthToken(String);

impl AuthToken {
    pub fn new(token: impl Into<String>) -> Self {
        AuthToken(token.into())
    }

    /// The raw token, for attaching to requests only
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for AuthToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("AuthToken(<redacted>)")
    }
}

/// The authenticated user
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Principal {
    pub id: Uuid,
    pub name: String,
}

/// Result of a successful login
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Login {
    pub token: AuthToken,
    pub principal: Principal,
}

// =============================================================================
// Provider
// =============================================================================

/// Consumed identity interface
///
/// Providers receive the client's transport so any cookies they set land in
/// the same per-instance store as the command traffic.
pub trait IdentityProvider {
    fn login(
        &mut self,
        transport: &mut dyn Transport,
        base: &Url,
        credentials: &Credentials,
        cancel: &CancelToken,
    ) -> Result<Login>;

    fn logout(
        &mut self,
        transport: &mut dyn Transport,
        base: &Url,
        token: &AuthToken,
        cancel: &CancelToken,
    ) -> Result<()>;
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct LoginRequest<'a> {
    user_name: &'a str,
    password: &'a str,
}

/// Identity provider speaking JSON over the client's transport
#[derive(Debug, Clone)]
pub struct HttpIdentity {
    login_path: String,
    logout_path: String,
}

impl HttpIdentity {
    pub fn new(config: &ClientConfig) -> Self {
        Self {
            login_path: config.login_path.clone(),
            logout_path: config.logout_path.clone(),
        }
    }

    fn endpoint(base: &Url, path: &str) -> Result<Url> {
        base.join(path.trim_start_matches('/'))
            .map_err(|e| ClientError::Config(format!("invalid identity path {:?}: {}", path, e)))
    }
}

impl IdentityProvider for HttpIdentity {
    fn login(
        &mut self,
        transport: &mut dyn Transport,
        base: &Url,
        credentials: &Credentials,
        cancel: &CancelToken,
    ) -> Result<Login> {
        let url = Self::endpoint(base, &self.login_path)?;
        let body = serde_json::to_vec(&LoginRequest {
            user_name: &credentials.username,
            password: credentials.password(),
        })
        .map_err(|e| ClientError::serialization(format!("encoding login: {}", e)).with_source(e))?;

        tracing::debug!(user = %credentials.username, url = %url, "Logging in");

        let reply = transport.post(&url, TEXT_MEDIA_TYPE, body, cancel)?;
        match reply.status {
            401 | 403 => {
                return Err(ClientError::authentication(format!(
                    "login rejected for {} (HTTP {})",
                    credentials.username, reply.status
                )))
            }
            _ if !reply.is_success() => {
                return Err(ClientError::io(format!("login returned HTTP {}", reply.status)))
            }
            _ => {}
        }

        serde_json::from_slice(&reply.body).map_err(|e| {
            ClientError::serialization(format!("undecodable login response: {}", e)).with_source(e)
        })
    }

    fn logout(
        &mut self,
        transport: &mut dyn Transport,
        base: &Url,
        _token: &AuthToken,
        cancel: &CancelToken,
    ) -> Result<()> {
        let url = Self::endpoint(base, &self.logout_path)?;
        let reply = transport.post(&url, TEXT_MEDIA_TYPE, b"{}".to_vec(), cancel)?;
        if !reply.is_success() {
            return Err(ClientError::io(format!("logout returned HTTP {}", reply.status)));
        }
        Ok(())
    }
}
