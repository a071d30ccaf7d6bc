//! Configuration for ticketlink
//!
//! Centralized client configuration with sensible defaults, buildable in
//! code or loaded from a TOML file:
//!
//! ```toml
//! base_uri = "https://tickets.example.com/"
//! protocol_id = "tickets"
//! encoding = "binary"
//! request_timeout_ms = 10000
//! ```

use std::path::Path;

use reqwest::Url;
use serde::Deserialize;

use crate::error::{ClientError, Result};
use crate::protocol::Encoding;
use crate::version::TICKETS_PROTOCOL_ID;

/// Main configuration for a ticketlink client
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ClientConfig {
    // -------------------------------------------------------------------------
    // Server Configuration
    // -------------------------------------------------------------------------
    /// Base URI of the server; version discovery is `GET {base_uri}`
    pub base_uri: String,

    /// Protocol family to negotiate
    pub protocol_id: String,

    /// Preferred wire encoding
    pub encoding: Encoding,

    // -------------------------------------------------------------------------
    // Identity Configuration
    // -------------------------------------------------------------------------
    /// Login endpoint, relative to the base URI
    pub login_path: String,

    /// Logout endpoint, relative to the base URI
    pub logout_path: String,

    // -------------------------------------------------------------------------
    // HTTP Configuration
    // -------------------------------------------------------------------------
    /// Connect timeout (milliseconds)
    pub connect_timeout_ms: u64,

    /// Whole-request timeout (milliseconds)
    pub request_timeout_ms: u64,

    pub user_agent: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_uri: "http://127.0.0.1:40000/".to_string(),
            protocol_id: TICKETS_PROTOCOL_ID.to_string(),
            encoding: Encoding::Text,
            login_path: "login".to_string(),
            logout_path: "logout".to_string(),
            connect_timeout_ms: 5000,
            request_timeout_ms: 30000,
            user_agent: format!("ticketlink/{}", crate::VERSION),
        }
    }
}

impl ClientConfig {
    /// Create a new config builder
    pub fn builder() -> ClientConfigBuilder {
        ClientConfigBuilder::default()
    }

    /// Parse a TOML document; absent keys take their defaults
    pub fn from_toml_str(text: &str) -> Result<Self> {
        let config: ClientConfig = toml::from_str(text)
            .map_err(|e| ClientError::Config(format!("invalid configuration: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Load a TOML configuration file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .map_err(|e| ClientError::Config(format!("reading {}: {}", path.display(), e)))?;
        Self::from_toml_str(&text)
    }

    /// The base URI, parsed and normalised to end with `/`
    ///
    /// Without the trailing slash, relative endpoint paths would replace the
    /// last segment instead of extending it.
    pub fn base_url(&self) -> Result<Url> {
        let mut text = self.base_uri.trim().to_string();
        if !text.ends_with('/') {
            text.push('/');
        }
        let url = Url::parse(&text)
            .map_err(|e| ClientError::Config(format!("invalid base URI {:?}: {}", self.base_uri, e)))?;
        if url.cannot_be_a_base() {
            return Err(ClientError::Config(format!(
                "base URI {:?} cannot be a base",
                self.base_uri
            )));
        }
        Ok(url)
    }

    /// Check the configuration is usable
    pub fn validate(&self) -> Result<()> {
        self.base_url()?;
        if self.protocol_id.trim().is_empty() {
            return Err(ClientError::Config("protocol_id must not be empty".to_string()));
        }
        if self.request_timeout_ms == 0 {
            return Err(ClientError::Config(
                "request_timeout_ms must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }
}

/// Builder for ClientConfig
#[derive(Default)]
pub struct ClientConfigBuilder {
    config: ClientConfig,
}

impl ClientConfigBuilder {
    /// Set the server base URI
    pub fn base_uri(mut self, uri: impl Into<String>) -> Self {
        self.config.base_uri = uri.into();
        self
    }

    /// Set the protocol family to negotiate
    pub fn protocol_id(mut self, id: impl Into<String>) -> Self {
        self.config.protocol_id = id.into();
        self
    }

    /// Set the preferred wire encoding
    pub fn encoding(mut self, encoding: Encoding) -> Self {
        self.config.encoding = encoding;
        self
    }

    pub fn login_path(mut self, path: impl Into<String>) -> Self {
        self.config.login_path = path.into();
        self
    }

    pub fn logout_path(mut self, path: impl Into<String>) -> Self {
        self.config.logout_path = path.into();
        self
    }

    /// Set the connect timeout (in milliseconds)
    pub fn connect_timeout_ms(mut self, ms: u64) -> Self {
        self.config.connect_timeout_ms = ms;
        self
    }

    /// Set the request timeout (in milliseconds)
    pub fn request_timeout_ms(mut self, ms: u64) -> Self {
        self.config.request_timeout_ms = ms;
        self
    }

    pub fn user_agent(mut self, agent: impl Into<String>) -> Self {
        self.config.user_agent = agent.into();
        self
    }

    pub fn build(self) -> ClientConfig {
        self.config
    }
}
