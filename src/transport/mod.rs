//! Transport Module
//!
//! The HTTP collaborator every exchange goes through.
//!
//! ## Responsibilities
//! - `GET` the version discovery document
//! - `POST` encoded commands and return the raw reply
//! - Hold the per-instance cookie/header store carrying the auth token
//! - Observe cooperative cancellation while waiting
//!
//! Transports never interpret bodies; decoding belongs to the codecs.

mod cancel;
mod http;

use reqwest::Url;

use crate::error::Result;
use crate::identity::AuthToken;

pub use cancel::CancelToken;
pub use http::{HttpTransport, SESSION_COOKIE};

/// A raw HTTP reply
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpReply {
    pub status: u16,

    /// `Content-Type` without parameters, if present
    pub content_type: Option<String>,

    pub body: Vec<u8>,
}

impl HttpReply {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Blocking HTTP transport owned by one client instance
pub trait Transport {
    /// `GET url`
    fn get(&mut self, url: &Url, cancel: &CancelToken) -> Result<HttpReply>;

    /// `POST url` with a body of the given media type
    fn post(
        &mut self,
        url: &Url,
        content_type: &str,
        body: Vec<u8>,
        cancel: &CancelToken,
    ) -> Result<HttpReply>;

    /// Attach an auth token to subsequent requests to `url`'s origin
    fn attach_token(&mut self, url: &Url, token: &AuthToken);

    /// Forget every cookie and token
    fn clear_credentials(&mut self);
}
