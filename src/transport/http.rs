//! HTTP transport
//!
//! `reqwest` client with a cookie jar owned by one transport instance. The
//! jar and client are dropped together when credentials are cleared, so
//! nothing authenticated outlives a session.
//!
//! ## Blocking Model
//! Each transport owns a current-thread tokio runtime and drives every
//! exchange to completion on the caller's thread with `block_on`. The
//! exchange races the cancel token, so a call stalled on a silent server
//! returns `Interrupted` as soon as the token is cancelled.
//!
//! Calls must not be made from inside another tokio runtime.

use std::sync::Arc;
use std::time::Duration;

use reqwest::cookie::Jar;
use reqwest::header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE};
use reqwest::{Client, RequestBuilder, Url};
use tokio::runtime::{Builder, Runtime};

use crate::config::ClientConfig;
use crate::error::{ClientError, Result};
use crate::identity::AuthToken;
use crate::protocol::MAX_PAYLOAD_SIZE;

use super::{CancelToken, HttpReply, Transport};

/// Cookie carrying the auth token
pub const SESSION_COOKIE: &str = "TICKETLINK_SESSION";

/// A client and the jar it stores cookies in
struct Pool {
    client: Client,
    jar: Arc<Jar>,
}

/// Production transport over `reqwest`
pub struct HttpTransport {
    runtime: Runtime,

    /// Built lazily; `None` after credentials are cleared
    pool: Option<Pool>,

    token: Option<AuthToken>,

    connect_timeout: Duration,
    request_timeout: Duration,
    user_agent: String,
}

impl HttpTransport {
    /// Create a transport using the config's timeouts and user agent
    pub fn new(config: &ClientConfig) -> Result<Self> {
        let runtime = Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(|e| ClientError::io(format!("creating runtime: {}", e)).with_source(e))?;

        let mut transport = Self {
            runtime,
            pool: None,
            token: None,
            connect_timeout: Duration::from_millis(config.connect_timeout_ms),
            request_timeout: Duration::from_millis(config.request_timeout_ms),
            user_agent: config.user_agent.clone(),
        };
        // Surface client construction errors at creation
        transport.pool()?;
        Ok(transport)
    }

    fn pool(&mut self) -> Result<&Pool> {
        if self.pool.is_none() {
            let jar = Arc::new(Jar::default());
            let client = Client::builder()
                .cookie_provider(Arc::clone(&jar))
                .connect_timeout(self.connect_timeout)
                .timeout(self.request_timeout)
                .user_agent(self.user_agent.clone())
                .build()
                .map_err(|e| {
                    ClientError::io(format!("creating HTTP client: {}", e)).with_source(e)
                })?;
            self.pool = Some(Pool { client, jar });
        }
        match &self.pool {
            Some(pool) => Ok(pool),
            None => Err(ClientError::io("HTTP client unavailable")),
        }
    }

    fn send(&self, request: RequestBuilder, cancel: &CancelToken) -> Result<HttpReply> {
        cancel.check()?;

        let request = match &self.token {
            Some(token) => request.header(AUTHORIZATION, format!("Bearer {}", token.expose())),
            None => request,
        };

        self.runtime.block_on(async {
            tokio::select! {
                biased;
                _ = cancel.cancelled() => {
                    tracing::debug!("HTTP exchange cancelled");
                    Err(ClientError::Interrupted)
                }
                reply = fetch(request) => reply,
            }
        })
    }
}

/// Send a request and read the whole reply
async fn fetch(request: RequestBuilder) -> Result<HttpReply> {
    let mut response = request.send().await.map_err(|e| {
        let message = if e.is_timeout() {
            format!("request timed out: {}", e)
        } else {
            format!("request failed: {}", e)
        };
        ClientError::io(message).with_source(e)
    })?;

    let status = response.status().as_u16();
    let content_type = response
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(|v| v.split(';').next().unwrap_or(v).trim().to_ascii_lowercase());

    let mut body = Vec::new();
    while let Some(chunk) = response.chunk().await.map_err(|e| {
        ClientError::io(format!("reading response body: {}", e)).with_source(e)
    })? {
        if body.len() + chunk.len() > MAX_PAYLOAD_SIZE as usize {
            return Err(ClientError::io(format!(
                "response body exceeds {} bytes",
                MAX_PAYLOAD_SIZE
            )));
        }
        body.extend_from_slice(&chunk);
    }

    tracing::trace!(status, bytes = body.len(), "HTTP reply received");

    Ok(HttpReply {
        status,
        content_type,
        body,
    })
}

impl Transport for HttpTransport {
    fn get(&mut self, url: &Url, cancel: &CancelToken) -> Result<HttpReply> {
        let request = self.pool()?.client.get(url.clone());
        self.send(request, cancel)
    }

    fn post(
        &mut self,
        url: &Url,
        content_type: &str,
        body: Vec<u8>,
        cancel: &CancelToken,
    ) -> Result<HttpReply> {
        let request = self
            .pool()?
            .client
            .post(url.clone())
            .header(CONTENT_TYPE, content_type)
            .header(ACCEPT, content_type)
            .body(body);
        self.send(request, cancel)
    }

    fn attach_token(&mut self, url: &Url, token: &AuthToken) {
        self.token = Some(token.clone());
        match self.pool() {
            Ok(pool) => pool
                .jar
                .add_cookie_str(&format!("{}={}; Path=/", SESSION_COOKIE, token.expose()), url),
            // The bearer header still carries the token
            Err(e) => tracing::warn!("Cookie not stored: {}", e),
        }
    }

    fn clear_credentials(&mut self) {
        self.token = None;
        self.pool = None;
    }
}
