//! Session handler
//!
//! The client state machine. Every domain call goes through here.
//!
//! ## Transitions
//! ```text
//!                 connect(credentials)
//!   Disconnected ───────────────────────▶ Connected(Session)
//!        ▲  ▲                                  │   │
//!        │  └──── disconnect (logout) ─────────┘   │ execute: ok
//!        │                                         ◀┘
//!        └──── execute: I/O, decode or auth failure (demotion)
//! ```
//!
//! A domain call made while disconnected performs exactly one implicit
//! connect with the last supplied credentials before the command is sent.
//!
//! ## Concurrency
//! All operations take `&mut self` and block the calling thread. Sharing a
//! handler between threads requires external serialization.

use reqwest::Url;

use crate::config::ClientConfig;
use crate::error::{ClientError, Result};
use crate::identity::{Credentials, HttpIdentity, IdentityProvider};
use crate::protocol::{
    Command, Page, PermissionGrant, Response, TicketCreation, TicketSearchParameters,
    TicketSummary,
};
use crate::transport::{CancelToken, HttpTransport, Transport};
use crate::version::{ProtocolVersion, SupportedVersionSet, VersionNegotiator, VersionRegistry};

use super::cursor::{search_not_started, Cursor};
use super::state::{Session, SessionState};

/// Handler wired to the production HTTP collaborators
pub type HttpSessionHandler = SessionHandler<HttpTransport, HttpIdentity>;

/// Client state machine binding version, endpoint and session together
pub struct SessionHandler<T, I> {
    config: ClientConfig,
    base: Url,
    registry: VersionRegistry,
    transport: T,
    identity: I,
    state: SessionState,

    /// Most recently supplied credentials, kept for implicit reconnects
    credentials: Option<Credentials>,

    /// Current search; only ever present while connected
    cursor: Option<Cursor>,

    cancel: CancelToken,
}

impl HttpSessionHandler {
    /// Handler over `reqwest` with the built-in version registry
    pub fn from_config(config: ClientConfig) -> Result<Self> {
        let transport = HttpTransport::new(&config)?;
        let identity = HttpIdentity::new(&config);
        SessionHandler::new(config, VersionRegistry::builtin(), transport, identity)
    }
}

impl<T: Transport, I: IdentityProvider> SessionHandler<T, I> {
    /// Create a disconnected handler
    pub fn new(
        config: ClientConfig,
        registry: VersionRegistry,
        transport: T,
        identity: I,
    ) -> Result<Self> {
        config.validate()?;
        let base = config.base_url()?;
        if registry.versions_for(&config.protocol_id).next().is_none() {
            return Err(ClientError::Config(format!(
                "no registered versions for protocol {:?}",
                config.protocol_id
            )));
        }

        Ok(Self {
            config,
            base,
            registry,
            transport,
            identity,
            state: SessionState::Disconnected,
            credentials: None,
            cursor: None,
            cancel: CancelToken::new(),
        })
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn is_connected(&self) -> bool {
        self.state.is_connected()
    }

    pub fn session(&self) -> Option<&Session> {
        self.state.session()
    }

    pub fn cursor(&self) -> Option<&Cursor> {
        self.cursor.as_ref()
    }

    /// Token another thread can use to interrupt pending calls
    pub fn cancel_token(&self) -> CancelToken {
        self.cancel.clone()
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn identity(&self) -> &I {
        &self.identity
    }

    // =========================================================================
    // Negotiation
    // =========================================================================

    /// Fetch the versions the server advertises, without connecting
    pub fn discover_versions(&mut self) -> Result<SupportedVersionSet> {
        VersionNegotiator::new(&self.registry).discover(&mut self.transport, &self.base, &self.cancel)
    }

    /// Negotiate a version, without connecting
    pub fn negotiate(&mut self) -> Result<ProtocolVersion> {
        VersionNegotiator::new(&self.registry).negotiate(
            &mut self.transport,
            &self.base,
            &self.config.protocol_id,
            &self.cancel,
        )
    }

    // =========================================================================
    // Lifecycle
    // =========================================================================

    /// Negotiate, log in and become connected
    ///
    /// The credentials are remembered for implicit reconnects even when
    /// this attempt fails. Connecting while connected starts a new session.
    pub fn connect(&mut self, credentials: Credentials) -> Result<()> {
        if self.is_connected() {
            self.disconnect();
        }
        self.credentials = Some(credentials);
        self.connect_with_stored()
    }

    /// Tear down the session; logout is best-effort
    pub fn disconnect(&mut self) {
        self.cursor = None;
        let state = std::mem::take(&mut self.state);
        if let SessionState::Connected(session) = state {
            if let Err(e) = self.identity.logout(
                &mut self.transport,
                &session.server_base,
                &session.token,
                &self.cancel,
            ) {
                tracing::warn!("Logout failed for {}: {}", session.principal.name, e);
            }
            self.transport.clear_credentials();
            tracing::info!("Disconnected from {}", session.endpoint);
        }
    }

    fn connect_with_stored(&mut self) -> Result<()> {
        let credentials = match self.credentials.take() {
            Some(credentials) => credentials,
            None => {
                return Err(ClientError::authentication(
                    "not connected and no credentials have been supplied",
                ))
            }
        };
        let result = self.establish(&credentials);
        self.credentials = Some(credentials);
        result
    }

    /// Disconnected → Connected, atomically from the caller's view
    fn establish(&mut self, credentials: &Credentials) -> Result<()> {
        self.cursor = None;

        let version = VersionNegotiator::new(&self.registry).negotiate(
            &mut self.transport,
            &self.base,
            &self.config.protocol_id,
            &self.cancel,
        )?;

        let codec = self
            .registry
            .find(&version)
            .ok_or_else(|| ClientError::protocol(format!("{} is not registered", version)))?
            .codec(self.config.encoding)?;

        let endpoint = self
            .base
            .join(version.endpoint_path.trim_start_matches('/'))
            .map_err(|e| {
                ClientError::protocol(format!(
                    "invalid endpoint path {:?}: {}",
                    version.endpoint_path, e
                ))
            })?;

        let login = match self
            .identity
            .login(&mut self.transport, &self.base, credentials, &self.cancel)
        {
            Ok(login) => login,
            Err(e) => {
                self.transport.clear_credentials();
                return Err(e);
            }
        };
        self.transport.attach_token(&self.base, &login.token);

        tracing::info!(
            "Connected to {} as {} using {} ({})",
            endpoint,
            login.principal.name,
            version,
            codec.encoding()
        );

        self.state = SessionState::Connected(Session {
            version,
            server_base: self.base.clone(),
            endpoint,
            token: login.token,
            principal: login.principal,
            codec,
        });
        Ok(())
    }

    /// Connect implicitly, once, if disconnected
    fn ensure_connected(&mut self) -> Result<()> {
        if self.is_connected() {
            return Ok(());
        }
        if self.credentials.is_some() {
            tracing::info!("Not connected; reconnecting with stored credentials");
        }
        self.connect_with_stored().map_err(|e| match e {
            ClientError::Interrupted | ClientError::Authentication { .. } => e,
            other => ClientError::authentication(format!("reconnect failed: {}", other))
                .with_source(other),
        })
    }

    fn demote(&mut self, reason: &ClientError) {
        if let SessionState::Connected(session) = std::mem::take(&mut self.state) {
            tracing::warn!("Session at {} lost: {}", session.endpoint, reason);
        }
        self.cursor = None;
        self.transport.clear_credentials();
    }

    // =========================================================================
    // Execution
    // =========================================================================

    /// Send a command and return its response
    ///
    /// Error responses are returned as errors carrying the server's code.
    /// Transport and decode failures demote the handler to disconnected and
    /// are never retried here.
    pub fn execute(&mut self, command: Command) -> Result<Response> {
        self.ensure_connected()?;

        let session = match &self.state {
            SessionState::Connected(session) => session,
            SessionState::Disconnected => return Err(ClientError::authentication("not connected")),
        };

        // Encoding failures are local and leave the session intact
        let body = session.codec.encode_command(&command)?;

        tracing::debug!(
            request = %command.request_id(),
            command = ?command.command_type(),
            "Sending command"
        );

        match exchange(session, &mut self.transport, &command, body, &self.cancel) {
            Ok(Response::Error(error)) => {
                let err = ClientError::from_error_response(
                    error.error_code,
                    error.message,
                    error.request_id,
                );
                // The server no longer honors this session
                if matches!(err, ClientError::Authentication { .. }) {
                    self.demote(&err);
                }
                Err(err)
            }
            Ok(response) => Ok(response),
            Err(ClientError::Interrupted) => Err(ClientError::Interrupted),
            Err(err) => {
                self.demote(&err);
                if self.cancel.is_cancelled() {
                    return Err(ClientError::Interrupted);
                }
                Err(err)
            }
        }
    }

    // =========================================================================
    // Domain Operations
    // =========================================================================

    /// Create a ticket
    pub fn ticket_create(&mut self, ticket: TicketCreation) -> Result<TicketSummary> {
        match self.execute(Command::ticket_create(ticket))? {
            Response::TicketCreate { ticket, .. } => Ok(ticket),
            other => Err(unexpected(&other)),
        }
    }

    /// Grant a permission
    pub fn permission_grant(&mut self, grant: PermissionGrant) -> Result<()> {
        match self.execute(Command::permission_grant(grant))? {
            Response::PermissionGrant { .. } => Ok(()),
            other => Err(unexpected(&other)),
        }
    }

    /// Start a new search, discarding any previous cursor
    pub fn ticket_search_begin(
        &mut self,
        parameters: TicketSearchParameters,
    ) -> Result<Page<TicketSummary>> {
        self.cursor = None;
        parameters.validate()?;

        let page = match self.execute(Command::ticket_search_begin(parameters.clone()))? {
            Response::TicketSearchBegin { page, .. } => page,
            other => return Err(unexpected(&other)),
        };

        self.cursor = Some(Cursor::begin(parameters, &page)?);
        tracing::debug!("Search started: {} pages", page.page_count);
        Ok(page)
    }

    /// Fetch the next page of the current search
    pub fn ticket_search_next(&mut self) -> Result<Page<TicketSummary>> {
        let cursor = self.cursor.as_ref().ok_or_else(search_not_started)?;
        let target = cursor.next_index()?;
        let command = Command::ticket_search_next(cursor.parameters().clone(), cursor.page_index());

        let page = match self.execute(command)? {
            Response::TicketSearchNext { page, .. } => page,
            other => return Err(unexpected(&other)),
        };
        self.move_cursor(target, page)
    }

    /// Fetch the previous page of the current search
    pub fn ticket_search_previous(&mut self) -> Result<Page<TicketSummary>> {
        let cursor = self.cursor.as_ref().ok_or_else(search_not_started)?;
        let target = cursor.previous_index()?;
        let command =
            Command::ticket_search_previous(cursor.parameters().clone(), cursor.page_index());

        let page = match self.execute(command)? {
            Response::TicketSearchPrevious { page, .. } => page,
            other => return Err(unexpected(&other)),
        };
        self.move_cursor(target, page)
    }

    fn move_cursor(
        &mut self,
        target: u64,
        page: Page<TicketSummary>,
    ) -> Result<Page<TicketSummary>> {
        let cursor = self.cursor.as_mut().ok_or_else(search_not_started)?;
        cursor.move_to(target, &page)?;
        Ok(page)
    }
}

/// Send an encoded command and decode the reply
///
/// Every failure here means the channel can no longer be trusted.
fn exchange<T: Transport>(
    session: &Session,
    transport: &mut T,
    command: &Command,
    body: Vec<u8>,
    cancel: &CancelToken,
) -> Result<Response> {
    let codec = session.codec.as_ref();
    let reply = transport.post(&session.endpoint, codec.media_type(), body, cancel)?;
    cancel.check()?;

    if reply.content_type.as_deref() != Some(codec.media_type()) {
        if !reply.is_success() {
            return Err(ClientError::io(format!(
                "command endpoint returned HTTP {}",
                reply.status
            )));
        }
        return Err(ClientError::protocol(format!(
            "expected a {} response, got {}",
            codec.media_type(),
            reply.content_type.as_deref().unwrap_or("no content type")
        )));
    }

    let response = match codec.decode_response(&reply.body) {
        Ok(response) => response,
        Err(e) if !reply.is_success() => {
            return Err(
                ClientError::io(format!("command endpoint returned HTTP {}", reply.status))
                    .with_source(e),
            )
        }
        Err(e) => return Err(e),
    };

    if response.request_id() != command.request_id() {
        return Err(ClientError::protocol(format!(
            "response for request {} received for request {}",
            response.request_id(),
            command.request_id()
        )));
    }
    if let Some(answered) = response.answers() {
        if answered != command.command_type() {
            return Err(ClientError::protocol(format!(
                "{:?} answered with a {:?} response",
                command.command_type(),
                answered
            )));
        }
    }

    tracing::debug!(request = %command.request_id(), status = reply.status, "Response received");
    Ok(response)
}

fn unexpected(response: &Response) -> ClientError {
    ClientError::protocol(format!("unexpected response: {:?}", response.answers()))
}
