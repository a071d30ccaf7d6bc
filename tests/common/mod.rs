//! Shared test fixtures
//!
//! An in-process server playing both the discovery document and the command
//! endpoint through the `Transport` trait, and an identity provider that
//! counts logins. Tests keep a handle on the shared state to script failures
//! and inspect what the client sent.

#![allow(dead_code)]

pub mod http;

use std::cell::RefCell;
use std::rc::Rc;

use reqwest::Url;
use uuid::Uuid;

use ticketlink::identity::{AuthToken, Credentials, IdentityProvider, Login, Principal};
use ticketlink::protocol::{
    codec_for, Command, Encoding, Page, PermissionGrant, Response, TicketCreation, TicketId,
    TicketSearchParameters, TicketSummary, BINARY_MEDIA_TYPE, TEXT_MEDIA_TYPE,
};
use ticketlink::transport::{CancelToken, HttpReply, Transport};
use ticketlink::version::{ProtocolVersion, VersionRegistry};
use ticketlink::{ClientConfig, ClientError, ErrorCode, Result, SessionHandler};

pub const BASE: &str = "http://tickets.test/api/";

// =============================================================================
// Fake Server
// =============================================================================

/// What the fake server does with the next command
#[derive(Debug, Clone)]
pub enum Scripted {
    /// Fail the POST with a transport error
    IoFailure,

    /// Answer with an error response carrying this code
    ErrorResponse(ErrorCode, String),

    /// Answer 200 with bytes no codec accepts
    Garbage,

    /// Answer with a response for a different request id
    WrongRequestId,

    /// Cancel the given token while the request is in flight, then fail
    CancelThenIoFailure(CancelToken),

    /// Cancel the given token after the reply was produced
    CancelAfterReply(CancelToken),

    /// Answer a paging command with page 0 whatever was asked for
    WrongPageIndex,
}

#[derive(Debug)]
pub struct ServerState {
    pub advertised: Vec<ProtocolVersion>,
    pub discovery_status: u16,
    pub discovery_body: Option<Vec<u8>>,
    pub discovery_fails: bool,
    pub discovery_requests: u32,

    pub tickets: Vec<TicketSummary>,
    pub grants: Vec<PermissionGrant>,

    /// Added to the real page count of every page served
    pub extra_pages: u64,

    pub script: Vec<Scripted>,
    pub commands: Vec<Command>,
    pub endpoints: Vec<Url>,
    pub media_types: Vec<String>,

    pub attached_tokens: Vec<String>,
    pub credential_resets: u32,
}

impl Default for ServerState {
    fn default() -> Self {
        Self {
            advertised: vec![
                version(1, 0),
                version(1, 1),
                ProtocolVersion::new("tickets", 2u64, 0u64, "tickets/2/0/"),
            ],
            discovery_status: 200,
            discovery_body: None,
            discovery_fails: false,
            discovery_requests: 0,
            tickets: Vec::new(),
            grants: Vec::new(),
            extra_pages: 0,
            script: Vec::new(),
            commands: Vec::new(),
            endpoints: Vec::new(),
            media_types: Vec::new(),
            attached_tokens: Vec::new(),
            credential_resets: 0,
        }
    }
}

pub fn version(major: u64, minor: u64) -> ProtocolVersion {
    ProtocolVersion::new("tickets", major, minor, format!("tickets/{major}/{minor}/"))
}

pub fn ticket(number: u64, title: &str) -> TicketSummary {
    TicketSummary {
        id: TicketId {
            project: "CORE".to_string(),
            number,
        },
        title: title.to_string(),
        description: format!("description of {title}"),
        reporter: Uuid::nil(),
    }
}

impl ServerState {
    /// Fill the store with `count` tickets titled `ticket N`
    pub fn with_tickets(mut self, count: u64) -> Self {
        self.tickets = (1..=count).map(|n| ticket(n, &format!("ticket {n}"))).collect();
        self
    }

    fn page(&self, parameters: &TicketSearchParameters, index: u64) -> Page<TicketSummary> {
        let matching: Vec<&TicketSummary> = self
            .tickets
            .iter()
            .filter(|t| match &parameters.title_contains {
                Some(text) => t.title.contains(text.as_str()),
                None => true,
            })
            .collect();

        let size = parameters.page_size as usize;
        let count = (matching.len() + size - 1) / size;
        if count == 0 {
            return Page::empty();
        }
        let items = matching
            .iter()
            .skip(index as usize * size)
            .take(size)
            .map(|t| (*t).clone())
            .collect();
        Page {
            items,
            page_index: index,
            page_count: count as u64 + self.extra_pages,
        }
    }

    fn dispatch(&mut self, command: &Command) -> Response {
        match command {
            Command::TicketCreate { request_id, ticket } => {
                let created = self.create(ticket);
                Response::TicketCreate {
                    request_id: *request_id,
                    ticket: created,
                }
            }
            Command::TicketSearchBegin {
                request_id,
                parameters,
            } => Response::TicketSearchBegin {
                request_id: *request_id,
                page: self.page(parameters, 0),
            },
            Command::TicketSearchNext {
                request_id,
                parameters,
                page_index,
            } => Response::TicketSearchNext {
                request_id: *request_id,
                page: self.page(parameters, page_index + 1),
            },
            Command::TicketSearchPrevious {
                request_id,
                parameters,
                page_index,
            } => Response::TicketSearchPrevious {
                request_id: *request_id,
                page: self.page(parameters, page_index - 1),
            },
            Command::PermissionGrant { request_id, grant } => {
                self.grants.push(grant.clone());
                Response::PermissionGrant {
                    request_id: *request_id,
                }
            }
        }
    }

    fn create(&mut self, creation: &TicketCreation) -> TicketSummary {
        let summary = TicketSummary {
            id: TicketId {
                project: creation.project.clone(),
                number: self.tickets.len() as u64 + 1,
            },
            title: creation.title.clone(),
            description: creation.description.clone(),
            reporter: Uuid::nil(),
        };
        self.tickets.push(summary.clone());
        summary
    }
}

/// `Transport` backed by a shared `ServerState`
#[derive(Clone, Default)]
pub struct FakeTransport {
    pub state: Rc<RefCell<ServerState>>,
}

impl FakeTransport {
    pub fn new(state: ServerState) -> Self {
        Self {
            state: Rc::new(RefCell::new(state)),
        }
    }
}

impl Transport for FakeTransport {
    fn get(&mut self, _url: &Url, cancel: &CancelToken) -> Result<HttpReply> {
        cancel.check()?;
        let mut state = self.state.borrow_mut();
        state.discovery_requests += 1;
        if state.discovery_fails {
            return Err(ClientError::io("connection refused"));
        }
        let body = match &state.discovery_body {
            Some(body) => body.clone(),
            None => serde_json::to_vec(&state.advertised).unwrap(),
        };
        Ok(HttpReply {
            status: state.discovery_status,
            content_type: Some(TEXT_MEDIA_TYPE.to_string()),
            body,
        })
    }

    fn post(
        &mut self,
        url: &Url,
        content_type: &str,
        body: Vec<u8>,
        cancel: &CancelToken,
    ) -> Result<HttpReply> {
        cancel.check()?;
        let mut state = self.state.borrow_mut();

        let encoding = match content_type {
            TEXT_MEDIA_TYPE => Encoding::Text,
            BINARY_MEDIA_TYPE => Encoding::Binary,
            other => panic!("unexpected content type {other}"),
        };
        let codec = codec_for(encoding);
        let command = codec.decode_command(&body).expect("client sent an undecodable command");

        state.endpoints.push(url.clone());
        state.media_types.push(content_type.to_string());
        state.commands.push(command.clone());

        let scripted = if state.script.is_empty() {
            None
        } else {
            Some(state.script.remove(0))
        };

        let response = match scripted {
            Some(Scripted::IoFailure) => return Err(ClientError::io("connection reset by peer")),
            Some(Scripted::CancelThenIoFailure(token)) => {
                token.cancel();
                return Err(ClientError::io("connection reset by peer"));
            }
            Some(Scripted::Garbage) => {
                return Ok(HttpReply {
                    status: 200,
                    content_type: Some(content_type.to_string()),
                    body: b"\x00garbage".to_vec(),
                })
            }
            Some(Scripted::ErrorResponse(code, message)) => {
                Response::error(command.request_id(), code, message)
            }
            Some(Scripted::WrongRequestId) => {
                let mut response = state.dispatch(&command);
                if let Response::TicketCreate { request_id, .. } = &mut response {
                    *request_id = ticketlink::protocol::RequestId::new();
                }
                response
            }
            Some(Scripted::WrongPageIndex) => {
                let mut response = state.dispatch(&command);
                match &mut response {
                    Response::TicketSearchNext { page, .. }
                    | Response::TicketSearchPrevious { page, .. } => page.page_index = 0,
                    _ => {}
                }
                response
            }
            Some(Scripted::CancelAfterReply(token)) => {
                token.cancel();
                state.dispatch(&command)
            }
            None => state.dispatch(&command),
        };

        Ok(HttpReply {
            status: 200,
            content_type: Some(content_type.to_string()),
            body: codec.encode_response(&response).unwrap(),
        })
    }

    fn attach_token(&mut self, _url: &Url, token: &AuthToken) {
        self.state
            .borrow_mut()
            .attached_tokens
            .push(token.expose().to_string());
    }

    fn clear_credentials(&mut self) {
        self.state.borrow_mut().credential_resets += 1;
    }
}

// =============================================================================
// Fake Identity
// =============================================================================

#[derive(Debug, Default)]
pub struct IdentityState {
    pub logins: u32,
    pub logouts: u32,
    pub reject_logins: bool,
    pub fail_logouts: bool,
    pub last_user: Option<String>,
}

#[derive(Clone, Default)]
pub struct FakeIdentity {
    pub state: Rc<RefCell<IdentityState>>,
}

impl IdentityProvider for FakeIdentity {
    fn login(
        &mut self,
        _transport: &mut dyn Transport,
        _base: &Url,
        credentials: &Credentials,
        cancel: &CancelToken,
    ) -> Result<Login> {
        cancel.check()?;
        let mut state = self.state.borrow_mut();
        state.logins += 1;
        state.last_user = Some(credentials.username.clone());
        if state.reject_logins || credentials.password() != "secret" {
            return Err(ClientError::authentication("invalid user name or password"));
        }
        Ok(Login {
            token: AuthToken::new(format!("token-{}", state.logins)),
            principal: Principal {
                id: Uuid::nil(),
                name: credentials.username.clone(),
            },
        })
    }

    fn logout(
        &mut self,
        _transport: &mut dyn Transport,
        _base: &Url,
        _token: &AuthToken,
        _cancel: &CancelToken,
    ) -> Result<()> {
        let mut state = self.state.borrow_mut();
        state.logouts += 1;
        if state.fail_logouts {
            return Err(ClientError::io("logout endpoint unreachable"));
        }
        Ok(())
    }
}

// =============================================================================
// Helpers
// =============================================================================

pub type FakeHandler = SessionHandler<FakeTransport, FakeIdentity>;

pub struct Harness {
    pub handler: FakeHandler,
    pub server: Rc<RefCell<ServerState>>,
    pub identity: Rc<RefCell<IdentityState>>,
}

pub fn harness(state: ServerState) -> Harness {
    harness_with(state, ClientConfig::builder().base_uri(BASE).build())
}

pub fn harness_with(state: ServerState, config: ClientConfig) -> Harness {
    let transport = FakeTransport::new(state);
    let identity = FakeIdentity::default();
    let server = Rc::clone(&transport.state);
    let identity_state = Rc::clone(&identity.state);
    let handler =
        SessionHandler::new(config, VersionRegistry::builtin(), transport, identity).unwrap();
    Harness {
        handler,
        server,
        identity: identity_state,
    }
}

pub fn credentials() -> Credentials {
    Credentials::new("alice", "secret")
}

pub fn connected(state: ServerState) -> Harness {
    let mut h = harness(state);
    h.handler.connect(credentials()).unwrap();
    h
}

pub fn search(page_size: u32) -> TicketSearchParameters {
    TicketSearchParameters {
        page_size,
        ..TicketSearchParameters::default()
    }
}
