//! # ticketlink
//!
//! Client for a ticket tracker server with:
//! - Protocol version discovery and negotiation
//! - A two-state session lifecycle with failure demotion and one implicit
//!   reconnect
//! - Text (JSON) and binary (framed bincode) command encodings
//! - Cursor-based paginated search
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                    Domain Operations                         │
//! │   ticket_create · ticket_search_* · permission_grant         │
//! └─────────────────────┬───────────────────────────────────────┘
//!                       │
//! ┌─────────────────────▼───────────────────────────────────────┐
//! │                   SessionHandler                             │
//! │        (Disconnected ⇄ Connected, Cursor)                    │
//! └───────┬─────────────────────┬───────────────────┬───────────┘
//!         │                     │                   │
//!         ▼                     ▼                   ▼
//!  ┌─────────────┐      ┌──────────────┐    ┌─────────────┐
//!  │  Version    │      │ CommandCodec │    │  Identity   │
//!  │ Negotiator  │      │ (text / bin) │    │ (login/out) │
//!  └──────┬──────┘      └──────┬───────┘    └──────┬──────┘
//!         └────────────────────┼───────────────────┘
//!                              ▼
//!                      ┌──────────────┐
//!                      │  Transport   │
//!                      │ (HTTP, jar)  │
//!                      └──────────────┘
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod config;

pub mod version;
pub mod protocol;
pub mod transport;
pub mod identity;
pub mod session;

// =============================================================================
// Public API Re-exports
// =============================================================================

pub use error::{ClientError, ErrorCode, Result};
pub use config::ClientConfig;
pub use identity::Credentials;
pub use session::{HttpSessionHandler, SessionHandler};

// =============================================================================
// Version Info
// =============================================================================

/// Current version of ticketlink
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
