//! Session Module
//!
//! Connection lifecycle and paginated search.
//!
//! ## Responsibilities
//! - Negotiate a version and log in as one transition
//! - Dispatch every domain call through the negotiated codec
//! - Demote to disconnected when the channel fails
//! - Reconnect once, implicitly, when a call arrives while disconnected
//! - Keep the search cursor consistent across round trips

mod state;
mod cursor;
mod handler;

pub use state::{Session, SessionState};
pub use cursor::Cursor;
pub use handler::{HttpSessionHandler, SessionHandler};
