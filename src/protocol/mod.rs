//! Protocol Module
//!
//! Defines the command/response message model and its wire encodings.
//!
//! ## Message Model
//! Every command carries a request id and is answered by exactly one
//! response of the matching variant, or by an error response:
//!
//! | Command                | Response                          |
//! |------------------------|-----------------------------------|
//! | `TicketCreate`         | `TicketCreate { ticket }`         |
//! | `TicketSearchBegin`    | `TicketSearchBegin { page }`      |
//! | `TicketSearchNext`     | `TicketSearchNext { page }`       |
//! | `TicketSearchPrevious` | `TicketSearchPrevious { page }`   |
//! | `PermissionGrant`      | `PermissionGrant`                 |
//! | any                    | `Error { error_code, message }`   |
//!
//! ## Encodings
//! - Text: `application/json`
//! - Binary: `application/x-ticketlink-binary` (framed bincode, CRC32)

mod command;
mod response;
mod codec;
pub mod model;

pub use command::{Command, CommandType, RequestId};
pub use response::{ErrorResponse, Response};
pub use codec::{
    codec_for, BinaryCodec, CommandCodec, Encoding, TextCodec, BINARY_MEDIA_TYPE, HEADER_SIZE,
    MAGIC, MAX_PAYLOAD_SIZE, TEXT_MEDIA_TYPE,
};
pub use model::{
    Page, Permission, PermissionGrant, PermissionScope, TicketColumn, TicketCreation, TicketId,
    TicketOrdering, TicketSearchParameters, TicketSummary,
};
