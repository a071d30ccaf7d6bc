//! Protocol codec
//!
//! Encoding and decoding functions for the wire protocol. Every negotiated
//! version speaks one or both of two encodings.
//!
//! ## Text Encoding (`application/json`)
//! Field-tagged JSON; each message is an object keyed by its variant name:
//! ```text
//! {"TicketSearchNext":{"request_id":"…","parameters":{…},"page_index":1}}
//! ```
//!
//! ## Binary Encoding (`application/x-ticketlink-binary`)
//! ```text
//! ┌───────────┬──────────┬──────────┬──────────┬─────────────────────┐
//! │ Magic (4) │ Kind (1) │ Len (4)  │ CRC (4)  │   bincode payload   │
//! └───────────┴──────────┴──────────┴──────────┴─────────────────────┘
//! ```
//! - Magic: `TKLB`
//! - Kind: 0x01 command, 0x02 response
//! - Len and CRC (CRC32 of the payload) are big-endian
//! - Payload: positional bincode (varint integers)

use std::fmt;
use std::str::FromStr;

use bincode::Options;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::error::{ClientError, Result};

use super::{Command, Response};

/// Media type of the text encoding
pub const TEXT_MEDIA_TYPE: &str = "application/json";

/// Media type of the binary encoding
pub const BINARY_MEDIA_TYPE: &str = "application/x-ticketlink-binary";

/// Binary frame magic
pub const MAGIC: [u8; 4] = *b"TKLB";

/// Binary header size: magic (4) + kind (1) + length (4) + crc (4)
pub const HEADER_SIZE: usize = 13;

/// Maximum payload size (16 MB)
pub const MAX_PAYLOAD_SIZE: u32 = 16 * 1024 * 1024;

const KIND_COMMAND: u8 = 0x01;
const KIND_RESPONSE: u8 = 0x02;

// =============================================================================
// Encodings
// =============================================================================

/// Wire encodings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Encoding {
    /// Self-describing JSON
    Text,

    /// Framed positional bincode
    Binary,
}

impl Encoding {
    pub fn media_type(&self) -> &'static str {
        match self {
            Encoding::Text => TEXT_MEDIA_TYPE,
            Encoding::Binary => BINARY_MEDIA_TYPE,
        }
    }
}

impl fmt::Display for Encoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Encoding::Text => f.write_str("text"),
            Encoding::Binary => f.write_str("binary"),
        }
    }
}

impl FromStr for Encoding {
    type Err = ClientError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "text" => Ok(Encoding::Text),
            "binary" => Ok(Encoding::Binary),
            other => Err(ClientError::Config(format!("unknown encoding: {}", other))),
        }
    }
}

/// Encodes and decodes messages for one negotiated version
///
/// The client uses `encode_command` and `decode_response`; the other half
/// lets an in-process server speak the same wire format.
pub trait CommandCodec: fmt::Debug + Send + Sync {
    fn encoding(&self) -> Encoding;

    fn media_type(&self) -> &'static str {
        self.encoding().media_type()
    }

    fn encode_command(&self, command: &Command) -> Result<Vec<u8>>;

    fn decode_command(&self, bytes: &[u8]) -> Result<Command>;

    fn encode_response(&self, response: &Response) -> Result<Vec<u8>>;

    /// Decode a response, checking invariants such as page bounds
    fn decode_response(&self, bytes: &[u8]) -> Result<Response>;
}

/// The codec for an encoding
pub fn codec_for(encoding: Encoding) -> Box<dyn CommandCodec> {
    match encoding {
        Encoding::Text => Box::new(TextCodec),
        Encoding::Binary => Box::new(BinaryCodec),
    }
}

// =============================================================================
// Text Codec
// =============================================================================

/// JSON codec
#[derive(Debug, Clone, Copy, Default)]
pub struct TextCodec;

impl TextCodec {
    fn encode<T: Serialize>(value: &T) -> Result<Vec<u8>> {
        serde_json::to_vec(value).map_err(|e| {
            ClientError::serialization(format!("JSON encoding failed: {}", e)).with_source(e)
        })
    }

    fn decode<T: DeserializeOwned>(bytes: &[u8]) -> Result<T> {
        if bytes.len() > MAX_PAYLOAD_SIZE as usize {
            return Err(ClientError::protocol(format!(
                "Payload too large: {} bytes (max {})",
                bytes.len(),
                MAX_PAYLOAD_SIZE
            )));
        }

        serde_json::from_slice(bytes).map_err(|e| {
            use serde_json::error::Category;
            match e.classify() {
                // Well-formed JSON of the wrong shape
                Category::Data => {
                    ClientError::protocol(format!("unexpected message shape: {}", e)).with_source(e)
                }
                Category::Syntax | Category::Eof | Category::Io => {
                    ClientError::serialization(format!("malformed JSON: {}", e)).with_source(e)
                }
            }
        })
    }
}

impl CommandCodec for TextCodec {
    fn encoding(&self) -> Encoding {
        Encoding::Text
    }

    fn encode_command(&self, command: &Command) -> Result<Vec<u8>> {
        Self::encode(command)
    }

    fn decode_command(&self, bytes: &[u8]) -> Result<Command> {
        Self::decode(bytes)
    }

    fn encode_response(&self, response: &Response) -> Result<Vec<u8>> {
        Self::encode(response)
    }

    fn decode_response(&self, bytes: &[u8]) -> Result<Response> {
        let response: Response = Self::decode(bytes)?;
        response.validate()?;
        Ok(response)
    }
}

// =============================================================================
// Binary Codec
// =============================================================================

/// Framed bincode codec
#[derive(Debug, Clone, Copy, Default)]
pub struct BinaryCodec;

impl BinaryCodec {
    fn options() -> impl Options {
        bincode::DefaultOptions::new()
            .with_limit(u64::from(MAX_PAYLOAD_SIZE))
            .reject_trailing_bytes()
    }

    /// Build a frame: header + payload
    fn encode<T: Serialize>(kind: u8, value: &T) -> Result<Vec<u8>> {
        let payload = Self::options().serialize(value).map_err(|e| {
            ClientError::serialization(format!("binary encoding failed: {}", e)).with_source(e)
        })?;

        let mut message = Vec::with_capacity(HEADER_SIZE + payload.len());
        message.extend_from_slice(&MAGIC);
        message.push(kind);
        message.extend_from_slice(&(payload.len() as u32).to_be_bytes());
        message.extend_from_slice(&crc32fast::hash(&payload).to_be_bytes());
        message.extend_from_slice(&payload);

        Ok(message)
    }

    /// Check a frame's header and checksum, returning its payload
    fn unframe(expected_kind: u8, bytes: &[u8]) -> Result<&[u8]> {
        if bytes.len() < HEADER_SIZE {
            return Err(ClientError::serialization(format!(
                "Incomplete header: expected {} bytes, got {}",
                HEADER_SIZE,
                bytes.len()
            )));
        }

        if bytes[0..4] != MAGIC {
            return Err(ClientError::protocol(format!(
                "Bad frame magic: {:02x?}",
                &bytes[0..4]
            )));
        }

        let kind = bytes[4];
        if kind != expected_kind {
            return Err(ClientError::protocol(format!(
                "Unexpected frame kind: 0x{:02x} (expected 0x{:02x})",
                kind, expected_kind
            )));
        }

        let payload_len = u32::from_be_bytes([bytes[5], bytes[6], bytes[7], bytes[8]]) as usize;
        let expected_crc = u32::from_be_bytes([bytes[9], bytes[10], bytes[11], bytes[12]]);

        // Validate payload length
        if payload_len > MAX_PAYLOAD_SIZE as usize {
            return Err(ClientError::protocol(format!(
                "Payload too large: {} bytes (max {})",
                payload_len, MAX_PAYLOAD_SIZE
            )));
        }

        let total_len = HEADER_SIZE + payload_len;
        if bytes.len() != total_len {
            return Err(ClientError::serialization(format!(
                "Frame length mismatch: expected {} bytes, got {}",
                total_len,
                bytes.len()
            )));
        }

        let payload = &bytes[HEADER_SIZE..total_len];
        let actual_crc = crc32fast::hash(payload);
        if actual_crc != expected_crc {
            return Err(ClientError::serialization(format!(
                "Checksum mismatch: expected {:08x}, got {:08x}",
                expected_crc, actual_crc
            )));
        }

        Ok(payload)
    }

    fn decode<T: DeserializeOwned>(kind: u8, bytes: &[u8]) -> Result<T> {
        let payload = Self::unframe(kind, bytes)?;
        Self::options().deserialize(payload).map_err(|e| {
            ClientError::serialization(format!("undecodable binary payload: {}", e)).with_source(e)
        })
    }
}

impl CommandCodec for BinaryCodec {
    fn encoding(&self) -> Encoding {
        Encoding::Binary
    }

    fn encode_command(&self, command: &Command) -> Result<Vec<u8>> {
        Self::encode(KIND_COMMAND, command)
    }

    fn decode_command(&self, bytes: &[u8]) -> Result<Command> {
        Self::decode(KIND_COMMAND, bytes)
    }

    fn encode_response(&self, response: &Response) -> Result<Vec<u8>> {
        Self::encode(KIND_RESPONSE, response)
    }

    fn decode_response(&self, bytes: &[u8]) -> Result<Response> {
        let response: Response = Self::decode(KIND_RESPONSE, bytes)?;
        response.validate()?;
        Ok(response)
    }
}
