//! # Frames
//!
//! Length-prefixed message units exchanged over the pipe boundary.
//!
//! ```text
//! request:  [len_hi][len_lo][address][body: len bytes]
//! response: [len_hi][len_lo][status ][body: len bytes]
//! ```
//!
//! All multi-byte integers are big-endian.

use std::borrow::Cow;

/// Request header size in bytes (length + address).
pub const REQUEST_HEADER_SIZE: usize = 3;

/// Response header size in bytes (length + status).
pub const RESPONSE_HEADER_SIZE: usize = 3;

/// Largest body the 16-bit length field can describe.
pub const MAX_BODY_LEN: usize = u16::MAX as usize;

/// Response status byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Status {
    /// Body is the precompile output.
    Success = 0,
    /// Body is a UTF-8 error message.
    Error = 1,
}

impl Status {
    /// Wire representation.
    #[must_use]
    pub fn as_byte(self) -> u8 {
        self as u8
    }

    /// Parse a wire status byte.
    #[must_use]
    pub fn from_byte(byte: u8) -> Option<Self> {
        match byte {
            0 => Some(Self::Success),
            1 => Some(Self::Error),
            _ => None,
        }
    }
}

/// Decoded request header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RequestHeader {
    /// Body length in bytes.
    pub body_len: u16,
    /// Precompile address.
    pub address: u8,
}

impl RequestHeader {
    /// Encode to wire bytes.
    #[must_use]
    pub fn encode(&self) -> [u8; REQUEST_HEADER_SIZE] {
        let [hi, lo] = self.body_len.to_be_bytes();
        [hi, lo, self.address]
    }

    /// Decode from wire bytes.
    #[must_use]
    pub fn decode(bytes: [u8; REQUEST_HEADER_SIZE]) -> Self {
        Self {
            body_len: u16::from_be_bytes([bytes[0], bytes[1]]),
            address: bytes[2],
        }
    }
}

/// Decoded response header. The status byte is kept raw so the reader can
/// report an invalid value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResponseHeader {
    /// Body length in bytes.
    pub body_len: u16,
    /// Raw status byte.
    pub status: u8,
}

impl ResponseHeader {
    /// Encode to wire bytes.
    #[must_use]
    pub fn encode(&self) -> [u8; RESPONSE_HEADER_SIZE] {
        let [hi, lo] = self.body_len.to_be_bytes();
        [hi, lo, self.status]
    }

    /// Decode from wire bytes.
    #[must_use]
    pub fn decode(bytes: [u8; RESPONSE_HEADER_SIZE]) -> Self {
        Self {
            body_len: u16::from_be_bytes([bytes[0], bytes[1]]),
            status: bytes[2],
        }
    }
}

/// A request read from the caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestFrame {
    /// Precompile address.
    pub address: u8,
    /// Precompile input.
    pub body: Vec<u8>,
}

impl RequestFrame {
    /// Create a request frame.
    pub fn new(address: u8, body: impl Into<Vec<u8>>) -> Self {
        Self {
            address,
            body: body.into(),
        }
    }
}

/// A response sent back to the caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResponseFrame {
    /// Success or error.
    pub status: Status,
    /// Output bytes or error message.
    pub body: Vec<u8>,
}

impl ResponseFrame {
    /// Successful response carrying raw output bytes.
    pub fn success(body: impl Into<Vec<u8>>) -> Self {
        Self {
            status: Status::Success,
            body: body.into(),
        }
    }

    /// Error response carrying a message.
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            status: Status::Error,
            body: message.into().into_bytes(),
        }
    }

    /// Returns true for error responses.
    #[must_use]
    pub fn is_error(&self) -> bool {
        self.status == Status::Error
    }

    /// Body interpreted as an error message.
    #[must_use]
    pub fn message(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.body)
    }

    /// Converts into `Ok(output)` or `Err(message)`.
    pub fn into_result(self) -> Result<Vec<u8>, String> {
        match self.status {
            Status::Success => Ok(self.body),
            Status::Error => Err(String::from_utf8_lossy(&self.body).into_owned()),
        }
    }
}
