//! # Stream Codec
//!
//! Reads and writes frames on blocking byte streams (stdin/stdout of a shim
//! process, or the child pipes held by a caller).
//!
//! Reads retry until the buffer is full: a short read is progress, not an
//! error. Only an error from the source, or end-of-stream, stops a read.

use std::io::{self, Read, Write};

use crate::domain::{
    RequestFrame, RequestHeader, ResponseFrame, ResponseHeader, Status, MAX_BODY_LEN,
    REQUEST_HEADER_SIZE, RESPONSE_HEADER_SIZE,
};
use crate::errors::{WireError, WireResult};

/// Fill `buf` from `reader`, returning how many bytes arrived before
/// end-of-stream. `Interrupted` reads are retried.
fn read_until_full<R: Read + ?Sized>(reader: &mut R, buf: &mut [u8]) -> io::Result<usize> {
    let mut filled = 0;
    while filled < buf.len() {
        match reader.read(&mut buf[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        }
    }
    Ok(filled)
}

/// Read a fixed-size header. End-of-stream before the first byte is `Closed`.
fn read_header<R: Read + ?Sized, const N: usize>(reader: &mut R) -> WireResult<[u8; N]> {
    let mut header = [0u8; N];
    match read_until_full(reader, &mut header)? {
        0 => Err(WireError::Closed),
        n if n < N => Err(WireError::Truncated {
            expected: N,
            received: n,
        }),
        _ => Ok(header),
    }
}

fn read_body<R: Read + ?Sized>(reader: &mut R, len: usize) -> WireResult<Vec<u8>> {
    let mut body = vec![0u8; len];
    let received = read_until_full(reader, &mut body)?;
    if received < len {
        return Err(WireError::Truncated {
            expected: len,
            received,
        });
    }
    Ok(body)
}

fn body_len(len: usize) -> WireResult<u16> {
    u16::try_from(len).map_err(|_| WireError::BodyTooLarge {
        len,
        max: MAX_BODY_LEN,
    })
}

// =============================================================================
// SHIM SIDE: read requests, write responses
// =============================================================================

/// Read one request frame.
///
/// # Errors
///
/// `Closed` if the stream ended between frames, `Truncated` if it ended
/// inside one, `Io` for source errors.
pub fn read_request<R: Read + ?Sized>(reader: &mut R) -> WireResult<RequestFrame> {
    let header = RequestHeader::decode(read_header::<_, REQUEST_HEADER_SIZE>(reader)?);
    let body = read_body(reader, usize::from(header.body_len))?;
    Ok(RequestFrame {
        address: header.address,
        body,
    })
}

/// Write one response frame: length, status, body, then flush.
///
/// Writes are sequential and not rolled back if a later one fails.
pub fn write_response<W: Write + ?Sized>(writer: &mut W, frame: &ResponseFrame) -> WireResult<()> {
    let header = ResponseHeader {
        body_len: body_len(frame.body.len())?,
        status: frame.status.as_byte(),
    };
    writer.write_all(&header.encode())?;
    writer.write_all(&frame.body)?;
    writer.flush()?;
    Ok(())
}

// =============================================================================
// CALLER SIDE: write requests, read responses
// =============================================================================

/// Write one request frame and flush.
pub fn write_request<W: Write + ?Sized>(
    writer: &mut W,
    address: u8,
    body: &[u8],
) -> WireResult<()> {
    let header = RequestHeader {
        body_len: body_len(body.len())?,
        address,
    };
    writer.write_all(&header.encode())?;
    writer.write_all(body)?;
    writer.flush()?;
    Ok(())
}

/// Read one response frame.
pub fn read_response<R: Read + ?Sized>(reader: &mut R) -> WireResult<ResponseFrame> {
    let header = ResponseHeader::decode(read_header::<_, RESPONSE_HEADER_SIZE>(reader)?);
    let status = Status::from_byte(header.status).ok_or(WireError::InvalidStatus(header.status))?;
    let body = read_body(reader, usize::from(header.body_len))?;
    Ok(ResponseFrame { status, body })
}

// =============================================================================
// TESTS
// =============================================================================
