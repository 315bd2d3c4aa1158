//! Protocol codec
//!
//! Encoding and decoding functions for the wire protocol.
//!
//! ## Wire Format
//! ```text
//! ┌──────────┬──────────┬─────────────────────────────┐
//! │ Op (1)   │ Len (4)  │       JSON Payload          │
//! └──────────┴──────────┴─────────────────────────────┘
//! ```
//! Length is big-endian. Requests without arguments carry no payload.

use std::io::{Read, Write};

use bytes::{BufMut, BytesMut};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::error::{PitlogError, Result};
use crate::event::{Event, PenaltyMessage};

use super::{Request, RequestType, Response, Status};

/// Header size: 1 byte op/status + 4 bytes length
pub const HEADER_SIZE: usize = 5;

/// Maximum payload size (16 MB)
pub const MAX_PAYLOAD_SIZE: u32 = 16 * 1024 * 1024;

// =============================================================================
// Payload shapes
// =============================================================================

#[derive(Serialize, Deserialize)]
struct TagPayload {
    tag: String,
}

#[derive(Serialize, Deserialize)]
struct CommentPayload {
    tag: String,
    text: String,
}

#[derive(Serialize, Deserialize)]
struct TagsPayload {
    tag: String,
    tags: Vec<String>,
}

// =============================================================================
// Request Encoding/Decoding
// =============================================================================

/// Encode a request to bytes
///
/// Format: op (1) + payload_len (4) + payload
pub fn encode_request(request: &Request) -> Result<Vec<u8>> {
    let payload = match request {
        Request::Ping
        | Request::ListSessions
        | Request::StopReplay
        | Request::StopSession
        | Request::Status => Vec::new(),
        Request::AddComment { tag, text } => serde_json::to_vec(&CommentPayload {
            tag: tag.clone(),
            text: text.clone(),
        })?,
        Request::ReplaceTags { tag, tags } => serde_json::to_vec(&TagsPayload {
            tag: tag.clone(),
            tags: tags.clone(),
        })?,
        Request::StartReplay { tag } => serde_json::to_vec(&TagPayload { tag: tag.clone() })?,
        Request::Publish { event } => serde_json::to_vec(event)?,
        Request::PublishPenalty { notice } => serde_json::to_vec(notice)?,
    };

    Ok(frame(request.request_type() as u8, &payload))
}

/// Decode a request from bytes
pub fn decode_request(bytes: &[u8]) -> Result<Request> {
    let (op, payload) = unframe(bytes, "request")?;

    let request_type = RequestType::from_byte(op)
        .ok_or_else(|| PitlogError::Protocol(format!("Unknown request type: 0x{:02x}", op)))?;

    match request_type {
        RequestType::Ping => expect_empty(payload, "PING").map(|_| Request::Ping),
        RequestType::ListSessions => {
            expect_empty(payload, "LIST_SESSIONS").map(|_| Request::ListSessions)
        }
        RequestType::StopReplay => expect_empty(payload, "STOP_REPLAY").map(|_| Request::StopReplay),
        RequestType::StopSession => {
            expect_empty(payload, "STOP_SESSION").map(|_| Request::StopSession)
        }
        RequestType::Status => expect_empty(payload, "STATUS").map(|_| Request::Status),
        RequestType::AddComment => {
            let p: CommentPayload = parse_payload(payload, "ADD_COMMENT")?;
            Ok(Request::AddComment {
                tag: p.tag,
                text: p.text,
            })
        }
        RequestType::ReplaceTags => {
            let p: TagsPayload = parse_payload(payload, "REPLACE_TAGS")?;
            Ok(Request::ReplaceTags {
                tag: p.tag,
                tags: p.tags,
            })
        }
        RequestType::StartReplay => {
            let p: TagPayload = parse_payload(payload, "START_REPLAY")?;
            Ok(Request::StartReplay { tag: p.tag })
        }
        RequestType::Publish => {
            let event: Event = parse_payload(payload, "PUBLISH")?;
            Ok(Request::Publish { event })
        }
        RequestType::PublishPenalty => {
            let notice: PenaltyMessage = parse_payload(payload, "PUBLISH_PENALTY")?;
            Ok(Request::PublishPenalty { notice })
        }
    }
}

fn expect_empty(payload: &[u8], name: &str) -> Result<()> {
    if !payload.is_empty() {
        return Err(PitlogError::Protocol(format!(
            "{} request: unexpected payload of {} bytes",
            name,
            payload.len()
        )));
    }
    Ok(())
}

fn parse_payload<T: DeserializeOwned>(payload: &[u8], name: &str) -> Result<T> {
    serde_json::from_slice(payload)
        .map_err(|e| PitlogError::Protocol(format!("{} request: invalid payload: {}", name, e)))
}

// =============================================================================
// Response Encoding/Decoding
// =============================================================================

/// Encode a response to bytes
///
/// Format: status (1) + payload_len (4) + payload
pub fn encode_response(response: &Response) -> Vec<u8> {
    let payload = response.payload.as_deref().unwrap_or(&[]);
    frame(response.status as u8, payload)
}

/// Decode a response from bytes
pub fn decode_response(bytes: &[u8]) -> Result<Response> {
    let (status_byte, payload) = unframe(bytes, "response")?;

    let status = Status::from_byte(status_byte).ok_or_else(|| {
        PitlogError::Protocol(format!("Unknown response status: 0x{:02x}", status_byte))
    })?;

    let payload = if payload.is_empty() {
        None
    } else {
        Some(payload.to_vec())
    };

    Ok(Response { status, payload })
}

// =============================================================================
// Framing
// =============================================================================

fn frame(code: u8, payload: &[u8]) -> Vec<u8> {
    let mut message = BytesMut::with_capacity(HEADER_SIZE + payload.len());
    message.put_u8(code);
    message.put_u32(payload.len() as u32);
    message.put_slice(payload);
    message.to_vec()
}

/// Split a complete frame into its code and payload
fn unframe<'a>(bytes: &'a [u8], what: &str) -> Result<(u8, &'a [u8])> {
    if bytes.len() < HEADER_SIZE {
        return Err(PitlogError::Protocol(format!(
            "Incomplete {} header: expected {} bytes, got {}",
            what,
            HEADER_SIZE,
            bytes.len()
        )));
    }

    let code = bytes[0];
    let payload_len = payload_len(&bytes[..HEADER_SIZE])?;

    let total_len = HEADER_SIZE + payload_len;
    if bytes.len() < total_len {
        return Err(PitlogError::Protocol(format!(
            "Incomplete {} payload: expected {} bytes, got {}",
            what,
            total_len,
            bytes.len()
        )));
    }

    Ok((code, &bytes[HEADER_SIZE..total_len]))
}

/// Parse and validate the length field of a header
fn payload_len(header: &[u8]) -> Result<usize> {
    let len = u32::from_be_bytes([header[1], header[2], header[3], header[4]]);
    if len > MAX_PAYLOAD_SIZE {
        return Err(PitlogError::Protocol(format!(
            "Payload too large: {} bytes (max {})",
            len, MAX_PAYLOAD_SIZE
        )));
    }
    Ok(len as usize)
}

// =============================================================================
// Stream-based I/O helpers
// =============================================================================

/// Read one complete frame from a stream
fn read_frame<R: Read>(reader: &mut R) -> Result<Vec<u8>> {
    let mut header = [0u8; HEADER_SIZE];
    reader.read_exact(&mut header)?;

    let len = payload_len(&header)?;

    let mut message = Vec::with_capacity(HEADER_SIZE + len);
    message.extend_from_slice(&header);
    message.resize(HEADER_SIZE + len, 0);
    if len > 0 {
        reader.read_exact(&mut message[HEADER_SIZE..])?;
    }
    Ok(message)
}

/// Read a complete request from a stream
///
/// Blocks until a complete request is received or an error occurs
pub fn read_request<R: Read>(reader: &mut R) -> Result<Request> {
    decode_request(&read_frame(reader)?)
}

/// Write a request to a stream
pub fn write_request<W: Write>(writer: &mut W, request: &Request) -> Result<()> {
    let bytes = encode_request(request)?;
    writer.write_all(&bytes)?;
    writer.flush()?;
    Ok(())
}

/// Read a complete response from a stream
pub fn read_response<R: Read>(reader: &mut R) -> Result<Response> {
    decode_response(&read_frame(reader)?)
}

/// Write a response to a stream
pub fn write_response<W: Write>(writer: &mut W, response: &Response) -> Result<()> {
    let bytes = encode_response(response);
    writer.write_all(&bytes)?;
    writer.flush()?;
    Ok(())
}
