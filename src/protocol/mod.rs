//! Protocol Module
//!
//! Defines the wire protocol between operators / telemetry adapters and
//! the pilot.
//!
//! ## Protocol Format (V1 - Binary frame, JSON payload)
//!
//! ### Request Format
//! ```text
//! ┌──────────┬──────────┬─────────────────────────────┐
//! │ Op (1)   │ Len (4)  │       JSON Payload          │
//! └──────────┴──────────┴─────────────────────────────┘
//! ```
//!
//! ### Requests
//! - 0x01: PING           - Payload: empty
//! - 0x02: LIST_SESSIONS  - Payload: empty
//! - 0x03: ADD_COMMENT    - Payload: {"tag", "text"}
//! - 0x04: REPLACE_TAGS   - Payload: {"tag", "tags": [..]}
//! - 0x05: START_REPLAY   - Payload: {"tag"}
//! - 0x06: STOP_REPLAY    - Payload: empty
//! - 0x07: PUBLISH        - Payload: event line
//! - 0x08: STOP_SESSION   - Payload: empty
//! - 0x09: STATUS         - Payload: empty
//! - 0x0A: PUBLISH_PENALTY - Payload: penalty notice (no capture time)
//!
//! ### Response Format
//! ```text
//! ┌──────────┬──────────┬─────────────────────────────┐
//! │Status(1) │ Len (4)  │       JSON Payload          │
//! └──────────┴──────────┴─────────────────────────────┘
//! ```
//!
//! ### Status Codes
//! - 0x00: OK
//! - 0x01: NOT_FOUND  (unknown session)
//! - 0x02: REJECTED   (not allowed in the current state)
//! - 0x03: ERROR

mod request;
mod response;
mod codec;

pub use request::{Request, RequestType};
pub use response::{Response, Status};
pub use codec::{
    decode_request, decode_response, encode_request, encode_response, read_request,
    read_response, write_request, write_response, HEADER_SIZE, MAX_PAYLOAD_SIZE,
};
