//! Blocking protocol client
//!
//! Used by the CLI and by telemetry adapters feeding live events.

use std::io::{BufReader, BufWriter};
use std::net::TcpStream;

use crate::controller::ControllerStatus;
use crate::error::{PitlogError, Result};
use crate::event::{Event, PenaltyMessage};
use crate::protocol::{read_response, write_request, Request, Response, Status};
use crate::session::{Metadata, SessionInfo};

/// A connection to a pilot server
pub struct Client {
    reader: BufReader<TcpStream>,
    writer: BufWriter<TcpStream>,
}

impl Client {
    pub fn connect(addr: &str) -> Result<Self> {
        let stream = TcpStream::connect(addr)
            .map_err(|e| PitlogError::Network(format!("Failed to connect to {}: {}", addr, e)))?;
        stream.set_nodelay(true)?;
        let read_stream = stream.try_clone()?;
        Ok(Self {
            reader: BufReader::new(read_stream),
            writer: BufWriter::new(stream),
        })
    }

    /// Send a request and return the raw response
    pub fn call(&mut self, request: &Request) -> Result<Response> {
        write_request(&mut self.writer, request)?;
        read_response(&mut self.reader)
    }

    pub fn ping(&mut self) -> Result<String> {
        self.call_json(&Request::Ping)
    }

    pub fn list_sessions(&mut self) -> Result<Vec<SessionInfo>> {
        self.call_json(&Request::ListSessions)
    }

    pub fn add_comment(&mut self, tag: &str, text: &str) -> Result<Metadata> {
        self.call_json(&Request::AddComment {
            tag: tag.to_string(),
            text: text.to_string(),
        })
    }

    pub fn replace_tags(&mut self, tag: &str, tags: Vec<String>) -> Result<Metadata> {
        self.call_json(&Request::ReplaceTags {
            tag: tag.to_string(),
            tags,
        })
    }

    pub fn start_replay(&mut self, tag: &str) -> Result<()> {
        self.call_unit(&Request::StartReplay {
            tag: tag.to_string(),
        })
    }

    /// Returns false if nothing was replaying
    pub fn stop_replay(&mut self) -> Result<bool> {
        self.call_json(&Request::StopReplay)
    }

    pub fn publish(&mut self, event: Event) -> Result<()> {
        self.call_unit(&Request::Publish { event })
    }

    /// Forward a penalty notice; the pilot stamps its capture time
    pub fn publish_penalty(&mut self, notice: PenaltyMessage) -> Result<()> {
        self.call_unit(&Request::PublishPenalty { notice })
    }

    pub fn stop_session(&mut self) -> Result<()> {
        self.call_unit(&Request::StopSession)
    }

    pub fn status(&mut self) -> Result<ControllerStatus> {
        self.call_json(&Request::Status)
    }

    fn call_unit(&mut self, request: &Request) -> Result<()> {
        let response = self.call(request)?;
        check(&response)
    }

    fn call_json<T: serde::de::DeserializeOwned>(&mut self, request: &Request) -> Result<T> {
        let response = self.call(request)?;
        check(&response)?;
        response.json()
    }
}

/// Turn a non-OK response back into an error
fn check(response: &Response) -> Result<()> {
    match response.status {
        Status::Ok => Ok(()),
        Status::NotFound => Err(PitlogError::Network(format!(
            "not found: {}",
            response.message()
        ))),
        Status::Rejected => Err(PitlogError::Network(format!(
            "rejected: {}",
            response.message()
        ))),
        Status::Error => Err(PitlogError::Network(format!(
            "server error: {}",
            response.message()
        ))),
    }
}
