//! Connection Handler
//!
//! Handles individual client connections.

use std::io::{BufReader, BufWriter, ErrorKind};
use std::net::TcpStream;
use std::time::Duration;

use crate::controller::ControllerHandle;
use crate::error::{PitlogError, Result};
use crate::protocol::{read_request, write_response, Request, Response};
use crate::session::SessionStore;

/// Handles a single client connection
pub struct Connection {
    /// TCP stream reader (buffered for efficiency)
    reader: BufReader<TcpStream>,

    /// TCP stream writer (buffered for efficiency)
    writer: BufWriter<TcpStream>,

    /// Recorder/player of this pilot
    controller: ControllerHandle,

    /// Session listing and annotation
    store: SessionStore,

    /// Peer address for logging
    peer_addr: String,
}

impl Connection {
    /// Create a new connection handler
    pub fn new(stream: TcpStream, controller: ControllerHandle, store: SessionStore) -> Result<Self> {
        let peer_addr = stream
            .peer_addr()
            .map(|a| a.to_string())
            .unwrap_or_else(|_| "unknown".to_string());

        // Disable Nagle's algorithm for low latency
        stream.set_nodelay(true)?;

        let read_stream = stream.try_clone()?;
        let write_stream = stream;

        Ok(Self {
            reader: BufReader::new(read_stream),
            writer: BufWriter::new(write_stream),
            controller,
            store,
            peer_addr,
        })
    }

    /// Configure connection timeouts (0 disables a timeout)
    pub fn set_timeouts(&mut self, read_ms: u64, write_ms: u64) -> Result<()> {
        if read_ms > 0 {
            self.reader
                .get_ref()
                .set_read_timeout(Some(Duration::from_millis(read_ms)))?;
        }
        if write_ms > 0 {
            self.writer
                .get_ref()
                .set_write_timeout(Some(Duration::from_millis(write_ms)))?;
        }
        Ok(())
    }

    /// Handle the connection (blocking until closed)
    ///
    /// Reads requests in a loop and sends responses.
    /// Returns when the client disconnects or an error occurs.
    pub fn handle(&mut self) -> Result<()> {
        tracing::debug!("Connection established from {}", self.peer_addr);

        loop {
            let request = match read_request(&mut self.reader) {
                Ok(request) => request,
                Err(PitlogError::Io(ref e)) if is_disconnect(e.kind()) => {
                    tracing::debug!("Client {} disconnected ({:?})", self.peer_addr, e.kind());
                    return Ok(());
                }
                Err(PitlogError::Io(ref e))
                    if matches!(e.kind(), ErrorKind::WouldBlock | ErrorKind::TimedOut) =>
                {
                    tracing::debug!("Read timeout for client {}", self.peer_addr);
                    return Ok(());
                }
                Err(e) => {
                    tracing::warn!("Error reading from {}: {}", self.peer_addr, e);
                    let _ = write_response(&mut self.writer, &Response::error(&e.to_string()));
                    return Err(e);
                }
            };

            tracing::trace!("Received request from {}: {:?}", self.peer_addr, request);

            let response = self.execute(request);

            if let Err(e) = write_response(&mut self.writer, &response) {
                if let PitlogError::Io(ref io_err) = e {
                    if is_disconnect(io_err.kind()) {
                        tracing::debug!(
                            "Client {} disconnected before response could be sent: {}",
                            self.peer_addr,
                            e
                        );
                        return Ok(());
                    }
                }
                tracing::warn!("Error writing to {}: {}", self.peer_addr, e);
                return Err(e);
            }
        }
    }

    /// Execute a request and return a response
    fn execute(&self, request: Request) -> Response {
        let result = match request {
            Request::Ping => Response::ok_json(&"PONG"),
            Request::ListSessions => self
                .store
                .list()
                .and_then(|sessions| Response::ok_json(&sessions)),
            Request::AddComment { tag, text } => self
                .store
                .append_comment(&tag, &text)
                .and_then(|metadata| Response::ok_json(&metadata)),
            Request::ReplaceTags { tag, tags } => self
                .store
                .replace_tags(&tag, tags)
                .and_then(|metadata| Response::ok_json(&metadata)),
            Request::StartReplay { tag } => {
                self.controller.start_replay(&tag).map(|_| Response::ok())
            }
            Request::StopReplay => self
                .controller
                .stop_replay()
                .and_then(|stopped| Response::ok_json(&stopped)),
            Request::Publish { event } => {
                self.controller.record_and_wait(event).map(|_| Response::ok())
            }
            Request::PublishPenalty { notice } => self
                .controller
                .record_penalty_and_wait(notice)
                .map(|_| Response::ok()),
            Request::StopSession => self.controller.stop_session().map(|_| Response::ok()),
            Request::Status => self
                .controller
                .status()
                .and_then(|status| Response::ok_json(&status)),
        };

        result.unwrap_or_else(|e| {
            tracing::debug!("Request from {} failed: {}", self.peer_addr, e);
            Response::from_error(&e)
        })
    }

    /// Get the peer address string
    pub fn peer_addr(&self) -> &str {
        &self.peer_addr
    }
}

fn is_disconnect(kind: ErrorKind) -> bool {
    matches!(
        kind,
        ErrorKind::UnexpectedEof
            | ErrorKind::ConnectionReset
            | ErrorKind::ConnectionAborted
            | ErrorKind::BrokenPipe
            | ErrorKind::NotConnected
    )
}
