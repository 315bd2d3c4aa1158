//! Network Module
//!
//! TCP server and client handling for the operator protocol.
//!
//! ## Architecture
//! - Single non-blocking acceptor loop
//! - One thread per connection, bounded by `max_connections`
//! - Session requests go straight to the `SessionStore`
//! - Record/replay requests go through the `ControllerHandle`

mod server;
mod connection;
mod client;

pub use server::{Server, ShutdownHandle};
pub use connection::Connection;
pub use client::Client;
