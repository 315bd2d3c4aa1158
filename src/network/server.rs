//! TCP Server
//!
//! Accepts connections and serves each on its own thread.

use std::collections::HashMap;
use std::io::{BufWriter, ErrorKind};
use std::net::{Shutdown, SocketAddr, TcpListener, TcpStream};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use parking_lot::Mutex;

use crate::config::Config;
use crate::controller::ControllerHandle;
use crate::error::{PitlogError, Result};
use crate::protocol::{write_response, Response};
use crate::session::SessionStore;

use super::Connection;

/// How long the accept loop sleeps when no client is waiting
const ACCEPT_POLL: Duration = Duration::from_millis(10);

/// Signals a running server to stop
#[derive(Clone)]
pub struct ShutdownHandle {
    flag: Arc<AtomicBool>,
}

impl ShutdownHandle {
    pub fn shutdown(&self) {
        self.flag.store(true, Ordering::SeqCst);
    }

    pub fn is_shutdown(&self) -> bool {
        self.flag.load(Ordering::SeqCst)
    }
}

/// Open connections, so shutdown can unblock their reads
type Registry = Arc<Mutex<HashMap<u64, TcpStream>>>;

/// A registry entry that is removed when dropped
///
/// Owned by the worker thread, so the entry goes away when the worker
/// ends, or right away if the connection never gets that far.
struct Slot {
    id: u64,
    registry: Registry,
}

impl Slot {
    fn register(registry: &Registry, id: u64, stream: TcpStream) -> Self {
        registry.lock().insert(id, stream);
        Self {
            id,
            registry: Arc::clone(registry),
        }
    }
}

impl Drop for Slot {
    fn drop(&mut self) {
        self.registry.lock().remove(&self.id);
    }
}

/// TCP server for the operator protocol
pub struct Server {
    config: Config,
    listener: TcpListener,
    controller: ControllerHandle,
    store: SessionStore,
    shutdown: ShutdownHandle,
    connections: Registry,
    next_id: AtomicU64,
    workers: Mutex<Vec<JoinHandle<()>>>,
}

impl Server {
    /// Bind the configured listen address
    pub fn bind(config: Config, controller: ControllerHandle, store: SessionStore) -> Result<Self> {
        config.validate()?;
        let listener = TcpListener::bind(&config.listen_addr).map_err(|e| {
            PitlogError::Network(format!("Failed to bind {}: {}", config.listen_addr, e))
        })?;
        listener.set_nonblocking(true)?;

        Ok(Self {
            config,
            listener,
            controller,
            store,
            shutdown: ShutdownHandle {
                flag: Arc::new(AtomicBool::new(false)),
            },
            connections: Arc::new(Mutex::new(HashMap::new())),
            next_id: AtomicU64::new(1),
            workers: Mutex::new(Vec::new()),
        })
    }

    /// Address actually bound (useful with port 0)
    pub fn local_addr(&self) -> Result<SocketAddr> {
        Ok(self.listener.local_addr()?)
    }

    pub fn shutdown_handle(&self) -> ShutdownHandle {
        self.shutdown.clone()
    }

    /// Signal the server to shutdown gracefully
    pub fn shutdown(&self) {
        self.shutdown.shutdown();
    }

    /// Number of connections currently being served
    pub fn active_connections(&self) -> usize {
        self.connections.lock().len()
    }

    /// Accept and serve connections until shutdown (blocking)
    pub fn run(&self) -> Result<()> {
        tracing::info!("Listening on {}", self.local_addr()?);

        while !self.shutdown.is_shutdown() {
            match self.listener.accept() {
                Ok((stream, addr)) => {
                    if let Err(e) = self.accept(stream) {
                        tracing::warn!("Failed to accept {}: {}", addr, e);
                    }
                }
                Err(e) if e.kind() == ErrorKind::WouldBlock => thread::sleep(ACCEPT_POLL),
                Err(e) => {
                    tracing::warn!("Accept failed: {}", e);
                    thread::sleep(ACCEPT_POLL);
                }
            }
            self.reap_finished();
        }

        self.close_all();
        tracing::info!("Server stopped");
        Ok(())
    }

    fn accept(&self, stream: TcpStream) -> Result<()> {
        stream.set_nonblocking(false)?;

        if self.active_connections() >= self.config.max_connections {
            tracing::warn!(
                "Rejecting connection: {} connections already open",
                self.config.max_connections
            );
            let mut writer = BufWriter::new(stream);
            write_response(&mut writer, &Response::rejected("too many connections"))?;
            return Ok(());
        }

        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        let slot = Slot::register(&self.connections, id, stream.try_clone()?);

        let mut connection = Connection::new(stream, self.controller.clone(), self.store.clone())?;
        connection.set_timeouts(self.config.read_timeout_ms, self.config.write_timeout_ms)?;

        let worker = thread::Builder::new()
            .name(format!("pitlog-conn-{}", id))
            .spawn(move || {
                let _slot = slot;
                if let Err(e) = connection.handle() {
                    tracing::debug!("Connection {} ended with error: {}", connection.peer_addr(), e);
                }
            })?;

        self.workers.lock().push(worker);
        Ok(())
    }

    fn reap_finished(&self) {
        let mut workers = self.workers.lock();
        let (finished, running): (Vec<_>, Vec<_>) =
            workers.drain(..).partition(|w| w.is_finished());
        *workers = running;
        drop(workers);

        for worker in finished {
            let _ = worker.join();
        }
    }

    /// Unblock every connection thread and wait for them
    fn close_all(&self) {
        for stream in self.connections.lock().values() {
            let _ = stream.shutdown(Shutdown::Both);
        }
        let workers: Vec<_> = self.workers.lock().drain(..).collect();
        for worker in workers {
            let _ = worker.join();
        }
    }
}
