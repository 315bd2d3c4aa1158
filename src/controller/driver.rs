//! Controller driver
//!
//! Runs a `RecorderPlayer` on its own thread. Inbound messages and replay
//! ticks are serialized through one `select!` loop, so the state machine
//! never sees two inputs at once.
//!
//! The replay tick is a `crossbeam` tick channel owned by the loop. It is
//! dropped in the same step that leaves `Replaying`, so no tick is observed
//! after a replay stops.

use std::thread::{self, JoinHandle};
use std::time::Duration;

use crossbeam::channel::{self, Receiver, Sender};
use crossbeam::select;

use crate::config::Config;
use crate::error::{PitlogError, Result};
use crate::event::{Event, PenaltyMessage};

use super::{ControllerStatus, Downstream, RecorderPlayer};

/// Live input from the telemetry broker
enum Live {
    Event(Event),
    /// Not yet stamped with its capture time
    Penalty(PenaltyMessage),
}

/// Messages accepted by the driver loop
enum Message {
    Telemetry {
        live: Live,
        reply: Option<Sender<Result<()>>>,
    },
    StopSession {
        reply: Sender<Result<()>>,
    },
    StartReplay {
        tag: String,
        reply: Sender<Result<()>>,
    },
    StopReplay {
        reply: Sender<bool>,
    },
    Status {
        reply: Sender<ControllerStatus>,
    },
    Shutdown,
}

/// Cloneable handle for talking to a running controller
#[derive(Clone)]
pub struct ControllerHandle {
    inbox: Sender<Message>,
}

impl ControllerHandle {
    /// Queue a live telemetry event without waiting for it to be written
    pub fn record(&self, event: Event) -> Result<()> {
        self.send(Message::Telemetry {
            live: Live::Event(event),
            reply: None,
        })
    }

    /// Queue a live telemetry event and wait until it has been handled
    pub fn record_and_wait(&self, event: Event) -> Result<()> {
        self.live_and_wait(Live::Event(event))
    }

    /// Queue a penalty notice; the controller stamps its capture time
    pub fn record_penalty(&self, notice: PenaltyMessage) -> Result<()> {
        self.send(Message::Telemetry {
            live: Live::Penalty(notice),
            reply: None,
        })
    }

    /// Queue a penalty notice and wait until it has been handled
    pub fn record_penalty_and_wait(&self, notice: PenaltyMessage) -> Result<()> {
        self.live_and_wait(Live::Penalty(notice))
    }

    fn live_and_wait(&self, live: Live) -> Result<()> {
        let (reply, rx) = channel::bounded(1);
        self.send(Message::Telemetry {
            live,
            reply: Some(reply),
        })?;
        Self::wait(rx)?
    }

    /// End the current recording and wait for its logs to be closed
    pub fn stop_session(&self) -> Result<()> {
        let (reply, rx) = channel::bounded(1);
        self.send(Message::StopSession { reply })?;
        Self::wait(rx)?
    }

    /// Start replaying `tag`; fails if recording, replaying or unknown
    pub fn start_replay(&self, tag: &str) -> Result<()> {
        let (reply, rx) = channel::bounded(1);
        self.send(Message::StartReplay {
            tag: tag.to_string(),
            reply,
        })?;
        Self::wait(rx)?
    }

    /// Cancel the current replay. Returns false if nothing was replaying.
    pub fn stop_replay(&self) -> Result<bool> {
        let (reply, rx) = channel::bounded(1);
        self.send(Message::StopReplay { reply })?;
        Self::wait(rx)
    }

    pub fn status(&self) -> Result<ControllerStatus> {
        let (reply, rx) = channel::bounded(1);
        self.send(Message::Status { reply })?;
        Self::wait(rx)
    }

    fn send(&self, message: Message) -> Result<()> {
        self.inbox
            .send(message)
            .map_err(|_| PitlogError::ControllerStopped)
    }

    fn wait<T>(rx: Receiver<T>) -> Result<T> {
        rx.recv().map_err(|_| PitlogError::ControllerStopped)
    }
}

/// Owner of the controller thread
///
/// Dropping the controller shuts the loop down and joins the thread.
pub struct Controller {
    handle: ControllerHandle,
    thread: Option<JoinHandle<()>>,
}

impl Controller {
    /// Spawn a controller for the configured car and data directory
    pub fn spawn<D>(config: &Config, downstream: D) -> Result<Self>
    where
        D: Downstream + Send + 'static,
    {
        let machine = RecorderPlayer::new(config)?;
        Self::spawn_with(machine, Duration::from_millis(config.replay_tick_ms), downstream)
    }

    /// Spawn a controller around an existing state machine
    pub fn spawn_with<D>(machine: RecorderPlayer, tick_interval: Duration, downstream: D) -> Result<Self>
    where
        D: Downstream + Send + 'static,
    {
        let (inbox, rx) = channel::unbounded();
        let name = format!("pitlog-{}", machine.car_id());

        let thread = thread::Builder::new()
            .name(name)
            .spawn(move || run(machine, rx, tick_interval, downstream))?;

        Ok(Self {
            handle: ControllerHandle { inbox },
            thread: Some(thread),
        })
    }

    pub fn handle(&self) -> ControllerHandle {
        self.handle.clone()
    }

    /// Stop the loop, close any open session or replay, join the thread
    pub fn shutdown(mut self) -> Result<()> {
        self.stop_and_join()
    }

    fn stop_and_join(&mut self) -> Result<()> {
        let Some(thread) = self.thread.take() else {
            return Ok(());
        };
        // The loop may already be gone; joining is all that is left then
        let _ = self.handle.inbox.send(Message::Shutdown);
        thread
            .join()
            .map_err(|_| PitlogError::ControllerStopped)
    }
}

impl Drop for Controller {
    fn drop(&mut self) {
        if let Err(e) = self.stop_and_join() {
            tracing::error!("Controller shutdown failed: {}", e);
        }
    }
}

fn run<D: Downstream>(
    mut machine: RecorderPlayer,
    inbox: Receiver<Message>,
    tick_interval: Duration,
    mut downstream: D,
) {
    tracing::debug!(car = machine.car_id(), "Controller loop started");

    let mut ticker: Option<Receiver<std::time::Instant>> = None;
    let mut running = true;

    while running {
        let tick_rx = ticker.clone().unwrap_or_else(channel::never);

        select! {
            recv(inbox) -> message => {
                match message.unwrap_or(Message::Shutdown) {
                    Message::Shutdown => running = false,
                    Message::Telemetry { live, reply } => {
                        let result = match live {
                            Live::Event(event) => machine.record(event),
                            Live::Penalty(notice) => machine.record_penalty(notice),
                        };
                        match reply {
                            Some(reply) => {
                                let _ = reply.send(result);
                            }
                            None => {
                                if let Err(e) = result {
                                    tracing::error!(car = machine.car_id(), "Failed to record event: {}", e);
                                }
                            }
                        }
                    }
                    Message::StopSession { reply } => {
                        let _ = reply.send(machine.stop_session());
                    }
                    Message::StartReplay { tag, reply } => {
                        let result = machine.start_replay(&tag);
                        if result.is_ok() {
                            ticker = Some(channel::tick(tick_interval));
                        }
                        let _ = reply.send(result);
                    }
                    Message::StopReplay { reply } => {
                        let _ = reply.send(machine.stop_replay());
                    }
                    Message::Status { reply } => {
                        let _ = reply.send(machine.status());
                    }
                }
            }
            recv(tick_rx) -> _ => {
                if let Err(e) = machine.tick(&mut downstream) {
                    tracing::warn!(car = machine.car_id(), "Replay tick failed: {}", e);
                }
            }
        }

        // Cancel the tick in the same step that leaves Replaying
        if !machine.is_replaying() {
            ticker = None;
        }
    }

    if let Err(e) = machine.shutdown() {
        tracing::error!(car = machine.car_id(), "Failed to close on shutdown: {}", e);
    }
    tracing::debug!(car = machine.car_id(), "Controller loop stopped");
}
