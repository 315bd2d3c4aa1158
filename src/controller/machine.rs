//! Recorder/Player state machine
//!
//! Owns at most one session writer or one session reader at a time.

use serde::{Deserialize, Serialize};

use crate::config::{Config, LogSyncStrategy};
use crate::error::{PitlogError, Result};
use crate::event::{Event, PenaltyMessage, RaceStart};
use crate::eventlog::{Pull, SessionReader, SessionWriter};
use crate::session::{self, SessionStore};

use super::{Downstream, Outbound};

/// Derives the tag of a new session from its start event
pub type TagSource = Box<dyn FnMut(&RaceStart) -> String + Send>;

/// What the controller is doing right now
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum Activity {
    Idle,
    Recording { tag: String },
    Replaying { tag: String },
}

/// Snapshot reported to operators
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ControllerStatus {
    pub car_id: String,
    pub activity: Activity,
}

enum State {
    Idle,
    Recording(SessionWriter),
    Replaying(SessionReader),
}

/// Record/replay lifecycle of one car identity
///
/// Single-threaded: every method takes `&mut self`, so exclusivity of the
/// writer and reader follows from ownership.
pub struct RecorderPlayer {
    car_id: String,
    store: SessionStore,
    sync_strategy: LogSyncStrategy,
    tag_source: TagSource,
    state: State,
}

impl RecorderPlayer {
    /// Create an idle recorder/player over the configured data directory
    pub fn new(config: &Config) -> Result<Self> {
        config.validate()?;
        let store = SessionStore::open(&config.data_dir)?;
        Ok(Self {
            car_id: config.car_id.clone(),
            store,
            sync_strategy: config.log_sync_strategy,
            tag_source: Box::new(|_| session::tag_now()),
            state: State::Idle,
        })
    }

    /// Replace the wall-clock tag derivation
    pub fn with_tag_source<F>(mut self, source: F) -> Self
    where
        F: FnMut(&RaceStart) -> String + Send + 'static,
    {
        self.tag_source = Box::new(source);
        self
    }

    pub fn store(&self) -> &SessionStore {
        &self.store
    }

    pub fn car_id(&self) -> &str {
        &self.car_id
    }

    pub fn status(&self) -> ControllerStatus {
        let activity = match &self.state {
            State::Idle => Activity::Idle,
            State::Recording(writer) => Activity::Recording {
                tag: writer.tag().to_string(),
            },
            State::Replaying(reader) => Activity::Replaying {
                tag: reader.tag().to_string(),
            },
        };
        ControllerStatus {
            car_id: self.car_id.clone(),
            activity,
        }
    }

    pub fn is_recording(&self) -> bool {
        matches!(self.state, State::Recording(_))
    }

    pub fn is_replaying(&self) -> bool {
        matches!(self.state, State::Replaying(_))
    }

    // =========================================================================
    // Recording
    // =========================================================================

    /// Handle one live telemetry event
    ///
    /// - SessionStart opens a new session (closing any current one)
    /// - Anything else is appended while recording, dropped while idle
    /// - Live telemetry is ignored entirely while replaying
    pub fn record(&mut self, event: Event) -> Result<()> {
        if let State::Replaying(reader) = &self.state {
            tracing::trace!(
                car = %self.car_id,
                tag = reader.tag(),
                category = %event.category(),
                "Ignoring live event during replay"
            );
            return Ok(());
        }

        if let Event::SessionStart(start) = &event {
            let tag = (self.tag_source)(start);
            return self.start_session(tag, &event);
        }

        match &mut self.state {
            State::Recording(writer) => {
                writer.append(&event)?;
            }
            _ => {
                tracing::trace!(
                    car = %self.car_id,
                    category = %event.category(),
                    "Dropping event outside of a session"
                );
            }
        }
        Ok(())
    }

    /// Handle a penalty notice from the track
    ///
    /// Notices carry no time of their own; they are stamped with the
    /// wall-clock time at which the controller receives them.
    pub fn record_penalty(&mut self, notice: PenaltyMessage) -> Result<()> {
        self.record(Event::penalty_now(notice))
    }

    fn start_session(&mut self, tag: String, start: &Event) -> Result<()> {
        if self.is_recording() {
            tracing::info!(car = %self.car_id, "New session start while recording, rolling over");
            self.stop_session()?;
        }

        let mut writer = SessionWriter::open(self.store.root(), &tag, self.sync_strategy)?;
        writer.append(start)?;

        tracing::info!(car = %self.car_id, tag = %tag, "Recording started");
        self.state = State::Recording(writer);
        Ok(())
    }

    /// End the current recording, closing its logs. No-op unless recording.
    pub fn stop_session(&mut self) -> Result<()> {
        if !self.is_recording() {
            return Ok(());
        }
        if let State::Recording(mut writer) = std::mem::replace(&mut self.state, State::Idle) {
            writer.close()?;
            tracing::info!(
                car = %self.car_id,
                tag = writer.tag(),
                records = writer.total_records(),
                "Recording stopped"
            );
        }
        Ok(())
    }

    // =========================================================================
    // Replaying
    // =========================================================================

    /// Begin replaying a closed session
    ///
    /// Rejected while recording or already replaying.
    pub fn start_replay(&mut self, tag: &str) -> Result<()> {
        match &self.state {
            State::Recording(writer) => {
                return Err(PitlogError::RecordingInProgress(writer.tag().to_string()));
            }
            State::Replaying(reader) => {
                return Err(PitlogError::ReplayInProgress(reader.tag().to_string()));
            }
            State::Idle => {}
        }

        if !self.store.exists(tag) {
            return Err(PitlogError::UnknownSession(tag.to_string()));
        }

        let reader = SessionReader::open(self.store.root(), tag)?;
        tracing::info!(car = %self.car_id, tag, "Replay started");
        self.state = State::Replaying(reader);
        Ok(())
    }

    /// Cancel the current replay, releasing every open log
    ///
    /// Returns false if nothing was replaying.
    pub fn stop_replay(&mut self) -> bool {
        if !self.is_replaying() {
            return false;
        }
        if let State::Replaying(mut reader) = std::mem::replace(&mut self.state, State::Idle) {
            reader.close();
            tracing::info!(car = %self.car_id, tag = reader.tag(), "Replay cancelled");
        }
        true
    }

    /// Advance the replay by exactly one event
    ///
    /// PowerCommand events are consumed but never forwarded: they would
    /// drive the car again. A stray tick while not replaying does nothing.
    pub fn tick<D: Downstream + ?Sized>(&mut self, downstream: &mut D) -> Result<()> {
        let State::Replaying(reader) = &mut self.state else {
            return Ok(());
        };

        match reader.pull() {
            Ok(Pull::Event(event)) => {
                if event.is_power_command() {
                    tracing::trace!(tag = reader.tag(), "Suppressing recorded power command");
                } else {
                    downstream.deliver(Outbound::Event(event));
                }
                Ok(())
            }
            Ok(Pull::EndOfStream) => {
                let tag = reader.tag().to_string();
                self.state = State::Idle;
                tracing::info!(car = %self.car_id, tag = %tag, "Replay finished");
                downstream.deliver(Outbound::ReplayStopped { tag });
                Ok(())
            }
            Err(e) => {
                let tag = reader.tag().to_string();
                self.state = State::Idle;
                tracing::error!(car = %self.car_id, tag = %tag, "Replay aborted: {}", e);
                downstream.deliver(Outbound::ReplayAborted {
                    tag,
                    reason: e.to_string(),
                });
                Err(e)
            }
        }
    }

    /// Close whatever is open. Used when the controller shuts down.
    pub fn shutdown(&mut self) -> Result<()> {
        self.stop_replay();
        self.stop_session()
    }
}
