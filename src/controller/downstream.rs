//! Downstream consumers
//!
//! Where replayed events go: the same place live telemetry would reach.

use crossbeam::channel::Sender;

use crate::event::Event;

/// Messages emitted by the controller during replay
#[derive(Debug, Clone, PartialEq)]
pub enum Outbound {
    /// A replayed event
    Event(Event),

    /// The replay of `tag` ran to completion
    ReplayStopped { tag: String },

    /// The replay of `tag` hit an unreadable record or storage fault
    ReplayAborted { tag: String, reason: String },
}

/// A consumer of replayed events
pub trait Downstream {
    fn deliver(&mut self, message: Outbound);
}

impl Downstream for Vec<Outbound> {
    fn deliver(&mut self, message: Outbound) {
        self.push(message);
    }
}

impl Downstream for Sender<Outbound> {
    fn deliver(&mut self, message: Outbound) {
        if self.send(message).is_err() {
            tracing::trace!("Downstream receiver gone, dropping replayed message");
        }
    }
}
