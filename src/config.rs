//! Configuration for PitLog
//!
//! Centralized configuration with sensible defaults.

use std::path::PathBuf;

use crate::error::{PitlogError, Result};

/// Main configuration for a PitLog instance
#[derive(Debug, Clone)]
pub struct Config {
    // -------------------------------------------------------------------------
    // Storage Configuration
    // -------------------------------------------------------------------------
    /// Root directory for all recorded sessions
    /// Internal structure:
    ///   {data_dir}/
    ///     └── {tag}/
    ///         ├── start
    ///         ├── events
    ///         ├── velocities
    ///         ├── penalties
    ///         ├── power
    ///         └── metadata     (optional)
    pub data_dir: PathBuf,

    /// Sync strategy: how often to fsync the category logs
    pub log_sync_strategy: LogSyncStrategy,

    // -------------------------------------------------------------------------
    // Controller Configuration
    // -------------------------------------------------------------------------
    /// Car identity owning the recorder/player (used in logs and status)
    pub car_id: String,

    /// Interval between two replay ticks (milliseconds)
    pub replay_tick_ms: u64,

    // -------------------------------------------------------------------------
    // Network Configuration
    // -------------------------------------------------------------------------
    /// TCP listen address for the operator protocol
    pub listen_addr: String,

    /// Max concurrent client connections
    pub max_connections: usize,

    /// Connection read timeout (milliseconds, 0 = none)
    pub read_timeout_ms: u64,

    /// Connection write timeout (milliseconds, 0 = none)
    pub write_timeout_ms: u64,
}

/// Category log sync strategy
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogSyncStrategy {
    /// fsync after every append (safest, slowest)
    EveryWrite,

    /// fsync after N unsynced appends across all categories
    EveryNEntries { count: usize },
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("./data"),
            log_sync_strategy: LogSyncStrategy::EveryNEntries { count: 100 },
            car_id: "pilot".to_string(),
            replay_tick_ms: 1,
            listen_addr: "127.0.0.1:7878".to_string(),
            max_connections: 64,
            read_timeout_ms: 0,
            write_timeout_ms: 5000,
        }
    }
}

impl Config {
    /// Create a new config builder
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::default()
    }

    /// Reject settings no component can run with
    pub fn validate(&self) -> Result<()> {
        if self.car_id.trim().is_empty() {
            return Err(PitlogError::Config("car_id must not be empty".to_string()));
        }
        if let LogSyncStrategy::EveryNEntries { count: 0 } = self.log_sync_strategy {
            return Err(PitlogError::Config(
                "EveryNEntries sync count must be at least 1".to_string(),
            ));
        }
        if self.max_connections == 0 {
            return Err(PitlogError::Config(
                "max_connections must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

/// Builder for Config
#[derive(Default)]
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    /// Set the data directory (root for all sessions)
    pub fn data_dir(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.data_dir = path.into();
        self
    }

    /// Set the category log sync strategy
    pub fn log_sync_strategy(mut self, strategy: LogSyncStrategy) -> Self {
        self.config.log_sync_strategy = strategy;
        self
    }

    /// Set the car identity
    pub fn car_id(mut self, id: impl Into<String>) -> Self {
        self.config.car_id = id.into();
        self
    }

    /// Set the replay tick interval (in milliseconds, clamped to at least 1)
    pub fn replay_tick_ms(mut self, ms: u64) -> Self {
        self.config.replay_tick_ms = ms.max(1);
        self
    }

    /// Set the TCP listen address
    pub fn listen_addr(mut self, addr: impl Into<String>) -> Self {
        self.config.listen_addr = addr.into();
        self
    }

    /// Set the maximum number of concurrent connections
    pub fn max_connections(mut self, count: usize) -> Self {
        self.config.max_connections = count;
        self
    }

    /// Set the read timeout (in milliseconds)
    pub fn read_timeout_ms(mut self, ms: u64) -> Self {
        self.config.read_timeout_ms = ms;
        self
    }

    /// Set the write timeout (in milliseconds)
    pub fn write_timeout_ms(mut self, ms: u64) -> Self {
        self.config.write_timeout_ms = ms;
        self
    }

    pub fn build(self) -> Config {
        self.config
    }
}
