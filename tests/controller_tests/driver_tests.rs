//! Tests for the Controller driver thread
//!
//! These tests verify:
//! - Recording and replaying through a ControllerHandle
//! - Replay ticks stop as soon as a replay is cancelled
//! - Handles fail cleanly once the controller is gone

#[path = "../common/mod.rs"]
mod common;

use std::path::PathBuf;
use std::thread;
use std::time::Duration;

use common::*;
use crossbeam::channel::{self, Receiver};
use pitlog::config::{Config, LogSyncStrategy};
use pitlog::controller::{Activity, Controller, Outbound, RecorderPlayer};
use pitlog::event::{now_millis, Category, Event, RaceStart};
use pitlog::PitlogError;
use tempfile::TempDir;

const TICK: Duration = Duration::from_millis(1);
const WAIT: Duration = Duration::from_secs(5);

// =============================================================================
// Helper Functions
// =============================================================================

fn setup_controller(tick: Duration) -> (TempDir, PathBuf, Controller, Receiver<Outbound>) {
    let temp_dir = TempDir::new().unwrap();
    let root = temp_dir.path().join("data");
    let config = Config::builder()
        .data_dir(&root)
        .car_id("driver-car")
        .log_sync_strategy(LogSyncStrategy::EveryWrite)
        .build();
    let machine = RecorderPlayer::new(&config)
        .unwrap()
        .with_tag_source(|start: &RaceStart| format!("race-{}", start.timestamp));

    let (tx, rx) = channel::unbounded();
    let controller = Controller::spawn_with(machine, tick, tx).unwrap();
    (temp_dir, root, controller, rx)
}

/// Receive until ReplayStopped/ReplayAborted, returning the events seen
fn collect_replay(rx: &Receiver<Outbound>) -> (Vec<Event>, Outbound) {
    let mut events = Vec::new();
    loop {
        match rx.recv_timeout(WAIT).unwrap() {
            Outbound::Event(event) => events.push(event),
            terminal => return (events, terminal),
        }
    }
}

// =============================================================================
// Record and Replay Tests
// =============================================================================

#[test]
fn test_record_then_replay() {
    let (_temp, _root, controller, rx) = setup_controller(TICK);
    let handle = controller.handle();

    for event in scenario() {
        handle.record(event).unwrap();
    }
    handle.stop_session().unwrap();
    handle.start_replay("race-0").unwrap();

    let (events, terminal) = collect_replay(&rx);

    assert_eq!(
        shape(&events),
        vec![
            (Category::SessionStart, 0),
            (Category::SensorSample, 10),
            (Category::SensorSample, 20),
            (Category::VelocitySample, 21),
            (Category::VelocitySample, 22),
            (Category::PenaltyNotice, 23),
            (Category::PenaltyNotice, 26),
        ]
    );
    assert_eq!(
        terminal,
        Outbound::ReplayStopped {
            tag: "race-0".to_string()
        }
    );
    assert_eq!(handle.status().unwrap().activity, Activity::Idle);

    controller.shutdown().unwrap();
}

#[test]
fn test_record_and_wait_reports_errors() {
    let (_temp, _root, controller, _rx) = setup_controller(TICK);
    let handle = controller.handle();

    handle.record_and_wait(race_start(0)).unwrap();
    handle.stop_session().unwrap();

    let result = handle.record_and_wait(race_start(0));

    assert!(matches!(result, Err(PitlogError::DuplicateSession(_))));
}

#[test]
fn test_penalty_notice_is_stamped_by_controller() {
    let (_temp, root, controller, _rx) = setup_controller(TICK);
    let handle = controller.handle();
    handle.record(race_start(0)).unwrap();

    let before = now_millis();
    handle.record_penalty_and_wait(penalty_notice()).unwrap();
    let after = now_millis();
    handle.stop_session().unwrap();

    let events = replay_all(&root, "race-0");
    assert_eq!(events.len(), 2);
    assert_eq!(events[1].category(), Category::PenaltyNotice);
    assert!(events[1].timestamp() >= before);
    assert!(events[1].timestamp() <= after);
}

#[test]
fn test_status_reports_recording() {
    let (_temp, _root, controller, _rx) = setup_controller(TICK);
    let handle = controller.handle();

    handle.record(race_start(3)).unwrap();
    let status = handle.status().unwrap();

    assert_eq!(status.car_id, "driver-car");
    assert_eq!(
        status.activity,
        Activity::Recording {
            tag: "race-3".to_string()
        }
    );
}

#[test]
fn test_replay_rejected_while_recording() {
    let (_temp, _root, controller, _rx) = setup_controller(TICK);
    let handle = controller.handle();
    handle.record(race_start(0)).unwrap();
    handle.stop_session().unwrap();
    handle.record(race_start(1)).unwrap();

    let result = handle.start_replay("race-0");

    assert!(matches!(result, Err(PitlogError::RecordingInProgress(_))));
}

#[test]
fn test_replay_unknown_session() {
    let (_temp, _root, controller, _rx) = setup_controller(TICK);

    let result = controller.handle().start_replay("missing");

    assert!(matches!(result, Err(PitlogError::UnknownSession(_))));
}

// =============================================================================
// Cancellation Tests
// =============================================================================

#[test]
fn test_stop_replay_stops_ticks() {
    // Slow ticks so the replay is still running when it is cancelled
    let (_temp, _root, controller, rx) = setup_controller(Duration::from_millis(20));
    let handle = controller.handle();

    handle.record(race_start(0)).unwrap();
    for t in 1..=200 {
        handle.record(sensor(t)).unwrap();
    }
    handle.stop_session().unwrap();
    handle.start_replay("race-0").unwrap();

    // Wait for the replay to be underway
    assert!(matches!(rx.recv_timeout(WAIT).unwrap(), Outbound::Event(_)));
    assert!(handle.stop_replay().unwrap());
    assert_eq!(handle.status().unwrap().activity, Activity::Idle);

    // Whatever was delivered before the stop is drained; nothing follows
    while rx.try_recv().is_ok() {}
    thread::sleep(Duration::from_millis(100));
    assert!(rx.try_recv().is_err());

    assert!(!handle.stop_replay().unwrap());
}

#[test]
fn test_replay_again_after_stop() {
    let (_temp, _root, controller, rx) = setup_controller(TICK);
    let handle = controller.handle();
    for event in scenario() {
        handle.record(event).unwrap();
    }
    handle.stop_session().unwrap();

    handle.start_replay("race-0").unwrap();
    let (first, _) = collect_replay(&rx);
    handle.start_replay("race-0").unwrap();
    let (second, _) = collect_replay(&rx);

    assert_eq!(first, second);
}

// =============================================================================
// Shutdown Tests
// =============================================================================

#[test]
fn test_handle_after_shutdown() {
    let (_temp, _root, controller, _rx) = setup_controller(TICK);
    let handle = controller.handle();

    controller.shutdown().unwrap();

    assert!(matches!(
        handle.record(sensor(1)),
        Err(PitlogError::ControllerStopped)
    ));
    assert!(matches!(handle.status(), Err(PitlogError::ControllerStopped)));
}

#[test]
fn test_shutdown_closes_open_session() {
    let (_temp, root, controller, _rx) = setup_controller(TICK);
    let handle = controller.handle();
    handle.record(race_start(0)).unwrap();
    handle.record(velocity(9)).unwrap();

    controller.shutdown().unwrap();

    assert_eq!(replay_all(&root, "race-0"), vec![race_start(0), velocity(9)]);
}

#[test]
fn test_drop_joins_controller() {
    let (_temp, root, controller, _rx) = setup_controller(TICK);
    controller.handle().record(race_start(0)).unwrap();

    drop(controller);

    assert_eq!(replay_all(&root, "race-0"), vec![race_start(0)]);
}
