//! Tests for Event
//!
//! These tests verify:
//! - Category routing and file names
//! - Timestamp accessor (penalties use capture time)
//! - Self-describing line format

#[path = "../common/mod.rs"]
mod common;

use common::*;
use pitlog::event::{Category, Event};

// =============================================================================
// Category Tests
// =============================================================================

#[test]
fn test_category_of_each_kind() {
    assert_eq!(race_start(0).category(), Category::SessionStart);
    assert_eq!(sensor(1).category(), Category::SensorSample);
    assert_eq!(velocity(2).category(), Category::VelocitySample);
    assert_eq!(power(3).category(), Category::PowerCommand);
    assert_eq!(penalty(4).category(), Category::PenaltyNotice);
}

#[test]
fn test_category_file_names_match_layout() {
    let names: Vec<&str> = Category::ALL.iter().map(|c| c.file_name()).collect();
    assert_eq!(names, vec!["start", "events", "velocities", "penalties", "power"]);
}

#[test]
fn test_category_index_matches_all_order() {
    for (i, category) in Category::ALL.iter().enumerate() {
        assert_eq!(category.index(), i);
    }
}

// =============================================================================
// Timestamp Tests
// =============================================================================

#[test]
fn test_timestamp_of_payload_events() {
    assert_eq!(race_start(5).timestamp(), 5);
    assert_eq!(sensor(10).timestamp(), 10);
    assert_eq!(velocity(21).timestamp(), 21);
    assert_eq!(power(15).timestamp(), 15);
}

#[test]
fn test_penalty_orders_by_capture_time() {
    let event = penalty(23);
    assert_eq!(event.timestamp(), 23);

    match event {
        Event::PenaltyNotice(timed) => {
            assert_eq!(timed.captured_at, 23);
            assert_eq!(timed.notice, penalty_notice());
        }
        other => panic!("Expected penalty, got {:?}", other),
    }
}

#[test]
fn test_penalty_now_is_stamped_with_wall_clock() {
    let before = pitlog::event::now_millis();
    let event = Event::penalty_now(penalty_notice());
    let after = pitlog::event::now_millis();

    assert!(event.timestamp() >= before);
    assert!(event.timestamp() <= after);
}

#[test]
fn test_only_power_is_power_command() {
    assert!(power(1).is_power_command());
    assert!(!sensor(1).is_power_command());
    assert!(!penalty(1).is_power_command());
}

// =============================================================================
// Line Format Tests
// =============================================================================

#[test]
fn test_line_names_its_kind() {
    let line = sensor(10).to_line().unwrap();
    let value: serde_json::Value = serde_json::from_str(&line).unwrap();

    assert_eq!(value["kind"], "sensor_sample");
    assert_eq!(value["timestamp"], 10);
    assert!(!line.contains('\n'));
}

#[test]
fn test_penalty_line_pairs_capture_time_with_notice() {
    let line = penalty(26).to_line().unwrap();
    let value: serde_json::Value = serde_json::from_str(&line).unwrap();

    assert_eq!(value["kind"], "penalty_notice");
    assert_eq!(value["captured_at"], 26);
    assert_eq!(value["notice"]["penalty_ms"], 2000);
}

#[test]
fn test_line_parses_back() {
    for event in scenario() {
        let parsed = Event::from_line(&event.to_line().unwrap()).unwrap();
        assert_eq!(parsed, event);
    }
}

#[test]
fn test_unknown_kind_is_rejected() {
    assert!(Event::from_line(r#"{"kind":"lap_time","timestamp":1}"#).is_err());
}
