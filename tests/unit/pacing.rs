//! Unit tests for the pacing controller and throttle matcher

use gramscope::fetcher::pacing::{
    PacingConfig, PacingController, ThrottleMatcher, THROTTLE_SIGNAL,
};
use gramscope::fetcher::FetchError;
use std::time::Duration;

fn config(every: u32) -> PacingConfig {
    PacingConfig {
        short_delay: Duration::from_secs(1),
        long_delay: Duration::from_secs(5),
        long_break_every: every,
    }
}

#[test]
fn test_long_break_cadence() {
    let mut controller = PacingController::new(config(3));

    let mut long_breaks = Vec::new();
    for unit in 1..=9u32 {
        let pauses = controller.next_pauses();
        assert_eq!(pauses.short, Duration::from_secs(1));
        if pauses.long.is_some() {
            long_breaks.push(unit);
        }
    }
    assert_eq!(long_breaks, vec![3, 6, 9]);
}

#[test]
fn test_boundary_unit_owes_both_pauses() {
    let mut controller = PacingController::new(config(2));
    assert!(controller.next_pauses().long.is_none());
    let boundary = controller.next_pauses();
    assert_eq!(boundary.short, Duration::from_secs(1));
    assert_eq!(boundary.long, Some(Duration::from_secs(5)));
}

#[test]
fn test_throttle_failure_stops_controller_permanently() {
    let mut controller = PacingController::new(config(5));
    assert!(!controller.is_stopped());

    let throttle = FetchError::Throttled(THROTTLE_SIGNAL.to_string());
    assert!(controller.observe_failure(&throttle));
    assert!(controller.is_stopped());

    // Non-throttle failures never resurrect a stopped controller.
    let other = FetchError::Network("connection reset".to_string());
    controller.observe_failure(&other);
    assert!(controller.is_stopped());
}

#[test]
fn test_non_throttle_failure_keeps_running() {
    let mut controller = PacingController::new(config(5));
    let err = FetchError::Platform {
        status: 500,
        message: "server error".to_string(),
    };
    assert!(!controller.observe_failure(&err));
    assert!(!controller.is_stopped());
}

#[test]
fn test_matcher_finds_signal_anywhere_in_body() {
    let matcher = ThrottleMatcher::default();
    assert!(matcher.matches("<html>Please Wait A Few Minutes before you try again.</html>"));
    assert!(!matcher.matches("everything is fine"));
}

#[test]
fn test_matcher_custom_needles() {
    let matcher = ThrottleMatcher::new(["rate limit exceeded"]);
    assert!(matcher.matches("HTTP 429: Rate Limit Exceeded"));
    assert!(!matcher.matches("please wait a few minutes"));
}
