use super::*;
use std::thread;

#[test]
fn test_search_limits_millis() {
    let limits = SearchLimits::millis(250);
    assert_eq!(limits.move_time, Duration::from_millis(250));
}

#[test]
fn test_time_control_expiry() {
    let mut tc = TimeControl::new(Duration::from_millis(10));
    tc.start();
    assert!(!tc.is_expired());

    // Wait for time to expire
    thread::sleep(Duration::from_millis(20));
    assert!(tc.is_expired());
    assert_eq!(tc.remaining(), Duration::ZERO);
}

#[test]
fn test_zero_budget_is_expired_immediately() {
    let mut tc = TimeControl::new(Duration::ZERO);
    tc.start();
    assert!(tc.is_expired());
}

#[test]
fn test_unstarted_clock_reports_no_elapsed_time() {
    let tc = TimeControl::new(Duration::from_secs(5));
    assert_eq!(tc.elapsed(), Duration::ZERO);
    assert_eq!(tc.remaining(), Duration::from_secs(5));
}
