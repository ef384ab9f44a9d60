//! Foundation crate tests: clock determinism, state transitions, error
//! classification.

use std::time::{Duration, Instant};
use wakegate_foundation::clock::{real_clock, test_clock, Clock};
use wakegate_foundation::error::{AppError, AudioError, RecoveryStrategy};
use wakegate_foundation::state::{AppState, StateManager};

#[test]
fn real_clock_tracks_wall_time() {
    let clock = real_clock();
    let before = Instant::now();
    let t = clock.now();
    assert!(t >= before);
    assert!(t.elapsed() < Duration::from_secs(1));
}

#[test]
fn test_clock_only_moves_when_advanced() {
    let clock = test_clock();
    let t0 = clock.now();
    std::thread::sleep(Duration::from_millis(5));
    assert_eq!(clock.now(), t0);
    clock.advance(Duration::from_millis(801));
    assert_eq!(clock.now().duration_since(t0), Duration::from_millis(801));
}

#[test]
fn recovering_roundtrip_is_valid() {
    let mgr = StateManager::new();
    mgr.transition(AppState::Running).unwrap();
    mgr.transition(AppState::Recovering {
        from_error: "stream error".into(),
    })
    .unwrap();
    mgr.transition(AppState::Running).unwrap();
    assert_eq!(mgr.current(), AppState::Running);
}

#[test]
fn state_subscription_sees_transitions() {
    let mgr = StateManager::new();
    let rx = mgr.subscribe();
    mgr.transition(AppState::Running).unwrap();
    assert_eq!(rx.recv().unwrap(), AppState::Running);
}

#[test]
fn buffer_overflow_is_ignorable() {
    let err = AppError::Audio(AudioError::BufferOverflow { count: 640 });
    assert!(matches!(err.recovery_strategy(), RecoveryStrategy::Ignore));
}

#[test]
fn config_errors_are_fatal() {
    let err = AppError::Config("missing device id".into());
    assert!(matches!(err.recovery_strategy(), RecoveryStrategy::Fatal));
}
