//! 告警状态机测试
//!
//! 通过公开接口验证连续异常阈值、单次告警和恢复清零

use page_vitals::health::{AlertKind, HysteresisTracker, Outcome, TargetState};

fn error() -> Outcome {
    Outcome::Error("down: exists: DOWN".to_string())
}

fn warning() -> Outcome {
    Outcome::Warning("queue value 150 exceeds limit 100".to_string())
}

fn run(state: &mut TargetState, outcomes: &[Outcome], threshold: u32) -> Vec<Option<AlertKind>> {
    outcomes
        .iter()
        .map(|outcome| state.advance(outcome, threshold))
        .collect()
}

#[test]
fn test_ok_resets_any_state() {
    let mut state = TargetState {
        err_active: true,
        warn_active: true,
        err_count: 7,
        warn_count: 3,
    };
    assert_eq!(state.advance(&Outcome::Ok, 2), None);
    assert!(state.is_healthy());
}

#[test]
fn test_threshold_consecutive_errors_alert_once() {
    for threshold in 1..=5u32 {
        let mut state = TargetState::default();
        let outcomes = vec![error(); threshold as usize + 4];
        let alerts = run(&mut state, &outcomes, threshold);

        let raised: Vec<_> = alerts.iter().enumerate().filter(|(_, a)| a.is_some()).collect();
        assert_eq!(raised.len(), 1, "threshold {}", threshold);
        assert_eq!(raised[0].0, threshold as usize - 1);
        assert_eq!(*raised[0].1, Some(AlertKind::Error));
        assert!(state.err_active);
    }
}

#[test]
fn test_threshold_consecutive_warnings_alert_once() {
    let mut state = TargetState::default();
    let alerts = run(&mut state, &vec![warning(); 6], 3);
    assert_eq!(
        alerts,
        vec![None, None, Some(AlertKind::Warning), None, None, None]
    );
    assert!(state.warn_active);
    assert!(!state.err_active);
}

#[test]
fn test_ok_between_failures_restarts_count() {
    let mut state = TargetState::default();
    let alerts = run(&mut state, &[error(), Outcome::Ok, error(), error()], 2);
    assert_eq!(alerts, vec![None, None, None, Some(AlertKind::Error)]);
}

#[test]
fn test_error_escalation_clears_warning() {
    let mut state = TargetState::default();
    assert_eq!(state.advance(&warning(), 1), Some(AlertKind::Warning));
    assert!(state.warn_active);

    assert_eq!(state.advance(&error(), 1), Some(AlertKind::Error));
    assert!(state.err_active);
    assert!(!state.warn_active);
}

#[test]
fn test_new_incident_after_recovery_alerts_again() {
    let mut state = TargetState::default();
    let alerts = run(&mut state, &[error(), error(), Outcome::Ok, error()], 1);
    assert_eq!(
        alerts,
        vec![Some(AlertKind::Error), None, None, Some(AlertKind::Error)]
    );
}

#[test]
fn test_tracker_keeps_targets_independent() {
    let mut tracker = HysteresisTracker::new(2);
    assert_eq!(tracker.observe(0, &error(), 1), Some(AlertKind::Error));
    assert_eq!(tracker.observe(1, &Outcome::Ok, 1), None);

    assert!(tracker.state(0).unwrap().err_active);
    assert!(tracker.state(1).unwrap().is_healthy());
    assert!(tracker.state(2).is_none());
}
