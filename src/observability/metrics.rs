//! Metrics collection.
//!
//! # Metrics
//! - `fundme_actions_total` (counter): user actions by `action`, `outcome`
//! - `fundme_session_transitions_total` (counter): session transitions by `to`

/// Count a finished user action.
pub fn record_action(action: &'static str, outcome: &'static str) {
    metrics::counter!("fundme_actions_total", "action" => action, "outcome" => outcome)
        .increment(1);
}

/// Count a session state transition.
pub fn record_transition(to: &'static str) {
    metrics::counter!("fundme_session_transitions_total", "to" => to).increment(1);
}
