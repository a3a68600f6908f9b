//! Scoring metrics.

use metrics::{counter, histogram};

/// Metric name constants.
pub mod names {
    /// Completed scoring runs by outcome.
    pub const RUNS_TOTAL: &str = "vscore_scoring_runs_total";

    /// End-to-end run duration in seconds.
    pub const RUN_DURATION_SECONDS: &str = "vscore_scoring_run_duration_seconds";

    /// Components that fell back to a degraded result, by component.
    pub const DEGRADATIONS_TOTAL: &str = "vscore_scoring_degradations_total";

    /// Records that could not be persisted.
    pub const PERSIST_FAILURES_TOTAL: &str = "vscore_scoring_persist_failures_total";

    /// Gate failures by gate name.
    pub const GATE_FAILURES_TOTAL: &str = "vscore_scoring_gate_failures_total";
}

/// Record a finished run.
pub fn record_run(outcome: &str, duration_secs: f64) {
    counter!(names::RUNS_TOTAL, "outcome" => outcome.to_string()).increment(1);
    histogram!(names::RUN_DURATION_SECONDS).record(duration_secs);
}

/// Record a component degrading instead of producing a full result.
pub fn record_degradation(component: &str) {
    counter!(names::DEGRADATIONS_TOTAL, "component" => component.to_string()).increment(1);
}

pub fn record_persist_failure() {
    counter!(names::PERSIST_FAILURES_TOTAL).increment(1);
}

pub fn record_gate_failure(gate: &str) {
    counter!(names::GATE_FAILURES_TOTAL, "gate" => gate.to_string()).increment(1);
}
