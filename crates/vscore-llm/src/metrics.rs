//! Metrics for LLM calls.

use metrics::{counter, histogram};

/// Metric names.
pub mod names {
    pub const LLM_REQUESTS_TOTAL: &str = "vscore_llm_requests_total";
    pub const LLM_REQUEST_DURATION_SECONDS: &str = "vscore_llm_request_duration_seconds";
    pub const LLM_FALLBACKS_TOTAL: &str = "vscore_llm_fallbacks_total";
    pub const LLM_JSON_REPAIRS_TOTAL: &str = "vscore_llm_json_repairs_total";
}

/// Record one model attempt.
pub fn record_request(model: &str, success: bool, duration_secs: f64) {
    let labels = [
        ("model", model.to_string()),
        ("status", if success { "success" } else { "error" }.to_string()),
    ];
    counter!(names::LLM_REQUESTS_TOTAL, &labels).increment(1);
    histogram!(names::LLM_REQUEST_DURATION_SECONDS, &labels).record(duration_secs);
}

/// Record a move from a failed model to the next one in the list.
pub fn record_fallback(from_model: &str) {
    counter!(names::LLM_FALLBACKS_TOTAL, "from_model" => from_model.to_string()).increment(1);
}

/// Record a response that only parsed after repair.
pub fn record_json_repair() {
    counter!(names::LLM_JSON_REPAIRS_TOTAL).increment(1);
}
