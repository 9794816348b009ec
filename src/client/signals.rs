use crate::resilience::RateLimitSnapshot;

/// A lightweight snapshot of controller state for observers.
///
/// Facts only; fields are read one after another, so concurrent commands may
/// make them disagree slightly.
#[derive(Debug, Clone, Default)]
pub struct ControllerSignals {
    pub in_flight: String,
    pub optimistic_usage: i64,
    pub rate_limit: RateLimitSnapshot,
    /// `rate_limit.remaining - optimistic_usage`, when remaining is known.
    pub remaining: Option<i64>,
    pub seconds_until_reset: Option<i64>,
    pub devices: usize,
    pub appliances: usize,
}
