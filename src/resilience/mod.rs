//! レート制限モジュール：API の残りリクエスト数に基づく送信可否の判定。
//!
//! # Rate-Limit Module
//!
//! The Nature Remo cloud API grants each account a fixed number of requests per
//! window and reports the remaining budget in response headers. This module turns
//! that report into an admission decision.
//!
//! ## Key Components
//!
//! | Component | Description |
//! |-----------|-------------|
//! | [`RateLimitSnapshot`] | Server-reported `{limit, remaining, reset_at}` |
//! | [`RateLimitGate`] | Admission over the snapshot plus optimistic local usage |
//! | [`admits`] | The pure admission rule |
//!
//! ## Admission Rule
//!
//! A request for `n` units is admitted iff `remaining - usage > n`. Unknown
//! `remaining` is always a denial. When the snapshot's reset time has passed
//! the gate fetches the account once, which replaces the snapshot and zeroes
//! `usage`, before deciding.
//!
//! ```rust
//! use nature_remo_controller::resilience::{admits, RateLimitSnapshot};
//! use std::time::Duration;
//!
//! let snapshot = RateLimitSnapshot::resetting_in(10, Duration::from_secs(60));
//! assert!(admits(&snapshot, 0, 1));
//! assert!(!admits(&snapshot, 9, 1));
//! ```

pub mod rate_limiter;

pub use rate_limiter::{admits, RateLimitGate, RateLimitSnapshot};
