//! # nature-remo-controller
//!
//! Nature Remo クラウド API 向けの、レート制限を考慮した非同期コマンドディスパッチャ。
//!
//! Rate-gated asynchronous command dispatcher for the Nature Remo smart-home
//! cloud API.
//!
//! ## Overview
//!
//! The Nature Remo API allows each account a fixed number of requests per
//! window and reports what is left in every response. This crate sends
//! infrared and light commands without overrunning that budget:
//!
//! - **Admission**: every command first passes a [`resilience::RateLimitGate`],
//!   which compares the server's last snapshot minus locally admitted usage
//!   against what the command needs.
//! - **Fire-and-forget**: admitted commands run as independent Tokio tasks; the
//!   caller gets a [`Dispatch`] back as soon as admission is decided.
//! - **In-flight label**: the most recently started command's label is visible
//!   through [`Controller::current_in_flight_label`].
//! - **Completion**: each launched command reports exactly once, on its
//!   [`client::CommandHandle`] and on [`Controller::subscribe`].
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use nature_remo_controller::{Controller, CommandOutcome};
//!
//! #[tokio::main]
//! async fn main() -> nature_remo_controller::Result<()> {
//!     let remo = Controller::new("your-access-token").await?;
//!
//!     let dispatch = remo.send_signal("tv", "ch_up").await;
//!     if dispatch.is_admitted() {
//!         assert_eq!(dispatch.outcome().await, CommandOutcome::Sent);
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Module Organization
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`client`] | Controller facade, dispatcher, in-flight tracking, inventory |
//! | [`resilience`] | Rate-limit snapshot and admission gate |
//! | [`api`] | The API boundary trait and its HTTP implementation |
//! | [`transport`] | reqwest-based HTTP transport and token resolution |
//! | [`types`] | Devices, appliances, signals, users |
//! | [`config`] | Controller configuration (defaults, env, YAML) |

pub mod api;
pub mod client;
pub mod config;
pub mod resilience;
pub mod transport;
pub mod types;

// Re-export main types for convenience
pub use api::{NatureRemoApi, RemoApi};
pub use client::{
    CommandHandle, CommandOutcome, CommandReport, Controller, ControllerBuilder,
    ControllerSignals, Dispatch,
};
pub use config::ControllerConfig;
pub use resilience::{RateLimitGate, RateLimitSnapshot};
pub use types::{Appliance, Device, LightButton, SensorReadings, Signal, User};

/// Result type alias for the library
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for the library
pub mod error;
pub use error::{Error, ErrorContext};
