//! Rate-gated controller for the Nature Remo cloud API.
//!
//! Developer-friendly goal: keep the public surface small and predictable.
//! Implementation details are split into submodules under `src/client/`.

pub mod builder;
mod commands;
pub mod core;
pub mod dispatch;
pub mod inflight;
pub mod inventory;
pub mod signals;

pub use builder::ControllerBuilder;
pub use core::Controller;
pub use dispatch::{CommandDispatcher, CommandHandle, CommandOutcome, CommandReport, Dispatch};
pub use inflight::InFlightTracker;
pub use inventory::InventoryCache;
pub use signals::ControllerSignals;
