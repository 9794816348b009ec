//! 型定義モジュール：Nature Remo クラウド API のデータモデル。
//!
//! # Types Module
//!
//! Strongly-typed, read-only snapshots of what the Nature Remo cloud API returns.
//! The controller never mutates these; a refresh replaces them wholesale.
//!
//! ## Key Types
//!
//! | Type | Description |
//! |------|-------------|
//! | [`User`] | Account owning the access token |
//! | [`Device`] | A Remo hub with its newest sensor events |
//! | [`SensorReadings`] | The four scalar readings extracted from a device |
//! | [`Appliance`] | A controllable appliance registered on a hub |
//! | [`Signal`] | A learned infrared signal of an appliance |
//! | [`LightButton`] | Button of a light appliance's built-in IR profile |
//!
//! ## Example
//!
//! ```rust
//! use nature_remo_controller::types::Appliance;
//!
//! let raw = r#"[{"id":"a1","nickname":"tv","signals":[{"id":"s1","name":"ch_up"}]}]"#;
//! let appliances: Vec<Appliance> = serde_json::from_str(raw).unwrap();
//! assert_eq!(appliances[0].signal("ch_up").unwrap().id, "s1");
//! ```

pub mod appliance;
pub mod device;
pub mod user;

pub use appliance::{Appliance, LightButton, Signal};
pub use device::{Device, SensorEvent, SensorReadings};
pub use user::User;
