//! Remo hubs and their sensor events.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Newest value of one sensor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SensorEvent {
    pub val: f64,
    #[serde(default)]
    pub created_at: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Device {
    #[serde(default)]
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub firmware_version: Option<String>,
    /// Keyed by sensor code: `te`, `hu`, `il`, `mo`.
    #[serde(default)]
    pub newest_events: HashMap<String, SensorEvent>,
}

impl Device {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: String::new(),
            name: name.into(),
            firmware_version: None,
            newest_events: HashMap::new(),
        }
    }

    pub fn with_event(mut self, code: &str, val: f64) -> Self {
        self.newest_events.insert(
            code.to_string(),
            SensorEvent {
                val,
                created_at: None,
            },
        );
        self
    }

    pub fn readings(&self) -> SensorReadings {
        let val = |code: &str| self.newest_events.get(code).map(|e| e.val);
        SensorReadings {
            temperature: val("te"),
            humidity: val("hu"),
            illumination: val("il"),
            motion: val("mo"),
        }
    }
}

/// Scalar readings of a device. Hubs without a given sensor report `None`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct SensorReadings {
    pub temperature: Option<f64>,
    pub humidity: Option<f64>,
    pub illumination: Option<f64>,
    pub motion: Option<f64>,
}
