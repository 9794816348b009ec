//! Appliances and their learned signals.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A learned infrared signal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Signal {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub image: Option<String>,
}

impl Signal {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            image: None,
        }
    }
}

/// An appliance registered on a Remo hub.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Appliance {
    pub id: String,
    pub nickname: String,
    /// Appliance kind as reported by the API ("IR", "LIGHT", "AC", ...).
    #[serde(default, rename = "type")]
    pub kind: Option<String>,
    #[serde(default)]
    pub signals: Vec<Signal>,
}

impl Appliance {
    pub fn new(id: impl Into<String>, nickname: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            nickname: nickname.into(),
            kind: None,
            signals: Vec::new(),
        }
    }

    pub fn with_signal(mut self, signal: Signal) -> Self {
        self.signals.push(signal);
        self
    }

    /// First signal whose name matches exactly (case-sensitive).
    pub fn signal(&self, name: &str) -> Option<&Signal> {
        self.signals.iter().find(|s| s.name == name)
    }
}

/// Button of the light profile (`POST /1/appliances/{id}/light`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LightButton {
    On,
    Off,
}

impl LightButton {
    pub fn as_str(&self) -> &'static str {
        match self {
            LightButton::On => "on",
            LightButton::Off => "off",
        }
    }
}

impl fmt::Display for LightButton {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
