use crate::types::{Appliance, Device, SensorReadings};
use arc_swap::ArcSwap;
use std::sync::Arc;

/// Most recently fetched devices and appliances.
///
/// Each refresh swaps in a new list; readers holding the previous `Arc`
/// keep a consistent view.
pub struct InventoryCache {
    devices: ArcSwap<Vec<Device>>,
    appliances: ArcSwap<Vec<Appliance>>,
}

impl InventoryCache {
    pub fn new() -> Self {
        Self {
            devices: ArcSwap::from_pointee(Vec::new()),
            appliances: ArcSwap::from_pointee(Vec::new()),
        }
    }

    pub fn devices(&self) -> Arc<Vec<Device>> {
        self.devices.load_full()
    }

    pub fn appliances(&self) -> Arc<Vec<Appliance>> {
        self.appliances.load_full()
    }

    pub fn replace_devices(&self, devices: Vec<Device>) {
        self.devices.store(Arc::new(devices));
    }

    pub fn replace_appliances(&self, appliances: Vec<Appliance>) {
        self.appliances.store(Arc::new(appliances));
    }

    /// First appliance whose nickname matches exactly (case-sensitive).
    pub fn appliance(&self, nickname: &str) -> Option<Appliance> {
        self.appliances
            .load()
            .iter()
            .find(|a| a.nickname == nickname)
            .cloned()
    }

    /// Readings of the last device in the list.
    pub fn latest_readings(&self) -> Option<SensorReadings> {
        self.devices.load().last().map(Device::readings)
    }
}

impl Default for InventoryCache {
    fn default() -> Self {
        Self::new()
    }
}
