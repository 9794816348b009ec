//! Command bodies run by the dispatcher.
//!
//! Each body reads the inventory snapshot, performs the remote effect and
//! reports a [`CommandOutcome`]. Lookup misses are outcomes, not errors.

use crate::api::RemoApi;
use crate::client::dispatch::CommandOutcome;
use crate::client::inventory::InventoryCache;
use crate::resilience::RateLimitGate;
use crate::types::{LightButton, Signal};
use crate::Result;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

/// Everything a command body needs; cheap to clone into a task.
#[derive(Clone)]
pub(crate) struct CommandContext {
    pub(crate) api: Arc<dyn RemoApi>,
    pub(crate) gate: Arc<RateLimitGate>,
    pub(crate) inventory: Arc<InventoryCache>,
}

impl CommandContext {
    fn resolve_signal(&self, nickname: &str, signal_name: &str) -> std::result::Result<Signal, CommandOutcome> {
        let appliance = self
            .inventory
            .appliance(nickname)
            .ok_or(CommandOutcome::NoSuchAppliance)?;
        appliance
            .signal(signal_name)
            .cloned()
            .ok_or(CommandOutcome::NoSuchSignal)
    }

    pub(crate) async fn send_signal(self, nickname: String, signal_name: String) -> Result<CommandOutcome> {
        self.send_signal_once(&nickname, &signal_name).await
    }

    async fn send_signal_once(&self, nickname: &str, signal_name: &str) -> Result<CommandOutcome> {
        let signal = match self.resolve_signal(nickname, signal_name) {
            Ok(signal) => signal,
            Err(miss) => {
                info!(%nickname, %signal_name, outcome = ?miss, "no matching signal, nothing sent");
                return Ok(miss);
            }
        };
        self.api.send_signal(&signal.id).await?;
        info!(%nickname, %signal_name, signal_id = %signal.id, "signal sent");
        Ok(CommandOutcome::Sent)
    }

    /// Send once now, then `repeat - 1` more times `interval` apart.
    ///
    /// The quota for every repetition was admitted up front; the gate is not
    /// consulted again between sends.
    pub(crate) async fn send_repeated(
        self,
        nickname: String,
        signal_name: String,
        repeat: u32,
        interval: Duration,
    ) -> Result<CommandOutcome> {
        for i in 0..repeat {
            if i > 0 {
                tokio::time::sleep(interval).await;
            }
            let outcome = self.send_signal_once(&nickname, &signal_name).await?;
            if outcome != CommandOutcome::Sent {
                return Ok(outcome);
            }
        }
        Ok(CommandOutcome::Sent)
    }

    pub(crate) async fn send_light(self, nickname: String, button: LightButton) -> Result<CommandOutcome> {
        let Some(appliance) = self.inventory.appliance(&nickname) else {
            info!(%nickname, %button, "no matching appliance, nothing sent");
            return Ok(CommandOutcome::NoSuchAppliance);
        };
        self.api
            .send_light_infrared_signal(&appliance.id, button)
            .await?;
        info!(%nickname, %button, appliance_id = %appliance.id, "light signal sent");
        Ok(CommandOutcome::Sent)
    }

    pub(crate) async fn refresh_devices(self) -> Result<CommandOutcome> {
        let devices = self.api.fetch_devices().await?;
        self.gate.reset_usage();
        for device in &devices {
            let r = device.readings();
            info!(
                device = %device.name,
                temperature = ?r.temperature,
                humidity = ?r.humidity,
                illumination = ?r.illumination,
                motion = ?r.motion,
                "sensor readings"
            );
        }
        let count = devices.len();
        self.inventory.replace_devices(devices);
        Ok(CommandOutcome::Refreshed { count })
    }

    pub(crate) async fn refresh_appliances(self) -> Result<CommandOutcome> {
        let appliances = self.api.fetch_appliances().await?;
        self.gate.reset_usage();
        let count = appliances.len();
        self.inventory.replace_appliances(appliances);
        info!(count, "appliances refreshed");
        Ok(CommandOutcome::Refreshed { count })
    }
}
