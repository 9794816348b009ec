use crate::client::commands::CommandContext;
use crate::client::dispatch::{CommandDispatcher, CommandReport, Dispatch};
use crate::client::inflight::InFlightTracker;
use crate::client::signals::ControllerSignals;
use crate::config::ControllerConfig;
use crate::resilience::RateLimitSnapshot;
use crate::types::{Appliance, Device, LightButton, SensorReadings, User};
use crate::Result;
use std::sync::Arc;
use tokio::sync::broadcast;

/// Rate-gated controller for one Nature Remo account.
///
/// Command operations await only admission and return a [`Dispatch`]; the
/// command itself runs as an independent task. Completion is observed through
/// the returned handle or [`subscribe`](Self::subscribe).
pub struct Controller {
    pub(crate) ctx: CommandContext,
    pub(crate) tracker: Arc<InFlightTracker>,
    pub(crate) dispatcher: CommandDispatcher,
    pub(crate) config: ControllerConfig,
}

impl Controller {
    /// Build a controller for `token` with default configuration.
    ///
    /// Blocks until the gate first admits a request, then loads the appliances.
    pub async fn new(token: impl Into<String>) -> Result<Self> {
        crate::client::builder::ControllerBuilder::new()
            .token(token)
            .build()
            .await
    }

    pub fn builder() -> crate::client::builder::ControllerBuilder {
        crate::client::builder::ControllerBuilder::new()
    }

    pub fn config(&self) -> &ControllerConfig {
        &self.config
    }

    // Account-level fetches. Each successful one restarts optimistic usage from zero.

    pub async fn fetch_user(&self) -> Result<User> {
        self.ctx.gate.resync().await
    }

    pub async fn fetch_devices(&self) -> Result<Arc<Vec<Device>>> {
        let devices = self.ctx.api.fetch_devices().await?;
        self.ctx.gate.reset_usage();
        self.ctx.inventory.replace_devices(devices);
        Ok(self.ctx.inventory.devices())
    }

    pub async fn fetch_appliances(&self) -> Result<Arc<Vec<Appliance>>> {
        let appliances = self.ctx.api.fetch_appliances().await?;
        self.ctx.gate.reset_usage();
        self.ctx.inventory.replace_appliances(appliances);
        Ok(self.ctx.inventory.appliances())
    }

    // Commands

    /// Refresh devices and their sensor readings.
    pub async fn refresh_devices(&self) -> Dispatch {
        let ctx = self.ctx.clone();
        self.dispatcher
            .launch(1, "get_devices", ctx.refresh_devices())
            .await
    }

    pub async fn refresh_appliances(&self) -> Dispatch {
        let ctx = self.ctx.clone();
        self.dispatcher
            .launch(1, "get_appliances", ctx.refresh_appliances())
            .await
    }

    /// Send the first signal named `signal_name` of the first appliance
    /// nicknamed `nickname`.
    pub async fn send_signal(&self, nickname: &str, signal_name: &str) -> Dispatch {
        let ctx = self.ctx.clone();
        let label = format!("{}:{}", nickname, signal_name);
        self.dispatcher
            .launch(
                1,
                label,
                ctx.send_signal(nickname.to_string(), signal_name.to_string()),
            )
            .await
    }

    pub async fn send_on_signal(&self, nickname: &str) -> Dispatch {
        let on = self.config.on_signal_name.clone();
        self.send_signal(nickname, &on).await
    }

    /// Send the "on" signal `repeat` times, one repeat interval apart.
    ///
    /// All `repeat` units are admitted at once; a `repeat` of zero counts as one.
    pub async fn send_on_signals(&self, nickname: &str, repeat: u32) -> Dispatch {
        let repeat = repeat.max(1);
        let ctx = self.ctx.clone();
        let on = self.config.on_signal_name.clone();
        let label = format!("{}:{}", nickname, on);
        let body = ctx.send_repeated(
            nickname.to_string(),
            on,
            repeat,
            self.config.repeat_interval(),
        );
        self.dispatcher.launch(repeat, label, body).await
    }

    pub async fn send_on_signals_default(&self, nickname: &str) -> Dispatch {
        self.send_on_signals(nickname, self.config.default_repeat_count)
            .await
    }

    pub async fn send_signal_light(&self, nickname: &str, button: LightButton) -> Dispatch {
        let ctx = self.ctx.clone();
        let label = format!("{}:{}", nickname, button);
        self.dispatcher
            .launch(1, label, ctx.send_light(nickname.to_string(), button))
            .await
    }

    pub async fn send_on_signal_light(&self, nickname: &str) -> Dispatch {
        self.send_signal_light(nickname, LightButton::On).await
    }

    pub async fn send_off_signal_light(&self, nickname: &str) -> Dispatch {
        self.send_signal_light(nickname, LightButton::Off).await
    }

    // Observers

    pub fn subscribe(&self) -> broadcast::Receiver<CommandReport> {
        self.dispatcher.subscribe()
    }

    /// Label of the command currently in flight; empty when idle.
    pub fn current_in_flight_label(&self) -> String {
        self.tracker.current()
    }

    /// May `requested` more requests be issued now? May resynchronize first.
    pub async fn can_request(&self, requested: u32) -> bool {
        self.ctx.gate.can_request(requested).await
    }

    pub fn optimistic_usage(&self) -> i64 {
        self.ctx.gate.usage()
    }

    /// Server-reported remaining quota minus optimistic usage.
    pub fn remaining_count(&self) -> Option<i64> {
        self.ctx.gate.remaining()
    }

    pub fn seconds_until_reset(&self) -> Option<i64> {
        self.ctx.gate.seconds_until_reset()
    }

    pub fn rate_limit(&self) -> RateLimitSnapshot {
        self.ctx.gate.snapshot()
    }

    pub fn devices(&self) -> Arc<Vec<Device>> {
        self.ctx.inventory.devices()
    }

    pub fn appliances(&self) -> Arc<Vec<Appliance>> {
        self.ctx.inventory.appliances()
    }

    pub fn latest_readings(&self) -> Option<SensorReadings> {
        self.ctx.inventory.latest_readings()
    }

    /// Snapshot current runtime signals (facts only) for the caller's own scheduling.
    pub fn signals(&self) -> ControllerSignals {
        ControllerSignals {
            in_flight: self.tracker.current(),
            optimistic_usage: self.ctx.gate.usage(),
            rate_limit: self.ctx.gate.snapshot(),
            remaining: self.ctx.gate.remaining(),
            seconds_until_reset: self.ctx.gate.seconds_until_reset(),
            devices: self.ctx.inventory.devices().len(),
            appliances: self.ctx.inventory.appliances().len(),
        }
    }
}
