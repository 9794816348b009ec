use crate::api::{NatureRemoApi, RemoApi};
use crate::client::commands::CommandContext;
use crate::client::core::Controller;
use crate::client::dispatch::CommandDispatcher;
use crate::client::inflight::InFlightTracker;
use crate::client::inventory::InventoryCache;
use crate::config::ControllerConfig;
use crate::resilience::RateLimitGate;
use crate::transport::HttpTransport;
use crate::{Error, ErrorContext, Result};
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

/// Builder for creating controllers with custom configuration.
pub struct ControllerBuilder {
    config: ControllerConfig,
    api: Option<Arc<dyn RemoApi>>,
}

impl ControllerBuilder {
    pub fn new() -> Self {
        Self::from_config(ControllerConfig::default())
    }

    pub fn from_config(config: ControllerConfig) -> Self {
        Self { config, api: None }
    }

    pub fn token(mut self, token: impl Into<String>) -> Self {
        self.config.token = Some(token.into());
        self
    }

    /// Override the API base URL (primarily for testing with mock servers).
    pub fn base_url_override(mut self, base_url: impl Into<String>) -> Self {
        self.config.base_url = base_url.into();
        self
    }

    pub fn repeat_interval(mut self, interval: Duration) -> Self {
        self.config.repeat_interval_ms = interval.as_millis() as u64;
        self
    }

    pub fn admission_poll_interval(mut self, interval: Duration) -> Self {
        self.config.admission_poll_interval_ms = interval.as_millis() as u64;
        self
    }

    pub fn on_signal_name(mut self, name: impl Into<String>) -> Self {
        self.config.on_signal_name = name.into();
        self
    }

    /// Use a custom API implementation instead of the HTTP client.
    pub fn api(mut self, api: Arc<dyn RemoApi>) -> Self {
        self.api = Some(api);
        self
    }

    /// Build the controller.
    ///
    /// Fetches devices once to obtain the first rate-limit snapshot, waits
    /// (polling every admission poll interval) until the gate admits a
    /// request, then fetches appliances. Commands are spawned on the Tokio
    /// runtime this is called from.
    pub async fn build(self) -> Result<Controller> {
        self.config.validate()?;
        let config = self.config;

        let api = match self.api {
            Some(api) => api,
            None => {
                let token = HttpTransport::resolve_token(config.token.as_deref()).ok_or_else(|| {
                    Error::configuration_with_context(
                        "no access token",
                        ErrorContext::new()
                            .with_field_path("token")
                            .with_details("set NATURE_REMO_TOKEN or store one in the keyring")
                            .with_source("controller_builder"),
                    )
                })?;
                Arc::new(NatureRemoApi::new(&config, token)?) as Arc<dyn RemoApi>
            }
        };

        let gate = Arc::new(RateLimitGate::new(api.clone()));
        let tracker = Arc::new(InFlightTracker::new());
        let dispatcher = CommandDispatcher::new(
            gate.clone(),
            tracker.clone(),
            config.event_capacity,
            tokio::runtime::Handle::current(),
        );
        let controller = Controller {
            ctx: CommandContext {
                api,
                gate,
                inventory: Arc::new(InventoryCache::new()),
            },
            tracker,
            dispatcher,
            config,
        };

        let devices = controller.fetch_devices().await?;
        info!(count = devices.len(), snapshot = %controller.rate_limit(), "devices loaded");

        while !controller.can_request(1).await {
            info!(
                remaining = ?controller.remaining_count(),
                reset_in = ?controller.seconds_until_reset(),
                "waiting for rate limit budget"
            );
            tokio::time::sleep(controller.config.admission_poll_interval()).await;
        }

        let appliances = controller.fetch_appliances().await?;
        info!(count = appliances.len(), "appliances loaded");
        Ok(controller)
    }
}

impl Default for ControllerBuilder {
    fn default() -> Self {
        Self::new()
    }
}
