use crate::api::RemoApi;
use crate::config::ControllerConfig;
use crate::resilience::RateLimitSnapshot;
use crate::transport::{HttpTransport, TransportError};
use crate::types::{Appliance, Device, LightButton, User};
use crate::{Error, Result};
use arc_swap::ArcSwap;
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use std::sync::Arc;
use tracing::debug;

/// HTTP client for `https://api.nature.global/1/*`.
pub struct NatureRemoApi {
    transport: HttpTransport,
    rate_limit: ArcSwap<RateLimitSnapshot>,
}

impl NatureRemoApi {
    pub fn new(config: &ControllerConfig, token: impl Into<String>) -> Result<Self> {
        Ok(Self {
            transport: HttpTransport::new(config, token)?,
            rate_limit: ArcSwap::from_pointee(RateLimitSnapshot::default()),
        })
    }

    /// Record the snapshot, then turn a non-2xx status into [`Error::Remote`].
    async fn checked(&self, resp: reqwest::Response) -> Result<reqwest::Response> {
        let snapshot = RateLimitSnapshot::from_headers(resp.headers());
        debug!(url = %resp.url(), status = %resp.status(), %snapshot, "response");
        self.rate_limit.store(Arc::new(snapshot));

        let status = resp.status();
        if status.is_success() {
            return Ok(resp);
        }
        let message = resp.text().await.unwrap_or_default();
        Err(Error::Remote {
            status: status.as_u16(),
            message,
        })
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let resp = self.transport.get(path).await?;
        let resp = self.checked(resp).await?;
        let bytes = resp
            .bytes()
            .await
            .map_err(|e| Error::Transport(TransportError::Http(e)))?;
        Ok(serde_json::from_slice(&bytes)?)
    }

    async fn post(&self, path: &str, form: &[(&str, &str)]) -> Result<()> {
        let resp = self.transport.post_form(path, form).await?;
        self.checked(resp).await?;
        Ok(())
    }
}

#[async_trait]
impl RemoApi for NatureRemoApi {
    async fn fetch_user(&self) -> Result<User> {
        self.get_json("/1/users/me").await
    }

    async fn fetch_devices(&self) -> Result<Vec<Device>> {
        self.get_json("/1/devices").await
    }

    async fn fetch_appliances(&self) -> Result<Vec<Appliance>> {
        self.get_json("/1/appliances").await
    }

    async fn send_signal(&self, signal_id: &str) -> Result<()> {
        self.post(&format!("/1/signals/{}/send", signal_id), &[])
            .await
    }

    async fn send_light_infrared_signal(
        &self,
        appliance_id: &str,
        button: LightButton,
    ) -> Result<()> {
        self.post(
            &format!("/1/appliances/{}/light", appliance_id),
            &[("button", button.as_str())],
        )
        .await
    }

    fn rate_limit(&self) -> RateLimitSnapshot {
        **self.rate_limit.load()
    }
}
