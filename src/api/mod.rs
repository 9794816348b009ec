//! Boundary to the Nature Remo cloud API.
//!
//! [`RemoApi`] is everything the controller needs from the vendor API. The
//! HTTP implementation is [`NatureRemoApi`]; tests substitute in-memory fakes.

pub mod remo;

use crate::resilience::RateLimitSnapshot;
use crate::types::{Appliance, Device, LightButton, User};
use crate::Result;
use async_trait::async_trait;

pub use remo::NatureRemoApi;

#[async_trait]
pub trait RemoApi: Send + Sync {
    async fn fetch_user(&self) -> Result<User>;

    async fn fetch_devices(&self) -> Result<Vec<Device>>;

    async fn fetch_appliances(&self) -> Result<Vec<Appliance>>;

    async fn send_signal(&self, signal_id: &str) -> Result<()>;

    async fn send_light_infrared_signal(
        &self,
        appliance_id: &str,
        button: LightButton,
    ) -> Result<()>;

    /// Rate-limit snapshot recorded from the most recent response.
    fn rate_limit(&self) -> RateLimitSnapshot;
}
