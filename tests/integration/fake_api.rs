//! In-memory Nature Remo API that records every call

use async_trait::async_trait;
use nature_remo_controller::{
    Appliance, Controller, ControllerBuilder, Device, Error, LightButton, RateLimitSnapshot,
    RemoApi, Result, Signal, User,
};
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

pub const REPEAT_INTERVAL: Duration = Duration::from_millis(100);

#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    User,
    Devices,
    Appliances,
    Signal { id: String },
    Light { appliance_id: String, button: LightButton },
}

pub struct FakeApi {
    snapshot: Mutex<RateLimitSnapshot>,
    snapshot_after_user_fetch: Mutex<Option<RateLimitSnapshot>>,
    devices: Mutex<Vec<Device>>,
    appliances: Mutex<Vec<Appliance>>,
    calls: Mutex<Vec<(Instant, Call)>>,
    delays: Mutex<HashMap<String, Duration>>,
    failing: Mutex<HashSet<String>>,
    user_fetches: AtomicUsize,
    account_down: AtomicBool,
}

impl FakeApi {
    pub fn new(snapshot: RateLimitSnapshot) -> Self {
        Self {
            snapshot: Mutex::new(snapshot),
            snapshot_after_user_fetch: Mutex::new(None),
            devices: Mutex::new(vec![Device::new("living")
                .with_event("te", 22.5)
                .with_event("hu", 40.0)
                .with_event("il", 120.0)
                .with_event("mo", 1.0)]),
            appliances: Mutex::new(home()),
            calls: Mutex::new(Vec::new()),
            delays: Mutex::new(HashMap::new()),
            failing: Mutex::new(HashSet::new()),
            user_fetches: AtomicUsize::new(0),
            account_down: AtomicBool::new(false),
        }
    }

    /// `remaining` requests left, window resetting in a minute.
    pub fn with_remaining(remaining: u64) -> Arc<Self> {
        Arc::new(Self::new(RateLimitSnapshot::resetting_in(
            remaining,
            Duration::from_secs(60),
        )))
    }

    pub fn set_snapshot(&self, snapshot: RateLimitSnapshot) {
        *self.snapshot.lock().unwrap() = snapshot;
    }

    /// Snapshot the server reports once the account has been fetched.
    pub fn set_snapshot_after_user_fetch(&self, snapshot: RateLimitSnapshot) {
        *self.snapshot_after_user_fetch.lock().unwrap() = Some(snapshot);
    }

    pub fn set_devices(&self, devices: Vec<Device>) {
        *self.devices.lock().unwrap() = devices;
    }

    /// Delay remote sends targeting a signal or appliance id.
    pub fn delay(&self, id: &str, delay: Duration) {
        self.delays.lock().unwrap().insert(id.to_string(), delay);
    }

    /// Make remote sends targeting a signal or appliance id fail.
    pub fn fail(&self, id: &str) {
        self.failing.lock().unwrap().insert(id.to_string());
    }

    /// Make user, device and appliance fetches fail until called with `false`.
    pub fn set_account_down(&self, down: bool) {
        self.account_down.store(down, Ordering::SeqCst);
    }

    fn account_fetch(&self) -> Result<()> {
        if self.account_down.load(Ordering::SeqCst) {
            return Err(Error::Remote {
                status: 503,
                message: "account fetch failed".into(),
            });
        }
        Ok(())
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().iter().map(|(_, c)| c.clone()).collect()
    }

    pub fn timed_calls(&self) -> Vec<(Instant, Call)> {
        self.calls.lock().unwrap().clone()
    }

    pub fn sends(&self) -> Vec<Call> {
        self.calls()
            .into_iter()
            .filter(|c| matches!(c, Call::Signal { .. } | Call::Light { .. }))
            .collect()
    }

    pub fn user_fetches(&self) -> usize {
        self.user_fetches.load(Ordering::SeqCst)
    }

    fn record(&self, call: Call) {
        self.calls.lock().unwrap().push((Instant::now(), call));
    }

    async fn remote_effect(&self, id: &str) -> Result<()> {
        let delay = self.delays.lock().unwrap().get(id).copied();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        if self.failing.lock().unwrap().contains(id) {
            return Err(Error::Remote {
                status: 500,
                message: format!("{} failed", id),
            });
        }
        Ok(())
    }
}

/// tv (power / on / ch_up), studio light, and a second "tv" that must never be picked.
pub fn home() -> Vec<Appliance> {
    vec![
        Appliance::new("a-tv", "tv")
            .with_signal(Signal::new("s-power", "power"))
            .with_signal(Signal::new("s-on", "on"))
            .with_signal(Signal::new("s-on-dup", "on"))
            .with_signal(Signal::new("s-up", "ch_up")),
        Appliance::new("a-studio", "studio"),
        Appliance::new("a-tv-2", "tv").with_signal(Signal::new("s-other", "mute")),
    ]
}

#[async_trait]
impl RemoApi for FakeApi {
    async fn fetch_user(&self) -> Result<User> {
        self.record(Call::User);
        self.user_fetches.fetch_add(1, Ordering::SeqCst);
        self.account_fetch()?;
        if let Some(next) = self.snapshot_after_user_fetch.lock().unwrap().take() {
            *self.snapshot.lock().unwrap() = next;
        }
        Ok(User {
            id: "u1".into(),
            nickname: "owner".into(),
            superuser: false,
        })
    }

    async fn fetch_devices(&self) -> Result<Vec<Device>> {
        self.record(Call::Devices);
        self.account_fetch()?;
        Ok(self.devices.lock().unwrap().clone())
    }

    async fn fetch_appliances(&self) -> Result<Vec<Appliance>> {
        self.record(Call::Appliances);
        self.account_fetch()?;
        Ok(self.appliances.lock().unwrap().clone())
    }

    async fn send_signal(&self, signal_id: &str) -> Result<()> {
        self.record(Call::Signal {
            id: signal_id.to_string(),
        });
        self.remote_effect(signal_id).await
    }

    async fn send_light_infrared_signal(
        &self,
        appliance_id: &str,
        button: LightButton,
    ) -> Result<()> {
        self.record(Call::Light {
            appliance_id: appliance_id.to_string(),
            button,
        });
        self.remote_effect(appliance_id).await
    }

    fn rate_limit(&self) -> RateLimitSnapshot {
        *self.snapshot.lock().unwrap()
    }
}

pub async fn controller(api: Arc<FakeApi>) -> Controller {
    ControllerBuilder::new()
        .api(api)
        .repeat_interval(REPEAT_INTERVAL)
        .admission_poll_interval(Duration::from_millis(10))
        .build()
        .await
        .expect("controller builds")
}

/// Poll `cond` until it holds or `within` elapses.
pub async fn wait_for(within: Duration, mut cond: impl FnMut() -> bool) -> bool {
    let deadline = Instant::now() + within;
    while Instant::now() < deadline {
        if cond() {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
    cond()
}
