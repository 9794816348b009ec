use crate::config::ControllerConfig;
use crate::Result;
use keyring::Entry;
use reqwest::Proxy;
use std::env;
use std::time::Duration;
use url::Url;

/// Keyring service under which an access token may be stored.
pub const KEYRING_SERVICE: &str = "nature-remo";
/// Keyring user for the default account.
pub const KEYRING_USER: &str = "default";
/// Environment variable consulted when neither config nor keyring holds a token.
pub const TOKEN_ENV: &str = "NATURE_REMO_TOKEN";

pub struct HttpTransport {
    client: reqwest::Client,
    base_url: Url,
    token: String,
}

impl HttpTransport {
    pub fn new(config: &ControllerConfig, token: impl Into<String>) -> Result<Self> {
        let base_url = Url::parse(&config.base_url)
            .map_err(|e| TransportError::Other(format!("invalid base url: {}", e)))?;

        let mut builder = reqwest::Client::builder()
            .timeout(config.http_timeout())
            .pool_idle_timeout(Some(Duration::from_secs(90)))
            .user_agent(concat!("nature-remo-controller/", env!("CARGO_PKG_VERSION")));

        if let Ok(proxy_url) = env::var("NATURE_REMO_PROXY_URL") {
            if let Ok(proxy) = Proxy::all(&proxy_url) {
                builder = builder.proxy(proxy);
            }
        }

        let client = builder
            .build()
            .map_err(|e| TransportError::Other(e.to_string()))?;

        Ok(Self {
            client,
            base_url,
            token: token.into(),
        })
    }

    /// Resolve the access token: explicit value, then OS keyring, then environment.
    pub fn resolve_token(explicit: Option<&str>) -> Option<String> {
        if let Some(token) = explicit.map(str::trim).filter(|t| !t.is_empty()) {
            return Some(token.to_string());
        }

        // 1. Try Keyring
        if let Ok(entry) = Entry::new(KEYRING_SERVICE, KEYRING_USER) {
            if let Ok(token) = entry.get_password() {
                return Some(token);
            }
        }

        // 2. Try Environment Variable
        env::var(TOKEN_ENV).ok().filter(|t| !t.trim().is_empty())
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn url(&self, path: &str) -> Result<Url> {
        self.base_url
            .join(path)
            .map_err(|e| TransportError::Other(format!("invalid path {}: {}", path, e)).into())
    }

    pub async fn get(&self, path: &str) -> Result<reqwest::Response> {
        let url = self.url(path)?;
        self.client
            .get(url)
            .bearer_auth(&self.token)
            .header("accept", "application/json")
            .send()
            .await
            .map_err(|e| crate::Error::Transport(TransportError::Http(e)))
    }

    pub async fn post_form(&self, path: &str, form: &[(&str, &str)]) -> Result<reqwest::Response> {
        let url = self.url(path)?;
        self.client
            .post(url)
            .bearer_auth(&self.token)
            .header("accept", "application/json")
            .form(form)
            .send()
            .await
            .map_err(|e| crate::Error::Transport(TransportError::Http(e)))
    }
}

#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Transport error: {0}")]
    Other(String),
}
