use std::path::Path;
use std::time::Duration;

use anyhow::Context;
use serde::Deserialize;

const DEFAULT_LISTEN_ADDR: &str = "127.0.0.1:42069";
const DEFAULT_UPSTREAM_URL: &str = "http://httpbin.org";

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Config {
    pub listen_addr: String,
    /// Base URL the demo handler relays `/httpbin/*` requests to.
    pub upstream_url: String,
    pub upstream_connect_timeout_secs: u64,
    pub upstream_request_timeout_secs: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            listen_addr: DEFAULT_LISTEN_ADDR.to_string(),
            upstream_url: DEFAULT_UPSTREAM_URL.to_string(),
            upstream_connect_timeout_secs: 5,
            upstream_request_timeout_secs: 30,
        }
    }
}

impl Config {
    /// Builds the config from `LISTEN` and `UPSTREAM_URL`, falling back to
    /// defaults for anything unset.
    pub fn load() -> Self {
        let defaults = Self::default();

        let listen_addr = std::env::var("LISTEN").unwrap_or(defaults.listen_addr);
        let upstream_url = std::env::var("UPSTREAM_URL").unwrap_or(defaults.upstream_url);

        Self {
            listen_addr,
            upstream_url,
            ..defaults
        }
    }

    /// Parses a YAML document. Missing keys take their defaults.
    pub fn from_yaml_str(yaml: &str) -> anyhow::Result<Self> {
        serde_yaml::from_str(yaml).context("Invalid config")
    }

    pub fn from_file(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        Self::from_yaml_str(&contents)
    }

    pub fn upstream_connect_timeout(&self) -> Duration {
        Duration::from_secs(self.upstream_connect_timeout_secs)
    }

    pub fn upstream_request_timeout(&self) -> Duration {
        Duration::from_secs(self.upstream_request_timeout_secs)
    }
}
