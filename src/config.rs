use serde::Deserialize;
use std::collections::BTreeMap;

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub server: ServerConfig,
    #[serde(default)]
    pub sampling: SamplingConfig,
    /// systemd unit -> display name, checked with `systemctl is-active` every tick.
    #[serde(default)]
    pub services: BTreeMap<String, String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub port: u16,
    pub host: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SamplingConfig {
    #[serde(default = "default_interval_ms")]
    pub interval_ms: u64,
    /// Upper bound for one collector call; a slower call yields a placeholder tick.
    #[serde(default = "default_collect_timeout_ms")]
    pub collect_timeout_ms: u64,
    /// How often to log app stats (connected clients, ticks published) at INFO level.
    #[serde(default = "default_stats_log_interval_secs")]
    pub stats_log_interval_secs: u64,
}

impl Default for SamplingConfig {
    fn default() -> Self {
        Self {
            interval_ms: default_interval_ms(),
            collect_timeout_ms: default_collect_timeout_ms(),
            stats_log_interval_secs: default_stats_log_interval_secs(),
        }
    }
}

fn default_interval_ms() -> u64 {
    2000
}

fn default_collect_timeout_ms() -> u64 {
    1500
}

fn default_stats_log_interval_secs() -> u64 {
    60
}

impl AppConfig {
    pub fn load() -> anyhow::Result<Self> {
        let path = std::env::var("CONFIG_FILE").unwrap_or_else(|_| "config.toml".into());
        let s = std::fs::read_to_string(&path)?;
        Self::load_from_str(&s)
    }

    /// Parse and validate config from a string (e.g. for tests).
    pub fn load_from_str(s: &str) -> anyhow::Result<Self> {
        let config: AppConfig = toml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> anyhow::Result<()> {
        anyhow::ensure!(
            self.server.port > 0,
            "server.port must be between 1 and 65535, got {}",
            self.server.port
        );
        anyhow::ensure!(
            !self.server.host.is_empty(),
            "server.host must be non-empty"
        );
        anyhow::ensure!(
            self.sampling.interval_ms > 0,
            "sampling.interval_ms must be > 0, got {}",
            self.sampling.interval_ms
        );
        anyhow::ensure!(
            self.sampling.collect_timeout_ms > 0,
            "sampling.collect_timeout_ms must be > 0, got {}",
            self.sampling.collect_timeout_ms
        );
        anyhow::ensure!(
            self.sampling.collect_timeout_ms <= self.sampling.interval_ms,
            "sampling.collect_timeout_ms ({}) must not exceed sampling.interval_ms ({})",
            self.sampling.collect_timeout_ms,
            self.sampling.interval_ms
        );
        anyhow::ensure!(
            self.sampling.stats_log_interval_secs > 0,
            "sampling.stats_log_interval_secs must be > 0, got {}",
            self.sampling.stats_log_interval_secs
        );
        for (unit, name) in &self.services {
            anyhow::ensure!(
                !unit.is_empty() && !name.is_empty(),
                "services entries need a unit and a display name, got {:?} = {:?}",
                unit,
                name
            );
        }
        Ok(())
    }
}
