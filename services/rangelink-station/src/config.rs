use anyhow::{Context, Result};
use rangelink_link::LinkAddress;
use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;

fn default_port() -> String {
    "auto".to_string()
}

fn default_baud() -> u32 {
    57_600
}

fn default_link_timeout_ms() -> u64 {
    500
}

fn default_poll_period_ms() -> u64 {
    100
}

fn default_session() -> u16 {
    1
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_api_mode() -> bool {
    true
}

/// Station configuration, loaded from a JSON file.
#[derive(Debug, Clone, Deserialize)]
pub struct StationConfig {
    /// Serial device path, or "auto" to take the first USB serial port.
    #[serde(default = "default_port")]
    pub port: String,
    #[serde(default = "default_baud")]
    pub baud: u32,
    /// Whether the radio runs in addressed API mode (plain serial otherwise).
    #[serde(default = "default_api_mode")]
    pub api_mode: bool,
    #[serde(default = "default_link_timeout_ms")]
    pub link_timeout_ms: u64,
    #[serde(default = "default_poll_period_ms")]
    pub poll_period_ms: u64,
    /// Session id stamped into every outgoing frame.
    #[serde(default = "default_session")]
    pub session: u16,
    #[serde(default = "default_log_level")]
    pub log_level: String,
    /// Radio MAC tail per roster id ("1" through "8"), colon-separated hex.
    #[serde(default)]
    pub robot_addresses: HashMap<u8, String>,
}

impl StationConfig {
    pub fn load(path: &Path) -> Result<StationConfig> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        let config: StationConfig = serde_json::from_str(&raw)
            .with_context(|| format!("parsing config {}", path.display()))?;
        Ok(config)
    }

    /// Parse the configured per-robot addresses.
    pub fn addresses(&self) -> Result<Vec<(u8, LinkAddress)>> {
        self.robot_addresses
            .iter()
            .map(|(&id, raw)| {
                let address = raw
                    .parse::<LinkAddress>()
                    .with_context(|| format!("address for robot {id}: {raw:?}"))?;
                Ok((id, address))
            })
            .collect()
    }
}
