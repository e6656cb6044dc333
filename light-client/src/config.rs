use std::time::Duration;

use serde::{Deserialize, Serialize};
use url::Url;

use crate::MilightError;

pub const DEFAULT_HOST: &str = "255.255.255.255";
pub const DEFAULT_PORT: u16 = 8899;
pub const DEFAULT_MIN_DELAY_MS: u64 = 100;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ControllerConfig {
    pub host: String,
    pub port: u16,
    /// Broadcast is switched on automatically for the default host.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub broadcast: Option<bool>,
    pub min_delay_ms: u64,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_owned(),
            port: DEFAULT_PORT,
            broadcast: None,
            min_delay_ms: DEFAULT_MIN_DELAY_MS,
        }
    }
}

impl ControllerConfig {
    pub fn new(host: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            ..Default::default()
        }
    }

    /// Reads an endpoint of the form `udp://host[:port]`.
    pub fn from_endpoint(endpoint: &str) -> Result<Self, MilightError> {
        let url = Url::parse(endpoint).map_err(|e| MilightError::InvalidArgument {
            reason: format!("invalid endpoint {endpoint}: {e}"),
        })?;
        if url.scheme() != "udp" {
            return Err(MilightError::InvalidArgument {
                reason: format!("unsupported endpoint protocol: {}", url.scheme()),
            });
        }
        let host = url
            .host_str()
            .filter(|host| !host.is_empty())
            .ok_or_else(|| MilightError::InvalidArgument {
                reason: format!("endpoint {endpoint} has no host"),
            })?;

        Ok(Self::new(host).with_port(url.port().unwrap_or(DEFAULT_PORT)))
    }

    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    pub fn with_broadcast(mut self, broadcast: bool) -> Self {
        self.broadcast = Some(broadcast);
        self
    }

    pub fn with_min_delay(mut self, delay: Duration) -> Self {
        self.min_delay_ms = delay.as_millis() as u64;
        self
    }

    pub fn broadcast_enabled(&self) -> bool {
        self.broadcast.unwrap_or(self.host == DEFAULT_HOST)
    }

    pub fn min_delay(&self) -> Duration {
        Duration::from_millis(self.min_delay_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_broadcast_to_everyone() {
        let config = ControllerConfig::default();
        assert_eq!(config.host, "255.255.255.255");
        assert_eq!(config.port, 8899);
        assert!(config.broadcast_enabled());
        assert_eq!(config.min_delay(), Duration::from_millis(100));
    }

    #[test]
    fn broadcast_follows_host_unless_set() {
        assert!(!ControllerConfig::new("192.168.0.10").broadcast_enabled());
        assert!(ControllerConfig::new("192.168.0.255")
            .with_broadcast(true)
            .broadcast_enabled());
        assert!(!ControllerConfig::default()
            .with_broadcast(false)
            .broadcast_enabled());
    }

    #[test]
    fn endpoints() {
        let config = ControllerConfig::from_endpoint("udp://192.168.0.255:9000").unwrap();
        assert_eq!(config.host, "192.168.0.255");
        assert_eq!(config.port, 9000);

        let config = ControllerConfig::from_endpoint("udp://bridge.local").unwrap();
        assert_eq!(config.host, "bridge.local");
        assert_eq!(config.port, DEFAULT_PORT);

        for endpoint in ["http://192.168.0.255", "192.168.0.255", "udp:///"] {
            assert!(
                matches!(
                    ControllerConfig::from_endpoint(endpoint),
                    Err(MilightError::InvalidArgument { .. })
                ),
                "{endpoint}"
            );
        }
    }

    #[test]
    fn deserializes_partial_config() {
        let config: ControllerConfig =
            serde_json::from_str(r#"{"host": "10.0.0.255", "broadcast": true}"#).unwrap();
        assert_eq!(
            config,
            ControllerConfig::new("10.0.0.255").with_broadcast(true)
        );

        let json = serde_json::to_string(&ControllerConfig::default()).unwrap();
        assert!(!json.contains("broadcast"));
    }
}
