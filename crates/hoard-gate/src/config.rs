use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Limits for the chain authorizer.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GateConfig {
    /// Largest share blob that will be parsed, in bytes.
    pub max_share_size: u64,
    /// How many bytes of an interior hop are searched for the next ref.
    pub max_hop_read: u64,
    /// Minimum wall-clock time, in milliseconds, of a rejected request.
    pub failure_floor_ms: u64,
    /// When `true`, the share hop must also carry a valid signature.
    pub require_signed_shares: bool,
}

impl Default for GateConfig {
    fn default() -> Self {
        Self {
            max_share_size: 64 * 1024,
            max_hop_read: 64 * 1024,
            failure_floor_ms: 200,
            require_signed_shares: false,
        }
    }
}

impl GateConfig {
    pub fn failure_floor(&self) -> Duration {
        Duration::from_millis(self.failure_floor_ms)
    }

    /// Default limits with no failure floor. Only useful in tests.
    pub fn without_floor() -> Self {
        Self {
            failure_floor_ms: 0,
            ..Default::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = GateConfig::default();
        assert_eq!(config.max_share_size, 65536);
        assert_eq!(config.failure_floor(), Duration::from_millis(200));
        assert!(!config.require_signed_shares);
    }

    #[test]
    fn partial_toml_keeps_defaults() {
        let config: GateConfig = toml::from_str("failure_floor_ms = 50").unwrap();
        assert_eq!(config.failure_floor_ms, 50);
        assert_eq!(config.max_hop_read, 65536);
    }
}
