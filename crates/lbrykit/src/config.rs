//! Client configuration.

use serde::{Deserialize, Serialize};

use lbrykit_resolve::{BatchConfig, DEFAULT_CONCURRENCY};
use lbrykit_rpc::{GatewayConfig, DEFAULT_ENDPOINT, DEFAULT_PAGE_SIZE, DEFAULT_TIMEOUT_SECS};
use lbrykit_support::SupportConfig;

/// Settings for a [`crate::Client`].
///
/// Missing fields take their defaults when deserialized, so a config file
/// only needs the values it changes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Daemon JSON-RPC endpoint.
    pub endpoint: String,
    /// Per-request timeout.
    pub timeout_secs: u64,
    /// Worker pool width for bulk resolution; 0 resolves sequentially.
    pub concurrency: usize,
    /// `page_size` for `file_list` and `support_list`.
    pub page_size: u64,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            concurrency: DEFAULT_CONCURRENCY,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

impl ClientConfig {
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency;
        self
    }

    pub fn gateway(&self) -> GatewayConfig {
        GatewayConfig {
            endpoint: self.endpoint.clone(),
            timeout_secs: self.timeout_secs,
        }
    }

    /// Batch settings for bulk resolution; reposts are followed.
    pub fn batch(&self) -> BatchConfig {
        BatchConfig::default().with_concurrency(self.concurrency)
    }

    /// Support settings; the inventory does not follow reposts.
    pub fn support(&self) -> SupportConfig {
        let mut support = SupportConfig {
            page_size: self.page_size,
            ..SupportConfig::default()
        };
        support.batch.concurrency = self.concurrency;
        support
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ClientConfig::default();
        assert_eq!(config.endpoint, "http://localhost:5279");
        assert_eq!(config.timeout_secs, 30);
        assert_eq!(config.concurrency, 32);
        assert_eq!(config.page_size, 99_000);
    }

    #[test]
    fn test_partial_config_fills_defaults() {
        let config: ClientConfig =
            serde_json::from_str(r#"{"endpoint": "http://10.0.0.2:5279", "concurrency": 0}"#)
                .unwrap();
        assert_eq!(config.endpoint, "http://10.0.0.2:5279");
        assert_eq!(config.concurrency, 0);
        assert_eq!(config.timeout_secs, 30);
        assert_eq!(config.page_size, 99_000);
    }

    #[test]
    fn test_derived_configs() {
        let config = ClientConfig::default().with_concurrency(4);

        let batch = config.batch();
        assert_eq!(batch.concurrency, 4);
        assert!(batch.follow_repost);
        assert!(batch.cancel.is_none());

        let support = config.support();
        assert_eq!(support.page_size, 99_000);
        assert_eq!(support.batch.concurrency, 4);
        assert!(!support.batch.follow_repost);

        assert_eq!(config.gateway(), GatewayConfig::default());
    }
}
