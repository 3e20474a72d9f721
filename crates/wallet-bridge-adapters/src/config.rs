use wallet_bridge_core::{BridgeOptions, ProviderIdentity};

/// Minimal wallet glyph used in discovery announcements when the embedder
/// does not supply one.
const DEFAULT_ICON: &str = "data:image/svg+xml;base64,PHN2ZyB4bWxucz0iaHR0cDovL3d3dy53My5vcmcvMjAwMC9zdmciIHZpZXdCb3g9IjAgMCAzMiAzMiI+PHJlY3Qgd2lkdGg9IjMyIiBoZWlnaHQ9IjMyIiByeD0iNiIgZmlsbD0iIzFhMWEyZSIvPjxwYXRoIGQ9Ik04IDEyaDE2djEwSDh6IiBmaWxsPSIjZTk0NTYwIi8+PC9zdmc+";

#[derive(Debug, Clone)]
pub struct BridgeConfig {
    pub rpc_timeout_ms: u64,
    pub provider_name: String,
    pub provider_icon: String,
    pub provider_rdns: String,
    /// The well-known global property legacy dapps read.
    pub legacy_slot_property: String,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            rpc_timeout_ms: 30_000,
            provider_name: "Wallet Bridge".to_owned(),
            provider_icon: DEFAULT_ICON.to_owned(),
            provider_rdns: "io.walletbridge".to_owned(),
            legacy_slot_property: "ethereum".to_owned(),
        }
    }
}

impl BridgeConfig {
    pub fn options(&self) -> BridgeOptions {
        BridgeOptions {
            rpc_timeout_ms: self.rpc_timeout_ms,
        }
    }

    /// A fresh identity for this page load. The uuid differs per call;
    /// generate once and keep it for the provider's lifetime.
    pub fn identity(&self) -> ProviderIdentity {
        ProviderIdentity::generate(
            self.provider_name.clone(),
            self.provider_icon.clone(),
            self.provider_rdns.clone(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_protocol_constants() {
        let config = BridgeConfig::default();
        assert_eq!(config.rpc_timeout_ms, 30_000);
        assert_eq!(config.legacy_slot_property, "ethereum");
        assert_eq!(config.options().rpc_timeout_ms, 30_000);
    }

    #[test]
    fn identity_is_unique_per_generation() {
        let config = BridgeConfig::default();
        let a = config.identity();
        let b = config.identity();
        assert_ne!(a.uuid, b.uuid);
        assert_eq!(a.rdns, b.rdns);
    }
}
