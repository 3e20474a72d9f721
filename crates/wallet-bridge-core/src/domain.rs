use alloy::primitives::Address;
use serde::{Deserialize, Serialize};

use crate::errors::ProviderError;

/// Unique token pairing an outgoing request with its eventual result message.
/// Generated from 16 random bytes so page code cannot predict or forge ids.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RequestId(String);

impl RequestId {
    pub fn generate() -> Result<Self, ProviderError> {
        let mut bytes = [0u8; 16];
        getrandom::getrandom(&mut bytes)
            .map_err(|e| ProviderError::Transport(format!("request id entropy failed: {e}")))?;
        Ok(Self(format!("0x{}", alloy::primitives::hex::encode(bytes))))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for RequestId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Request classes tracked by the correlation registry. Only `Rpc` carries a
/// registry-imposed deadline; `Transaction` and `Signature` wait on human
/// approval in the relay UI and intentionally never expire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RequestKind {
    Rpc,
    Transaction,
    Signature,
}

/// Frozen per-page-load identity used for multi-wallet discovery
/// announcements (EIP-6963).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderIdentity {
    pub uuid: String,
    pub name: String,
    pub icon: String,
    pub rdns: String,
}

impl ProviderIdentity {
    pub fn generate(name: impl Into<String>, icon: impl Into<String>, rdns: impl Into<String>) -> Self {
        Self {
            uuid: uuid::Uuid::new_v4().to_string(),
            name: name.into(),
            icon: icon.into(),
            rdns: rdns.into(),
        }
    }
}

/// The provider's authoritative state tuple. Mutated exclusively by relay
/// messages, never by page code.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderState {
    pub address: Option<Address>,
    pub chain_id: u64,
    pub rpc_url: String,
}

/// A chain on the transaction-submission allow-list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChainInfo {
    pub chain_id: u64,
    pub name: &'static str,
}

/// Chains `eth_sendTransaction` accepts. Raw RPC forwarding is not bound by
/// this list.
pub const SUPPORTED_CHAINS: &[ChainInfo] = &[
    ChainInfo { chain_id: 1, name: "Ethereum Mainnet" },
    ChainInfo { chain_id: 10, name: "Optimism" },
    ChainInfo { chain_id: 137, name: "Polygon" },
    ChainInfo { chain_id: 8453, name: "Base" },
    ChainInfo { chain_id: 42161, name: "Arbitrum One" },
    ChainInfo { chain_id: 11155111, name: "Sepolia" },
];

pub fn is_supported_chain(chain_id: u64) -> bool {
    SUPPORTED_CHAINS.iter().any(|c| c.chain_id == chain_id)
}

pub fn supported_chain_names() -> String {
    SUPPORTED_CHAINS
        .iter()
        .map(|c| c.name)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Tuning knobs the bridge itself needs. Host-facing configuration lives in
/// the adapters crate and is lowered into this.
#[derive(Debug, Clone)]
pub struct BridgeOptions {
    pub rpc_timeout_ms: u64,
}

impl Default for BridgeOptions {
    fn default() -> Self {
        Self {
            rpc_timeout_ms: 30_000,
        }
    }
}

/// The EIP-1193 request call form: `{ method, params }`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RequestArguments {
    pub method: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub params: Option<serde_json::Value>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderEventKind {
    Connect,
    AccountsChanged,
    ChainChanged,
}

impl ProviderEventKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Connect => "connect",
            Self::AccountsChanged => "accountsChanged",
            Self::ChainChanged => "chainChanged",
        }
    }
}

/// A change notification emitted toward page listeners, recorded with a
/// monotonic sequence so tests can inspect emission order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderEvent {
    pub sequence: u64,
    pub kind: ProviderEventKind,
    pub payload: serde_json::Value,
}

pub fn encode_chain_id_hex(chain_id: u64) -> String {
    format!("0x{chain_id:x}")
}

pub fn parse_chain_id_value(value: &serde_json::Value) -> Result<u64, ProviderError> {
    if let Some(n) = value.as_u64() {
        return Ok(n);
    }
    let s = value
        .as_str()
        .ok_or_else(|| ProviderError::InvalidParams("chain id must be string or number".to_owned()))?;
    parse_chain_id_str(s)
}

pub fn parse_chain_id_str(raw: &str) -> Result<u64, ProviderError> {
    if raw.starts_with("0x") || raw.starts_with("0X") {
        u64::from_str_radix(raw.trim_start_matches("0x").trim_start_matches("0X"), 16)
            .map_err(|e| ProviderError::InvalidParams(format!("invalid hex chain id: {e}")))
    } else {
        raw.parse()
            .map_err(|e| ProviderError::InvalidParams(format!("invalid chain id: {e}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chain_id_hex_round_trip() {
        assert_eq!(encode_chain_id_hex(1), "0x1");
        assert_eq!(encode_chain_id_hex(11155111), "0xaa36a7");
        assert_eq!(parse_chain_id_str("0xaa36a7").expect("hex"), 11155111);
        assert_eq!(parse_chain_id_str("137").expect("decimal"), 137);
    }

    #[test]
    fn chain_id_value_accepts_number_and_string() {
        assert_eq!(parse_chain_id_value(&serde_json::json!(8453)).expect("number"), 8453);
        assert_eq!(parse_chain_id_value(&serde_json::json!("0x2105")).expect("hex string"), 8453);
        assert!(parse_chain_id_value(&serde_json::json!({})).is_err());
    }

    #[test]
    fn request_ids_are_distinct() {
        let a = RequestId::generate().expect("id a");
        let b = RequestId::generate().expect("id b");
        assert_ne!(a, b);
        assert!(a.as_str().starts_with("0x"));
    }

    #[test]
    fn allow_list_names_are_cited() {
        assert!(is_supported_chain(1));
        assert!(!is_supported_chain(56));
        let names = supported_chain_names();
        assert!(names.contains("Base"));
        assert!(names.contains("Arbitrum One"));
    }
}
