//! Wire vocabulary exchanged with the relay. Every message crossing the page
//! boundary is a `{type, msg}` envelope; anything that does not parse into
//! this vocabulary is dropped by the receiver.

use alloy::primitives::Address;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::domain::RequestId;

/// Page -> relay messages.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "msg", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum OutboundMessage {
    RpcRequest {
        id: RequestId,
        rpc_url: String,
        method: String,
        params: Value,
    },
    SwitchEthereumChain {
        chain_id: u64,
    },
    SignatureRequest {
        id: RequestId,
        method: String,
        params: Value,
        chain_id: u64,
    },
    SendTransaction {
        id: RequestId,
        from: Address,
        to: Address,
        data: String,
        value: String,
        chain_id: u64,
    },
}

/// Relay -> page messages. Produced by the privileged side; the transport
/// adapter verifies the source before any of these are trusted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "msg", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum InboundMessage {
    Init {
        address: Option<Address>,
        chain_id: u64,
        rpc_url: String,
    },
    SetAddress {
        address: Option<Address>,
    },
    SetChainId {
        chain_id: u64,
        rpc_url: String,
    },
    RpcResponse {
        id: RequestId,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        result: Option<Value>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        error: Option<String>,
    },
    SwitchEthereumChain {
        chain_id: u64,
        rpc_url: String,
    },
    SwitchEthereumChainError {
        chain_id: u64,
        error: String,
    },
    SendTransactionResult {
        id: RequestId,
        success: bool,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        tx_hash: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        error: Option<String>,
    },
    SignatureRequestResult {
        id: RequestId,
        success: bool,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        signature: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        error: Option<String>,
    },
}
