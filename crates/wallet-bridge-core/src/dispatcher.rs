//! Method dispatch table. Every method name maps to an explicit handler
//! variant; anything unrecognized deliberately falls through to the RPC
//! forward path so newly introduced JSON-RPC methods keep working without a
//! table update.

use alloy::primitives::Address;
use serde_json::Value;

use crate::domain::parse_chain_id_value;
use crate::errors::ProviderError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignMethod {
    PersonalSign,
    EthSign,
    EthSignTypedData,
    EthSignTypedDataV3,
    EthSignTypedDataV4,
}

impl SignMethod {
    pub fn rpc_name(&self) -> &'static str {
        match self {
            Self::PersonalSign => "personal_sign",
            Self::EthSign => "eth_sign",
            Self::EthSignTypedData => "eth_signTypedData",
            Self::EthSignTypedDataV3 => "eth_signTypedData_v3",
            Self::EthSignTypedDataV4 => "eth_signTypedData_v4",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MethodKind {
    /// Answered synchronously from state.
    Accounts,
    ChainId,
    NetVersion,
    /// Chain-switch negotiation with the relay.
    SwitchChain,
    /// Signing negotiation; always a relay round-trip.
    Sign(SignMethod),
    /// Transaction submission negotiation.
    SendTransaction,
    /// Pass-through JSON-RPC call, the explicit default.
    Forward,
}

impl MethodKind {
    pub fn classify(method: &str) -> Self {
        match method {
            "eth_accounts" | "eth_requestAccounts" => Self::Accounts,
            "eth_chainId" => Self::ChainId,
            "net_version" => Self::NetVersion,
            "wallet_switchEthereumChain" | "wallet_addEthereumChain" => Self::SwitchChain,
            "personal_sign" => Self::Sign(SignMethod::PersonalSign),
            "eth_sign" => Self::Sign(SignMethod::EthSign),
            "eth_signTypedData" => Self::Sign(SignMethod::EthSignTypedData),
            "eth_signTypedData_v3" => Self::Sign(SignMethod::EthSignTypedDataV3),
            "eth_signTypedData_v4" => Self::Sign(SignMethod::EthSignTypedDataV4),
            "eth_sendTransaction" => Self::SendTransaction,
            _ => Self::Forward,
        }
    }
}

/// The chain id requested by `wallet_switchEthereumChain` /
/// `wallet_addEthereumChain` params: `[{ "chainId": "0x..." }]`.
pub fn extract_switch_chain_id(params: &Value) -> Result<u64, ProviderError> {
    let first = params
        .as_array()
        .and_then(|a| a.first())
        .ok_or_else(|| ProviderError::InvalidParams("chainId param object required".to_owned()))?;
    let chain_id = first
        .get("chainId")
        .ok_or_else(|| ProviderError::InvalidParams("chainId field required".to_owned()))?;
    parse_chain_id_value(chain_id)
}

/// Fields the relay needs to submit a transaction. `to` is mandatory at this
/// layer: contract creation is not supported via `eth_sendTransaction`,
/// unlike raw forwarded calls which may omit it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransactionParams {
    pub from: Option<Address>,
    pub to: Address,
    pub data: String,
    pub value: String,
}

pub fn extract_transaction_params(params: &Value) -> Result<TransactionParams, ProviderError> {
    let tx = params
        .as_array()
        .and_then(|a| a.first())
        .and_then(|v| v.as_object())
        .ok_or_else(|| ProviderError::InvalidParams("transaction object required".to_owned()))?;

    let to = tx
        .get("to")
        .and_then(|v| v.as_str())
        .ok_or_else(|| {
            ProviderError::InvalidParams(
                "missing 'to' address: contract creation is not supported".to_owned(),
            )
        })?
        .parse::<Address>()
        .map_err(|e| ProviderError::InvalidParams(format!("invalid 'to' address: {e}")))?;

    let from = match tx.get("from") {
        None | Some(Value::Null) => None,
        Some(Value::String(raw)) => Some(
            raw.parse::<Address>()
                .map_err(|e| ProviderError::InvalidParams(format!("invalid 'from' address: {e}")))?,
        ),
        Some(other) => {
            return Err(ProviderError::InvalidParams(format!(
                "'from' must be an address string, got {other}"
            )))
        }
    };

    let data = optional_hex_field(tx, "data", "0x")?;
    let value = optional_hex_field(tx, "value", "0x0")?;

    Ok(TransactionParams {
        from,
        to,
        data,
        value,
    })
}

/// Defaults apply only when the key is absent (or explicitly null). A field
/// that is present with the wrong type is a caller mistake and must fail
/// loudly, not degrade to the default.
fn optional_hex_field(
    tx: &serde_json::Map<String, Value>,
    key: &str,
    default: &str,
) -> Result<String, ProviderError> {
    match tx.get(key) {
        None | Some(Value::Null) => Ok(default.to_owned()),
        Some(Value::String(s)) => Ok(s.clone()),
        Some(other) => Err(ProviderError::InvalidParams(format!(
            "'{key}' must be a hex string, got {other}"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_methods_classify_to_handlers() {
        assert_eq!(MethodKind::classify("eth_accounts"), MethodKind::Accounts);
        assert_eq!(MethodKind::classify("eth_requestAccounts"), MethodKind::Accounts);
        assert_eq!(MethodKind::classify("eth_chainId"), MethodKind::ChainId);
        assert_eq!(MethodKind::classify("net_version"), MethodKind::NetVersion);
        assert_eq!(
            MethodKind::classify("wallet_switchEthereumChain"),
            MethodKind::SwitchChain
        );
        assert_eq!(
            MethodKind::classify("personal_sign"),
            MethodKind::Sign(SignMethod::PersonalSign)
        );
        assert_eq!(
            MethodKind::classify("eth_signTypedData_v4"),
            MethodKind::Sign(SignMethod::EthSignTypedDataV4)
        );
        assert_eq!(
            MethodKind::classify("eth_sendTransaction"),
            MethodKind::SendTransaction
        );
    }

    #[test]
    fn unknown_methods_fall_through_to_forward() {
        assert_eq!(MethodKind::classify("eth_getBalance"), MethodKind::Forward);
        assert_eq!(MethodKind::classify("eth_feeHistory"), MethodKind::Forward);
        assert_eq!(MethodKind::classify("eth_brandNewMethod"), MethodKind::Forward);
    }

    #[test]
    fn switch_params_parse_hex_chain_id() {
        let params = serde_json::json!([{ "chainId": "0x89" }]);
        assert_eq!(extract_switch_chain_id(&params).expect("chain id"), 137);

        let missing = serde_json::json!([{}]);
        assert!(extract_switch_chain_id(&missing).is_err());
        assert!(extract_switch_chain_id(&serde_json::json!([])).is_err());
    }

    #[test]
    fn transaction_params_require_destination() {
        let params = serde_json::json!([{
            "from": "0x1000000000000000000000000000000000000001",
            "to": "0x2000000000000000000000000000000000000002",
            "data": "0xdeadbeef",
            "value": "0x1"
        }]);
        let tx = extract_transaction_params(&params).expect("tx params");
        assert_eq!(tx.data, "0xdeadbeef");
        assert_eq!(tx.value, "0x1");

        let creation = serde_json::json!([{ "data": "0x60016001" }]);
        let err = extract_transaction_params(&creation).expect_err("must fail");
        assert!(err.to_string().contains("contract creation"));
    }

    #[test]
    fn transaction_params_default_data_and_value() {
        let params = serde_json::json!([{ "to": "0x2000000000000000000000000000000000000002" }]);
        let tx = extract_transaction_params(&params).expect("tx params");
        assert_eq!(tx.from, None);
        assert_eq!(tx.data, "0x");
        assert_eq!(tx.value, "0x0");
    }

    #[test]
    fn transaction_params_reject_wrongly_typed_fields() {
        // A numeric value must fail, not quietly become the "0x0" default.
        let numeric_value = serde_json::json!([{
            "to": "0x2000000000000000000000000000000000000002",
            "value": 1_000_000
        }]);
        let err = extract_transaction_params(&numeric_value).expect_err("numeric value");
        assert!(matches!(err, ProviderError::InvalidParams(ref text) if text.contains("value")));

        let numeric_data = serde_json::json!([{
            "to": "0x2000000000000000000000000000000000000002",
            "data": 255
        }]);
        assert!(extract_transaction_params(&numeric_data).is_err());

        let object_from = serde_json::json!([{
            "to": "0x2000000000000000000000000000000000000002",
            "from": {}
        }]);
        assert!(extract_transaction_params(&object_from).is_err());

        // Explicit null still means "not provided".
        let null_fields = serde_json::json!([{
            "to": "0x2000000000000000000000000000000000000002",
            "from": null,
            "value": null
        }]);
        let tx = extract_transaction_params(&null_fields).expect("nulls default");
        assert_eq!(tx.value, "0x0");
    }
}
