mod common;

use serde_json::json;

use common::{init_bridge, new_harness, wait_for_posted};
use wallet_bridge_core::{OutboundMessage, ProviderError, ProviderEventKind};

#[tokio::test]
async fn successful_switch_resolves_null_and_applies_new_chain() {
    let harness = new_harness();
    init_bridge(&harness, 1, "https://mainnet.example");
    harness.bridge.drain_events().expect("drain init events");

    let bridge = harness.bridge.clone();
    let handle = tokio::spawn(async move {
        bridge
            .call("wallet_switchEthereumChain", json!([{ "chainId": "0x89" }]))
            .await
    });

    let posted = wait_for_posted(&harness.transport, 1).await;
    assert_eq!(posted[0], OutboundMessage::SwitchEthereumChain { chain_id: 137 });

    harness.bridge.handle_relay_message(json!({
        "type": "switchEthereumChain",
        "msg": { "chainId": 137, "rpcUrl": "https://polygon.example" }
    }));

    let result = handle.await.expect("join").expect("switched");
    assert_eq!(result, json!(null));

    let state = harness.bridge.state().snapshot().expect("state");
    assert_eq!(state.chain_id, 137);
    assert_eq!(state.rpc_url, "https://polygon.example");

    let events = harness.bridge.drain_events().expect("drain");
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].kind, ProviderEventKind::ChainChanged);
    assert_eq!(events[0].payload, json!("0x89"));
}

#[tokio::test]
async fn switch_error_rejects_only_the_matching_chain_id() {
    let harness = new_harness();
    init_bridge(&harness, 1, "https://mainnet.example");

    let bridge_x = harness.bridge.clone();
    let handle_x = tokio::spawn(async move {
        bridge_x
            .call("wallet_switchEthereumChain", json!([{ "chainId": "0xa" }]))
            .await
    });
    let bridge_y = harness.bridge.clone();
    let handle_y = tokio::spawn(async move {
        bridge_y
            .call("wallet_switchEthereumChain", json!([{ "chainId": "0x89" }]))
            .await
    });

    wait_for_posted(&harness.transport, 2).await;
    assert_eq!(harness.bridge.registry().pending_count(), 2);

    // Relay declines chain 10; the pending switch for 137 is untouched.
    harness.bridge.handle_relay_message(json!({
        "type": "switchEthereumChainError",
        "msg": { "chainId": 10, "error": "chain not configured" }
    }));

    let err = handle_x.await.expect("join").expect_err("rejected");
    assert!(matches!(err, ProviderError::Relay(ref text) if text == "chain not configured"));
    assert_eq!(harness.bridge.registry().pending_count(), 1);

    harness.bridge.handle_relay_message(json!({
        "type": "switchEthereumChain",
        "msg": { "chainId": 137, "rpcUrl": "https://polygon.example" }
    }));
    assert_eq!(handle_y.await.expect("join").expect("switched"), json!(null));

    // The failed switch never mutated state; the successful one did.
    assert_eq!(harness.bridge.state().snapshot().expect("state").chain_id, 137);
}

#[tokio::test]
async fn duplicate_switch_for_same_chain_is_rejected_synchronously() {
    let harness = new_harness();
    init_bridge(&harness, 1, "https://mainnet.example");

    let bridge = harness.bridge.clone();
    let _pending = tokio::spawn(async move {
        bridge
            .call("wallet_switchEthereumChain", json!([{ "chainId": "0x2105" }]))
            .await
    });
    wait_for_posted(&harness.transport, 1).await;

    let err = harness
        .bridge
        .call("wallet_switchEthereumChain", json!([{ "chainId": "0x2105" }]))
        .await
        .expect_err("duplicate");
    assert!(matches!(err, ProviderError::InvalidParams(_)));
}

#[tokio::test]
async fn add_chain_uses_the_switch_negotiation_path() {
    let harness = new_harness();
    init_bridge(&harness, 1, "https://mainnet.example");

    let bridge = harness.bridge.clone();
    let handle = tokio::spawn(async move {
        bridge
            .call(
                "wallet_addEthereumChain",
                json!([{ "chainId": "0xa", "chainName": "Optimism" }]),
            )
            .await
    });

    let posted = wait_for_posted(&harness.transport, 1).await;
    assert_eq!(posted[0], OutboundMessage::SwitchEthereumChain { chain_id: 10 });

    harness.bridge.handle_relay_message(json!({
        "type": "switchEthereumChain",
        "msg": { "chainId": 10, "rpcUrl": "https://optimism.example" }
    }));
    assert_eq!(handle.await.expect("join").expect("added"), json!(null));
}

#[tokio::test]
async fn switch_params_without_chain_id_fail_synchronously() {
    let harness = new_harness();
    init_bridge(&harness, 1, "https://mainnet.example");

    let err = harness
        .bridge
        .call("wallet_switchEthereumChain", json!([{}]))
        .await
        .expect_err("missing chainId");
    assert!(matches!(err, ProviderError::InvalidParams(_)));
    assert_eq!(harness.transport.posted_count(), 0);
}
