#![allow(dead_code)]

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use alloy::primitives::Address;
use serde_json::json;

use wallet_bridge_adapters::BridgeConfig;
use wallet_bridge_core::{
    ClockPort, CorrelationRegistry, DiscoveryPort, OutboundMessage, ProviderBridge, ProviderError,
    ProviderIdentity, RequestId, TimerPort, TransportPort,
};

/// Deterministic clock, advanced explicitly by tests.
#[derive(Clone, Default)]
pub struct TestClock {
    now: Arc<AtomicU64>,
}

impl TestClock {
    pub fn advance_ms(&self, delta: u64) {
        self.now.fetch_add(delta, Ordering::SeqCst);
    }

    pub fn now(&self) -> u64 {
        self.now.load(Ordering::SeqCst)
    }
}

impl ClockPort for TestClock {
    fn now_ms(&self) -> Result<u64, ProviderError> {
        Ok(self.now.load(Ordering::SeqCst))
    }
}

/// Captures every envelope the bridge posts toward the relay.
#[derive(Clone, Default)]
pub struct RecordingTransport {
    posted: Arc<Mutex<Vec<OutboundMessage>>>,
}

impl RecordingTransport {
    pub fn posted(&self) -> Vec<OutboundMessage> {
        self.posted.lock().expect("transport lock").clone()
    }

    pub fn posted_count(&self) -> usize {
        self.posted.lock().expect("transport lock").len()
    }
}

impl TransportPort for RecordingTransport {
    fn post(&self, message: &OutboundMessage) -> Result<(), ProviderError> {
        self.posted.lock().expect("transport lock").push(message.clone());
        Ok(())
    }
}

/// Transport that refuses every post; for post-failure cleanup tests.
#[derive(Clone, Default)]
pub struct FailingTransport;

impl TransportPort for FailingTransport {
    fn post(&self, _message: &OutboundMessage) -> Result<(), ProviderError> {
        Err(ProviderError::Transport("channel down".to_owned()))
    }
}

/// Records announced identities.
#[derive(Clone, Default)]
pub struct CountingDiscovery {
    announced: Arc<Mutex<Vec<ProviderIdentity>>>,
}

impl CountingDiscovery {
    pub fn announced(&self) -> Vec<ProviderIdentity> {
        self.announced.lock().expect("discovery lock").clone()
    }
}

impl DiscoveryPort for CountingDiscovery {
    fn announce(&self, identity: &ProviderIdentity) -> Result<(), ProviderError> {
        self.announced
            .lock()
            .expect("discovery lock")
            .push(identity.clone());
        Ok(())
    }
}

/// Records scheduled expirations and fires them on demand.
#[derive(Clone, Default)]
pub struct ManualTimer {
    scheduled: Arc<Mutex<Vec<(RequestId, u64, Arc<CorrelationRegistry>)>>>,
}

impl ManualTimer {
    pub fn scheduled_count(&self) -> usize {
        self.scheduled.lock().expect("timer lock").len()
    }

    pub fn fire_all(&self) {
        let scheduled: Vec<_> = self.scheduled.lock().expect("timer lock").drain(..).collect();
        for (id, _delay, registry) in scheduled {
            registry.expire(&id);
        }
    }
}

impl TimerPort for ManualTimer {
    fn schedule_expire(&self, registry: Arc<CorrelationRegistry>, id: RequestId, delay_ms: u64) {
        self.scheduled
            .lock()
            .expect("timer lock")
            .push((id, delay_ms, registry));
    }
}

pub type TestBridge = ProviderBridge<RecordingTransport, TestClock, CountingDiscovery, ManualTimer>;

pub struct TestHarness {
    pub bridge: Arc<TestBridge>,
    pub transport: RecordingTransport,
    pub clock: TestClock,
    pub discovery: CountingDiscovery,
    pub timer: ManualTimer,
}

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

pub fn new_harness() -> TestHarness {
    init_tracing();
    let config = BridgeConfig::default();
    let transport = RecordingTransport::default();
    let clock = TestClock::default();
    let discovery = CountingDiscovery::default();
    let timer = ManualTimer::default();
    let bridge = Arc::new(ProviderBridge::new(
        transport.clone(),
        clock.clone(),
        discovery.clone(),
        timer.clone(),
        config.identity(),
        config.options(),
    ));
    TestHarness {
        bridge,
        transport,
        clock,
        discovery,
        timer,
    }
}

pub fn account_address() -> Address {
    "0x1000000000000000000000000000000000000001"
        .parse()
        .expect("account address")
}

pub fn destination_address() -> Address {
    "0x2000000000000000000000000000000000000002"
        .parse()
        .expect("destination address")
}

/// Drive the relay's first message through the inbound path.
pub fn init_bridge(harness: &TestHarness, chain_id: u64, rpc_url: &str) {
    harness.bridge.handle_relay_message(json!({
        "type": "init",
        "msg": {
            "address": account_address().to_string(),
            "chainId": chain_id,
            "rpcUrl": rpc_url,
        }
    }));
}

/// Poll until the transport has posted at least `count` envelopes.
pub async fn wait_for_posted(transport: &RecordingTransport, count: usize) -> Vec<OutboundMessage> {
    for _ in 0..500 {
        let posted = transport.posted();
        if posted.len() >= count {
            return posted;
        }
        tokio::time::sleep(Duration::from_millis(2)).await;
    }
    panic!("relay never saw {count} posted message(s)");
}
