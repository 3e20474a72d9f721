//! The provider bridge: the single page-facing wallet object.
//!
//! Page code calls `request`/`call`; the bridge either answers from state or
//! registers a pending completion, posts a tagged message to the relay, and
//! settles the caller's future when the matching result message arrives.
//! Registry mutation is always finished before a message is posted and
//! before any completion fires, so transport callbacks never observe a
//! half-registered request.

use std::sync::Arc;

use serde_json::Value;

use crate::discovery::{acquire_legacy_slot, DiscoveryService, SlotAcquisition};
use crate::dispatcher::{
    extract_switch_chain_id, extract_transaction_params, MethodKind, SignMethod,
};
use crate::domain::{
    encode_chain_id_hex, is_supported_chain, supported_chain_names, BridgeOptions, ProviderEvent,
    ProviderEventKind, ProviderIdentity, RequestArguments, RequestKind,
};
use crate::errors::ProviderError;
use crate::ports::{ClockPort, DiscoveryPort, LegacySlotPort, TimerPort, TransportPort};
use crate::protocol::{InboundMessage, OutboundMessage};
use crate::registry::{CorrelationRegistry, PendingCall};
use crate::state_machine::ProviderStateMachine;

pub struct ProviderBridge<T, C, D, M>
where
    T: TransportPort,
    C: ClockPort,
    D: DiscoveryPort,
    M: TimerPort,
{
    transport: T,
    clock: C,
    discovery_port: D,
    timer: M,
    registry: Arc<CorrelationRegistry>,
    state: ProviderStateMachine,
    discovery: DiscoveryService,
}

impl<T, C, D, M> ProviderBridge<T, C, D, M>
where
    T: TransportPort,
    C: ClockPort,
    D: DiscoveryPort,
    M: TimerPort,
{
    pub fn new(
        transport: T,
        clock: C,
        discovery_port: D,
        timer: M,
        identity: ProviderIdentity,
        options: BridgeOptions,
    ) -> Self {
        Self {
            transport,
            clock,
            discovery_port,
            timer,
            registry: Arc::new(CorrelationRegistry::new(options.rpc_timeout_ms)),
            state: ProviderStateMachine::default(),
            discovery: DiscoveryService::new(identity),
        }
    }

    pub fn registry(&self) -> Arc<CorrelationRegistry> {
        Arc::clone(&self.registry)
    }

    pub fn state(&self) -> &ProviderStateMachine {
        &self.state
    }

    pub fn identity(&self) -> &ProviderIdentity {
        self.discovery.identity()
    }

    pub fn is_connected(&self) -> bool {
        self.state.is_connected()
    }

    pub fn on(
        &self,
        kind: ProviderEventKind,
        listener: Arc<dyn Fn(&Value) + Send + Sync>,
    ) -> Result<(), ProviderError> {
        self.state.on(kind, listener)
    }

    pub fn drain_events(&self) -> Result<Vec<ProviderEvent>, ProviderError> {
        self.state.drain_events()
    }

    /// EIP-1193 entry point: `request({ method, params })`.
    pub async fn request(&self, args: RequestArguments) -> Result<Value, ProviderError> {
        let params = args.params.unwrap_or(Value::Null);
        self.call(&args.method, params).await
    }

    /// Method + params call form. Validation failures surface here
    /// synchronously, before any relay message is posted.
    pub async fn call(&self, method: &str, params: Value) -> Result<Value, ProviderError> {
        match MethodKind::classify(method) {
            MethodKind::Accounts => self.accounts(),
            MethodKind::ChainId => {
                let state = self.state.snapshot()?;
                Ok(Value::String(encode_chain_id_hex(state.chain_id)))
            }
            MethodKind::NetVersion => {
                let state = self.state.snapshot()?;
                Ok(Value::String(state.chain_id.to_string()))
            }
            MethodKind::SwitchChain => self.begin_chain_switch(&params)?.wait().await,
            MethodKind::Sign(sign_method) => {
                self.begin_signature(sign_method, params)?.wait().await
            }
            MethodKind::SendTransaction => self.begin_transaction(&params)?.wait().await,
            MethodKind::Forward => self.begin_rpc_forward(method, params)?.wait().await,
        }
    }

    /// Announce the provider identity to discovery listeners.
    pub fn announce(&self) -> Result<(), ProviderError> {
        self.discovery.announce(&self.discovery_port)
    }

    /// A discovery listener asked for providers; re-announce, since
    /// listeners attach at arbitrary times.
    pub fn handle_provider_request(&self) {
        if let Err(e) = self.announce() {
            tracing::warn!(error = %e, "provider announcement failed");
        }
    }

    pub fn announcement_count(&self) -> u64 {
        self.discovery.announcement_count()
    }

    /// Best-effort claim of the legacy global wallet slot. Never panics;
    /// discovery remains the load-bearing channel when contested.
    pub fn claim_legacy_slot<S: LegacySlotPort + ?Sized>(&self, slot: &S) -> SlotAcquisition {
        acquire_legacy_slot(slot)
    }

    /// Entry point for the transport adapter's inbound listener. The
    /// channel is untrusted: malformed or unrecognized messages are dropped
    /// without surfacing anything a probing page could observe.
    pub fn handle_relay_message(&self, raw: Value) {
        let message: InboundMessage = match serde_json::from_value(raw) {
            Ok(message) => message,
            Err(e) => {
                tracing::trace!(error = %e, "dropping unrecognized relay message");
                return;
            }
        };
        if let Err(e) = self.apply_relay_message(message) {
            tracing::warn!(error = %e, "relay message handling failed");
        }
    }

    fn apply_relay_message(&self, message: InboundMessage) -> Result<(), ProviderError> {
        match message {
            InboundMessage::Init {
                address,
                chain_id,
                rpc_url,
            } => self.state.init(address, chain_id, rpc_url),
            InboundMessage::SetAddress { address } => self.state.set_address(address),
            InboundMessage::SetChainId { chain_id, rpc_url } => {
                self.state.set_chain_id(chain_id, rpc_url)
            }
            InboundMessage::RpcResponse { id, result, error } => {
                match error {
                    Some(text) => self.registry.reject(&id, ProviderError::Relay(text)),
                    None => self.registry.resolve(&id, result.unwrap_or(Value::Null)),
                }
                Ok(())
            }
            InboundMessage::SwitchEthereumChain { chain_id, rpc_url } => {
                self.state.set_chain_id(chain_id, rpc_url)?;
                // EIP-1193 switch convention: a successful switch resolves
                // with null.
                self.registry.resolve_switch(chain_id, Value::Null);
                Ok(())
            }
            InboundMessage::SwitchEthereumChainError { chain_id, error } => {
                self.registry
                    .reject_switch(chain_id, ProviderError::Relay(error));
                Ok(())
            }
            InboundMessage::SendTransactionResult {
                id,
                success,
                tx_hash,
                error,
            } => {
                match (success, tx_hash) {
                    (true, Some(hash)) => self.registry.resolve(&id, Value::String(hash)),
                    (true, None) => self.registry.reject(
                        &id,
                        ProviderError::Relay("transaction result missing txHash".to_owned()),
                    ),
                    (false, _) => self.registry.reject(
                        &id,
                        ProviderError::from_relay(
                            error.unwrap_or_else(|| "transaction failed".to_owned()),
                        ),
                    ),
                }
                Ok(())
            }
            InboundMessage::SignatureRequestResult {
                id,
                success,
                signature,
                error,
            } => {
                match (success, signature) {
                    (true, Some(signature)) => {
                        self.registry.resolve(&id, Value::String(signature))
                    }
                    (true, None) => self.registry.reject(
                        &id,
                        ProviderError::Relay("signature result missing signature".to_owned()),
                    ),
                    (false, _) => self.registry.reject(
                        &id,
                        ProviderError::from_relay(
                            error.unwrap_or_else(|| "signing failed".to_owned()),
                        ),
                    ),
                }
                Ok(())
            }
        }
    }

    fn accounts(&self) -> Result<Value, ProviderError> {
        let state = self.state.snapshot()?;
        let accounts = match state.address {
            Some(address) => vec![Value::String(address.to_string())],
            None => Vec::new(),
        };
        Ok(Value::Array(accounts))
    }

    fn begin_chain_switch(&self, params: &Value) -> Result<PendingCall, ProviderError> {
        let chain_id = extract_switch_chain_id(params)?;
        self.state.snapshot()?;
        let now = self.clock.now_ms()?;
        let call = self.registry.create_switch(chain_id, now)?;
        if let Err(e) = self
            .transport
            .post(&OutboundMessage::SwitchEthereumChain { chain_id })
        {
            self.registry.abandon_switch(chain_id);
            return Err(e);
        }
        Ok(call)
    }

    fn begin_signature(
        &self,
        sign_method: SignMethod,
        params: Value,
    ) -> Result<PendingCall, ProviderError> {
        let state = self.state.snapshot()?;
        let now = self.clock.now_ms()?;
        let (id, call) = self.registry.create(RequestKind::Signature, now)?;
        if let Err(e) = self.transport.post(&OutboundMessage::SignatureRequest {
            id: id.clone(),
            method: sign_method.rpc_name().to_owned(),
            params,
            chain_id: state.chain_id,
        }) {
            self.registry.abandon(&id);
            return Err(e);
        }
        Ok(call)
    }

    fn begin_transaction(&self, params: &Value) -> Result<PendingCall, ProviderError> {
        let state = self.state.snapshot()?;
        if !is_supported_chain(state.chain_id) {
            return Err(ProviderError::UnsupportedChain {
                chain_id: state.chain_id,
                supported: supported_chain_names(),
            });
        }
        let tx = extract_transaction_params(params)?;
        let from = tx
            .from
            .or(state.address)
            .ok_or(ProviderError::NoActiveAccount)?;

        let now = self.clock.now_ms()?;
        let (id, call) = self.registry.create(RequestKind::Transaction, now)?;
        if let Err(e) = self.transport.post(&OutboundMessage::SendTransaction {
            id: id.clone(),
            from,
            to: tx.to,
            data: tx.data,
            value: tx.value,
            chain_id: state.chain_id,
        }) {
            self.registry.abandon(&id);
            return Err(e);
        }
        Ok(call)
    }

    fn begin_rpc_forward(&self, method: &str, params: Value) -> Result<PendingCall, ProviderError> {
        // Endpoint is read at dispatch time; result handling reads state
        // again at resolution time rather than assuming a stable snapshot.
        let state = self.state.snapshot()?;
        let now = self.clock.now_ms()?;
        let (id, call) = self.registry.create(RequestKind::Rpc, now)?;
        self.timer.schedule_expire(
            Arc::clone(&self.registry),
            id.clone(),
            self.registry.rpc_timeout_ms(),
        );
        if let Err(e) = self.transport.post(&OutboundMessage::RpcRequest {
            id: id.clone(),
            rpc_url: state.rpc_url,
            method: method.to_owned(),
            params,
        }) {
            self.registry.abandon(&id);
            return Err(e);
        }
        Ok(call)
    }
}
