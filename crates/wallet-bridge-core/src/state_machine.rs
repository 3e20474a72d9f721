//! Provider state: the (address, chain id, rpc endpoint) tuple plus the
//! change-event plumbing toward page listeners.

use std::sync::{Arc, Mutex};

use alloy::primitives::Address;
use serde_json::Value;

use crate::domain::{encode_chain_id_hex, ProviderEvent, ProviderEventKind, ProviderState};
use crate::errors::ProviderError;

type EventListener = Arc<dyn Fn(&Value) + Send + Sync>;

struct StateInner {
    state: Option<ProviderState>,
    event_seq: u64,
    events: Vec<ProviderEvent>,
    listeners: Vec<(ProviderEventKind, EventListener)>,
}

pub struct ProviderStateMachine {
    inner: Mutex<StateInner>,
}

impl Default for ProviderStateMachine {
    fn default() -> Self {
        Self {
            inner: Mutex::new(StateInner {
                state: None,
                event_seq: 0,
                events: Vec::new(),
                listeners: Vec::new(),
            }),
        }
    }
}

impl ProviderStateMachine {
    fn lock(&self) -> Result<std::sync::MutexGuard<'_, StateInner>, ProviderError> {
        self.inner
            .lock()
            .map_err(|e| ProviderError::Transport(format!("state lock poisoned: {e}")))
    }

    /// First relay message after injection. Establishes the tuple and emits
    /// `connect`. A repeated init is treated as an authoritative refresh and
    /// goes through the address/chain mutation rules instead.
    pub fn init(
        &self,
        address: Option<Address>,
        chain_id: u64,
        rpc_url: String,
    ) -> Result<(), ProviderError> {
        let already_initialized = {
            let mut inner = self.lock()?;
            if inner.state.is_some() {
                true
            } else {
                inner.state = Some(ProviderState {
                    address,
                    chain_id,
                    rpc_url: rpc_url.clone(),
                });
                false
            }
        };
        if already_initialized {
            self.set_address(address)?;
            self.set_chain_id(chain_id, rpc_url)?;
            return Ok(());
        }
        self.emit(
            ProviderEventKind::Connect,
            serde_json::json!({ "chainId": encode_chain_id_hex(chain_id) }),
        )?;
        Ok(())
    }

    /// Always emits `accountsChanged`, even for a repeated identical
    /// address: every explicit relay update is authoritative and forces a
    /// dapp refresh.
    pub fn set_address(&self, address: Option<Address>) -> Result<(), ProviderError> {
        let payload = {
            let mut inner = self.lock()?;
            let Some(state) = inner.state.as_mut() else {
                tracing::warn!("setAddress before init; dropping");
                return Ok(());
            };
            state.address = address;
            match address {
                Some(a) => serde_json::json!([a.to_string()]),
                None => serde_json::json!([]),
            }
        };
        self.emit(ProviderEventKind::AccountsChanged, payload)
    }

    /// Endpoint updates unconditionally; `chainChanged` fires only when the
    /// chain id actually differs. Endpoint-only changes (provider failover)
    /// must not produce a dapp-visible chain event.
    pub fn set_chain_id(&self, chain_id: u64, rpc_url: String) -> Result<(), ProviderError> {
        let changed = {
            let mut inner = self.lock()?;
            let Some(state) = inner.state.as_mut() else {
                tracing::warn!("setChainId before init; dropping");
                return Ok(());
            };
            let changed = state.chain_id != chain_id;
            state.chain_id = chain_id;
            state.rpc_url = rpc_url;
            changed
        };
        if changed {
            self.emit(
                ProviderEventKind::ChainChanged,
                Value::String(encode_chain_id_hex(chain_id)),
            )?;
        }
        Ok(())
    }

    pub fn snapshot(&self) -> Result<ProviderState, ProviderError> {
        let inner = self.lock()?;
        inner.state.clone().ok_or(ProviderError::NotReady)
    }

    pub fn is_connected(&self) -> bool {
        self.lock().map(|inner| inner.state.is_some()).unwrap_or(false)
    }

    /// Register a page listener for a change event.
    pub fn on(&self, kind: ProviderEventKind, listener: EventListener) -> Result<(), ProviderError> {
        let mut inner = self.lock()?;
        inner.listeners.push((kind, listener));
        Ok(())
    }

    /// Drain the sequenced event log. Test and debugging hook.
    pub fn drain_events(&self) -> Result<Vec<ProviderEvent>, ProviderError> {
        let mut inner = self.lock()?;
        Ok(std::mem::take(&mut inner.events))
    }

    fn emit(&self, kind: ProviderEventKind, payload: Value) -> Result<(), ProviderError> {
        // Record under the lock, invoke listeners outside it: a listener is
        // page code and may call straight back into the provider.
        let listeners: Vec<EventListener> = {
            let mut inner = self.lock()?;
            inner.event_seq = inner.event_seq.saturating_add(1);
            let sequence = inner.event_seq;
            inner.events.push(ProviderEvent {
                sequence,
                kind,
                payload: payload.clone(),
            });
            inner
                .listeners
                .iter()
                .filter(|(k, _)| *k == kind)
                .map(|(_, l)| Arc::clone(l))
                .collect()
        };
        for listener in listeners {
            listener(&payload);
        }
        Ok(())
    }
}
