//! Correlation registry: pending-completion bookkeeping for every request
//! that needs a relay round-trip.
//!
//! The registry is the only mutable state shared between the dispatcher and
//! the transport callbacks. All mutation happens synchronously under one
//! lock, and completion continuations fire only after the entry has already
//! been removed, so a continuation can never observe the maps mid-mutation.

use std::collections::HashMap;
use std::sync::Mutex;

use serde_json::Value;
use tokio::sync::oneshot;

use crate::domain::{RequestId, RequestKind};
use crate::errors::ProviderError;

struct PendingEntry {
    created_at_ms: u64,
    deadline_ms: Option<u64>,
    completion: oneshot::Sender<Result<Value, ProviderError>>,
}

#[derive(Default)]
struct RegistryInner {
    rpc: HashMap<RequestId, PendingEntry>,
    transactions: HashMap<RequestId, PendingEntry>,
    signatures: HashMap<RequestId, PendingEntry>,
    /// Chain-switch negotiations are correlated by the requested chain id,
    /// not by request id: a switch error scoped to chain X must never reject
    /// a concurrent pending switch for chain Y.
    switches: HashMap<u64, PendingEntry>,
}

/// The caller-side half of a pending request. Settles exactly once. Carries
/// no correlation key of its own: request-id entries and chain-id-keyed
/// switch entries both hand out the same completion handle.
#[derive(Debug)]
pub struct PendingCall {
    receiver: oneshot::Receiver<Result<Value, ProviderError>>,
}

impl PendingCall {
    pub async fn wait(self) -> Result<Value, ProviderError> {
        match self.receiver.await {
            Ok(outcome) => outcome,
            // Sender dropped without settling: provider torn down mid-flight.
            Err(_) => Err(ProviderError::Transport(
                "pending request abandoned before completion".to_owned(),
            )),
        }
    }
}

pub struct CorrelationRegistry {
    inner: Mutex<RegistryInner>,
    rpc_timeout_ms: u64,
}

impl CorrelationRegistry {
    pub fn new(rpc_timeout_ms: u64) -> Self {
        Self {
            inner: Mutex::new(RegistryInner::default()),
            rpc_timeout_ms,
        }
    }

    pub fn rpc_timeout_ms(&self) -> u64 {
        self.rpc_timeout_ms
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, RegistryInner>, ProviderError> {
        self.inner
            .lock()
            .map_err(|e| ProviderError::Transport(format!("registry lock poisoned: {e}")))
    }

    /// Register a fresh pending request. Rpc-class entries record a deadline
    /// of `now + rpc_timeout_ms`; the other kinds never expire here.
    pub fn create(
        &self,
        kind: RequestKind,
        now_ms: u64,
    ) -> Result<(RequestId, PendingCall), ProviderError> {
        let id = RequestId::generate()?;
        let (tx, rx) = oneshot::channel();
        let deadline_ms = match kind {
            RequestKind::Rpc => Some(now_ms.saturating_add(self.rpc_timeout_ms)),
            RequestKind::Transaction | RequestKind::Signature => None,
        };
        let entry = PendingEntry {
            created_at_ms: now_ms,
            deadline_ms,
            completion: tx,
        };
        {
            let mut inner = self.lock()?;
            match kind {
                RequestKind::Rpc => inner.rpc.insert(id.clone(), entry),
                RequestKind::Transaction => inner.transactions.insert(id.clone(), entry),
                RequestKind::Signature => inner.signatures.insert(id.clone(), entry),
            };
        }
        Ok((id, PendingCall { receiver: rx }))
    }

    /// Register a pending chain switch keyed by the requested chain id.
    /// A second switch for a chain id that is already in flight is rejected
    /// rather than silently replacing the earlier caller's completion.
    pub fn create_switch(&self, chain_id: u64, now_ms: u64) -> Result<PendingCall, ProviderError> {
        let (tx, rx) = oneshot::channel();
        {
            let mut inner = self.lock()?;
            if inner.switches.contains_key(&chain_id) {
                return Err(ProviderError::InvalidParams(format!(
                    "chain switch already pending for chain {chain_id}"
                )));
            }
            inner.switches.insert(
                chain_id,
                PendingEntry {
                    created_at_ms: now_ms,
                    deadline_ms: None,
                    completion: tx,
                },
            );
        }
        Ok(PendingCall { receiver: rx })
    }

    /// Settle a pending request with a success value. No-op when the id is
    /// absent: result delivery is not exactly-once and duplicate or late
    /// messages must not crash the caller.
    pub fn resolve(&self, id: &RequestId, value: Value) {
        if let Some(entry) = self.take(id) {
            let _ = entry.completion.send(Ok(value));
        }
    }

    /// Settle a pending request with an error. Idempotent like `resolve`.
    pub fn reject(&self, id: &RequestId, error: ProviderError) {
        if let Some(entry) = self.take(id) {
            let _ = entry.completion.send(Err(error));
        }
    }

    pub fn resolve_switch(&self, chain_id: u64, value: Value) {
        if let Some(entry) = self.take_switch(chain_id) {
            let _ = entry.completion.send(Ok(value));
        }
    }

    pub fn reject_switch(&self, chain_id: u64, error: ProviderError) {
        if let Some(entry) = self.take_switch(chain_id) {
            let _ = entry.completion.send(Err(error));
        }
    }

    /// Remove an entry without firing its completion; used when the outbound
    /// post fails after registration and the caller reports the error
    /// directly.
    pub fn abandon(&self, id: &RequestId) {
        let _ = self.take(id);
    }

    pub fn abandon_switch(&self, chain_id: u64) {
        let _ = self.take_switch(chain_id);
    }

    /// Time out a single rpc-class entry. No-op for ids that already
    /// completed, and for kinds that carry no deadline.
    pub fn expire(&self, id: &RequestId) {
        let entry = match self.lock() {
            Ok(mut inner) => inner.rpc.remove(id),
            Err(_) => None,
        };
        if let Some(entry) = entry {
            let _ = entry
                .completion
                .send(Err(ProviderError::Timeout(self.rpc_timeout_ms)));
        }
    }

    /// Sweep every rpc-class entry whose deadline has passed. Returns the
    /// number of entries expired.
    pub fn expire_overdue(&self, now_ms: u64) -> usize {
        let overdue: Vec<PendingEntry> = match self.lock() {
            Ok(mut inner) => {
                let ids: Vec<RequestId> = inner
                    .rpc
                    .iter()
                    .filter(|(_, e)| e.deadline_ms.is_some_and(|d| d <= now_ms))
                    .map(|(id, _)| id.clone())
                    .collect();
                ids.iter().filter_map(|id| inner.rpc.remove(id)).collect()
            }
            Err(_) => Vec::new(),
        };
        let count = overdue.len();
        for entry in overdue {
            let _ = entry
                .completion
                .send(Err(ProviderError::Timeout(self.rpc_timeout_ms)));
        }
        count
    }

    /// Number of pending entries across all request classes.
    pub fn pending_count(&self) -> usize {
        match self.lock() {
            Ok(inner) => {
                inner.rpc.len()
                    + inner.transactions.len()
                    + inner.signatures.len()
                    + inner.switches.len()
            }
            Err(_) => 0,
        }
    }

    pub fn created_at_ms(&self, id: &RequestId) -> Option<u64> {
        let inner = self.lock().ok()?;
        inner
            .rpc
            .get(id)
            .or_else(|| inner.transactions.get(id))
            .or_else(|| inner.signatures.get(id))
            .map(|e| e.created_at_ms)
    }

    fn take(&self, id: &RequestId) -> Option<PendingEntry> {
        let mut inner = self.lock().ok()?;
        inner
            .rpc
            .remove(id)
            .or_else(|| inner.transactions.remove(id))
            .or_else(|| inner.signatures.remove(id))
    }

    fn take_switch(&self, chain_id: u64) -> Option<PendingEntry> {
        let mut inner = self.lock().ok()?;
        inner.switches.remove(&chain_id)
    }
}
