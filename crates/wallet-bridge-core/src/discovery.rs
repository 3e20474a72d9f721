//! Multi-wallet discovery and best-effort acquisition of the legacy global
//! wallet slot.
//!
//! The discovery broadcast is the authoritative channel; the legacy slot is
//! contended by any co-existing wallet running the same acquisition dance,
//! so the discipline here is "last writer wins, but never throw".

use std::sync::atomic::{AtomicU64, Ordering};

use crate::domain::ProviderIdentity;
use crate::errors::ProviderError;
use crate::ports::{DiscoveryPort, LegacySlotPort};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlotAcquisition {
    /// The slot verifiably holds our provider handle.
    Owned,
    /// Another actor kept control of the slot; discovery still works.
    Contested,
}

pub struct DiscoveryService {
    identity: ProviderIdentity,
    announcements: AtomicU64,
}

impl DiscoveryService {
    pub fn new(identity: ProviderIdentity) -> Self {
        Self {
            identity,
            announcements: AtomicU64::new(0),
        }
    }

    pub fn identity(&self) -> &ProviderIdentity {
        &self.identity
    }

    /// Broadcast the provider announcement. Called once at construction and
    /// again on every request-provider event, since independent discovery
    /// listeners attach at different times.
    pub fn announce<D: DiscoveryPort + ?Sized>(&self, port: &D) -> Result<(), ProviderError> {
        port.announce(&self.identity)?;
        self.announcements.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    pub fn announcement_count(&self) -> u64 {
        self.announcements.load(Ordering::SeqCst)
    }
}

/// Claim the legacy global wallet slot: delete whatever descriptor is there,
/// assign, and if another actor intercepted the write, fall back to an
/// explicit writable+configurable definition. Each step tolerates failure;
/// the function itself can never throw regardless of what other code has
/// done to the property.
pub fn acquire_legacy_slot<S: LegacySlotPort + ?Sized>(slot: &S) -> SlotAcquisition {
    let _ = slot.try_delete();

    if slot.try_assign() && slot.holds_ours() {
        return SlotAcquisition::Owned;
    }

    if slot.try_define() && slot.holds_ours() {
        return SlotAcquisition::Owned;
    }

    tracing::warn!("legacy wallet slot held by another provider; relying on discovery broadcast");
    SlotAcquisition::Contested
}
