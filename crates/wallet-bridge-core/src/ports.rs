use std::sync::Arc;

use crate::domain::{ProviderIdentity, RequestId};
use crate::errors::ProviderError;
use crate::protocol::OutboundMessage;
use crate::registry::CorrelationRegistry;

/// The only write path to the cross-context message channel.
pub trait TransportPort {
    fn post(&self, message: &OutboundMessage) -> Result<(), ProviderError>;
}

pub trait ClockPort {
    fn now_ms(&self) -> Result<u64, ProviderError>;
}

/// Schedules the registry-imposed expiry for rpc-class requests. The wasm
/// adapter backs this with `setTimeout`; embedders that drive time
/// themselves can use a no-op and sweep via `expire_overdue`.
pub trait TimerPort {
    fn schedule_expire(&self, registry: Arc<CorrelationRegistry>, id: RequestId, delay_ms: u64);
}

/// Broadcasts a provider announcement to any discovery listeners attached to
/// the page.
pub trait DiscoveryPort {
    fn announce(&self, identity: &ProviderIdentity) -> Result<(), ProviderError>;
}

/// What the legacy global wallet slot currently looks like, as far as the
/// adapter can tell without throwing.
pub trait LegacySlotPort {
    /// True when the slot currently holds our provider handle.
    fn holds_ours(&self) -> bool;
    /// Attempt to delete any existing descriptor; false if non-configurable.
    fn try_delete(&self) -> bool;
    /// Plain assignment of our handle; false if the write threw.
    fn try_assign(&self) -> bool;
    /// Explicit writable+configurable property definition; false on failure.
    fn try_define(&self) -> bool;
}
