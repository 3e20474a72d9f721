//! Core of the in-page wallet provider bridge: an EIP-1193 provider surface
//! whose privileged work is performed by a relay on the far side of an
//! unordered message channel. This crate owns request/response correlation,
//! provider state, method dispatch, and discovery; everything with a host
//! dependency is behind a port trait implemented in the adapters crate.

pub mod bridge;
pub mod discovery;
pub mod dispatcher;
pub mod domain;
pub mod errors;
pub mod ports;
pub mod protocol;
pub mod registry;
pub mod state_machine;

pub use bridge::ProviderBridge;
pub use discovery::{acquire_legacy_slot, DiscoveryService, SlotAcquisition};
pub use dispatcher::{MethodKind, SignMethod, TransactionParams};
pub use domain::{
    encode_chain_id_hex, is_supported_chain, parse_chain_id_str, parse_chain_id_value,
    supported_chain_names, BridgeOptions, ChainInfo, ProviderEvent, ProviderEventKind,
    ProviderIdentity, ProviderState, RequestArguments, RequestId, RequestKind, SUPPORTED_CHAINS,
};
pub use errors::{codes, ProviderError};
pub use ports::{ClockPort, DiscoveryPort, LegacySlotPort, TimerPort, TransportPort};
pub use protocol::{InboundMessage, OutboundMessage};
pub use registry::{CorrelationRegistry, PendingCall};
pub use state_machine::ProviderStateMachine;
