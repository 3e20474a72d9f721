//! Host adapters for the wallet bridge core: clock, message transport,
//! expiry timers, and discovery/legacy-slot integration. Browser-specific
//! adapters are compiled for wasm32 only; native builds get stubs plus the
//! pieces integration tests need.

pub mod clock;
pub mod config;
pub mod discovery;
pub mod timer;
pub mod transport;

pub use clock::SystemClockAdapter;
pub use config::BridgeConfig;
pub use discovery::NullDiscovery;
pub use timer::NoopTimerAdapter;
pub use transport::NullTransport;

#[cfg(target_arch = "wasm32")]
pub use discovery::{
    install_request_listener, Eip6963BroadcastAdapter, RequestListenerGuard, WindowSlotAdapter,
};
#[cfg(target_arch = "wasm32")]
pub use timer::WindowTimerAdapter;
#[cfg(target_arch = "wasm32")]
pub use transport::{install_relay_listener, PostMessageTransport, RelayListenerGuard};
