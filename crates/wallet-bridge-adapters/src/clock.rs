#[cfg(not(target_arch = "wasm32"))]
use std::time::{SystemTime, UNIX_EPOCH};
#[cfg(target_arch = "wasm32")]
use web_time::{SystemTime, UNIX_EPOCH};

use wallet_bridge_core::{ClockPort, ProviderError};

/// Wall-clock milliseconds since the Unix epoch, used for registry deadline
/// bookkeeping.
#[derive(Debug, Clone, Default)]
pub struct SystemClockAdapter;

impl ClockPort for SystemClockAdapter {
    fn now_ms(&self) -> Result<u64, ProviderError> {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|elapsed| elapsed.as_millis() as u64)
            .map_err(|e| ProviderError::Transport(format!("system clock before epoch: {e}")))
    }
}
