//! Expiry scheduling for rpc-class requests.

use std::sync::Arc;

use wallet_bridge_core::{CorrelationRegistry, RequestId, TimerPort};

/// For embedders that drive time themselves: schedules nothing, relying on
/// `CorrelationRegistry::expire_overdue` sweeps.
#[derive(Debug, Clone, Default)]
pub struct NoopTimerAdapter;

impl TimerPort for NoopTimerAdapter {
    fn schedule_expire(&self, _registry: Arc<CorrelationRegistry>, _id: RequestId, _delay_ms: u64) {}
}

#[cfg(target_arch = "wasm32")]
pub use browser::WindowTimerAdapter;

#[cfg(target_arch = "wasm32")]
mod browser {
    use std::sync::Arc;

    use wasm_bindgen::closure::Closure;
    use wasm_bindgen::JsCast;

    use wallet_bridge_core::{CorrelationRegistry, RequestId, TimerPort};

    /// Backs the registry deadline with `setTimeout`. Expiry is idempotent,
    /// so a timer firing after the result arrived is harmless.
    #[derive(Debug, Clone, Default)]
    pub struct WindowTimerAdapter;

    impl TimerPort for WindowTimerAdapter {
        fn schedule_expire(
            &self,
            registry: Arc<CorrelationRegistry>,
            id: RequestId,
            delay_ms: u64,
        ) {
            let Some(window) = web_sys::window() else {
                return;
            };
            let callback = Closure::once_into_js(move || {
                registry.expire(&id);
            });
            // setTimeout takes an i32; oversized embedder timeouts clamp
            // rather than wrap negative.
            let delay = i32::try_from(delay_ms).unwrap_or(i32::MAX);
            let _ = window.set_timeout_with_callback_and_timeout_and_arguments_0(
                callback.unchecked_ref(),
                delay,
            );
        }
    }
}
