//! Message channel adapters. The browser adapter is the only component that
//! touches `postMessage`; everything it receives is treated as untrusted
//! until the source check passes.

use wallet_bridge_core::{OutboundMessage, ProviderError, TransportPort};

/// Stub transport for embedders that have not attached a channel yet.
#[derive(Debug, Clone, Default)]
pub struct NullTransport;

impl TransportPort for NullTransport {
    fn post(&self, _message: &OutboundMessage) -> Result<(), ProviderError> {
        Err(ProviderError::Transport("no transport attached".to_owned()))
    }
}

#[cfg(target_arch = "wasm32")]
pub use browser::{install_relay_listener, PostMessageTransport, RelayListenerGuard};

#[cfg(target_arch = "wasm32")]
mod browser {
    use std::sync::Arc;

    use wasm_bindgen::closure::Closure;
    use wasm_bindgen::JsCast;

    use wallet_bridge_core::{
        ClockPort, DiscoveryPort, OutboundMessage, ProviderBridge, ProviderError, TimerPort,
        TransportPort,
    };

    /// Posts `{type, msg}` envelopes to the page's own window, addressed to
    /// the document's origin only, never `"*"`.
    pub struct PostMessageTransport {
        window: web_sys::Window,
    }

    impl PostMessageTransport {
        pub fn new() -> Result<Self, ProviderError> {
            let window = web_sys::window()
                .ok_or_else(|| ProviderError::Transport("missing window".to_owned()))?;
            Ok(Self { window })
        }
    }

    impl TransportPort for PostMessageTransport {
        fn post(&self, message: &OutboundMessage) -> Result<(), ProviderError> {
            let value = serde_wasm_bindgen::to_value(message).map_err(|e| {
                ProviderError::Transport(format!("failed to encode outbound message: {e}"))
            })?;
            let origin = self
                .window
                .location()
                .origin()
                .map_err(|e| ProviderError::Transport(format!("origin unavailable: {e:?}")))?;
            self.window
                .post_message(&value, &origin)
                .map_err(|e| ProviderError::Transport(format!("postMessage failed: {e:?}")))
        }
    }

    /// Keeps the inbound listener closure alive for the provider's lifetime.
    pub struct RelayListenerGuard {
        _closure: Closure<dyn FnMut(web_sys::MessageEvent)>,
    }

    /// Attach the single inbound message listener. Messages whose source is
    /// not this document are discarded before parsing; iframe and
    /// third-party postMessage traffic never reaches the bridge.
    pub fn install_relay_listener<T, C, D, M>(
        bridge: Arc<ProviderBridge<T, C, D, M>>,
    ) -> Result<RelayListenerGuard, ProviderError>
    where
        T: TransportPort + 'static,
        C: ClockPort + 'static,
        D: DiscoveryPort + 'static,
        M: TimerPort + 'static,
    {
        let window = web_sys::window()
            .ok_or_else(|| ProviderError::Transport("missing window".to_owned()))?;
        let source_window = window.clone();
        let closure = Closure::<dyn FnMut(web_sys::MessageEvent)>::new(
            move |event: web_sys::MessageEvent| {
                let Some(source) = event.source() else {
                    return;
                };
                if !js_sys::Object::is(source.as_ref(), source_window.as_ref()) {
                    return;
                }
                let data: serde_json::Value = match serde_wasm_bindgen::from_value(event.data()) {
                    Ok(value) => value,
                    Err(e) => {
                        tracing::trace!(error = %e, "dropping non-JSON message event");
                        return;
                    }
                };
                bridge.handle_relay_message(data);
            },
        );
        window
            .add_event_listener_with_callback("message", closure.as_ref().unchecked_ref())
            .map_err(|e| {
                ProviderError::Transport(format!("failed to attach message listener: {e:?}"))
            })?;
        Ok(RelayListenerGuard { _closure: closure })
    }
}
