//! Discovery broadcast and legacy global slot adapters.

use wallet_bridge_core::{DiscoveryPort, ProviderError, ProviderIdentity};

/// Stub discovery port for embedders without a broadcast channel.
#[derive(Debug, Clone, Default)]
pub struct NullDiscovery;

impl DiscoveryPort for NullDiscovery {
    fn announce(&self, _identity: &ProviderIdentity) -> Result<(), ProviderError> {
        Ok(())
    }
}

#[cfg(target_arch = "wasm32")]
pub use browser::{
    install_request_listener, Eip6963BroadcastAdapter, RequestListenerGuard, WindowSlotAdapter,
};

#[cfg(target_arch = "wasm32")]
mod browser {
    use std::sync::Arc;

    use wasm_bindgen::closure::Closure;
    use wasm_bindgen::{JsCast, JsValue};

    use wallet_bridge_core::{
        ClockPort, DiscoveryPort, LegacySlotPort, ProviderBridge, ProviderError, ProviderIdentity,
        TimerPort, TransportPort,
    };

    const ANNOUNCE_EVENT: &str = "eip6963:announceProvider";
    const REQUEST_EVENT: &str = "eip6963:requestProvider";

    /// Dispatches the announce CustomEvent with a frozen
    /// `{ info, provider }` detail.
    pub struct Eip6963BroadcastAdapter {
        window: web_sys::Window,
        provider_handle: JsValue,
    }

    impl Eip6963BroadcastAdapter {
        pub fn new(provider_handle: JsValue) -> Result<Self, ProviderError> {
            let window = web_sys::window()
                .ok_or_else(|| ProviderError::Transport("missing window".to_owned()))?;
            Ok(Self {
                window,
                provider_handle,
            })
        }
    }

    impl DiscoveryPort for Eip6963BroadcastAdapter {
        fn announce(&self, identity: &ProviderIdentity) -> Result<(), ProviderError> {
            let info = serde_wasm_bindgen::to_value(identity).map_err(|e| {
                ProviderError::Transport(format!("failed to encode provider info: {e}"))
            })?;
            let detail = js_sys::Object::new();
            js_sys::Reflect::set(&detail, &JsValue::from_str("info"), &info)
                .map_err(|e| ProviderError::Transport(format!("detail build failed: {e:?}")))?;
            js_sys::Reflect::set(
                &detail,
                &JsValue::from_str("provider"),
                &self.provider_handle,
            )
            .map_err(|e| ProviderError::Transport(format!("detail build failed: {e:?}")))?;
            js_sys::Object::freeze(&detail);

            let init = web_sys::CustomEventInit::new();
            init.set_detail(&detail);
            let event = web_sys::CustomEvent::new_with_event_init_dict(ANNOUNCE_EVENT, &init)
                .map_err(|e| {
                    ProviderError::Transport(format!("announce event build failed: {e:?}"))
                })?;
            self.window
                .dispatch_event(&event)
                .map_err(|e| ProviderError::Transport(format!("announce dispatch failed: {e:?}")))?;
            Ok(())
        }
    }

    pub struct RequestListenerGuard {
        _closure: Closure<dyn FnMut(web_sys::CustomEvent)>,
    }

    /// Re-announce on every request-provider broadcast; discovery listeners
    /// attach at arbitrary times and each expects a fresh announcement.
    pub fn install_request_listener<T, C, D, M>(
        bridge: Arc<ProviderBridge<T, C, D, M>>,
    ) -> Result<RequestListenerGuard, ProviderError>
    where
        T: TransportPort + 'static,
        C: ClockPort + 'static,
        D: DiscoveryPort + 'static,
        M: TimerPort + 'static,
    {
        let window = web_sys::window()
            .ok_or_else(|| ProviderError::Transport("missing window".to_owned()))?;
        let closure =
            Closure::<dyn FnMut(web_sys::CustomEvent)>::new(move |_event: web_sys::CustomEvent| {
                bridge.handle_provider_request();
            });
        window
            .add_event_listener_with_callback(REQUEST_EVENT, closure.as_ref().unchecked_ref())
            .map_err(|e| {
                ProviderError::Transport(format!("failed to attach request listener: {e:?}"))
            })?;
        Ok(RequestListenerGuard { _closure: closure })
    }

    /// Best-effort access to the legacy global wallet slot. Every operation
    /// swallows JS-side throws; other wallets may have installed hostile
    /// descriptors on the property.
    pub struct WindowSlotAdapter {
        target: js_sys::Object,
        property: JsValue,
        handle: JsValue,
    }

    impl WindowSlotAdapter {
        pub fn new(property: &str, handle: JsValue) -> Result<Self, ProviderError> {
            let window = web_sys::window()
                .ok_or_else(|| ProviderError::Transport("missing window".to_owned()))?;
            Ok(Self {
                target: window.unchecked_into(),
                property: JsValue::from_str(property),
                handle,
            })
        }
    }

    impl LegacySlotPort for WindowSlotAdapter {
        fn holds_ours(&self) -> bool {
            js_sys::Reflect::get(&self.target, &self.property)
                .map(|current| js_sys::Object::is(&current, &self.handle))
                .unwrap_or(false)
        }

        fn try_delete(&self) -> bool {
            js_sys::Reflect::delete_property(&self.target, &self.property).unwrap_or(false)
        }

        fn try_assign(&self) -> bool {
            js_sys::Reflect::set(&self.target, &self.property, &self.handle).unwrap_or(false)
        }

        fn try_define(&self) -> bool {
            let descriptor = js_sys::Object::new();
            let writable = js_sys::Reflect::set(
                &descriptor,
                &JsValue::from_str("value"),
                &self.handle,
            )
            .and_then(|_| {
                js_sys::Reflect::set(
                    &descriptor,
                    &JsValue::from_str("writable"),
                    &JsValue::TRUE,
                )
            })
            .and_then(|_| {
                js_sys::Reflect::set(
                    &descriptor,
                    &JsValue::from_str("configurable"),
                    &JsValue::TRUE,
                )
            });
            if writable.is_err() {
                return false;
            }
            js_sys::Reflect::define_property(&self.target, &self.property, &descriptor)
                .unwrap_or(false)
        }
    }
}
