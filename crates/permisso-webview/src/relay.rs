//! One-way message relay from the widget page to the native host.
//!
//! The capture script injected into the widget page listens for
//! `window.postMessage` events and forwards recognized payloads through
//! the WebView's native channel. `MessageRelay` hands each raw payload
//! verbatim to the single registered listener; there is no buffering and
//! no delivery guarantee beyond "forwarded once, synchronously, if a
//! listener is registered when the message arrives".

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::debug;

/// Receives raw widget events (JSON strings, unparsed).
pub trait MessageListener: Send + Sync {
    fn on_message_received(&self, event: &str);
}

/// Single-listener forwarder for widget `postMessage` events.
#[derive(Default)]
pub struct MessageRelay {
    listener: Option<Arc<dyn MessageListener>>,
}

impl MessageRelay {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the registered listener. `None` unregisters.
    pub fn set_listener(&mut self, listener: Option<Arc<dyn MessageListener>>) {
        self.listener = listener;
    }

    pub fn has_listener(&self) -> bool {
        self.listener.is_some()
    }

    /// Forward one raw event to the current listener, or drop it.
    pub fn deliver(&self, raw: &str) {
        // Capture the listener up front: an in-flight delivery completes
        // against whoever was registered when the event arrived.
        let Some(listener) = self.listener.clone() else {
            debug!(body_len = raw.len(), "widget message dropped: no listener");
            return;
        };
        debug!(body_len = raw.len(), "widget message relayed");
        listener.on_message_received(raw);
    }
}

/// JavaScript injected into the widget page to capture `postMessage`
/// events. String payloads are JSON-parsed; only payloads carrying a
/// `name` discriminator reach the native channel, the rest never leave
/// the page.
pub const CAPTURE_SCRIPT: &str = r#"
(function() {
    if (window.__permissoCapture) { return; }
    window.__permissoCapture = true;

    window.addEventListener('message', function(e) {
        try {
            var data = e.data;
            if (typeof data === 'string') {
                try { data = JSON.parse(data); } catch (_) {}
            }
            if (data && data.name && window.ipc) {
                window.ipc.postMessage(JSON.stringify(data));
            }
        } catch (err) {
            console.log('permisso: capture error:', err);
        }
    });
})();
"#;

/// A parsed widget event: the `name` discriminator plus whatever else
/// the widget attached. Parsing is a convenience for hosts; the relay
/// itself forwards raw strings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WidgetMessage {
    pub name: String,
    #[serde(flatten)]
    pub payload: serde_json::Map<String, serde_json::Value>,
}

impl WidgetMessage {
    /// Parse a raw relayed event. Returns `None` for anything that is
    /// not a JSON object with a `name` field.
    pub fn from_json(raw: &str) -> Option<Self> {
        serde_json::from_str(raw).ok()
    }
}
