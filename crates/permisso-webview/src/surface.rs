//! Content surface seam and the `wry` adapter.
//!
//! `WidgetHost` talks to the embedded web content through the
//! [`ContentSurface`] trait; [`WidgetSurface`] implements it over a
//! `wry::WebView`. `attach_widget_handlers` wires a `WebViewBuilder`'s
//! hooks (ipc, navigation, new-window, page-load) to a shared host.
//!
//! Handler closures hold `Weak` references: the webview must not keep
//! its own host alive, or host → surface → webview → handler → host
//! would form a cycle that never drops.

use std::sync::{Arc, Mutex};

use tracing::{debug, warn};
use wry::{WebView, WebViewBuilder};

use crate::errors::SurfaceError;
use crate::host::WidgetHost;
use crate::relay::CAPTURE_SCRIPT;

/// The embeddable web-content surface the widget renders in.
pub trait ContentSurface {
    fn navigate(&self, url: &str) -> Result<(), SurfaceError>;
    fn inject_script(&self, script: &str) -> Result<(), SurfaceError>;
}

/// [`ContentSurface`] over a built `wry::WebView`.
pub struct WidgetSurface {
    webview: WebView,
}

impl WidgetSurface {
    pub fn new(webview: WebView) -> Self {
        Self { webview }
    }

    /// Access the underlying webview for host-specific needs (bounds,
    /// visibility, devtools).
    pub fn webview(&self) -> &WebView {
        &self.webview
    }
}

impl ContentSurface for WidgetSurface {
    fn navigate(&self, url: &str) -> Result<(), SurfaceError> {
        self.webview
            .load_url(url)
            .map_err(|e| SurfaceError::Navigation(e.to_string()))
    }

    fn inject_script(&self, script: &str) -> Result<(), SurfaceError> {
        self.webview
            .evaluate_script(script)
            .map_err(|e| SurfaceError::Script(e.to_string()))
    }
}

/// Wire a builder's hooks to the shared host: capture script, message
/// channel, navigation interception, popup capture, page-load logging.
pub fn attach_widget_handlers<'a>(
    builder: WebViewBuilder<'a>,
    host: &Arc<Mutex<WidgetHost>>,
) -> WebViewBuilder<'a> {
    let builder = builder.with_initialization_script(CAPTURE_SCRIPT);
    let builder = attach_message_handler(builder, host);
    let builder = attach_navigation_handler(builder, host);
    let builder = attach_popup_handler(builder, host);
    attach_page_load_handler(builder)
}

fn attach_message_handler<'a>(
    builder: WebViewBuilder<'a>,
    host: &Arc<Mutex<WidgetHost>>,
) -> WebViewBuilder<'a> {
    let host = Arc::downgrade(host);
    builder.with_ipc_handler(move |request| {
        let body = request.body().to_string();

        // The capture script only forwards JSON; anything else did not
        // come from it.
        if !is_event_json(&body) {
            warn!(body_len = body.len(), "widget message rejected: invalid JSON");
            return;
        }

        let Some(host) = host.upgrade() else {
            return;
        };
        if let Ok(host) = host.lock() {
            host.on_message(&body);
        };
    })
}

fn attach_navigation_handler<'a>(
    builder: WebViewBuilder<'a>,
    host: &Arc<Mutex<WidgetHost>>,
) -> WebViewBuilder<'a> {
    let host = Arc::downgrade(host);
    builder.with_navigation_handler(move |url| {
        let Some(host) = host.upgrade() else {
            // Host gone: nothing may navigate.
            return false;
        };
        let allow = match host.lock() {
            Ok(host) => host.on_navigation_intercept(&url).allows(),
            Err(_) => false,
        };
        allow
    })
}

fn attach_popup_handler<'a>(
    builder: WebViewBuilder<'a>,
    host: &Arc<Mutex<WidgetHost>>,
) -> WebViewBuilder<'a> {
    let host = Arc::downgrade(host);
    builder.with_new_window_req_handler(move |url| {
        let Some(host) = host.upgrade() else {
            return false;
        };
        if let Ok(host) = host.lock() {
            // Disposable popup surface: capture the url, route it, and
            // never let the popup render.
            host.on_new_surface_request().on_navigation_intercept(&url);
        }
        false
    })
}

fn attach_page_load_handler(builder: WebViewBuilder<'_>) -> WebViewBuilder<'_> {
    builder.with_on_page_load_handler(move |event, url| {
        // The capture script is installed by wry's initialization-script
        // mechanism; this hook only traces the lifecycle.
        match event {
            wry::PageLoadEvent::Started => debug!(url = %url, "widget page load started"),
            wry::PageLoadEvent::Finished => debug!(url = %url, "widget page load finished"),
        }
    })
}

/// Whether an ipc body is the JSON the capture script produces.
fn is_event_json(body: &str) -> bool {
    serde_json::from_str::<serde_json::Value>(body).is_ok()
}
