//! Demo host application.
//!
//! Implements `winit::application::ApplicationHandler` to drive a
//! single window containing the Permisso widget, with demo
//! implementations of the permission probe, authorization prompt, and
//! message listener.

use std::collections::HashSet;
use std::sync::{Arc, Mutex};

use tracing::info;
use winit::application::ApplicationHandler;
use winit::event::WindowEvent;
use winit::event_loop::ActiveEventLoop;
use winit::window::{Window, WindowAttributes, WindowId};
use wry::WebViewBuilder;

use permisso_webview::{
    attach_widget_handlers, AuthorizationCallback, AuthorizationResult, Capability,
    MessageListener, PermissionError, PermissionProbe, RoutingMode, SystemOpener, WidgetConfig,
    WidgetHost, WidgetMessage, WidgetSurface,
};

/// In-memory permission state standing in for the OS permission store.
#[derive(Default)]
pub struct DemoProbe {
    granted: Mutex<HashSet<String>>,
}

impl PermissionProbe for DemoProbe {
    fn is_granted(&self, identifier: &str) -> Result<bool, PermissionError> {
        Ok(self.granted.lock().unwrap().contains(identifier))
    }
}

/// Simulated interactive prompt: logs what the widget asked for and
/// approves it, flipping the probe state the way a real OS prompt
/// would.
pub struct DemoAuthorization {
    probe: Arc<DemoProbe>,
}

impl AuthorizationCallback for DemoAuthorization {
    fn on_permission_required(
        &self,
        identifiers: &[&'static str],
        requested: &[Capability],
        on_result: AuthorizationResult,
    ) {
        info!(?identifiers, ?requested, "permission prompt (demo auto-approves)");
        let mut granted = self.probe.granted.lock().unwrap();
        for id in identifiers {
            granted.insert((*id).to_owned());
        }
        drop(granted);
        on_result(true);
    }
}

/// Logs every relayed widget event.
pub struct LoggingListener;

impl MessageListener for LoggingListener {
    fn on_message_received(&self, event: &str) {
        match WidgetMessage::from_json(event) {
            Some(msg) => info!(name = %msg.name, "widget event"),
            None => info!(raw = event, "widget event (unparsed)"),
        }
    }
}

pub struct DemoApp {
    widget_url: String,
    host: Arc<Mutex<WidgetHost>>,
    window: Option<Window>,
}

impl DemoApp {
    pub fn new(widget_url: String, routing_mode: RoutingMode) -> Self {
        let probe = Arc::new(DemoProbe::default());
        let host = Arc::new(Mutex::new(WidgetHost::new(
            probe.clone(),
            Arc::new(SystemOpener),
        )));

        let config = WidgetConfig::with_mode(routing_mode)
            .authorization(Arc::new(DemoAuthorization { probe }));
        host.lock()
            .unwrap()
            .initialize(config, Some(Arc::new(LoggingListener)));

        Self {
            widget_url,
            host,
            window: None,
        }
    }
}

impl ApplicationHandler for DemoApp {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }

        let attrs = WindowAttributes::default()
            .with_title("Permisso Demo")
            .with_inner_size(winit::dpi::LogicalSize::new(480.0, 720.0));

        let window = match event_loop.create_window(attrs) {
            Ok(w) => w,
            Err(e) => {
                tracing::error!("Failed to create window: {e}");
                event_loop.exit();
                return;
            }
        };

        let builder = attach_widget_handlers(WebViewBuilder::new(), &self.host);
        let webview = match builder.build(&window) {
            Ok(wv) => wv,
            Err(e) => {
                tracing::error!("Failed to create webview: {e}");
                event_loop.exit();
                return;
            }
        };

        {
            let mut host = self.host.lock().unwrap();
            host.attach_surface(Arc::new(WidgetSurface::new(webview)));
            if let Err(e) = host.load_widget(&self.widget_url) {
                tracing::error!("Failed to load widget: {e}");
            }
        }

        self.window = Some(window);
        info!(url = %self.widget_url, "window created, widget loading");
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        if let WindowEvent::CloseRequested = event {
            info!("window close requested");
            if let Ok(mut host) = self.host.lock() {
                host.teardown();
            }
            event_loop.exit();
        }
    }

    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        // Authorization answers are finalized on the UI thread.
        if let Ok(host) = self.host.lock() {
            host.pump_authorizations();
        }
    }
}
