//! Widget host orchestration.
//!
//! `WidgetHost` owns the configuration and wires the router, permission
//! bridge, and message relay to the content surface's lifecycle hooks.
//! The platform adapter (see [`crate::surface`]) calls the `on_*`
//! methods from the UI thread; `initialize` must not be called from
//! inside one of this instance's own delivery or resolution callbacks.

use std::sync::Arc;

use tracing::{debug, warn};
use url::Url;

use crate::config::WidgetConfig;
use crate::errors::{SurfaceError, WidgetError};
use crate::permissions::{CapabilityRequest, PermissionBridge, PermissionProbe};
use crate::relay::{MessageListener, MessageRelay, CAPTURE_SCRIPT};
use crate::router::{LinkRouter, SurfaceOpener};
use crate::surface::ContentSurface;

/// What the content surface should do with an intercepted navigation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavigationDecision {
    /// First-party url: let the surface navigate in place.
    AllowInPlace,
    /// Outbound url: the router took it, the surface must not load it.
    Suppress,
}

impl NavigationDecision {
    pub fn allows(self) -> bool {
        matches!(self, Self::AllowInPlace)
    }
}

/// Hosts the Permisso widget: owns one [`WidgetConfig`], one
/// [`LinkRouter`], one listener slot, and the permission bridge.
pub struct WidgetHost {
    config: WidgetConfig,
    router: LinkRouter,
    relay: MessageRelay,
    bridge: PermissionBridge,
    probe: Arc<dyn PermissionProbe>,
    opener: Arc<dyn SurfaceOpener>,
    surface: Option<Arc<dyn ContentSurface>>,
}

impl WidgetHost {
    /// Create a host with default configuration. Call
    /// [`initialize`](Self::initialize) to wire routing, authorization,
    /// and a message listener.
    pub fn new(probe: Arc<dyn PermissionProbe>, opener: Arc<dyn SurfaceOpener>) -> Self {
        let config = WidgetConfig::default();
        let router = LinkRouter::new(config.routing_mode, Arc::clone(&opener));
        let bridge = PermissionBridge::new(Arc::clone(&probe), None);
        Self {
            config,
            router,
            relay: MessageRelay::new(),
            bridge,
            probe,
            opener,
            surface: None,
        }
    }

    /// Replace all wiring with the given config and listener. Safe to
    /// call repeatedly; each call fully supersedes the previous wiring.
    /// Capability requests still queued on the old wiring resolve with
    /// deny as it is dropped.
    pub fn initialize(
        &mut self,
        config: WidgetConfig,
        listener: Option<Arc<dyn MessageListener>>,
    ) {
        debug!(?config, "initializing widget host");
        self.router = LinkRouter::new(config.routing_mode, Arc::clone(&self.opener));
        self.bridge = PermissionBridge::new(Arc::clone(&self.probe), config.authorization.clone());
        self.relay.set_listener(listener);
        self.config = config;
    }

    pub fn config(&self) -> &WidgetConfig {
        &self.config
    }

    pub fn router(&self) -> &LinkRouter {
        &self.router
    }

    /// Swap in a custom link router, keeping the rest of the wiring.
    pub fn set_link_router(&mut self, router: LinkRouter) {
        self.router = router;
    }

    /// Attach the content surface the widget renders in.
    pub fn attach_surface(&mut self, surface: Arc<dyn ContentSurface>) {
        self.surface = Some(surface);
    }

    /// Detach the surface, denying any capability request still queued
    /// so no completion handle outlives its surface.
    pub fn detach_surface(&mut self) {
        self.surface = None;
        self.bridge.deny_pending();
    }

    /// Navigate the surface to the widget address. No validation is
    /// performed on the address.
    pub fn load_widget(&self, address: &str) -> Result<(), WidgetError> {
        let surface = self.surface.as_ref().ok_or(SurfaceError::NotAttached)?;
        debug!(address, "loading widget");
        surface.navigate(address)?;
        Ok(())
    }

    /// Page navigation started: install the message capture script.
    ///
    /// The wry adapter injects the script at build time instead; this
    /// path serves surfaces without init-script support.
    pub fn on_page_started(&self, url: &str) {
        debug!(url, "widget page started");
        if let Some(surface) = &self.surface {
            if let Err(e) = surface.inject_script(CAPTURE_SCRIPT) {
                warn!(error = %e, "capture script injection failed");
            }
        }
    }

    /// A captured `postMessage` event arrived from the page.
    pub fn on_message(&self, raw: &str) {
        self.relay.deliver(raw);
    }

    /// The surface intercepted a navigation. Trusted urls stay in
    /// place; everything else goes to the router and is suppressed.
    pub fn on_navigation_intercept(&self, url: &str) -> NavigationDecision {
        if is_trusted_url(url, &self.config.trusted_domains) {
            debug!(url, "trusted navigation allowed in place");
            return NavigationDecision::AllowInPlace;
        }

        self.router.route(url, |opened| {
            if opened {
                debug!(url, "outbound link routed");
            } else {
                warn!(url, "outbound link could not be opened");
            }
        });
        NavigationDecision::Suppress
    }

    /// The page asked for a popup / new window. The returned surface
    /// exists only to capture the popup's url and route it.
    pub fn on_new_surface_request(&self) -> PopupSurface {
        debug!("popup surface requested");
        PopupSurface {
            router: self.router.clone(),
        }
    }

    /// The surface received an embedded-content permission request.
    pub fn on_permission_request(&self, request: CapabilityRequest) {
        self.bridge.resolve(request);
    }

    /// Finalize authorization answers on the UI thread. Call from the
    /// host event loop.
    pub fn pump_authorizations(&self) {
        self.bridge.drain_authorizations();
    }

    pub fn has_pending_authorizations(&self) -> bool {
        self.bridge.has_pending()
    }

    /// Tear down: drop the surface, deny pending requests, unregister
    /// the listener.
    pub fn teardown(&mut self) {
        self.detach_surface();
        self.relay.set_listener(None);
    }
}

/// Throwaway surface for popup requests: created, asked for one url,
/// discarded without rendering anything.
pub struct PopupSurface {
    router: LinkRouter,
}

impl PopupSurface {
    /// Capture the popup's target url, route it, and suppress the
    /// popup itself. Consumes the surface; it has no further use.
    pub fn on_navigation_intercept(self, url: &str) -> NavigationDecision {
        debug!(url, "popup url captured");
        self.router.route(url, |_| {});
        NavigationDecision::Suppress
    }
}

/// Whether the url's host is one of the trusted first-party domains.
pub(crate) fn is_trusted_url(url: &str, domains: &[String]) -> bool {
    let Ok(parsed) = Url::parse(url) else {
        return false;
    };
    let Some(host) = parsed.host_str() else {
        return false;
    };
    host_is_trusted(host, domains)
}

/// Exact host or label-boundary subdomain match, case-insensitive.
/// A plain string suffix test would let `evilpermisso.io` pass for
/// `permisso.io`; the match requires equality or a preceding dot.
fn host_is_trusted(host: &str, domains: &[String]) -> bool {
    let host = host.to_ascii_lowercase();
    domains.iter().any(|domain| {
        let domain = domain.to_ascii_lowercase();
        if host == domain {
            return true;
        }
        host.len() > domain.len()
            && host.ends_with(&domain)
            && host.as_bytes()[host.len() - domain.len() - 1] == b'.'
    })
}
