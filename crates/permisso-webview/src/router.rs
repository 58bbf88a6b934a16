//! Outbound link routing.
//!
//! `LinkRouter` decides how a url leaving the widget is opened: in a
//! lightweight in-app browsing surface, the OS external handler, or a
//! host-supplied path. The platform launchers sit behind the
//! [`SurfaceOpener`] seam so the policy is testable without a desktop
//! session.

use std::sync::Arc;

use tracing::{debug, warn};
use url::Url;

use crate::config::RoutingMode;
use crate::errors::RoutingError;

/// Platform launchers for the two concrete routing targets.
pub trait SurfaceOpener: Send + Sync {
    /// Open the url in a lightweight in-app browsing surface.
    fn open_in_app_tab(&self, url: &Url) -> Result<(), RoutingError>;

    /// Hand the url to the OS default external handler.
    fn open_external(&self, url: &Url) -> Result<(), RoutingError>;

    /// Best-effort probe for in-app surface availability.
    fn in_app_surface_available(&self) -> bool;
}

/// Default opener backed by the OS handler registry.
///
/// Desktop platforms have no in-app tab analog, so that path always
/// reports unavailable and `RoutingMode::InAppTab` degrades to the
/// external handoff. Hosts with a real in-app surface supply their own
/// [`SurfaceOpener`].
#[derive(Debug, Default)]
pub struct SystemOpener;

impl SurfaceOpener for SystemOpener {
    fn open_in_app_tab(&self, _url: &Url) -> Result<(), RoutingError> {
        Err(RoutingError::SurfaceUnavailable)
    }

    fn open_external(&self, url: &Url) -> Result<(), RoutingError> {
        open::that(url.as_str()).map_err(|e| RoutingError::Launch(e.to_string()))
    }

    fn in_app_surface_available(&self) -> bool {
        false
    }
}

/// Routes outbound links according to a fixed [`RoutingMode`].
#[derive(Clone)]
pub struct LinkRouter {
    mode: RoutingMode,
    opener: Arc<dyn SurfaceOpener>,
}

impl LinkRouter {
    pub fn new(mode: RoutingMode, opener: Arc<dyn SurfaceOpener>) -> Self {
        Self { mode, opener }
    }

    /// The mode this router was configured with.
    pub fn mode(&self) -> RoutingMode {
        self.mode
    }

    /// Whether an in-app browsing surface can be launched right now.
    pub fn is_in_app_surface_available(&self) -> bool {
        self.opener.in_app_surface_available()
    }

    /// Open `url` per the configured mode and report the outcome.
    ///
    /// Never panics, whatever the input: malformed and non-http(s) urls
    /// resolve `false` (except in `Custom` mode, which always resolves
    /// `true` and leaves handling entirely to the host).
    pub fn route(&self, url: &str, on_resolved: impl FnOnce(bool)) {
        let resolved = match self.mode {
            RoutingMode::Custom => {
                debug!(url = %url, "custom routing, deferring to host");
                true
            }
            RoutingMode::ExternalSurface => self.open_external(url),
            RoutingMode::InAppTab => self.open_in_app_tab(url),
        };
        on_resolved(resolved);
    }

    fn open_in_app_tab(&self, raw: &str) -> bool {
        let url = match parse_routable(raw) {
            Ok(url) => url,
            Err(e) => {
                warn!(url = %raw, error = %e, "link rejected");
                return false;
            }
        };

        match self.opener.open_in_app_tab(&url) {
            Ok(()) => true,
            Err(e) => {
                // Same fallback chain as the external mode, minus re-parsing.
                debug!(url = %url, error = %e, "in-app tab failed, falling back to external handler");
                self.hand_off(&url)
            }
        }
    }

    fn open_external(&self, raw: &str) -> bool {
        match parse_routable(raw) {
            Ok(url) => self.hand_off(&url),
            Err(e) => {
                warn!(url = %raw, error = %e, "link rejected");
                false
            }
        }
    }

    fn hand_off(&self, url: &Url) -> bool {
        match self.opener.open_external(url) {
            Ok(()) => {
                debug!(url = %url, "link handed to external handler");
                true
            }
            Err(e) => {
                warn!(url = %url, error = %e, "external handoff failed");
                false
            }
        }
    }
}

/// Parse a link target, accepting only http(s) urls.
fn parse_routable(raw: &str) -> Result<Url, RoutingError> {
    let url = Url::parse(raw).map_err(|e| RoutingError::InvalidUrl(e.to_string()))?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        scheme => Err(RoutingError::UnsupportedScheme(scheme.to_owned())),
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use super::*;

    /// Records launcher calls; each target can be made to fail.
    #[derive(Default)]
    struct RecordingOpener {
        in_app_available: bool,
        fail_in_app: bool,
        fail_external: bool,
        calls: Mutex<Vec<String>>,
    }

    impl RecordingOpener {
        fn calls(&self) -> Vec<String> {
            self.calls.lock().unwrap().clone()
        }
    }

    impl SurfaceOpener for RecordingOpener {
        fn open_in_app_tab(&self, url: &Url) -> Result<(), RoutingError> {
            self.calls.lock().unwrap().push(format!("in-app {url}"));
            if self.fail_in_app {
                Err(RoutingError::SurfaceUnavailable)
            } else {
                Ok(())
            }
        }

        fn open_external(&self, url: &Url) -> Result<(), RoutingError> {
            self.calls.lock().unwrap().push(format!("external {url}"));
            if self.fail_external {
                Err(RoutingError::Launch("no handler".into()))
            } else {
                Ok(())
            }
        }

        fn in_app_surface_available(&self) -> bool {
            self.in_app_available
        }
    }

    fn route_outcome(router: &LinkRouter, url: &str) -> bool {
        let mut outcome = None;
        router.route(url, |ok| outcome = Some(ok));
        outcome.expect("on_resolved not invoked")
    }

    // -- Mode dispatch --

    #[test]
    fn external_mode_hands_off() {
        let opener = Arc::new(RecordingOpener::default());
        let router = LinkRouter::new(RoutingMode::ExternalSurface, opener.clone());

        assert!(route_outcome(&router, "https://external-site.example/page"));
        assert_eq!(opener.calls(), vec!["external https://external-site.example/page"]);
    }

    #[test]
    fn in_app_mode_prefers_tab() {
        let opener = Arc::new(RecordingOpener {
            in_app_available: true,
            ..Default::default()
        });
        let router = LinkRouter::new(RoutingMode::InAppTab, opener.clone());

        assert!(route_outcome(&router, "https://example.com/doc"));
        assert_eq!(opener.calls(), vec!["in-app https://example.com/doc"]);
    }

    #[test]
    fn custom_mode_resolves_true_without_opening() {
        let opener = Arc::new(RecordingOpener::default());
        let router = LinkRouter::new(RoutingMode::Custom, opener.clone());

        assert!(route_outcome(&router, "https://example.com/"));
        assert!(opener.calls().is_empty());
    }

    // -- Fallback chain --

    #[test]
    fn in_app_failure_falls_back_to_external() {
        let opener = Arc::new(RecordingOpener {
            fail_in_app: true,
            ..Default::default()
        });
        let router = LinkRouter::new(RoutingMode::InAppTab, opener.clone());

        assert!(route_outcome(&router, "https://example.com/"));
        assert_eq!(
            opener.calls(),
            vec!["in-app https://example.com/", "external https://example.com/"]
        );
    }

    #[test]
    fn in_app_fallback_matches_external_outcome() {
        for fail_external in [false, true] {
            let make = |mode| {
                LinkRouter::new(
                    mode,
                    Arc::new(RecordingOpener {
                        fail_in_app: true,
                        fail_external,
                        ..Default::default()
                    }),
                )
            };
            let via_in_app = route_outcome(&make(RoutingMode::InAppTab), "https://example.com/");
            let via_external =
                route_outcome(&make(RoutingMode::ExternalSurface), "https://example.com/");
            assert_eq!(via_in_app, via_external);
        }
    }

    #[test]
    fn external_launch_failure_resolves_false() {
        let opener = Arc::new(RecordingOpener {
            fail_external: true,
            ..Default::default()
        });
        let router = LinkRouter::new(RoutingMode::ExternalSurface, opener);

        assert!(!route_outcome(&router, "https://example.com/"));
    }

    // -- Malformed input --

    #[test]
    fn malformed_urls_resolve_false_without_panicking() {
        for mode in [RoutingMode::InAppTab, RoutingMode::ExternalSurface] {
            let opener = Arc::new(RecordingOpener::default());
            let router = LinkRouter::new(mode, opener.clone());

            for url in ["", "not a url", "javascript:alert(1)", "file:///etc/passwd", "://"] {
                assert!(!route_outcome(&router, url), "{mode:?} accepted {url:?}");
            }
            assert!(opener.calls().is_empty(), "{mode:?} reached the opener");
        }
    }

    #[test]
    fn custom_mode_accepts_any_string() {
        let router = LinkRouter::new(RoutingMode::Custom, Arc::new(RecordingOpener::default()));
        for url in ["", "javascript:alert(1)", "garbage"] {
            assert!(route_outcome(&router, url));
        }
    }

    // -- Probe --

    #[test]
    fn surface_availability_comes_from_opener() {
        let available = LinkRouter::new(
            RoutingMode::InAppTab,
            Arc::new(RecordingOpener {
                in_app_available: true,
                ..Default::default()
            }),
        );
        assert!(available.is_in_app_surface_available());

        let unavailable =
            LinkRouter::new(RoutingMode::InAppTab, Arc::new(RecordingOpener::default()));
        assert!(!unavailable.is_in_app_surface_available());
    }

    #[test]
    fn system_opener_has_no_in_app_surface() {
        let opener = SystemOpener;
        assert!(!opener.in_app_surface_available());
        let url = Url::parse("https://example.com/").unwrap();
        assert!(matches!(
            opener.open_in_app_tab(&url),
            Err(RoutingError::SurfaceUnavailable)
        ));
    }
}
