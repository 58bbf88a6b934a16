//! WebView bridge for embedding the Permisso hosted widget in a native host.
//!
//! Wraps the `wry` crate to provide:
//! - Link routing for outbound navigation (in-app tab, external browser,
//!   or host-supplied handling)
//! - Permission bridging between embedded-content capability requests
//!   (camera/microphone) and the host OS permission system
//! - One-way message relay from the widget's `postMessage` events to a
//!   registered native listener
//! - Trusted-domain policy deciding which navigations stay in place

pub mod config;
pub mod errors;
pub mod host;
pub mod permissions;
pub mod relay;
pub mod router;
pub mod surface;

pub use config::{RoutingMode, WidgetConfig};
pub use errors::{PermissionError, RoutingError, SurfaceError, WidgetError};
pub use host::{NavigationDecision, PopupSurface, WidgetHost};
pub use permissions::{
    os_permission, AuthorizationCallback, AuthorizationResult, Capability, CapabilityRequest,
    PermissionBridge, PermissionDecision, PermissionProbe,
};
pub use relay::{MessageListener, MessageRelay, WidgetMessage, CAPTURE_SCRIPT};
pub use router::{LinkRouter, SurfaceOpener, SystemOpener};
pub use surface::{attach_widget_handlers, ContentSurface, WidgetSurface};
