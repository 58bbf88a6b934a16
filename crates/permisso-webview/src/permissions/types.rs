use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::errors::PermissionError;

/// OS permission identifiers the bridge hands to the host.
///
/// These are opaque tokens: the host's [`PermissionProbe`] and
/// [`AuthorizationCallback`] decide what they mean on the platform at
/// hand.
pub mod os_permission {
    pub const CAMERA: &str = "os.permission.CAMERA";
    pub const MICROPHONE: &str = "os.permission.MICROPHONE";
}

/// An embedded-content resource class the widget page can request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Capability {
    VideoCapture,
    AudioCapture,
}

impl Capability {
    /// Parse a platform resource string. Unrecognized resources map to
    /// nothing and are dropped from consideration.
    ///
    /// Accepts the short names used by the capture layer as well as the
    /// WebView resource identifiers some platforms report.
    pub fn from_resource(resource: &str) -> Option<Self> {
        match resource {
            "video-capture" | "android.webkit.resource.VIDEO_CAPTURE" => Some(Self::VideoCapture),
            "audio-capture" | "android.webkit.resource.AUDIO_CAPTURE" => Some(Self::AudioCapture),
            _ => None,
        }
    }

    /// The OS permission identifier backing this capability.
    pub fn os_permission(self) -> &'static str {
        match self {
            Self::VideoCapture => os_permission::CAMERA,
            Self::AudioCapture => os_permission::MICROPHONE,
        }
    }
}

/// Outcome of a capability request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PermissionDecision {
    /// The listed capabilities may be used. May be a subset of what was
    /// requested when the user partially approved.
    Granted(Vec<Capability>),
    Denied,
}

/// Queries current OS grant status for a permission identifier.
///
/// Probe failures are treated as not-granted by the bridge (fail
/// closed).
pub trait PermissionProbe: Send + Sync {
    fn is_granted(&self, identifier: &str) -> Result<bool, PermissionError>;
}

/// Continuation handed to the host's authorization prompt. Must be
/// invoked exactly once; dropping it unresolved denies the request.
pub type AuthorizationResult = Box<dyn FnOnce(bool) + Send>;

/// Host hook performing the interactive OS permission prompt.
///
/// The host shows whatever UI it needs (modal dialog, OS prompt) and
/// reports the result through `on_result`, possibly from another thread
/// or after an arbitrary delay.
pub trait AuthorizationCallback: Send + Sync {
    fn on_permission_required(
        &self,
        identifiers: &[&'static str],
        requested: &[Capability],
        on_result: AuthorizationResult,
    );
}

/// One pending capability request from the embedded surface.
///
/// Bundles the requested capability set with the surface's completion
/// sink. The sink fires exactly once: `grant`/`deny` consume the
/// request, and a request dropped unresolved (surface teardown,
/// reconfiguration, a host that discards the continuation) denies
/// itself.
pub struct CapabilityRequest {
    capabilities: Vec<Capability>,
    completion: CompletionHandle,
}

impl CapabilityRequest {
    pub fn new(
        capabilities: Vec<Capability>,
        on_decision: impl FnOnce(PermissionDecision) + Send + 'static,
    ) -> Self {
        let mut deduped = Vec::with_capacity(capabilities.len());
        for capability in capabilities {
            if !deduped.contains(&capability) {
                deduped.push(capability);
            }
        }
        Self {
            capabilities: deduped,
            completion: CompletionHandle {
                sink: Some(Box::new(on_decision)),
            },
        }
    }

    /// Build a request from raw platform resource strings, dropping
    /// anything [`Capability::from_resource`] does not recognize.
    pub fn from_resources<S: AsRef<str>>(
        resources: &[S],
        on_decision: impl FnOnce(PermissionDecision) + Send + 'static,
    ) -> Self {
        let capabilities = resources
            .iter()
            .filter_map(|r| Capability::from_resource(r.as_ref()))
            .collect();
        Self::new(capabilities, on_decision)
    }

    pub fn capabilities(&self) -> &[Capability] {
        &self.capabilities
    }

    /// Resolve with a granted capability set.
    pub fn grant(mut self, granted: Vec<Capability>) {
        self.completion.resolve(PermissionDecision::Granted(granted));
    }

    /// Resolve with a denial.
    pub fn deny(mut self) {
        self.completion.resolve(PermissionDecision::Denied);
    }
}

impl fmt::Debug for CapabilityRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CapabilityRequest")
            .field("capabilities", &self.capabilities)
            .field("resolved", &self.completion.sink.is_none())
            .finish()
    }
}

/// Exactly-once wrapper around the surface's grant/deny sink.
struct CompletionHandle {
    sink: Option<Box<dyn FnOnce(PermissionDecision) + Send>>,
}

impl CompletionHandle {
    fn resolve(&mut self, decision: PermissionDecision) {
        if let Some(sink) = self.sink.take() {
            sink(decision);
        }
    }
}

impl Drop for CompletionHandle {
    fn drop(&mut self) {
        if let Some(sink) = self.sink.take() {
            warn!("capability request dropped unresolved, denying");
            sink(PermissionDecision::Denied);
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use super::*;

    fn decision_sink() -> (
        Arc<Mutex<Option<PermissionDecision>>>,
        impl FnOnce(PermissionDecision) + Send + 'static,
    ) {
        let slot = Arc::new(Mutex::new(None));
        let writer = Arc::clone(&slot);
        (slot, move |decision| {
            *writer.lock().unwrap() = Some(decision);
        })
    }

    #[test]
    fn capability_resource_mapping() {
        assert_eq!(
            Capability::from_resource("video-capture"),
            Some(Capability::VideoCapture)
        );
        assert_eq!(
            Capability::from_resource("android.webkit.resource.AUDIO_CAPTURE"),
            Some(Capability::AudioCapture)
        );
        assert_eq!(Capability::from_resource("midi-sysex"), None);
        assert_eq!(Capability::from_resource(""), None);
    }

    #[test]
    fn capability_permission_table() {
        assert_eq!(
            Capability::VideoCapture.os_permission(),
            os_permission::CAMERA
        );
        assert_eq!(
            Capability::AudioCapture.os_permission(),
            os_permission::MICROPHONE
        );
    }

    #[test]
    fn grant_fires_sink_once() {
        let (slot, sink) = decision_sink();
        let request = CapabilityRequest::new(vec![Capability::VideoCapture], sink);
        request.grant(vec![Capability::VideoCapture]);
        assert_eq!(
            *slot.lock().unwrap(),
            Some(PermissionDecision::Granted(vec![Capability::VideoCapture]))
        );
    }

    #[test]
    fn dropping_unresolved_request_denies() {
        let (slot, sink) = decision_sink();
        let request = CapabilityRequest::new(vec![Capability::AudioCapture], sink);
        drop(request);
        assert_eq!(*slot.lock().unwrap(), Some(PermissionDecision::Denied));
    }

    #[test]
    fn duplicate_capabilities_collapse() {
        let (_slot, sink) = decision_sink();
        let request = CapabilityRequest::new(
            vec![
                Capability::VideoCapture,
                Capability::VideoCapture,
                Capability::AudioCapture,
            ],
            sink,
        );
        assert_eq!(
            request.capabilities(),
            &[Capability::VideoCapture, Capability::AudioCapture]
        );
        request.deny();
    }

    #[test]
    fn unknown_resources_dropped() {
        let (_slot, sink) = decision_sink();
        let request = CapabilityRequest::from_resources(
            &["video-capture", "midi-sysex", "protected-media-id"],
            sink,
        );
        assert_eq!(request.capabilities(), &[Capability::VideoCapture]);
        request.deny();
    }
}
