use std::sync::{Arc, Mutex};

use tracing::{debug, warn};

use super::types::{
    AuthorizationCallback, Capability, CapabilityRequest, PermissionProbe,
};

/// Resolves embedded-content capability requests against the host OS
/// permission system.
///
/// Synchronous paths (nothing supported requested, everything already
/// granted, no authorization callback wired) resolve on the caller's
/// stack. When the host has to prompt, its answer lands in an outcome
/// queue and is finalized by [`drain_authorizations`] — call that from
/// the UI event loop, which is where the surface-owned completion
/// handles must be touched even if the prompt completed on another
/// thread.
///
/// [`drain_authorizations`]: PermissionBridge::drain_authorizations
pub struct PermissionBridge {
    probe: Arc<dyn PermissionProbe>,
    authorization: Option<Arc<dyn AuthorizationCallback>>,
    /// Host answers awaiting finalization on the UI thread.
    outcomes: Arc<Mutex<Vec<AuthorizationOutcome>>>,
}

struct AuthorizationOutcome {
    request: CapabilityRequest,
    approved: bool,
}

impl PermissionBridge {
    pub fn new(
        probe: Arc<dyn PermissionProbe>,
        authorization: Option<Arc<dyn AuthorizationCallback>>,
    ) -> Self {
        Self {
            probe,
            authorization,
            outcomes: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Resolve one capability request to exactly one grant-or-deny.
    pub fn resolve(&self, request: CapabilityRequest) {
        let identifiers: Vec<&'static str> = {
            let mut ids: Vec<&'static str> = request
                .capabilities()
                .iter()
                .map(|c| c.os_permission())
                .collect();
            ids.dedup();
            ids
        };

        if identifiers.is_empty() {
            warn!("no supported capabilities requested, denying");
            request.deny();
            return;
        }

        let missing: Vec<&'static str> = identifiers
            .into_iter()
            .filter(|id| !self.granted(id))
            .collect();

        if missing.is_empty() {
            let granted = request.capabilities().to_vec();
            debug!(?granted, "all permissions already granted");
            request.grant(granted);
            return;
        }

        let Some(authorization) = self.authorization.clone() else {
            warn!(?missing, "no authorization callback registered, denying");
            request.deny();
            return;
        };

        debug!(?missing, "requesting authorization from host");
        let outcomes = Arc::clone(&self.outcomes);
        let requested = request.capabilities().to_vec();
        authorization.on_permission_required(
            &missing,
            &requested,
            Box::new(move |approved| {
                if let Ok(mut queue) = outcomes.lock() {
                    queue.push(AuthorizationOutcome { request, approved });
                }
                // A poisoned queue drops the request, which denies it.
            }),
        );
    }

    /// Finalize host answers that arrived since the last drain. Call on
    /// the UI thread.
    pub fn drain_authorizations(&self) {
        let drained: Vec<AuthorizationOutcome> = {
            let mut queue = self.outcomes.lock().unwrap();
            std::mem::take(&mut *queue)
        };
        for outcome in drained {
            self.finish(outcome);
        }
    }

    /// Whether any host answer is waiting for a drain.
    pub fn has_pending(&self) -> bool {
        self.outcomes.lock().map(|q| !q.is_empty()).unwrap_or(false)
    }

    /// Deny everything still queued. Used at surface teardown so no
    /// completion handle outlives its surface.
    pub fn deny_pending(&self) {
        let drained: Vec<AuthorizationOutcome> = {
            let mut queue = self.outcomes.lock().unwrap();
            std::mem::take(&mut *queue)
        };
        for outcome in drained {
            warn!("denying capability request pending at teardown");
            outcome.request.deny();
        }
    }

    fn finish(&self, outcome: AuthorizationOutcome) {
        let AuthorizationOutcome { request, approved } = outcome;
        if !approved {
            warn!("host denied authorization");
            request.deny();
            return;
        }

        // Re-probe: the user may have approved only part of the prompt.
        let granted: Vec<Capability> = request
            .capabilities()
            .iter()
            .copied()
            .filter(|c| self.granted(c.os_permission()))
            .collect();

        if granted.is_empty() {
            warn!("authorization approved but permissions still missing, denying");
            request.deny();
        } else {
            debug!(?granted, "granting after authorization");
            request.grant(granted);
        }
    }

    fn granted(&self, identifier: &str) -> bool {
        match self.probe.is_granted(identifier) {
            Ok(granted) => granted,
            Err(e) => {
                warn!(identifier, error = %e, "permission probe failed, treating as not granted");
                false
            }
        }
    }
}
