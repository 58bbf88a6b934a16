//! Widget configuration.

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::permissions::AuthorizationCallback;

/// Policy for opening links that leave the widget's trusted domains.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RoutingMode {
    /// Open links in a lightweight in-app browsing surface, falling back
    /// to the external browser when none is available.
    InAppTab,
    /// Hand links to the OS default external handler.
    ExternalSurface,
    /// The host wires its own handling; the router only reports success.
    Custom,
}

/// First-party domains whose navigations are allowed in place.
pub const DEFAULT_TRUSTED_DOMAINS: &[&str] = &["permisso.io", "prms.io", "bankflip.io", "bkfp.io"];

/// Configuration for a [`crate::WidgetHost`].
///
/// Constructed by the host application and handed to
/// [`crate::WidgetHost::initialize`]. The value is immutable for the
/// lifetime of that wiring; re-initializing replaces it wholesale.
#[derive(Clone)]
pub struct WidgetConfig {
    /// How outbound links are opened.
    pub routing_mode: RoutingMode,
    /// Host hook that performs the interactive OS permission prompt.
    /// Without one, capability requests needing new permissions are denied.
    pub authorization: Option<Arc<dyn AuthorizationCallback>>,
    /// Hosts whose navigations stay in the widget surface. A url host
    /// matches when it equals a domain or is a subdomain of one.
    pub trusted_domains: Vec<String>,
}

impl Default for WidgetConfig {
    fn default() -> Self {
        Self {
            routing_mode: RoutingMode::InAppTab,
            authorization: None,
            trusted_domains: DEFAULT_TRUSTED_DOMAINS
                .iter()
                .map(|d| (*d).to_owned())
                .collect(),
        }
    }
}

impl WidgetConfig {
    /// Create a config with the given routing mode and defaults otherwise.
    pub fn with_mode(routing_mode: RoutingMode) -> Self {
        Self {
            routing_mode,
            ..Default::default()
        }
    }

    /// Set the authorization callback.
    pub fn authorization(mut self, callback: Arc<dyn AuthorizationCallback>) -> Self {
        self.authorization = Some(callback);
        self
    }

    /// Replace the trusted-domain allow-list.
    pub fn trusted_domains(mut self, domains: Vec<String>) -> Self {
        self.trusted_domains = domains;
        self
    }
}

impl fmt::Debug for WidgetConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WidgetConfig")
            .field("routing_mode", &self.routing_mode)
            .field("authorization", &self.authorization.is_some())
            .field("trusted_domains", &self.trusted_domains)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config() {
        let config = WidgetConfig::default();
        assert_eq!(config.routing_mode, RoutingMode::InAppTab);
        assert!(config.authorization.is_none());
        assert_eq!(config.trusted_domains.len(), DEFAULT_TRUSTED_DOMAINS.len());
        assert!(config.trusted_domains.iter().any(|d| d == "permisso.io"));
    }

    #[test]
    fn with_mode_overrides_routing_only() {
        let config = WidgetConfig::with_mode(RoutingMode::Custom);
        assert_eq!(config.routing_mode, RoutingMode::Custom);
        assert!(config.authorization.is_none());
    }

    #[test]
    fn trusted_domains_replaced_wholesale() {
        let config = WidgetConfig::default().trusted_domains(vec!["widget.example.io".into()]);
        assert_eq!(config.trusted_domains, vec!["widget.example.io"]);
    }

    #[test]
    fn routing_mode_serde_round_trip() {
        let json = serde_json::to_string(&RoutingMode::ExternalSurface).unwrap();
        let mode: RoutingMode = serde_json::from_str(&json).unwrap();
        assert_eq!(mode, RoutingMode::ExternalSurface);
    }
}
