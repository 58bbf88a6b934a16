#[derive(Debug, thiserror::Error)]
pub enum RoutingError {
    #[error("invalid url: {0}")]
    InvalidUrl(String),

    #[error("unsupported scheme: {0}")]
    UnsupportedScheme(String),

    #[error("in-app surface unavailable")]
    SurfaceUnavailable,

    #[error("launch failed: {0}")]
    Launch(String),
}

#[derive(Debug, thiserror::Error)]
pub enum PermissionError {
    #[error("permission probe failed for {identifier}: {reason}")]
    Probe {
        identifier: String,
        reason: String,
    },
}

#[derive(Debug, thiserror::Error)]
pub enum SurfaceError {
    #[error("navigation failed: {0}")]
    Navigation(String),

    #[error("script injection failed: {0}")]
    Script(String),

    #[error("no content surface attached")]
    NotAttached,
}

#[derive(Debug, thiserror::Error)]
pub enum WidgetError {
    #[error(transparent)]
    Routing(#[from] RoutingError),

    #[error(transparent)]
    Permission(#[from] PermissionError),

    #[error(transparent)]
    Surface(#[from] SurfaceError),

    #[error("{0}")]
    Other(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn routing_error_display() {
        let err = RoutingError::InvalidUrl("not a url".into());
        assert_eq!(err.to_string(), "invalid url: not a url");

        let err = RoutingError::UnsupportedScheme("javascript".into());
        assert_eq!(err.to_string(), "unsupported scheme: javascript");

        let err = RoutingError::SurfaceUnavailable;
        assert_eq!(err.to_string(), "in-app surface unavailable");

        let err = RoutingError::Launch("no handler registered".into());
        assert_eq!(err.to_string(), "launch failed: no handler registered");
    }

    #[test]
    fn permission_error_display() {
        let err = PermissionError::Probe {
            identifier: "os.permission.CAMERA".into(),
            reason: "service unavailable".into(),
        };
        assert_eq!(
            err.to_string(),
            "permission probe failed for os.permission.CAMERA: service unavailable"
        );
    }

    #[test]
    fn surface_error_display() {
        let err = SurfaceError::Navigation("load interrupted".into());
        assert_eq!(err.to_string(), "navigation failed: load interrupted");

        let err = SurfaceError::NotAttached;
        assert_eq!(err.to_string(), "no content surface attached");
    }

    #[test]
    fn widget_error_from_routing() {
        let err: WidgetError = RoutingError::SurfaceUnavailable.into();
        assert!(matches!(err, WidgetError::Routing(_)));
        assert_eq!(err.to_string(), "in-app surface unavailable");
    }

    #[test]
    fn widget_error_from_surface() {
        let err: WidgetError = SurfaceError::Script("evaluate failed".into()).into();
        assert!(matches!(err, WidgetError::Surface(_)));
        assert!(err.to_string().contains("evaluate failed"));
    }
}
