mod app;
mod cli;

use permisso_webview::RoutingMode;
use tracing_subscriber::EnvFilter;
use winit::event_loop::EventLoop;

fn routing_mode(arg: &str) -> RoutingMode {
    match arg {
        "in-app-tab" => RoutingMode::InAppTab,
        "custom" => RoutingMode::Custom,
        "external" => RoutingMode::ExternalSurface,
        other => {
            tracing::warn!("Unknown routing mode {other:?}, using external");
            RoutingMode::ExternalSurface
        }
    }
}

fn main() {
    let args = cli::parse();

    // Initialize logging
    let level = args.log_level.as_deref().unwrap_or("info");
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!("permisso_demo={level},permisso_webview={level}"))
    });
    tracing_subscriber::fmt().with_env_filter(filter).init();

    tracing::info!("Permisso demo v{} starting", env!("CARGO_PKG_VERSION"));

    let event_loop = EventLoop::new().expect("failed to create event loop");
    let mut app = app::DemoApp::new(args.url.clone(), routing_mode(&args.routing));

    tracing::info!("Entering event loop");
    if let Err(e) = event_loop.run_app(&mut app) {
        tracing::error!("Event loop error: {e}");
    }
    tracing::info!("Shutdown complete");
}
