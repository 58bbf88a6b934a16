use clap::Parser;

/// Permisso demo — hosts the Permisso widget in a native window.
#[derive(Parser, Debug)]
#[command(name = "permisso-demo", version, about)]
pub struct Args {
    /// Widget address to load.
    #[arg(long, default_value = "https://permisso.io/widget/demo")]
    pub url: String,

    /// Routing mode for outbound links (in-app-tab, external, custom).
    #[arg(long, default_value = "external")]
    pub routing: String,

    /// Log level override (debug, info, warn, error).
    #[arg(long)]
    pub log_level: Option<String>,
}

pub fn parse() -> Args {
    Args::parse()
}
