use tracing::{info, Level};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use netfx_headless::{run_app, HeadlessConfig};

fn main() {
    // Init logging; RUST_LOG overrides the default filter
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let subscriber = FmtSubscriber::builder()
        .with_max_level(Level::TRACE)
        .with_env_filter(filter)
        .finish();
    let _ = tracing::subscriber::set_global_default(subscriber);

    let config = match std::env::args().nth(1) {
        Some(path) => match HeadlessConfig::load(&path) {
            Ok(config) => {
                info!("loaded config from {path}");
                config
            }
            Err(e) => {
                eprintln!("Netfx config error: {e}");
                std::process::exit(2);
            }
        },
        None => HeadlessConfig::default(),
    };

    info!("Netfx starting");
    if let Err(e) = run_app(&config) {
        eprintln!("Netfx error: {e}");
        std::process::exit(1);
    }
}
