use mpl3115a2_sensor::config::{default_config_path, load_config};
use mpl3115a2_sensor::{init_tracing, run_from_config};
use tracing::{error, info};

#[tokio::main]
async fn main() {
    // RUST_LOG=debug for verbose, RUST_LOG=trace to see every status poll
    init_tracing();

    info!("[mpl3115a2-sampler] starting up...");

    let config_path = default_config_path();
    let config = match load_config(&config_path) {
        Ok(config) => config,
        Err(e) => {
            error!("[config] {}", e);
            std::process::exit(1);
        }
    };
    info!("[config] loaded {}", config_path);

    if let Err(e) = run_from_config(config).await {
        error!("[error] sampler stopped: {}", e);
        std::process::exit(1);
    }
}
