use std::process::ExitCode;

use tracing::{error, info};

use filebox::{Config, FileStore, WebServer};

#[tokio::main]
async fn main() -> ExitCode {
    // Load configuration
    let config = match Config::load_with_env("config.toml") {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Failed to load config.toml: {e}");
            eprintln!("Using default configuration.");
            let mut config = Config::default();
            config.apply_env_overrides();
            config
        }
    };

    if let Err(e) = config.validate() {
        eprintln!("Invalid configuration: {e}");
        return ExitCode::FAILURE;
    }

    // Initialize logging
    if let Err(e) = filebox::logging::init(&config.logging) {
        eprintln!("Failed to initialize logging: {e}");
        filebox::logging::init_console_only(&config.logging.level);
    }

    info!("Filebox - file storage service");

    let store = match FileStore::open(&config.storage.path) {
        Ok(store) => store,
        Err(e) => {
            error!("Failed to open storage at {}: {}", config.storage.path, e);
            return ExitCode::FAILURE;
        }
    };

    let server = match WebServer::new(
        &config.server,
        store,
        config.storage.max_upload_size_bytes(),
    ) {
        Ok(server) => server,
        Err(e) => {
            error!("{}", e);
            return ExitCode::FAILURE;
        }
    };

    info!(
        "Max upload size: {}MB",
        config.storage.max_upload_size_mb
    );

    if let Err(e) = server.run().await {
        error!("Web server error: {}", e);
        return ExitCode::FAILURE;
    }

    ExitCode::SUCCESS
}
