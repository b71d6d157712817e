use tracing::{error, info, warn};

use mailcow_provision::web::{build_state, WebServer};
use mailcow_provision::{CachedSettingsProvider, Config, Database};

const CONFIG_PATH: &str = "config.toml";

#[tokio::main]
async fn main() {
    // Load configuration
    let config = match Config::load_with_env(CONFIG_PATH) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Failed to load {CONFIG_PATH}: {e}");
            eprintln!("Using default configuration.");
            let mut config = Config::default();
            config.apply_env_overrides();
            config
        }
    };

    // Initialize logging
    if let Err(e) = mailcow_provision::logging::init(&config.logging) {
        eprintln!("Failed to initialize logging: {e}");
        mailcow_provision::logging::init_console_only(&config.logging.level);
    }

    if let Err(e) = run(config).await {
        error!("Fatal: {}", e);
        std::process::exit(1);
    }
}

async fn run(config: Config) -> mailcow_provision::Result<()> {
    config.validate()?;
    info!("mailcow-provision {}", env!("CARGO_PKG_VERSION"));

    let db = Database::open(&config.database.path).await?;
    info!("Database opened at {}", config.database.path);

    if let Some(api_key) = &config.api_key_override {
        let seeded = CachedSettingsProvider::new(db.clone())
            .seed_api_key(api_key)
            .await?;
        if !seeded {
            warn!("MAILCOW_API_KEY ignored: an API key is already stored");
        }
    }

    let state = build_state(&config, db);
    let server = WebServer::new(&config.server, state)?;
    info!("Server configured on {}", server.addr());

    server.run().await?;
    Ok(())
}
