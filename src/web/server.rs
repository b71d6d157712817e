//! Admin API server.

use std::net::SocketAddr;
use std::sync::Arc;

use tokio::net::TcpListener;

use crate::config::{Config, ServerConfig};
use crate::db::Database;
use crate::events::EventBus;
use crate::provisioning::MailboxProvisioner;
use crate::settings::CachedSettingsProvider;
use crate::users::UserService;
use crate::web::middleware::AdminToken;
use crate::{AppError, Result};

use super::handlers::AppState;
use super::router::create_app;

/// Wire the settings provider, provisioner and user service.
///
/// The provisioner is registered on the event bus so every user created
/// through the API gets a mailbox.
pub fn build_state(config: &Config, db: Database) -> AppState {
    let settings = Arc::new(CachedSettingsProvider::new(db.clone()));
    let provisioner = Arc::new(MailboxProvisioner::new(
        db.clone(),
        settings.clone(),
        config.mailcow.clone(),
        config.provisioning.clone(),
    ));
    let events = EventBus::new().with_subscriber(provisioner.clone());
    let users = UserService::new(db.clone(), events);

    let admin_token = AdminToken::new(config.server.admin_token.as_deref());

    AppState::new(
        db,
        settings,
        users,
        provisioner,
        config.mailcow.clone(),
        admin_token,
    )
}

/// Web server for the admin API.
pub struct WebServer {
    /// Server address.
    addr: SocketAddr,
    /// Application state.
    app_state: Arc<AppState>,
}

impl WebServer {
    /// Create a new web server.
    pub fn new(config: &ServerConfig, app_state: AppState) -> Result<Self> {
        let addr = format!("{}:{}", config.host, config.port)
            .parse()
            .map_err(|e| AppError::Config(format!("invalid server address: {e}")))?;

        Ok(Self {
            addr,
            app_state: Arc::new(app_state),
        })
    }

    /// Get the configured server address.
    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    /// Run the web server.
    pub async fn run(self) -> std::result::Result<(), std::io::Error> {
        let router = create_app(self.app_state);

        let listener = TcpListener::bind(self.addr).await?;
        let local_addr = listener.local_addr()?;
        tracing::info!("Admin API listening on http://{}", local_addr);

        axum::serve(listener, router).await
    }

    /// Run the server in the background and return the bound address.
    ///
    /// This is useful for testing when binding to port 0.
    pub async fn run_with_addr(self) -> std::result::Result<SocketAddr, std::io::Error> {
        let router = create_app(self.app_state);

        let listener = TcpListener::bind(self.addr).await?;
        let local_addr = listener.local_addr()?;
        tracing::info!("Admin API listening on http://{}", local_addr);

        tokio::spawn(async move {
            if let Err(e) = axum::serve(listener, router).await {
                tracing::error!("Web server error: {}", e);
            }
        });

        Ok(local_addr)
    }
}
