//! Portal API server

use axum::{
    routing::{get, post},
    Router,
};
use rapor_auth::{AuthService, DirectoryAuthenticator, LdapDirectoryClient};
use rapor_core::{config::RaporConfig, Result};
use rapor_store::{PortalRepository, PortalStore};
use std::sync::Arc;
use std::time::Instant;
use tokio::net::TcpListener;
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultMakeSpan, TraceLayer},
};
use tracing::info;

use crate::routes;

/// Application state shared across handlers
pub struct AppState<D: DirectoryAuthenticator, R: PortalRepository> {
    pub config: Arc<RaporConfig>,
    pub auth: Arc<AuthService<D, R>>,
    pub start_time: Instant,
}

impl<D: DirectoryAuthenticator, R: PortalRepository> Clone for AppState<D, R> {
    fn clone(&self) -> Self {
        Self {
            config: self.config.clone(),
            auth: self.auth.clone(),
            start_time: self.start_time,
        }
    }
}

/// Portal server
pub struct PortalServer {
    config: RaporConfig,
}

impl PortalServer {
    pub fn new(config: RaporConfig) -> Self {
        Self { config }
    }

    pub async fn run(self) -> Result<()> {
        let start_time = Instant::now();

        self.config.directory.validate()?;

        let store = Arc::new(PortalStore::new(&self.config.database.url).await?);

        let directory = LdapDirectoryClient::new(self.config.directory.clone());
        let auth = Arc::new(AuthService::new(directory, store, &self.config.directory));

        let state = AppState {
            config: Arc::new(self.config.clone()),
            auth,
            start_time,
        };

        let app = create_router(state);
        let addr = format!(
            "{}:{}",
            self.config.server.bind_address, self.config.server.port
        );

        let listener = TcpListener::bind(&addr).await?;

        info!("Rapor API server listening on http://{}", addr);
        info!("Directory: {}", self.config.directory.url);
        info!("Login endpoint at http://{}/api/v1/auth/login", addr);

        axum::serve(listener, app).await?;
        Ok(())
    }
}

/// Create the application router
pub fn create_router<D, R>(state: AppState<D, R>) -> Router
where
    D: DirectoryAuthenticator + 'static,
    R: PortalRepository + 'static,
{
    Router::new()
        .route("/health", get(routes::health_check))
        .route("/api/v1/auth/login", post(routes::login))
        .layer(
            TraceLayer::new_for_http().make_span_with(DefaultMakeSpan::new().include_headers(false)),
        )
        .layer(CorsLayer::permissive())
        .with_state(state)
}
