//! Health endpoint

use axum::{extract::State, response::IntoResponse, Json};
use rapor_auth::DirectoryAuthenticator;
use rapor_store::PortalRepository;
use serde::Serialize;

use crate::server::AppState;

#[derive(Debug, Serialize)]
struct HealthResponse {
    status: &'static str,
    version: &'static str,
    uptime_secs: u64,
}

/// GET /health
pub async fn health_check<D, R>(State(state): State<AppState<D, R>>) -> impl IntoResponse
where
    D: DirectoryAuthenticator + 'static,
    R: PortalRepository + 'static,
{
    Json(HealthResponse {
        status: "ok",
        version: rapor_core::VERSION,
        uptime_secs: state.start_time.elapsed().as_secs(),
    })
}
