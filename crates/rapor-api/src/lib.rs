//! HTTP API server for Rapor

pub mod routes;
pub mod server;

pub use server::{AppState, PortalServer};
