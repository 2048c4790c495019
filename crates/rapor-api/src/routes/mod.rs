//! Portal API routes

mod auth;
mod health;

pub use auth::{login, LoginRequest};
pub use health::health_check;
