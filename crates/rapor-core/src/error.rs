//! Error types for Rapor

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    // Authentication Errors
    #[error("Invalid username or password")]
    InvalidCredentials,

    #[error("Directory unavailable: {0}")]
    DirectoryUnavailable(String),

    // Validation Errors
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    // Lookup Errors
    #[error("Entity not found: {0}")]
    EntityNotFound(String),

    #[error("An account with this email already exists")]
    AccountAlreadyExists,

    #[error("A group with this name already exists")]
    GroupAlreadyExists,

    // Database Errors
    #[error("Database error: {0}")]
    DatabaseError(String),

    // Internal Errors
    #[error("Internal server error: {0}")]
    InternalError(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl Error {
    pub fn http_status(&self) -> u16 {
        match self {
            Error::InvalidCredentials => 401,

            Error::InvalidArgument(_) => 400,

            Error::EntityNotFound(_) => 404,

            Error::AccountAlreadyExists | Error::GroupAlreadyExists => 409,

            Error::DirectoryUnavailable(_) => 503,

            _ => 500,
        }
    }
}
