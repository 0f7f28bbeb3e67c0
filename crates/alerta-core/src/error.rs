//! Error types for alerta-core

use thiserror::Error;

/// Result type alias using alerta-core's Error
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in alerta-core operations
#[derive(Error, Debug)]
pub enum Error {
    /// Invalid input
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}
