use std::io;

use alerta_core::session::SessionError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Core(#[from] alerta_core::Error),
    #[error(transparent)]
    Session(#[from] SessionError),
    #[error(transparent)]
    Io(#[from] io::Error),
    #[error(transparent)]
    Serialization(#[from] serde_json::Error),
    #[error("Configuration error: {0}")]
    Config(String),
    #[error("Not signed in. Run `alerta login` first.")]
    NotSignedIn,
    #[error("The admin view requires an admin or authority account (signed in as {0})")]
    NotAuthorized(String),
    #[error("Not connected to the incident feed at {0}; the report was not delivered")]
    NotDelivered(String),
}
