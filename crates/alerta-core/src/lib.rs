//! alerta-core - Core library for Alerta
//!
//! This crate contains the incident models, the local session store, and the
//! real-time incident synchronizer shared by every Alerta client.

pub mod config;
pub mod error;
pub mod models;
pub mod session;
pub mod state;
pub mod sync;
pub mod util;

pub use error::{Error, Result};
pub use models::{Incident, IncidentDraft, IncidentId, Role, User, UserId};
pub use session::{SessionPersistence, SessionStore};
pub use state::ConnectionState;
pub use sync::{IncidentCollection, IncidentSynchronizer};
