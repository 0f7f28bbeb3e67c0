//! Data models for Alerta

mod incident;
mod user;

pub use incident::{Incident, IncidentDraft, IncidentId, IncidentKind, IncidentStatus, Urgency};
pub use user::{Role, User, UserId};
