//! Incident model

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{Error, Result};
use crate::models::UserId;
use crate::util::iso_timestamp_now;

/// Opaque incident identifier.
///
/// Client-generated ids are UUID v7 strings; server-assigned ids are kept
/// verbatim, whatever their shape.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct IncidentId(String);

impl IncidentId {
    /// Generate a fresh, practically unique identifier
    #[must_use]
    pub fn generate() -> Self {
        Self(Uuid::now_v7().to_string())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for IncidentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for IncidentId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<&str> for IncidentId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

/// Incident category.
///
/// Decoding also accepts the legacy Spanish vocabulary; unknown categories
/// fall back to `Other`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IncidentKind {
    #[serde(alias = "infraestructura")]
    Infrastructure,
    #[serde(alias = "emergencia")]
    Emergency,
    #[serde(alias = "servicios")]
    Services,
    #[serde(alias = "seguridad")]
    Security,
    #[serde(alias = "otro")]
    #[serde(other)]
    Other,
}

impl IncidentKind {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Infrastructure => "infrastructure",
            Self::Emergency => "emergency",
            Self::Services => "services",
            Self::Security => "security",
            Self::Other => "other",
        }
    }
}

impl fmt::Display for IncidentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Urgency level, ordered `Low < Medium < High`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Urgency {
    Low,
    Medium,
    High,
}

impl Urgency {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
        }
    }
}

impl fmt::Display for Urgency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Handling status of an incident.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum IncidentStatus {
    #[serde(alias = "pendiente")]
    Pending,
    #[serde(alias = "in_progress", alias = "en atención", alias = "en atencion")]
    InProgress,
    #[serde(alias = "resuelto")]
    Resolved,
}

impl IncidentStatus {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::InProgress => "in-progress",
            Self::Resolved => "resolved",
        }
    }
}

impl fmt::Display for IncidentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A reported campus incident as mirrored from the feed
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Incident {
    pub incident_id: IncidentId,
    #[serde(rename = "type")]
    pub kind: IncidentKind,
    pub location: String,
    pub description: String,
    pub urgency: Urgency,
    pub status: IncidentStatus,
    /// ISO-8601 creation marker, kept as received
    pub timestamp: String,
    /// Submitting user, absent for anonymous reports
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_by: Option<String>,
}

impl Incident {
    /// Attach an identifier to a draft.
    #[must_use]
    pub fn from_draft(draft: IncidentDraft, incident_id: IncidentId) -> Self {
        Self {
            incident_id,
            kind: draft.kind,
            location: draft.location,
            description: draft.description,
            urgency: draft.urgency,
            status: draft.status,
            timestamp: draft.timestamp,
            created_by: draft.created_by,
        }
    }

    #[must_use]
    pub fn is_resolved(&self) -> bool {
        self.status == IncidentStatus::Resolved
    }

    /// High urgency and not yet resolved.
    #[must_use]
    pub fn is_urgent(&self) -> bool {
        self.urgency == Urgency::High && !self.is_resolved()
    }

    /// Parse the timestamp, if it is valid RFC 3339.
    #[must_use]
    pub fn timestamp_utc(&self) -> Option<DateTime<Utc>> {
        DateTime::parse_from_rfc3339(self.timestamp.trim())
            .ok()
            .map(|timestamp| timestamp.with_timezone(&Utc))
    }
}

/// An incident that has not been assigned an identifier yet
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IncidentDraft {
    #[serde(rename = "type")]
    pub kind: IncidentKind,
    pub location: String,
    pub description: String,
    pub urgency: Urgency,
    pub status: IncidentStatus,
    pub timestamp: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_by: Option<String>,
}

impl IncidentDraft {
    /// Create a pending draft stamped with the current time
    #[must_use]
    pub fn new(
        kind: IncidentKind,
        location: impl Into<String>,
        description: impl Into<String>,
        urgency: Urgency,
    ) -> Self {
        Self {
            kind,
            location: location.into(),
            description: description.into(),
            urgency,
            status: IncidentStatus::Pending,
            timestamp: iso_timestamp_now(),
            created_by: None,
        }
    }

    #[must_use]
    pub fn with_created_by(mut self, user_id: &UserId) -> Self {
        self.created_by = Some(user_id.as_str().to_string());
        self
    }

    /// Form-level check performed before submission.
    pub fn validate(&self) -> Result<()> {
        if self.location.trim().is_empty() || self.description.trim().is_empty() {
            return Err(Error::InvalidInput(
                "Please complete all fields".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn sample_json() -> &'static str {
        r#"{
            "incidentId": "i1",
            "type": "security",
            "location": "Lab A",
            "description": "Door forced open",
            "urgency": "high",
            "status": "pending",
            "timestamp": "2024-01-01T00:00:00Z"
        }"#
    }

    #[test]
    fn incident_id_generate_unique() {
        let id1 = IncidentId::generate();
        let id2 = IncidentId::generate();
        assert_ne!(id1, id2);
        assert!(Uuid::parse_str(id1.as_str()).is_ok());
    }

    #[test]
    fn incident_decodes_wire_shape() {
        let incident: Incident = serde_json::from_str(sample_json()).unwrap();
        assert_eq!(incident.incident_id.as_str(), "i1");
        assert_eq!(incident.kind, IncidentKind::Security);
        assert_eq!(incident.urgency, Urgency::High);
        assert_eq!(incident.status, IncidentStatus::Pending);
        assert_eq!(incident.created_by, None);
        assert!(incident.is_urgent());
    }

    #[test]
    fn incident_decodes_legacy_spanish_vocabulary() {
        let raw = r#"{
            "incidentId": "x9",
            "type": "infraestructura",
            "location": "Edificio 3",
            "description": "Fuga de agua",
            "urgency": "medium",
            "status": "en atención",
            "timestamp": "2024-02-01T10:00:00.000Z",
            "createdBy": "u-1"
        }"#;
        let incident: Incident = serde_json::from_str(raw).unwrap();
        assert_eq!(incident.kind, IncidentKind::Infrastructure);
        assert_eq!(incident.status, IncidentStatus::InProgress);
        assert_eq!(incident.created_by.as_deref(), Some("u-1"));

        let resolved: IncidentStatus = serde_json::from_str("\"resuelto\"").unwrap();
        assert_eq!(resolved, IncidentStatus::Resolved);
    }

    #[test]
    fn unknown_kind_falls_back_to_other() {
        let kind: IncidentKind = serde_json::from_str("\"flooding\"").unwrap();
        assert_eq!(kind, IncidentKind::Other);
    }

    #[test]
    fn unknown_status_is_rejected() {
        assert!(serde_json::from_str::<IncidentStatus>("\"archived\"").is_err());
    }

    #[test]
    fn incident_encodes_camel_case_without_empty_creator() {
        let incident: Incident = serde_json::from_str(sample_json()).unwrap();
        let value = serde_json::to_value(&incident).unwrap();
        assert_eq!(value["incidentId"], "i1");
        assert_eq!(value["type"], "security");
        assert!(value.get("createdBy").is_none());

        let mut in_progress = incident;
        in_progress.status = IncidentStatus::InProgress;
        let value = serde_json::to_value(&in_progress).unwrap();
        assert_eq!(value["status"], "in-progress");
    }

    #[test]
    fn urgency_is_ordered() {
        assert!(Urgency::Low < Urgency::Medium);
        assert!(Urgency::Medium < Urgency::High);
    }

    #[test]
    fn draft_new_is_pending_and_timestamped() {
        let draft = IncidentDraft::new(
            IncidentKind::Services,
            "Cafeteria",
            "No hot water",
            Urgency::Low,
        );
        assert_eq!(draft.status, IncidentStatus::Pending);
        assert!(DateTime::parse_from_rfc3339(&draft.timestamp).is_ok());
        assert!(draft.validate().is_ok());
    }

    #[test]
    fn draft_validate_rejects_blank_fields() {
        let draft = IncidentDraft::new(IncidentKind::Other, "  ", "Something", Urgency::Low);
        assert!(matches!(draft.validate(), Err(Error::InvalidInput(_))));

        let draft = IncidentDraft::new(IncidentKind::Other, "Gym", "\n", Urgency::Low);
        assert!(draft.validate().is_err());
    }

    #[test]
    fn from_draft_keeps_fields_and_attaches_id() {
        let user_id = UserId::from("u-42");
        let draft = IncidentDraft::new(IncidentKind::Emergency, "Lab B", "Smoke", Urgency::High)
            .with_created_by(&user_id);
        let incident = Incident::from_draft(draft.clone(), IncidentId::from("abc"));
        assert_eq!(incident.incident_id.as_str(), "abc");
        assert_eq!(incident.location, draft.location);
        assert_eq!(incident.timestamp, draft.timestamp);
        assert_eq!(incident.created_by.as_deref(), Some("u-42"));
    }

    #[test]
    fn timestamp_utc_handles_invalid_text() {
        let mut incident: Incident = serde_json::from_str(sample_json()).unwrap();
        assert!(incident.timestamp_utc().is_some());
        incident.timestamp = "yesterday".to_string();
        assert!(incident.timestamp_utc().is_none());
    }
}
