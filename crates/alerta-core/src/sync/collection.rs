//! Ordered incident collection with upsert-by-id semantics.

use serde::Serialize;

use crate::models::{Incident, IncidentId, IncidentStatus};

/// What an upsert did to the collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpsertOutcome {
    /// Unknown id, record placed at the front
    Inserted,
    /// Known id, record replaced in place
    Replaced,
    /// Known id with an identical record
    Unchanged,
}

/// Aggregate counts for the administrative view.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IncidentStats {
    pub total: usize,
    pub pending: usize,
    pub in_progress: usize,
    pub resolved: usize,
}

/// Latest known state of every incident seen on the feed.
///
/// Holds at most one record per id. New ids are prepended; updates keep the
/// record's slot, so the order is not strictly chronological.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct IncidentCollection {
    items: Vec<Incident>,
}

impl IncidentCollection {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn upsert(&mut self, incident: Incident) -> UpsertOutcome {
        match self
            .items
            .iter_mut()
            .find(|existing| existing.incident_id == incident.incident_id)
        {
            Some(existing) if *existing == incident => UpsertOutcome::Unchanged,
            Some(existing) => {
                *existing = incident;
                UpsertOutcome::Replaced
            }
            None => {
                self.items.insert(0, incident);
                UpsertOutcome::Inserted
            }
        }
    }

    #[must_use]
    pub fn get(&self, incident_id: &IncidentId) -> Option<&Incident> {
        self.items
            .iter()
            .find(|incident| &incident.incident_id == incident_id)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Incident> {
        self.items.iter()
    }

    #[must_use]
    pub fn as_slice(&self) -> &[Incident] {
        &self.items
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Incidents with the given status; `None` means all.
    #[must_use]
    pub fn filter_by_status(&self, status: Option<IncidentStatus>) -> Vec<&Incident> {
        self.items
            .iter()
            .filter(|incident| status.map_or(true, |status| incident.status == status))
            .collect()
    }

    #[must_use]
    pub fn stats(&self) -> IncidentStats {
        self.items
            .iter()
            .fold(IncidentStats::default(), |mut stats, incident| {
                stats.total += 1;
                match incident.status {
                    IncidentStatus::Pending => stats.pending += 1,
                    IncidentStatus::InProgress => stats.in_progress += 1,
                    IncidentStatus::Resolved => stats.resolved += 1,
                }
                stats
            })
    }

    /// High-urgency incidents that are not resolved, in collection order.
    #[must_use]
    pub fn urgent(&self) -> Vec<&Incident> {
        self.items
            .iter()
            .filter(|incident| incident.is_urgent())
            .collect()
    }

    /// Records that are new or differ from `previous`.
    #[must_use]
    pub fn changes_since(&self, previous: &Self) -> Vec<&Incident> {
        self.items
            .iter()
            .filter(|incident| previous.get(&incident.incident_id) != Some(*incident))
            .collect()
    }
}

impl<'a> IntoIterator for &'a IncidentCollection {
    type Item = &'a Incident;
    type IntoIter = std::slice::Iter<'a, Incident>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{IncidentKind, Urgency};
    use pretty_assertions::assert_eq;

    fn incident(id: &str, status: IncidentStatus, urgency: Urgency) -> Incident {
        Incident {
            incident_id: IncidentId::from(id),
            kind: IncidentKind::Security,
            location: "Lab A".to_string(),
            description: "...".to_string(),
            urgency,
            status,
            timestamp: "2024-01-01T00:00:00Z".to_string(),
            created_by: None,
        }
    }

    fn ids(collection: &IncidentCollection) -> Vec<&str> {
        collection
            .iter()
            .map(|incident| incident.incident_id.as_str())
            .collect()
    }

    #[test]
    fn unseen_id_is_prepended() {
        let mut collection = IncidentCollection::new();
        assert_eq!(
            collection.upsert(incident("a", IncidentStatus::Pending, Urgency::Low)),
            UpsertOutcome::Inserted
        );
        assert_eq!(
            collection.upsert(incident("b", IncidentStatus::Pending, Urgency::Low)),
            UpsertOutcome::Inserted
        );
        assert_eq!(ids(&collection), vec!["b", "a"]);
    }

    #[test]
    fn known_id_keeps_its_slot() {
        let mut collection = IncidentCollection::new();
        collection.upsert(incident("a", IncidentStatus::Pending, Urgency::Low));
        collection.upsert(incident("b", IncidentStatus::Pending, Urgency::Low));
        let outcome = collection.upsert(incident("a", IncidentStatus::Resolved, Urgency::Low));

        assert_eq!(outcome, UpsertOutcome::Replaced);
        assert_eq!(ids(&collection), vec!["b", "a"]);
        assert_eq!(
            collection.get(&IncidentId::from("a")).unwrap().status,
            IncidentStatus::Resolved
        );
    }

    #[test]
    fn repeated_update_is_idempotent() {
        let update = incident("a", IncidentStatus::InProgress, Urgency::High);

        let mut once = IncidentCollection::new();
        once.upsert(update.clone());

        let mut twice = IncidentCollection::new();
        twice.upsert(update.clone());
        assert_eq!(twice.upsert(update), UpsertOutcome::Unchanged);

        assert_eq!(once, twice);
        assert_eq!(twice.len(), 1);
    }

    #[test]
    fn one_record_per_distinct_id() {
        let mut collection = IncidentCollection::new();
        for (id, status) in [
            ("a", IncidentStatus::Pending),
            ("b", IncidentStatus::Pending),
            ("a", IncidentStatus::InProgress),
            ("c", IncidentStatus::Pending),
            ("b", IncidentStatus::Resolved),
            ("a", IncidentStatus::Resolved),
        ] {
            collection.upsert(incident(id, status, Urgency::Medium));
        }
        assert_eq!(ids(&collection), vec!["c", "b", "a"]);
    }

    #[test]
    fn stats_count_each_status() {
        let mut collection = IncidentCollection::new();
        collection.upsert(incident("a", IncidentStatus::Pending, Urgency::Low));
        collection.upsert(incident("b", IncidentStatus::Pending, Urgency::Low));
        collection.upsert(incident("c", IncidentStatus::InProgress, Urgency::Low));
        collection.upsert(incident("d", IncidentStatus::Resolved, Urgency::Low));

        assert_eq!(
            collection.stats(),
            IncidentStats {
                total: 4,
                pending: 2,
                in_progress: 1,
                resolved: 1,
            }
        );
    }

    #[test]
    fn urgent_excludes_resolved_and_lower_urgency() {
        let mut collection = IncidentCollection::new();
        collection.upsert(incident("a", IncidentStatus::Pending, Urgency::High));
        collection.upsert(incident("b", IncidentStatus::Resolved, Urgency::High));
        collection.upsert(incident("c", IncidentStatus::InProgress, Urgency::Medium));
        collection.upsert(incident("d", IncidentStatus::InProgress, Urgency::High));

        let urgent = collection
            .urgent()
            .into_iter()
            .map(|incident| incident.incident_id.as_str())
            .collect::<Vec<_>>();
        assert_eq!(urgent, vec!["d", "a"]);
    }

    #[test]
    fn filter_by_status_none_returns_all() {
        let mut collection = IncidentCollection::new();
        collection.upsert(incident("a", IncidentStatus::Pending, Urgency::Low));
        collection.upsert(incident("b", IncidentStatus::Resolved, Urgency::Low));

        assert_eq!(collection.filter_by_status(None).len(), 2);
        let resolved = collection.filter_by_status(Some(IncidentStatus::Resolved));
        assert_eq!(resolved.len(), 1);
        assert_eq!(resolved[0].incident_id.as_str(), "b");
    }

    #[test]
    fn changes_since_reports_new_and_modified_records() {
        let mut previous = IncidentCollection::new();
        previous.upsert(incident("a", IncidentStatus::Pending, Urgency::Low));
        previous.upsert(incident("b", IncidentStatus::Pending, Urgency::Low));

        let mut current = previous.clone();
        current.upsert(incident("a", IncidentStatus::Resolved, Urgency::Low));
        current.upsert(incident("c", IncidentStatus::Pending, Urgency::Low));

        let changed = current
            .changes_since(&previous)
            .into_iter()
            .map(|incident| incident.incident_id.as_str())
            .collect::<Vec<_>>();
        assert_eq!(changed, vec!["c", "a"]);
        assert!(current.changes_since(&current).is_empty());
    }
}
