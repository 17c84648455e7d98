//! Flattening entities into password-sharing clusters
//!
//! Every duplicate-password risk factor with a usable `groupId` becomes one
//! [`FlatRecord`]. Records are grouped by `groupId` in first-seen order and only
//! clusters with at least two members are reported. An entity that belongs to
//! several clusters shows up once in each of them.

use std::collections::HashMap;

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::Serialize;
use tracing::{debug, warn};

use crate::models::{Entity, EntityKind};

/// One duplicate-password risk factor of one entity
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FlatRecord {
    pub group_id: String,
    pub entity_id: String,
    pub primary_display_name: String,
    pub secondary_display_name: Option<String>,
    pub is_admin: bool,
    pub archived: bool,
    pub password_last_set: Option<DateTime<Utc>>,
    pub risk_score: f64,
    pub entity_type: EntityKind,
}

/// Records sharing one `groupId`, in flatten order
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Group {
    pub group_id: String,
    pub members: Vec<FlatRecord>,
}

impl Group {
    pub fn member_count(&self) -> usize {
        self.members.len()
    }
}

/// Reportable clusters of accounts sharing a password
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DuplicatePasswordReport {
    groups: Vec<Group>,
}

impl DuplicatePasswordReport {
    pub fn groups(&self) -> &[Group] {
        &self.groups
    }

    pub fn into_groups(self) -> Vec<Group> {
        self.groups
    }

    /// Number of clusters with more than one member
    pub fn grouped_count(&self) -> usize {
        self.groups.len()
    }

    /// Member rows across all clusters
    pub fn total_members(&self) -> usize {
        self.groups.iter().map(Group::member_count).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }
}

/// Parse an API timestamp into UTC
///
/// Accepts RFC 3339, a naive `YYYY-MM-DDTHH:MM:SS[.f]` (taken as UTC) and a bare date.
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(parsed) = DateTime::parse_from_rfc3339(raw) {
        return Some(parsed.with_timezone(&Utc));
    }
    for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, format) {
            return Some(naive.and_utc());
        }
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

/// First non-null password-change value in account order, parsed
pub fn resolve_password_last_set(entity: &Entity) -> Option<DateTime<Utc>> {
    let raw = entity.first_password_change()?;
    let parsed = parse_timestamp(raw);
    if parsed.is_none() {
        warn!(
            entity_id = %entity.entity_id,
            value = raw,
            "Unrecognized password change timestamp, treating as unknown"
        );
    }
    parsed
}

/// One record per duplicate-password factor that carries a non-empty `groupId`
pub fn flatten(entities: &[Entity]) -> Vec<FlatRecord> {
    let mut records = Vec::new();

    for entity in entities {
        let mut group_ids = entity
            .risk_factors
            .iter()
            .filter_map(|factor| factor.duplicate_password_group())
            .peekable();

        if group_ids.peek().is_none() {
            continue;
        }

        let password_last_set = resolve_password_last_set(entity);
        for group_id in group_ids {
            records.push(FlatRecord {
                group_id: group_id.to_string(),
                entity_id: entity.entity_id.clone(),
                primary_display_name: entity.primary_display_name.clone(),
                secondary_display_name: entity.secondary_display_name.clone(),
                is_admin: entity.is_admin,
                archived: entity.archived,
                password_last_set,
                risk_score: entity.risk_score,
                entity_type: entity.kind.clone(),
            });
        }
    }

    records
}

/// Partition records by `groupId`, keys in first-seen order
pub fn group(records: Vec<FlatRecord>) -> Vec<Group> {
    let mut index: HashMap<String, usize> = HashMap::new();
    let mut groups: Vec<Group> = Vec::new();

    for record in records {
        match index.get(&record.group_id) {
            Some(&slot) => groups[slot].members.push(record),
            None => {
                index.insert(record.group_id.clone(), groups.len());
                groups.push(Group {
                    group_id: record.group_id.clone(),
                    members: vec![record],
                });
            }
        }
    }

    groups
}

/// Keep only groups with more than one member
pub fn retain_shared(groups: Vec<Group>) -> Vec<Group> {
    groups
        .into_iter()
        .filter(|group| group.member_count() > 1)
        .collect()
}

/// Flatten, group and filter in one pass over the fetched entities
pub fn aggregate(entities: &[Entity]) -> DuplicatePasswordReport {
    let records = flatten(entities);
    let record_count = records.len();
    let all_groups = group(records);
    let candidate_count = all_groups.len();
    let groups = retain_shared(all_groups);

    debug!(
        entities = entities.len(),
        records = record_count,
        candidate_groups = candidate_count,
        shared_groups = groups.len(),
        "Aggregated duplicate password groups"
    );

    DuplicatePasswordReport { groups }
}
