//! Property-Based Tests for duplicate-password aggregation
//!
//! Checks that flattening keeps exactly the keyed risk factors, that grouping
//! places every record in exactly one group, and that only shared groups are
//! reported.

use std::collections::HashMap;

use credcluster_identity::{
    aggregate, flatten, group, Account, Entity, EntityKind, RiskFactor,
};
use proptest::prelude::*;

// Strategy for generating group ids, including absent and empty ones
fn group_id_strategy() -> impl Strategy<Value = Option<String>> {
    prop_oneof![
        3 => "G[0-9]{1,2}".prop_map(Some),
        1 => Just(Some(String::new())),
        1 => Just(None),
    ]
}

// Strategy for generating password change values
fn last_change_strategy() -> impl Strategy<Value = Option<String>> {
    prop_oneof![
        Just(None),
        (2015i32..2025, 1u32..=12, 1u32..=28)
            .prop_map(|(y, m, d)| Some(format!("{y:04}-{m:02}-{d:02}T00:00:00Z"))),
    ]
}

// Strategy for generating entities with zero or more duplicate-password factors
fn entity_strategy() -> impl Strategy<Value = Entity> {
    (
        "[a-z]{4,8}",
        prop::collection::vec(group_id_strategy(), 0..4),
        prop::collection::vec(last_change_strategy(), 0..3),
        any::<bool>(),
    )
        .prop_map(|(name, group_ids, changes, is_admin)| Entity {
            entity_id: format!("id-{name}"),
            primary_display_name: name,
            kind: EntityKind::User,
            is_admin,
            accounts: changes
                .iter()
                .map(|c| Account::with_last_change(c.as_deref()))
                .collect(),
            risk_factors: group_ids
                .iter()
                .map(|g| RiskFactor::duplicate_password(g.as_deref()))
                .collect(),
            ..Default::default()
        })
}

fn keyed_factor_count(entities: &[Entity]) -> usize {
    entities
        .iter()
        .flat_map(|e| e.risk_factors.iter())
        .filter(|f| f.duplicate_password_group().is_some())
        .count()
}

proptest! {
    #[test]
    fn prop_flatten_keeps_exactly_keyed_factors(entities in prop::collection::vec(entity_strategy(), 0..20)) {
        let records = flatten(&entities);
        prop_assert_eq!(records.len(), keyed_factor_count(&entities));
        prop_assert!(records.iter().all(|r| !r.group_id.is_empty()));

        for entity in &entities {
            let keyed = entity.risk_factors.iter().any(|f| f.duplicate_password_group().is_some());
            let present = records.iter().any(|r| r.entity_id == entity.entity_id);
            if keyed {
                prop_assert!(present);
            }
        }
    }

    #[test]
    fn prop_grouping_is_a_partition(entities in prop::collection::vec(entity_strategy(), 0..20)) {
        let records = flatten(&entities);
        let total = records.len();
        let groups = group(records.clone());

        prop_assert_eq!(groups.iter().map(|g| g.members.len()).sum::<usize>(), total);

        let mut seen_keys = std::collections::HashSet::new();
        for g in &groups {
            prop_assert!(seen_keys.insert(g.group_id.clone()));
            prop_assert!(g.members.iter().all(|m| m.group_id == g.group_id));
        }

        // Relative order inside a group follows flatten order
        for g in &groups {
            let expected: Vec<_> = records.iter().filter(|r| r.group_id == g.group_id).collect();
            let actual: Vec<_> = g.members.iter().collect();
            prop_assert_eq!(expected, actual);
        }
    }

    #[test]
    fn prop_only_shared_groups_are_reported(entities in prop::collection::vec(entity_strategy(), 0..20)) {
        let mut sizes: HashMap<String, usize> = HashMap::new();
        for record in flatten(&entities) {
            *sizes.entry(record.group_id).or_default() += 1;
        }
        let expected = sizes.values().filter(|&&n| n > 1).count();

        let report = aggregate(&entities);
        prop_assert_eq!(report.grouped_count(), expected);
        prop_assert!(report.groups().iter().all(|g| g.member_count() > 1));
    }

    #[test]
    fn prop_aggregation_is_deterministic(entities in prop::collection::vec(entity_strategy(), 0..20)) {
        prop_assert_eq!(aggregate(&entities), aggregate(&entities));
    }
}
