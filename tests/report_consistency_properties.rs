//! Property-based tests for report consistency across crates
//!
//! Raw GraphQL pages are decoded, aggregated and rendered; every output
//! format must describe the same set of shared-password groups.

use std::collections::HashMap;

use credcluster_cli::{CsvReporter, JsonReporter, Reporter};
use credcluster_identity::{aggregate, EntityPage};
use proptest::prelude::*;
use serde_json::{json, Value};

/// Strategy for one entity node: an id suffix and the group ids it carries
fn node_strategy() -> impl Strategy<Value = Vec<String>> {
    prop::collection::vec(
        prop_oneof![
            Just("G1".to_string()),
            Just("G2".to_string()),
            Just("G3".to_string()),
            Just("G4".to_string()),
        ],
        0..3,
    )
}

fn response_for(nodes: &[Vec<String>]) -> Value {
    let edges: Vec<Value> = nodes
        .iter()
        .enumerate()
        .map(|(i, groups)| {
            json!({ "node": {
                "entityId": format!("e{i}"),
                "primaryDisplayName": format!("User {i}"),
                "type": "USER",
                "riskScore": 0.5,
                "archived": false,
                "isAdmin": i % 2 == 0,
                "accounts": [],
                "riskFactors": groups
                    .iter()
                    .map(|g| json!({ "type": "DUPLICATE_PASSWORD", "severity": "MEDIUM", "groupId": g }))
                    .collect::<Vec<_>>()
            } })
        })
        .collect();
    json!({ "data": { "entities": {
        "pageInfo": { "hasNextPage": false, "endCursor": null },
        "edges": edges
    } } })
}

/// Membership counts per group id, keeping only ids seen more than once
fn expected_groups(nodes: &[Vec<String>]) -> HashMap<String, usize> {
    let mut counts: HashMap<String, usize> = HashMap::new();
    for groups in nodes {
        for group in groups {
            *counts.entry(group.clone()).or_default() += 1;
        }
    }
    counts.retain(|_, count| *count >= 2);
    counts
}

proptest! {
    #[test]
    fn prop_json_report_matches_membership(nodes in prop::collection::vec(node_strategy(), 0..12)) {
        let page = EntityPage::from_response(response_for(&nodes)).unwrap();
        prop_assert_eq!(page.entities.len(), nodes.len());

        let report = aggregate(&page.entities);
        let rendered: Value = serde_json::from_str(&JsonReporter.render(&report).unwrap()).unwrap();

        let expected = expected_groups(&nodes);
        prop_assert_eq!(rendered["groupedCount"].as_u64().unwrap() as usize, expected.len());

        let groups = rendered["groups"].as_array().unwrap();
        let mut total = 0;
        for group in groups {
            let id = group["groupId"].as_str().unwrap();
            let count = group["memberCount"].as_u64().unwrap() as usize;
            prop_assert_eq!(expected.get(id).copied(), Some(count));
            prop_assert_eq!(group["members"].as_array().unwrap().len(), count);
            total += count;
        }
        prop_assert_eq!(rendered["totalMembers"].as_u64().unwrap() as usize, total);
    }

    #[test]
    fn prop_csv_has_one_row_per_member(nodes in prop::collection::vec(node_strategy(), 0..12)) {
        let page = EntityPage::from_response(response_for(&nodes)).unwrap();
        let report = aggregate(&page.entities);
        let csv = CsvReporter.render(&report).unwrap();

        let rows = csv.lines().count() - 1;
        prop_assert_eq!(rows, report.total_members());
        prop_assert_eq!(rows, expected_groups(&nodes).values().sum::<usize>());
    }
}
