//! The `entities` query document and its response envelope

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{IdentityError, Result};
use crate::models::{Entity, PageInfo, RiskFactorType};

/// Largest page the API accepts
pub const MAX_PAGE_SIZE: u32 = 1000;

/// Entities carrying any of the requested risk factors, highest risk first.
///
/// The field selection is what the API expects byte for byte; the rest of the
/// crate depends on the aliases (`isAdmin`) and fragments used here.
pub const ENTITY_QUERY: &str = r#"query ($first: Int, $after: Cursor, $riskFactors: [RiskFactorType!]) {
  entities(riskFactorTypes: $riskFactors, sortKey: RISK_SCORE, sortOrder: DESCENDING, first: $first, after: $after) {
    pageInfo {
      hasNextPage
      endCursor
    }
    edges {
      node {
        entityId
        primaryDisplayName
        secondaryDisplayName
        type
        riskScore
        archived
        isAdmin: hasRole(type: AdminAccountRole)
        accounts {
          ... on ActiveDirectoryAccountDescriptor {
            passwordAttributes {
              lastChange
            }
          }
        }
        riskFactors {
          type
          score
          severity
          ... on AttackPathBasedRiskFactor {
            attackPath {
              relation
              entity {
                primaryDisplayName
                secondaryDisplayName
              }
            }
          }
          ... on DuplicatePasswordRiskFactor {
            groupId
          }
        }
      }
    }
  }
}"#;

/// Variables bound to [`ENTITY_QUERY`]
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EntityQueryVariables {
    pub first: u32,
    /// `null` on the first request
    pub after: Option<String>,
    pub risk_factors: Vec<RiskFactorType>,
}

impl EntityQueryVariables {
    /// Variables for the first page
    pub fn first_page(page_size: u32, risk_factors: Vec<RiskFactorType>) -> Self {
        Self {
            first: page_size,
            after: None,
            risk_factors,
        }
    }

    /// Full request body for the GraphQL endpoint
    pub fn to_request_body(&self) -> Result<Value> {
        Ok(serde_json::json!({
            "query": ENTITY_QUERY,
            "variables": serde_json::to_value(self)?,
        }))
    }
}

/// One page of query results
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EntityPage {
    pub entities: Vec<Entity>,
    pub page_info: PageInfo,
}

#[derive(Debug, Deserialize)]
struct GraphqlEnvelope {
    #[serde(default)]
    data: Option<EntitiesData>,
    #[serde(default)]
    errors: Option<Vec<GraphqlErrorEntry>>,
}

#[derive(Debug, Deserialize)]
struct GraphqlErrorEntry {
    #[serde(default)]
    message: Option<String>,
}

#[derive(Debug, Deserialize)]
struct EntitiesData {
    #[serde(default)]
    entities: Option<EntityConnection>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct EntityConnection {
    #[serde(default)]
    page_info: Option<PageInfo>,
    #[serde(default)]
    edges: Option<Vec<Edge>>,
}

#[derive(Debug, Deserialize)]
struct Edge {
    #[serde(default)]
    node: Option<Entity>,
}

impl EntityPage {
    /// Decode a raw GraphQL response into a page
    ///
    /// Missing or null edge lists yield an empty page. GraphQL errors and a
    /// missing connection or `pageInfo` are failures.
    pub fn from_response(response: Value) -> Result<Self> {
        let envelope: GraphqlEnvelope = serde_json::from_value(response)
            .map_err(|e| IdentityError::malformed(e.to_string()))?;

        if let Some(errors) = envelope.errors.filter(|errors| !errors.is_empty()) {
            let message = errors
                .into_iter()
                .map(|e| e.message.unwrap_or_else(|| "unknown error".to_string()))
                .collect::<Vec<_>>()
                .join("; ");
            return Err(IdentityError::Graphql(message));
        }

        let connection = envelope
            .data
            .and_then(|data| data.entities)
            .ok_or_else(|| IdentityError::malformed("response has no data.entities"))?;

        let page_info = connection
            .page_info
            .ok_or_else(|| IdentityError::malformed("response has no entities.pageInfo"))?;

        let entities = connection
            .edges
            .unwrap_or_default()
            .into_iter()
            .filter_map(|edge| edge.node)
            .collect();

        Ok(Self {
            entities,
            page_info,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_variables_serialize_in_camel_case_with_null_cursor() {
        let variables =
            EntityQueryVariables::first_page(1000, vec![RiskFactorType::DuplicatePassword]);
        assert_eq!(
            serde_json::to_value(&variables).unwrap(),
            json!({ "first": 1000, "after": null, "riskFactors": ["DUPLICATE_PASSWORD"] })
        );
    }

    #[test]
    fn test_request_body_carries_query_document() {
        let body = EntityQueryVariables::first_page(10, vec![])
            .to_request_body()
            .unwrap();
        assert_eq!(body["query"], json!(ENTITY_QUERY));
        assert_eq!(body["variables"]["first"], json!(10));
    }

    #[test]
    fn test_query_requests_sort_and_fragments() {
        assert!(ENTITY_QUERY.contains("sortKey: RISK_SCORE, sortOrder: DESCENDING"));
        assert!(ENTITY_QUERY.contains("isAdmin: hasRole(type: AdminAccountRole)"));
        assert!(ENTITY_QUERY.contains("... on DuplicatePasswordRiskFactor"));
        assert!(ENTITY_QUERY.contains("... on AttackPathBasedRiskFactor"));
    }

    #[test]
    fn test_page_decodes_nodes_and_cursor() {
        let page = EntityPage::from_response(json!({
            "data": { "entities": {
                "pageInfo": { "hasNextPage": true, "endCursor": "c1" },
                "edges": [
                    { "node": { "entityId": "a", "primaryDisplayName": "A" } },
                    { "node": null },
                    { "node": { "entityId": "b", "primaryDisplayName": "B" } }
                ]
            } }
        }))
        .unwrap();

        assert_eq!(page.entities.len(), 2);
        assert_eq!(page.entities[1].entity_id, "b");
        assert!(page.page_info.has_next_page);
        assert_eq!(page.page_info.end_cursor.as_deref(), Some("c1"));
    }

    #[test]
    fn test_null_edges_is_an_empty_page() {
        let page = EntityPage::from_response(json!({
            "data": { "entities": { "pageInfo": { "hasNextPage": false, "endCursor": null }, "edges": null } }
        }))
        .unwrap();
        assert!(page.entities.is_empty());
        assert!(!page.page_info.has_next_page);
    }

    #[test]
    fn test_graphql_errors_fail_the_page() {
        let err = EntityPage::from_response(json!({
            "data": null,
            "errors": [{ "message": "insufficient scope" }, { "message": "second" }]
        }))
        .unwrap_err();
        match err {
            IdentityError::Graphql(message) => assert_eq!(message, "insufficient scope; second"),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_missing_connection_is_malformed() {
        let err = EntityPage::from_response(json!({ "data": { "entities": null } })).unwrap_err();
        assert!(matches!(err, IdentityError::MalformedResponse(_)));

        let err = EntityPage::from_response(json!({ "data": { "entities": { "edges": [] } } }))
            .unwrap_err();
        assert!(matches!(err, IdentityError::MalformedResponse(_)));
    }
}
