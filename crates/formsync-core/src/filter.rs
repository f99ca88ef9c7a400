//! Filter reconciliation
//!
//! Query-string filters arrive as `{name: "<field>__<key>", value}`. This
//! module turns them into attribute and relationship objects shaped like
//! the ones a query returns, so filter forms can reuse object form fields.

use formsync_schema::{Cardinality, ObjectSchema, RelationshipSchema};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

use crate::error::{FieldIssue, IssueKind, ReconcileError};

/// Separator between field name and key in a filter name
pub const FILTER_SEPARATOR: &str = "__";

/// One query-string filter
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Filter {
    /// `<field>__value` or `<field>__ids`
    pub name: String,
    /// Attribute value, or the related ids
    pub value: JsonValue,
}

impl Filter {
    /// Create filter
    #[must_use]
    pub fn new(name: impl Into<String>, value: JsonValue) -> Self {
        Self {
            name: name.into(),
            value,
        }
    }

    /// Field name and key, split on the first separator
    #[must_use]
    pub fn parts(&self) -> Option<(&str, &str)> {
        self.name.split_once(FILTER_SEPARATOR)
    }
}

/// Related entity inside a relationship filter
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterNode {
    /// Entity id
    pub id: String,
    /// Label, empty when the filter doesn't carry one
    pub display_label: String,
    /// Peer kind of the relationship
    #[serde(rename = "__typename")]
    pub typename: String,
}

/// Edge wrapper of a many-cardinality relationship
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterEdge {
    /// Related entity
    pub node: FilterNode,
}

/// Reconciled filter, shaped like the field of a queried object
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FilterObject {
    /// `{value}`
    Attribute {
        /// Filtered value
        value: JsonValue,
    },
    /// `{node}`
    RelationshipOne {
        /// Related entity
        node: FilterNode,
    },
    /// `{edges: [{node}]}`
    RelationshipMany {
        /// Related entities
        edges: Vec<FilterEdge>,
    },
}

/// Reconciled filters keyed by field name
pub type FilterMap = IndexMap<String, FilterObject>;

fn id_and_label(item: &JsonValue) -> Option<(String, String)> {
    match item {
        JsonValue::String(id) => Some((id.clone(), String::new())),
        JsonValue::Object(object) => {
            let id = object.get("id")?.as_str()?.to_string();
            let label = object
                .get("display_label")
                .and_then(JsonValue::as_str)
                .unwrap_or_default()
                .to_string();
            Some((id, label))
        }
        _ => None,
    }
}

fn relationship_filter(
    relationship: &RelationshipSchema,
    value: &JsonValue,
) -> Result<FilterObject, IssueKind> {
    let node = |(id, display_label): (String, String)| FilterNode {
        id,
        display_label,
        typename: relationship.peer.clone(),
    };

    match relationship.cardinality {
        Cardinality::Many => {
            let items = value.as_array().ok_or(IssueKind::MalformedFilterValue)?;
            let edges = items
                .iter()
                .filter_map(id_and_label)
                .map(|pair| FilterEdge { node: node(pair) })
                .collect();
            Ok(FilterObject::RelationshipMany { edges })
        }
        Cardinality::One => {
            let first = match value {
                JsonValue::Array(items) => items.first(),
                JsonValue::String(_) => Some(value),
                _ => None,
            };
            let (id, _) = first
                .and_then(id_and_label)
                .ok_or(IssueKind::MalformedFilterValue)?;
            Ok(FilterObject::RelationshipOne {
                node: node((id, String::new())),
            })
        }
    }
}

fn reconcile(schema: &ObjectSchema, filter: &Filter) -> Result<(String, FilterObject), IssueKind> {
    let (field_name, field_key) = filter
        .parts()
        .ok_or_else(|| IssueKind::UnsupportedFilterKey(String::new()))?;

    let object = match field_key {
        "value" => FilterObject::Attribute {
            value: filter.value.clone(),
        },
        "ids" => {
            let relationship = schema
                .relationship(field_name)
                .ok_or(IssueKind::MissingRelationshipSchema)?;
            relationship_filter(relationship, &filter.value)?
        }
        other => return Err(IssueKind::UnsupportedFilterKey(other.to_string())),
    };

    Ok((field_name.to_string(), object))
}

fn collect(schema: &ObjectSchema, filters: &[Filter], issues: &mut Vec<FieldIssue>) -> FilterMap {
    let mut map = FilterMap::new();

    for filter in filters {
        match reconcile(schema, filter) {
            // Later filters on the same field replace earlier ones
            Ok((name, object)) => {
                map.insert(name, object);
            }
            Err(kind) => {
                tracing::debug!(filter = %filter.name, issue = %kind, "filter dropped");
                issues.push(FieldIssue::new(&filter.name, kind));
            }
        }
    }

    map
}

/// Reconcile filters against `schema`
///
/// - `<field>__value` becomes `{value}`
/// - `<field>__ids` becomes `{edges: [{node}]}` or `{node}` depending on
///   the relationship's cardinality, with `__typename` set to its peer
///
/// Filters with any other key, or naming an undeclared relationship, are
/// dropped. One entry per field name; the last filter wins.
#[must_use]
pub fn filters_to_object(schema: &ObjectSchema, filters: &[Filter]) -> FilterMap {
    collect(schema, filters, &mut Vec::new())
}

/// Strict [`filters_to_object`]
///
/// # Errors
/// Returns every filter that would have been dropped
pub fn try_filters_to_object(
    schema: &ObjectSchema,
    filters: &[Filter],
) -> Result<FilterMap, ReconcileError> {
    let mut issues = Vec::new();
    let map = collect(schema, filters, &mut issues);
    ReconcileError::check(issues)?;
    Ok(map)
}
