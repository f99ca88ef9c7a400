//! Form state
//!
//! [`FormData`] holds the current value of every field. The initializers
//! build the values a form opens with, from schema defaults or from the
//! object being edited.

use formsync_schema::{AttributeSchema, ObjectSchema, RelationshipSchema};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::{Map as JsonMap, Value as JsonValue};

use crate::error::{FieldIssue, ReconcileError};
use crate::field::FieldDescriptor;
use crate::node::NodeRef;
use crate::value::{FieldValue, Scalar, SourceRef, UserInput};

/// Current value of each field, in form order
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FormData(IndexMap<String, FieldValue>);

impl FormData {
    /// Create empty form data
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// With field value
    #[must_use]
    pub fn with(mut self, name: impl Into<String>, value: FieldValue) -> Self {
        self.0.insert(name.into(), value);
        self
    }

    /// Set field value
    pub fn insert(&mut self, name: impl Into<String>, value: FieldValue) -> Option<FieldValue> {
        self.0.insert(name.into(), value)
    }

    /// Value of field
    #[inline]
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&FieldValue> {
        self.0.get(name)
    }

    /// Iterate in form order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &FieldValue)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Field names, in form order
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    /// Number of fields
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Check if no field is set
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Parse a `{name: {source, value}}` object, keeping every readable entry
    ///
    /// Entries that fit no provenance are left out and reported back.
    /// A non-object input yields empty form data and no issues.
    #[must_use]
    pub fn from_json_lenient(value: &JsonValue) -> (Self, Vec<FieldIssue>) {
        let mut data = Self::new();
        let mut issues = Vec::new();

        let Some(object) = value.as_object() else {
            tracing::debug!("form data is not an object; nothing to read");
            return (data, issues);
        };

        for (name, raw) in object {
            match FieldValue::from_json(raw) {
                Ok(field_value) => {
                    data.insert(name.clone(), field_value);
                }
                Err(err) => {
                    tracing::debug!(field = %name, error = %err, "unreadable form value omitted");
                    issues.push((name.clone(), err).into());
                }
            }
        }

        (data, issues)
    }

    /// Parse a `{name: {source, value}}` object, failing on any unreadable entry
    ///
    /// # Errors
    /// Returns every entry that fits no provenance
    pub fn from_json_strict(value: &JsonValue) -> Result<Self, ReconcileError> {
        let (data, issues) = Self::from_json_lenient(value);
        ReconcileError::check(issues)?;
        Ok(data)
    }
}

impl FromIterator<(String, FieldValue)> for FormData {
    fn from_iter<I: IntoIterator<Item = (String, FieldValue)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl<'a> IntoIterator for &'a FormData {
    type Item = (&'a String, &'a FieldValue);
    type IntoIter = indexmap::map::Iter<'a, String, FieldValue>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

fn flag(data: &JsonValue, key: &str) -> bool {
    data.get(key).and_then(JsonValue::as_bool).unwrap_or(false)
}

/// Profile that supplied an attribute's value, from the attribute's `source`
fn profile_source(data: &JsonValue) -> Option<SourceRef> {
    let node = NodeRef::from_json(data.get("source")?)?;
    Some(SourceRef {
        id: node.id,
        kind: node.kind.unwrap_or_default(),
        label: node.display_label,
    })
}

/// Value an attribute field opens with
///
/// `current` is the attribute as returned for the object being edited
/// (`{value, is_default, is_from_profile, source}`); `None` on create forms.
#[must_use]
pub fn initial_attribute_value(attribute: &AttributeSchema, current: Option<&JsonValue>) -> FieldValue {
    let Some(data) = current else {
        return attribute
            .default_value
            .as_ref()
            .and_then(Scalar::from_json)
            .map_or(FieldValue::Empty, |v| FieldValue::Schema(Some(v)));
    };

    let value = data.get("value").and_then(Scalar::from_json);

    if flag(data, "is_from_profile") {
        if let Some(source) = profile_source(data) {
            return FieldValue::Profile { source, value };
        }
    }

    if flag(data, "is_default") {
        return FieldValue::Schema(value);
    }

    value.map_or(FieldValue::Empty, |v| FieldValue::User(UserInput::Scalar(v)))
}

/// Value a relationship field opens with
///
/// `current` is the relationship as returned for the object being edited:
/// `{node}` for cardinality one, `{edges: [{node}]}` for many.
#[must_use]
pub fn initial_relationship_value(
    relationship: &RelationshipSchema,
    current: Option<&JsonValue>,
) -> FieldValue {
    let Some(data) = current else {
        return FieldValue::Empty;
    };

    if relationship.cardinality.is_many() {
        let nodes: Vec<NodeRef> = data
            .get("edges")
            .and_then(JsonValue::as_array)
            .map(|edges| {
                edges
                    .iter()
                    .filter_map(|edge| edge.get("node").and_then(NodeRef::from_json))
                    .collect()
            })
            .unwrap_or_default();

        if nodes.is_empty() {
            FieldValue::Empty
        } else {
            FieldValue::User(UserInput::Nodes(nodes))
        }
    } else {
        data.get("node")
            .and_then(NodeRef::from_json)
            .map_or(FieldValue::Empty, |node| FieldValue::User(UserInput::Node(node)))
    }
}

/// Descriptors for every form field of `schema`, with their opening values
///
/// Read-only attributes and relationships managed outside object forms
/// (groups, hierarchy, profiles) are left out.
#[must_use]
pub fn fields_for_schema(
    schema: &ObjectSchema,
    current_object: Option<&JsonMap<String, JsonValue>>,
) -> Vec<FieldDescriptor> {
    let attributes = schema
        .attributes
        .iter()
        .filter(|a| !a.read_only)
        .map(|a| {
            let current = current_object.and_then(|o| o.get(&a.name));
            FieldDescriptor::from_attribute(a).with_default(initial_attribute_value(a, current))
        });

    let relationships = schema
        .relationships
        .iter()
        .filter(|r| !r.read_only && r.kind.is_form_field())
        .map(|r| {
            let current = current_object.and_then(|o| o.get(&r.name));
            FieldDescriptor::from_relationship(r).with_default(initial_relationship_value(r, current))
        });

    attributes.chain(relationships).collect()
}

/// Form data a form opens with: each field's opening value
#[must_use]
pub fn initial_form_data(fields: &[FieldDescriptor]) -> FormData {
    fields
        .iter()
        .map(|f| (f.name.clone(), f.default_value.clone().unwrap_or_default()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use formsync_schema::{Cardinality, RelationshipKind};
    use serde_json::json;

    #[test]
    fn lenient_parse_reports_bad_entries() {
        let (data, issues) = FormData::from_json_lenient(&json!({
            "name": {"source": {"type": "user"}, "value": "edge-01"},
            "enabled": {"source": null, "value": true},
            "site": {"source": null, "value": null}
        }));
        assert_eq!(data.len(), 2);
        assert_eq!(data.names().collect::<Vec<_>>(), vec!["name", "site"]);
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].field, "enabled");
    }

    #[test]
    fn strict_parse_fails_on_bad_entries() {
        let err = FormData::from_json_strict(&json!({
            "enabled": {"source": null, "value": true}
        }))
        .unwrap_err();
        assert_eq!(err.issues()[0].field, "enabled");
    }

    #[test]
    fn attribute_without_current_uses_schema_default() {
        let attr = AttributeSchema::new("mtu", "Number").with_default(1500);
        assert_eq!(initial_attribute_value(&attr, None), FieldValue::schema(1500_i64));

        let bare = AttributeSchema::new("description", "Text");
        assert_eq!(initial_attribute_value(&bare, None), FieldValue::Empty);
    }

    #[test]
    fn attribute_from_profile() {
        let attr = AttributeSchema::new("mtu", "Number");
        let current = json!({
            "value": 9000,
            "is_default": false,
            "is_from_profile": true,
            "source": {"id": "p1", "display_label": "Jumbo", "__typename": "ProfileInfraInterface"}
        });
        assert_eq!(
            initial_attribute_value(&attr, Some(&current)),
            FieldValue::profile(
                SourceRef::new("p1", "ProfileInfraInterface").with_label("Jumbo"),
                9000_i64
            )
        );
    }

    #[test]
    fn attribute_default_and_user_values() {
        let attr = AttributeSchema::new("mtu", "Number");
        let default = json!({"value": 1500, "is_default": true, "is_from_profile": false});
        assert_eq!(
            initial_attribute_value(&attr, Some(&default)),
            FieldValue::schema(1500_i64)
        );

        let user = json!({"value": 9000, "is_default": false});
        assert_eq!(initial_attribute_value(&attr, Some(&user)), FieldValue::user(9000_i64));

        let null = json!({"value": null});
        assert_eq!(initial_attribute_value(&attr, Some(&null)), FieldValue::Empty);
    }

    #[test]
    fn relationship_values() {
        let one = RelationshipSchema::new("site", "LocationSite", Cardinality::One);
        let current = json!({"node": {"id": "s1", "display_label": "Paris"}});
        assert_eq!(
            initial_relationship_value(&one, Some(&current)),
            FieldValue::user(NodeRef::new("s1").with_label("Paris"))
        );
        assert_eq!(
            initial_relationship_value(&one, Some(&json!({"node": null}))),
            FieldValue::Empty
        );

        let many = RelationshipSchema::new("tags", "BuiltinTag", Cardinality::Many);
        let current = json!({"edges": [{"node": {"id": "t1"}}, {"node": {"id": "t2"}}]});
        assert_eq!(
            initial_relationship_value(&many, Some(&current)),
            FieldValue::user(vec![NodeRef::new("t1"), NodeRef::new("t2")])
        );
        assert_eq!(
            initial_relationship_value(&many, Some(&json!({"edges": []}))),
            FieldValue::Empty
        );
    }

    #[test]
    fn fields_skip_read_only_and_non_form_relationships() {
        let schema = ObjectSchema::new("Infra", "Device")
            .with_attribute(AttributeSchema::new("name", "Text"))
            .with_attribute(AttributeSchema::new("checksum", "Text").read_only())
            .with_relationship(RelationshipSchema::new("site", "LocationSite", Cardinality::One))
            .with_relationship(
                RelationshipSchema::new("member_of_groups", "CoreGroup", Cardinality::Many)
                    .with_kind(RelationshipKind::Group),
            );

        let fields = fields_for_schema(&schema, None);
        let names: Vec<&str> = fields.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, vec!["name", "site"]);

        let data = initial_form_data(&fields);
        assert_eq!(data.get("name"), Some(&FieldValue::Empty));
    }
}
