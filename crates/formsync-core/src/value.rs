//! Field value model
//!
//! A form field's value tagged with its provenance. The provenance decides
//! how the value is serialized into a mutation, so the two always travel
//! together in [`FieldValue`].
//!
//! Wire shape is `{source, value}`:
//!
//! ```text
//! {"source": null, "value": null}                                  Empty
//! {"source": {"type": "user"}, "value": ...}                       User
//! {"source": {"type": "schema"}, "value": ...}                     Schema
//! {"source": {"type": "profile", "label", "kind", "id"}, ...}      Profile
//! {"source": {"type": "pool", "label", "kind", "id"},
//!  "value": {"from_pool": {"id": ...}} | node}                     Pool
//! ```

use serde::{Deserialize, Serialize};
use serde_json::{Map as JsonMap, Number, Value as JsonValue};

use crate::error::FieldValueError;
use crate::node::NodeRef;

/// String, number or boolean attribute value
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Scalar {
    /// Boolean
    Boolean(bool),
    /// Integer or float
    Number(Number),
    /// Text
    String(String),
}

impl Scalar {
    /// Parse from JSON; `None` for null, arrays and objects
    #[must_use]
    pub fn from_json(value: &JsonValue) -> Option<Self> {
        match value {
            JsonValue::Bool(b) => Some(Self::Boolean(*b)),
            JsonValue::Number(n) => Some(Self::Number(n.clone())),
            JsonValue::String(s) => Some(Self::String(s.clone())),
            JsonValue::Null | JsonValue::Array(_) | JsonValue::Object(_) => None,
        }
    }

    /// JSON value
    #[must_use]
    pub fn to_json(&self) -> JsonValue {
        match self {
            Self::Boolean(b) => JsonValue::Bool(*b),
            Self::Number(n) => JsonValue::Number(n.clone()),
            Self::String(s) => JsonValue::String(s.clone()),
        }
    }

    /// Mutation value: the empty string means "no value"
    #[must_use]
    pub fn normalized(&self) -> JsonValue {
        match self {
            Self::String(s) if s.is_empty() => JsonValue::Null,
            other => other.to_json(),
        }
    }
}

impl From<&str> for Scalar {
    fn from(value: &str) -> Self {
        Self::String(value.to_string())
    }
}

impl From<String> for Scalar {
    fn from(value: String) -> Self {
        Self::String(value)
    }
}

impl From<bool> for Scalar {
    fn from(value: bool) -> Self {
        Self::Boolean(value)
    }
}

impl From<i64> for Scalar {
    fn from(value: i64) -> Self {
        Self::Number(value.into())
    }
}

impl From<u64> for Scalar {
    fn from(value: u64) -> Self {
        Self::Number(value.into())
    }
}

/// What a user entered in a field
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UserInput {
    /// Explicitly cleared
    Null,
    /// Attribute value
    Scalar(Scalar),
    /// Single related entity
    Node(NodeRef),
    /// Several related entities
    Nodes(Vec<NodeRef>),
}

impl UserInput {
    /// Parse from JSON
    ///
    /// # Errors
    /// Returns error for objects without a string `id`, or arrays holding one
    pub fn from_json(value: &JsonValue) -> Result<Self, FieldValueError> {
        match value {
            JsonValue::Null => Ok(Self::Null),
            JsonValue::Array(items) => items
                .iter()
                .map(|item| {
                    NodeRef::from_json(item).ok_or_else(|| {
                        FieldValueError::UnknownFieldShape(
                            "array item is not a node reference".to_string(),
                        )
                    })
                })
                .collect::<Result<Vec<_>, _>>()
                .map(Self::Nodes),
            JsonValue::Object(_) => NodeRef::from_json(value).map(Self::Node).ok_or_else(|| {
                FieldValueError::UnknownFieldShape("object is not a node reference".to_string())
            }),
            scalar => Ok(Self::Scalar(Scalar::from_json(scalar).ok_or_else(|| {
                FieldValueError::UnknownFieldShape("unreadable scalar".to_string())
            })?)),
        }
    }

    /// JSON value, nodes serialized in full
    #[must_use]
    pub fn to_json(&self) -> JsonValue {
        match self {
            Self::Null => JsonValue::Null,
            Self::Scalar(s) => s.to_json(),
            Self::Node(n) => node_json(n),
            Self::Nodes(ns) => JsonValue::Array(ns.iter().map(node_json).collect()),
        }
    }

    /// Short name of the shape, for diagnostics
    #[must_use]
    pub fn shape(&self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::Scalar(_) => "scalar",
            Self::Node(_) => "node",
            Self::Nodes(_) => "node list",
        }
    }
}

fn node_json(node: &NodeRef) -> JsonValue {
    serde_json::to_value(node).unwrap_or(JsonValue::Null)
}

impl From<Scalar> for UserInput {
    fn from(value: Scalar) -> Self {
        Self::Scalar(value)
    }
}

impl From<&str> for UserInput {
    fn from(value: &str) -> Self {
        Self::Scalar(value.into())
    }
}

impl From<String> for UserInput {
    fn from(value: String) -> Self {
        Self::Scalar(value.into())
    }
}

impl From<bool> for UserInput {
    fn from(value: bool) -> Self {
        Self::Scalar(value.into())
    }
}

impl From<i64> for UserInput {
    fn from(value: i64) -> Self {
        Self::Scalar(value.into())
    }
}

impl From<u64> for UserInput {
    fn from(value: u64) -> Self {
        Self::Scalar(value.into())
    }
}

impl From<NodeRef> for UserInput {
    fn from(value: NodeRef) -> Self {
        Self::Node(value)
    }
}

impl From<Vec<NodeRef>> for UserInput {
    fn from(value: Vec<NodeRef>) -> Self {
        Self::Nodes(value)
    }
}

/// Profile or pool a value came from
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceRef {
    /// Source id
    pub id: String,
    /// Source kind
    pub kind: String,
    /// Human-readable label
    #[serde(default)]
    pub label: Option<String>,
}

impl SourceRef {
    /// Create source reference
    #[must_use]
    pub fn new(id: impl Into<String>, kind: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            kind: kind.into(),
            label: None,
        }
    }

    /// With label
    #[inline]
    #[must_use]
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }
}

/// Value of a pool-sourced field, already in mutation shape
///
/// Both variants hold the object exactly as received; it is sent back
/// without being rewritten.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "JsonValue", into = "JsonValue")]
pub enum PoolValue {
    /// `{from_pool: {id, ...}}` allocation request
    FromPool(JsonMap<String, JsonValue>),
    /// Entity already allocated from the pool: an object with a string `id`
    Node(JsonMap<String, JsonValue>),
}

impl PoolValue {
    /// Request allocation from pool
    #[must_use]
    pub fn from_pool(pool_id: impl Into<String>) -> Self {
        let mut request = JsonMap::new();
        request.insert("id".to_string(), JsonValue::String(pool_id.into()));
        let mut value = JsonMap::new();
        value.insert("from_pool".to_string(), JsonValue::Object(request));
        Self::FromPool(value)
    }

    /// Id of the requested pool, or of the allocated entity
    #[must_use]
    pub fn id(&self) -> Option<&str> {
        match self {
            Self::FromPool(value) => value.get("from_pool")?.get("id")?.as_str(),
            Self::Node(value) => value.get("id")?.as_str(),
        }
    }

    /// JSON value, sent verbatim
    #[must_use]
    pub fn to_json(&self) -> JsonValue {
        match self {
            Self::FromPool(value) | Self::Node(value) => JsonValue::Object(value.clone()),
        }
    }
}

impl TryFrom<JsonValue> for PoolValue {
    type Error = FieldValueError;

    fn try_from(value: JsonValue) -> Result<Self, Self::Error> {
        let JsonValue::Object(object) = value else {
            return Err(FieldValueError::UnknownFieldShape(
                "pool value is not an object".to_string(),
            ));
        };

        if object.contains_key("from_pool") {
            let has_pool_id = object
                .get("from_pool")
                .and_then(|request| request.get("id"))
                .is_some_and(JsonValue::is_string);
            if has_pool_id {
                return Ok(Self::FromPool(object));
            }
            return Err(FieldValueError::UnknownFieldShape(
                "pool request without a string id".to_string(),
            ));
        }

        if object.get("id").is_some_and(JsonValue::is_string) {
            Ok(Self::Node(object))
        } else {
            Err(FieldValueError::UnknownFieldShape(
                "pool value is neither a pool request nor a node".to_string(),
            ))
        }
    }
}

impl From<PoolValue> for JsonValue {
    fn from(value: PoolValue) -> Self {
        match value {
            PoolValue::FromPool(object) | PoolValue::Node(object) => Self::Object(object),
        }
    }
}

/// Provenance tag of a [`FieldValue`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceType {
    /// Entered by the user
    User,
    /// Declared default of the schema
    Schema,
    /// Inherited from a profile
    Profile,
    /// Allocated from a resource pool
    Pool,
}

/// A form field's value and its provenance
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(try_from = "RawFieldValue", into = "RawFieldValue")]
pub enum FieldValue {
    /// No value; never sent
    #[default]
    Empty,
    /// Entered by the user
    User(UserInput),
    /// Declared default of the schema
    Schema(Option<Scalar>),
    /// Inherited from a profile
    Profile {
        /// Profile the value comes from
        source: SourceRef,
        /// Inherited value
        value: Option<Scalar>,
    },
    /// Allocated from a resource pool
    Pool {
        /// Pool the value comes from
        source: SourceRef,
        /// Allocation request or allocated entity
        value: PoolValue,
    },
}

impl FieldValue {
    /// User-entered value
    #[inline]
    #[must_use]
    pub fn user(input: impl Into<UserInput>) -> Self {
        Self::User(input.into())
    }

    /// Field explicitly cleared by the user
    #[inline]
    #[must_use]
    pub fn cleared() -> Self {
        Self::User(UserInput::Null)
    }

    /// Schema default value
    #[inline]
    #[must_use]
    pub fn schema(value: impl Into<Scalar>) -> Self {
        Self::Schema(Some(value.into()))
    }

    /// Profile-inherited value
    #[inline]
    #[must_use]
    pub fn profile(source: SourceRef, value: impl Into<Scalar>) -> Self {
        Self::Profile {
            source,
            value: Some(value.into()),
        }
    }

    /// Allocation request against a pool
    #[must_use]
    pub fn from_pool(source: SourceRef) -> Self {
        let value = PoolValue::from_pool(source.id.clone());
        Self::Pool { source, value }
    }

    /// Parse from the `{source, value}` wire shape
    ///
    /// # Errors
    /// Returns error if the value doesn't fit any provenance
    pub fn from_json(value: &JsonValue) -> Result<Self, FieldValueError> {
        serde_json::from_value(value.clone())
            .map_err(|e| FieldValueError::UnknownFieldShape(e.to_string()))
    }

    /// `{source, value}` wire shape
    #[must_use]
    pub fn to_json(&self) -> JsonValue {
        serde_json::to_value(self).unwrap_or(JsonValue::Null)
    }

    /// Provenance, `None` for [`FieldValue::Empty`]
    #[must_use]
    pub fn source_type(&self) -> Option<SourceType> {
        match self {
            Self::Empty => None,
            Self::User(_) => Some(SourceType::User),
            Self::Schema(_) => Some(SourceType::Schema),
            Self::Profile { .. } => Some(SourceType::Profile),
            Self::Pool { .. } => Some(SourceType::Pool),
        }
    }

    /// Pool id when the value comes from a pool
    #[must_use]
    pub fn pool_id(&self) -> Option<&str> {
        match self {
            Self::Pool { source, .. } => Some(&source.id),
            _ => None,
        }
    }

    /// Whether this is [`FieldValue::Empty`]
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        matches!(self, Self::Empty)
    }

    /// Bare value, as the form control holds it
    #[must_use]
    pub fn value_json(&self) -> JsonValue {
        match self {
            Self::Empty => JsonValue::Null,
            Self::User(input) => input.to_json(),
            Self::Schema(value) | Self::Profile { value, .. } => scalar_json(value.as_ref()),
            Self::Pool { value, .. } => value.to_json(),
        }
    }
}

fn scalar_json(value: Option<&Scalar>) -> JsonValue {
    value.map_or(JsonValue::Null, Scalar::to_json)
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
enum RawSource {
    User,
    Schema,
    Profile(SourceRef),
    Pool(SourceRef),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct RawFieldValue {
    source: Option<RawSource>,
    #[serde(default)]
    value: JsonValue,
}

fn optional_scalar(value: &JsonValue) -> Result<Option<Scalar>, FieldValueError> {
    if value.is_null() {
        return Ok(None);
    }
    Scalar::from_json(value).map(Some).ok_or_else(|| {
        FieldValueError::UnknownFieldShape("expected a string, number or boolean".to_string())
    })
}

impl TryFrom<RawFieldValue> for FieldValue {
    type Error = FieldValueError;

    fn try_from(raw: RawFieldValue) -> Result<Self, Self::Error> {
        match raw.source {
            None if raw.value.is_null() => Ok(Self::Empty),
            None => Err(FieldValueError::ValueWithoutSource),
            Some(RawSource::User) => UserInput::from_json(&raw.value).map(Self::User),
            Some(RawSource::Schema) => optional_scalar(&raw.value).map(Self::Schema),
            Some(RawSource::Profile(source)) => Ok(Self::Profile {
                source,
                value: optional_scalar(&raw.value)?,
            }),
            Some(RawSource::Pool(source)) => Ok(Self::Pool {
                source,
                value: PoolValue::try_from(raw.value)?,
            }),
        }
    }
}

impl From<FieldValue> for RawFieldValue {
    fn from(field: FieldValue) -> Self {
        let value = field.value_json();
        let source = match field {
            FieldValue::Empty => None,
            FieldValue::User(_) => Some(RawSource::User),
            FieldValue::Schema(_) => Some(RawSource::Schema),
            FieldValue::Profile { source, .. } => Some(RawSource::Profile(source)),
            FieldValue::Pool { source, .. } => Some(RawSource::Pool(source)),
        };
        Self { source, value }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn empty_string_normalizes_to_null() {
        assert_eq!(Scalar::from("").normalized(), JsonValue::Null);
        assert_eq!(Scalar::from("x").normalized(), json!("x"));
        assert_eq!(Scalar::from(false).normalized(), json!(false));
        assert_eq!(Scalar::from(0_i64).normalized(), json!(0));
    }

    #[test]
    fn parse_empty() {
        let value = FieldValue::from_json(&json!({"source": null, "value": null})).unwrap();
        assert!(value.is_empty());
        assert_eq!(value.source_type(), None);
    }

    #[test]
    fn value_without_source_rejected() {
        let err = FieldValue::from_json(&json!({"source": null, "value": true})).unwrap_err();
        assert!(err.to_string().contains("without a source"));
    }

    #[test]
    fn parse_user_shapes() {
        let scalar = FieldValue::from_json(&json!({"source": {"type": "user"}, "value": 42}))
            .unwrap();
        assert_eq!(scalar, FieldValue::user(42_i64));

        let node = FieldValue::from_json(&json!({
            "source": {"type": "user"},
            "value": {"id": "s1", "display_label": "Paris", "__typename": "LocationSite"}
        }))
        .unwrap();
        assert_eq!(
            node,
            FieldValue::user(NodeRef::new("s1").with_label("Paris").with_kind("LocationSite"))
        );

        let nodes = FieldValue::from_json(&json!({
            "source": {"type": "user"},
            "value": [{"id": "a"}, {"id": "b"}]
        }))
        .unwrap();
        assert_eq!(
            nodes,
            FieldValue::user(vec![NodeRef::new("a"), NodeRef::new("b")])
        );

        let cleared =
            FieldValue::from_json(&json!({"source": {"type": "user"}, "value": null})).unwrap();
        assert_eq!(cleared, FieldValue::cleared());
    }

    #[test]
    fn user_array_of_scalars_rejected() {
        assert!(
            FieldValue::from_json(&json!({"source": {"type": "user"}, "value": ["a"]})).is_err()
        );
    }

    #[test]
    fn unknown_source_type_rejected() {
        assert!(
            FieldValue::from_json(&json!({"source": {"type": "magic"}, "value": 1})).is_err()
        );
    }

    #[test]
    fn parse_profile() {
        let value = FieldValue::from_json(&json!({
            "source": {"type": "profile", "label": "Edge", "kind": "ProfileInfraDevice", "id": "p1"},
            "value": "edge-01"
        }))
        .unwrap();
        assert_eq!(value.source_type(), Some(SourceType::Profile));
        assert_eq!(
            value,
            FieldValue::profile(
                SourceRef::new("p1", "ProfileInfraDevice").with_label("Edge"),
                "edge-01"
            )
        );
    }

    #[test]
    fn parse_pool_request_and_node() {
        let request = FieldValue::from_json(&json!({
            "source": {"type": "pool", "label": "ASN pool", "kind": "CoreNumberPool", "id": "pool-1"},
            "value": {"from_pool": {"id": "pool-1"}}
        }))
        .unwrap();
        assert_eq!(request.pool_id(), Some("pool-1"));
        assert_eq!(
            request.value_json(),
            json!({"from_pool": {"id": "pool-1"}})
        );

        let node = FieldValue::from_json(&json!({
            "source": {"type": "pool", "label": null, "kind": "CoreIPAddressPool", "id": "pool-2"},
            "value": {"id": "ip-1", "display_label": "10.0.0.1/32"}
        }))
        .unwrap();
        assert!(matches!(
            node,
            FieldValue::Pool { value: PoolValue::Node(_), .. }
        ));
    }

    #[test]
    fn pool_request_extra_keys_pass_through() {
        let raw = json!({
            "source": {"type": "pool", "label": null, "kind": "CoreIPPrefixPool", "id": "pool-3"},
            "value": {"from_pool": {"id": "pool-3", "data": {"prefix_length": 24}}}
        });
        let value = FieldValue::from_json(&raw).unwrap();
        assert_eq!(value.value_json(), raw["value"]);
    }

    #[test]
    fn allocated_pool_node_kept_as_received() {
        let raw = json!({
            "source": {"type": "pool", "label": "IP pool", "kind": "CoreIPAddressPool", "id": "pool-2"},
            "value": {
                "id": "ip-1",
                "display_label": null,
                "__typename": "IpamIPAddress",
                "address": {"value": "10.0.0.1/32"}
            }
        });
        let value = FieldValue::from_json(&raw).unwrap();
        assert_eq!(value.value_json(), raw["value"]);
        assert_eq!(value.to_json(), raw);

        let FieldValue::Pool { value: pool, .. } = value else {
            panic!("expected a pool value");
        };
        assert_eq!(pool.id(), Some("ip-1"));
    }

    #[test]
    fn pool_value_without_id_rejected() {
        let source = json!({"type": "pool", "label": null, "kind": "CoreNumberPool", "id": "p"});
        for value in [
            json!({"display_label": "no id"}),
            json!({"from_pool": {"size": 1}}),
            json!({"id": 7}),
            json!("pool-1"),
        ] {
            assert!(
                FieldValue::from_json(&json!({"source": source, "value": value})).is_err(),
                "accepted {value}"
            );
        }
    }

    #[test]
    fn wire_shape_is_preserved() {
        let raw = json!({
            "source": {"type": "profile", "label": "Edge", "kind": "ProfileInfraDevice", "id": "p1"},
            "value": "edge-01"
        });
        let value = FieldValue::from_json(&raw).unwrap();
        assert_eq!(value.to_json(), raw);
        assert_eq!(
            FieldValue::Empty.to_json(),
            json!({"source": null, "value": null})
        );
    }
}
