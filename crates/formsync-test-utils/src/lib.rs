//! Testing utilities for formsync workspace
//!
//! Shared schema fixtures, form value builders and proptest strategies.

#![allow(missing_docs)]

use formsync_core::{
    FieldDescriptor, FieldValue, NodeRef, PermissionDecision, Scalar, SourceRef,
    UserInput,
};
use formsync_schema::{
    AttributeSchema, Cardinality, ObjectSchema, RelationshipKind, RelationshipSchema,
    SchemaRegistry,
};
use proptest::prelude::*;

pub const DEVICE_KIND: &str = "InfraDevice";

/// Generic every device inherits from
pub fn endpoint_generic() -> ObjectSchema {
    ObjectSchema::new("Infra", "Endpoint")
        .with_attribute(AttributeSchema::new("mtu", "Number").with_default(1500))
        .with_relationship(RelationshipSchema::new("tags", "BuiltinTag", Cardinality::Many))
}

/// Device node: attributes, one/many relationships, a group relationship
pub fn device_schema() -> ObjectSchema {
    ObjectSchema::new("Infra", "Device")
        .with_attribute(AttributeSchema::new("name", "Text"))
        .with_attribute(AttributeSchema::new("description", "Text").optional())
        .with_attribute(AttributeSchema::new("asn", "Number").optional())
        .with_attribute(AttributeSchema::new("role", "Dropdown").with_default("edge"))
        .with_attribute(AttributeSchema::new("checksum", "Text").read_only())
        .with_relationship(
            RelationshipSchema::new("site", "LocationSite", Cardinality::One)
                .with_kind(RelationshipKind::Attribute),
        )
        .with_relationship(
            RelationshipSchema::new("member_of_groups", "CoreStandardGroup", Cardinality::Many)
                .with_kind(RelationshipKind::Group),
        )
        .inheriting("InfraEndpoint")
}

pub fn device_registry() -> SchemaRegistry {
    let mut registry = SchemaRegistry::new();
    registry.register_generic(endpoint_generic()).unwrap();
    registry.register_node(device_schema()).unwrap();
    registry
}

/// Device schema with generic fields merged in
pub fn resolved_device_schema() -> ObjectSchema {
    device_registry().resolve(DEVICE_KIND).unwrap()
}

/// Existing device as returned by an object query
pub fn current_device() -> serde_json::Value {
    serde_json::json!({
        "id": "dev-1",
        "name": {"value": "edge-01", "is_default": false, "is_from_profile": false},
        "description": {"value": null, "is_default": false, "is_from_profile": false},
        "asn": {"value": 65000, "is_default": false, "is_from_profile": false},
        "role": {"value": "edge", "is_default": true, "is_from_profile": false},
        "mtu": {
            "value": 9000,
            "is_default": false,
            "is_from_profile": true,
            "source": {"id": "prof-1", "display_label": "Jumbo", "__typename": "ProfileInfraDevice"}
        },
        "site": {"node": {"id": "site-1", "display_label": "Paris", "__typename": "LocationSite"}},
        "tags": {"edges": [
            {"node": {"id": "tag-1", "display_label": "red", "__typename": "BuiltinTag"}},
            {"node": {"id": "tag-2", "display_label": "blue", "__typename": "BuiltinTag"}}
        ]}
    })
}

pub fn number_pool(id: &str) -> FieldValue {
    FieldValue::from_pool(SourceRef::new(id, "CoreNumberPool").with_label("ASN pool"))
}

pub fn node(id: &str) -> NodeRef {
    NodeRef::new(id)
}

pub fn attribute_field(name: &str) -> FieldDescriptor {
    FieldDescriptor::attribute(name, "Text")
}

pub fn many_field(name: &str) -> FieldDescriptor {
    FieldDescriptor::relationship(name, "BuiltinTag", Cardinality::Many)
}

pub fn one_field(name: &str) -> FieldDescriptor {
    FieldDescriptor::relationship(name, "LocationSite", Cardinality::One)
}

pub fn arb_decision() -> impl Strategy<Value = Option<PermissionDecision>> {
    prop_oneof![
        Just(None),
        Just(Some(PermissionDecision::Allow)),
        Just(Some(PermissionDecision::AllowDefault)),
        Just(Some(PermissionDecision::AllowOther)),
        Just(Some(PermissionDecision::Deny)),
    ]
}

pub fn arb_scalar() -> impl Strategy<Value = Scalar> {
    prop_oneof![
        any::<bool>().prop_map(Scalar::from),
        any::<i64>().prop_map(Scalar::from),
        "[a-z0-9 ]{0,12}".prop_map(Scalar::from),
    ]
}

pub fn arb_node() -> impl Strategy<Value = NodeRef> {
    (
        "[a-z0-9]{1,8}",
        proptest::option::of("[A-Za-z ]{0,8}"),
        proptest::option::of("[A-Z][A-Za-z]{1,12}"),
    )
        .prop_map(|(id, display_label, kind)| NodeRef {
            id,
            display_label,
            kind,
        })
}

pub fn arb_source() -> impl Strategy<Value = SourceRef> {
    ("[a-z0-9-]{1,8}", "[A-Za-z]{1,12}").prop_map(|(id, kind)| SourceRef::new(id, kind))
}

fn arb_label() -> impl Strategy<Value = serde_json::Value> {
    prop_oneof![
        Just(serde_json::Value::Null),
        "[A-Za-z0-9./ ]{0,12}".prop_map(serde_json::Value::from),
    ]
}

fn arb_extra() -> impl Strategy<Value = serde_json::Map<String, serde_json::Value>> {
    proptest::collection::btree_map(
        "x_[a-z]{1,6}",
        prop_oneof![
            Just(serde_json::Value::Null),
            any::<i64>().prop_map(serde_json::Value::from),
            "[a-z]{0,6}".prop_map(serde_json::Value::from),
        ],
        0..3,
    )
    .prop_map(|extra| extra.into_iter().collect())
}

/// Pool-sourced field in its `{source, value}` wire shape
///
/// The value is either an allocation request or an allocated node carrying
/// `__typename`, a possibly-null label and arbitrary extra keys.
pub fn arb_pool_wire() -> impl Strategy<Value = serde_json::Value> {
    let request = (arb_extra(), arb_extra()).prop_map(|(request_extra, outer_extra)| {
        (request_extra, outer_extra, None::<(String, serde_json::Value, String)>)
    });
    let node = (
        "[a-z0-9-]{1,8}",
        arb_label(),
        "[A-Z][A-Za-z]{1,12}",
        arb_extra(),
    )
        .prop_map(|(id, label, typename, extra)| {
            (serde_json::Map::new(), extra, Some((id, label, typename)))
        });

    (arb_source(), arb_label(), prop_oneof![request, node]).prop_map(
        |(source, source_label, (request_extra, mut value, node))| {
            match node {
                Some((id, label, typename)) => {
                    value.insert("id".to_string(), id.into());
                    value.insert("display_label".to_string(), label);
                    value.insert("__typename".to_string(), typename.into());
                }
                None => {
                    let mut request = request_extra;
                    request.insert("id".to_string(), source.id.clone().into());
                    value.insert("from_pool".to_string(), request.into());
                }
            }
            serde_json::json!({
                "source": {
                    "type": "pool",
                    "id": source.id,
                    "kind": source.kind,
                    "label": source_label,
                },
                "value": value,
            })
        },
    )
}

/// Pool-sourced field value, parsed from [`arb_pool_wire`]
pub fn arb_pool_value() -> impl Strategy<Value = FieldValue> {
    arb_pool_wire().prop_map(|wire| FieldValue::from_json(&wire).unwrap())
}

/// Any well-formed field value
pub fn arb_field_value() -> impl Strategy<Value = FieldValue> {
    prop_oneof![
        Just(FieldValue::Empty),
        Just(FieldValue::User(UserInput::Null)),
        arb_scalar().prop_map(|s| FieldValue::User(UserInput::Scalar(s))),
        arb_node().prop_map(|n| FieldValue::User(UserInput::Node(n))),
        proptest::collection::vec(arb_node(), 0..4)
            .prop_map(|ns| FieldValue::User(UserInput::Nodes(ns))),
        proptest::option::of(arb_scalar()).prop_map(FieldValue::Schema),
        (arb_source(), proptest::option::of(arb_scalar()))
            .prop_map(|(source, value)| FieldValue::Profile { source, value }),
        arb_pool_value(),
    ]
}

/// Any field descriptor
pub fn arb_field(name: String) -> impl Strategy<Value = FieldDescriptor> {
    prop_oneof![
        Just(attribute_field(&name)),
        Just(one_field(&name)),
        Just(many_field(&name)),
    ]
}
