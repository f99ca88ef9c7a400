//! Schema registry
//!
//! Provides [`SchemaRegistry`], a read-only lookup of node and generic
//! definitions by kind, with inheritance resolved on demand.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::error::SchemaError;
use crate::types::ObjectSchema;

/// Serialized schema document, as served by the schema API
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SchemaDocument {
    /// Concrete node definitions
    #[serde(default)]
    pub nodes: Vec<ObjectSchema>,
    /// Abstract generic definitions
    #[serde(default)]
    pub generics: Vec<ObjectSchema>,
}

/// Registry of node and generic schemas keyed by kind
#[derive(Debug, Default, Clone)]
pub struct SchemaRegistry {
    nodes: HashMap<String, ObjectSchema>,
    generics: HashMap<String, ObjectSchema>,
}

impl SchemaRegistry {
    /// Create new empty registry
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Build registry from a parsed document
    ///
    /// # Errors
    /// Returns error if two definitions share a kind
    pub fn from_document(document: SchemaDocument) -> Result<Self, SchemaError> {
        let mut registry = Self::new();
        for generic in document.generics {
            registry.register_generic(generic)?;
        }
        for node in document.nodes {
            registry.register_node(node)?;
        }
        tracing::debug!(
            nodes = registry.nodes.len(),
            generics = registry.generics.len(),
            "schema registry loaded"
        );
        Ok(registry)
    }

    /// Parse registry from a JSON document
    ///
    /// # Errors
    /// Returns error if JSON is invalid or kinds are duplicated
    pub fn from_json(json: &str) -> Result<Self, SchemaError> {
        let document: SchemaDocument = serde_json::from_str(json)?;
        Self::from_document(document)
    }

    /// Parse registry from a YAML document
    ///
    /// # Errors
    /// Returns error if YAML is invalid or kinds are duplicated
    pub fn from_yaml(yaml: &str) -> Result<Self, SchemaError> {
        let document: SchemaDocument = serde_yaml::from_str(yaml)?;
        Self::from_document(document)
    }

    /// Register a node definition
    ///
    /// # Errors
    /// Returns error if the kind is already registered
    pub fn register_node(&mut self, schema: ObjectSchema) -> Result<(), SchemaError> {
        if self.contains(&schema.kind) {
            return Err(SchemaError::DuplicateKind(schema.kind));
        }
        self.nodes.insert(schema.kind.clone(), schema);
        Ok(())
    }

    /// Register a generic definition
    ///
    /// # Errors
    /// Returns error if the kind is already registered
    pub fn register_generic(&mut self, schema: ObjectSchema) -> Result<(), SchemaError> {
        if self.contains(&schema.kind) {
            return Err(SchemaError::DuplicateKind(schema.kind));
        }
        self.generics.insert(schema.kind.clone(), schema);
        Ok(())
    }

    /// Check if kind is registered as node or generic
    #[inline]
    #[must_use]
    pub fn contains(&self, kind: &str) -> bool {
        self.nodes.contains_key(kind) || self.generics.contains_key(kind)
    }

    /// Get definition as declared, without inherited fields
    #[must_use]
    pub fn get(&self, kind: &str) -> Option<&ObjectSchema> {
        self.nodes.get(kind).or_else(|| self.generics.get(kind))
    }

    /// List registered node kinds, sorted
    #[must_use]
    pub fn node_kinds(&self) -> Vec<&str> {
        let mut kinds: Vec<&str> = self.nodes.keys().map(String::as_str).collect();
        kinds.sort_unstable();
        kinds
    }

    /// Number of registered definitions
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len() + self.generics.len()
    }

    /// Check if registry is empty
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty() && self.generics.is_empty()
    }

    /// Get definition with fields from inherited generics merged in
    ///
    /// Fields declared on the node win over same-named generic fields.
    /// Merged fields are marked `inherited` and appended after the node's
    /// own fields, in `inherit_from` order.
    ///
    /// # Errors
    /// Returns error if the kind or one of its generics is unknown
    pub fn resolve(&self, kind: &str) -> Result<ObjectSchema, SchemaError> {
        let schema = self
            .get(kind)
            .ok_or_else(|| SchemaError::UnknownKind(kind.to_string()))?;
        let mut resolved = schema.clone();

        for generic_kind in &schema.inherit_from {
            let generic =
                self.generics
                    .get(generic_kind)
                    .ok_or_else(|| SchemaError::UnknownGeneric {
                        kind: kind.to_string(),
                        generic: generic_kind.clone(),
                    })?;

            for attribute in &generic.attributes {
                if !resolved.has_field(&attribute.name) {
                    let mut attribute = attribute.clone();
                    attribute.inherited = true;
                    resolved.attributes.push(attribute);
                }
            }
            for relationship in &generic.relationships {
                if !resolved.has_field(&relationship.name) {
                    let mut relationship = relationship.clone();
                    relationship.inherited = true;
                    resolved.relationships.push(relationship);
                }
            }
        }

        Ok(resolved)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{AttributeSchema, Cardinality, RelationshipSchema};
    use pretty_assertions::assert_eq;

    fn endpoint() -> ObjectSchema {
        ObjectSchema::new("Infra", "Endpoint")
            .with_attribute(AttributeSchema::new("name", "Text"))
            .with_attribute(AttributeSchema::new("mtu", "Number").with_default(1500))
            .with_relationship(RelationshipSchema::new("tags", "BuiltinTag", Cardinality::Many))
    }

    fn device() -> ObjectSchema {
        ObjectSchema::new("Infra", "Device")
            .with_attribute(AttributeSchema::new("name", "Text").optional())
            .inheriting("InfraEndpoint")
    }

    #[test]
    fn registry_new_empty() {
        let registry = SchemaRegistry::new();
        assert!(registry.is_empty());
        assert_eq!(registry.len(), 0);
    }

    #[test]
    fn register_and_get() {
        let mut registry = SchemaRegistry::new();
        registry.register_generic(endpoint()).unwrap();
        registry.register_node(device()).unwrap();

        assert!(registry.contains("InfraDevice"));
        assert!(registry.contains("InfraEndpoint"));
        assert_eq!(registry.node_kinds(), vec!["InfraDevice"]);
        assert_eq!(registry.get("InfraDevice").unwrap().attributes.len(), 1);
    }

    #[test]
    fn duplicate_kind_rejected() {
        let mut registry = SchemaRegistry::new();
        registry.register_node(device()).unwrap();
        let err = registry.register_node(device()).unwrap_err();
        assert!(matches!(err, SchemaError::DuplicateKind(k) if k == "InfraDevice"));
    }

    #[test]
    fn resolve_merges_generic_fields() {
        let mut registry = SchemaRegistry::new();
        registry.register_generic(endpoint()).unwrap();
        registry.register_node(device()).unwrap();

        let resolved = registry.resolve("InfraDevice").unwrap();
        let names: Vec<&str> = resolved.attributes.iter().map(|a| a.name.as_str()).collect();
        assert_eq!(names, vec!["name", "mtu"]);

        // Node's own definition wins
        let name = resolved.attribute("name").unwrap();
        assert!(name.optional);
        assert!(!name.inherited);

        let mtu = resolved.attribute("mtu").unwrap();
        assert!(mtu.inherited);
        assert!(resolved.relationship("tags").unwrap().inherited);
    }

    #[test]
    fn resolve_unknown_kind() {
        let registry = SchemaRegistry::new();
        assert!(matches!(
            registry.resolve("Nope"),
            Err(SchemaError::UnknownKind(_))
        ));
    }

    #[test]
    fn resolve_unknown_generic() {
        let mut registry = SchemaRegistry::new();
        registry.register_node(device()).unwrap();
        assert!(matches!(
            registry.resolve("InfraDevice"),
            Err(SchemaError::UnknownGeneric { .. })
        ));
    }

    #[test]
    fn from_json_document() {
        let registry = SchemaRegistry::from_json(
            r#"{
                "nodes": [{
                    "name": "Tag",
                    "namespace": "Builtin",
                    "kind": "BuiltinTag",
                    "attributes": [{"name": "name", "kind": "Text"}]
                }]
            }"#,
        )
        .unwrap();
        assert_eq!(registry.len(), 1);
        assert!(registry.get("BuiltinTag").unwrap().attribute("name").is_some());
    }

    #[test]
    fn from_yaml_document() {
        let yaml = "
generics:
  - name: Endpoint
    namespace: Infra
    kind: InfraEndpoint
    attributes:
      - name: mtu
        kind: Number
        default_value: 1500
nodes:
  - name: Interface
    namespace: Infra
    kind: InfraInterface
    inherit_from: [InfraEndpoint]
    relationships:
      - name: device
        peer: InfraDevice
        cardinality: one
        kind: Parent
";
        let registry = SchemaRegistry::from_yaml(yaml).unwrap();
        let resolved = registry.resolve("InfraInterface").unwrap();
        assert_eq!(
            resolved.attribute("mtu").unwrap().default_value,
            Some(serde_json::json!(1500))
        );
        assert_eq!(resolved.relationship("device").unwrap().cardinality, Cardinality::One);
    }

    #[test]
    fn invalid_json_is_error() {
        assert!(matches!(
            SchemaRegistry::from_json("{not json"),
            Err(SchemaError::InvalidJson(_))
        ));
    }
}
