//! Schema types
//!
//! Attribute and relationship metadata for a single object kind, in the
//! shape the schema API serves it.

use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

/// How many peers a relationship holds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Cardinality {
    /// Single peer, shaped as one node reference
    One,
    /// Any number of peers, shaped as an array
    Many,
}

impl Cardinality {
    /// Whether the relationship holds an array of peers
    #[inline]
    #[must_use]
    pub fn is_many(self) -> bool {
        matches!(self, Self::Many)
    }
}

/// Role a relationship plays on its node
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum RelationshipKind {
    /// Plain association
    #[default]
    Generic,
    /// Rendered alongside attributes
    Attribute,
    /// Owned child
    Component,
    /// Owning parent
    Parent,
    /// Group membership, managed outside object forms
    Group,
    /// Tree structure, managed outside object forms
    Hierarchy,
    /// Profile assignment, managed outside object forms
    Profile,
}

impl RelationshipKind {
    /// Whether object create/edit forms expose this relationship as a field
    #[inline]
    #[must_use]
    pub fn is_form_field(self) -> bool {
        matches!(
            self,
            Self::Generic | Self::Attribute | Self::Component | Self::Parent
        )
    }
}

/// Attribute definition
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttributeSchema {
    /// Field name
    pub name: String,
    /// Attribute kind (`Text`, `Number`, `Boolean`, `Dropdown`, ...)
    pub kind: String,
    /// Whether a value may be omitted
    #[serde(default)]
    pub optional: bool,
    /// Computed by the server, never edited
    #[serde(default)]
    pub read_only: bool,
    /// Value applied by the server when none is provided
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_value: Option<JsonValue>,
    /// Declared on a generic this node inherits from
    #[serde(default)]
    pub inherited: bool,
}

impl AttributeSchema {
    /// Create attribute definition with defaults
    #[must_use]
    pub fn new(name: impl Into<String>, kind: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: kind.into(),
            optional: false,
            read_only: false,
            default_value: None,
            inherited: false,
        }
    }

    /// With optional flag
    #[inline]
    #[must_use]
    pub fn optional(mut self) -> Self {
        self.optional = true;
        self
    }

    /// With read-only flag
    #[inline]
    #[must_use]
    pub fn read_only(mut self) -> Self {
        self.read_only = true;
        self
    }

    /// With a declared default value
    #[inline]
    #[must_use]
    pub fn with_default(mut self, value: impl Into<JsonValue>) -> Self {
        self.default_value = Some(value.into());
        self
    }
}

/// Relationship definition
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RelationshipSchema {
    /// Field name
    pub name: String,
    /// Kind of the peer object
    pub peer: String,
    /// One or many peers
    pub cardinality: Cardinality,
    /// Role on the node
    #[serde(default)]
    pub kind: RelationshipKind,
    /// Whether a peer may be omitted
    #[serde(default = "default_true")]
    pub optional: bool,
    /// Computed by the server, never edited
    #[serde(default)]
    pub read_only: bool,
    /// Declared on a generic this node inherits from
    #[serde(default)]
    pub inherited: bool,
}

fn default_true() -> bool {
    true
}

impl RelationshipSchema {
    /// Create relationship definition with defaults
    #[must_use]
    pub fn new(name: impl Into<String>, peer: impl Into<String>, cardinality: Cardinality) -> Self {
        Self {
            name: name.into(),
            peer: peer.into(),
            cardinality,
            kind: RelationshipKind::Generic,
            optional: true,
            read_only: false,
            inherited: false,
        }
    }

    /// With relationship kind
    #[inline]
    #[must_use]
    pub fn with_kind(mut self, kind: RelationshipKind) -> Self {
        self.kind = kind;
        self
    }
}

/// Node or generic definition
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObjectSchema {
    /// Short name (`Device`)
    pub name: String,
    /// Namespace (`Infra`)
    pub namespace: String,
    /// Fully qualified kind (`InfraDevice`)
    pub kind: String,
    /// Attribute definitions
    #[serde(default)]
    pub attributes: Vec<AttributeSchema>,
    /// Relationship definitions
    #[serde(default)]
    pub relationships: Vec<RelationshipSchema>,
    /// Generics this node inherits from
    #[serde(default)]
    pub inherit_from: Vec<String>,
}

impl ObjectSchema {
    /// Create empty schema; `kind` is `namespace` followed by `name`
    #[must_use]
    pub fn new(namespace: impl Into<String>, name: impl Into<String>) -> Self {
        let namespace = namespace.into();
        let name = name.into();
        Self {
            kind: format!("{namespace}{name}"),
            name,
            namespace,
            attributes: Vec::new(),
            relationships: Vec::new(),
            inherit_from: Vec::new(),
        }
    }

    /// With attribute
    #[must_use]
    pub fn with_attribute(mut self, attribute: AttributeSchema) -> Self {
        self.attributes.push(attribute);
        self
    }

    /// With relationship
    #[must_use]
    pub fn with_relationship(mut self, relationship: RelationshipSchema) -> Self {
        self.relationships.push(relationship);
        self
    }

    /// With inherited generic
    #[must_use]
    pub fn inheriting(mut self, generic: impl Into<String>) -> Self {
        self.inherit_from.push(generic.into());
        self
    }

    /// Look up attribute by name
    #[must_use]
    pub fn attribute(&self, name: &str) -> Option<&AttributeSchema> {
        self.attributes.iter().find(|a| a.name == name)
    }

    /// Look up relationship by name
    #[must_use]
    pub fn relationship(&self, name: &str) -> Option<&RelationshipSchema> {
        self.relationships.iter().find(|r| r.name == name)
    }

    /// Whether a field with this name is declared
    #[must_use]
    pub fn has_field(&self, name: &str) -> bool {
        self.attribute(name).is_some() || self.relationship(name).is_some()
    }
}
