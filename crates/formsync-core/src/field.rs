//! Field descriptors
//!
//! A [`FieldDescriptor`] is what a form knows about one of its fields: the
//! name, whether it's an attribute or a relationship, and the value the form
//! was opened with.

use formsync_schema::{AttributeSchema, Cardinality, RelationshipSchema};
use serde::{Deserialize, Serialize};

use crate::value::FieldValue;

/// Attribute or relationship
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum FieldKind {
    /// Attribute of the given schema kind
    Attribute {
        /// Attribute kind (`Text`, `Number`, ...)
        kind: String,
    },
    /// Relationship to `peer`
    Relationship {
        /// Peer kind
        peer: String,
        /// One or many peers
        cardinality: Cardinality,
    },
}

/// One field of an object form
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldDescriptor {
    /// Field name, also the payload key
    pub name: String,

    /// Attribute or relationship
    #[serde(flatten)]
    pub kind: FieldKind,

    /// Value the form was opened with
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_value: Option<FieldValue>,
}

impl FieldDescriptor {
    /// Attribute field
    #[must_use]
    pub fn attribute(name: impl Into<String>, kind: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: FieldKind::Attribute { kind: kind.into() },
            default_value: None,
        }
    }

    /// Relationship field
    #[must_use]
    pub fn relationship(
        name: impl Into<String>,
        peer: impl Into<String>,
        cardinality: Cardinality,
    ) -> Self {
        Self {
            name: name.into(),
            kind: FieldKind::Relationship {
                peer: peer.into(),
                cardinality,
            },
            default_value: None,
        }
    }

    /// Field for an attribute definition
    #[must_use]
    pub fn from_attribute(attribute: &AttributeSchema) -> Self {
        Self::attribute(&attribute.name, &attribute.kind)
    }

    /// Field for a relationship definition
    #[must_use]
    pub fn from_relationship(relationship: &RelationshipSchema) -> Self {
        Self::relationship(
            &relationship.name,
            &relationship.peer,
            relationship.cardinality,
        )
    }

    /// With the value the form was opened with
    #[inline]
    #[must_use]
    pub fn with_default(mut self, value: FieldValue) -> Self {
        self.default_value = Some(value);
        self
    }

    /// Whether this is a relationship field
    #[inline]
    #[must_use]
    pub fn is_relationship(&self) -> bool {
        matches!(self.kind, FieldKind::Relationship { .. })
    }

    /// Cardinality of a relationship field
    #[inline]
    #[must_use]
    pub fn cardinality(&self) -> Option<Cardinality> {
        match self.kind {
            FieldKind::Relationship { cardinality, .. } => Some(cardinality),
            FieldKind::Attribute { .. } => None,
        }
    }
}
