//! Node references
//!
//! Provides [`NodeRef`], the handle a form keeps for a related entity.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value as JsonValue};

/// Reference to a related entity
///
/// Only `id` is ever sent back in a mutation; the label and kind exist for
/// display.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NodeRef {
    /// Entity id
    pub id: String,

    /// Human-readable label
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_label: Option<String>,

    /// Entity kind
    #[serde(default, alias = "__typename", skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
}

impl NodeRef {
    /// Create reference from id only
    #[inline]
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            display_label: None,
            kind: None,
        }
    }

    /// With display label
    #[inline]
    #[must_use]
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.display_label = Some(label.into());
        self
    }

    /// With kind
    #[inline]
    #[must_use]
    pub fn with_kind(mut self, kind: impl Into<String>) -> Self {
        self.kind = Some(kind.into());
        self
    }

    /// Mutation shape: `{id}`
    #[inline]
    #[must_use]
    pub fn to_id_object(&self) -> JsonValue {
        json!({ "id": self.id })
    }

    /// Parse from a JSON object carrying at least a string `id`
    #[must_use]
    pub fn from_json(value: &JsonValue) -> Option<Self> {
        let object = value.as_object()?;
        let id = object.get("id")?.as_str()?;
        let text = |key: &str| object.get(key).and_then(JsonValue::as_str).map(str::to_string);
        Some(Self {
            id: id.to_string(),
            display_label: text("display_label"),
            kind: text("kind").or_else(|| text("__typename")),
        })
    }
}
