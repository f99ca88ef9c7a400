//! formsync Schema Registry
//!
//! Read-only attribute and relationship metadata per object kind.
//!
//! # Core Concepts
//!
//! - [`ObjectSchema`]: Node or generic definition
//! - [`AttributeSchema`] / [`RelationshipSchema`]: Field definitions
//! - [`Cardinality`]: Whether a relationship holds one peer or many
//! - [`SchemaRegistry`]: Lookup by kind with inheritance resolution
//!
//! # Example
//!
//! ```rust,ignore
//! use formsync_schema::SchemaRegistry;
//!
//! let registry = SchemaRegistry::from_yaml(&std::fs::read_to_string("schema.yml")?)?;
//! let device = registry.resolve("InfraDevice")?;
//! let tags = device.relationship("tags").unwrap();
//! assert!(tags.cardinality.is_many());
//! ```

#![warn(missing_docs)]
#![warn(unreachable_pub)]

mod error;
mod registry;
mod types;

pub use error::SchemaError;
pub use registry::{SchemaDocument, SchemaRegistry};
pub use types::{
    AttributeSchema, Cardinality, ObjectSchema, RelationshipKind, RelationshipSchema,
};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
