//! formsync Core
//!
//! Reconciles form state with the GraphQL API: mutation payloads from
//! edited form values, field edit permissions, and typed filter objects
//! from query-string filters.
//!
//! # Core Concepts
//!
//! - [`FieldValue`]: A field's value tagged with its provenance
//! - [`FieldDescriptor`]: What a form knows about one field
//! - [`FormData`]: Current value of every field
//! - [`build_create_payload`] / [`build_update_payload`]: Mutation `data`
//! - [`resolve_field_edit`]: Field edit permission
//! - [`object_permission`]: Per-action object permission
//! - [`filters_to_object`]: Query-string filters to typed filter objects
//! - [`FormEngine`]: Best-effort or strict entry point
//!
//! # Example
//!
//! ```rust,ignore
//! use formsync_core::{fields_for_schema, initial_form_data, build_update_payload, FieldValue};
//!
//! let fields = fields_for_schema(&device_schema, current_object.as_object());
//! let mut data = initial_form_data(&fields);
//! data.insert("name", FieldValue::user("edge-02"));
//!
//! // Only the edited field is sent
//! let payload = build_update_payload(&fields, &data);
//! ```

#![warn(missing_docs)]
#![warn(unreachable_pub)]

mod config;
mod engine;
mod error;
mod field;
mod filter;
mod form;
mod mutation;
mod node;
mod permission;
mod value;

pub use config::EngineConfig;
pub use engine::FormEngine;
pub use error::{FieldIssue, FieldValueError, IssueKind, ReconcileError};
pub use field::{FieldDescriptor, FieldKind};
pub use filter::{
    filters_to_object, try_filters_to_object, Filter, FilterEdge, FilterMap, FilterNode,
    FilterObject, FILTER_SEPARATOR,
};
pub use form::{
    fields_for_schema, initial_attribute_value, initial_form_data, initial_relationship_value,
    FormData,
};
pub use mutation::{
    build_create_payload, build_payload_from_form_data, build_update_payload, mutation_variables,
    try_build_create_payload, try_build_update_payload, MutationPayload,
};
pub use node::NodeRef;
pub use permission::{
    denial_message, is_field_editable, object_permission, resolve_field_edit, ActionPermission,
    BranchContext, EditResolution, EditRule, FieldAccess, ObjectPermission, PermissionAction,
    PermissionContext, PermissionDecision, PermissionPolicy, PermissionRecord,
};
pub use value::{FieldValue, PoolValue, Scalar, SourceRef, SourceType, UserInput};

/// Schema types, re-exported for convenience
pub use formsync_schema as schema;

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
