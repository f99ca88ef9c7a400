//! Form engine
//!
//! [`FormEngine`] runs the builders in best-effort or strict mode depending
//! on its [`EngineConfig`].

use crate::config::EngineConfig;
use crate::error::ReconcileError;
use crate::field::FieldDescriptor;
use crate::filter::{self, Filter, FilterMap};
use crate::form::FormData;
use crate::mutation::{self, MutationPayload};
use crate::permission::{
    object_permission, resolve_field_edit, EditResolution, FieldAccess, ObjectPermission,
    PermissionContext, PermissionRecord,
};
use formsync_schema::ObjectSchema;

/// Configured entry point to the reconciliation functions
#[derive(Debug, Clone, Default)]
pub struct FormEngine {
    config: EngineConfig,
}

impl FormEngine {
    /// Create engine
    #[inline]
    #[must_use]
    pub fn new(config: EngineConfig) -> Self {
        Self { config }
    }

    /// Active configuration
    #[inline]
    #[must_use]
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Create payload for `form_data`
    ///
    /// # Errors
    /// Only in strict mode; see [`mutation::try_build_create_payload`]
    pub fn create_payload(
        &self,
        fields: &[FieldDescriptor],
        form_data: &FormData,
    ) -> Result<MutationPayload, ReconcileError> {
        tracing::info!(fields = fields.len(), strict = self.config.strict, "building create payload");
        if self.config.strict {
            mutation::try_build_create_payload(fields, form_data)
        } else {
            Ok(mutation::build_create_payload(fields, form_data))
        }
    }

    /// Update payload for `form_data`
    ///
    /// # Errors
    /// Only in strict mode; see [`mutation::try_build_update_payload`]
    pub fn update_payload(
        &self,
        fields: &[FieldDescriptor],
        form_data: &FormData,
    ) -> Result<MutationPayload, ReconcileError> {
        tracing::info!(fields = fields.len(), strict = self.config.strict, "building update payload");
        let payload = if self.config.strict {
            mutation::try_build_update_payload(fields, form_data)?
        } else {
            mutation::build_update_payload(fields, form_data)
        };
        if payload.is_empty() {
            tracing::info!("no field changed");
        }
        Ok(payload)
    }

    /// Reconciled filters
    ///
    /// # Errors
    /// Only in strict mode; see [`filter::try_filters_to_object`]
    pub fn filters(
        &self,
        schema: &ObjectSchema,
        filters: &[Filter],
    ) -> Result<FilterMap, ReconcileError> {
        tracing::info!(kind = %schema.kind, filters = filters.len(), "reconciling filters");
        if self.config.strict {
            filter::try_filters_to_object(schema, filters)
        } else {
            Ok(filter::filters_to_object(schema, filters))
        }
    }

    /// Whether a field may be edited, and which rule decided
    #[must_use]
    pub fn field_edit(&self, access: &FieldAccess, context: &PermissionContext) -> EditResolution {
        let resolution = resolve_field_edit(access, context);
        tracing::debug!(rule = ?resolution.rule, editable = resolution.editable, "field edit resolved");
        resolution
    }

    /// Per-action permissions for an object
    #[must_use]
    pub fn object_permission(&self, records: Option<&[PermissionRecord]>) -> ObjectPermission {
        object_permission(records, self.config.permission_policy())
    }
}
