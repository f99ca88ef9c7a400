//! Mutation payloads
//!
//! Turns form data into the `data` argument of a create or update mutation.
//! Only fields present in the form data can appear in a payload; update
//! payloads further drop every field still holding the value the form
//! opened with.
//!
//! User values are shaped by what they hold, whatever the field kind. The
//! `build_*` functions are best-effort: a value that can't be sent at all
//! is logged and left out. The `try_build_*` variants fail with every
//! problem found instead, and also reject values whose shape doesn't match
//! the field kind.

use serde_json::{json, Map as JsonMap, Value as JsonValue};

use crate::error::{FieldIssue, IssueKind, ReconcileError};
use crate::field::{FieldDescriptor, FieldKind};
use crate::form::FormData;
use crate::value::{FieldValue, UserInput};
use formsync_schema::Cardinality;

/// `data` argument of a mutation, keyed by field name
pub type MutationPayload = JsonMap<String, JsonValue>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    Create,
    Update,
}

/// Shape a field accepts from user input
fn expected_shape(kind: &FieldKind) -> &'static str {
    match kind {
        FieldKind::Attribute { .. } => "scalar",
        FieldKind::Relationship {
            cardinality: Cardinality::One,
            ..
        } => "node",
        FieldKind::Relationship {
            cardinality: Cardinality::Many,
            ..
        } => "node list",
    }
}

fn check_compatible(field: &FieldDescriptor, input: &UserInput) -> Result<(), IssueKind> {
    let fits = match (&field.kind, input) {
        (_, UserInput::Null)
        | (FieldKind::Attribute { .. }, UserInput::Scalar(_))
        | (
            FieldKind::Relationship {
                cardinality: Cardinality::One,
                ..
            },
            UserInput::Node(_),
        )
        | (
            FieldKind::Relationship {
                cardinality: Cardinality::Many,
                ..
            },
            UserInput::Nodes(_),
        ) => true,
        _ => false,
    };

    if fits {
        Ok(())
    } else {
        Err(IssueKind::IncompatibleValue {
            expected: expected_shape(&field.kind),
            found: input.shape(),
        })
    }
}

fn user_entry(field: &FieldDescriptor, input: &UserInput, mode: Mode) -> JsonValue {
    match input {
        // A cleared relationship is a bare null on update
        UserInput::Null if mode == Mode::Update && field.is_relationship() => JsonValue::Null,
        UserInput::Null => json!({ "value": null }),
        UserInput::Scalar(scalar) => json!({ "value": scalar.normalized() }),
        UserInput::Node(node) => node.to_id_object(),
        UserInput::Nodes(nodes) => nodes.iter().map(|n| n.to_id_object()).collect(),
    }
}

fn create_entry(field: &FieldDescriptor, value: &FieldValue) -> Result<Option<JsonValue>, IssueKind> {
    match value {
        FieldValue::Empty | FieldValue::Schema(_) => Ok(None),
        FieldValue::Pool { value, .. } => Ok(Some(value.to_json())),
        FieldValue::Profile { value: Some(value), .. } => Ok(Some(value.to_json())),
        FieldValue::Profile { value: None, .. } => Err(IssueKind::MissingProfileValue),
        FieldValue::User(input) => Ok(Some(user_entry(field, input, Mode::Create))),
    }
}

fn update_entry(field: &FieldDescriptor, value: &FieldValue) -> Option<JsonValue> {
    let default = field.default_value.as_ref();

    if default == Some(value) {
        return None;
    }

    // Reselecting the pool the field already came from changes nothing
    if let (Some(current), Some(previous)) = (value.pool_id(), default.and_then(FieldValue::pool_id)) {
        if current == previous {
            return None;
        }
    }

    match value {
        FieldValue::Empty => None,
        FieldValue::Pool { value, .. } => Some(value.to_json()),
        FieldValue::Profile { .. } | FieldValue::Schema(_) => Some(json!({ "is_default": true })),
        FieldValue::User(input) => Some(user_entry(field, input, Mode::Update)),
    }
}

fn build(
    fields: &[FieldDescriptor],
    form_data: &FormData,
    mode: Mode,
    issues: &mut Vec<FieldIssue>,
) -> MutationPayload {
    let mut payload = MutationPayload::new();

    for field in fields {
        let Some(value) = form_data.get(&field.name) else {
            continue;
        };

        let entry = match mode {
            Mode::Create => create_entry(field, value),
            Mode::Update => Ok(update_entry(field, value)),
        };

        match entry {
            Ok(Some(json)) => {
                if let FieldValue::User(input) = value {
                    if let Err(kind) = check_compatible(field, input) {
                        tracing::debug!(field = %field.name, issue = %kind, "value shape doesn't match field kind");
                        issues.push(FieldIssue::new(&field.name, kind));
                    }
                }
                payload.insert(field.name.clone(), json);
            }
            Ok(None) => {}
            Err(kind) => {
                tracing::debug!(field = %field.name, issue = %kind, "field omitted from payload");
                issues.push(FieldIssue::new(&field.name, kind));
            }
        }
    }

    payload
}

fn undeclared_fields(fields: &[FieldDescriptor], form_data: &FormData) -> Vec<FieldIssue> {
    form_data
        .names()
        .filter(|name| !fields.iter().any(|f| f.name == *name))
        .map(|name| FieldIssue::new(name, IssueKind::UndeclaredField))
        .collect()
}

fn build_strict(
    fields: &[FieldDescriptor],
    form_data: &FormData,
    mode: Mode,
) -> Result<MutationPayload, ReconcileError> {
    let mut issues = Vec::new();
    let payload = build(fields, form_data, mode, &mut issues);
    issues.extend(undeclared_fields(fields, form_data));
    ReconcileError::check(issues)?;
    Ok(payload)
}

/// Payload for a create mutation
///
/// Per field present in `form_data`:
/// - empty and schema-default values are left out
/// - pool values are sent exactly as received
/// - profile values are sent as the bare scalar; a profile value without
///   one is left out
/// - a user clear is sent as `{value: null}`
/// - user-selected nodes are sent as `{id}` (or a list of them)
/// - user scalars are sent as `{value}`, with `""` sent as null
#[must_use]
pub fn build_create_payload(fields: &[FieldDescriptor], form_data: &FormData) -> MutationPayload {
    build(fields, form_data, Mode::Create, &mut Vec::new())
}

/// Payload for an update mutation
///
/// Same rules as [`build_create_payload`], except that:
/// - fields equal to their `default_value` are left out
/// - a pool value reselecting the default's pool is left out
/// - profile and schema values are sent as `{is_default: true}`
/// - a user clear on a relationship is sent as a bare null
#[must_use]
pub fn build_update_payload(fields: &[FieldDescriptor], form_data: &FormData) -> MutationPayload {
    build(fields, form_data, Mode::Update, &mut Vec::new())
}

/// Strict [`build_create_payload`]
///
/// # Errors
/// Returns every field that would have been left out, every user value
/// whose shape doesn't match its field kind, and every form data entry
/// with no matching descriptor
pub fn try_build_create_payload(
    fields: &[FieldDescriptor],
    form_data: &FormData,
) -> Result<MutationPayload, ReconcileError> {
    build_strict(fields, form_data, Mode::Create)
}

/// Strict [`build_update_payload`]
///
/// # Errors
/// Returns every field that would have been left out, every user value
/// whose shape doesn't match its field kind, and every form data entry
/// with no matching descriptor
pub fn try_build_update_payload(
    fields: &[FieldDescriptor],
    form_data: &FormData,
) -> Result<MutationPayload, ReconcileError> {
    build_strict(fields, form_data, Mode::Update)
}

/// Payload built from form data alone, for forms without field descriptors
///
/// Entries whose bare value equals `current_object[name].value` are left
/// out. User values are sent as `{value}` (with `""` sent as null), except
/// node lists which are sent as they are; pool values are sent as they
/// are. Other provenances are left out.
#[must_use]
pub fn build_payload_from_form_data(
    form_data: &FormData,
    current_object: Option<&JsonMap<String, JsonValue>>,
) -> MutationPayload {
    let mut payload = MutationPayload::new();

    for (name, value) in form_data.iter() {
        if let Some(current) = current_object {
            let current_value = current.get(name).and_then(|attr| attr.get("value"));
            if current_value == Some(&value.value_json()) {
                continue;
            }
        }

        let entry = match value {
            FieldValue::User(UserInput::Nodes(_)) => value.value_json(),
            FieldValue::User(UserInput::Scalar(scalar)) => json!({ "value": scalar.normalized() }),
            FieldValue::User(input) => json!({ "value": input.to_json() }),
            FieldValue::Pool { value, .. } => value.to_json(),
            FieldValue::Empty | FieldValue::Schema(_) | FieldValue::Profile { .. } => continue,
        };
        payload.insert(name.to_string(), entry);
    }

    payload
}

/// GraphQL variables for a mutation: `{data: payload}`, with the object id
/// merged into `data` for updates
#[must_use]
pub fn mutation_variables(payload: MutationPayload, object_id: Option<&str>) -> JsonValue {
    let mut data = JsonMap::new();
    if let Some(id) = object_id {
        data.insert("id".to_string(), JsonValue::String(id.to_string()));
    }
    data.extend(payload);
    json!({ "data": data })
}
