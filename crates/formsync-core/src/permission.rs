//! Permission resolution
//!
//! Two decisions live here:
//!
//! - [`resolve_field_edit`]: whether a single field may be edited, from the
//!   field's ownership and protection flags plus the update decision the
//!   backend returned for it.
//! - [`object_permission`]: per-action allow/deny for a whole object, folded
//!   from the permission records the backend returned for its kind.
//!
//! Branch and user state are never read from ambient state; callers pass a
//! [`PermissionContext`] snapshot taken at the moment of the check.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::node::NodeRef;

/// Decision the backend returns for one action
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PermissionDecision {
    /// Allowed on every branch
    Allow,
    /// Allowed on the default branch only
    AllowDefault,
    /// Allowed outside the default branch only
    AllowOther,
    /// Never allowed
    Deny,
}

impl PermissionDecision {
    /// Every decision
    pub const ALL: [Self; 4] = [Self::Allow, Self::AllowDefault, Self::AllowOther, Self::Deny];
}

/// Object-level action
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PermissionAction {
    /// Read
    View,
    /// Create
    Create,
    /// Update
    Update,
    /// Delete
    Delete,
}

impl PermissionAction {
    /// Every action, in display order
    pub const ALL: [Self; 4] = [Self::View, Self::Create, Self::Update, Self::Delete];

    /// Verb used in messages
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::View => "view",
            Self::Create => "create",
            Self::Update => "update",
            Self::Delete => "delete",
        }
    }
}

impl fmt::Display for PermissionAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Active branch
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BranchContext {
    /// Branch name
    pub name: String,
    /// Whether this is the default branch
    pub is_default: bool,
}

impl BranchContext {
    /// Create branch context
    #[must_use]
    pub fn new(name: impl Into<String>, is_default: bool) -> Self {
        Self {
            name: name.into(),
            is_default,
        }
    }
}

/// Branch and user snapshot a permission check runs against
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PermissionContext {
    /// Active branch, if known
    #[serde(default)]
    pub branch: Option<BranchContext>,
    /// Authenticated user id, if any
    #[serde(default)]
    pub user_id: Option<String>,
}

impl PermissionContext {
    /// Create context
    #[must_use]
    pub fn new(branch: Option<BranchContext>, user_id: Option<String>) -> Self {
        Self { branch, user_id }
    }

    /// Whether the active branch is known to be the default branch
    #[inline]
    #[must_use]
    pub fn is_default_branch(&self) -> bool {
        self.branch.as_ref().is_some_and(|b| b.is_default)
    }
}

/// Edit-relevant state of one field
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldAccess {
    /// Account owning the field value
    #[serde(default)]
    pub owner: Option<NodeRef>,
    /// Only the owner may change the value
    #[serde(default)]
    pub is_protected: bool,
    /// Computed by the server
    #[serde(default)]
    pub is_read_only: bool,
    /// Update decision returned for this field
    #[serde(default)]
    pub update: Option<PermissionDecision>,
}

impl FieldAccess {
    /// Create unrestricted field access
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// With owner
    #[inline]
    #[must_use]
    pub fn owned_by(mut self, owner: NodeRef) -> Self {
        self.owner = Some(owner);
        self
    }

    /// With protected flag
    #[inline]
    #[must_use]
    pub fn protected(mut self) -> Self {
        self.is_protected = true;
        self
    }

    /// With read-only flag
    #[inline]
    #[must_use]
    pub fn read_only(mut self) -> Self {
        self.is_read_only = true;
        self
    }

    /// With update decision
    #[inline]
    #[must_use]
    pub fn with_decision(mut self, decision: PermissionDecision) -> Self {
        self.update = Some(decision);
        self
    }
}

/// Which rule settled a field edit check
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EditRule {
    /// Decision `ALLOW`
    Allow,
    /// Decision `ALLOW_DEFAULT`
    AllowDefault,
    /// Decision `ALLOW_OTHER`
    AllowOther,
    /// Decision `DENY`
    Deny,
    /// No decision; read-only, protection and ownership apply
    Ownership,
}

/// Outcome of a field edit check
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EditResolution {
    /// Rule that fired
    pub rule: EditRule,
    /// Whether the field may be edited
    pub editable: bool,
}

/// Decide whether a field may be edited
///
/// Rules, first match wins:
/// 1. `ALLOW`: editable
/// 2. `ALLOW_DEFAULT`: editable on the default branch
/// 3. `ALLOW_OTHER`: editable outside the default branch
/// 4. `DENY`: not editable
/// 5. no decision: read-only fields are not editable; unprotected or
///    unowned fields are; protected owned fields only for their owner
#[must_use]
pub fn resolve_field_edit(access: &FieldAccess, context: &PermissionContext) -> EditResolution {
    let on_default = context.is_default_branch();

    let (rule, editable) = match access.update {
        Some(PermissionDecision::Allow) => (EditRule::Allow, true),
        Some(PermissionDecision::AllowDefault) => (EditRule::AllowDefault, on_default),
        Some(PermissionDecision::AllowOther) => (EditRule::AllowOther, !on_default),
        Some(PermissionDecision::Deny) => (EditRule::Deny, false),
        None => (EditRule::Ownership, owner_may_edit(access, context)),
    };

    EditResolution { rule, editable }
}

fn owner_may_edit(access: &FieldAccess, context: &PermissionContext) -> bool {
    if access.is_read_only {
        return false;
    }
    match (&access.owner, access.is_protected) {
        (Some(owner), true) => context.user_id.as_deref() == Some(owner.id.as_str()),
        _ => true,
    }
}

/// Shorthand for [`resolve_field_edit`]`(..).editable`
#[inline]
#[must_use]
pub fn is_field_editable(access: &FieldAccess, context: &PermissionContext) -> bool {
    resolve_field_edit(access, context).editable
}

/// Permission record returned for an object kind
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PermissionRecord {
    /// Object kind
    pub kind: String,
    /// Read decision
    pub view: PermissionDecision,
    /// Create decision
    pub create: PermissionDecision,
    /// Update decision
    pub update: PermissionDecision,
    /// Delete decision
    pub delete: PermissionDecision,
}

impl PermissionRecord {
    /// Record with the same decision for every action
    #[must_use]
    pub fn uniform(kind: impl Into<String>, decision: PermissionDecision) -> Self {
        Self {
            kind: kind.into(),
            view: decision,
            create: decision,
            update: decision,
            delete: decision,
        }
    }

    /// Decision for action
    #[must_use]
    pub fn decision(&self, action: PermissionAction) -> PermissionDecision {
        match action {
            PermissionAction::View => self.view,
            PermissionAction::Create => self.create,
            PermissionAction::Update => self.update,
            PermissionAction::Delete => self.delete,
        }
    }
}

/// Allow or deny for one action
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "decision", rename_all = "snake_case")]
pub enum ActionPermission {
    /// Action allowed
    Allowed,
    /// Action denied
    Denied {
        /// Explanation for the user
        message: String,
    },
}

impl ActionPermission {
    /// Whether the action is allowed
    #[inline]
    #[must_use]
    pub fn is_allowed(&self) -> bool {
        matches!(self, Self::Allowed)
    }

    /// Denial message
    #[inline]
    #[must_use]
    pub fn message(&self) -> Option<&str> {
        match self {
            Self::Allowed => None,
            Self::Denied { message } => Some(message),
        }
    }
}

/// Allow or deny for every action on an object
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObjectPermission {
    /// Read
    pub view: ActionPermission,
    /// Create
    pub create: ActionPermission,
    /// Update
    pub update: ActionPermission,
    /// Delete
    pub delete: ActionPermission,
}

impl ObjectPermission {
    /// Every action allowed
    #[must_use]
    pub fn allow_all() -> Self {
        Self {
            view: ActionPermission::Allowed,
            create: ActionPermission::Allowed,
            update: ActionPermission::Allowed,
            delete: ActionPermission::Allowed,
        }
    }

    /// Permission for action
    #[must_use]
    pub fn get(&self, action: PermissionAction) -> &ActionPermission {
        match action {
            PermissionAction::View => &self.view,
            PermissionAction::Create => &self.create,
            PermissionAction::Update => &self.update,
            PermissionAction::Delete => &self.delete,
        }
    }
}

/// Site-wide settings that affect object permissions
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PermissionPolicy {
    /// Anyone may view objects, whatever the records say
    #[serde(default)]
    pub allow_anonymous_access: bool,
}

/// Message shown when `action` isn't allowed
#[must_use]
pub fn denial_message(action: PermissionAction, decision: Option<PermissionDecision>) -> String {
    match decision {
        None => format!(
            "Unable to determine permission to {action} this object. Please contact your administrator."
        ),
        Some(PermissionDecision::Deny) => {
            format!("You don't have permission to {action} this object.")
        }
        Some(PermissionDecision::AllowDefault) => format!(
            "This action is only allowed on the default branch. Please switch to the default branch to {action} this object."
        ),
        Some(PermissionDecision::AllowOther) => format!(
            "This action is not allowed on the default branch. Please switch to a different branch to {action} this object."
        ),
        Some(PermissionDecision::Allow) => {
            format!("You have permission to {action} this object on any branch.")
        }
    }
}

/// Fold permission records into a per-action decision
///
/// Without records every action is allowed. Otherwise an action is allowed
/// when any record allows it outright (or, for `view`, when anonymous access
/// is on); the denial message comes from the first record that doesn't.
#[must_use]
pub fn object_permission(
    records: Option<&[PermissionRecord]>,
    policy: PermissionPolicy,
) -> ObjectPermission {
    let Some(records) = records else {
        return ObjectPermission::allow_all();
    };

    let resolve = |action: PermissionAction| -> ActionPermission {
        if action == PermissionAction::View && policy.allow_anonymous_access {
            return ActionPermission::Allowed;
        }

        if records
            .iter()
            .any(|r| r.decision(action) == PermissionDecision::Allow)
        {
            return ActionPermission::Allowed;
        }

        let first_denial = records
            .iter()
            .map(|r| r.decision(action))
            .find(|d| *d != PermissionDecision::Allow);

        tracing::debug!(%action, decision = ?first_denial, "action not allowed");
        ActionPermission::Denied {
            message: denial_message(action, first_denial),
        }
    };

    ObjectPermission {
        view: resolve(PermissionAction::View),
        create: resolve(PermissionAction::Create),
        update: resolve(PermissionAction::Update),
        delete: resolve(PermissionAction::Delete),
    }
}
