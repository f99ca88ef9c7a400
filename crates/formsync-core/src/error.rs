//! Error types for formsync core
//!
//! Best-effort builders never fail: every problem below is logged and the
//! offending field or filter is omitted. Strict builders collect the same
//! problems into a [`ReconcileError`].

use std::fmt;

/// A form value that matches none of the known provenance/value shapes
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FieldValueError {
    /// `source` is null but `value` is not
    #[error("value present without a source")]
    ValueWithoutSource,

    /// Value doesn't fit the shape its source requires
    #[error("unknown field shape: {0}")]
    UnknownFieldShape(String),
}

/// What went wrong with a single field or filter
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IssueKind {
    /// Value matches no known provenance/value combination
    UnknownFieldShape(String),

    /// Value is well-formed but can't be sent for this kind of field
    IncompatibleValue {
        /// What the field accepts
        expected: &'static str,
        /// What the form held
        found: &'static str,
    },

    /// Profile-sourced value with nothing to send
    MissingProfileValue,

    /// Form data names a field that isn't declared
    UndeclaredField,

    /// Filter names a relationship the schema doesn't declare
    MissingRelationshipSchema,

    /// Filter key is neither `value` nor `ids`
    UnsupportedFilterKey(String),

    /// Filter value can't be turned into node references
    MalformedFilterValue,
}

impl fmt::Display for IssueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnknownFieldShape(reason) => write!(f, "unknown field shape: {reason}"),
            Self::IncompatibleValue { expected, found } => {
                write!(f, "expected {expected}, found {found}")
            }
            Self::MissingProfileValue => f.write_str("profile value is null"),
            Self::UndeclaredField => f.write_str("field is not declared"),
            Self::MissingRelationshipSchema => f.write_str("relationship is not declared"),
            Self::UnsupportedFilterKey(key) => write!(f, "unsupported filter key '{key}'"),
            Self::MalformedFilterValue => f.write_str("filter value has no usable ids"),
        }
    }
}

/// A problem tied to a named field or filter
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldIssue {
    /// Field or filter name
    pub field: String,
    /// Problem
    pub kind: IssueKind,
}

impl FieldIssue {
    /// Create issue for field
    #[inline]
    #[must_use]
    pub fn new(field: impl Into<String>, kind: IssueKind) -> Self {
        Self {
            field: field.into(),
            kind,
        }
    }
}

impl fmt::Display for FieldIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "'{}': {}", self.field, self.kind)
    }
}

impl From<(String, FieldValueError)> for FieldIssue {
    fn from((field, err): (String, FieldValueError)) -> Self {
        Self::new(field, IssueKind::UnknownFieldShape(err.to_string()))
    }
}

/// Strict-mode failure
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ReconcileError {
    /// One or more fields or filters would have been silently omitted
    #[error("{} invalid field(s): {}", .issues.len(), join_issues(.issues))]
    InvalidFields {
        /// Every problem found, in input order
        issues: Vec<FieldIssue>,
    },
}

impl ReconcileError {
    /// Problems found
    #[inline]
    #[must_use]
    pub fn issues(&self) -> &[FieldIssue] {
        match self {
            Self::InvalidFields { issues } => issues,
        }
    }

    /// Ok when no issues were collected
    ///
    /// # Errors
    /// Returns `InvalidFields` when `issues` is non-empty
    pub fn check(issues: Vec<FieldIssue>) -> Result<(), Self> {
        if issues.is_empty() {
            Ok(())
        } else {
            Err(Self::InvalidFields { issues })
        }
    }
}

fn join_issues(issues: &[FieldIssue]) -> String {
    issues
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}
