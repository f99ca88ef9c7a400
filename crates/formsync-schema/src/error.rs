//! Error types for schema loading and lookup

/// Schema registry errors
#[derive(Debug, thiserror::Error)]
pub enum SchemaError {
    /// No node or generic registered under this kind
    #[error("unknown kind: '{0}'")]
    UnknownKind(String),

    /// A node inherits from a generic that isn't registered
    #[error("'{kind}' inherits from unknown generic '{generic}'")]
    UnknownGeneric {
        /// Inheriting node
        kind: String,
        /// Generic it names
        generic: String,
    },

    /// Two definitions share a kind
    #[error("kind registered twice: '{0}'")]
    DuplicateKind(String),

    /// Schema document is not valid JSON
    #[error("invalid schema JSON: {0}")]
    InvalidJson(#[from] serde_json::Error),

    /// Schema document is not valid YAML
    #[error("invalid schema YAML: {0}")]
    InvalidYaml(#[from] serde_yaml::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_names_the_kind() {
        let err = SchemaError::UnknownGeneric {
            kind: "InfraDevice".to_string(),
            generic: "InfraEndpoint".to_string(),
        };
        assert!(err.to_string().contains("InfraEndpoint"));
        assert!(SchemaError::UnknownKind("X".into()).to_string().contains("'X'"));
    }
}
