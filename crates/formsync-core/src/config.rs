//! Engine configuration

use serde::{Deserialize, Serialize};

use crate::permission::PermissionPolicy;

/// Settings for [`FormEngine`](crate::FormEngine)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Fail on values and filters that would otherwise be left out
    pub strict: bool,
    /// Anyone may view objects, whatever the permission records say
    pub allow_anonymous_access: bool,
}

impl EngineConfig {
    /// Create default configuration (best-effort, no anonymous access)
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// With strict mode
    #[inline]
    #[must_use]
    pub fn with_strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    /// With anonymous view access
    #[inline]
    #[must_use]
    pub fn with_anonymous_access(mut self, allow: bool) -> Self {
        self.allow_anonymous_access = allow;
        self
    }

    /// Permission policy derived from this configuration
    #[inline]
    #[must_use]
    pub fn permission_policy(&self) -> PermissionPolicy {
        PermissionPolicy {
            allow_anonymous_access: self.allow_anonymous_access,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_lenient() {
        let config = EngineConfig::new();
        assert!(!config.strict);
        assert!(!config.allow_anonymous_access);
    }

    #[test]
    fn missing_keys_use_defaults() {
        let config: EngineConfig = serde_json::from_str(r#"{"strict": true}"#).unwrap();
        assert_eq!(config, EngineConfig::new().with_strict(true));
        assert!(!config.permission_policy().allow_anonymous_access);
    }
}
