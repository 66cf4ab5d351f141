//! Errors surfaced while validating scripting variables and planning synchronization
//!
//! Every error here is a translation-time diagnostic: the computation is pure, so
//! nothing is retried and nothing is deferred to runtime.

use crate::variable::VariableScope;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ScopeError {
    #[error("Invalid scripting variable '{name}': {reason}")]
    InvalidDescriptor { name: String, reason: String },
    #[error("Duplicate scripting variable '{name}': {first} and {second} visibility overlap")]
    DuplicateVariableName {
        name: String,
        first: VariableScope,
        second: VariableScope,
    },
    #[error("Scripting variable '{name}' has no scope window")]
    UnscopedVariable { name: String },
}

impl ScopeError {
    pub(crate) fn invalid(name: impl Into<String>, reason: impl Into<String>) -> Self {
        ScopeError::InvalidDescriptor {
            name: name.into(),
            reason: reason.into(),
        }
    }

    /// Internal-consistency faults are never expected for validated input.
    pub fn is_internal(&self) -> bool {
        matches!(self, ScopeError::UnscopedVariable { .. })
    }
}

/// A [`ScopeError`] or lookup failure attributed to one tag invocation.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TranslationError {
    #[error("Unknown tag '{tag}'")]
    UnknownTag { tag: String },
    #[error("Tag '{tag}': attribute '{attribute}' naming a scripting variable is missing")]
    MissingAttribute { tag: String, attribute: String },
    #[error("Tag '{tag}': {source}")]
    Scope { tag: String, source: ScopeError },
}

impl TranslationError {
    pub fn tag(&self) -> &str {
        match self {
            TranslationError::UnknownTag { tag }
            | TranslationError::MissingAttribute { tag, .. }
            | TranslationError::Scope { tag, .. } => tag,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn duplicate_message_names_both_scopes() {
        let err = ScopeError::DuplicateVariableName {
            name: "v".to_string(),
            first: VariableScope::AtBegin,
            second: VariableScope::Nested,
        };

        let msg = err.to_string();

        assert!(msg.contains("'v'"));
        assert!(msg.contains("AT_BEGIN"));
        assert!(msg.contains("NESTED"));
    }

    #[test]
    fn only_unscoped_is_internal() {
        assert!(ScopeError::UnscopedVariable { name: "x".into() }.is_internal());
        assert!(!ScopeError::invalid("x", "empty type").is_internal());
    }

    #[test]
    fn translation_error_keeps_tag_and_source() {
        use std::error::Error;

        let err = TranslationError::Scope {
            tag: "forEach".to_string(),
            source: ScopeError::invalid("1x", "not an identifier"),
        };

        assert_eq!(err.tag(), "forEach");
        assert!(err.to_string().starts_with("Tag 'forEach': "));
        assert!(err.source().is_some());
    }
}
