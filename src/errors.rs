// Copyright 2025 Cowboy AI, LLC.

//! Error types for composition operations

use crate::identifiers::CompositeId;
use crate::member::MemberScope;
use thiserror::Error;

/// Errors that can occur while composing types or using their members
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TraitError {
    /// Two contributing types define a member of the same name
    #[error("{scope} member {name} already exists or conflicts with another trait (contributed by {contributor})")]
    MemberConflict {
        /// Name of the conflicting member
        name: String,
        /// Whether the conflict is on the type itself or on its instances
        scope: MemberScope,
        /// Name of the type whose member could not be merged
        contributor: String,
    },

    /// The composite was instantiated and can no longer be widened
    #[error("Composite {0} is sealed after its first instantiation")]
    CompositeSealed(CompositeId),

    /// A trait would make the composite include itself
    #[error("Composite {composite} cannot include {contributor}, which already includes it")]
    CyclicComposition {
        /// Composite being widened
        composite: CompositeId,
        /// Name of the rejected trait
        contributor: String,
    },

    /// The registry has no identifiers left to allocate
    #[error("Composite identifiers exhausted")]
    IdentifiersExhausted,

    /// No registry entry exists for the composite
    #[error("Unknown composite: {0}")]
    UnknownComposite(CompositeId),

    /// Member lookup failed
    #[error("Member not found: {name} on {type_name}")]
    MemberNotFound {
        /// Member that was looked up
        name: String,
        /// Type the lookup started from
        type_name: String,
    },

    /// The member exists but cannot be invoked
    #[error("Member {0} is not callable")]
    NotCallable(String),

    /// The member exists but is not a data field
    #[error("Member {0} is not a data field")]
    NotAField(String),

    /// The member exists but cannot be assigned
    #[error("Member {0} is read-only")]
    ReadOnly(String),

    /// A constructor or method rejected its arguments
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Configuration could not be loaded or is invalid
    #[error("Configuration error: {0}")]
    Configuration(String),
}

/// Result type for composition operations
pub type TraitResult<T> = Result<T, TraitError>;

impl From<serde_json::Error> for TraitError {
    fn from(err: serde_json::Error) -> Self {
        TraitError::Configuration(err.to_string())
    }
}

impl TraitError {
    /// Create a member conflict error
    pub fn conflict(
        name: impl Into<String>,
        scope: MemberScope,
        contributor: impl Into<String>,
    ) -> Self {
        TraitError::MemberConflict {
            name: name.into(),
            scope,
            contributor: contributor.into(),
        }
    }

    /// Check if this is a member conflict
    pub fn is_conflict(&self) -> bool {
        matches!(self, TraitError::MemberConflict { .. })
    }

    /// Name of the conflicting member, if this is a member conflict
    pub fn conflicting_member(&self) -> Option<&str> {
        match self {
            TraitError::MemberConflict { name, .. } => Some(name),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Test error display messages
    ///
    /// ```mermaid
    /// graph TD
    ///     A[TraitError] -->|Display| B[Error Message]
    ///     A -->|conflicting_member| C[Option<&str>]
    /// ```
    #[test]
    fn test_error_display_messages() {
        let err = TraitError::conflict("foo", MemberScope::Instance, "B");
        assert_eq!(
            err.to_string(),
            "instance member foo already exists or conflicts with another trait (contributed by B)"
        );

        let err = TraitError::conflict("VERSION", MemberScope::Static, "Versioned");
        assert_eq!(
            err.to_string(),
            "static member VERSION already exists or conflicts with another trait (contributed by Versioned)"
        );

        let err = TraitError::CompositeSealed(CompositeId::new(3));
        assert_eq!(err.to_string(), "Composite 3 is sealed after its first instantiation");

        let err = TraitError::MemberNotFound {
            name: "fly".to_string(),
            type_name: "Animal".to_string(),
        };
        assert_eq!(err.to_string(), "Member not found: fly on Animal");

        let err = TraitError::CyclicComposition {
            composite: CompositeId::new(1),
            contributor: "Animal#1".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Composite 1 cannot include Animal#1, which already includes it"
        );
    }

    #[test]
    fn test_error_classification() {
        let err = TraitError::conflict("x", MemberScope::Instance, "T");
        assert!(err.is_conflict());
        assert_eq!(err.conflicting_member(), Some("x"));

        let err = TraitError::NotCallable("canFly".to_string());
        assert!(!err.is_conflict());
        assert_eq!(err.conflicting_member(), None);
    }

    #[test]
    fn test_from_serde_json_error() {
        let parse_err = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let err: TraitError = parse_err.into();
        assert!(matches!(err, TraitError::Configuration(_)));
    }
}
