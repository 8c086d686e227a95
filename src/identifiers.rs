// Copyright 2025 Cowboy AI, LLC.

//! Identifier types for types and composites

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Identity of a declared type
///
/// Every `Type` gets a fresh key when it is built. Two handles denote the
/// same type iff their keys are equal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TypeKey(Uuid);

impl TypeKey {
    /// Create a new random type key
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Create from a UUID
    pub fn from_uuid(id: Uuid) -> Self {
        Self(id)
    }

    /// Get the underlying UUID
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for TypeKey {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for TypeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Composite ID - allocated by a registry, strictly increasing, never reused
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CompositeId(u64);

impl CompositeId {
    /// Wrap a raw identifier
    pub fn new(id: u64) -> Self {
        Self(id)
    }

    /// Get the raw identifier
    pub fn as_u64(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for CompositeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<CompositeId> for u64 {
    fn from(id: CompositeId) -> Self {
        id.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_type_keys_are_unique() {
        let a = TypeKey::new();
        let b = TypeKey::new();
        assert_ne!(a, b);

        let uuid = Uuid::new_v4();
        assert_eq!(TypeKey::from_uuid(uuid).as_uuid(), &uuid);
    }

    #[test]
    fn test_composite_id_ordering_and_display() {
        let first = CompositeId::new(0);
        let second = CompositeId::new(1);
        assert!(first < second);
        assert_eq!(second.to_string(), "1");
        assert_eq!(u64::from(second), 1);
    }

    #[test]
    fn test_composite_id_serde() {
        let id = CompositeId::new(7);
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, "7");
    }
}
