// Copyright 2025 Cowboy AI, LLC.

//! Members and member tables
//!
//! A type carries two tables: its static members and the instance members
//! shared by every object constructed from it. Objects carry a third table
//! with their own per-instance fields. Copying a descriptor between tables
//! clones values and `Arc`'d callables; it never runs them.

use crate::errors::TraitResult;
use crate::instance::Instance;
use crate::types::Type;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::sync::Arc;

/// Instance method, invoked with the receiving object and call arguments
pub type Method = Arc<dyn Fn(&mut Instance, &[Value]) -> TraitResult<Value> + Send + Sync>;

/// Static function, invoked with the type it was looked up on
pub type StaticFn = Arc<dyn Fn(&Type, &[Value]) -> TraitResult<Value> + Send + Sync>;

/// Accessor getter
pub type Getter = Arc<dyn Fn(&Instance) -> TraitResult<Value> + Send + Sync>;

/// Accessor setter
pub type Setter = Arc<dyn Fn(&mut Instance, Value) -> TraitResult<()> + Send + Sync>;

/// Where a member lives
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MemberScope {
    /// On the type itself
    Static,
    /// On instances, either shared (methods) or per-instance (fields)
    Instance,
}

impl fmt::Display for MemberScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MemberScope::Static => write!(f, "static"),
            MemberScope::Instance => write!(f, "instance"),
        }
    }
}

/// The value part of a member
#[derive(Clone)]
pub enum Member {
    /// Plain data
    Field(Value),
    /// Instance method
    Method(Method),
    /// Static function
    StaticFn(StaticFn),
    /// Computed property
    Accessor {
        /// Getter, if readable
        get: Option<Getter>,
        /// Setter, if writable
        set: Option<Setter>,
    },
}

impl Member {
    /// Short name of the member kind, used in logs and debug output
    pub fn kind(&self) -> &'static str {
        match self {
            Member::Field(_) => "field",
            Member::Method(_) => "method",
            Member::StaticFn(_) => "static_fn",
            Member::Accessor { .. } => "accessor",
        }
    }

    /// Whether the member can be called
    pub fn is_callable(&self) -> bool {
        matches!(self, Member::Method(_) | Member::StaticFn(_))
    }
}

impl fmt::Debug for Member {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Member::Field(value) => f.debug_tuple("Field").field(value).finish(),
            Member::Accessor { get, set } => f
                .debug_struct("Accessor")
                .field("get", &get.is_some())
                .field("set", &set.is_some())
                .finish(),
            other => write!(f, "{}", other.kind()),
        }
    }
}

/// A member together with its attributes
#[derive(Debug, Clone)]
pub struct MemberDescriptor {
    /// The member itself
    pub member: Member,
    /// Whether the member is listed when enumerating visible names
    pub enumerable: bool,
    /// Whether a field may be reassigned
    pub writable: bool,
}

impl MemberDescriptor {
    /// Writable, enumerable data field
    pub fn field(value: impl Into<Value>) -> Self {
        Self {
            member: Member::Field(value.into()),
            enumerable: true,
            writable: true,
        }
    }

    /// Instance method
    pub fn method<F>(f: F) -> Self
    where
        F: Fn(&mut Instance, &[Value]) -> TraitResult<Value> + Send + Sync + 'static,
    {
        Self {
            member: Member::Method(Arc::new(f)),
            enumerable: false,
            writable: true,
        }
    }

    /// Static function
    pub fn static_fn<F>(f: F) -> Self
    where
        F: Fn(&Type, &[Value]) -> TraitResult<Value> + Send + Sync + 'static,
    {
        Self {
            member: Member::StaticFn(Arc::new(f)),
            enumerable: false,
            writable: true,
        }
    }

    /// Accessor from an optional getter and setter
    pub fn accessor(get: Option<Getter>, set: Option<Setter>) -> Self {
        Self {
            member: Member::Accessor { get, set },
            enumerable: false,
            writable: true,
        }
    }

    /// Mark the member read-only
    pub fn read_only(mut self) -> Self {
        self.writable = false;
        self
    }

    /// Hide the member from enumeration
    pub fn hidden(mut self) -> Self {
        self.enumerable = false;
        self
    }
}

/// Insertion-ordered table of named members
#[derive(Clone, Default)]
pub struct MemberTable {
    members: IndexMap<String, MemberDescriptor>,
}

impl MemberTable {
    /// Create an empty table
    pub fn new() -> Self {
        Self {
            members: IndexMap::new(),
        }
    }

    /// Install a descriptor, returning the one it replaced
    pub fn define(
        &mut self,
        name: impl Into<String>,
        descriptor: MemberDescriptor,
    ) -> Option<MemberDescriptor> {
        self.members.insert(name.into(), descriptor)
    }

    /// Look up a descriptor
    pub fn get(&self, name: &str) -> Option<&MemberDescriptor> {
        self.members.get(name)
    }

    /// Look up a descriptor for modification
    pub fn get_mut(&mut self, name: &str) -> Option<&mut MemberDescriptor> {
        self.members.get_mut(name)
    }

    /// Check if a name is defined
    pub fn contains(&self, name: &str) -> bool {
        self.members.contains_key(name)
    }

    /// Own member names, in definition order
    pub fn names(&self) -> Vec<String> {
        self.members.keys().cloned().collect()
    }

    /// Names of the enumerable members, in definition order
    pub fn visible_names(&self) -> Vec<String> {
        self.members
            .iter()
            .filter(|(_, descriptor)| descriptor.enumerable)
            .map(|(name, _)| name.clone())
            .collect()
    }

    /// Iterate over members in definition order
    pub fn iter(&self) -> impl Iterator<Item = (&String, &MemberDescriptor)> {
        self.members.iter()
    }

    /// Get the number of members
    pub fn len(&self) -> usize {
        self.members.len()
    }

    /// Check if empty
    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }
}

impl fmt::Debug for MemberTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map()
            .entries(self.members.iter().map(|(name, d)| (name, d.member.kind())))
            .finish()
    }
}
