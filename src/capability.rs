// Copyright 2025 Cowboy AI, LLC.

//! Capability tests: is an object or type related to a base or trait type?

use crate::composite::CompositeType;
use crate::instance::Instance;
use crate::types::Type;

/// What a capability test is asked about
#[derive(Debug, Clone, Copy)]
pub enum Target<'a> {
    /// An object; resolved to the type that constructed it
    Instance(&'a Instance),
    /// A type
    Type(&'a Type),
}

impl<'a> Target<'a> {
    fn resolve(self) -> &'a Type {
        match self {
            Target::Instance(instance) => instance.type_of(),
            Target::Type(ty) => ty,
        }
    }
}

impl<'a> From<&'a Instance> for Target<'a> {
    fn from(instance: &'a Instance) -> Self {
        Target::Instance(instance)
    }
}

impl<'a> From<&'a Type> for Target<'a> {
    fn from(ty: &'a Type) -> Self {
        Target::Type(ty)
    }
}

impl<'a> From<&'a CompositeType> for Target<'a> {
    fn from(composite: &'a CompositeType) -> Self {
        Target::Type(composite.as_type())
    }
}

/// Whether `target` is related to `test_type`
///
/// True when `test_type` is an ancestor of the target's type, or when the
/// target's type is (or extends) a composite whose base, base ancestors or
/// merged traits include `test_type`. A type is not related to itself.
///
/// # Example
///
/// ```
/// use cim_traits::{having, Registry, TypeBuilder};
///
/// let registry = Registry::new();
/// let animal = TypeBuilder::new("Animal").build();
/// let flyable = TypeBuilder::new("Flyable").field("canFly", true).build();
/// let plain = TypeBuilder::new("Plain").build();
///
/// let bird = registry.basing(&animal).unwrap().with([&flyable]).unwrap();
/// let tweety = bird.construct(&[]).unwrap();
///
/// assert!(having(&tweety, &animal));
/// assert!(having(&tweety, &flyable));
/// assert!(!having(&tweety, &plain));
/// ```
pub fn having<'a>(target: impl Into<Target<'a>>, test_type: &Type) -> bool {
    let ty = target.into().resolve();

    if is_subclass(ty, test_type) {
        return true;
    }

    match ty.nearest_composite() {
        Some(state) => state.registry.has_capability(state.id, test_type.key()),
        None => false,
    }
}

/// Whether `candidate` appears in `ty`'s ancestor chain, starting at the parent
pub fn is_subclass(ty: &Type, candidate: &Type) -> bool {
    ty.ancestors().any(|ancestor| ancestor == candidate)
}
