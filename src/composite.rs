// Copyright 2025 Cowboy AI, LLC.

//! Composite types: a base type widened with trait types
//!
//! ```mermaid
//! graph LR
//!     B[basing] --> W[with]
//!     W --> W
//!     W --> I[construct]
//!     I --> H[having]
//! ```
//!
//! [`basing`] wraps a base type in a fresh composite. [`CompositeType::with`]
//! merges trait types into it in place: trait statics land on the composite
//! itself, trait methods on its shared instance table. Every construction
//! then copies a fresh set of each trait's per-instance fields onto the new
//! object.

use crate::errors::{TraitError, TraitResult};
use crate::identifiers::{CompositeId, TypeKey};
use crate::instance::Instance;
use crate::member::{MemberDescriptor, MemberScope};
use crate::registry::Registry;
use crate::types::{CompositeState, Type};
use indexmap::IndexMap;
use parking_lot::Mutex;
use serde_json::Value;
use std::collections::HashSet;
use std::ops::Deref;
use tracing::{debug, warn};

/// Static member every composite owns, holding its identifier
pub const COMPOSITE_ID: &str = "composite_id";

/// A type produced by wrapping a base type, widened by trait types
///
/// Derefs to the underlying [`Type`]. All clones refer to the same
/// composite; widening one widens them all.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CompositeType {
    ty: Type,
    id: CompositeId,
}

/// Wrap a base type in a new composite registered in the global registry
///
/// Fails with [`TraitError::IdentifiersExhausted`] once the registry has
/// handed out every identifier.
pub fn basing(base: &Type) -> TraitResult<CompositeType> {
    Registry::global().basing(base)
}

impl Registry {
    /// Wrap a base type in a new composite registered in this registry
    pub fn basing(&self, base: &Type) -> TraitResult<CompositeType> {
        let mut reserved_statics = vec![COMPOSITE_ID.to_string()];
        reserved_statics.extend(self.config().reserved_statics.iter().cloned());

        let (id, ty) = self.allocate_and_register(base, |id| {
            Type::composite(
                base,
                CompositeState {
                    id,
                    registry: self.clone(),
                    reserved_statics,
                    merge_lock: Mutex::new(()),
                },
            )
        })?;
        Ok(CompositeType { ty, id })
    }
}

impl CompositeType {
    /// Identifier allocated for this composite
    pub fn id(&self) -> CompositeId {
        self.id
    }

    /// The composite as a plain type handle
    pub fn as_type(&self) -> &Type {
        &self.ty
    }

    /// Unwrap into the plain type handle
    pub fn into_type(self) -> Type {
        self.ty
    }

    /// Registry the composite was allocated from
    pub fn registry(&self) -> &Registry {
        &self.state().registry
    }

    /// Ordered contributing types; the base is first
    pub fn contributors(&self) -> Vec<Type> {
        self.registry().contributors(self.id).unwrap_or_default()
    }

    /// The wrapped base type
    pub fn base(&self) -> &Type {
        self.ty
            .parent()
            .unwrap_or_else(|| unreachable!("composite types always have a base"))
    }

    /// Whether further widening is rejected
    pub fn is_sealed(&self) -> bool {
        self.registry().is_sealed(self.id)
    }

    /// Merge trait types into this composite
    ///
    /// All traits are validated before anything is applied: a static or
    /// instance member that already resolves on the composite (including the
    /// base and its ancestors), or that two supplied traits both define,
    /// fails the whole call with [`TraitError::MemberConflict`] and leaves
    /// the composite unchanged. A trait that already includes this
    /// composite, through its ancestors or its own contributors, fails with
    /// [`TraitError::CyclicComposition`].
    ///
    /// Concurrent calls on the same composite are serialised, so two traits
    /// defining the same member can never both be merged.
    pub fn with<'a, I>(&self, traits: I) -> TraitResult<CompositeType>
    where
        I: IntoIterator<Item = &'a Type>,
    {
        let traits: Vec<Type> = traits.into_iter().cloned().collect();
        if traits.is_empty() {
            return Ok(self.clone());
        }

        let _merge = self.state().merge_lock.lock();
        if self.is_sealed() {
            warn!(composite_id = %self.id, "Rejected merge into sealed composite");
            return Err(TraitError::CompositeSealed(self.id));
        }

        let staged = match self.validate(&traits) {
            Ok(staged) => staged,
            Err(err) => {
                warn!(composite_id = %self.id, error = %err, "Rejected trait merge");
                return Err(err);
            }
        };

        self.registry().append_contributions(self.id, &traits)?;
        {
            let mut statics = self.ty.statics_mut();
            for (name, descriptor) in staged.statics {
                statics.define(name, descriptor);
            }
        }
        {
            let mut prototype = self.ty.prototype_mut();
            for (name, descriptor) in staged.methods {
                prototype.define(name, descriptor);
            }
        }

        debug!(
            composite_id = %self.id,
            traits = ?traits.iter().map(Type::name).collect::<Vec<_>>(),
            "Merged traits into composite"
        );
        Ok(self.clone())
    }

    /// Construct a new object of this composite
    pub fn construct(&self, args: &[Value]) -> TraitResult<Instance> {
        self.ty.construct(args)
    }

    fn validate(&self, traits: &[Type]) -> TraitResult<StagedMembers> {
        let reserved = &self.state().reserved_statics;
        let mut staged = StagedMembers::default();

        for trait_type in traits {
            if self.is_included_by(trait_type) {
                return Err(TraitError::CyclicComposition {
                    composite: self.id,
                    contributor: trait_type.name().to_string(),
                });
            }

            for (name, descriptor) in trait_type.own_static_members() {
                if reserved.contains(&name) {
                    continue;
                }
                if self.ty.has_static(&name) || staged.statics.contains_key(&name) {
                    return Err(TraitError::conflict(
                        name,
                        MemberScope::Static,
                        trait_type.name(),
                    ));
                }
                staged.statics.insert(name, descriptor);
            }

            for (name, descriptor) in trait_type.own_instance_members() {
                if self.ty.has_instance_member(&name) || staged.methods.contains_key(&name) {
                    return Err(TraitError::conflict(
                        name,
                        MemberScope::Instance,
                        trait_type.name(),
                    ));
                }
                staged.methods.insert(name, descriptor);
            }
        }
        Ok(staged)
    }

    /// Whether constructing `trait_type` would construct this composite
    ///
    /// Walks the trait's lineage and, for every composite met on the way,
    /// that composite's contributors.
    fn is_included_by(&self, trait_type: &Type) -> bool {
        let registry = self.registry();
        let mut pending = vec![trait_type.clone()];
        let mut visited: HashSet<TypeKey> = HashSet::new();

        while let Some(ty) = pending.pop() {
            if !visited.insert(ty.key()) {
                continue;
            }
            for member in ty.lineage() {
                let Some(state) = member.composite_state() else {
                    continue;
                };
                if state.id == self.id && state.registry.same_as(registry) {
                    return true;
                }
                let contributors = state.registry.contributors(state.id).unwrap_or_default();
                pending.extend(contributors.into_iter().filter(|c| !visited.contains(&c.key())));
            }
        }
        false
    }

    fn state(&self) -> &CompositeState {
        self.ty
            .composite_state()
            .unwrap_or_else(|| unreachable!("composite types carry their state"))
    }
}

impl Deref for CompositeType {
    type Target = Type;

    fn deref(&self) -> &Type {
        &self.ty
    }
}

impl AsRef<Type> for CompositeType {
    fn as_ref(&self) -> &Type {
        &self.ty
    }
}

impl From<CompositeType> for Type {
    fn from(composite: CompositeType) -> Self {
        composite.ty
    }
}

#[derive(Default)]
struct StagedMembers {
    statics: IndexMap<String, MemberDescriptor>,
    methods: IndexMap<String, MemberDescriptor>,
}

/// Copy a fresh set of every trait's per-instance fields onto `instance`
///
/// Runs as the composite's own construction step, after the base
/// initializers. Seals the composite after its first successful
/// construction when the registry is configured to.
pub(crate) fn initialize_traits(
    state: &CompositeState,
    instance: &mut Instance,
) -> TraitResult<()> {
    let contributors = state
        .registry
        .contributors(state.id)
        .ok_or(TraitError::UnknownComposite(state.id))?;

    for trait_type in contributors.iter().skip(1) {
        let scratch = trait_type.construct(&[])?;
        for (name, descriptor) in scratch.own_fields() {
            if instance.has_member(name) {
                warn!(composite_id = %state.id, member = %name, "Per-instance field conflict");
                return Err(TraitError::conflict(
                    name.clone(),
                    MemberScope::Instance,
                    trait_type.name(),
                ));
            }
            instance.define(name.clone(), descriptor.clone());
        }
    }

    if state.registry.config().seal_on_instantiate && state.registry.seal(state.id) {
        debug!(composite_id = %state.id, "Sealed composite on first instantiation");
    }
    Ok(())
}
