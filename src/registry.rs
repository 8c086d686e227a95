// Copyright 2025 Cowboy AI, LLC.

//! Registry of composites and the types folded into them
//!
//! Each entry maps a composite identifier to the composite type, the ordered
//! list of contributing types (index 0 is the base) and the capability set
//! used by [`having`](crate::having). Entries are only ever appended.
//!
//! A `Registry` is a cloneable handle; all clones share the same state.
//! Allocation together with registration, and every append, run under a
//! single lock so identifiers are never shared and lists are never read
//! mid-append.

use crate::config::CompositionConfig;
use crate::errors::{TraitError, TraitResult};
use crate::identifiers::{CompositeId, TypeKey};
use crate::types::{Type, WeakType};
use indexmap::IndexMap;
use once_cell::sync::Lazy;
use parking_lot::Mutex;
use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;
use tracing::debug;

static GLOBAL: Lazy<Registry> = Lazy::new(Registry::new);

struct RegistryEntry {
    composite: WeakType,
    contributors: Vec<Type>,
    capabilities: HashSet<TypeKey>,
    sealed: bool,
}

#[derive(Default)]
struct RegistryState {
    next_id: u64,
    entries: IndexMap<CompositeId, RegistryEntry>,
}

/// Store of composite identifiers, their types and contributing types
#[derive(Clone)]
pub struct Registry {
    state: Arc<Mutex<RegistryState>>,
    config: Arc<CompositionConfig>,
}

impl Registry {
    /// Create an empty registry with the default configuration
    pub fn new() -> Self {
        Self::with_config(CompositionConfig::default())
    }

    /// Create an empty registry with an explicit configuration
    pub fn with_config(config: CompositionConfig) -> Self {
        Self {
            state: Arc::new(Mutex::new(RegistryState::default())),
            config: Arc::new(config),
        }
    }

    /// The process-wide registry, created on first use
    pub fn global() -> &'static Registry {
        &GLOBAL
    }

    /// Configuration applied to this registry's composites
    pub fn config(&self) -> &CompositionConfig {
        &self.config
    }

    /// Reserve the next identifier
    pub fn allocate(&self) -> TraitResult<CompositeId> {
        let mut state = self.state.lock();
        let id = next_id(&mut state)?;
        debug!(composite_id = %id, "Allocated composite id");
        Ok(id)
    }

    /// Record a composite and its initial contributing types
    ///
    /// Returns `false` and leaves the registry untouched if the identifier
    /// is already registered, or is `u64::MAX` (no successor could follow it).
    pub fn register(&self, id: CompositeId, composite: &Type, initial: Vec<Type>) -> bool {
        let mut state = self.state.lock();
        insert_entry(&mut state, id, composite, initial)
    }

    /// Allocate an identifier and register the composite built for it, atomically
    pub(crate) fn allocate_and_register<F>(
        &self,
        base: &Type,
        build: F,
    ) -> TraitResult<(CompositeId, Type)>
    where
        F: FnOnce(CompositeId) -> Type,
    {
        let mut state = self.state.lock();
        let id = next_id(&mut state)?;
        let composite = build(id);
        insert_entry(&mut state, id, &composite, vec![base.clone()]);
        debug!(composite_id = %id, base = %base.name(), "Registered composite");
        Ok((id, composite))
    }

    /// Append a trait to a composite's contributing types
    pub fn append_contribution(&self, id: CompositeId, trait_type: &Type) -> TraitResult<()> {
        self.append_contributions(id, std::slice::from_ref(trait_type))
    }

    /// Append several traits in one critical section
    ///
    /// Fails without appending anything if the composite is unknown or sealed.
    pub(crate) fn append_contributions(&self, id: CompositeId, traits: &[Type]) -> TraitResult<()> {
        let mut state = self.state.lock();
        let entry = state
            .entries
            .get_mut(&id)
            .ok_or(TraitError::UnknownComposite(id))?;
        if entry.sealed {
            return Err(TraitError::CompositeSealed(id));
        }
        for trait_type in traits {
            entry.capabilities.insert(trait_type.key());
            entry.contributors.push(trait_type.clone());
        }
        Ok(())
    }

    /// Composite type and contributing types for an identifier
    ///
    /// `None` if the identifier is unknown or the composite has been dropped.
    pub fn lookup(&self, id: CompositeId) -> Option<(Type, Vec<Type>)> {
        let state = self.state.lock();
        let entry = state.entries.get(&id)?;
        let composite = entry.composite.upgrade()?;
        Some((composite, entry.contributors.clone()))
    }

    /// Ordered contributing types; the base is first
    pub fn contributors(&self, id: CompositeId) -> Option<Vec<Type>> {
        let state = self.state.lock();
        state.entries.get(&id).map(|e| e.contributors.clone())
    }

    /// Keys of the base, the base's ancestors and every merged trait
    pub fn capabilities(&self, id: CompositeId) -> Option<HashSet<TypeKey>> {
        let state = self.state.lock();
        state.entries.get(&id).map(|e| e.capabilities.clone())
    }

    /// Whether both handles share the same state
    pub(crate) fn same_as(&self, other: &Registry) -> bool {
        Arc::ptr_eq(&self.state, &other.state)
    }

    pub(crate) fn has_capability(&self, id: CompositeId, key: TypeKey) -> bool {
        let state = self.state.lock();
        state
            .entries
            .get(&id)
            .is_some_and(|e| e.capabilities.contains(&key))
    }

    /// Whether the composite rejects further widening
    pub fn is_sealed(&self, id: CompositeId) -> bool {
        let state = self.state.lock();
        state.entries.get(&id).is_some_and(|e| e.sealed)
    }

    /// Seal a composite; returns `true` if it was open
    pub(crate) fn seal(&self, id: CompositeId) -> bool {
        let mut state = self.state.lock();
        match state.entries.get_mut(&id) {
            Some(entry) if !entry.sealed => {
                entry.sealed = true;
                true
            }
            _ => false,
        }
    }

    /// Registered identifiers, in allocation order
    pub fn ids(&self) -> Vec<CompositeId> {
        self.state.lock().entries.keys().copied().collect()
    }

    /// Number of registered composites
    pub fn len(&self) -> usize {
        self.state.lock().entries.len()
    }

    /// Check if empty
    pub fn is_empty(&self) -> bool {
        self.state.lock().entries.is_empty()
    }
}

fn next_id(state: &mut RegistryState) -> TraitResult<CompositeId> {
    let id = state.next_id;
    state.next_id = id.checked_add(1).ok_or(TraitError::IdentifiersExhausted)?;
    Ok(CompositeId::new(id))
}

fn insert_entry(
    state: &mut RegistryState,
    id: CompositeId,
    composite: &Type,
    initial: Vec<Type>,
) -> bool {
    let Some(successor) = id.as_u64().checked_add(1) else {
        return false;
    };
    if state.entries.contains_key(&id) {
        return false;
    }
    let mut capabilities = HashSet::new();
    for ty in &initial {
        capabilities.insert(ty.key());
        capabilities.extend(ty.ancestors().map(Type::key));
    }
    state.entries.insert(
        id,
        RegistryEntry {
            composite: composite.downgrade(),
            contributors: initial,
            capabilities,
            sealed: false,
        },
    );
    state.next_id = state.next_id.max(successor);
    true
}

impl Default for Registry {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Registry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.state.lock();
        f.debug_struct("Registry")
            .field("next_id", &state.next_id)
            .field("composites", &state.entries.len())
            .field("config", &self.config)
            .finish()
    }
}
