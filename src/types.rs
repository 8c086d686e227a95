// Copyright 2025 Cowboy AI, LLC.

//! Type descriptors with explicit member tables and parent pointers
//!
//! A [`Type`] is what the composition machinery works on: base types,
//! trait types and composite types are all `Type`s. Each one owns
//! - a static member table (members of the type itself),
//! - an instance member table shared by every object built from it,
//! - declared per-instance fields copied onto each new object,
//! - an optional initializer taking the constructor arguments,
//! - an optional parent forming the ancestor chain.
//!
//! # Example
//!
//! ```
//! use cim_traits::TypeBuilder;
//! use serde_json::{json, Value};
//!
//! let animal = TypeBuilder::new("Animal")
//!     .field("name", "unnamed")
//!     .method("speak", |this, _| {
//!         let name = this.get("name")?;
//!         Ok(json!(format!("{} speaks", name.as_str().unwrap_or("?"))))
//!     })
//!     .init(|this, args| {
//!         if let Some(name) = args.first() {
//!             this.set("name", name.clone())?;
//!         }
//!         Ok(())
//!     })
//!     .build();
//!
//! let mut rex = animal.construct(&[json!("Rex")]).unwrap();
//! assert_eq!(rex.call("speak", &[]).unwrap(), Value::from("Rex speaks"));
//! ```

use crate::composite;
use crate::errors::{TraitError, TraitResult};
use crate::identifiers::{CompositeId, TypeKey};
use crate::instance::Instance;
use crate::member::{Getter, Member, MemberDescriptor, MemberTable, Setter};
use crate::registry::Registry;
use parking_lot::{Mutex, RwLock, RwLockWriteGuard};
use serde_json::Value;
use std::fmt;
use std::sync::{Arc, Weak};
use tracing::trace;

/// Constructor body, run with the object under construction and the caller's arguments
pub type Initializer = Arc<dyn Fn(&mut Instance, &[Value]) -> TraitResult<()> + Send + Sync>;

/// Registry binding of a composite type
pub(crate) struct CompositeState {
    pub(crate) id: CompositeId,
    pub(crate) registry: Registry,
    /// Static names the composite owns before any trait is merged
    pub(crate) reserved_statics: Vec<String>,
    /// Held for the whole of a merge, from validation to commit
    pub(crate) merge_lock: Mutex<()>,
}

pub(crate) struct TypeInner {
    key: TypeKey,
    name: String,
    parent: Option<Type>,
    statics: RwLock<MemberTable>,
    prototype: RwLock<MemberTable>,
    fields: MemberTable,
    init: Option<Initializer>,
    composite: Option<CompositeState>,
}

/// Handle to a type descriptor
///
/// Cloning is cheap and yields the same type; equality is identity.
#[derive(Clone)]
pub struct Type {
    inner: Arc<TypeInner>,
}

/// Non-owning handle, used by the registry for composite types
#[derive(Clone)]
pub(crate) struct WeakType(Weak<TypeInner>);

impl WeakType {
    pub(crate) fn upgrade(&self) -> Option<Type> {
        self.0.upgrade().map(|inner| Type { inner })
    }
}

impl Type {
    /// Unique identity of this type
    pub fn key(&self) -> TypeKey {
        self.inner.key
    }

    /// Declared name
    pub fn name(&self) -> &str {
        &self.inner.name
    }

    /// Immediate parent, if any
    pub fn parent(&self) -> Option<&Type> {
        self.inner.parent.as_ref()
    }

    /// Walk the ancestor chain, starting at the immediate parent
    pub fn ancestors(&self) -> Ancestors<'_> {
        Ancestors {
            next: self.parent(),
        }
    }

    /// Whether this type was produced by wrapping a base type
    pub fn is_composite(&self) -> bool {
        self.inner.composite.is_some()
    }

    /// Identifier of this composite, or of the nearest composite ancestor
    pub fn composite_id(&self) -> Option<CompositeId> {
        self.nearest_composite().map(|state| state.id)
    }

    pub(crate) fn nearest_composite(&self) -> Option<&CompositeState> {
        std::iter::once(self)
            .chain(self.ancestors())
            .find_map(|ty| ty.inner.composite.as_ref())
    }

    pub(crate) fn composite_state(&self) -> Option<&CompositeState> {
        self.inner.composite.as_ref()
    }

    /// Names of the static members defined directly on this type
    pub fn own_static_names(&self) -> Vec<String> {
        self.inner.statics.read().names()
    }

    /// Names of the enumerable statics defined directly on this type
    pub fn visible_static_names(&self) -> Vec<String> {
        self.inner.statics.read().visible_names()
    }

    /// Snapshot of the static members defined directly on this type
    pub fn own_static_members(&self) -> Vec<(String, MemberDescriptor)> {
        snapshot(&self.inner.statics.read())
    }

    /// Names of the shared instance members defined directly on this type
    pub fn own_instance_member_names(&self) -> Vec<String> {
        self.inner.prototype.read().names()
    }

    /// Snapshot of the shared instance members defined directly on this type
    pub fn own_instance_members(&self) -> Vec<(String, MemberDescriptor)> {
        snapshot(&self.inner.prototype.read())
    }

    /// Names of the per-instance fields this type declares
    pub fn declared_field_names(&self) -> Vec<String> {
        self.inner.fields.names()
    }

    /// Resolve a static member along the ancestor chain
    pub fn static_member(&self, name: &str) -> Option<MemberDescriptor> {
        self.lineage()
            .find_map(|ty| ty.inner.statics.read().get(name).cloned())
    }

    /// Whether a static member is reachable from this type
    pub fn has_static(&self, name: &str) -> bool {
        self.lineage().any(|ty| ty.inner.statics.read().contains(name))
    }

    /// Resolve a shared instance member along the ancestor chain
    pub fn instance_member(&self, name: &str) -> Option<MemberDescriptor> {
        self.lineage()
            .find_map(|ty| ty.inner.prototype.read().get(name).cloned())
    }

    /// Whether a shared instance member is reachable from this type
    pub fn has_instance_member(&self, name: &str) -> bool {
        self.lineage().any(|ty| ty.inner.prototype.read().contains(name))
    }

    /// Read a static data member
    pub fn get_static(&self, name: &str) -> TraitResult<Value> {
        match self.static_member(name).map(|d| d.member) {
            Some(Member::Field(value)) => Ok(value),
            Some(_) => Err(TraitError::NotAField(name.to_string())),
            None => Err(self.not_found(name)),
        }
    }

    /// Call a static function
    pub fn call_static(&self, name: &str, args: &[Value]) -> TraitResult<Value> {
        match self.static_member(name).map(|d| d.member) {
            Some(Member::StaticFn(f)) => f(self, args),
            Some(_) => Err(TraitError::NotCallable(name.to_string())),
            None => Err(self.not_found(name)),
        }
    }

    /// Construct a new object
    ///
    /// Ancestors initialize first, root-most first, each receiving the same
    /// arguments. A composite then copies the per-instance state of every
    /// trait it includes.
    pub fn construct(&self, args: &[Value]) -> TraitResult<Instance> {
        let mut instance = Instance::new(self.clone());
        self.initialize(&mut instance, args)?;
        trace!(
            type_name = %self.name(),
            fields = instance.own_field_names().len(),
            "Constructed instance"
        );
        Ok(instance)
    }

    fn initialize(&self, instance: &mut Instance, args: &[Value]) -> TraitResult<()> {
        if let Some(parent) = self.parent() {
            parent.initialize(instance, args)?;
        }
        for (name, descriptor) in self.inner.fields.iter() {
            instance.define(name.clone(), descriptor.clone());
        }
        if let Some(init) = &self.inner.init {
            init(instance, args)?;
        }
        if let Some(state) = &self.inner.composite {
            composite::initialize_traits(state, instance)?;
        }
        Ok(())
    }

    pub(crate) fn statics_mut(&self) -> RwLockWriteGuard<'_, MemberTable> {
        self.inner.statics.write()
    }

    pub(crate) fn prototype_mut(&self) -> RwLockWriteGuard<'_, MemberTable> {
        self.inner.prototype.write()
    }

    pub(crate) fn downgrade(&self) -> WeakType {
        WeakType(Arc::downgrade(&self.inner))
    }

    pub(crate) fn not_found(&self, name: &str) -> TraitError {
        TraitError::MemberNotFound {
            name: name.to_string(),
            type_name: self.name().to_string(),
        }
    }

    /// This type followed by its ancestors
    pub(crate) fn lineage(&self) -> impl Iterator<Item = &Type> {
        std::iter::once(self).chain(self.ancestors())
    }

    /// Build the composite wrapper around `base`
    pub(crate) fn composite(base: &Type, state: CompositeState) -> Type {
        let mut statics = MemberTable::new();
        statics.define(
            composite::COMPOSITE_ID,
            MemberDescriptor::field(state.id.as_u64()).read_only().hidden(),
        );
        Type {
            inner: Arc::new(TypeInner {
                key: TypeKey::new(),
                name: format!("{}#{}", base.name(), state.id),
                parent: Some(base.clone()),
                statics: RwLock::new(statics),
                prototype: RwLock::new(MemberTable::new()),
                fields: MemberTable::new(),
                init: None,
                composite: Some(state),
            }),
        }
    }
}

fn snapshot(table: &MemberTable) -> Vec<(String, MemberDescriptor)> {
    table
        .iter()
        .map(|(name, descriptor)| (name.clone(), descriptor.clone()))
        .collect()
}

impl PartialEq for Type {
    fn eq(&self, other: &Self) -> bool {
        self.inner.key == other.inner.key
    }
}

impl Eq for Type {}

impl std::hash::Hash for Type {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.inner.key.hash(state);
    }
}

impl fmt::Debug for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Type")
            .field("name", &self.inner.name)
            .field("parent", &self.parent().map(Type::name))
            .field("composite_id", &self.inner.composite.as_ref().map(|s| s.id))
            .finish()
    }
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.inner.name)
    }
}

/// Iterator over a type's ancestor chain
pub struct Ancestors<'a> {
    next: Option<&'a Type>,
}

impl<'a> Iterator for Ancestors<'a> {
    type Item = &'a Type;

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.next?;
        self.next = current.parent();
        Some(current)
    }
}

/// Fluent declaration of base and trait types
#[must_use]
pub struct TypeBuilder {
    name: String,
    parent: Option<Type>,
    statics: MemberTable,
    prototype: MemberTable,
    fields: MemberTable,
    init: Option<Initializer>,
}

impl TypeBuilder {
    /// Start declaring a type
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            parent: None,
            statics: MemberTable::new(),
            prototype: MemberTable::new(),
            fields: MemberTable::new(),
            init: None,
        }
    }

    /// Set the parent type
    pub fn extends(mut self, parent: &Type) -> Self {
        self.parent = Some(parent.clone());
        self
    }

    /// Writable static data member
    pub fn static_field(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.statics.define(name, MemberDescriptor::field(value));
        self
    }

    /// Read-only static data member
    pub fn static_const(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.statics
            .define(name, MemberDescriptor::field(value).read_only());
        self
    }

    /// Static function
    pub fn static_fn<F>(mut self, name: impl Into<String>, f: F) -> Self
    where
        F: Fn(&Type, &[Value]) -> TraitResult<Value> + Send + Sync + 'static,
    {
        self.statics.define(name, MemberDescriptor::static_fn(f));
        self
    }

    /// Shared instance method
    pub fn method<F>(mut self, name: impl Into<String>, f: F) -> Self
    where
        F: Fn(&mut Instance, &[Value]) -> TraitResult<Value> + Send + Sync + 'static,
    {
        self.prototype.define(name, MemberDescriptor::method(f));
        self
    }

    /// Shared read-only computed property
    pub fn getter<G>(mut self, name: impl Into<String>, get: G) -> Self
    where
        G: Fn(&Instance) -> TraitResult<Value> + Send + Sync + 'static,
    {
        let get: Getter = Arc::new(get);
        self.prototype
            .define(name, MemberDescriptor::accessor(Some(get), None));
        self
    }

    /// Shared computed property with getter and setter
    pub fn accessor<G, S>(mut self, name: impl Into<String>, get: G, set: S) -> Self
    where
        G: Fn(&Instance) -> TraitResult<Value> + Send + Sync + 'static,
        S: Fn(&mut Instance, Value) -> TraitResult<()> + Send + Sync + 'static,
    {
        let get: Getter = Arc::new(get);
        let set: Setter = Arc::new(set);
        self.prototype
            .define(name, MemberDescriptor::accessor(Some(get), Some(set)));
        self
    }

    /// Per-instance field with its initial value
    pub fn field(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.fields.define(name, MemberDescriptor::field(value));
        self
    }

    /// Install an arbitrary static descriptor
    pub fn define_static(mut self, name: impl Into<String>, descriptor: MemberDescriptor) -> Self {
        self.statics.define(name, descriptor);
        self
    }

    /// Install an arbitrary shared instance descriptor
    pub fn define_instance(
        mut self,
        name: impl Into<String>,
        descriptor: MemberDescriptor,
    ) -> Self {
        self.prototype.define(name, descriptor);
        self
    }

    /// Constructor body
    pub fn init<F>(mut self, f: F) -> Self
    where
        F: Fn(&mut Instance, &[Value]) -> TraitResult<()> + Send + Sync + 'static,
    {
        self.init = Some(Arc::new(f));
        self
    }

    /// Finish the declaration
    pub fn build(self) -> Type {
        Type {
            inner: Arc::new(TypeInner {
                key: TypeKey::new(),
                name: self.name,
                parent: self.parent,
                statics: RwLock::new(self.statics),
                prototype: RwLock::new(self.prototype),
                fields: self.fields,
                init: self.init,
                composite: None,
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn vehicle() -> Type {
        TypeBuilder::new("Vehicle")
            .static_const("WHEELS", 4)
            .static_fn("describe", |ty, _| Ok(json!(format!("a {}", ty.name()))))
            .field("speed", 0)
            .method("accelerate", |this, args| {
                let by = args.first().and_then(Value::as_i64).unwrap_or(1);
                let speed = this.get("speed")?.as_i64().unwrap_or(0) + by;
                this.set("speed", speed)?;
                Ok(json!(speed))
            })
            .build()
    }

    /// Test the ancestor chain walk
    ///
    /// ```mermaid
    /// graph BT
    ///     Car --> Vehicle
    ///     SportsCar --> Car
    /// ```
    #[test]
    fn test_ancestors_start_at_parent() {
        let vehicle = vehicle();
        let car = TypeBuilder::new("Car").extends(&vehicle).build();
        let sports = TypeBuilder::new("SportsCar").extends(&car).build();

        let names: Vec<&str> = sports.ancestors().map(Type::name).collect();
        assert_eq!(names, vec!["Car", "Vehicle"]);
        assert!(vehicle.ancestors().next().is_none());
    }

    #[test]
    fn test_identity_equality() {
        let a = vehicle();
        let b = vehicle();
        assert_eq!(a, a.clone());
        assert_ne!(a, b);
    }

    #[test]
    fn test_static_members_resolve_through_chain() {
        let vehicle = vehicle();
        let car = TypeBuilder::new("Car").extends(&vehicle).build();

        assert!(car.has_static("WHEELS"));
        assert!(car.own_static_names().is_empty());
        assert_eq!(car.get_static("WHEELS").unwrap(), json!(4));
        assert_eq!(car.call_static("describe", &[]).unwrap(), json!("a Car"));
    }

    #[test]
    fn test_static_access_errors() {
        let vehicle = vehicle();
        assert!(matches!(
            vehicle.get_static("describe"),
            Err(TraitError::NotAField(_))
        ));
        assert!(matches!(
            vehicle.call_static("WHEELS", &[]),
            Err(TraitError::NotCallable(_))
        ));
        assert!(matches!(
            vehicle.get_static("missing"),
            Err(TraitError::MemberNotFound { .. })
        ));
    }

    #[test]
    fn test_construct_runs_initializers_root_first() {
        let base = TypeBuilder::new("Base")
            .init(|this, _| {
                this.set("trail", json!(["base"]))?;
                Ok(())
            })
            .build();
        let derived = TypeBuilder::new("Derived")
            .extends(&base)
            .init(|this, _| {
                let mut trail = this.get("trail")?;
                if let Some(items) = trail.as_array_mut() {
                    items.push(json!("derived"));
                }
                this.set("trail", trail)
            })
            .build();

        let instance = derived.construct(&[]).unwrap();
        assert_eq!(instance.get("trail").unwrap(), json!(["base", "derived"]));
    }

    #[test]
    fn test_declared_fields_are_fresh_per_instance() {
        let vehicle = vehicle();
        let mut first = vehicle.construct(&[]).unwrap();
        let second = vehicle.construct(&[]).unwrap();

        first.call("accelerate", &[json!(10)]).unwrap();
        assert_eq!(first.get("speed").unwrap(), json!(10));
        assert_eq!(second.get("speed").unwrap(), json!(0));
        assert_eq!(vehicle.declared_field_names(), vec!["speed"]);
    }

    #[test]
    fn test_plain_types_are_not_composites() {
        let vehicle = vehicle();
        assert!(!vehicle.is_composite());
        assert!(vehicle.composite_id().is_none());
        assert_eq!(vehicle.to_string(), "Vehicle");
    }
}
