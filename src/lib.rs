// Copyright 2025 Cowboy AI, LLC.

//! # CIM Traits
//!
//! Compose a base type with independent trait types into a single composite
//! type whose instances expose the union of all members, while keeping the
//! ability to ask at runtime "does this object include trait T?".
//!
//! This crate provides:
//! - **Type**: a type descriptor with explicit member tables and a parent pointer
//! - **Registry**: composite identifiers, their types and contributing types
//! - **basing / with**: wrap a base type and widen it with trait types
//! - **Instance**: objects whose per-instance trait state is copied fresh on construction
//! - **having**: capability tests against base and trait types
//!
//! ## Example
//!
//! ```
//! use cim_traits::{basing, having, TypeBuilder};
//! use serde_json::json;
//!
//! let animal = TypeBuilder::new("Animal")
//!     .method("speak", |_, _| Ok(json!("...")))
//!     .build();
//! let flyable = TypeBuilder::new("Flyable")
//!     .field("canFly", true)
//!     .method("fly", |_, _| Ok(json!("whoosh")))
//!     .build();
//! let swimmable = TypeBuilder::new("Swimmable")
//!     .field("canSwim", true)
//!     .build();
//!
//! let duck = basing(&animal).unwrap().with([&flyable, &swimmable]).unwrap();
//! let mut a = duck.construct(&[]).unwrap();
//!
//! assert_eq!(a.call("fly", &[]).unwrap(), json!("whoosh"));
//! assert_eq!(a.get("canSwim").unwrap(), json!(true));
//! assert!(having(&a, &flyable));
//! assert!(having(&a, &animal));
//! ```
//!
//! ## Design Principles
//!
//! 1. **Explicit member tables**: members are declared, never reflected
//! 2. **Validate, then commit**: a rejected merge leaves the composite untouched
//! 3. **Append-only registry**: identifiers strictly increase and are never reused
//! 4. **Independent state**: every object gets its own copy of each trait's fields

#![warn(missing_docs)]

mod capability;
mod composite;
mod config;
mod errors;
mod identifiers;
mod instance;
mod member;
mod registry;
mod types;

pub use capability::{having, is_subclass, Target};
pub use composite::{basing, CompositeType, COMPOSITE_ID};
pub use config::CompositionConfig;
pub use errors::{TraitError, TraitResult};
pub use identifiers::{CompositeId, TypeKey};
pub use instance::Instance;
pub use member::{
    Getter, Member, MemberDescriptor, MemberScope, MemberTable, Method, Setter, StaticFn,
};
pub use registry::Registry;
pub use types::{Ancestors, Initializer, Type, TypeBuilder};
