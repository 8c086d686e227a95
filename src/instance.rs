// Copyright 2025 Cowboy AI, LLC.

//! Objects constructed from a [`Type`]
//!
//! An instance owns its per-instance fields. Methods and accessors are not
//! copied onto it: they resolve against the live shared tables of its type
//! and that type's ancestors at lookup time.

use crate::errors::{TraitError, TraitResult};
use crate::member::{Member, MemberDescriptor, MemberTable};
use crate::types::Type;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::fmt;

/// An object with its own fields and a constructing type
#[derive(Clone)]
pub struct Instance {
    ty: Type,
    fields: MemberTable,
}

impl Instance {
    pub(crate) fn new(ty: Type) -> Self {
        Self {
            ty,
            fields: MemberTable::new(),
        }
    }

    /// The type that constructed this object
    pub fn type_of(&self) -> &Type {
        &self.ty
    }

    /// Names of the fields this object owns, in definition order
    pub fn own_field_names(&self) -> Vec<String> {
        self.fields.names()
    }

    /// Names of the enumerable fields this object owns, in definition order
    pub fn visible_field_names(&self) -> Vec<String> {
        self.fields.visible_names()
    }

    /// Own fields, in definition order
    pub fn own_fields(&self) -> impl Iterator<Item = (&String, &MemberDescriptor)> {
        self.fields.iter()
    }

    /// Whether the object owns a field of this name
    pub fn has_own(&self, name: &str) -> bool {
        self.fields.contains(name)
    }

    /// Whether the name resolves on this object, either as an own field or
    /// as a shared member of its type chain
    pub fn has_member(&self, name: &str) -> bool {
        self.fields.contains(name) || self.ty.has_instance_member(name)
    }

    /// Install an own member, replacing any previous one of the same name
    pub fn define(&mut self, name: impl Into<String>, descriptor: MemberDescriptor) {
        self.fields.define(name, descriptor);
    }

    /// Read a field or accessor
    pub fn get(&self, name: &str) -> TraitResult<Value> {
        let member = match self.fields.get(name) {
            Some(descriptor) => descriptor.member.clone(),
            None => self
                .ty
                .instance_member(name)
                .map(|d| d.member)
                .ok_or_else(|| self.ty.not_found(name))?,
        };
        match member {
            Member::Field(value) => Ok(value),
            Member::Accessor { get: Some(get), .. } => get(self),
            Member::Accessor { get: None, .. } => Err(TraitError::NotAField(name.to_string())),
            Member::Method(_) | Member::StaticFn(_) => Err(TraitError::NotAField(name.to_string())),
        }
    }

    /// Read a field and deserialize it
    pub fn get_as<T: DeserializeOwned>(&self, name: &str) -> TraitResult<T> {
        serde_json::from_value(self.get(name)?)
            .map_err(|e| TraitError::InvalidArgument(format!("{name}: {e}")))
    }

    /// Assign a field
    ///
    /// Own writable fields are replaced in place and accessors run their
    /// setter. Any other unknown name becomes a new own field.
    pub fn set(&mut self, name: &str, value: impl Into<Value>) -> TraitResult<()> {
        let value = value.into();

        if let Some(descriptor) = self.fields.get(name) {
            let setter = match &descriptor.member {
                Member::Accessor { set: Some(set), .. } => Some(set.clone()),
                Member::Accessor { set: None, .. } => {
                    return Err(TraitError::ReadOnly(name.to_string()))
                }
                _ if !descriptor.writable => return Err(TraitError::ReadOnly(name.to_string())),
                _ => None,
            };
            return match setter {
                Some(set) => set(self, value),
                None => {
                    if let Some(descriptor) = self.fields.get_mut(name) {
                        descriptor.member = Member::Field(value);
                    }
                    Ok(())
                }
            };
        }

        match self.ty.instance_member(name) {
            Some(MemberDescriptor {
                member: Member::Accessor { set: Some(set), .. },
                ..
            }) => set(self, value),
            Some(MemberDescriptor {
                member: Member::Accessor { set: None, .. },
                ..
            }) => Err(TraitError::ReadOnly(name.to_string())),
            Some(descriptor) if !descriptor.writable => Err(TraitError::ReadOnly(name.to_string())),
            _ => {
                self.fields.define(name, MemberDescriptor::field(value));
                Ok(())
            }
        }
    }

    /// Invoke a method
    pub fn call(&mut self, name: &str, args: &[Value]) -> TraitResult<Value> {
        let member = match self.fields.get(name) {
            Some(descriptor) => descriptor.member.clone(),
            None => self
                .ty
                .instance_member(name)
                .map(|d| d.member)
                .ok_or_else(|| self.ty.not_found(name))?,
        };
        match member {
            Member::Method(method) => method(self, args),
            _ => Err(TraitError::NotCallable(name.to_string())),
        }
    }
}

impl fmt::Debug for Instance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Instance")
            .field("type", &self.ty.name())
            .field("fields", &self.fields)
            .finish()
    }
}
