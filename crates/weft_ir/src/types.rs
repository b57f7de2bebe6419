//! Signal types and the interning type database.
//!
//! Connection legality only ever asks "are these two types the same?", so
//! every type is interned once in a [`TypeDb`] and compared by [`TypeId`].

use crate::ids::TypeId;
use weft_common::{Ident, Interner};
use serde::{Deserialize, Serialize};

/// The type carried by a signal endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Type {
    /// A bit vector of fixed width.
    Bits {
        /// Number of bits.
        width: u32,
    },
    /// A named aggregate whose fields can be viewed individually.
    Struct {
        /// The struct type name.
        name: Ident,
        /// Fields in declaration order.
        fields: Vec<(Ident, TypeId)>,
    },
}

/// Central type database.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TypeDb {
    types: Vec<Type>,
}

impl TypeDb {
    /// Creates a new, empty type database.
    pub fn new() -> Self {
        Self::default()
    }

    /// Interns a type, returning the existing ID for an identical type.
    pub fn intern(&mut self, ty: Type) -> TypeId {
        if let Some(pos) = self.types.iter().position(|existing| existing == &ty) {
            return TypeId::from_raw(pos as u32);
        }
        let id = TypeId::from_raw(self.types.len() as u32);
        self.types.push(ty);
        id
    }

    /// Shorthand for interning `Bits { width }`.
    pub fn bits(&mut self, width: u32) -> TypeId {
        self.intern(Type::Bits { width })
    }

    /// Returns the type with the given ID.
    ///
    /// # Panics
    ///
    /// Panics if the ID was not produced by this database.
    pub fn get(&self, id: TypeId) -> &Type {
        &self.types[id.as_raw() as usize]
    }

    /// Total bit width; a struct is as wide as its fields combined.
    pub fn width(&self, id: TypeId) -> u32 {
        match self.get(id) {
            Type::Bits { width } => *width,
            Type::Struct { fields, .. } => fields.iter().map(|(_, ty)| self.width(*ty)).sum(),
        }
    }

    /// Looks up the type of a named field, if `id` is a struct that has one.
    pub fn field_type(&self, id: TypeId, field: Ident) -> Option<TypeId> {
        match self.get(id) {
            Type::Struct { fields, .. } => fields
                .iter()
                .find(|(name, _)| *name == field)
                .map(|(_, ty)| *ty),
            Type::Bits { .. } => None,
        }
    }

    /// Human-readable type name used in diagnostics, e.g. `Bits8` or `Packet`.
    pub fn describe(&self, id: TypeId, interner: &Interner) -> String {
        match self.get(id) {
            Type::Bits { width } => format!("Bits{width}"),
            Type::Struct { name, .. } => interner.resolve(*name).to_string(),
        }
    }

    /// Returns the number of interned types.
    pub fn len(&self) -> usize {
        self.types.len()
    }

    /// Returns `true` if no types have been interned.
    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }
}
