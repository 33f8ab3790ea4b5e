//! Pending set of types awaiting generation.

use formatgen_schema::TypeRef;
use std::collections::HashSet;

/// Insertion-ordered set of types awaiting generation.
///
/// Not synchronized; the scheduler keeps it behind its lock.
#[derive(Debug, Default, Clone)]
pub struct PendingSet {
    order: Vec<TypeRef>,
    members: HashSet<TypeRef>,
}

impl PendingSet {
    /// Creates an empty set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a type, returning false if it was already pending.
    pub fn insert(&mut self, ty: TypeRef) -> bool {
        if !self.members.insert(ty.clone()) {
            return false;
        }
        self.order.push(ty);
        true
    }

    /// Removes a type, returning false if it was not pending.
    pub fn remove(&mut self, ty: &TypeRef) -> bool {
        if !self.members.remove(ty) {
            return false;
        }
        self.order.retain(|t| t != ty);
        true
    }

    /// Returns true if the type is pending.
    #[must_use]
    pub fn contains(&self, ty: &TypeRef) -> bool {
        self.members.contains(ty)
    }

    /// Returns a copy of the pending types in insertion order.
    #[must_use]
    pub fn snapshot(&self) -> Vec<TypeRef> {
        self.order.clone()
    }

    /// Iterates over pending types in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &TypeRef> {
        self.order.iter()
    }

    /// Returns the number of pending types.
    #[must_use]
    pub fn len(&self) -> usize {
        self.order.len()
    }

    /// Returns true if nothing is pending.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}
