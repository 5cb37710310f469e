use std::{any::Any, collections::HashMap, fmt};

use crate::ObjectId;

/// The name of a party.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PartyId(String);

impl PartyId {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PartyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for PartyId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for PartyId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

/// A participant holding its own object store.
///
/// Only the party can read its values directly, the store is reached through the `Hub`.
pub struct Party {
    id: PartyId,
    objects: HashMap<ObjectId, Box<dyn Any + Send>>,
}

impl Party {
    pub(crate) fn new(id: PartyId) -> Self {
        Self {
            id,
            objects: HashMap::new(),
        }
    }

    pub fn id(&self) -> &PartyId {
        &self.id
    }

    /// Returns the amount of objects stored at this party.
    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    pub(crate) fn insert(&mut self, id: ObjectId, value: Box<dyn Any + Send>) {
        self.objects.insert(id, value);
    }

    pub(crate) fn contains<T: 'static>(&self, id: ObjectId) -> bool {
        self.get_ref::<T>(id).is_some()
    }

    pub(crate) fn get_ref<T: 'static>(&self, id: ObjectId) -> Option<&T> {
        self.objects.get(&id)?.downcast_ref::<T>()
    }

    pub(crate) fn get_mut<T: 'static>(&mut self, id: ObjectId) -> Option<&mut T> {
        self.objects.get_mut(&id)?.downcast_mut::<T>()
    }

    /// Borrows `a` mutably and `b` immutably at once, `None` if they are the same object or
    /// either doesn't hold the expected type.
    pub(crate) fn pair_mut<A: 'static, B: 'static>(
        &mut self,
        a: ObjectId,
        b: ObjectId,
    ) -> Option<(&mut A, &B)> {
        if a == b {
            return None;
        }

        let [a, b] = self.objects.get_disjoint_mut([&a, &b]);
        Some((a?.downcast_mut::<A>()?, b?.downcast_ref::<B>()?))
    }

    /// Removes the object only if it holds a `T`.
    pub(crate) fn take<T: 'static>(&mut self, id: ObjectId) -> Option<Box<T>> {
        if !self.contains::<T>(id) {
            return None;
        }

        self.objects.remove(&id)?.downcast::<T>().ok()
    }
}

impl fmt::Debug for Party {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Party")
            .field("id", &self.id)
            .field("objects", &self.objects.len())
            .finish()
    }
}
