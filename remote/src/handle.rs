use std::{fmt, marker::PhantomData};

use crate::PartyId;

/// Identifies a value inside the object store of a party.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ObjectId(pub(crate) u64);

impl ObjectId {
    pub fn get(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A typed reference to a value of type `T` stored at some party.
///
/// Holding a handle grants no access to the value, operations go through the `Hub`. Cloning
/// only copies the reference: once the value is moved or discarded, stale clones fail to
/// resolve.
pub struct RemoteHandle<T> {
    location: PartyId,
    id: ObjectId,
    _marker: PhantomData<fn() -> T>,
}

impl<T> RemoteHandle<T> {
    pub(crate) fn new(location: PartyId, id: ObjectId) -> Self {
        Self {
            location,
            id,
            _marker: PhantomData,
        }
    }

    /// Returns the party currently holding the value.
    pub fn location(&self) -> &PartyId {
        &self.location
    }

    pub fn id(&self) -> ObjectId {
        self.id
    }

    /// Whether both handles point to values at the same party.
    pub fn is_colocated_with<U>(&self, other: &RemoteHandle<U>) -> bool {
        self.location == other.location
    }
}

impl<T> Clone for RemoteHandle<T> {
    fn clone(&self) -> Self {
        Self::new(self.location.clone(), self.id)
    }
}

impl<T> fmt::Debug for RemoteHandle<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RemoteHandle")
            .field("location", &self.location)
            .field("id", &self.id)
            .field("type", &std::any::type_name::<T>())
            .finish()
    }
}
