use std::{
    collections::HashMap,
    sync::{
        Arc,
        atomic::{AtomicU64, Ordering},
    },
};

use log::debug;
use parking_lot::{Mutex, RwLock};

use crate::{ObjectId, Party, PartyId, RemoteErr, RemoteHandle, Result};

/// The registry of parties and the only door between their object stores.
///
/// Every party store sits behind its own lock and no operation holds two of them at once, so a
/// `Hub` can be shared by tasks driving different parties in parallel. Every operation is a
/// synchronous request/response, nothing is replicated in the background.
#[derive(Debug, Default)]
pub struct Hub {
    parties: RwLock<HashMap<PartyId, Arc<Mutex<Party>>>>,
    next_id: AtomicU64,
}

impl Hub {
    /// Creates a new `Hub` with no parties.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a new party.
    ///
    /// # Returns
    /// The party's id or `DuplicateParty` if the name was already taken.
    pub fn add_party(&self, name: impl Into<PartyId>) -> Result<PartyId> {
        let id = name.into();
        let mut parties = self.parties.write();

        if parties.contains_key(&id) {
            return Err(RemoteErr::DuplicateParty(id));
        }

        debug!(party = id.as_str(); "registered party");
        parties.insert(id.clone(), Arc::new(Mutex::new(Party::new(id.clone()))));
        Ok(id)
    }

    /// Registers several parties at once, stopping at the first failure.
    pub fn add_parties<I, S>(&self, names: I) -> Result<Vec<PartyId>>
    where
        I: IntoIterator<Item = S>,
        S: Into<PartyId>,
    {
        names.into_iter().map(|name| self.add_party(name)).collect()
    }

    /// Returns every registered party, sorted by name.
    pub fn parties(&self) -> Vec<PartyId> {
        let mut ids: Vec<_> = self.parties.read().keys().cloned().collect();
        ids.sort();
        ids
    }

    pub fn is_registered(&self, party: &PartyId) -> bool {
        self.parties.read().contains_key(party)
    }

    /// Returns the amount of objects stored at `party`.
    pub fn objects_at(&self, party: &PartyId) -> Result<usize> {
        Ok(self.party(party)?.lock().len())
    }

    /// Stores `value` at `party`.
    ///
    /// # Returns
    /// A handle to the stored value or `UnknownParty` if `party` isn't registered.
    pub fn send<T: Send + 'static>(&self, value: T, party: &PartyId) -> Result<RemoteHandle<T>> {
        let store = self.party(party)?;
        let id = ObjectId(self.next_id.fetch_add(1, Ordering::Relaxed));

        store.lock().insert(id, Box::new(value));
        debug!(object = id.get(), party = party.as_str(); "sent object");

        Ok(RemoteHandle::new(party.clone(), id))
    }

    /// Relocates the value behind `handle` to `party`.
    ///
    /// The value is removed from its current location, so the given handle and all of its clones
    /// stop resolving. Moving a value to where it already is returns the same handle.
    ///
    /// # Returns
    /// The relocated handle, `UnknownParty` if `party` isn't registered (the value stays where
    /// it was) or `Location` if the handle doesn't resolve.
    pub fn move_to<T: Send + 'static>(
        &self,
        handle: RemoteHandle<T>,
        party: &PartyId,
    ) -> Result<RemoteHandle<T>> {
        let dst = self.party(party)?;

        if handle.location() == party {
            if !dst.lock().contains::<T>(handle.id()) {
                return Err(location_err(&handle));
            }

            return Ok(handle);
        }

        let value = self
            .party(handle.location())?
            .lock()
            .take::<T>(handle.id())
            .ok_or_else(|| location_err(&handle))?;

        dst.lock().insert(handle.id(), value);
        debug!(
            object = handle.id().get(),
            from = handle.location().as_str(),
            to = party.as_str();
            "moved object"
        );

        Ok(RemoteHandle::new(party.clone(), handle.id()))
    }

    /// Copies the value behind `handle` back to the caller, leaving the remote value intact.
    pub fn get<T: Clone + 'static>(&self, handle: &RemoteHandle<T>) -> Result<T> {
        self.party(handle.location())?
            .lock()
            .get_ref::<T>(handle.id())
            .cloned()
            .ok_or_else(|| location_err(handle))
    }

    /// Runs `f` against the value at its location, borrowing it in place.
    ///
    /// # Returns
    /// Whatever `f` returns, handed back to the caller as a plain value.
    pub fn execute<T, R, F>(&self, handle: &RemoteHandle<T>, f: F) -> Result<R>
    where
        T: 'static,
        F: FnOnce(&mut T) -> R,
    {
        let store = self.party(handle.location())?;
        let mut store = store.lock();
        let value = store
            .get_mut::<T>(handle.id())
            .ok_or_else(|| location_err(handle))?;

        Ok(f(value))
    }

    /// Runs `f` against two values living at the same party, mutating the first and reading
    /// the second.
    ///
    /// # Returns
    /// Whatever `f` returns, `NotColocated` if the handles live at different parties or
    /// `Location` if both handles point to the same object. Nothing is touched on failure.
    pub fn execute_with<A, B, R, F>(
        &self,
        a: &RemoteHandle<A>,
        b: &RemoteHandle<B>,
        f: F,
    ) -> Result<R>
    where
        A: 'static,
        B: 'static,
        F: FnOnce(&mut A, &B) -> R,
    {
        if !a.is_colocated_with(b) {
            return Err(RemoteErr::NotColocated {
                a: a.location().clone(),
                b: b.location().clone(),
            });
        }

        if a.id() == b.id() {
            return Err(location_err(b));
        }

        let store = self.party(a.location())?;
        let mut store = store.lock();

        if !store.contains::<A>(a.id()) {
            return Err(location_err(a));
        }

        let (value, other) = store
            .pair_mut::<A, B>(a.id(), b.id())
            .ok_or_else(|| location_err(b))?;

        Ok(f(value, other))
    }

    /// Combines several values living at the same party into a new value stored there.
    ///
    /// # Returns
    /// A handle to the result, `EmptyReduction` if no handles were given or `NotColocated` if
    /// they live at different parties.
    pub fn reduce<T, R, F>(&self, handles: &[RemoteHandle<T>], f: F) -> Result<RemoteHandle<R>>
    where
        T: 'static,
        R: Send + 'static,
        F: FnOnce(&[&T]) -> R,
    {
        self.try_reduce(handles, |values| Ok(f(values)))
    }

    /// Fallible version of `reduce`, nothing is stored at the party if `f` fails.
    pub fn try_reduce<T, R, E, F>(
        &self,
        handles: &[RemoteHandle<T>],
        f: F,
    ) -> std::result::Result<RemoteHandle<R>, E>
    where
        T: 'static,
        R: Send + 'static,
        E: From<RemoteErr>,
        F: FnOnce(&[&T]) -> std::result::Result<R, E>,
    {
        let first = handles.first().ok_or(RemoteErr::EmptyReduction)?;
        let location = first.location();

        if let Some(stray) = handles.iter().find(|h| h.location() != location) {
            return Err(RemoteErr::NotColocated {
                a: location.clone(),
                b: stray.location().clone(),
            }
            .into());
        }

        let store = self.party(location)?;
        let mut store = store.lock();

        let reduced = {
            let values = handles
                .iter()
                .map(|h| store.get_ref::<T>(h.id()).ok_or_else(|| location_err(h)))
                .collect::<Result<Vec<_>>>()?;

            f(&values)?
        };

        let id = ObjectId(self.next_id.fetch_add(1, Ordering::Relaxed));
        store.insert(id, Box::new(reduced));
        debug!(object = id.get(), party = location.as_str(), inputs = handles.len(); "reduced objects");

        Ok(RemoteHandle::new(location.clone(), id))
    }

    /// Drops the value behind `handle` at its location.
    pub fn discard<T: 'static>(&self, handle: RemoteHandle<T>) -> Result<()> {
        self.party(handle.location())?
            .lock()
            .take::<T>(handle.id())
            .map(drop)
            .ok_or_else(|| location_err(&handle))
    }

    /// Whether `handle` still resolves to a value.
    pub fn contains<T: 'static>(&self, handle: &RemoteHandle<T>) -> bool {
        self.party(handle.location())
            .map(|store| store.lock().contains::<T>(handle.id()))
            .unwrap_or(false)
    }

    fn party(&self, id: &PartyId) -> Result<Arc<Mutex<Party>>> {
        self.parties
            .read()
            .get(id)
            .cloned()
            .ok_or_else(|| RemoteErr::UnknownParty(id.clone()))
    }
}

fn location_err<T>(handle: &RemoteHandle<T>) -> RemoteErr {
    RemoteErr::Location {
        object: handle.id(),
        expected: handle.location().clone(),
    }
}
