//! Simulated remote objects.
//!
//! Values live inside the object store of a named [`Party`]. Callers only ever hold a
//! [`RemoteHandle`], a typed reference tagged with the value's current location, and every
//! cross-party access goes through the [`Hub`] with an explicit `send`, `move_to` or `get`.

mod error;
mod handle;
mod hub;
mod party;

pub use error::{RemoteErr, Result};
pub use handle::{ObjectId, RemoteHandle};
pub use hub::Hub;
pub use party::{Party, PartyId};
