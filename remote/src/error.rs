use std::{
    error::Error,
    fmt::{self, Display},
};

use crate::{ObjectId, PartyId};

/// The remote module's result type.
pub type Result<T> = std::result::Result<T, RemoteErr>;

/// Failures of the remote object layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RemoteErr {
    /// The referenced party was never registered.
    UnknownParty(PartyId),
    DuplicateParty(PartyId),
    /// The handle doesn't resolve: the value was moved, discarded or has another type.
    Location { object: ObjectId, expected: PartyId },
    /// A single-party operation got handles living at different parties.
    NotColocated { a: PartyId, b: PartyId },
    EmptyReduction,
}

impl Display for RemoteErr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RemoteErr::UnknownParty(party) => write!(f, "unknown party: {party}"),
            RemoteErr::DuplicateParty(party) => write!(f, "party already registered: {party}"),
            RemoteErr::Location { object, expected } => {
                write!(f, "object {object} is not at {expected}")
            }
            RemoteErr::NotColocated { a, b } => {
                write!(f, "objects are not colocated: one is at {a}, the other at {b}")
            }
            RemoteErr::EmptyReduction => write!(f, "no handles were given to reduce"),
        }
    }
}

impl Error for RemoteErr {}
