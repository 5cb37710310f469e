use std::{error::Error, fmt, io};

use machine_learning::MlErr;
use remote::RemoteErr;

/// The orchestrator's result type.
pub type Result<T> = std::result::Result<T, FedError>;

/// All errors that can occur while orchestrating federated averaging.
#[derive(Debug)]
pub enum FedError {
    /// Invalid configuration, caught before any round starts.
    InvalidConfig(String),
    /// The remote object layer refused an operation.
    Remote(RemoteErr),
    /// The model, the data or the optimization failed.
    Ml(MlErr),
    /// A round failed, the canonical model was left untouched.
    Round { round: usize, source: Box<FedError> },
    /// Every configured round already ran.
    Finished { rounds: usize },
    Io(io::Error),
    Json(serde_json::Error),
}

impl FedError {
    /// Unwraps nested round failures down to the error that caused them.
    pub fn root(&self) -> &FedError {
        match self {
            FedError::Round { source, .. } => source.root(),
            other => other,
        }
    }
}

impl fmt::Display for FedError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidConfig(msg) => write!(f, "invalid config: {msg}"),
            Self::Remote(e) => write!(f, "remote error: {e}"),
            Self::Ml(e) => write!(f, "machine learning error: {e}"),
            Self::Round { round, source } => write!(f, "round {round} failed: {source}"),
            Self::Finished { rounds } => write!(f, "all {rounds} rounds already ran"),
            Self::Io(e) => write!(f, "io error: {e}"),
            Self::Json(e) => write!(f, "json error: {e}"),
        }
    }
}

impl Error for FedError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Remote(e) => Some(e),
            Self::Ml(e) => Some(e),
            Self::Round { source, .. } => Some(source.as_ref()),
            Self::Io(e) => Some(e),
            Self::Json(e) => Some(e),
            _ => None,
        }
    }
}

impl From<RemoteErr> for FedError {
    fn from(e: RemoteErr) -> Self {
        Self::Remote(e)
    }
}

impl From<MlErr> for FedError {
    fn from(e: MlErr) -> Self {
        Self::Ml(e)
    }
}

impl From<io::Error> for FedError {
    fn from(e: io::Error) -> Self {
        Self::Io(e)
    }
}

impl From<serde_json::Error> for FedError {
    fn from(e: serde_json::Error) -> Self {
        Self::Json(e)
    }
}
