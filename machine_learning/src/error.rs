use std::{
    error::Error,
    fmt::{self, Display},
};

/// The result type used in the entire machine learning module.
pub type Result<T> = std::result::Result<T, MlErr>;

/// The machine learning module's error type.
#[derive(Debug, Clone, PartialEq)]
pub enum MlErr {
    ShapeMismatch {
        what: &'static str,
        got: Vec<usize>,
        expected: Vec<usize>,
    },
    ParamsMisaligned {
        index: usize,
        reason: String,
    },
    EmptyDataset,
    InvalidInit(String),
}

impl Display for MlErr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MlErr::ShapeMismatch {
                what,
                got,
                expected,
            } => write!(
                f,
                "There's a shape mismatch in the {what}, got {got:?} and expected {expected:?}"
            ),
            MlErr::ParamsMisaligned { index, reason } => {
                write!(f, "The parameter sets are misaligned at tensor {index}: {reason}")
            }
            MlErr::EmptyDataset => write!(f, "The dataset has no rows"),
            MlErr::InvalidInit(reason) => {
                write!(f, "Failed to initialize the parameters: {reason}")
            }
        }
    }
}

impl Error for MlErr {}
