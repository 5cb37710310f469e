mod loss_fn;
mod mse;
mod sse;

pub use loss_fn::{LossFn, LossKind};
pub use mse::Mse;
pub use sse::Sse;
