pub mod loss;
mod linear;
mod model;
mod parameters;
mod tensor;

pub use linear::Linear;
pub use model::Model;
pub use parameters::Parameters;
pub use tensor::Tensor;
