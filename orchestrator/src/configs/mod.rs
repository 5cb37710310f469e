mod json;
mod model;
mod training;

pub use json::{load, parse};
pub use model::{InitConfig, LossFnConfig};
pub use training::FedAvgConfig;
