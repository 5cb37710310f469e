use ndarray::{Array2, ArrayView2};

use super::{Mse, Sse};

pub trait LossFn {
    fn loss(&self, y_pred: ArrayView2<f32>, y: ArrayView2<f32>) -> f32;
    fn loss_prime(&self, y_pred: ArrayView2<f32>, y: ArrayView2<f32>) -> Array2<f32>;
}

/// A loss function picked at runtime.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum LossKind {
    #[default]
    Sse,
    Mse,
}

impl LossFn for LossKind {
    fn loss(&self, y_pred: ArrayView2<f32>, y: ArrayView2<f32>) -> f32 {
        match self {
            LossKind::Sse => Sse.loss(y_pred, y),
            LossKind::Mse => Mse.loss(y_pred, y),
        }
    }

    fn loss_prime(&self, y_pred: ArrayView2<f32>, y: ArrayView2<f32>) -> Array2<f32> {
        match self {
            LossKind::Sse => Sse.loss_prime(y_pred, y),
            LossKind::Mse => Mse.loss_prime(y_pred, y),
        }
    }
}
