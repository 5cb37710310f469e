use ndarray::{Array2, ArrayView2};

use super::LossFn;

/// Sum of squared errors over the whole batch.
#[derive(Debug, Default, Clone, Copy)]
pub struct Sse;

impl Sse {
    /// Returns a new `Sse`.
    pub fn new() -> Self {
        Self
    }
}

impl LossFn for Sse {
    fn loss(&self, y_pred: ArrayView2<f32>, y: ArrayView2<f32>) -> f32 {
        (&y_pred - &y).mapv(|x| x.powi(2)).sum()
    }

    fn loss_prime(&self, y_pred: ArrayView2<f32>, y: ArrayView2<f32>) -> Array2<f32> {
        (&y_pred - &y) * 2.0
    }
}
