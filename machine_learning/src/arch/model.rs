use ndarray::{Array2, ArrayView2};

use crate::{Result, arch::Parameters, optimization::Optimizer};

/// A trainable model made of named parameter tensors.
///
/// Gradients accumulate across `backward` calls until `zero_grad` is called, so a training step
/// is `zero_grad`, `forward`, `backward` and finally `step`.
pub trait Model: Clone + Send + 'static {
    /// Returns the amount of features the model expects per sample.
    fn input_dim(&self) -> usize;

    /// Returns the amount of outputs the model produces per sample.
    fn output_dim(&self) -> usize;

    fn params(&self) -> &Parameters;

    fn params_mut(&mut self) -> &mut Parameters;

    /// Makes a forward pass, caching whatever `backward` needs.
    ///
    /// # Arguments
    /// * `x` - The input batch, one sample per row.
    ///
    /// # Returns
    /// The prediction for every sample or a `ShapeMismatch` error.
    fn forward(&mut self, x: ArrayView2<f32>) -> Result<Array2<f32>>;

    /// Accumulates the gradient of the loss into the parameters' gradient buffers.
    ///
    /// # Arguments
    /// * `d` - The derivative of the loss with respect to the last forward pass output.
    fn backward(&mut self, d: ArrayView2<f32>) -> Result<()>;

    /// Makes a forward pass without touching any cached state.
    fn predict(&self, x: ArrayView2<f32>) -> Result<Array2<f32>>;

    /// Drops whatever the last forward pass cached for `backward`.
    fn clear_cache(&mut self) {}

    fn zero_grad(&mut self) {
        self.params_mut().zero_grad();
    }

    /// Applies one optimizer step with the accumulated gradients.
    fn step<O: Optimizer>(&mut self, optimizer: &mut O) {
        self.params_mut().step(optimizer);
    }
}
