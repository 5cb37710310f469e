use ndarray::{ArrayViewD, ArrayViewMutD, IxDyn};

use crate::{MlErr, Result};

/// A named parameter tensor.
///
/// Values live in a flat row-major buffer next to a gradient buffer of the same length, the
/// shape only dictates how both buffers are viewed.
#[derive(Debug, Clone, PartialEq)]
pub struct Tensor {
    name: String,
    shape: Vec<usize>,
    data: Vec<f32>,
    grad: Vec<f32>,
}

impl Tensor {
    /// Creates a new `Tensor`.
    ///
    /// # Arguments
    /// * `name` - The name of the parameter, e.g. `weight`.
    /// * `shape` - The logical shape of the tensor.
    /// * `data` - The row-major values.
    ///
    /// # Returns
    /// A new `Tensor` instance or an error if `data` doesn't fit `shape`.
    pub fn new(name: impl Into<String>, shape: &[usize], data: Vec<f32>) -> Result<Self> {
        let len: usize = shape.iter().product();
        if data.len() != len {
            return Err(MlErr::ShapeMismatch {
                what: "tensor data",
                got: vec![data.len()],
                expected: vec![len],
            });
        }

        Ok(Self {
            name: name.into(),
            shape: shape.to_vec(),
            grad: vec![0.0; len],
            data,
        })
    }

    /// Creates a new `Tensor` filled with zeros.
    pub fn zeros(name: impl Into<String>, shape: &[usize]) -> Self {
        let len = shape.iter().product();

        Self {
            name: name.into(),
            shape: shape.to_vec(),
            data: vec![0.0; len],
            grad: vec![0.0; len],
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn shape(&self) -> &[usize] {
        &self.shape
    }

    /// Returns the amount of scalars in the tensor.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn data(&self) -> &[f32] {
        &self.data
    }

    pub fn data_mut(&mut self) -> &mut [f32] {
        &mut self.data
    }

    pub fn grad(&self) -> &[f32] {
        &self.grad
    }

    pub fn grad_mut(&mut self) -> &mut [f32] {
        &mut self.grad
    }

    /// Gives mutable access to the values and read access to the gradient at the same time.
    pub fn split_mut(&mut self) -> (&mut [f32], &[f32]) {
        (&mut self.data, &self.grad)
    }

    /// Views the values with the tensor's shape.
    pub fn view(&self) -> Result<ArrayViewD<'_, f32>> {
        ArrayViewD::from_shape(IxDyn(&self.shape), &self.data).map_err(|_| {
            MlErr::ShapeMismatch {
                what: "tensor view",
                got: vec![self.data.len()],
                expected: self.shape.clone(),
            }
        })
    }

    /// Views the gradient with the tensor's shape.
    pub fn grad_view_mut(&mut self) -> Result<ArrayViewMutD<'_, f32>> {
        let len = self.grad.len();
        ArrayViewMutD::from_shape(IxDyn(&self.shape), &mut self.grad).map_err(|_| {
            MlErr::ShapeMismatch {
                what: "gradient view",
                got: vec![len],
                expected: self.shape.clone(),
            }
        })
    }

    /// Resets the gradient buffer to zero.
    pub fn zero_grad(&mut self) {
        self.grad.fill(0.0);
    }

    /// Whether `other` has the same name and shape as this tensor.
    pub fn is_aligned(&self, other: &Tensor) -> bool {
        self.name == other.name && self.shape == other.shape
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_rejects_data_not_fitting_shape() {
        let err = Tensor::new("weight", &[2, 2], vec![1.0; 3]).unwrap_err();
        assert!(matches!(err, MlErr::ShapeMismatch { .. }));
    }

    #[test]
    fn test_view_follows_row_major_order() {
        let t = Tensor::new("weight", &[2, 3], vec![0., 1., 2., 3., 4., 5.]).unwrap();
        let view = t.view().unwrap();

        assert_eq!(view.shape(), &[2, 3]);
        assert_eq!(view[[1, 0]], 3.0);
        assert_eq!(view[[0, 2]], 2.0);
    }

    #[test]
    fn test_zero_grad() {
        let mut t = Tensor::zeros("bias", &[3]);
        t.grad_mut().copy_from_slice(&[1.0, 2.0, 3.0]);
        t.zero_grad();
        assert_eq!(t.grad(), &[0.0; 3]);
    }
}
