use ndarray::{Array2, ArrayView1, ArrayView2, ArrayViewMut1, ArrayViewMut2, Axis};

use super::{Model, Parameters, Tensor};
use crate::{MlErr, Result, initialization::ParamGen};

const WEIGHT: usize = 0;
const BIAS: usize = 1;

/// A fully connected linear model, `y = x · W + b`.
///
/// The weight has shape `(input, output)` and the bias shape `(output)`, stored in that order
/// under the names `weight` and `bias`.
#[derive(Debug, Clone)]
pub struct Linear {
    dim: (usize, usize),
    params: Parameters,

    // Forward metadata
    x: Array2<f32>,
}

impl Linear {
    /// Creates a new `Linear` drawing its initial values from a generator.
    ///
    /// # Arguments
    /// * `dim` - The `(input, output)` dimensions.
    /// * `param_gen` - The generator, sampled for the weight first and the bias after.
    ///
    /// # Returns
    /// A new `Linear` or an `InvalidInit` error if the generator ran dry.
    pub fn new<G: ParamGen + ?Sized>(dim: (usize, usize), param_gen: &mut G) -> Result<Self> {
        let weight = sample_exact(param_gen, dim.0 * dim.1, "weight")?;
        let bias = sample_exact(param_gen, dim.1, "bias")?;
        Self::from_values(dim, weight, bias)
    }

    /// Creates a new `Linear` from explicit row-major values.
    pub fn from_values(dim: (usize, usize), weight: Vec<f32>, bias: Vec<f32>) -> Result<Self> {
        let params = Parameters::new([
            Tensor::new("weight", &[dim.0, dim.1], weight)?,
            Tensor::new("bias", &[dim.1], bias)?,
        ]);

        Ok(Self {
            dim,
            params,
            x: Array2::zeros((0, dim.0)),
        })
    }

    /// Returns the input cached by the last forward pass, empty if nothing is cached.
    pub fn cached_input(&self) -> ArrayView2<'_, f32> {
        self.x.view()
    }

    /// Returns the `(input, output)` dimensions.
    pub fn dim(&self) -> (usize, usize) {
        self.dim
    }

    /// Gives a view of the parameters as the weights and biases of this model.
    fn view_params(&self) -> Result<(ArrayView2<'_, f32>, ArrayView1<'_, f32>)> {
        let (w_raw, b_raw) = self.raw(WEIGHT).zip(self.raw(BIAS)).ok_or(MlErr::ShapeMismatch {
            what: "linear parameters",
            got: vec![self.params.len()],
            expected: vec![2],
        })?;

        let w = ArrayView2::from_shape(self.dim, w_raw).map_err(|_| self.shape_err(w_raw.len()))?;
        let b = ArrayView1::from_shape(self.dim.1, b_raw).map_err(|_| self.shape_err(b_raw.len()))?;
        Ok((w, b))
    }

    fn raw(&self, index: usize) -> Option<&[f32]> {
        self.params.get(index).map(Tensor::data)
    }

    fn shape_err(&self, got: usize) -> MlErr {
        MlErr::ShapeMismatch {
            what: "linear parameters",
            got: vec![got],
            expected: vec![self.dim.0, self.dim.1],
        }
    }

    fn check_input(&self, x: &ArrayView2<f32>) -> Result<()> {
        if x.ncols() != self.dim.0 {
            return Err(MlErr::ShapeMismatch {
                what: "model input",
                got: vec![x.nrows(), x.ncols()],
                expected: vec![x.nrows(), self.dim.0],
            });
        }

        Ok(())
    }
}

impl Model for Linear {
    fn input_dim(&self) -> usize {
        self.dim.0
    }

    fn output_dim(&self) -> usize {
        self.dim.1
    }

    fn params(&self) -> &Parameters {
        &self.params
    }

    fn params_mut(&mut self) -> &mut Parameters {
        &mut self.params
    }

    fn forward(&mut self, x: ArrayView2<f32>) -> Result<Array2<f32>> {
        let z = self.predict(x)?;
        self.x = x.to_owned();
        Ok(z)
    }

    fn clear_cache(&mut self) {
        self.x = Array2::zeros((0, self.dim.0));
    }

    fn backward(&mut self, d: ArrayView2<f32>) -> Result<()> {
        let expected = vec![self.x.nrows(), self.dim.1];
        if d.shape() != expected.as_slice() {
            return Err(MlErr::ShapeMismatch {
                what: "loss derivative",
                got: d.shape().to_vec(),
                expected,
            });
        }

        let dw = self.x.t().dot(&d);
        let db = d.sum_axis(Axis(0));
        let dim = self.dim;

        for (index, tensor) in self.params.iter_mut().enumerate() {
            let grad = tensor.grad_mut();
            match index {
                WEIGHT => {
                    let mut gw = ArrayViewMut2::from_shape(dim, grad).map_err(|_| {
                        MlErr::ShapeMismatch {
                            what: "weight gradient",
                            got: vec![dw.len()],
                            expected: vec![dim.0, dim.1],
                        }
                    })?;
                    gw += &dw;
                }
                BIAS => {
                    let mut gb = ArrayViewMut1::from_shape(dim.1, grad).map_err(|_| {
                        MlErr::ShapeMismatch {
                            what: "bias gradient",
                            got: vec![db.len()],
                            expected: vec![dim.1],
                        }
                    })?;
                    gb += &db;
                }
                _ => {}
            }
        }

        Ok(())
    }

    fn predict(&self, x: ArrayView2<f32>) -> Result<Array2<f32>> {
        self.check_input(&x)?;
        let (w, b) = self.view_params()?;
        Ok(x.dot(&w) + &b)
    }
}

fn sample_exact<G: ParamGen + ?Sized>(
    param_gen: &mut G,
    n: usize,
    what: &str,
) -> Result<Vec<f32>> {
    match param_gen.sample(n) {
        Some(values) if values.len() == n => Ok(values),
        Some(values) => Err(MlErr::InvalidInit(format!(
            "the generator yielded {} of the {n} {what} values",
            values.len()
        ))),
        None => Err(MlErr::InvalidInit(format!(
            "the generator was exhausted before sampling the {what}"
        ))),
    }
}
