use crate::{MlErr, Result, arch::Tensor, optimization::Optimizer};

/// An ordered collection of named parameter tensors.
///
/// Two collections are aligned when they hold the same amount of tensors and each pair of
/// tensors at the same position share name and shape.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Parameters {
    tensors: Vec<Tensor>,
}

impl Parameters {
    /// Creates a new `Parameters`.
    ///
    /// # Arguments
    /// * `tensors` - The tensors in the order they will be iterated.
    pub fn new<I>(tensors: I) -> Self
    where
        I: IntoIterator<Item = Tensor>,
    {
        Self {
            tensors: tensors.into_iter().collect(),
        }
    }

    /// Returns the amount of tensors.
    pub fn len(&self) -> usize {
        self.tensors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tensors.is_empty()
    }

    /// Returns the total amount of scalars across all tensors.
    pub fn size(&self) -> usize {
        self.tensors.iter().map(Tensor::len).sum()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Tensor> {
        self.tensors.iter()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Tensor> {
        self.tensors.iter_mut()
    }

    pub fn get(&self, index: usize) -> Option<&Tensor> {
        self.tensors.get(index)
    }

    pub fn get_mut(&mut self, index: usize) -> Option<&mut Tensor> {
        self.tensors.get_mut(index)
    }

    /// Looks up a tensor by name.
    pub fn by_name(&self, name: &str) -> Option<&Tensor> {
        self.tensors.iter().find(|t| t.name() == name)
    }

    /// Copies every value into a single flat buffer, tensor after tensor.
    pub fn flatten(&self) -> Vec<f32> {
        self.tensors
            .iter()
            .flat_map(|t| t.data().iter().copied())
            .collect()
    }

    /// Checks positional alignment against `other`.
    ///
    /// # Returns
    /// A `ParamsMisaligned` error naming the first tensor that doesn't line up.
    pub fn check_aligned(&self, other: &Parameters) -> Result<()> {
        if self.len() != other.len() {
            return Err(MlErr::ParamsMisaligned {
                index: self.len().min(other.len()),
                reason: format!("{} tensors against {}", self.len(), other.len()),
            });
        }

        for (index, (a, b)) in self.tensors.iter().zip(&other.tensors).enumerate() {
            if !a.is_aligned(b) {
                return Err(MlErr::ParamsMisaligned {
                    index,
                    reason: format!(
                        "{}{:?} against {}{:?}",
                        a.name(),
                        a.shape(),
                        b.name(),
                        b.shape()
                    ),
                });
            }
        }

        Ok(())
    }

    /// Resets every gradient buffer to zero.
    pub fn zero_grad(&mut self) {
        self.tensors.iter_mut().for_each(Tensor::zero_grad);
    }

    /// Applies one optimizer step to every tensor using its accumulated gradient.
    pub fn step<O: Optimizer>(&mut self, optimizer: &mut O) {
        for tensor in &mut self.tensors {
            let (data, grad) = tensor.split_mut();
            optimizer.update_params(data, grad);
        }
    }

    /// Overwrites the values of these parameters in place with the ones in `other`.
    ///
    /// Gradients are left untouched.
    pub fn assign(&mut self, other: &Parameters) -> Result<()> {
        self.check_aligned(other)?;

        for (dst, src) in self.tensors.iter_mut().zip(&other.tensors) {
            dst.data_mut().copy_from_slice(src.data());
        }

        Ok(())
    }

    /// Computes the elementwise arithmetic mean of aligned parameter sets.
    ///
    /// Tensors are matched positionally, every set must be aligned with the first one. The
    /// returned parameters carry zeroed gradients.
    ///
    /// # Returns
    /// The averaged parameters, or an error if the sets are misaligned or there is nothing to
    /// average.
    pub fn mean<'a, I>(sets: I) -> Result<Parameters>
    where
        I: IntoIterator<Item = &'a Parameters>,
    {
        let mut sets = sets.into_iter();
        let Some(first) = sets.next() else {
            return Err(MlErr::ParamsMisaligned {
                index: 0,
                reason: "there are no parameter sets to average".to_string(),
            });
        };

        let mut acc = first.clone();
        acc.zero_grad();
        let mut count = 1usize;

        for set in sets {
            acc.check_aligned(set)?;

            for (dst, src) in acc.tensors.iter_mut().zip(&set.tensors) {
                dst.data_mut()
                    .iter_mut()
                    .zip(src.data())
                    .for_each(|(a, b)| *a += b);
            }

            count += 1;
        }

        let scale = count as f32;
        for tensor in &mut acc.tensors {
            tensor.data_mut().iter_mut().for_each(|v| *v /= scale);
        }

        Ok(acc)
    }
}
