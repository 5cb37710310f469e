use machine_learning::arch::{Model, Parameters};

use crate::Result;

/// The orchestrator's own copy of the shared model.
///
/// It is created once at setup and only changes at round boundaries, when the averaged
/// parameters are absorbed. Every absorption bumps the version.
#[derive(Debug, Clone)]
pub struct CanonicalModel<M: Model> {
    model: M,
    version: u64,
}

impl<M: Model> CanonicalModel<M> {
    /// Creates a new `CanonicalModel` at version 0.
    pub fn new(model: M) -> Self {
        Self { model, version: 0 }
    }

    pub fn model(&self) -> &M {
        &self.model
    }

    /// Returns how many times averaged parameters were absorbed.
    pub fn version(&self) -> u64 {
        self.version
    }

    /// Returns an independent copy meant to be handed to a data holder.
    pub fn snapshot(&self) -> M {
        self.model.clone()
    }

    /// Overwrites the parameter values in place with `params` and bumps the version.
    ///
    /// # Returns
    /// A `ParamsMisaligned` error if `params` doesn't line up with the model, in which case the
    /// model is left untouched.
    pub(crate) fn absorb(&mut self, params: &Parameters) -> Result<()> {
        self.model.params_mut().assign(params)?;
        self.version += 1;
        Ok(())
    }

    pub fn into_inner(self) -> M {
        self.model
    }
}
