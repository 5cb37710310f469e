use machine_learning::{
    arch::{Linear, loss::LossKind},
    initialization::{ConstParamGen, RandParamGen},
};
use serde::{Deserialize, Serialize};

use crate::Result;

/// How the canonical model's parameters start out.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum InitConfig {
    Const { value: f32 },
    Uniform { low: f32, high: f32, seed: u64 },
}

impl Default for InitConfig {
    fn default() -> Self {
        Self::Uniform {
            low: -0.5,
            high: 0.5,
            seed: 0,
        }
    }
}

impl InitConfig {
    /// Builds a linear model with `(input, output)` dimensions initialized accordingly.
    pub fn linear(&self, dim: (usize, usize)) -> Result<Linear> {
        let limit = (dim.0 + 1) * dim.1;

        let model = match *self {
            InitConfig::Const { value } => Linear::new(dim, &mut ConstParamGen::new(value, limit))?,
            InitConfig::Uniform { low, high, seed } => {
                let mut param_gen = RandParamGen::seeded_uniform(seed, limit, low, high)?;
                Linear::new(dim, &mut param_gen)?
            }
        };

        Ok(model)
    }
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LossFnConfig {
    /// Sum of squared errors over the local batch.
    #[default]
    Sse,
    /// Mean of squared errors over the local batch.
    Mse,
}

impl From<LossFnConfig> for LossKind {
    fn from(value: LossFnConfig) -> Self {
        match value {
            LossFnConfig::Sse => LossKind::Sse,
            LossFnConfig::Mse => LossKind::Mse,
        }
    }
}
