use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use super::{InitConfig, LossFnConfig};
use crate::{FedError, Result};

/// Everything the host program decides about a federated averaging run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FedAvgConfig {
    /// The data holder parties, in the order their datasets are handed over.
    pub holders: Vec<String>,
    /// The trusted party averaging the holders' models.
    pub aggregator: String,
    pub rounds: usize,
    /// Gradient descent steps per holder per round.
    pub local_steps: usize,
    pub learning_rate: f32,
    pub loss: LossFnConfig,
    /// Whether holders train in parallel within a round.
    pub parallel: bool,
    pub init: InitConfig,
}

impl Default for FedAvgConfig {
    fn default() -> Self {
        Self {
            holders: vec!["bob".to_string(), "alice".to_string()],
            aggregator: "secure_worker".to_string(),
            rounds: 10,
            local_steps: 5,
            learning_rate: 0.1,
            loss: LossFnConfig::Sse,
            parallel: false,
            init: InitConfig::default(),
        }
    }
}

impl FedAvgConfig {
    /// Checks the config for inconsistencies before anything is distributed.
    pub fn validate(&self) -> Result<()> {
        let invalid = |msg: String| Err(FedError::InvalidConfig(msg));

        if self.holders.is_empty() {
            return invalid("at least one data holder is required".into());
        }

        let mut unique = HashSet::with_capacity(self.holders.len());
        if let Some(dup) = self.holders.iter().find(|h| !unique.insert(h.as_str())) {
            return invalid(format!("data holder '{dup}' is listed more than once"));
        }

        if self.aggregator.is_empty() {
            return invalid("the aggregator must be named".into());
        }

        if unique.contains(self.aggregator.as_str()) {
            return invalid(format!(
                "the aggregator '{}' cannot also be a data holder",
                self.aggregator
            ));
        }

        if self.rounds == 0 {
            return invalid("rounds must be greater than 0".into());
        }

        if !self.learning_rate.is_finite() || self.learning_rate <= 0.0 {
            return invalid(format!(
                "learning rate must be finite and positive, got {}",
                self.learning_rate
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        FedAvgConfig::default().validate().unwrap();
    }

    #[test]
    fn test_validate_rejects_bad_configs() {
        let cases: [fn(&mut FedAvgConfig); 7] = [
            |c| c.holders.clear(),
            |c| c.holders.push("bob".into()),
            |c| c.aggregator = "alice".into(),
            |c| c.aggregator.clear(),
            |c| c.rounds = 0,
            |c| c.learning_rate = 0.0,
            |c| c.learning_rate = f32::NAN,
        ];

        for (i, mutate) in cases.iter().enumerate() {
            let mut config = FedAvgConfig::default();
            mutate(&mut config);
            assert!(
                matches!(config.validate(), Err(FedError::InvalidConfig(_))),
                "case {i} should be rejected"
            );
        }
    }

    #[test]
    fn test_zero_local_steps_is_allowed() {
        let config = FedAvgConfig {
            local_steps: 0,
            ..Default::default()
        };
        config.validate().unwrap();
    }
}
