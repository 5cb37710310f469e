use std::{fs, path::Path};

use super::FedAvgConfig;
use crate::Result;

/// Loads and validates a [`FedAvgConfig`] from a JSON file.
///
/// Missing fields take their default value, unknown fields are rejected.
pub fn load(path: impl AsRef<Path>) -> Result<FedAvgConfig> {
    let content = fs::read_to_string(path)?;
    parse(&content)
}

/// Parses and validates a [`FedAvgConfig`] from a JSON string.
pub fn parse(content: &str) -> Result<FedAvgConfig> {
    let config: FedAvgConfig = serde_json::from_str(content)?;
    config.validate()?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        FedError,
        configs::{InitConfig, LossFnConfig},
    };

    #[test]
    fn test_parse_fills_defaults() {
        let config = parse(r#"{ "rounds": 3, "loss": "mse" }"#).unwrap();

        assert_eq!(config.rounds, 3);
        assert_eq!(config.loss, LossFnConfig::Mse);
        assert_eq!(config.holders, vec!["bob", "alice"]);
        assert_eq!(config.local_steps, 5);
    }

    #[test]
    fn test_parse_tagged_init() {
        let config = parse(r#"{ "init": { "kind": "const", "value": 0.0 } }"#).unwrap();
        assert_eq!(config.init, InitConfig::Const { value: 0.0 });
    }

    #[test]
    fn test_parse_rejects_unknown_fields() {
        let err = parse(r#"{ "epochs": 3 }"#).unwrap_err();
        assert!(matches!(err, FedError::Json(_)));
    }

    #[test]
    fn test_parse_validates() {
        let err = parse(r#"{ "aggregator": "bob" }"#).unwrap_err();
        assert!(matches!(err, FedError::InvalidConfig(_)));
    }

    #[test]
    fn test_load_missing_file() {
        let err = load("/definitely/not/here.json").unwrap_err();
        assert!(matches!(err, FedError::Io(_)));
    }
}
