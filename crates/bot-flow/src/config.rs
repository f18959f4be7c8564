//! Bot configuration, loaded from YAML.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

/// Largest scale a `Decimal` can carry.
const MAX_DECIMAL_PLACES: u32 = 28;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("io error: {0}")]
    Io(String),
    #[error("invalid config: {0}")]
    Invalid(String),
}

impl From<std::io::Error> for ConfigError {
    fn from(e: std::io::Error) -> Self {
        ConfigError::Io(e.to_string())
    }
}

/// Decimal places used when results are shown to the user.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RoundingPolicy {
    /// Equilibrium price.
    pub price_dp: u32,
    /// Equilibrium quantity.
    pub quantity_dp: u32,
    /// Surplus/deficit volume, profit and cost totals.
    pub amount_dp: u32,
}

impl Default for RoundingPolicy {
    fn default() -> Self {
        Self {
            price_dp: 2,
            quantity_dp: 0,
            amount_dp: 2,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BotConfig {
    /// Capacity of each cost list in the profit task.
    pub max_cost_entries: usize,
    pub rounding: RoundingPolicy,
}

impl Default for BotConfig {
    fn default() -> Self {
        Self {
            max_cost_entries: 5,
            rounding: RoundingPolicy::default(),
        }
    }
}

impl BotConfig {
    /// Parse and validate a YAML document; missing keys take defaults.
    pub fn from_yaml_str(text: &str) -> Result<Self, ConfigError> {
        let cfg: BotConfig =
            serde_yaml::from_str(text).map_err(|e| ConfigError::Invalid(e.to_string()))?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path)?;
        Self::from_yaml_str(&text)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_cost_entries == 0 {
            return Err(ConfigError::Invalid(
                "max_cost_entries must be at least 1".to_string(),
            ));
        }
        let r = &self.rounding;
        if [r.price_dp, r.quantity_dp, r.amount_dp]
            .iter()
            .any(|dp| *dp > MAX_DECIMAL_PLACES)
        {
            return Err(ConfigError::Invalid(format!(
                "decimal places must not exceed {MAX_DECIMAL_PLACES}"
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_classic_bot() {
        let cfg = BotConfig::default();
        assert_eq!(cfg.max_cost_entries, 5);
        assert_eq!(cfg.rounding.price_dp, 2);
        assert_eq!(cfg.rounding.quantity_dp, 0);
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn partial_yaml_keeps_defaults() {
        let cfg = BotConfig::from_yaml_str("max_cost_entries: 3\n").unwrap();
        assert_eq!(cfg.max_cost_entries, 3);
        assert_eq!(cfg.rounding, RoundingPolicy::default());

        let cfg = BotConfig::from_yaml_str("rounding:\n  amount_dp: 0\n").unwrap();
        assert_eq!(cfg.max_cost_entries, 5);
        assert_eq!(cfg.rounding.amount_dp, 0);
        assert_eq!(cfg.rounding.price_dp, 2);
    }

    #[test]
    fn zero_capacity_is_rejected() {
        let err = BotConfig::from_yaml_str("max_cost_entries: 0\n").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn malformed_yaml_is_rejected() {
        assert!(BotConfig::from_yaml_str("max_cost_entries: [1, 2]\n").is_err());
        assert!(BotConfig::from_yaml_str("rounding:\n  price_dp: 40\n").is_err());
    }

    #[test]
    fn missing_file_is_io_error() {
        let err = BotConfig::load("/nonexistent/bot-config.yaml").unwrap_err();
        assert!(matches!(err, ConfigError::Io(_)));
    }
}
