use crate::fees::DEFAULT_FEE_PERCENT;
use crate::validation::MAX_FEE_PERCENT;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct AppConfig {
    pub fees: FeeConfig,
    pub display: DisplayConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FeeConfig {
    /// Percentage applied per charged leg
    pub fee_percent: Decimal,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplayConfig {
    pub currency_prefix: String,
    /// Decimal places for per-share prices and total cost
    pub price_decimals: u32,
    /// Decimal places for fees, proceeds and gain/loss
    pub amount_decimals: u32,
    pub percent_decimals: u32,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("fees.fee_percent must be at least 0 and below {max} (got {value})")]
    FeePercent { value: Decimal, max: Decimal },
}

impl AppConfig {
    /// # Errors
    ///
    /// Returns an error if the fee percentage is outside `[0, 100)`.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let value = self.fees.fee_percent;
        if value < Decimal::ZERO || value >= MAX_FEE_PERCENT {
            return Err(ConfigError::FeePercent {
                value,
                max: MAX_FEE_PERCENT,
            });
        }
        Ok(())
    }
}

impl Default for FeeConfig {
    fn default() -> Self {
        Self {
            fee_percent: DEFAULT_FEE_PERCENT,
        }
    }
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            currency_prefix: "Rs.".to_string(),
            price_decimals: 2,
            amount_decimals: 3,
            percent_decimals: 2,
        }
    }
}
