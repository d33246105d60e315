//! Input validation for trade calculations.
//!
//! Raw values are checked here, where they are collected, so that
//! [`FeeCalculator::compute`](crate::fees::FeeCalculator::compute) can stay total.

use crate::fees::{TradeInput, TradingMode};
use rust_decimal::Decimal;
use std::str::FromStr;
use thiserror::Error;

/// Largest accepted per-share price.
///
/// Keeps `price × quantity × (1 + fee)` well inside the 96-bit decimal range
/// for any `u32` quantity.
pub const MAX_PRICE: Decimal = Decimal::from_parts(3_567_587_328, 232, 0, false, 0);

/// Fee percentages must stay strictly below this.
pub const MAX_FEE_PERCENT: Decimal = Decimal::ONE_HUNDRED;

/// Rejected trade input.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum InputError {
    #[error("{field} cannot be negative (got {value})")]
    NegativePrice { field: &'static str, value: Decimal },

    #[error("{field} exceeds the maximum of {max} (got {value})")]
    PriceOutOfRange {
        field: &'static str,
        value: Decimal,
        max: Decimal,
    },

    #[error("quantity must be at least 1")]
    ZeroQuantity,

    #[error("fee percent must be at least 0 and below {max} (got {value})")]
    FeePercentOutOfRange { value: Decimal, max: Decimal },

    #[error("invalid {field}: '{raw}' is not a number")]
    Unparseable { field: &'static str, raw: String },

    #[error("unknown trading mode '{0}'. Valid values: same-day, next-day")]
    UnknownMode(String),
}

/// Checks a per-share price.
///
/// # Errors
///
/// Returns an error if the price is negative or above [`MAX_PRICE`].
pub fn validate_price(field: &'static str, value: Decimal) -> Result<Decimal, InputError> {
    if value.is_sign_negative() && !value.is_zero() {
        return Err(InputError::NegativePrice { field, value });
    }
    if value > MAX_PRICE {
        return Err(InputError::PriceOutOfRange {
            field,
            value,
            max: MAX_PRICE,
        });
    }
    Ok(value)
}

/// # Errors
///
/// Returns an error if the quantity is zero.
pub fn validate_quantity(quantity: u32) -> Result<u32, InputError> {
    if quantity == 0 {
        return Err(InputError::ZeroQuantity);
    }
    Ok(quantity)
}

/// # Errors
///
/// Returns an error unless `0 <= fee_percent < 100`.
pub fn validate_fee_percent(value: Decimal) -> Result<Decimal, InputError> {
    if value < Decimal::ZERO || value >= MAX_FEE_PERCENT {
        return Err(InputError::FeePercentOutOfRange {
            value,
            max: MAX_FEE_PERCENT,
        });
    }
    Ok(value)
}

/// Parses and validates a price typed by the user.
///
/// # Errors
///
/// Returns an error if the text is not a decimal number or the price is out of range.
pub fn parse_price(field: &'static str, raw: &str) -> Result<Decimal, InputError> {
    let value = parse_decimal(field, raw)?;
    validate_price(field, value)
}

/// # Errors
///
/// Returns an error if the text is not a whole number of at least 1.
pub fn parse_quantity(raw: &str) -> Result<u32, InputError> {
    let quantity = raw
        .trim()
        .parse::<u32>()
        .map_err(|_| InputError::Unparseable {
            field: "quantity",
            raw: raw.to_string(),
        })?;
    validate_quantity(quantity)
}

/// # Errors
///
/// Returns an error if the text is not a decimal number or lies outside `[0, 100)`.
pub fn parse_fee_percent(raw: &str) -> Result<Decimal, InputError> {
    let value = parse_decimal("fee percent", raw)?;
    validate_fee_percent(value)
}

fn parse_decimal(field: &'static str, raw: &str) -> Result<Decimal, InputError> {
    Decimal::from_str(raw.trim()).map_err(|_| InputError::Unparseable {
        field,
        raw: raw.to_string(),
    })
}

impl TradeInput {
    /// Builds a validated input.
    ///
    /// # Errors
    ///
    /// Returns the first rule the values break.
    pub fn try_new(
        buy_price: Decimal,
        sell_price: Decimal,
        quantity: u32,
        mode: TradingMode,
        fee_percent: Decimal,
    ) -> Result<Self, InputError> {
        let input = Self {
            buy_price,
            sell_price,
            quantity,
            mode,
            fee_percent,
        };
        input.validate()?;
        Ok(input)
    }

    /// # Errors
    ///
    /// Returns the first rule the input breaks.
    pub fn validate(&self) -> Result<(), InputError> {
        validate_price("buy price", self.buy_price)?;
        validate_price("sell price", self.sell_price)?;
        validate_quantity(self.quantity)?;
        validate_fee_percent(self.fee_percent)?;
        Ok(())
    }
}
