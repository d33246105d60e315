//! Transaction fee and profit/loss calculation.
//!
//! A trade is bought and later sold at a fixed quantity. The buy leg is always
//! charged the configured fee; the sell leg is charged only when the position
//! is held past the trading day it was opened on.

use crate::validation::InputError;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Fee percentage applied per charged leg unless configured otherwise (1.12%).
pub const DEFAULT_FEE_PERCENT: Decimal = Decimal::from_parts(112, 0, 0, false, 2);

/// Whether the position is closed on the day it was opened.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TradingMode {
    /// Fee charged on the buy leg only
    #[default]
    SameDay,
    /// Fee charged on both legs
    NextDay,
}

impl TradingMode {
    /// Human-readable label used on the calculator screen.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::SameDay => "Same Day Trading",
            Self::NextDay => "Sell on Another Day",
        }
    }

    #[must_use]
    pub const fn toggled(self) -> Self {
        match self {
            Self::SameDay => Self::NextDay,
            Self::NextDay => Self::SameDay,
        }
    }

    #[must_use]
    pub const fn fee_charge_count(self) -> FeeChargeCount {
        match self {
            Self::SameDay => FeeChargeCount::Once,
            Self::NextDay => FeeChargeCount::Twice,
        }
    }
}

impl std::str::FromStr for TradingMode {
    type Err = InputError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "same-day" | "same_day" | "same" | "intraday" => Ok(Self::SameDay),
            "next-day" | "next_day" | "next" | "another-day" => Ok(Self::NextDay),
            other => Err(InputError::UnknownMode(other.to_string())),
        }
    }
}

impl std::fmt::Display for TradingMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::SameDay => write!(f, "same-day"),
            Self::NextDay => write!(f, "next-day"),
        }
    }
}

/// Number of legs the fee was charged on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FeeChargeCount {
    Once,
    Twice,
}

impl FeeChargeCount {
    #[must_use]
    pub const fn legs(self) -> u8 {
        match self {
            Self::Once => 1,
            Self::Twice => 2,
        }
    }
}

impl std::fmt::Display for FeeChargeCount {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}x", self.legs())
    }
}

/// Inputs for a single calculation.
///
/// Values are expected to be validated at the collection boundary
/// (see [`crate::validation`]); [`FeeCalculator::compute`] does not re-check them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TradeInput {
    /// Price paid per share
    pub buy_price: Decimal,
    /// Price received per share
    pub sell_price: Decimal,
    /// Number of shares, at least 1
    pub quantity: u32,
    pub mode: TradingMode,
    /// Fee percentage per charged leg (1.12 = 1.12%)
    pub fee_percent: Decimal,
}

impl Default for TradeInput {
    fn default() -> Self {
        Self {
            buy_price: Decimal::ONE_HUNDRED,
            sell_price: Decimal::new(105, 0),
            quantity: 1,
            mode: TradingMode::SameDay,
            fee_percent: DEFAULT_FEE_PERCENT,
        }
    }
}

/// Figures derived from a [`TradeInput`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TradeResult {
    /// buy_price × quantity
    pub total_buy_value: Decimal,
    pub buy_fee: Decimal,
    /// Buy value plus buy fee
    pub total_cost: Decimal,
    /// sell_price × quantity
    pub total_sell_value: Decimal,
    /// Zero for same-day trades
    pub sell_fee: Decimal,
    /// Sell value minus sell fee
    pub proceeds: Decimal,
    pub gain_loss: Decimal,
    /// Gain/loss relative to total cost, in percent (0 when total cost is 0)
    pub gain_loss_percent: Decimal,
    pub total_fees: Decimal,
    pub fee_charge_count: FeeChargeCount,
}

impl TradeResult {
    #[must_use]
    pub fn is_gain(&self) -> bool {
        self.gain_loss >= Decimal::ZERO
    }
}

pub struct FeeCalculator;

impl FeeCalculator {
    /// Computes fees, proceeds and gain/loss for a trade.
    ///
    /// Total for any validated input. When the total cost is zero the return
    /// percentage is reported as zero instead of dividing by it.
    #[must_use]
    pub fn compute(input: &TradeInput) -> TradeResult {
        let quantity = Decimal::from(input.quantity);

        let total_buy_value = input.buy_price * quantity;
        let buy_fee = leg_fee(total_buy_value, input.fee_percent);
        let total_cost = total_buy_value + buy_fee;

        let total_sell_value = input.sell_price * quantity;
        let sell_fee = match input.mode {
            TradingMode::SameDay => Decimal::ZERO,
            TradingMode::NextDay => leg_fee(total_sell_value, input.fee_percent),
        };
        let proceeds = total_sell_value - sell_fee;

        let gain_loss = proceeds - total_cost;
        let gain_loss_percent = if total_cost > Decimal::ZERO {
            // Loss is bounded by -100%; only a tiny cost with a large gain can leave the range
            gain_loss
                .checked_div(total_cost)
                .and_then(|ratio| ratio.checked_mul(Decimal::ONE_HUNDRED))
                .unwrap_or(Decimal::MAX)
        } else {
            Decimal::ZERO
        };

        TradeResult {
            total_buy_value,
            buy_fee,
            total_cost,
            total_sell_value,
            sell_fee,
            proceeds,
            gain_loss,
            gain_loss_percent,
            total_fees: buy_fee + sell_fee,
            fee_charge_count: input.mode.fee_charge_count(),
        }
    }
}

fn leg_fee(value: Decimal, fee_percent: Decimal) -> Decimal {
    value * fee_percent / Decimal::ONE_HUNDRED
}
