use crate::fees::TradingMode;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A single change to the calculator inputs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum InputEvent {
    BuyPriceChanged(Decimal),
    SellPriceChanged(Decimal),
    QuantityChanged(u32),
    ModeChanged(TradingMode),
    /// Raised when the fee configuration is reloaded
    FeePercentChanged(Decimal),
}
