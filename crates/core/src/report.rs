#![allow(clippy::format_push_string)]

use crate::config::DisplayConfig;
use crate::fees::{TradeInput, TradeResult, TradingMode};
use rust_decimal::{Decimal, RoundingStrategy};

/// Rounds half away from zero to exactly `decimals` places.
#[must_use]
pub fn fixed(value: Decimal, decimals: u32) -> String {
    let mut rounded = value.round_dp_with_strategy(decimals, RoundingStrategy::MidpointAwayFromZero);
    if rounded.is_zero() {
        rounded.set_sign_positive(true);
    }
    rounded.rescale(decimals);
    rounded.to_string()
}

/// `Rs. 101.12`
#[must_use]
pub fn format_currency(prefix: &str, value: Decimal, decimals: u32) -> String {
    format!("{prefix} {}", fixed(value, decimals))
}

/// Signed delta, `+3.880` / `-2.000`.
#[must_use]
pub fn format_signed(value: Decimal, decimals: u32) -> String {
    let text = fixed(value, decimals);
    if text.starts_with('-') {
        text
    } else {
        format!("+{text}")
    }
}

#[must_use]
pub fn format_percent(value: Decimal, decimals: u32) -> String {
    format!("{}%", fixed(value, decimals))
}

pub struct ReportFormatter;

impl ReportFormatter {
    /// Renders the fee structure and a full buy/sell/summary breakdown.
    #[must_use]
    pub fn format(input: &TradeInput, result: &TradeResult, display: &DisplayConfig) -> String {
        let prefix = display.currency_prefix.as_str();
        let price = |v: Decimal| format_currency(prefix, v, display.price_decimals);
        let amount = |v: Decimal| format_currency(prefix, v, display.amount_decimals);
        let fee_percent = input.fee_percent.normalize();

        let mut output = String::new();

        output.push('\n');
        output.push_str("═══════════════════════════════════════════════════════════════\n");
        output.push_str("                    TRADING CALCULATION                        \n");
        output.push_str("═══════════════════════════════════════════════════════════════\n");
        output.push('\n');

        output.push_str("Fee Structure\n");
        output.push_str("───────────────────────────────────────────────────────────────\n");
        output.push_str(&format!("Transaction Fee:       {fee_percent}%\n"));
        output.push_str("Same Day Trading:      fee charged once (on buy only)\n");
        output.push_str("Sell on Another Day:   fee charged twice (on buy and sell)\n");
        output.push_str(&format!("Trading Type:          {}\n", input.mode.label()));
        output.push('\n');

        output.push_str("Buy Transaction\n");
        output.push_str("───────────────────────────────────────────────────────────────\n");
        output.push_str(&format!("Quantity:              {} stocks\n", input.quantity));
        output.push_str(&format!("Buy Price per Stock:   {}\n", price(input.buy_price)));
        output.push_str(&format!(
            "Total Buy Value:       {}\n",
            price(result.total_buy_value)
        ));
        output.push_str(&format!(
            "Buy Fee ({fee_percent}%):{}{}\n",
            padding(fee_percent),
            amount(result.buy_fee)
        ));
        output.push_str(&format!("Total Cost:            {}\n", price(result.total_cost)));
        output.push('\n');

        output.push_str("Sell Transaction\n");
        output.push_str("───────────────────────────────────────────────────────────────\n");
        output.push_str(&format!("Quantity:              {} stocks\n", input.quantity));
        output.push_str(&format!("Sell Price per Stock:  {}\n", price(input.sell_price)));
        output.push_str(&format!(
            "Total Sell Value:      {}\n",
            price(result.total_sell_value)
        ));
        let sell_note = match input.mode {
            TradingMode::SameDay => "(No fee - same day)".to_string(),
            TradingMode::NextDay => format!("({fee_percent}%)"),
        };
        output.push_str(&format!(
            "Sell Fee:              {} {sell_note}\n",
            amount(result.sell_fee)
        ));
        output.push_str(&format!("Proceeds:              {}\n", amount(result.proceeds)));
        output.push('\n');

        output.push_str("Summary\n");
        output.push_str("───────────────────────────────────────────────────────────────\n");
        output.push_str(&format!(
            "Total Fees Paid:       {} (charged {})\n",
            amount(result.total_fees),
            result.fee_charge_count
        ));
        output.push_str(&format!(
            "Net Gain/Loss:         {} ({})\n",
            amount(result.gain_loss),
            format_signed(result.gain_loss, display.amount_decimals)
        ));
        output.push_str(&format!(
            "Return on Investment:  {}\n",
            format_percent(result.gain_loss_percent, display.percent_decimals)
        ));

        output.push('\n');
        output.push_str("═══════════════════════════════════════════════════════════════\n");

        if result.total_cost.is_zero() {
            output.push_str("\n⚠️  Total cost is zero; return percentage reported as 0.\n\n");
        }

        output
    }
}

// Aligns the "Buy Fee (x%):" label with the other 23-column labels
fn padding(fee_percent: Decimal) -> String {
    let label_len = format!("Buy Fee ({fee_percent}%):").chars().count();
    " ".repeat(23usize.saturating_sub(label_len).max(1))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fees::FeeCalculator;
    use rust_decimal_macros::dec;

    #[test]
    fn fixed_pads_and_rounds() {
        assert_eq!(fixed(dec!(105), 3), "105.000");
        assert_eq!(fixed(dec!(1.176), 2), "1.18");
        assert_eq!(fixed(dec!(2.5), 0), "3");
        assert_eq!(fixed(dec!(-0.0004), 3), "0.000");
        assert_eq!(fixed(dec!(3.8370253), 2), "3.84");
    }

    #[test]
    fn currency_and_signed_formats() {
        assert_eq!(format_currency("Rs.", dec!(101.12), 2), "Rs. 101.12");
        assert_eq!(format_currency("Rs.", dec!(-2.5), 3), "Rs. -2.500");
        assert_eq!(format_signed(dec!(3.88), 3), "+3.880");
        assert_eq!(format_signed(dec!(-2), 3), "-2.000");
        assert_eq!(format_signed(Decimal::ZERO, 3), "+0.000");
        assert_eq!(format_percent(dec!(2.6740506), 2), "2.67%");
    }

    #[test]
    fn same_day_breakdown() {
        let input = TradeInput::default();
        let result = FeeCalculator::compute(&input);
        let report = ReportFormatter::format(&input, &result, &DisplayConfig::default());

        assert!(report.contains("Transaction Fee:       1.12%"));
        assert!(report.contains("Buy Fee (1.12%):       Rs. 1.120"));
        assert!(report.contains("Total Cost:            Rs. 101.12"));
        assert!(report.contains("Rs. 0.000 (No fee - same day)"));
        assert!(report.contains("Proceeds:              Rs. 105.000"));
        assert!(report.contains("Net Gain/Loss:         Rs. 3.880 (+3.880)"));
        assert!(report.contains("Return on Investment:  3.84%"));
        assert!(report.contains("(charged 1x)"));
    }

    #[test]
    fn next_day_breakdown() {
        let input = TradeInput {
            mode: TradingMode::NextDay,
            ..TradeInput::default()
        };
        let result = FeeCalculator::compute(&input);
        let report = ReportFormatter::format(&input, &result, &DisplayConfig::default());

        assert!(report.contains("Sell Fee:              Rs. 1.176 (1.12%)"));
        assert!(report.contains("Proceeds:              Rs. 103.824"));
        assert!(report.contains("Return on Investment:  2.67%"));
        assert!(report.contains("(charged 2x)"));
        assert!(!report.contains("Total cost is zero"));
    }

    #[test]
    fn zero_cost_is_flagged() {
        let input = TradeInput {
            buy_price: Decimal::ZERO,
            sell_price: Decimal::ZERO,
            quantity: 5,
            ..TradeInput::default()
        };
        let result = FeeCalculator::compute(&input);
        let report = ReportFormatter::format(&input, &result, &DisplayConfig::default());

        assert!(report.contains("Return on Investment:  0.00%"));
        assert!(report.contains("Total cost is zero"));
    }
}
