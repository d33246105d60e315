//! One-shot calculation command.
//!
//! Validates the trade from the command line, computes it once and prints
//! either the text breakdown or a JSON document.

use anyhow::Result;
use clap::Args;
use serde::Serialize;
use std::io::Write;
use trade_calc_core::validation::{parse_fee_percent, parse_price, parse_quantity};
use trade_calc_core::{
    AppConfig, CalculatorSession, DisplayConfig, ReportFormatter, ResultRenderer, TradeInput,
    TradeResult, TradingMode,
};

/// Arguments for the calc command.
#[derive(Args, Debug, Clone)]
pub struct CalcArgs {
    /// Buy price per stock
    #[arg(long, allow_hyphen_values = true)]
    pub buy: String,

    /// Sell price per stock
    #[arg(long, allow_hyphen_values = true)]
    pub sell: String,

    /// Number of stocks (default: 1)
    #[arg(short, long, default_value = "1", allow_hyphen_values = true)]
    pub quantity: String,

    /// Trading type: same-day (fee once) or next-day (fee twice)
    #[arg(short, long, default_value = "same-day")]
    pub mode: String,

    /// Fee percentage per charged leg (overrides the configured value)
    #[arg(long)]
    pub fee_percent: Option<String>,

    /// Print the result as JSON instead of the text breakdown
    #[arg(long)]
    pub json: bool,
}

impl CalcArgs {
    /// Validates the raw arguments into a trade.
    ///
    /// # Errors
    ///
    /// Returns an `InputError` for the first invalid argument.
    pub fn to_input(&self, configured_fee: rust_decimal::Decimal) -> Result<TradeInput> {
        let fee_percent = match &self.fee_percent {
            Some(raw) => parse_fee_percent(raw)?,
            None => configured_fee,
        };

        let input = TradeInput::try_new(
            parse_price("buy price", &self.buy)?,
            parse_price("sell price", &self.sell)?,
            parse_quantity(&self.quantity)?,
            self.mode.parse::<TradingMode>()?,
            fee_percent,
        )?;

        Ok(input)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Serialize)]
struct CalculationReport<'a> {
    input: &'a TradeInput,
    result: &'a TradeResult,
}

/// Writes each result to `out` as a text breakdown or JSON.
pub struct ReportRenderer<W: Write> {
    out: W,
    display: DisplayConfig,
    format: OutputFormat,
}

impl<W: Write> ReportRenderer<W> {
    pub fn new(out: W, display: DisplayConfig, format: OutputFormat) -> Self {
        Self {
            out,
            display,
            format,
        }
    }

    #[cfg(test)]
    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> ResultRenderer for ReportRenderer<W> {
    fn render(&mut self, input: &TradeInput, result: &TradeResult) -> Result<()> {
        match self.format {
            OutputFormat::Text => {
                write!(
                    self.out,
                    "{}",
                    ReportFormatter::format(input, result, &self.display)
                )?;
            }
            OutputFormat::Json => {
                serde_json::to_writer_pretty(&mut self.out, &CalculationReport { input, result })?;
                writeln!(self.out)?;
            }
        }
        self.out.flush()?;
        Ok(())
    }
}

/// Runs the calc command against stdout.
///
/// # Errors
///
/// Returns an error if the arguments are invalid or stdout cannot be written.
pub fn run_calc(args: &CalcArgs, config: &AppConfig) -> Result<()> {
    let input = args.to_input(config.fees.fee_percent)?;
    tracing::info!(mode = %input.mode, quantity = input.quantity, "Calculating trade");

    let format = if args.json {
        OutputFormat::Json
    } else {
        OutputFormat::Text
    };
    let renderer = ReportRenderer::new(std::io::stdout().lock(), config.display.clone(), format);

    let mut session = CalculatorSession::new(input, renderer)?;
    session.evaluate()?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use trade_calc_core::InputError;

    fn args(buy: &str, sell: &str, quantity: &str, mode: &str) -> CalcArgs {
        CalcArgs {
            buy: buy.to_string(),
            sell: sell.to_string(),
            quantity: quantity.to_string(),
            mode: mode.to_string(),
            fee_percent: None,
            json: false,
        }
    }

    fn render(input: TradeInput, format: OutputFormat) -> String {
        let renderer = ReportRenderer::new(Vec::new(), DisplayConfig::default(), format);
        let mut session = CalculatorSession::new(input, renderer).unwrap();
        session.evaluate().unwrap();

        String::from_utf8(session.into_renderer().into_inner()).unwrap()
    }

    #[test]
    fn builds_input_from_args() {
        let input = args("100", "105", "3", "next-day")
            .to_input(dec!(1.12))
            .unwrap();

        assert_eq!(input.buy_price, dec!(100));
        assert_eq!(input.sell_price, dec!(105));
        assert_eq!(input.quantity, 3);
        assert_eq!(input.mode, TradingMode::NextDay);
        assert_eq!(input.fee_percent, dec!(1.12));
    }

    #[test]
    fn fee_override_wins_over_config() {
        let mut calc = args("100", "105", "1", "same-day");
        calc.fee_percent = Some("0.25".to_string());

        assert_eq!(calc.to_input(dec!(1.12)).unwrap().fee_percent, dec!(0.25));
    }

    #[test]
    fn rejects_invalid_args() {
        let err = args("-1", "105", "1", "same-day")
            .to_input(dec!(1.12))
            .unwrap_err();
        assert!(matches!(
            err.downcast_ref::<InputError>(),
            Some(InputError::NegativePrice { .. })
        ));

        let err = args("100", "105", "0", "same-day")
            .to_input(dec!(1.12))
            .unwrap_err();
        assert_eq!(err.downcast_ref::<InputError>(), Some(&InputError::ZeroQuantity));

        let err = args("100", "105", "1", "weekly")
            .to_input(dec!(1.12))
            .unwrap_err();
        assert!(err.to_string().contains("unknown trading mode"));
    }

    #[test]
    fn text_report_is_written() {
        let text = render(TradeInput::default(), OutputFormat::Text);

        assert!(text.contains("TRADING CALCULATION"));
        assert!(text.contains("Net Gain/Loss:         Rs. 3.880 (+3.880)"));
    }

    #[test]
    fn json_report_contains_input_and_result() {
        let input = TradeInput {
            mode: TradingMode::NextDay,
            ..TradeInput::default()
        };
        let json: serde_json::Value =
            serde_json::from_str(&render(input, OutputFormat::Json)).unwrap();

        assert_eq!(json["input"]["mode"], "next-day");
        assert_eq!(json["result"]["fee_charge_count"], "twice");
        let sell_fee: rust_decimal::Decimal =
            json["result"]["sell_fee"].as_str().unwrap().parse().unwrap();
        assert_eq!(sell_fee, dec!(1.176));
    }
}
