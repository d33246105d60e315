//! CLI commands for the trading calculator.

pub mod calc;

pub use calc::{run_calc, CalcArgs};
