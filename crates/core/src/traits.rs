use crate::fees::{TradeInput, TradeResult};
use anyhow::Result;

/// Receives every freshly computed result.
pub trait ResultRenderer {
    fn render(&mut self, input: &TradeInput, result: &TradeResult) -> Result<()>;
}
