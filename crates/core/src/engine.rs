use crate::events::InputEvent;
use crate::fees::{FeeCalculator, TradeInput, TradeResult};
use crate::traits::ResultRenderer;
use anyhow::Result;

/// Drives the calculator from input events.
///
/// Holds the last accepted input. Each accepted event recomputes the result
/// and hands it to the renderer; rejected events leave the session untouched.
pub struct CalculatorSession<R>
where
    R: ResultRenderer,
{
    input: TradeInput,
    renderer: R,
}

impl<R> CalculatorSession<R>
where
    R: ResultRenderer,
{
    /// # Errors
    ///
    /// Returns an error if `input` is invalid.
    pub fn new(input: TradeInput, renderer: R) -> Result<Self> {
        input.validate()?;
        Ok(Self { input, renderer })
    }

    /// Applies a change, recomputes and renders.
    ///
    /// # Errors
    ///
    /// Returns an [`InputError`](crate::validation::InputError) if the changed input
    /// is invalid, or whatever the renderer fails with.
    pub fn apply(&mut self, event: InputEvent) -> Result<TradeResult> {
        let mut candidate = self.input.clone();
        match event {
            InputEvent::BuyPriceChanged(price) => candidate.buy_price = price,
            InputEvent::SellPriceChanged(price) => candidate.sell_price = price,
            InputEvent::QuantityChanged(quantity) => candidate.quantity = quantity,
            InputEvent::ModeChanged(mode) => candidate.mode = mode,
            InputEvent::FeePercentChanged(fee_percent) => candidate.fee_percent = fee_percent,
        }
        candidate.validate()?;

        tracing::debug!(?event, "Input accepted");
        self.input = candidate;
        self.evaluate()
    }

    /// Recomputes from the current input and renders.
    ///
    /// # Errors
    ///
    /// Returns an error if the renderer fails.
    pub fn evaluate(&mut self) -> Result<TradeResult> {
        let result = FeeCalculator::compute(&self.input);
        tracing::debug!(
            gain_loss = %result.gain_loss,
            total_fees = %result.total_fees,
            "Trade evaluated"
        );
        self.renderer.render(&self.input, &result)?;
        Ok(result)
    }

    #[must_use]
    pub const fn input(&self) -> &TradeInput {
        &self.input
    }

    #[must_use]
    pub const fn renderer(&self) -> &R {
        &self.renderer
    }

    pub fn into_renderer(self) -> R {
        self.renderer
    }
}
