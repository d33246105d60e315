mod screens;

use anyhow::Result;
use crossterm::{
    event::{
        self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEvent, KeyEventKind,
        KeyModifiers,
    },
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::{Backend, CrosstermBackend},
    Terminal,
};
use rust_decimal::Decimal;
use std::collections::HashMap;
use std::io;
use tokio::sync::watch;
use trade_calc_core::report::fixed;
use trade_calc_core::validation::{parse_price, parse_quantity};
use trade_calc_core::{
    AppConfig, CalculatorSession, DisplayConfig, InputEvent, ResultRenderer, TradeInput,
    TradeResult,
};
use tui_input::backend::crossterm::EventHandler;
use tui_input::Input;

/// Editable fields, in focus order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    BuyPrice,
    SellPrice,
    Quantity,
    Mode,
}

impl Field {
    const ALL: [Self; 4] = [Self::BuyPrice, Self::SellPrice, Self::Quantity, Self::Mode];

    pub const fn label(self) -> &'static str {
        match self {
            Self::BuyPrice => "Buy Price",
            Self::SellPrice => "Sell Price",
            Self::Quantity => "No. of Stocks",
            Self::Mode => "Trading Type",
        }
    }

    fn index(self) -> usize {
        Self::ALL.iter().position(|f| *f == self).unwrap_or(0)
    }

    fn next(self) -> Self {
        Self::ALL[(self.index() + 1) % Self::ALL.len()]
    }

    fn prev(self) -> Self {
        Self::ALL[(self.index() + Self::ALL.len() - 1) % Self::ALL.len()]
    }
}

/// Keeps the latest result for the next frame.
#[derive(Debug, Default)]
pub struct LatestResult {
    result: Option<TradeResult>,
}

impl ResultRenderer for LatestResult {
    fn render(&mut self, _input: &TradeInput, result: &TradeResult) -> Result<()> {
        self.result = Some(result.clone());
        Ok(())
    }
}

/// Calculator screen state
pub struct App {
    session: CalculatorSession<LatestResult>,
    pub display: DisplayConfig,
    pub buy_input: Input,
    pub sell_input: Input,
    pub quantity_input: Input,
    pub focus: Field,
    /// Rejection message per field whose text does not parse or validate
    pub invalid: HashMap<Field, String>,
    pub status: Option<String>,
    pub show_breakdown: bool,
    pub breakdown_scroll: u16,
    pub should_quit: bool,
}

impl App {
    /// # Errors
    ///
    /// Returns an error if the configured fee cannot be used.
    pub fn new(config: &AppConfig) -> Result<Self> {
        let input = TradeInput {
            fee_percent: config.fees.fee_percent,
            ..TradeInput::default()
        };
        let display = config.display.clone();

        let buy_input = Input::new(fixed(input.buy_price, display.price_decimals));
        let sell_input = Input::new(fixed(input.sell_price, display.price_decimals));
        let quantity_input = Input::new(input.quantity.to_string());

        let mut session = CalculatorSession::new(input, LatestResult::default())?;
        session.evaluate()?;

        Ok(Self {
            session,
            display,
            buy_input,
            sell_input,
            quantity_input,
            focus: Field::BuyPrice,
            invalid: HashMap::new(),
            status: None,
            show_breakdown: false,
            breakdown_scroll: 0,
            should_quit: false,
        })
    }

    pub const fn input(&self) -> &TradeInput {
        self.session.input()
    }

    pub fn result(&self) -> Option<&TradeResult> {
        self.session.renderer().result.as_ref()
    }

    pub fn is_invalid(&self, field: Field) -> bool {
        self.invalid.contains_key(&field)
    }

    /// Error for the first invalid field in focus order.
    pub fn input_error(&self) -> Option<&str> {
        Field::ALL
            .iter()
            .find_map(|field| self.invalid.get(field))
            .map(String::as_str)
    }

    pub fn handle_key(&mut self, key: KeyEvent) {
        let numeric_focus = self.focus != Field::Mode;

        match key.code {
            KeyCode::Esc => self.should_quit = true,
            KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                self.should_quit = true;
            }
            KeyCode::Tab => self.focus = self.focus.next(),
            KeyCode::BackTab => self.focus = self.focus.prev(),
            KeyCode::Up => self.step(true),
            KeyCode::Down => self.step(false),
            KeyCode::PageDown => self.breakdown_scroll = self.breakdown_scroll.saturating_add(5),
            KeyCode::PageUp => self.breakdown_scroll = self.breakdown_scroll.saturating_sub(5),
            KeyCode::Left | KeyCode::Right | KeyCode::Char(' ') if !numeric_focus => {
                self.toggle_mode();
            }
            KeyCode::Char('q') => self.should_quit = true,
            KeyCode::Char('m') => self.toggle_mode(),
            KeyCode::Char('d') => {
                self.show_breakdown = !self.show_breakdown;
                self.breakdown_scroll = 0;
            }
            KeyCode::Char(c) if numeric_focus && (c.is_ascii_digit() || c == '.') => {
                self.edit(key);
            }
            KeyCode::Backspace
            | KeyCode::Delete
            | KeyCode::Left
            | KeyCode::Right
            | KeyCode::Home
            | KeyCode::End
                if numeric_focus =>
            {
                self.edit(key);
            }
            _ => {}
        }
    }

    /// Applies a reloaded configuration.
    pub fn apply_config(&mut self, config: &AppConfig) {
        self.display = config.display.clone();

        let fee_percent = config.fees.fee_percent;
        if fee_percent == self.input().fee_percent {
            return;
        }
        match self.session.apply(InputEvent::FeePercentChanged(fee_percent)) {
            Ok(_) => {
                tracing::info!(%fee_percent, "Fee updated from config");
                self.status = Some(format!("Fee updated to {}%", fee_percent.normalize()));
            }
            Err(e) => self.status = Some(format!("Config rejected: {e}")),
        }
    }

    fn focused_input_mut(&mut self) -> Option<&mut Input> {
        match self.focus {
            Field::BuyPrice => Some(&mut self.buy_input),
            Field::SellPrice => Some(&mut self.sell_input),
            Field::Quantity => Some(&mut self.quantity_input),
            Field::Mode => None,
        }
    }

    fn edit(&mut self, key: KeyEvent) {
        let Some(input) = self.focused_input_mut() else {
            return;
        };
        if let Some(changed) = input.handle_event(&Event::Key(key)) {
            if changed.value {
                self.commit(self.focus);
            }
        }
    }

    /// Parses a field's text and feeds it to the session.
    fn commit(&mut self, field: Field) {
        let event = match field {
            Field::BuyPrice => {
                parse_price("buy price", self.buy_input.value()).map(InputEvent::BuyPriceChanged)
            }
            Field::SellPrice => {
                parse_price("sell price", self.sell_input.value()).map(InputEvent::SellPriceChanged)
            }
            Field::Quantity => {
                parse_quantity(self.quantity_input.value()).map(InputEvent::QuantityChanged)
            }
            Field::Mode => return,
        };

        match event
            .map_err(anyhow::Error::from)
            .and_then(|event| self.session.apply(event))
        {
            Ok(_) => {
                self.invalid.remove(&field);
                self.status = None;
            }
            Err(e) => {
                tracing::debug!(?field, error = %e, "Input rejected");
                self.invalid.insert(field, e.to_string());
            }
        }
    }

    /// Steps the focused field by one unit, like a number spinner.
    fn step(&mut self, up: bool) {
        let delta = if up { Decimal::ONE } else { Decimal::NEGATIVE_ONE };
        let decimals = self.display.price_decimals;

        match self.focus {
            Field::BuyPrice => {
                let next = (self.input().buy_price + delta).max(Decimal::ZERO);
                self.buy_input = Input::new(fixed(next, decimals));
            }
            Field::SellPrice => {
                let next = (self.input().sell_price + delta).max(Decimal::ZERO);
                self.sell_input = Input::new(fixed(next, decimals));
            }
            Field::Quantity => {
                let current = self.input().quantity;
                let next = if up {
                    current.saturating_add(1)
                } else {
                    current.saturating_sub(1).max(1)
                };
                self.quantity_input = Input::new(next.to_string());
            }
            Field::Mode => {
                self.toggle_mode();
                return;
            }
        }
        self.commit(self.focus);
    }

    fn toggle_mode(&mut self) {
        let mode = self.input().mode.toggled();
        if let Err(e) = self.session.apply(InputEvent::ModeChanged(mode)) {
            self.status = Some(e.to_string());
        }
    }
}

/// Runs the calculator screen until the user quits.
///
/// When `config_updates` is given, reloaded configurations are applied as they arrive.
///
/// # Errors
///
/// Returns an error if the terminal cannot be set up or restored.
pub async fn run(
    config: AppConfig,
    config_updates: Option<watch::Receiver<AppConfig>>,
) -> Result<()> {
    let mut app = App::new(&config)?;

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let res = run_app(&mut terminal, &mut app, config_updates).await;

    // Restore terminal
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    if let Err(err) = res {
        println!("Error: {err:?}");
    }

    Ok(())
}

async fn run_app<B: Backend>(
    terminal: &mut Terminal<B>,
    app: &mut App,
    mut config_updates: Option<watch::Receiver<AppConfig>>,
) -> Result<()> {
    loop {
        terminal.draw(|f| screens::render(f, app))?;

        if event::poll(std::time::Duration::from_millis(100))? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    app.handle_key(key);
                }
            }
        }

        if app.should_quit {
            return Ok(());
        }

        if let Some(rx) = config_updates.as_mut() {
            if rx.has_changed().unwrap_or(false) {
                let config = rx.borrow_and_update().clone();
                app.apply_config(&config);
            }
        }

        tokio::task::yield_now().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use trade_calc_core::{FeeChargeCount, TradingMode};

    fn press(app: &mut App, code: KeyCode) {
        app.handle_key(KeyEvent::new(code, KeyModifiers::NONE));
    }

    fn type_text(app: &mut App, text: &str) {
        for c in text.chars() {
            press(app, KeyCode::Char(c));
        }
    }

    fn clear_field(app: &mut App) {
        for _ in 0..12 {
            press(app, KeyCode::Backspace);
        }
    }

    fn app() -> App {
        App::new(&AppConfig::default()).unwrap()
    }

    #[test]
    fn starts_with_default_trade() {
        let app = app();

        assert_eq!(app.buy_input.value(), "100.00");
        assert_eq!(app.sell_input.value(), "105.00");
        assert_eq!(app.quantity_input.value(), "1");
        assert_eq!(app.result().unwrap().gain_loss, dec!(3.88));
    }

    #[test]
    fn typing_recomputes() {
        let mut app = app();
        press(&mut app, KeyCode::Tab);
        press(&mut app, KeyCode::Tab);
        assert_eq!(app.focus, Field::Quantity);

        clear_field(&mut app);
        type_text(&mut app, "10");

        assert_eq!(app.input().quantity, 10);
        assert_eq!(app.result().unwrap().total_cost, dec!(1011.2));
    }

    #[test]
    fn invalid_text_keeps_last_result() {
        let mut app = app();
        clear_field(&mut app);

        assert!(app.is_invalid(Field::BuyPrice));
        assert!(app.input_error().unwrap().contains("buy price"));
        // "1" was the last text that parsed
        assert_eq!(app.input().buy_price, dec!(1));

        type_text(&mut app, "90.5");
        assert!(app.invalid.is_empty());
        assert_eq!(app.input_error(), None);
        assert_eq!(app.input().buy_price, dec!(90.5));
    }

    #[test]
    fn fixing_one_field_keeps_other_errors() {
        let mut app = app();
        clear_field(&mut app);
        press(&mut app, KeyCode::Tab);
        press(&mut app, KeyCode::Tab);
        clear_field(&mut app);
        assert!(app.is_invalid(Field::BuyPrice));
        assert!(app.is_invalid(Field::Quantity));

        type_text(&mut app, "2");

        assert!(!app.is_invalid(Field::Quantity));
        assert!(app.is_invalid(Field::BuyPrice));
        assert_eq!(app.buy_input.value(), "");
        assert!(app.input_error().unwrap().contains("buy price"));
        assert_eq!(app.input().quantity, 2);
        assert_eq!(app.input().buy_price, dec!(1));
    }

    #[test]
    fn letters_do_not_reach_numeric_fields() {
        let mut app = app();
        press(&mut app, KeyCode::Char('x'));

        assert_eq!(app.buy_input.value(), "100.00");
        assert!(!app.should_quit);
    }

    #[test]
    fn arrows_step_and_clamp() {
        let mut app = app();
        press(&mut app, KeyCode::Up);
        assert_eq!(app.buy_input.value(), "101.00");
        assert_eq!(app.input().buy_price, dec!(101));

        press(&mut app, KeyCode::Tab);
        press(&mut app, KeyCode::Tab);
        press(&mut app, KeyCode::Down);
        assert_eq!(app.input().quantity, 1);
        press(&mut app, KeyCode::Up);
        assert_eq!(app.input().quantity, 2);
    }

    #[test]
    fn mode_toggles_from_mode_field_and_shortcut() {
        let mut app = app();
        press(&mut app, KeyCode::BackTab);
        assert_eq!(app.focus, Field::Mode);

        press(&mut app, KeyCode::Right);
        assert_eq!(app.input().mode, TradingMode::NextDay);
        assert_eq!(app.result().unwrap().fee_charge_count, FeeChargeCount::Twice);
        assert_eq!(app.result().unwrap().sell_fee, dec!(1.176));

        press(&mut app, KeyCode::Char('m'));
        assert_eq!(app.input().mode, TradingMode::SameDay);
    }

    #[test]
    fn breakdown_and_quit_keys() {
        let mut app = app();
        press(&mut app, KeyCode::Char('d'));
        assert!(app.show_breakdown);
        press(&mut app, KeyCode::PageDown);
        assert_eq!(app.breakdown_scroll, 5);
        press(&mut app, KeyCode::Char('d'));
        assert!(!app.show_breakdown);
        assert_eq!(app.breakdown_scroll, 0);

        press(&mut app, KeyCode::Char('q'));
        assert!(app.should_quit);
    }

    #[test]
    fn reloaded_fee_is_applied() {
        let mut app = app();
        let mut config = AppConfig::default();
        config.fees.fee_percent = dec!(0.5);
        config.display.currency_prefix = "$".to_string();

        app.apply_config(&config);

        assert_eq!(app.input().fee_percent, dec!(0.5));
        assert_eq!(app.result().unwrap().buy_fee, dec!(0.5));
        assert_eq!(app.display.currency_prefix, "$");
        assert_eq!(app.status.as_deref(), Some("Fee updated to 0.5%"));
    }
}
