pub mod config;
pub mod config_loader;
pub mod config_watcher;
pub mod engine;
pub mod events;
pub mod fees;
pub mod report;
pub mod traits;
pub mod validation;

pub use config::{AppConfig, ConfigError, DisplayConfig, FeeConfig};
pub use config_loader::ConfigLoader;
pub use config_watcher::ConfigWatcher;
pub use engine::CalculatorSession;
pub use events::InputEvent;
pub use fees::{
    FeeCalculator, FeeChargeCount, TradeInput, TradeResult, TradingMode, DEFAULT_FEE_PERCENT,
};
pub use report::{format_currency, format_percent, format_signed, ReportFormatter};
pub use traits::ResultRenderer;
pub use validation::InputError;
