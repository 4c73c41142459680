//! Core conversion logic and abstractions

pub mod amount;
pub mod config;
pub mod currency;
pub mod engine;
pub mod log;
pub mod rates;
pub mod selector;
pub mod timer;

// Re-export main types for cleaner imports
pub use currency::{CurrencyCode, CurrencyPair};
pub use engine::{ConversionEngine, ConversionView, RefreshOutcome, RefreshTicket};
pub use rates::{Quote, RateError, RateProvider, RateSnapshot, RateTable};
pub use selector::CurrencySelector;
pub use timer::RefreshTimer;
