pub mod cli;
pub mod core;
pub mod providers;

use crate::core::config::AppConfig;
use crate::core::{ConversionEngine, CurrencyCode, CurrencyPair, RateProvider};
use anyhow::Result;
use std::sync::Arc;
use tracing::{debug, info};

/// Selection overrides from the command line; `None` keeps the configured
/// default.
#[derive(Debug, Clone, Default)]
pub struct ConversionArgs {
    pub amount: Option<String>,
    pub from: Option<CurrencyCode>,
    pub to: Option<CurrencyCode>,
}

impl ConversionArgs {
    fn resolve(&self, config: &AppConfig) -> (CurrencyPair, String) {
        let pair = CurrencyPair::new(
            self.from.unwrap_or(config.defaults.source),
            self.to.unwrap_or(config.defaults.target),
        );
        let amount = self
            .amount
            .clone()
            .unwrap_or_else(|| config.defaults.amount.clone());
        (pair, amount)
    }
}

#[derive(Debug, Clone)]
pub enum AppCommand {
    Convert(ConversionArgs),
    Watch(ConversionArgs),
    Rates { base: Option<CurrencyCode> },
    Currencies,
}

pub fn load_config(config_path: Option<&str>) -> Result<AppConfig> {
    let config = match config_path {
        Some(path) => AppConfig::load_from_path(path)?,
        None => AppConfig::load()?,
    };
    debug!("Loaded config: {config:#?}");
    Ok(config)
}

pub fn build_provider(config: &AppConfig) -> Result<Arc<dyn RateProvider>> {
    let provider = providers::ExchangeRateApiProvider::new(&config.provider.base_url)?;
    Ok(Arc::new(provider))
}

pub async fn run_command(command: AppCommand, config_path: Option<&str>) -> Result<()> {
    info!("fxlive starting...");
    let config = load_config(config_path)?;

    match command {
        AppCommand::Convert(args) => {
            let (pair, amount) = args.resolve(&config);
            cli::convert::run(build_provider(&config)?, pair, &amount).await
        }
        AppCommand::Watch(args) => {
            let (pair, amount) = args.resolve(&config);
            let engine = ConversionEngine::new(build_provider(&config)?, pair, &amount);
            cli::watch::run(engine, config.refresh_interval()).await
        }
        AppCommand::Rates { base } => {
            let provider = build_provider(&config)?;
            let base = base.unwrap_or(config.defaults.source);
            cli::rates::run(provider.as_ref(), base).await
        }
        AppCommand::Currencies => cli::currencies::run(config.defaults.pair()),
    }
}
