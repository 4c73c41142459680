use super::ui;
use crate::core::{ConversionEngine, CurrencyPair, RateProvider};
use std::sync::Arc;

/// Runs a single refresh and returns the engine in its resulting state.
pub async fn convert(
    provider: Arc<dyn RateProvider>,
    pair: CurrencyPair,
    amount: &str,
) -> ConversionEngine {
    let mut engine = ConversionEngine::new(provider, pair, amount);

    let pb = ui::new_spinner(&format!("Fetching {} rates...", pair.source));
    engine.refresh().await;
    pb.finish_and_clear();

    engine
}

pub async fn run(
    provider: Arc<dyn RateProvider>,
    pair: CurrencyPair,
    amount: &str,
) -> anyhow::Result<()> {
    let engine = convert(provider, pair, amount).await;
    println!("{}", ui::render_panel(&engine.view()));
    Ok(())
}
