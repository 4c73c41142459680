//! Conversion state, refresh sequencing and derived results.

use chrono::{DateTime, Utc};
use std::sync::Arc;
use tracing::{debug, instrument, warn};

use super::amount::parse_amount;
use super::currency::{CurrencyCode, CurrencyPair};
use super::rates::{Quote, RateError, RateProvider, RateSnapshot, RateTable};

/// Identifies one outgoing rate request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RefreshTicket {
    pub seq: u64,
    pub pair: CurrencyPair,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshState {
    Idle,
    Loading { seq: u64 },
}

/// What happened to a completed request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshOutcome {
    Applied,
    Failed,
    /// A newer request was issued after this one.
    Superseded,
}

/// Everything the presentation layer needs to draw the converter.
#[derive(Debug, Clone, PartialEq)]
pub struct ConversionView {
    pub pair: CurrencyPair,
    pub amount_text: String,
    pub converted: Option<f64>,
    pub quote: Option<Quote>,
    pub loading: bool,
    pub updated: String,
}

pub struct ConversionEngine {
    provider: Arc<dyn RateProvider>,
    pair: CurrencyPair,
    amount_text: String,
    snapshot: Option<RateSnapshot>,
    quote: Option<Quote>,
    last_updated: DateTime<Utc>,
    state: RefreshState,
    issued: u64,
}

impl ConversionEngine {
    pub fn new(provider: Arc<dyn RateProvider>, pair: CurrencyPair, amount_text: &str) -> Self {
        Self {
            provider,
            pair,
            amount_text: amount_text.to_string(),
            snapshot: None,
            quote: None,
            last_updated: Utc::now(),
            state: RefreshState::Idle,
            issued: 0,
        }
    }

    pub fn pair(&self) -> CurrencyPair {
        self.pair
    }

    pub fn provider(&self) -> Arc<dyn RateProvider> {
        Arc::clone(&self.provider)
    }

    pub fn amount_text(&self) -> &str {
        &self.amount_text
    }

    pub fn amount(&self) -> f64 {
        parse_amount(&self.amount_text)
    }

    pub fn snapshot(&self) -> Option<&RateSnapshot> {
        self.snapshot.as_ref()
    }

    pub fn quote(&self) -> Option<Quote> {
        self.quote
    }

    pub fn exchange_rate(&self) -> Option<f64> {
        self.quote.map(|q| q.rate)
    }

    /// `amount × rate` using the latest amount and the latest accepted quote.
    pub fn converted_amount(&self) -> Option<f64> {
        self.quote.map(|q| self.amount() * q.rate)
    }

    pub fn state(&self) -> RefreshState {
        self.state
    }

    pub fn is_loading(&self) -> bool {
        matches!(self.state, RefreshState::Loading { .. })
    }

    pub fn last_updated(&self) -> DateTime<Utc> {
        self.last_updated
    }

    /// Updates the raw amount. Never touches the network.
    pub fn set_amount(&mut self, text: &str) {
        self.amount_text = text.to_string();
        debug!(amount = self.amount(), "Amount updated");
    }

    /// Selects a new source currency and returns the request to dispatch,
    /// or `None` when the selection did not change.
    pub fn select_source(&mut self, code: CurrencyCode) -> Option<RefreshTicket> {
        if code == self.pair.source {
            return None;
        }
        self.pair.source = code;
        Some(self.begin_refresh())
    }

    pub fn select_target(&mut self, code: CurrencyCode) -> Option<RefreshTicket> {
        if code == self.pair.target {
            return None;
        }
        self.pair.target = code;
        Some(self.begin_refresh())
    }

    pub fn select_swap(&mut self) -> Option<RefreshTicket> {
        if self.pair.source == self.pair.target {
            return None;
        }
        self.pair = self.pair.swapped();
        Some(self.begin_refresh())
    }

    /// Allocates the next sequence number for the current pair and enters
    /// the loading state.
    pub fn begin_refresh(&mut self) -> RefreshTicket {
        self.issued += 1;
        self.state = RefreshState::Loading { seq: self.issued };
        let ticket = RefreshTicket {
            seq: self.issued,
            pair: self.pair,
        };
        debug!(seq = ticket.seq, pair = %ticket.pair, "Refresh started");
        ticket
    }

    pub fn complete_refresh(
        &mut self,
        ticket: RefreshTicket,
        result: Result<RateTable, RateError>,
    ) -> RefreshOutcome {
        self.complete_refresh_at(ticket, result, Utc::now())
    }

    /// Applies a response. Responses older than the latest issued request are
    /// dropped; failures keep the previous snapshot and quote.
    pub fn complete_refresh_at(
        &mut self,
        ticket: RefreshTicket,
        result: Result<RateTable, RateError>,
        now: DateTime<Utc>,
    ) -> RefreshOutcome {
        if ticket.seq < self.issued {
            debug!(
                seq = ticket.seq,
                latest = self.issued,
                "Discarding superseded rate response"
            );
            return RefreshOutcome::Superseded;
        }
        self.state = RefreshState::Idle;

        let table = match result {
            Ok(table) => table,
            Err(e) => {
                warn!(pair = %ticket.pair, "Failed to fetch exchange rate: {e}");
                return RefreshOutcome::Failed;
            }
        };

        let Some(rate) = table.rate_for(ticket.pair.target) else {
            let e = RateError::MissingRate {
                base: table.base,
                target: ticket.pair.target,
            };
            warn!(pair = %ticket.pair, "Failed to fetch exchange rate: {e}");
            return RefreshOutcome::Failed;
        };

        self.quote = Some(Quote {
            pair: ticket.pair,
            rate,
        });
        self.snapshot = Some(RateSnapshot {
            table,
            fetched_at: now,
        });
        self.last_updated = now;
        debug!(pair = %ticket.pair, rate, "Exchange rate updated");
        RefreshOutcome::Applied
    }

    /// Fetches rates for the current pair and applies the result.
    #[instrument(name = "Refresh", skip(self), fields(pair = %self.pair))]
    pub async fn refresh(&mut self) -> RefreshOutcome {
        let ticket = self.begin_refresh();
        self.dispatch(ticket).await
    }

    pub async fn set_source_currency(&mut self, code: CurrencyCode) -> Option<RefreshOutcome> {
        let ticket = self.select_source(code)?;
        Some(self.dispatch(ticket).await)
    }

    pub async fn set_target_currency(&mut self, code: CurrencyCode) -> Option<RefreshOutcome> {
        let ticket = self.select_target(code)?;
        Some(self.dispatch(ticket).await)
    }

    pub async fn swap(&mut self) -> Option<RefreshOutcome> {
        let ticket = self.select_swap()?;
        Some(self.dispatch(ticket).await)
    }

    async fn dispatch(&mut self, ticket: RefreshTicket) -> RefreshOutcome {
        let result = self.provider.latest(ticket.pair.source).await;
        self.complete_refresh(ticket, result)
    }

    pub fn time_since_update(&self) -> String {
        self.time_since_update_at(Utc::now())
    }

    pub fn time_since_update_at(&self, now: DateTime<Utc>) -> String {
        format_age((now - self.last_updated).num_seconds())
    }

    pub fn view(&self) -> ConversionView {
        ConversionView {
            pair: self.pair,
            amount_text: self.amount_text.clone(),
            converted: self.converted_amount(),
            quote: self.quote,
            loading: self.is_loading(),
            updated: self.time_since_update(),
        }
    }
}

/// Relative age in seconds, minutes or hours. There is no day bucket.
pub fn format_age(seconds: i64) -> String {
    let seconds = seconds.max(0);
    if seconds < 60 {
        return format!("{seconds}s ago");
    }
    let minutes = seconds / 60;
    if minutes < 60 {
        return format!("{minutes}m ago");
    }
    format!("{}h ago", minutes / 60)
}
