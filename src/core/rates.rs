//! Exchange rate abstractions and core types

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use thiserror::Error;

use super::currency::{CurrencyCode, CurrencyPair};

/// Ways a rate lookup can fail. The engine treats all of them the same way.
#[derive(Debug, Error)]
pub enum RateError {
    /// Transport failure or a non-success HTTP status.
    #[error("Network error for base {base}: {reason}")]
    Network { base: CurrencyCode, reason: String },

    /// The response body did not have the expected shape.
    #[error("Malformed response for base {base}: {reason}")]
    MalformedResponse { base: CurrencyCode, reason: String },

    /// The response parsed but carried no usable rate for the target.
    #[error("No rate for {target} in response for base {base}")]
    MissingRate {
        base: CurrencyCode,
        target: CurrencyCode,
    },
}

/// Rates for one base currency, as returned by a provider.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RateTable {
    pub base: CurrencyCode,
    pub rates: HashMap<String, f64>,
}

impl RateTable {
    pub fn rate_for(&self, target: CurrencyCode) -> Option<f64> {
        self.rates.get(target.as_str()).copied()
    }
}

/// The latest accepted rate table and when it arrived.
#[derive(Debug, Clone, PartialEq)]
pub struct RateSnapshot {
    pub table: RateTable,
    pub fetched_at: DateTime<Utc>,
}

impl RateSnapshot {
    pub fn base(&self) -> CurrencyCode {
        self.table.base
    }
}

/// The rate for the pair that was selected when the snapshot was requested.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Quote {
    pub pair: CurrencyPair,
    pub rate: f64,
}

#[async_trait]
pub trait RateProvider: Send + Sync {
    async fn latest(&self, base: CurrencyCode) -> Result<RateTable, RateError>;
}
