// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Exchange rates and currency conversion through the USD base.
//!
//! Rates come from a [`RateSource`] and are kept in a [`RateCache`] for an
//! hour. Every failure on this path (missing key, network, bad payload,
//! unknown currency) degrades to `None`; callers show the unconverted amount.

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use chrono::{DateTime, Utc};
use rust_decimal::{Decimal, RoundingStrategy};
use serde::Deserialize;
use thiserror::Error;

use crate::config::FxConfig;
use crate::models::Currency;
use crate::utils::http_client;

pub const BASE_CURRENCY: Currency = Currency::Usd;

/// Rates relative to the base currency: `1 USD = rate[code] code`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RateTable {
    rates: BTreeMap<String, Decimal>,
}

impl RateTable {
    pub fn new(rates: BTreeMap<String, Decimal>) -> Self {
        Self { rates }
    }

    pub fn from_pairs<I, S>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (S, Decimal)>,
        S: Into<String>,
    {
        Self {
            rates: pairs
                .into_iter()
                .map(|(k, v)| (k.into().to_uppercase(), v))
                .collect(),
        }
    }

    pub fn rate(&self, ccy: Currency) -> Option<Decimal> {
        self.rates.get(ccy.code()).copied()
    }

    pub fn len(&self) -> usize {
        self.rates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rates.is_empty()
    }

    /// Two-hop conversion through [`BASE_CURRENCY`], rounded half-to-even to
    /// two places. Identity pairs come back untouched.
    pub fn convert(&self, amount: Decimal, from: Currency, to: Currency) -> Option<Decimal> {
        if from == to {
            return Some(amount);
        }
        let in_base = if from == BASE_CURRENCY {
            amount
        } else {
            amount.checked_div(self.usable_rate(from)?)?
        };
        let converted = if to == BASE_CURRENCY {
            in_base
        } else {
            in_base.checked_mul(self.usable_rate(to)?)?
        };
        Some(converted.round_dp_with_strategy(2, RoundingStrategy::MidpointNearestEven))
    }

    fn usable_rate(&self, ccy: Currency) -> Option<Decimal> {
        match self.rate(ccy) {
            Some(r) if !r.is_zero() => Some(r),
            _ => {
                tracing::error!(currency = %ccy, "no exchange rate for currency");
                None
            }
        }
    }
}

#[derive(Debug, Error)]
pub enum RateError {
    #[error("exchange-rate API key is not configured")]
    MissingApiKey,
    #[error("rate request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("rate provider answered {0}")]
    Status(reqwest::StatusCode),
    #[error("could not parse rate payload: {0}")]
    Decode(String),
}

/// Where fresh rates come from.
pub trait RateSource: Send + Sync {
    fn fetch_latest(&self, base: Currency) -> Result<RateTable, RateError>;
}

pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

#[derive(Debug, Deserialize)]
struct LatestPayload {
    rates: BTreeMap<String, f64>,
}

/// Parses a `{"rates": {"UAH": 41.5, ...}}` body. Non-finite entries are dropped.
pub fn parse_rates_payload(body: &str) -> Result<RateTable, RateError> {
    let payload: LatestPayload =
        serde_json::from_str(body).map_err(|e| RateError::Decode(e.to_string()))?;
    let rates = payload
        .rates
        .into_iter()
        .filter_map(|(code, v)| Decimal::try_from(v).ok().map(|d| (code.to_uppercase(), d)))
        .collect();
    Ok(RateTable::new(rates))
}

/// openexchangerates.org `latest.json`.
pub struct HttpRateSource {
    endpoint: String,
    api_key: Option<String>,
    timeout: Duration,
}

impl HttpRateSource {
    pub fn new(config: &FxConfig) -> Self {
        Self {
            endpoint: config.endpoint.clone(),
            api_key: config.api_key.clone(),
            timeout: config.timeout,
        }
    }
}

impl RateSource for HttpRateSource {
    fn fetch_latest(&self, base: Currency) -> Result<RateTable, RateError> {
        let key = self.api_key.as_deref().ok_or(RateError::MissingApiKey)?;
        let client = http_client(self.timeout)?;
        let resp = client
            .get(&self.endpoint)
            .query(&[("app_id", key), ("base", base.code())])
            .send()?;
        if !resp.status().is_success() {
            return Err(RateError::Status(resp.status()));
        }
        let body = resp.text()?;
        parse_rates_payload(&body)
    }
}

struct CachedRates {
    fetched_at: DateTime<Utc>,
    table: Arc<RateTable>,
}

/// Single-slot cache for the latest rate table.
pub struct RateCache {
    ttl: chrono::Duration,
    slot: Mutex<Option<CachedRates>>,
}

impl RateCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl: chrono::Duration::from_std(ttl).unwrap_or(chrono::Duration::hours(1)),
            slot: Mutex::new(None),
        }
    }

    /// The cached table if it was stored less than `ttl` before `now`.
    pub fn get(&self, now: DateTime<Utc>) -> Option<Arc<RateTable>> {
        let slot = self.slot.lock().unwrap_or_else(PoisonError::into_inner);
        slot.as_ref()
            .filter(|c| now - c.fetched_at < self.ttl)
            .map(|c| Arc::clone(&c.table))
    }

    pub fn put(&self, now: DateTime<Utc>, table: RateTable) -> Arc<RateTable> {
        let table = Arc::new(table);
        let mut slot = self.slot.lock().unwrap_or_else(PoisonError::into_inner);
        *slot = Some(CachedRates {
            fetched_at: now,
            table: Arc::clone(&table),
        });
        table
    }

    pub fn clear(&self) {
        *self.slot.lock().unwrap_or_else(PoisonError::into_inner) = None;
    }
}

pub struct CurrencyConverter {
    source: Box<dyn RateSource>,
    cache: Arc<RateCache>,
    clock: Arc<dyn Clock>,
    refresh: Mutex<()>,
}

impl CurrencyConverter {
    pub fn new(source: Box<dyn RateSource>, cache: Arc<RateCache>, clock: Arc<dyn Clock>) -> Self {
        Self {
            source,
            cache,
            clock,
            refresh: Mutex::new(()),
        }
    }

    /// HTTP source, system clock and a cache with the configured TTL.
    pub fn from_config(config: &FxConfig) -> Self {
        Self::new(
            Box::new(HttpRateSource::new(config)),
            Arc::new(RateCache::new(config.cache_ttl)),
            Arc::new(SystemClock),
        )
    }

    pub fn get_rates(&self) -> Option<Arc<RateTable>> {
        if let Some(t) = self.cache.get(self.clock.now()) {
            tracing::debug!("exchange rates served from cache");
            return Some(t);
        }
        let _guard = self.refresh.lock().unwrap_or_else(PoisonError::into_inner);
        // another caller may have refreshed while we waited
        if let Some(t) = self.cache.get(self.clock.now()) {
            return Some(t);
        }
        match self.source.fetch_latest(BASE_CURRENCY) {
            Ok(table) => {
                tracing::info!(currencies = table.len(), "exchange rates fetched");
                Some(self.cache.put(self.clock.now(), table))
            }
            Err(RateError::MissingApiKey) => {
                tracing::warn!("{}", RateError::MissingApiKey);
                None
            }
            Err(e) => {
                tracing::error!(error = %e, "could not fetch exchange rates");
                None
            }
        }
    }

    pub fn convert(&self, amount: Decimal, from: Currency, to: Currency) -> Option<Decimal> {
        if from == to {
            return Some(amount);
        }
        self.get_rates()?.convert(amount, from, to)
    }

    /// Like [`convert`](Self::convert) for user-typed input; garbage converts to `None`.
    pub fn convert_str(&self, amount: &str, from: &str, to: &str) -> Option<Decimal> {
        let parsed = (
            amount.trim().parse::<Decimal>(),
            from.parse::<Currency>(),
            to.parse::<Currency>(),
        );
        match parsed {
            (Ok(a), Ok(f), Ok(t)) => self.convert(a, f, t),
            _ => {
                tracing::error!(amount, from, to, "conversion input rejected");
                None
            }
        }
    }

    /// Supported currencies' rates against USD, 1 where the provider has none.
    pub fn display_rates(&self) -> Option<Vec<(Currency, Decimal)>> {
        let table = self.get_rates()?;
        Some(
            Currency::ALL
                .iter()
                .map(|&c| (c, table.rate(c).unwrap_or(Decimal::ONE)))
                .collect(),
        )
    }
}

pub fn supported_currencies() -> Vec<(&'static str, &'static str)> {
    Currency::ALL
        .iter()
        .map(|c| (c.code(), c.display_name()))
        .collect()
}
