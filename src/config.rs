// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Runtime configuration: the settings table, overridden by environment variables.

use std::time::Duration;

use rusqlite::Connection;

use crate::error::Result;
use crate::models::Currency;
use crate::utils::{get_setting, set_setting};

pub const API_KEY_ENV: &str = "OPENEXCHANGERATES_API_KEY";
pub const RATES_URL_ENV: &str = "KOPIYKA_RATES_URL";

pub const API_KEY_SETTING: &str = "openexchangerates_api_key";
pub const REPORTING_CURRENCY_SETTING: &str = "reporting_currency";

pub const DEFAULT_RATES_URL: &str = "https://openexchangerates.org/api/latest.json";

/// Settings for the exchange-rate provider and its cache.
#[derive(Debug, Clone)]
pub struct FxConfig {
    pub endpoint: String,
    pub api_key: Option<String>,
    pub cache_ttl: Duration,
    pub timeout: Duration,
}

impl Default for FxConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_RATES_URL.to_string(),
            api_key: None,
            cache_ttl: Duration::from_secs(3600),
            timeout: Duration::from_secs(10),
        }
    }
}

impl FxConfig {
    /// Environment first, then the settings table.
    pub fn load(conn: &Connection) -> Result<Self> {
        let api_key = match non_empty_env(API_KEY_ENV) {
            Some(k) => Some(k),
            None => get_setting(conn, API_KEY_SETTING)?.filter(|k| !k.trim().is_empty()),
        };
        let endpoint = non_empty_env(RATES_URL_ENV).unwrap_or_else(|| DEFAULT_RATES_URL.into());
        Ok(Self {
            endpoint,
            api_key,
            ..Self::default()
        })
    }
}

fn non_empty_env(name: &str) -> Option<String> {
    std::env::var(name)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

pub fn set_api_key(conn: &Connection, key: &str) -> Result<()> {
    set_setting(conn, API_KEY_SETTING, key.trim())?;
    Ok(())
}

/// Currency analytics and the dashboard report in. Defaults to UAH.
pub fn reporting_currency(conn: &Connection) -> Result<Currency> {
    match get_setting(conn, REPORTING_CURRENCY_SETTING)? {
        Some(v) => v.parse(),
        None => Ok(Currency::Uah),
    }
}

pub fn set_reporting_currency(conn: &Connection, ccy: Currency) -> Result<()> {
    set_setting(conn, REPORTING_CURRENCY_SETTING, ccy.code())?;
    Ok(())
}
