// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

pub mod analytics;
pub mod categories;
pub mod dashboard;
pub mod exporter;
pub mod fx;
pub mod tables;
pub mod transactions;
pub mod users;

use anyhow::{Context, Result, anyhow};
use rusqlite::Connection;

use crate::cli::USER_ENV;
use crate::config::FxConfig;
use crate::models::{Currency, OwnerId};
use crate::services::fx::CurrencyConverter;
use crate::services::users::find_user;

/// A required string argument, trimmed.
pub(crate) fn required<'a>(m: &'a clap::ArgMatches, name: &str) -> Result<&'a str> {
    m.get_one::<String>(name)
        .map(|s| s.trim())
        .ok_or_else(|| anyhow!("--{} is required", name.replace('_', "-")))
}

/// An optional string argument, trimmed; blank counts as absent.
pub(crate) fn optional<'a>(m: &'a clap::ArgMatches, name: &str) -> Option<&'a str> {
    m.get_one::<String>(name)
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
}

pub(crate) fn required_id(m: &clap::ArgMatches) -> Result<i64> {
    m.get_one::<i64>("id")
        .copied()
        .ok_or_else(|| anyhow!("--id is required"))
}

pub(crate) fn optional_currency(m: &clap::ArgMatches, name: &str) -> Result<Option<Currency>> {
    Ok(optional(m, name).map(str::parse::<Currency>).transpose()?)
}

/// The acting user from `--user` or the environment.
pub fn owner(conn: &Connection, m: &clap::ArgMatches) -> Result<OwnerId> {
    let email = optional(m, "user")
        .with_context(|| format!("Pass --user <EMAIL> or set {}", USER_ENV))?;
    find_user(conn, email).with_context(|| format!("Unknown user '{}'", email))
}

pub(crate) fn converter(conn: &Connection) -> Result<CurrencyConverter> {
    let cfg = FxConfig::load(conn)?;
    Ok(CurrencyConverter::from_config(&cfg))
}
