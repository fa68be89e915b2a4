// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use rusqlite::Connection;
use rust_decimal::Decimal;
use serde::Serialize;

use crate::error::Result;
use crate::models::{Currency, Ledger, OwnerId, TransactionRecord};
use crate::services::fx::RateTable;
use crate::services::ledgers::list_ledgers;
use crate::services::transactions::{TransactionFilter, list_transactions};

pub const RECENT_COUNT: usize = 5;

#[derive(Debug, Clone, Serialize)]
pub struct Dashboard {
    pub recent_transactions: Vec<TransactionRecord>,
    pub ledgers: Vec<Ledger>,
    pub currency: Currency,
    pub total_expenses: Decimal,
    /// Transactions left out of the total because they could not be converted.
    pub skipped: usize,
}

/// Overview for `owner`. Unlike analytics, amounts that cannot be
/// converted are left out of the total rather than counted raw.
pub fn dashboard(
    conn: &Connection,
    owner: OwnerId,
    currency: Currency,
    rates: Option<&RateTable>,
) -> Result<Dashboard> {
    let all = list_transactions(conn, owner, &TransactionFilter::default())?;
    let mut total = Decimal::ZERO;
    let mut skipped = 0;
    for t in &all {
        let converted = if t.currency == currency {
            Some(t.amount)
        } else {
            rates.and_then(|r| r.convert(t.amount, t.currency, currency))
        };
        match converted {
            Some(a) => total += a,
            None => skipped += 1,
        }
    }
    Ok(Dashboard {
        recent_transactions: all.into_iter().take(RECENT_COUNT).collect(),
        ledgers: list_ledgers(conn, owner)?,
        currency,
        total_expenses: total.round_dp(2),
        skipped,
    })
}
