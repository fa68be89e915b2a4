// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Owner-scoped transaction storage and filtered listing.
//!
//! A transaction has no owner column; ownership is its ledger's. Every
//! statement here joins `ledgers` and binds the owner id.

use std::collections::BTreeMap;

use chrono::{NaiveDate, Utc};
use rusqlite::types::Type;
use rusqlite::{Connection, Row, ToSql, params, params_from_iter};
use rust_decimal::Decimal;
use serde::Serialize;

use crate::error::{Error, Result, not_found_on_empty};
use crate::models::{CategoryRef, Currency, OwnerId, ParentRef, Transaction, TransactionRecord};
use crate::services::categories::get_category;
use crate::services::fx::RateTable;
use crate::services::ledgers::get_ledger;

/// Field values for creating or replacing a transaction.
#[derive(Debug, Clone)]
pub struct NewTransaction {
    pub ledger_id: i64,
    pub amount: Decimal,
    pub currency: Currency,
    pub date: NaiveDate,
    pub category_id: Option<i64>,
    pub description: String,
}

impl NewTransaction {
    /// UAH, dated today, no category.
    pub fn new(ledger_id: i64, amount: Decimal) -> Self {
        Self {
            ledger_id,
            amount,
            currency: Currency::default(),
            date: chrono::Local::now().date_naive(),
            category_id: None,
            description: String::new(),
        }
    }
}

/// Listing filters. All optional, AND-combined.
#[derive(Debug, Clone, Default)]
pub struct TransactionFilter {
    /// Case-insensitive substring of the ledger title.
    pub search: Option<String>,
    pub date_from: Option<NaiveDate>,
    pub date_to: Option<NaiveDate>,
    /// Matches the category itself and its subcategories.
    pub category: Option<i64>,
    /// Exact match; wins over `category`.
    pub subcategory: Option<i64>,
    pub currency: Option<Currency>,
    pub limit: Option<usize>,
}

fn decimal_from_text(r: &Row<'_>, idx: usize) -> rusqlite::Result<Decimal> {
    let s: String = r.get(idx)?;
    s.parse::<Decimal>()
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}

fn validate_amount(amount: Decimal) -> Result<Decimal> {
    if amount.normalize().scale() > 2 {
        return Err(Error::validation(
            "amount",
            format!("{} has more than two decimal places", amount),
        ));
    }
    // 10 digits in total, 2 of them after the point
    let max = Decimal::new(9_999_999_999, 2);
    if amount.abs() > max {
        return Err(Error::validation(
            "amount",
            format!("{} has more than 8 digits before the decimal point", amount),
        ));
    }
    Ok(amount.round_dp(2))
}

fn validate(conn: &Connection, owner: OwnerId, tx: &NewTransaction) -> Result<Decimal> {
    let amount = validate_amount(tx.amount)?;
    get_ledger(conn, owner, tx.ledger_id)?;
    if let Some(cid) = tx.category_id {
        get_category(conn, cid).map_err(|e| {
            if e.is_not_found() {
                Error::validation("category", format!("category {} does not exist", cid))
            } else {
                e
            }
        })?;
    }
    Ok(amount)
}

pub fn create_transaction(
    conn: &Connection,
    owner: OwnerId,
    tx: &NewTransaction,
) -> Result<Transaction> {
    let amount = validate(conn, owner, tx)?;
    let now = Utc::now();
    conn.execute(
        "INSERT INTO transactions(ledger_id, category_id, amount, currency, date, description, created_at, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?7)",
        params![
            tx.ledger_id,
            tx.category_id,
            amount.to_string(),
            tx.currency,
            tx.date,
            tx.description,
            now
        ],
    )?;
    let id = conn.last_insert_rowid();
    tracing::debug!(id, ledger = tx.ledger_id, "transaction recorded");
    Ok(Transaction {
        id,
        ledger_id: tx.ledger_id,
        category_id: tx.category_id,
        amount,
        currency: tx.currency,
        date: tx.date,
        description: tx.description.clone(),
        created_at: now,
        updated_at: now,
    })
}

pub fn get_transaction(conn: &Connection, owner: OwnerId, id: i64) -> Result<Transaction> {
    conn.query_row(
        "SELECT t.id, t.ledger_id, t.category_id, t.amount, t.currency, t.date, t.description, t.created_at, t.updated_at
         FROM transactions t JOIN ledgers l ON t.ledger_id=l.id
         WHERE t.id=?1 AND l.user_id=?2",
        params![id, owner.0],
        |r| {
            Ok(Transaction {
                id: r.get(0)?,
                ledger_id: r.get(1)?,
                category_id: r.get(2)?,
                amount: decimal_from_text(r, 3)?,
                currency: r.get(4)?,
                date: r.get(5)?,
                description: r.get(6)?,
                created_at: r.get(7)?,
                updated_at: r.get(8)?,
            })
        },
    )
    .map_err(not_found_on_empty)
}

/// Replaces every field. Moving to another ledger requires owning both.
pub fn update_transaction(
    conn: &Connection,
    owner: OwnerId,
    id: i64,
    tx: &NewTransaction,
) -> Result<Transaction> {
    let current = get_transaction(conn, owner, id)?;
    let amount = validate(conn, owner, tx)?;
    let now = Utc::now();
    conn.execute(
        "UPDATE transactions SET ledger_id=?1, category_id=?2, amount=?3, currency=?4, date=?5, description=?6, updated_at=?7
         WHERE id=?8",
        params![
            tx.ledger_id,
            tx.category_id,
            amount.to_string(),
            tx.currency,
            tx.date,
            tx.description,
            now,
            id
        ],
    )?;
    Ok(Transaction {
        id,
        ledger_id: tx.ledger_id,
        category_id: tx.category_id,
        amount,
        currency: tx.currency,
        date: tx.date,
        description: tx.description.clone(),
        created_at: current.created_at,
        updated_at: now,
    })
}

pub fn delete_transaction(conn: &Connection, owner: OwnerId, id: i64) -> Result<()> {
    let n = conn.execute(
        "DELETE FROM transactions
         WHERE id=?1 AND ledger_id IN (SELECT id FROM ledgers WHERE user_id=?2)",
        params![id, owner.0],
    )?;
    if n == 0 {
        return Err(Error::NotFound);
    }
    Ok(())
}

fn map_record(r: &Row<'_>) -> rusqlite::Result<TransactionRecord> {
    let category = match r.get::<_, Option<i64>>(3)? {
        Some(id) => {
            let parent = match r.get::<_, Option<i64>>(5)? {
                Some(pid) => Some(ParentRef {
                    id: pid,
                    name: r.get(6)?,
                }),
                None => None,
            };
            Some(CategoryRef {
                id,
                name: r.get(4)?,
                parent,
            })
        }
        None => None,
    };
    Ok(TransactionRecord {
        id: r.get(0)?,
        ledger_id: r.get(1)?,
        ledger_title: r.get(2)?,
        category,
        amount: decimal_from_text(r, 7)?,
        currency: r.get(8)?,
        date: r.get(9)?,
        description: r.get(10)?,
        created_at: r.get(11)?,
    })
}

fn known_category(conn: &Connection, field: &'static str, id: i64) -> Result<()> {
    get_category(conn, id).map(|_| ()).map_err(|e| {
        if e.is_not_found() {
            Error::validation(field, format!("category {} does not exist", id))
        } else {
            e
        }
    })
}

/// The owner's transactions matching `filter`, newest first.
pub fn list_transactions(
    conn: &Connection,
    owner: OwnerId,
    filter: &TransactionFilter,
) -> Result<Vec<TransactionRecord>> {
    let mut sql = String::from(
        "SELECT t.id, t.ledger_id, l.title, c.id, c.name, p.id, p.name,
                t.amount, t.currency, t.date, t.description, t.created_at
         FROM transactions t
         JOIN ledgers l ON t.ledger_id=l.id
         LEFT JOIN categories c ON t.category_id=c.id
         LEFT JOIN categories p ON c.parent_id=p.id
         WHERE l.user_id=?",
    );
    let mut args: Vec<Box<dyn ToSql>> = vec![Box::new(owner.0)];

    if let Some(from) = filter.date_from {
        sql.push_str(" AND t.date>=?");
        args.push(Box::new(from));
    }
    if let Some(to) = filter.date_to {
        sql.push_str(" AND t.date<=?");
        args.push(Box::new(to));
    }
    if let Some(sub) = filter.subcategory {
        known_category(conn, "subcategory", sub)?;
        sql.push_str(" AND t.category_id=?");
        args.push(Box::new(sub));
    } else if let Some(cat) = filter.category {
        known_category(conn, "category", cat)?;
        sql.push_str(" AND (c.id=? OR c.parent_id=?)");
        args.push(Box::new(cat));
        args.push(Box::new(cat));
    }
    if let Some(ccy) = filter.currency {
        sql.push_str(" AND t.currency=?");
        args.push(Box::new(ccy));
    }
    sql.push_str(" ORDER BY t.date DESC, t.created_at DESC, t.id DESC");

    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map(params_from_iter(args.iter()), map_record)?;

    // SQLite's LIKE/lower() only fold ASCII; titles are mostly Cyrillic.
    let needle = filter
        .search
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_lowercase);
    let mut out = Vec::new();
    for row in rows {
        let rec = row?;
        if let Some(n) = &needle {
            if !rec.ledger_title.to_lowercase().contains(n.as_str()) {
                continue;
            }
        }
        out.push(rec);
        if filter.limit.is_some_and(|l| out.len() >= l) {
            break;
        }
    }
    tracing::debug!(owner = owner.0, count = out.len(), "transactions listed");
    Ok(out)
}

/// Sum of original amounts per currency.
pub fn total_by_currency(transactions: &[TransactionRecord]) -> BTreeMap<Currency, Decimal> {
    let mut totals = BTreeMap::new();
    for t in transactions {
        *totals.entry(t.currency).or_insert(Decimal::ZERO) += t.amount;
    }
    totals
}

#[derive(Debug, Clone, Serialize)]
pub struct ConvertedAmount {
    pub id: i64,
    pub original_amount: Decimal,
    pub original_currency: Currency,
    pub converted_amount: Decimal,
    pub target_currency: Currency,
}

#[derive(Debug, Clone, Serialize)]
pub struct ConvertedListing {
    pub target_currency: Currency,
    pub items: Vec<ConvertedAmount>,
    pub total_converted: Decimal,
}

/// Converts each listed amount to `target`. Amounts that cannot be
/// converted are carried over as-is.
pub fn convert_listing(
    transactions: &[TransactionRecord],
    target: Currency,
    rates: Option<&RateTable>,
) -> ConvertedListing {
    let items: Vec<ConvertedAmount> = transactions
        .iter()
        .map(|t| {
            let converted = rates
                .and_then(|r| r.convert(t.amount, t.currency, target))
                .unwrap_or(t.amount);
            ConvertedAmount {
                id: t.id,
                original_amount: t.amount,
                original_currency: t.currency,
                converted_amount: converted.round_dp(2),
                target_currency: target,
            }
        })
        .collect();
    let total_converted = items
        .iter()
        .map(|i| i.converted_amount)
        .sum::<Decimal>()
        .round_dp(2);
    ConvertedListing {
        target_currency: target,
        items,
        total_converted,
    }
}
