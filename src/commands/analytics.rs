// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::commands::transactions::filter_from_args;
use crate::commands::{converter, optional_currency, owner, required};
use crate::config::reporting_currency;
use crate::models::{Currency, OwnerId};
use crate::services::analytics::{AnalyticsReport, Period, build_report};
use crate::services::transactions::{TransactionFilter, list_transactions};
use crate::utils::{fmt_money, maybe_print_json, pretty_table};
use anyhow::Result;
use chrono::Local;
use rusqlite::Connection;

/// Report over `who`'s transactions matching `filter`, as of today.
pub fn report(
    conn: &Connection,
    who: OwnerId,
    filter: &TransactionFilter,
    period: Period,
    currency: Currency,
) -> Result<AnalyticsReport> {
    let records = list_transactions(conn, who, filter)?;
    let needs_rates = records.iter().any(|t| t.currency != currency);
    let rates = if needs_rates {
        converter(conn)?.get_rates()
    } else {
        None
    };
    let today = Local::now().date_naive();
    Ok(build_report(&records, period, today, currency, rates.as_deref()))
}

pub fn handle(conn: &Connection, m: &clap::ArgMatches) -> Result<()> {
    let who = owner(conn, m)?;
    let filter = filter_from_args(conn, m)?;
    let period: Period = required(m, "period")?.parse()?;
    let currency = match optional_currency(m, "report_in")? {
        Some(c) => c,
        None => reporting_currency(conn)?,
    };
    let r = report(conn, who, &filter, period, currency)?;
    if maybe_print_json(m.get_flag("json"), m.get_flag("jsonl"), &r)? {
        return Ok(());
    }

    let ccy = r.reporting_currency.code();
    let summary = vec![
        vec!["Period".into(), r.period.to_string()],
        vec!["Transactions".into(), r.total_count.to_string()],
        vec!["Total".into(), fmt_money(&r.total_amount, ccy)],
        vec!["Average".into(), fmt_money(&r.average_amount, ccy)],
        vec!["Largest".into(), fmt_money(&r.max_amount, ccy)],
        vec!["Uncategorized".into(), fmt_money(&r.uncategorized_total, ccy)],
    ];
    println!("{}", pretty_table(&["Summary", ""], summary));

    let cats = r
        .category_stats
        .iter()
        .map(|c| {
            vec![
                c.name.clone(),
                c.count.to_string(),
                fmt_money(&c.total, ccy),
                fmt_money(&c.average, ccy),
                format!("{}%", c.percentage),
            ]
        })
        .collect();
    println!(
        "{}",
        pretty_table(&["Category", "Count", "Total", "Average", "Share"], cats)
    );

    let months = r
        .monthly_stats
        .iter()
        .map(|b| vec![b.key.clone(), fmt_money(&b.total, ccy)])
        .collect();
    println!("{}", pretty_table(&["Month", "Total"], months));

    let by_ccy = r
        .currency_stats
        .iter()
        .map(|b| vec![b.key.to_string(), fmt_money(&b.total, b.key.code())])
        .collect();
    println!("{}", pretty_table(&["Currency", "Original total"], by_ccy));

    let ledgers = r
        .ledger_stats
        .iter()
        .map(|l| vec![l.title.clone(), fmt_money(&l.total, ccy)])
        .collect();
    println!("{}", pretty_table(&["Table", "Total"], ledgers));
    Ok(())
}
