// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::commands::{converter, owner};
use crate::config::reporting_currency;
use crate::services::dashboard::dashboard;
use crate::utils::{fmt_money, maybe_print_json, pretty_table};
use anyhow::Result;
use rusqlite::Connection;

pub fn handle(conn: &Connection, m: &clap::ArgMatches) -> Result<()> {
    let who = owner(conn, m)?;
    let currency = reporting_currency(conn)?;
    let rates = converter(conn)?.get_rates();
    let d = dashboard(conn, who, currency, rates.as_deref())?;
    if maybe_print_json(m.get_flag("json"), m.get_flag("jsonl"), &d)? {
        return Ok(());
    }

    let recent = d
        .recent_transactions
        .iter()
        .map(|t| {
            vec![
                t.date.to_string(),
                t.ledger_title.clone(),
                t.category.as_ref().map(|c| c.label()).unwrap_or_default(),
                fmt_money(&t.amount, t.currency.code()),
            ]
        })
        .collect();
    println!(
        "{}",
        pretty_table(&["Date", "Table", "Category", "Amount"], recent)
    );
    let tables = d
        .ledgers
        .iter()
        .map(|l| vec![l.id.to_string(), l.title.clone(), l.color.clone()])
        .collect();
    println!("{}", pretty_table(&["ID", "Table", "Color"], tables));
    println!(
        "Total expenses: {}",
        fmt_money(&d.total_expenses, d.currency.code())
    );
    if d.skipped > 0 {
        println!(
            "({} transaction(s) left out: no exchange rate)",
            d.skipped
        );
    }
    Ok(())
}
