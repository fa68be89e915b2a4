// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::commands::{owner, required};
use crate::models::OwnerId;
use crate::services::transactions::{TransactionFilter, list_transactions};
use anyhow::{Result, bail};
use rusqlite::Connection;
use serde_json::json;
use std::path::Path;

pub fn handle(conn: &Connection, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("transactions", sub)) => {
            let who = owner(conn, sub)?;
            let out = required(sub, "out")?;
            let n = export_transactions(conn, who, required(sub, "format")?, Path::new(out))?;
            println!("Exported {} transactions to {}", n, out);
            Ok(())
        }
        _ => Ok(()),
    }
}

/// Writes all of `who`'s transactions, oldest first, as `csv` or `json`.
pub fn export_transactions(
    conn: &Connection,
    who: OwnerId,
    format: &str,
    out: &Path,
) -> Result<usize> {
    let fmt = format.to_lowercase();
    if fmt != "csv" && fmt != "json" {
        bail!("Unknown format: {} (use csv|json)", format);
    }
    let mut rows = list_transactions(conn, who, &TransactionFilter::default())?;
    rows.reverse();

    if fmt == "csv" {
        let mut wtr = csv::Writer::from_path(out)?;
        wtr.write_record([
            "date",
            "table",
            "category",
            "subcategory",
            "amount",
            "currency",
            "description",
        ])?;
        for t in &rows {
            let (main, sub) = match &t.category {
                Some(c) => match &c.parent {
                    Some(p) => (p.name.clone(), c.name.clone()),
                    None => (c.name.clone(), String::new()),
                },
                None => (String::new(), String::new()),
            };
            wtr.write_record([
                t.date.to_string(),
                t.ledger_title.clone(),
                main,
                sub,
                t.amount.to_string(),
                t.currency.to_string(),
                t.description.clone(),
            ])?;
        }
        wtr.flush()?;
    } else {
        let items: Vec<_> = rows
            .iter()
            .map(|t| {
                json!({
                    "date": t.date,
                    "table": t.ledger_title,
                    "category": t.category.as_ref().map(|c| c.label()),
                    "amount": t.amount,
                    "currency": t.currency,
                    "description": t.description,
                })
            })
            .collect();
        std::fs::write(out, serde_json::to_string_pretty(&items)?)?;
    }
    tracing::info!(count = rows.len(), path = %out.display(), "transactions exported");
    Ok(rows.len())
}
