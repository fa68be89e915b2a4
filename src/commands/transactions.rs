// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::commands::{converter, optional, optional_currency, owner, required, required_id};
use crate::models::{Currency, OwnerId, TransactionRecord};
use crate::services::categories::{
    create_or_get_category, find_main_category, find_subcategory, get_category, get_full_path,
};
use crate::services::transactions::{
    ConvertedListing, NewTransaction, TransactionFilter, convert_listing, create_transaction,
    delete_transaction, get_transaction, list_transactions, total_by_currency,
    update_transaction,
};
use crate::utils::{fmt_money, maybe_print_json, parse_date, parse_decimal, pretty_table};
use anyhow::Result;
use rusqlite::Connection;
use rust_decimal::Decimal;
use serde::Serialize;
use std::collections::BTreeMap;

pub fn handle(conn: &Connection, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("add", sub)) => add(conn, sub)?,
        Some(("list", sub)) => list(conn, sub)?,
        Some(("show", sub)) => show(conn, sub)?,
        Some(("edit", sub)) => edit(conn, sub)?,
        Some(("rm", sub)) => {
            let who = owner(conn, sub)?;
            let id = required_id(sub)?;
            delete_transaction(conn, who, id)?;
            println!("Removed transaction {}", id);
        }
        _ => {}
    }
    Ok(())
}

/// `--category` and `--subcategory` as typed on `tx add`/`tx edit`;
/// missing categories are created.
fn category_from_args(conn: &Connection, sub: &clap::ArgMatches) -> Result<Option<i64>> {
    let Some(main) = optional(sub, "category") else {
        return Ok(None);
    };
    let main = create_or_get_category(conn, main, None)?;
    match optional(sub, "subcategory") {
        Some(child) => Ok(Some(create_or_get_category(conn, child, Some(main.id))?.id)),
        None => Ok(Some(main.id)),
    }
}

/// Builds a listing filter from the shared filter flags. Category names
/// must already exist.
pub fn filter_from_args(conn: &Connection, sub: &clap::ArgMatches) -> Result<TransactionFilter> {
    let main = optional(sub, "category")
        .map(|name| find_main_category(conn, name))
        .transpose()?;
    let subcategory = optional(sub, "subcategory")
        .map(|name| find_subcategory(conn, name, main.as_ref()))
        .transpose()?;
    Ok(TransactionFilter {
        search: optional(sub, "search").map(str::to_string),
        date_from: optional(sub, "from").map(parse_date).transpose()?,
        date_to: optional(sub, "to").map(parse_date).transpose()?,
        category: main.map(|c| c.id),
        subcategory: subcategory.map(|c| c.id),
        currency: optional_currency(sub, "currency")?,
        // analytics shares the filter flags but has no --limit
        limit: sub.try_get_one::<usize>("limit").ok().flatten().copied(),
    })
}

fn add(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let who = owner(conn, sub)?;
    let ledger_id = sub
        .get_one::<i64>("table")
        .copied()
        .ok_or_else(|| anyhow::anyhow!("--table is required"))?;
    let mut tx = NewTransaction::new(ledger_id, parse_decimal(required(sub, "amount")?)?);
    if let Some(ccy) = optional_currency(sub, "currency")? {
        tx.currency = ccy;
    }
    if let Some(d) = optional(sub, "date") {
        tx.date = parse_date(d)?;
    }
    tx.category_id = category_from_args(conn, sub)?;
    if let Some(desc) = optional(sub, "description") {
        tx.description = desc.to_string();
    }
    let saved = create_transaction(conn, who, &tx)?;
    println!(
        "Recorded {} on {} (id {})",
        fmt_money(&saved.amount, saved.currency.code()),
        saved.date,
        saved.id
    );
    Ok(())
}

fn edit(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let who = owner(conn, sub)?;
    let id = required_id(sub)?;
    let current = get_transaction(conn, who, id)?;
    let mut tx = NewTransaction {
        ledger_id: current.ledger_id,
        amount: current.amount,
        currency: current.currency,
        date: current.date,
        category_id: current.category_id,
        description: current.description,
    };
    if let Some(l) = sub.get_one::<i64>("table") {
        tx.ledger_id = *l;
    }
    if let Some(a) = optional(sub, "amount") {
        tx.amount = parse_decimal(a)?;
    }
    if let Some(ccy) = optional_currency(sub, "currency")? {
        tx.currency = ccy;
    }
    if let Some(d) = optional(sub, "date") {
        tx.date = parse_date(d)?;
    }
    if let Some(cid) = category_from_args(conn, sub)? {
        tx.category_id = Some(cid);
    }
    if let Some(desc) = sub.get_one::<String>("description") {
        tx.description = desc.trim().to_string();
    }
    let saved = update_transaction(conn, who, id, &tx)?;
    println!(
        "Updated transaction {}: {} on {}",
        saved.id,
        fmt_money(&saved.amount, saved.currency.code()),
        saved.date
    );
    Ok(())
}

fn show(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let who = owner(conn, sub)?;
    let t = get_transaction(conn, who, required_id(sub)?)?;
    if maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &t)? {
        return Ok(());
    }
    let category = match t.category_id {
        Some(cid) => get_full_path(conn, &get_category(conn, cid)?)?,
        None => "—".to_string(),
    };
    let rows = vec![
        vec!["ID".into(), t.id.to_string()],
        vec!["Table".into(), t.ledger_id.to_string()],
        vec!["Date".into(), t.date.to_string()],
        vec!["Amount".into(), fmt_money(&t.amount, t.currency.code())],
        vec!["Category".into(), category],
        vec!["Description".into(), t.description],
        vec![
            "Created".into(),
            t.created_at.format("%Y-%m-%d %H:%M:%S").to_string(),
        ],
        vec![
            "Updated".into(),
            t.updated_at.format("%Y-%m-%d %H:%M:%S").to_string(),
        ],
    ];
    println!("{}", pretty_table(&["Field", "Value"], rows));
    Ok(())
}

#[derive(Serialize)]
struct Listing {
    transactions: Vec<TransactionRecord>,
    totals: BTreeMap<Currency, Decimal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    converted: Option<ConvertedListing>,
}

/// Listing for `who`, with per-currency totals and, when `convert_to` is
/// given, the converted amounts.
pub fn query_listing(
    conn: &Connection,
    who: OwnerId,
    filter: &TransactionFilter,
    convert_to: Option<Currency>,
) -> Result<(Vec<TransactionRecord>, Option<ConvertedListing>)> {
    let records = list_transactions(conn, who, filter)?;
    let converted = match convert_to {
        Some(target) => {
            let rates = converter(conn)?.get_rates();
            Some(convert_listing(&records, target, rates.as_deref()))
        }
        None => None,
    };
    Ok((records, converted))
}

fn list(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let who = owner(conn, sub)?;
    let filter = filter_from_args(conn, sub)?;
    let convert_to = optional_currency(sub, "convert_to")?;
    let (records, converted) = query_listing(conn, who, &filter, convert_to)?;
    let totals = total_by_currency(&records);

    if sub.get_flag("json") || sub.get_flag("jsonl") {
        if sub.get_flag("jsonl") {
            maybe_print_json(false, true, &records)?;
        } else {
            let listing = Listing {
                transactions: records,
                totals,
                converted,
            };
            maybe_print_json(true, false, &listing)?;
        }
        return Ok(());
    }

    let mut headers = vec!["ID", "Date", "Table", "Category", "Amount", "Description"];
    if converted.is_some() {
        headers.push("Converted");
    }
    let rows = records
        .iter()
        .enumerate()
        .map(|(i, t)| {
            let mut row = vec![
                t.id.to_string(),
                t.date.to_string(),
                t.ledger_title.clone(),
                t.category.as_ref().map(|c| c.label()).unwrap_or_default(),
                fmt_money(&t.amount, t.currency.code()),
                t.description.clone(),
            ];
            if let Some(c) = &converted {
                if let Some(item) = c.items.get(i) {
                    row.push(fmt_money(&item.converted_amount, c.target_currency.code()));
                }
            }
            row
        })
        .collect();
    println!("{}", pretty_table(&headers, rows));
    for (ccy, total) in &totals {
        println!("Total {}: {}", ccy, fmt_money(total, ccy.code()));
    }
    if let Some(c) = &converted {
        println!(
            "Total in {}: {}",
            c.target_currency,
            fmt_money(&c.total_converted, c.target_currency.code())
        );
    }
    Ok(())
}
