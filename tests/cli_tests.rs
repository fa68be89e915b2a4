// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use kopiyka::config::reporting_currency;
use kopiyka::db::open_in_memory;
use kopiyka::models::Currency;
use kopiyka::services::categories::{find_main_category, find_subcategory};
use kopiyka::services::ledgers::list_ledgers;
use kopiyka::services::transactions::{TransactionFilter, list_transactions};
use kopiyka::services::users::find_user;
use kopiyka::{cli, commands};
use rusqlite::Connection;

fn run(conn: &Connection, args: &[&str]) -> anyhow::Result<()> {
    let mut argv = vec!["kopiyka"];
    argv.extend_from_slice(args);
    let matches = cli::build_cli().try_get_matches_from(argv)?;
    match matches.subcommand() {
        Some(("user", sub)) => commands::users::handle(conn, sub),
        Some(("table", sub)) => commands::tables::handle(conn, sub),
        Some(("category", sub)) => commands::categories::handle(conn, sub),
        Some(("tx", sub)) => commands::transactions::handle(conn, sub),
        Some(("fx", sub)) => commands::fx::handle(conn, sub),
        Some(("analytics", sub)) => commands::analytics::handle(conn, sub),
        other => panic!("unexpected command {other:?}"),
    }
}

#[test]
fn record_through_the_cli() {
    let conn = open_in_memory().unwrap();
    run(&conn, &["user", "add", "--email", "olena@example.com"]).unwrap();
    run(&conn, &["category", "seed"]).unwrap();
    run(
        &conn,
        &["table", "add", "--title", "Квітень", "--user", "olena@example.com"],
    )
    .unwrap();
    let who = find_user(&conn, "olena@example.com").unwrap();
    let ledger = list_ledgers(&conn, who).unwrap()[0].id.to_string();

    run(
        &conn,
        &[
            "tx", "add", "--user", "olena@example.com", "--table", &ledger, "--amount", "100",
            "--date", "2025-04-02", "--category", "Транспорт", "--subcategory", "Пальне",
        ],
    )
    .unwrap();
    // unknown names are created on the fly
    run(
        &conn,
        &[
            "tx", "add", "--user", "olena@example.com", "--table", &ledger, "--amount", "7.5",
            "--currency", "eur", "--category", "Тварини", "--subcategory", "Корм",
        ],
    )
    .unwrap();

    let rows = list_transactions(&conn, who, &TransactionFilter::default()).unwrap();
    assert_eq!(rows.len(), 2);
    let fuel = find_subcategory(&conn, "Пальне", None).unwrap();
    assert!(rows.iter().any(|t| t.category.as_ref().map(|c| c.id) == Some(fuel.id)));
    let pets = find_main_category(&conn, "Тварини").unwrap();
    assert!(find_subcategory(&conn, "Корм", Some(&pets)).is_ok());
    assert!(rows.iter().any(|t| t.currency == Currency::Eur));

    run(
        &conn,
        &["analytics", "--user", "olena@example.com", "--period", "all", "--json"],
    )
    .unwrap();
    run(
        &conn,
        &["analytics", "--user", "olena@example.com", "--period", "100000000", "--json"],
    )
    .unwrap();
}

#[test]
fn acting_user_is_required() {
    let conn = open_in_memory().unwrap();
    assert!(run(&conn, &["table", "list", "--user", ""]).is_err());
    assert!(run(&conn, &["table", "list", "--user", "nobody@example.com"]).is_err());
}

#[test]
fn reporting_currency_setting() {
    let conn = open_in_memory().unwrap();
    run(&conn, &["fx", "set-reporting", "--currency", "eur"]).unwrap();
    assert_eq!(reporting_currency(&conn).unwrap(), Currency::Eur);
    assert!(run(&conn, &["fx", "set-reporting", "--currency", "GBP"]).is_err());
}

#[test]
fn bad_input_is_rejected() {
    let conn = open_in_memory().unwrap();
    run(&conn, &["user", "add", "--email", "a@example.com"]).unwrap();
    assert!(run(&conn, &["user", "add", "--email", "A@example.com"]).is_err());
    assert!(
        run(
            &conn,
            &["table", "add", "--title", "X", "--color", "blue", "--user", "a@example.com"],
        )
        .is_err()
    );
    assert!(run(&conn, &["analytics", "--user", "a@example.com", "--period", "0"]).is_err());
    // --subcategory needs --category on tx add
    assert!(
        run(
            &conn,
            &["tx", "add", "--table", "1", "--amount", "1", "--subcategory", "Пальне"],
        )
        .is_err()
    );
}
