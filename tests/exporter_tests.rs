// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use chrono::NaiveDate;
use kopiyka::commands::exporter::export_transactions;
use kopiyka::db::open_in_memory;
use kopiyka::models::Currency;
use kopiyka::services::categories::create_or_get_category;
use kopiyka::services::ledgers::create_ledger;
use kopiyka::services::transactions::{NewTransaction, create_transaction};
use kopiyka::services::users::create_user;
use rust_decimal::Decimal;
use tempfile::tempdir;

#[test]
fn csv_and_json_exports_are_owner_scoped() {
    let conn = open_in_memory().unwrap();
    let alice = create_user(&conn, "alice@example.com").unwrap().id;
    let bob = create_user(&conn, "bob@example.com").unwrap().id;
    let ledger = create_ledger(&conn, alice, "Квітень", None).unwrap().id;
    let other = create_ledger(&conn, bob, "Bob", None).unwrap().id;

    let transport = create_or_get_category(&conn, "Транспорт", None).unwrap();
    let fuel = create_or_get_category(&conn, "Пальне", Some(transport.id)).unwrap();

    let mut tx = NewTransaction::new(ledger, Decimal::new(12050, 2));
    tx.date = NaiveDate::from_ymd_opt(2025, 4, 2).unwrap();
    tx.category_id = Some(fuel.id);
    tx.description = "АЗС, Київ".into();
    create_transaction(&conn, alice, &tx).unwrap();
    let mut tx = NewTransaction::new(ledger, Decimal::new(9, 0));
    tx.currency = Currency::Usd;
    tx.date = NaiveDate::from_ymd_opt(2025, 4, 1).unwrap();
    create_transaction(&conn, alice, &tx).unwrap();
    create_transaction(&conn, bob, &NewTransaction::new(other, Decimal::ONE)).unwrap();

    let dir = tempdir().unwrap();
    let csv_path = dir.path().join("tx.csv");
    assert_eq!(export_transactions(&conn, alice, "csv", &csv_path).unwrap(), 2);
    let mut rdr = csv::Reader::from_path(&csv_path).unwrap();
    let rows: Vec<csv::StringRecord> = rdr.records().map(|r| r.unwrap()).collect();
    assert_eq!(rows.len(), 2);
    // oldest first
    assert_eq!(&rows[0][0], "2025-04-01");
    assert_eq!(&rows[0][5], "USD");
    assert_eq!(&rows[1][2], "Транспорт");
    assert_eq!(&rows[1][3], "Пальне");
    assert_eq!(&rows[1][4], "120.50");
    assert_eq!(&rows[1][6], "АЗС, Київ");

    let json_path = dir.path().join("tx.json");
    assert_eq!(export_transactions(&conn, alice, "JSON", &json_path).unwrap(), 2);
    let v: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&json_path).unwrap()).unwrap();
    assert_eq!(v.as_array().unwrap().len(), 2);
    assert_eq!(v[1]["category"], "Транспорт → Пальне");
    assert_eq!(v[0]["currency"], "USD");

    assert!(export_transactions(&conn, alice, "xml", &dir.path().join("tx.xml")).is_err());
}
