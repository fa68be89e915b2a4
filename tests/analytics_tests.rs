// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use chrono::NaiveDate;
use kopiyka::db::open_in_memory;
use kopiyka::models::{Currency, OwnerId};
use kopiyka::services::analytics::{PALETTE, Period, build_report};
use kopiyka::services::categories::{find_main_category, find_subcategory};
use kopiyka::services::dashboard::{RECENT_COUNT, dashboard};
use kopiyka::services::fx::RateTable;
use kopiyka::services::ledgers::create_ledger;
use kopiyka::services::seed::seed_default_categories;
use kopiyka::services::transactions::{
    NewTransaction, TransactionFilter, convert_listing, create_transaction, list_transactions,
};
use kopiyka::services::users::create_user;
use rusqlite::Connection;
use rust_decimal::Decimal;
use std::str::FromStr;

fn d(s: &str) -> Decimal {
    Decimal::from_str(s).unwrap()
}

fn day(s: &str) -> NaiveDate {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
}

fn record(
    conn: &Connection,
    who: OwnerId,
    ledger: i64,
    amount: &str,
    ccy: Currency,
    date: &str,
    cat: Option<i64>,
) {
    let mut tx = NewTransaction::new(ledger, d(amount));
    tx.currency = ccy;
    tx.date = day(date);
    tx.category_id = cat;
    create_transaction(conn, who, &tx).unwrap();
}

/// Ledger "Квітень": 100 UAH of fuel and 50 USD with no category.
fn april() -> (Connection, OwnerId) {
    let conn = open_in_memory().unwrap();
    seed_default_categories(&conn).unwrap();
    let who = create_user(&conn, "u@example.com").unwrap().id;
    let ledger = create_ledger(&conn, who, "Квітень", None).unwrap().id;
    let transport = find_main_category(&conn, "Транспорт").unwrap();
    let fuel = find_subcategory(&conn, "Пальне", Some(&transport)).unwrap();
    record(&conn, who, ledger, "100", Currency::Uah, "2025-04-10", Some(fuel.id));
    record(&conn, who, ledger, "50", Currency::Usd, "2025-04-12", None);
    (conn, who)
}

#[test]
fn april_scenario() {
    let (conn, who) = april();
    let rows = list_transactions(&conn, who, &TransactionFilter::default()).unwrap();
    let rates = RateTable::from_pairs([("USD", d("1")), ("UAH", d("0.024"))]);
    let r = build_report(&rows, Period::All, day("2025-04-30"), Currency::Uah, Some(&rates));

    assert_eq!(r.total_count, 2);
    assert_eq!(r.category_stats.len(), 1);
    let transport = &r.category_stats[0];
    assert_eq!(transport.name, "Транспорт");
    assert_eq!(transport.total, d("100"));
    assert_eq!(transport.count, 1);
    assert_eq!(transport.color, PALETTE[0]);

    let by_ccy: Vec<(Currency, Decimal)> =
        r.currency_stats.iter().map(|b| (b.key, b.total)).collect();
    assert_eq!(by_ccy, [(Currency::Uah, d("100")), (Currency::Usd, d("50"))]);

    // 1 USD = 0.024 UAH in this table
    assert_eq!(r.total_amount, d("101.20"));
    assert_eq!(r.uncategorized_total, d("1.20"));
    assert_eq!(r.max_amount, d("100"));
    assert_eq!(r.monthly_stats.len(), 1);
    assert_eq!(r.monthly_stats[0].key, "2025-04");
    assert_eq!(r.ledger_stats[0].title, "Квітень");
}

#[test]
fn unavailable_rates_count_raw_amounts() {
    let (conn, who) = april();
    let rows = list_transactions(&conn, who, &TransactionFilter::default()).unwrap();
    let r = build_report(&rows, Period::All, day("2025-04-30"), Currency::Uah, None);
    assert_eq!(r.total_amount, d("150"));
    assert_eq!(r.average_amount, d("75"));
}

#[test]
fn period_window() {
    let (conn, who) = april();
    let rows = list_transactions(&conn, who, &TransactionFilter::default()).unwrap();
    // 2025-04-12 is the only date on or after 2025-04-11
    let r = build_report(&rows, Period::Days(10), day("2025-04-21"), Currency::Usd, None);
    assert_eq!(r.total_count, 1);
    assert_eq!(r.total_amount, d("50"));
    assert!(r.category_stats.is_empty());

    let empty = build_report(&[], "30".parse().unwrap(), day("2025-04-21"), Currency::Usd, None);
    assert_eq!(empty.total_count, 0);
    assert_eq!(empty.average_amount, Decimal::ZERO);
    assert!("0".parse::<Period>().is_err());
    assert!("week".parse::<Period>().is_err());
    assert_eq!("ALL".parse::<Period>().unwrap(), Period::All);
}

#[test]
fn categories_ranked_with_percentages() {
    let conn = open_in_memory().unwrap();
    seed_default_categories(&conn).unwrap();
    let who = create_user(&conn, "u@example.com").unwrap().id;
    let a = create_ledger(&conn, who, "Травень", None).unwrap().id;
    let b = create_ledger(&conn, who, "Червень", None).unwrap().id;
    let food = find_main_category(&conn, "Продукти").unwrap();
    let market = find_subcategory(&conn, "Ринок", Some(&food)).unwrap();
    let fun = find_main_category(&conn, "Розваги").unwrap();
    record(&conn, who, a, "30", Currency::Uah, "2025-05-01", Some(food.id));
    record(&conn, who, a, "45", Currency::Uah, "2025-05-02", Some(market.id));
    record(&conn, who, b, "25", Currency::Uah, "2025-06-01", Some(fun.id));

    let rows = list_transactions(&conn, who, &TransactionFilter::default()).unwrap();
    let r = build_report(&rows, Period::All, day("2025-06-30"), Currency::Uah, None);
    let names: Vec<&str> = r.category_stats.iter().map(|c| c.name.as_str()).collect();
    assert_eq!(names, ["Продукти", "Розваги"]);
    assert_eq!(r.category_stats[0].count, 2);
    assert_eq!(r.category_stats[0].average, d("37.5"));
    assert_eq!(r.category_stats[0].percentage, d("75"));
    assert_eq!(r.category_stats[1].percentage, d("25"));
    assert_eq!(r.category_stats[1].color, PALETTE[1]);

    let months: Vec<&str> = r.monthly_stats.iter().map(|b| b.key.as_str()).collect();
    assert_eq!(months, ["2025-05", "2025-06"]);
    assert_eq!(r.chart.monthly.values, [d("75"), d("25")]);
    assert_eq!(r.ledger_stats[0].title, "Травень");
    assert_eq!(r.chart.ledgers.labels, ["Травень", "Червень"]);
}

#[test]
fn dashboard_skips_unconvertible_amounts() {
    let (conn, who) = april();
    let d0 = dashboard(&conn, who, Currency::Uah, None).unwrap();
    assert_eq!(d0.total_expenses, d("100"));
    assert_eq!(d0.skipped, 1);
    assert_eq!(d0.ledgers.len(), 1);
    assert!(d0.recent_transactions.len() <= RECENT_COUNT);

    let rates = RateTable::from_pairs([("UAH", d("40"))]);
    let d1 = dashboard(&conn, who, Currency::Uah, Some(&rates)).unwrap();
    assert_eq!(d1.total_expenses, d("2100"));
    assert_eq!(d1.skipped, 0);
}

#[test]
fn converted_listing_falls_back_to_original() {
    let (conn, who) = april();
    let rows = list_transactions(&conn, who, &TransactionFilter::default()).unwrap();
    let none = convert_listing(&rows, Currency::Usd, None);
    assert_eq!(none.total_converted, d("150"));

    let rates = RateTable::from_pairs([("UAH", d("40"))]);
    let listing = convert_listing(&rows, Currency::Usd, Some(&rates));
    assert_eq!(listing.items.len(), 2);
    assert_eq!(listing.total_converted, d("52.50"));
    assert!(listing.items.iter().all(|i| i.target_currency == Currency::Usd));
}
