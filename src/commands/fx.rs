// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::commands::{converter, required};
use crate::config::{set_api_key, set_reporting_currency};
use crate::models::Currency;
use crate::services::fx::{BASE_CURRENCY, supported_currencies};
use crate::utils::{fmt_money, pretty_table};
use anyhow::Result;
use rusqlite::Connection;

pub fn handle(conn: &Connection, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("currencies", _)) => {
            let rows = supported_currencies()
                .into_iter()
                .map(|(code, name)| vec![code.to_string(), name.to_string()])
                .collect();
            println!("{}", pretty_table(&["Code", "Name"], rows));
        }
        Some(("rates", _)) => match converter(conn)?.display_rates() {
            Some(rates) => {
                let rows = rates
                    .into_iter()
                    .map(|(c, r)| vec![c.to_string(), r.to_string()])
                    .collect();
                println!(
                    "{}",
                    pretty_table(&["Currency", &format!("per 1 {}", BASE_CURRENCY)], rows)
                );
            }
            None => println!("Exchange rates are unavailable"),
        },
        Some(("convert", sub)) => {
            let amount = required(sub, "amount")?;
            let from = required(sub, "from")?;
            let to = required(sub, "to")?;
            match converter(conn)?.convert_str(amount, from, to) {
                Some(v) => println!(
                    "{} {} = {}",
                    amount,
                    from.to_uppercase(),
                    fmt_money(&v, &to.to_uppercase())
                ),
                None => println!("Cannot convert {} {} to {}", amount, from, to),
            }
        }
        Some(("set-key", sub)) => {
            set_api_key(conn, required(sub, "key")?)?;
            println!("Stored exchange-rate API key");
        }
        Some(("set-reporting", sub)) => {
            let ccy: Currency = required(sub, "currency")?.parse()?;
            set_reporting_currency(conn, ccy)?;
            println!("Reporting currency set to {}", ccy);
        }
        _ => {}
    }
    Ok(())
}
