// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::commands::{optional, owner, required, required_id};
use crate::services::ledgers::{create_ledger, delete_ledger, list_ledgers, update_ledger};
use crate::utils::{maybe_print_json, pretty_table};
use anyhow::Result;
use rusqlite::Connection;

pub fn handle(conn: &Connection, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("add", sub)) => {
            let who = owner(conn, sub)?;
            let l = create_ledger(conn, who, required(sub, "title")?, optional(sub, "color"))?;
            println!("Added table '{}' (id {}, {})", l.title, l.id, l.color);
        }
        Some(("list", sub)) => {
            let who = owner(conn, sub)?;
            let ledgers = list_ledgers(conn, who)?;
            if !maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &ledgers)? {
                let rows = ledgers
                    .into_iter()
                    .map(|l| {
                        vec![
                            l.id.to_string(),
                            l.title,
                            l.color,
                            l.created_at.format("%Y-%m-%d %H:%M").to_string(),
                        ]
                    })
                    .collect();
                println!("{}", pretty_table(&["ID", "Title", "Color", "Created"], rows));
            }
        }
        Some(("edit", sub)) => {
            let who = owner(conn, sub)?;
            let l = update_ledger(
                conn,
                who,
                required_id(sub)?,
                optional(sub, "title"),
                optional(sub, "color"),
            )?;
            println!("Updated table '{}' ({})", l.title, l.color);
        }
        Some(("rm", sub)) => {
            let who = owner(conn, sub)?;
            let id = required_id(sub)?;
            delete_ledger(conn, who, id)?;
            println!("Removed table {} and its transactions", id);
        }
        _ => {}
    }
    Ok(())
}
