// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::commands::{optional, required, required_id};
use crate::services::categories::{
    add_category_from_form, category_overview, delete_category, find_main_category, get_category,
    get_full_path, list_children, promote_category, rename_category,
};
use crate::services::seed::seed_default_categories;
use crate::utils::{maybe_print_json, pretty_table};
use anyhow::Result;
use rusqlite::Connection;

pub fn handle(conn: &Connection, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("add", sub)) => {
            let parent_id = match optional(sub, "parent") {
                Some(p) => Some(find_main_category(conn, p)?.id),
                None => None,
            };
            let c = add_category_from_form(
                conn,
                required(sub, "name")?,
                parent_id,
                optional(sub, "new_parent"),
            )?;
            println!("Added category '{}'", get_full_path(conn, &c)?);
        }
        Some(("list", sub)) => {
            let overview = category_overview(conn)?;
            if !maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &overview)? {
                let rows = overview
                    .into_iter()
                    .map(|c| {
                        let (main, child) = match c.parent {
                            Some(p) => (p, c.name),
                            None => (c.name, "—".to_string()),
                        };
                        vec![
                            c.id.to_string(),
                            main,
                            child,
                            c.subcategories.to_string(),
                            c.transactions.to_string(),
                        ]
                    })
                    .collect();
                println!(
                    "{}",
                    pretty_table(
                        &["ID", "Category", "Subcategory", "Subcategories", "Transactions"],
                        rows
                    )
                );
            }
        }
        Some(("children", sub)) => {
            let parent = find_main_category(conn, required(sub, "name")?)?;
            let rows = list_children(conn, &parent)?
                .into_iter()
                .map(|c| vec![c.id.to_string(), c.name])
                .collect();
            println!("{}", pretty_table(&["ID", &parent.name], rows));
        }
        Some(("path", sub)) => {
            let c = get_category(conn, required_id(sub)?)?;
            println!("{}", get_full_path(conn, &c)?);
        }
        Some(("rename", sub)) => {
            let c = rename_category(conn, required_id(sub)?, required(sub, "name")?)?;
            println!("Renamed to '{}'", get_full_path(conn, &c)?);
        }
        Some(("promote", sub)) => {
            let c = promote_category(conn, required_id(sub)?)?;
            println!("'{}' is now a main category", c.name);
        }
        Some(("rm", sub)) => {
            let id = required_id(sub)?;
            delete_category(conn, id)?;
            println!("Removed category {}", id);
        }
        Some(("seed", _)) => {
            let added = seed_default_categories(conn)?;
            println!("Seeded default categories ({} added)", added);
        }
        _ => {}
    }
    Ok(())
}
