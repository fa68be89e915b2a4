// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::commands::required;
use crate::services::users::{create_user, list_users};
use crate::utils::pretty_table;
use anyhow::Result;
use rusqlite::Connection;

pub fn handle(conn: &Connection, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("add", sub)) => {
            let user = create_user(conn, required(sub, "email")?)?;
            println!("Added user '{}'", user.email);
        }
        Some(("list", _)) => {
            let data = list_users(conn)?
                .into_iter()
                .map(|u| vec![u.email, u.created_at.format("%Y-%m-%d %H:%M").to_string()])
                .collect();
            println!("{}", pretty_table(&["E-mail", "Created"], data));
        }
        _ => {}
    }
    Ok(())
}
