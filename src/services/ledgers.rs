// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use chrono::Utc;
use once_cell::sync::Lazy;
use regex::Regex;
use rusqlite::{Connection, Row, params};

use crate::error::{Error, Result, not_found_on_empty};
use crate::models::{Ledger, OwnerId};

pub const DEFAULT_COLOR: &str = "#3B82F6";
const TITLE_MAX_CHARS: usize = 100;

static HEX_COLOR: Lazy<Regex> = Lazy::new(|| Regex::new(r"^#[0-9A-Fa-f]{6}$").unwrap());

const SELECT: &str = "SELECT id, user_id, title, color, created_at FROM ledgers";

fn map_row(r: &Row<'_>) -> rusqlite::Result<Ledger> {
    Ok(Ledger {
        id: r.get(0)?,
        owner: OwnerId(r.get(1)?),
        title: r.get(2)?,
        color: r.get(3)?,
        created_at: r.get(4)?,
    })
}

fn clean_title(raw: &str) -> Result<String> {
    let title = raw.trim();
    if title.is_empty() {
        return Err(Error::validation("title", "table title cannot be empty"));
    }
    if title.chars().count() > TITLE_MAX_CHARS {
        return Err(Error::validation(
            "title",
            format!("table title is longer than {} characters", TITLE_MAX_CHARS),
        ));
    }
    Ok(title.to_string())
}

fn clean_color(raw: &str) -> Result<String> {
    let color = raw.trim();
    if !HEX_COLOR.is_match(color) {
        return Err(Error::validation(
            "color",
            format!("'{}' is not a HEX color (#RRGGBB)", color),
        ));
    }
    Ok(color.to_uppercase())
}

pub fn create_ledger(
    conn: &Connection,
    owner: OwnerId,
    title: &str,
    color: Option<&str>,
) -> Result<Ledger> {
    let title = clean_title(title)?;
    let color = clean_color(color.unwrap_or(DEFAULT_COLOR))?;
    let created_at = Utc::now();
    conn.execute(
        "INSERT INTO ledgers(user_id, title, color, created_at) VALUES (?1, ?2, ?3, ?4)",
        params![owner.0, title, color, created_at],
    )?;
    let id = conn.last_insert_rowid();
    tracing::info!(ledger = id, owner = owner.0, "table created");
    Ok(Ledger {
        id,
        owner,
        title,
        color,
        created_at,
    })
}

/// Newest first.
pub fn list_ledgers(conn: &Connection, owner: OwnerId) -> Result<Vec<Ledger>> {
    let mut stmt = conn.prepare(&format!(
        "{SELECT} WHERE user_id=?1 ORDER BY created_at DESC, id DESC"
    ))?;
    let rows = stmt.query_map(params![owner.0], map_row)?;
    Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
}

pub fn get_ledger(conn: &Connection, owner: OwnerId, id: i64) -> Result<Ledger> {
    conn.query_row(
        &format!("{SELECT} WHERE id=?1 AND user_id=?2"),
        params![id, owner.0],
        map_row,
    )
    .map_err(not_found_on_empty)
}

pub fn update_ledger(
    conn: &Connection,
    owner: OwnerId,
    id: i64,
    title: Option<&str>,
    color: Option<&str>,
) -> Result<Ledger> {
    let mut ledger = get_ledger(conn, owner, id)?;
    if let Some(t) = title {
        ledger.title = clean_title(t)?;
    }
    if let Some(c) = color {
        ledger.color = clean_color(c)?;
    }
    conn.execute(
        "UPDATE ledgers SET title=?1, color=?2 WHERE id=?3 AND user_id=?4",
        params![ledger.title, ledger.color, id, owner.0],
    )?;
    Ok(ledger)
}

/// Deletes the table and, through the foreign key, all its transactions.
pub fn delete_ledger(conn: &Connection, owner: OwnerId, id: i64) -> Result<()> {
    let n = conn.execute(
        "DELETE FROM ledgers WHERE id=?1 AND user_id=?2",
        params![id, owner.0],
    )?;
    if n == 0 {
        return Err(Error::NotFound);
    }
    tracing::info!(ledger = id, owner = owner.0, "table deleted");
    Ok(())
}
