// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use chrono::Utc;
use rusqlite::{Connection, params};

use crate::error::{Error, Result, is_unique_violation, not_found_on_empty};
use crate::models::{OwnerId, User};

fn normalize_email(raw: &str) -> Result<String> {
    let email = raw.trim().to_lowercase();
    match email.split_once('@') {
        Some((local, domain)) if !local.is_empty() && !domain.is_empty() => Ok(email),
        _ => Err(Error::validation("email", format!("'{}' is not an e-mail address", raw))),
    }
}

pub fn create_user(conn: &Connection, email: &str) -> Result<User> {
    let email = normalize_email(email)?;
    let created_at = Utc::now();
    conn.execute(
        "INSERT INTO users(email, created_at) VALUES (?1, ?2)",
        params![email, created_at],
    )
    .map_err(|e| {
        if is_unique_violation(&e) {
            Error::validation("email", format!("a user with e-mail '{}' already exists", email))
        } else {
            e.into()
        }
    })?;
    let id = OwnerId(conn.last_insert_rowid());
    tracing::info!(user = id.0, "user created");
    Ok(User {
        id,
        email,
        created_at,
    })
}

pub fn find_user(conn: &Connection, email: &str) -> Result<OwnerId> {
    let email = normalize_email(email)?;
    conn.query_row(
        "SELECT id FROM users WHERE email=?1",
        params![email],
        |r| r.get(0).map(OwnerId),
    )
    .map_err(not_found_on_empty)
}

pub fn list_users(conn: &Connection) -> Result<Vec<User>> {
    let mut stmt = conn.prepare("SELECT id, email, created_at FROM users ORDER BY email")?;
    let rows = stmt.query_map([], |r| {
        Ok(User {
            id: OwnerId(r.get(0)?),
            email: r.get(1)?,
            created_at: r.get(2)?,
        })
    })?;
    Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
}
