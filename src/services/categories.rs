// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Two-level category hierarchy: main categories and their subcategories.
//!
//! Categories are shared by every user. A `(name, parent)` pair exists at
//! most once, and a parent must itself be a main category.

use rusqlite::{Connection, OptionalExtension, Row, params};
use serde::Serialize;

use crate::error::{Error, Result, is_unique_violation, not_found_on_empty};
use crate::models::Category;

pub const PATH_SEPARATOR: &str = " → ";
const NAME_MAX_CHARS: usize = 100;

const SELECT: &str = "SELECT id, name, parent_id FROM categories";

fn map_row(r: &Row<'_>) -> rusqlite::Result<Category> {
    Ok(Category {
        id: r.get(0)?,
        name: r.get(1)?,
        parent_id: r.get(2)?,
    })
}

fn clean_name(raw: &str) -> Result<String> {
    let name = raw.trim();
    if name.is_empty() {
        return Err(Error::validation("name", "category name cannot be empty"));
    }
    if name.chars().count() > NAME_MAX_CHARS {
        return Err(Error::validation(
            "name",
            format!("category name is longer than {} characters", NAME_MAX_CHARS),
        ));
    }
    Ok(name.to_string())
}

pub fn get_category(conn: &Connection, id: i64) -> Result<Category> {
    conn.query_row(&format!("{SELECT} WHERE id=?1"), params![id], map_row)
        .map_err(not_found_on_empty)
}

fn find_exact(conn: &Connection, name: &str, parent: Option<i64>) -> Result<Option<Category>> {
    Ok(conn
        .query_row(
            &format!("{SELECT} WHERE name=?1 AND parent_id IS ?2"),
            params![name, parent],
            map_row,
        )
        .optional()?)
}

/// Resolves `parent` and checks that it can hold children.
fn checked_parent(conn: &Connection, parent: Option<i64>) -> Result<Option<Category>> {
    let Some(pid) = parent else {
        return Ok(None);
    };
    let p = get_category(conn, pid).map_err(|e| {
        if e.is_not_found() {
            Error::validation("parent", format!("category {} does not exist", pid))
        } else {
            e
        }
    })?;
    if !p.is_main() {
        return Err(Error::validation(
            "parent",
            format!("'{}' is already a subcategory; nesting is limited to two levels", p.name),
        ));
    }
    Ok(Some(p))
}

fn insert(conn: &Connection, name: &str, parent: Option<&Category>) -> Result<Category> {
    let parent_id = parent.map(|p| p.id);
    conn.execute(
        "INSERT INTO categories(name, parent_id) VALUES (?1, ?2)",
        params![name, parent_id],
    )
    .map_err(|e| {
        if is_unique_violation(&e) {
            duplicate(name, parent)
        } else {
            e.into()
        }
    })?;
    Ok(Category {
        id: conn.last_insert_rowid(),
        name: name.to_string(),
        parent_id,
    })
}

fn duplicate(name: &str, parent: Option<&Category>) -> Error {
    Error::DuplicateCategory {
        name: name.to_string(),
        parent: parent.map(|p| p.name.clone()),
    }
}

/// Strict creation: an existing `(name, parent)` pair is an error.
pub fn create_category(conn: &Connection, name: &str, parent: Option<i64>) -> Result<Category> {
    let name = clean_name(name)?;
    let parent = checked_parent(conn, parent)?;
    if find_exact(conn, &name, parent.as_ref().map(|p| p.id))?.is_some() {
        return Err(duplicate(&name, parent.as_ref()));
    }
    let created = insert(conn, &name, parent.as_ref())?;
    tracing::info!(
        id = created.id,
        name = %created.name,
        parent = ?created.parent_id,
        "category created"
    );
    Ok(created)
}

/// Returns the existing `(name, parent)` match or creates it.
pub fn create_or_get_category(
    conn: &Connection,
    name: &str,
    parent: Option<i64>,
) -> Result<Category> {
    let name = clean_name(name)?;
    let parent = checked_parent(conn, parent)?;
    let parent_id = parent.as_ref().map(|p| p.id);
    if let Some(found) = find_exact(conn, &name, parent_id)? {
        return Ok(found);
    }
    match insert(conn, &name, parent.as_ref()) {
        // lost a race with another writer
        Err(Error::DuplicateCategory { .. }) => {
            find_exact(conn, &name, parent_id)?.ok_or(Error::NotFound)
        }
        other => other,
    }
}

/// The category form: pick an existing main category, or name a new one,
/// but not both. The new parent is reused when it already exists; the
/// category itself is created strictly.
pub fn add_category_from_form(
    conn: &Connection,
    name: &str,
    parent_id: Option<i64>,
    new_parent_name: Option<&str>,
) -> Result<Category> {
    let new_parent_name = new_parent_name.map(str::trim).filter(|s| !s.is_empty());
    let parent = match (parent_id, new_parent_name) {
        (Some(_), Some(_)) => {
            return Err(Error::validation(
                "parent",
                "choose either an existing parent category or a new one, not both",
            ));
        }
        (Some(id), None) => Some(id),
        (None, Some(new_name)) => Some(create_or_get_category(conn, new_name, None)?.id),
        (None, None) => None,
    };
    create_category(conn, name, parent)
}

pub fn list_main_categories(conn: &Connection) -> Result<Vec<Category>> {
    let mut stmt = conn.prepare(&format!("{SELECT} WHERE parent_id IS NULL ORDER BY name"))?;
    let rows = stmt.query_map([], map_row)?;
    Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
}

pub fn list_children(conn: &Connection, category: &Category) -> Result<Vec<Category>> {
    let mut stmt = conn.prepare(&format!("{SELECT} WHERE parent_id=?1 ORDER BY name"))?;
    let rows = stmt.query_map(params![category.id], map_row)?;
    Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
}

pub fn find_main_category(conn: &Connection, name: &str) -> Result<Category> {
    find_exact(conn, name.trim(), None)?.ok_or_else(|| {
        Error::validation("category", format!("main category '{}' does not exist", name.trim()))
    })
}

/// Looks a subcategory up by name, under `parent` when given.
///
/// Without a parent the name has to be unambiguous across all main categories.
pub fn find_subcategory(
    conn: &Connection,
    name: &str,
    parent: Option<&Category>,
) -> Result<Category> {
    let name = name.trim();
    if let Some(p) = parent {
        return find_exact(conn, name, Some(p.id))?.ok_or_else(|| {
            Error::validation(
                "subcategory",
                format!("'{}' is not a subcategory of '{}'", name, p.name),
            )
        });
    }
    let mut stmt =
        conn.prepare(&format!("{SELECT} WHERE name=?1 AND parent_id IS NOT NULL ORDER BY id"))?;
    let mut found = stmt
        .query_map(params![name], map_row)?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    match found.len() {
        0 => Err(Error::validation(
            "subcategory",
            format!("subcategory '{}' does not exist", name),
        )),
        1 => Ok(found.remove(0)),
        n => Err(Error::validation(
            "subcategory",
            format!("'{}' exists under {} categories; name the parent too", name, n),
        )),
    }
}

/// Ancestor names from the root down, joined with [`PATH_SEPARATOR`].
pub fn get_full_path(conn: &Connection, category: &Category) -> Result<String> {
    let mut names = vec![category.name.clone()];
    let mut next = category.parent_id;
    // Rows written before the depth check could chain deeper; the walk stops on cycles.
    let mut seen = vec![category.id];
    while let Some(pid) = next {
        if seen.contains(&pid) {
            break;
        }
        seen.push(pid);
        let p = get_category(conn, pid)?;
        names.push(p.name);
        next = p.parent_id;
    }
    names.reverse();
    Ok(names.join(PATH_SEPARATOR))
}

pub fn rename_category(conn: &Connection, id: i64, new_name: &str) -> Result<Category> {
    let current = get_category(conn, id)?;
    let name = clean_name(new_name)?;
    if name == current.name {
        return Ok(current);
    }
    let parent = match current.parent_id {
        Some(pid) => Some(get_category(conn, pid)?),
        None => None,
    };
    if find_exact(conn, &name, current.parent_id)?.is_some() {
        return Err(duplicate(&name, parent.as_ref()));
    }
    conn.execute(
        "UPDATE categories SET name=?1 WHERE id=?2",
        params![name, id],
    )
    .map_err(|e| {
        if is_unique_violation(&e) {
            duplicate(&name, parent.as_ref())
        } else {
            e.into()
        }
    })?;
    Ok(Category { name, ..current })
}

/// Turns a subcategory into a main category.
pub fn promote_category(conn: &Connection, id: i64) -> Result<Category> {
    let current = get_category(conn, id)?;
    if current.is_main() {
        return Ok(current);
    }
    if find_exact(conn, &current.name, None)?.is_some() {
        return Err(duplicate(&current.name, None));
    }
    conn.execute(
        "UPDATE categories SET parent_id=NULL WHERE id=?1",
        params![id],
    )?;
    tracing::info!(id, name = %current.name, "category promoted to main");
    Ok(Category {
        parent_id: None,
        ..current
    })
}

/// Deletes a category. Its subcategories go with it; transactions keep
/// existing with no category.
pub fn delete_category(conn: &Connection, id: i64) -> Result<()> {
    let n = conn.execute("DELETE FROM categories WHERE id=?1", params![id])?;
    if n == 0 {
        return Err(Error::NotFound);
    }
    tracing::info!(id, "category deleted");
    Ok(())
}

#[derive(Debug, Clone, Serialize)]
pub struct CategoryOverview {
    pub id: i64,
    pub path: String,
    pub parent: Option<String>,
    pub name: String,
    pub subcategories: i64,
    pub transactions: i64,
}

/// Every category, main categories first followed by their children.
pub fn category_overview(conn: &Connection) -> Result<Vec<CategoryOverview>> {
    let mut stmt = conn.prepare(
        "SELECT c.id, c.name, p.name,
                (SELECT COUNT(*) FROM categories k WHERE k.parent_id=c.id),
                (SELECT COUNT(*) FROM transactions t WHERE t.category_id=c.id)
         FROM categories c LEFT JOIN categories p ON c.parent_id=p.id
         ORDER BY COALESCE(p.name, c.name), c.parent_id IS NOT NULL, c.name",
    )?;
    let rows = stmt.query_map([], |r| {
        let name: String = r.get(1)?;
        let parent: Option<String> = r.get(2)?;
        let path = match &parent {
            Some(p) => format!("{p}{PATH_SEPARATOR}{name}"),
            None => name.clone(),
        };
        Ok(CategoryOverview {
            id: r.get(0)?,
            path,
            parent,
            name,
            subcategories: r.get(3)?,
            transactions: r.get(4)?,
        })
    })?;
    Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
}
