// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Library error type shared by the stores, the repository and the seeder.

use thiserror::Error;

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, Error)]
pub enum Error {
    /// A field-level rejection: bad input, malformed filter, broken hierarchy rule.
    #[error("invalid {field}: {message}")]
    Validation {
        field: &'static str,
        message: String,
    },

    /// Strict creation of a `(name, parent)` pair that already exists.
    #[error("{}", duplicate_message(.name, .parent))]
    DuplicateCategory {
        name: String,
        parent: Option<String>,
    },

    /// The entity does not exist or belongs to another owner.
    ///
    /// Both cases share this variant so callers cannot probe for other
    /// owners' ids.
    #[error("not found")]
    NotFound,

    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),
}

impl Error {
    pub fn validation(field: &'static str, message: impl Into<String>) -> Self {
        Error::Validation {
            field,
            message: message.into(),
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Error::NotFound)
    }
}

fn duplicate_message(name: &str, parent: &Option<String>) -> String {
    match parent {
        Some(p) => format!("Subcategory '{}' already exists in category '{}'", name, p),
        None => format!("Main category '{}' already exists", name),
    }
}

/// Maps "no rows" to [`Error::NotFound`] for single-row lookups.
pub(crate) fn not_found_on_empty(err: rusqlite::Error) -> Error {
    match err {
        rusqlite::Error::QueryReturnedNoRows => Error::NotFound,
        other => Error::Database(other),
    }
}

pub(crate) fn is_unique_violation(err: &rusqlite::Error) -> bool {
    matches!(
        err,
        rusqlite::Error::SqliteFailure(e, _)
            if e.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE
    )
}
