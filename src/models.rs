// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use rusqlite::types::{FromSql, FromSqlError, FromSqlResult, ToSql, ToSqlOutput, ValueRef};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Currency {
    Uah,
    Usd,
    Eur,
}

impl Currency {
    pub const ALL: [Currency; 3] = [Currency::Uah, Currency::Usd, Currency::Eur];

    pub fn code(self) -> &'static str {
        match self {
            Currency::Uah => "UAH",
            Currency::Usd => "USD",
            Currency::Eur => "EUR",
        }
    }

    pub fn display_name(self) -> &'static str {
        match self {
            Currency::Uah => "Гривня",
            Currency::Usd => "Долар США",
            Currency::Eur => "Євро",
        }
    }
}

impl Default for Currency {
    fn default() -> Self {
        Currency::Uah
    }
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for Currency {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "UAH" => Ok(Currency::Uah),
            "USD" => Ok(Currency::Usd),
            "EUR" => Ok(Currency::Eur),
            other => Err(Error::validation(
                "currency",
                format!("unsupported currency '{}' (use UAH, USD or EUR)", other),
            )),
        }
    }
}

impl ToSql for Currency {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.code()))
    }
}

impl FromSql for Currency {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        let s = value.as_str()?;
        s.parse::<Currency>()
            .map_err(|e| FromSqlError::Other(Box::new(e)))
    }
}

/// Identity of the user on whose behalf an operation runs.
///
/// Every owner-scoped query binds this id; there is no ambient session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct OwnerId(pub i64);

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: OwnerId,
    pub email: String,
    pub created_at: DateTime<Utc>,
}

/// A user-owned "table" of transactions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ledger {
    pub id: i64,
    pub owner: OwnerId,
    pub title: String,
    pub color: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub id: i64,
    pub name: String,
    pub parent_id: Option<i64>,
}

impl Category {
    pub fn is_main(&self) -> bool {
        self.parent_id.is_none()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    pub id: i64,
    pub ledger_id: i64,
    pub category_id: Option<i64>,
    pub amount: Decimal,
    pub currency: Currency,
    pub date: NaiveDate,
    pub description: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Parent side of a [`CategoryRef`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParentRef {
    pub id: i64,
    pub name: String,
}

/// Category as attached to a listed transaction, with its parent resolved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryRef {
    pub id: i64,
    pub name: String,
    pub parent: Option<ParentRef>,
}

impl CategoryRef {
    /// The main category this one rolls up to.
    pub fn main_name(&self) -> &str {
        match &self.parent {
            Some(p) => &p.name,
            None => &self.name,
        }
    }

    pub fn label(&self) -> String {
        match &self.parent {
            Some(p) => format!("{} → {}", p.name, self.name),
            None => self.name.clone(),
        }
    }
}

/// A transaction joined with its ledger title and category names.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransactionRecord {
    pub id: i64,
    pub ledger_id: i64,
    pub ledger_title: String,
    pub category: Option<CategoryRef>,
    pub amount: Decimal,
    pub currency: Currency,
    pub date: NaiveDate,
    pub description: String,
    pub created_at: DateTime<Utc>,
}
