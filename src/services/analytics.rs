// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Spending analytics over a set of transactions.
//!
//! Amounts are converted to one reporting currency for the totals, the
//! category, month and table breakdowns. The currency breakdown keeps the
//! original amounts. A transaction whose amount cannot be converted is
//! counted with its raw value.

use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::str::FromStr;

use chrono::{Days, NaiveDate};
use rust_decimal::Decimal;
use serde::Serialize;

use crate::error::Error;
use crate::models::{Currency, TransactionRecord};
use crate::services::fx::RateTable;

/// Chart colors, handed out by rank.
pub const PALETTE: [&str; 12] = [
    "#FF6384", "#36A2EB", "#FFCE56", "#4BC0C0", "#9966FF", "#FF9F40", "#C9CBCF", "#43e97b",
    "#667eea", "#f093fb", "#4facfe", "#38f9d7",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Period {
    #[default]
    All,
    Days(u32),
}

impl Period {
    /// First date inside the window. A window reaching past the earliest
    /// representable date has no lower bound.
    pub fn start(self, today: NaiveDate) -> Option<NaiveDate> {
        match self {
            Period::All => None,
            Period::Days(n) => today.checked_sub_days(Days::new(u64::from(n))),
        }
    }

    pub fn contains(self, date: NaiveDate, today: NaiveDate) -> bool {
        self.start(today).is_none_or(|s| date >= s)
    }
}

impl FromStr for Period {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.eq_ignore_ascii_case("all") {
            return Ok(Period::All);
        }
        match s.parse::<u32>() {
            Ok(n) if n > 0 => Ok(Period::Days(n)),
            _ => Err(Error::validation(
                "period",
                format!("'{}' is neither 'all' nor a positive number of days", s),
            )),
        }
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Period::All => f.write_str("all"),
            Period::Days(n) => write!(f, "{n}"),
        }
    }
}

impl Serialize for Period {
    fn serialize<S: serde::Serializer>(&self, s: S) -> Result<S::Ok, S::Error> {
        s.collect_str(self)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryStat {
    pub name: String,
    pub total: Decimal,
    pub count: usize,
    pub average: Decimal,
    pub percentage: Decimal,
    pub color: &'static str,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Bucket<K> {
    pub key: K,
    pub total: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LedgerStat {
    pub ledger_id: i64,
    pub title: String,
    pub total: Decimal,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Series {
    pub labels: Vec<String>,
    pub values: Vec<Decimal>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ChartData {
    pub categories: Series,
    pub monthly: Series,
    pub currencies: Series,
    pub ledgers: Series,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnalyticsReport {
    pub period: Period,
    pub reporting_currency: Currency,
    pub total_count: usize,
    pub total_amount: Decimal,
    pub average_amount: Decimal,
    pub max_amount: Decimal,
    /// Part of the total with no category.
    pub uncategorized_total: Decimal,
    pub category_stats: Vec<CategoryStat>,
    pub monthly_stats: Vec<Bucket<String>>,
    pub currency_stats: Vec<Bucket<Currency>>,
    pub ledger_stats: Vec<LedgerStat>,
    pub chart: ChartData,
}

#[derive(Default)]
struct Acc {
    total: Decimal,
    count: usize,
}

fn round2(d: Decimal) -> Decimal {
    d.round_dp(2)
}

/// Runs the whole pipeline for `transactions` as of `today`.
pub fn build_report(
    transactions: &[TransactionRecord],
    period: Period,
    today: NaiveDate,
    reporting: Currency,
    rates: Option<&RateTable>,
) -> AnalyticsReport {
    let selected: Vec<&TransactionRecord> = transactions
        .iter()
        .filter(|t| period.contains(t.date, today))
        .collect();

    let mut total = Decimal::ZERO;
    let mut max: Option<Decimal> = None;
    let mut uncategorized = Decimal::ZERO;
    let mut by_category: HashMap<String, Acc> = HashMap::new();
    let mut by_month: BTreeMap<String, Decimal> = BTreeMap::new();
    let mut by_currency: BTreeMap<Currency, Decimal> = BTreeMap::new();
    let mut by_ledger: HashMap<i64, (String, Decimal)> = HashMap::new();
    let mut fallbacks = 0usize;

    for t in &selected {
        let amount = match rates.and_then(|r| r.convert(t.amount, t.currency, reporting)) {
            Some(a) => a,
            None if t.currency == reporting => t.amount,
            None => {
                fallbacks += 1;
                t.amount
            }
        };

        total += amount;
        max = Some(max.map_or(amount, |m| m.max(amount)));

        match &t.category {
            Some(c) => {
                let acc = by_category.entry(c.main_name().to_string()).or_default();
                acc.total += amount;
                acc.count += 1;
            }
            None => uncategorized += amount,
        }
        *by_month
            .entry(t.date.format("%Y-%m").to_string())
            .or_insert(Decimal::ZERO) += amount;
        *by_currency.entry(t.currency).or_insert(Decimal::ZERO) += t.amount;
        by_ledger
            .entry(t.ledger_id)
            .or_insert_with(|| (t.ledger_title.clone(), Decimal::ZERO))
            .1 += amount;
    }
    if fallbacks > 0 {
        tracing::warn!(
            fallbacks,
            reporting = %reporting,
            "some amounts could not be converted and were counted as-is"
        );
    }

    let count = selected.len();
    let average = if count == 0 {
        Decimal::ZERO
    } else {
        total / Decimal::from(count)
    };

    let mut categories: Vec<(String, Acc)> = by_category.into_iter().collect();
    categories.sort_by(|a, b| b.1.total.cmp(&a.1.total).then_with(|| a.0.cmp(&b.0)));
    let category_stats: Vec<CategoryStat> = categories
        .into_iter()
        .enumerate()
        .map(|(rank, (name, acc))| CategoryStat {
            name,
            total: round2(acc.total),
            count: acc.count,
            average: round2(acc.total / Decimal::from(acc.count)),
            percentage: if total.is_zero() {
                Decimal::ZERO
            } else {
                round2(acc.total / total * Decimal::ONE_HUNDRED)
            },
            color: PALETTE[rank % PALETTE.len()],
        })
        .collect();

    let monthly_stats: Vec<Bucket<String>> = by_month
        .into_iter()
        .map(|(key, total)| Bucket {
            key,
            total: round2(total),
        })
        .collect();
    let currency_stats: Vec<Bucket<Currency>> = by_currency
        .into_iter()
        .map(|(key, total)| Bucket {
            key,
            total: round2(total),
        })
        .collect();
    let mut ledger_stats: Vec<LedgerStat> = by_ledger
        .into_iter()
        .map(|(ledger_id, (title, total))| LedgerStat {
            ledger_id,
            title,
            total: round2(total),
        })
        .collect();
    ledger_stats.sort_by(|a, b| {
        b.total
            .cmp(&a.total)
            .then_with(|| a.title.cmp(&b.title))
            .then_with(|| a.ledger_id.cmp(&b.ledger_id))
    });

    let chart = ChartData {
        categories: Series {
            labels: category_stats.iter().map(|c| c.name.clone()).collect(),
            values: category_stats.iter().map(|c| c.total).collect(),
        },
        monthly: Series {
            labels: monthly_stats.iter().map(|b| b.key.clone()).collect(),
            values: monthly_stats.iter().map(|b| b.total).collect(),
        },
        currencies: Series {
            labels: currency_stats.iter().map(|b| b.key.to_string()).collect(),
            values: currency_stats.iter().map(|b| b.total).collect(),
        },
        ledgers: Series {
            labels: ledger_stats.iter().map(|l| l.title.clone()).collect(),
            values: ledger_stats.iter().map(|l| l.total).collect(),
        },
    };

    AnalyticsReport {
        period,
        reporting_currency: reporting,
        total_count: count,
        total_amount: round2(total),
        average_amount: round2(average),
        max_amount: round2(max.unwrap_or(Decimal::ZERO)),
        uncategorized_total: round2(uncategorized),
        category_stats,
        monthly_stats,
        currency_stats,
        ledger_stats,
        chart,
    }
}
