//! Read-only aggregation over an owner's expenses.

use std::collections::BTreeMap;

use rusqlite::Connection;

use crate::currency::round_half_up;
use crate::domain::category::Category;
use crate::domain::owner::OwnerId;
use crate::domain::expense::parse_expense_month;
use crate::domain::period::{month_key, parse_month_key};
use crate::domain::summary::{
    CategoryAmount, CategoryShare, CategoryTotal, ExpenseTotals, MonthBreakdown, MonthTotal,
    Summary,
};
use crate::errors::LedgerError;
use crate::storage::sqlite::aggregates;
use crate::storage::SqliteStore;

use super::ServiceResult;

const MONTHS_ID: [&str; 12] = [
    "Januari",
    "Februari",
    "Maret",
    "April",
    "Mei",
    "Juni",
    "Juli",
    "Agustus",
    "September",
    "Oktober",
    "November",
    "Desember",
];

const MONTHS_EN: [&str; 12] = [
    "January",
    "February",
    "March",
    "April",
    "May",
    "June",
    "July",
    "August",
    "September",
    "October",
    "November",
    "December",
];

/// Language used for month labels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MonthLabels {
    #[default]
    Indonesian,
    English,
}

impl MonthLabels {
    /// Indonesian for any `id*` locale, English otherwise.
    pub fn for_locale(locale: &str) -> Self {
        if locale.trim().to_ascii_lowercase().starts_with("id") {
            MonthLabels::Indonesian
        } else {
            MonthLabels::English
        }
    }

    /// `"Oktober 2026"` style label; falls back to the key for an invalid month.
    pub fn label(self, year: i32, month: u32) -> String {
        let names = match self {
            MonthLabels::Indonesian => &MONTHS_ID,
            MonthLabels::English => &MONTHS_EN,
        };
        match month.checked_sub(1).and_then(|idx| names.get(idx as usize)) {
            Some(name) => format!("{name} {year}"),
            None => format!("{year:04}-{month:02}"),
        }
    }
}

/// Computes totals and groupings inside the database; individual expenses are
/// never loaded for aggregation.
#[derive(Clone)]
pub struct SummaryService {
    store: SqliteStore,
    labels: MonthLabels,
}

impl SummaryService {
    pub fn new(store: SqliteStore, labels: MonthLabels) -> Self {
        Self { store, labels }
    }

    pub fn total_and_count(&self, owner: &OwnerId) -> ServiceResult<ExpenseTotals> {
        self.store.read(|conn| totals(conn, owner))
    }

    /// Category totals, largest first.
    pub fn by_category(&self, owner: &OwnerId) -> ServiceResult<Vec<CategoryTotal>> {
        self.store.read(|conn| by_category(conn, owner))
    }

    /// Monthly totals, most recent month first.
    pub fn by_month(&self, owner: &OwnerId) -> ServiceResult<Vec<MonthTotal>> {
        self.store.read(|conn| by_month(conn, owner, self.labels))
    }

    pub fn category_by_month(
        &self,
        owner: &OwnerId,
    ) -> ServiceResult<BTreeMap<String, Vec<CategoryAmount>>> {
        self.store.read(|conn| category_by_month(conn, owner))
    }

    /// One month's split with each category's share of the month total.
    pub fn month_breakdown(&self, owner: &OwnerId, month: &str) -> ServiceResult<MonthBreakdown> {
        let (year, month_index) = parse_expense_month(month)?;
        let key = month_key(year, month_index);
        let rows = self
            .store
            .read(|conn| aggregates::categories_in_month(conn, owner, &key))?;

        let total: i64 = rows.iter().map(|(_, amount)| amount).sum();
        let categories = rows
            .into_iter()
            .map(|(category, amount)| CategoryShare {
                category: Category::from_stored(&category),
                amount,
                percentage: percentage_of_month(amount, total),
            })
            .collect();

        Ok(MonthBreakdown {
            label: self.labels.label(year, month_index),
            period_key: key,
            total,
            categories,
        })
    }

    /// Everything the summary read contract returns, computed under one connection lock.
    pub fn summary(&self, owner: &OwnerId) -> ServiceResult<Summary> {
        let summary = self.store.read(|conn| {
            let totals = totals(conn, owner)?;
            Ok(Summary {
                total_expense: totals.total,
                total_transactions: totals.count,
                average_expense: totals.average,
                expenses_by_category: by_category(conn, owner)?,
                expenses_by_month: by_month(conn, owner, self.labels)?,
                category_by_month: category_by_month(conn, owner)?,
            })
        })?;
        tracing::debug!(
            %owner,
            total = summary.total_expense,
            transactions = summary.total_transactions,
            "summary computed"
        );
        Ok(summary)
    }
}

/// Share of `amount` in `month_total` as a percentage rounded to one decimal.
/// An empty month yields `0.0`.
pub fn percentage_of_month(amount: i64, month_total: i64) -> f64 {
    if month_total <= 0 {
        return 0.0;
    }
    let raw = amount as f64 / month_total as f64 * 100.0;
    (raw * 10.0).round() / 10.0
}

fn totals(conn: &Connection, owner: &OwnerId) -> ServiceResult<ExpenseTotals> {
    let (total, count) = aggregates::totals(conn, owner)?;
    let average = if count == 0 {
        0
    } else {
        round_half_up(total as f64 / count as f64)?
    };
    Ok(ExpenseTotals {
        total,
        count,
        average,
    })
}

fn by_category(conn: &Connection, owner: &OwnerId) -> ServiceResult<Vec<CategoryTotal>> {
    Ok(aggregates::by_category(conn, owner)?
        .into_iter()
        .map(|row| CategoryTotal {
            category: Category::from_stored(&row.category),
            amount: row.total,
            count: row.count,
        })
        .collect())
}

fn by_month(
    conn: &Connection,
    owner: &OwnerId,
    labels: MonthLabels,
) -> ServiceResult<Vec<MonthTotal>> {
    let mut months = Vec::new();
    for row in aggregates::by_month(conn, owner)? {
        let (year, month) = parse_month_key(&row.month_key).ok_or_else(|| {
            LedgerError::Storage(format!("malformed expense month `{}`", row.month_key))
        })?;
        months.push(MonthTotal {
            label: labels.label(year, month),
            period_key: row.month_key,
            year,
            month,
            total: row.total,
            transaction_count: row.count,
        });
    }
    Ok(months)
}

fn category_by_month(
    conn: &Connection,
    owner: &OwnerId,
) -> ServiceResult<BTreeMap<String, Vec<CategoryAmount>>> {
    let mut grouped: BTreeMap<String, Vec<CategoryAmount>> = BTreeMap::new();
    for (month_key, category, amount) in aggregates::category_by_month(conn, owner)? {
        grouped.entry(month_key).or_default().push(CategoryAmount {
            category: Category::from_stored(&category),
            amount,
        });
    }
    Ok(grouped)
}
