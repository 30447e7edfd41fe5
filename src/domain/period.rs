use std::{fmt, str::FromStr};

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::errors::LedgerError;

/// How often an allowance renews.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Frequency {
    #[default]
    Monthly,
    Weekly,
}

impl Frequency {
    pub fn as_str(self) -> &'static str {
        match self {
            Frequency::Monthly => "monthly",
            Frequency::Weekly => "weekly",
        }
    }
}

impl fmt::Display for Frequency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Frequency {
    type Err = LedgerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "monthly" | "month" => Ok(Frequency::Monthly),
            "weekly" | "week" => Ok(Frequency::Weekly),
            other => Err(LedgerError::validation(
                "frequency",
                format!("`{other}` is not monthly or weekly"),
            )),
        }
    }
}

/// Accounting bucket an allowance and its linked expenses belong to.
///
/// Months are 1-indexed; weeks follow ISO-8601 numbering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum BudgetPeriod {
    Month { year: i32, month: u32 },
    Week { year: i32, week: u32 },
}

impl BudgetPeriod {
    /// The period of `frequency` that contains `date`.
    pub fn containing(date: NaiveDate, frequency: Frequency) -> Self {
        match frequency {
            Frequency::Monthly => BudgetPeriod::Month {
                year: date.year(),
                month: date.month(),
            },
            Frequency::Weekly => {
                let iso = date.iso_week();
                BudgetPeriod::Week {
                    year: iso.year(),
                    week: iso.week(),
                }
            }
        }
    }

    /// Rebuilds a period from its stored parts.
    pub fn from_parts(frequency: Frequency, year: i32, index: u32) -> Option<Self> {
        match frequency {
            Frequency::Monthly if (1..=12).contains(&index) => {
                Some(BudgetPeriod::Month { year, month: index })
            }
            Frequency::Weekly if (1..=53).contains(&index) => {
                Some(BudgetPeriod::Week { year, week: index })
            }
            _ => None,
        }
    }

    pub fn frequency(&self) -> Frequency {
        match self {
            BudgetPeriod::Month { .. } => Frequency::Monthly,
            BudgetPeriod::Week { .. } => Frequency::Weekly,
        }
    }

    pub fn year(&self) -> i32 {
        match self {
            BudgetPeriod::Month { year, .. } | BudgetPeriod::Week { year, .. } => *year,
        }
    }

    /// Month (1-12) or ISO week (1-53) within the year.
    pub fn index(&self) -> u32 {
        match self {
            BudgetPeriod::Month { month, .. } => *month,
            BudgetPeriod::Week { week, .. } => *week,
        }
    }

    /// Stable, sortable key: `"2026-10"` for months, `"2026-W42"` for weeks.
    pub fn key(&self) -> String {
        match self {
            BudgetPeriod::Month { year, month } => month_key(*year, *month),
            BudgetPeriod::Week { year, week } => format!("{year:04}-W{week:02}"),
        }
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        *self == BudgetPeriod::containing(date, self.frequency())
    }
}

impl fmt::Display for BudgetPeriod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.key())
    }
}

/// `"YYYY-MM"` key used for month-by-month aggregation.
pub fn month_key(year: i32, month: u32) -> String {
    format!("{year:04}-{month:02}")
}

/// Splits a `"YYYY-MM"` key back into `(year, month)`.
pub fn parse_month_key(key: &str) -> Option<(i32, u32)> {
    let (year, month) = key.trim().split_once('-')?;
    let year = year.parse::<i32>().ok()?;
    let month = month.parse::<u32>().ok()?;
    (1..=12).contains(&month).then_some((year, month))
}
