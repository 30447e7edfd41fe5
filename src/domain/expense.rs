use std::{fmt, str::FromStr};

use chrono::{DateTime, Datelike, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::category::Category;
use crate::domain::common::{Displayable, Identifiable, Owned};
use crate::domain::owner::OwnerId;
use crate::domain::period::{month_key, parse_month_key};
use crate::errors::{LedgerError, Result};

/// A single logged expense.
///
/// `allowance_id` is fixed at creation; edits never relink an expense.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Expense {
    pub id: Uuid,
    pub owner: OwnerId,
    pub amount: i64,
    pub category: Category,
    pub date: NaiveDate,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub receipt_url: Option<String>,
    pub allowance_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
}

impl Identifiable for Expense {
    fn id(&self) -> Uuid {
        self.id
    }
}

impl Owned for Expense {
    fn owner(&self) -> &OwnerId {
        &self.owner
    }
}

impl Displayable for Expense {
    fn display_label(&self) -> String {
        match &self.description {
            Some(note) => format!("{} {} {} ({})", self.date, self.category, self.amount, note),
            None => format!("{} {} {}", self.date, self.category, self.amount),
        }
    }
}

/// Validated input for creating an expense.
#[derive(Debug, Clone, PartialEq)]
pub struct NewExpense {
    pub amount: i64,
    pub category: Category,
    pub date: NaiveDate,
    pub description: Option<String>,
    pub receipt_url: Option<String>,
}

impl NewExpense {
    pub fn new(amount: i64, category: Category, date: NaiveDate) -> Self {
        Self {
            amount,
            category,
            date,
            description: None,
            receipt_url: None,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = normalize_description(Some(description.into()));
        self
    }

    pub fn with_receipt(mut self, receipt_url: impl Into<String>) -> Self {
        self.receipt_url = Some(receipt_url.into());
        self
    }
}

/// The mutable fields of an existing expense.
#[derive(Debug, Clone, PartialEq)]
pub struct ExpenseChanges {
    pub amount: i64,
    pub category: Category,
    pub date: NaiveDate,
    pub description: Option<String>,
}

/// Expense amounts must be strictly positive whole units.
pub fn validate_expense_amount(amount: i64) -> Result<i64> {
    if amount <= 0 {
        return Err(LedgerError::validation(
            "amount",
            "expense must be greater than zero",
        ));
    }
    Ok(amount)
}

/// Years an expense date may fall in. Month keys are always four-digit `YYYY-MM`.
pub const EXPENSE_YEARS: std::ops::RangeInclusive<i32> = 1..=9999;

/// Rejects dates whose year does not fit a four-digit month key.
pub fn validate_expense_date(date: NaiveDate) -> Result<NaiveDate> {
    if !EXPENSE_YEARS.contains(&date.year()) {
        return Err(LedgerError::validation(
            "date",
            format!("year {} is outside 0001..=9999", date.year()),
        ));
    }
    Ok(date)
}

/// Parses an ISO `YYYY-MM-DD` calendar date.
pub fn parse_expense_date(raw: &str) -> Result<NaiveDate> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(LedgerError::validation("date", "is required"));
    }
    let date = NaiveDate::parse_from_str(trimmed, "%Y-%m-%d").map_err(|_| {
        LedgerError::validation("date", format!("`{trimmed}` is not a YYYY-MM-DD date"))
    })?;
    validate_expense_date(date)
}

/// Normalizes a `YYYY-MM` filter or breakdown key.
pub fn parse_expense_month(raw: &str) -> Result<(i32, u32)> {
    match parse_month_key(raw) {
        Some((year, month)) if EXPENSE_YEARS.contains(&year) => Ok((year, month)),
        _ => Err(LedgerError::validation(
            "month",
            format!("`{}` is not a YYYY-MM month", raw.trim()),
        )),
    }
}

/// Order of an expense listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ExpenseSort {
    #[default]
    DateDesc,
    DateAsc,
    AmountDesc,
    AmountAsc,
}

impl ExpenseSort {
    pub fn as_str(self) -> &'static str {
        match self {
            ExpenseSort::DateDesc => "date-desc",
            ExpenseSort::DateAsc => "date-asc",
            ExpenseSort::AmountDesc => "amount-desc",
            ExpenseSort::AmountAsc => "amount-asc",
        }
    }
}

impl fmt::Display for ExpenseSort {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ExpenseSort {
    type Err = LedgerError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "date-desc" | "newest" => Ok(ExpenseSort::DateDesc),
            "date-asc" | "oldest" => Ok(ExpenseSort::DateAsc),
            "amount-desc" | "highest" => Ok(ExpenseSort::AmountDesc),
            "amount-asc" | "lowest" => Ok(ExpenseSort::AmountAsc),
            other => Err(LedgerError::validation(
                "sort",
                format!("`{other}` is not date-desc, date-asc, amount-desc or amount-asc"),
            )),
        }
    }
}

/// Filters and ordering for listing an owner's expenses. Unset filters match everything.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExpenseQuery {
    /// `(year, month)` the expense date must fall in.
    pub month: Option<(i32, u32)>,
    pub category: Option<Category>,
    /// Case-insensitive substring of the description.
    pub search: Option<String>,
    pub sort: ExpenseSort,
}

impl ExpenseQuery {
    /// Builds a query from raw filter text; blank values leave a filter unset.
    pub fn from_filters(
        month: Option<&str>,
        category: Option<&str>,
        search: Option<&str>,
        sort: Option<&str>,
    ) -> Result<Self> {
        fn present(value: Option<&str>) -> Option<&str> {
            value.map(str::trim).filter(|text| !text.is_empty())
        }
        Ok(Self {
            month: present(month).map(parse_expense_month).transpose()?,
            category: present(category).map(Category::parse).transpose()?,
            search: present(search).map(str::to_string),
            sort: present(sort)
                .map(str::parse::<ExpenseSort>)
                .transpose()?.unwrap_or_default(),
        })
    }

    /// `YYYY-MM` key of the month filter.
    pub fn month_key(&self) -> Option<String> {
        self.month.map(|(year, month)| month_key(year, month))
    }
}

/// Blank descriptions are stored as absent.
pub fn normalize_description(description: Option<String>) -> Option<String> {
    description
        .map(|text| text.trim().to_string())
        .filter(|text| !text.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::category::FixedCategory;

    #[test]
    fn parse_expense_date_accepts_iso_dates_only() {
        assert_eq!(
            parse_expense_date("2026-10-18").unwrap(),
            NaiveDate::from_ymd_opt(2026, 10, 18).unwrap()
        );
        assert!(matches!(
            parse_expense_date("18/10/2026"),
            Err(LedgerError::Validation { field: "date", .. })
        ));
        assert!(parse_expense_date("").is_err());
    }

    #[test]
    fn parse_expense_date_rejects_years_without_four_digit_keys() {
        for raw in ["+10000-01-15", "-0001-03-01", "0000-06-01"] {
            assert!(
                matches!(
                    parse_expense_date(raw),
                    Err(LedgerError::Validation { field: "date", .. })
                ),
                "{raw} should be rejected"
            );
        }
        assert!(parse_expense_date("9999-12-31").is_ok());
        assert!(parse_expense_date("0001-01-01").is_ok());
    }

    #[test]
    fn query_filters_ignore_blanks_and_validate_the_rest() {
        let query = ExpenseQuery::from_filters(Some(" 2026-10 "), Some("food"), Some(""), None)
            .unwrap();
        assert_eq!(query.month_key().as_deref(), Some("2026-10"));
        assert_eq!(query.category, Some(FixedCategory::Food.into()));
        assert_eq!(query.search, None);
        assert_eq!(query.sort, ExpenseSort::DateDesc);

        assert!(matches!(
            ExpenseQuery::from_filters(Some("2026-13"), None, None, None),
            Err(LedgerError::Validation { field: "month", .. })
        ));
        assert!(matches!(
            ExpenseQuery::from_filters(None, None, None, Some("random")),
            Err(LedgerError::Validation { field: "sort", .. })
        ));
        assert_eq!("lowest".parse::<ExpenseSort>().unwrap(), ExpenseSort::AmountAsc);
    }

    #[test]
    fn blank_descriptions_become_none() {
        assert_eq!(normalize_description(Some("   ".into())), None);
        assert_eq!(
            normalize_description(Some(" lunch ".into())),
            Some("lunch".into())
        );
    }
}
