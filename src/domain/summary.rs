//! Read-only rollups produced by the aggregation engine.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::domain::category::Category;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ExpenseTotals {
    pub total: i64,
    pub count: i64,
    pub average: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryTotal {
    pub category: Category,
    pub amount: i64,
    pub count: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MonthTotal {
    pub period_key: String,
    pub label: String,
    pub year: i32,
    pub month: u32,
    pub total: i64,
    pub transaction_count: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryAmount {
    pub category: Category,
    pub amount: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryShare {
    pub category: Category,
    pub amount: i64,
    pub percentage: f64,
}

/// One month's category split with each category's share of the month total.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MonthBreakdown {
    pub period_key: String,
    pub label: String,
    pub total: i64,
    pub categories: Vec<CategoryShare>,
}

/// Full payload behind the `summary` read contract.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Summary {
    pub total_expense: i64,
    pub total_transactions: i64,
    pub average_expense: i64,
    pub expenses_by_category: Vec<CategoryTotal>,
    pub expenses_by_month: Vec<MonthTotal>,
    pub category_by_month: BTreeMap<String, Vec<CategoryAmount>>,
}
