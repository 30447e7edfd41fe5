//! Grouped aggregation queries. Only aggregated rows leave the database.
//!
//! Month keys come from `strftime('%Y-%m', date)`; rows whose date SQLite cannot
//! read as a calendar date are left out of the monthly groupings.

use rusqlite::{params, Connection};

use crate::domain::owner::OwnerId;
use crate::errors::Result;

/// `(month_key, category, total)` row of the per-month category split.
pub type MonthCategoryRow = (String, String, i64);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryRow {
    pub category: String,
    pub total: i64,
    pub count: i64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MonthRow {
    pub month_key: String,
    pub total: i64,
    pub count: i64,
}

/// `(sum, count)` over every expense of `owner`.
pub fn totals(conn: &Connection, owner: &OwnerId) -> Result<(i64, i64)> {
    let totals = conn.query_row(
        "SELECT COALESCE(SUM(amount), 0), COUNT(id) FROM expenses WHERE owner = ?1",
        params![owner.to_string()],
        |row| Ok((row.get(0)?, row.get(1)?)),
    )?;
    Ok(totals)
}

pub fn by_category(conn: &Connection, owner: &OwnerId) -> Result<Vec<CategoryRow>> {
    let mut stmt = conn.prepare(
        "SELECT category, SUM(amount) AS total, COUNT(id)
         FROM expenses
         WHERE owner = ?1
         GROUP BY category
         ORDER BY total DESC, category ASC",
    )?;
    let rows = stmt.query_map(params![owner.to_string()], |row| {
        Ok(CategoryRow {
            category: row.get(0)?,
            total: row.get(1)?,
            count: row.get(2)?,
        })
    })?;
    let mut out = Vec::new();
    for row in rows {
        out.push(row?);
    }
    Ok(out)
}

pub fn by_month(conn: &Connection, owner: &OwnerId) -> Result<Vec<MonthRow>> {
    let mut stmt = conn.prepare(
        "SELECT strftime('%Y-%m', date) AS month_key, SUM(amount), COUNT(id)
         FROM expenses
         WHERE owner = ?1 AND strftime('%Y-%m', date) IS NOT NULL
         GROUP BY month_key
         ORDER BY month_key DESC",
    )?;
    let rows = stmt.query_map(params![owner.to_string()], |row| {
        Ok(MonthRow {
            month_key: row.get(0)?,
            total: row.get(1)?,
            count: row.get(2)?,
        })
    })?;
    let mut out = Vec::new();
    for row in rows {
        out.push(row?);
    }
    Ok(out)
}

/// Category totals per month, newest month first, largest category first.
pub fn category_by_month(conn: &Connection, owner: &OwnerId) -> Result<Vec<MonthCategoryRow>> {
    let mut stmt = conn.prepare(
        "SELECT strftime('%Y-%m', date) AS month_key, category, SUM(amount) AS total
         FROM expenses
         WHERE owner = ?1 AND strftime('%Y-%m', date) IS NOT NULL
         GROUP BY month_key, category
         ORDER BY month_key DESC, total DESC, category ASC",
    )?;
    let rows = stmt.query_map(params![owner.to_string()], |row| {
        Ok((row.get(0)?, row.get(1)?, row.get(2)?))
    })?;
    let mut out = Vec::new();
    for row in rows {
        out.push(row?);
    }
    Ok(out)
}

/// Category totals for a single `"YYYY-MM"` month.
pub fn categories_in_month(
    conn: &Connection,
    owner: &OwnerId,
    month_key: &str,
) -> Result<Vec<(String, i64)>> {
    let mut stmt = conn.prepare(
        "SELECT category, SUM(amount) AS total
         FROM expenses
         WHERE owner = ?1 AND strftime('%Y-%m', date) = ?2
         GROUP BY category
         ORDER BY total DESC, category ASC",
    )?;
    let rows = stmt.query_map(params![owner.to_string(), month_key], |row| {
        Ok((row.get(0)?, row.get(1)?))
    })?;
    let mut out = Vec::new();
    for row in rows {
        out.push(row?);
    }
    Ok(out)
}
