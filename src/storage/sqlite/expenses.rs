//! Row access for the `expenses` table. Callers supply the transaction.

use rusqlite::{params, params_from_iter, Connection, OptionalExtension, Row};
use uuid::Uuid;

use super::{optional_uuid_column, uuid_column};
use crate::domain::{
    category::Category,
    expense::{Expense, ExpenseChanges, ExpenseQuery, ExpenseSort},
    owner::OwnerId,
};
use crate::errors::Result;

const SELECT_COLUMNS: &str = "SELECT id, owner, amount, category, date, description, \
     receipt_url, allowance_id, created_at FROM expenses";

fn map_row(row: &Row<'_>) -> rusqlite::Result<Expense> {
    let category: String = row.get(3)?;
    Ok(Expense {
        id: uuid_column(row, 0)?,
        owner: OwnerId::new(uuid_column(row, 1)?),
        amount: row.get(2)?,
        category: Category::from_stored(&category),
        date: row.get(4)?,
        description: row.get(5)?,
        receipt_url: row.get(6)?,
        allowance_id: optional_uuid_column(row, 7)?,
        created_at: row.get(8)?,
    })
}

pub fn insert(conn: &Connection, expense: &Expense) -> Result<()> {
    conn.execute(
        "INSERT INTO expenses (id, owner, amount, category, date, description, receipt_url,
            allowance_id, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
        params![
            expense.id.to_string(),
            expense.owner.to_string(),
            expense.amount,
            expense.category.label(),
            expense.date,
            expense.description,
            expense.receipt_url,
            expense.allowance_id.map(|id| id.to_string()),
            expense.created_at,
        ],
    )?;
    Ok(())
}

/// Loads an expense only if it belongs to `owner`.
pub fn find_owned(conn: &Connection, owner: &OwnerId, id: Uuid) -> Result<Option<Expense>> {
    let sql = format!("{SELECT_COLUMNS} WHERE id = ?1 AND owner = ?2");
    let found = conn
        .query_row(&sql, params![id.to_string(), owner.to_string()], map_row)
        .optional()?;
    Ok(found)
}

/// Overwrites the mutable fields; `allowance_id` is never touched.
pub fn update_fields(conn: &Connection, id: Uuid, changes: &ExpenseChanges) -> Result<()> {
    conn.execute(
        "UPDATE expenses SET amount = ?1, category = ?2, date = ?3, description = ?4
         WHERE id = ?5",
        params![
            changes.amount,
            changes.category.label(),
            changes.date,
            changes.description,
            id.to_string(),
        ],
    )?;
    Ok(())
}

pub fn delete(conn: &Connection, id: Uuid) -> Result<()> {
    conn.execute("DELETE FROM expenses WHERE id = ?1", params![id.to_string()])?;
    Ok(())
}

/// Expenses of `owner` matching `query`. Ties fall back to newest creation first.
pub fn query(conn: &Connection, owner: &OwnerId, filter: &ExpenseQuery) -> Result<Vec<Expense>> {
    let mut sql = format!("{SELECT_COLUMNS} WHERE owner = ?1");
    let mut values = vec![owner.to_string()];

    if let Some(key) = filter.month_key() {
        values.push(key);
        sql.push_str(&format!(" AND strftime('%Y-%m', date) = ?{}", values.len()));
    }
    if let Some(category) = &filter.category {
        values.push(category.label().to_string());
        sql.push_str(&format!(" AND category = ?{} COLLATE NOCASE", values.len()));
    }
    if let Some(search) = &filter.search {
        values.push(format!("%{}%", escape_like(search)));
        sql.push_str(&format!(
            " AND description LIKE ?{} ESCAPE '\\'",
            values.len()
        ));
    }
    sql.push_str(match filter.sort {
        ExpenseSort::DateDesc => " ORDER BY date DESC, created_at DESC",
        ExpenseSort::DateAsc => " ORDER BY date ASC, created_at DESC",
        ExpenseSort::AmountDesc => " ORDER BY amount DESC, date DESC, created_at DESC",
        ExpenseSort::AmountAsc => " ORDER BY amount ASC, date DESC, created_at DESC",
    });

    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map(params_from_iter(values.iter()), map_row)?;
    let mut expenses = Vec::new();
    for row in rows {
        expenses.push(row?);
    }
    Ok(expenses)
}

/// `LIKE` treats `%` and `_` as wildcards; search text matches them literally.
fn escape_like(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for ch in text.chars() {
        if matches!(ch, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(ch);
    }
    escaped
}

pub fn count_for_allowance(conn: &Connection, allowance_id: Uuid) -> Result<i64> {
    let count = conn.query_row(
        "SELECT COUNT(*) FROM expenses WHERE allowance_id = ?1",
        params![allowance_id.to_string()],
        |row| row.get(0),
    )?;
    Ok(count)
}
