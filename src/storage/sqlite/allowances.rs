//! Row access for the `allowances` table. Callers supply the transaction.

use chrono::{DateTime, Utc};
use rusqlite::{params, types::Type, Connection, OptionalExtension, Row};
use uuid::Uuid;

use super::uuid_column;
use crate::domain::{
    allowance::AllowancePeriod,
    owner::OwnerId,
    period::{BudgetPeriod, Frequency},
};
use crate::errors::Result;

const SELECT_COLUMNS: &str = "SELECT id, owner, frequency, year, period_index, amount, remaining, \
     created_at, updated_at FROM allowances";

fn map_row(row: &Row<'_>) -> rusqlite::Result<AllowancePeriod> {
    let frequency_raw: String = row.get(2)?;
    let frequency: Frequency = frequency_raw.parse().map_err(|err| {
        rusqlite::Error::FromSqlConversionFailure(2, Type::Text, Box::new(err))
    })?;
    let year: i32 = row.get(3)?;
    let index: u32 = row.get(4)?;
    let period = BudgetPeriod::from_parts(frequency, year, index)
        .ok_or(rusqlite::Error::IntegralValueOutOfRange(4, index as i64))?;
    Ok(AllowancePeriod {
        id: uuid_column(row, 0)?,
        owner: OwnerId::new(uuid_column(row, 1)?),
        period,
        frequency,
        amount: row.get(5)?,
        remaining: row.get(6)?,
        created_at: row.get(7)?,
        updated_at: row.get(8)?,
    })
}

pub fn find_by_period(
    conn: &Connection,
    owner: &OwnerId,
    period: &BudgetPeriod,
) -> Result<Option<AllowancePeriod>> {
    let sql = format!("{SELECT_COLUMNS} WHERE owner = ?1 AND period_key = ?2");
    let found = conn
        .query_row(&sql, params![owner.to_string(), period.key()], map_row)
        .optional()?;
    Ok(found)
}

/// First allowance found among `candidates`, in order.
pub fn find_first_of(
    conn: &Connection,
    owner: &OwnerId,
    candidates: &[BudgetPeriod],
) -> Result<Option<AllowancePeriod>> {
    for period in candidates {
        if let Some(found) = find_by_period(conn, owner, period)? {
            return Ok(Some(found));
        }
    }
    Ok(None)
}

pub fn find_by_id(conn: &Connection, id: Uuid) -> Result<Option<AllowancePeriod>> {
    let sql = format!("{SELECT_COLUMNS} WHERE id = ?1");
    let found = conn
        .query_row(&sql, params![id.to_string()], map_row)
        .optional()?;
    Ok(found)
}

/// Inserts `allowance` unless its `(owner, period)` already exists. Returns whether a
/// row was written.
pub fn insert_if_absent(conn: &Connection, allowance: &AllowancePeriod) -> Result<bool> {
    let changed = conn.execute(
        "INSERT INTO allowances (id, owner, frequency, period_key, year, period_index,
            amount, remaining, created_at, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)
         ON CONFLICT (owner, period_key) DO NOTHING",
        params![
            allowance.id.to_string(),
            allowance.owner.to_string(),
            allowance.frequency.as_str(),
            allowance.period.key(),
            allowance.period.year(),
            allowance.period.index(),
            allowance.amount,
            allowance.remaining,
            allowance.created_at,
            allowance.updated_at,
        ],
    )?;
    Ok(changed > 0)
}

/// Creates or overwrites the `(owner, period)` record with `remaining = amount`.
pub fn upsert_reset(conn: &Connection, allowance: &AllowancePeriod) -> Result<()> {
    conn.execute(
        "INSERT INTO allowances (id, owner, frequency, period_key, year, period_index,
            amount, remaining, created_at, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?7, ?8, ?8)
         ON CONFLICT (owner, period_key) DO UPDATE SET
            amount = excluded.amount,
            remaining = excluded.amount,
            updated_at = excluded.updated_at",
        params![
            allowance.id.to_string(),
            allowance.owner.to_string(),
            allowance.frequency.as_str(),
            allowance.period.key(),
            allowance.period.year(),
            allowance.period.index(),
            allowance.amount,
            allowance.updated_at,
        ],
    )?;
    Ok(())
}

pub fn update_remaining(
    conn: &Connection,
    id: Uuid,
    remaining: i64,
    now: DateTime<Utc>,
) -> Result<()> {
    conn.execute(
        "UPDATE allowances SET remaining = ?1, updated_at = ?2 WHERE id = ?3",
        params![remaining, now, id.to_string()],
    )?;
    Ok(())
}
