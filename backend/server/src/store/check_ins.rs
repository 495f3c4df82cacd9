use chrono::{DateTime, NaiveDate, Utc};
use rusqlite::{Connection, OptionalExtension, Result, Row, params};
use serde::Serialize;
use tempo_cycle::{CheckInRecord, HISTORY_WINDOW};

use super::new_id;

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PeriodCheckIn {
    pub id: String,
    pub date: NaiveDate,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MoodCheckIn {
    pub id: String,
    pub couple_id: String,
    pub date: NaiveDate,
    pub mood: String,
    pub note: Option<String>,
    pub created_at: DateTime<Utc>,
}

fn period_from_row(row: &Row) -> Result<PeriodCheckIn> {
    Ok(PeriodCheckIn {
        id: row.get("id")?,
        date: row.get("date")?,
        is_active: row.get("is_active")?,
        created_at: row.get("created_at")?,
    })
}

fn mood_from_row(row: &Row) -> Result<MoodCheckIn> {
    Ok(MoodCheckIn {
        id: row.get("id")?,
        couple_id: row.get("couple_id")?,
        date: row.get("date")?,
        mood: row.get("mood")?,
        note: row.get("note")?,
        created_at: row.get("created_at")?,
    })
}

/// Inserts or overwrites the check-in for `date`. The flag is true when a row already existed.
pub fn upsert_period_check_in(
    conn: &Connection,
    couple_id: &str,
    date: NaiveDate,
    is_active: bool,
) -> Result<(PeriodCheckIn, bool)> {
    if let Some(mut existing) = period_check_in_on(conn, couple_id, date)? {
        conn.execute(
            "UPDATE period_check_ins SET is_active = ?1 WHERE id = ?2",
            params![is_active, existing.id],
        )?;

        existing.is_active = is_active;
        return Ok((existing, true));
    }

    let check_in = PeriodCheckIn {
        id: new_id(),
        date,
        is_active,
        created_at: Utc::now(),
    };

    conn.execute(
        "INSERT INTO period_check_ins (id, couple_id, date, is_active, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5)",
        params![check_in.id, couple_id, date, is_active, check_in.created_at],
    )?;

    Ok((check_in, false))
}

pub fn period_check_in_on(
    conn: &Connection,
    couple_id: &str,
    date: NaiveDate,
) -> Result<Option<PeriodCheckIn>> {
    conn.query_row(
        "SELECT id, date, is_active, created_at FROM period_check_ins
         WHERE couple_id = ?1 AND date = ?2",
        params![couple_id, date],
        period_from_row,
    )
    .optional()
}

/// Check-ins in `[start, end]`, newest first.
pub fn period_check_ins_between(
    conn: &Connection,
    couple_id: &str,
    start: NaiveDate,
    end: NaiveDate,
) -> Result<Vec<PeriodCheckIn>> {
    let mut stmt = conn.prepare(
        "SELECT id, date, is_active, created_at FROM period_check_ins
         WHERE couple_id = ?1 AND date >= ?2 AND date <= ?3
         ORDER BY date DESC",
    )?;

    stmt.query_map(params![couple_id, start, end], period_from_row)?
        .collect()
}

pub fn recent_period_check_ins(
    conn: &Connection,
    couple_id: &str,
    limit: i64,
) -> Result<Vec<PeriodCheckIn>> {
    let mut stmt = conn.prepare(
        "SELECT id, date, is_active, created_at FROM period_check_ins
         WHERE couple_id = ?1
         ORDER BY date DESC
         LIMIT ?2",
    )?;

    stmt.query_map(params![couple_id, limit], period_from_row)?
        .collect()
}

/// The newest [`HISTORY_WINDOW`] check-ins in the shape the inferencer reads.
pub fn check_in_history(conn: &Connection, couple_id: &str) -> Result<Vec<CheckInRecord>> {
    let mut stmt = conn.prepare(
        "SELECT date, is_active FROM period_check_ins
         WHERE couple_id = ?1
         ORDER BY date DESC
         LIMIT ?2",
    )?;

    stmt.query_map(params![couple_id, HISTORY_WINDOW as i64], |row| {
        Ok(CheckInRecord {
            date: row.get("date")?,
            is_active: row.get("is_active")?,
        })
    })?
    .collect()
}

pub fn upsert_mood_check_in(
    conn: &Connection,
    couple_id: &str,
    date: NaiveDate,
    mood: &str,
    note: Option<&str>,
) -> Result<(MoodCheckIn, bool)> {
    if let Some(mut existing) = mood_on(conn, couple_id, date)? {
        conn.execute(
            "UPDATE mood_check_ins SET mood = ?1, note = ?2 WHERE id = ?3",
            params![mood, note, existing.id],
        )?;

        existing.mood = mood.to_string();
        existing.note = note.map(str::to_string);
        return Ok((existing, true));
    }

    let check_in = MoodCheckIn {
        id: new_id(),
        couple_id: couple_id.to_string(),
        date,
        mood: mood.to_string(),
        note: note.map(str::to_string),
        created_at: Utc::now(),
    };

    conn.execute(
        "INSERT INTO mood_check_ins (id, couple_id, date, mood, note, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        params![
            check_in.id,
            couple_id,
            date,
            check_in.mood,
            check_in.note,
            check_in.created_at
        ],
    )?;

    Ok((check_in, false))
}

pub fn mood_on(conn: &Connection, couple_id: &str, date: NaiveDate) -> Result<Option<MoodCheckIn>> {
    conn.query_row(
        "SELECT id, couple_id, date, mood, note, created_at FROM mood_check_ins
         WHERE couple_id = ?1 AND date = ?2",
        params![couple_id, date],
        mood_from_row,
    )
    .optional()
}

pub fn latest_mood(conn: &Connection, couple_id: &str) -> Result<Option<MoodCheckIn>> {
    conn.query_row(
        "SELECT id, couple_id, date, mood, note, created_at FROM mood_check_ins
         WHERE couple_id = ?1
         ORDER BY date DESC
         LIMIT 1",
        params![couple_id],
        mood_from_row,
    )
    .optional()
}

pub fn moods_between(
    conn: &Connection,
    couple_id: &str,
    start: NaiveDate,
    end: NaiveDate,
) -> Result<Vec<MoodCheckIn>> {
    let mut stmt = conn.prepare(
        "SELECT id, couple_id, date, mood, note, created_at FROM mood_check_ins
         WHERE couple_id = ?1 AND date >= ?2 AND date <= ?3
         ORDER BY date",
    )?;

    stmt.query_map(params![couple_id, start, end], mood_from_row)?
        .collect()
}
