use chrono::{DateTime, Utc};
use rusqlite::{Connection, OptionalExtension, Result, Row, params, types::Type};
use serde::{Deserialize, Serialize};
use tempo_cycle::CyclePhase;

use super::new_id;

/// Candidates the daily card picks its article from.
pub const ARTICLE_CANDIDATES: i64 = 10;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Article {
    pub id: String,
    pub phase: CyclePhase,
    pub title: String,
    pub content: String,
    pub summary: String,
    pub read_time: i64,
    pub published: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PhasePreferences {
    pub id: String,
    pub couple_id: String,
    pub phase: CyclePhase,
    pub smart_moves: Vec<String>,
    pub avoidances: Vec<String>,
    pub updated_at: DateTime<Utc>,
}

fn phase_column(row: &Row, index: &str) -> Result<CyclePhase> {
    let raw: String = row.get(index)?;

    raw.parse().map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(0, Type::Text, Box::new(e))
    })
}

fn json_list_column(row: &Row, index: &str) -> Result<Vec<String>> {
    let raw: String = row.get(index)?;

    serde_json::from_str(&raw)
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(0, Type::Text, Box::new(e)))
}

fn article_from_row(row: &Row) -> Result<Article> {
    Ok(Article {
        id: row.get("id")?,
        phase: phase_column(row, "phase")?,
        title: row.get("title")?,
        content: row.get("content")?,
        summary: row.get("summary")?,
        read_time: row.get("read_time")?,
        published: row.get("published")?,
        created_at: row.get("created_at")?,
        updated_at: row.get("updated_at")?,
    })
}

fn preferences_from_row(row: &Row) -> Result<PhasePreferences> {
    Ok(PhasePreferences {
        id: row.get("id")?,
        couple_id: row.get("couple_id")?,
        phase: phase_column(row, "phase")?,
        smart_moves: json_list_column(row, "smart_moves")?,
        avoidances: json_list_column(row, "avoidances")?,
        updated_at: row.get("updated_at")?,
    })
}

pub fn find_article(conn: &Connection, article_id: &str) -> Result<Option<Article>> {
    conn.query_row(
        "SELECT id, phase, title, content, summary, read_time, published, created_at, updated_at
         FROM articles WHERE id = ?1",
        params![article_id],
        article_from_row,
    )
    .optional()
}

pub fn published_articles(conn: &Connection, phase: CyclePhase) -> Result<Vec<Article>> {
    let mut stmt = conn.prepare(
        "SELECT id, phase, title, content, summary, read_time, published, created_at, updated_at
         FROM articles WHERE phase = ?1 AND published = 1
         LIMIT ?2",
    )?;

    stmt.query_map(params![phase.to_string(), ARTICLE_CANDIDATES], article_from_row)?
        .collect()
}

/// Inserts or replaces an article by id.
pub fn upsert_article(conn: &Connection, article: &Article) -> Result<()> {
    conn.execute(
        "INSERT INTO articles (id, phase, title, content, summary, read_time, published,
             created_at, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
         ON CONFLICT (id) DO UPDATE SET
             phase = excluded.phase,
             title = excluded.title,
             content = excluded.content,
             summary = excluded.summary,
             read_time = excluded.read_time,
             published = excluded.published,
             updated_at = excluded.updated_at",
        params![
            article.id,
            article.phase.to_string(),
            article.title,
            article.content,
            article.summary,
            article.read_time,
            article.published,
            article.created_at,
            article.updated_at,
        ],
    )?;

    Ok(())
}

pub fn find_preferences(
    conn: &Connection,
    couple_id: &str,
    phase: CyclePhase,
) -> Result<Option<PhasePreferences>> {
    conn.query_row(
        "SELECT id, couple_id, phase, smart_moves, avoidances, updated_at
         FROM phase_preferences WHERE couple_id = ?1 AND phase = ?2",
        params![couple_id, phase.to_string()],
        preferences_from_row,
    )
    .optional()
}

pub fn upsert_preferences(
    conn: &Connection,
    couple_id: &str,
    phase: CyclePhase,
    smart_moves: &[String],
    avoidances: &[String],
) -> Result<PhasePreferences> {
    let to_json = |list: &[String]| {
        serde_json::to_string(list).map_err(|e| rusqlite::Error::ToSqlConversionFailure(Box::new(e)))
    };
    let now = Utc::now();

    conn.execute(
        "INSERT INTO phase_preferences (id, couple_id, phase, smart_moves, avoidances,
             created_at, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?6)
         ON CONFLICT (couple_id, phase) DO UPDATE SET
             smart_moves = excluded.smart_moves,
             avoidances = excluded.avoidances,
             updated_at = excluded.updated_at",
        params![
            new_id(),
            couple_id,
            phase.to_string(),
            to_json(smart_moves)?,
            to_json(avoidances)?,
            now,
        ],
    )?;

    find_preferences(conn, couple_id, phase)?.ok_or(rusqlite::Error::QueryReturnedNoRows)
}
