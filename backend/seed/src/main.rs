//! # Seeding
//!
//! Local development helper for the Tempo database.
//!
//! - `articles <file>`: upserts a JSON array of articles
//! - `session <email>`: creates the user when missing and prints a fresh bearer token
use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use chrono::{Duration, Utc};
use clap::{Parser, Subcommand};
use serde::Deserialize;
use tempo_cycle::CyclePhase;
use tempo_server::{
    database::{Pool, init_pool},
    store::{
        content::{Article, upsert_article},
        users::{create_session, create_user, find_user_by_email},
    },
};
use tracing::info;
use tracing_subscriber::{EnvFilter, fmt};

const MAX_SESSION_DAYS: i64 = 365;

#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Args {
    /// SQLite file to seed.
    #[arg(long, env = "DATABASE_PATH", default_value = "./tempo.db")]
    database: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Load articles from a JSON array.
    Articles { file: PathBuf },

    /// Print a bearer token for `email`, creating the user if needed.
    Session {
        email: String,

        #[arg(long)]
        name: Option<String>,

        #[arg(
            long,
            default_value_t = 30,
            value_parser = clap::value_parser!(i64).range(1..=MAX_SESSION_DAYS)
        )]
        days: i64,
    },
}

#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
struct SeedArticle {
    id: String,
    phase: CyclePhase,
    title: String,
    content: String,
    summary: String,
    #[serde(default = "default_read_time")]
    read_time: i64,
    #[serde(default = "default_published")]
    published: bool,
}

fn default_read_time() -> i64 {
    3
}

fn default_published() -> bool {
    true
}

impl From<SeedArticle> for Article {
    fn from(seed: SeedArticle) -> Self {
        let now = Utc::now();

        Article {
            id: seed.id,
            phase: seed.phase,
            title: seed.title,
            content: seed.content,
            summary: seed.summary,
            read_time: seed.read_time,
            published: seed.published,
            created_at: now,
            updated_at: now,
        }
    }
}

fn load_articles(pool: &Pool, raw: &str) -> Result<usize> {
    let articles: Vec<SeedArticle> = serde_json::from_str(raw).context("Invalid article JSON")?;
    let count = articles.len();

    let mut conn = pool.get()?;
    let tx = conn.transaction()?;
    for article in articles {
        upsert_article(&tx, &Article::from(article))?;
    }
    tx.commit()?;

    Ok(count)
}

fn issue_session(pool: &Pool, email: &str, name: Option<&str>, days: i64) -> Result<String> {
    let conn = pool.get()?;

    let user = match find_user_by_email(&conn, email)? {
        Some(user) => user,
        None => {
            info!("Creating user {email}");
            create_user(&conn, email, name)?
        }
    };

    let session = create_session(&conn, &user.id, Duration::days(days))?;

    Ok(session.token)
}

fn main() -> Result<()> {
    fmt().with_env_filter(EnvFilter::from_default_env()).init();

    let args = Args::parse();
    let database = args
        .database
        .strip_prefix("file:")
        .unwrap_or(args.database.as_str());
    let pool = init_pool(Path::new(database), 1)?;

    match args.command {
        Command::Articles { file } => {
            let raw = fs::read_to_string(&file)
                .with_context(|| format!("Failed to read {}", file.display()))?;
            let count = load_articles(&pool, &raw)?;

            info!("Loaded {count} articles from {}", file.display());
        }
        Command::Session { email, name, days } => {
            let token = issue_session(&pool, &email, name.as_deref(), days)?;

            println!("{token}");
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;
    use tempfile::TempDir;

    use super::*;

    fn pool(dir: &TempDir) -> Pool {
        init_pool(&dir.path().join("seed.db"), 1).unwrap()
    }

    #[test]
    fn test_cli_definition() {
        Args::command().debug_assert();
    }

    #[test]
    fn test_session_days_are_bounded() {
        let parsed = Args::try_parse_from(["tempo-seed", "session", "her@example.com"]).unwrap();
        assert!(matches!(parsed.command, Command::Session { days: 30, .. }));

        for days in ["0", "-1", "366", "9223372036854775807"] {
            let result = Args::try_parse_from([
                "tempo-seed",
                "session",
                "her@example.com",
                "--days",
                days,
            ]);

            assert!(result.is_err(), "{days}");
        }
    }

    #[test]
    fn test_load_articles_with_defaults() {
        let dir = TempDir::new().unwrap();
        let pool = pool(&dir);

        let raw = r#"[
            {"id": "a1", "phase": "luteal", "title": "T", "content": "C", "summary": "S"},
            {"id": "a2", "phase": "ovulation", "title": "T", "content": "C", "summary": "S",
             "readTime": 7, "published": false}
        ]"#;
        assert_eq!(load_articles(&pool, raw).unwrap(), 2);

        let conn = pool.get().unwrap();
        let first = tempo_server::store::content::find_article(&conn, "a1")
            .unwrap()
            .unwrap();
        assert_eq!(first.read_time, 3);
        assert!(first.published);

        assert!(load_articles(&pool, r#"[{"id": "x", "phase": "winter"}]"#).is_err());
    }

    #[test]
    fn test_session_reuses_user() {
        let dir = TempDir::new().unwrap();
        let pool = pool(&dir);

        let first = issue_session(&pool, "her@example.com", Some("Ana"), 1).unwrap();
        let second = issue_session(&pool, "her@example.com", None, 1).unwrap();
        assert_ne!(first, second);

        let conn = pool.get().unwrap();
        let user = find_user_by_email(&conn, "her@example.com").unwrap().unwrap();
        assert_eq!(user.name.as_deref(), Some("Ana"));
    }
}
