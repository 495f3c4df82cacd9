use chrono::{DateTime, Duration, Utc};
use rand::{Rng, distr::Alphanumeric};
use rusqlite::{Connection, OptionalExtension, Result, Row, params};
use serde::Serialize;

use super::new_id;

const TOKEN_LENGTH: usize = 48;

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: String,
    pub email: String,
    pub name: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    pub id: String,
    #[serde(skip)]
    pub token: String,
    pub expires_at: DateTime<Utc>,
}

fn user_from_row(row: &Row) -> Result<User> {
    Ok(User {
        id: row.get("id")?,
        email: row.get("email")?,
        name: row.get("name")?,
    })
}

pub fn find_user_by_email(conn: &Connection, email: &str) -> Result<Option<User>> {
    conn.query_row(
        "SELECT id, email, name FROM user WHERE email = ?1",
        params![email],
        user_from_row,
    )
    .optional()
}

pub fn create_user(conn: &Connection, email: &str, name: Option<&str>) -> Result<User> {
    let now = Utc::now();
    let user = User {
        id: new_id(),
        email: email.to_string(),
        name: name.map(str::to_string),
    };

    conn.execute(
        "INSERT INTO user (id, email, name, created_at, updated_at) VALUES (?1, ?2, ?3, ?4, ?4)",
        params![user.id, user.email, user.name, now],
    )?;

    Ok(user)
}

/// Issues a bearer token for `user_id` valid for `ttl`.
pub fn create_session(conn: &Connection, user_id: &str, ttl: Duration) -> Result<Session> {
    let now = Utc::now();
    let token: String = rand::rng()
        .sample_iter(&Alphanumeric)
        .take(TOKEN_LENGTH)
        .map(char::from)
        .collect();

    let session = Session {
        id: new_id(),
        token,
        expires_at: now + ttl,
    };

    conn.execute(
        "INSERT INTO session (id, user_id, token, expires_at, created_at, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?5)",
        params![session.id, user_id, session.token, session.expires_at, now],
    )?;

    Ok(session)
}

/// Resolves an unexpired session token to its user.
pub fn find_session(
    conn: &Connection,
    token: &str,
    now: DateTime<Utc>,
) -> Result<Option<(User, Session)>> {
    let found = conn
        .query_row(
            "SELECT u.id, u.email, u.name, s.id AS session_id, s.token, s.expires_at
             FROM session s JOIN user u ON u.id = s.user_id
             WHERE s.token = ?1",
            params![token],
            |row| {
                Ok((
                    user_from_row(row)?,
                    Session {
                        id: row.get("session_id")?,
                        token: row.get("token")?,
                        expires_at: row.get("expires_at")?,
                    },
                ))
            },
        )
        .optional()?;

    Ok(found.filter(|(_, session)| session.expires_at > now))
}
