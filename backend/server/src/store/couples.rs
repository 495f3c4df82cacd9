use chrono::{DateTime, NaiveDate, Utc};
use rusqlite::{Connection, OptionalExtension, Result, Row, params};
use serde::Serialize;
use tempo_cycle::{CycleError, CycleSettings};

use super::new_id;
use crate::auth::Role;

const COUPLE_COLUMNS: &str = "id, user_id, her_user_id, him_user_id, partner_name, cycle_length, \
     period_length, last_period_start, onboarding_complete, notification_time, \
     cycle_tracking_shared, invite_code, created_at, updated_at";

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Couple {
    pub id: String,
    pub user_id: String,
    pub her_user_id: Option<String>,
    pub him_user_id: Option<String>,
    pub partner_name: String,
    pub cycle_length: i64,
    pub period_length: i64,
    pub last_period_start: NaiveDate,
    pub onboarding_complete: bool,
    pub notification_time: Option<String>,
    pub cycle_tracking_shared: bool,
    pub invite_code: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Couple {
    /// Role held by `user_id`. The creator of a half-linked couple holds no role.
    pub fn role_of(&self, user_id: &str) -> Option<Role> {
        if self.her_user_id.as_deref() == Some(user_id) {
            Some(Role::Her)
        } else if self.him_user_id.as_deref() == Some(user_id) {
            Some(Role::Him)
        } else {
            None
        }
    }

    pub fn holder_of(&self, role: Role) -> Option<&str> {
        match role {
            Role::Her => self.her_user_id.as_deref(),
            Role::Him => self.him_user_id.as_deref(),
        }
    }

    pub fn settings(&self) -> Result<CycleSettings, CycleError> {
        CycleSettings::new(self.cycle_length, self.period_length)
    }
}

pub struct NewCouple<'a> {
    pub creator_id: &'a str,
    pub role: Role,
    pub partner_name: &'a str,
    pub settings: CycleSettings,
    pub last_period_start: NaiveDate,
    pub onboarding_complete: bool,
    pub invite_code: &'a str,
}

/// Changes applied when the owner of an existing couple saves the profile again.
pub struct CoupleUpdate<'a> {
    pub user_id: &'a str,
    pub role: Role,
    pub settings: CycleSettings,
    pub partner_name: Option<&'a str>,
    pub last_period_start: Option<NaiveDate>,
}

fn couple_from_row(row: &Row) -> Result<Couple> {
    Ok(Couple {
        id: row.get("id")?,
        user_id: row.get("user_id")?,
        her_user_id: row.get("her_user_id")?,
        him_user_id: row.get("him_user_id")?,
        partner_name: row.get("partner_name")?,
        cycle_length: row.get("cycle_length")?,
        period_length: row.get("period_length")?,
        last_period_start: row.get("last_period_start")?,
        onboarding_complete: row.get("onboarding_complete")?,
        notification_time: row.get("notification_time")?,
        cycle_tracking_shared: row.get("cycle_tracking_shared")?,
        invite_code: row.get("invite_code")?,
        created_at: row.get("created_at")?,
        updated_at: row.get("updated_at")?,
    })
}

pub fn find_couple(conn: &Connection, couple_id: &str) -> Result<Option<Couple>> {
    conn.query_row(
        &format!("SELECT {COUPLE_COLUMNS} FROM couple WHERE id = ?1"),
        params![couple_id],
        couple_from_row,
    )
    .optional()
}

/// Couple the user created or holds a role in.
pub fn find_couple_for_user(conn: &Connection, user_id: &str) -> Result<Option<Couple>> {
    conn.query_row(
        &format!(
            "SELECT {COUPLE_COLUMNS} FROM couple
             WHERE her_user_id = ?1 OR him_user_id = ?1 OR user_id = ?1
             ORDER BY (her_user_id = ?1 OR him_user_id = ?1) DESC, created_at
             LIMIT 1"
        ),
        params![user_id],
        couple_from_row,
    )
    .optional()
}

pub fn find_couple_by_invite(conn: &Connection, invite_code: &str) -> Result<Option<Couple>> {
    conn.query_row(
        &format!("SELECT {COUPLE_COLUMNS} FROM couple WHERE invite_code = ?1"),
        params![invite_code],
        couple_from_row,
    )
    .optional()
}

pub fn insert_couple(conn: &Connection, couple: &NewCouple) -> Result<String> {
    let id = new_id();
    let now = Utc::now();
    let (her, him) = match couple.role {
        Role::Her => (Some(couple.creator_id), None),
        Role::Him => (None, Some(couple.creator_id)),
    };

    conn.execute(
        "INSERT INTO couple (id, user_id, her_user_id, him_user_id, partner_name, cycle_length,
             period_length, last_period_start, onboarding_complete, invite_code, created_at,
             updated_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?11)",
        params![
            id,
            couple.creator_id,
            her,
            him,
            couple.partner_name,
            couple.settings.cycle_length(),
            couple.settings.period_length(),
            couple.last_period_start,
            couple.onboarding_complete,
            couple.invite_code,
            now,
        ],
    )?;

    Ok(id)
}

/// Saves lengths and the caller's role slot. A new anchor also completes onboarding.
pub fn update_couple(conn: &Connection, couple_id: &str, update: &CoupleUpdate) -> Result<()> {
    let role_column = role_column(update.role);

    conn.execute(
        &format!(
            "UPDATE couple SET
                 cycle_length = ?1,
                 period_length = ?2,
                 {role_column} = ?3,
                 partner_name = COALESCE(?4, partner_name),
                 last_period_start = COALESCE(?5, last_period_start),
                 onboarding_complete = onboarding_complete OR ?6,
                 updated_at = ?7
             WHERE id = ?8"
        ),
        params![
            update.settings.cycle_length(),
            update.settings.period_length(),
            update.user_id,
            update.partner_name,
            update.last_period_start,
            update.last_period_start.is_some(),
            Utc::now(),
            couple_id,
        ],
    )?;

    Ok(())
}

pub fn set_invite_code(conn: &Connection, couple_id: &str, invite_code: &str) -> Result<()> {
    conn.execute(
        "UPDATE couple SET invite_code = ?1, updated_at = ?2 WHERE id = ?3",
        params![invite_code, Utc::now(), couple_id],
    )?;

    Ok(())
}

/// Claims the empty `role` slot for `user_id`. Returns false when the slot is already taken.
pub fn fill_role(conn: &Connection, couple_id: &str, role: Role, user_id: &str) -> Result<bool> {
    let role_column = role_column(role);

    let changed = conn.execute(
        &format!(
            "UPDATE couple SET {role_column} = ?1, updated_at = ?2
             WHERE id = ?3 AND {role_column} IS NULL"
        ),
        params![user_id, Utc::now(), couple_id],
    )?;

    Ok(changed == 1)
}

/// Last-writer-wins write of the cached anchor date.
pub fn update_last_period_start(conn: &Connection, couple_id: &str, date: NaiveDate) -> Result<()> {
    conn.execute(
        "UPDATE couple SET last_period_start = ?1, updated_at = ?2
         WHERE id = ?3 AND last_period_start <> ?1",
        params![date, Utc::now(), couple_id],
    )?;

    Ok(())
}

pub fn insert_cycle_update(conn: &Connection, couple_id: &str, period_start: NaiveDate) -> Result<String> {
    let id = new_id();

    conn.execute(
        "INSERT INTO cycle_updates (id, couple_id, period_start, created_at) VALUES (?1, ?2, ?3, ?4)",
        params![id, couple_id, period_start, Utc::now()],
    )?;

    Ok(id)
}

fn role_column(role: Role) -> &'static str {
    match role {
        Role::Her => "her_user_id",
        Role::Him => "him_user_id",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{database::migrate, store::users::create_user};

    fn setup() -> (Connection, String, String) {
        let conn = Connection::open_in_memory().unwrap();
        migrate(&conn).unwrap();
        let her = create_user(&conn, "her@example.com", None).unwrap().id;
        let him = create_user(&conn, "him@example.com", None).unwrap().id;
        (conn, her, him)
    }

    fn new_couple(creator_id: &str) -> NewCouple<'_> {
        NewCouple {
            creator_id,
            role: Role::Her,
            partner_name: "",
            settings: CycleSettings::default(),
            last_period_start: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            onboarding_complete: true,
            invite_code: "ABC234",
        }
    }

    #[test]
    fn test_insert_and_find() {
        let (conn, her, him) = setup();
        let id = insert_couple(&conn, &new_couple(&her)).unwrap();

        let couple = find_couple_for_user(&conn, &her).unwrap().unwrap();
        assert_eq!(couple.id, id);
        assert_eq!(couple.role_of(&her), Some(Role::Her));
        assert_eq!(couple.role_of(&him), None);
        assert!(couple.cycle_tracking_shared);

        let by_code = find_couple_by_invite(&conn, "ABC234").unwrap().unwrap();
        assert_eq!(by_code.id, id);
        assert!(find_couple_for_user(&conn, &him).unwrap().is_none());
    }

    #[test]
    fn test_fill_role_only_once() {
        let (conn, her, him) = setup();
        let id = insert_couple(&conn, &new_couple(&her)).unwrap();

        assert!(fill_role(&conn, &id, Role::Him, &him).unwrap());
        assert!(!fill_role(&conn, &id, Role::Him, &her).unwrap());
        assert!(!fill_role(&conn, &id, Role::Her, &him).unwrap());

        let couple = find_couple(&conn, &id).unwrap().unwrap();
        assert_eq!(couple.role_of(&him), Some(Role::Him));
        assert_eq!(couple.holder_of(Role::Her), Some(her.as_str()));
    }

    #[test]
    fn test_update_keeps_anchor_unless_given() {
        let (conn, her, _) = setup();
        let mut pending = new_couple(&her);
        pending.onboarding_complete = false;
        let id = insert_couple(&conn, &pending).unwrap();

        let update = CoupleUpdate {
            user_id: &her,
            role: Role::Her,
            settings: CycleSettings::new(30, 6).unwrap(),
            partner_name: None,
            last_period_start: None,
        };
        update_couple(&conn, &id, &update).unwrap();

        let couple = find_couple(&conn, &id).unwrap().unwrap();
        assert_eq!((couple.cycle_length, couple.period_length), (30, 6));
        assert_eq!(couple.last_period_start, pending.last_period_start);
        assert!(!couple.onboarding_complete);

        let anchor = NaiveDate::from_ymd_opt(2024, 2, 3).unwrap();
        update_couple(
            &conn,
            &id,
            &CoupleUpdate {
                last_period_start: Some(anchor),
                ..update
            },
        )
        .unwrap();

        let couple = find_couple(&conn, &id).unwrap().unwrap();
        assert_eq!(couple.last_period_start, anchor);
        assert!(couple.onboarding_complete);
    }
}
