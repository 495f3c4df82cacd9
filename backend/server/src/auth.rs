//! # Sessions and Roles
//!
//! Accounts are issued elsewhere; this API only reads the `session` table.
//!
//! - `Authorization: Bearer <token>` must match an unexpired session, otherwise 401
//! - A couple has two role slots, `her` and `him`, each held by at most one user
//! - Routes that only one side may call check the role and answer 403 on mismatch
use std::sync::Arc;

use axum::{
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts},
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumString};
use tracing::warn;

use crate::{
    error::{AppError, RoleRequired},
    state::State,
    store::{
        couples::{Couple, find_couple_for_user},
        users::{Session, User, find_session},
    },
};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, Display, EnumString)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Role {
    Her,
    Him,
}

/// Caller resolved from the bearer token.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub user: User,
    pub session: Session,
}

fn bearer_token(parts: &Parts) -> Option<String> {
    let value = parts.headers.get(AUTHORIZATION)?.to_str().ok()?;
    let token = value.strip_prefix("Bearer ")?.trim();

    if token.is_empty() {
        None
    } else {
        Some(token.to_string())
    }
}

impl FromRequestParts<Arc<State>> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<State>,
    ) -> Result<Self, Self::Rejection> {
        let token = bearer_token(parts).ok_or(AppError::Unauthorized)?;

        let found = state
            .db(move |conn| Ok(find_session(conn, &token, Utc::now())?))
            .await?;

        match found {
            Some((user, session)) => Ok(AuthUser { user, session }),
            None => {
                warn!("Rejected unknown or expired session");
                Err(AppError::Unauthorized)
            }
        }
    }
}

/// The caller's couple and the slot they hold in it.
#[derive(Debug, Clone)]
pub struct CoupleContext {
    pub couple: Couple,
    pub role: Option<Role>,
}

impl CoupleContext {
    pub fn new(couple: Couple, user_id: &str) -> Self {
        let role = couple.role_of(user_id);

        Self { couple, role }
    }

    pub fn require(&self, role: Role) -> Result<(), AppError> {
        if self.role == Some(role) {
            Ok(())
        } else {
            Err(AppError::Forbidden(RoleRequired(role)))
        }
    }
}

/// Couple for `user_id`, or [`AppError::NoCouple`] when onboarding never started.
pub async fn require_couple(state: &State, user_id: &str) -> Result<CoupleContext, AppError> {
    let owned = user_id.to_string();

    let couple = state
        .db(move |conn| Ok(find_couple_for_user(conn, &owned)?))
        .await?
        .ok_or(AppError::NoCouple)?;

    Ok(CoupleContext::new(couple, user_id))
}
