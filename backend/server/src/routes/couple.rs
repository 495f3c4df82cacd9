use std::sync::Arc;

use axum::{Json, extract::State};
use serde::Deserialize;
use serde_json::{Value, json};
use tempo_cycle::{CycleSettings, DEFAULT_CYCLE_LENGTH, DEFAULT_PERIOD_LENGTH, today};
use tracing::info;

use crate::{
    auth::{AuthUser, Role},
    error::AppError,
    state::State as AppState,
    store::couples::{
        CoupleUpdate, NewCouple, fill_role, find_couple, find_couple_by_invite,
        find_couple_for_user, insert_couple, set_invite_code, update_couple,
    },
    utils::{Payload, generate_invite_code, parse_date},
};

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaveCouple {
    cycle_length: Option<i64>,
    period_length: Option<i64>,
    role: Option<String>,
    last_period_start: Option<String>,
    partner_name: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JoinCouple {
    invite_code: Option<String>,
    role: Option<String>,
}

fn parse_role(raw: Option<&str>, message: &str) -> Result<Role, AppError> {
    raw.and_then(|role| role.trim().parse().ok())
        .ok_or_else(|| AppError::bad_request(message))
}

fn role_taken(role: Role) -> AppError {
    AppError::bad_request(format!("The '{role}' role is already filled in this couple"))
}

pub async fn get_couple_handler(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
) -> Result<Json<Value>, AppError> {
    let user_id = auth.user.id.clone();
    let couple = state
        .db(move |conn| Ok(find_couple_for_user(conn, &user_id)?))
        .await?;

    let body = match couple {
        Some(couple) => {
            let role = couple.role_of(&auth.user.id);
            json!({ "couple": couple, "role": role })
        }
        None => json!({ "couple": null }),
    };

    Ok(Json(body))
}

/// Creates the caller's couple, or updates it when they already have one.
pub async fn save_couple_handler(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
    Payload(payload): Payload<SaveCouple>,
) -> Result<Json<Value>, AppError> {
    let role = parse_role(
        payload.role.as_deref(),
        "Role is required and must be 'him' or 'her'",
    )?;
    let settings = CycleSettings::new(
        payload.cycle_length.unwrap_or(DEFAULT_CYCLE_LENGTH),
        payload.period_length.unwrap_or(DEFAULT_PERIOD_LENGTH),
    )?;
    let last_period_start = payload
        .last_period_start
        .as_deref()
        .map(parse_date)
        .transpose()?;
    let partner_name = payload.partner_name;
    let user_id = auth.user.id.clone();

    let couple = state
        .db(move |conn| {
            let tx = conn.transaction()?;

            let couple_id = match find_couple_for_user(&tx, &user_id)? {
                Some(existing) => {
                    if existing.holder_of(role).is_some_and(|holder| holder != user_id) {
                        return Err(role_taken(role));
                    }

                    update_couple(
                        &tx,
                        &existing.id,
                        &CoupleUpdate {
                            user_id: &user_id,
                            role,
                            settings,
                            partner_name: partner_name.as_deref(),
                            last_period_start,
                        },
                    )?;

                    if existing.invite_code.is_none() {
                        set_invite_code(&tx, &existing.id, &generate_invite_code())?;
                    }

                    existing.id
                }
                None => {
                    let id = insert_couple(
                        &tx,
                        &NewCouple {
                            creator_id: &user_id,
                            role,
                            partner_name: partner_name.as_deref().unwrap_or_default(),
                            settings,
                            last_period_start: last_period_start.unwrap_or_else(today),
                            onboarding_complete: last_period_start.is_some(),
                            invite_code: &generate_invite_code(),
                        },
                    )?;

                    info!("Created couple {id} with {role} as creator");
                    id
                }
            };

            let couple = find_couple(&tx, &couple_id)?.ok_or(AppError::NoCouple)?;
            tx.commit()?;

            Ok(couple)
        })
        .await?;

    let role = couple.role_of(&auth.user.id);

    Ok(Json(json!({
        "inviteCode": couple.invite_code,
        "couple": couple,
        "role": role,
    })))
}

pub async fn join_couple_handler(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
    Payload(payload): Payload<JoinCouple>,
) -> Result<Json<Value>, AppError> {
    let invite_code = payload
        .invite_code
        .map(|code| code.trim().to_uppercase())
        .filter(|code| !code.is_empty())
        .ok_or_else(|| AppError::bad_request("Invite code is required"))?;
    let role = parse_role(payload.role.as_deref(), "Role must be 'him' or 'her'")?;
    let user_id = auth.user.id.clone();

    let couple = state
        .db(move |conn| {
            let tx = conn.transaction()?;

            let couple = find_couple_by_invite(&tx, &invite_code)?
                .ok_or(AppError::NotFound("Invalid invite code"))?;

            if find_couple_for_user(&tx, &user_id)?.is_some() {
                return Err(AppError::bad_request(
                    "You are already part of a couple profile",
                ));
            }

            if !fill_role(&tx, &couple.id, role, &user_id)? {
                return Err(role_taken(role));
            }

            let joined = find_couple(&tx, &couple.id)?.ok_or(AppError::NoCouple)?;
            tx.commit()?;

            Ok(joined)
        })
        .await?;

    info!("User {} joined couple {} as {role}", auth.user.id, couple.id);

    Ok(Json(json!({
        "success": true,
        "couple": couple,
        "role": role,
    })))
}
