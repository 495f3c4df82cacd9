use std::sync::Arc;

use axum::{
    Json,
    extract::{Query, State},
};
use serde::Deserialize;
use serde_json::{Value, json};
use tempo_cycle::{infer_last_period_start, today};
use tracing::{info, warn};

use crate::{
    auth::{AuthUser, Role, require_couple},
    error::AppError,
    state::State as AppState,
    store::{
        check_ins::{
            check_in_history, latest_mood, mood_on, period_check_in_on, period_check_ins_between,
            recent_period_check_ins, upsert_mood_check_in, upsert_period_check_in,
        },
        couples::{insert_cycle_update, update_last_period_start},
    },
    utils::{Payload, parse_date},
};

const DEFAULT_LIMIT: i64 = 100;

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PeriodCheckInPayload {
    is_active: Option<Value>,
    date: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PeriodQuery {
    date: Option<String>,
    start_date: Option<String>,
    end_date: Option<String>,
    limit: Option<String>,
}

#[derive(Deserialize)]
pub struct MoodPayload {
    mood: Option<String>,
    note: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CycleUpdatePayload {
    period_start: Option<String>,
}

/// Records one day of period tracking, then re-infers the period start from the stored history.
pub async fn period_checkin_handler(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
    Payload(payload): Payload<PeriodCheckInPayload>,
) -> Result<Json<Value>, AppError> {
    let is_active = match payload.is_active {
        Some(Value::Bool(is_active)) => is_active,
        _ => return Err(AppError::bad_request("isActive must be a boolean")),
    };
    let date = payload
        .date
        .ok_or_else(|| AppError::bad_request("Date is required"))?;
    let date = parse_date(&date)?;

    let context = require_couple(&state, &auth.user.id).await?;
    context.require(Role::Her)?;
    let couple = context.couple;

    let (check_in, updated, last_period_start) = state
        .db(move |conn| {
            let tx = conn.transaction()?;

            let (check_in, updated) = upsert_period_check_in(&tx, &couple.id, date, is_active)?;
            let history = check_in_history(&tx, &couple.id)?;

            let last_period_start = match infer_last_period_start(&history) {
                Some(start) => {
                    if start.truncated {
                        warn!(
                            "Period streak for couple {} runs past the history window, using {}",
                            couple.id, start.date
                        );
                    }
                    if couple.cycle_tracking_shared {
                        update_last_period_start(&tx, &couple.id, start.date)?;
                    }
                    start.date
                }
                None => couple.last_period_start,
            };

            tx.commit()?;
            Ok((check_in, updated, last_period_start))
        })
        .await?;

    Ok(Json(json!({
        "success": true,
        "checkIn": check_in,
        "updated": updated,
        "lastPeriodStart": last_period_start,
    })))
}

pub async fn list_period_handler(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
    Query(query): Query<PeriodQuery>,
) -> Result<Json<Value>, AppError> {
    let couple_id = require_couple(&state, &auth.user.id).await?.couple.id;

    if let Some(date) = query.date {
        let date = parse_date(&date)?;
        let check_in = state
            .db(move |conn| Ok(period_check_in_on(conn, &couple_id, date)?))
            .await?;

        return Ok(Json(json!({ "checkIn": check_in })));
    }

    let check_ins = match (query.start_date, query.end_date) {
        (Some(start), Some(end)) => {
            let (start, end) = (parse_date(&start)?, parse_date(&end)?);

            state
                .db(move |conn| Ok(period_check_ins_between(conn, &couple_id, start, end)?))
                .await?
        }
        _ => {
            let limit = match query.limit {
                Some(raw) => raw
                    .trim()
                    .parse::<i64>()
                    .ok()
                    .filter(|limit| *limit > 0)
                    .ok_or_else(|| AppError::bad_request("limit must be a positive integer"))?,
                None => DEFAULT_LIMIT,
            };

            state
                .db(move |conn| Ok(recent_period_check_ins(conn, &couple_id, limit)?))
                .await?
        }
    };

    Ok(Json(json!({ "checkIns": check_ins })))
}

/// Saves today's mood, replacing any earlier entry for the day.
pub async fn mood_checkin_handler(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
    Payload(payload): Payload<MoodPayload>,
) -> Result<Json<Value>, AppError> {
    let mood = payload
        .mood
        .map(|mood| mood.trim().to_string())
        .filter(|mood| !mood.is_empty())
        .ok_or_else(|| AppError::bad_request("Mood is required"))?;
    let note = payload.note.filter(|note| !note.is_empty());

    let context = require_couple(&state, &auth.user.id).await?;
    context.require(Role::Her)?;
    let couple_id = context.couple.id;

    let (check_in, updated) = state
        .db(move |conn| {
            Ok(upsert_mood_check_in(
                conn,
                &couple_id,
                today(),
                &mood,
                note.as_deref(),
            )?)
        })
        .await?;

    Ok(Json(json!({
        "success": true,
        "checkIn": check_in,
        "updated": updated,
    })))
}

pub async fn latest_mood_handler(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
) -> Result<Json<Value>, AppError> {
    let couple_id = require_couple(&state, &auth.user.id).await?.couple.id;

    let check_in = state
        .db(move |conn| Ok(latest_mood(conn, &couple_id)?))
        .await?;

    Ok(Json(json!({ "checkIn": check_in })))
}

pub async fn today_mood_handler(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
) -> Result<Json<Value>, AppError> {
    let couple_id = require_couple(&state, &auth.user.id).await?.couple.id;

    let check_in = state
        .db(move |conn| Ok(mood_on(conn, &couple_id, today())?))
        .await?;

    Ok(Json(json!({ "checkIn": check_in })))
}

/// Logs an explicit period start and moves the shared anchor to it.
pub async fn cycle_update_handler(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
    Payload(payload): Payload<CycleUpdatePayload>,
) -> Result<Json<Value>, AppError> {
    let period_start = payload
        .period_start
        .ok_or_else(|| AppError::bad_request("Period start date is required"))?;
    let period_start = parse_date(&period_start)?;

    let context = require_couple(&state, &auth.user.id).await?;
    context.require(Role::Her)?;
    let couple = context.couple;

    let update_id = state
        .db(move |conn| {
            let tx = conn.transaction()?;

            let id = insert_cycle_update(&tx, &couple.id, period_start)?;
            if couple.cycle_tracking_shared {
                update_last_period_start(&tx, &couple.id, period_start)?;
            }

            tx.commit()?;
            Ok(id)
        })
        .await?;

    info!("Logged cycle update {update_id} starting {period_start}");

    Ok(Json(json!({
        "success": true,
        "cycleUpdate": {
            "id": update_id,
            "periodStart": period_start,
        },
    })))
}
