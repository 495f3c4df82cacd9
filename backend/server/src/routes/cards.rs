use std::{str::FromStr, sync::Arc};

use axum::{
    Json,
    extract::{Query, State},
};
use chrono::Datelike;
use rand::seq::IndexedRandom;
use serde::Deserialize;
use serde_json::{Value, json};
use tempo_cycle::today;

use crate::{
    auth::{AuthUser, Role, require_couple},
    cards::{Calendar, DailyCard, calendar, daily_card, enhanced_card, month_bounds},
    error::AppError,
    state::State as AppState,
    store::{
        check_ins::{mood_on, moods_between, period_check_ins_between},
        content::{find_preferences, published_articles},
    },
};

#[derive(Deserialize)]
pub struct CalendarQuery {
    year: Option<String>,
    month: Option<String>,
}

fn parse_number<T: FromStr>(raw: Option<String>, default: T, name: &str) -> Result<T, AppError> {
    match raw {
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|_| AppError::bad_request(format!("{name} must be a number"))),
        None => Ok(default),
    }
}

pub async fn daily_card_handler(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
) -> Result<Json<DailyCard>, AppError> {
    let couple = require_couple(&state, &auth.user.id).await?.couple;
    if !couple.onboarding_complete {
        return Err(AppError::OnboardingIncomplete);
    }

    let settings = couple.settings()?;
    let date = today();
    let info = settings.position(couple.last_period_start, date);

    let (preferences, articles) = state
        .db(move |conn| {
            let preferences = find_preferences(conn, &couple.id, info.phase)?;
            let articles = published_articles(conn, info.phase)?;

            Ok((preferences, articles))
        })
        .await?;

    let article = articles.choose(&mut rand::rng());

    Ok(Json(daily_card(date, &info, preferences.as_ref(), article)))
}

/// Him's view of today, read through the mood she logged.
pub async fn enhanced_card_handler(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
) -> Result<Json<Value>, AppError> {
    let context = require_couple(&state, &auth.user.id).await?;
    context.require(Role::Him)?;

    let couple = context.couple;
    let settings = couple.settings()?;
    let date = today();

    let found = state
        .db(move |conn| {
            let Some(mood) = mood_on(conn, &couple.id, date)? else {
                return Ok(None);
            };

            Ok(Some((settings.position(couple.last_period_start, date), mood)))
        })
        .await?;

    let card = found.map(|(info, mood)| enhanced_card(date, &info, &mood));

    Ok(Json(json!({ "enhancedCard": card })))
}

pub async fn calendar_handler(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
    Query(query): Query<CalendarQuery>,
) -> Result<Json<Calendar>, AppError> {
    let context = require_couple(&state, &auth.user.id).await?;
    context.require(Role::Her)?;

    let date = today();
    let year = parse_number(query.year, date.year(), "year")?;
    let month = parse_number(query.month, date.month(), "month")?;
    let (first, last) = month_bounds(year, month)?;

    let couple = context.couple;
    let settings = couple.settings()?;

    let anchor = couple.last_period_start;

    let (moods, periods) = state
        .db(move |conn| {
            let moods = moods_between(conn, &couple.id, first, last)?;
            let periods = period_check_ins_between(conn, &couple.id, first, last)?;

            Ok((moods, periods))
        })
        .await?;

    let view = calendar(year, month, settings, anchor, date, &moods, &periods)?;

    Ok(Json(view))
}
