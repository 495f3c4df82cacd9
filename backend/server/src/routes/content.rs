use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, State},
};
use serde::Deserialize;
use serde_json::{Value, json};
use tempo_cycle::CyclePhase;

use crate::{
    auth::{AuthUser, Role, require_couple},
    error::AppError,
    state::State as AppState,
    store::content::{Article, find_article, upsert_preferences},
    utils::Payload,
};

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PreferencesPayload {
    phase: Option<String>,
    #[serde(default)]
    smart_moves: Vec<String>,
    #[serde(default)]
    avoidances: Vec<String>,
}

pub async fn article_handler(
    State(state): State<Arc<AppState>>,
    _auth: AuthUser,
    Path(article_id): Path<String>,
) -> Result<Json<Article>, AppError> {
    let article = state
        .db(move |conn| Ok(find_article(conn, &article_id)?))
        .await?
        .ok_or(AppError::NotFound("Article not found"))?;

    Ok(Json(article))
}

/// Replaces her personalised moves and avoidances for one phase.
pub async fn preferences_handler(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
    Payload(payload): Payload<PreferencesPayload>,
) -> Result<Json<Value>, AppError> {
    let phase: CyclePhase = payload
        .phase
        .as_deref()
        .and_then(|phase| phase.trim().to_lowercase().parse().ok())
        .ok_or_else(|| {
            AppError::bad_request("Phase must be one of menstrual, follicular, ovulation, luteal")
        })?;

    let clean = |moves: Vec<String>| -> Vec<String> {
        moves
            .into_iter()
            .map(|item| item.trim().to_string())
            .filter(|item| !item.is_empty())
            .collect()
    };
    let smart_moves = clean(payload.smart_moves);
    let avoidances = clean(payload.avoidances);

    let context = require_couple(&state, &auth.user.id).await?;
    context.require(Role::Her)?;
    let couple_id = context.couple.id;

    let preferences = state
        .db(move |conn| {
            Ok(upsert_preferences(
                conn,
                &couple_id,
                phase,
                &smart_moves,
                &avoidances,
            )?)
        })
        .await?;

    Ok(Json(json!({ "success": true, "preferences": preferences })))
}
