//! # Routes
//!
//! Every route sits under `/api` and needs a bearer session.
//!
//! | Route | Method | Who |
//! | --- | --- | --- |
//! | `/api/user` | GET | any |
//! | `/api/couple` | GET, POST | any |
//! | `/api/couple/join` | POST | any |
//! | `/api/period-checkin` | POST | her |
//! | `/api/period-checkin` | GET | either role |
//! | `/api/mood-checkin` | POST | her |
//! | `/api/mood-checkin`, `/api/mood-checkin/today` | GET | either role |
//! | `/api/cycle-update` | POST | her |
//! | `/api/daily-card` | GET | either role |
//! | `/api/daily-card/enhanced` | GET | him |
//! | `/api/calendar` | GET | her |
//! | `/api/articles/{id}` | GET | any |
//! | `/api/phase-preferences` | PUT | her |
use std::sync::Arc;

use axum::{
    Router,
    routing::{get, post, put},
};

use crate::state::State;

pub mod cards;
pub mod check_ins;
pub mod content;
pub mod couple;
pub mod user;

pub fn api_routes() -> Router<Arc<State>> {
    Router::new()
        .route("/api/user", get(user::user_handler))
        .route(
            "/api/couple",
            get(couple::get_couple_handler).post(couple::save_couple_handler),
        )
        .route("/api/couple/join", post(couple::join_couple_handler))
        .route(
            "/api/period-checkin",
            get(check_ins::list_period_handler).post(check_ins::period_checkin_handler),
        )
        .route(
            "/api/mood-checkin",
            get(check_ins::latest_mood_handler).post(check_ins::mood_checkin_handler),
        )
        .route("/api/mood-checkin/today", get(check_ins::today_mood_handler))
        .route("/api/cycle-update", post(check_ins::cycle_update_handler))
        .route("/api/daily-card", get(cards::daily_card_handler))
        .route("/api/daily-card/enhanced", get(cards::enhanced_card_handler))
        .route("/api/calendar", get(cards::calendar_handler))
        .route("/api/articles/{id}", get(content::article_handler))
        .route("/api/phase-preferences", put(content::preferences_handler))
}
