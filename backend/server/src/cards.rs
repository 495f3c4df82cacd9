//! # Cards
//!
//! Assembles the read views from a computed [`CycleInfo`] plus stored rows. Nothing here touches
//! the database, so the handlers fetch first and then call in.
//!
//! ## Daily Card
//!
//! - Phase copy from [`phase_context`]
//! - Personalised smart moves replace the general ones when the stored list is non-empty
//! - At most one article summary, picked by the caller
//!
//! ## Enhanced Card
//!
//! - Only built when there is a mood for the day
//! - Unknown moods read as a plain sentence with the general moves
//!
//! ## Calendar
//!
//! - One entry per day of the month, cycle position projected from a single anchor
//! - Mood and period flags are `null` on days without a check-in
use std::collections::HashMap;

use chrono::{Datelike, Months, NaiveDate};
use serde::Serialize;
use tempo_cycle::{CycleInfo, CyclePhase, CycleSettings, mood_interpretation, phase_context};

use crate::{
    error::AppError,
    store::{
        check_ins::{MoodCheckIn, PeriodCheckIn},
        content::{Article, PhasePreferences},
    },
};

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ArticleSummary {
    pub id: String,
    pub title: String,
    pub summary: String,
    pub read_time: i64,
}

impl From<&Article> for ArticleSummary {
    fn from(article: &Article) -> Self {
        Self {
            id: article.id.clone(),
            title: article.title.clone(),
            summary: article.summary.clone(),
            read_time: article.read_time,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DailyCard {
    pub date: NaiveDate,
    pub phase: CyclePhase,
    pub phase_title: &'static str,
    pub day_of_cycle: i64,
    pub days_until_next_period: i64,
    pub what_is_happening: &'static str,
    pub common_misreads: &'static [&'static str],
    pub smart_moves: Vec<String>,
    pub article: Option<ArticleSummary>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MoodContext {
    pub interpretation: String,
    pub smart_moves: Vec<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EnhancedCard {
    pub date: NaiveDate,
    pub phase: CyclePhase,
    pub phase_title: &'static str,
    pub day_of_cycle: i64,
    pub mood: String,
    pub mood_note: Option<String>,
    pub mood_context: MoodContext,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CalendarDay {
    pub date: NaiveDate,
    pub day_of_month: u32,
    pub cycle_day: i64,
    pub phase: CyclePhase,
    pub mood: Option<String>,
    pub mood_note: Option<String>,
    pub is_period: Option<bool>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Calendar {
    pub year: i32,
    pub month: u32,
    pub current_cycle_day: i64,
    pub current_phase: CyclePhase,
    pub days: Vec<CalendarDay>,
}

fn owned(moves: &[&str]) -> Vec<String> {
    moves.iter().map(|m| m.to_string()).collect()
}

pub fn daily_card(
    date: NaiveDate,
    info: &CycleInfo,
    preferences: Option<&PhasePreferences>,
    article: Option<&Article>,
) -> DailyCard {
    let context = phase_context(info.phase);

    let smart_moves = match preferences {
        Some(preferences) if !preferences.smart_moves.is_empty() => {
            preferences.smart_moves.clone()
        }
        _ => owned(context.general_smart_moves),
    };

    DailyCard {
        date,
        phase: info.phase,
        phase_title: context.title,
        day_of_cycle: info.day_of_cycle,
        days_until_next_period: info.days_until_next_period,
        what_is_happening: context.what_is_happening,
        common_misreads: context.common_misreads,
        smart_moves,
        article: article.map(ArticleSummary::from),
    }
}

pub fn enhanced_card(date: NaiveDate, info: &CycleInfo, mood: &MoodCheckIn) -> EnhancedCard {
    let context = phase_context(info.phase);

    let mood_context = match mood_interpretation(info.phase, &mood.mood) {
        Some(known) => MoodContext {
            interpretation: known.interpretation.to_string(),
            smart_moves: owned(known.smart_moves),
        },
        None => MoodContext {
            interpretation: format!(
                "She's feeling {} during the {} phase.",
                mood.mood, info.phase
            ),
            smart_moves: owned(context.general_smart_moves),
        },
    };

    EnhancedCard {
        date,
        phase: info.phase,
        phase_title: context.title,
        day_of_cycle: info.day_of_cycle,
        mood: mood.mood.clone(),
        mood_note: mood.note.clone(),
        mood_context,
    }
}

/// First and last day of the month. Rejects months outside 1 to 12 and years chrono cannot hold.
pub fn month_bounds(year: i32, month: u32) -> Result<(NaiveDate, NaiveDate), AppError> {
    if !(1..=12).contains(&month) {
        return Err(AppError::bad_request("Month must be between 1 and 12"));
    }

    let out_of_range = || AppError::bad_request("Year is out of range");

    let first = NaiveDate::from_ymd_opt(year, month, 1).ok_or_else(out_of_range)?;
    let last = first
        .checked_add_months(Months::new(1))
        .and_then(|next| next.pred_opt())
        .ok_or_else(out_of_range)?;

    Ok((first, last))
}

pub fn calendar(
    year: i32,
    month: u32,
    settings: CycleSettings,
    anchor: NaiveDate,
    today: NaiveDate,
    moods: &[MoodCheckIn],
    periods: &[PeriodCheckIn],
) -> Result<Calendar, AppError> {
    let (first, last) = month_bounds(year, month)?;

    let moods: HashMap<NaiveDate, &MoodCheckIn> = moods.iter().map(|m| (m.date, m)).collect();
    let periods: HashMap<NaiveDate, bool> = periods.iter().map(|p| (p.date, p.is_active)).collect();

    let days = first
        .iter_days()
        .take_while(|date| *date <= last)
        .map(|date| {
            let info = settings.position(anchor, date);
            let mood = moods.get(&date);

            CalendarDay {
                date,
                day_of_month: date.day(),
                cycle_day: info.day_of_cycle,
                phase: info.phase,
                mood: mood.map(|m| m.mood.clone()),
                mood_note: mood.and_then(|m| m.note.clone()),
                is_period: periods.get(&date).copied(),
            }
        })
        .collect();

    let current = settings.position(anchor, today);

    Ok(Calendar {
        year,
        month,
        current_cycle_day: current.day_of_cycle,
        current_phase: current.phase,
        days,
    })
}
