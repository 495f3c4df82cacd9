//! # Cycle Core
//!
//! Pure cycle arithmetic shared by every route that needs to know where a couple is in the cycle.
//! Nothing in this crate touches storage or the clock except [`today`].
//!
//!
//!
//! ## Phase Calculator
//!
//! Maps an anchor date (the most recent period start), a cycle length and a period length onto
//! a [`CycleInfo`]:
//!
//! - **dayOfCycle**: 1-based, wraps modulo the cycle length
//! - **phase**: menstrual, follicular, ovulation or luteal
//! - **phaseDay**: 1-based position inside the phase
//! - **daysUntilNextPeriod**: counts today, so day 1 of a 28 day cycle has 28 left
//!
//! Phase boundaries are fixed ratios of the cycle length. The ovulation window is always the five
//! days centered on `cycleLength / 2`. Real hormonal phases do not scale linearly with cycle
//! length; this is a deliberate simplification and not configurable per couple.
//!
//! ```text
//! 28 day cycle, 5 day period
//!
//! day   1 ....... 5 | 6 ........... 12 | 13 ..... 16 | 17 ............. 28
//!       menstrual   | follicular       | ovulation   | luteal
//! ```
//!
//!
//!
//! ## Period-Start Inferencer
//!
//! The stored anchor on a couple can drift when check-ins are logged without going through the
//! cycle update path. [`infer_last_period_start`] recomputes it from raw check-in history, newest
//! first, looking at no more than [`HISTORY_WINDOW`] records.
//!
//!
//!
//! ## Notes
//! - Dates are [`chrono::NaiveDate`] everywhere, so time-of-day is gone before any arithmetic.
//! - A target before the anchor is allowed. Whole cycles are projected backwards, which is what the
//!   calendar needs for days of a month that precede a mid-month anchor.

pub mod calculator;
pub mod error;
pub mod history;
pub mod phases;

pub use calculator::{
    CycleInfo, CyclePhase, CycleSettings, DEFAULT_CYCLE_LENGTH, DEFAULT_PERIOD_LENGTH,
    calculate_cycle_info, today,
};
pub use error::CycleError;
pub use history::{CheckInRecord, HISTORY_WINDOW, PeriodStart, infer_last_period_start};
pub use phases::{Mood, MoodInterpretation, PhaseContext, mood_interpretation, phase_context};
