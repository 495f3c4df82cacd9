use chrono::{Local, NaiveDate};
use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumIter, EnumString};

use crate::error::CycleError;

pub const DEFAULT_CYCLE_LENGTH: i64 = 28;
pub const DEFAULT_PERIOD_LENGTH: i64 = 5;

/// Half-width of the ovulation window around `cycle_length / 2`.
const OVULATION_HALF_WIDTH: i64 = 2;

#[derive(
    Clone,
    Copy,
    Debug,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    EnumIter,
    AsRefStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum CyclePhase {
    Menstrual,
    Follicular,
    Ovulation,
    Luteal,
}

/// Where a target date sits in the cycle. Computed on demand, never stored.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CycleInfo {
    pub phase: CyclePhase,
    pub day_of_cycle: i64,
    pub phase_day: i64,
    pub days_until_next_period: i64,
}

/// Validated cycle and period lengths.
///
/// The period has to end before the ovulation window opens, otherwise the fixed phase boundaries
/// overlap and phase days stop making sense. That rules out cycles shorter than 6 days.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CycleSettings {
    cycle_length: i64,
    period_length: i64,
}

impl CycleSettings {
    pub fn new(cycle_length: i64, period_length: i64) -> Result<Self, CycleError> {
        let ovulation_start = cycle_length / 2 - OVULATION_HALF_WIDTH;

        if cycle_length <= 0
            || period_length <= 0
            || period_length >= cycle_length
            || period_length > ovulation_start
        {
            return Err(CycleError::InvalidConfiguration {
                cycle_length,
                period_length,
            });
        }

        Ok(Self {
            cycle_length,
            period_length,
        })
    }

    pub fn cycle_length(&self) -> i64 {
        self.cycle_length
    }

    pub fn period_length(&self) -> i64 {
        self.period_length
    }

    /// Last day of the follicular phase.
    pub fn ovulation_start(&self) -> i64 {
        self.cycle_length / 2 - OVULATION_HALF_WIDTH
    }

    /// Last day of the ovulation phase.
    pub fn ovulation_end(&self) -> i64 {
        self.cycle_length / 2 + OVULATION_HALF_WIDTH
    }

    pub fn position(&self, last_period_start: NaiveDate, target: NaiveDate) -> CycleInfo {
        let days_since = (target - last_period_start).num_days();

        // rem_euclid keeps targets before the anchor inside [1, cycle_length]
        let day_of_cycle = days_since.rem_euclid(self.cycle_length) + 1;
        let days_until_next_period = self.cycle_length - day_of_cycle + 1;

        let (phase, phase_day) = self.classify(day_of_cycle);

        CycleInfo {
            phase,
            day_of_cycle,
            phase_day,
            days_until_next_period,
        }
    }

    fn classify(&self, day_of_cycle: i64) -> (CyclePhase, i64) {
        let ovulation_start = self.ovulation_start();
        let ovulation_end = self.ovulation_end();

        if day_of_cycle <= self.period_length {
            (CyclePhase::Menstrual, day_of_cycle)
        } else if day_of_cycle <= ovulation_start {
            (CyclePhase::Follicular, day_of_cycle - self.period_length)
        } else if day_of_cycle <= ovulation_end {
            (CyclePhase::Ovulation, day_of_cycle - ovulation_start)
        } else {
            (CyclePhase::Luteal, day_of_cycle - ovulation_end)
        }
    }
}

impl Default for CycleSettings {
    fn default() -> Self {
        Self {
            cycle_length: DEFAULT_CYCLE_LENGTH,
            period_length: DEFAULT_PERIOD_LENGTH,
        }
    }
}

/// Cycle position of `target_date` (today when `None`) given the most recent period start.
pub fn calculate_cycle_info(
    last_period_start: NaiveDate,
    cycle_length: i64,
    period_length: i64,
    target_date: Option<NaiveDate>,
) -> Result<CycleInfo, CycleError> {
    let settings = CycleSettings::new(cycle_length, period_length)?;
    let target = target_date.unwrap_or_else(today);

    Ok(settings.position(last_period_start, target))
}

pub fn today() -> NaiveDate {
    Local::now().date_naive()
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use pretty_assertions::assert_eq;
    use strum::IntoEnumIterator;

    use super::*;

    fn date(year: i32, month: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(year, month, day).unwrap()
    }

    fn info(phase: CyclePhase, day: i64, phase_day: i64, until: i64) -> CycleInfo {
        CycleInfo {
            phase,
            day_of_cycle: day,
            phase_day,
            days_until_next_period: until,
        }
    }

    #[test]
    fn test_anchor_day_is_first_menstrual_day() {
        let anchor = date(2024, 1, 1);
        let result = calculate_cycle_info(anchor, 28, 5, Some(anchor)).unwrap();

        assert_eq!(result, info(CyclePhase::Menstrual, 1, 1, 28));
    }

    #[test]
    fn test_mid_cycle_is_ovulation() {
        let result = calculate_cycle_info(date(2024, 1, 1), 28, 5, Some(date(2024, 1, 15))).unwrap();

        assert_eq!(result, info(CyclePhase::Ovulation, 15, 3, 14));
    }

    #[test]
    fn test_wraps_after_full_cycle() {
        let result = calculate_cycle_info(date(2024, 1, 1), 28, 5, Some(date(2024, 1, 29))).unwrap();

        assert_eq!(result, info(CyclePhase::Menstrual, 1, 1, 28));
    }

    #[test]
    fn test_default_phase_layout() {
        let settings = CycleSettings::default();
        let anchor = date(2024, 3, 1);

        let phases: Vec<CyclePhase> = (0..28)
            .map(|offset| settings.position(anchor, anchor + chrono::Days::new(offset)).phase)
            .collect();

        let expected: Vec<CyclePhase> = std::iter::repeat_n(CyclePhase::Menstrual, 5)
            .chain(std::iter::repeat_n(CyclePhase::Follicular, 7))
            .chain(std::iter::repeat_n(CyclePhase::Ovulation, 4))
            .chain(std::iter::repeat_n(CyclePhase::Luteal, 12))
            .collect();

        assert_eq!(phases, expected);
    }

    #[test]
    fn test_phase_boundaries() {
        let settings = CycleSettings::default();
        let anchor = date(2024, 1, 1);
        let on_day = |day: u64| settings.position(anchor, anchor + chrono::Days::new(day - 1));

        assert_eq!(on_day(5), info(CyclePhase::Menstrual, 5, 5, 24));
        assert_eq!(on_day(6), info(CyclePhase::Follicular, 6, 1, 23));
        assert_eq!(on_day(12), info(CyclePhase::Follicular, 12, 7, 17));
        assert_eq!(on_day(13), info(CyclePhase::Ovulation, 13, 1, 16));
        assert_eq!(on_day(16), info(CyclePhase::Ovulation, 16, 4, 13));
        assert_eq!(on_day(17), info(CyclePhase::Luteal, 17, 1, 12));
        assert_eq!(on_day(28), info(CyclePhase::Luteal, 28, 12, 1));
    }

    #[test]
    fn test_target_before_anchor_projects_backwards() {
        let anchor = date(2024, 1, 15);

        // one day before the anchor is the last day of the previous cycle
        let before = calculate_cycle_info(anchor, 28, 5, Some(date(2024, 1, 14))).unwrap();
        assert_eq!(before, info(CyclePhase::Luteal, 28, 12, 1));

        // exactly one cycle before lands on day 1 again
        let cycle_before = calculate_cycle_info(anchor, 28, 5, Some(date(2023, 12, 18))).unwrap();
        assert_eq!(cycle_before, info(CyclePhase::Menstrual, 1, 1, 28));

        let far_before = calculate_cycle_info(anchor, 30, 4, Some(date(2023, 1, 1))).unwrap();
        let days_since = (date(2023, 1, 1) - anchor).num_days();
        assert_eq!(far_before.day_of_cycle, days_since.rem_euclid(30) + 1);
    }

    #[test]
    fn test_far_future_target() {
        let anchor = date(2000, 1, 1);
        let target = date(2100, 6, 30);
        let result = calculate_cycle_info(anchor, 31, 6, Some(target)).unwrap();

        assert_eq!(result.day_of_cycle, (target - anchor).num_days() % 31 + 1);
    }

    #[test]
    fn test_invariants_hold_across_configurations() {
        let anchor = date(2024, 2, 10);

        for cycle_length in 6..=45 {
            for period_length in 1..=(cycle_length / 2 - 2) {
                let settings = CycleSettings::new(cycle_length, period_length).unwrap();

                for offset in -100..=100 {
                    let target = anchor + chrono::Duration::days(offset);
                    let result = settings.position(anchor, target);

                    assert!((1..=cycle_length).contains(&result.day_of_cycle));
                    assert!((1..=cycle_length).contains(&result.days_until_next_period));
                    assert!(result.phase_day >= 1, "{cycle_length}/{period_length} @ {offset}");
                    assert_eq!(
                        result.day_of_cycle + result.days_until_next_period,
                        cycle_length + 1
                    );
                }
            }
        }
    }

    #[test]
    fn test_phases_are_contiguous_and_in_order() {
        let anchor = date(2024, 5, 1);

        for cycle_length in 6..=45 {
            for period_length in 1..=(cycle_length / 2 - 2) {
                let settings = CycleSettings::new(cycle_length, period_length).unwrap();
                let mut previous: Option<CycleInfo> = None;

                for offset in 0..cycle_length {
                    let current = settings.position(anchor, anchor + chrono::Duration::days(offset));

                    if let Some(previous) = previous {
                        let rank = |phase: CyclePhase| {
                            CyclePhase::iter().position(|p| p == phase).unwrap()
                        };
                        assert!(rank(current.phase) >= rank(previous.phase));

                        if current.phase == previous.phase {
                            assert_eq!(current.phase_day, previous.phase_day + 1);
                        } else {
                            assert_eq!(current.phase_day, 1);
                        }
                    }

                    previous = Some(current);
                }

                // the cycle always ends in the luteal phase and always contains ovulation
                assert_eq!(previous.map(|p| p.phase), Some(CyclePhase::Luteal));
            }
        }
    }

    #[test]
    fn test_same_inputs_same_output() {
        let anchor = date(2024, 7, 3);
        let target = Some(date(2024, 9, 17));

        assert_eq!(
            calculate_cycle_info(anchor, 29, 6, target),
            calculate_cycle_info(anchor, 29, 6, target)
        );
    }

    #[test]
    fn test_invalid_configurations() {
        let invalid = [
            (0, 5),
            (-28, 5),
            (28, 0),
            (28, -1),
            (10, 10),
            (10, 9),
            (28, 28),
            (28, 13),
            (5, 1),
        ];

        for (cycle_length, period_length) in invalid {
            assert_eq!(
                CycleSettings::new(cycle_length, period_length),
                Err(CycleError::InvalidConfiguration {
                    cycle_length,
                    period_length
                })
            );
        }

        assert!(calculate_cycle_info(date(2024, 1, 1), 10, 10, None).is_err());
        assert!(CycleSettings::new(28, 12).is_ok());
        assert!(CycleSettings::new(6, 1).is_ok());
    }

    #[test]
    fn test_defaults_to_today() {
        let anchor = today();
        let result = calculate_cycle_info(anchor, 28, 5, None).unwrap();

        // the local date may tick over between the two calls near midnight
        assert!(result.day_of_cycle == 1 || result.day_of_cycle == 2);
    }

    #[test]
    fn test_phase_strings() {
        assert_eq!(CyclePhase::Ovulation.to_string(), "ovulation");
        assert_eq!(CyclePhase::from_str("luteal"), Ok(CyclePhase::Luteal));
        assert!(CyclePhase::from_str("spring").is_err());
    }

    #[test]
    fn test_serializes_camel_case() {
        let value = serde_json::to_value(info(CyclePhase::Follicular, 7, 2, 22)).unwrap();

        assert_eq!(
            value,
            serde_json::json!({
                "phase": "follicular",
                "dayOfCycle": 7,
                "phaseDay": 2,
                "daysUntilNextPeriod": 22,
            })
        );
    }
}
