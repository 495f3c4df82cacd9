use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Most records the inferencer will look at. Callers should fetch no more than this.
pub const HISTORY_WINDOW: usize = 100;

/// One dated "is the period active today" check-in.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckInRecord {
    pub date: NaiveDate,
    pub is_active: bool,
}

/// First day of the most recent active streak.
///
/// `truncated` is set when the streak reaches the oldest record of a full [`HISTORY_WINDOW`], in
/// which case the real start may be earlier than `date`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct PeriodStart {
    pub date: NaiveDate,
    pub truncated: bool,
}

/// Recovers the most recent period start from check-ins sorted newest first.
///
/// Finds the newest active record, then walks back while the next older record is active and no
/// more than one day earlier. The oldest record of that run is the start. Returns `None` when no
/// record in the window is active.
pub fn infer_last_period_start(history: &[CheckInRecord]) -> Option<PeriodStart> {
    let window = &history[..history.len().min(HISTORY_WINDOW)];
    let mut start = window.iter().position(|record| record.is_active)?;

    while let Some(older) = window.get(start + 1) {
        let gap = (window[start].date - older.date).num_days();

        if !older.is_active || !(0..=1).contains(&gap) {
            break;
        }

        start += 1;
    }

    Some(PeriodStart {
        date: window[start].date,
        truncated: window.len() == HISTORY_WINDOW && start + 1 == window.len(),
    })
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn day(month: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, month, day).unwrap()
    }

    fn record(month: u32, date: u32, is_active: bool) -> CheckInRecord {
        CheckInRecord {
            date: day(month, date),
            is_active,
        }
    }

    fn start(date: NaiveDate) -> Option<PeriodStart> {
        Some(PeriodStart {
            date,
            truncated: false,
        })
    }

    /// `len` consecutive days ending on 2024-12-31, newest first.
    fn run(len: usize, is_active: impl Fn(usize) -> bool) -> Vec<CheckInRecord> {
        (0..len)
            .map(|i| CheckInRecord {
                date: day(12, 31) - chrono::Days::new(i as u64),
                is_active: is_active(i),
            })
            .collect()
    }

    #[test]
    fn test_streak_start_between_inactive_days() {
        let history = [
            record(1, 10, false),
            record(1, 9, true),
            record(1, 8, true),
            record(1, 7, false),
        ];

        assert_eq!(infer_last_period_start(&history), start(day(1, 8)));
    }

    #[test]
    fn test_single_active_record() {
        assert_eq!(
            infer_last_period_start(&[record(1, 10, true)]),
            start(day(1, 10))
        );
    }

    #[test]
    fn test_no_active_records() {
        assert_eq!(infer_last_period_start(&[]), None);
        assert_eq!(
            infer_last_period_start(&[record(1, 10, false), record(1, 9, false)]),
            None
        );
    }

    #[test]
    fn test_ongoing_streak_at_head() {
        let history = [
            record(1, 10, true),
            record(1, 9, true),
            record(1, 8, true),
            record(1, 7, false),
            record(1, 6, true),
        ];

        assert_eq!(infer_last_period_start(&history), start(day(1, 8)));
    }

    #[test]
    fn test_gap_breaks_streak() {
        // nothing logged on the 8th, so the 9th starts the newest streak
        let history = [record(1, 10, true), record(1, 9, true), record(1, 7, true)];

        assert_eq!(infer_last_period_start(&history), start(day(1, 9)));
    }

    #[test]
    fn test_newest_streak_wins_over_older() {
        let history = [
            record(2, 3, false),
            record(2, 2, true),
            record(2, 1, false),
            record(1, 5, true),
            record(1, 4, true),
        ];

        assert_eq!(infer_last_period_start(&history), start(day(2, 2)));
    }

    #[test]
    fn test_streak_across_month_boundary() {
        let history = [
            record(2, 2, true),
            record(2, 1, true),
            record(1, 31, true),
            record(1, 30, false),
        ];

        assert_eq!(infer_last_period_start(&history), start(day(1, 31)));
    }

    #[test]
    fn test_streak_to_end_of_short_history() {
        let history = [record(3, 5, false), record(3, 4, true), record(3, 3, true)];

        assert_eq!(infer_last_period_start(&history), start(day(3, 3)));
    }

    #[test]
    fn test_streak_cut_by_window_is_flagged() {
        let history = run(HISTORY_WINDOW, |i| i >= 90);

        assert_eq!(
            infer_last_period_start(&history),
            Some(PeriodStart {
                date: history[HISTORY_WINDOW - 1].date,
                truncated: true,
            })
        );
    }

    #[test]
    fn test_records_past_window_are_ignored() {
        // the only active records sit beyond the window
        let history = run(HISTORY_WINDOW + 20, |i| i >= HISTORY_WINDOW);
        assert_eq!(infer_last_period_start(&history), None);

        // a streak running past the window stops at its edge
        let history = run(HISTORY_WINDOW + 20, |i| i >= 95);
        let result = infer_last_period_start(&history).unwrap();
        assert_eq!(result.date, history[HISTORY_WINDOW - 1].date);
        assert!(result.truncated);
    }

    #[test]
    fn test_full_window_streak_ending_inside_is_not_flagged() {
        let history = run(HISTORY_WINDOW, |i| (10..20).contains(&i));

        assert_eq!(infer_last_period_start(&history), start(history[19].date));
    }

    #[test]
    fn test_out_of_order_records_end_streak() {
        let history = [record(1, 10, true), record(1, 12, true)];

        assert_eq!(infer_last_period_start(&history), start(day(1, 10)));
    }
}
