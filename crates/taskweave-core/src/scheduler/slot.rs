//! First-fit slot search over a work-hour constrained timeline.
//!
//! All times are local wall-clock (`NaiveDateTime`). Busy intervals coming
//! from the calendar have their offsets dropped before they get here, so the
//! search assumes a single time zone.

use chrono::{Duration, NaiveDate, NaiveDateTime, NaiveTime};
use serde::Serialize;

use crate::model::BusyInterval;
use crate::storage::ScheduleConfig;

/// Daily working window `[start_hour, end_hour)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WorkHours {
    start_hour: u32,
    end_hour: u32,
}

impl WorkHours {
    /// `None` unless `start_hour < end_hour <= 24`.
    pub fn new(start_hour: u32, end_hour: u32) -> Option<Self> {
        (start_hour < end_hour && end_hour <= 24).then_some(Self {
            start_hour,
            end_hour,
        })
    }

    pub fn from_config(config: &ScheduleConfig) -> Option<Self> {
        Self::new(config.work_start_hour, config.work_end_hour)
    }

    pub fn start_hour(&self) -> u32 {
        self.start_hour
    }

    pub fn end_hour(&self) -> u32 {
        self.end_hour
    }

    pub fn day_start(&self, date: NaiveDate) -> NaiveDateTime {
        date.and_time(NaiveTime::MIN) + Duration::hours(i64::from(self.start_hour))
    }

    /// Exclusive end of the window; midnight of the next day for 24.
    pub fn day_end(&self, date: NaiveDate) -> NaiveDateTime {
        date.and_time(NaiveTime::MIN) + Duration::hours(i64::from(self.end_hour))
    }

    /// Whether `[start, end)` sits inside a single day's window.
    pub fn contains(&self, start: NaiveDateTime, end: NaiveDateTime) -> bool {
        let date = start.date();
        start >= self.day_start(date) && end <= self.day_end(date) && start <= end
    }
}

/// A free interval found by [`find_free_slot`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TimeSlot {
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
}

impl TimeSlot {
    pub fn as_busy(&self) -> BusyInterval {
        BusyInterval::new(self.start, self.end)
    }
}

/// First slot of `duration` at or after `candidate` that fits in one day's
/// work hours and overlaps none of `busy`.
///
/// The scan clamps to the work window, skips to the next morning when the
/// slot would cross the end of the day, and jumps to the end of any
/// overlapping interval. Returns `None` once the candidate reaches
/// `horizon_end`.
pub fn find_free_slot(
    mut candidate: NaiveDateTime,
    duration: Duration,
    busy: &[BusyInterval],
    hours: WorkHours,
    horizon_end: NaiveDateTime,
) -> Option<TimeSlot> {
    while candidate < horizon_end {
        let date = candidate.date();

        if candidate < hours.day_start(date) {
            candidate = hours.day_start(date);
            if candidate >= horizon_end {
                break;
            }
        }

        let day_end = hours.day_end(date);
        if candidate >= day_end {
            candidate = hours.day_start(date.succ_opt()?);
            continue;
        }

        let end = candidate + duration;
        if end > day_end {
            candidate = hours.day_start(date.succ_opt()?);
            continue;
        }

        match busy.iter().find(|interval| interval.overlaps(candidate, end)) {
            Some(interval) => candidate = interval.end,
            None => return Some(TimeSlot {
                start: candidate,
                end,
            }),
        }
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn at(day: u32, h: u32, m: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 3, day)
            .unwrap()
            .and_hms_opt(h, m, 0)
            .unwrap()
    }

    fn nine_to_seven() -> WorkHours {
        WorkHours::new(9, 19).unwrap()
    }

    #[test]
    fn work_hours_validation() {
        assert!(WorkHours::new(9, 19).is_some());
        assert!(WorkHours::new(0, 24).is_some());
        assert!(WorkHours::new(19, 9).is_none());
        assert!(WorkHours::new(9, 9).is_none());
        assert!(WorkHours::new(9, 25).is_none());
    }

    #[test]
    fn free_candidate_is_returned_as_is() {
        let busy = [BusyInterval::new(at(1, 10, 0), at(1, 11, 0))];
        let slot = find_free_slot(
            at(1, 9, 15),
            Duration::minutes(30),
            &busy,
            nine_to_seven(),
            at(15, 9, 15),
        )
        .unwrap();

        assert_eq!(slot.start, at(1, 9, 15));
        assert_eq!(slot.end, at(1, 9, 45));
    }

    #[test]
    fn candidate_running_into_busy_interval_moves_past_it() {
        // 09:45-10:15 overlaps 10:00-11:00 by a quarter hour.
        let busy = [BusyInterval::new(at(1, 10, 0), at(1, 11, 0))];
        let slot = find_free_slot(
            at(1, 9, 45),
            Duration::minutes(30),
            &busy,
            nine_to_seven(),
            at(15, 9, 45),
        )
        .unwrap();

        assert_eq!(slot.start, at(1, 11, 0));
        assert_eq!(slot.end, at(1, 11, 30));
    }

    #[test]
    fn candidate_ending_exactly_at_busy_start_is_free() {
        let busy = [BusyInterval::new(at(1, 10, 0), at(1, 11, 0))];
        let slot = find_free_slot(
            at(1, 9, 30),
            Duration::minutes(30),
            &busy,
            nine_to_seven(),
            at(15, 9, 30),
        )
        .unwrap();

        assert_eq!(slot.start, at(1, 9, 30));
        assert_eq!(slot.end, at(1, 10, 0));
    }

    #[test]
    fn overlap_jumps_to_end_of_busy_interval() {
        let busy = [BusyInterval::new(at(1, 10, 0), at(1, 11, 30))];
        let slot = find_free_slot(
            at(1, 10, 30),
            Duration::minutes(30),
            &busy,
            nine_to_seven(),
            at(15, 10, 30),
        )
        .unwrap();

        assert_eq!(slot.start, at(1, 11, 30));
        assert_eq!(slot.end, at(1, 12, 0));
    }

    #[test]
    fn chained_overlaps_are_followed() {
        let busy = [
            BusyInterval::new(at(1, 12, 0), at(1, 13, 0)),
            BusyInterval::new(at(1, 9, 0), at(1, 12, 0)),
            BusyInterval::new(at(1, 13, 0), at(1, 13, 20)),
        ];
        let slot = find_free_slot(
            at(1, 9, 0),
            Duration::minutes(30),
            &busy,
            nine_to_seven(),
            at(15, 9, 0),
        )
        .unwrap();

        assert_eq!(slot.start, at(1, 13, 20));
    }

    #[test]
    fn early_candidate_is_clamped_to_work_start() {
        let slot = find_free_slot(
            at(1, 6, 17),
            Duration::minutes(30),
            &[],
            nine_to_seven(),
            at(15, 6, 17),
        )
        .unwrap();

        assert_eq!(slot.start, at(1, 9, 0));
    }

    #[test]
    fn late_candidate_moves_to_next_morning() {
        let slot = find_free_slot(
            at(1, 19, 0),
            Duration::minutes(30),
            &[],
            nine_to_seven(),
            at(15, 19, 0),
        )
        .unwrap();

        assert_eq!(slot.start, at(2, 9, 0));
    }

    #[test]
    fn slot_never_crosses_work_end() {
        let slot = find_free_slot(
            at(1, 18, 45),
            Duration::minutes(30),
            &[],
            nine_to_seven(),
            at(15, 18, 45),
        )
        .unwrap();
        assert_eq!(slot.start, at(2, 9, 0));

        // Ending exactly at the end of the window is fine.
        let slot = find_free_slot(
            at(1, 18, 30),
            Duration::minutes(30),
            &[],
            nine_to_seven(),
            at(15, 18, 30),
        )
        .unwrap();
        assert_eq!(slot.start, at(1, 18, 30));
        assert_eq!(slot.end, at(1, 19, 0));
    }

    #[test]
    fn busy_until_end_of_day_rolls_over() {
        let busy = [BusyInterval::new(at(1, 17, 0), at(1, 20, 0))];
        let slot = find_free_slot(
            at(1, 17, 30),
            Duration::minutes(60),
            &busy,
            nine_to_seven(),
            at(15, 17, 30),
        )
        .unwrap();
        assert_eq!(slot.start, at(2, 9, 0));
    }

    #[test]
    fn horizon_exhaustion_returns_none() {
        // Eleven hours never fit in a ten hour window.
        assert!(find_free_slot(
            at(1, 9, 0),
            Duration::hours(11),
            &[],
            nine_to_seven(),
            at(15, 9, 0),
        )
        .is_none());

        // Fully booked until the horizon.
        let busy = [BusyInterval::new(at(1, 0, 0), at(4, 0, 0))];
        assert!(find_free_slot(
            at(1, 9, 0),
            Duration::minutes(30),
            &busy,
            nine_to_seven(),
            at(3, 9, 0),
        )
        .is_none());
    }

    #[test]
    fn candidate_clamped_past_horizon_returns_none() {
        assert!(find_free_slot(
            at(1, 7, 0),
            Duration::minutes(30),
            &[],
            nine_to_seven(),
            at(1, 8, 0),
        )
        .is_none());
    }

    #[test]
    fn full_day_window_allows_late_slots() {
        let hours = WorkHours::new(0, 24).unwrap();
        let slot = find_free_slot(
            at(1, 23, 0),
            Duration::minutes(60),
            &[],
            hours,
            at(3, 0, 0),
        )
        .unwrap();
        assert_eq!(slot.start, at(1, 23, 0));
        assert_eq!(slot.end, at(2, 0, 0));
    }

    fn busy_strategy() -> impl Strategy<Value = Vec<BusyInterval>> {
        prop::collection::vec((0i64..(5 * 24 * 60), 5i64..240), 0..20).prop_map(|spans| {
            spans
                .into_iter()
                .map(|(offset, len)| {
                    let start = at(1, 0, 0) + Duration::minutes(offset);
                    BusyInterval::new(start, start + Duration::minutes(len))
                })
                .collect()
        })
    }

    proptest! {
        #[test]
        fn found_slot_is_free_and_inside_work_hours(
            busy in busy_strategy(),
            start_offset in 0i64..(3 * 24 * 60),
            minutes in 5i64..300,
        ) {
            let hours = nine_to_seven();
            let start = at(1, 0, 0) + Duration::minutes(start_offset);
            let horizon = at(1, 0, 0) + Duration::days(6);

            if let Some(slot) = find_free_slot(start, Duration::minutes(minutes), &busy, hours, horizon) {
                prop_assert!(slot.start >= start);
                prop_assert!(slot.start < horizon);
                prop_assert_eq!(slot.end - slot.start, Duration::minutes(minutes));
                prop_assert!(hours.contains(slot.start, slot.end));
                for interval in &busy {
                    prop_assert!(!interval.overlaps(slot.start, slot.end));
                }
            }
        }
    }
}
