// Copyright 2024 TiKV Project Authors. Licensed under Apache-2.0.

use bitflags::bitflags;

use super::{calc_daynr, days_in_year};

bitflags! {
    /// Behavior bits of the MySQL WEEK() mode argument (0..=7).
    pub struct WeekMode: u32 {
        const BEHAVIOR_MONDAY_FIRST = 0b001;
        const BEHAVIOR_YEAR = 0b010;
        const BEHAVIOR_FIRST_WEEKDAY = 0b100;
    }
}

impl WeekMode {
    pub fn to_normalized(self) -> WeekMode {
        let mut mode = self;
        if !mode.contains(WeekMode::BEHAVIOR_MONDAY_FIRST) {
            mode ^= WeekMode::BEHAVIOR_FIRST_WEEKDAY;
        }
        mode
    }
}

/// Weekday index of a day number: 0 = Monday unless `sunday_first`, in
/// which case 0 = Sunday.
pub(crate) fn calc_weekday(daynr: i32, sunday_first: bool) -> i32 {
    (daynr + 5 + if sunday_first { 1 } else { 0 }) % 7
}

/// The week number of a calendar date together with the year it belongs to,
/// which can differ from the date's own year at year boundaries. `mode`
/// must already be normalized.
pub(crate) fn calc_year_week(
    mut year: i32,
    month: i32,
    day: i32,
    mode: WeekMode,
) -> (i32, i32) {
    let daynr = calc_daynr(year, month, day);
    let mut first_daynr = calc_daynr(year, 1, 1);
    let monday_first = mode.contains(WeekMode::BEHAVIOR_MONDAY_FIRST);
    let mut week_year = mode.contains(WeekMode::BEHAVIOR_YEAR);
    let first_weekday = mode.contains(WeekMode::BEHAVIOR_FIRST_WEEKDAY);
    let mut weekday = calc_weekday(first_daynr, !monday_first);

    if month == 1 && day <= 7 - weekday {
        if !week_year
            && ((first_weekday && weekday != 0) || (!first_weekday && weekday >= 4))
        {
            return (year, 0);
        }
        week_year = true;
        year -= 1;
        let days = days_in_year(year);
        first_daynr -= days;
        weekday = (weekday + 53 * 7 - days) % 7;
    }

    let days = if (first_weekday && weekday != 0) || (!first_weekday && weekday >= 4) {
        daynr - (first_daynr + (7 - weekday))
    } else {
        daynr - (first_daynr - weekday)
    };

    if week_year && days >= 52 * 7 {
        weekday = (weekday + days_in_year(year)) % 7;
        if (!first_weekday && weekday < 4) || (first_weekday && weekday == 0) {
            return (year + 1, 1);
        }
    }

    (year, days / 7 + 1)
}
