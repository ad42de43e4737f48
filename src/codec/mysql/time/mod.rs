// Copyright 2024 TiKV Project Authors. Licensed under Apache-2.0.

pub mod format;
pub mod weekmode;

use std::cmp::Ordering;
use std::fmt;

use bitfield::bitfield;
use chrono::{
    Datelike, Duration as ChronoDuration, FixedOffset, Months, NaiveDate, NaiveDateTime, TimeZone,
    Timelike,
};

use crate::codec::mysql::duration::Duration;
use crate::codec::mysql::{check_fsp, MAX_FSP};
use crate::codec::TEN_POW;
use crate::error::{Error, Result, DATETIME_STR};
use crate::expr::{EvalContext, SqlMode};

pub use self::weekmode::WeekMode;

const MICROS_PER_SEC: i64 = 1_000_000;
const SECS_PER_DAY: i64 = 86_400;

/// Timestamps must fit the 32-bit epoch range.
const MIN_TIMESTAMP: i64 = 0;
const MAX_TIMESTAMP: i64 = (1 << 31) - 1;

bitfield! {
    /// A date/datetime/timestamp value packed into a `u64`.
    ///
    /// `fsp_tt` format: `| fsp: 3 bits | type: 1 bit |`. With a valid fsp,
    /// type bit 0 is DateTime and 1 is Timestamp. Date needs no fsp, so
    /// `fsp == 0b111` marks it.
    #[derive(Clone, Copy, Default)]
    pub struct Time(u64);

    u32;
    #[inline]
    get_year, set_year: 63, 50;
    #[inline]
    get_month, set_month: 49, 46;
    #[inline]
    get_day, set_day: 45, 41;
    #[inline]
    get_hour, set_hour: 40, 36;
    #[inline]
    get_minute, set_minute: 35, 30;
    #[inline]
    get_second, set_second: 29, 24;
    #[inline]
    get_micro, set_micro: 23, 4;
    #[inline]
    u8, get_fsp_tt, set_fsp_tt: 3, 0;
}

#[derive(PartialEq, Eq, Clone, Copy, Debug)]
pub enum TimeType {
    Date,
    DateTime,
    Timestamp,
}

pub fn is_leap_year(year: u32) -> bool {
    year & 3 == 0 && (year % 100 != 0 || year % 400 == 0)
}

pub fn last_day_of_month(year: u32, month: u32) -> u32 {
    match month {
        4 | 6 | 9 | 11 => 30,
        2 => is_leap_year(year) as u32 + 28,
        _ => 31,
    }
}

// Year 0 and negative years count as common years, as in the server's
// calc_days_in_year.
pub(crate) fn days_in_year(year: i32) -> i32 {
    if year & 3 == 0 && (year % 100 != 0 || (year % 400 == 0 && year != 0)) {
        366
    } else {
        365
    }
}

/// MySQL day number: days since year 0, with 0000-01-01 being day 1.
/// Returns 0 for the all-zero date.
pub fn calc_daynr(year: i32, month: i32, day: i32) -> i32 {
    if year == 0 && month == 0 {
        return 0;
    }
    let mut delsum = 365 * year + 31 * (month - 1) + day;
    let mut y = year;
    if month <= 2 {
        y -= 1;
    } else {
        delsum -= (month * 4 + 23) / 10;
    }
    delsum + y / 4 - (y / 100 + 1) * 3 / 4
}

fn str_to_u32(input: &[u8]) -> Result<u32> {
    std::str::from_utf8(input)
        .ok()
        .and_then(|s| s.parse::<u32>().ok())
        .ok_or_else(Error::truncated)
}

// Field accessors.
impl Time {
    /// Hour number from 0 to 23.
    #[inline]
    pub fn hour(self) -> u32 {
        self.get_hour()
    }

    /// Minute number from 0 to 59.
    #[inline]
    pub fn minute(self) -> u32 {
        self.get_minute()
    }

    /// Second number from 0 to 59.
    #[inline]
    pub fn second(self) -> u32 {
        self.get_second()
    }

    /// Microseconds since the whole second.
    #[inline]
    pub fn micros(self) -> u32 {
        self.get_micro()
    }

    #[inline]
    pub fn year(self) -> u32 {
        self.get_year()
    }

    #[inline]
    pub fn month(self) -> u32 {
        self.get_month()
    }

    #[inline]
    pub fn day(self) -> u32 {
        self.get_day()
    }

    #[inline]
    pub fn time_type(self) -> TimeType {
        let ft = self.get_fsp_tt();
        if ft >> 1 == 0b111 {
            TimeType::Date
        } else if ft & 1 == 0 {
            TimeType::DateTime
        } else {
            TimeType::Timestamp
        }
    }

    #[inline]
    pub fn fsp(self) -> u8 {
        match self.time_type() {
            TimeType::Date => 0,
            _ => self.get_fsp_tt() >> 1,
        }
    }

    #[inline]
    pub fn set_fsp(&mut self, fsp: u8) {
        if self.time_type() == TimeType::Date {
            return;
        }
        self.set_fsp_tt((fsp << 1) | (self.get_fsp_tt() & 1));
    }

    #[inline]
    fn set_time_type_bits(&mut self, time_type: TimeType) {
        let ft = self.get_fsp_tt();
        let mask = match time_type {
            TimeType::Date => ft | 0b1110,
            TimeType::DateTime => ft & !1,
            TimeType::Timestamp => ft | 1,
        };
        self.set_fsp_tt(mask);
    }

    /// The packed value without fsp/type bits; field order makes this
    /// directly comparable.
    #[inline]
    fn core_bits(self) -> u64 {
        let mut c = self;
        c.set_fsp_tt(0);
        c.0
    }
}

// Construction.
impl Time {
    /// Builds a value from components assumed valid. Used for computed
    /// dates that are valid by construction; parsed input goes through
    /// `check` instead.
    #[allow(clippy::too_many_arguments)]
    pub fn from_parts(
        year: u32,
        month: u32,
        day: u32,
        hour: u32,
        minute: u32,
        second: u32,
        micro: u32,
        fsp: u8,
        time_type: TimeType,
    ) -> Time {
        let mut t = Time(0);
        t.set_year(year);
        t.set_month(month);
        t.set_day(day);
        t.set_hour(hour);
        t.set_minute(minute);
        t.set_second(second);
        t.set_micro(micro);
        t.set_fsp_tt(fsp << 1);
        t.set_time_type_bits(time_type);
        t
    }

    pub fn from_ymd(year: u32, month: u32, day: u32) -> Time {
        Time::from_parts(year, month, day, 0, 0, 0, 0, 0, TimeType::Date)
    }

    pub fn zero() -> Time {
        Time(0)
    }

    pub fn zero_date() -> Time {
        Time::from_parts(0, 0, 0, 0, 0, 0, 0, 0, TimeType::Date)
    }

    #[inline]
    pub fn is_zero(self) -> bool {
        self.core_bits() == 0
    }

    /// True for any value with a zero month or day, including the literal
    /// zero date.
    #[inline]
    pub fn invalid_zero(self) -> bool {
        self.month() == 0 || self.day() == 0
    }

    #[inline]
    pub fn is_leap_year(self) -> bool {
        is_leap_year(self.year())
    }

    #[inline]
    pub fn last_day_of_month(self) -> u32 {
        last_day_of_month(self.year(), self.month())
    }
}

// Calendar arithmetic.
impl Time {
    /// MySQL day number of this date; 0 for the zero date.
    #[inline]
    pub fn day_number(self) -> i32 {
        calc_daynr(self.year() as i32, self.month() as i32, self.day() as i32)
    }

    /// Day of year, starting at 1.
    pub fn year_day(self) -> i32 {
        if self.invalid_zero() {
            return 0;
        }
        self.day_number() - calc_daynr(self.year() as i32, 1, 1) + 1
    }

    /// Weekday with Monday = 0 through Sunday = 6.
    pub fn weekday(self) -> u32 {
        weekmode::calc_weekday(self.day_number(), false) as u32
    }

    /// Week number under the given mode; 0 for dates with a zero month or
    /// day.
    pub fn week(self, mode: WeekMode) -> i32 {
        if self.invalid_zero() {
            return 0;
        }
        weekmode::calc_year_week(
            self.year() as i32,
            self.month() as i32,
            self.day() as i32,
            mode.to_normalized(),
        )
        .1
    }

    /// Week number together with the year it belongs to; always numbered
    /// 1..=53 (`BEHAVIOR_YEAR` is forced on).
    pub fn year_week(self, mode: WeekMode) -> (i32, i32) {
        weekmode::calc_year_week(
            self.year() as i32,
            self.month() as i32,
            self.day() as i32,
            mode.to_normalized() | WeekMode::BEHAVIOR_YEAR,
        )
    }

    /// This value with the clock dropped, as a Date.
    pub fn truncated_to_date(self) -> Time {
        Time::from_ymd(self.year(), self.month(), self.day())
    }

    pub fn round_frac(self, fsp: i8) -> Result<Time> {
        if self.time_type() == TimeType::Date || self.is_zero() {
            return Ok(self);
        }
        let fsp = check_fsp(fsp)?;
        let base = TEN_POW[6 - fsp as usize];
        let micro = (self.micros() + base / 2) / base * base;
        let mut parts = [
            self.year(),
            self.month(),
            self.day(),
            self.hour(),
            self.minute(),
            self.second(),
            micro,
        ];
        round_components(&mut parts);
        Ok(Time::from_parts(
            parts[0],
            parts[1],
            parts[2],
            parts[3],
            parts[4],
            parts[5],
            parts[6],
            fsp,
            self.time_type(),
        ))
    }

    pub fn to_naive(self) -> Result<NaiveDateTime> {
        NaiveDate::from_ymd_opt(self.year() as i32, self.month(), self.day())
            .and_then(|d| d.and_hms_micro_opt(self.hour(), self.minute(), self.second(), self.micros()))
            .ok_or_else(|| Error::incorrect_datetime_value(self))
    }

    pub fn from_chrono_datetime<T: Datelike + Timelike>(
        dt: &T,
        time_type: TimeType,
        fsp: u8,
    ) -> Result<Time> {
        let year = dt.year();
        if !(0..=9999).contains(&year) {
            return Err(Error::incorrect_datetime_value(format!(
                "{:04}-{:02}-{:02}",
                year,
                dt.month(),
                dt.day()
            )));
        }
        Ok(Time::from_parts(
            year as u32,
            dt.month(),
            dt.day(),
            dt.hour(),
            dt.minute(),
            dt.second(),
            (dt.nanosecond() / 1_000).min(999_999),
            fsp,
            time_type,
        ))
    }

    /// Converts a unix timestamp into a datetime in the given timezone.
    pub fn from_unix_sec(tz: &FixedOffset, secs: i64, micros: u32, fsp: u8) -> Result<Time> {
        let dt = tz
            .timestamp_opt(secs, micros * 1_000)
            .single()
            .ok_or_else(|| Error::incorrect_datetime_value(secs))?;
        Time::from_chrono_datetime(&dt, TimeType::DateTime, fsp)
    }

    /// The Date addressed by a MySQL day number; out-of-range day numbers
    /// yield the zero date.
    pub fn from_days(daynr: i64) -> Time {
        if daynr <= 365 || daynr >= 3_652_425 {
            return Time::zero_date();
        }
        match NaiveDate::from_num_days_from_ce_opt((daynr - 365) as i32) {
            Some(d) => Time::from_ymd(d.year() as u32, d.month(), d.day()),
            None => Time::zero_date(),
        }
    }

    /// The clock part of this value as a duration.
    pub fn to_duration(self) -> Result<Duration> {
        if self.is_zero() {
            return Ok(Duration::zero());
        }
        let nanos = (i64::from(self.hour()) * 3_600
            + i64::from(self.minute()) * 60
            + i64::from(self.second()))
            * 1_000_000_000
            + i64::from(self.micros()) * 1_000;
        Duration::from_nanos(nanos, self.fsp() as i8)
    }

    pub fn checked_add_duration(self, rhs: Duration) -> Result<Time> {
        let sum = self
            .to_naive()?
            .checked_add_signed(ChronoDuration::nanoseconds(rhs.to_nanos()))
            .ok_or_else(|| Error::incorrect_datetime_value(self))?;
        Time::from_chrono_datetime(&sum, self.time_type(), self.fsp().max(rhs.fsp()))
    }

    /// TIMESTAMPADD arithmetic. The result is a DateTime whose precision is
    /// upgraded to the maximum fsp only for a MICROSECOND interval.
    pub fn add_interval(self, unit: TimeUnit, v: i64) -> Result<Time> {
        let naive = self.to_naive()?;
        let added = match unit {
            TimeUnit::Microsecond => naive.checked_add_signed(ChronoDuration::microseconds(v)),
            TimeUnit::Second => clock_shift(naive, v, 1),
            TimeUnit::Minute => clock_shift(naive, v, 60),
            TimeUnit::Hour => clock_shift(naive, v, 3_600),
            TimeUnit::Day => clock_shift(naive, v, SECS_PER_DAY),
            TimeUnit::Week => clock_shift(naive, v, 7 * SECS_PER_DAY),
            TimeUnit::Month => month_shift(naive, v),
            TimeUnit::Quarter => month_shift(naive, v.saturating_mul(3)),
            TimeUnit::Year => month_shift(naive, v.saturating_mul(12)),
            _ => return Err(Error::incorrect_time_value(unit.name())),
        };
        let added = added.ok_or_else(|| Error::incorrect_datetime_value(self))?;
        let fsp = if unit == TimeUnit::Microsecond {
            MAX_FSP as u8
        } else {
            0
        };
        Time::from_chrono_datetime(&added, TimeType::DateTime, fsp)
    }
}

fn clock_shift(naive: NaiveDateTime, v: i64, unit_secs: i64) -> Option<NaiveDateTime> {
    let secs = v.checked_mul(unit_secs)?;
    naive.checked_add_signed(ChronoDuration::try_seconds(secs)?)
}

fn month_shift(naive: NaiveDateTime, months: i64) -> Option<NaiveDateTime> {
    if months >= 0 {
        naive.checked_add_months(Months::new(u32::try_from(months).ok()?))
    } else {
        naive.checked_sub_months(Months::new(u32::try_from(-months).ok()?))
    }
}

/// Carries overflowed components upward. The day field is 1-based and only
/// carries past the month's last day.
fn round_components(parts: &mut [u32; 7]) {
    let modulus = [24, 60, 60, 1_000_000];
    for i in (3..=6).rev() {
        if parts[i] >= modulus[i - 3] {
            parts[i] -= modulus[i - 3];
            parts[i - 1] += 1;
        }
    }
    if parts[2] > last_day_of_month(parts[0], parts[1]) {
        parts[2] = 1;
        parts[1] += 1;
    }
    if parts[1] > 12 {
        parts[1] = 1;
        parts[0] += 1;
    }
}

#[derive(Debug, Clone, Copy)]
struct DateTimeMode {
    strict_mode: bool,
    no_zero_in_date: bool,
    no_zero_date: bool,
    allow_invalid_date: bool,
}

impl DateTimeMode {
    fn from_ctx(ctx: &EvalContext) -> DateTimeMode {
        let sql_mode = ctx.cfg.sql_mode;
        DateTimeMode {
            strict_mode: sql_mode.is_strict(),
            no_zero_in_date: sql_mode.contains(SqlMode::NO_ZERO_IN_DATE),
            no_zero_date: sql_mode.contains(SqlMode::NO_ZERO_DATE),
            allow_invalid_date: sql_mode.contains(SqlMode::INVALID_DATES),
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct TimeParts {
    year: u32,
    month: u32,
    day: u32,
    hour: u32,
    minute: u32,
    second: u32,
    micro: u32,
    fsp: u8,
    time_type: TimeType,
}

impl TimeParts {
    fn value_str(&self) -> String {
        format!(
            "{:04}-{:02}-{:02} {:02}:{:02}:{:02}",
            self.year, self.month, self.day, self.hour, self.minute, self.second
        )
    }

    fn is_zero(&self) -> bool {
        self.year == 0
            && self.month == 0
            && self.day == 0
            && self.hour == 0
            && self.minute == 0
            && self.second == 0
            && self.micro == 0
    }

    fn clear(self) -> TimeParts {
        TimeParts {
            year: 0,
            month: 0,
            day: 0,
            hour: 0,
            minute: 0,
            second: 0,
            micro: 0,
            ..self
        }
    }

    fn check(self, ctx: &mut EvalContext) -> Result<TimeParts> {
        match self.time_type {
            TimeType::Date => self.check_date(ctx),
            TimeType::DateTime => self.check_datetime(ctx),
            TimeType::Timestamp => self.check_timestamp(ctx),
        }
    }

    fn handle_zero_date(self, ctx: &mut EvalContext) -> Result<TimeParts> {
        let mode = DateTimeMode::from_ctx(ctx);
        if mode.no_zero_date {
            if mode.strict_mode {
                return Err(Error::truncated_wrong_value(DATETIME_STR, self.value_str()));
            }
            ctx.warnings
                .append_warning(Error::truncated_wrong_value(DATETIME_STR, self.value_str()));
        }
        Ok(self)
    }

    fn handle_zero_in_date(self, ctx: &mut EvalContext) -> Result<TimeParts> {
        let mode = DateTimeMode::from_ctx(ctx);
        if mode.no_zero_in_date {
            if mode.strict_mode {
                return Err(Error::truncated_wrong_value(DATETIME_STR, self.value_str()));
            }
            // Outside strict mode a zero-in-date is reset to the zero value,
            // which is then itself subject to NO_ZERO_DATE.
            ctx.warnings
                .append_warning(Error::truncated_wrong_value(DATETIME_STR, self.value_str()));
            return self.clear().handle_zero_date(ctx);
        }
        Ok(self)
    }

    fn handle_invalid(self, ctx: &mut EvalContext) -> Result<TimeParts> {
        let mode = DateTimeMode::from_ctx(ctx);
        if mode.allow_invalid_date {
            let cleared = self.clear();
            return cleared.handle_zero_date(ctx);
        }
        Err(Error::truncated_wrong_value(DATETIME_STR, self.value_str()))
    }

    fn check_date(self, ctx: &mut EvalContext) -> Result<TimeParts> {
        let mode = DateTimeMode::from_ctx(ctx);
        if self.is_zero() {
            return self.handle_zero_date(ctx);
        }
        if self.month == 0 || self.day == 0 {
            return self.handle_zero_in_date(ctx);
        }
        if self.year > 9999 || self.month > 12 || self.day > 31 {
            return self.handle_invalid(ctx);
        }
        if !mode.allow_invalid_date && self.day > last_day_of_month(self.year, self.month) {
            return self.handle_invalid(ctx);
        }
        Ok(self)
    }

    fn check_datetime(self, ctx: &mut EvalContext) -> Result<TimeParts> {
        let checked = self.check_date(ctx)?;
        if self.hour > 23 || self.minute > 59 || self.second > 59 || self.micro > 999_999 {
            return self.handle_invalid(ctx);
        }
        Ok(checked)
    }

    fn check_timestamp(self, ctx: &mut EvalContext) -> Result<TimeParts> {
        if self.is_zero() {
            return self.handle_zero_date(ctx);
        }
        let local = NaiveDate::from_ymd_opt(self.year as i32, self.month, self.day)
            .and_then(|d| d.and_hms_micro_opt(self.hour, self.minute, self.second, self.micro))
            .and_then(|dt| ctx.cfg.tz.from_local_datetime(&dt).single());
        match local {
            Some(dt) if (MIN_TIMESTAMP..=MAX_TIMESTAMP).contains(&dt.timestamp()) => Ok(self),
            _ => self.handle_invalid(ctx),
        }
    }
}

impl From<TimeParts> for Time {
    fn from(p: TimeParts) -> Time {
        Time::from_parts(
            p.year, p.month, p.day, p.hour, p.minute, p.second, p.micro, p.fsp, p.time_type,
        )
    }
}

// Parsing.
impl Time {
    fn split_frac(input: &[u8]) -> Result<(&[u8], Option<&[u8]>)> {
        let parts: Vec<_> = input.split(|&x| x == b'.').collect();
        if parts.len() > 2 {
            Err(Error::truncated())
        } else {
            Ok((parts[0], parts.get(1).copied()))
        }
    }

    fn split_datetime(input: &[u8]) -> Vec<&[u8]> {
        input
            .split(|&x| x.is_ascii_whitespace() || x == b'T')
            .collect()
    }

    pub(crate) fn adjust_year(year: u32) -> u32 {
        if year <= 69 {
            2000 + year
        } else if (70..=99).contains(&year) {
            1900 + year
        } else {
            year
        }
    }

    fn parse_frac_part(input: &[u8], fsp: u8, round: bool) -> Result<(bool, u32)> {
        if input.is_empty() {
            return Ok((false, 0));
        }
        if !input.iter().all(u8::is_ascii_digit) {
            return Err(Error::truncated());
        }
        let len = input.len() as u32;
        let fsp = u32::from(fsp);
        let (input, len) = if fsp >= len {
            (input, len)
        } else {
            (&input[..=fsp as usize], fsp + 1)
        };
        let frac = str_to_u32(input)? * 10u32.pow(6u32.saturating_sub(len));
        Ok(if round {
            let frac = if frac < 1_000_000 { frac * 10 } else { frac };
            let mask = 10u32.pow(6 - fsp);
            let frac = (frac / mask + 5) / 10 * mask;
            (frac >= 1_000_000, frac)
        } else {
            (false, if frac >= 1_000_000 { frac / 10 } else { frac })
        })
    }

    fn parse_date_block(input: &[u8]) -> Result<[u32; 3]> {
        let pieces: Vec<_> = input.split(|x| x.is_ascii_punctuation()).collect();
        if pieces.len() != 3 {
            return Err(Error::truncated());
        }
        let mut ymd = [0u32; 3];
        for (i, piece) in pieces.iter().enumerate() {
            ymd[i] = str_to_u32(piece)?;
        }
        if pieces[0].len() == 2 {
            ymd[0] = Time::adjust_year(ymd[0]);
        }
        Ok(ymd)
    }

    fn parse_clock_block(input: &[u8], fsp: u8, round: bool) -> Result<(bool, [u32; 4])> {
        let (whole, frac) = Self::split_frac(input)?;
        let pieces: Vec<_> = whole.split(|x| x.is_ascii_punctuation()).collect();
        if pieces.is_empty() || pieces.len() > 3 {
            return Err(Error::truncated());
        }
        let mut hms = [0u32; 4];
        for (i, piece) in pieces.iter().enumerate() {
            hms[i] = str_to_u32(piece)?;
        }
        let (carry, frac) = Self::parse_frac_part(frac.unwrap_or(&[]), fsp, round)?;
        hms[3] = frac;
        Ok((carry, hms))
    }

    fn parse_float_string(whole: &[u8], frac: Option<&[u8]>, fsp: u8, round: bool) -> Result<([u32; 7], bool)> {
        let mut parts = [0u32; 7];
        let year_digits = match whole.len() {
            14 | 8 => 4,
            9..=12 | 5..=7 => 2,
            _ => return Err(Error::truncated()),
        };
        parts[0] = str_to_u32(&whole[..year_digits])?;
        if year_digits == 2 {
            parts[0] = Time::adjust_year(parts[0]);
        }
        for (i, chunk) in whole[year_digits..].chunks(2).enumerate() {
            parts[i + 1] = str_to_u32(chunk)?;
        }
        // Without a seconds field the fractional part is meaningless.
        if frac.is_some() && whole.len() != 12 && whole.len() != 14 {
            return Err(Error::truncated());
        }
        let (carry, frac) = Self::parse_frac_part(frac.unwrap_or(&[]), fsp, round)?;
        parts[6] = frac;
        Ok((parts, carry))
    }

    pub fn parse(
        ctx: &mut EvalContext,
        input: &str,
        time_type: TimeType,
        fsp: i8,
        round: bool,
    ) -> Result<Time> {
        let fsp = check_fsp(fsp)?;
        let trimmed = input.trim();
        if trimmed.is_empty() {
            return Err(Error::truncated_wrong_value(DATETIME_STR, input));
        }
        let blocks = Self::split_datetime(trimmed.as_bytes());
        let (mut parts, carry) = match *blocks.as_slice() {
            [whole] => {
                if whole.iter().any(|&b| b.is_ascii_punctuation() && b != b'.') {
                    let ymd = Self::parse_date_block(whole)
                        .map_err(|_| Error::truncated_wrong_value(DATETIME_STR, input))?;
                    ([ymd[0], ymd[1], ymd[2], 0, 0, 0, 0], false)
                } else {
                    let (digits, frac) = Self::split_frac(whole)
                        .map_err(|_| Error::truncated_wrong_value(DATETIME_STR, input))?;
                    Self::parse_float_string(digits, frac, fsp, round)
                        .map_err(|_| Error::truncated_wrong_value(DATETIME_STR, input))?
                }
            }
            [date, clock] => {
                let ymd = Self::parse_date_block(date)
                    .map_err(|_| Error::truncated_wrong_value(DATETIME_STR, input))?;
                let (carry, hms) = Self::parse_clock_block(clock, fsp, round)
                    .map_err(|_| Error::truncated_wrong_value(DATETIME_STR, input))?;
                ([ymd[0], ymd[1], ymd[2], hms[0], hms[1], hms[2], hms[3]], carry)
            }
            _ => return Err(Error::truncated_wrong_value(DATETIME_STR, input)),
        };
        if carry {
            round_components(&mut parts);
        }
        let parts = TimeParts {
            year: parts[0],
            month: parts[1],
            day: parts[2],
            hour: parts[3],
            minute: parts[4],
            second: parts[5],
            micro: parts[6],
            fsp,
            time_type,
        };
        parts.check(ctx).map(Time::from)
    }

    pub fn parse_datetime(ctx: &mut EvalContext, input: &str, fsp: i8, round: bool) -> Result<Time> {
        Time::parse(ctx, input, TimeType::DateTime, fsp, round)
    }

    pub fn parse_date(ctx: &mut EvalContext, input: &str) -> Result<Time> {
        Time::parse(ctx, input, TimeType::Date, 0, false)
    }

    /// Re-validates a computed value under the session modes, the way
    /// freshly parsed input is validated.
    pub fn check(self, ctx: &mut EvalContext) -> Result<Time> {
        let parts = TimeParts {
            year: self.year(),
            month: self.month(),
            day: self.day(),
            hour: self.hour(),
            minute: self.minute(),
            second: self.second(),
            micro: self.micros(),
            fsp: self.fsp(),
            time_type: self.time_type(),
        };
        parts.check(ctx).map(Time::from)
    }
}

/// The fsp implied by a literal's fractional digits, capped at the maximum.
pub fn fsp_from_str(s: &str) -> i8 {
    match s.rfind('.') {
        Some(idx) => (s.len() - idx - 1).min(MAX_FSP as usize) as i8,
        None => 0,
    }
}

/// Interval unit tags shared by TIMESTAMPADD, TIMESTAMPDIFF and EXTRACT.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeUnit {
    Microsecond,
    Second,
    Minute,
    Hour,
    Day,
    Week,
    Month,
    Quarter,
    Year,
    SecondMicrosecond,
    MinuteMicrosecond,
    MinuteSecond,
    HourMicrosecond,
    HourSecond,
    HourMinute,
    DayMicrosecond,
    DaySecond,
    DayMinute,
    DayHour,
    YearMonth,
}

impl TimeUnit {
    /// An unrecognized tag is a hard error, independent of row data.
    pub fn from_str(unit: &str) -> Result<TimeUnit> {
        use TimeUnit::*;
        match unit.to_uppercase().as_str() {
            "MICROSECOND" => Ok(Microsecond),
            "SECOND" => Ok(Second),
            "MINUTE" => Ok(Minute),
            "HOUR" => Ok(Hour),
            "DAY" => Ok(Day),
            "WEEK" => Ok(Week),
            "MONTH" => Ok(Month),
            "QUARTER" => Ok(Quarter),
            "YEAR" => Ok(Year),
            "SECOND_MICROSECOND" => Ok(SecondMicrosecond),
            "MINUTE_MICROSECOND" => Ok(MinuteMicrosecond),
            "MINUTE_SECOND" => Ok(MinuteSecond),
            "HOUR_MICROSECOND" => Ok(HourMicrosecond),
            "HOUR_SECOND" => Ok(HourSecond),
            "HOUR_MINUTE" => Ok(HourMinute),
            "DAY_MICROSECOND" => Ok(DayMicrosecond),
            "DAY_SECOND" => Ok(DaySecond),
            "DAY_MINUTE" => Ok(DayMinute),
            "DAY_HOUR" => Ok(DayHour),
            "YEAR_MONTH" => Ok(YearMonth),
            _ => Err(Error::incorrect_time_value(unit)),
        }
    }

    pub fn name(self) -> &'static str {
        use TimeUnit::*;
        match self {
            Microsecond => "MICROSECOND",
            Second => "SECOND",
            Minute => "MINUTE",
            Hour => "HOUR",
            Day => "DAY",
            Week => "WEEK",
            Month => "MONTH",
            Quarter => "QUARTER",
            Year => "YEAR",
            SecondMicrosecond => "SECOND_MICROSECOND",
            MinuteMicrosecond => "MINUTE_MICROSECOND",
            MinuteSecond => "MINUTE_SECOND",
            HourMicrosecond => "HOUR_MICROSECOND",
            HourSecond => "HOUR_SECOND",
            HourMinute => "HOUR_MINUTE",
            DayMicrosecond => "DAY_MICROSECOND",
            DaySecond => "DAY_SECOND",
            DayMinute => "DAY_MINUTE",
            DayHour => "DAY_HOUR",
            YearMonth => "YEAR_MONTH",
        }
    }
}

#[inline]
fn clock_micros(t: Time) -> i64 {
    (i64::from(t.hour()) * 3_600 + i64::from(t.minute()) * 60 + i64::from(t.second()))
        * MICROS_PER_SEC
        + i64::from(t.micros())
}

/// Month difference between two ordered values, decremented when the end's
/// day/clock has not yet reached the begin's.
fn calc_months_between(beg: Time, end: Time) -> i64 {
    let (yb, mb, db) = (beg.year() as i64, beg.month() as i64, beg.day() as i64);
    let (ye, me, de) = (end.year() as i64, end.month() as i64, end.day() as i64);
    let before = me < mb || (me == mb && de < db);
    let mut months = 12 * (ye - yb - before as i64);
    if before {
        months += 12 - (mb - me);
    } else {
        months += me - mb;
    }
    if de < db || (de == db && clock_micros(end) < clock_micros(beg)) {
        months -= 1;
    }
    months
}

/// `t2 - t1` in the requested single unit. Compound units are invalid here.
pub fn timestamp_diff(unit: TimeUnit, t1: Time, t2: Time) -> Result<i64> {
    let (beg, end, neg) = if t1 <= t2 {
        (t1, t2, false)
    } else {
        (t2, t1, true)
    };
    let day_diff = i64::from(end.day_number() - beg.day_number());
    let micros = day_diff * SECS_PER_DAY * MICROS_PER_SEC + clock_micros(end) - clock_micros(beg);
    let seconds = micros / MICROS_PER_SEC;
    let v = match unit {
        TimeUnit::Year => calc_months_between(beg, end) / 12,
        TimeUnit::Quarter => calc_months_between(beg, end) / 3,
        TimeUnit::Month => calc_months_between(beg, end),
        TimeUnit::Week => seconds / SECS_PER_DAY / 7,
        TimeUnit::Day => seconds / SECS_PER_DAY,
        TimeUnit::Hour => seconds / 3_600,
        TimeUnit::Minute => seconds / 60,
        TimeUnit::Second => seconds,
        TimeUnit::Microsecond => micros,
        _ => return Err(Error::incorrect_time_value(unit.name())),
    };
    Ok(if neg { -v } else { v })
}

/// EXTRACT over a datetime value, including the compound units.
pub fn extract_datetime_num(t: Time, unit: TimeUnit) -> i64 {
    let (y, mo, d) = (i64::from(t.year()), i64::from(t.month()), i64::from(t.day()));
    let (h, mi, s, us) = (
        i64::from(t.hour()),
        i64::from(t.minute()),
        i64::from(t.second()),
        i64::from(t.micros()),
    );
    match unit {
        TimeUnit::Microsecond => us,
        TimeUnit::Second => s,
        TimeUnit::Minute => mi,
        TimeUnit::Hour => h,
        TimeUnit::Day => d,
        TimeUnit::Week => i64::from(t.week(WeekMode::from_bits_truncate(0))),
        TimeUnit::Month => mo,
        TimeUnit::Quarter => (mo + 2) / 3,
        TimeUnit::Year => y,
        TimeUnit::SecondMicrosecond => s * 1_000_000 + us,
        TimeUnit::MinuteMicrosecond => (mi * 100 + s) * 1_000_000 + us,
        TimeUnit::MinuteSecond => mi * 100 + s,
        TimeUnit::HourMicrosecond => ((h * 100 + mi) * 100 + s) * 1_000_000 + us,
        TimeUnit::HourSecond => (h * 100 + mi) * 100 + s,
        TimeUnit::HourMinute => h * 100 + mi,
        TimeUnit::DayMicrosecond => (((d * 100 + h) * 100 + mi) * 100 + s) * 1_000_000 + us,
        TimeUnit::DaySecond => ((d * 100 + h) * 100 + mi) * 100 + s,
        TimeUnit::DayMinute => (d * 100 + h) * 100 + mi,
        TimeUnit::DayHour => d * 100 + h,
        TimeUnit::YearMonth => y * 100 + mo,
    }
}

/// A period is a YYYYMM or YYMM integer; any other shape is invalid.
pub fn valid_period(p: i64) -> bool {
    !(p < 0 || p % 100 == 0 || p % 100 > 12)
}

/// Months since year 0 of the period's first month. Two-digit years follow
/// the usual 70 pivot.
pub fn period_to_month(period: u64) -> u64 {
    if period == 0 {
        return 0;
    }
    let (mut year, month) = (period / 100, period % 100);
    if year < 70 {
        year += 2000;
    } else if year < 100 {
        year += 1900;
    }
    year * 12 + month - 1
}

pub fn month_to_period(month: u64) -> u64 {
    if month == 0 {
        return 0;
    }
    let mut year = month / 12;
    if year < 70 {
        year += 2000;
    } else if year < 100 {
        year += 1900;
    }
    year * 100 + month % 12 + 1
}

impl PartialEq for Time {
    fn eq(&self, other: &Time) -> bool {
        self.core_bits() == other.core_bits()
    }
}

impl Eq for Time {}

impl PartialOrd for Time {
    fn partial_cmp(&self, other: &Time) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Time {
    fn cmp(&self, other: &Time) -> Ordering {
        self.core_bits().cmp(&other.core_bits())
    }
}

impl fmt::Display for Time {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:04}-{:02}-{:02}",
            self.year(),
            self.month(),
            self.day()
        )?;
        if self.time_type() == TimeType::Date {
            return Ok(());
        }
        write!(
            f,
            " {:02}:{:02}:{:02}",
            self.hour(),
            self.minute(),
            self.second()
        )?;
        let fsp = usize::from(self.fsp());
        if fsp > 0 {
            write!(
                f,
                ".{:0width$}",
                self.micros() / TEN_POW[6 - fsp],
                width = fsp
            )?;
        }
        Ok(())
    }
}

impl fmt::Debug for Time {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:04}-{:02}-{:02} {:02}:{:02}:{:02}.{:06}({:?}: {})",
            self.year(),
            self.month(),
            self.day(),
            self.hour(),
            self.minute(),
            self.second(),
            self.micros(),
            self.time_type(),
            self.fsp()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_valid_datetime() {
        let mut ctx = EvalContext::default();
        let cases = vec![
            ("2019-09-16 10:11:12", "20190916101112", 0, false),
            ("2019-09-16 10:11:12", "190916101112", 0, false),
            ("2019-09-16 10:11:01", "19091610111", 0, false),
            ("2019-09-16 00:00:00", "190916", 0, false),
            ("2019-09-01 00:00:00", "19091", 0, false),
            ("2019-09-16 10:11:12.111", "190916101112.111", 3, false),
            ("2019-09-16 10:11:12.67", "20190916101112.666", 2, true),
            ("2019-09-16 10:11:13.0", "20190916101112.999", 1, true),
            ("2012-12-31 00:00:00", "2012-12-31", 0, false),
            ("2012-12-31 00:00:00", "20121231", 0, false),
            ("2000-12-31 00:00:00", "00-12-31", 0, false),
            ("2019-09-16 10:11:12", "2019-09-16 10:11:12", 0, false),
            ("2019-09-16 10:11:12", "2019-09-16T10:11:12", 0, false),
            ("2019-09-16 10:11:12.7", "2019-09-16T10:11:12.66", 1, true),
            ("2020-01-01 00:00:00.0", "2019-12-31 23:59:59.99", 1, true),
            ("2019-12-31 23:59:59.999", "2019*12&31T23(59)59.999999", 3, false),
            ("2012-02-29 00:00:00", "2012-02-29", 0, false),
        ];
        for (expected, input, fsp, round) in cases {
            let t = Time::parse_datetime(&mut ctx, input, fsp, round).unwrap();
            assert_eq!(t.to_string(), expected, "input {}", input);
        }
    }

    #[test]
    fn test_parse_invalid_datetime() {
        let mut ctx = EvalContext::default();
        let cases = vec![
            "",
            "xxx",
            "1000-01-01 00:00:70",
            "1000-13-01 00:00:00",
            "10000-01-01 00:00:00",
            "1000-09-31 00:00:00",
            "1001-02-29 00:00:00",
            "2011-11-11  10:10:10",
        ];
        for input in cases {
            assert!(
                Time::parse_datetime(&mut ctx, input, 0, false).is_err(),
                "input {:?}",
                input
            );
        }
    }

    #[test]
    fn test_zero_date_modes() {
        use crate::expr::EvalConfig;
        use std::sync::Arc;

        let mut ctx = EvalContext::default();
        let t = Time::parse_datetime(&mut ctx, "0000-00-00 00:00:00", 0, false).unwrap();
        assert!(t.is_zero());

        let mut cfg = EvalConfig::new();
        cfg.set_sql_mode(SqlMode::NO_ZERO_DATE | SqlMode::STRICT_ALL_TABLES);
        let mut ctx = EvalContext::new(Arc::new(cfg));
        assert!(Time::parse_datetime(&mut ctx, "0000-00-00 00:00:00", 0, false).is_err());

        let mut cfg = EvalConfig::new();
        cfg.set_sql_mode(SqlMode::NO_ZERO_DATE);
        let mut ctx = EvalContext::new(Arc::new(cfg));
        let t = Time::parse_datetime(&mut ctx, "0000-00-00 00:00:00", 0, false).unwrap();
        assert!(t.is_zero());
        assert_eq!(ctx.take_warnings().warning_cnt, 1);
    }

    #[test]
    fn test_calc_daynr() {
        assert_eq!(calc_daynr(0, 0, 0), 0);
        assert_eq!(calc_daynr(0, 1, 1), 1);
        assert_eq!(calc_daynr(2024, 1, 1), 739_251);
        assert_eq!(
            calc_daynr(2024, 2, 29) - calc_daynr(2024, 1, 1) + 1,
            60,
            "2024-02-29 is day 60 of a leap year"
        );
    }

    #[test]
    fn test_weekday_and_year_day() {
        let mut ctx = EvalContext::default();
        // 2024-01-01 is a Monday.
        let t = Time::parse_datetime(&mut ctx, "2024-01-01", 0, false).unwrap();
        assert_eq!(t.weekday(), 0);
        let t = Time::parse_datetime(&mut ctx, "2018-12-09", 0, false).unwrap();
        assert_eq!(t.weekday(), 6);
        let t = Time::parse_datetime(&mut ctx, "2016-09-03 00:59:59", 0, false).unwrap();
        assert_eq!(t.year_day(), 247);
    }

    #[test]
    fn test_from_days_round_trip() {
        let mut ctx = EvalContext::default();
        for input in ["2024-02-29", "1970-01-01", "9999-12-31", "0001-01-01"] {
            let t = Time::parse_date(&mut ctx, input).unwrap();
            let back = Time::from_days(i64::from(t.day_number()));
            assert_eq!(back.to_string(), input, "daynr {}", t.day_number());
        }
        assert!(Time::from_days(365).is_zero());
        assert!(Time::from_days(0).is_zero());
    }

    #[test]
    fn test_timestamp_diff() {
        let parse = |s| Time::parse_datetime(&mut EvalContext::default(), s, 6, true).unwrap();
        let cases = vec![
            ("DAY", "2024-01-01", "2024-02-01", 31),
            ("DAY", "2024-02-01", "2024-01-01", -31),
            ("MONTH", "2003-02-01", "2003-05-01", 3),
            ("YEAR", "2002-05-01", "2001-01-01", -1),
            ("MINUTE", "2003-02-01", "2003-05-01 12:05:55", 128_885),
            ("WEEK", "2024-01-01", "2024-01-15", 2),
            ("SECOND", "2024-01-01 00:00:00", "2024-01-01 00:01:01", 61),
            ("MICROSECOND", "2024-01-01 00:00:00", "2024-01-01 00:00:01", 1_000_000),
        ];
        for (unit, t1, t2, expected) in cases {
            let unit = TimeUnit::from_str(unit).unwrap();
            let got = timestamp_diff(unit, parse(t1), parse(t2)).unwrap();
            assert_eq!(got, expected, "{:?} {} {}", unit, t1, t2);
        }
        assert!(TimeUnit::from_str("FORTNIGHT").is_err());
    }

    #[test]
    fn test_period_round_trip() {
        assert!(valid_period(202_401));
        assert!(valid_period(7_001));
        assert!(!valid_period(202_400));
        assert!(!valid_period(202_413));
        assert!(!valid_period(-1));
        assert_eq!(period_to_month(202_401), 2024 * 12);
        assert_eq!(month_to_period(2024 * 12), 202_401);
        assert_eq!(period_to_month(7_001), 1970 * 12);
    }

    #[test]
    fn test_add_interval() {
        let mut ctx = EvalContext::default();
        let t = Time::parse_datetime(&mut ctx, "2024-01-31 10:00:00", 0, false).unwrap();
        let cases = vec![
            (TimeUnit::Day, 1, "2024-02-01 10:00:00"),
            (TimeUnit::Month, 1, "2024-02-29 10:00:00"),
            (TimeUnit::Year, -1, "2023-01-31 10:00:00"),
            (TimeUnit::Hour, 15, "2024-02-01 01:00:00"),
            (TimeUnit::Week, 1, "2024-02-07 10:00:00"),
        ];
        for (unit, v, expected) in cases {
            let got = t.add_interval(unit, v).unwrap();
            assert_eq!(got.to_string(), expected, "{:?} {}", unit, v);
        }
        let got = t.add_interval(TimeUnit::Microsecond, 1).unwrap();
        assert_eq!(got.to_string(), "2024-01-31 10:00:00.000001");
        assert!(t.add_interval(TimeUnit::YearMonth, 1).is_err());
    }

    #[test]
    fn test_round_frac() {
        let mut ctx = EvalContext::default();
        let cases = vec![
            ("2012-12-31 11:30:45.123456", 4, "2012-12-31 11:30:45.1235"),
            ("2012-12-31 11:30:45.123456", 0, "2012-12-31 11:30:45"),
            ("2012-12-31 11:30:45.999999", 0, "2012-12-31 11:30:46"),
            ("2012-12-31 23:59:59.999999", 0, "2013-01-01 00:00:00"),
            ("2012-12-31 23:59:59.999999", 3, "2013-01-01 00:00:00.000"),
        ];
        for (input, fsp, expected) in cases {
            let t = Time::parse_datetime(&mut ctx, input, 6, false).unwrap();
            assert_eq!(t.round_frac(fsp).unwrap().to_string(), expected);
        }
    }

    #[test]
    fn test_extract_datetime_num() {
        let mut ctx = EvalContext::default();
        let t = Time::parse_datetime(&mut ctx, "2024-03-05 11:22:33.456789", 6, false).unwrap();
        let cases = vec![
            (TimeUnit::Year, 2024),
            (TimeUnit::Month, 3),
            (TimeUnit::Day, 5),
            (TimeUnit::Hour, 11),
            (TimeUnit::Quarter, 1),
            (TimeUnit::YearMonth, 202_403),
            (TimeUnit::DayHour, 511),
            (TimeUnit::DayMicrosecond, 5_112_233_456_789),
            (TimeUnit::HourMinute, 1_122),
            (TimeUnit::SecondMicrosecond, 33_456_789),
        ];
        for (unit, expected) in cases {
            assert_eq!(extract_datetime_num(t, unit), expected, "{:?}", unit);
        }
    }

    proptest::proptest! {
        // period_diff(period_add(p, n), p) == n for every well-formed period
        #[test]
        fn prop_period_arithmetic_round_trips(
            year in 1900u64..=2100,
            month in 1u64..=12,
            n in -10_000i64..=10_000,
        ) {
            let p = year * 100 + month;
            proptest::prop_assert!(valid_period(p as i64));
            let added = month_to_period((period_to_month(p) as i64 + n) as u64);
            let diff = period_to_month(added) as i64 - period_to_month(p) as i64;
            proptest::prop_assert_eq!(diff, n);
        }
    }

    #[test]
    fn test_compare_and_zero() {
        let mut ctx = EvalContext::default();
        let a = Time::parse_datetime(&mut ctx, "2011-10-10 11:11:11", 0, false).unwrap();
        let b = Time::parse_datetime(&mut ctx, "2011-10-10 11:11:11.123", 3, false).unwrap();
        assert!(a < b);
        assert!(Time::zero().is_zero());
        assert!(Time::zero().invalid_zero());
        assert_eq!(Time::zero().to_string(), "0000-00-00 00:00:00");
        assert_eq!(Time::zero_date().to_string(), "0000-00-00");
    }
}
