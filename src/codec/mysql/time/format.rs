// Copyright 2024 TiKV Project Authors. Licensed under Apache-2.0.

use std::fmt::Write;

use super::{last_day_of_month, Time, TimeType, WeekMode};
use crate::codec::mysql::duration::Duration;
use crate::codec::TEN_POW;
use crate::error::{Error, Result, DATETIME_STR};
use crate::expr::EvalContext;

pub const MONTH_NAMES: [&str; 12] = [
    "January",
    "February",
    "March",
    "April",
    "May",
    "June",
    "July",
    "August",
    "September",
    "October",
    "November",
    "December",
];

pub const MONTH_NAMES_ABBR: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

/// Weekday names, Monday-first.
pub const WEEKDAY_NAMES: [&str; 7] = [
    "Monday",
    "Tuesday",
    "Wednesday",
    "Thursday",
    "Friday",
    "Saturday",
    "Sunday",
];

pub const WEEKDAY_NAMES_ABBR: [&str; 7] = ["Mon", "Tue", "Wed", "Thu", "Fri", "Sat", "Sun"];

fn abbr_day_of_month(day: u32) -> &'static str {
    match day {
        1 | 21 | 31 => "st",
        2 | 22 => "nd",
        3 | 23 => "rd",
        _ => "th",
    }
}

fn invalid_time_format(v: impl std::fmt::Display) -> Error {
    Error::Other(format!("invalid time format: '{}'", v))
}

fn write_date_pattern(t: Time, spec: char, out: &mut String) -> Result<()> {
    match spec {
        'b' => {
            let m = t.month();
            if m == 0 || m > 12 {
                return Err(invalid_time_format(m));
            }
            out.push_str(MONTH_NAMES_ABBR[(m - 1) as usize]);
        }
        'M' => {
            let m = t.month();
            if m == 0 || m > 12 {
                return Err(invalid_time_format(m));
            }
            out.push_str(MONTH_NAMES[(m - 1) as usize]);
        }
        'm' => write!(out, "{:02}", t.month()).unwrap(),
        'c' => write!(out, "{}", t.month()).unwrap(),
        'D' => write!(out, "{}{}", t.day(), abbr_day_of_month(t.day())).unwrap(),
        'd' => write!(out, "{:02}", t.day()).unwrap(),
        'e' => write!(out, "{}", t.day()).unwrap(),
        'j' => write!(out, "{:03}", t.year_day()).unwrap(),
        'H' => write!(out, "{:02}", t.hour()).unwrap(),
        'k' => write!(out, "{}", t.hour()).unwrap(),
        'h' | 'I' => {
            let h = t.hour();
            if h == 0 || h == 12 {
                out.push_str("12");
            } else {
                write!(out, "{:02}", h % 12).unwrap();
            }
        }
        'l' => {
            let h = t.hour();
            if h == 0 || h == 12 {
                out.push_str("12");
            } else {
                write!(out, "{}", h % 12).unwrap();
            }
        }
        'i' => write!(out, "{:02}", t.minute()).unwrap(),
        'p' => {
            if (t.hour() / 12) % 2 == 0 {
                out.push_str("AM");
            } else {
                out.push_str("PM");
            }
        }
        'r' => {
            let h = t.hour();
            let (h12, ampm) = match h {
                0 => (12, "AM"),
                12 => (12, "PM"),
                _ if h < 12 => (h, "AM"),
                _ => (h - 12, "PM"),
            };
            write!(out, "{:02}:{:02}:{:02} {}", h12, t.minute(), t.second(), ampm).unwrap();
        }
        'T' => write!(out, "{:02}:{:02}:{:02}", t.hour(), t.minute(), t.second()).unwrap(),
        'S' | 's' => write!(out, "{:02}", t.second()).unwrap(),
        'f' => write!(out, "{:06}", t.micros()).unwrap(),
        'U' => write!(out, "{:02}", t.week(WeekMode::from_bits_truncate(0))).unwrap(),
        'u' => write!(out, "{:02}", t.week(WeekMode::from_bits_truncate(1))).unwrap(),
        'V' => write!(out, "{:02}", t.week(WeekMode::from_bits_truncate(2))).unwrap(),
        'v' => {
            let (_, week) = t.year_week(WeekMode::from_bits_truncate(3));
            write!(out, "{:02}", week).unwrap();
        }
        'a' => out.push_str(WEEKDAY_NAMES_ABBR[t.weekday() as usize]),
        'W' => out.push_str(WEEKDAY_NAMES[t.weekday() as usize]),
        'w' => {
            // Sunday-first weekday index.
            write!(out, "{}", (t.weekday() + 1) % 7).unwrap();
        }
        'X' => {
            let (year, _) = t.year_week(WeekMode::from_bits_truncate(2));
            if year < 0 {
                write!(out, "{}", u32::MAX).unwrap();
            } else {
                write!(out, "{:04}", year).unwrap();
            }
        }
        'x' => {
            let (year, _) = t.year_week(WeekMode::from_bits_truncate(3));
            if year < 0 {
                write!(out, "{}", u32::MAX).unwrap();
            } else {
                write!(out, "{:04}", year).unwrap();
            }
        }
        'Y' => write!(out, "{:04}", t.year()).unwrap(),
        'y' => write!(out, "{:02}", t.year() % 100).unwrap(),
        _ => out.push(spec),
    }
    Ok(())
}

/// DATE_FORMAT: renders `t` according to a `%`-pattern layout.
pub fn date_format(t: Time, layout: &str) -> Result<String> {
    let mut out = String::with_capacity(layout.len());
    let mut pattern = false;
    for ch in layout.chars() {
        if pattern {
            write_date_pattern(t, ch, &mut out)?;
            pattern = false;
        } else if ch == '%' {
            pattern = true;
        } else {
            out.push(ch);
        }
    }
    Ok(out)
}

/// TIME_FORMAT: like DATE_FORMAT but over a duration, so hour patterns may
/// print values past 23 and date patterns render as zero.
pub fn duration_format(d: Duration, layout: &str) -> Result<String> {
    let mut out = String::with_capacity(layout.len());
    let mut pattern = false;
    for ch in layout.chars() {
        if !pattern {
            if ch == '%' {
                pattern = true;
            } else {
                out.push(ch);
            }
            continue;
        }
        pattern = false;
        let h = d.hours();
        match ch {
            'H' => write!(out, "{:02}", h).unwrap(),
            'k' => write!(out, "{}", h).unwrap(),
            'h' | 'I' => {
                if h % 12 == 0 {
                    out.push_str("12");
                } else {
                    write!(out, "{:02}", h % 12).unwrap();
                }
            }
            'l' => {
                if h % 12 == 0 {
                    out.push_str("12");
                } else {
                    write!(out, "{}", h % 12).unwrap();
                }
            }
            'i' => write!(out, "{:02}", d.minutes()).unwrap(),
            'S' | 's' => write!(out, "{:02}", d.secs()).unwrap(),
            'f' => write!(out, "{:06}", d.subsec_micros()).unwrap(),
            'p' => {
                if h % 24 < 12 {
                    out.push_str("AM");
                } else {
                    out.push_str("PM");
                }
            }
            'r' => {
                let h24 = h % 24;
                let (h12, ampm) = match h24 {
                    0 => (12, "AM"),
                    12 => (12, "PM"),
                    _ if h24 < 12 => (h24, "AM"),
                    _ => (h24 - 12, "PM"),
                };
                write!(out, "{:02}:{:02}:{:02} {}", h12, d.minutes(), d.secs(), ampm).unwrap();
            }
            'T' => write!(out, "{:02}:{:02}:{:02}", h, d.minutes(), d.secs()).unwrap(),
            'Y' => out.push_str("0000"),
            'y' => out.push_str("00"),
            'm' | 'd' => out.push_str("00"),
            'c' | 'e' => out.push('0'),
            'b' | 'M' | 'a' | 'W' | 'D' | 'j' | 'w' | 'U' | 'u' | 'V' | 'v' | 'X' | 'x' => {
                return Err(invalid_time_format(ch));
            }
            _ => out.push(ch),
        }
    }
    Ok(out)
}

/// GET_FORMAT pattern table: time class crossed with one of five location
/// tags. Unknown combinations yield an empty pattern, not an error.
pub fn get_format(time_class: &str, location: &str) -> &'static str {
    match time_class {
        "DATE" => match location {
            "USA" => "%m.%d.%Y",
            "JIS" => "%Y-%m-%d",
            "ISO" => "%Y-%m-%d",
            "EUR" => "%d.%m.%Y",
            "INTERNAL" => "%Y%m%d",
            _ => "",
        },
        "DATETIME" | "TIMESTAMP" => match location {
            "USA" => "%Y-%m-%d %H.%i.%s",
            "JIS" => "%Y-%m-%d %H:%i:%s",
            "ISO" => "%Y-%m-%d %H:%i:%s",
            "EUR" => "%Y-%m-%d %H.%i.%s",
            "INTERNAL" => "%Y%m%d%H%i%s",
            _ => "",
        },
        "TIME" => match location {
            "USA" => "%h:%i:%s %p",
            "JIS" => "%H:%i:%s",
            "ISO" => "%H:%i:%s",
            "EUR" => "%H.%i.%s",
            "INTERNAL" => "%H%i%s",
            _ => "",
        },
        _ => "",
    }
}

fn take_digits(inp: &mut &str, max: usize) -> Option<(u32, usize)> {
    let n = inp
        .bytes()
        .take(max)
        .take_while(u8::is_ascii_digit)
        .count();
    if n == 0 {
        return None;
    }
    let v = inp[..n].parse().ok()?;
    *inp = &inp[n..];
    Some((v, n))
}

fn take_char(inp: &mut &str, expected: char) -> Option<()> {
    let ch = inp.chars().next()?;
    if ch != expected {
        return None;
    }
    *inp = &inp[ch.len_utf8()..];
    Some(())
}

fn take_name(inp: &mut &str, names: &[&str]) -> Option<usize> {
    for (i, name) in names.iter().enumerate() {
        if let Some(head) = inp.get(..name.len()) {
            if head.eq_ignore_ascii_case(name) {
                *inp = &inp[name.len()..];
                return Some(i);
            }
        }
    }
    None
}

fn take_ampm(inp: &mut &str) -> Option<bool> {
    match take_name(inp, &["AM", "PM"])? {
        0 => Some(false),
        _ => Some(true),
    }
}

#[derive(Default)]
struct ParsedDate {
    year: u32,
    month: u32,
    day: u32,
    hour: u32,
    minute: u32,
    second: u32,
    micro: u32,
    hour12: Option<u32>,
    pm: bool,
    has_ampm: bool,
    day_of_year: Option<u32>,
}

impl ParsedDate {
    fn apply_pattern(&mut self, spec: char, inp: &mut &str) -> Option<()> {
        match spec {
            'Y' => {
                let (v, n) = take_digits(inp, 4)?;
                self.year = if n <= 2 { Time::adjust_year(v) } else { v };
            }
            'y' => {
                let (v, _) = take_digits(inp, 2)?;
                self.year = Time::adjust_year(v);
            }
            'm' | 'c' => self.month = take_digits(inp, 2)?.0,
            'd' | 'e' => self.day = take_digits(inp, 2)?.0,
            'H' | 'k' => self.hour = take_digits(inp, 2)?.0,
            'h' | 'I' | 'l' => self.hour12 = Some(take_digits(inp, 2)?.0),
            'i' => self.minute = take_digits(inp, 2)?.0,
            's' | 'S' => self.second = take_digits(inp, 2)?.0,
            'f' => {
                let (v, n) = take_digits(inp, 6)?;
                self.micro = v * TEN_POW[6 - n];
            }
            'j' => self.day_of_year = Some(take_digits(inp, 3)?.0),
            'b' => self.month = take_name(inp, &MONTH_NAMES_ABBR)? as u32 + 1,
            'M' => self.month = take_name(inp, &MONTH_NAMES)? as u32 + 1,
            // weekday names are validated but carry no value
            'a' => {
                take_name(inp, &WEEKDAY_NAMES_ABBR)?;
            }
            'W' => {
                take_name(inp, &WEEKDAY_NAMES)?;
            }
            'p' => {
                self.pm = take_ampm(inp)?;
                self.has_ampm = true;
            }
            'r' => {
                self.hour12 = Some(take_digits(inp, 2)?.0);
                take_char(inp, ':')?;
                self.minute = take_digits(inp, 2)?.0;
                take_char(inp, ':')?;
                self.second = take_digits(inp, 2)?.0;
                *inp = inp.trim_start();
                self.pm = take_ampm(inp)?;
                self.has_ampm = true;
            }
            'T' => {
                self.hour = take_digits(inp, 2)?.0;
                take_char(inp, ':')?;
                self.minute = take_digits(inp, 2)?.0;
                take_char(inp, ':')?;
                self.second = take_digits(inp, 2)?.0;
            }
            _ => return None,
        }
        Some(())
    }

    fn finish(mut self) -> Option<(u32, u32, u32, u32, u32, u32, u32)> {
        if self.has_ampm || self.hour12.is_some() {
            let h12 = self.hour12?;
            if h12 == 0 || h12 > 12 {
                return None;
            }
            self.hour = h12 % 12 + if self.pm { 12 } else { 0 };
        }
        if let Some(doy) = self.day_of_year {
            if self.month != 0 || self.day != 0 || doy == 0 {
                return None;
            }
            let t = Time::from_days(
                i64::from(super::calc_daynr(self.year as i32, 1, 1)) + i64::from(doy) - 1,
            );
            if t.is_zero() || t.year() != self.year {
                return None;
            }
            self.month = t.month();
            self.day = t.day();
        }
        if self.month > 12 || self.day > 31 || self.hour > 23 || self.minute > 59 || self.second > 59
        {
            return None;
        }
        if self.month > 0 && self.day > last_day_of_month(self.year, self.month) {
            return None;
        }
        Some((
            self.year,
            self.month,
            self.day,
            self.hour,
            self.minute,
            self.second,
            self.micro,
        ))
    }
}

/// STR_TO_DATE: parses `input` according to a `%`-pattern layout. `None`
/// means the input does not match the pattern or names an impossible
/// date; SQL-mode handling of zero fields is the caller's concern.
/// Trailing unparsed input only produces a truncation warning.
pub fn str_to_date(ctx: &mut EvalContext, input: &str, format: &str) -> Option<Time> {
    let mut parsed = ParsedDate::default();
    let mut inp = input.trim();
    let mut chars = format.chars();
    while let Some(ch) = chars.next() {
        if ch.is_whitespace() {
            inp = inp.trim_start();
            continue;
        }
        if ch == '%' {
            let spec = chars.next()?;
            if spec == '%' {
                take_char(&mut inp, '%')?;
                continue;
            }
            inp = inp.trim_start();
            parsed.apply_pattern(spec, &mut inp)?;
        } else {
            take_char(&mut inp, ch)?;
        }
    }
    let (year, month, day, hour, minute, second, micro) = parsed.finish()?;
    if !inp.trim().is_empty() {
        ctx.warnings
            .append_warning(Error::truncated_wrong_value(DATETIME_STR, input));
    }
    Some(Time::from_parts(
        year,
        month,
        day,
        hour,
        minute,
        second,
        micro,
        6,
        TimeType::DateTime,
    ))
}
