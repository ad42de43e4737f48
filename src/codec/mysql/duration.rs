// Copyright 2024 TiKV Project Authors. Licensed under Apache-2.0.

use std::cmp::Ordering;
use std::fmt::{self, Display, Formatter};

use crate::codec::mysql::check_fsp;
use crate::codec::TEN_POW;
use crate::error::{Error, Result, TIME_STR};
use crate::expr::EvalContext;

pub const NANOS_PER_MICRO: i64 = 1_000;
pub const NANOS_PER_SEC: i64 = 1_000_000_000;
pub const NANOS_PER_MINUTE: i64 = 60 * NANOS_PER_SEC;
pub const NANOS_PER_HOUR: i64 = 3_600 * NANOS_PER_SEC;

/// Upper bound of the MySQL TIME range, 838:59:59.
pub const MAX_HOUR_PART: u32 = 838;
const MAX_NANOS: i64 = ((MAX_HOUR_PART as i64 * 60 + 59) * 60 + 59) * NANOS_PER_SEC;

/// A MySQL TIME value: a signed elapsed time, not a time of day.
#[derive(Debug, Clone, Copy, Default)]
pub struct Duration {
    nanos: i64,
    fsp: u8,
}

impl Duration {
    pub fn zero() -> Duration {
        Duration { nanos: 0, fsp: 0 }
    }

    /// Largest representable duration at the given precision.
    pub fn max_value(fsp: u8) -> Duration {
        Duration {
            nanos: MAX_NANOS,
            fsp,
        }
    }

    pub fn from_nanos(nanos: i64, fsp: i8) -> Result<Duration> {
        let fsp = check_fsp(fsp)?;
        if nanos.abs() > MAX_NANOS {
            return Err(Error::truncated_wrong_value(TIME_STR, nanos));
        }
        Ok(Duration { nanos, fsp })
    }

    #[inline]
    pub fn to_nanos(self) -> i64 {
        self.nanos
    }

    #[inline]
    pub fn fsp(self) -> u8 {
        self.fsp
    }

    #[inline]
    pub fn is_neg(self) -> bool {
        self.nanos < 0
    }

    #[inline]
    pub fn is_zero(self) -> bool {
        self.nanos == 0
    }

    /// Hour component of the magnitude; may exceed 23.
    #[inline]
    pub fn hours(self) -> u32 {
        (self.nanos.abs() / NANOS_PER_HOUR) as u32
    }

    #[inline]
    pub fn minutes(self) -> u32 {
        (self.nanos.abs() / NANOS_PER_MINUTE % 60) as u32
    }

    #[inline]
    pub fn secs(self) -> u32 {
        (self.nanos.abs() / NANOS_PER_SEC % 60) as u32
    }

    #[inline]
    pub fn subsec_micros(self) -> u32 {
        (self.nanos.abs() % NANOS_PER_SEC / NANOS_PER_MICRO) as u32
    }

    /// Whole seconds, truncated toward zero, sign preserved.
    #[inline]
    pub fn to_secs(self) -> i64 {
        self.nanos / NANOS_PER_SEC
    }

    /// Rounds the fractional part to `fsp` digits, clamping a carry past the
    /// TIME range back to the range boundary.
    pub fn round_frac(self, fsp: i8) -> Result<Duration> {
        let fsp = check_fsp(fsp)?;
        let base = i64::from(TEN_POW[9 - fsp as usize]);
        let rounded = (self.nanos.abs() + base / 2) / base * base;
        let nanos = rounded.min(MAX_NANOS) * self.nanos.signum();
        Ok(Duration { nanos, fsp })
    }

    /// Parses a MySQL TIME literal: `[-][D ]HH:MM:SS[.frac]`, `[-]HH:MM`,
    /// or a bare number read as right-aligned HHMMSS. Values beyond the
    /// TIME range are clamped to 838:59:59 with a truncation warning.
    pub fn parse(ctx: &mut EvalContext, input: &str, fsp: i8) -> Result<Duration> {
        let fsp = check_fsp(fsp)?;
        let mut s = input.trim();
        if s.is_empty() {
            return Err(Error::truncated_wrong_value(TIME_STR, input));
        }

        let neg = s.starts_with('-');
        if neg {
            s = &s[1..];
        }

        let mut day: u64 = 0;
        if let Some((day_part, rest)) = s.split_once(' ') {
            day = parse_decimal_u64(day_part)
                .ok_or_else(|| Error::truncated_wrong_value(TIME_STR, input))?;
            s = rest.trim_start();
        }

        let (clock, frac_str) = match s.split_once('.') {
            Some((clock, frac)) => (clock, frac),
            None => (s, ""),
        };

        let (hour, minute, second): (u64, u64, u64) = if clock.contains(':') {
            let parts: Vec<&str> = clock.split(':').collect();
            if parts.len() > 3 {
                return Err(Error::truncated_wrong_value(TIME_STR, input));
            }
            let mut hms = [0u64; 3];
            for (i, part) in parts.iter().enumerate() {
                hms[i] = parse_decimal_u64(part)
                    .ok_or_else(|| Error::truncated_wrong_value(TIME_STR, input))?;
            }
            (hms[0], hms[1], hms[2])
        } else {
            let v = if clock.is_empty() {
                0
            } else {
                parse_decimal_u64(clock)
                    .ok_or_else(|| Error::truncated_wrong_value(TIME_STR, input))?
            };
            (v / 10_000, v / 100 % 100, v % 100)
        };

        if minute > 59 || second > 59 {
            return Err(Error::truncated_wrong_value(TIME_STR, input));
        }

        let frac_nanos = parse_frac_nanos(frac_str)
            .ok_or_else(|| Error::truncated_wrong_value(TIME_STR, input))?;

        let secs = (day as i64)
            .saturating_mul(24)
            .saturating_add(hour as i64)
            .saturating_mul(3_600)
            .saturating_add(minute as i64 * 60 + second as i64);
        let mut nanos = secs
            .saturating_mul(NANOS_PER_SEC)
            .saturating_add(frac_nanos);

        let base = i64::from(TEN_POW[9 - fsp as usize]);
        nanos = (nanos.saturating_add(base / 2)) / base * base;

        if nanos > MAX_NANOS {
            ctx.warnings
                .append_warning(Error::truncated_wrong_value(TIME_STR, input));
            nanos = MAX_NANOS;
        }
        if neg {
            nanos = -nanos;
        }
        Ok(Duration { nanos, fsp })
    }
}

fn parse_decimal_u64(s: &str) -> Option<u64> {
    if s.is_empty() || !s.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    s.parse().ok()
}

/// Parses fractional digits into nanoseconds, truncating past nanosecond
/// precision.
fn parse_frac_nanos(s: &str) -> Option<i64> {
    if s.is_empty() {
        return Some(0);
    }
    if !s.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let digits = &s[..s.len().min(9)];
    let v: i64 = digits.parse().ok()?;
    Some(v * i64::from(TEN_POW[9 - digits.len()]))
}

impl Display for Duration {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        if self.is_neg() {
            f.write_str("-")?;
        }
        write!(
            f,
            "{:02}:{:02}:{:02}",
            self.hours(),
            self.minutes(),
            self.secs()
        )?;
        if self.fsp > 0 {
            write!(
                f,
                ".{:0width$}",
                self.subsec_micros() / TEN_POW[6 - self.fsp as usize],
                width = self.fsp as usize
            )?;
        }
        Ok(())
    }
}

impl PartialEq for Duration {
    fn eq(&self, other: &Duration) -> bool {
        self.nanos == other.nanos
    }
}

impl Eq for Duration {}

impl PartialOrd for Duration {
    fn partial_cmp(&self, other: &Duration) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Duration {
    fn cmp(&self, other: &Duration) -> Ordering {
        self.nanos.cmp(&other.nanos)
    }
}
