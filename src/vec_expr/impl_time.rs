// Copyright 2024 TiKV Project Authors. Licensed under Apache-2.0.

use chrono::{Timelike, Utc};
use rust_decimal::prelude::ToPrimitive;

use super::{RowBatch, VectorExpr};
use crate::codec::data_type::{
    ChunkedVecBytes, ChunkedVecSized, Decimal, EvalType, Int, VectorValue,
};
use crate::codec::mysql::time::{self as mytime, format as timefmt, Time, TimeType, TimeUnit};
use crate::codec::mysql::time::WeekMode;
use crate::codec::mysql::{Duration, MAX_FSP, MIN_FSP, UNSPECIFIED_FSP};
use crate::error::{Error, Result};
use crate::expr::buffer::{BufferPool, ScratchColumn};
use crate::expr::{EvalContext, SqlMode};

fn eval_arg<'a>(
    ctx: &mut EvalContext,
    pool: &'a BufferPool,
    arg: &dyn VectorExpr,
    input: &RowBatch,
    tp: EvalType,
) -> Result<ScratchColumn<'a>> {
    let mut buf = pool.acquire(tp, input.num_rows())?;
    arg.eval_vec(ctx, input, &mut buf)?;
    Ok(buf)
}

fn check_fsp_arg(fsp: i64, func: &'static str) -> Result<i8> {
    if fsp > i64::from(MAX_FSP) {
        return Err(Error::TooBigPrecision {
            fsp,
            func,
            max: MAX_FSP as u8,
        });
    }
    if fsp < i64::from(MIN_FSP) {
        return Err(Error::NegativePrecision(fsp));
    }
    Ok(fsp as i8)
}

fn bytes_to_str(b: &[u8]) -> Result<&str> {
    std::str::from_utf8(b).map_err(|_| Error::encoding(String::from_utf8_lossy(b)))
}

fn broadcast_int(n: usize, v: Int) -> VectorValue {
    let mut col: ChunkedVecSized<Int> = ChunkedVecSized::with_capacity(n);
    col.resize(n, false);
    for slot in col.values_mut() {
        *slot = v;
    }
    VectorValue::Int(col)
}

fn broadcast_time(n: usize, t: Time) -> VectorValue {
    let mut col: ChunkedVecSized<Time> = ChunkedVecSized::with_capacity(n);
    col.resize(n, false);
    for slot in col.values_mut() {
        *slot = t;
    }
    VectorValue::DateTime(col)
}

fn broadcast_duration(n: usize, d: Duration) -> VectorValue {
    let mut col: ChunkedVecSized<Duration> = ChunkedVecSized::with_capacity(n);
    col.resize(n, false);
    for slot in col.values_mut() {
        *slot = d;
    }
    VectorValue::Duration(col)
}

/// The statement timestamp as a datetime value at the given precision.
fn eval_now(ctx: &mut EvalContext, fsp: i8) -> Result<Time> {
    let ts = ctx.stmt_ts();
    Time::from_chrono_datetime(&ts, TimeType::DateTime, MAX_FSP as u8)?.round_frac(fsp)
}

fn eval_utc_timestamp(ctx: &mut EvalContext, fsp: i8) -> Result<Time> {
    let ts = ctx.cfg.stmt_ts;
    Time::from_chrono_datetime(&ts, TimeType::DateTime, MAX_FSP as u8)?.round_frac(fsp)
}

fn clock_duration(dt: &impl Timelike, fsp: i8) -> Result<Duration> {
    let nanos = (i64::from(dt.hour()) * 3_600 + i64::from(dt.minute()) * 60
        + i64::from(dt.second()))
        * 1_000_000_000
        + i64::from(dt.nanosecond().min(999_999_999));
    Duration::from_nanos(nanos, MAX_FSP)?.round_frac(fsp)
}

pub fn year(
    ctx: &mut EvalContext,
    pool: &BufferPool,
    args: &[&dyn VectorExpr],
    input: &RowBatch,
) -> Result<VectorValue> {
    let n = input.num_rows();
    let buf = eval_arg(ctx, pool, args[0], input, EvalType::DateTime)?;
    let mut result: ChunkedVecSized<Int> = ChunkedVecSized::with_capacity(n);
    result.resize(n, false);
    result.bitmap_mut().and_assign(buf.bitmap());
    let ds = buf.as_time_vec();
    for i in 0..n {
        if result.is_null(i) {
            continue;
        }
        let t = ds.values()[i];
        if t.is_zero() {
            if ctx.cfg.sql_mode.contains(SqlMode::NO_ZERO_DATE) {
                ctx.handle_invalid_time_error(Error::incorrect_datetime_value(t))?;
                result.set_null(i, true);
                continue;
            }
            result.values_mut()[i] = 0;
            continue;
        }
        result.values_mut()[i] = i64::from(t.year());
    }
    Ok(VectorValue::Int(result))
}

pub fn month(
    ctx: &mut EvalContext,
    pool: &BufferPool,
    args: &[&dyn VectorExpr],
    input: &RowBatch,
) -> Result<VectorValue> {
    let n = input.num_rows();
    let buf = eval_arg(ctx, pool, args[0], input, EvalType::DateTime)?;
    let mut result: ChunkedVecSized<Int> = ChunkedVecSized::with_capacity(n);
    result.resize(n, false);
    result.bitmap_mut().and_assign(buf.bitmap());
    let ds = buf.as_time_vec();
    for i in 0..n {
        if result.is_null(i) {
            continue;
        }
        let t = ds.values()[i];
        if t.is_zero() {
            if ctx.cfg.sql_mode.contains(SqlMode::NO_ZERO_DATE) {
                ctx.handle_invalid_time_error(Error::incorrect_datetime_value(t))?;
                result.set_null(i, true);
                continue;
            }
            result.values_mut()[i] = 0;
            continue;
        }
        result.values_mut()[i] = i64::from(t.month());
    }
    Ok(VectorValue::Int(result))
}

pub fn day_of_month(
    ctx: &mut EvalContext,
    pool: &BufferPool,
    args: &[&dyn VectorExpr],
    input: &RowBatch,
) -> Result<VectorValue> {
    let n = input.num_rows();
    let buf = eval_arg(ctx, pool, args[0], input, EvalType::DateTime)?;
    let mut result: ChunkedVecSized<Int> = ChunkedVecSized::with_capacity(n);
    result.resize(n, false);
    result.bitmap_mut().and_assign(buf.bitmap());
    let ds = buf.as_time_vec();
    for i in 0..n {
        if result.is_null(i) {
            continue;
        }
        let t = ds.values()[i];
        if t.is_zero() {
            if ctx.cfg.sql_mode.contains(SqlMode::NO_ZERO_DATE) {
                ctx.handle_invalid_time_error(Error::incorrect_datetime_value(t))?;
                result.set_null(i, true);
                continue;
            }
            result.values_mut()[i] = 0;
            continue;
        }
        result.values_mut()[i] = i64::from(t.day());
    }
    Ok(VectorValue::Int(result))
}

pub fn day_of_week(
    ctx: &mut EvalContext,
    pool: &BufferPool,
    args: &[&dyn VectorExpr],
    input: &RowBatch,
) -> Result<VectorValue> {
    let n = input.num_rows();
    let buf = eval_arg(ctx, pool, args[0], input, EvalType::DateTime)?;
    let mut result: ChunkedVecSized<Int> = ChunkedVecSized::with_capacity(n);
    result.resize(n, false);
    result.bitmap_mut().and_assign(buf.bitmap());
    let ds = buf.as_time_vec();
    for i in 0..n {
        if result.is_null(i) {
            continue;
        }
        let t = ds.values()[i];
        if t.invalid_zero() {
            ctx.handle_invalid_time_error(Error::incorrect_datetime_value(t))?;
            result.set_null(i, true);
            continue;
        }
        // Sunday is 1 ... Saturday is 7.
        result.values_mut()[i] = i64::from((t.weekday() + 1) % 7 + 1);
    }
    Ok(VectorValue::Int(result))
}

pub fn day_of_year(
    ctx: &mut EvalContext,
    pool: &BufferPool,
    args: &[&dyn VectorExpr],
    input: &RowBatch,
) -> Result<VectorValue> {
    let n = input.num_rows();
    let buf = eval_arg(ctx, pool, args[0], input, EvalType::DateTime)?;
    let mut result: ChunkedVecSized<Int> = ChunkedVecSized::with_capacity(n);
    result.resize(n, false);
    result.bitmap_mut().and_assign(buf.bitmap());
    let ds = buf.as_time_vec();
    for i in 0..n {
        if result.is_null(i) {
            continue;
        }
        let t = ds.values()[i];
        if t.invalid_zero() {
            ctx.handle_invalid_time_error(Error::incorrect_datetime_value(t))?;
            result.set_null(i, true);
            continue;
        }
        result.values_mut()[i] = i64::from(t.year_day());
    }
    Ok(VectorValue::Int(result))
}

pub fn week_day(
    ctx: &mut EvalContext,
    pool: &BufferPool,
    args: &[&dyn VectorExpr],
    input: &RowBatch,
) -> Result<VectorValue> {
    let n = input.num_rows();
    let buf = eval_arg(ctx, pool, args[0], input, EvalType::DateTime)?;
    let mut result: ChunkedVecSized<Int> = ChunkedVecSized::with_capacity(n);
    result.resize(n, false);
    result.bitmap_mut().and_assign(buf.bitmap());
    let ds = buf.as_time_vec();
    for i in 0..n {
        if result.is_null(i) {
            continue;
        }
        let t = ds.values()[i];
        if t.invalid_zero() {
            ctx.handle_invalid_time_error(Error::incorrect_datetime_value(t))?;
            result.set_null(i, true);
            continue;
        }
        // Monday is 0 ... Sunday is 6.
        result.values_mut()[i] = i64::from(t.weekday());
    }
    Ok(VectorValue::Int(result))
}

pub fn quarter(
    ctx: &mut EvalContext,
    pool: &BufferPool,
    args: &[&dyn VectorExpr],
    input: &RowBatch,
) -> Result<VectorValue> {
    let n = input.num_rows();
    let buf = eval_arg(ctx, pool, args[0], input, EvalType::DateTime)?;
    let mut result: ChunkedVecSized<Int> = ChunkedVecSized::with_capacity(n);
    result.resize(n, false);
    result.bitmap_mut().and_assign(buf.bitmap());
    let ds = buf.as_time_vec();
    for i in 0..n {
        if result.is_null(i) {
            continue;
        }
        let t = ds.values()[i];
        if t.is_zero() {
            ctx.handle_invalid_time_error(Error::incorrect_datetime_value(t))?;
            result.set_null(i, true);
            continue;
        }
        result.values_mut()[i] = i64::from((t.month() + 2) / 3);
    }
    Ok(VectorValue::Int(result))
}

pub fn week_with_mode(
    ctx: &mut EvalContext,
    pool: &BufferPool,
    args: &[&dyn VectorExpr],
    input: &RowBatch,
) -> Result<VectorValue> {
    let n = input.num_rows();
    let buf1 = eval_arg(ctx, pool, args[0], input, EvalType::DateTime)?;
    let buf2 = eval_arg(ctx, pool, args[1], input, EvalType::Int)?;
    let mut result: ChunkedVecSized<Int> = ChunkedVecSized::with_capacity(n);
    result.resize(n, false);
    let ds = buf1.as_time_vec();
    let ms = buf2.as_int_vec();
    for i in 0..n {
        if ds.is_null(i) {
            result.set_null(i, true);
            continue;
        }
        let t = ds.values()[i];
        if t.is_zero() {
            ctx.handle_invalid_time_error(Error::incorrect_datetime_value(t))?;
            result.set_null(i, true);
            continue;
        }
        if ms.is_null(i) {
            result.set_null(i, true);
            continue;
        }
        let mode = WeekMode::from_bits_truncate(ms.values()[i] as u32);
        result.values_mut()[i] = i64::from(t.week(mode));
    }
    Ok(VectorValue::Int(result))
}

pub fn week_without_mode(
    ctx: &mut EvalContext,
    pool: &BufferPool,
    args: &[&dyn VectorExpr],
    input: &RowBatch,
) -> Result<VectorValue> {
    let n = input.num_rows();
    let buf = eval_arg(ctx, pool, args[0], input, EvalType::DateTime)?;
    let mut result: ChunkedVecSized<Int> = ChunkedVecSized::with_capacity(n);
    result.resize(n, false);
    result.bitmap_mut().and_assign(buf.bitmap());

    let mode_str = ctx.cfg.default_week_format.clone();
    let mode = if mode_str.is_empty() {
        0
    } else {
        match mode_str.parse::<u32>() {
            Ok(m) => m,
            Err(_) => {
                ctx.handle_invalid_time_error(Error::InvalidWeekModeFormat(mode_str))?;
                return Ok(VectorValue::Int(result));
            }
        }
    };
    let mode = WeekMode::from_bits_truncate(mode);

    let ds = buf.as_time_vec();
    for i in 0..n {
        if result.is_null(i) {
            continue;
        }
        let t = ds.values()[i];
        if t.is_zero() {
            ctx.handle_invalid_time_error(Error::incorrect_datetime_value(t))?;
            result.set_null(i, true);
            continue;
        }
        result.values_mut()[i] = i64::from(t.week(mode));
    }
    Ok(VectorValue::Int(result))
}

pub fn week_of_year(
    ctx: &mut EvalContext,
    pool: &BufferPool,
    args: &[&dyn VectorExpr],
    input: &RowBatch,
) -> Result<VectorValue> {
    let n = input.num_rows();
    let buf = eval_arg(ctx, pool, args[0], input, EvalType::DateTime)?;
    let mut result: ChunkedVecSized<Int> = ChunkedVecSized::with_capacity(n);
    result.resize(n, false);
    result.bitmap_mut().and_assign(buf.bitmap());
    let ds = buf.as_time_vec();
    for i in 0..n {
        if result.is_null(i) {
            continue;
        }
        let t = ds.values()[i];
        if t.is_zero() {
            ctx.handle_invalid_time_error(Error::incorrect_datetime_value(t))?;
            result.set_null(i, true);
            continue;
        }
        result.values_mut()[i] = i64::from(t.week(WeekMode::from_bits_truncate(3)));
    }
    Ok(VectorValue::Int(result))
}

fn year_week_value(t: Time, mode: WeekMode) -> Int {
    let (year, week) = t.year_week(mode);
    let value = i64::from(week) + i64::from(year) * 100;
    if value < 0 {
        i64::from(u32::MAX)
    } else {
        value
    }
}

pub fn year_week_with_mode(
    ctx: &mut EvalContext,
    pool: &BufferPool,
    args: &[&dyn VectorExpr],
    input: &RowBatch,
) -> Result<VectorValue> {
    let n = input.num_rows();
    let buf1 = eval_arg(ctx, pool, args[0], input, EvalType::DateTime)?;
    let buf2 = eval_arg(ctx, pool, args[1], input, EvalType::Int)?;
    let mut result: ChunkedVecSized<Int> = ChunkedVecSized::with_capacity(n);
    result.resize(n, false);
    result.bitmap_mut().and_assign(buf1.bitmap());
    let ds = buf1.as_time_vec();
    let ms = buf2.as_int_vec();
    for i in 0..n {
        if result.is_null(i) {
            continue;
        }
        let t = ds.values()[i];
        if t.is_zero() {
            ctx.handle_invalid_time_error(Error::incorrect_datetime_value(t))?;
            result.set_null(i, true);
            continue;
        }
        // A null mode argument falls back to mode 0, not a null result.
        let mode = if ms.is_null(i) { 0 } else { ms.values()[i] as u32 };
        result.values_mut()[i] = year_week_value(t, WeekMode::from_bits_truncate(mode));
    }
    Ok(VectorValue::Int(result))
}

pub fn year_week_without_mode(
    ctx: &mut EvalContext,
    pool: &BufferPool,
    args: &[&dyn VectorExpr],
    input: &RowBatch,
) -> Result<VectorValue> {
    let n = input.num_rows();
    let buf = eval_arg(ctx, pool, args[0], input, EvalType::DateTime)?;
    let mut result: ChunkedVecSized<Int> = ChunkedVecSized::with_capacity(n);
    result.resize(n, false);
    result.bitmap_mut().and_assign(buf.bitmap());
    let ds = buf.as_time_vec();
    for i in 0..n {
        if result.is_null(i) {
            continue;
        }
        let t = ds.values()[i];
        if t.invalid_zero() {
            ctx.handle_invalid_time_error(Error::incorrect_datetime_value(t))?;
            result.set_null(i, true);
            continue;
        }
        result.values_mut()[i] = year_week_value(t, WeekMode::from_bits_truncate(0));
    }
    Ok(VectorValue::Int(result))
}

macro_rules! duration_component_fn {
    ($name:ident, $getter:ident) => {
        pub fn $name(
            ctx: &mut EvalContext,
            pool: &BufferPool,
            args: &[&dyn VectorExpr],
            input: &RowBatch,
        ) -> Result<VectorValue> {
            let n = input.num_rows();
            let buf = eval_arg(ctx, pool, args[0], input, EvalType::Duration)?;
            let mut result: ChunkedVecSized<Int> = ChunkedVecSized::with_capacity(n);
            result.resize(n, false);
            result.bitmap_mut().and_assign(buf.bitmap());
            let ds = buf.as_duration_vec();
            for i in 0..n {
                if result.is_null(i) {
                    continue;
                }
                result.values_mut()[i] = i64::from(ds.values()[i].$getter());
            }
            Ok(VectorValue::Int(result))
        }
    };
}

duration_component_fn! { hour, hours }
duration_component_fn! { minute, minutes }
duration_component_fn! { second, secs }
duration_component_fn! { micro_second, subsec_micros }

pub fn time_to_sec(
    ctx: &mut EvalContext,
    pool: &BufferPool,
    args: &[&dyn VectorExpr],
    input: &RowBatch,
) -> Result<VectorValue> {
    let n = input.num_rows();
    let buf = eval_arg(ctx, pool, args[0], input, EvalType::Duration)?;
    let mut result: ChunkedVecSized<Int> = ChunkedVecSized::with_capacity(n);
    result.resize(n, false);
    result.bitmap_mut().and_assign(buf.bitmap());
    let ds = buf.as_duration_vec();
    for i in 0..n {
        if result.is_null(i) {
            continue;
        }
        result.values_mut()[i] = ds.values()[i].to_secs();
    }
    Ok(VectorValue::Int(result))
}

pub fn to_days(
    ctx: &mut EvalContext,
    pool: &BufferPool,
    args: &[&dyn VectorExpr],
    input: &RowBatch,
) -> Result<VectorValue> {
    let n = input.num_rows();
    let buf = eval_arg(ctx, pool, args[0], input, EvalType::DateTime)?;
    let mut result: ChunkedVecSized<Int> = ChunkedVecSized::with_capacity(n);
    result.resize(n, false);
    result.bitmap_mut().and_assign(buf.bitmap());
    let ds = buf.as_time_vec();
    for i in 0..n {
        if result.is_null(i) {
            continue;
        }
        let t = ds.values()[i];
        let ret = mytime::timestamp_diff(TimeUnit::Day, Time::zero(), t)?;
        if ret == 0 {
            ctx.handle_invalid_time_error(Error::incorrect_datetime_value(t))?;
            result.set_null(i, true);
            continue;
        }
        result.values_mut()[i] = ret;
    }
    Ok(VectorValue::Int(result))
}

pub fn to_seconds(
    ctx: &mut EvalContext,
    pool: &BufferPool,
    args: &[&dyn VectorExpr],
    input: &RowBatch,
) -> Result<VectorValue> {
    let n = input.num_rows();
    let buf = eval_arg(ctx, pool, args[0], input, EvalType::DateTime)?;
    let mut result: ChunkedVecSized<Int> = ChunkedVecSized::with_capacity(n);
    result.resize(n, false);
    result.bitmap_mut().and_assign(buf.bitmap());
    let ds = buf.as_time_vec();
    for i in 0..n {
        if result.is_null(i) {
            continue;
        }
        let t = ds.values()[i];
        let ret = mytime::timestamp_diff(TimeUnit::Second, Time::zero(), t)?;
        if ret == 0 {
            ctx.handle_invalid_time_error(Error::incorrect_datetime_value(t))?;
            result.set_null(i, true);
            continue;
        }
        result.values_mut()[i] = ret;
    }
    Ok(VectorValue::Int(result))
}

pub fn date_diff(
    ctx: &mut EvalContext,
    pool: &BufferPool,
    args: &[&dyn VectorExpr],
    input: &RowBatch,
) -> Result<VectorValue> {
    let n = input.num_rows();
    let buf0 = eval_arg(ctx, pool, args[0], input, EvalType::DateTime)?;
    let buf1 = eval_arg(ctx, pool, args[1], input, EvalType::DateTime)?;
    let mut result: ChunkedVecSized<Int> = ChunkedVecSized::with_capacity(n);
    result.resize(n, false);
    result.bitmap_mut().and_assign(buf0.bitmap());
    result.bitmap_mut().and_assign(buf1.bitmap());
    let lhs = buf0.as_time_vec();
    let rhs = buf1.as_time_vec();
    for i in 0..n {
        if result.is_null(i) {
            continue;
        }
        let (a, b) = (lhs.values()[i], rhs.values()[i]);
        if a.invalid_zero() || b.invalid_zero() {
            if a.invalid_zero() {
                ctx.handle_invalid_time_error(Error::incorrect_datetime_value(a))?;
            }
            if b.invalid_zero() {
                ctx.handle_invalid_time_error(Error::incorrect_datetime_value(b))?;
            }
            result.set_null(i, true);
            continue;
        }
        result.values_mut()[i] = i64::from(a.day_number() - b.day_number());
    }
    Ok(VectorValue::Int(result))
}

pub fn period_add(
    ctx: &mut EvalContext,
    pool: &BufferPool,
    args: &[&dyn VectorExpr],
    input: &RowBatch,
) -> Result<VectorValue> {
    let n = input.num_rows();
    let buf0 = eval_arg(ctx, pool, args[0], input, EvalType::Int)?;
    let buf1 = eval_arg(ctx, pool, args[1], input, EvalType::Int)?;
    let mut result: ChunkedVecSized<Int> = ChunkedVecSized::with_capacity(n);
    result.resize(n, false);
    result.bitmap_mut().and_assign(buf0.bitmap());
    result.bitmap_mut().and_assign(buf1.bitmap());
    let ps = buf0.as_int_vec();
    let ns = buf1.as_int_vec();
    for i in 0..n {
        if result.is_null(i) {
            continue;
        }
        // In MySQL an invalid p with a NULL n still yields NULL, so null
        // checks come before the validity check.
        let p = ps.values()[i];
        if !mytime::valid_period(p) {
            return Err(Error::IncorrectArgs("period_add"));
        }
        let sum_month = mytime::period_to_month(p as u64) as i64 + ns.values()[i];
        result.values_mut()[i] = mytime::month_to_period(sum_month.max(0) as u64) as i64;
    }
    Ok(VectorValue::Int(result))
}

pub fn period_diff(
    ctx: &mut EvalContext,
    pool: &BufferPool,
    args: &[&dyn VectorExpr],
    input: &RowBatch,
) -> Result<VectorValue> {
    let n = input.num_rows();
    let buf0 = eval_arg(ctx, pool, args[0], input, EvalType::Int)?;
    let buf1 = eval_arg(ctx, pool, args[1], input, EvalType::Int)?;
    let mut result: ChunkedVecSized<Int> = ChunkedVecSized::with_capacity(n);
    result.resize(n, false);
    result.bitmap_mut().and_assign(buf0.bitmap());
    result.bitmap_mut().and_assign(buf1.bitmap());
    let ps1 = buf0.as_int_vec();
    let ps2 = buf1.as_int_vec();
    for i in 0..n {
        if result.is_null(i) {
            continue;
        }
        let (p1, p2) = (ps1.values()[i], ps2.values()[i]);
        if !mytime::valid_period(p1) || !mytime::valid_period(p2) {
            return Err(Error::IncorrectArgs("period_diff"));
        }
        result.values_mut()[i] =
            mytime::period_to_month(p1 as u64) as i64 - mytime::period_to_month(p2 as u64) as i64;
    }
    Ok(VectorValue::Int(result))
}

pub fn timestamp_diff(
    ctx: &mut EvalContext,
    pool: &BufferPool,
    args: &[&dyn VectorExpr],
    input: &RowBatch,
) -> Result<VectorValue> {
    let n = input.num_rows();
    let unit_buf = eval_arg(ctx, pool, args[0], input, EvalType::Bytes)?;
    let lhs_buf = eval_arg(ctx, pool, args[1], input, EvalType::DateTime)?;
    let rhs_buf = eval_arg(ctx, pool, args[2], input, EvalType::DateTime)?;
    let mut result: ChunkedVecSized<Int> = ChunkedVecSized::with_capacity(n);
    result.resize(n, false);
    result.bitmap_mut().and_assign(unit_buf.bitmap());
    result.bitmap_mut().and_assign(lhs_buf.bitmap());
    result.bitmap_mut().and_assign(rhs_buf.bitmap());
    let units = unit_buf.as_bytes_vec();
    let lhs = lhs_buf.as_time_vec();
    let rhs = rhs_buf.as_time_vec();
    for i in 0..n {
        if result.is_null(i) {
            continue;
        }
        let (a, b) = (lhs.values()[i], rhs.values()[i]);
        if a.invalid_zero() || b.invalid_zero() {
            if a.invalid_zero() {
                ctx.handle_invalid_time_error(Error::incorrect_datetime_value(a))?;
            }
            if b.invalid_zero() {
                ctx.handle_invalid_time_error(Error::incorrect_datetime_value(b))?;
            }
            result.set_null(i, true);
            continue;
        }
        let unit = TimeUnit::from_str(bytes_to_str(units.get(i).unwrap_or_default())?)?;
        result.values_mut()[i] = mytime::timestamp_diff(unit, a, b)?;
    }
    Ok(VectorValue::Int(result))
}

pub fn extract_datetime(
    ctx: &mut EvalContext,
    pool: &BufferPool,
    args: &[&dyn VectorExpr],
    input: &RowBatch,
) -> Result<VectorValue> {
    let n = input.num_rows();
    let unit_buf = eval_arg(ctx, pool, args[0], input, EvalType::Bytes)?;
    let time_buf = eval_arg(ctx, pool, args[1], input, EvalType::DateTime)?;
    let mut result: ChunkedVecSized<Int> = ChunkedVecSized::with_capacity(n);
    result.resize(n, false);
    result.bitmap_mut().and_assign(unit_buf.bitmap());
    result.bitmap_mut().and_assign(time_buf.bitmap());
    let units = unit_buf.as_bytes_vec();
    let ds = time_buf.as_time_vec();
    for i in 0..n {
        if result.is_null(i) {
            continue;
        }
        let unit = TimeUnit::from_str(bytes_to_str(units.get(i).unwrap_or_default())?)?;
        result.values_mut()[i] = mytime::extract_datetime_num(ds.values()[i], unit);
    }
    Ok(VectorValue::Int(result))
}

pub fn unix_timestamp_current(ctx: &mut EvalContext, input: &RowBatch) -> Result<VectorValue> {
    let ts = ctx.cfg.stmt_ts.timestamp();
    if ts < 0 {
        log::warn!(
            "statement timestamp {} predates the epoch; UNIX_TIMESTAMP() yields 0",
            ts
        );
    }
    Ok(broadcast_int(input.num_rows(), ts.max(0)))
}

pub fn date(
    ctx: &mut EvalContext,
    pool: &BufferPool,
    args: &[&dyn VectorExpr],
    input: &RowBatch,
) -> Result<VectorValue> {
    let n = input.num_rows();
    let buf = eval_arg(ctx, pool, args[0], input, EvalType::DateTime)?;
    let mut result: ChunkedVecSized<Time> = ChunkedVecSized::with_capacity(n);
    result.resize(n, false);
    result.bitmap_mut().and_assign(buf.bitmap());
    let ds = buf.as_time_vec();
    for i in 0..n {
        if result.is_null(i) {
            continue;
        }
        let t = ds.values()[i];
        if t.is_zero() {
            ctx.handle_invalid_time_error(Error::incorrect_datetime_value(t))?;
            result.set_null(i, true);
            continue;
        }
        result.values_mut()[i] = t.truncated_to_date();
    }
    Ok(VectorValue::DateTime(result))
}

pub fn last_day(
    ctx: &mut EvalContext,
    pool: &BufferPool,
    args: &[&dyn VectorExpr],
    input: &RowBatch,
) -> Result<VectorValue> {
    let n = input.num_rows();
    let buf = eval_arg(ctx, pool, args[0], input, EvalType::DateTime)?;
    let mut result: ChunkedVecSized<Time> = ChunkedVecSized::with_capacity(n);
    result.resize(n, false);
    result.bitmap_mut().and_assign(buf.bitmap());
    let ds = buf.as_time_vec();
    for i in 0..n {
        if result.is_null(i) {
            continue;
        }
        let t = ds.values()[i];
        if t.invalid_zero() {
            ctx.handle_invalid_time_error(Error::incorrect_datetime_value(t))?;
            result.set_null(i, true);
            continue;
        }
        result.values_mut()[i] = Time::from_ymd(t.year(), t.month(), t.last_day_of_month());
    }
    Ok(VectorValue::DateTime(result))
}

pub fn from_days(
    ctx: &mut EvalContext,
    pool: &BufferPool,
    args: &[&dyn VectorExpr],
    input: &RowBatch,
) -> Result<VectorValue> {
    let n = input.num_rows();
    let buf = eval_arg(ctx, pool, args[0], input, EvalType::Int)?;
    let mut result: ChunkedVecSized<Time> = ChunkedVecSized::with_capacity(n);
    result.resize(n, false);
    result.bitmap_mut().and_assign(buf.bitmap());
    let days = buf.as_int_vec();
    for i in 0..n {
        if result.is_null(i) {
            continue;
        }
        result.values_mut()[i] = Time::from_days(days.values()[i]);
    }
    Ok(VectorValue::DateTime(result))
}

pub fn make_date(
    ctx: &mut EvalContext,
    pool: &BufferPool,
    args: &[&dyn VectorExpr],
    input: &RowBatch,
) -> Result<VectorValue> {
    let n = input.num_rows();
    let buf1 = eval_arg(ctx, pool, args[0], input, EvalType::Int)?;
    let buf2 = eval_arg(ctx, pool, args[1], input, EvalType::Int)?;
    let mut result: ChunkedVecSized<Time> = ChunkedVecSized::with_capacity(n);
    result.resize(n, false);
    result.bitmap_mut().and_assign(buf1.bitmap());
    result.bitmap_mut().and_assign(buf2.bitmap());
    let years = buf1.as_int_vec();
    let days = buf2.as_int_vec();
    for i in 0..n {
        if result.is_null(i) {
            continue;
        }
        let (mut year, day) = (years.values()[i], days.values()[i]);
        if day <= 0 || !(0..=9999).contains(&year) {
            result.set_null(i, true);
            continue;
        }
        if year < 70 {
            year += 2000;
        } else if year < 100 {
            year += 1900;
        }
        let start = Time::from_ymd(year as u32, 1, 1);
        let start_daynr = mytime::timestamp_diff(TimeUnit::Day, Time::zero(), start)?;
        if start_daynr == 0 {
            ctx.handle_invalid_time_error(Error::incorrect_datetime_value(start))?;
            result.set_null(i, true);
            continue;
        }
        let ret = Time::from_days(start_daynr + day - 1);
        if ret.is_zero() || ret.year() > 9999 {
            result.set_null(i, true);
            continue;
        }
        result.values_mut()[i] = ret;
    }
    Ok(VectorValue::DateTime(result))
}

pub fn str_to_date_date(
    ctx: &mut EvalContext,
    pool: &BufferPool,
    args: &[&dyn VectorExpr],
    input: &RowBatch,
) -> Result<VectorValue> {
    let n = input.num_rows();
    let str_buf = eval_arg(ctx, pool, args[0], input, EvalType::Bytes)?;
    let fmt_buf = eval_arg(ctx, pool, args[1], input, EvalType::Bytes)?;
    let mut result: ChunkedVecSized<Time> = ChunkedVecSized::with_capacity(n);
    result.resize(n, false);
    result.bitmap_mut().and_assign(str_buf.bitmap());
    result.bitmap_mut().and_assign(fmt_buf.bitmap());
    let strs = str_buf.as_bytes_vec();
    let fmts = fmt_buf.as_bytes_vec();
    let no_zero_date = ctx.cfg.sql_mode.contains(SqlMode::NO_ZERO_DATE);
    for i in 0..n {
        if result.is_null(i) {
            continue;
        }
        let s = bytes_to_str(strs.get(i).unwrap_or_default())?;
        let layout = bytes_to_str(fmts.get(i).unwrap_or_default())?;
        let t = match timefmt::str_to_date(ctx, s, layout) {
            Some(t) => t,
            None => {
                ctx.handle_invalid_time_error(Error::incorrect_datetime_value(Time::zero()))?;
                result.set_null(i, true);
                continue;
            }
        };
        if no_zero_date && (t.year() == 0 || t.month() == 0 || t.day() == 0) {
            ctx.handle_invalid_time_error(Error::incorrect_datetime_value(t))?;
            result.set_null(i, true);
            continue;
        }
        result.values_mut()[i] = t.truncated_to_date();
    }
    Ok(VectorValue::DateTime(result))
}

pub fn str_to_date_datetime(
    ctx: &mut EvalContext,
    pool: &BufferPool,
    args: &[&dyn VectorExpr],
    input: &RowBatch,
    fsp: i8,
) -> Result<VectorValue> {
    let fsp = crate::codec::mysql::check_fsp(fsp)?;
    let n = input.num_rows();
    let str_buf = eval_arg(ctx, pool, args[0], input, EvalType::Bytes)?;
    let fmt_buf = eval_arg(ctx, pool, args[1], input, EvalType::Bytes)?;
    let mut result: ChunkedVecSized<Time> = ChunkedVecSized::with_capacity(n);
    result.resize(n, false);
    result.bitmap_mut().and_assign(str_buf.bitmap());
    result.bitmap_mut().and_assign(fmt_buf.bitmap());
    let strs = str_buf.as_bytes_vec();
    let fmts = fmt_buf.as_bytes_vec();
    let no_zero_date = ctx.cfg.sql_mode.contains(SqlMode::NO_ZERO_DATE);
    for i in 0..n {
        if result.is_null(i) {
            continue;
        }
        let s = bytes_to_str(strs.get(i).unwrap_or_default())?;
        let layout = bytes_to_str(fmts.get(i).unwrap_or_default())?;
        let mut t = match timefmt::str_to_date(ctx, s, layout) {
            Some(t) => t,
            None => {
                ctx.handle_invalid_time_error(Error::incorrect_datetime_value(Time::zero()))?;
                result.set_null(i, true);
                continue;
            }
        };
        if no_zero_date && (t.year() == 0 || t.month() == 0 || t.day() == 0) {
            ctx.handle_invalid_time_error(Error::incorrect_datetime_value(t))?;
            result.set_null(i, true);
            continue;
        }
        t.set_fsp(fsp);
        result.values_mut()[i] = t;
    }
    Ok(VectorValue::DateTime(result))
}

pub fn str_to_date_duration(
    ctx: &mut EvalContext,
    pool: &BufferPool,
    args: &[&dyn VectorExpr],
    input: &RowBatch,
    fsp: i8,
) -> Result<VectorValue> {
    let fsp = crate::codec::mysql::check_fsp(fsp)?;
    let n = input.num_rows();
    let str_buf = eval_arg(ctx, pool, args[0], input, EvalType::Bytes)?;
    let fmt_buf = eval_arg(ctx, pool, args[1], input, EvalType::Bytes)?;
    let mut result: ChunkedVecSized<Duration> = ChunkedVecSized::with_capacity(n);
    result.resize(n, false);
    result.bitmap_mut().and_assign(str_buf.bitmap());
    result.bitmap_mut().and_assign(fmt_buf.bitmap());
    let strs = str_buf.as_bytes_vec();
    let fmts = fmt_buf.as_bytes_vec();
    let no_zero_date = ctx.cfg.sql_mode.contains(SqlMode::NO_ZERO_DATE);
    for i in 0..n {
        if result.is_null(i) {
            continue;
        }
        let s = bytes_to_str(strs.get(i).unwrap_or_default())?;
        let layout = bytes_to_str(fmts.get(i).unwrap_or_default())?;
        let mut t = match timefmt::str_to_date(ctx, s, layout) {
            Some(t) => t,
            None => {
                ctx.handle_invalid_time_error(Error::incorrect_datetime_value(Time::zero()))?;
                result.set_null(i, true);
                continue;
            }
        };
        if no_zero_date && (t.year() == 0 || t.month() == 0 || t.day() == 0) {
            ctx.handle_invalid_time_error(Error::incorrect_datetime_value(t))?;
            result.set_null(i, true);
            continue;
        }
        t.set_fsp(fsp);
        result.values_mut()[i] = t.to_duration()?;
    }
    Ok(VectorValue::Duration(result))
}

fn eval_from_unix_time(ctx: &mut EvalContext, fsp: i8, d: Decimal) -> Result<Option<Time>> {
    if d.is_sign_negative() {
        return Ok(None);
    }
    let secs = match d.trunc().to_i64() {
        Some(v) if v <= i64::from(i32::MAX) => v,
        _ => return Ok(None),
    };
    let micros_dec = (d.fract() * Decimal::from(1_000_000i64)).round();
    let mut micros = micros_dec.to_u32().unwrap_or(0);
    let mut secs = secs;
    if micros >= 1_000_000 {
        secs += 1;
        micros -= 1_000_000;
    }
    let fsp = if fsp == UNSPECIFIED_FSP {
        d.scale().min(6) as i8
    } else {
        fsp
    };
    let t = Time::from_unix_sec(&ctx.cfg.tz, secs, micros, MAX_FSP as u8)?;
    Ok(Some(t.round_frac(fsp)?))
}

pub fn from_unix_time_1_arg(
    ctx: &mut EvalContext,
    pool: &BufferPool,
    args: &[&dyn VectorExpr],
    input: &RowBatch,
    fsp: i8,
) -> Result<VectorValue> {
    let n = input.num_rows();
    let buf = eval_arg(ctx, pool, args[0], input, EvalType::Decimal)?;
    let mut result: ChunkedVecSized<Time> = ChunkedVecSized::with_capacity(n);
    result.resize(n, false);
    result.bitmap_mut().and_assign(buf.bitmap());
    let ds = buf.as_decimal_vec();
    for i in 0..n {
        if result.is_null(i) {
            continue;
        }
        match eval_from_unix_time(ctx, fsp, ds.values()[i])? {
            Some(t) => result.values_mut()[i] = t,
            None => result.set_null(i, true),
        }
    }
    Ok(VectorValue::DateTime(result))
}

pub fn from_unix_time_2_arg(
    ctx: &mut EvalContext,
    pool: &BufferPool,
    args: &[&dyn VectorExpr],
    input: &RowBatch,
    fsp: i8,
) -> Result<VectorValue> {
    let n = input.num_rows();
    let buf1 = eval_arg(ctx, pool, args[0], input, EvalType::Decimal)?;
    let buf2 = eval_arg(ctx, pool, args[1], input, EvalType::Bytes)?;
    let mut result = ChunkedVecBytes::with_capacity(n);
    result.reserve(n);
    let ds = buf1.as_decimal_vec();
    let fmts = buf2.as_bytes_vec();
    for i in 0..n {
        if ds.is_null(i) || fmts.is_null(i) {
            result.push_null();
            continue;
        }
        let t = match eval_from_unix_time(ctx, fsp, ds.values()[i])? {
            Some(t) => t,
            None => {
                result.push_null();
                continue;
            }
        };
        let layout = bytes_to_str(fmts.get(i).unwrap_or_default())?;
        let formatted = timefmt::date_format(t, layout)?;
        result.push_data(formatted.into_bytes());
    }
    Ok(VectorValue::Bytes(result))
}

pub fn timestamp_1_arg(
    ctx: &mut EvalContext,
    pool: &BufferPool,
    args: &[&dyn VectorExpr],
    input: &RowBatch,
) -> Result<VectorValue> {
    let n = input.num_rows();
    let buf = eval_arg(ctx, pool, args[0], input, EvalType::Bytes)?;
    let mut result: ChunkedVecSized<Time> = ChunkedVecSized::with_capacity(n);
    result.resize(n, false);
    result.bitmap_mut().and_assign(buf.bitmap());
    let strs = buf.as_bytes_vec();
    for i in 0..n {
        if result.is_null(i) {
            continue;
        }
        let s = bytes_to_str(strs.get(i).unwrap_or_default())?;
        match Time::parse_datetime(ctx, s, mytime::fsp_from_str(s), true) {
            Ok(t) => result.values_mut()[i] = t,
            Err(err) => {
                ctx.handle_invalid_time_error(err)?;
                result.set_null(i, true);
            }
        }
    }
    Ok(VectorValue::DateTime(result))
}

fn is_duration_str(s: &str) -> bool {
    let s = s.strip_prefix('-').unwrap_or(s);
    let (clock, frac) = match s.split_once('.') {
        Some((clock, frac)) => (clock, Some(frac)),
        None => (s, None),
    };
    if let Some(frac) = frac {
        if frac.len() > 6 || !frac.bytes().all(|b| b.is_ascii_digit()) {
            return false;
        }
    }
    let parts: Vec<&str> = clock.split(':').collect();
    if !(2..=3).contains(&parts.len()) {
        return false;
    }
    if parts[0].is_empty() || !parts[0].bytes().all(|b| b.is_ascii_digit()) {
        return false;
    }
    parts[1..]
        .iter()
        .all(|p| !p.is_empty() && p.len() <= 2 && p.bytes().all(|b| b.is_ascii_digit()))
}

pub fn timestamp_2_args(
    ctx: &mut EvalContext,
    pool: &BufferPool,
    args: &[&dyn VectorExpr],
    input: &RowBatch,
) -> Result<VectorValue> {
    let n = input.num_rows();
    let buf0 = eval_arg(ctx, pool, args[0], input, EvalType::Bytes)?;
    let buf1 = eval_arg(ctx, pool, args[1], input, EvalType::Bytes)?;
    let mut result: ChunkedVecSized<Time> = ChunkedVecSized::with_capacity(n);
    result.resize(n, false);
    result.bitmap_mut().and_assign(buf0.bitmap());
    result.bitmap_mut().and_assign(buf1.bitmap());
    let args0 = buf0.as_bytes_vec();
    let args1 = buf1.as_bytes_vec();
    for i in 0..n {
        if result.is_null(i) {
            continue;
        }
        let arg0 = bytes_to_str(args0.get(i).unwrap_or_default())?;
        let arg1 = bytes_to_str(args1.get(i).unwrap_or_default())?;
        let t = match Time::parse_datetime(ctx, arg0, mytime::fsp_from_str(arg0), true) {
            Ok(t) => t,
            Err(err) => {
                ctx.handle_invalid_time_error(err)?;
                result.set_null(i, true);
                continue;
            }
        };
        if !is_duration_str(arg1) {
            result.set_null(i, true);
            continue;
        }
        let d = match Duration::parse(ctx, arg1, mytime::fsp_from_str(arg1)) {
            Ok(d) => d,
            Err(err) => {
                ctx.handle_invalid_time_error(err)?;
                result.set_null(i, true);
                continue;
            }
        };
        result.values_mut()[i] = t.checked_add_duration(d)?;
    }
    Ok(VectorValue::DateTime(result))
}

pub fn sysdate_with_fsp(
    ctx: &mut EvalContext,
    pool: &BufferPool,
    args: &[&dyn VectorExpr],
    input: &RowBatch,
) -> Result<VectorValue> {
    let n = input.num_rows();
    let buf = eval_arg(ctx, pool, args[0], input, EvalType::Int)?;
    let now = Utc::now().with_timezone(&ctx.cfg.tz);
    let mut result: ChunkedVecSized<Time> = ChunkedVecSized::with_capacity(n);
    result.resize(n, false);
    result.bitmap_mut().and_assign(buf.bitmap());
    let fsps = buf.as_int_vec();
    for i in 0..n {
        if result.is_null(i) {
            continue;
        }
        let fsp = check_fsp_arg(fsps.values()[i], "sysdate")?;
        let t =
            Time::from_chrono_datetime(&now, TimeType::DateTime, MAX_FSP as u8)?.round_frac(fsp)?;
        result.values_mut()[i] = t;
    }
    Ok(VectorValue::DateTime(result))
}

pub fn sysdate_without_fsp(ctx: &mut EvalContext, input: &RowBatch) -> Result<VectorValue> {
    let now = Utc::now().with_timezone(&ctx.cfg.tz);
    let t = Time::from_chrono_datetime(&now, TimeType::DateTime, MAX_FSP as u8)?.round_frac(0)?;
    Ok(broadcast_time(input.num_rows(), t))
}

pub fn now_with_arg(
    ctx: &mut EvalContext,
    pool: &BufferPool,
    args: &[&dyn VectorExpr],
    input: &RowBatch,
) -> Result<VectorValue> {
    let n = input.num_rows();
    let buf = eval_arg(ctx, pool, args[0], input, EvalType::Int)?;
    let mut result: ChunkedVecSized<Time> = ChunkedVecSized::with_capacity(n);
    result.resize(n, false);
    let fsps = buf.as_int_vec();
    for i in 0..n {
        let fsp = if fsps.is_null(i) {
            0
        } else {
            check_fsp_arg(fsps.values()[i], "now")?
        };
        result.values_mut()[i] = eval_now(ctx, fsp)?;
    }
    Ok(VectorValue::DateTime(result))
}

pub fn now_without_arg(ctx: &mut EvalContext, input: &RowBatch) -> Result<VectorValue> {
    let t = eval_now(ctx, 0)?;
    Ok(broadcast_time(input.num_rows(), t))
}

pub fn current_date(ctx: &mut EvalContext, input: &RowBatch) -> Result<VectorValue> {
    let ts = ctx.stmt_ts();
    let t = Time::from_chrono_datetime(&ts, TimeType::DateTime, 0)?.truncated_to_date();
    Ok(broadcast_time(input.num_rows(), t))
}

pub fn current_time_0_arg(ctx: &mut EvalContext, input: &RowBatch) -> Result<VectorValue> {
    let ts = ctx.stmt_ts();
    let d = clock_duration(&ts, 0)?;
    Ok(broadcast_duration(input.num_rows(), d))
}

pub fn current_time_1_arg(
    ctx: &mut EvalContext,
    pool: &BufferPool,
    args: &[&dyn VectorExpr],
    input: &RowBatch,
) -> Result<VectorValue> {
    let n = input.num_rows();
    let buf = eval_arg(ctx, pool, args[0], input, EvalType::Int)?;
    let ts = ctx.stmt_ts();
    let mut result: ChunkedVecSized<Duration> = ChunkedVecSized::with_capacity(n);
    result.resize(n, false);
    let fsps = buf.as_int_vec();
    for i in 0..n {
        let fsp = if fsps.is_null(i) {
            0
        } else {
            check_fsp_arg(fsps.values()[i], "curtime")?
        };
        result.values_mut()[i] = clock_duration(&ts, fsp)?;
    }
    Ok(VectorValue::Duration(result))
}

pub fn utc_date(ctx: &mut EvalContext, input: &RowBatch) -> Result<VectorValue> {
    let ts = ctx.cfg.stmt_ts;
    let t = Time::from_chrono_datetime(&ts, TimeType::DateTime, 0)?.truncated_to_date();
    Ok(broadcast_time(input.num_rows(), t))
}

pub fn utc_timestamp_with_arg(
    ctx: &mut EvalContext,
    pool: &BufferPool,
    args: &[&dyn VectorExpr],
    input: &RowBatch,
) -> Result<VectorValue> {
    let n = input.num_rows();
    let buf = eval_arg(ctx, pool, args[0], input, EvalType::Int)?;
    let mut result: ChunkedVecSized<Time> = ChunkedVecSized::with_capacity(n);
    result.resize(n, false);
    result.bitmap_mut().and_assign(buf.bitmap());
    let fsps = buf.as_int_vec();
    for i in 0..n {
        if result.is_null(i) {
            continue;
        }
        let fsp = check_fsp_arg(fsps.values()[i], "utc_timestamp")?;
        result.values_mut()[i] = eval_utc_timestamp(ctx, fsp)?;
    }
    Ok(VectorValue::DateTime(result))
}

pub fn utc_timestamp_without_arg(ctx: &mut EvalContext, input: &RowBatch) -> Result<VectorValue> {
    let t = eval_utc_timestamp(ctx, 0)?;
    Ok(broadcast_time(input.num_rows(), t))
}

pub fn utc_time_with_arg(
    ctx: &mut EvalContext,
    pool: &BufferPool,
    args: &[&dyn VectorExpr],
    input: &RowBatch,
) -> Result<VectorValue> {
    let n = input.num_rows();
    let buf = eval_arg(ctx, pool, args[0], input, EvalType::Int)?;
    let ts = ctx.cfg.stmt_ts;
    let mut result: ChunkedVecSized<Duration> = ChunkedVecSized::with_capacity(n);
    result.resize(n, false);
    result.bitmap_mut().and_assign(buf.bitmap());
    let fsps = buf.as_int_vec();
    for i in 0..n {
        if result.is_null(i) {
            continue;
        }
        let fsp = check_fsp_arg(fsps.values()[i], "utc_time")?;
        result.values_mut()[i] = clock_duration(&ts, fsp)?;
    }
    Ok(VectorValue::Duration(result))
}

pub fn utc_time_without_arg(ctx: &mut EvalContext, input: &RowBatch) -> Result<VectorValue> {
    let ts = ctx.cfg.stmt_ts;
    let d = clock_duration(&ts, 0)?;
    Ok(broadcast_duration(input.num_rows(), d))
}

pub fn sec_to_time(
    ctx: &mut EvalContext,
    pool: &BufferPool,
    args: &[&dyn VectorExpr],
    input: &RowBatch,
    fsp: i8,
) -> Result<VectorValue> {
    let n = input.num_rows();
    let buf = eval_arg(ctx, pool, args[0], input, EvalType::Real)?;
    let mut result: ChunkedVecSized<Duration> = ChunkedVecSized::with_capacity(n);
    result.resize(n, false);
    result.bitmap_mut().and_assign(buf.bitmap());
    let vals = buf.as_real_vec();
    let max_nanos = Duration::max_value(MAX_FSP as u8).to_nanos();
    for i in 0..n {
        if result.is_null(i) {
            continue;
        }
        let v = vals.values()[i];
        let neg = v < 0.0;
        let abs = v.abs();
        let whole_secs = if abs >= max_nanos as f64 / 1e9 {
            // already past the TIME ceiling, no fraction needed
            i64::MAX / 2
        } else {
            abs as i64
        };
        let nanos = if whole_secs / 3_600 > 838 {
            max_nanos
        } else {
            let frac = abs - whole_secs as f64;
            (whole_secs * 1_000_000_000 + (frac * 1e9).round() as i64).min(max_nanos)
        };
        let signed = if neg { -nanos } else { nanos };
        result.values_mut()[i] = Duration::from_nanos(signed, MAX_FSP)?.round_frac(fsp)?;
    }
    Ok(VectorValue::Duration(result))
}

pub fn time(
    ctx: &mut EvalContext,
    pool: &BufferPool,
    args: &[&dyn VectorExpr],
    input: &RowBatch,
) -> Result<VectorValue> {
    let n = input.num_rows();
    let buf = eval_arg(ctx, pool, args[0], input, EvalType::Bytes)?;
    let mut result: ChunkedVecSized<Duration> = ChunkedVecSized::with_capacity(n);
    result.resize(n, false);
    result.bitmap_mut().and_assign(buf.bitmap());
    let strs = buf.as_bytes_vec();
    for i in 0..n {
        if result.is_null(i) {
            continue;
        }
        let expr = bytes_to_str(strs.get(i).unwrap_or_default())?;
        // fsp is implied by the literal, and an oversized one is a
        // precision error rather than a value error
        let fsp = match expr.rfind('.') {
            Some(idx) => (expr.len() - idx - 1) as i8,
            None => 0,
        };
        let fsp = crate::codec::mysql::check_fsp(fsp)?;
        match Duration::parse(ctx, expr, fsp as i8) {
            Ok(d) => result.values_mut()[i] = d,
            Err(err) => ctx.handle_truncate_err(err)?,
        }
    }
    Ok(VectorValue::Duration(result))
}

pub fn date_literal(ctx: &mut EvalContext, input: &RowBatch, lit: Time) -> Result<VectorValue> {
    let mode = ctx.cfg.sql_mode;
    if mode.contains(SqlMode::NO_ZERO_DATE) && lit.is_zero() {
        return Err(Error::incorrect_datetime_value(lit));
    }
    if mode.contains(SqlMode::NO_ZERO_IN_DATE) && lit.invalid_zero() && !lit.is_zero() {
        return Err(Error::incorrect_datetime_value(lit));
    }
    Ok(broadcast_time(input.num_rows(), lit))
}

pub fn time_literal(
    _ctx: &mut EvalContext,
    input: &RowBatch,
    lit: Duration,
) -> Result<VectorValue> {
    Ok(broadcast_duration(input.num_rows(), lit))
}

pub fn timestamp_literal(
    _ctx: &mut EvalContext,
    input: &RowBatch,
    lit: Time,
) -> Result<VectorValue> {
    Ok(broadcast_time(input.num_rows(), lit))
}

pub fn date_format(
    ctx: &mut EvalContext,
    pool: &BufferPool,
    args: &[&dyn VectorExpr],
    input: &RowBatch,
) -> Result<VectorValue> {
    let n = input.num_rows();
    let time_buf = eval_arg(ctx, pool, args[0], input, EvalType::DateTime)?;
    let fmt_buf = eval_arg(ctx, pool, args[1], input, EvalType::Bytes)?;
    let mut result = ChunkedVecBytes::with_capacity(n);
    result.reserve(n);
    let ds = time_buf.as_time_vec();
    let fmts = fmt_buf.as_bytes_vec();
    for i in 0..n {
        if ds.is_null(i) || fmts.is_null(i) {
            result.push_null();
            continue;
        }
        let t = ds.values()[i];
        if t.invalid_zero() {
            ctx.handle_invalid_time_error(Error::incorrect_datetime_value(t))?;
            result.push_null();
            continue;
        }
        let layout = bytes_to_str(fmts.get(i).unwrap_or_default())?;
        match timefmt::date_format(t, layout) {
            Ok(s) => result.push_data(s.into_bytes()),
            Err(err) => {
                ctx.handle_invalid_time_error(err)?;
                result.push_null();
            }
        }
    }
    Ok(VectorValue::Bytes(result))
}

pub fn time_format(
    ctx: &mut EvalContext,
    pool: &BufferPool,
    args: &[&dyn VectorExpr],
    input: &RowBatch,
) -> Result<VectorValue> {
    let n = input.num_rows();
    let dur_buf = eval_arg(ctx, pool, args[0], input, EvalType::Duration)?;
    let fmt_buf = eval_arg(ctx, pool, args[1], input, EvalType::Bytes)?;
    let mut result = ChunkedVecBytes::with_capacity(n);
    result.reserve(n);
    let ds = dur_buf.as_duration_vec();
    let fmts = fmt_buf.as_bytes_vec();
    for i in 0..n {
        if ds.is_null(i) || fmts.is_null(i) {
            result.push_null();
            continue;
        }
        let layout = bytes_to_str(fmts.get(i).unwrap_or_default())?;
        let formatted = timefmt::duration_format(ds.values()[i], layout)?;
        result.push_data(formatted.into_bytes());
    }
    Ok(VectorValue::Bytes(result))
}

pub fn month_name(
    ctx: &mut EvalContext,
    pool: &BufferPool,
    args: &[&dyn VectorExpr],
    input: &RowBatch,
) -> Result<VectorValue> {
    let n = input.num_rows();
    let buf = eval_arg(ctx, pool, args[0], input, EvalType::DateTime)?;
    let mut result = ChunkedVecBytes::with_capacity(n);
    result.reserve(n);
    let ds = buf.as_time_vec();
    let no_zero_date = ctx.cfg.sql_mode.contains(SqlMode::NO_ZERO_DATE);
    for i in 0..n {
        if ds.is_null(i) {
            result.push_null();
            continue;
        }
        let t = ds.values()[i];
        let mon = t.month();
        if (t.is_zero() && no_zero_date) || mon > 12 {
            ctx.handle_invalid_time_error(Error::incorrect_datetime_value(t))?;
            result.push_null();
            continue;
        } else if mon == 0 || t.is_zero() {
            result.push_null();
            continue;
        }
        result.push_data_ref(timefmt::MONTH_NAMES[(mon - 1) as usize].as_bytes());
    }
    Ok(VectorValue::Bytes(result))
}

pub fn day_name(
    ctx: &mut EvalContext,
    pool: &BufferPool,
    args: &[&dyn VectorExpr],
    input: &RowBatch,
) -> Result<VectorValue> {
    let n = input.num_rows();
    let buf = eval_arg(ctx, pool, args[0], input, EvalType::DateTime)?;
    let mut result = ChunkedVecBytes::with_capacity(n);
    result.reserve(n);
    let ds = buf.as_time_vec();
    for i in 0..n {
        if ds.is_null(i) {
            result.push_null();
            continue;
        }
        let t = ds.values()[i];
        if t.invalid_zero() {
            ctx.handle_invalid_time_error(Error::incorrect_datetime_value(t))?;
            result.push_null();
            continue;
        }
        result.push_data_ref(timefmt::WEEKDAY_NAMES[t.weekday() as usize].as_bytes());
    }
    Ok(VectorValue::Bytes(result))
}

pub fn get_format(
    ctx: &mut EvalContext,
    pool: &BufferPool,
    args: &[&dyn VectorExpr],
    input: &RowBatch,
) -> Result<VectorValue> {
    let n = input.num_rows();
    let class_buf = eval_arg(ctx, pool, args[0], input, EvalType::Bytes)?;
    let loc_buf = eval_arg(ctx, pool, args[1], input, EvalType::Bytes)?;
    let mut result = ChunkedVecBytes::with_capacity(n);
    result.reserve(n);
    let classes = class_buf.as_bytes_vec();
    let locations = loc_buf.as_bytes_vec();
    for i in 0..n {
        if classes.is_null(i) || locations.is_null(i) {
            result.push_null();
            continue;
        }
        let class = bytes_to_str(classes.get(i).unwrap_or_default())?;
        let location = bytes_to_str(locations.get(i).unwrap_or_default())?;
        result.push_data_ref(timefmt::get_format(class, location).as_bytes());
    }
    Ok(VectorValue::Bytes(result))
}

pub fn timestamp_add(
    ctx: &mut EvalContext,
    pool: &BufferPool,
    args: &[&dyn VectorExpr],
    input: &RowBatch,
) -> Result<VectorValue> {
    let n = input.num_rows();
    let unit_buf = eval_arg(ctx, pool, args[0], input, EvalType::Bytes)?;
    let num_buf = eval_arg(ctx, pool, args[1], input, EvalType::Int)?;
    let time_buf = eval_arg(ctx, pool, args[2], input, EvalType::DateTime)?;
    let mut result = ChunkedVecBytes::with_capacity(n);
    result.reserve(n);
    let units = unit_buf.as_bytes_vec();
    let nums = num_buf.as_int_vec();
    let ds = time_buf.as_time_vec();
    for i in 0..n {
        if units.is_null(i) || nums.is_null(i) || ds.is_null(i) {
            result.push_null();
            continue;
        }
        let unit = TimeUnit::from_str(bytes_to_str(units.get(i).unwrap_or_default())?)?;
        let v = nums.values()[i];
        let arg = ds.values()[i];
        if arg.invalid_zero() {
            return Err(Error::incorrect_datetime_value(arg));
        }
        match arg.add_interval(unit, v) {
            Ok(t) => {
                // A date argument stays a date unless a clock unit was added.
                let keep_date = arg.time_type() == TimeType::Date
                    && matches!(
                        unit,
                        TimeUnit::Day
                            | TimeUnit::Week
                            | TimeUnit::Month
                            | TimeUnit::Quarter
                            | TimeUnit::Year
                    );
                let t = if keep_date { t.truncated_to_date() } else { t };
                result.push_data(t.to_string().into_bytes());
            }
            Err(err @ Error::IncorrectTimeValue(_)) => return Err(err),
            Err(err) => {
                ctx.handle_invalid_time_error(err)?;
                result.push_null();
            }
        }
    }
    Ok(VectorValue::Bytes(result))
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;
    use std::sync::Arc;

    use chrono::TimeZone;

    use super::*;
    use crate::codec::data_type::Bytes;
    use crate::expr::{EvalConfig, Flag};
    use crate::vec_expr::{eval_batch, BatchResult, ColumnRef, TimeFuncSig};

    fn eval_sig(
        ctx: &mut EvalContext,
        sig: TimeFuncSig,
        columns: Vec<VectorValue>,
    ) -> Result<VectorValue> {
        let pool = BufferPool::new();
        let input = if columns.is_empty() {
            RowBatch::with_rows(3)
        } else {
            RowBatch::new(columns)?
        };
        let refs: Vec<ColumnRef> = (0..sig.arity()).map(ColumnRef::new).collect();
        let args: Vec<&dyn VectorExpr> = refs.iter().map(|r| r as &dyn VectorExpr).collect();
        match eval_batch(&sig, ctx, &pool, &args, &input)? {
            BatchResult::Done(v) => Ok(v),
            BatchResult::NotSupported => Err(Error::Other("no vectorized path".into())),
        }
    }

    fn datetimes(inputs: &[Option<&str>]) -> VectorValue {
        let mut ctx = EvalContext::default();
        let v: Vec<Option<Time>> = inputs
            .iter()
            .map(|s| s.map(|s| Time::parse_datetime(&mut ctx, s, 6, true).unwrap()))
            .collect();
        v.into()
    }

    fn durations(inputs: &[Option<&str>], fsp: i8) -> VectorValue {
        let mut ctx = EvalContext::default();
        let v: Vec<Option<Duration>> = inputs
            .iter()
            .map(|s| s.map(|s| Duration::parse(&mut ctx, s, fsp).unwrap()))
            .collect();
        v.into()
    }

    fn strings(inputs: &[Option<&str>]) -> VectorValue {
        let v: Vec<Option<Bytes>> = inputs
            .iter()
            .map(|s| s.map(|s| s.as_bytes().to_vec()))
            .collect();
        v.into()
    }

    fn ints(inputs: &[Option<i64>]) -> VectorValue {
        inputs.to_vec().into()
    }

    fn reals(inputs: &[Option<f64>]) -> VectorValue {
        inputs.to_vec().into()
    }

    fn decimals(inputs: &[Option<&str>]) -> VectorValue {
        let v: Vec<Option<Decimal>> = inputs
            .iter()
            .map(|s| s.map(|s| Decimal::from_str(s).unwrap()))
            .collect();
        v.into()
    }

    fn int_results(v: &VectorValue) -> Vec<Option<i64>> {
        v.as_int_vec().to_vec()
    }

    fn time_strings(v: &VectorValue) -> Vec<Option<String>> {
        let col = v.as_time_vec();
        (0..col.len()).map(|i| col.get(i).map(|t| t.to_string())).collect()
    }

    fn duration_strings(v: &VectorValue) -> Vec<Option<String>> {
        let col = v.as_duration_vec();
        (0..col.len()).map(|i| col.get(i).map(|d| d.to_string())).collect()
    }

    fn string_results(v: &VectorValue) -> Vec<Option<String>> {
        let col = v.as_bytes_vec();
        (0..col.len())
            .map(|i| col.get(i).map(|b| String::from_utf8(b.to_vec()).unwrap()))
            .collect()
    }

    fn write_stmt_ctx(sql_mode: SqlMode) -> EvalContext {
        let mut cfg = EvalConfig::new();
        cfg.set_sql_mode(sql_mode | SqlMode::STRICT_ALL_TABLES)
            .set_flag(Flag::IN_UPDATE_OR_DELETE_STMT);
        EvalContext::new(Arc::new(cfg))
    }

    fn no_zero_date_ctx() -> EvalContext {
        let mut cfg = EvalConfig::new();
        cfg.set_sql_mode(SqlMode::NO_ZERO_DATE);
        EvalContext::new(Arc::new(cfg))
    }

    #[test]
    fn test_year_month_day_of_month() {
        let col = || datetimes(&[Some("2024-05-06 07:08:09"), Some("0000-00-00 00:00:00"), None]);

        // Default SQL mode: a zero date extracts 0 without error.
        let mut ctx = EvalContext::default();
        let out = eval_sig(&mut ctx, TimeFuncSig::Year, vec![col()]).unwrap();
        assert_eq!(int_results(&out), vec![Some(2024), Some(0), None]);
        let out = eval_sig(&mut ctx, TimeFuncSig::Month, vec![col()]).unwrap();
        assert_eq!(int_results(&out), vec![Some(5), Some(0), None]);
        let out = eval_sig(&mut ctx, TimeFuncSig::DayOfMonth, vec![col()]).unwrap();
        assert_eq!(int_results(&out), vec![Some(6), Some(0), None]);
        assert_eq!(ctx.take_warnings().warning_cnt, 0);

        // NO_ZERO_DATE: the zero row degrades to NULL plus a warning.
        let mut ctx = no_zero_date_ctx();
        let out = eval_sig(&mut ctx, TimeFuncSig::Month, vec![col()]).unwrap();
        assert_eq!(int_results(&out), vec![Some(5), None, None]);
        assert_eq!(ctx.take_warnings().warning_cnt, 1);

        // Strict mode in a write statement: the whole batch call fails.
        let mut ctx = write_stmt_ctx(SqlMode::NO_ZERO_DATE);
        assert!(eval_sig(&mut ctx, TimeFuncSig::Month, vec![col()]).is_err());
    }

    #[test]
    fn test_calendar_extraction() {
        let mut ctx = EvalContext::default();

        // 2024-01-01 is a Monday.
        let col = datetimes(&[Some("2024-01-01"), Some("2018-12-08"), Some("2018-12-00"), None]);
        let out = eval_sig(&mut ctx, TimeFuncSig::WeekDay, vec![col]).unwrap();
        assert_eq!(int_results(&out), vec![Some(0), Some(5), None, None]);

        let col = datetimes(&[Some("2024-01-01"), Some("2024-01-07"), None]);
        let out = eval_sig(&mut ctx, TimeFuncSig::DayOfWeek, vec![col]).unwrap();
        assert_eq!(int_results(&out), vec![Some(2), Some(1), None]);

        let col = datetimes(&[Some("2016-09-03"), Some("2024-02-29"), None]);
        let out = eval_sig(&mut ctx, TimeFuncSig::DayOfYear, vec![col]).unwrap();
        assert_eq!(int_results(&out), vec![Some(247), Some(60), None]);

        let col = datetimes(&[Some("2024-05-06"), Some("2024-12-31"), Some("0000-00-00")]);
        let out = eval_sig(&mut ctx, TimeFuncSig::Quarter, vec![col]).unwrap();
        assert_eq!(int_results(&out), vec![Some(2), Some(4), None]);
        assert!(ctx.take_warnings().warning_cnt > 0);
    }

    #[test]
    fn test_week_sigs() {
        let mut ctx = EvalContext::default();
        let dates = || datetimes(&[Some("2024-01-01"), Some("2008-02-20"), None]);

        let out = eval_sig(
            &mut ctx,
            TimeFuncSig::WeekWithMode,
            vec![dates(), ints(&[Some(1), Some(0), Some(0)])],
        )
        .unwrap();
        assert_eq!(int_results(&out), vec![Some(1), Some(7), None]);

        // A null mode makes the row null even with a valid date.
        let out = eval_sig(
            &mut ctx,
            TimeFuncSig::WeekWithMode,
            vec![dates(), ints(&[None, Some(1), Some(0)])],
        )
        .unwrap();
        assert_eq!(int_results(&out), vec![None, Some(8), None]);

        // WEEK without a mode consults @@default_week_format.
        let mut cfg = EvalConfig::new();
        cfg.set_default_week_format("1");
        let mut ctx1 = EvalContext::new(Arc::new(cfg));
        let out = eval_sig(&mut ctx1, TimeFuncSig::WeekWithoutMode, vec![dates()]).unwrap();
        assert_eq!(int_results(&out), vec![Some(1), Some(8), None]);

        let out = eval_sig(&mut ctx, TimeFuncSig::WeekOfYear, vec![dates()]).unwrap();
        assert_eq!(int_results(&out), vec![Some(1), Some(8), None]);
    }

    #[test]
    fn test_year_week_sigs() {
        let mut ctx = EvalContext::default();

        let col = datetimes(&[Some("2024-01-01"), Some("2024-06-01"), None]);
        let out = eval_sig(&mut ctx, TimeFuncSig::YearWeekWithoutMode, vec![col]).unwrap();
        assert_eq!(int_results(&out), vec![Some(202_353), Some(202_421), None]);

        let col = datetimes(&[Some("2024-01-01"), Some("2024-01-01")]);
        let out = eval_sig(
            &mut ctx,
            TimeFuncSig::YearWeekWithMode,
            vec![col, ints(&[Some(1), None])],
        )
        .unwrap();
        // A null mode falls back to mode 0 instead of a null row.
        assert_eq!(int_results(&out), vec![Some(202_401), Some(202_353)]);

        // Year/week pairs from before year 1 encode negatively and clamp.
        let col = datetimes(&[Some("0000-01-01")]);
        let out = eval_sig(
            &mut ctx,
            TimeFuncSig::YearWeekWithMode,
            vec![col, ints(&[Some(3)])],
        )
        .unwrap();
        assert_eq!(int_results(&out), vec![Some(i64::from(u32::MAX))]);
    }

    #[test]
    fn test_duration_components() {
        let mut ctx = EvalContext::default();
        let col = || {
            durations(
                &[
                    Some("31 11:30:45.123456"),
                    Some("-11:30:45.9233456"),
                    None,
                ],
                6,
            )
        };
        let out = eval_sig(&mut ctx, TimeFuncSig::Hour, vec![col()]).unwrap();
        assert_eq!(int_results(&out), vec![Some(31 * 24 + 11), Some(11), None]);
        let out = eval_sig(&mut ctx, TimeFuncSig::Minute, vec![col()]).unwrap();
        assert_eq!(int_results(&out), vec![Some(30), Some(30), None]);
        let out = eval_sig(&mut ctx, TimeFuncSig::Second, vec![col()]).unwrap();
        assert_eq!(int_results(&out), vec![Some(45), Some(45), None]);
        let out = eval_sig(&mut ctx, TimeFuncSig::MicroSecond, vec![col()]).unwrap();
        assert_eq!(int_results(&out), vec![Some(123_456), Some(923_346), None]);

        let out = eval_sig(&mut ctx, TimeFuncSig::TimeToSec, vec![col()]).unwrap();
        assert_eq!(
            int_results(&out),
            vec![
                Some((31 * 24 + 11) * 3_600 + 30 * 60 + 45),
                Some(-(11 * 3_600 + 30 * 60 + 45)),
                None
            ]
        );
    }

    #[test]
    fn test_to_days_and_to_seconds() {
        let mut ctx = EvalContext::default();
        let col = datetimes(&[Some("2007-10-07"), Some("0000-00-00"), None]);
        let out = eval_sig(&mut ctx, TimeFuncSig::ToDays, vec![col]).unwrap();
        assert_eq!(int_results(&out), vec![Some(733_321), None, None]);
        assert_eq!(ctx.take_warnings().warning_cnt, 1);

        let col = datetimes(&[Some("2009-11-29 13:43:32"), None]);
        let out = eval_sig(&mut ctx, TimeFuncSig::ToSeconds, vec![col]).unwrap();
        assert_eq!(int_results(&out), vec![Some(63_426_721_412), None]);
    }

    #[test]
    fn test_date_diff() {
        let mut ctx = EvalContext::default();
        let lhs = datetimes(&[Some("2024-02-01"), Some("2024-01-01"), Some("2024-00-01"), None]);
        let rhs = datetimes(&[Some("2024-01-01"), Some("2024-02-01"), Some("2024-01-01"), Some("2024-01-01")]);
        let out = eval_sig(&mut ctx, TimeFuncSig::DateDiff, vec![lhs, rhs]).unwrap();
        assert_eq!(int_results(&out), vec![Some(31), Some(-31), None, None]);
    }

    #[test]
    fn test_period_add_and_diff() {
        let mut ctx = EvalContext::default();
        let out = eval_sig(
            &mut ctx,
            TimeFuncSig::PeriodAdd,
            vec![ints(&[Some(202_401), Some(9_912), None]), ints(&[Some(13), Some(2), Some(5)])],
        )
        .unwrap();
        assert_eq!(int_results(&out), vec![Some(202_502), Some(200_002), None]);

        let out = eval_sig(
            &mut ctx,
            TimeFuncSig::PeriodDiff,
            vec![ints(&[Some(202_502), None]), ints(&[Some(202_401), Some(202_401)])],
        )
        .unwrap();
        assert_eq!(int_results(&out), vec![Some(13), None]);

        // A malformed period is a hard error, but only after null checks:
        // an invalid p paired with a null n stays NULL.
        let result = eval_sig(
            &mut ctx,
            TimeFuncSig::PeriodAdd,
            vec![ints(&[Some(202_413)]), ints(&[Some(1)])],
        );
        assert_eq!(result.unwrap_err(), Error::IncorrectArgs("period_add"));
        let out = eval_sig(
            &mut ctx,
            TimeFuncSig::PeriodAdd,
            vec![ints(&[Some(202_413)]), ints(&[None])],
        )
        .unwrap();
        assert_eq!(int_results(&out), vec![None]);
    }

    #[test]
    fn test_timestamp_diff_sig() {
        let mut ctx = EvalContext::default();
        let out = eval_sig(
            &mut ctx,
            TimeFuncSig::TimestampDiff,
            vec![
                strings(&[Some("DAY"), Some("MONTH"), Some("day")]),
                datetimes(&[Some("2024-01-01"), Some("2003-02-01"), Some("2024-00-01")]),
                datetimes(&[Some("2024-02-01"), Some("2003-05-01"), Some("2024-02-01")]),
            ],
        )
        .unwrap();
        assert_eq!(int_results(&out), vec![Some(31), Some(3), None]);

        let result = eval_sig(
            &mut ctx,
            TimeFuncSig::TimestampDiff,
            vec![
                strings(&[Some("LIGHTYEAR")]),
                datetimes(&[Some("2024-01-01")]),
                datetimes(&[Some("2024-02-01")]),
            ],
        );
        assert_eq!(
            result.unwrap_err(),
            Error::incorrect_time_value("LIGHTYEAR")
        );
    }

    #[test]
    fn test_extract_datetime_sig() {
        let mut ctx = EvalContext::default();
        let out = eval_sig(
            &mut ctx,
            TimeFuncSig::ExtractDatetime,
            vec![
                strings(&[Some("YEAR"), Some("DAY_HOUR"), None]),
                datetimes(&[Some("2024-03-05 11:22:33"), Some("2024-03-05 11:22:33"), Some("2024-03-05 11:22:33")]),
            ],
        )
        .unwrap();
        assert_eq!(int_results(&out), vec![Some(2024), Some(511), None]);
    }

    #[test]
    fn test_unix_timestamp_current() {
        let mut cfg = EvalConfig::new();
        cfg.set_stmt_ts(Utc.with_ymd_and_hms(2016, 1, 1, 0, 0, 0).unwrap());
        let mut ctx = EvalContext::new(Arc::new(cfg));
        let out = eval_sig(&mut ctx, TimeFuncSig::UnixTimestampCurrent, vec![]).unwrap();
        assert_eq!(
            int_results(&out),
            vec![Some(1_451_606_400), Some(1_451_606_400), Some(1_451_606_400)]
        );
    }

    #[test]
    fn test_date_and_last_day() {
        let mut ctx = EvalContext::default();
        let col = datetimes(&[Some("2024-05-06 07:08:09"), Some("0000-00-00 00:00:00"), None]);
        let out = eval_sig(&mut ctx, TimeFuncSig::Date, vec![col]).unwrap();
        assert_eq!(
            time_strings(&out),
            vec![Some("2024-05-06".into()), None, None]
        );

        let col = datetimes(&[Some("2024-02-05"), Some("2023-02-05"), Some("2024-00-05"), None]);
        let out = eval_sig(&mut ctx, TimeFuncSig::LastDay, vec![col]).unwrap();
        assert_eq!(
            time_strings(&out),
            vec![
                Some("2024-02-29".into()),
                Some("2023-02-28".into()),
                None,
                None
            ]
        );
    }

    #[test]
    fn test_from_days_and_make_date() {
        let mut ctx = EvalContext::default();
        let out = eval_sig(
            &mut ctx,
            TimeFuncSig::FromDays,
            vec![ints(&[Some(733_321), Some(10), None])],
        )
        .unwrap();
        assert_eq!(
            time_strings(&out),
            vec![Some("2007-10-07".into()), Some("0000-00-00".into()), None]
        );

        let years = ints(&[Some(2024), Some(2024), Some(69), Some(70), Some(10_000), None]);
        let days = ints(&[Some(60), Some(0), Some(1), Some(1), Some(1), Some(1)]);
        let out = eval_sig(&mut ctx, TimeFuncSig::MakeDate, vec![years, days]).unwrap();
        assert_eq!(
            time_strings(&out),
            vec![
                Some("2024-02-29".into()),
                None,
                Some("2069-01-01".into()),
                Some("1970-01-01".into()),
                None,
                None
            ]
        );

        // A day count pushing the year past 9999 nulls the row.
        let out = eval_sig(
            &mut ctx,
            TimeFuncSig::MakeDate,
            vec![ints(&[Some(9_999)]), ints(&[Some(400)])],
        )
        .unwrap();
        assert_eq!(time_strings(&out), vec![None]);
    }

    #[test]
    fn test_str_to_date_sigs() {
        let mut ctx = EvalContext::default();
        let out = eval_sig(
            &mut ctx,
            TimeFuncSig::StrToDateDate,
            vec![
                strings(&[Some("2024-01-02 11:22:33"), Some("nope"), None]),
                strings(&[Some("%Y-%m-%d %T"), Some("%Y"), Some("%Y")]),
            ],
        )
        .unwrap();
        assert_eq!(
            time_strings(&out),
            vec![Some("2024-01-02".into()), None, None]
        );
        assert_eq!(ctx.take_warnings().warning_cnt, 1);

        let out = eval_sig(
            &mut ctx,
            TimeFuncSig::StrToDateDatetime { fsp: 2 },
            vec![
                strings(&[Some("2024-01-02 11:22:33.456789")]),
                strings(&[Some("%Y-%m-%d %H:%i:%s.%f")]),
            ],
        )
        .unwrap();
        assert_eq!(
            time_strings(&out),
            vec![Some("2024-01-02 11:22:33.45".into())]
        );

        let out = eval_sig(
            &mut ctx,
            TimeFuncSig::StrToDateDuration { fsp: 0 },
            vec![
                strings(&[Some("11:30:45")]),
                strings(&[Some("%H:%i:%s")]),
            ],
        )
        .unwrap();
        assert_eq!(duration_strings(&out), vec![Some("11:30:45".into())]);

        // NO_ZERO_DATE rejects parses that leave a zero date part.
        let mut ctx = no_zero_date_ctx();
        let out = eval_sig(
            &mut ctx,
            TimeFuncSig::StrToDateDate,
            vec![strings(&[Some("2024")]), strings(&[Some("%Y")])],
        )
        .unwrap();
        assert_eq!(time_strings(&out), vec![None]);
        assert_eq!(ctx.take_warnings().warning_cnt, 1);
    }

    #[test]
    fn test_from_unixtime() {
        let mut ctx = EvalContext::default();
        let col = decimals(&[
            Some("1451606400"),
            Some("1451606400.123456"),
            Some("-5"),
            Some("2147483648"),
            None,
        ]);
        let out = eval_sig(&mut ctx, TimeFuncSig::FromUnixTime1Arg { fsp: -1 }, vec![col]).unwrap();
        assert_eq!(
            time_strings(&out),
            vec![
                Some("2016-01-01 00:00:00".into()),
                Some("2016-01-01 00:00:00.123456".into()),
                None,
                None,
                None
            ]
        );

        let out = eval_sig(
            &mut ctx,
            TimeFuncSig::FromUnixTime2Arg { fsp: 0 },
            vec![
                decimals(&[Some("1451606400"), None]),
                strings(&[Some("%Y %m %d"), Some("%Y")]),
            ],
        )
        .unwrap();
        assert_eq!(
            string_results(&out),
            vec![Some("2016 01 01".into()), None]
        );
    }

    #[test]
    fn test_timestamp_sigs() {
        let mut ctx = EvalContext::default();
        let out = eval_sig(
            &mut ctx,
            TimeFuncSig::Timestamp1Arg,
            vec![strings(&[Some("2024-01-02 03:04:05"), Some("garbage"), None])],
        )
        .unwrap();
        assert_eq!(
            time_strings(&out),
            vec![Some("2024-01-02 03:04:05".into()), None, None]
        );
        assert_eq!(ctx.take_warnings().warning_cnt, 1);

        let out = eval_sig(
            &mut ctx,
            TimeFuncSig::Timestamp2Args,
            vec![
                strings(&[Some("2024-01-01"), Some("2024-01-01")]),
                strings(&[Some("01:30:00"), Some("not-a-duration")]),
            ],
        )
        .unwrap();
        assert_eq!(
            time_strings(&out),
            vec![Some("2024-01-01 01:30:00".into()), None]
        );
    }

    fn fixed_clock_ctx() -> EvalContext {
        let mut cfg = EvalConfig::new();
        cfg.set_stmt_ts(Utc.with_ymd_and_hms(2024, 6, 1, 12, 30, 45).unwrap());
        cfg.set_time_zone_by_offset(8 * 3_600).unwrap();
        EvalContext::new(Arc::new(cfg))
    }

    #[test]
    fn test_now_and_current() {
        let mut ctx = fixed_clock_ctx();

        let out = eval_sig(&mut ctx, TimeFuncSig::NowWithoutArg, vec![]).unwrap();
        assert_eq!(
            time_strings(&out),
            vec![
                Some("2024-06-01 20:30:45".into()),
                Some("2024-06-01 20:30:45".into()),
                Some("2024-06-01 20:30:45".into())
            ]
        );

        let out = eval_sig(
            &mut ctx,
            TimeFuncSig::NowWithArg,
            vec![ints(&[Some(3), None])],
        )
        .unwrap();
        assert_eq!(
            time_strings(&out),
            vec![
                Some("2024-06-01 20:30:45.000".into()),
                Some("2024-06-01 20:30:45".into())
            ]
        );

        let result = eval_sig(&mut ctx, TimeFuncSig::NowWithArg, vec![ints(&[Some(7)])]);
        assert_eq!(
            result.unwrap_err().to_string(),
            "Too-big precision 7 specified for 'now'. Maximum is 6."
        );
        let result = eval_sig(&mut ctx, TimeFuncSig::NowWithArg, vec![ints(&[Some(-1)])]);
        assert_eq!(
            result.unwrap_err().to_string(),
            "Invalid negative -1 specified, must in [0, 6]."
        );

        let out = eval_sig(&mut ctx, TimeFuncSig::CurrentDate, vec![]).unwrap();
        assert_eq!(time_strings(&out)[0], Some("2024-06-01".into()));

        let out = eval_sig(&mut ctx, TimeFuncSig::CurrentTime0Arg, vec![]).unwrap();
        assert_eq!(duration_strings(&out)[0], Some("20:30:45".into()));

        let out = eval_sig(
            &mut ctx,
            TimeFuncSig::CurrentTime1Arg,
            vec![ints(&[Some(2)])],
        )
        .unwrap();
        assert_eq!(duration_strings(&out), vec![Some("20:30:45.00".into())]);
    }

    #[test]
    fn test_utc_sigs() {
        let mut ctx = fixed_clock_ctx();

        let out = eval_sig(&mut ctx, TimeFuncSig::UtcDate, vec![]).unwrap();
        assert_eq!(time_strings(&out)[0], Some("2024-06-01".into()));

        let out = eval_sig(&mut ctx, TimeFuncSig::UtcTimestampWithoutArg, vec![]).unwrap();
        assert_eq!(time_strings(&out)[0], Some("2024-06-01 12:30:45".into()));

        let out = eval_sig(
            &mut ctx,
            TimeFuncSig::UtcTimestampWithArg,
            vec![ints(&[Some(2), None])],
        )
        .unwrap();
        assert_eq!(
            time_strings(&out),
            vec![Some("2024-06-01 12:30:45.00".into()), None]
        );

        let out = eval_sig(&mut ctx, TimeFuncSig::UtcTimeWithoutArg, vec![]).unwrap();
        assert_eq!(duration_strings(&out)[0], Some("12:30:45".into()));

        let result = eval_sig(
            &mut ctx,
            TimeFuncSig::UtcTimeWithArg,
            vec![ints(&[Some(8)])],
        );
        assert_eq!(
            result.unwrap_err().to_string(),
            "Too-big precision 8 specified for 'utc_time'. Maximum is 6."
        );
    }

    #[test]
    fn test_sec_to_time() {
        let mut ctx = EvalContext::default();
        let col = reals(&[
            Some(2_378.0),
            Some(-2_378.0),
            Some(3_020_000.0),
            Some(86_401.5),
            None,
        ]);
        let out = eval_sig(&mut ctx, TimeFuncSig::SecToTime { fsp: 1 }, vec![col]).unwrap();
        assert_eq!(
            duration_strings(&out),
            vec![
                Some("00:39:38.0".into()),
                Some("-00:39:38.0".into()),
                Some("838:59:59.0".into()),
                Some("24:00:01.5".into()),
                None
            ]
        );
    }

    #[test]
    fn test_time_sig() {
        let mut cfg = EvalConfig::new();
        cfg.set_flag(Flag::TRUNCATE_AS_WARNING);
        let mut ctx = EvalContext::new(Arc::new(cfg));
        let col = strings(&[Some("11:30:45"), Some("1130"), Some("bogus"), None]);
        let out = eval_sig(&mut ctx, TimeFuncSig::Time, vec![col]).unwrap();
        assert_eq!(
            duration_strings(&out),
            vec![
                Some("11:30:45".into()),
                Some("00:11:30".into()),
                Some("00:00:00".into()),
                None
            ]
        );
        assert_eq!(ctx.take_warnings().warning_cnt, 1);

        // Without the truncate-as-warning flag the malformed literal is fatal.
        let mut ctx = EvalContext::default();
        let col = strings(&[Some("bogus")]);
        assert!(eval_sig(&mut ctx, TimeFuncSig::Time, vec![col]).is_err());
    }

    #[test]
    fn test_literals() {
        let mut ctx = EvalContext::default();
        let lit = Time::parse_datetime(&mut ctx, "2024-05-06", 0, false)
            .unwrap()
            .truncated_to_date();
        let out = eval_sig(&mut ctx, TimeFuncSig::DateLiteral(lit), vec![]).unwrap();
        assert_eq!(time_strings(&out)[0], Some("2024-05-06".into()));

        let mut ctx = no_zero_date_ctx();
        let result = eval_sig(&mut ctx, TimeFuncSig::DateLiteral(Time::zero_date()), vec![]);
        assert!(result.is_err());

        let mut ctx = EvalContext::default();
        let d = Duration::parse(&mut ctx, "11:30:45", 0).unwrap();
        let out = eval_sig(&mut ctx, TimeFuncSig::TimeLiteral(d), vec![]).unwrap();
        assert_eq!(duration_strings(&out)[0], Some("11:30:45".into()));
    }

    #[test]
    fn test_date_format_sig() {
        let mut ctx = EvalContext::default();
        let out = eval_sig(
            &mut ctx,
            TimeFuncSig::DateFormat,
            vec![
                datetimes(&[
                    Some("2017-12-31 23:59:59.123456"),
                    Some("0000-00-00 00:00:00"),
                    None,
                    Some("2024-01-02"),
                ]),
                strings(&[
                    Some("%Y/%m/%d %H:%i:%s %f"),
                    Some("%Y"),
                    Some("%Y"),
                    None,
                ]),
            ],
        )
        .unwrap();
        assert_eq!(
            string_results(&out),
            vec![
                Some("2017/12/31 23:59:59 123456".into()),
                None,
                None,
                None
            ]
        );
        assert_eq!(ctx.take_warnings().warning_cnt, 1);
    }

    #[test]
    fn test_time_format_sig() {
        let mut ctx = EvalContext::default();
        let out = eval_sig(
            &mut ctx,
            TimeFuncSig::TimeFormat,
            vec![
                durations(&[Some("123:04:05"), None], 0),
                strings(&[Some("%H:%i:%s"), Some("%H")]),
            ],
        )
        .unwrap();
        assert_eq!(
            string_results(&out),
            vec![Some("123:04:05".into()), None]
        );
    }

    #[test]
    fn test_month_and_day_names() {
        let mut ctx = EvalContext::default();
        let col = datetimes(&[Some("2024-01-02"), Some("0000-00-00"), None]);
        let out = eval_sig(&mut ctx, TimeFuncSig::MonthName, vec![col]).unwrap();
        assert_eq!(
            string_results(&out),
            vec![Some("January".into()), None, None]
        );
        assert_eq!(ctx.take_warnings().warning_cnt, 0);

        let col = datetimes(&[Some("2024-01-01"), Some("2024-01-00"), None]);
        let out = eval_sig(&mut ctx, TimeFuncSig::DayName, vec![col]).unwrap();
        assert_eq!(
            string_results(&out),
            vec![Some("Monday".into()), None, None]
        );
        assert_eq!(ctx.take_warnings().warning_cnt, 1);
    }

    #[test]
    fn test_get_format_sig() {
        let mut ctx = EvalContext::default();
        let out = eval_sig(
            &mut ctx,
            TimeFuncSig::GetFormat,
            vec![
                strings(&[Some("DATE"), Some("TIME"), Some("DATE"), None]),
                strings(&[Some("USA"), Some("INTERNAL"), Some("MARS"), Some("USA")]),
            ],
        )
        .unwrap();
        assert_eq!(
            string_results(&out),
            vec![
                Some("%m.%d.%Y".into()),
                Some("%H%i%s".into()),
                Some("".into()),
                None
            ]
        );
    }

    #[test]
    fn test_timestamp_add_sig() {
        let mut ctx = EvalContext::default();
        let out = eval_sig(
            &mut ctx,
            TimeFuncSig::TimestampAdd,
            vec![
                strings(&[Some("DAY"), Some("MINUTE"), Some("MICROSECOND"), None]),
                ints(&[Some(1), Some(1), Some(1), Some(1)]),
                datetimes(&[
                    Some("2024-01-31"),
                    Some("2003-01-02"),
                    Some("2024-01-31"),
                    Some("2024-01-31"),
                ]),
            ],
        )
        .unwrap();
        assert_eq!(
            string_results(&out),
            vec![
                Some("2024-02-01 00:00:00".into()),
                Some("2003-01-02 00:01:00".into()),
                Some("2024-01-31 00:00:00.000001".into()),
                None
            ]
        );

        let result = eval_sig(
            &mut ctx,
            TimeFuncSig::TimestampAdd,
            vec![
                strings(&[Some("PARSEC")]),
                ints(&[Some(1)]),
                datetimes(&[Some("2024-01-31")]),
            ],
        );
        assert_eq!(result.unwrap_err(), Error::incorrect_time_value("PARSEC"));
    }

    #[test]
    fn test_not_supported_sigs() {
        let mut ctx = EvalContext::default();
        let pool = BufferPool::new();
        let input = RowBatch::with_rows(2);
        for sig in [
            TimeFuncSig::MakeTime,
            TimeFuncSig::ConvertTz,
            TimeFuncSig::UnixTimestampDec,
        ] {
            match eval_batch(&sig, &mut ctx, &pool, &[], &input).unwrap() {
                BatchResult::NotSupported => {}
                BatchResult::Done(_) => panic!("{:?} must not claim a vectorized path", sig),
            }
        }
    }

    #[test]
    fn test_batch_rows_fully_written() {
        // Every row of the batch must end up either null or written, and
        // the result must have exactly the batch length.
        let mut ctx = EvalContext::default();
        let inputs: Vec<Option<&str>> = vec![
            Some("2024-01-01"),
            None,
            Some("0000-00-00"),
            None,
            Some("2024-06-30"),
        ];
        let out = eval_sig(&mut ctx, TimeFuncSig::Month, vec![datetimes(&inputs)]).unwrap();
        assert_eq!(out.len(), inputs.len());
        assert_eq!(
            int_results(&out),
            vec![Some(1), None, Some(0), None, Some(6)]
        );
    }
}
