// Copyright 2024 TiKV Project Authors. Licensed under Apache-2.0.

//! Vectorized entry points for the temporal builtin functions.
//!
//! Every supported function signature is a variant of [`TimeFuncSig`], a
//! closed registry the dispatcher matches on. Signatures that have no batch
//! implementation report [`BatchResult::NotSupported`] so the caller can
//! fall back to row-wise evaluation; they never produce data.

pub mod impl_time;

use crate::codec::data_type::{EvalType, VectorValue};
use crate::codec::mysql::duration::Duration as MyDuration;
use crate::codec::mysql::time::Time as MyTime;
use crate::error::{Error, Result};
use crate::expr::buffer::BufferPool;
use crate::expr::EvalContext;

/// A row batch handed in by the caller; owned by the caller for the
/// duration of one evaluation call.
#[derive(Debug)]
pub struct RowBatch {
    columns: Vec<VectorValue>,
    num_rows: usize,
}

impl RowBatch {
    pub fn new(columns: Vec<VectorValue>) -> Result<RowBatch> {
        let num_rows = match columns.first() {
            Some(c) => c.len(),
            None => {
                return Err(Error::Other(
                    "row batch requires at least one column; use with_rows".into(),
                ))
            }
        };
        if columns.iter().any(|c| c.len() != num_rows) {
            return Err(Error::Other("row batch columns differ in length".into()));
        }
        Ok(RowBatch { columns, num_rows })
    }

    /// A batch without physical columns, for zero-argument functions.
    pub fn with_rows(num_rows: usize) -> RowBatch {
        RowBatch {
            columns: Vec::new(),
            num_rows,
        }
    }

    #[inline]
    pub fn num_rows(&self) -> usize {
        self.num_rows
    }

    #[inline]
    pub fn column(&self, idx: usize) -> &VectorValue {
        &self.columns[idx]
    }
}

/// Boundary contract for argument sub-expressions: evaluate this expression
/// over every row of `input` into `out`, whose element type declares the
/// requested logical type, leaving exactly `input.num_rows()` rows with
/// per-row null status.
pub trait VectorExpr {
    fn eval_vec(&self, ctx: &mut EvalContext, input: &RowBatch, out: &mut VectorValue)
        -> Result<()>;
}

/// The canonical leaf expression: reads a physical batch column.
#[derive(Debug, Clone, Copy)]
pub struct ColumnRef {
    offset: usize,
}

impl ColumnRef {
    pub fn new(offset: usize) -> ColumnRef {
        ColumnRef { offset }
    }
}

impl VectorExpr for ColumnRef {
    fn eval_vec(
        &self,
        _ctx: &mut EvalContext,
        input: &RowBatch,
        out: &mut VectorValue,
    ) -> Result<()> {
        out.copy_from(input.column(self.offset))
    }
}

/// Outcome of a batch evaluation request.
#[derive(Debug)]
pub enum BatchResult {
    /// The batch was fully evaluated into a result column.
    Done(VectorValue),
    /// The signature declares no vectorized path; the dispatcher must fall
    /// back to row-wise evaluation.
    NotSupported,
}

/// The closed registry of temporal function signatures. Literal signatures
/// carry their value; signatures whose result precision comes from the
/// return field type carry that fsp.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TimeFuncSig {
    Year,
    Month,
    DayOfMonth,
    DayOfWeek,
    DayOfYear,
    WeekDay,
    Quarter,
    WeekWithMode,
    WeekWithoutMode,
    WeekOfYear,
    YearWeekWithMode,
    YearWeekWithoutMode,
    Hour,
    Minute,
    Second,
    MicroSecond,
    TimeToSec,
    ToDays,
    ToSeconds,
    DateDiff,
    PeriodAdd,
    PeriodDiff,
    TimestampDiff,
    ExtractDatetime,
    UnixTimestampCurrent,
    Date,
    LastDay,
    FromDays,
    MakeDate,
    StrToDateDate,
    StrToDateDatetime { fsp: i8 },
    StrToDateDuration { fsp: i8 },
    FromUnixTime1Arg { fsp: i8 },
    FromUnixTime2Arg { fsp: i8 },
    Timestamp1Arg,
    Timestamp2Args,
    SysDateWithFsp,
    SysDateWithoutFsp,
    NowWithArg,
    NowWithoutArg,
    CurrentDate,
    CurrentTime0Arg,
    CurrentTime1Arg,
    UtcDate,
    UtcTimestampWithArg,
    UtcTimestampWithoutArg,
    UtcTimeWithArg,
    UtcTimeWithoutArg,
    SecToTime { fsp: i8 },
    Time,
    DateLiteral(MyTime),
    TimeLiteral(MyDuration),
    TimestampLiteral(MyTime),
    DateFormat,
    TimeFormat,
    MonthName,
    DayName,
    GetFormat,
    TimestampAdd,
    // Signatures left to the scalar fallback path.
    MakeTime,
    ConvertTz,
    ExtractDuration,
    UnixTimestampDec,
    SubDatetimeAndDuration,
    SubStringAndDuration,
    SubTimeDatetimeNull,
}

impl TimeFuncSig {
    /// Capability flag consulted by the dispatcher before requesting a
    /// batch evaluation.
    pub fn supports_vectorized(&self) -> bool {
        !matches!(
            self,
            TimeFuncSig::MakeTime
                | TimeFuncSig::ConvertTz
                | TimeFuncSig::ExtractDuration
                | TimeFuncSig::UnixTimestampDec
                | TimeFuncSig::SubDatetimeAndDuration
                | TimeFuncSig::SubStringAndDuration
                | TimeFuncSig::SubTimeDatetimeNull
        )
    }

    pub fn arity(&self) -> usize {
        use TimeFuncSig::*;
        match self {
            UnixTimestampCurrent | SysDateWithoutFsp | NowWithoutArg | CurrentDate
            | CurrentTime0Arg | UtcDate | UtcTimestampWithoutArg | UtcTimeWithoutArg
            | DateLiteral(_) | TimeLiteral(_) | TimestampLiteral(_) => 0,
            Year | Month | DayOfMonth | DayOfWeek | DayOfYear | WeekDay | Quarter
            | WeekWithoutMode | WeekOfYear | YearWeekWithoutMode | Hour | Minute | Second
            | MicroSecond | TimeToSec | ToDays | ToSeconds | Date | LastDay | FromDays
            | FromUnixTime1Arg { .. } | Timestamp1Arg | SysDateWithFsp | NowWithArg
            | CurrentTime1Arg | UtcTimestampWithArg | UtcTimeWithArg | SecToTime { .. } | Time
            | MonthName | DayName | UnixTimestampDec => 1,
            WeekWithMode | YearWeekWithMode | DateDiff | PeriodAdd | PeriodDiff
            | ExtractDatetime | MakeDate | StrToDateDate | StrToDateDatetime { .. }
            | StrToDateDuration { .. } | FromUnixTime2Arg { .. } | Timestamp2Args | DateFormat
            | TimeFormat | GetFormat | ExtractDuration | SubDatetimeAndDuration
            | SubStringAndDuration | SubTimeDatetimeNull => 2,
            TimestampDiff | TimestampAdd | MakeTime | ConvertTz => 3,
        }
    }

    pub fn result_type(&self) -> EvalType {
        use TimeFuncSig::*;
        match self {
            Year | Month | DayOfMonth | DayOfWeek | DayOfYear | WeekDay | Quarter
            | WeekWithMode | WeekWithoutMode | WeekOfYear | YearWeekWithMode
            | YearWeekWithoutMode | Hour | Minute | Second | MicroSecond | TimeToSec | ToDays
            | ToSeconds | DateDiff | PeriodAdd | PeriodDiff | TimestampDiff | ExtractDatetime
            | UnixTimestampCurrent | ExtractDuration => EvalType::Int,
            Date | LastDay | FromDays | MakeDate | StrToDateDate | StrToDateDatetime { .. }
            | FromUnixTime1Arg { .. } | Timestamp1Arg | Timestamp2Args | SysDateWithFsp
            | SysDateWithoutFsp | NowWithArg | NowWithoutArg | CurrentDate | UtcDate
            | UtcTimestampWithArg | UtcTimestampWithoutArg | DateLiteral(_)
            | TimestampLiteral(_) | ConvertTz | SubDatetimeAndDuration => EvalType::DateTime,
            CurrentTime0Arg | CurrentTime1Arg | UtcTimeWithArg | UtcTimeWithoutArg
            | SecToTime { .. } | Time | StrToDateDuration { .. } | TimeLiteral(_) | MakeTime => {
                EvalType::Duration
            }
            DateFormat | TimeFormat | MonthName | DayName | GetFormat | FromUnixTime2Arg { .. }
            | TimestampAdd | UnixTimestampDec | SubStringAndDuration | SubTimeDatetimeNull => {
                EvalType::Bytes
            }
        }
    }
}

/// Evaluates one signature over a whole row batch.
///
/// Scratch buffers for argument columns come from `pool`; the result column
/// is newly materialized and owned by the caller. Row order is not
/// significant and rows are independent.
pub fn eval_batch(
    sig: &TimeFuncSig,
    ctx: &mut EvalContext,
    pool: &BufferPool,
    args: &[&dyn VectorExpr],
    input: &RowBatch,
) -> Result<BatchResult> {
    if !sig.supports_vectorized() {
        return Ok(BatchResult::NotSupported);
    }
    if args.len() != sig.arity() {
        return Err(Error::Other(format!(
            "Expect {} arguments, received {}",
            sig.arity(),
            args.len()
        )));
    }
    use TimeFuncSig::*;
    let col = match *sig {
        Year => impl_time::year(ctx, pool, args, input)?,
        Month => impl_time::month(ctx, pool, args, input)?,
        DayOfMonth => impl_time::day_of_month(ctx, pool, args, input)?,
        DayOfWeek => impl_time::day_of_week(ctx, pool, args, input)?,
        DayOfYear => impl_time::day_of_year(ctx, pool, args, input)?,
        WeekDay => impl_time::week_day(ctx, pool, args, input)?,
        Quarter => impl_time::quarter(ctx, pool, args, input)?,
        WeekWithMode => impl_time::week_with_mode(ctx, pool, args, input)?,
        WeekWithoutMode => impl_time::week_without_mode(ctx, pool, args, input)?,
        WeekOfYear => impl_time::week_of_year(ctx, pool, args, input)?,
        YearWeekWithMode => impl_time::year_week_with_mode(ctx, pool, args, input)?,
        YearWeekWithoutMode => impl_time::year_week_without_mode(ctx, pool, args, input)?,
        Hour => impl_time::hour(ctx, pool, args, input)?,
        Minute => impl_time::minute(ctx, pool, args, input)?,
        Second => impl_time::second(ctx, pool, args, input)?,
        MicroSecond => impl_time::micro_second(ctx, pool, args, input)?,
        TimeToSec => impl_time::time_to_sec(ctx, pool, args, input)?,
        ToDays => impl_time::to_days(ctx, pool, args, input)?,
        ToSeconds => impl_time::to_seconds(ctx, pool, args, input)?,
        DateDiff => impl_time::date_diff(ctx, pool, args, input)?,
        PeriodAdd => impl_time::period_add(ctx, pool, args, input)?,
        PeriodDiff => impl_time::period_diff(ctx, pool, args, input)?,
        TimestampDiff => impl_time::timestamp_diff(ctx, pool, args, input)?,
        ExtractDatetime => impl_time::extract_datetime(ctx, pool, args, input)?,
        UnixTimestampCurrent => impl_time::unix_timestamp_current(ctx, input)?,
        Date => impl_time::date(ctx, pool, args, input)?,
        LastDay => impl_time::last_day(ctx, pool, args, input)?,
        FromDays => impl_time::from_days(ctx, pool, args, input)?,
        MakeDate => impl_time::make_date(ctx, pool, args, input)?,
        StrToDateDate => impl_time::str_to_date_date(ctx, pool, args, input)?,
        StrToDateDatetime { fsp } => impl_time::str_to_date_datetime(ctx, pool, args, input, fsp)?,
        StrToDateDuration { fsp } => impl_time::str_to_date_duration(ctx, pool, args, input, fsp)?,
        FromUnixTime1Arg { fsp } => impl_time::from_unix_time_1_arg(ctx, pool, args, input, fsp)?,
        FromUnixTime2Arg { fsp } => impl_time::from_unix_time_2_arg(ctx, pool, args, input, fsp)?,
        Timestamp1Arg => impl_time::timestamp_1_arg(ctx, pool, args, input)?,
        Timestamp2Args => impl_time::timestamp_2_args(ctx, pool, args, input)?,
        SysDateWithFsp => impl_time::sysdate_with_fsp(ctx, pool, args, input)?,
        SysDateWithoutFsp => impl_time::sysdate_without_fsp(ctx, input)?,
        NowWithArg => impl_time::now_with_arg(ctx, pool, args, input)?,
        NowWithoutArg => impl_time::now_without_arg(ctx, input)?,
        CurrentDate => impl_time::current_date(ctx, input)?,
        CurrentTime0Arg => impl_time::current_time_0_arg(ctx, input)?,
        CurrentTime1Arg => impl_time::current_time_1_arg(ctx, pool, args, input)?,
        UtcDate => impl_time::utc_date(ctx, input)?,
        UtcTimestampWithArg => impl_time::utc_timestamp_with_arg(ctx, pool, args, input)?,
        UtcTimestampWithoutArg => impl_time::utc_timestamp_without_arg(ctx, input)?,
        UtcTimeWithArg => impl_time::utc_time_with_arg(ctx, pool, args, input)?,
        UtcTimeWithoutArg => impl_time::utc_time_without_arg(ctx, input)?,
        SecToTime { fsp } => impl_time::sec_to_time(ctx, pool, args, input, fsp)?,
        Time => impl_time::time(ctx, pool, args, input)?,
        DateLiteral(lit) => impl_time::date_literal(ctx, input, lit)?,
        TimeLiteral(lit) => impl_time::time_literal(ctx, input, lit)?,
        TimestampLiteral(lit) => impl_time::timestamp_literal(ctx, input, lit)?,
        DateFormat => impl_time::date_format(ctx, pool, args, input)?,
        TimeFormat => impl_time::time_format(ctx, pool, args, input)?,
        MonthName => impl_time::month_name(ctx, pool, args, input)?,
        DayName => impl_time::day_name(ctx, pool, args, input)?,
        GetFormat => impl_time::get_format(ctx, pool, args, input)?,
        TimestampAdd => impl_time::timestamp_add(ctx, pool, args, input)?,
        MakeTime | ConvertTz | ExtractDuration | UnixTimestampDec | SubDatetimeAndDuration
        | SubStringAndDuration | SubTimeDatetimeNull => unreachable!("checked above"),
    };
    Ok(BatchResult::Done(col))
}
