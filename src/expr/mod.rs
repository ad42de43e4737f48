// Copyright 2024 TiKV Project Authors. Licensed under Apache-2.0.

pub mod buffer;

use std::mem;
use std::sync::Arc;

use bitflags::bitflags;
use chrono::{DateTime, FixedOffset, Utc};

use crate::error::{Error, Result};

bitflags! {
    /// Session SQL modes affecting temporal validation strictness.
    pub struct SqlMode: u64 {
        const STRICT_TRANS_TABLES = 1 << 22;
        const STRICT_ALL_TABLES = 1 << 23;
        const NO_ZERO_IN_DATE = 1 << 24;
        const NO_ZERO_DATE = 1 << 25;
        const INVALID_DATES = 1 << 26;
    }
}

impl SqlMode {
    #[inline]
    pub fn is_strict(self) -> bool {
        self.contains(SqlMode::STRICT_TRANS_TABLES) || self.contains(SqlMode::STRICT_ALL_TABLES)
    }
}

bitflags! {
    /// Statement execution flags. Write statements escalate invalid-time
    /// warnings to errors under strict SQL mode.
    pub struct Flag: u64 {
        const IGNORE_TRUNCATE = 1;
        const TRUNCATE_AS_WARNING = 1 << 1;
        const IN_INSERT_STMT = 1 << 3;
        const IN_UPDATE_OR_DELETE_STMT = 1 << 4;
    }
}

const DEFAULT_MAX_WARNING_CNT: usize = 64;

/// Per-statement evaluation configuration, shared read-only between all
/// evaluator invocations of the statement.
#[derive(Debug, Clone)]
pub struct EvalConfig {
    /// Timezone used to parse and compute time values.
    pub tz: FixedOffset,
    pub sql_mode: SqlMode,
    pub flag: Flag,
    pub max_warning_cnt: usize,
    /// Statement start time. NOW()/CURRENT_* are stable across one
    /// statement; only SYSDATE reads the real clock.
    pub stmt_ts: DateTime<Utc>,
    /// Session @@default_week_format, consulted by WEEK() without an
    /// explicit mode argument.
    pub default_week_format: String,
}

impl Default for EvalConfig {
    fn default() -> EvalConfig {
        EvalConfig::new()
    }
}

const ONE_DAY_SECS: i64 = 3600 * 24;

impl EvalConfig {
    pub fn new() -> EvalConfig {
        EvalConfig {
            tz: FixedOffset::east_opt(0).unwrap(),
            sql_mode: SqlMode::empty(),
            flag: Flag::empty(),
            max_warning_cnt: DEFAULT_MAX_WARNING_CNT,
            stmt_ts: Utc::now(),
            default_week_format: String::new(),
        }
    }

    pub fn set_sql_mode(&mut self, sql_mode: SqlMode) -> &mut Self {
        self.sql_mode = sql_mode;
        self
    }

    pub fn set_flag(&mut self, flag: Flag) -> &mut Self {
        self.flag = flag;
        self
    }

    pub fn set_time_zone_by_offset(&mut self, offset_secs: i64) -> Result<&mut Self> {
        if offset_secs <= -ONE_DAY_SECS || offset_secs >= ONE_DAY_SECS {
            return Err(Error::Other(format!("invalid timezone offset {}", offset_secs)));
        }
        self.tz = FixedOffset::east_opt(offset_secs as i32)
            .ok_or_else(|| Error::Other(format!("invalid timezone offset {}", offset_secs)))?;
        Ok(self)
    }

    pub fn set_stmt_ts(&mut self, ts: DateTime<Utc>) -> &mut Self {
        self.stmt_ts = ts;
        self
    }

    pub fn set_default_week_format(&mut self, fmt: impl Into<String>) -> &mut Self {
        self.default_week_format = fmt.into();
        self
    }

    fn new_eval_warnings(&self) -> EvalWarnings {
        EvalWarnings::new(self.max_warning_cnt)
    }
}

/// Warnings accumulated during evaluation, surfaced to the client with the
/// statement result.
#[derive(Debug, Default)]
pub struct EvalWarnings {
    max_warning_cnt: usize,
    pub warning_cnt: usize,
    pub warnings: Vec<Error>,
}

impl EvalWarnings {
    fn new(max_warning_cnt: usize) -> EvalWarnings {
        EvalWarnings {
            max_warning_cnt,
            warning_cnt: 0,
            warnings: Vec::with_capacity(max_warning_cnt),
        }
    }

    pub fn append_warning(&mut self, err: Error) {
        self.warning_cnt += 1;
        if self.warnings.len() < self.max_warning_cnt {
            self.warnings.push(err);
        }
    }
}

/// State threaded through every evaluator call: read-only configuration
/// plus the statement warning sink.
#[derive(Debug)]
pub struct EvalContext {
    pub cfg: Arc<EvalConfig>,
    pub warnings: EvalWarnings,
}

impl Default for EvalContext {
    fn default() -> EvalContext {
        let cfg = Arc::new(EvalConfig::default());
        let warnings = cfg.new_eval_warnings();
        EvalContext { cfg, warnings }
    }
}

impl EvalContext {
    pub fn new(cfg: Arc<EvalConfig>) -> EvalContext {
        let warnings = cfg.new_eval_warnings();
        EvalContext { cfg, warnings }
    }

    /// Statement timestamp in the session timezone.
    pub fn stmt_ts(&self) -> DateTime<FixedOffset> {
        self.cfg.stmt_ts.with_timezone(&self.cfg.tz)
    }

    /// The shared invalid-time decision: under strict SQL mode a write
    /// statement fails outright; otherwise the error becomes a warning and
    /// the caller nulls the affected row.
    pub fn handle_invalid_time_error(&mut self, err: Error) -> Result<()> {
        if self.cfg.sql_mode.is_strict()
            && (self.cfg.flag.contains(Flag::IN_INSERT_STMT)
                || self.cfg.flag.contains(Flag::IN_UPDATE_OR_DELETE_STMT))
        {
            return Err(err);
        }
        self.warnings.append_warning(err);
        Ok(())
    }

    pub fn handle_truncate_err(&mut self, err: Error) -> Result<()> {
        if self.cfg.flag.contains(Flag::IGNORE_TRUNCATE) {
            return Ok(());
        }
        if self.cfg.flag.contains(Flag::TRUNCATE_AS_WARNING) {
            self.warnings.append_warning(err);
            return Ok(());
        }
        Err(err)
    }

    pub fn take_warnings(&mut self) -> EvalWarnings {
        mem::replace(
            &mut self.warnings,
            EvalWarnings::new(self.cfg.max_warning_cnt),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_time_policy() {
        // Non-strict: downgrade to warning.
        let mut ctx = EvalContext::default();
        assert!(ctx
            .handle_invalid_time_error(Error::incorrect_datetime_value("0000-00-00"))
            .is_ok());
        assert_eq!(ctx.take_warnings().warning_cnt, 1);

        // Strict mode but a read statement: still a warning.
        let mut cfg = EvalConfig::new();
        cfg.set_sql_mode(SqlMode::STRICT_ALL_TABLES);
        let mut ctx = EvalContext::new(Arc::new(cfg));
        assert!(ctx
            .handle_invalid_time_error(Error::incorrect_datetime_value("0000-00-00"))
            .is_ok());
        assert_eq!(ctx.take_warnings().warning_cnt, 1);

        // Strict mode inside a write statement: fatal.
        let mut cfg = EvalConfig::new();
        cfg.set_sql_mode(SqlMode::STRICT_ALL_TABLES)
            .set_flag(Flag::IN_UPDATE_OR_DELETE_STMT);
        let mut ctx = EvalContext::new(Arc::new(cfg));
        assert!(ctx
            .handle_invalid_time_error(Error::incorrect_datetime_value("0000-00-00"))
            .is_err());
        assert_eq!(ctx.take_warnings().warning_cnt, 0);
    }

    #[test]
    fn test_max_warning_cnt() {
        let mut ctx = EvalContext::default();
        for _ in 0..2 * DEFAULT_MAX_WARNING_CNT {
            ctx.warnings.append_warning(Error::truncated());
        }
        let warnings = ctx.take_warnings();
        assert_eq!(warnings.warning_cnt, 2 * DEFAULT_MAX_WARNING_CNT);
        assert_eq!(warnings.warnings.len(), DEFAULT_MAX_WARNING_CNT);
    }
}
