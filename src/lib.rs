// Copyright 2024 TiKV Project Authors. Licensed under Apache-2.0.

//! Vectorized evaluation of MySQL-compatible date/time builtin functions.
//!
//! The crate computes temporal scalar functions (YEAR, WEEK, DATEDIFF,
//! STR_TO_DATE, FROM_UNIXTIME, PERIOD_ADD, ...) one row batch at a time:
//! argument sub-expressions are evaluated into typed columns borrowed from a
//! scratch [`expr::buffer::BufferPool`], nulls are merged bitmap-wise, and
//! invalid or zero temporal values are resolved against the session SQL
//! modes, either failing the statement or degrading single rows to NULL plus
//! a warning, exactly like the MySQL wire protocol does.
//!
//! Entry point: [`vec_expr::eval_batch`] over a [`vec_expr::TimeFuncSig`].

pub mod codec;
pub mod error;
pub mod expr;
pub mod vec_expr;

pub use self::error::{Error, Result};
