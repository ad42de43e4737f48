// Copyright 2024 TiKV Project Authors. Licensed under Apache-2.0.

use std::cell::RefCell;
use std::collections::HashMap;
use std::ops::{Deref, DerefMut};

use crate::codec::data_type::{EvalType, VectorValue};
use crate::error::Result;

/// Lends pre-sized typed columns to evaluators so intermediate argument
/// columns are not allocated per call.
///
/// The pool is scoped to one evaluation context and is a single-owner
/// resource: it is not `Sync` and concurrent loans from multiple threads
/// require external synchronization. A loan is exclusive until its
/// `ScratchColumn` is dropped, which returns the buffer on every exit path.
///
/// Returned buffers keep their previous contents; evaluators must fully
/// overwrite or null-mask every row they claim to produce.
#[derive(Debug, Default)]
pub struct BufferPool {
    free: RefCell<HashMap<EvalType, Vec<VectorValue>>>,
}

impl BufferPool {
    pub fn new() -> BufferPool {
        BufferPool::default()
    }

    /// Acquires a column of `eval_tp` with capacity for at least `rows`
    /// rows. Fails only on resource exhaustion.
    pub fn acquire(&self, eval_tp: EvalType, rows: usize) -> Result<ScratchColumn<'_>> {
        let reused = self
            .free
            .borrow_mut()
            .get_mut(&eval_tp)
            .and_then(Vec::pop);
        let mut col = reused.unwrap_or_else(|| VectorValue::with_capacity(0, eval_tp));
        col.try_reserve(rows)?;
        Ok(ScratchColumn {
            pool: self,
            col: Some(col),
        })
    }

    fn release(&self, col: VectorValue) {
        self.free
            .borrow_mut()
            .entry(col.eval_type())
            .or_default()
            .push(col);
    }

    #[cfg(test)]
    fn idle_count(&self, eval_tp: EvalType) -> usize {
        self.free
            .borrow()
            .get(&eval_tp)
            .map_or(0, |v| v.len())
    }
}

/// An exclusive lease of a pooled column. Dropping it returns the buffer to
/// the pool, so release happens exactly once on success, early return and
/// error paths alike.
#[derive(Debug)]
pub struct ScratchColumn<'a> {
    pool: &'a BufferPool,
    col: Option<VectorValue>,
}

impl Deref for ScratchColumn<'_> {
    type Target = VectorValue;

    #[inline]
    fn deref(&self) -> &VectorValue {
        self.col.as_ref().unwrap()
    }
}

impl DerefMut for ScratchColumn<'_> {
    #[inline]
    fn deref_mut(&mut self) -> &mut VectorValue {
        self.col.as_mut().unwrap()
    }
}

impl Drop for ScratchColumn<'_> {
    fn drop(&mut self) {
        if let Some(col) = self.col.take() {
            self.pool.release(col);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reuse_after_release() {
        let pool = BufferPool::new();
        {
            let _a = pool.acquire(EvalType::Int, 16).unwrap();
            let _b = pool.acquire(EvalType::Int, 16).unwrap();
            // two concurrent loans of the same type never alias
            assert_eq!(pool.idle_count(EvalType::Int), 0);
        }
        assert_eq!(pool.idle_count(EvalType::Int), 2);
        {
            let _c = pool.acquire(EvalType::Int, 4).unwrap();
            assert_eq!(pool.idle_count(EvalType::Int), 1);
        }
        assert_eq!(pool.idle_count(EvalType::Int), 2);
    }

    #[test]
    fn test_release_on_early_exit() {
        let pool = BufferPool::new();
        let failing = || -> Result<()> {
            let _buf = pool.acquire(EvalType::Bytes, 8)?;
            Err(crate::error::Error::truncated())
        };
        assert!(failing().is_err());
        assert_eq!(pool.idle_count(EvalType::Bytes), 1);
    }

    #[test]
    fn test_types_are_segregated() {
        let pool = BufferPool::new();
        {
            let a = pool.acquire(EvalType::DateTime, 4).unwrap();
            assert_eq!(a.eval_type(), EvalType::DateTime);
        }
        let b = pool.acquire(EvalType::Duration, 4).unwrap();
        assert_eq!(b.eval_type(), EvalType::Duration);
        assert_eq!(pool.idle_count(EvalType::DateTime), 1);
    }
}
