// Copyright 2024 TiKV Project Authors. Licensed under Apache-2.0.

use super::bit_vec::BitVec;
use crate::error::{Error, Result};

/// A fixed-width column: one value slot per row plus a presence bitmap.
///
/// Rows reported null still hold a (meaningless) value slot, which lets
/// evaluators write through `values_mut()` without consulting the bitmap,
/// exactly like the resize/merge-nulls protocol of the original chunk
/// columns.
#[derive(Debug, PartialEq, Clone, Default)]
pub struct ChunkedVecSized<T> {
    data: Vec<T>,
    bitmap: BitVec,
}

impl<T: Clone + Default> ChunkedVecSized<T> {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            data: Vec::with_capacity(capacity),
            bitmap: BitVec::with_capacity(capacity),
        }
    }

    pub fn from_slice(slice: &[Option<T>]) -> Self {
        let mut x = Self::with_capacity(slice.len());
        for v in slice {
            x.push(v.clone());
        }
        x
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    #[inline]
    pub fn push(&mut self, value: Option<T>) {
        match value {
            Some(v) => {
                self.data.push(v);
                self.bitmap.push(true);
            }
            None => {
                self.data.push(T::default());
                self.bitmap.push(false);
            }
        }
    }

    #[inline]
    pub fn get(&self, idx: usize) -> Option<&T> {
        assert!(idx < self.len());
        if self.bitmap.get(idx) {
            Some(&self.data[idx])
        } else {
            None
        }
    }

    #[inline]
    pub fn is_null(&self, idx: usize) -> bool {
        !self.bitmap.get(idx)
    }

    #[inline]
    pub fn set_null(&mut self, idx: usize, is_null: bool) {
        self.bitmap.set(idx, !is_null);
    }

    /// Writes a value and marks the row non-null.
    #[inline]
    pub fn set(&mut self, idx: usize, value: T) {
        self.data[idx] = value;
        self.bitmap.set(idx, true);
    }

    /// After this call the column has exactly `n` rows. Without `preserve`,
    /// every row is reset to a non-null default value, matching the
    /// `Resize*(n, false)` protocol result columns are built with.
    pub fn resize(&mut self, n: usize, preserve: bool) {
        if !preserve {
            self.data.clear();
            self.bitmap.clear();
        }
        self.data.resize(n, T::default());
        self.bitmap.resize(n, true);
    }

    /// Grows capacity to hold at least `rows` rows, surfacing exhaustion as
    /// an error instead of aborting.
    pub fn try_reserve(&mut self, rows: usize) -> Result<()> {
        let additional = rows.saturating_sub(self.data.len());
        self.data
            .try_reserve(additional)
            .map_err(|_| Error::Alloc { rows })?;
        self.bitmap.reserve(additional);
        Ok(())
    }

    #[inline]
    pub fn values(&self) -> &[T] {
        &self.data
    }

    #[inline]
    pub fn values_mut(&mut self) -> &mut [T] {
        &mut self.data
    }

    #[inline]
    pub fn bitmap(&self) -> &BitVec {
        &self.bitmap
    }

    #[inline]
    pub fn bitmap_mut(&mut self) -> &mut BitVec {
        &mut self.bitmap
    }

    pub fn copy_from(&mut self, other: &Self) {
        self.data.clear();
        self.data.extend(other.data.iter().cloned());
        self.bitmap.copy_from(&other.bitmap);
    }

    pub fn to_vec(&self) -> Vec<Option<T>> {
        (0..self.len()).map(|i| self.get(i).cloned()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_push_get() {
        let mut col: ChunkedVecSized<i64> = ChunkedVecSized::with_capacity(0);
        col.push(Some(3));
        col.push(None);
        col.push(Some(-7));
        assert_eq!(col.get(0), Some(&3));
        assert_eq!(col.get(1), None);
        assert_eq!(col.get(2), Some(&-7));
        assert_eq!(col.to_vec(), vec![Some(3), None, Some(-7)]);
    }

    #[test]
    fn test_resize_clears_prior_state() {
        let mut col: ChunkedVecSized<i64> = ChunkedVecSized::from_slice(&[Some(1), None]);
        col.resize(4, false);
        assert_eq!(col.len(), 4);
        for i in 0..4 {
            assert_eq!(col.get(i), Some(&0), "row {}", i);
        }
    }

    #[test]
    fn test_set_null_roundtrip() {
        let mut col: ChunkedVecSized<i64> = ChunkedVecSized::with_capacity(2);
        col.resize(2, false);
        col.set(0, 42);
        col.set_null(1, true);
        assert!(!col.is_null(0));
        assert!(col.is_null(1));
        col.set_null(1, false);
        assert_eq!(col.get(1), Some(&0));
    }
}
