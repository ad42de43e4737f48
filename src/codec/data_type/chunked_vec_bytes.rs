// Copyright 2024 TiKV Project Authors. Licensed under Apache-2.0.

use super::bit_vec::BitVec;
use super::{Bytes, BytesRef};
use crate::error::{Error, Result};

/// A variable-width string column with a compact layout.
///
/// `bitmap` indicates whether the element at a given index is present, and
/// `data` stores the actual bytes back to back. A null element takes no
/// space in `data`; `var_offset` records the start of each element.
/// Construction is append-only: reserve, then push one row at a time.
#[derive(Debug, PartialEq, Clone)]
pub struct ChunkedVecBytes {
    data: Vec<u8>,
    bitmap: BitVec,
    length: usize,
    var_offset: Vec<usize>,
}

impl Default for ChunkedVecBytes {
    fn default() -> Self {
        Self::with_capacity(0)
    }
}

impl ChunkedVecBytes {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            data: Vec::with_capacity(capacity),
            bitmap: BitVec::with_capacity(capacity),
            var_offset: vec![0],
            length: 0,
        }
    }

    pub fn from_slice(slice: &[Option<Bytes>]) -> Self {
        let mut x = Self::with_capacity(slice.len());
        for v in slice {
            x.push_ref(v.as_deref());
        }
        x
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.length
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.length == 0
    }

    /// Drops all rows and prepares the column for `n` appends.
    pub fn reserve(&mut self, n: usize) {
        self.clear();
        self.var_offset.reserve(n);
        self.bitmap.reserve(n);
    }

    pub fn try_reserve(&mut self, rows: usize) -> Result<()> {
        self.var_offset
            .try_reserve(rows)
            .map_err(|_| Error::Alloc { rows })?;
        self.bitmap.reserve(rows);
        Ok(())
    }

    pub fn clear(&mut self) {
        self.data.clear();
        self.bitmap.clear();
        self.var_offset.clear();
        self.var_offset.push(0);
        self.length = 0;
    }

    #[inline]
    fn finish_append(&mut self) {
        self.var_offset.push(self.data.len());
        self.length += 1;
    }

    #[inline]
    pub fn push_data(&mut self, mut value: Bytes) {
        self.bitmap.push(true);
        self.data.append(&mut value);
        self.finish_append();
    }

    #[inline]
    pub fn push_data_ref(&mut self, value: BytesRef<'_>) {
        self.bitmap.push(true);
        self.data.extend_from_slice(value);
        self.finish_append();
    }

    #[inline]
    pub fn push_null(&mut self) {
        self.bitmap.push(false);
        self.finish_append();
    }

    #[inline]
    pub fn push(&mut self, value: Option<Bytes>) {
        match value {
            Some(x) => self.push_data(x),
            None => self.push_null(),
        }
    }

    #[inline]
    pub fn push_ref(&mut self, value: Option<BytesRef<'_>>) {
        match value {
            Some(x) => self.push_data_ref(x),
            None => self.push_null(),
        }
    }

    #[inline]
    pub fn get(&self, idx: usize) -> Option<BytesRef<'_>> {
        assert!(idx < self.len());
        if self.bitmap.get(idx) {
            Some(&self.data[self.var_offset[idx]..self.var_offset[idx + 1]])
        } else {
            None
        }
    }

    #[inline]
    pub fn is_null(&self, idx: usize) -> bool {
        !self.bitmap.get(idx)
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
        self.data.extend_from_slice(&other.data);
        self.bitmap.copy_from(&other.bitmap);
        self.var_offset.clear();
        self.var_offset.extend_from_slice(&other.var_offset);
        self.length = other.length;
    }

    pub fn to_vec(&self) -> Vec<Option<Bytes>> {
        (0..self.len())
            .map(|i| self.get(i).map(|x| x.to_owned()))
            .collect()
    }
}
