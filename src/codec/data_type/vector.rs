// Copyright 2024 TiKV Project Authors. Licensed under Apache-2.0.

use std::fmt;

use super::bit_vec::BitVec;
use super::chunked_vec_bytes::ChunkedVecBytes;
use super::chunked_vec_sized::ChunkedVecSized;
use super::{Decimal, Duration, Int, Real, Time};
use crate::error::{Error, Result};

/// The logical element types a column can hold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EvalType {
    Int,
    Real,
    Decimal,
    Bytes,
    DateTime,
    Duration,
}

impl fmt::Display for EvalType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// A typed, null-aware column holding one value per row of a batch.
#[derive(Debug, PartialEq, Clone)]
pub enum VectorValue {
    Int(ChunkedVecSized<Int>),
    Real(ChunkedVecSized<Real>),
    Decimal(ChunkedVecSized<Decimal>),
    Bytes(ChunkedVecBytes),
    DateTime(ChunkedVecSized<Time>),
    Duration(ChunkedVecSized<Duration>),
}

macro_rules! match_self {
    ($self:ident, $v:ident, $e:expr) => {
        match $self {
            VectorValue::Int($v) => $e,
            VectorValue::Real($v) => $e,
            VectorValue::Decimal($v) => $e,
            VectorValue::Bytes($v) => $e,
            VectorValue::DateTime($v) => $e,
            VectorValue::Duration($v) => $e,
        }
    };
}

impl VectorValue {
    pub fn with_capacity(capacity: usize, eval_tp: EvalType) -> VectorValue {
        match eval_tp {
            EvalType::Int => VectorValue::Int(ChunkedVecSized::with_capacity(capacity)),
            EvalType::Real => VectorValue::Real(ChunkedVecSized::with_capacity(capacity)),
            EvalType::Decimal => VectorValue::Decimal(ChunkedVecSized::with_capacity(capacity)),
            EvalType::Bytes => VectorValue::Bytes(ChunkedVecBytes::with_capacity(capacity)),
            EvalType::DateTime => VectorValue::DateTime(ChunkedVecSized::with_capacity(capacity)),
            EvalType::Duration => VectorValue::Duration(ChunkedVecSized::with_capacity(capacity)),
        }
    }

    #[inline]
    pub fn eval_type(&self) -> EvalType {
        match self {
            VectorValue::Int(_) => EvalType::Int,
            VectorValue::Real(_) => EvalType::Real,
            VectorValue::Decimal(_) => EvalType::Decimal,
            VectorValue::Bytes(_) => EvalType::Bytes,
            VectorValue::DateTime(_) => EvalType::DateTime,
            VectorValue::Duration(_) => EvalType::Duration,
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        match_self!(self, v, v.len())
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    #[inline]
    pub fn is_null(&self, idx: usize) -> bool {
        match_self!(self, v, v.is_null(idx))
    }

    #[inline]
    pub fn bitmap(&self) -> &BitVec {
        match_self!(self, v, v.bitmap())
    }

    #[inline]
    pub fn bitmap_mut(&mut self) -> &mut BitVec {
        match_self!(self, v, v.bitmap_mut())
    }

    pub fn try_reserve(&mut self, rows: usize) -> Result<()> {
        match_self!(self, v, v.try_reserve(rows))
    }

    /// Marks every destination row null that is null in any source column.
    /// Must be called after the destination has been resized to the batch
    /// length and before its nulls are examined.
    pub fn merge_nulls(&mut self, sources: &[&VectorValue]) {
        for src in sources {
            self.bitmap_mut().and_assign(src.bitmap());
        }
    }

    /// Refills this column with the contents of `other`, which must have the
    /// same element type. Keeps the existing allocation where possible.
    pub fn copy_from(&mut self, other: &VectorValue) -> Result<()> {
        match (self, other) {
            (VectorValue::Int(dst), VectorValue::Int(src)) => dst.copy_from(src),
            (VectorValue::Real(dst), VectorValue::Real(src)) => dst.copy_from(src),
            (VectorValue::Decimal(dst), VectorValue::Decimal(src)) => dst.copy_from(src),
            (VectorValue::Bytes(dst), VectorValue::Bytes(src)) => dst.copy_from(src),
            (VectorValue::DateTime(dst), VectorValue::DateTime(src)) => dst.copy_from(src),
            (VectorValue::Duration(dst), VectorValue::Duration(src)) => dst.copy_from(src),
            (dst, src) => {
                return Err(Error::Other(format!(
                    "Expect {} column, received {}",
                    dst.eval_type(),
                    src.eval_type()
                )));
            }
        }
        Ok(())
    }
}

macro_rules! impl_as_vec {
    ($variant:ident, $ty:ty, $as_ref:ident, $as_mut:ident) => {
        impl VectorValue {
            /// Returns the typed column. Panics if this column holds a
            /// different element type; that is a dispatch bug, not a data
            /// error.
            #[inline]
            pub fn $as_ref(&self) -> &$ty {
                match self {
                    VectorValue::$variant(v) => v,
                    other => panic!(
                        "expected {} column, got {}",
                        EvalType::$variant,
                        other.eval_type()
                    ),
                }
            }

            #[inline]
            pub fn $as_mut(&mut self) -> &mut $ty {
                match self {
                    VectorValue::$variant(v) => v,
                    other => panic!(
                        "expected {} column, got {}",
                        EvalType::$variant,
                        other.eval_type()
                    ),
                }
            }
        }
    };
}

impl_as_vec! { Int, ChunkedVecSized<Int>, as_int_vec, as_int_vec_mut }
impl_as_vec! { Real, ChunkedVecSized<Real>, as_real_vec, as_real_vec_mut }
impl_as_vec! { Decimal, ChunkedVecSized<Decimal>, as_decimal_vec, as_decimal_vec_mut }
impl_as_vec! { Bytes, ChunkedVecBytes, as_bytes_vec, as_bytes_vec_mut }
impl_as_vec! { DateTime, ChunkedVecSized<Time>, as_time_vec, as_time_vec_mut }
impl_as_vec! { Duration, ChunkedVecSized<Duration>, as_duration_vec, as_duration_vec_mut }

impl From<Vec<Option<Int>>> for VectorValue {
    fn from(v: Vec<Option<Int>>) -> VectorValue {
        VectorValue::Int(ChunkedVecSized::from_slice(&v))
    }
}

impl From<Vec<Option<Real>>> for VectorValue {
    fn from(v: Vec<Option<Real>>) -> VectorValue {
        VectorValue::Real(ChunkedVecSized::from_slice(&v))
    }
}

impl From<Vec<Option<Decimal>>> for VectorValue {
    fn from(v: Vec<Option<Decimal>>) -> VectorValue {
        VectorValue::Decimal(ChunkedVecSized::from_slice(&v))
    }
}

impl From<Vec<Option<super::Bytes>>> for VectorValue {
    fn from(v: Vec<Option<super::Bytes>>) -> VectorValue {
        VectorValue::Bytes(ChunkedVecBytes::from_slice(&v))
    }
}

impl From<Vec<Option<Time>>> for VectorValue {
    fn from(v: Vec<Option<Time>>) -> VectorValue {
        VectorValue::DateTime(ChunkedVecSized::from_slice(&v))
    }
}

impl From<Vec<Option<Duration>>> for VectorValue {
    fn from(v: Vec<Option<Duration>>) -> VectorValue {
        VectorValue::Duration(ChunkedVecSized::from_slice(&v))
    }
}
