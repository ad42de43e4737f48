// Copyright 2024 TiKV Project Authors. Licensed under Apache-2.0.

pub mod bit_vec;
pub mod chunked_vec_bytes;
pub mod chunked_vec_sized;
mod vector;

pub use self::bit_vec::BitVec;
pub use self::chunked_vec_bytes::ChunkedVecBytes;
pub use self::chunked_vec_sized::ChunkedVecSized;
pub use self::vector::{EvalType, VectorValue};

/// Element type of integer columns.
pub type Int = i64;
/// Element type of floating point columns.
pub type Real = f64;
/// Element type of string columns.
pub type Bytes = Vec<u8>;
pub type BytesRef<'a> = &'a [u8];
/// Element type of decimal columns.
pub type Decimal = rust_decimal::Decimal;

pub use crate::codec::mysql::{Duration, Time};
