// Copyright 2024 TiKV Project Authors. Licensed under Apache-2.0.

pub mod duration;
pub mod time;

pub use self::duration::Duration;
pub use self::time::{Time, TimeType, TimeUnit};

use crate::error::{Error, Result};

/// An fsp that was not given explicitly.
pub const UNSPECIFIED_FSP: i8 = -1;
pub const MAX_FSP: i8 = 6;
pub const MIN_FSP: i8 = 0;
pub const DEFAULT_FSP: i8 = 0;

/// Validates a fractional-second precision. Unspecified maps to the
/// default; anything else outside [0, 6] is a fatal precision error that is
/// never routed through the invalid-time policy.
pub fn check_fsp(fsp: i8) -> Result<u8> {
    if fsp == UNSPECIFIED_FSP {
        return Ok(DEFAULT_FSP as u8);
    }
    if !(MIN_FSP..=MAX_FSP).contains(&fsp) {
        return Err(Error::InvalidFsp(fsp));
    }
    Ok(fsp as u8)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_check_fsp() {
        assert_eq!(check_fsp(UNSPECIFIED_FSP).unwrap(), DEFAULT_FSP as u8);
        assert_eq!(check_fsp(0).unwrap(), 0);
        assert_eq!(check_fsp(6).unwrap(), 6);
        assert!(check_fsp(7).is_err());
        assert!(check_fsp(-2).is_err());
    }
}
