// Licensed under the Apache License, Version 2.0 or the MIT License.
// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright Tock Contributors 2026.

//! Standard error enum for peripheral operations.

use core::fmt;

/// Standard errors returned by HAL operations.
///
/// Errors detected at the entry of an operation (bad instance, bad
/// configuration) are always returned before any register is written.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[repr(usize)]
pub enum ErrorCode {
    /// Generic failure condition
    FAIL = 1,
    /// Underlying hardware is busy; retry
    BUSY = 2,
    /// The state requested is already set
    ALREADY = 3,
    /// The peripheral is disabled
    OFF = 4,
    /// An invalid parameter or configuration was passed
    INVAL = 5,
    /// Operation is not supported by this chip family
    NOSUPPORT = 6,
    /// The peripheral reference does not name a block present on this chip
    NODEVICE = 7,
    /// The hardware never acknowledged a synchronized write or transition
    NOACK = 8,
}

impl From<ErrorCode> for usize {
    fn from(err: ErrorCode) -> usize {
        err as usize
    }
}

impl TryFrom<usize> for ErrorCode {
    type Error = ();

    fn try_from(value: usize) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(ErrorCode::FAIL),
            2 => Ok(ErrorCode::BUSY),
            3 => Ok(ErrorCode::ALREADY),
            4 => Ok(ErrorCode::OFF),
            5 => Ok(ErrorCode::INVAL),
            6 => Ok(ErrorCode::NOSUPPORT),
            7 => Ok(ErrorCode::NODEVICE),
            8 => Ok(ErrorCode::NOACK),
            _ => Err(()),
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let msg = match self {
            ErrorCode::FAIL => "operation failed",
            ErrorCode::BUSY => "peripheral busy",
            ErrorCode::ALREADY => "already in requested state",
            ErrorCode::OFF => "peripheral disabled",
            ErrorCode::INVAL => "invalid configuration",
            ErrorCode::NOSUPPORT => "not supported on this chip",
            ErrorCode::NODEVICE => "invalid peripheral reference",
            ErrorCode::NOACK => "hardware not responding",
        };
        f.write_str(msg)
    }
}

#[cfg(test)]
mod tests {
    use super::ErrorCode;

    #[test]
    fn usize_conversion_is_lossless() {
        for code in [
            ErrorCode::FAIL,
            ErrorCode::BUSY,
            ErrorCode::ALREADY,
            ErrorCode::OFF,
            ErrorCode::INVAL,
            ErrorCode::NOSUPPORT,
            ErrorCode::NODEVICE,
            ErrorCode::NOACK,
        ] {
            assert_eq!(ErrorCode::try_from(usize::from(code)), Ok(code));
        }
    }

    #[test]
    fn zero_is_not_an_error() {
        assert_eq!(ErrorCode::try_from(0), Err(()));
        assert_eq!(ErrorCode::try_from(9), Err(()));
    }
}
