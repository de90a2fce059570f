// Licensed under the Apache License, Version 2.0 or the MIT License.
// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright Tock Contributors 2026.

//! Helper functions for common mathematical operations.

/// Get closest power of two greater than or equal to the given number.
///
/// `num` must be at most `1 << 31`.
pub fn closest_power_of_two(mut num: u32) -> u32 {
    if num == 0 {
        return 1;
    }
    num -= 1;
    num |= num >> 1;
    num |= num >> 2;
    num |= num >> 4;
    num |= num >> 8;
    num |= num >> 16;
    num += 1;
    num
}

/// Get log base 2 of a number.
///
/// Note: this is the floor of the result. Also, an input of 0 results in an
/// output of 0.
pub fn log_base_two(num: u32) -> u32 {
    if num == 0 {
        0
    } else {
        31 - num.leading_zeros()
    }
}

/// Number of clock cycles in `period_ms` milliseconds at `clock_hz`, rounded
/// up.
pub fn ms_to_cycles(period_ms: u32, clock_hz: u32) -> u64 {
    (period_ms as u64 * clock_hz as u64).div_ceil(1000)
}
