// Licensed under the Apache License, Version 2.0 or the MIT License.
// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright Tock Contributors 2026.

//! Interface for hardware watchdog timers.

use crate::ErrorCode;

/// A watchdog resets the chip unless it is tickled regularly.
pub trait WatchDog {
    /// Start the watchdog with a timeout of at least `period_ms`
    /// milliseconds.
    fn setup(&self, period_ms: u32) -> Result<(), ErrorCode>;

    /// Restart the timeout. Never blocks: if a previous clear is still
    /// propagating, this one is dropped.
    fn tickle(&self);

    /// Stop the watchdog, e.g. before a long blocking operation.
    fn suspend(&self) -> Result<(), ErrorCode>;

    /// Restart the watchdog after `suspend`.
    fn resume(&self) -> Result<(), ErrorCode>;

    /// Lock the configuration until the next reset.
    fn lock(&self) -> Result<(), ErrorCode>;
}
