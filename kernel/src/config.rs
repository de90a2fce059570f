// Licensed under the Apache License, Version 2.0 or the MIT License.
// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright Tock Contributors 2026.

//! Data structure for storing compile-time configuration options of the HAL
//! core.
//!
//! Configuration is a typed `const` object rather than a set of `#[cfg]`
//! blocks. Every code path stays type-checked by the compiler, even the ones a
//! given firmware image disables, and the optimizer folds the constants away so
//! a disabled option costs nothing in the final binary.
//!
//! The values are set from cargo features of the `kernel` crate. This file is
//! the only place where `#[cfg(feature = ...)]` style configuration is
//! permitted.

/// Data structure holding compile-time configuration options.
///
/// To change the configuration, enable the matching cargo feature from the
/// board crate.
pub(crate) struct Config {
    /// Whether synchronization waits and mode transitions are traced to the
    /// debug output.
    ///
    /// If enabled, every [`SyncGate`](crate::utilities::sync_gate::SyncGate)
    /// wait and every mode controller step prints a line with the peripheral
    /// and the wait point.
    pub(crate) trace_sync: bool,

    /// Upper bound on the number of status polls the default wait strategy
    /// performs before reporting `ErrorCode::NOACK`.
    ///
    /// `None` keeps the hardware contract: a sync wait on an internally
    /// clocked peripheral always completes, so the loop spins until it does.
    /// A stuck SYNCBUSY bit then hangs the caller until the watchdog fires.
    pub(crate) sync_spin_limit: Option<usize>,

    /// Whether failed parameter assertions are reported through the debug
    /// output and the board's assertion handler before the error is returned.
    pub(crate) debug_asserts: bool,
}

/// Poll budget used when `bounded_sync_waits` is enabled.
///
/// The slowest LF clock on these parts is the 1 kHz ULFRCO, and a write
/// settles within three LF cycles. At core clocks up to 80 MHz one status read
/// takes a handful of cycles, so this budget covers the worst case several
/// times over.
const BOUNDED_SYNC_POLLS: usize = 1_000_000;

/// A unique instance of `Config` where compile-time configuration options are
/// defined.
pub(crate) const CONFIG: Config = Config {
    trace_sync: cfg!(feature = "trace_sync"),
    sync_spin_limit: if cfg!(feature = "bounded_sync_waits") {
        Some(BOUNDED_SYNC_POLLS)
    } else {
        None
    },
    debug_asserts: !cfg!(feature = "no_debug_asserts"),
};
