// Licensed under the Apache License, Version 2.0 or the MIT License.
// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright Tock Contributors 2026.

//! Interface to the clock manager's per-peripheral clock multiplexers.

use crate::ErrorCode;

/// Clock feeding a peripheral's counting logic.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum ClockSource {
    /// The LF oscillator tick. Rate known, synchronization always completes.
    #[default]
    Internal,
    /// A clock applied on an input pin. Rate unknown and possibly stopped, so
    /// nothing may block waiting on it.
    External,
}

/// Clock multiplexer in front of a peripheral instance.
///
/// Implemented by the chip's clock management unit. The clock tree itself
/// (oscillator enables, LF branch selection) is configured elsewhere.
///
/// A pulse counter's multiplexer belongs to its mode controller
/// (`capsules_core::pulse_counter::ModeController`). Switching it from
/// anywhere else can hand a running core an external clock without the
/// required core reset. Other callers may only use `source`.
pub trait ClockMux {
    /// Route `source` to peripheral `instance`.
    fn select(&self, instance: usize, source: ClockSource) -> Result<(), ErrorCode>;

    /// Source currently routed to peripheral `instance`.
    fn source(&self, instance: usize) -> ClockSource;
}
