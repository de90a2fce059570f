// Licensed under the Apache License, Version 2.0 or the MIT License.
// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright Tock Contributors 2026.

//! Interfaces for peripherals whose registers live in a slower clock domain.
//!
//! Many low-energy peripherals (pulse counter, watchdog, RTCC) run from a
//! low-frequency (LF) clock while the CPU writes their registers from the
//! high-frequency bus. A write first lands in a shadow register and is then
//! transferred into the LF domain, which takes a few LF clock cycles. While
//! the transfer is in flight, the matching `SYNCBUSY` bit is set, and a second
//! write to the same register would be lost.
//!
//! A chip driver exposes those status bits through [`SyncDomain`]. The
//! [`SyncGate`](crate::utilities::sync_gate::SyncGate) polls them through a
//! [`WaitStrategy`], which decides how long to poll.

use crate::ErrorCode;

/// Lifecycle of a peripheral block.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EnableState {
    Disabled,
    /// Enable written, not yet absorbed by the LF domain.
    Enabling,
    Enabled,
    /// Enable cleared, the block is still shutting down.
    Disabling,
}

/// The condition a synchronization wait is waiting out.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SyncPoint {
    /// Register writes or commands still propagating into the LF domain.
    Sync,
    /// A disable request still in progress.
    Disabled,
    /// A software reset still in progress.
    ResetComplete,
}

/// Status bits of a peripheral with a synchronized register interface.
///
/// All methods are plain status reads; none of them writes a register.
pub trait SyncDomain {
    /// Whether the block is enabled, as last written by software.
    fn is_enabled(&self) -> bool;

    /// Whether any register write or command is still propagating into the
    /// LF domain.
    fn sync_busy(&self) -> bool;

    /// Whether a disable request is still being carried out.
    fn is_disabling(&self) -> bool;

    /// Whether a software reset is still being carried out.
    fn is_resetting(&self) -> bool {
        false
    }

    /// Current lifecycle state.
    fn enable_state(&self) -> EnableState {
        if self.is_disabling() {
            EnableState::Disabling
        } else if self.is_enabled() {
            EnableState::Enabled
        } else {
            EnableState::Disabled
        }
    }

    /// Short name used in trace output.
    fn name(&self) -> &'static str {
        "peripheral"
    }
}

/// How a synchronization wait polls.
pub trait WaitStrategy {
    /// Poll `busy` until it returns `false`.
    ///
    /// Returns `Err(ErrorCode::NOACK)` if the strategy gives up before the
    /// condition clears. Strategies that never give up always return `Ok`.
    fn wait_while(&self, point: SyncPoint, busy: &dyn Fn() -> bool) -> Result<(), ErrorCode>;
}

impl<W: WaitStrategy + ?Sized> WaitStrategy for &W {
    fn wait_while(&self, point: SyncPoint, busy: &dyn Fn() -> bool) -> Result<(), ErrorCode> {
        (**self).wait_while(point, busy)
    }
}
