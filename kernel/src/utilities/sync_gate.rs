// Licensed under the Apache License, Version 2.0 or the MIT License.
// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright Tock Contributors 2026.

//! Blocking waits on a peripheral's LF clock domain.
//!
//! A [`SyncGate`] answers three questions for a [`SyncDomain`] before the
//! caller touches its registers again:
//!
//! - has the LF domain absorbed every write issued so far
//!   ([`SyncGate::wait_sync`])?
//! - has a disable request completed ([`SyncGate::wait_disabled`])?
//! - has a software reset completed ([`SyncGate::wait_reset_complete`])?
//!
//! The gate only reads status bits. How long it polls is up to the
//! [`WaitStrategy`]. [`Spin`] keeps the hardware contract and polls until the
//! bit clears; there is no timeout, since returning early would let the
//! caller overwrite a register whose previous value is still in flight. A
//! SYNCBUSY bit that never clears means the LF clock is gone, and only the
//! watchdog gets the system out of that.
//!
//! `wait_sync` must not be used while the peripheral is clocked by an
//! external clock of unknown rate: completion then depends on edges that may
//! never come.
//!
//! ```rust,ignore
//! let gate = SyncGate::new(&pcnt, Spin);
//! gate.wait_sync()?;
//! pcnt.write_top_buffer(100);
//! ```

use crate::config::CONFIG;
use crate::hil::sync::{SyncDomain, SyncPoint, WaitStrategy};
use crate::trace_sync;
use crate::ErrorCode;

/// Poll until the condition clears.
///
/// Spins forever unless the `bounded_sync_waits` configuration is set, in
/// which case it gives up like [`BoundedSpin`].
#[derive(Clone, Copy, Debug, Default)]
pub struct Spin;

impl WaitStrategy for Spin {
    fn wait_while(&self, point: SyncPoint, busy: &dyn Fn() -> bool) -> Result<(), ErrorCode> {
        match CONFIG.sync_spin_limit {
            Some(polls) => BoundedSpin::new(polls).wait_while(point, busy),
            None => {
                while busy() {
                    core::hint::spin_loop();
                }
                Ok(())
            }
        }
    }
}

/// Poll at most a fixed number of times, then report `ErrorCode::NOACK`.
#[derive(Clone, Copy, Debug)]
pub struct BoundedSpin {
    polls: usize,
}

impl BoundedSpin {
    pub const fn new(polls: usize) -> BoundedSpin {
        BoundedSpin { polls }
    }
}

impl WaitStrategy for BoundedSpin {
    fn wait_while(&self, _point: SyncPoint, busy: &dyn Fn() -> bool) -> Result<(), ErrorCode> {
        for _ in 0..self.polls {
            if !busy() {
                return Ok(());
            }
            core::hint::spin_loop();
        }
        if busy() {
            Err(ErrorCode::NOACK)
        } else {
            Ok(())
        }
    }
}

/// Synchronization waits for one peripheral.
pub struct SyncGate<'a, D: SyncDomain + ?Sized, W: WaitStrategy = Spin> {
    domain: &'a D,
    strategy: W,
}

impl<'a, D: SyncDomain + ?Sized, W: WaitStrategy> SyncGate<'a, D, W> {
    pub const fn new(domain: &'a D, strategy: W) -> SyncGate<'a, D, W> {
        SyncGate { domain, strategy }
    }

    /// Wait until every pending write has reached the LF domain.
    ///
    /// Returns immediately when the peripheral is disabled: nothing is
    /// synchronized while the block is off.
    pub fn wait_sync(&self) -> Result<(), ErrorCode> {
        let domain = self.domain;
        self.wait(SyncPoint::Sync, &|| domain.is_enabled() && domain.sync_busy())
    }

    /// Wait until a disable request has completed.
    pub fn wait_disabled(&self) -> Result<(), ErrorCode> {
        let domain = self.domain;
        self.wait(SyncPoint::Disabled, &|| domain.is_disabling())
    }

    /// Wait until a software reset has completed.
    pub fn wait_reset_complete(&self) -> Result<(), ErrorCode> {
        let domain = self.domain;
        self.wait(SyncPoint::ResetComplete, &|| domain.is_resetting())
    }

    fn wait(&self, point: SyncPoint, busy: &dyn Fn() -> bool) -> Result<(), ErrorCode> {
        trace_sync!("{}: wait {:?}", self.domain.name(), point);
        self.strategy.wait_while(point, busy).map_err(|err| {
            trace_sync!("{}: {:?} not acknowledged", self.domain.name(), point);
            err
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core::cell::Cell;

    /// Status bits that clear after a number of reads, like SYNCBUSY does
    /// after a few LF cycles.
    struct FakeDomain {
        enabled: Cell<bool>,
        busy_reads: Cell<usize>,
        disabling_reads: Cell<usize>,
        resetting_reads: Cell<usize>,
    }

    impl FakeDomain {
        fn new(enabled: bool) -> FakeDomain {
            FakeDomain {
                enabled: Cell::new(enabled),
                busy_reads: Cell::new(0),
                disabling_reads: Cell::new(0),
                resetting_reads: Cell::new(0),
            }
        }

        fn countdown(cell: &Cell<usize>) -> bool {
            let left = cell.get();
            if left == 0 {
                false
            } else {
                cell.set(left - 1);
                true
            }
        }
    }

    impl SyncDomain for FakeDomain {
        fn is_enabled(&self) -> bool {
            self.enabled.get()
        }
        fn sync_busy(&self) -> bool {
            Self::countdown(&self.busy_reads)
        }
        fn is_disabling(&self) -> bool {
            Self::countdown(&self.disabling_reads)
        }
        fn is_resetting(&self) -> bool {
            Self::countdown(&self.resetting_reads)
        }
    }

    #[test]
    fn wait_sync_polls_until_busy_clears() {
        let domain = FakeDomain::new(true);
        domain.busy_reads.set(5);
        let gate = SyncGate::new(&domain, Spin);
        assert_eq!(gate.wait_sync(), Ok(()));
        assert_eq!(domain.busy_reads.get(), 0);
    }

    #[test]
    fn wait_sync_skips_disabled_peripheral() {
        let domain = FakeDomain::new(false);
        domain.busy_reads.set(usize::MAX);
        let gate = SyncGate::new(&domain, BoundedSpin::new(3));
        assert_eq!(gate.wait_sync(), Ok(()));
        // SYNCBUSY was never even read.
        assert_eq!(domain.busy_reads.get(), usize::MAX);
    }

    #[test]
    fn bounded_strategy_reports_stuck_hardware() {
        let domain = FakeDomain::new(true);
        domain.busy_reads.set(usize::MAX);
        let gate = SyncGate::new(&domain, BoundedSpin::new(10));
        assert_eq!(gate.wait_sync(), Err(ErrorCode::NOACK));
    }

    #[test]
    fn bounded_strategy_accepts_late_completion() {
        let domain = FakeDomain::new(true);
        domain.disabling_reads.set(10);
        domain.resetting_reads.set(4);
        let gate = SyncGate::new(&domain, BoundedSpin::new(10));
        assert_eq!(gate.wait_disabled(), Ok(()));
        assert_eq!(gate.wait_reset_complete(), Ok(()));
    }

    #[test]
    fn strategy_sees_wait_points_in_order() {
        struct Recorder(core::cell::RefCell<std::vec::Vec<SyncPoint>>);
        impl WaitStrategy for Recorder {
            fn wait_while(
                &self,
                point: SyncPoint,
                busy: &dyn Fn() -> bool,
            ) -> Result<(), ErrorCode> {
                self.0.borrow_mut().push(point);
                while busy() {}
                Ok(())
            }
        }

        let domain = FakeDomain::new(true);
        let recorder = Recorder(core::cell::RefCell::new(std::vec::Vec::new()));
        let gate = SyncGate::new(&domain, &recorder);
        gate.wait_sync().unwrap();
        gate.wait_disabled().unwrap();
        gate.wait_reset_complete().unwrap();
        assert_eq!(
            *recorder.0.borrow(),
            [SyncPoint::Sync, SyncPoint::Disabled, SyncPoint::ResetComplete]
        );
    }
}
