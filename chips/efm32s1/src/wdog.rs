// Licensed under the Apache License, Version 2.0 or the MIT License.
// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright Tock Contributors 2026.

//! Watchdog (WDOG) driver for EFM32 Series 1.
//!
//! The watchdog runs from the ULFRCO and keeps running in EM2 and EM3. Its
//! `CTRL` and `CMD` registers sit in the LF domain, so every write waits for
//! the previous one to synchronize. A feed is the exception: if a `CLEAR`
//! command is still in flight, the new one is dropped rather than waited
//! for, since the pending clear restarts the timeout anyway.

use kernel::hil::sync::{SyncDomain, WaitStrategy};
use kernel::hil::watchdog::WatchDog;
use kernel::utilities::math;
use kernel::utilities::registers::interfaces::{ReadWriteable, Readable, Writeable};
use kernel::utilities::registers::{
    register_bitfields, register_structs, ReadOnly, ReadWrite, WriteOnly,
};
use kernel::utilities::sync_gate::{Spin, SyncGate};
use kernel::utilities::StaticRef;
use kernel::ErrorCode;

use crate::chip_config::Efm32Config;

register_structs! {
    pub WdogRegisters {
        (0x000 => ctrl: ReadWrite<u32, CTRL::Register>),
        (0x004 => cmd: WriteOnly<u32, CMD::Register>),
        (0x008 => syncbusy: ReadOnly<u32, SYNCBUSY::Register>),
        (0x00C => @END),
    }
}

register_bitfields![u32,
    CTRL [
        EN OFFSET(0) NUMBITS(1) [],
        DEBUGRUN OFFSET(1) NUMBITS(1) [],
        EM2RUN OFFSET(2) NUMBITS(1) [],
        EM3RUN OFFSET(3) NUMBITS(1) [],
        /// Configuration lock, cleared only by reset
        LOCK OFFSET(4) NUMBITS(1) [],
        EM4BLOCK OFFSET(5) NUMBITS(1) [],
        SWOSCBLOCK OFFSET(6) NUMBITS(1) [],
        /// Timeout is 2^(PERSEL + 3) + 1 clock cycles
        PERSEL OFFSET(8) NUMBITS(4) [],
        CLKSEL OFFSET(12) NUMBITS(2) [
            ULFRCO = 0,
            LFRCO = 1,
            LFXO = 2,
            HFCORECLK = 3
        ],
        WARNSEL OFFSET(16) NUMBITS(2) [],
        WINSEL OFFSET(24) NUMBITS(3) [],
        CLRSRC OFFSET(27) NUMBITS(1) [],
        WDOGRSTDIS OFFSET(30) NUMBITS(1) []
    ],
    CMD [
        CLEAR OFFSET(0) NUMBITS(1) []
    ],
    SYNCBUSY [
        CTRL OFFSET(0) NUMBITS(1) [],
        CMD OFFSET(1) NUMBITS(1) []
    ]
];

const MAX_PERSEL: u32 = 15;

/// Smallest PERSEL whose timeout covers `period_ms`.
fn period_select(period_ms: u32, clock_hz: u32) -> Result<u32, ErrorCode> {
    let cycles = math::ms_to_cycles(period_ms, clock_hz);
    if period_ms == 0 || cycles > (1 << (MAX_PERSEL + 3)) + 1 {
        return Err(ErrorCode::INVAL);
    }
    let span = math::closest_power_of_two(cycles.saturating_sub(1) as u32);
    Ok(math::log_base_two(span).saturating_sub(3))
}

pub struct Wdog<W: WaitStrategy = Spin> {
    registers: Option<StaticRef<WdogRegisters>>,
    clock_hz: u32,
    strategy: W,
}

impl Wdog {
    pub fn new<C: Efm32Config>(instance: usize) -> Wdog {
        let registers = C::WDOG
            .get(instance)
            .map(|&base| unsafe { StaticRef::new(base as *const WdogRegisters) });
        Wdog::at(registers, C::ULFRCO_HZ, Spin)
    }
}

impl<W: WaitStrategy> Wdog<W> {
    const fn at(
        registers: Option<StaticRef<WdogRegisters>>,
        clock_hz: u32,
        strategy: W,
    ) -> Wdog<W> {
        Wdog {
            registers,
            clock_hz,
            strategy,
        }
    }

    fn gate(&self) -> SyncGate<'_, Self, &W> {
        SyncGate::new(self, &self.strategy)
    }

    /// Registers of an unlocked watchdog.
    fn unlocked(&self) -> Result<StaticRef<WdogRegisters>, ErrorCode> {
        let regs = self.registers.ok_or(ErrorCode::NODEVICE)?;
        if regs.ctrl.is_set(CTRL::LOCK) {
            return Err(ErrorCode::FAIL);
        }
        Ok(regs)
    }

    fn stop(&self, regs: StaticRef<WdogRegisters>) -> Result<(), ErrorCode> {
        if regs.ctrl.is_set(CTRL::EN) {
            self.gate().wait_sync()?;
            regs.ctrl.modify(CTRL::EN::CLEAR);
            self.gate().wait_disabled()?;
        }
        Ok(())
    }
}

impl<W: WaitStrategy> SyncDomain for Wdog<W> {
    fn is_enabled(&self) -> bool {
        self.registers.is_some_and(|regs| regs.ctrl.is_set(CTRL::EN))
    }

    fn sync_busy(&self) -> bool {
        self.registers.is_some_and(|regs| regs.syncbusy.get() != 0)
    }

    fn is_disabling(&self) -> bool {
        self.registers.is_some_and(|regs| {
            !regs.ctrl.is_set(CTRL::EN) && regs.syncbusy.is_set(SYNCBUSY::CTRL)
        })
    }

    fn name(&self) -> &'static str {
        "wdog"
    }
}

impl<W: WaitStrategy> WatchDog for Wdog<W> {
    fn setup(&self, period_ms: u32) -> Result<(), ErrorCode> {
        let regs = self.unlocked()?;
        let persel = period_select(period_ms, self.clock_hz)?;

        self.stop(regs)?;
        regs.ctrl.modify(
            CTRL::PERSEL.val(persel)
                + CTRL::CLKSEL::ULFRCO
                + CTRL::EM2RUN::SET
                + CTRL::EM3RUN::SET
                + CTRL::DEBUGRUN::CLEAR
                + CTRL::EN::SET,
        );
        Ok(())
    }

    fn tickle(&self) {
        if let Some(regs) = self.registers {
            if regs.ctrl.is_set(CTRL::EN) && !regs.syncbusy.is_set(SYNCBUSY::CMD) {
                regs.cmd.write(CMD::CLEAR::SET);
            }
        }
    }

    fn suspend(&self) -> Result<(), ErrorCode> {
        let regs = self.unlocked()?;
        self.stop(regs)
    }

    fn resume(&self) -> Result<(), ErrorCode> {
        let regs = self.unlocked()?;
        if regs.ctrl.is_set(CTRL::EN) {
            return Ok(());
        }
        self.gate().wait_sync()?;
        regs.ctrl.modify(CTRL::EN::SET);
        Ok(())
    }

    fn lock(&self) -> Result<(), ErrorCode> {
        let regs = self.registers.ok_or(ErrorCode::NODEVICE)?;
        if regs.ctrl.is_set(CTRL::LOCK) {
            return Err(ErrorCode::ALREADY);
        }
        self.gate().wait_sync()?;
        regs.ctrl.modify(CTRL::LOCK::SET);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chip_config::{Efm32gg11, Efm32pg1};
    use kernel::utilities::sync_gate::BoundedSpin;
    use std::boxed::Box;

    fn in_memory<W: WaitStrategy>(strategy: W) -> (Wdog<W>, &'static WdogRegisters) {
        let regs: &'static WdogRegisters =
            Box::leak(Box::new(unsafe { core::mem::zeroed::<WdogRegisters>() }));
        (
            Wdog::at(Some(StaticRef::from_static(regs)), 1_000, strategy),
            regs,
        )
    }

    fn cmd_written(regs: &WdogRegisters) -> u32 {
        unsafe { core::ptr::read_volatile(&regs.cmd as *const _ as *const u32) }
    }

    #[allow(invalid_reference_casting)]
    fn force_syncbusy(regs: &WdogRegisters, value: u32) {
        unsafe { core::ptr::write_volatile(&regs.syncbusy as *const _ as *mut u32, value) };
    }

    #[test]
    fn period_select_covers_request() {
        assert_eq!(period_select(1, 1_000), Ok(0));
        assert_eq!(period_select(9, 1_000), Ok(0));
        assert_eq!(period_select(10, 1_000), Ok(1));
        assert_eq!(period_select(1_000, 1_000), Ok(7));
        assert_eq!(period_select(1_025, 1_000), Ok(7));
        assert_eq!(period_select(1_026, 1_000), Ok(8));
        assert_eq!(period_select(262_145, 1_000), Ok(15));
        assert_eq!(period_select(262_146, 1_000), Err(ErrorCode::INVAL));
        assert_eq!(period_select(0, 1_000), Err(ErrorCode::INVAL));
    }

    #[test]
    fn setup_starts_watchdog() {
        let (wdog, regs) = in_memory(Spin);
        wdog.setup(2_000).unwrap();
        assert!(regs.ctrl.matches_all(
            CTRL::EN::SET + CTRL::EM2RUN::SET + CTRL::EM3RUN::SET + CTRL::CLKSEL::ULFRCO
        ));
        assert_eq!(regs.ctrl.read(CTRL::PERSEL), 8);

        assert_eq!(wdog.setup(1_000_000), Err(ErrorCode::INVAL));
        assert_eq!(regs.ctrl.read(CTRL::PERSEL), 8);
        assert!(regs.ctrl.is_set(CTRL::EN));
    }

    #[test]
    fn tickle_skips_busy_command() {
        let (wdog, regs) = in_memory(Spin);
        wdog.tickle();
        assert_eq!(cmd_written(regs), 0);

        wdog.setup(100).unwrap();
        force_syncbusy(regs, 0b10);
        wdog.tickle();
        assert_eq!(cmd_written(regs), 0);

        force_syncbusy(regs, 0);
        wdog.tickle();
        assert_eq!(cmd_written(regs), 1);
    }

    #[test]
    fn suspend_and_resume() {
        let (wdog, regs) = in_memory(Spin);
        wdog.setup(100).unwrap();
        wdog.suspend().unwrap();
        assert!(!regs.ctrl.is_set(CTRL::EN));
        assert_eq!(regs.ctrl.read(CTRL::PERSEL), 4);
        wdog.resume().unwrap();
        assert!(regs.ctrl.is_set(CTRL::EN));
    }

    #[test]
    fn lock_freezes_configuration() {
        let (wdog, regs) = in_memory(Spin);
        wdog.setup(100).unwrap();
        wdog.lock().unwrap();
        assert!(regs.ctrl.is_set(CTRL::LOCK));
        assert_eq!(wdog.lock(), Err(ErrorCode::ALREADY));
        assert_eq!(wdog.setup(200), Err(ErrorCode::FAIL));
        assert_eq!(wdog.suspend(), Err(ErrorCode::FAIL));
        assert!(regs.ctrl.is_set(CTRL::EN));
    }

    #[test]
    fn stuck_sync_is_reported() {
        let (wdog, regs) = in_memory(BoundedSpin::new(20));
        wdog.setup(100).unwrap();
        force_syncbusy(regs, 0b01);
        assert_eq!(wdog.suspend(), Err(ErrorCode::NOACK));
        assert!(regs.ctrl.is_set(CTRL::EN));
    }

    #[test]
    fn instances_follow_part_table() {
        assert_eq!(Wdog::new::<Efm32pg1>(1).setup(100), Err(ErrorCode::NODEVICE));
        assert_eq!(Wdog::new::<Efm32pg1>(1).lock(), Err(ErrorCode::NODEVICE));
        assert!(Wdog::new::<Efm32gg11>(1).registers.is_some());
        // Feeding a missing watchdog is a no-op.
        Wdog::new::<Efm32pg1>(3).tickle();
    }
}
