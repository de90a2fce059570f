// Licensed under the Apache License, Version 2.0 or the MIT License.
// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright Tock Contributors 2026.

//! Watchdog (WDOG) driver for EFR32 Series 2.
//!
//! `CFG` can only be written while the watchdog is disabled, and a disable
//! completes when `EN.DISABLING` clears. Only `CMD` is synchronized. The
//! clock comes from the CMU, which this driver points at the ULFRCO during
//! `setup`.

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

use crate::chip_config::Efr32Config;
use crate::cmu::Cmu;

register_structs! {
    pub WdogRegisters {
        (0x000 => ipversion: ReadOnly<u32>),
        (0x004 => en: ReadWrite<u32, EN::Register>),
        (0x008 => cfg: ReadWrite<u32, CFG::Register>),
        (0x00C => cmd: WriteOnly<u32, CMD::Register>),
        (0x010 => status: ReadOnly<u32, STATUS::Register>),
        (0x014 => if_: ReadWrite<u32>),
        (0x018 => ien: ReadWrite<u32>),
        (0x01C => lock: WriteOnly<u32, LOCK::Register>),
        (0x020 => syncbusy: ReadOnly<u32, SYNCBUSY::Register>),
        (0x024 => @END),
    }
}

register_bitfields![u32,
    EN [
        EN OFFSET(0) NUMBITS(1) [],
        DISABLING OFFSET(1) NUMBITS(1) []
    ],
    CFG [
        CLRSRC OFFSET(0) NUMBITS(1) [],
        EM2RUN OFFSET(1) NUMBITS(1) [],
        EM3RUN OFFSET(2) NUMBITS(1) [],
        EM4BLOCK OFFSET(3) NUMBITS(1) [],
        DEBUGRUN OFFSET(4) NUMBITS(1) [],
        WDOGRSTDIS OFFSET(8) NUMBITS(1) [],
        /// Timeout is 2^(PERSEL + 3) + 1 clock cycles
        PERSEL OFFSET(16) NUMBITS(4) [],
        WARNSEL OFFSET(24) NUMBITS(2) [],
        WINSEL OFFSET(28) NUMBITS(3) []
    ],
    CMD [
        CLEAR OFFSET(0) NUMBITS(1) []
    ],
    STATUS [
        LOCK OFFSET(31) NUMBITS(1) []
    ],
    LOCK [
        LOCKKEY OFFSET(0) NUMBITS(16) [
            UNLOCK = 0x1DEF
        ]
    ],
    SYNCBUSY [
        CMD OFFSET(0) NUMBITS(1) []
    ]
];

const MAX_PERSEL: u32 = 15;

fn period_select(period_ms: u32, clock_hz: u32) -> Result<u32, ErrorCode> {
    let cycles = math::ms_to_cycles(period_ms, clock_hz);
    if period_ms == 0 || cycles > (1 << (MAX_PERSEL + 3)) + 1 {
        return Err(ErrorCode::INVAL);
    }
    let span = math::closest_power_of_two(cycles.saturating_sub(1) as u32);
    Ok(math::log_base_two(span).saturating_sub(3))
}

pub struct Wdog<'a, W: WaitStrategy = Spin> {
    registers: Option<StaticRef<WdogRegisters>>,
    instance: usize,
    cmu: &'a Cmu,
    clock_hz: u32,
    strategy: W,
}

impl<'a> Wdog<'a> {
    pub fn new<C: Efr32Config>(instance: usize, cmu: &'a Cmu) -> Wdog<'a> {
        let registers = C::WDOG
            .get(instance)
            .map(|&base| unsafe { StaticRef::new(base as *const WdogRegisters) });
        Wdog::at(registers, instance, cmu, C::ULFRCO_HZ, Spin)
    }
}

impl<'a, W: WaitStrategy> Wdog<'a, W> {
    const fn at(
        registers: Option<StaticRef<WdogRegisters>>,
        instance: usize,
        cmu: &'a Cmu,
        clock_hz: u32,
        strategy: W,
    ) -> Wdog<'a, W> {
        Wdog {
            registers,
            instance,
            cmu,
            clock_hz,
            strategy,
        }
    }

    fn gate(&self) -> SyncGate<'_, Self, &W> {
        SyncGate::new(self, &self.strategy)
    }

    fn unlocked(&self) -> Result<StaticRef<WdogRegisters>, ErrorCode> {
        let regs = self.registers.ok_or(ErrorCode::NODEVICE)?;
        if regs.status.is_set(STATUS::LOCK) {
            return Err(ErrorCode::FAIL);
        }
        Ok(regs)
    }

    fn stop(&self, regs: StaticRef<WdogRegisters>) -> Result<(), ErrorCode> {
        if regs.en.is_set(EN::EN) {
            self.gate().wait_sync()?;
            regs.en.modify(EN::EN::CLEAR);
            self.gate().wait_disabled()?;
        }
        Ok(())
    }
}

impl<W: WaitStrategy> SyncDomain for Wdog<'_, W> {
    fn is_enabled(&self) -> bool {
        self.registers.is_some_and(|regs| regs.en.is_set(EN::EN))
    }

    fn sync_busy(&self) -> bool {
        self.registers
            .is_some_and(|regs| regs.syncbusy.is_set(SYNCBUSY::CMD))
    }

    fn is_disabling(&self) -> bool {
        self.registers.is_some_and(|regs| regs.en.is_set(EN::DISABLING))
    }

    fn name(&self) -> &'static str {
        "wdog"
    }
}

impl<W: WaitStrategy> WatchDog for Wdog<'_, W> {
    fn setup(&self, period_ms: u32) -> Result<(), ErrorCode> {
        let regs = self.unlocked()?;
        let persel = period_select(period_ms, self.clock_hz)?;

        self.stop(regs)?;
        self.cmu.select_watchdog_ulfrco(self.instance)?;
        regs.cfg.write(
            CFG::PERSEL.val(persel) + CFG::EM2RUN::SET + CFG::EM3RUN::SET + CFG::DEBUGRUN::CLEAR,
        );
        regs.en.modify(EN::EN::SET);
        Ok(())
    }

    fn tickle(&self) {
        if let Some(regs) = self.registers {
            if regs.en.is_set(EN::EN) && !regs.syncbusy.is_set(SYNCBUSY::CMD) {
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
        if regs.cfg.get() == 0 {
            // Never set up.
            return Err(ErrorCode::OFF);
        }
        regs.en.modify(EN::EN::SET);
        Ok(())
    }

    fn lock(&self) -> Result<(), ErrorCode> {
        let regs = self.registers.ok_or(ErrorCode::NODEVICE)?;
        if regs.status.is_set(STATUS::LOCK) {
            return Err(ErrorCode::ALREADY);
        }
        regs.lock.write(LOCK::LOCKKEY.val(0));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chip_config::{Efr32xg21, Efr32xg22};
    use crate::cmu;
    use kernel::utilities::sync_gate::BoundedSpin;
    use std::boxed::Box;

    fn in_memory<W: WaitStrategy>(
        cmu: &Cmu,
        strategy: W,
    ) -> (Wdog<'_, W>, &'static WdogRegisters) {
        let regs: &'static WdogRegisters =
            Box::leak(Box::new(unsafe { core::mem::zeroed::<WdogRegisters>() }));
        (
            Wdog::at(Some(StaticRef::from_static(regs)), 0, cmu, 1_000, strategy),
            regs,
        )
    }

    fn peek<T>(reg: &T) -> u32 {
        unsafe { core::ptr::read_volatile(reg as *const T as *const u32) }
    }

    #[allow(invalid_reference_casting)]
    fn poke<T>(reg: &T, value: u32) {
        unsafe { core::ptr::write_volatile(reg as *const T as *mut u32, value) };
    }

    #[test]
    fn setup_configures_while_disabled() {
        let (cmu, cmu_regs) = cmu::tests::in_memory::<Efr32xg22>();
        let (wdog, regs) = in_memory(&cmu, Spin);

        wdog.setup(4_000).unwrap();
        assert!(regs.en.is_set(EN::EN));
        assert_eq!(regs.cfg.read(CFG::PERSEL), 9);
        assert!(regs.cfg.is_set(CFG::EM2RUN));
        // ULFRCO
        assert_eq!(cmu::tests::wdog0_clock_bits(cmu_regs), 3);

        wdog.setup(50).unwrap();
        assert_eq!(regs.cfg.read(CFG::PERSEL), 3);
        assert_eq!(wdog.setup(0), Err(ErrorCode::INVAL));
    }

    #[test]
    fn feed_is_dropped_while_clear_in_flight() {
        let (cmu, _) = cmu::tests::in_memory::<Efr32xg22>();
        let (wdog, regs) = in_memory(&cmu, Spin);
        wdog.setup(100).unwrap();

        poke(&regs.syncbusy, 1);
        wdog.tickle();
        assert_eq!(peek(&regs.cmd), 0);

        poke(&regs.syncbusy, 0);
        wdog.tickle();
        assert_eq!(peek(&regs.cmd), 1);
    }

    #[test]
    fn suspend_waits_for_disable() {
        let (cmu, _) = cmu::tests::in_memory::<Efr32xg22>();
        let (wdog, regs) = in_memory(&cmu, BoundedSpin::new(10));
        assert_eq!(wdog.resume(), Err(ErrorCode::OFF));
        wdog.setup(100).unwrap();

        regs.en.modify(EN::DISABLING::SET);
        assert_eq!(wdog.suspend(), Err(ErrorCode::NOACK));

        regs.en.modify(EN::DISABLING::CLEAR);
        wdog.resume().unwrap();
        wdog.suspend().unwrap();
        assert!(!regs.en.is_set(EN::EN));
        wdog.resume().unwrap();
        assert!(regs.en.is_set(EN::EN));
    }

    #[test]
    fn locked_watchdog_rejects_changes() {
        let (cmu, _) = cmu::tests::in_memory::<Efr32xg22>();
        let (wdog, regs) = in_memory(&cmu, Spin);
        wdog.setup(100).unwrap();
        wdog.lock().unwrap();
        assert_eq!(peek(&regs.lock), 0);

        poke(&regs.status, 1 << 31);
        assert_eq!(wdog.lock(), Err(ErrorCode::ALREADY));
        assert_eq!(wdog.setup(100), Err(ErrorCode::FAIL));
        assert_eq!(wdog.suspend(), Err(ErrorCode::FAIL));
    }

    #[test]
    fn second_watchdog_only_on_xg21() {
        let (cmu, _) = cmu::tests::in_memory::<Efr32xg22>();
        let wdog = Wdog::new::<Efr32xg22>(1, &cmu);
        assert_eq!(wdog.setup(100), Err(ErrorCode::NODEVICE));
        assert!(Wdog::new::<Efr32xg21>(1, &cmu).registers.is_some());
    }
}
