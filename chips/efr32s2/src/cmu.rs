// Licensed under the Apache License, Version 2.0 or the MIT License.
// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright Tock Contributors 2026.

//! Clock Management Unit, per-peripheral clock selection.
//!
//! Series 2 gives each low-energy peripheral its own clock control register
//! with a `CLKSEL` field. The pulse counter selects between the EM23 group A
//! clock and its S0 pin; the watchdogs select one of the LF oscillators.

use kernel::hil::clock::{ClockMux, ClockSource};
use kernel::utilities::registers::interfaces::{ReadWriteable, Readable};
use kernel::utilities::registers::{register_bitfields, register_structs, ReadWrite};
use kernel::utilities::StaticRef;
use kernel::ErrorCode;

use crate::chip_config::Efr32Config;

register_structs! {
    pub CmuRegisters {
        (0x000 => _reserved0),
        (0x100 => wdog0clkctrl: ReadWrite<u32, WDOGCLKCTRL::Register>),
        (0x104 => _reserved1),
        (0x108 => wdog1clkctrl: ReadWrite<u32, WDOGCLKCTRL::Register>),
        (0x10C => _reserved2),
        (0x130 => pcnt0clkctrl: ReadWrite<u32, PCNT0CLKCTRL::Register>),
        (0x134 => @END),
    }
}

register_bitfields![u32,
    WDOGCLKCTRL [
        CLKSEL OFFSET(0) NUMBITS(3) [
            DISABLED = 0,
            LFRCO = 1,
            LFXO = 2,
            ULFRCO = 3,
            HCLKDIV1024 = 4
        ]
    ],
    PCNT0CLKCTRL [
        CLKSEL OFFSET(0) NUMBITS(2) [
            DISABLED = 0,
            EM23GRPACLK = 1,
            PCNTS0 = 2
        ]
    ]
];

pub struct Cmu {
    registers: StaticRef<CmuRegisters>,
    pcnt_count: usize,
    wdog_count: usize,
}

impl Cmu {
    pub fn new<C: Efr32Config>() -> Cmu {
        let registers = unsafe { StaticRef::new(C::CMU_BASE as *const CmuRegisters) };
        Cmu::at(registers, C::PCNT.len(), C::WDOG.len())
    }

    const fn at(registers: StaticRef<CmuRegisters>, pcnt_count: usize, wdog_count: usize) -> Cmu {
        Cmu {
            registers,
            pcnt_count,
            wdog_count,
        }
    }

    /// Clock watchdog `instance` from the ULFRCO.
    pub fn select_watchdog_ulfrco(&self, instance: usize) -> Result<(), ErrorCode> {
        if instance >= self.wdog_count {
            return Err(ErrorCode::NODEVICE);
        }
        let register = match instance {
            0 => &self.registers.wdog0clkctrl,
            1 => &self.registers.wdog1clkctrl,
            _ => return Err(ErrorCode::NODEVICE),
        };
        register.modify(WDOGCLKCTRL::CLKSEL::ULFRCO);
        Ok(())
    }
}

impl ClockMux for Cmu {
    fn select(&self, instance: usize, source: ClockSource) -> Result<(), ErrorCode> {
        if instance != 0 || instance >= self.pcnt_count {
            return Err(ErrorCode::NODEVICE);
        }
        self.registers.pcnt0clkctrl.modify(match source {
            ClockSource::Internal => PCNT0CLKCTRL::CLKSEL::EM23GRPACLK,
            ClockSource::External => PCNT0CLKCTRL::CLKSEL::PCNTS0,
        });
        Ok(())
    }

    fn source(&self, instance: usize) -> ClockSource {
        if instance == 0
            && instance < self.pcnt_count
            && self
                .registers
                .pcnt0clkctrl
                .matches_all(PCNT0CLKCTRL::CLKSEL::PCNTS0)
        {
            ClockSource::External
        } else {
            ClockSource::Internal
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::chip_config::{Efr32xg21, Efr32xg22};
    use std::boxed::Box;

    pub(crate) fn in_memory<C: Efr32Config>() -> (Cmu, &'static CmuRegisters) {
        let regs: &'static CmuRegisters =
            Box::leak(Box::new(unsafe { core::mem::zeroed::<CmuRegisters>() }));
        (
            Cmu::at(StaticRef::from_static(regs), C::PCNT.len(), C::WDOG.len()),
            regs,
        )
    }

    pub(crate) fn pcnt0_clock_bits(regs: &CmuRegisters) -> u32 {
        regs.pcnt0clkctrl.get()
    }

    pub(crate) fn wdog0_clock_bits(regs: &CmuRegisters) -> u32 {
        regs.wdog0clkctrl.get()
    }

    #[test]
    fn pcnt_clock_follows_source() {
        let (cmu, regs) = in_memory::<Efr32xg22>();
        cmu.select(0, ClockSource::External).unwrap();
        assert!(regs
            .pcnt0clkctrl
            .matches_all(PCNT0CLKCTRL::CLKSEL::PCNTS0));
        assert_eq!(cmu.source(0), ClockSource::External);

        cmu.select(0, ClockSource::Internal).unwrap();
        assert!(regs
            .pcnt0clkctrl
            .matches_all(PCNT0CLKCTRL::CLKSEL::EM23GRPACLK));
        assert_eq!(cmu.source(0), ClockSource::Internal);
    }

    #[test]
    fn part_without_pcnt_rejects_selection() {
        let (cmu, regs) = in_memory::<Efr32xg21>();
        assert_eq!(
            cmu.select(0, ClockSource::External),
            Err(ErrorCode::NODEVICE)
        );
        assert_eq!(regs.pcnt0clkctrl.get(), 0);
    }

    #[test]
    fn watchdog_clock_per_instance() {
        let (cmu, regs) = in_memory::<Efr32xg21>();
        cmu.select_watchdog_ulfrco(1).unwrap();
        assert!(regs
            .wdog1clkctrl
            .matches_all(WDOGCLKCTRL::CLKSEL::ULFRCO));
        assert_eq!(regs.wdog0clkctrl.get(), 0);

        let (cmu, _) = in_memory::<Efr32xg22>();
        assert_eq!(cmu.select_watchdog_ulfrco(1), Err(ErrorCode::NODEVICE));
    }
}
