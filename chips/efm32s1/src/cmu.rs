// Licensed under the Apache License, Version 2.0 or the MIT License.
// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright Tock Contributors 2026.

//! Clock Management Unit, pulse counter clock selection.
//!
//! Each pulse counter has a clock enable and a clock select bit in
//! `CMU_PCNTCTRL`. The select bit routes either LFACLK (oversampling modes)
//! or the instance's S0 input pin (external clock modes) to the counter core.

use kernel::hil::clock::{ClockMux, ClockSource};
use kernel::utilities::registers::interfaces::{ReadWriteable, Readable};
use kernel::utilities::registers::{register_bitfields, register_structs, Field, ReadWrite};
use kernel::utilities::StaticRef;
use kernel::ErrorCode;

use crate::chip_config::Efm32Config;

register_structs! {
    pub CmuRegisters {
        (0x000 => _reserved0),
        /// PCNT clock control
        (0x150 => pcntctrl: ReadWrite<u32, PCNTCTRL::Register>),
        (0x154 => @END),
    }
}

register_bitfields![u32,
    PCNTCTRL [
        PCNT0CLKEN OFFSET(0) NUMBITS(1) [],
        PCNT0CLKSEL OFFSET(1) NUMBITS(1) [
            LFACLK = 0,
            PCNT0S0 = 1
        ],
        PCNT1CLKEN OFFSET(2) NUMBITS(1) [],
        PCNT1CLKSEL OFFSET(3) NUMBITS(1) [
            LFACLK = 0,
            PCNT1S0 = 1
        ],
        PCNT2CLKEN OFFSET(4) NUMBITS(1) [],
        PCNT2CLKSEL OFFSET(5) NUMBITS(1) [
            LFACLK = 0,
            PCNT2S0 = 1
        ]
    ]
];

type PcntClockFields = (
    Field<u32, PCNTCTRL::Register>,
    Field<u32, PCNTCTRL::Register>,
);

pub struct Cmu {
    registers: StaticRef<CmuRegisters>,
    pcnt_count: usize,
}

impl Cmu {
    pub fn new<C: Efm32Config>() -> Cmu {
        // Every part's table names the CMU of that part.
        let registers = unsafe { StaticRef::new(C::CMU_BASE as *const CmuRegisters) };
        Cmu::at(registers, C::PCNT.len())
    }

    const fn at(registers: StaticRef<CmuRegisters>, pcnt_count: usize) -> Cmu {
        Cmu {
            registers,
            pcnt_count,
        }
    }

    fn pcnt_fields(&self, instance: usize) -> Option<PcntClockFields> {
        if instance >= self.pcnt_count {
            return None;
        }
        match instance {
            0 => Some((PCNTCTRL::PCNT0CLKEN, PCNTCTRL::PCNT0CLKSEL)),
            1 => Some((PCNTCTRL::PCNT1CLKEN, PCNTCTRL::PCNT1CLKSEL)),
            2 => Some((PCNTCTRL::PCNT2CLKEN, PCNTCTRL::PCNT2CLKSEL)),
            _ => None,
        }
    }
}

impl ClockMux for Cmu {
    fn select(&self, instance: usize, source: ClockSource) -> Result<(), ErrorCode> {
        let (enable, select) = self.pcnt_fields(instance).ok_or(ErrorCode::NODEVICE)?;
        let pin = match source {
            ClockSource::Internal => 0,
            ClockSource::External => 1,
        };
        self.registers
            .pcntctrl
            .modify(enable.val(1) + select.val(pin));
        Ok(())
    }

    fn source(&self, instance: usize) -> ClockSource {
        match self.pcnt_fields(instance) {
            Some((_, select)) if self.registers.pcntctrl.read(select) == 1 => {
                ClockSource::External
            }
            _ => ClockSource::Internal,
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::chip_config::Efm32gg11;
    use std::boxed::Box;

    pub(crate) fn in_memory(pcnt_count: usize) -> (Cmu, &'static CmuRegisters) {
        let regs: &'static CmuRegisters =
            Box::leak(Box::new(unsafe { core::mem::zeroed::<CmuRegisters>() }));
        (Cmu::at(StaticRef::from_static(regs), pcnt_count), regs)
    }

    pub(crate) fn pcnt_clock_bits(regs: &CmuRegisters) -> u32 {
        regs.pcntctrl.get()
    }

    #[test]
    fn select_routes_and_enables_each_instance() {
        let (cmu, regs) = in_memory(Efm32gg11::PCNT.len());

        cmu.select(1, ClockSource::External).unwrap();
        assert!(regs.pcntctrl.is_set(PCNTCTRL::PCNT1CLKEN));
        assert!(regs.pcntctrl.matches_all(PCNTCTRL::PCNT1CLKSEL::PCNT1S0));
        assert_eq!(cmu.source(1), ClockSource::External);
        assert_eq!(cmu.source(0), ClockSource::Internal);

        cmu.select(1, ClockSource::Internal).unwrap();
        assert_eq!(cmu.source(1), ClockSource::Internal);
        assert!(regs.pcntctrl.is_set(PCNTCTRL::PCNT1CLKEN));
    }

    #[test]
    fn missing_instance_is_rejected() {
        let (cmu, regs) = in_memory(1);
        assert_eq!(
            cmu.select(1, ClockSource::External),
            Err(ErrorCode::NODEVICE)
        );
        assert_eq!(regs.pcntctrl.get(), 0);
        assert_eq!(cmu.source(1), ClockSource::Internal);
    }
}
