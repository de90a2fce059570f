// Licensed under the Apache License, Version 2.0 or the MIT License.
// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright Tock Contributors 2026.

//! Pulse Counter (PCNT) driver for EFM32 Series 1.
//!
//! On Series 1 there is no separate enable bit: writing `CTRL.MODE` to
//! anything but `DISABLE` starts the counter, and writing `DISABLE` stops
//! it. `CTRL`, `CMD`, `TOPB` and `OVSCFG` live in the LF domain and are
//! tracked by `SYNCBUSY`. Setting `CTRL.RSTEN` holds the counter core (CNT,
//! TOP, AUXCNT) in reset, which is how the external clock switch and the
//! software reset are done.
//!
//! The driver is a set of register steps. Sequencing them is left to
//! `capsules_core::pulse_counter::ModeController`.

use kernel::hil::pulse_counter::{
    Capabilities, Config, Direction, Interrupt, Mode, PulseCounterClient, PulseCounterHw,
};
use kernel::hil::sync::{EnableState, SyncDomain};
use kernel::utilities::registers::interfaces::{ReadWriteable, Readable, Writeable};
use kernel::utilities::registers::{
    register_bitfields, register_structs, Field, FieldValue, LocalRegisterCopy, ReadOnly,
    ReadWrite, WriteOnly,
};
use kernel::utilities::cells::OptionalCell;
use kernel::utilities::StaticRef;
use kernel::ErrorCode;

use crate::chip_config::Efm32Config;

register_structs! {
    pub PcntRegisters {
        (0x000 => ctrl: ReadWrite<u32, CTRL::Register>),
        (0x004 => cmd: WriteOnly<u32, CMD::Register>),
        (0x008 => status: ReadOnly<u32, STATUS::Register>),
        (0x00C => cnt: ReadOnly<u32>),
        (0x010 => top: ReadOnly<u32>),
        (0x014 => topb: ReadWrite<u32>),
        (0x018 => if_: ReadOnly<u32, INT::Register>),
        (0x01C => ifs: WriteOnly<u32, INT::Register>),
        (0x020 => ifc: WriteOnly<u32, INT::Register>),
        (0x024 => ien: ReadWrite<u32, INT::Register>),
        (0x028 => _reserved0),
        (0x030 => freeze: ReadWrite<u32, FREEZE::Register>),
        (0x034 => syncbusy: ReadOnly<u32, SYNCBUSY::Register>),
        (0x038 => auxcnt: ReadOnly<u32>),
        (0x03C => _reserved1),
        (0x040 => ovscfg: ReadWrite<u32, OVSCFG::Register>),
        (0x044 => @END),
    }
}

register_bitfields![u32,
    CTRL [
        MODE OFFSET(0) NUMBITS(3) [
            DISABLE = 0,
            OVSSINGLE = 1,
            EXTCLKSINGLE = 2,
            EXTCLKQUAD = 3,
            OVSQUAD1X = 4,
            OVSQUAD2X = 5,
            OVSQUAD4X = 6
        ],
        FILT OFFSET(4) NUMBITS(1) [],
        /// Hold the PCNT clock domain in reset
        RSTEN OFFSET(5) NUMBITS(1) [],
        CNTRSTEN OFFSET(6) NUMBITS(1) [],
        AUXCNTRSTEN OFFSET(7) NUMBITS(1) [],
        DEBUGHALT OFFSET(8) NUMBITS(1) [],
        HYST OFFSET(9) NUMBITS(1) [],
        S1CDIR OFFSET(10) NUMBITS(1) [],
        CNTEV OFFSET(12) NUMBITS(2) [
            BOTH = 0,
            UP = 1,
            DOWN = 2,
            NONE = 3
        ],
        AUXCNTEV OFFSET(14) NUMBITS(2) [],
        /// Count down in single modes
        CNTDIR OFFSET(16) NUMBITS(1) [],
        /// Count on falling S0 edges
        EDGE OFFSET(17) NUMBITS(1) []
    ],
    CMD [
        /// Load CNT from TOP
        LCNTIM OFFSET(0) NUMBITS(1) [],
        /// Load TOP from TOPB
        LTOPBIM OFFSET(1) NUMBITS(1) []
    ],
    STATUS [
        DIR OFFSET(0) NUMBITS(1) [
            UP = 0,
            DOWN = 1
        ]
    ],
    INT [
        UF OFFSET(0) NUMBITS(1) [],
        OF OFFSET(1) NUMBITS(1) [],
        DIRCNG OFFSET(2) NUMBITS(1) [],
        AUXOF OFFSET(3) NUMBITS(1) [],
        TCC OFFSET(4) NUMBITS(1) [],
        OQSTERR OFFSET(5) NUMBITS(1) []
    ],
    FREEZE [
        REGFREEZE OFFSET(0) NUMBITS(1) []
    ],
    SYNCBUSY [
        CTRL OFFSET(0) NUMBITS(1) [],
        CMD OFFSET(1) NUMBITS(1) [],
        TOPB OFFSET(2) NUMBITS(1) [],
        OVSCFG OFFSET(3) NUMBITS(1) []
    ],
    OVSCFG [
        FILTLEN OFFSET(0) NUMBITS(8) [],
        FLUTTERRM OFFSET(12) NUMBITS(1) []
    ]
];

fn mode_field(mode: Mode) -> FieldValue<u32, CTRL::Register> {
    match mode {
        Mode::Disabled => CTRL::MODE::DISABLE,
        Mode::OversamplingSingle => CTRL::MODE::OVSSINGLE,
        Mode::ExternalClockSingle => CTRL::MODE::EXTCLKSINGLE,
        Mode::ExternalClockQuad => CTRL::MODE::EXTCLKQUAD,
        Mode::OversamplingQuad1x => CTRL::MODE::OVSQUAD1X,
        Mode::OversamplingQuad2x => CTRL::MODE::OVSQUAD2X,
        Mode::OversamplingQuad4x => CTRL::MODE::OVSQUAD4X,
    }
}

fn interrupt_field(interrupt: Interrupt) -> Field<u32, INT::Register> {
    match interrupt {
        Interrupt::Underflow => INT::UF,
        Interrupt::Overflow => INT::OF,
        Interrupt::DirectionChange => INT::DIRCNG,
        Interrupt::AuxOverflow => INT::AUXOF,
    }
}

pub struct Pcnt<'a> {
    registers: Option<StaticRef<PcntRegisters>>,
    instance: usize,
    counter_bits: u8,
    client: OptionalCell<&'a dyn PulseCounterClient>,
}

impl<'a> Pcnt<'a> {
    /// Driver for pulse counter `instance` of part `C`.
    ///
    /// An instance the part does not have yields a driver whose operations
    /// all fail with `ErrorCode::NODEVICE`.
    pub fn new<C: Efm32Config>(instance: usize) -> Pcnt<'a> {
        match C::PCNT.get(instance) {
            Some(info) => {
                let registers = unsafe { StaticRef::new(info.base as *const PcntRegisters) };
                Pcnt::at(Some(registers), instance, info.counter_bits)
            }
            None => Pcnt::at(None, instance, 0),
        }
    }

    const fn at(
        registers: Option<StaticRef<PcntRegisters>>,
        instance: usize,
        counter_bits: u8,
    ) -> Pcnt<'a> {
        Pcnt {
            registers,
            instance,
            counter_bits,
            client: OptionalCell::empty(),
        }
    }

    pub fn set_client(&self, client: &'a dyn PulseCounterClient) {
        self.client.set(client);
    }

    /// Freeze or unfreeze the LF domain registers.
    ///
    /// While frozen, writes collect in the HF domain and are transferred
    /// together on unfreeze. `SYNCBUSY` stays set meanwhile, so the driver
    /// reports no pending synchronization until the freeze is lifted.
    pub fn freeze(&self, frozen: bool) -> Result<(), ErrorCode> {
        let regs = self.registers.ok_or(ErrorCode::NODEVICE)?;
        regs.freeze.write(FREEZE::REGFREEZE.val(frozen as u32));
        Ok(())
    }

    pub fn is_frozen(&self) -> bool {
        self.registers
            .is_some_and(|regs| regs.freeze.is_set(FREEZE::REGFREEZE))
    }

    pub fn aux_counter(&self) -> u32 {
        self.registers.map_or(0, |regs| regs.auxcnt.get())
    }

    pub fn handle_interrupt(&self) {
        let Some(regs) = self.registers else {
            return;
        };
        let pending = regs.if_.get() & regs.ien.get();
        regs.ifc.set(pending);

        let pending: LocalRegisterCopy<u32, INT::Register> = LocalRegisterCopy::new(pending);
        self.client.map(|client| {
            if pending.is_set(INT::OF) {
                client.overflow();
            }
            if pending.is_set(INT::UF) {
                client.underflow();
            }
            if pending.is_set(INT::DIRCNG) {
                client.direction_changed(self.direction());
            }
        });
    }

    fn ctrl_syncing(&self) -> bool {
        !self.is_frozen()
            && self
                .registers
                .is_some_and(|regs| regs.syncbusy.is_set(SYNCBUSY::CTRL))
    }
}

impl SyncDomain for Pcnt<'_> {
    fn is_enabled(&self) -> bool {
        self.registers
            .is_some_and(|regs| !regs.ctrl.matches_all(CTRL::MODE::DISABLE))
    }

    fn sync_busy(&self) -> bool {
        !self.is_frozen() && self.registers.is_some_and(|regs| regs.syncbusy.get() != 0)
    }

    fn is_disabling(&self) -> bool {
        !self.is_enabled() && self.ctrl_syncing()
    }

    fn is_resetting(&self) -> bool {
        self.registers
            .is_some_and(|regs| regs.ctrl.is_set(CTRL::RSTEN))
            && self.ctrl_syncing()
    }

    fn enable_state(&self) -> EnableState {
        match (self.is_enabled(), self.ctrl_syncing()) {
            (true, false) => EnableState::Enabled,
            (true, true) => EnableState::Enabling,
            (false, true) => EnableState::Disabling,
            (false, false) => EnableState::Disabled,
        }
    }

    fn name(&self) -> &'static str {
        "pcnt"
    }
}

impl PulseCounterHw for Pcnt<'_> {
    fn instance(&self) -> usize {
        self.instance
    }

    fn check_instance(&self) -> Result<(), ErrorCode> {
        self.registers.map(|_| ()).ok_or(ErrorCode::NODEVICE)
    }

    fn capabilities(&self) -> Capabilities {
        Capabilities {
            counter_bits: self.counter_bits,
            max_filter_len: u8::MAX,
        }
    }

    fn active_mode(&self) -> Mode {
        let Some(regs) = self.registers else {
            return Mode::Disabled;
        };
        match regs.ctrl.read_as_enum(CTRL::MODE) {
            Some(CTRL::MODE::Value::OVSSINGLE) => Mode::OversamplingSingle,
            Some(CTRL::MODE::Value::EXTCLKSINGLE) => Mode::ExternalClockSingle,
            Some(CTRL::MODE::Value::EXTCLKQUAD) => Mode::ExternalClockQuad,
            Some(CTRL::MODE::Value::OVSQUAD1X) => Mode::OversamplingQuad1x,
            Some(CTRL::MODE::Value::OVSQUAD2X) => Mode::OversamplingQuad2x,
            Some(CTRL::MODE::Value::OVSQUAD4X) => Mode::OversamplingQuad4x,
            Some(CTRL::MODE::Value::DISABLE) | None => Mode::Disabled,
        }
    }

    fn clear_enable(&self) {
        if let Some(regs) = self.registers {
            regs.ctrl.modify(CTRL::MODE::DISABLE);
        }
    }

    fn write_mode_fields(&self, config: &Config) {
        if let Some(regs) = self.registers {
            regs.ctrl.modify(
                CTRL::EDGE.val(config.negative_edge as u32)
                    + CTRL::CNTDIR.val(config.count_down as u32)
                    + CTRL::FILT.val(config.filter as u32)
                    + CTRL::HYST.val(config.hysteresis as u32),
            );
            regs.ovscfg
                .modify(OVSCFG::FILTLEN.val(config.filter_len as u32));
        }
    }

    fn hold_core_reset(&self) {
        if let Some(regs) = self.registers {
            regs.ctrl.modify(CTRL::RSTEN::SET);
        }
    }

    fn write_top_buffer(&self, value: u32) {
        if let Some(regs) = self.registers {
            regs.topb.set(value);
        }
    }

    fn load_top(&self) {
        if let Some(regs) = self.registers {
            regs.cmd.write(CMD::LTOPBIM::SET);
        }
    }

    fn load_counter(&self) {
        if let Some(regs) = self.registers {
            regs.cmd.write(CMD::LCNTIM::SET);
        }
    }

    fn set_enable(&self, config: &Config) {
        if let Some(regs) = self.registers {
            regs.ctrl.modify(mode_field(config.mode) + CTRL::RSTEN::CLEAR);
        }
    }

    /// Series 1 has no reset command: the LF domain is reset through RSTEN,
    /// the HF registers by `release_reset`.
    fn software_reset(&self) {
        if let Some(regs) = self.registers {
            regs.ctrl.write(CTRL::MODE::DISABLE + CTRL::RSTEN::SET);
        }
    }

    fn release_reset(&self) {
        if let Some(regs) = self.registers {
            regs.ctrl.set(0);
            regs.topb.set(0xFF);
            regs.ovscfg.set(0);
            regs.ien.set(0);
            regs.ifc.set(0xFFFF_FFFF);
            regs.freeze.set(0);
        }
    }

    fn counter(&self) -> u32 {
        self.registers.map_or(0, |regs| regs.cnt.get())
    }

    fn top(&self) -> u32 {
        self.registers.map_or(0, |regs| regs.top.get())
    }

    fn top_buffer(&self) -> u32 {
        self.registers.map_or(0, |regs| regs.topb.get())
    }

    fn direction(&self) -> Direction {
        match self
            .registers
            .and_then(|regs| regs.status.read_as_enum(STATUS::DIR))
        {
            Some(STATUS::DIR::Value::DOWN) => Direction::Down,
            _ => Direction::Up,
        }
    }

    fn enable_interrupt(&self, interrupt: Interrupt) {
        if let Some(regs) = self.registers {
            regs.ien.modify(interrupt_field(interrupt).val(1));
        }
    }

    fn disable_interrupt(&self, interrupt: Interrupt) {
        if let Some(regs) = self.registers {
            regs.ien.modify(interrupt_field(interrupt).val(0));
        }
    }

    fn clear_interrupt(&self, interrupt: Interrupt) {
        if let Some(regs) = self.registers {
            regs.ifc.write(interrupt_field(interrupt).val(1));
        }
    }

    fn is_interrupt_pending(&self, interrupt: Interrupt) -> bool {
        self.registers
            .is_some_and(|regs| regs.if_.is_set(interrupt_field(interrupt)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chip_config::{Efm32gg11, Efm32pg1};
    use crate::cmu;
    use capsules_core::pulse_counter::ModeController;
    use kernel::hil::clock::{ClockMux, ClockSource};
    use kernel::utilities::sync_gate::{BoundedSpin, Spin};
    use std::boxed::Box;

    fn in_memory(counter_bits: u8) -> (Pcnt<'static>, &'static PcntRegisters) {
        let regs: &'static PcntRegisters =
            Box::leak(Box::new(unsafe { core::mem::zeroed::<PcntRegisters>() }));
        (
            Pcnt::at(Some(StaticRef::from_static(regs)), 0, counter_bits),
            regs,
        )
    }

    /// Set a hardware-owned status register of the in-memory block.
    #[allow(invalid_reference_casting)]
    fn force<R: kernel::utilities::registers::RegisterLongName>(
        reg: &ReadOnly<u32, R>,
        value: u32,
    ) {
        unsafe { core::ptr::write_volatile(reg as *const _ as *mut u32, value) };
    }

    #[test]
    fn configure_oversampling_quadrature() {
        let (pcnt, regs) = in_memory(16);
        let (cmu, _) = cmu::tests::in_memory(1);
        let controller = ModeController::new(&pcnt, &cmu, Spin);

        let config = Config::new(Mode::OversamplingQuad2x, ClockSource::Internal)
            .with_counter_top(5, 1000)
            .with_filter(12);
        controller.configure(&config).unwrap();

        assert!(regs.ctrl.matches_all(CTRL::MODE::OVSQUAD2X + CTRL::FILT::SET));
        assert!(!regs.ctrl.is_set(CTRL::RSTEN));
        assert_eq!(regs.ovscfg.read(OVSCFG::FILTLEN), 12);
        assert_eq!(regs.topb.get(), 1000);
        assert_eq!(cmu.source(0), ClockSource::Internal);
        assert_eq!(controller.enable_state(), Ok(EnableState::Enabled));
        assert_eq!(controller.mode(), Ok(Mode::OversamplingQuad2x));
    }

    #[test]
    fn configure_external_clock() {
        let (pcnt, regs) = in_memory(16);
        let (cmu, _) = cmu::tests::in_memory(1);
        let controller = ModeController::new(&pcnt, &cmu, Spin);

        let config = Config::new(Mode::ExternalClockSingle, ClockSource::External);
        controller.configure(&config).unwrap();
        assert!(regs.ctrl.matches_all(CTRL::MODE::EXTCLKSINGLE));
        // The enable releases the core reset taken before the switch.
        assert!(!regs.ctrl.is_set(CTRL::RSTEN));
        assert_eq!(cmu.source(0), ClockSource::External);

        // Disabled on an external clock keeps the core in reset.
        controller
            .configure(&Config::new(Mode::Disabled, ClockSource::External))
            .unwrap();
        assert!(regs.ctrl.matches_all(CTRL::MODE::DISABLE + CTRL::RSTEN::SET));
        assert_eq!(controller.enable_state(), Ok(EnableState::Disabled));
    }

    #[test]
    fn reset_restores_power_on_values() {
        let (pcnt, regs) = in_memory(16);
        let (cmu, _) = cmu::tests::in_memory(1);
        let controller = ModeController::new(&pcnt, &cmu, Spin);
        controller
            .configure(
                &Config::new(Mode::ExternalClockQuad, ClockSource::External)
                    .with_counter_top(1, 2),
            )
            .unwrap();
        pcnt.enable_interrupt(Interrupt::Overflow);

        controller.reset().unwrap();

        assert_eq!(regs.ctrl.get(), 0);
        assert_eq!(regs.topb.get(), 0xFF);
        assert_eq!(regs.ien.get(), 0);
        assert_eq!(controller.clock_source(), Ok(ClockSource::Internal));
        assert_eq!(controller.enable_state(), Ok(EnableState::Disabled));
    }

    #[test]
    fn narrow_counter_rejects_wide_top() {
        let (pcnt, regs) = in_memory(8);
        let (cmu, _) = cmu::tests::in_memory(3);
        let controller = ModeController::new(&pcnt, &cmu, Spin);

        let config = Config::new(Mode::OversamplingSingle, ClockSource::Internal)
            .with_counter_top(0, 0x100);
        assert_eq!(controller.configure(&config), Err(ErrorCode::INVAL));
        assert_eq!(regs.ctrl.get(), 0);
        assert_eq!(regs.topb.get(), 0);
    }

    #[test]
    fn instances_follow_part_table() {
        assert_eq!(Pcnt::new::<Efm32pg1>(0).check_instance(), Ok(()));
        assert_eq!(
            Pcnt::new::<Efm32pg1>(1).check_instance(),
            Err(ErrorCode::NODEVICE)
        );
        assert_eq!(Pcnt::new::<Efm32gg11>(2).capabilities().counter_bits, 8);

        let missing = Pcnt::new::<Efm32pg1>(1);
        let (cmu, cmu_regs) = cmu::tests::in_memory(1);
        let controller = ModeController::new(&missing, &cmu, Spin);
        assert_eq!(
            controller.configure(&Config::new(Mode::OversamplingSingle, ClockSource::Internal)),
            Err(ErrorCode::NODEVICE)
        );
        assert_eq!(cmu::tests::pcnt_clock_bits(cmu_regs), 0);
        assert_eq!(missing.freeze(true), Err(ErrorCode::NODEVICE));
    }

    #[test]
    fn active_mode_decodes_every_ctrl_encoding() {
        let (pcnt, regs) = in_memory(16);
        for (field, mode) in [
            (CTRL::MODE::OVSSINGLE, Mode::OversamplingSingle),
            (CTRL::MODE::EXTCLKSINGLE, Mode::ExternalClockSingle),
            (CTRL::MODE::EXTCLKQUAD, Mode::ExternalClockQuad),
            (CTRL::MODE::OVSQUAD1X, Mode::OversamplingQuad1x),
            (CTRL::MODE::OVSQUAD2X, Mode::OversamplingQuad2x),
            (CTRL::MODE::OVSQUAD4X, Mode::OversamplingQuad4x),
            (CTRL::MODE::DISABLE, Mode::Disabled),
        ] {
            regs.ctrl.modify(field);
            assert_eq!(pcnt.active_mode(), mode);
        }
        // Reserved encoding.
        regs.ctrl.modify(CTRL::MODE.val(7));
        assert_eq!(pcnt.active_mode(), Mode::Disabled);
    }

    #[test]
    fn enable_state_tracks_ctrl_sync() {
        let (pcnt, regs) = in_memory(16);
        assert_eq!(pcnt.enable_state(), EnableState::Disabled);

        regs.ctrl.modify(CTRL::MODE::OVSSINGLE);
        force(&regs.syncbusy, 1);
        assert_eq!(pcnt.enable_state(), EnableState::Enabling);

        regs.ctrl.modify(CTRL::MODE::DISABLE);
        assert_eq!(pcnt.enable_state(), EnableState::Disabling);
        assert!(pcnt.is_disabling());

        force(&regs.syncbusy, 0);
        assert_eq!(pcnt.enable_state(), EnableState::Disabled);
    }

    #[test]
    fn frozen_registers_report_no_sync() {
        let (pcnt, regs) = in_memory(16);
        let (cmu, _) = cmu::tests::in_memory(1);
        regs.ctrl.modify(CTRL::MODE::OVSSINGLE);
        force(&regs.syncbusy, 0b0100);
        assert!(pcnt.sync_busy());

        pcnt.freeze(true).unwrap();
        assert!(!pcnt.sync_busy());
        let controller = ModeController::new(&pcnt, &cmu, BoundedSpin::new(10));
        assert_eq!(controller.set_top_buffer(42), Ok(()));
        assert_eq!(regs.topb.get(), 42);

        pcnt.freeze(false).unwrap();
        assert_eq!(controller.set_top_buffer(43), Err(ErrorCode::NOACK));
        assert_eq!(regs.topb.get(), 42);
    }

    #[test]
    fn interrupts_reach_client() {
        use core::cell::RefCell;
        use std::vec::Vec;

        #[derive(Default)]
        struct Events(RefCell<Vec<&'static str>>);
        impl PulseCounterClient for Events {
            fn overflow(&self) {
                self.0.borrow_mut().push("overflow");
            }
            fn underflow(&self) {
                self.0.borrow_mut().push("underflow");
            }
            fn direction_changed(&self, direction: Direction) {
                assert_eq!(direction, Direction::Down);
                self.0.borrow_mut().push("direction");
            }
        }

        let events: &'static Events = Box::leak(Box::new(Events::default()));
        let (pcnt, regs) = in_memory(16);
        pcnt.set_client(events);
        pcnt.enable_interrupt(Interrupt::Overflow);
        pcnt.enable_interrupt(Interrupt::DirectionChange);
        pcnt.enable_interrupt(Interrupt::Underflow);
        pcnt.disable_interrupt(Interrupt::Underflow);
        assert!(regs.ien.matches_all(INT::OF::SET + INT::DIRCNG::SET));
        assert!(!regs.ien.is_set(INT::UF));

        force(&regs.if_, 0b0111);
        force(&regs.status, 1);
        assert!(pcnt.is_interrupt_pending(Interrupt::Underflow));
        pcnt.handle_interrupt();

        assert_eq!(*events.0.borrow(), ["overflow", "direction"]);
    }
}
