// Licensed under the Apache License, Version 2.0 or the MIT License.
// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright Tock Contributors 2026.

//! Pulse Counter (PCNT) driver for EFR32 Series 2.
//!
//! Series 2 separates the enable from the mode. `EN.EN` turns the block on,
//! and `EN.DISABLING` stays set until a disable has reached the LF domain.
//! `CFG` (mode, filter, hysteresis) can only be written while the block is
//! disabled, while the core reset, `TOPB` and the load commands are only
//! taken by an enabled block. Counting starts on the `STARTCNT` command once
//! the block is enabled. `SWRST` resets every register; `SWRST.RESETTING`
//! reports when that has finished.
//!
//! Interrupt flags are cleared through the block's write-1-to-clear alias, so
//! a flag raised by hardware between read and write is never lost.
//!
//! ```rust,ignore
//! let pcnt = Pcnt::new::<Efr32xg22>(0);
//! pcnt.set_client(&encoder);
//! pcnt.enable_interrupt(Interrupt::Overflow);
//! ```

use kernel::hil::pulse_counter::{
    Capabilities, Config, Direction, Interrupt, Mode, PulseCounterClient, PulseCounterHw,
};
use kernel::hil::sync::SyncDomain;
use kernel::utilities::registers::interfaces::{ReadWriteable, Readable, Writeable};
use kernel::utilities::registers::{
    register_bitfields, register_structs, Field, FieldValue, LocalRegisterCopy, ReadOnly,
    ReadWrite, WriteOnly,
};
use kernel::utilities::cells::OptionalCell;
use kernel::utilities::StaticRef;
use kernel::ErrorCode;

use crate::chip_config::Efr32Config;

register_structs! {
    pub PcntRegisters {
        (0x000 => ipversion: ReadOnly<u32>),
        (0x004 => en: ReadWrite<u32, EN::Register>),
        (0x008 => swrst: ReadWrite<u32, SWRST::Register>),
        (0x00C => cfg: ReadWrite<u32, CFG::Register>),
        (0x010 => ctrl: ReadWrite<u32, CTRL::Register>),
        (0x014 => cmd: WriteOnly<u32, CMD::Register>),
        (0x018 => status: ReadOnly<u32, STATUS::Register>),
        (0x01C => if_: ReadWrite<u32, INT::Register>),
        (0x020 => ien: ReadWrite<u32, INT::Register>),
        (0x024 => cnt: ReadOnly<u32>),
        (0x028 => auxcnt: ReadOnly<u32>),
        (0x02C => top: ReadOnly<u32>),
        (0x030 => topb: ReadWrite<u32>),
        (0x034 => ovsctrl: ReadWrite<u32, OVSCTRL::Register>),
        (0x038 => syncbusy: ReadOnly<u32, SYNCBUSY::Register>),
        (0x03C => lock: WriteOnly<u32, LOCK::Register>),
        (0x040 => @END),
    }
}

register_bitfields![u32,
    EN [
        EN OFFSET(0) NUMBITS(1) [],
        DISABLING OFFSET(1) NUMBITS(1) []
    ],
    SWRST [
        SWRST OFFSET(0) NUMBITS(1) [],
        RESETTING OFFSET(1) NUMBITS(1) []
    ],
    CFG [
        MODE OFFSET(0) NUMBITS(3) [
            OVSSINGLE = 0,
            EXTCLKSINGLE = 1,
            EXTCLKQUAD = 2,
            OVSQUAD1X = 3,
            OVSQUAD2X = 4,
            OVSQUAD4X = 5
        ],
        DEBUGHALT OFFSET(4) NUMBITS(1) [],
        FILTEN OFFSET(5) NUMBITS(1) [],
        HYST OFFSET(6) NUMBITS(1) [],
        S1CDIR OFFSET(7) NUMBITS(1) [],
        CNTEV OFFSET(8) NUMBITS(2) [],
        AUXCNTEV OFFSET(10) NUMBITS(2) []
    ],
    CTRL [
        CNTRSTEN OFFSET(0) NUMBITS(1) [],
        AUXCNTRSTEN OFFSET(1) NUMBITS(1) [],
        /// Count down in single modes
        CNTDIR OFFSET(2) NUMBITS(1) [],
        /// Count on falling S0 edges
        EDGE OFFSET(3) NUMBITS(1) []
    ],
    CMD [
        CORERST OFFSET(0) NUMBITS(1) [],
        CNTRST OFFSET(1) NUMBITS(1) [],
        AUXCNTRST OFFSET(2) NUMBITS(1) [],
        LCNTIM OFFSET(3) NUMBITS(1) [],
        LTOPBIM OFFSET(4) NUMBITS(1) [],
        STARTCNT OFFSET(5) NUMBITS(1) [],
        STARTAUXCNT OFFSET(6) NUMBITS(1) [],
        STOPCNT OFFSET(7) NUMBITS(1) [],
        STOPAUXCNT OFFSET(8) NUMBITS(1) []
    ],
    STATUS [
        CNTRUNNING OFFSET(0) NUMBITS(1) [],
        AUXCNTRUNNING OFFSET(1) NUMBITS(1) [],
        DIR OFFSET(2) NUMBITS(1) [
            UP = 0,
            DOWN = 1
        ]
    ],
    INT [
        UF OFFSET(0) NUMBITS(1) [],
        OF OFFSET(1) NUMBITS(1) [],
        DIRCNG OFFSET(2) NUMBITS(1) [],
        AUXOF OFFSET(3) NUMBITS(1) []
    ],
    OVSCTRL [
        FILTLEN OFFSET(0) NUMBITS(8) [],
        FLUTTERRM OFFSET(12) NUMBITS(1) []
    ],
    SYNCBUSY [
        CTRL OFFSET(0) NUMBITS(1) [],
        CMD OFFSET(1) NUMBITS(1) [],
        CNT OFFSET(2) NUMBITS(1) [],
        TOP OFFSET(3) NUMBITS(1) [],
        TOPB OFFSET(4) NUMBITS(1) [],
        OVSCTRL OFFSET(5) NUMBITS(1) []
    ],
    LOCK [
        PCNTLOCKKEY OFFSET(0) NUMBITS(16) [
            UNLOCK = 0xA7E0
        ]
    ]
];

/// Offset of the write-1-to-clear alias of every register.
const CLR_ALIAS_OFFSET: usize = 0x2000;

/// `CFG.MODE` encoding. There is no disabled mode; the block is off instead.
fn mode_field(mode: Mode) -> Option<FieldValue<u32, CFG::Register>> {
    match mode {
        Mode::Disabled => None,
        Mode::OversamplingSingle => Some(CFG::MODE::OVSSINGLE),
        Mode::ExternalClockSingle => Some(CFG::MODE::EXTCLKSINGLE),
        Mode::ExternalClockQuad => Some(CFG::MODE::EXTCLKQUAD),
        Mode::OversamplingQuad1x => Some(CFG::MODE::OVSQUAD1X),
        Mode::OversamplingQuad2x => Some(CFG::MODE::OVSQUAD2X),
        Mode::OversamplingQuad4x => Some(CFG::MODE::OVSQUAD4X),
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
    /// Same block through the clear alias. Writing a 1 clears that bit.
    clear: Option<StaticRef<PcntRegisters>>,
    instance: usize,
    counter_bits: u8,
    client: OptionalCell<&'a dyn PulseCounterClient>,
}

impl<'a> Pcnt<'a> {
    pub fn new<C: Efr32Config>(instance: usize) -> Pcnt<'a> {
        match C::PCNT.get(instance) {
            Some(info) => {
                let registers = unsafe { StaticRef::new(info.base as *const PcntRegisters) };
                let clear = unsafe {
                    StaticRef::new((info.base + CLR_ALIAS_OFFSET) as *const PcntRegisters)
                };
                Pcnt::at(Some(registers), Some(clear), instance, info.counter_bits)
            }
            None => Pcnt::at(None, None, instance, 0),
        }
    }

    const fn at(
        registers: Option<StaticRef<PcntRegisters>>,
        clear: Option<StaticRef<PcntRegisters>>,
        instance: usize,
        counter_bits: u8,
    ) -> Pcnt<'a> {
        Pcnt {
            registers,
            clear,
            instance,
            counter_bits,
            client: OptionalCell::empty(),
        }
    }

    pub fn set_client(&self, client: &'a dyn PulseCounterClient) {
        self.client.set(client);
    }

    /// Lock the register interface against writes until `unlock`.
    pub fn lock(&self) -> Result<(), ErrorCode> {
        let regs = self.registers.ok_or(ErrorCode::NODEVICE)?;
        regs.lock.write(LOCK::PCNTLOCKKEY.val(0));
        Ok(())
    }

    pub fn unlock(&self) -> Result<(), ErrorCode> {
        let regs = self.registers.ok_or(ErrorCode::NODEVICE)?;
        regs.lock.write(LOCK::PCNTLOCKKEY::UNLOCK);
        Ok(())
    }

    pub fn aux_counter(&self) -> u32 {
        self.registers.map_or(0, |regs| regs.auxcnt.get())
    }

    pub fn is_running(&self) -> bool {
        self.registers
            .is_some_and(|regs| regs.status.is_set(STATUS::CNTRUNNING))
    }

    pub fn handle_interrupt(&self) {
        let (Some(regs), Some(clear)) = (self.registers, self.clear) else {
            return;
        };
        let pending: LocalRegisterCopy<u32, INT::Register> =
            LocalRegisterCopy::new(regs.if_.get() & regs.ien.get());
        clear.if_.set(pending.get());

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
}

impl SyncDomain for Pcnt<'_> {
    fn is_enabled(&self) -> bool {
        self.registers.is_some_and(|regs| regs.en.is_set(EN::EN))
    }

    fn sync_busy(&self) -> bool {
        self.registers.is_some_and(|regs| regs.syncbusy.get() != 0)
    }

    fn is_disabling(&self) -> bool {
        self.registers.is_some_and(|regs| regs.en.is_set(EN::DISABLING))
    }

    fn is_resetting(&self) -> bool {
        self.registers
            .is_some_and(|regs| regs.swrst.is_set(SWRST::RESETTING))
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
        if !regs.en.is_set(EN::EN) {
            return Mode::Disabled;
        }
        match regs.cfg.read_as_enum(CFG::MODE) {
            Some(CFG::MODE::Value::OVSSINGLE) => Mode::OversamplingSingle,
            Some(CFG::MODE::Value::EXTCLKSINGLE) => Mode::ExternalClockSingle,
            Some(CFG::MODE::Value::EXTCLKQUAD) => Mode::ExternalClockQuad,
            Some(CFG::MODE::Value::OVSQUAD1X) => Mode::OversamplingQuad1x,
            Some(CFG::MODE::Value::OVSQUAD2X) => Mode::OversamplingQuad2x,
            Some(CFG::MODE::Value::OVSQUAD4X) => Mode::OversamplingQuad4x,
            None => Mode::Disabled,
        }
    }

    fn clear_enable(&self) {
        if let Some(regs) = self.registers {
            regs.en.modify(EN::EN::CLEAR);
        }
    }

    fn write_mode_fields(&self, config: &Config) {
        let Some(regs) = self.registers else {
            return;
        };
        if let Some(mode) = mode_field(config.mode) {
            regs.cfg.write(
                mode
                    + CFG::FILTEN.val(config.filter as u32)
                    + CFG::HYST.val(config.hysteresis as u32),
            );
        }
        regs.ctrl.modify(
            CTRL::EDGE.val(config.negative_edge as u32)
                + CTRL::CNTDIR.val(config.count_down as u32),
        );
        regs.ovsctrl.modify(OVSCTRL::FILTLEN.val(config.filter_len as u32));
    }

    fn hold_core_reset(&self) {
        if let Some(regs) = self.registers {
            regs.cmd.write(CMD::CORERST::SET);
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

    fn set_enable(&self, _config: &Config) {
        if let Some(regs) = self.registers {
            regs.en.modify(EN::EN::SET);
        }
    }

    fn start_counting(&self) {
        if let Some(regs) = self.registers {
            regs.cmd.write(CMD::STARTCNT::SET);
        }
    }

    fn loads_require_enable(&self) -> bool {
        true
    }

    fn software_reset(&self) {
        if let Some(regs) = self.registers {
            regs.swrst.modify(SWRST::SWRST::SET);
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
        if self
            .registers
            .is_some_and(|regs| regs.status.matches_all(STATUS::DIR::DOWN))
        {
            Direction::Down
        } else {
            Direction::Up
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
        if let Some(clear) = self.clear {
            clear.if_.write(interrupt_field(interrupt).val(1));
        }
    }

    fn is_interrupt_pending(&self, interrupt: Interrupt) -> bool {
        self.registers
            .is_some_and(|regs| regs.if_.is_set(interrupt_field(interrupt)))
    }
}
