// Licensed under the Apache License, Version 2.0 or the MIT License.
// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright Tock Contributors 2026.

//! Interfaces for pulse counter (PCNT) peripherals.
//!
//! A pulse counter counts edges on one input (single modes) or decodes a
//! quadrature signal on two inputs (quad modes). It is clocked either by the
//! LF oscillator, which then oversamples the inputs, or directly by the S0
//! input pin.
//!
//! [`PulseCounterHw`] is the register-level capability each chip family
//! implements. Every method is a single register access; ordering and
//! synchronization are the business of the caller, normally
//! `capsules_core::pulse_counter::ModeController`.

use crate::hil::clock::ClockSource;
use crate::hil::sync::SyncDomain;
use crate::ErrorCode;

/// Operating mode of a pulse counter.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Mode {
    /// Counter off.
    Disabled,
    /// LF clock oversamples S0; one count per edge.
    OversamplingSingle,
    /// S0 clocks the counter directly; one count per edge.
    ExternalClockSingle,
    /// S0 clocks the counter, S1 gives direction.
    ExternalClockQuad,
    /// LF clock decodes quadrature, one count per period.
    OversamplingQuad1x,
    /// LF clock decodes quadrature, two counts per period.
    OversamplingQuad2x,
    /// LF clock decodes quadrature, four counts per period.
    OversamplingQuad4x,
}

impl Mode {
    /// Clock source the mode requires, `None` if it works with either.
    pub fn required_clock(&self) -> Option<ClockSource> {
        match self {
            Mode::Disabled => None,
            Mode::ExternalClockSingle | Mode::ExternalClockQuad => Some(ClockSource::External),
            Mode::OversamplingSingle
            | Mode::OversamplingQuad1x
            | Mode::OversamplingQuad2x
            | Mode::OversamplingQuad4x => Some(ClockSource::Internal),
        }
    }

    pub fn is_quadrature(&self) -> bool {
        matches!(
            self,
            Mode::ExternalClockQuad
                | Mode::OversamplingQuad1x
                | Mode::OversamplingQuad2x
                | Mode::OversamplingQuad4x
        )
    }
}

/// Decode a mode number, using the order of the enum (0 = `Disabled`).
impl TryFrom<u32> for Mode {
    type Error = ErrorCode;

    fn try_from(value: u32) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Mode::Disabled),
            1 => Ok(Mode::OversamplingSingle),
            2 => Ok(Mode::ExternalClockSingle),
            3 => Ok(Mode::ExternalClockQuad),
            4 => Ok(Mode::OversamplingQuad1x),
            5 => Ok(Mode::OversamplingQuad2x),
            6 => Ok(Mode::OversamplingQuad4x),
            _ => Err(ErrorCode::INVAL),
        }
    }
}

/// Counting direction reported by the hardware.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Direction {
    Up,
    Down,
}

/// Pulse counter interrupt sources.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Interrupt {
    Underflow,
    Overflow,
    DirectionChange,
    AuxOverflow,
}

/// Fixed properties of one pulse counter instance.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Capabilities {
    /// Width of the CNT/TOP registers.
    pub counter_bits: u8,
    /// Largest digital filter length the family accepts.
    pub max_filter_len: u8,
}

impl Capabilities {
    pub fn max_count(&self) -> u32 {
        if self.counter_bits >= 32 {
            u32::MAX
        } else {
            (1u32 << self.counter_bits) - 1
        }
    }
}

/// Requested pulse counter configuration.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Config {
    pub mode: Mode,
    pub clock_source: ClockSource,
    /// Initial counter value.
    pub counter: u32,
    /// Counter wrap value.
    pub top: u32,
    /// Count falling instead of rising S0 edges.
    pub negative_edge: bool,
    /// Count down in single modes.
    pub count_down: bool,
    /// Enable the input glitch filter.
    pub filter: bool,
    /// Enable input hysteresis.
    pub hysteresis: bool,
    /// Filter length in LF clock cycles, used when `filter` is set.
    pub filter_len: u8,
}

impl Config {
    /// Configuration with the hardware reset defaults for the given mode.
    pub const fn new(mode: Mode, clock_source: ClockSource) -> Config {
        Config {
            mode,
            clock_source,
            counter: 0,
            top: 0xFF,
            negative_edge: false,
            count_down: false,
            filter: false,
            hysteresis: false,
            filter_len: 0,
        }
    }

    pub const fn with_counter_top(mut self, counter: u32, top: u32) -> Config {
        self.counter = counter;
        self.top = top;
        self
    }

    pub const fn with_filter(mut self, filter_len: u8) -> Config {
        self.filter = true;
        self.filter_len = filter_len;
        self
    }

    /// Check that the configuration is representable on an instance with
    /// `capabilities`.
    pub fn validate(&self, capabilities: &Capabilities) -> Result<(), ErrorCode> {
        if let Some(required) = self.mode.required_clock() {
            if required != self.clock_source {
                return Err(ErrorCode::INVAL);
            }
        }
        let max = capabilities.max_count();
        if self.counter > max || self.top > max {
            return Err(ErrorCode::INVAL);
        }
        if self.filter && self.filter_len > capabilities.max_filter_len {
            return Err(ErrorCode::INVAL);
        }
        Ok(())
    }
}

/// Callbacks from a pulse counter interrupt handler.
pub trait PulseCounterClient {
    /// Counter wrapped from TOP to 0.
    fn overflow(&self);

    /// Counter wrapped from 0 to TOP.
    fn underflow(&self);

    /// Counting direction changed (quad modes).
    fn direction_changed(&self, direction: Direction);
}

/// Register-level operations of one pulse counter instance.
///
/// One implementation exists per chip family. Implementations must not wait
/// on anything and must not touch registers from `check_instance`,
/// `capabilities` or `instance`.
///
/// The mode and enable methods (`clear_enable`, `write_mode_fields`,
/// `hold_core_reset`, `set_enable`, `start_counting`, `software_reset`,
/// `release_reset`) are steps of the sequence run by
/// `capsules_core::pulse_counter::ModeController`. Nothing else may call
/// them: out of order, they race the clock multiplexer and the LF domain.
/// Use the controller to change mode, enable state or clock source.
pub trait PulseCounterHw: SyncDomain {
    /// Instance number, used to address the clock multiplexer.
    fn instance(&self) -> usize;

    /// `Err(ErrorCode::NODEVICE)` if the handle does not name a pulse counter
    /// present on this chip.
    fn check_instance(&self) -> Result<(), ErrorCode>;

    fn capabilities(&self) -> Capabilities;

    /// Mode currently programmed, `Mode::Disabled` when off.
    fn active_mode(&self) -> Mode;

    /// Clear the enable bit.
    fn clear_enable(&self);

    /// Write edge, direction, filter and mode-selecting fields. Called while
    /// the counter is disabled.
    fn write_mode_fields(&self, config: &Config);

    /// Put the counter core in reset. Required before the clock multiplexer
    /// switches to an external clock.
    fn hold_core_reset(&self);

    /// Write the top buffer register (synchronized).
    fn write_top_buffer(&self, value: u32);

    /// Command: load TOP from the top buffer (synchronized).
    fn load_top(&self);

    /// Command: load CNT from TOP (synchronized).
    fn load_counter(&self);

    /// Set the enable bit and start counting in `config.mode`. Releases a
    /// held core reset.
    fn set_enable(&self, config: &Config);

    /// Start counting once the enable has been absorbed. Families where the
    /// enable already starts the counter keep the default.
    fn start_counting(&self) {}

    /// Whether the block only accepts the core reset, top buffer and load
    /// commands while enabled.
    ///
    /// If `false` (the default), values are loaded with the block disabled
    /// and the enable comes last. If `true`, the controller sets the enable
    /// right after the mode fields, loads values, and finishes with
    /// `start_counting`.
    fn loads_require_enable(&self) -> bool {
        false
    }

    /// Issue the hardware software-reset command.
    fn software_reset(&self);

    /// Finish a software reset once the hardware reports it complete.
    fn release_reset(&self) {}

    fn counter(&self) -> u32;
    fn top(&self) -> u32;
    fn top_buffer(&self) -> u32;
    fn direction(&self) -> Direction;

    fn enable_interrupt(&self, interrupt: Interrupt);
    fn disable_interrupt(&self, interrupt: Interrupt);
    fn clear_interrupt(&self, interrupt: Interrupt);
    fn is_interrupt_pending(&self, interrupt: Interrupt) -> bool;
}

#[cfg(test)]
mod tests {
    use super::*;

    const CAPS: Capabilities = Capabilities {
        counter_bits: 16,
        max_filter_len: 127,
    };

    #[test]
    fn mode_requires_matching_clock() {
        let cfg = Config::new(Mode::OversamplingQuad2x, ClockSource::External);
        assert_eq!(cfg.validate(&CAPS), Err(ErrorCode::INVAL));

        let cfg = Config::new(Mode::ExternalClockQuad, ClockSource::Internal);
        assert_eq!(cfg.validate(&CAPS), Err(ErrorCode::INVAL));

        for clock in [ClockSource::Internal, ClockSource::External] {
            assert_eq!(Config::new(Mode::Disabled, clock).validate(&CAPS), Ok(()));
        }
    }

    #[test]
    fn values_must_fit_counter_width() {
        let narrow = Capabilities {
            counter_bits: 8,
            max_filter_len: 0,
        };
        let cfg = Config::new(Mode::OversamplingSingle, ClockSource::Internal);
        assert_eq!(cfg.with_counter_top(0, 0xFF).validate(&narrow), Ok(()));
        assert_eq!(
            cfg.with_counter_top(0, 0x100).validate(&narrow),
            Err(ErrorCode::INVAL)
        );
        assert_eq!(cfg.with_filter(1).validate(&narrow), Err(ErrorCode::INVAL));
        assert_eq!(cfg.with_filter(100).validate(&CAPS), Ok(()));
    }

    #[test]
    fn undefined_mode_numbers_are_rejected() {
        assert_eq!(Mode::try_from(5), Ok(Mode::OversamplingQuad2x));
        assert_eq!(Mode::try_from(7), Err(ErrorCode::INVAL));
        assert_eq!(Mode::try_from(u32::MAX), Err(ErrorCode::INVAL));
    }
}
