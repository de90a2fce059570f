// Licensed under the Apache License, Version 2.0 or the MIT License.
// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright Tock Contributors 2026.

//! Mode controller for pulse counter peripherals.
//!
//! Changing a pulse counter's mode or clock source is a protocol, not a
//! register write. The counter must be stopped before its mode fields change,
//! the clock multiplexer must not switch to an external clock while the core
//! is running, and every write into the LF domain has to wait for the
//! previous one to land. The [`ModeController`] owns that protocol:
//!
//! 1. If the counter is enabled, wait for pending writes, clear the enable
//!    bit and wait for the disable to complete. If it runs from an external
//!    clock, switch the multiplexer back to the LF oscillator.
//! 2. Write the mode-selecting fields.
//! 3. External clock: hold the core in reset, switch the clock multiplexer to
//!    the pin, then load counter and top without any synchronization wait.
//!    An external clock has no known rate and may be stopped, so a wait
//!    could hang forever; the datasheet's settling time of a few external
//!    edges is trusted instead.
//! 4. Internal clock: switch the multiplexer to the LF oscillator first, then
//!    wait for synchronization before every synchronized write.
//! 5. Set the enable bit and start counting.
//!
//! Configuring `Mode::Disabled` skips steps 2 and 5 and leaves the counter
//! off. Waits in step 1 are skipped as well when the counter currently runs
//! from an external clock.
//!
//! Families whose block ignores the core reset, top buffer and load commands
//! while disabled (`PulseCounterHw::loads_require_enable`) move step 5 ahead:
//! the enable follows the mode fields while the LF oscillator still clocks
//! the block, then step 3 or 4 runs and a final command starts counting. A
//! disabled counter of such a family only gets its clock source selected.
//!
//! Concurrency
//! -----------
//!
//! `configure` and `reset` are multi-step sequences and are not re-entrant.
//! If an interrupt handler touches the same counter's enable or mode
//! registers, the caller must hold a critical section for the whole call.
//! Handlers that only clear interrupt flags need no protection.
//!
//! Setup
//! -----
//!
//! ```rust,ignore
//! # use kernel::hil::pulse_counter::{Config, Mode};
//! # use kernel::hil::clock::ClockSource;
//! # use kernel::utilities::sync_gate::Spin;
//! # use efr32s2::chip_config::Efr32xg22;
//! let pcnt = efr32s2::pcnt::Pcnt::new::<Efr32xg22>(0);
//! let cmu = efr32s2::cmu::Cmu::new::<Efr32xg22>();
//! let controller = ModeController::new(&pcnt, &cmu, Spin);
//!
//! controller.configure(
//!     &Config::new(Mode::OversamplingQuad2x, ClockSource::Internal).with_counter_top(0, 1000),
//! )?;
//! ```

use kernel::hil::clock::{ClockMux, ClockSource};
use kernel::hil::pulse_counter::{Config, Direction, Mode, PulseCounterHw};
use kernel::hil::sync::{EnableState, WaitStrategy};
use kernel::utilities::sync_gate::{Spin, SyncGate};
use kernel::{hal_assert, trace_sync, ErrorCode};

pub struct ModeController<'a, P: PulseCounterHw, M: ClockMux, W: WaitStrategy = Spin> {
    pcnt: &'a P,
    clock: &'a M,
    gate: SyncGate<'a, P, W>,
}

impl<'a, P: PulseCounterHw, M: ClockMux, W: WaitStrategy> ModeController<'a, P, M, W> {
    pub fn new(pcnt: &'a P, clock: &'a M, strategy: W) -> ModeController<'a, P, M, W> {
        ModeController {
            pcnt,
            clock,
            gate: SyncGate::new(pcnt, strategy),
        }
    }

    /// Apply `config`: mode, clock source, counter and top.
    ///
    /// Nothing is written if the instance does not exist
    /// (`ErrorCode::NODEVICE`) or the configuration cannot be represented
    /// (`ErrorCode::INVAL`).
    pub fn configure(&self, config: &Config) -> Result<(), ErrorCode> {
        self.check_instance()?;
        hal_assert!(
            config.validate(&self.pcnt.capabilities()).is_ok(),
            ErrorCode::INVAL
        )?;

        let instance = self.pcnt.instance();
        trace_sync!(
            "pcnt{}: configure {:?} on {:?} clock",
            instance,
            config.mode,
            config.clock_source
        );

        self.disable()?;

        // Mode fields never change under an external clock.
        let mux_switched = !self.internally_clocked();
        if mux_switched {
            self.clock.select(instance, ClockSource::Internal)?;
        }

        if config.mode != Mode::Disabled {
            self.pcnt.write_mode_fields(config);
        }

        if self.pcnt.loads_require_enable() {
            self.enable_then_load(config, mux_switched)
        } else {
            self.load_then_enable(config, mux_switched)
        }
    }

    /// Return the counter to its power-on state: disabled, internally clocked,
    /// registers at their reset values.
    pub fn reset(&self) -> Result<(), ErrorCode> {
        self.check_instance()?;
        trace_sync!("pcnt{}: reset", self.pcnt.instance());

        self.disable()?;
        self.clock
            .select(self.pcnt.instance(), ClockSource::Internal)?;
        self.pcnt.software_reset();
        self.gate.wait_reset_complete()?;
        self.pcnt.release_reset();
        Ok(())
    }

    /// Load a new counter value and top value.
    ///
    /// The counter keeps running. Writes are synchronized when the counter
    /// is internally clocked.
    pub fn set_counter_top(&self, counter: u32, top: u32) -> Result<(), ErrorCode> {
        self.check_instance()?;
        let max = self.pcnt.capabilities().max_count();
        hal_assert!(counter <= max && top <= max, ErrorCode::INVAL)?;
        self.load_counter_top(counter, top, self.internally_clocked())
    }

    /// Write the top buffer. The value moves into TOP on the next wrap.
    pub fn set_top_buffer(&self, value: u32) -> Result<(), ErrorCode> {
        self.check_instance()?;
        hal_assert!(
            value <= self.pcnt.capabilities().max_count(),
            ErrorCode::INVAL
        )?;
        self.sync_if(self.internally_clocked())?;
        self.pcnt.write_top_buffer(value);
        Ok(())
    }

    /// Write the top buffer and load it into TOP immediately.
    pub fn set_top(&self, value: u32) -> Result<(), ErrorCode> {
        self.set_top_buffer(value)?;
        self.sync_if(self.internally_clocked())?;
        self.pcnt.load_top();
        Ok(())
    }

    pub fn counter(&self) -> Result<u32, ErrorCode> {
        self.check_instance()?;
        Ok(self.pcnt.counter())
    }

    pub fn top(&self) -> Result<u32, ErrorCode> {
        self.check_instance()?;
        Ok(self.pcnt.top())
    }

    pub fn top_buffer(&self) -> Result<u32, ErrorCode> {
        self.check_instance()?;
        Ok(self.pcnt.top_buffer())
    }

    pub fn direction(&self) -> Result<Direction, ErrorCode> {
        self.check_instance()?;
        Ok(self.pcnt.direction())
    }

    pub fn mode(&self) -> Result<Mode, ErrorCode> {
        self.check_instance()?;
        Ok(self.pcnt.active_mode())
    }

    pub fn enable_state(&self) -> Result<EnableState, ErrorCode> {
        self.check_instance()?;
        Ok(self.pcnt.enable_state())
    }

    pub fn clock_source(&self) -> Result<ClockSource, ErrorCode> {
        self.check_instance()?;
        Ok(self.clock.source(self.pcnt.instance()))
    }

    /// Switch to the configured clock, load counter and top with the block
    /// disabled, then enable it.
    fn load_then_enable(&self, config: &Config, mux_switched: bool) -> Result<(), ErrorCode> {
        let instance = self.pcnt.instance();
        let synchronized = match config.clock_source {
            ClockSource::External => {
                // The core has to be in reset before it sees the new clock.
                self.pcnt.hold_core_reset();
                self.clock.select(instance, ClockSource::External)?;
                false
            }
            ClockSource::Internal => {
                if !mux_switched {
                    self.clock.select(instance, ClockSource::Internal)?;
                }
                true
            }
        };

        self.load_counter_top(config.counter, config.top, synchronized)?;

        if config.mode != Mode::Disabled {
            self.sync_if(synchronized)?;
            self.pcnt.set_enable(config);
            self.sync_if(synchronized)?;
            self.pcnt.start_counting();
        }
        Ok(())
    }

    /// Enable on the LF oscillator, switch to the configured clock, load
    /// counter and top into the running block, then start counting.
    fn enable_then_load(&self, config: &Config, mux_switched: bool) -> Result<(), ErrorCode> {
        let instance = self.pcnt.instance();
        if config.mode == Mode::Disabled {
            if mux_switched && config.clock_source == ClockSource::Internal {
                return Ok(());
            }
            return self.clock.select(instance, config.clock_source);
        }
        if !mux_switched {
            self.clock.select(instance, ClockSource::Internal)?;
        }
        self.pcnt.set_enable(config);

        let synchronized = match config.clock_source {
            ClockSource::External => {
                // Last wait: the reset command is still on the LF clock.
                self.gate.wait_sync()?;
                self.pcnt.hold_core_reset();
                self.clock.select(instance, ClockSource::External)?;
                false
            }
            ClockSource::Internal => true,
        };

        self.load_counter_top(config.counter, config.top, synchronized)?;
        self.sync_if(synchronized)?;
        self.pcnt.start_counting();
        Ok(())
    }

    fn check_instance(&self) -> Result<(), ErrorCode> {
        hal_assert!(self.pcnt.check_instance().is_ok(), ErrorCode::NODEVICE)
    }

    fn internally_clocked(&self) -> bool {
        self.clock.source(self.pcnt.instance()) == ClockSource::Internal
    }

    fn sync_if(&self, synchronized: bool) -> Result<(), ErrorCode> {
        if synchronized {
            self.gate.wait_sync()
        } else {
            Ok(())
        }
    }

    /// Stop the counter if it runs. Waits are skipped on an external clock,
    /// which may never tick again.
    fn disable(&self) -> Result<(), ErrorCode> {
        if !self.pcnt.is_enabled() {
            return Ok(());
        }
        let synchronized = self.internally_clocked();
        self.sync_if(synchronized)?;
        self.pcnt.clear_enable();
        if synchronized {
            self.gate.wait_disabled()?;
        }
        Ok(())
    }

    /// Counter and top both go through the top buffer: the counter value is
    /// loaded into TOP and from there into CNT, then the real top value
    /// follows.
    fn load_counter_top(
        &self,
        counter: u32,
        top: u32,
        synchronized: bool,
    ) -> Result<(), ErrorCode> {
        self.sync_if(synchronized)?;
        self.pcnt.write_top_buffer(counter);
        self.sync_if(synchronized)?;
        self.pcnt.load_top();
        self.sync_if(synchronized)?;
        self.pcnt.load_counter();
        if top != counter {
            self.sync_if(synchronized)?;
            self.pcnt.write_top_buffer(top);
            self.sync_if(synchronized)?;
            self.pcnt.load_top();
        }
        Ok(())
    }
}
