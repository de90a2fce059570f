// Licensed under the Apache License, Version 2.0 or the MIT License.
// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright Tock Contributors 2026.

//! Chip specific configuration.
//!
//! Series 2 parts differ in which peripherals they carry at all: the xG21 has
//! no pulse counter, the xG22 has one. Drivers created for an instance the
//! selected part lacks report `ErrorCode::NODEVICE`.

/// One pulse counter instance.
#[derive(Clone, Copy, Debug)]
pub struct PcntInstance {
    pub base: usize,
    /// Width of CNT and TOP.
    pub counter_bits: u8,
}

/// Series 2 configuration based on the target part.
pub trait Efr32Config {
    /// Pulse counter instances, indexed by instance number.
    const PCNT: &'static [PcntInstance];

    /// Watchdog base addresses, indexed by instance number.
    const WDOG: &'static [usize];

    const CMU_BASE: usize = 0x4000_8000;

    /// Frequency of the ULFRCO, the watchdog clock, in Hz.
    const ULFRCO_HZ: u32 = 1_000;
}

pub enum Efr32xg21 {}

impl Efr32Config for Efr32xg21 {
    const PCNT: &'static [PcntInstance] = &[];
    const WDOG: &'static [usize] = &[0x4A01_8000, 0x4A01_C000];
}

pub enum Efr32xg22 {}

impl Efr32Config for Efr32xg22 {
    const PCNT: &'static [PcntInstance] = &[PcntInstance {
        base: 0x4008_8000,
        counter_bits: 16,
    }];
    const WDOG: &'static [usize] = &[0x4A01_8000];
}
