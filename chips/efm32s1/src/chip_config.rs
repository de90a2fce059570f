// Licensed under the Apache License, Version 2.0 or the MIT License.
// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright Tock Contributors 2026.

//! Chip specific configuration.
//!
//! The Series 1 parts share their peripheral IP but differ in how many
//! instances they carry, where those live, and how wide each counter is. A
//! board picks its part by naming one of the types below when it creates
//! drivers, e.g. `Pcnt::new::<Efm32gg11>(1)`.

/// One pulse counter instance.
#[derive(Clone, Copy, Debug)]
pub struct PcntInstance {
    pub base: usize,
    /// Width of CNT and TOP.
    pub counter_bits: u8,
}

/// Series 1 configuration based on the target part.
pub trait Efm32Config {
    /// Pulse counter instances, indexed by instance number.
    const PCNT: &'static [PcntInstance];

    /// Watchdog base addresses, indexed by instance number.
    const WDOG: &'static [usize];

    const CMU_BASE: usize;

    /// Frequency of the ULFRCO, the watchdog clock, in Hz.
    const ULFRCO_HZ: u32 = 1_000;
}

pub enum Efm32pg1 {}

impl Efm32Config for Efm32pg1 {
    const PCNT: &'static [PcntInstance] = &[PcntInstance {
        base: 0x4000_E400,
        counter_bits: 16,
    }];
    const WDOG: &'static [usize] = &[0x4005_2000];
    const CMU_BASE: usize = 0x400E_4000;
}

pub enum Efm32gg11 {}

impl Efm32Config for Efm32gg11 {
    const PCNT: &'static [PcntInstance] = &[
        PcntInstance {
            base: 0x4008_6000,
            counter_bits: 16,
        },
        PcntInstance {
            base: 0x4008_6400,
            counter_bits: 8,
        },
        PcntInstance {
            base: 0x4008_6800,
            counter_bits: 8,
        },
    ];
    const WDOG: &'static [usize] = &[0x4005_2000, 0x4005_2400];
    const CMU_BASE: usize = 0x400E_4000;
}
