// Licensed under the Apache License, Version 2.0 or the MIT License.
// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright Tock Contributors 2026.

//! Peripheral implementations for EFM32 Series 1 MCUs (EFM32PG1, EFM32GG11).

#![no_std]

#[cfg(test)]
extern crate std;

pub mod chip_config;
pub mod cmu;
pub mod pcnt;
pub mod wdog;
