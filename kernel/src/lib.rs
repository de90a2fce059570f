// Licensed under the Apache License, Version 2.0 or the MIT License.
// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright Tock Contributors 2026.

//! Core of the Silicon Labs peripheral HAL.
//!
//! The kernel crate holds the code that every chip and capsule crate shares:
//! the Hardware Interface Layer (HIL) definitions, the error type, debug
//! output, and the utilities for register access and clock-domain
//! synchronization.
//!
//! Most `unsafe` code is in this crate.

#![no_std]

#[cfg(test)]
extern crate std;

mod config;
pub mod debug;
pub mod errorcode;
pub mod hil;
pub mod utilities;

pub use crate::errorcode::ErrorCode;
