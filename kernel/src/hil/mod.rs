// Licensed under the Apache License, Version 2.0 or the MIT License.
// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright Tock Contributors 2026.

//! Public traits for interfaces between chips and capsules.

pub mod clock;
pub mod pulse_counter;
pub mod sync;
pub mod watchdog;
