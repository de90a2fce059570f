// Licensed under the Apache License, Version 2.0 or the MIT License.
// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright Tock Contributors 2026.

//! Utility types shared by chip and capsule crates.

pub mod math;
pub mod sync_gate;

mod static_ref;
pub use self::static_ref::StaticRef;

/// Re-export of the `tock-cells` crate.
///
/// Chip drivers keep their client references in an `OptionalCell`:
///
///     use kernel::utilities::cells::OptionalCell;
pub mod cells {
    pub use tock_cells::optional_cell::OptionalCell;
}

/// The Tock Register Interface.
///
/// This is a re-export of the `tock-registers` crate provided for
/// convenience.
///
/// The Tock Register Interface provides typed register blocks and bitfields
/// for memory mapped peripherals. Field values (`FieldValue`) combine with `+`
/// and are applied with `write`/`modify`, so drivers never spell out raw
/// masks and shifts.
pub mod registers {
    pub use tock_registers::fields::{Field, FieldValue};
    pub use tock_registers::interfaces;
    pub use tock_registers::registers::InMemoryRegister;
    pub use tock_registers::registers::{ReadOnly, ReadWrite, WriteOnly};
    pub use tock_registers::{register_bitfields, register_structs};
    pub use tock_registers::{LocalRegisterCopy, RegisterLongName};
}
