// Licensed under the Apache License, Version 2.0 or the MIT License.
// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright Tock Contributors 2026.

//! Support for debug output and assertion reporting.
//!
//! Usage
//! -----
//!
//! ```rust,ignore
//! debug!("Yes the code gets here with value {}", i);
//! debug_verbose!("got here"); // includes file and line number
//! trace_sync!("pcnt{}: wait {:?}", instance, point); // only with `trace_sync`
//! ```
//!
//! ```text
//! Yes the code gets here with value 42
//! HAL_DEBUG: chips/efr32s2/src/pcnt.rs:412: got here
//! ```
//!
//! Output goes to a sink function installed by the board with
//! [`set_debug_writer`], typically a blocking UART or semihosting write.
//! Until a sink is installed, debug output is dropped.
//!
//! Assertions
//! ----------
//!
//! Parameter checks at driver entry points use [`hal_assert!`]. A failed
//! check is reported here (location through the debug output, then the
//! board's assertion handler if one is installed) and the caller gets the
//! typed [`ErrorCode`] back. Boards that want the classic halt-on-assert
//! behavior install a handler that loops or breaks into the debugger.

use core::fmt;
use core::mem;
use core::ptr;
use core::sync::atomic::{AtomicPtr, Ordering};

use crate::config::CONFIG;
use crate::ErrorCode;

/// Function receiving every formatted debug line.
pub type DebugWriter = fn(fmt::Arguments);

/// Function invoked with the file and line of a failed [`hal_assert!`].
pub type AssertHandler = fn(&'static str, u32);

static DEBUG_WRITER: AtomicPtr<()> = AtomicPtr::new(ptr::null_mut());
static ASSERT_HANDLER: AtomicPtr<()> = AtomicPtr::new(ptr::null_mut());

/// Install the sink for debug output.
pub fn set_debug_writer(writer: DebugWriter) {
    DEBUG_WRITER.store(writer as *mut (), Ordering::Release);
}

/// Install the handler called on failed parameter assertions.
pub fn set_assert_handler(handler: AssertHandler) {
    ASSERT_HANDLER.store(handler as *mut (), Ordering::Release);
}

fn debug_writer() -> Option<DebugWriter> {
    let writer = DEBUG_WRITER.load(Ordering::Acquire);
    if writer.is_null() {
        None
    } else {
        // Only `set_debug_writer` stores into `DEBUG_WRITER`, always from a
        // `DebugWriter`.
        Some(unsafe { mem::transmute::<*mut (), DebugWriter>(writer) })
    }
}

fn assert_handler() -> Option<AssertHandler> {
    let handler = ASSERT_HANDLER.load(Ordering::Acquire);
    if handler.is_null() {
        None
    } else {
        Some(unsafe { mem::transmute::<*mut (), AssertHandler>(handler) })
    }
}

/// Write a line to the debug output. Use the [`debug!`] macro.
pub fn debug_println(args: fmt::Arguments) {
    if let Some(writer) = debug_writer() {
        writer(args);
    }
}

/// Write a line prefixed with its source location. Use [`debug_verbose!`].
pub fn debug_verbose_println(args: fmt::Arguments, file_line: &(&'static str, u32)) {
    if let Some(writer) = debug_writer() {
        let (file, line) = *file_line;
        writer(format_args!("HAL_DEBUG: {}:{}: {}", file, line, args));
    }
}

/// Whether sync waits and mode transitions should be traced.
#[inline]
pub fn sync_tracing() -> bool {
    CONFIG.trace_sync
}

/// Report a failed assertion and hand back the error to return.
///
/// Called by [`hal_assert!`]; not usually called directly.
pub fn assert_failed(code: ErrorCode, file_line: &(&'static str, u32)) -> ErrorCode {
    if CONFIG.debug_asserts {
        debug_verbose_println(format_args!("assertion failed: {}", code), file_line);
        if let Some(handler) = assert_handler() {
            let (file, line) = *file_line;
            handler(file, line);
        }
    }
    code
}

/// In-kernel `println()` debugging.
#[macro_export]
macro_rules! debug {
    () => ({
        // Allow an empty debug!() to print the location when hit
        $crate::debug!("")
    });
    ($msg:expr $(,)?) => ({
        $crate::debug::debug_println(format_args!($msg))
    });
    ($fmt:expr, $($arg:tt)+) => ({
        $crate::debug::debug_println(format_args!($fmt, $($arg)+))
    });
}

/// In-kernel `println()` debugging with filename and line numbers.
#[macro_export]
macro_rules! debug_verbose {
    () => ({
        $crate::debug_verbose!("")
    });
    ($msg:expr $(,)?) => ({
        $crate::debug::debug_verbose_println(format_args!($msg), {
            static _FILE_LINE: (&'static str, u32) = (file!(), line!());
            &_FILE_LINE
        })
    });
    ($fmt:expr, $($arg:tt)+) => ({
        $crate::debug::debug_verbose_println(format_args!($fmt, $($arg)+), {
            static _FILE_LINE: (&'static str, u32) = (file!(), line!());
            &_FILE_LINE
        })
    });
}

/// Debug output for synchronization and mode transitions, compiled in only
/// when the `trace_sync` configuration is set.
#[macro_export]
macro_rules! trace_sync {
    ($($arg:tt)+) => ({
        if $crate::debug::sync_tracing() {
            $crate::debug!($($arg)+);
        }
    });
}

/// Check a driver entry condition.
///
/// Evaluates to `Ok(())` when the condition holds. Otherwise the failure is
/// reported through [`assert_failed`] and the expression evaluates to
/// `Err(code)`, so callers propagate it with `?` before touching any
/// register.
///
/// ```rust,ignore
/// hal_assert!(top <= self.max_count(), ErrorCode::INVAL)?;
/// ```
#[macro_export]
macro_rules! hal_assert {
    ($cond:expr, $code:expr $(,)?) => {
        if $cond {
            Ok(())
        } else {
            Err($crate::debug::assert_failed($code, {
                static _FILE_LINE: (&'static str, u32) = (file!(), line!());
                &_FILE_LINE
            }))
        }
    };
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::string::{String, ToString};
    use std::sync::Mutex;
    use std::vec::Vec;

    static LINES: Mutex<Vec<String>> = Mutex::new(Vec::new());
    static ASSERTS: Mutex<Vec<(&'static str, u32)>> = Mutex::new(Vec::new());

    fn capture(args: fmt::Arguments) {
        LINES.lock().unwrap().push(args.to_string());
    }

    fn record_assert(file: &'static str, line: u32) {
        ASSERTS.lock().unwrap().push((file, line));
    }

    fn checked(value: u32) -> Result<u32, ErrorCode> {
        hal_assert!(value < 16, ErrorCode::INVAL)?;
        Ok(value * 2)
    }

    #[test]
    fn assertions_report_location_and_return_code() {
        set_debug_writer(capture);
        set_assert_handler(record_assert);

        assert_eq!(checked(3), Ok(6));
        assert_eq!(checked(16), Err(ErrorCode::INVAL));

        let asserts = ASSERTS.lock().unwrap();
        assert!(asserts.iter().any(|(file, _)| file.ends_with("debug.rs")));
        let lines = LINES.lock().unwrap();
        assert!(lines
            .iter()
            .any(|l| l.starts_with("HAL_DEBUG:") && l.ends_with("invalid configuration")));
    }

    #[test]
    fn debug_macro_formats_arguments() {
        set_debug_writer(capture);
        debug!("pcnt{} top={:#x}", 0, 0xff);
        assert!(LINES
            .lock()
            .unwrap()
            .iter()
            .any(|l| l == "pcnt0 top=0xff"));
    }
}
