//! # C-ABI Exports
//!
//! `run_precompile` runs against a process-wide dispatcher built on first
//! use from the environment (`PRECOMPILE_SHIM_GAS_BUDGET`,
//! `PRECOMPILE_SHIM_FORK`). This crate never installs a tracing subscriber.

use std::ffi::c_char;
use std::panic::{self, AssertUnwindSafe};
use std::slice;
use std::sync::OnceLock;

use shim_core::prelude::*;
use tracing::{debug, warn};

use crate::buffer::OutputSlot;
use crate::errors::FfiError;
use crate::status;

static DISPATCHER: OnceLock<Dispatcher<RevmRegistry>> = OnceLock::new();

const VERSION_CSTR: &str = concat!(env!("CARGO_PKG_VERSION"), "\0");

/// The shared dispatcher, built on first call.
pub fn dispatcher() -> &'static Dispatcher<RevmRegistry> {
    DISPATCHER.get_or_init(|| {
        let mut config = ShimConfig::default();
        config.apply_env();
        if let Err(e) = config.validate() {
            warn!("Ignoring environment configuration: {}", e);
            config = ShimConfig::default();
        }
        debug!("Foreign-call dispatcher: fork {}, gas budget {}", config.fork, config.gas_budget);
        Dispatcher::from_config(&config)
    })
}

/// Dispatch one call and copy the result into the caller's slots.
///
/// On success the output slot holds the result and `error` is cleared. On
/// failure `output` is cleared and the message goes to `error`; an empty
/// message leaves the error buffer untouched with a zero length.
pub fn run_precompile_with<D: PrecompileDispatch>(
    dispatcher: &D,
    address: u8,
    input: &[u8],
    output: &mut OutputSlot<'_>,
    error: &mut OutputSlot<'_>,
) -> i32 {
    match dispatcher.dispatch(address, input) {
        Ok(out) => match output.write(&out.output) {
            Ok(()) => {
                error.clear();
                status::OK
            }
            Err(e) => {
                debug!("0x{:02x}: {}", address, e);
                error.clear();
                e.status_code()
            }
        },
        Err(failure) => {
            output.clear();
            let message = failure.to_string();
            if message.is_empty() {
                error.clear();
                return status::FAILED;
            }
            match error.write(message.as_bytes()) {
                Ok(()) => status::FAILED,
                Err(e) => {
                    debug!("0x{:02x}: error message: {}", address, e);
                    e.status_code()
                }
            }
        }
    }
}

unsafe fn input_slice<'a>(input: *const u8, input_len: u32) -> Result<&'a [u8], FfiError> {
    if input_len == 0 {
        Ok(&[])
    } else if input.is_null() {
        Err(FfiError::NullPointer("input"))
    } else {
        Ok(slice::from_raw_parts(input, input_len as usize))
    }
}

/// Run the precompile at `address` on `input`.
///
/// Returns `0` on success, `1` on precompile failure (message in `error`),
/// `2` when a result does not fit its buffer (the matching `*_len` holds the
/// required size and nothing is copied), `3` on a null pointer and `4` if
/// the call panicked.
///
/// # Safety
///
/// - `input` must be valid for reads of `input_len` bytes; it may be null
///   only when `input_len` is 0.
/// - `output` and `error` must be valid for writes of `output_cap` and
///   `error_cap` bytes; each may be null only when its capacity is 0.
/// - `output_len` and `error_len` must be valid, non-null `u32` pointers.
/// - None of the regions may overlap.
#[no_mangle]
#[allow(clippy::too_many_arguments)]
pub unsafe extern "C" fn run_precompile(
    address: u8,
    input: *const u8,
    input_len: u32,
    output: *mut u8,
    output_cap: u32,
    output_len: *mut u32,
    error: *mut u8,
    error_cap: u32,
    error_len: *mut u32,
) -> i32 {
    let slots = input_slice(input, input_len).and_then(|input| {
        let output = OutputSlot::from_raw(output, output_cap, output_len, "output")?;
        let error = OutputSlot::from_raw(error, error_cap, error_len, "error")?;
        Ok((input, output, error))
    });

    let (input, mut output, mut error) = match slots {
        Ok(slots) => slots,
        Err(e) => {
            debug!("Rejected call to 0x{:02x}: {}", address, e);
            return e.status_code();
        }
    };

    panic::catch_unwind(AssertUnwindSafe(|| {
        run_precompile_with(dispatcher(), address, input, &mut output, &mut error)
    }))
    .unwrap_or(status::PANICKED)
}

/// Library version as a static NUL-terminated string.
#[no_mangle]
pub extern "C" fn shim_version() -> *const c_char {
    VERSION_CSTR.as_ptr().cast()
}
