//! # Shim FFI - Foreign-Call Precompile Adapter
//!
//! Exposes the precompile dispatcher through a C ABI. Callers own every
//! buffer and declare its capacity; nothing is written past it.
//!
//! ```text
//! int32_t run_precompile(uint8_t address,
//!                        const uint8_t *input, uint32_t input_len,
//!                        uint8_t *output, uint32_t output_cap, uint32_t *output_len,
//!                        uint8_t *error,  uint32_t error_cap,  uint32_t *error_len);
//! const char *shim_version(void);
//! ```
//!
//! Rust callers can use [`call_precompile`] instead of the raw symbol.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod buffer;
pub mod errors;
pub mod exports;

pub use buffer::OutputSlot;
pub use errors::FfiError;
pub use exports::{dispatcher, run_precompile, run_precompile_with, shim_version};

/// Reference capacity of the result buffer.
pub const MAX_OUTPUT_LEN: usize = 4096;

/// Reference capacity of the error buffer.
pub const MAX_ERROR_LEN: usize = 256;

/// Return codes of [`run_precompile`].
pub mod status {
    /// Output written.
    pub const OK: i32 = 0;
    /// Unknown address or execution failure; message in the error buffer.
    pub const FAILED: i32 = 1;
    /// A result did not fit; its length field holds the required size.
    pub const OVERFLOW: i32 = 2;
    /// A required pointer was null.
    pub const INVALID_ARGUMENT: i32 = 3;
    /// The call panicked.
    pub const PANICKED: i32 = 4;
}

/// Call the exported symbol with reference-capacity buffers.
pub fn call_precompile(address: u8, input: &[u8]) -> Result<Vec<u8>, String> {
    let input_len = u32::try_from(input.len())
        .map_err(|_| FfiError::LengthOverflow(input.len()).to_string())?;

    let mut output = vec![0u8; MAX_OUTPUT_LEN];
    let mut error = vec![0u8; MAX_ERROR_LEN];
    let mut output_len = 0u32;
    let mut error_len = 0u32;

    // SAFETY: every pointer comes from a live local with the declared size.
    let code = unsafe {
        run_precompile(
            address,
            input.as_ptr(),
            input_len,
            output.as_mut_ptr(),
            MAX_OUTPUT_LEN as u32,
            &mut output_len,
            error.as_mut_ptr(),
            MAX_ERROR_LEN as u32,
            &mut error_len,
        )
    };

    match code {
        status::OK => {
            output.truncate(output_len as usize);
            Ok(output)
        }
        status::FAILED if error_len == 0 => {
            Err("precompile failed with empty error description".to_string())
        }
        status::FAILED => {
            error.truncate(error_len as usize);
            Err(String::from_utf8_lossy(&error).into_owned())
        }
        status::OVERFLOW => Err(format!(
            "result too large for reference buffers (output {output_len}, error {error_len})"
        )),
        status::INVALID_ARGUMENT => Err("invalid argument".to_string()),
        other => Err(format!("precompile call aborted with status {other}")),
    }
}
