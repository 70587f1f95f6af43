//! # Bounded Output Slots
//!
//! A caller-owned buffer plus its length out-parameter. Writes either fit
//! entirely or touch nothing but the length.

use std::slice;

use crate::errors::FfiError;

/// Destination for one result: a fixed-capacity buffer and its length field.
#[derive(Debug)]
pub struct OutputSlot<'a> {
    buf: &'a mut [u8],
    len: &'a mut u32,
}

impl<'a> OutputSlot<'a> {
    /// Slot over safe Rust storage.
    pub fn new(buf: &'a mut [u8], len: &'a mut u32) -> Self {
        Self { buf, len }
    }

    /// Build a slot from raw parts.
    ///
    /// `ptr` may be null only when `capacity` is 0; `len` must never be null.
    ///
    /// # Safety
    ///
    /// When non-null, `ptr` must be valid for writes of `capacity` bytes and
    /// `len` must be valid for a `u32` write, both for `'a`, and neither may
    /// alias any other live reference.
    pub unsafe fn from_raw(
        ptr: *mut u8,
        capacity: u32,
        len: *mut u32,
        name: &'static str,
    ) -> Result<Self, FfiError> {
        let Some(len) = len.as_mut() else {
            return Err(FfiError::NullPointer(name));
        };

        let buf: &'a mut [u8] = if capacity == 0 {
            &mut []
        } else if ptr.is_null() {
            return Err(FfiError::NullPointer(name));
        } else {
            slice::from_raw_parts_mut(ptr, capacity as usize)
        };

        Ok(Self { buf, len })
    }

    /// Declared capacity.
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.buf.len()
    }

    /// Copy `bytes` in and record their length.
    ///
    /// On overflow the length field is set to the required size and the
    /// buffer is left untouched.
    pub fn write(&mut self, bytes: &[u8]) -> Result<(), FfiError> {
        let required =
            u32::try_from(bytes.len()).map_err(|_| FfiError::LengthOverflow(bytes.len()))?;
        *self.len = required;

        if bytes.len() > self.buf.len() {
            return Err(FfiError::Overflow {
                required: bytes.len(),
                capacity: self.buf.len(),
            });
        }

        self.buf[..bytes.len()].copy_from_slice(bytes);
        Ok(())
    }

    /// Record an empty result without touching the buffer.
    pub fn clear(&mut self) {
        *self.len = 0;
    }
}
