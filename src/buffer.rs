use crate::error::Error;

use core::str;

/// The shortest form of any finite f64 fits in 24 bytes
/// ("2.2250738585072014E-308" is 23; the sign belongs to the caller).
const SHORTEST_MAX_LEN: usize = 24;

/// Bounds-checked byte sink over a caller-provided buffer. Every write path
/// of the precision engines goes through this, so a too-small buffer
/// surfaces as an error instead of a slice panic.
pub(crate) struct Sink<'a> {
    buf: &'a mut [u8],
    len: usize,
}

impl<'a> Sink<'a> {
    pub(crate) fn new(buf: &'a mut [u8]) -> Sink<'a> {
        Sink { buf, len: 0 }
    }

    pub(crate) fn len(&self) -> usize {
        self.len
    }

    /// Reserves the next `n` bytes and returns them for writing.
    pub(crate) fn grab(&mut self, n: usize) -> Result<&mut [u8], Error> {
        let start = self.len;
        let end = match start.checked_add(n) {
            Some(end) if end <= self.buf.len() => end,
            _ => return Err(Error::buffer_too_small()),
        };
        self.len = end;
        Ok(&mut self.buf[start..end])
    }

    pub(crate) fn push(&mut self, b: u8) -> Result<(), Error> {
        let out = self.grab(1)?;
        out[0] = b;
        Ok(())
    }

    pub(crate) fn fill(&mut self, b: u8, n: usize) -> Result<(), Error> {
        for out in self.grab(n)?.iter_mut() {
            *out = b;
        }
        Ok(())
    }

    /// The bytes written so far, for the backward rounding walk.
    pub(crate) fn written_mut(&mut self) -> &mut [u8] {
        &mut self.buf[..self.len]
    }
}

/// Safe API for formatting an f64 into its shortest round-trip form.
///
/// ## Example
///
/// ```
/// let mut buffer = ryu_charconv::Buffer::new();
/// let printed = buffer.format(1.234);
/// assert_eq!(printed, "1.234E0");
/// ```
#[derive(Copy, Clone)]
pub struct Buffer {
    bytes: [u8; SHORTEST_MAX_LEN],
}

impl Buffer {
    /// This is a cheap operation; you don't need to worry about reusing
    /// buffers for efficiency.
    #[inline]
    pub fn new() -> Buffer {
        Buffer {
            bytes: [0u8; SHORTEST_MAX_LEN],
        }
    }

    /// Print the shortest round-trip form of a finite non-negative float
    /// into this buffer and return a reference to its string representation.
    ///
    /// The value must be finite and non-negative, like every input to this
    /// crate; screening NaN, infinities, and the sign is the caller's job.
    #[cfg_attr(feature = "no-panic", no_panic::no_panic)]
    #[inline]
    pub fn format(&mut self, d: f64) -> &str {
        let len = match crate::d2s_to_chars(d, &mut self.bytes) {
            Ok(len) => len,
            // The inner array is sized for the worst case.
            Err(_) => 0,
        };
        unsafe { str::from_utf8_unchecked(&self.bytes[..len]) }
    }
}

impl Default for Buffer {
    #[inline]
    fn default() -> Buffer {
        Buffer::new()
    }
}
