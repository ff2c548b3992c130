//! Conversion of finite non-negative `f64` values into decimal character
//! sequences, based on the Ryū algorithm: the shortest form that parses back
//! to the same value, a format-selected shortest form, and fixed or
//! exponential forms with a caller-chosen precision.
//!
//! The caller owns everything around the digits: sign emission, NaN and
//! infinity rendering, and the buffer itself. Passing a non-finite or
//! negative value is a contract violation that is only checked in debug
//! builds. All conversions are pure computations over immutable tables; no
//! allocation, no locks, no global state.
//!
//! ## Example
//!
//! ```
//! let mut buf = [0u8; 24];
//! let n = ryu_charconv::d2s_to_chars(1.234, &mut buf).unwrap();
//! assert_eq!(&buf[..n], b"1.234E0");
//! ```

#![cfg_attr(not(feature = "std"), no_std)]

mod buffer;
mod common;
mod d2fixed;
mod d2fixed_full_table;
mod d2s;
mod d2s_full_table;
mod d2s_intrinsics;
mod digit_table;
mod error;
mod pretty;

pub use crate::buffer::Buffer;
pub use crate::error::{Error, ErrorKind};
pub use crate::pretty::Format;

use crate::buffer::Sink;
use crate::common::{DOUBLE_BIAS, DOUBLE_EXPONENT_BITS, DOUBLE_MANTISSA_BITS};
use crate::d2s::{d2d, d2d_small_int, FloatingDecimal64};
use crate::d2s_intrinsics::div10;

#[cfg(feature = "no-panic")]
use no_panic::no_panic;

fn copy_str(buf: &mut [u8], s: &[u8]) -> Result<usize, Error> {
    match buf.get_mut(..s.len()) {
        Some(out) => {
            out.copy_from_slice(s);
            Ok(s.len())
        }
        None => Err(Error::buffer_too_small()),
    }
}

fn decode_raw(bits: u64) -> (u64, u32) {
    (
        bits & ((1u64 << DOUBLE_MANTISSA_BITS) - 1),
        ((bits >> DOUBLE_MANTISSA_BITS) as u32) & ((1u32 << DOUBLE_EXPONENT_BITS) - 1),
    )
}

// Shortest decimal form of a non-zero double, through the small-integer
// path when it applies.
fn shortest(ieee_mantissa: u64, ieee_exponent: u32) -> FloatingDecimal64 {
    if let Some(mut v) = d2d_small_int(ieee_mantissa, ieee_exponent) {
        // For small integers in [1, 2^53), the mantissa may carry trailing
        // decimal zeros. Scientific notation wants them in the exponent, and
        // the fixed layout re-creates them from it.
        loop {
            let q = div10(v.mantissa);
            let r = (v.mantissa as u32).wrapping_sub(10u32.wrapping_mul(q as u32));
            if r != 0 {
                return v;
            }
            v.mantissa = q;
            v.exponent += 1;
        }
    }
    d2d(ieee_mantissa, ieee_exponent)
}

/// Writes the shortest decimal representation of `d` that parses back to
/// exactly `d`, as mantissa digits, an uppercase `'E'`, and a decimal
/// exponent with no `'+'` sign. Zero prints as `"0E0"`.
///
/// Returns the number of bytes written, or
/// [`ErrorKind::BufferTooSmall`](crate::ErrorKind) if `buf` cannot hold the
/// output. 24 bytes always suffice.
///
/// ## Example
///
/// ```
/// let mut buf = [0u8; 24];
/// let n = ryu_charconv::d2s_to_chars(1.0e23, &mut buf).unwrap();
/// assert_eq!(&buf[..n], b"1E23");
/// ```
#[cfg_attr(feature = "no-panic", no_panic)]
pub fn d2s_to_chars(d: f64, buf: &mut [u8]) -> Result<usize, Error> {
    debug_assert!(d.is_finite());
    debug_assert!(d.is_sign_positive());
    let bits = d.to_bits();

    // Case distinction; exit early for the easy cases.
    if bits == 0 {
        return copy_str(buf, b"0E0");
    }

    let (ieee_mantissa, ieee_exponent) = decode_raw(bits);
    let v = shortest(ieee_mantissa, ieee_exponent);
    pretty::to_chars_short(&v, buf)
}

/// Writes the shortest decimal representation of `d` under the layout rules
/// of the requested [`Format`]. Explicit scientific output uses a lowercase
/// `'e'` with a signed exponent; fixed output carries no exponent suffix;
/// [`Format::Default`] and [`Format::General`] pick between the two.
///
/// ## Example
///
/// ```
/// use ryu_charconv::Format;
///
/// let mut buf = [0u8; 32];
/// let n = ryu_charconv::d2s_format_to_chars(0.3, &mut buf, Format::Fixed).unwrap();
/// assert_eq!(&buf[..n], b"0.3");
/// let n = ryu_charconv::d2s_format_to_chars(1234567.0, &mut buf, Format::General).unwrap();
/// assert_eq!(&buf[..n], b"1.234567e+06");
/// ```
#[cfg_attr(feature = "no-panic", no_panic)]
pub fn d2s_format_to_chars(d: f64, buf: &mut [u8], format: Format) -> Result<usize, Error> {
    debug_assert!(d.is_finite());
    debug_assert!(d.is_sign_positive());
    let bits = d.to_bits();

    if bits == 0 {
        return match format {
            Format::Scientific => copy_str(buf, b"0e+00"),
            _ => copy_str(buf, b"0"),
        };
    }

    let (ieee_mantissa, ieee_exponent) = decode_raw(bits);
    if format == Format::Fixed {
        let e2 = ieee_exponent as i32 - DOUBLE_BIAS - DOUBLE_MANTISSA_BITS as i32;
        if e2 > 0 {
            // A positive binary exponent means an integer of 2^53 or more;
            // fixed notation shows every digit of its exact expansion.
            let mut sink = Sink::new(buf);
            d2fixed::d2fixed_buffered(d, 0, &mut sink)?;
            return Ok(sink.len());
        }
    }
    let v = shortest(ieee_mantissa, ieee_exponent);
    pretty::to_chars_with_format(d, &v, format, buf)
}

/// Writes `d` in fixed notation with exactly `precision` fractional digits,
/// rounded half-to-even against the exact binary value.
///
/// ## Example
///
/// ```
/// let mut buf = [0u8; 64];
/// let n = ryu_charconv::d2fixed_to_chars(2.5, 0, &mut buf).unwrap();
/// assert_eq!(&buf[..n], b"2");
/// let n = ryu_charconv::d2fixed_to_chars(1.5, 2, &mut buf).unwrap();
/// assert_eq!(&buf[..n], b"1.50");
/// ```
#[cfg_attr(feature = "no-panic", no_panic)]
pub fn d2fixed_to_chars(d: f64, precision: u32, buf: &mut [u8]) -> Result<usize, Error> {
    debug_assert!(d.is_finite());
    debug_assert!(d.is_sign_positive());
    let mut sink = Sink::new(buf);
    d2fixed::d2fixed_buffered(d, precision, &mut sink)?;
    Ok(sink.len())
}

/// Writes `d` in exponential notation with exactly `precision` fractional
/// digits, rounded half-to-even against the exact binary value, followed by
/// a lowercase `'e'` and a signed exponent.
///
/// ## Example
///
/// ```
/// let mut buf = [0u8; 64];
/// let n = ryu_charconv::d2exp_to_chars(1.0, 2, &mut buf).unwrap();
/// assert_eq!(&buf[..n], b"1.00e+00");
/// ```
#[cfg_attr(feature = "no-panic", no_panic)]
pub fn d2exp_to_chars(d: f64, precision: u32, buf: &mut [u8]) -> Result<usize, Error> {
    debug_assert!(d.is_finite());
    debug_assert!(d.is_sign_positive());
    let mut sink = Sink::new(buf);
    d2fixed::d2exp_buffered(d, precision, &mut sink)?;
    Ok(sink.len())
}
