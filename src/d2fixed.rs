use crate::buffer::Sink;
use crate::common::{decimal_length9, log10_pow2, DOUBLE_BIAS, DOUBLE_EXPONENT_BITS, DOUBLE_MANTISSA_BITS};
use crate::d2fixed_full_table::{
    ADDITIONAL_BITS_2, MIN_BLOCK_2, POW10_OFFSET, POW10_OFFSET_2, POW10_SPLIT, POW10_SPLIT_2,
};
use crate::d2s_intrinsics::{multiple_of_power_of_2, multiple_of_power_of_5};
use crate::digit_table::DIGIT_TABLE;
use crate::error::Error;

const POW10_ADDITIONAL_BITS: u32 = 120;

#[cfg_attr(feature = "no-panic", inline)]
fn umul256_hi(a: u128, b_hi: u64, b_lo: u64) -> u128 {
    let a_lo = a as u64;
    let a_hi = (a >> 64) as u64;

    let b00 = a_lo as u128 * b_lo as u128;
    let b01 = a_lo as u128 * b_hi as u128;
    let b10 = a_hi as u128 * b_lo as u128;
    let b11 = a_hi as u128 * b_hi as u128;

    let b00_hi = (b00 >> 64) as u64;

    let mid1 = b10 + b00_hi as u128;
    let mid1_lo = mid1 as u64;
    let mid1_hi = (mid1 >> 64) as u64;

    let mid2 = b01 + mid1_lo as u128;
    let mid2_hi = (mid2 >> 64) as u64;

    b11 + mid1_hi as u128 + mid2_hi as u128
}

#[cfg_attr(feature = "no-panic", inline)]
fn u128_mod1e9(v: u128) -> u32 {
    // After multiplying, we're going to shift right by 29, then truncate to
    // u32. This means that we need only 29 + 32 = 61 bits, so we can
    // truncate to u64 before shifting.
    let multiplied = umul256_hi(v, 0x89705F4136B4A597, 0x31680A88F8953031) as u64;
    let shifted = (multiplied >> 29) as u32;
    (v as u32).wrapping_sub(1000000000u32.wrapping_mul(shifted))
}

/// Returns floor((m * mul) / 2^j) mod 10^9, where mul is a 192-bit
/// multiplier given as three little-endian limbs and 128 <= j <= 180. The
/// product is carried to 256 bits before shifting.
#[cfg_attr(feature = "no-panic", inline)]
fn mul_shift_mod1e9(m: u64, mul: &[u64; 3], j: i32) -> u32 {
    let b0 = m as u128 * mul[0] as u128; // 0
    let b1 = m as u128 * mul[1] as u128; // 64
    let b2 = m as u128 * mul[2] as u128; // 128
    debug_assert!(j >= 128);
    debug_assert!(j <= 180);
    let mid = b1 + (b0 >> 64); // 64
    let s1 = b2 + (mid >> 64); // 128
    u128_mod1e9(s1 >> (j - 128))
}

// Convert `digits` to a sequence of decimal digits. The caller has to
// guarantee that 10^(olength-1) <= digits < 10^olength, e.g. by passing
// `olength` as decimal_length9(digits). `result` is exactly olength bytes.
#[cfg_attr(feature = "no-panic", inline)]
fn append_n_digits(olength: usize, mut digits: u32, result: &mut [u8]) {
    let mut i = 0;
    while digits >= 10_000 {
        let c = (digits % 10_000) as usize;
        digits /= 10_000;
        let c0 = (c % 100) << 1;
        let c1 = (c / 100) << 1;
        result[olength - i - 2..olength - i].copy_from_slice(&DIGIT_TABLE[c0..c0 + 2]);
        result[olength - i - 4..olength - i - 2].copy_from_slice(&DIGIT_TABLE[c1..c1 + 2]);
        i += 4;
    }
    if digits >= 100 {
        let c = ((digits % 100) << 1) as usize;
        digits /= 100;
        result[olength - i - 2..olength - i].copy_from_slice(&DIGIT_TABLE[c..c + 2]);
        i += 2;
    }
    if digits >= 10 {
        let c = (digits << 1) as usize;
        result[olength - i - 2..olength - i].copy_from_slice(&DIGIT_TABLE[c..c + 2]);
    } else {
        result[0] = b'0' + digits as u8;
    }
}

// Convert `digits` to a sequence of decimal digits with a '.' after the
// first one. `result` is exactly olength + 1 bytes.
#[cfg_attr(feature = "no-panic", inline)]
fn append_d_digits(olength: usize, mut digits: u32, result: &mut [u8]) {
    let mut i = 0;
    while digits >= 10_000 {
        let c = (digits % 10_000) as usize;
        digits /= 10_000;
        let c0 = (c % 100) << 1;
        let c1 = (c / 100) << 1;
        result[olength + 1 - i - 2..olength + 1 - i].copy_from_slice(&DIGIT_TABLE[c0..c0 + 2]);
        result[olength + 1 - i - 4..olength + 1 - i - 2].copy_from_slice(&DIGIT_TABLE[c1..c1 + 2]);
        i += 4;
    }
    if digits >= 100 {
        let c = ((digits % 100) << 1) as usize;
        digits /= 100;
        result[olength + 1 - i - 2..olength + 1 - i].copy_from_slice(&DIGIT_TABLE[c..c + 2]);
        i += 2;
    }
    if digits >= 10 {
        let c = (digits << 1) as usize;
        result[2] = DIGIT_TABLE[c + 1];
        result[1] = b'.';
        result[0] = DIGIT_TABLE[c];
    } else {
        result[1] = b'.';
        result[0] = b'0' + digits as u8;
    }
}

// Write the last `count` decimal digits of `digits`; additional digits are
// silently ignored. `result` is exactly count bytes.
#[cfg_attr(feature = "no-panic", inline)]
fn append_c_digits(count: usize, mut digits: u32, result: &mut [u8]) {
    let mut i = 0;
    while i + 1 < count {
        let c = ((digits % 100) << 1) as usize;
        digits /= 100;
        result[count - i - 2..count - i].copy_from_slice(&DIGIT_TABLE[c..c + 2]);
        i += 2;
    }
    // Generate the last digit if count is odd.
    if i < count {
        result[count - i - 1] = b'0' + (digits % 10) as u8;
    }
}

// Write the last 9 decimal digits of `digits`, left-padded with zeros.
// `result` is exactly 9 bytes.
#[cfg_attr(feature = "no-panic", inline)]
fn append_nine_digits(mut digits: u32, result: &mut [u8]) {
    if digits == 0 {
        for b in result.iter_mut() {
            *b = b'0';
        }
        return;
    }
    let mut i = 0;
    while i < 5 {
        let c = (digits % 10_000) as usize;
        digits /= 10_000;
        let c0 = (c % 100) << 1;
        let c1 = (c / 100) << 1;
        result[7 - i..9 - i].copy_from_slice(&DIGIT_TABLE[c0..c0 + 2]);
        result[5 - i..7 - i].copy_from_slice(&DIGIT_TABLE[c1..c1 + 2]);
        i += 4;
    }
    result[0] = b'0' + digits as u8;
}

#[cfg_attr(feature = "no-panic", inline)]
fn index_for_exponent(e: u32) -> u32 {
    (e + 15) / 16
}

#[cfg_attr(feature = "no-panic", inline)]
fn pow10_bits_for_index(idx: u32) -> u32 {
    16 * idx + POW10_ADDITIONAL_BITS
}

#[cfg_attr(feature = "no-panic", inline)]
fn length_for_index(idx: u32) -> u32 {
    // +1 for ceil, +16 for the mantissa, +8 to round up when dividing by 9.
    (log10_pow2(16 * idx as i32) + 1 + 16 + 8) / 9
}

fn decode(bits: u64) -> (i32, u64) {
    let ieee_mantissa = bits & ((1u64 << DOUBLE_MANTISSA_BITS) - 1);
    let ieee_exponent = ((bits >> DOUBLE_MANTISSA_BITS) as u32) & ((1u32 << DOUBLE_EXPONENT_BITS) - 1);
    if ieee_exponent == 0 {
        (1 - DOUBLE_BIAS - DOUBLE_MANTISSA_BITS as i32, ieee_mantissa)
    } else {
        (
            ieee_exponent as i32 - DOUBLE_BIAS - DOUBLE_MANTISSA_BITS as i32,
            (1u64 << DOUBLE_MANTISSA_BITS) | ieee_mantissa,
        )
    }
}

/// The fixed-precision engine: integer part, '.', `precision` fractional
/// digits, rounded half-to-even.
pub(crate) fn d2fixed_buffered(d: f64, precision: u32, sink: &mut Sink<'_>) -> Result<(), Error> {
    let bits = d.to_bits();
    let precision = precision as usize;

    // Case distinction; exit early for the easy cases.
    if bits == 0 {
        sink.push(b'0')?;
        if precision > 0 {
            sink.push(b'.')?;
            sink.fill(b'0', precision)?;
        }
        return Ok(());
    }

    let (e2, m2) = decode(bits);
    let mut nonzero = false;
    if e2 >= -52 {
        let idx = if e2 < 0 { 0 } else { index_for_exponent(e2 as u32) };
        let p10bits = pow10_bits_for_index(idx);
        let len = length_for_index(idx) as i32;
        for i in (0..len).rev() {
            let j = p10bits as i32 - e2;
            // Shifting the mantissa by 8 pushes j to 128 or above, which is
            // the range mul_shift_mod1e9 is specified for.
            let digits = mul_shift_mod1e9(
                m2 << 8,
                &POW10_SPLIT[POW10_OFFSET[idx as usize] as usize + i as usize],
                j + 8,
            );
            if nonzero {
                append_nine_digits(digits, sink.grab(9)?);
            } else if digits != 0 {
                let olength = decimal_length9(digits) as usize;
                append_n_digits(olength, digits, sink.grab(olength)?);
                nonzero = true;
            }
        }
    }
    if !nonzero {
        sink.push(b'0')?;
    }
    if precision > 0 {
        sink.push(b'.')?;
    }
    if e2 >= 0 {
        sink.fill(b'0', precision)?;
        return Ok(());
    }

    let idx = (-e2 / 16) as usize;
    let blocks = precision / 9 + 1;
    // 0 = don't round up; 1 = round up unconditionally; 2 = round up if odd.
    let mut round_up = 0u8;
    let mut i = 0usize;
    if blocks <= MIN_BLOCK_2[idx] as usize {
        // All requested digits sit above the first possibly-nonzero block.
        sink.fill(b'0', precision)?;
        i = blocks;
    } else if i < MIN_BLOCK_2[idx] as usize {
        i = MIN_BLOCK_2[idx] as usize;
        sink.fill(b'0', 9 * i)?;
    }
    while i < blocks {
        let j = ADDITIONAL_BITS_2 + (-e2 - 16 * idx as i32);
        let p = POW10_OFFSET_2[idx] as usize + i - MIN_BLOCK_2[idx] as usize;
        if p >= POW10_OFFSET_2[idx + 1] as usize {
            // The remaining digits are all 0; no rounding required.
            sink.fill(b'0', precision - 9 * i)?;
            break;
        }
        let mut digits = mul_shift_mod1e9(m2 << 8, &POW10_SPLIT_2[p], j + 8);
        if i < blocks - 1 {
            append_nine_digits(digits, sink.grab(9)?);
        } else {
            let maximum = precision - 9 * i;
            let mut last_digit = 0u32;
            for _ in 0..9 - maximum {
                last_digit = digits % 10;
                digits /= 10;
            }
            if last_digit != 5 {
                round_up = (last_digit > 5) as u8;
            } else {
                // Is m2 * 10^(precision + 1) / 2^(-e2) an integer?
                let required_twos = -e2 - precision as i32 - 1;
                let trailing_zeros = required_twos <= 0
                    || (required_twos < 60 && multiple_of_power_of_2(m2, required_twos as u32));
                round_up = if trailing_zeros { 2 } else { 1 };
            }
            if maximum > 0 {
                append_c_digits(maximum, digits, sink.grab(maximum)?);
            }
            break;
        }
        i += 1;
    }
    if round_up != 0 {
        let mut append_zero = false;
        {
            let result = sink.written_mut();
            let mut round_index = result.len() as isize;
            let mut dot_index = 0usize; // '.' can't be located at index 0
            loop {
                round_index -= 1;
                if round_index == -1 {
                    // The carry walked past the leading digit; the decimal
                    // point moves one position to the right.
                    result[0] = b'1';
                    if dot_index > 0 {
                        result[dot_index] = b'0';
                        result[dot_index + 1] = b'.';
                    }
                    append_zero = true;
                    break;
                }
                let c = result[round_index as usize];
                if c == b'.' {
                    dot_index = round_index as usize;
                } else if c == b'9' {
                    result[round_index as usize] = b'0';
                    round_up = 1;
                } else {
                    if round_up == 2 && c % 2 == 0 {
                        break;
                    }
                    result[round_index as usize] = c + 1;
                    break;
                }
            }
        }
        if append_zero {
            sink.push(b'0')?;
        }
    }
    Ok(())
}

/// The exponential-precision engine: one leading digit, '.', `precision`
/// fractional digits, 'e', a signed two- or three-digit exponent.
pub(crate) fn d2exp_buffered(d: f64, precision: u32, sink: &mut Sink<'_>) -> Result<(), Error> {
    let bits = d.to_bits();
    let mut precision = precision as usize;

    // Case distinction; exit early for the easy cases.
    if bits == 0 {
        sink.push(b'0')?;
        if precision > 0 {
            sink.push(b'.')?;
            sink.fill(b'0', precision)?;
        }
        sink.grab(4)?.copy_from_slice(b"e+00");
        return Ok(());
    }

    let (e2, m2) = decode(bits);
    let print_decimal_point = precision > 0;
    precision += 1;
    let mut digits = 0u32;
    let mut printed_digits = 0usize;
    let mut available_digits = 0usize;
    let mut exp = 0i32;
    if e2 >= -52 {
        let idx = if e2 < 0 { 0 } else { index_for_exponent(e2 as u32) };
        let p10bits = pow10_bits_for_index(idx);
        let len = length_for_index(idx) as i32;
        for i in (0..len).rev() {
            let j = p10bits as i32 - e2;
            digits = mul_shift_mod1e9(
                m2 << 8,
                &POW10_SPLIT[POW10_OFFSET[idx as usize] as usize + i as usize],
                j + 8,
            );
            if printed_digits != 0 {
                if printed_digits + 9 > precision {
                    available_digits = 9;
                    break;
                }
                append_nine_digits(digits, sink.grab(9)?);
                printed_digits += 9;
            } else if digits != 0 {
                available_digits = decimal_length9(digits) as usize;
                exp = i * 9 + available_digits as i32 - 1;
                if available_digits > precision {
                    break;
                }
                if print_decimal_point {
                    append_d_digits(available_digits, digits, sink.grab(available_digits + 1)?);
                } else {
                    sink.push(b'0' + digits as u8)?;
                }
                printed_digits = available_digits;
                available_digits = 0;
            }
        }
    }

    if e2 < 0 && available_digits == 0 {
        let idx = (-e2 / 16) as usize;
        let mut i = MIN_BLOCK_2[idx] as i32;
        while i < 200 {
            let j = ADDITIONAL_BITS_2 + (-e2 - 16 * idx as i32);
            let p = POW10_OFFSET_2[idx] as usize + i as usize - MIN_BLOCK_2[idx] as usize;
            digits = if p >= POW10_OFFSET_2[idx + 1] as usize {
                0
            } else {
                mul_shift_mod1e9(m2 << 8, &POW10_SPLIT_2[p], j + 8)
            };
            if printed_digits != 0 {
                if printed_digits + 9 > precision {
                    available_digits = 9;
                    break;
                }
                append_nine_digits(digits, sink.grab(9)?);
                printed_digits += 9;
            } else if digits != 0 {
                available_digits = decimal_length9(digits) as usize;
                exp = -(i + 1) * 9 + available_digits as i32 - 1;
                if available_digits > precision {
                    break;
                }
                if print_decimal_point {
                    append_d_digits(available_digits, digits, sink.grab(available_digits + 1)?);
                } else {
                    sink.push(b'0' + digits as u8)?;
                }
                printed_digits = available_digits;
                available_digits = 0;
            }
            i += 1;
        }
    }

    let maximum = precision - printed_digits;
    if available_digits == 0 {
        digits = 0;
    }
    let mut last_digit = 0u32;
    if available_digits > maximum {
        for _ in 0..available_digits - maximum {
            last_digit = digits % 10;
            digits /= 10;
        }
    }
    // 0 = don't round up; 1 = round up unconditionally; 2 = round up if odd.
    let mut round_up = if last_digit != 5 {
        (last_digit > 5) as u8
    } else {
        // Is m2 * 2^e2 * 10^(precision - exp) an integer? precision was
        // already increased by 1, so the +1 of the tie position is included.
        let rexp = precision as i32 - exp;
        let required_twos = -e2 - rexp;
        let mut trailing_zeros = required_twos <= 0
            || (required_twos < 60 && multiple_of_power_of_2(m2, required_twos as u32));
        if rexp < 0 {
            let required_fives = -rexp;
            trailing_zeros = trailing_zeros && multiple_of_power_of_5(m2, required_fives as u32);
        }
        if trailing_zeros {
            2
        } else {
            1
        }
    };
    if printed_digits != 0 {
        if digits == 0 {
            sink.fill(b'0', maximum)?;
        } else {
            append_c_digits(maximum, digits, sink.grab(maximum)?);
        }
    } else if print_decimal_point {
        append_d_digits(maximum, digits, sink.grab(maximum + 1)?);
    } else {
        sink.push(b'0' + digits as u8)?;
    }
    if round_up != 0 {
        let result = sink.written_mut();
        let mut round_index = result.len() as isize;
        loop {
            round_index -= 1;
            if round_index == -1 {
                // The carry walked past the leading digit; 0.999.. became
                // 1.000.. and the exponent grows by one.
                result[0] = b'1';
                exp += 1;
                break;
            }
            let c = result[round_index as usize];
            if c == b'.' {
                // keep walking
            } else if c == b'9' {
                result[round_index as usize] = b'0';
                round_up = 1;
            } else {
                if round_up == 2 && c % 2 == 0 {
                    break;
                }
                result[round_index as usize] = c + 1;
                break;
            }
        }
    }

    sink.push(b'e')?;
    if exp < 0 {
        sink.push(b'-')?;
        exp = -exp;
    } else {
        sink.push(b'+')?;
    }
    if exp >= 100 {
        let c = exp % 10;
        let out = sink.grab(3)?;
        let t = 2 * (exp / 10) as usize;
        out[..2].copy_from_slice(&DIGIT_TABLE[t..t + 2]);
        out[2] = b'0' + c as u8;
    } else {
        let out = sink.grab(2)?;
        let t = 2 * exp as usize;
        out.copy_from_slice(&DIGIT_TABLE[t..t + 2]);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mul_shift_mod1e9() {
        // The lowest-block multiplier for exponent bucket 0 is 2^120 + 1;
        // floor((x << 8) * (2^120 + 1) / 2^128) mod 10^9 recovers x for any
        // nine-digit x.
        let one = [1u64, 1u64 << 56, 0];
        for &x in &[1u64, 7, 1729, 999_999_999] {
            assert_eq!(mul_shift_mod1e9(x << 8, &one, 128), x as u32);
        }
    }

    #[test]
    fn test_u128_mod1e9() {
        assert_eq!(u128_mod1e9(0), 0);
        assert_eq!(u128_mod1e9(999_999_999), 999_999_999);
        assert_eq!(u128_mod1e9(1_000_000_000), 0);
        assert_eq!(u128_mod1e9(u64::MAX as u128), (u64::MAX % 1_000_000_000) as u32);
        let big = (1u128 << 126) + 12345;
        assert_eq!(u128_mod1e9(big) as u128, big % 1_000_000_000);
    }

    #[test]
    fn test_append_helpers() {
        let mut buf = [0u8; 9];
        append_nine_digits(0, &mut buf);
        assert_eq!(&buf, b"000000000");
        append_nine_digits(123456789, &mut buf);
        assert_eq!(&buf, b"123456789");
        append_nine_digits(42, &mut buf);
        assert_eq!(&buf, b"000000042");

        let mut buf = [0u8; 4];
        append_n_digits(4, 1729, &mut buf);
        assert_eq!(&buf, b"1729");
        let mut buf = [0u8; 1];
        append_n_digits(1, 7, &mut buf);
        assert_eq!(&buf, b"7");

        let mut buf = [0u8; 5];
        append_d_digits(4, 1729, &mut buf);
        assert_eq!(&buf, b"1.729");

        let mut buf = [0u8; 3];
        append_c_digits(3, 1729, &mut buf);
        assert_eq!(&buf, b"729");
        let mut buf = [0u8; 2];
        append_c_digits(2, 5, &mut buf);
        assert_eq!(&buf, b"05");
    }
}
