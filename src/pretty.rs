use crate::buffer::Sink;
use crate::common::decimal_length17;
use crate::d2fixed::d2fixed_buffered;
use crate::d2s::FloatingDecimal64;
use crate::d2s_intrinsics::div1e8;
use crate::digit_table::DIGIT_TABLE;
use crate::error::Error;

/// Layout selection for [`d2s_format_to_chars`](crate::d2s_format_to_chars).
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Format {
    /// Fixed when it is no longer than scientific, scientific otherwise,
    /// rendered with an uppercase 'E' and no '+' on the exponent.
    Default,
    /// Always "d.ddde±dd", lowercase, explicitly signed exponent.
    Scientific,
    /// Plain decimal notation with no exponent suffix.
    Fixed,
    /// C-style %g selection: fixed for decimal exponents in [-4, 6),
    /// scientific otherwise.
    General,
}

impl Default for Format {
    fn default() -> Format {
        Format::Default
    }
}

// Largest odd mantissa m such that m * 10^e is exactly representable, as
// (2^53 - 1) / 5^e for e in [0, 22]. Beyond e = 22, 5^e itself exceeds 2^53.
static MAX_SHIFTED_MANTISSA: [u64; 23] = [
    9007199254740991, 1801439850948198, 360287970189639, 72057594037927,
    14411518807585, 2882303761517, 576460752303, 115292150460,
    23058430092, 4611686018, 922337203, 184467440,
    36893488, 7378697, 1475739, 295147,
    59029, 11805, 2361, 472,
    94, 18, 3,
];

// For the double nearest 10^e, whether its exact integer expansion is one
// digit shorter than "1" followed by e zeros (1e23 is exactly
// 99999999999999991611392, 23 digits rather than 24).
static ADJUSTMENT: [u8; 309] = [
    0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0,
    0, 0, 0, 1, 1, 0, 0, 0, 1, 1, 0, 1, 0, 1, 1, 1, 0, 1, 1, 1,
    0, 0, 0, 0, 0, 1, 1, 0, 0, 1, 0, 1, 1, 1, 0, 0, 0, 0, 1, 1,
    1, 1, 0, 0, 0, 1, 1, 1, 1, 0, 0, 0, 1, 1, 1, 1, 0, 1, 0, 1,
    0, 1, 1, 0, 0, 0, 0, 1, 1, 1, 1, 0, 0, 0, 0, 0, 0, 0, 1, 1,
    0, 1, 1, 0, 0, 1, 0, 1, 0, 1, 0, 1, 1, 0, 0, 0, 0, 0, 1, 1,
    1, 0, 0, 1, 1, 1, 1, 1, 0, 1, 0, 1, 1, 0, 1, 1, 0, 0, 0, 0,
    0, 0, 0, 0, 0, 1, 1, 1, 0, 0, 1, 0, 0, 1, 0, 0, 1, 1, 1, 1,
    0, 0, 1, 1, 0, 1, 1, 0, 1, 1, 0, 1, 0, 0, 0, 1, 0, 0, 0, 1,
    0, 1, 0, 1, 0, 1, 1, 1, 0, 0, 0, 0, 0, 0, 1, 1, 1, 1, 0, 0,
    1, 0, 1, 1, 1, 0, 0, 0, 1, 0, 1, 1, 1, 1, 1, 1, 0, 1, 0, 1,
    1, 0, 0, 0, 1, 1, 1, 0, 1, 1, 0, 0, 0, 1, 0, 0, 0, 1, 0, 1,
    0, 0, 0, 0, 0, 0, 0, 1, 0, 1, 1, 0, 0, 1, 1, 1, 0, 0, 0, 1,
    0, 1, 0, 0, 0, 0, 0, 1, 1, 0, 0, 1, 0, 1, 1, 1, 0, 0, 1, 0,
    0, 0, 0, 1, 0, 1, 0, 0, 0, 0, 0, 1, 0, 1, 0, 1, 1, 0, 1, 0,
    0, 0, 0, 0, 1, 1, 0, 1, 0,
];

// Writes the decimal digits of `output` right-aligned into `result`, which
// must be exactly decimal_length17(output) bytes. We prefer 32-bit
// operations even on 64-bit platforms: we have at most 17 digits, and u32
// can store 9, so if output doesn't fit into u32 we cut off 8 digits first.
#[cfg_attr(feature = "no-panic", inline)]
fn write_decimal_digits(mut output: u64, result: &mut [u8]) {
    let mut curr = result.len();
    if (output >> 32) != 0 {
        // Expensive 64-bit division.
        let q = div1e8(output);
        let mut output2 = (output as u32).wrapping_sub(100_000_000u32.wrapping_mul(q as u32));
        output = q;

        let c = output2 % 10_000;
        output2 /= 10_000;
        let d = output2 % 10_000;
        let c0 = ((c % 100) << 1) as usize;
        let c1 = ((c / 100) << 1) as usize;
        let d0 = ((d % 100) << 1) as usize;
        let d1 = ((d / 100) << 1) as usize;
        result[curr - 2..curr].copy_from_slice(&DIGIT_TABLE[c0..c0 + 2]);
        result[curr - 4..curr - 2].copy_from_slice(&DIGIT_TABLE[c1..c1 + 2]);
        result[curr - 6..curr - 4].copy_from_slice(&DIGIT_TABLE[d0..d0 + 2]);
        result[curr - 8..curr - 6].copy_from_slice(&DIGIT_TABLE[d1..d1 + 2]);
        curr -= 8;
    }
    let mut output2 = output as u32;
    while output2 >= 10_000 {
        let c = output2 % 10_000;
        output2 /= 10_000;
        let c0 = ((c % 100) << 1) as usize;
        let c1 = ((c / 100) << 1) as usize;
        result[curr - 2..curr].copy_from_slice(&DIGIT_TABLE[c0..c0 + 2]);
        result[curr - 4..curr - 2].copy_from_slice(&DIGIT_TABLE[c1..c1 + 2]);
        curr -= 4;
    }
    if output2 >= 100 {
        let c = ((output2 % 100) << 1) as usize;
        output2 /= 100;
        result[curr - 2..curr].copy_from_slice(&DIGIT_TABLE[c..c + 2]);
        curr -= 2;
    }
    if output2 >= 10 {
        let c = (output2 << 1) as usize;
        result[curr - 2..curr].copy_from_slice(&DIGIT_TABLE[c..c + 2]);
    } else {
        result[curr - 1] = b'0' + output2 as u8;
    }
}

fn short_exponent_len(exp: i32) -> usize {
    let digits = if exp.abs() >= 100 {
        3
    } else if exp.abs() >= 10 {
        2
    } else {
        1
    };
    (exp < 0) as usize + digits
}

/// Shortest round-trip scientific layout: "d.dddE±dd" with an uppercase 'E'
/// and no '+' sign on non-negative exponents.
pub(crate) fn to_chars_short(v: &FloatingDecimal64, result: &mut [u8]) -> Result<usize, Error> {
    let olength = decimal_length17(v.mantissa) as usize;
    let mut exp = v.exponent + olength as i32 - 1;
    let total = olength + (olength > 1) as usize + 1 + short_exponent_len(exp);
    let out = match result.get_mut(..total) {
        Some(out) => out,
        None => return Err(Error::buffer_too_small()),
    };

    let mut index;
    if olength > 1 {
        write_decimal_digits(v.mantissa, &mut out[1..olength + 1]);
        out[0] = out[1];
        out[1] = b'.';
        index = olength + 1;
    } else {
        out[0] = b'0' + v.mantissa as u8;
        index = 1;
    }
    out[index] = b'E';
    index += 1;
    if exp < 0 {
        out[index] = b'-';
        index += 1;
        exp = -exp;
    }
    if exp >= 100 {
        let t = 2 * (exp / 10) as usize;
        out[index..index + 2].copy_from_slice(&DIGIT_TABLE[t..t + 2]);
        out[index + 2] = b'0' + (exp % 10) as u8;
    } else if exp >= 10 {
        let t = 2 * exp as usize;
        out[index..index + 2].copy_from_slice(&DIGIT_TABLE[t..t + 2]);
    } else {
        out[index] = b'0' + exp as u8;
    }
    Ok(total)
}

/// Explicit scientific layout: "d.ddde±dd", lowercase, mandatory exponent
/// sign, two exponent digits (three at |exp| >= 100).
fn to_chars_scientific(v: &FloatingDecimal64, olength: usize, result: &mut [u8]) -> Result<usize, Error> {
    let mut exp = v.exponent + olength as i32 - 1;
    let exp_digits = if exp.abs() >= 100 { 3 } else { 2 };
    let total = olength + (olength > 1) as usize + 2 + exp_digits;
    let out = match result.get_mut(..total) {
        Some(out) => out,
        None => return Err(Error::buffer_too_small()),
    };

    let mut index;
    if olength > 1 {
        write_decimal_digits(v.mantissa, &mut out[1..olength + 1]);
        out[0] = out[1];
        out[1] = b'.';
        index = olength + 1;
    } else {
        out[0] = b'0' + v.mantissa as u8;
        index = 1;
    }
    out[index] = b'e';
    index += 1;
    if exp < 0 {
        out[index] = b'-';
        exp = -exp;
    } else {
        out[index] = b'+';
    }
    index += 1;
    if exp >= 100 {
        let t = 2 * (exp / 10) as usize;
        out[index..index + 2].copy_from_slice(&DIGIT_TABLE[t..t + 2]);
        out[index + 2] = b'0' + (exp % 10) as u8;
    } else {
        let t = 2 * exp as usize;
        out[index..index + 2].copy_from_slice(&DIGIT_TABLE[t..t + 2]);
    }
    Ok(total)
}

/// Fixed layout of a shortest-form decimal. For non-negative decimal
/// exponents the digits-plus-zeros form is only usable when it reconstructs
/// the value exactly; otherwise the exact expansion comes from the fixed
/// engine at precision 0.
fn to_chars_fixed(d: f64, v: &FloatingDecimal64, olength: usize, result: &mut [u8]) -> Result<usize, Error> {
    let ryu_exp = v.exponent;
    if ryu_exp >= 0 {
        let exp = ryu_exp as usize;
        let mut total = olength + exp;
        if v.mantissa == 1 {
            // Rounding can change the number of digits of the exact form.
            total -= ADJUSTMENT[exp] as usize;
        }
        // v.mantissa * 10^ryu_exp is exact iff the odd part of the mantissa
        // fits next to 5^ryu_exp in 53 bits.
        let can_use_ryu = ryu_exp <= 22
            && (v.mantissa >> v.mantissa.trailing_zeros()) <= MAX_SHIFTED_MANTISSA[exp];
        if !can_use_ryu {
            if result.len() < total {
                return Err(Error::buffer_too_small());
            }
            let mut sink = Sink::new(result);
            d2fixed_buffered(d, 0, &mut sink)?;
            debug_assert_eq!(sink.len(), total);
            return Ok(total);
        }
        let out = match result.get_mut(..total) {
            Some(out) => out,
            None => return Err(Error::buffer_too_small()),
        };
        write_decimal_digits(v.mantissa, &mut out[..olength]);
        for b in &mut out[olength..] {
            *b = b'0';
        }
        Ok(total)
    } else if olength as i32 + ryu_exp > 0 {
        // 1234e-2 -> 12.34
        let total = olength + 1;
        let dot = (olength as i32 + ryu_exp) as usize;
        let out = match result.get_mut(..total) {
            Some(out) => out,
            None => return Err(Error::buffer_too_small()),
        };
        write_decimal_digits(v.mantissa, &mut out[1..olength + 1]);
        out.copy_within(1..dot + 1, 0);
        out[dot] = b'.';
        Ok(total)
    } else {
        // 1234e-6 -> 0.001234
        let zeros = -(olength as i32 + ryu_exp) as usize;
        let total = 2 + zeros + olength;
        let out = match result.get_mut(..total) {
            Some(out) => out,
            None => return Err(Error::buffer_too_small()),
        };
        out[0] = b'0';
        out[1] = b'.';
        for b in &mut out[2..2 + zeros] {
            *b = b'0';
        }
        write_decimal_digits(v.mantissa, &mut out[2 + zeros..]);
        Ok(total)
    }
}

/// Renders a shortest-form decimal under the requested format selection
/// rules. `d` is the original value, needed when the fixed layout has to
/// fall back to the exact expansion.
pub(crate) fn to_chars_with_format(
    d: f64,
    v: &FloatingDecimal64,
    format: Format,
    result: &mut [u8],
) -> Result<usize, Error> {
    let olength = decimal_length17(v.mantissa) as usize;
    let scientific_exponent = v.exponent + olength as i32 - 1;
    match format {
        Format::Default => {
            // Fixed wins ties against scientific under two-digit exponents.
            let (lower, upper) = if olength == 1 {
                (-3, 4)
            } else {
                (-(olength as i32 + 3), 5)
            };
            if lower <= v.exponent && v.exponent <= upper {
                to_chars_fixed(d, v, olength, result)
            } else {
                to_chars_short(v, result)
            }
        }
        Format::Scientific => to_chars_scientific(v, olength, result),
        Format::Fixed => to_chars_fixed(d, v, olength, result),
        Format::General => {
            if -4 <= scientific_exponent && scientific_exponent < 6 {
                to_chars_fixed(d, v, olength, result)
            } else {
                to_chars_scientific(v, olength, result)
            }
        }
    }
}
