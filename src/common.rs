pub const DOUBLE_MANTISSA_BITS: u32 = 52;
pub const DOUBLE_EXPONENT_BITS: u32 = 11;
pub const DOUBLE_BIAS: i32 = 1023;

/// Returns the number of decimal digits in `v`, which must not be a 18, 19,
/// or 20-digit number. (17 digits are sufficient for round-tripping.)
#[cfg_attr(feature = "no-panic", inline)]
pub fn decimal_length17(v: u64) -> u32 {
    // The average output length is 16.38 digits, so we check high-to-low.
    debug_assert!(v < 100000000000000000);
    if v >= 10000000000000000 {
        17
    } else if v >= 1000000000000000 {
        16
    } else if v >= 100000000000000 {
        15
    } else if v >= 10000000000000 {
        14
    } else if v >= 1000000000000 {
        13
    } else if v >= 100000000000 {
        12
    } else if v >= 10000000000 {
        11
    } else if v >= 1000000000 {
        10
    } else if v >= 100000000 {
        9
    } else if v >= 10000000 {
        8
    } else if v >= 1000000 {
        7
    } else if v >= 100000 {
        6
    } else if v >= 10000 {
        5
    } else if v >= 1000 {
        4
    } else if v >= 100 {
        3
    } else if v >= 10 {
        2
    } else {
        1
    }
}

/// Returns the number of decimal digits in `v`, which must not be a
/// 10-digit number. (The fixed path prints 9-digit blocks.)
#[cfg_attr(feature = "no-panic", inline)]
pub fn decimal_length9(v: u32) -> u32 {
    debug_assert!(v < 1000000000);
    if v >= 100000000 {
        9
    } else if v >= 10000000 {
        8
    } else if v >= 1000000 {
        7
    } else if v >= 100000 {
        6
    } else if v >= 10000 {
        5
    } else if v >= 1000 {
        4
    } else if v >= 100 {
        3
    } else if v >= 10 {
        2
    } else {
        1
    }
}

/// Returns e == 0 ? 1 : ceil(log_2(5^e)).
#[cfg_attr(feature = "no-panic", inline)]
pub fn pow5bits(e: i32) -> i32 {
    // This approximation works up to the point that the multiplication
    // overflows at e = 3529. If the multiplication were done in 64 bits, it
    // would fail at 5^4004 which is just greater than 2^9297.
    debug_assert!(e >= 0);
    debug_assert!(e <= 3528);
    (((e as u32 * 1217359) >> 19) + 1) as i32
}

/// Returns floor(log_10(2^e)).
#[cfg_attr(feature = "no-panic", inline)]
pub fn log10_pow2(e: i32) -> u32 {
    // The first value this approximation fails for is 2^1651 which is just
    // greater than 10^297.
    debug_assert!(e >= 0);
    debug_assert!(e <= 1650);
    (e as u32 * 78913) >> 18
}

/// Returns floor(log_10(5^e)).
#[cfg_attr(feature = "no-panic", inline)]
pub fn log10_pow5(e: i32) -> u32 {
    // The first value this approximation fails for is 5^2621 which is just
    // greater than 10^1832.
    debug_assert!(e >= 0);
    debug_assert!(e <= 2620);
    (e as u32 * 732923) >> 20
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decimal_length() {
        assert_eq!(decimal_length17(1), 1);
        assert_eq!(decimal_length17(9), 1);
        assert_eq!(decimal_length17(10), 2);
        assert_eq!(decimal_length17(99999999999999999), 17);
        assert_eq!(decimal_length17(17976931348623157), 17);
        assert_eq!(decimal_length9(1), 1);
        assert_eq!(decimal_length9(999999999), 9);
        assert_eq!(decimal_length9(100000000), 9);
        assert_eq!(decimal_length9(99999999), 8);
    }

    #[test]
    fn test_pow5bits() {
        // Exact over the range a u128 can confirm.
        for e in 0..56 {
            let exact = if e == 0 {
                1
            } else {
                128 - 5u128.pow(e as u32).leading_zeros() as i32
            };
            assert_eq!(pow5bits(e), exact);
        }
        assert_eq!(pow5bits(3528), 8192);
    }

    #[test]
    fn test_log10() {
        for e in 0..39 {
            let mut digits = 0;
            let mut p: u128 = 1 << e;
            while p >= 10 {
                p /= 10;
                digits += 1;
            }
            assert_eq!(log10_pow2(e as i32), digits);
        }
        assert_eq!(log10_pow2(1650), 496);
        for e in 0..28 {
            let mut digits = 0;
            let mut p: u128 = 5u128.pow(e);
            while p >= 10 {
                p /= 10;
                digits += 1;
            }
            assert_eq!(log10_pow5(e as i32), digits);
        }
        assert_eq!(log10_pow5(2620), 1831);
    }
}
