use ryu_charconv::{d2exp_to_chars, ErrorKind};

fn check(d: f64, precision: u32, expected: &str) {
    let mut buf = vec![0u8; expected.len() + 8];
    let n = d2exp_to_chars(d, precision, &mut buf).unwrap();
    assert_eq!(std::str::from_utf8(&buf[..n]).unwrap(), expected);

    let mut tight = vec![0u8; expected.len()];
    assert_eq!(d2exp_to_chars(d, precision, &mut tight), Ok(expected.len()));
    assert_eq!(&tight, expected.as_bytes());
}

#[test]
fn test_zero() {
    check(0.0, 0, "0e+00");
    check(0.0, 5, "0.00000e+00");
}

#[test]
fn test_basic() {
    check(1.0, 0, "1e+00");
    check(1.0, 2, "1.00e+00");
    check(1.0, 17, "1.00000000000000000e+00");
    check(1.5, 1, "1.5e+00");
    check(0.5, 0, "5e-01");
    check(123456789.0, 4, "1.2346e+08");
    check(3.141592653589793, 15, "3.141592653589793e+00");
    check(3.141592653589793, 0, "3e+00");
}

#[test]
fn test_round_to_even() {
    check(2.5, 1, "2.5e+00");
    check(0.125, 2, "1.25e-01");
    check(985.0, 1, "9.8e+02");
    check(995.0, 1, "1.0e+03");
}

#[test]
fn test_carrying() {
    check(999999.0, 2, "1.00e+06");
    check(9.999999, 2, "1.00e+01");
    check(0.99, 0, "1e+00");
}

#[test]
fn test_exact_value_of_binary() {
    // Requesting more digits than the shortest form exposes the exact
    // binary expansion.
    check(3.141592653589793, 30, "3.141592653589793115997963468544e+00");
    check(5e-324, 2, "4.94e-324");
    check(4.940656458412465e-05, 5, "4.94066e-05");
}

#[test]
fn test_extremes() {
    check(1e+23, 0, "1e+23");
    check(1e+23, 5, "1.00000e+23");
    check(1e+300, 2, "1.00e+300");
    check(5e-324, 0, "5e-324");
    check(2.2250738585072014e-308, 10, "2.2250738585e-308");
    check(1.7976931348623157e+308, 16, "1.7976931348623157e+308");
}

#[test]
fn test_buffer_too_small() {
    let mut buf = [0u8; 7];
    let err = d2exp_to_chars(1.0, 2, &mut buf).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::BufferTooSmall);

    let mut buf = [0u8; 4];
    assert!(d2exp_to_chars(0.0, 0, &mut buf).is_err());
}

#[test]
fn test_seventeen_digits_round_trip() {
    use rand::{Rng, SeedableRng};

    // 17 significant digits always identify a double uniquely.
    let mut rng = rand::rngs::StdRng::seed_from_u64(0xeeee);
    let mut buf = [0u8; 32];
    let mut checked = 0u32;
    while checked < 5_000 {
        let bits = rng.gen::<u64>() >> 1;
        let d = f64::from_bits(bits);
        if !d.is_finite() || d == 0.0 {
            continue;
        }
        let n = d2exp_to_chars(d, 16, &mut buf).unwrap();
        let s = std::str::from_utf8(&buf[..n]).unwrap();
        assert_eq!(s.parse::<f64>(), Ok(d), "{}", s);
        checked += 1;
    }
}
