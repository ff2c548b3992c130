use ryu_charconv::{d2s_format_to_chars, Format};

fn check(d: f64, format: Format, expected: &str) {
    let mut buf = vec![0u8; expected.len() + 8];
    let n = d2s_format_to_chars(d, &mut buf, format).unwrap();
    assert_eq!(std::str::from_utf8(&buf[..n]).unwrap(), expected);

    let mut tight = vec![0u8; expected.len()];
    assert_eq!(
        d2s_format_to_chars(d, &mut tight, format),
        Ok(expected.len())
    );
    assert_eq!(&tight, expected.as_bytes());
}

#[test]
fn test_zero() {
    check(0.0, Format::Default, "0");
    check(0.0, Format::Scientific, "0e+00");
    check(0.0, Format::Fixed, "0");
    check(0.0, Format::General, "0");
}

#[test]
fn test_default_selection() {
    // Fixed whenever it is no longer than the scientific form.
    check(1.0, Format::Default, "1");
    check(0.3, Format::Default, "0.3");
    check(17.29, Format::Default, "17.29");
    check(0.001729, Format::Default, "0.001729");
    check(1729.0, Format::Default, "1729");
    check(17290000.0, Format::Default, "17290000");
    check(100.0, Format::Default, "100");
    check(123456.0, Format::Default, "123456");
    check(1234567.0, Format::Default, "1234567");
    check(0.0001234, Format::Default, "0.0001234");
    check(9007199254740992.0, Format::Default, "9007199254740992");
    // One-digit mantissas have tighter bounds than longer ones.
    check(1.7e-05, Format::Default, "1.7E-5");
    check(1.234e-05, Format::Default, "1.234E-5");
    check(1e+23, Format::Default, "1E23");
    check(1e+100, Format::Default, "1E100");
    check(5e-324, Format::Default, "5E-324");
    check(1.7976931348623157e+308, Format::Default, "1.7976931348623157E308");
}

#[test]
fn test_default_fixed_needs_exact_reconstruction() {
    // The shortest digits of this value keep a positive decimal exponent,
    // but mantissa * 10^exp is not exactly representable, so the fixed
    // layout prints the exact expansion instead.
    check(
        1.2345678901234568e+21,
        Format::Default,
        "1234567890123456774144",
    );
}

#[test]
fn test_scientific() {
    check(1.0, Format::Scientific, "1e+00");
    check(0.3, Format::Scientific, "3e-01");
    check(17.29, Format::Scientific, "1.729e+01");
    check(0.001729, Format::Scientific, "1.729e-03");
    check(1729.0, Format::Scientific, "1.729e+03");
    check(100.0, Format::Scientific, "1e+02");
    check(123456.0, Format::Scientific, "1.23456e+05");
    check(1.7e-05, Format::Scientific, "1.7e-05");
    check(1e+23, Format::Scientific, "1e+23");
    check(1e+100, Format::Scientific, "1e+100");
    check(5e-324, Format::Scientific, "5e-324");
    check(9007199254740992.0, Format::Scientific, "9.007199254740992e+15");
    check(1.2345678901234568e+21, Format::Scientific, "1.2345678901234568e+21");
    check(1.7976931348623157e+308, Format::Scientific, "1.7976931348623157e+308");
}

#[test]
fn test_fixed() {
    check(1.0, Format::Fixed, "1");
    check(0.3, Format::Fixed, "0.3");
    check(17.29, Format::Fixed, "17.29");
    check(0.001729, Format::Fixed, "0.001729");
    check(1729.0, Format::Fixed, "1729");
    check(17290000.0, Format::Fixed, "17290000");
    check(0.125, Format::Fixed, "0.125");
    check(1.7e-05, Format::Fixed, "0.000017");
    check(1.234e-05, Format::Fixed, "0.00001234");
    check(9007199254740992.0, Format::Fixed, "9007199254740992");
    check(1e+23, Format::Fixed, "99999999999999991611392");
    check(
        1.2345678901234568e+21,
        Format::Fixed,
        "1234567890123456774144",
    );
}

#[test]
fn test_fixed_huge() {
    let mut expected = String::from("0.");
    for _ in 0..323 {
        expected.push('0');
    }
    expected.push('5');
    check(5e-324, Format::Fixed, &expected);

    check(
        1e+100,
        Format::Fixed,
        "10000000000000000159028911097599180468360808563945281389781327557747838772170381060813469985856815104",
    );
    check(
        1.7976931348623157e+308,
        Format::Fixed,
        "179769313486231570814527423731704356798070567525844996598917476803157260780028538760589558632766878171540458953514382464234321326889464182768467546703537516986049910576551282076245490090389328944075868508455133942304583236903222948165808559332123348274797826204144723168738177180919299881250404026184124858368",
    );
}

#[test]
fn test_general() {
    check(1.0, Format::General, "1");
    check(0.3, Format::General, "0.3");
    check(17.29, Format::General, "17.29");
    check(0.001729, Format::General, "0.001729");
    check(1729.0, Format::General, "1729");
    check(123456.0, Format::General, "123456");
    check(0.0001234, Format::General, "0.0001234");
    check(0.125, Format::General, "0.125");
    // The %g boundaries: fixed for decimal exponents in [-4, 6).
    check(1234567.0, Format::General, "1.234567e+06");
    check(17290000.0, Format::General, "1.729e+07");
    check(1.234e-05, Format::General, "1.234e-05");
    check(1.7e-05, Format::General, "1.7e-05");
    check(1e+23, Format::General, "1e+23");
    check(5e-324, Format::General, "5e-324");
    check(9007199254740992.0, Format::General, "9.007199254740992e+15");
    check(1.7976931348623157e+308, Format::General, "1.7976931348623157e+308");
}

#[test]
fn test_buffer_too_small() {
    let mut buf = [0u8; 3];
    assert!(d2s_format_to_chars(17.29, &mut buf, Format::Fixed).is_err());
    let mut buf = [0u8; 8];
    assert!(d2s_format_to_chars(17.29, &mut buf, Format::Scientific).is_err());
    let mut buf = [0u8; 10];
    assert!(d2s_format_to_chars(1e+23, &mut buf, Format::Fixed).is_err());
    let mut buf = [0u8; 0];
    assert!(d2s_format_to_chars(0.0, &mut buf, Format::Default).is_err());
}

#[test]
fn test_round_trip_across_formats() {
    use rand::{Rng, SeedableRng};

    // Every format preserves the value: parsing the output yields the
    // input again (fixed output of large integers is exact, all other
    // layouts carry the full shortest digits).
    let formats = [
        Format::Default,
        Format::Scientific,
        Format::Fixed,
        Format::General,
    ];
    let mut rng = rand::rngs::StdRng::seed_from_u64(40490);
    let mut buf = vec![0u8; 2048];
    let mut checked = 0u32;
    while checked < 2_000 {
        let bits = rng.gen::<u64>() >> 1;
        let d = f64::from_bits(bits);
        if !d.is_finite() {
            continue;
        }
        for &format in &formats {
            let n = d2s_format_to_chars(d, &mut buf, format).unwrap();
            let s = std::str::from_utf8(&buf[..n]).unwrap();
            assert_eq!(s.parse::<f64>(), Ok(d), "{:?} {}", format, s);
        }
        checked += 1;
    }
}
