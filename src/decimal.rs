//! Fixed-precision decimal values.
//!
//! Decimals are scaled integers: a `Decimal64` with scale 4 stores `1.5` as
//! `15000`. The reader only ever produces them (from decimal text or by
//! scaling a wire number); arithmetic and formatting belong to the caller.

/// Largest representable precision; 10^38 still fits an i128.
pub const MAX_PRECISION: u32 = 38;

macro_rules! decimal_type {
    ($(#[$doc:meta])* $name:ident, $repr:ty) => {
        $(#[$doc])*
        #[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord)]
        pub struct $name(pub $repr);

        impl DecimalRepr for $name {
            const TARGET_NAME: &'static str = stringify!($name);

            fn from_scaled_i128(value: i128) -> Option<Self> {
                <$repr>::try_from(value).ok().map($name)
            }
        }
    };
}

decimal_type! {
    /// A decimal with up to 9 digits of precision.
    Decimal32, i32
}
decimal_type! {
    /// A decimal with up to 18 digits of precision.
    Decimal64, i64
}
decimal_type! {
    /// A decimal with up to 38 digits of precision.
    Decimal128, i128
}

/// Width-checked construction from a scaled 128-bit value.
pub trait DecimalRepr: Sized + Copy {
    const TARGET_NAME: &'static str;

    fn from_scaled_i128(value: i128) -> Option<Self>;
}

/// 10^n, or `None` past the i128 range.
pub(crate) fn pow10(n: u32) -> Option<i128> {
    if n > MAX_PRECISION {
        return None;
    }
    10i128.checked_pow(n)
}

/// Parse decimal text into a scaled integer.
///
/// Accepts `[+|-] digits [ . digits ]`. Fractional digits beyond `scale`
/// are truncated toward zero, missing ones are zero-padded. The scaled
/// magnitude must stay below 10^precision. Returns `None` on any syntax or
/// range violation.
pub(crate) fn parse_decimal(text: &str, precision: u32, scale: u32) -> Option<i128> {
    if scale > precision || precision > MAX_PRECISION {
        return None;
    }
    let bytes = text.as_bytes();
    let (negative, rest) = match bytes.first()? {
        b'-' => (true, &bytes[1..]),
        b'+' => (false, &bytes[1..]),
        _ => (false, bytes),
    };

    let mut magnitude = 0i128;
    let mut seen_digit = false;
    let mut fraction_digits = 0u32;
    let mut in_fraction = false;
    for &b in rest {
        match b {
            b'0'..=b'9' => {
                seen_digit = true;
                if in_fraction && fraction_digits == scale {
                    // Truncate toward zero past the requested scale.
                    continue;
                }
                magnitude = magnitude.checked_mul(10)?.checked_add(i128::from(b - b'0'))?;
                if in_fraction {
                    fraction_digits += 1;
                }
            }
            b'.' if !in_fraction => in_fraction = true,
            _ => return None,
        }
    }
    if !seen_digit {
        return None;
    }

    magnitude = magnitude.checked_mul(pow10(scale - fraction_digits)?)?;
    if magnitude >= pow10(precision)? {
        return None;
    }
    Some(if negative { -magnitude } else { magnitude })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn integral_text_is_scaled_up() {
        assert_eq!(parse_decimal("42", 9, 2), Some(4200));
        assert_eq!(parse_decimal("0", 9, 4), Some(0));
    }

    #[test]
    fn fraction_is_padded_to_scale() {
        assert_eq!(parse_decimal("1.5", 9, 3), Some(1500));
        assert_eq!(parse_decimal("-0.5", 9, 3), Some(-500));
        assert_eq!(parse_decimal("+12.34", 9, 2), Some(1234));
    }

    #[test]
    fn excess_fraction_digits_truncate_toward_zero() {
        assert_eq!(parse_decimal("1.239", 9, 2), Some(123));
        assert_eq!(parse_decimal("-1.239", 9, 2), Some(-123));
    }

    #[test]
    fn precision_bound_is_enforced() {
        assert_eq!(parse_decimal("100", 4, 2), None); // 10000 needs 5 digits
        assert_eq!(parse_decimal("99.99", 4, 2), Some(9999));
    }

    #[test]
    fn malformed_text_is_rejected() {
        for text in ["", "-", ".", "1.2.3", "1e5", "abc", "1,5"] {
            assert_eq!(parse_decimal(text, 9, 2), None, "{text:?}");
        }
    }

    #[test]
    fn width_checked_narrowing() {
        assert_eq!(Decimal32::from_scaled_i128(123), Some(Decimal32(123)));
        assert_eq!(Decimal32::from_scaled_i128(i128::from(i64::MAX)), None);
        assert_eq!(
            Decimal128::from_scaled_i128(i128::MAX),
            Some(Decimal128(i128::MAX))
        );
    }
}
