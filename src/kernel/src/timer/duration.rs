//! Duration text parsing.
//!
//! Grammar: an unsigned decimal literal immediately followed by `ms` or `s`,
//! e.g. `500ms`, `2s`, `0.5s`. Conversion is exact down to the nanosecond.

use std::time::Duration;

use rtsim_common::{Result, SimError};

const NANOS_PER_SEC: u128 = 1_000_000_000;
const NANOS_PER_MILLI: u128 = 1_000_000;

/// Parse `<number><ms|s>` into a [`Duration`].
pub fn parse_duration(text: &str) -> Result<Duration> {
    let invalid = || SimError::InvalidDurationFormat(text.to_string());

    // `ms` must be tried first: every `ms` literal also ends in `s`.
    let (number, scale) = if let Some(number) = text.strip_suffix("ms") {
        (number, NANOS_PER_MILLI)
    } else if let Some(number) = text.strip_suffix('s') {
        (number, NANOS_PER_SEC)
    } else {
        return Err(invalid());
    };

    let (whole, fraction) = number.split_once('.').unwrap_or((number, ""));
    if whole.is_empty() && fraction.is_empty() {
        return Err(invalid());
    }
    if !whole.bytes().all(|b| b.is_ascii_digit()) || !fraction.bytes().all(|b| b.is_ascii_digit())
    {
        return Err(invalid());
    }

    let mut nanos: u128 = 0;
    for b in whole.bytes() {
        nanos = nanos
            .checked_mul(10)
            .and_then(|n| n.checked_add(u128::from(b - b'0')))
            .ok_or_else(invalid)?;
    }
    nanos = nanos.checked_mul(scale).ok_or_else(invalid)?;

    let mut place = scale;
    for b in fraction.bytes() {
        place /= 10;
        if place == 0 {
            break;
        }
        nanos += u128::from(b - b'0') * place;
    }

    let secs = u64::try_from(nanos / NANOS_PER_SEC).map_err(|_| invalid())?;
    let subsec = (nanos % NANOS_PER_SEC) as u32;
    Ok(Duration::new(secs, subsec))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rtsim_common::ErrorClass;

    #[test]
    fn test_milliseconds() {
        assert_eq!(parse_duration("500ms").unwrap(), Duration::from_millis(500));
        assert_eq!(parse_duration("1000ms").unwrap(), Duration::from_secs(1));
        assert_eq!(parse_duration("0.5ms").unwrap(), Duration::from_micros(500));
    }

    #[test]
    fn test_seconds() {
        assert_eq!(parse_duration("2s").unwrap(), Duration::from_secs(2));
        assert_eq!(parse_duration("0.5s").unwrap(), Duration::from_millis(500));
        assert_eq!(parse_duration("1.25s").unwrap(), Duration::from_millis(1250));
    }

    #[test]
    fn test_partial_decimals() {
        assert_eq!(parse_duration(".5s").unwrap(), Duration::from_millis(500));
        assert_eq!(parse_duration("5.s").unwrap(), Duration::from_secs(5));
        assert_eq!(parse_duration("0ms").unwrap(), Duration::ZERO);
    }

    #[test]
    fn test_sub_nanosecond_digits_truncate() {
        assert_eq!(
            parse_duration("0.0000000019s").unwrap(),
            Duration::from_nanos(1)
        );
    }

    #[test]
    fn test_rejects_malformed() {
        for text in [
            "100xyz", "abcms", "10", "", "ms", "s", ".s", "-5s", "+5s", "1e3ms", " 5s", "5 s",
            "1.2.3s", "infs", "nanms", "5m", "5sec",
        ] {
            let err = parse_duration(text).unwrap_err();
            assert_eq!(err.class(), ErrorClass::InvalidDurationFormat, "{:?}", text);
        }
    }

    #[test]
    fn test_rejects_overflow() {
        assert!(parse_duration("99999999999999999999999999999999999999999s").is_err());
        assert!(parse_duration("18446744073709551616s").is_err());
    }
}
