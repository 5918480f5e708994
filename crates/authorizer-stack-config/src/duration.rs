// Go-compatible duration strings
//
// Accepts the same grammar as Go's time.ParseDuration: a sequence of decimal
// numbers, each with an optional fraction and a mandatory unit suffix
// ("ns", "us", "µs", "ms", "s", "m", "h"), e.g. "10s", "1m30s", "1.5s".
// A bare "0" is allowed. Surrounding whitespace is not. Negative durations
// parse but are reported as `DurationError::Negative`, so callers can treat
// them as out of range rather than malformed.

use std::time::Duration;
use thiserror::Error;

const NANOS_PER_SECOND: u128 = 1_000_000_000;

/// Fractional digits beyond this cannot change a nanosecond result.
const MAX_FRACTION_DIGITS: usize = 18;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DurationError {
    #[error("empty duration")]
    Empty,
    #[error("invalid number in duration")]
    InvalidNumber,
    #[error("missing unit in duration (expected one of ns, us, ms, s, m, h)")]
    MissingUnit,
    #[error("unknown unit '{0}' in duration")]
    UnknownUnit(String),
    #[error("negative durations are not allowed")]
    Negative,
    #[error("duration overflows")]
    Overflow,
}

pub fn parse_duration(input: &str) -> Result<Duration, DurationError> {
    if input.is_empty() {
        return Err(DurationError::Empty);
    }

    let (negative, mut rest) = match input.as_bytes()[0] {
        b'-' => (true, &input[1..]),
        b'+' => (false, &input[1..]),
        _ => (false, input),
    };

    if rest == "0" {
        return Ok(Duration::ZERO);
    }
    if rest.is_empty() {
        return Err(DurationError::InvalidNumber);
    }

    let mut total: u128 = 0;
    while !rest.is_empty() {
        let int_end = rest
            .find(|c: char| !c.is_ascii_digit())
            .unwrap_or(rest.len());
        let int_part = &rest[..int_end];
        rest = &rest[int_end..];

        let mut frac_part = "";
        if let Some(after_dot) = rest.strip_prefix('.') {
            let frac_end = after_dot
                .find(|c: char| !c.is_ascii_digit())
                .unwrap_or(after_dot.len());
            frac_part = &after_dot[..frac_end];
            rest = &after_dot[frac_end..];
        }

        if int_part.is_empty() && frac_part.is_empty() {
            return Err(DurationError::InvalidNumber);
        }

        let unit_end = rest
            .find(|c: char| c.is_ascii_digit() || c == '.')
            .unwrap_or(rest.len());
        let unit = &rest[..unit_end];
        rest = &rest[unit_end..];

        let scale = unit_scale(unit)?;
        let component = component_nanos(int_part, frac_part, scale)?;
        total = total
            .checked_add(component)
            .ok_or(DurationError::Overflow)?;
    }

    if negative && total > 0 {
        return Err(DurationError::Negative);
    }

    let nanos = u64::try_from(total).map_err(|_| DurationError::Overflow)?;
    Ok(Duration::from_nanos(nanos))
}

fn unit_scale(unit: &str) -> Result<u128, DurationError> {
    match unit {
        "" => Err(DurationError::MissingUnit),
        "ns" => Ok(1),
        "us" | "µs" | "μs" => Ok(1_000),
        "ms" => Ok(1_000_000),
        "s" => Ok(NANOS_PER_SECOND),
        "m" => Ok(60 * NANOS_PER_SECOND),
        "h" => Ok(3600 * NANOS_PER_SECOND),
        other => Err(DurationError::UnknownUnit(other.to_string())),
    }
}

fn component_nanos(int_part: &str, frac_part: &str, scale: u128) -> Result<u128, DurationError> {
    let whole: u128 = if int_part.is_empty() {
        0
    } else {
        int_part.parse().map_err(|_| DurationError::Overflow)?
    };
    let mut nanos = whole.checked_mul(scale).ok_or(DurationError::Overflow)?;

    if !frac_part.is_empty() {
        let digits = &frac_part[..frac_part.len().min(MAX_FRACTION_DIGITS)];
        let numerator: u128 = digits.parse().map_err(|_| DurationError::InvalidNumber)?;
        let denominator = 10u128.pow(digits.len() as u32);
        nanos = nanos
            .checked_add(numerator * scale / denominator)
            .ok_or(DurationError::Overflow)?;
    }

    Ok(nanos)
}

/// Render a duration so that [`parse_duration`] reads it back unchanged.
pub fn format_duration(duration: Duration) -> String {
    let nanos = duration.subsec_nanos();
    if nanos == 0 {
        format!("{}s", duration.as_secs())
    } else if nanos % 1_000_000 == 0 {
        format!("{}ms", duration.as_millis())
    } else {
        format!("{}ns", duration.as_nanos())
    }
}
