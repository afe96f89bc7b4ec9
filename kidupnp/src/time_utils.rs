//! Time formatting and parsing for AVTransport `H+:MM:SS` values.

use crate::errors::ControlPointError;

/// Formats a duration in seconds as HH:MM:SS.
///
/// # Examples
/// ```
/// # use kidupnp::time_utils::format_hhmmss;
/// assert_eq!(format_hhmmss(0), "00:00:00");
/// assert_eq!(format_hhmmss(3661), "01:01:01");
/// ```
pub fn format_hhmmss(seconds: u64) -> String {
    let hours = seconds / 3600;
    let minutes = (seconds % 3600) / 60;
    let secs = seconds % 60;
    format!("{:02}:{:02}:{:02}", hours, minutes, secs)
}

/// Parses an AVTransport time (`H+:MM:SS[.F+]`) to whole seconds.
///
/// Hours may have any number of digits; minutes and seconds must be < 60.
/// A fractional part (`.123` or `.1/3`) is accepted and dropped.
///
/// # Examples
/// ```
/// # use kidupnp::time_utils::parse_hhmmss;
/// assert_eq!(parse_hhmmss("01:02:03").unwrap(), 3723);
/// assert_eq!(parse_hhmmss("0:00:07.500").unwrap(), 7);
/// assert!(parse_hhmmss("02:03").is_err());
/// ```
pub fn parse_hhmmss(input: &str) -> Result<u64, ControlPointError> {
    let trimmed = input.trim();
    let whole = trimmed.split('.').next().unwrap_or(trimmed);
    let parts: Vec<&str> = whole.split(':').collect();

    if parts.len() != 3 {
        return Err(ControlPointError::InvalidTimeFormat(format!(
            "Invalid time format '{}': expected H:MM:SS",
            input
        )));
    }

    let component = |value: &str, label: &str| -> Result<u64, ControlPointError> {
        if value.is_empty() || !value.bytes().all(|b| b.is_ascii_digit()) {
            return Err(ControlPointError::InvalidTimeFormat(format!(
                "Invalid {} component in '{}'",
                label, input
            )));
        }
        value.parse::<u64>().map_err(|_| {
            ControlPointError::InvalidTimeFormat(format!(
                "Invalid {} component in '{}'",
                label, input
            ))
        })
    };

    let hours = component(parts[0], "hour")?;
    let minutes = component(parts[1], "minute")?;
    let seconds = component(parts[2], "second")?;

    if minutes >= 60 || seconds >= 60 {
        return Err(ControlPointError::InvalidTimeFormat(format!(
            "Invalid time '{}': minutes and seconds must be < 60",
            input
        )));
    }

    hours
        .checked_mul(3600)
        .and_then(|h| h.checked_add(minutes * 60 + seconds))
        .ok_or_else(|| {
            ControlPointError::InvalidTimeFormat(format!("Time '{}' is out of range", input))
        })
}

/// Same as [`parse_hhmmss`], but maps renderer "unknown" sentinels to `None`.
///
/// Empty strings, `NOT_IMPLEMENTED` and dash placeholders such as `-:--:--`
/// are treated as absent.
pub fn parse_optional_hhmmss(value: Option<&str>) -> Option<u64> {
    let s = value?.trim();
    if s.is_empty() || s == "NOT_IMPLEMENTED" || s.contains('-') {
        return None;
    }
    parse_hhmmss(s).ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_hhmmss() {
        assert_eq!(format_hhmmss(0), "00:00:00");
        assert_eq!(format_hhmmss(61), "00:01:01");
        assert_eq!(format_hhmmss(86399), "23:59:59");
        assert_eq!(format_hhmmss(360000), "100:00:00");
    }

    #[test]
    fn test_parse_hhmmss() {
        assert_eq!(parse_hhmmss("00:00:00").unwrap(), 0);
        assert_eq!(parse_hhmmss("0:01:30").unwrap(), 90);
        assert_eq!(parse_hhmmss("123:00:01").unwrap(), 442801);
        assert_eq!(parse_hhmmss(" 00:03:45 ").unwrap(), 225);
        assert_eq!(parse_hhmmss("00:00:10.1/3").unwrap(), 10);

        assert!(parse_hhmmss("").is_err());
        assert!(parse_hhmmss("42").is_err());
        assert!(parse_hhmmss("00:60:00").is_err());
        assert!(parse_hhmmss("00:00:60").is_err());
        assert!(parse_hhmmss("aa:00:00").is_err());
        assert!(parse_hhmmss("-1:00:00").is_err());
    }

    #[test]
    fn test_parse_hhmmss_rejects_overflowing_hours() {
        assert!(matches!(
            parse_hhmmss("99999999999999999:00:00"),
            Err(ControlPointError::InvalidTimeFormat(_))
        ));
        assert!(parse_hhmmss("5124095576030431:00:00").is_ok());
        assert!(parse_hhmmss("5124095576030432:00:00").is_err());
        assert_eq!(parse_optional_hhmmss(Some("99999999999999999:00:00")), None);
    }

    #[test]
    fn test_parse_optional_hhmmss() {
        assert_eq!(parse_optional_hhmmss(Some("00:01:00")), Some(60));
        assert_eq!(parse_optional_hhmmss(Some("NOT_IMPLEMENTED")), None);
        assert_eq!(parse_optional_hhmmss(Some("-:--:--")), None);
        assert_eq!(parse_optional_hhmmss(Some("")), None);
        assert_eq!(parse_optional_hhmmss(None), None);
    }
}
