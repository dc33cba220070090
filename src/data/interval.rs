use std::time::Duration;

/// Period used when a refresh string cannot be parsed.
pub const DEFAULT_REFRESH_SECS: u64 = 30;

/// Unit suffix to seconds multiplier
const UNITS: &[(char, u64)] = &[('s', 1), ('m', 60), ('h', 60 * 60), ('d', 24 * 60 * 60)];

/// Parse refresh strings like "30s", "5m", "2h", "1d" into seconds.
///
/// Anything without a known unit suffix, without a positive integer in
/// front of it, falls back to [`DEFAULT_REFRESH_SECS`].
pub fn parse_refresh_interval(s: &str) -> u64 {
    let s = s.trim().to_lowercase();

    let Some(unit) = s.chars().last() else {
        return DEFAULT_REFRESH_SECS;
    };
    let Some((_, multiplier)) = UNITS.iter().find(|(u, _)| *u == unit) else {
        return DEFAULT_REFRESH_SECS;
    };

    match s[..s.len() - unit.len_utf8()].trim().parse::<u64>() {
        Ok(n) if n > 0 => n.saturating_mul(*multiplier),
        _ => DEFAULT_REFRESH_SECS,
    }
}

/// The polling period for a refresh string.
pub fn refresh_period(s: &str) -> Duration {
    Duration::from_secs(parse_refresh_interval(s))
}

/// Format a period in seconds using the largest whole unit
pub fn format_interval(secs: u64) -> String {
    UNITS
        .iter()
        .rev()
        .find(|(_, m)| secs >= *m && secs % m == 0)
        .map(|(u, m)| format!("{}{}", secs / m, u))
        .unwrap_or_else(|| format!("{}s", secs))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_units() {
        assert_eq!(parse_refresh_interval("30s"), 30);
        assert_eq!(parse_refresh_interval("5m"), 300);
        assert_eq!(parse_refresh_interval("2h"), 7200);
        assert_eq!(parse_refresh_interval("1d"), 86400);
        assert_eq!(parse_refresh_interval("10S"), 10);
    }

    #[test]
    fn test_parse_malformed_falls_back() {
        assert_eq!(parse_refresh_interval("30"), DEFAULT_REFRESH_SECS);
        assert_eq!(parse_refresh_interval("5w"), DEFAULT_REFRESH_SECS);
        assert_eq!(parse_refresh_interval("xs"), DEFAULT_REFRESH_SECS);
        assert_eq!(parse_refresh_interval(""), DEFAULT_REFRESH_SECS);
        assert_eq!(parse_refresh_interval("0s"), DEFAULT_REFRESH_SECS);
        assert_eq!(parse_refresh_interval("5µ"), DEFAULT_REFRESH_SECS);
    }

    #[test]
    fn test_refresh_period() {
        assert_eq!(refresh_period("1m"), Duration::from_secs(60));
        assert_eq!(refresh_period("bogus"), Duration::from_secs(30));
    }

    #[test]
    fn test_format_interval() {
        assert_eq!(format_interval(30), "30s");
        assert_eq!(format_interval(300), "5m");
        assert_eq!(format_interval(90), "90s");
        assert_eq!(format_interval(86400), "1d");
    }
}
