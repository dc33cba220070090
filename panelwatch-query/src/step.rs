//! Query resolution for a time window.
//!
//! The backend returns one sample per step, so wider windows get coarser
//! steps. All lengths are in seconds; months are 30 days and years are
//! 12 months.

const MINUTE: i64 = 60;
const HOUR: i64 = 60 * MINUTE;
const DAY: i64 = 24 * HOUR;
const MONTH: i64 = 30 * DAY;
const YEAR: i64 = 12 * MONTH;

/// `(longest window, step)` pairs, in ascending window order.
const STEPS: &[(i64, i64)] = &[
    (30 * MINUTE, 10),
    (HOUR, 20),
    (3 * HOUR, MINUTE),
    (6 * HOUR, 2 * MINUTE),
    (DAY, 8 * MINUTE),
    (2 * DAY, 16 * MINUTE),
    (4 * DAY, 32 * MINUTE),
    (7 * DAY, 56 * MINUTE),
    (15 * DAY, 2 * HOUR),
    (MONTH, 4 * HOUR),
    (3 * MONTH, 12 * HOUR),
    (6 * MONTH, DAY),
    (YEAR, 2 * DAY),
    (2 * YEAR, 4 * DAY),
    (5 * YEAR, 10 * DAY),
];

/// Step for windows longer than the last breakpoint.
const MAX_STEP: i64 = 30 * DAY;

/// Pick the step (seconds) for a query between two unix timestamps (seconds).
pub fn compute_step(start: i64, end: i64) -> i64 {
    let diff = end.saturating_sub(start);
    STEPS
        .iter()
        .find(|(window, _)| diff <= *window)
        .map(|(_, step)| *step)
        .unwrap_or(MAX_STEP)
}

#[cfg(test)]
mod tests {
    use super::*;

    const T: i64 = 1_700_000_000;

    #[test]
    fn test_short_windows() {
        assert_eq!(compute_step(T, T + 1800), 10);
        assert_eq!(compute_step(T, T + 1801), 20);
        assert_eq!(compute_step(T, T + 3600), 20);
        assert_eq!(compute_step(T, T + 9000), 60);
    }

    #[test]
    fn test_day_windows() {
        assert_eq!(compute_step(T, T + DAY), 8 * MINUTE);
        // 25 hours falls in the two-day bracket
        assert_eq!(compute_step(T, T + 90_000), 16 * MINUTE);
        assert_eq!(compute_step(T, T + 7 * DAY), 56 * MINUTE);
    }

    #[test]
    fn test_long_windows() {
        // 366 days is past the 360 day year
        assert_eq!(compute_step(T, T + 31_622_400), 345_600);
        assert_eq!(compute_step(T, T + 5 * YEAR), 10 * DAY);
        assert_eq!(compute_step(T, T + 5 * YEAR + 1), MAX_STEP);
    }

    #[test]
    fn test_inverted_window_uses_finest_step() {
        assert_eq!(compute_step(T, T - 100), 10);
        assert_eq!(compute_step(T, T), 10);
    }
}
