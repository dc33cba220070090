//! Grafana-style time range tokens.
//!
//! A token is either one of a fixed set of relative expressions (`now-7d`,
//! `now-1d/d`, `now/M`, ...) or a unix timestamp in milliseconds. Relative
//! tokens with a `/unit` suffix snap to calendar boundaries: the start of a
//! range snaps to the first instant of the period, the end to its last
//! millisecond.
//!
//! ```
//! use chrono::{TimeZone, Utc};
//! use panelwatch_query::time_range::resolve_at;
//!
//! let now = Utc.with_ymd_and_hms(2024, 3, 14, 15, 9, 26).unwrap();
//! let start = resolve_at("now/M", true, now).unwrap();
//! assert_eq!(start, Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap());
//! ```

use chrono::{
    DateTime, Datelike, Local, LocalResult, Months, NaiveDate, NaiveDateTime, TimeDelta, TimeZone,
};
use thiserror::Error;

/// Errors resolving a time range token.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TimeRangeError {
    /// Not a known relative token and not a number.
    #[error("Invalid date token: {0}")]
    Invalid(String),

    /// The token resolved to an instant chrono cannot represent.
    #[error("Date out of range: {0}")]
    OutOfRange(String),
}

/// Calendar shift applied to "now".
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Shift {
    None,
    Minutes(i64),
    Hours(i64),
    Days(i64),
    Weeks(i64),
    Months(u32),
    Years(u32),
}

/// Calendar period a token snaps to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Alignment {
    /// Use the shifted instant as-is.
    None,
    /// Midnight to 23:59:59.999.
    Day,
    /// Sunday to Saturday.
    Week,
    /// First to last day of the month.
    Month,
    /// January 1st to December 31st.
    Year,
}

/// Day weeks begin on, counted from Sunday.
const WEEK_START: u32 = 0;

const RELATIVE_TOKENS: &[(&str, Shift, Alignment)] = &[
    ("now", Shift::None, Alignment::None),
    ("now-5m", Shift::Minutes(5), Alignment::None),
    ("now-15m", Shift::Minutes(15), Alignment::None),
    ("now-30m", Shift::Minutes(30), Alignment::None),
    ("now-1h", Shift::Hours(1), Alignment::None),
    ("now-3h", Shift::Hours(3), Alignment::None),
    ("now-6h", Shift::Hours(6), Alignment::None),
    ("now-12h", Shift::Hours(12), Alignment::None),
    ("now-24h", Shift::Hours(24), Alignment::None),
    ("now-2d", Shift::Days(2), Alignment::None),
    ("now-7d", Shift::Days(7), Alignment::None),
    ("now-30d", Shift::Days(30), Alignment::None),
    ("now-90d", Shift::Days(90), Alignment::None),
    ("now-6M", Shift::Months(6), Alignment::None),
    ("now-1y", Shift::Years(1), Alignment::None),
    ("now-2y", Shift::Years(2), Alignment::None),
    ("now-5y", Shift::Years(5), Alignment::None),
    ("now-1d/d", Shift::Days(1), Alignment::Day),
    ("now-2d/d", Shift::Days(2), Alignment::Day),
    ("now-7d/d", Shift::Days(7), Alignment::Day),
    ("now/d", Shift::None, Alignment::Day),
    ("now-1w/w", Shift::Weeks(1), Alignment::Week),
    ("now/w", Shift::None, Alignment::Week),
    ("now-1M/M", Shift::Months(1), Alignment::Month),
    ("now/M", Shift::None, Alignment::Month),
    ("now-1y/y", Shift::Years(1), Alignment::Year),
    ("now/y", Shift::None, Alignment::Year),
];

/// Returns true if `token` is one of the known relative expressions.
pub fn is_relative(token: &str) -> bool {
    RELATIVE_TOKENS.iter().any(|(t, _, _)| *t == token)
}

/// Resolve a token against the local clock.
pub fn resolve(token: &str, is_start: bool) -> Result<DateTime<Local>, TimeRangeError> {
    resolve_at(token, is_start, Local::now())
}

/// Resolve a token against a given "now".
///
/// Calendar shifts and boundaries are computed in `now`'s time zone.
pub fn resolve_at<Tz: TimeZone>(
    token: &str,
    is_start: bool,
    now: DateTime<Tz>,
) -> Result<DateTime<Tz>, TimeRangeError> {
    let Some((_, shift, align)) = RELATIVE_TOKENS.iter().find(|(t, _, _)| *t == token) else {
        return parse_epoch_millis(token, &now.timezone());
    };

    let out_of_range = || TimeRangeError::OutOfRange(token.to_string());
    let tz = now.timezone();

    // Sub-day shifts move the instant; longer ones move the wall clock.
    let shifted = match *shift {
        Shift::Minutes(n) => now.checked_sub_signed(TimeDelta::minutes(n)),
        Shift::Hours(n) => now.checked_sub_signed(TimeDelta::hours(n)),
        _ => shift_wall_clock(now.naive_local(), *shift).and_then(|n| localize(&tz, n)),
    }
    .ok_or_else(out_of_range)?;

    if *align == Alignment::None {
        return Ok(shifted);
    }

    let date = shifted.naive_local().date();
    let aligned = if is_start {
        period_start(date, *align).and_then(|d| d.and_hms_milli_opt(0, 0, 0, 0))
    } else {
        period_end(date, *align).and_then(|d| d.and_hms_milli_opt(23, 59, 59, 999))
    }
    .ok_or_else(out_of_range)?;

    localize(&tz, aligned).ok_or_else(out_of_range)
}

fn shift_wall_clock(naive: NaiveDateTime, shift: Shift) -> Option<NaiveDateTime> {
    match shift {
        Shift::None => Some(naive),
        Shift::Minutes(n) => naive.checked_sub_signed(TimeDelta::minutes(n)),
        Shift::Hours(n) => naive.checked_sub_signed(TimeDelta::hours(n)),
        Shift::Days(n) => naive.checked_sub_signed(TimeDelta::days(n)),
        Shift::Weeks(n) => naive.checked_sub_signed(TimeDelta::weeks(n)),
        Shift::Months(n) => naive.checked_sub_months(Months::new(n)),
        Shift::Years(n) => naive.checked_sub_months(Months::new(n.checked_mul(12)?)),
    }
}

fn period_start(date: NaiveDate, align: Alignment) -> Option<NaiveDate> {
    match align {
        Alignment::None | Alignment::Day => Some(date),
        Alignment::Week => {
            let back = (date.weekday().num_days_from_sunday() + 7 - WEEK_START) % 7;
            date.checked_sub_signed(TimeDelta::days(i64::from(back)))
        }
        Alignment::Month => date.with_day(1),
        Alignment::Year => NaiveDate::from_ymd_opt(date.year(), 1, 1),
    }
}

fn period_end(date: NaiveDate, align: Alignment) -> Option<NaiveDate> {
    match align {
        Alignment::None | Alignment::Day => Some(date),
        Alignment::Week => period_start(date, align)?.checked_add_signed(TimeDelta::days(6)),
        // Day zero of the next month
        Alignment::Month => date
            .with_day(1)?
            .checked_add_months(Months::new(1))?
            .pred_opt(),
        Alignment::Year => NaiveDate::from_ymd_opt(date.year(), 12, 31),
    }
}

/// Map a wall-clock time onto the zone, stepping over DST gaps.
fn localize<Tz: TimeZone>(tz: &Tz, naive: NaiveDateTime) -> Option<DateTime<Tz>> {
    match tz.from_local_datetime(&naive) {
        LocalResult::Single(dt) => Some(dt),
        LocalResult::Ambiguous(earliest, _) => Some(earliest),
        LocalResult::None => tz
            .from_local_datetime(&naive.checked_add_signed(TimeDelta::hours(1))?)
            .earliest(),
    }
}

fn parse_epoch_millis<Tz: TimeZone>(token: &str, tz: &Tz) -> Result<DateTime<Tz>, TimeRangeError> {
    let millis: f64 = token
        .trim()
        .parse()
        .map_err(|_| TimeRangeError::Invalid(token.to_string()))?;

    if !millis.is_finite() {
        return Err(TimeRangeError::Invalid(token.to_string()));
    }

    tz.timestamp_millis_opt(millis.trunc() as i64)
        .single()
        .ok_or_else(|| TimeRangeError::OutOfRange(token.to_string()))
}

/// A from/to pair of range tokens.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimeRange {
    /// Start token, e.g. `now-1h`.
    pub from: String,
    /// End token, e.g. `now`.
    pub to: String,
}

impl Default for TimeRange {
    fn default() -> Self {
        Self::new("now-5m", "now")
    }
}

impl TimeRange {
    /// Create a range from two tokens.
    pub fn new(from: impl Into<String>, to: impl Into<String>) -> Self {
        Self {
            from: from.into(),
            to: to.into(),
        }
    }

    /// Create an absolute range from two unix timestamps in milliseconds.
    pub fn absolute(from_ms: i64, to_ms: i64) -> Self {
        Self::new(from_ms.to_string(), to_ms.to_string())
    }

    /// Returns true when neither end refers to "now".
    pub fn is_absolute(&self) -> bool {
        !is_relative(&self.from) && !is_relative(&self.to)
    }

    /// Resolve both ends against `now`.
    pub fn resolve_at<Tz: TimeZone>(
        &self,
        now: DateTime<Tz>,
    ) -> Result<(DateTime<Tz>, DateTime<Tz>), TimeRangeError> {
        let start = resolve_at(&self.from, true, now.clone())?;
        let end = resolve_at(&self.to, false, now)?;
        Ok((start, end))
    }

    /// Resolve both ends to whole unix seconds.
    pub fn unix_seconds_at<Tz: TimeZone>(
        &self,
        now: DateTime<Tz>,
    ) -> Result<(i64, i64), TimeRangeError> {
        let (start, end) = self.resolve_at(now)?;
        Ok((round_seconds(&start), round_seconds(&end)))
    }
}

fn round_seconds<Tz: TimeZone>(dt: &DateTime<Tz>) -> i64 {
    (dt.timestamp_millis() as f64 / 1000.0).round() as i64
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{FixedOffset, Timelike, Utc};

    fn now() -> DateTime<Utc> {
        // Thursday
        Utc.with_ymd_and_hms(2024, 3, 14, 15, 9, 26).unwrap() + TimeDelta::milliseconds(535)
    }

    fn utc(y: i32, m: u32, d: u32, h: u32, min: u32, s: u32, ms: i64) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, h, min, s).unwrap() + TimeDelta::milliseconds(ms)
    }

    #[test]
    fn test_now() {
        assert_eq!(resolve_at("now", true, now()).unwrap(), now());
        assert_eq!(resolve_at("now", false, now()).unwrap(), now());
    }

    #[test]
    fn test_unaligned_ignores_range_end() {
        let expected = now() - TimeDelta::days(7);
        assert_eq!(resolve_at("now-7d", true, now()).unwrap(), expected);
        assert_eq!(resolve_at("now-7d", false, now()).unwrap(), expected);

        let hour_ago = now() - TimeDelta::hours(1);
        assert_eq!(resolve_at("now-1h", true, now()).unwrap(), hour_ago);
        assert_eq!(resolve_at("now-1h", false, now()).unwrap(), hour_ago);

        assert_eq!(
            resolve_at("now-30m", true, now()).unwrap(),
            now() - TimeDelta::minutes(30)
        );
    }

    #[test]
    fn test_yesterday() {
        assert_eq!(
            resolve_at("now-1d/d", true, now()).unwrap(),
            utc(2024, 3, 13, 0, 0, 0, 0)
        );
        assert_eq!(
            resolve_at("now-1d/d", false, now()).unwrap(),
            utc(2024, 3, 13, 23, 59, 59, 999)
        );
    }

    #[test]
    fn test_today() {
        assert_eq!(
            resolve_at("now/d", true, now()).unwrap(),
            utc(2024, 3, 14, 0, 0, 0, 0)
        );
        assert_eq!(
            resolve_at("now/d", false, now()).unwrap(),
            utc(2024, 3, 14, 23, 59, 59, 999)
        );
    }

    #[test]
    fn test_this_month() {
        assert_eq!(
            resolve_at("now/M", true, now()).unwrap(),
            utc(2024, 3, 1, 0, 0, 0, 0)
        );
        assert_eq!(
            resolve_at("now/M", false, now()).unwrap(),
            utc(2024, 3, 31, 23, 59, 59, 999)
        );
    }

    #[test]
    fn test_previous_month_in_leap_year() {
        assert_eq!(
            resolve_at("now-1M/M", true, now()).unwrap(),
            utc(2024, 2, 1, 0, 0, 0, 0)
        );
        assert_eq!(
            resolve_at("now-1M/M", false, now()).unwrap(),
            utc(2024, 2, 29, 23, 59, 59, 999)
        );
    }

    #[test]
    fn test_month_end_in_december() {
        let december = utc(2023, 12, 31, 8, 0, 0, 0);
        assert_eq!(
            resolve_at("now/M", false, december).unwrap(),
            utc(2023, 12, 31, 23, 59, 59, 999)
        );
    }

    #[test]
    fn test_weeks_start_on_sunday() {
        assert_eq!(
            resolve_at("now/w", true, now()).unwrap(),
            utc(2024, 3, 10, 0, 0, 0, 0)
        );
        assert_eq!(
            resolve_at("now/w", false, now()).unwrap(),
            utc(2024, 3, 16, 23, 59, 59, 999)
        );
        assert_eq!(
            resolve_at("now-1w/w", true, now()).unwrap(),
            utc(2024, 3, 3, 0, 0, 0, 0)
        );
        assert_eq!(
            resolve_at("now-1w/w", false, now()).unwrap(),
            utc(2024, 3, 9, 23, 59, 59, 999)
        );
    }

    #[test]
    fn test_week_on_a_sunday_is_that_sunday() {
        let sunday = utc(2024, 3, 10, 12, 0, 0, 0);
        assert_eq!(
            resolve_at("now/w", true, sunday).unwrap(),
            utc(2024, 3, 10, 0, 0, 0, 0)
        );
    }

    #[test]
    fn test_years() {
        assert_eq!(
            resolve_at("now/y", true, now()).unwrap(),
            utc(2024, 1, 1, 0, 0, 0, 0)
        );
        assert_eq!(
            resolve_at("now/y", false, now()).unwrap(),
            utc(2024, 12, 31, 23, 59, 59, 999)
        );
        assert_eq!(
            resolve_at("now-1y/y", true, now()).unwrap(),
            utc(2023, 1, 1, 0, 0, 0, 0)
        );
        assert_eq!(
            resolve_at("now-1y/y", false, now()).unwrap(),
            utc(2023, 12, 31, 23, 59, 59, 999)
        );
        assert_eq!(
            resolve_at("now-2y", true, now()).unwrap(),
            utc(2022, 3, 14, 15, 9, 26, 535)
        );
    }

    #[test]
    fn test_month_shift_clamps_to_month_end() {
        let end_of_august = utc(2024, 8, 31, 10, 0, 0, 0);
        assert_eq!(
            resolve_at("now-6M", true, end_of_august).unwrap(),
            utc(2024, 2, 29, 10, 0, 0, 0)
        );
    }

    #[test]
    fn test_alignment_uses_local_calendar() {
        // 23:30 UTC is already the 15th in UTC+2
        let tz = FixedOffset::east_opt(2 * 3600).unwrap();
        let now = tz.with_ymd_and_hms(2024, 3, 15, 1, 30, 0).unwrap();
        let start = resolve_at("now/d", true, now).unwrap();
        assert_eq!(start.day(), 15);
        assert_eq!(start.hour(), 0);
        assert_eq!(start.with_timezone(&Utc), utc(2024, 3, 14, 22, 0, 0, 0));
    }

    #[test]
    fn test_epoch_millis() {
        let dt = resolve_at("1700000000123", true, now()).unwrap();
        assert_eq!(dt.timestamp_millis(), 1_700_000_000_123);

        let fractional = resolve_at("1700000000123.9", false, now()).unwrap();
        assert_eq!(fractional.timestamp_millis(), 1_700_000_000_123);
    }

    #[test]
    fn test_invalid_tokens() {
        assert_eq!(
            resolve_at("yesterday", true, now()),
            Err(TimeRangeError::Invalid("yesterday".to_string()))
        );
        assert!(matches!(
            resolve_at("NaN", true, now()),
            Err(TimeRangeError::Invalid(_))
        ));
        // Unknown relative expressions are not guessed at
        assert!(resolve_at("now-4h", true, now()).is_err());
        assert!(matches!(
            resolve_at("1e300", true, now()),
            Err(TimeRangeError::OutOfRange(_))
        ));
    }

    #[test]
    fn test_time_range_seconds() {
        let range = TimeRange::new("now-1h", "now");
        let (start, end) = range.unix_seconds_at(now()).unwrap();
        assert_eq!(end - start, 3600);
        // .535 rounds up
        assert_eq!(end, now().timestamp() + 1);
        assert!(!range.is_absolute());
    }

    #[test]
    fn test_time_range_aligned_ends() {
        let range = TimeRange::new("now/M", "now/M");
        let (start, end) = range.resolve_at(now()).unwrap();
        assert_eq!(start, utc(2024, 3, 1, 0, 0, 0, 0));
        assert_eq!(end, utc(2024, 3, 31, 23, 59, 59, 999));
    }

    #[test]
    fn test_absolute_range() {
        let range = TimeRange::absolute(1_700_000_000_000, 1_700_003_600_000);
        assert!(range.is_absolute());
        assert_eq!(
            range.unix_seconds_at(now()).unwrap(),
            (1_700_000_000, 1_700_003_600)
        );
    }
}
