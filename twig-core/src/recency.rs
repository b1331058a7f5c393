//! Last-activity recency for branches
//!
//! A [`RecencyMark`] pairs a branch's last commit time with a short
//! "time ago" label such as `3d ago`. Labels are bucketed into years, months,
//! weeks, days, hours, minutes and seconds; the first bucket with a non-zero
//! count wins.

use std::cmp::Ordering;
use std::fmt;

use chrono::{DateTime, Datelike, FixedOffset, SecondsFormat, Utc};

const SECONDS_PER_MINUTE: i64 = 60;
const SECONDS_PER_HOUR: i64 = 60 * SECONDS_PER_MINUTE;
/// Seconds in one day, also used for the `max_days_old` cutoff
pub const SECONDS_PER_DAY: i64 = 24 * SECONDS_PER_HOUR;
const SECONDS_PER_WEEK: i64 = 7 * SECONDS_PER_DAY;
const SECONDS_PER_YEAR: i64 = 365 * SECONDS_PER_DAY;

/// Absolute part of the listing column. Fixed-width, zero-padded fields keep
/// lexicographic order equal to chronological order within one offset.
const DISPLAY_FORMAT: &str = "%Y-%m-%d %H:%M %z";

/// Source of the reference instant that labels are computed against
pub trait Clock {
    /// Current instant
    fn now(&self) -> DateTime<Utc>;
}

/// Wall clock
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Clock frozen at a single instant
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub DateTime<Utc>);

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}

/// Count of whole `unit`s in `elapsed`, rounded half-up.
///
/// Anything shorter than one unit counts as zero so that, for example,
/// six and a half days never rounds up to a week.
fn count_units(elapsed: i64, unit: i64) -> i64 {
    if elapsed < unit {
        0
    } else {
        (elapsed + unit / 2) / unit
    }
}

/// Difference in calendar months, ignoring the day of month
fn calendar_months_between(earlier: &DateTime<FixedOffset>, later: &DateTime<FixedOffset>) -> i64 {
    let months = |t: &DateTime<FixedOffset>| i64::from(t.year()) * 12 + i64::from(t.month());
    months(later) - months(earlier)
}

/// Format the time elapsed between `time` and `now` as a short label
///
/// Rules are evaluated in order and the first match wins:
/// years, then months (only once the rounded week count exceeds four),
/// weeks, days, hours, minutes, and finally raw seconds.
pub fn relative_label(time: &DateTime<FixedOffset>, now: DateTime<Utc>) -> String {
    // Commits dated in the future read as "0s ago"
    let elapsed = (now.timestamp() - time.timestamp()).max(0);

    let years = count_units(elapsed, SECONDS_PER_YEAR);
    if years > 0 {
        return format!("{years}y ago");
    }

    let local_now = now.with_timezone(time.offset());
    let months = calendar_months_between(time, &local_now);
    let weeks = count_units(elapsed, SECONDS_PER_WEEK);
    if months > 0 && weeks > 4 {
        return format!("{months}mo ago");
    }
    if weeks > 0 {
        return format!("{weeks}w ago");
    }

    let days = count_units(elapsed, SECONDS_PER_DAY);
    if days > 0 {
        return format!("{days}d ago");
    }

    let hours = count_units(elapsed, SECONDS_PER_HOUR);
    if hours > 0 {
        return format!("{hours}h ago");
    }

    let minutes = count_units(elapsed, SECONDS_PER_MINUTE);
    if minutes > 0 {
        return format!("{minutes}m ago");
    }

    format!("{elapsed}s ago")
}

/// A branch's last commit time together with its relative label
///
/// Marks compare by absolute time only; the label never takes part in
/// ordering or equality.
#[derive(Debug, Clone)]
pub struct RecencyMark {
    time: DateTime<FixedOffset>,
    relative: String,
}

impl RecencyMark {
    /// Derive a mark for `time`, labelled relative to `now`
    pub fn new(time: DateTime<FixedOffset>, now: DateTime<Utc>) -> Self {
        let relative = relative_label(&time, now);
        Self { time, relative }
    }

    /// Absolute time in its display offset
    pub fn time(&self) -> DateTime<FixedOffset> {
        self.time
    }

    /// Seconds since the Unix epoch
    pub fn timestamp(&self) -> i64 {
        self.time.timestamp()
    }

    /// Relative label, e.g. `2w ago`
    pub fn relative(&self) -> &str {
        &self.relative
    }

    /// ISO-8601 rendering of the absolute time
    pub fn iso8601(&self) -> String {
        self.time.to_rfc3339_opts(SecondsFormat::Secs, false)
    }
}

impl fmt::Display for RecencyMark {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.time.format(DISPLAY_FORMAT), self.relative)
    }
}

impl PartialEq for RecencyMark {
    fn eq(&self, other: &Self) -> bool {
        self.timestamp() == other.timestamp()
    }
}

impl Eq for RecencyMark {}

impl PartialOrd for RecencyMark {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for RecencyMark {
    fn cmp(&self, other: &Self) -> Ordering {
        self.timestamp().cmp(&other.timestamp())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 15, 12, 0, 0).unwrap()
    }

    fn ago(elapsed: Duration) -> String {
        let time = (now() - elapsed).fixed_offset();
        relative_label(&time, now())
    }

    #[test]
    fn test_seconds_below_one_minute() {
        assert_eq!(ago(Duration::zero()), "0s ago");
        assert_eq!(ago(Duration::seconds(30)), "30s ago");
        assert_eq!(ago(Duration::seconds(59)), "59s ago");
    }

    #[test]
    fn test_minutes_round_half_up() {
        assert_eq!(ago(Duration::seconds(60)), "1m ago");
        assert_eq!(ago(Duration::seconds(89)), "1m ago");
        assert_eq!(ago(Duration::seconds(90)), "2m ago");
    }

    #[test]
    fn test_hours_and_days() {
        assert_eq!(ago(Duration::hours(1)), "1h ago");
        assert_eq!(ago(Duration::hours(23)), "23h ago");
        assert_eq!(ago(Duration::days(1)), "1d ago");
        assert_eq!(ago(Duration::days(3) + Duration::hours(4)), "3d ago");
    }

    #[test]
    fn test_just_under_a_week_is_not_a_week() {
        let label = ago(Duration::days(6) + Duration::hours(23));
        assert_ne!(label, "1w ago");
        assert_eq!(label, "7d ago");
    }

    #[test]
    fn test_exactly_one_week() {
        assert_eq!(ago(Duration::days(7)), "1w ago");
    }

    #[test]
    fn test_month_difference_alone_does_not_select_months() {
        // 2024-05-31 12:00 to 2024-06-01 12:00 crosses a month boundary
        let time = Utc.with_ymd_and_hms(2024, 5, 31, 12, 0, 0).unwrap().fixed_offset();
        let now = Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap();
        assert_eq!(relative_label(&time, now), "1d ago");
    }

    #[test]
    fn test_four_weeks_and_a_day_stays_in_weeks() {
        // Rounded week count is 4, which does not exceed 4
        assert_eq!(ago(Duration::weeks(4) + Duration::days(1)), "4w ago");
    }

    #[test]
    fn test_months_once_weeks_exceed_four() {
        assert_eq!(ago(Duration::days(32)), "1mo ago");
        assert_eq!(ago(Duration::weeks(5)), "1mo ago");
        assert_eq!(ago(Duration::days(200)), "7mo ago");
        assert_eq!(ago(Duration::days(364)), "12mo ago");
    }

    #[test]
    fn test_years() {
        assert_eq!(ago(Duration::days(365)), "1y ago");
        assert_eq!(ago(Duration::days(547)), "1y ago");
        assert_eq!(ago(Duration::days(548)), "2y ago");
        assert_eq!(ago(Duration::days(365 * 10)), "10y ago");
    }

    #[test]
    fn test_unit_boundaries_hold_for_every_elapsed_duration() {
        for secs in [0, 1, 59, 60, 3_599, 86_399, 604_799, 31_535_999, 31_536_000, 40_000_000] {
            let label = ago(Duration::seconds(secs));
            assert_eq!(label.ends_with("y ago"), secs >= SECONDS_PER_YEAR, "{secs}: {label}");
            let is_seconds = label.ends_with("s ago");
            assert_eq!(is_seconds, secs < SECONDS_PER_MINUTE, "{secs}: {label}");
        }
    }

    #[test]
    fn test_future_commit_clamps_to_zero() {
        assert_eq!(ago(Duration::seconds(-120)), "0s ago");
    }

    #[test]
    fn test_display_uses_absolute_and_relative() {
        let offset = FixedOffset::east_opt(2 * 3600).unwrap();
        let time = offset.with_ymd_and_hms(2024, 6, 12, 9, 5, 0).unwrap();
        let mark = RecencyMark::new(time, now());

        assert_eq!(mark.relative(), "3d ago");
        assert_eq!(mark.to_string(), "2024-06-12 09:05 +0200 (3d ago)");
        assert_eq!(mark.iso8601(), "2024-06-12T09:05:00+02:00");
        assert_eq!(mark.timestamp(), time.timestamp());
    }

    #[test]
    fn test_marks_order_by_time_not_label() {
        let older = RecencyMark::new((now() - Duration::days(2)).fixed_offset(), now());
        let newer = RecencyMark::new((now() - Duration::hours(2)).fixed_offset(), now());
        assert!(older < newer);

        // Same instant labelled against different references is still equal
        let relabelled = RecencyMark::new(newer.time(), now() + Duration::days(30));
        assert_ne!(relabelled.relative(), newer.relative());
        assert_eq!(relabelled, newer);
    }

    #[test]
    fn test_fixed_clock() {
        let clock = FixedClock(now());
        assert_eq!(clock.now(), now());
    }
}
