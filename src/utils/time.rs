//! Fixed-offset time helpers.
//!
//! All deadline arithmetic happens in a constant +05:30 offset. There is no
//! timezone database lookup and no daylight-saving adjustment.

use chrono::{
    DateTime, Duration, FixedOffset, NaiveDate, NaiveDateTime, NaiveTime, SecondsFormat,
    TimeZone, Utc,
};

/// +05:30 in seconds east of UTC.
pub const IST_OFFSET_SECS: i32 = 5 * 3600 + 30 * 60;

/// Length of the escalation window ahead of "now".
pub const WARNING_WINDOW_HOURS: i64 = 24;

pub const NO_DUE_DATE: &str = "No due date";

/// Source of the current instant.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Clock pinned to a single instant.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub DateTime<Utc>);

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}

pub fn ist() -> FixedOffset {
    FixedOffset::east_opt(IST_OFFSET_SECS).expect("+05:30 is a valid offset")
}

pub fn current_instant(clock: &dyn Clock) -> DateTime<FixedOffset> {
    clock.now().with_timezone(&ist())
}

/// Parses a stored due date. Absent or unparseable input yields `None`.
pub fn parse_due(due_date: Option<&str>) -> Option<DateTime<FixedOffset>> {
    let raw = due_date?.trim();
    if raw.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&ist()));
    }

    for fmt in ["%Y-%m-%dT%H:%M:%S%.f%:z", "%Y-%m-%d %H:%M:%S%.f%:z", "%Y-%m-%dT%H:%M%:z"] {
        if let Ok(dt) = DateTime::parse_from_str(raw, fmt) {
            return Some(dt.with_timezone(&ist()));
        }
    }

    // No offset given: read the wall clock as +05:30.
    for fmt in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, fmt) {
            return ist().from_local_datetime(&naive).single();
        }
    }

    // A bare calendar date means the start of that day.
    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return ist().from_local_datetime(&date.and_hms_opt(0, 0, 0)?).single();
    }

    None
}

/// Signed hours from `now` to `due`; positive means the due date is ahead.
pub fn hours_until(due: DateTime<FixedOffset>, now: DateTime<FixedOffset>) -> f64 {
    (due - now).num_milliseconds() as f64 / 3_600_000.0
}

/// Open interval `(now, now + 24h)`.
pub fn in_warning_window(due: DateTime<FixedOffset>, now: DateTime<FixedOffset>) -> bool {
    let window_end = now + Duration::hours(WARNING_WINDOW_HOURS);
    now < due && due < window_end
}

pub fn format_due(due_date: Option<&str>) -> String {
    match due_date {
        None => NO_DUE_DATE.to_string(),
        Some(raw) if raw.trim().is_empty() => NO_DUE_DATE.to_string(),
        Some(raw) => match parse_due(Some(raw)) {
            Some(dt) => dt.format("%d/%m/%Y %H:%M").to_string(),
            None => raw.to_string(),
        },
    }
}

/// Combines a calendar date and wall-clock time into an ISO-8601 string at +05:30.
pub fn to_ist_timestamp(date: NaiveDate, time: NaiveTime) -> Option<String> {
    ist()
        .from_local_datetime(&date.and_time(time))
        .single()
        .map(|dt| dt.to_rfc3339_opts(SecondsFormat::Secs, false))
}
