// Next-occurrence search: a carry-propagating scan over a civil-time
// cursor (weekday, then hour, minute, second), recomposed into an
// absolute instant in the pattern's effective timezone.

use crate::errors::SearchError;
use crate::pattern::{TimePattern, HOUR_MAX, MINUTE_MAX, SECOND_MAX};
use chrono::{DateTime, Datelike, Duration, LocalResult, NaiveDate, NaiveDateTime, TimeZone, Timelike, Utc};
use chrono_tz::Tz;

/// Upper bound on field-advance iterations for one search. Day advances
/// dominate the worst case, so this spans several decades of civil time
/// before the search reports exhaustion.
pub const MAX_FIELD_ADVANCES: u32 = 10_000;

/// Bound on the forward probe used to step over a wall-clock range that a
/// timezone transition skipped. Two days covers every historical jump,
/// including zones that skipped an entire calendar day.
const MAX_GAP_PROBE_MINUTES: u32 = 48 * 60;

/// Compute the next instant strictly after `after` that matches `pattern`.
///
/// `local_zone` supplies the civil-time rules when the expression carried
/// no timezone token; a timezone stored on the pattern overrides it. The
/// function is pure: it never consults ambient process state.
pub fn next_occurrence(
    pattern: &TimePattern,
    after: DateTime<Utc>,
    local_zone: Tz,
) -> Result<DateTime<Utc>, SearchError> {
    let zone = pattern.timezone.unwrap_or(local_zone);
    let start = (after + Duration::seconds(1)).with_timezone(&zone);

    let mut date = start.date_naive();
    let mut hour = start.hour() as u8;
    let mut minute = start.minute() as u8;
    let mut second = start.second() as u8;

    for _ in 0..MAX_FIELD_ADVANCES {
        let weekday = date.weekday().num_days_from_sunday() as u8;
        if !pattern.weekdays.contains(weekday) {
            date = next_day(date)?;
            hour = pattern.hours.first();
            minute = pattern.minutes.first();
            second = pattern.seconds.first();
            continue;
        }

        match pattern.hours.next_from(hour, HOUR_MAX) {
            Some(h) if h == hour => {}
            Some(h) => {
                hour = h;
                minute = pattern.minutes.first();
                second = pattern.seconds.first();
                continue;
            }
            None => {
                date = next_day(date)?;
                hour = pattern.hours.first();
                minute = pattern.minutes.first();
                second = pattern.seconds.first();
                continue;
            }
        }

        match pattern.minutes.next_from(minute, MINUTE_MAX) {
            Some(m) if m == minute => {}
            Some(m) => {
                minute = m;
                second = pattern.seconds.first();
                continue;
            }
            None => {
                hour += 1;
                minute = pattern.minutes.first();
                second = pattern.seconds.first();
                continue;
            }
        }

        match pattern.seconds.next_from(second, SECOND_MAX) {
            Some(s) if s == second => {}
            Some(s) => {
                second = s;
                continue;
            }
            None => {
                minute += 1;
                second = pattern.seconds.first();
                continue;
            }
        }

        // All fields match; recompose the cursor in the effective zone.
        let wall = match date.and_hms_opt(u32::from(hour), u32::from(minute), u32::from(second)) {
            Some(wall) => wall,
            None => {
                second = second.saturating_add(1);
                continue;
            }
        };
        let candidate = match zone.from_local_datetime(&wall) {
            LocalResult::Single(instant) => Some(instant),
            LocalResult::Ambiguous(first, fold) => {
                // A repeated wall time resolves to its first occurrence,
                // unless that instant is not strictly after the reference.
                if first.with_timezone(&Utc) > after {
                    Some(first)
                } else {
                    Some(fold)
                }
            }
            LocalResult::None => skip_transition_gap(zone, wall),
        };
        if let Some(candidate) = candidate {
            let resolved = candidate.with_timezone(&Utc);
            if resolved > after {
                return Ok(resolved);
            }
        }
        // The recomposed instant was unusable; keep moving forward in
        // civil time so the scan can never revisit an earlier state.
        second = second.saturating_add(1);
    }

    Err(SearchError::SearchExhausted(MAX_FIELD_ADVANCES))
}

fn next_day(date: NaiveDate) -> Result<NaiveDate, SearchError> {
    date.succ_opt()
        .ok_or(SearchError::SearchExhausted(MAX_FIELD_ADVANCES))
}

/// Push a wall-clock reading that the zone skipped forward to the first
/// reading that exists again, and return that instant.
fn skip_transition_gap(zone: Tz, wall: NaiveDateTime) -> Option<DateTime<Tz>> {
    let mut probe = wall;
    for _ in 0..MAX_GAP_PROBE_MINUTES {
        probe += Duration::minutes(1);
        match zone.from_local_datetime(&probe) {
            LocalResult::Single(instant) | LocalResult::Ambiguous(instant, _) => {
                return Some(instant)
            }
            LocalResult::None => {}
        }
    }
    None
}
