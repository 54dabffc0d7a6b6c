// Property-based tests for the calendar event engine

use calendar::errors::ParseError;
use calendar::pattern::{FieldSpec, TimePattern, WEEKDAY_ABBREV};
use calendar::search::next_occurrence;
use chrono::{DateTime, Duration};
use chrono_tz::Tz;
use proptest::prelude::*;

fn expression_strategy() -> impl Strategy<Value = String> {
    let minute_field = prop_oneof![
        Just("*".to_string()),
        (0u8..60).prop_map(|m| m.to_string()),
        (0u8..30, 30u8..60).prop_map(|(a, b)| format!("{a}..{b}")),
        (1u8..30).prop_map(|s| format!("*/{s}")),
    ];
    let hour_field = prop_oneof![
        Just("*".to_string()),
        (0u8..24).prop_map(|h| h.to_string()),
        (1u8..12).prop_map(|s| format!("*/{s}")),
    ];
    let weekday = prop_oneof![
        Just(String::new()),
        (0usize..7).prop_map(|d| format!("{} ", WEEKDAY_ABBREV[d])),
        (0usize..7, 0usize..7)
            .prop_filter("ascending or ending on sunday", |(a, b)| b >= a || *b == 0)
            .prop_map(|(a, b)| format!("{}..{} ", WEEKDAY_ABBREV[a], WEEKDAY_ABBREV[b])),
    ];
    let zone = prop_oneof![
        Just(String::new()),
        Just(" UTC".to_string()),
        Just(" Europe/Berlin".to_string()),
    ];
    (weekday, hour_field, minute_field, zone)
        .prop_map(|(w, h, m, z)| format!("{w}{h}:{m}{z}"))
}

/// *For any* expression drawn from the grammar, parsing is deterministic
/// and the parsed pattern survives a display/reparse round trip.
#[test]
fn property_parse_round_trip_determinism() {
    proptest!(|(expression in expression_strategy())| {
        let first: TimePattern = expression.parse().unwrap();
        let second: TimePattern = expression.parse().unwrap();
        prop_assert_eq!(&first, &second);

        let reparsed: TimePattern = first.to_string().parse().unwrap();
        prop_assert_eq!(&first, &reparsed);
    });
}

/// *For any* parser-produced pattern, re-validating it raises no errors,
/// and every explicit field set is ascending and within its domain.
#[test]
fn property_idempotent_validation() {
    proptest!(|(expression in expression_strategy())| {
        let pattern: TimePattern = expression.parse().unwrap();
        prop_assert_eq!(pattern.validate(), Ok(()));
        if let FieldSpec::Values(values) = &pattern.minutes {
            prop_assert!(!values.is_empty());
            prop_assert!(values.windows(2).all(|p| p[0] < p[1]));
            prop_assert!(values.iter().all(|&v| v <= 59));
        }
    });
}

/// *For any* weekday pair A..B: ascending pairs yield the closed range,
/// descending pairs ending on Sunday wrap via Sunday-as-7, and every
/// other descending pair is rejected with the offending range text.
#[test]
fn property_weekday_wrap_rule() {
    proptest!(|(a in 0u8..7, b in 0u8..7)| {
        let range = format!(
            "{}..{}",
            WEEKDAY_ABBREV[usize::from(a)],
            WEEKDAY_ABBREV[usize::from(b)]
        );
        let result = range.parse::<TimePattern>();
        if b >= a {
            let expected: Vec<u8> = (a..=b).collect();
            prop_assert_eq!(result.unwrap().weekdays, FieldSpec::Values(expected));
        } else if b == 0 {
            let mut expected: Vec<u8> = vec![0];
            expected.extend(a..=6);
            prop_assert_eq!(result.unwrap().weekdays, FieldSpec::Values(expected));
        } else {
            prop_assert_eq!(result.unwrap_err(), ParseError::WrongOrderInRange(range));
        }
    });
}

/// *For any* pattern and reference instant, the next occurrence is
/// strictly later, and searching again from one second before it finds
/// the same instant.
#[test]
fn property_monotonic_search() {
    proptest!(|(
        expression in expression_strategy(),
        after_seconds in 0i64..2_000_000_000,
        zone in prop::sample::select(vec![Tz::UTC, Tz::Europe__Berlin, Tz::America__Sao_Paulo])
    )| {
        let pattern: TimePattern = expression.parse().unwrap();
        let after = DateTime::from_timestamp(after_seconds, 0).unwrap();

        let next = next_occurrence(&pattern, after, zone).unwrap();
        prop_assert!(next > after);

        // Rescan stability holds exactly in a gap-free zone; an occurrence
        // that was pushed forward over a skipped wall-clock range is not a
        // fixed point of the search.
        if pattern.timezone.unwrap_or(zone) == Tz::UTC {
            let rescan = next_occurrence(&pattern, next - Duration::seconds(1), zone).unwrap();
            prop_assert_eq!(rescan, next);
        }
    });
}

/// *For any* instant in the week around a DST fall-back transition, a
/// weekday-only pattern still terminates inside the iteration bound and
/// lands on a midnight of one of its weekdays.
#[test]
fn property_termination_under_dst() {
    proptest!(|(
        offset_seconds in 0i64..(14 * 86_400),
        expression in prop::sample::select(vec!["mon..fri", "sat..sun", "sun..sat", "tue"])
    )| {
        // 2018-10-21T00:00:00Z, the week before Europe/Berlin fell back.
        let base = DateTime::from_timestamp(1_540_080_000, 0).unwrap();
        let pattern: TimePattern = expression.parse().unwrap();

        let next = next_occurrence(&pattern, base + Duration::seconds(offset_seconds), Tz::Europe__Berlin).unwrap();
        prop_assert!(next > base + Duration::seconds(offset_seconds));

        let local = next.with_timezone(&Tz::Europe__Berlin);
        use chrono::{Datelike, Timelike};
        let weekday = local.weekday().num_days_from_sunday() as u8;
        prop_assert!(pattern.weekdays.contains(weekday));
        prop_assert_eq!((local.hour(), local.minute(), local.second()), (0, 0, 0));
    });
}
