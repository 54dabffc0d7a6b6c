// Calendar event expression parser
//
// Grammar, evaluated in order over whitespace-separated tokens:
// an optional leading weekday-spec (names and NAME..NAME ranges, comma
// separated), an optional trailing timezone token (bare UTC or an IANA
// zone name), and a single remaining time-spec (`minute`, `hour:minute`
// or `hour:minute:second`, each field built from `*`, `N`, `N..M`,
// `BASE/S` and comma lists). Anything left over is rejected.

use crate::errors::ParseError;
use crate::pattern::{FieldSpec, TimePattern, HOUR_MAX, MINUTE_MAX, SECOND_MAX};
use chrono_tz::Tz;
use lazy_static::lazy_static;
use std::collections::{BTreeSet, HashMap};

lazy_static! {
    /// Weekday names and abbreviations, Sunday = 0 through Saturday = 6.
    static ref WEEKDAY_NAMES: HashMap<&'static str, u8> = {
        let mut names = HashMap::new();
        for (value, forms) in [
            (0u8, ["sun", "sunday"]),
            (1, ["mon", "monday"]),
            (2, ["tue", "tuesday"]),
            (3, ["wed", "wednesday"]),
            (4, ["thu", "thursday"]),
            (5, ["fri", "friday"]),
            (6, ["sat", "saturday"]),
        ] {
            for form in forms {
                names.insert(form, value);
            }
        }
        names
    };
}

/// Parse a calendar event expression into a validated time pattern.
pub fn parse(expression: &str) -> Result<TimePattern, ParseError> {
    let trimmed = expression.trim();
    if trimmed.is_empty() {
        return Err(ParseError::EmptyExpression);
    }
    let mut tokens: Vec<&str> = trimmed.split_whitespace().collect();

    let weekdays = match tokens.first().and_then(|t| try_parse_weekday_spec(t)) {
        Some(parsed) => {
            tokens.remove(0);
            parsed?
        }
        None => FieldSpec::Any,
    };

    let timezone = match tokens.last().and_then(|t| try_parse_timezone(t)) {
        Some(tz) => {
            tokens.pop();
            Some(tz)
        }
        None => None,
    };

    let (hours, minutes, seconds) = match tokens.first() {
        Some(&token) if looks_like_time_spec(token) => {
            tokens.remove(0);
            parse_time_spec(token)?
        }
        // No time-spec: the event fires at midnight.
        _ => (
            FieldSpec::Values(vec![0]),
            FieldSpec::Values(vec![0]),
            FieldSpec::Values(vec![0]),
        ),
    };

    if !tokens.is_empty() {
        return Err(ParseError::UnusedParts(tokens.join(" ")));
    }

    Ok(TimePattern {
        seconds,
        minutes,
        hours,
        weekdays,
        timezone,
    })
}

fn weekday_value(name: &str) -> Option<u8> {
    WEEKDAY_NAMES.get(name.to_ascii_lowercase().as_str()).copied()
}

/// Returns `None` when the token is not composed of weekday names at all
/// (it then stays available for the other grammar rules); `Some(Err(_))`
/// when it is a weekday-spec with a rejected descending range.
fn try_parse_weekday_spec(token: &str) -> Option<Result<FieldSpec, ParseError>> {
    let mut days = BTreeSet::new();
    for item in token.split(',') {
        let (start, end) = match item.split_once("..") {
            Some((start, end)) => (start, end),
            None => (item, item),
        };
        let a = weekday_value(start)?;
        let mut b = weekday_value(end)?;
        if b < a {
            // The one sanctioned wrap: a range ending on Sunday reads as
            // running into the following week (Sunday as day 7).
            if b == 0 {
                b = 7;
            } else {
                return Some(Err(ParseError::WrongOrderInRange(item.to_string())));
            }
        }
        for day in a..=b {
            days.insert(day % 7);
        }
    }
    Some(Ok(FieldSpec::Values(days.into_iter().collect())))
}

// Besides bare UTC, only names containing '/' are considered timezone
// candidates. Slash-less aliases like GMT or Japan would be ambiguous
// against weekday and time tokens, so they are deliberately left to the
// leftover-token check.
fn try_parse_timezone(token: &str) -> Option<Tz> {
    if token.eq_ignore_ascii_case("utc") {
        return Some(Tz::UTC);
    }
    if token.contains('/') {
        return token.parse::<Tz>().ok();
    }
    None
}

// Any token with a ':' is claimed as a time-spec so its field errors
// surface instead of a generic leftover-token failure.
fn looks_like_time_spec(token: &str) -> bool {
    token.contains(':')
        || token
            .chars()
            .all(|c| c.is_ascii_digit() || matches!(c, '*' | ',' | '.' | '/'))
}

fn parse_time_spec(spec: &str) -> Result<(FieldSpec, FieldSpec, FieldSpec), ParseError> {
    let fields: Vec<&str> = spec.split(':').collect();
    match fields.as_slice() {
        // A single bare field is the minute; the hour stays open.
        [minute] => Ok((
            FieldSpec::Any,
            parse_numeric_field(minute, MINUTE_MAX)?,
            FieldSpec::Values(vec![0]),
        )),
        [hour, minute] => Ok((
            parse_numeric_field(hour, HOUR_MAX)?,
            parse_numeric_field(minute, MINUTE_MAX)?,
            FieldSpec::Values(vec![0]),
        )),
        [hour, minute, second] => Ok((
            parse_numeric_field(hour, HOUR_MAX)?,
            parse_numeric_field(minute, MINUTE_MAX)?,
            parse_numeric_field(second, SECOND_MAX)?,
        )),
        _ => Err(ParseError::InvalidTimeSpec(spec.to_string())),
    }
}

fn parse_numeric_field(text: &str, max: u8) -> Result<FieldSpec, ParseError> {
    let mut values = BTreeSet::new();
    for part in text.split(',') {
        if part == "*" {
            // A wildcard member absorbs the whole list.
            return Ok(FieldSpec::Any);
        }
        collect_numeric_item(part, max, &mut values)?;
    }
    if values.is_empty() {
        return Err(ParseError::InvalidTimeSpec(text.to_string()));
    }
    Ok(FieldSpec::Values(values.into_iter().collect()))
}

fn collect_numeric_item(
    item: &str,
    max: u8,
    values: &mut BTreeSet<u8>,
) -> Result<(), ParseError> {
    let (base, step) = match item.split_once('/') {
        Some((base, step_text)) => {
            let step = parse_number(step_text)?;
            if step < 1 || step > u32::from(max) {
                return Err(ParseError::RepetitionOutOfRange(step));
            }
            (base, Some(step))
        }
        None => (item, None),
    };

    let (start, end) = if base == "*" {
        (0, u32::from(max))
    } else if let Some((low_text, high_text)) = base.split_once("..") {
        let low = parse_number(low_text)?;
        let high = parse_number(high_text)?;
        if high < low {
            return Err(ParseError::WrongOrderInRange(base.to_string()));
        }
        if low > u32::from(max) {
            return Err(ParseError::RangeOutOfRange(low));
        }
        if high > u32::from(max) {
            return Err(ParseError::RangeOutOfRange(high));
        }
        (low, high)
    } else {
        let value = parse_number(base)?;
        if value > u32::from(max) {
            return Err(ParseError::ValueOutOfRange(value));
        }
        match step {
            // An open repetition runs to the end of the domain.
            Some(_) => (value, u32::from(max)),
            None => (value, value),
        }
    };

    let stride = step.unwrap_or(1);
    let mut value = start;
    while value <= end {
        values.insert(value as u8);
        value += stride;
    }
    Ok(())
}

fn parse_number(text: &str) -> Result<u32, ParseError> {
    text.parse::<u32>()
        .map_err(|_| ParseError::InvalidTimeSpec(text.to_string()))
}
