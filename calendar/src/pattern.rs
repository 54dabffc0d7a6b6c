// Time pattern data model: per-component field constraints and the
// validated result of parsing a calendar event expression.

use crate::errors::ParseError;
use chrono_tz::Tz;
use serde::Serialize;
use std::fmt;
use std::str::FromStr;

/// Inclusive upper bounds of each component domain (all start at 0).
pub const SECOND_MAX: u8 = 59;
pub const MINUTE_MAX: u8 = 59;
pub const HOUR_MAX: u8 = 23;
pub const WEEKDAY_MAX: u8 = 6;

/// Weekday abbreviations indexed by output value, Sunday = 0.
pub const WEEKDAY_ABBREV: [&str; 7] = ["sun", "mon", "tue", "wed", "thu", "fri", "sat"];

/// Constraint on one calendar component: either every value in the
/// component's domain, or an explicit ascending value set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum FieldSpec {
    /// Wildcard: every valid value matches.
    Any,
    /// Explicit values, sorted ascending, deduplicated, never empty.
    Values(Vec<u8>),
}

impl FieldSpec {
    pub fn is_any(&self) -> bool {
        matches!(self, FieldSpec::Any)
    }

    /// Whether `value` satisfies this constraint.
    pub fn contains(&self, value: u8) -> bool {
        match self {
            FieldSpec::Any => true,
            FieldSpec::Values(values) => values.binary_search(&value).is_ok(),
        }
    }

    /// Smallest matching value (the domain minimum for a wildcard).
    pub fn first(&self) -> u8 {
        match self {
            FieldSpec::Any => 0,
            FieldSpec::Values(values) => values.first().copied().unwrap_or(0),
        }
    }

    /// Smallest matching value at or after `value`, or `None` when the
    /// component has to roll over because nothing matches up to `max`.
    pub fn next_from(&self, value: u8, max: u8) -> Option<u8> {
        match self {
            FieldSpec::Any => (value <= max).then_some(value),
            FieldSpec::Values(values) => {
                values.iter().copied().find(|&v| v >= value && v <= max)
            }
        }
    }

    fn check(&self, max: u8) -> Result<(), ParseError> {
        let values = match self {
            FieldSpec::Any => return Ok(()),
            FieldSpec::Values(values) => values,
        };
        if values.is_empty() {
            return Err(ParseError::InvalidTimeSpec("empty value set".to_string()));
        }
        for pair in values.windows(2) {
            if pair[1] <= pair[0] {
                return Err(ParseError::WrongOrderInRange(format!(
                    "{}..{}",
                    pair[0], pair[1]
                )));
            }
        }
        for &value in values {
            if value > max {
                return Err(ParseError::ValueOutOfRange(u32::from(value)));
            }
        }
        Ok(())
    }
}

impl fmt::Display for FieldSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldSpec::Any => f.write_str("*"),
            FieldSpec::Values(values) => {
                let rendered: Vec<String> = values.iter().map(|v| v.to_string()).collect();
                f.write_str(&rendered.join(","))
            }
        }
    }
}

/// A parsed, validated calendar event expression.
///
/// Immutable after construction; safe to share read-only across threads
/// and reuse for any number of occurrence searches.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TimePattern {
    pub seconds: FieldSpec,
    pub minutes: FieldSpec,
    pub hours: FieldSpec,
    /// Weekdays with Sunday = 0 through Saturday = 6.
    pub weekdays: FieldSpec,
    /// Evaluation zone from the expression's trailing timezone token.
    /// Absent means "evaluate in the caller's local civil time".
    pub timezone: Option<Tz>,
}

impl TimePattern {
    /// Whether the expression pinned evaluation to UTC.
    pub fn utc(&self) -> bool {
        self.timezone
            .is_some_and(|tz| tz == Tz::UTC || tz.name() == "Etc/UTC")
    }

    /// Re-check every structural invariant of an already-built pattern.
    /// Never fails for a parser-produced value.
    pub fn validate(&self) -> Result<(), ParseError> {
        self.seconds.check(SECOND_MAX)?;
        self.minutes.check(MINUTE_MAX)?;
        self.hours.check(HOUR_MAX)?;
        self.weekdays.check(WEEKDAY_MAX)
    }
}

impl FromStr for TimePattern {
    type Err = ParseError;

    fn from_str(expression: &str) -> Result<Self, Self::Err> {
        crate::parser::parse(expression)
    }
}

impl fmt::Display for TimePattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let FieldSpec::Values(days) = &self.weekdays {
            let names: Vec<&str> = days
                .iter()
                .map(|&d| WEEKDAY_ABBREV.get(usize::from(d)).copied().unwrap_or("?"))
                .collect();
            write!(f, "{} ", names.join(","))?;
        }
        write!(f, "{}:{}:{}", self.hours, self.minutes, self.seconds)?;
        if let Some(tz) = self.timezone {
            write!(f, " {}", tz.name())?;
        }
        Ok(())
    }
}
