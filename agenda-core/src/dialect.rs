//! Backend dialects.
//!
//! Two backend variants exist with different property naming and auth paths.
//! All naming differences live in this table; nothing else in the crate spells
//! out wire field names for time ranges or itinerary members.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Names of the start/end fields in one naming convention.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeFields {
    pub start: &'static str,
    pub end: &'static str,
}

const CAMEL: TimeFields = TimeFields {
    start: "startTime",
    end: "endTime",
};

const SNAKE: TimeFields = TimeFields {
    start: "start_time",
    end: "end_time",
};

const BARE: TimeFields = TimeFields {
    start: "start",
    end: "end",
};

/// Read-side precedence for start/end fields, shared by every dialect.
pub const TIME_FIELD_PRECEDENCE: [TimeFields; 3] = [CAMEL, SNAKE, BARE];

/// Read-side precedence for itinerary member lists.
pub const MEMBER_FIELD_PRECEDENCE: [&str; 3] = ["eventIds", "event_ids", "events"];

/// Which backend variant the client talks to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Dialect {
    /// camelCase properties, auth under `/auth`.
    #[default]
    Spring,
    /// snake_case properties, auth at the root, optional `{"data": ...}` envelopes.
    Laravel,
}

impl Dialect {
    /// Field names written when sending events and itineraries.
    pub fn time_fields(&self) -> TimeFields {
        match self {
            Dialect::Spring => CAMEL,
            Dialect::Laravel => SNAKE,
        }
    }

    /// Field name for the member list written when sending itineraries.
    pub fn event_ids_field(&self) -> &'static str {
        match self {
            Dialect::Spring => "eventIds",
            Dialect::Laravel => "event_ids",
        }
    }

    /// Path prefix of the register/login/logout endpoints.
    pub fn auth_prefix(&self) -> &'static str {
        match self {
            Dialect::Spring => "/auth",
            Dialect::Laravel => "",
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Dialect::Spring => "spring",
            Dialect::Laravel => "laravel",
        }
    }
}

impl FromStr for Dialect {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "spring" => Ok(Dialect::Spring),
            "laravel" => Ok(Dialect::Laravel),
            _ => Err(format!("Unknown backend dialect '{}'. Expected spring or laravel", s)),
        }
    }
}

impl fmt::Display for Dialect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn write_side_names_follow_the_dialect() {
        assert_eq!(Dialect::Spring.time_fields().start, "startTime");
        assert_eq!(Dialect::Laravel.time_fields().end, "end_time");
        assert_eq!(Dialect::Laravel.event_ids_field(), "event_ids");
        assert_eq!(Dialect::Spring.auth_prefix(), "/auth");
    }

    #[test]
    fn camel_case_wins_on_read() {
        assert_eq!(TIME_FIELD_PRECEDENCE[0].start, "startTime");
        assert_eq!(TIME_FIELD_PRECEDENCE[2].end, "end");
    }
}
