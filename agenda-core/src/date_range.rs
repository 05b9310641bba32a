//! Date window for listing events and itineraries.

use chrono::{DateTime, Datelike, Months, NaiveDate, Utc};

use crate::error::{AgendaError, AgendaResult};
use crate::request::format_instant;

/// Date range sent as `start`/`end` query parameters.
/// None values are omitted, letting the backend apply its default (the
/// current month).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DateRange {
    pub from: Option<DateTime<Utc>>,
    pub to: Option<DateTime<Utc>>,
}

impl DateRange {
    /// Parse CLI bounds.
    /// - `from`: YYYY-MM-DD, start of day
    /// - `to`: YYYY-MM-DD, end of day
    pub fn from_args(from: Option<&str>, to: Option<&str>) -> AgendaResult<Self> {
        let range = DateRange {
            from: from.map(parse_date_start).transpose()?,
            to: to.map(parse_date_end).transpose()?,
        };

        if let (Some(from), Some(to)) = (range.from, range.to) {
            if to < from {
                return Err(AgendaError::InvalidDate(
                    "--to must not be before --from".to_string(),
                ));
            }
        }

        Ok(range)
    }

    /// Whole calendar month given as YYYY-MM.
    pub fn month(s: &str) -> AgendaResult<Self> {
        let first = NaiveDate::parse_from_str(&format!("{}-01", s.trim()), "%Y-%m-%d")
            .map_err(|_| invalid(s, "YYYY-MM"))?;
        Ok(Self::month_of(first))
    }

    /// The month containing `date`.
    pub fn month_of(date: NaiveDate) -> Self {
        let first = date.with_day(1).unwrap_or(date);
        let next = first.checked_add_months(Months::new(1)).unwrap_or(first);

        DateRange {
            from: first.and_hms_opt(0, 0, 0).map(|d| d.and_utc()),
            to: next
                .and_hms_opt(0, 0, 0)
                .map(|d| d.and_utc() - chrono::Duration::seconds(1)),
        }
    }

    pub fn is_unbounded(&self) -> bool {
        self.from.is_none() && self.to.is_none()
    }

    /// Query parameters for the set bounds.
    pub fn query(&self) -> Vec<(&'static str, String)> {
        let mut params = Vec::new();
        if let Some(from) = self.from {
            params.push(("start", format_instant(from)));
        }
        if let Some(to) = self.to {
            params.push(("end", format_instant(to)));
        }
        params
    }
}

/// Parse YYYY-MM-DD as start of day in UTC
fn parse_date_start(s: &str) -> AgendaResult<DateTime<Utc>> {
    let date = NaiveDate::parse_from_str(s, "%Y-%m-%d").map_err(|_| invalid(s, "YYYY-MM-DD"))?;
    date.and_hms_opt(0, 0, 0)
        .map(|d| d.and_utc())
        .ok_or_else(|| invalid(s, "YYYY-MM-DD"))
}

/// Parse YYYY-MM-DD as end of day in UTC
fn parse_date_end(s: &str) -> AgendaResult<DateTime<Utc>> {
    let date = NaiveDate::parse_from_str(s, "%Y-%m-%d").map_err(|_| invalid(s, "YYYY-MM-DD"))?;
    date.and_hms_opt(23, 59, 59)
        .map(|d| d.and_utc())
        .ok_or_else(|| invalid(s, "YYYY-MM-DD"))
}

fn invalid(s: &str, expected: &str) -> AgendaError {
    AgendaError::InvalidDate(format!("'{}'. Expected {}", s, expected))
}
