use time::macros::format_description;
use time::{Date, Month};

use crate::error::Error;

/// Half-year an event falls in: January through June is spring.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Season {
    Spring,
    Fall,
}

impl Season {
    #[must_use]
    pub fn of(date: Date) -> Self {
        if u8::from(date.month()) <= 6 {
            Self::Spring
        } else {
            Self::Fall
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Spring => "Spring",
            Self::Fall => "Fall",
        }
    }
}

impl std::fmt::Display for Season {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Parse the date part of an ISO-8601 date or datetime (`2024-03-10`,
/// `2024-03-10T09:30:00Z`).
///
/// # Errors
///
/// Returns [`Error::InvalidDate`] if the input does not start with `YYYY-MM-DD`.
pub fn parse_event_date(value: &str) -> Result<Date, Error> {
    let day = value
        .get(..10)
        .ok_or_else(|| Error::InvalidDate(value.to_owned()))?;
    Date::parse(day, format_description!("[year]-[month]-[day]"))
        .map_err(|e| Error::InvalidDate(format!("{value}: {e}")))
}

/// Replace each whitespace run with one `_`, then drop anything outside
/// `[A-Za-z0-9_-]`. Edges are not trimmed: `" a "` becomes `"_a_"`.
#[must_use]
pub fn sanitize(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    let mut in_whitespace = false;
    for c in value.chars() {
        if c.is_whitespace() {
            if !in_whitespace {
                out.push('_');
            }
            in_whitespace = true;
            continue;
        }
        in_whitespace = false;
        if c.is_ascii_alphanumeric() || c == '_' || c == '-' {
            out.push(c);
        }
    }
    out
}

/// `{type}_{location}_{season}_{year}_{dd-mm-yyyy}.xlsx`
///
/// # Errors
///
/// Returns [`Error::InvalidDate`] if `date` is not an ISO date.
pub fn report_filename(event_type: &str, location: &str, date: &str) -> Result<String, Error> {
    let date = parse_event_date(date)?;
    Ok(format!(
        "{}_{}_{}_{}_{}.xlsx",
        sanitize(event_type),
        sanitize(location),
        Season::of(date),
        date.year(),
        day_month_year(date),
    ))
}

/// `SEED_Masterclass_{MonthName}_{Day}_{Year}.xlsx`
#[must_use]
pub fn masterclass_filename(date: Date) -> String {
    format!(
        "SEED_Masterclass_{}_{}_{}.xlsx",
        month_name(date.month()),
        date.day(),
        date.year(),
    )
}

fn day_month_year(date: Date) -> String {
    format!(
        "{:02}-{:02}-{:04}",
        date.day(),
        u8::from(date.month()),
        date.year()
    )
}

fn month_name(month: Month) -> &'static str {
    match month {
        Month::January => "January",
        Month::February => "February",
        Month::March => "March",
        Month::April => "April",
        Month::May => "May",
        Month::June => "June",
        Month::July => "July",
        Month::August => "August",
        Month::September => "September",
        Month::October => "October",
        Month::November => "November",
        Month::December => "December",
    }
}
