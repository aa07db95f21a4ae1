//! Template helpers that turn timestamps into display strings.
//!
//! Both helpers are plain functions: pass them to whatever renders the view
//! instead of registering them anywhere.
//!
//! ```
//! use chrono::{TimeZone, Utc};
//! use jeego::display::{format_absolute, DateFormatOptions};
//!
//! let at = Utc.with_ymd_and_hms(2021, 3, 15, 0, 0, 0).unwrap();
//! assert_eq!(format_absolute(&at, &DateFormatOptions::with_format("MMMM YYYY")), "March 2021");
//! ```

mod pattern;
mod relative;
mod timestamp;

use chrono::{DateTime, Utc};

pub use timestamp::{TimestampError, ToTimestamp};

/// Pattern used when no `format` option is given: `March 15, 2021 2:05 PM`.
pub const DEFAULT_FORMAT: &str = "LLL";

/// Placeholder rendered in place of a value that is not a valid timestamp.
pub const INVALID_DATE: &str = "Invalid date";

/// Options accepted by [`format_absolute`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DateFormatOptions<'a> {
    /// moment-style pattern, e.g. `"MMMM YYYY"`. Falls back to [`DEFAULT_FORMAT`].
    pub format: Option<&'a str>,
}

impl<'a> DateFormatOptions<'a> {
    pub fn with_format(format: &'a str) -> Self {
        Self {
            format: Some(format),
        }
    }
}

/// Render `value` as a calendar date/time.
///
/// Values carrying a UTC offset are rendered in that offset, everything else
/// in UTC. Anything that is not a timestamp renders as [`INVALID_DATE`].
pub fn format_absolute<T>(value: &T, options: &DateFormatOptions<'_>) -> String
where
    T: ToTimestamp + ?Sized,
{
    try_format_absolute(value, options).unwrap_or_else(|_| INVALID_DATE.to_owned())
}

/// Fallible variant of [`format_absolute`].
pub fn try_format_absolute<T>(
    value: &T,
    options: &DateFormatOptions<'_>,
) -> Result<String, TimestampError>
where
    T: ToTimestamp + ?Sized,
{
    let at = value.to_timestamp()?;
    Ok(pattern::render(&at, options.format.unwrap_or(DEFAULT_FORMAT)))
}

/// Render `value` relative to the current time, e.g. `"3 hours ago"`.
pub fn format_relative<T>(value: &T) -> String
where
    T: ToTimestamp + ?Sized,
{
    format_relative_to(value, Utc::now())
}

/// Render `value` relative to `now`.
pub fn format_relative_to<T>(value: &T, now: DateTime<Utc>) -> String
where
    T: ToTimestamp + ?Sized,
{
    try_format_relative_to(value, now).unwrap_or_else(|_| INVALID_DATE.to_owned())
}

/// Fallible variant of [`format_relative_to`].
pub fn try_format_relative_to<T>(value: &T, now: DateTime<Utc>) -> Result<String, TimestampError>
where
    T: ToTimestamp + ?Sized,
{
    let at = value.to_timestamp()?;
    Ok(relative::from_now(&at, now))
}
