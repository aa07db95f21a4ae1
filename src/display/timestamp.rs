use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, TimeZone};
use thiserror::Error;

/// Naive layouts tried, in order, after RFC 3339.
const NAIVE_LAYOUTS: [&str; 3] = ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M"];

#[derive(Debug, Error, PartialEq, Eq)]
pub enum TimestampError {
    #[error("no timestamp given")]
    Missing,

    #[error("unparseable timestamp: {0:?}")]
    Unparseable(String),

    #[error("epoch milliseconds out of range: {0}")]
    OutOfRange(i64),
}

/// Anything the display helpers know how to read as an instant.
pub trait ToTimestamp {
    fn to_timestamp(&self) -> Result<DateTime<FixedOffset>, TimestampError>;
}

impl<Tz: TimeZone> ToTimestamp for DateTime<Tz> {
    fn to_timestamp(&self) -> Result<DateTime<FixedOffset>, TimestampError> {
        Ok(self.fixed_offset())
    }
}

/// Naive values are taken as UTC.
impl ToTimestamp for NaiveDateTime {
    fn to_timestamp(&self) -> Result<DateTime<FixedOffset>, TimestampError> {
        Ok(self.and_utc().fixed_offset())
    }
}

/// Unix epoch milliseconds.
impl ToTimestamp for i64 {
    fn to_timestamp(&self) -> Result<DateTime<FixedOffset>, TimestampError> {
        DateTime::from_timestamp_millis(*self)
            .map(|at| at.fixed_offset())
            .ok_or(TimestampError::OutOfRange(*self))
    }
}

impl ToTimestamp for str {
    fn to_timestamp(&self) -> Result<DateTime<FixedOffset>, TimestampError> {
        let raw = self.trim();
        if raw.is_empty() {
            return Err(TimestampError::Missing);
        }

        if let Ok(at) = DateTime::parse_from_rfc3339(raw) {
            return Ok(at);
        }

        NAIVE_LAYOUTS
            .iter()
            .find_map(|layout| NaiveDateTime::parse_from_str(raw, layout).ok())
            .or_else(|| {
                NaiveDate::parse_from_str(raw, "%Y-%m-%d")
                    .ok()
                    .and_then(|date| date.and_hms_opt(0, 0, 0))
            })
            .map(|naive| naive.and_utc().fixed_offset())
            .ok_or_else(|| TimestampError::Unparseable(raw.to_owned()))
    }
}

impl ToTimestamp for String {
    fn to_timestamp(&self) -> Result<DateTime<FixedOffset>, TimestampError> {
        self.as_str().to_timestamp()
    }
}

impl<T: ToTimestamp> ToTimestamp for Option<T> {
    fn to_timestamp(&self) -> Result<DateTime<FixedOffset>, TimestampError> {
        self.as_ref()
            .ok_or(TimestampError::Missing)
            .and_then(ToTimestamp::to_timestamp)
    }
}

impl<T: ToTimestamp + ?Sized> ToTimestamp for &T {
    fn to_timestamp(&self) -> Result<DateTime<FixedOffset>, TimestampError> {
        (**self).to_timestamp()
    }
}
