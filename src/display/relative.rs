use chrono::{DateTime, FixedOffset, Utc};

const MS_PER_DAY: f64 = 86_400_000.0;

/// Days in 400 Gregorian years; months and years are derived from it.
const DAYS_PER_400_YEARS: f64 = 146_097.0;

pub(super) fn from_now(at: &DateTime<FixedOffset>, now: DateTime<Utc>) -> String {
    let delta_ms = (at.with_timezone(&Utc) - now).num_milliseconds();
    let phrase = humanize(delta_ms.unsigned_abs());

    if delta_ms > 0 {
        format!("{phrase} from now")
    } else {
        format!("{phrase} ago")
    }
}

/// Rounds every unit straight from `elapsed_ms` and picks the first threshold
/// that fits: 45 s, 45 min, 22 h, 26 days, 11 months.
fn humanize(elapsed_ms: u64) -> String {
    let ms = elapsed_ms as f64;
    let seconds = (ms / 1000.0).round();
    let minutes = (ms / 60_000.0).round();
    let hours = (ms / 3_600_000.0).round();
    let days = (ms / MS_PER_DAY).round();

    let total_days = ms / MS_PER_DAY;
    let months = (total_days * 4800.0 / DAYS_PER_400_YEARS).round();
    let years = (total_days * 400.0 / DAYS_PER_400_YEARS).round();

    match () {
        _ if seconds < 45.0 => "a few seconds".to_owned(),
        _ if minutes <= 1.0 => "a minute".to_owned(),
        _ if minutes < 45.0 => format!("{minutes} minutes"),
        _ if hours <= 1.0 => "an hour".to_owned(),
        _ if hours < 22.0 => format!("{hours} hours"),
        _ if days <= 1.0 => "a day".to_owned(),
        _ if days < 26.0 => format!("{days} days"),
        _ if months <= 1.0 => "a month".to_owned(),
        _ if months < 11.0 => format!("{months} months"),
        _ if years <= 1.0 => "a year".to_owned(),
        _ => format!("{years} years"),
    }
}
