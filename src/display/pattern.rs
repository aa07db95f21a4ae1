//! moment-style format patterns (`"MMMM D, YYYY h:mm A"`).

use chrono::{DateTime, Datelike, Days, FixedOffset, Timelike};

/// Long-date shorthands, expanded before token matching (English locale).
const LOCALE_FORMATS: [(&str, &str); 6] = [
    ("LLLL", "dddd, MMMM D, YYYY h:mm A"),
    ("LLL", "MMMM D, YYYY h:mm A"),
    ("LTS", "h:mm:ss A"),
    ("LL", "MMMM D, YYYY"),
    ("LT", "h:mm A"),
    ("L", "MM/DD/YYYY"),
];

/// Ordered so that the longest token sharing a prefix is tried first.
const TOKENS: [&str; 38] = [
    "YYYY", "YY", "MMMM", "MMM", "MM", "M", "Do", "DDDD", "DDD", "DD", "D", "dddd", "ddd", "d",
    "HH", "H", "hh", "h", "mm", "m", "ss", "s", "SSS", "A", "a", "ZZ", "Z", "X", "x", "Q", "E",
    "e", "kk", "k", "ww", "w", "WW", "W",
];

pub(super) fn render(at: &DateTime<FixedOffset>, pattern: &str) -> String {
    let mut out = String::with_capacity(pattern.len() * 2);
    let mut rest = pattern;

    while let Some(c) = rest.chars().next() {
        if c == '[' {
            if let Some(end) = rest.find(']') {
                out.push_str(&rest[1..end]);
                rest = &rest[end + 1..];
                continue;
            }
        }

        if let Some((token, expansion)) = LOCALE_FORMATS
            .iter()
            .find(|(token, _)| rest.starts_with(token))
        {
            out.push_str(&render(at, expansion));
            rest = &rest[token.len()..];
            continue;
        }

        if let Some(token) = TOKENS.iter().find(|token| rest.starts_with(*token)) {
            out.push_str(&token_value(at, token));
            rest = &rest[token.len()..];
            continue;
        }

        out.push(c);
        rest = &rest[c.len_utf8()..];
    }

    out
}

fn token_value(at: &DateTime<FixedOffset>, token: &str) -> String {
    let (pm, hour12) = at.hour12();
    match token {
        "YYYY" => format!("{:04}", at.year()),
        "YY" => format!("{:02}", at.year().rem_euclid(100)),
        "Q" => (at.month0() / 3 + 1).to_string(),
        "MMMM" => at.format("%B").to_string(),
        "MMM" => at.format("%b").to_string(),
        "MM" => format!("{:02}", at.month()),
        "M" => at.month().to_string(),
        "Do" => ordinal(at.day()),
        "DD" => format!("{:02}", at.day()),
        "D" => at.day().to_string(),
        "DDDD" => format!("{:03}", at.ordinal()),
        "DDD" => at.ordinal().to_string(),
        "dddd" => at.format("%A").to_string(),
        "ddd" => at.format("%a").to_string(),
        "d" | "e" => at.weekday().num_days_from_sunday().to_string(),
        "E" => at.weekday().number_from_monday().to_string(),
        "HH" => format!("{:02}", at.hour()),
        "H" => at.hour().to_string(),
        "hh" => format!("{hour12:02}"),
        "h" => hour12.to_string(),
        "kk" => format!("{:02}", hour_1_to_24(at.hour())),
        "k" => hour_1_to_24(at.hour()).to_string(),
        "mm" => format!("{:02}", at.minute()),
        "m" => at.minute().to_string(),
        "ss" => format!("{:02}", at.second()),
        "s" => at.second().to_string(),
        "SSS" => format!("{:03}", at.timestamp_subsec_millis()),
        "A" => String::from(if pm { "PM" } else { "AM" }),
        "a" => String::from(if pm { "pm" } else { "am" }),
        "Z" => at.format("%:z").to_string(),
        "ZZ" => at.format("%z").to_string(),
        "ww" => format!("{:02}", locale_week(at)),
        "w" => locale_week(at).to_string(),
        "WW" => format!("{:02}", at.iso_week().week()),
        "W" => at.iso_week().week().to_string(),
        "X" => at.timestamp().to_string(),
        "x" => at.timestamp_millis().to_string(),
        other => other.to_owned(),
    }
}

fn hour_1_to_24(hour: u32) -> u32 {
    if hour == 0 {
        24
    } else {
        hour
    }
}

/// Week of year with Sunday-first weeks, where week 1 holds January 1st.
/// Late-December days in that week count as week 1.
fn locale_week(at: &DateTime<FixedOffset>) -> u32 {
    let to_saturday = 6 - u64::from(at.weekday().num_days_from_sunday());
    at.date_naive()
        .checked_add_days(Days::new(to_saturday))
        .map_or(1, |saturday| saturday.ordinal0() / 7 + 1)
}

/// English ordinal: 1st, 2nd, 3rd, 4th, 11th, 21st...
fn ordinal(n: u32) -> String {
    let suffix = match (n % 10, n % 100) {
        (_, 11..=13) => "th",
        (1, _) => "st",
        (2, _) => "nd",
        (3, _) => "rd",
        _ => "th",
    };
    format!("{n}{suffix}")
}
