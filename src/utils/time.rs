// src/utils/time.rs

use std::sync::LazyLock;

use chrono::{DateTime, FixedOffset, Local, Offset};
use regex::{Captures, Regex};

static ELEMENT_TEXT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)(<[A-Za-z][A-Za-z0-9]*\b[^>]*>)([^<]*)").expect("valid element regex")
});

static ANSTIME_CLASS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"\bclass\s*=\s*["'][^"']*\banstime\b"#).expect("valid class regex")
});

static TIMESTAMP_ATTR: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"\bdata-timestamp\s*=\s*["']?(-?[0-9]+)"#).expect("valid timestamp regex")
});

/// The offset of the machine's local time zone right now.
pub fn local_offset() -> FixedOffset {
    Local::now().offset().fix()
}

/// Formats a unix timestamp (seconds) the way the answer listing shows it.
///
/// Zones east of UTC get day-first with a lower-case meridiem
/// (`19 Oct, 3:04:05 pm UTC+05:30`), everything else month-first
/// (`Oct 19, 3:04:05 PM UTC-07:00`).
pub fn format_answer_time(timestamp: i64, offset: FixedOffset) -> Option<String> {
    let utc = DateTime::from_timestamp(timestamp, 0)?;
    let local = utc.with_timezone(&offset);
    let zone = zone_name(offset);

    let formatted = if offset.local_minus_utc() > 0 {
        format!("{} {}", local.format("%-d %b, %-I:%M:%S %P"), zone)
    } else {
        format!("{} {}", local.format("%b %-d, %-I:%M:%S %p"), zone)
    };
    Some(formatted)
}

fn zone_name(offset: FixedOffset) -> String {
    let secs = offset.local_minus_utc();
    if secs == 0 {
        return "UTC".to_string();
    }
    let sign = if secs < 0 { '-' } else { '+' };
    let abs = secs.abs();
    format!("UTC{}{:02}:{:02}", sign, abs / 3600, (abs % 3600) / 60)
}

/// Rewrites the text of every `.anstime` element that carries a
/// `data-timestamp` into a readable local time. Other markup is untouched.
pub fn replace_answer_times(html: &str, offset: FixedOffset) -> String {
    ELEMENT_TEXT
        .replace_all(html, |caps: &Captures| {
            let open = &caps[1];
            if !ANSTIME_CLASS.is_match(open) {
                return caps[0].to_string();
            }
            let formatted = TIMESTAMP_ATTR
                .captures(open)
                .and_then(|ts| ts[1].parse::<i64>().ok())
                .and_then(|ts| format_answer_time(ts, offset));
            match formatted {
                Some(text) => format!("{}{}", open, text),
                None => caps[0].to_string(),
            }
        })
        .into_owned()
}
