use std::fmt::Display;

use chrono::{DateTime, Local, TimeZone, Utc};

/// Truncate a string to a maximum number of characters, adding ellipsis if needed
pub fn truncate_string(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else if max_len <= 3 {
        s.chars().take(max_len).collect()
    } else {
        let truncated: String = s.chars().take(max_len - 3).collect();
        format!("{}...", truncated)
    }
}

/// Format an optional string, returning a default if None
pub fn format_optional(value: &Option<String>, default: &str) -> String {
    value.as_deref().unwrap_or(default).to_string()
}

/// Format a server timestamp in local time
pub fn format_timestamp(value: Option<&DateTime<Utc>>) -> String {
    match value {
        Some(dt) => format_in(dt, &Local),
        None => String::new(),
    }
}

fn format_in<Tz>(dt: &DateTime<Utc>, tz: &Tz) -> String
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    dt.with_timezone(tz).format("%b %d, %Y %H:%M").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_string() {
        assert_eq!(truncate_string("Hello", 10), "Hello");
        assert_eq!(truncate_string("Hello World", 8), "Hello...");
        assert_eq!(truncate_string("Hi", 2), "Hi");
        assert_eq!(truncate_string("héllo", 5), "héllo");
        assert_eq!(truncate_string("abcdef", 2), "ab");
    }

    #[test]
    fn test_format_optional() {
        assert_eq!(format_optional(&Some("she/her".to_string()), "Not set"), "she/her");
        assert_eq!(format_optional(&None, "Not set"), "Not set");
    }

    #[test]
    fn test_format_timestamp() {
        let dt = Utc.with_ymd_and_hms(2024, 3, 9, 14, 5, 0).unwrap();
        assert_eq!(format_in(&dt, &Utc), "Mar 09, 2024 14:05");
        assert_eq!(format_timestamp(None), "");
        assert!(!format_timestamp(Some(&dt)).is_empty());
    }
}
