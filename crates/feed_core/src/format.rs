use chrono::{DateTime, Datelike, Utc};

/// Renders a timestamp as `1st January 2024 - 03:04 PM UTC`.
pub fn format_timestamp(timestamp: DateTime<Utc>) -> String {
    let day = timestamp.day();
    let suffix = match (day % 10, day) {
        (1, d) if d != 11 => "st",
        (2, d) if d != 12 => "nd",
        (3, d) if d != 13 => "rd",
        _ => "th",
    };
    format!("{day}{suffix} {}", timestamp.format("%B %Y - %I:%M %p UTC"))
}

/// Badge text for a delta signal, or `None` when nothing is new.
pub fn new_events_label(count: usize) -> Option<String> {
    match count {
        0 => None,
        1 => Some("+1 new event".to_string()),
        n => Some(format!("+{n} new events")),
    }
}

#[cfg(test)]
mod tests {
    use super::{format_timestamp, new_events_label};
    use chrono::{TimeZone, Utc};

    #[test]
    fn ordinal_suffixes() {
        let at = |day| Utc.with_ymd_and_hms(2024, 1, day, 15, 4, 0).unwrap();
        assert_eq!(format_timestamp(at(1)), "1st January 2024 - 03:04 PM UTC");
        assert_eq!(format_timestamp(at(2)), "2nd January 2024 - 03:04 PM UTC");
        assert_eq!(format_timestamp(at(3)), "3rd January 2024 - 03:04 PM UTC");
        assert_eq!(format_timestamp(at(11)), "11th January 2024 - 03:04 PM UTC");
        assert_eq!(format_timestamp(at(12)), "12th January 2024 - 03:04 PM UTC");
        assert_eq!(format_timestamp(at(13)), "13th January 2024 - 03:04 PM UTC");
        assert_eq!(format_timestamp(at(21)), "21st January 2024 - 03:04 PM UTC");
        assert_eq!(format_timestamp(at(22)), "22nd January 2024 - 03:04 PM UTC");
        assert_eq!(format_timestamp(at(30)), "30th January 2024 - 03:04 PM UTC");
    }

    #[test]
    fn morning_hours_use_am() {
        let ts = Utc.with_ymd_and_hms(2021, 4, 1, 9, 30, 0).unwrap();
        assert_eq!(format_timestamp(ts), "1st April 2021 - 09:30 AM UTC");
    }

    #[test]
    fn label_pluralizes() {
        assert_eq!(new_events_label(0), None);
        assert_eq!(new_events_label(1).as_deref(), Some("+1 new event"));
        assert_eq!(new_events_label(2).as_deref(), Some("+2 new events"));
    }
}
