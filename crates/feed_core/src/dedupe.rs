use std::collections::HashSet;

use crate::Event;

/// Drop repeated events, keeping the first occurrence of each identity key.
///
/// Relative order is preserved and the result never grows, so applying it
/// twice yields the same list as applying it once.
pub fn dedupe(mut events: Vec<Event>) -> Vec<Event> {
    let mut seen = HashSet::with_capacity(events.len());
    events.retain(|event| seen.insert(event.identity_key()));
    events
}

#[cfg(test)]
mod tests {
    use super::dedupe;
    use crate::{Event, EventType};
    use chrono::{TimeZone, Utc};

    fn event(message: &str, minute: u32) -> Event {
        Event::new(
            EventType::Push,
            "ada",
            message,
            Utc.with_ymd_and_hms(2024, 1, 1, 12, minute, 0).unwrap(),
        )
    }

    #[test]
    fn empty_input_stays_empty() {
        assert!(dedupe(Vec::new()).is_empty());
    }

    #[test]
    fn first_occurrence_wins_and_order_is_kept() {
        let a = event("a", 1);
        let b = event("b", 2);
        let a_again = event("a", 1);
        assert_eq!(dedupe(vec![a.clone(), b.clone(), a_again]), vec![a, b]);
    }

    #[test]
    fn distinct_events_pass_through() {
        let input = vec![event("a", 1), event("a", 2), event("b", 1)];
        assert_eq!(dedupe(input.clone()), input);
    }
}
