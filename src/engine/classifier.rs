use chrono::{DateTime, Utc};

use crate::types::SponsoredEvent;

/// An event is a live opportunity while it is not withdrawn and its window
/// has not ended. Events whose window has not started yet still count.
pub fn is_active(event: &SponsoredEvent, now: DateTime<Utc>) -> bool {
    !event.withdrawn && event.end_time > now
}

#[cfg(test)]
mod tests {
    use chrono::Duration;

    use super::*;
    use crate::types::fixtures::{event, now};

    #[test]
    fn open_window_is_active() {
        assert!(is_active(&event("m1", "0xabc", 1.0), now()));
    }

    #[test]
    fn withdrawn_but_open_is_inactive() {
        let mut e = event("m1", "0xabc", 1.0);
        e.withdrawn = true;
        assert!(!is_active(&e, now()));
    }

    #[test]
    fn expired_but_not_withdrawn_is_inactive() {
        let mut e = event("m1", "0xabc", 1.0);
        e.end_time = now() - Duration::seconds(1);
        assert!(!is_active(&e, now()));
    }

    #[test]
    fn ending_exactly_now_is_inactive() {
        let mut e = event("m1", "0xabc", 1.0);
        e.end_time = now();
        assert!(!is_active(&e, now()));
    }

    #[test]
    fn not_yet_started_is_active() {
        let mut e = event("m1", "0xabc", 1.0);
        e.start_time = now() + Duration::days(2);
        e.end_time = now() + Duration::days(5);
        assert!(is_active(&e, now()));
    }
}
