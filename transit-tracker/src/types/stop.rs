/// Position of the vehicle relative to a single stop. Derived from the
/// simulation clock on every refresh, never persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StopProgress {
    #[default]
    Upcoming,
    Current,
    Passed,
}

impl StopProgress {
    /// Converts the `StopProgress` variant to its display label.
    pub fn as_str(&self) -> &str {
        match self {
            StopProgress::Upcoming => "upcoming",
            StopProgress::Current => "at stop",
            StopProgress::Passed => "passed",
        }
    }
}

/// A stop along a transit route, carrying its display schedule string and
/// the status derived from the simulation clock.
///
/// `delay_minutes` is `Some` exactly when the stop is delayed; the extra
/// minutes are simulated disruption telemetry, not schedule data.
#[derive(Debug, Clone, PartialEq)]
pub struct BusStop {
    pub id: String,
    pub name: String,
    pub scheduled: String,
    pub progress: StopProgress,
    pub delay_minutes: Option<u32>,
}

impl BusStop {
    /// Creates a stop with neutral derived status. `scheduled` is expected
    /// in the `"Today / H:MM"` shape; anything else leaves the stop out of
    /// live classification.
    pub fn new(id: &str, name: &str, scheduled: String) -> Self {
        BusStop {
            id: id.to_string(),
            name: name.to_string(),
            scheduled,
            progress: StopProgress::default(),
            delay_minutes: None,
        }
    }

    pub fn is_passed(&self) -> bool {
        self.progress == StopProgress::Passed
    }

    pub fn is_current(&self) -> bool {
        self.progress == StopProgress::Current
    }

    pub fn is_delayed(&self) -> bool {
        self.delay_minutes.is_some()
    }

    /// Whether the schedule string participates in time-based
    /// classification.
    pub fn has_valid_schedule(&self) -> bool {
        schedule_minutes(&self.scheduled).is_some()
    }
}

/// Parses a `"Today / H:MM"` schedule string into minutes since midnight.
///
/// Returns `None` for any string that does not match the shape exactly.
/// Unparseable schedules are a leniency case, not an error: the stop simply
/// stays out of time-based classification. The hour is not range-checked
/// because generated boards may run past midnight without wrapping.
pub fn schedule_minutes(scheduled: &str) -> Option<u32> {
    let clock = scheduled.strip_prefix("Today / ")?;
    let (hour, minute) = clock.split_once(':')?;
    let hour = parse_clock_field(hour)?;
    let minute = parse_clock_field(minute)?;
    hour.checked_mul(60)?.checked_add(minute)
}

fn parse_clock_field(field: &str) -> Option<u32> {
    if field.is_empty() || !field.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    field.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_stop_is_neutral() {
        let stop = BusStop::new("1", "Guéliz", "Today / 8:30".to_string());
        assert_eq!(stop.progress, StopProgress::Upcoming);
        assert!(!stop.is_passed());
        assert!(!stop.is_current());
        assert!(!stop.is_delayed());
        assert!(stop.has_valid_schedule());
    }

    #[test]
    fn garbage_schedule_is_flagged_invalid() {
        let stop = BusStop::new("1", "Guéliz", "garbage".to_string());
        assert!(!stop.has_valid_schedule());
    }

    #[test]
    fn progress_labels() {
        assert_eq!(StopProgress::Upcoming.as_str(), "upcoming");
        assert_eq!(StopProgress::Current.as_str(), "at stop");
        assert_eq!(StopProgress::Passed.as_str(), "passed");
    }

    #[test]
    fn schedule_minutes_accepts_exact_shape() {
        assert_eq!(schedule_minutes("Today / 8:30"), Some(8 * 60 + 30));
        assert_eq!(schedule_minutes("Today / 0:05"), Some(5));
        assert_eq!(schedule_minutes("Today / 23:59"), Some(23 * 60 + 59));
        // Generated boards can run past midnight without wrapping the hour.
        assert_eq!(schedule_minutes("Today / 24:05"), Some(24 * 60 + 5));
    }

    #[test]
    fn schedule_minutes_rejects_everything_else() {
        assert_eq!(schedule_minutes("garbage"), None);
        assert_eq!(schedule_minutes(""), None);
        assert_eq!(schedule_minutes("Today/8:30"), None);
        assert_eq!(schedule_minutes("today / 8:30"), None);
        assert_eq!(schedule_minutes("Today / 8.30"), None);
        assert_eq!(schedule_minutes("Today / :30"), None);
        assert_eq!(schedule_minutes("Today / 8:"), None);
        assert_eq!(schedule_minutes("Today / +8:30"), None);
        assert_eq!(schedule_minutes("Today / 8:3a"), None);
    }
}
