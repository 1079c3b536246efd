// ── Expiration computation ──
//
// Pure function, no I/O: `now` is injected so callers (and tests) control
// the clock. Exactly one of the four precedence branches fires for any
// input combination; the final fallback expires immediately on purpose
// rather than silently skipping enforcement.

use chrono::{DateTime, Duration, NaiveTime, Utc};

/// Inputs to the expiration precedence chain.
#[derive(Debug, Clone, Default)]
pub struct ExpirationInputs {
    /// Manually supplied absolute expiration; always wins when present.
    pub manual_expires_at: Option<DateTime<Utc>>,
    /// Grace period in full days from now.
    pub grace_days: Option<u32>,
    /// Optional "HH:MM" time-of-day anchoring the grace period on the
    /// current date before the days are added.
    pub grace_time: Option<String>,
    /// The plan's billing cycle length in days.
    pub cycle_days: Option<u32>,
}

/// Compute the absolute expiration timestamp.
///
/// Precedence: manual timestamp, then grace days (with optional
/// time-of-day anchor), then plan cycle, then immediate expiration.
pub fn compute_expiration(now: DateTime<Utc>, inputs: &ExpirationInputs) -> DateTime<Utc> {
    if let Some(manual) = inputs.manual_expires_at {
        return manual;
    }

    if let Some(days) = inputs.grace_days {
        let anchor = inputs
            .grace_time
            .as_deref()
            .and_then(|t| NaiveTime::parse_from_str(t, "%H:%M").ok())
            .map_or(now, |time| now.date_naive().and_time(time).and_utc());
        return anchor + Duration::days(i64::from(days));
    }

    if let Some(cycle) = inputs.cycle_days {
        return now + Duration::days(i64::from(cycle));
    }

    now
}

/// Render the device's scheduler `start-date` format: lowercase
/// three-letter month, zero-padded day, four-digit year.
pub fn schedule_start_date(at: DateTime<Utc>) -> String {
    at.format("%b/%d/%Y").to_string().to_lowercase()
}

/// Render the scheduler `start-time` (HH:MM:SS).
pub fn schedule_start_time(at: DateTime<Utc>) -> String {
    at.format("%H:%M:%S").to_string()
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use chrono::TimeZone;
    use pretty_assertions::assert_eq;

    use super::*;

    fn fixed_now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 15, 9, 30, 0).unwrap()
    }

    #[test]
    fn manual_timestamp_always_wins() {
        let manual = Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap();
        let inputs = ExpirationInputs {
            manual_expires_at: Some(manual),
            grace_days: Some(3),
            grace_time: Some("14:00".into()),
            cycle_days: Some(30),
        };
        assert_eq!(compute_expiration(fixed_now(), &inputs), manual);
    }

    #[test]
    fn grace_time_sets_time_of_day_before_adding_days() {
        let inputs = ExpirationInputs {
            grace_days: Some(1),
            grace_time: Some("14:00".into()),
            ..ExpirationInputs::default()
        };
        let expected = Utc.with_ymd_and_hms(2024, 6, 16, 14, 0, 0).unwrap();
        assert_eq!(compute_expiration(fixed_now(), &inputs), expected);
    }

    #[test]
    fn grace_days_without_time_keeps_current_time_of_day() {
        let inputs = ExpirationInputs {
            grace_days: Some(2),
            ..ExpirationInputs::default()
        };
        let expected = Utc.with_ymd_and_hms(2024, 6, 17, 9, 30, 0).unwrap();
        assert_eq!(compute_expiration(fixed_now(), &inputs), expected);
    }

    #[test]
    fn unparseable_grace_time_falls_back_to_now() {
        let inputs = ExpirationInputs {
            grace_days: Some(1),
            grace_time: Some("not-a-time".into()),
            ..ExpirationInputs::default()
        };
        let expected = Utc.with_ymd_and_hms(2024, 6, 16, 9, 30, 0).unwrap();
        assert_eq!(compute_expiration(fixed_now(), &inputs), expected);
    }

    #[test]
    fn plan_cycle_applies_when_no_grace() {
        let inputs = ExpirationInputs {
            cycle_days: Some(30),
            ..ExpirationInputs::default()
        };
        let expected = Utc.with_ymd_and_hms(2024, 7, 15, 9, 30, 0).unwrap();
        assert_eq!(compute_expiration(fixed_now(), &inputs), expected);
    }

    #[test]
    fn no_inputs_expires_immediately() {
        let inputs = ExpirationInputs::default();
        assert_eq!(compute_expiration(fixed_now(), &inputs), fixed_now());
    }

    #[test]
    fn device_date_format() {
        let at = Utc.with_ymd_and_hms(2024, 6, 16, 14, 0, 5).unwrap();
        assert_eq!(schedule_start_date(at), "jun/16/2024");
        assert_eq!(schedule_start_time(at), "14:00:05");
    }
}
