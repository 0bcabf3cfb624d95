use chrono::{DateTime, Duration, NaiveDate, Utc};

/// Time source injected into services so attempts can be stamped deterministically.
#[derive(Debug, Clone, Copy, Default)]
pub enum Clock {
    #[default]
    System,
    Fixed(DateTime<Utc>),
}

impl Clock {
    /// Returns a clock fixed at the given timestamp.
    #[must_use]
    pub fn fixed(at: DateTime<Utc>) -> Self {
        Self::Fixed(at)
    }

    /// Returns the current time according to the clock.
    #[must_use]
    pub fn now(&self) -> DateTime<Utc> {
        match self {
            Clock::System => Utc::now(),
            Clock::Fixed(t) => *t,
        }
    }

    /// Move a fixed clock forward. A system clock is left untouched.
    pub fn advance(&mut self, delta: Duration) {
        if let Clock::Fixed(t) = self {
            *t += delta;
        }
    }

    /// Wall time between `started_at` and now, clamped to zero for backdated starts.
    #[must_use]
    pub fn elapsed_since(&self, started_at: DateTime<Utc>) -> std::time::Duration {
        self.now()
            .signed_duration_since(started_at)
            .to_std()
            .unwrap_or_default()
    }
}

/// Calendar day of a timestamp in UTC; streaks are counted in whole days.
#[must_use]
pub fn utc_day(at: DateTime<Utc>) -> NaiveDate {
    at.date_naive()
}

/// Deterministic timestamp for tests and examples (2023-11-14T22:13:20Z).
pub const FIXED_TEST_TIMESTAMP: i64 = 1_700_000_000;

/// Returns a deterministic `DateTime<Utc>` for tests and doc examples.
///
/// # Panics
///
/// Panics if the fixed timestamp cannot be represented.
#[must_use]
pub fn fixed_now() -> DateTime<Utc> {
    DateTime::<Utc>::from_timestamp(FIXED_TEST_TIMESTAMP, 0)
        .expect("fixed timestamp should be valid")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fixed_clock_advances() {
        let mut clock = Clock::fixed(fixed_now());
        clock.advance(Duration::seconds(90));
        assert_eq!(clock.now(), fixed_now() + Duration::seconds(90));
    }

    #[test]
    fn elapsed_is_clamped_for_future_start() {
        let clock = Clock::fixed(fixed_now());
        let later = fixed_now() + Duration::minutes(5);
        assert_eq!(clock.elapsed_since(later), std::time::Duration::ZERO);
        assert_eq!(
            clock.elapsed_since(fixed_now() - Duration::seconds(12)),
            std::time::Duration::from_secs(12)
        );
    }
}
