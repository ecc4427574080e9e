//! Time-gated session validity checks
//!
//! A check starts only when none is in flight and strictly more than the
//! configured interval has passed since the previous check started. An
//! unreachable API never logs the user out.

use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use std::time::Duration;

/// Source of the current time
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// Wall clock
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Asks the backend whether the current session is still valid
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SessionValidator: Send + Sync {
    /// `Ok(false)` when the session was rejected, `Err` when unreachable
    async fn validate_session(&self) -> Result<bool>;
}

/// Result of asking the guard for a check
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionOutcome {
    /// Interval not elapsed or another check still running
    Skipped,
    Valid,
    /// The user must be sent to the landing view
    Invalid,
    /// Network failure; the session is assumed valid
    Unreachable,
}

pub struct SessionGuard {
    interval: chrono::Duration,
    last_checked: Option<DateTime<Utc>>,
    in_flight: bool,
    clock: Arc<dyn Clock>,
}

impl SessionGuard {
    pub fn new(interval: Duration, clock: Arc<dyn Clock>) -> Self {
        Self {
            interval: chrono::Duration::from_std(interval)
                .unwrap_or_else(|_| chrono::Duration::seconds(60)),
            last_checked: None,
            in_flight: false,
            clock,
        }
    }

    #[cfg(test)]
    pub fn is_in_flight(&self) -> bool {
        self.in_flight
    }

    #[cfg(test)]
    pub fn last_checked(&self) -> Option<DateTime<Utc>> {
        self.last_checked
    }

    /// Forget the previous check so the next one runs immediately
    pub fn reset(&mut self) {
        self.last_checked = None;
    }

    /// Claim the next check; returns false when it must be skipped
    pub fn begin(&mut self) -> bool {
        if self.in_flight {
            return false;
        }
        let now = self.clock.now();
        if let Some(last) = self.last_checked {
            if now - last <= self.interval {
                return false;
            }
        }
        self.in_flight = true;
        self.last_checked = Some(now);
        true
    }

    /// Release the in-flight flag and classify the validator's answer
    pub fn finish(&mut self, result: Result<bool>) -> SessionOutcome {
        self.in_flight = false;
        match result {
            Ok(true) => SessionOutcome::Valid,
            Ok(false) => SessionOutcome::Invalid,
            Err(e) => {
                tracing::warn!("Session check failed: {:#}", e);
                SessionOutcome::Unreachable
            }
        }
    }

    /// Run a check if one is due
    pub async fn check(&mut self, validator: &dyn SessionValidator) -> SessionOutcome {
        if !self.begin() {
            return SessionOutcome::Skipped;
        }
        let result = validator.validate_session().await;
        self.finish(result)
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;
    use std::sync::Mutex;

    /// Clock advanced by hand
    pub struct ManualClock(Mutex<DateTime<Utc>>);

    impl ManualClock {
        pub fn new(start: DateTime<Utc>) -> Self {
            Self(Mutex::new(start))
        }

        pub fn advance(&self, secs: i64) {
            let mut now = self.0.lock().unwrap();
            *now += chrono::Duration::seconds(secs);
        }
    }

    impl Clock for ManualClock {
        fn now(&self) -> DateTime<Utc> {
            *self.0.lock().unwrap()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::testing::ManualClock;
    use super::*;
    use anyhow::anyhow;
    use chrono::TimeZone;

    fn guard() -> (SessionGuard, Arc<ManualClock>) {
        let clock = Arc::new(ManualClock::new(
            Utc.with_ymd_and_hms(2024, 5, 1, 8, 0, 0).unwrap(),
        ));
        let guard = SessionGuard::new(Duration::from_secs(60), clock.clone());
        (guard, clock)
    }

    fn validator(valid: bool, times: usize) -> MockSessionValidator {
        let mut mock = MockSessionValidator::new();
        mock.expect_validate_session()
            .times(times)
            .returning(move || Ok(valid));
        mock
    }

    mod gating {
        use super::*;

        #[tokio::test]
        async fn test_interval_gate() {
            let (mut guard, clock) = guard();
            let mock = validator(true, 2);

            assert_eq!(guard.check(&mock).await, SessionOutcome::Valid);
            clock.advance(30);
            assert_eq!(guard.check(&mock).await, SessionOutcome::Skipped);
            clock.advance(31);
            assert_eq!(guard.check(&mock).await, SessionOutcome::Valid);
        }

        #[test]
        fn test_exact_interval_is_skipped() {
            let (mut guard, clock) = guard();
            let mock = validator(true, 1);

            tokio_test::block_on(async {
                guard.check(&mock).await;
                clock.advance(60);
                assert_eq!(guard.check(&mock).await, SessionOutcome::Skipped);
            });
        }

        #[test]
        fn test_in_flight_blocks_second_check() {
            let (mut guard, clock) = guard();
            assert!(guard.begin());
            assert!(guard.is_in_flight());

            clock.advance(120);
            assert!(!guard.begin(), "a running check blocks new ones");

            guard.finish(Ok(true));
            assert!(!guard.is_in_flight());
            clock.advance(1);
            assert!(guard.begin());
        }

        #[test]
        fn test_reset_allows_immediate_check() {
            let (mut guard, _) = guard();
            assert!(guard.begin());
            guard.finish(Ok(false));
            assert!(!guard.begin());
            guard.reset();
            assert!(guard.begin());
        }

        #[test]
        fn test_last_checked_is_set_when_check_starts() {
            let (mut guard, clock) = guard();
            let start = clock.now();
            assert!(guard.begin());
            clock.advance(10);
            guard.finish(Ok(true));
            assert_eq!(guard.last_checked(), Some(start));
        }
    }

    mod outcomes {
        use super::*;

        #[tokio::test]
        async fn test_rejected_session_is_invalid() {
            let (mut guard, _) = guard();
            let mock = validator(false, 1);
            assert_eq!(guard.check(&mock).await, SessionOutcome::Invalid);
        }

        #[tokio::test]
        async fn test_network_failure_fails_open() {
            let (mut guard, _) = guard();
            let mut mock = MockSessionValidator::new();
            mock.expect_validate_session()
                .times(1)
                .returning(|| Err(anyhow!("connection refused")));

            assert_eq!(guard.check(&mock).await, SessionOutcome::Unreachable);
            assert!(!guard.is_in_flight());
        }
    }
}
