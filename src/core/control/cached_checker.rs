use crate::interface::checker::{Checker, DefaultChecker};
use crate::interface::clock::Clock;
use crate::model::error::system::SystemError;
use chrono::{DateTime, TimeDelta, Utc};
use macros::log;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::oneshot;
use tokio::sync::oneshot::error::TryRecvError;
use tokio::time::timeout;

const CACHE_PERIOD_MS: i64 = 1000;
const ANSWER_WAIT_MS: u64 = 100;

/// Remembers the last answer of a checker for up to a second.
///
/// Checks run on their own task, one at a time. A check that does not answer
/// within `ANSWER_WAIT_MS` keeps running in the background while callers get
/// the last known answer.
pub struct CachedChecker {
    checker: Arc<dyn Checker>,
    clock: Arc<dyn Clock>,
    last: Option<(DateTime<Utc>, bool)>,
    pending: Option<(DateTime<Utc>, oneshot::Receiver<bool>)>,
}

impl CachedChecker {
    pub fn new(checker: Arc<dyn Checker>, clock: Arc<dyn Clock>) -> Self {
        Self {
            checker,
            clock,
            last: None,
            pending: None,
        }
    }

    pub async fn can_backup(&mut self) -> bool {
        self.collect();

        let now = self.clock.now();
        if let Some((polled_at, allowed)) = self.last {
            if now - polled_at <= TimeDelta::milliseconds(CACHE_PERIOD_MS) {
                return allowed;
            }
        }
        if self.pending.is_some() {
            return self.last_known();
        }

        let mut answer_rx = self.spawn_check();
        match timeout(Duration::from_millis(ANSWER_WAIT_MS), &mut answer_rx).await {
            Ok(Ok(allowed)) => self.last = Some((now, allowed)),
            Ok(Err(_)) => log!(SystemError::ThreadPanic {
                reason: "precondition check stopped without an answer".to_string()
            }),
            Err(_) => self.pending = Some((now, answer_rx)),
        }
        self.last_known()
    }

    /// The last answer without polling, `false` until the first one arrives.
    pub fn last_known(&self) -> bool {
        self.last.map(|(_, allowed)| allowed).unwrap_or(false)
    }

    fn spawn_check(&self) -> oneshot::Receiver<bool> {
        let (answer_tx, answer_rx) = oneshot::channel();
        let checker = self.checker.clone();
        tokio::spawn(async move {
            let allowed = match checker.can_backup().await {
                Ok(allowed) => allowed,
                Err(err) => {
                    log!(err);
                    DefaultChecker.can_backup().await.unwrap_or(true)
                }
            };
            let _ = answer_tx.send(allowed);
        });
        answer_rx
    }

    /// Takes the answer of a background check once it has arrived.
    fn collect(&mut self) {
        let Some((polled_at, answer_rx)) = self.pending.as_mut() else {
            return;
        };
        let polled_at = *polled_at;
        match answer_rx.try_recv() {
            Ok(allowed) => {
                self.last = Some((polled_at, allowed));
                self.pending = None;
            }
            Err(TryRecvError::Empty) => {}
            Err(TryRecvError::Closed) => {
                log!(SystemError::ThreadPanic {
                    reason: "precondition check stopped without an answer".to_string()
                });
                self.pending = None;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::testing::{at, CountingChecker, ManualClock};
    use tokio::time::{sleep, Instant};

    #[tokio::test]
    async fn answers_are_reused_within_a_second() {
        let clock = ManualClock::new(at(1_700_000_000));
        let checker = CountingChecker::new();
        let mut cached = CachedChecker::new(checker.clone(), clock.clone());

        checker.set_allowed(false);
        assert!(!cached.can_backup().await);
        checker.set_allowed(true);
        clock.advance(TimeDelta::milliseconds(900));
        assert!(!cached.can_backup().await);
        assert_eq!(checker.calls(), 1);

        clock.advance(TimeDelta::milliseconds(200));
        assert!(cached.can_backup().await);
        assert_eq!(checker.calls(), 2);
        assert!(cached.last_known());
    }

    #[tokio::test]
    async fn failing_checker_allows_backups() {
        let clock = ManualClock::new(at(1_700_000_000));
        let checker = CountingChecker::new();
        checker.set_allowed(false);
        checker.set_failing(true);
        let mut cached = CachedChecker::new(checker.clone(), clock.clone());

        assert!(cached.can_backup().await);
    }

    #[tokio::test]
    async fn slow_answers_arrive_in_the_background_one_at_a_time() {
        let clock = ManualClock::new(at(1_700_000_000));
        let checker = CountingChecker::new();
        checker.set_delay(Duration::from_millis(400));
        let mut cached = CachedChecker::new(checker.clone(), clock.clone());

        let started = Instant::now();
        assert!(!cached.can_backup().await);
        clock.advance_secs(5);
        assert!(!cached.can_backup().await);
        assert!(started.elapsed() < Duration::from_millis(400));
        assert_eq!(checker.calls(), 1);

        sleep(Duration::from_millis(500)).await;

        // The answer is from five seconds ago, so a fresh check starts behind it.
        assert!(cached.can_backup().await);
        assert_eq!(checker.calls(), 2);
    }
}
