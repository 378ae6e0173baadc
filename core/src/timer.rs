use core::time::Duration;
use serde::{Deserialize, Serialize};

use crate::*;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum TimerPoll {
    /// Timer is suspended or already expired, nothing changed.
    Idle,
    Ticking,
    /// Reached zero on this poll. Reported exactly once.
    Expired,
}

/// Countdown anchored to a deadline instead of to how often it gets polled.
///
/// While running only the deadline is authoritative, `remaining` is refreshed on
/// each poll. Suspending freezes `remaining`, resuming re-anchors a new deadline
/// from it, so time spent suspended is never charged.
///
/// A zero budget still runs: it expires on the first poll after `resume`.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Countdown {
    budget: Duration,
    remaining: Duration,
    deadline: Option<Instant>,
    expired: bool,
}

impl Countdown {
    pub fn new(budget: Duration) -> Self {
        Self {
            budget,
            remaining: budget,
            deadline: None,
            expired: false,
        }
    }

    pub fn budget(&self) -> Duration {
        self.budget
    }

    pub fn is_running(&self) -> bool {
        self.deadline.is_some()
    }

    /// Whether the expiry was already reported by [`Countdown::poll`].
    pub fn is_expired(&self) -> bool {
        self.expired
    }

    /// Instant the running timer reaches zero.
    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// Remaining time as of the last poll or suspension.
    pub fn remaining(&self) -> Duration {
        self.remaining
    }

    pub fn remaining_ms(&self) -> u32 {
        as_millis(self.remaining)
    }

    /// Budget minus remaining time.
    pub fn elapsed(&self) -> Duration {
        self.budget.saturating_sub(self.remaining)
    }

    pub fn resume(&mut self, now: Instant) {
        if self.deadline.is_none() && !self.is_expired() {
            self.deadline = Some(now + self.remaining);
        }
    }

    pub fn suspend(&mut self, now: Instant) {
        if let Some(deadline) = self.deadline.take() {
            self.remaining = deadline.saturating_duration_since(now);
        }
    }

    pub fn poll(&mut self, now: Instant) -> TimerPoll {
        let Some(deadline) = self.deadline else {
            return TimerPoll::Idle;
        };
        self.remaining = deadline.saturating_duration_since(now);
        if self.remaining.is_zero() {
            self.deadline = None;
            self.expired = true;
            TimerPoll::Expired
        } else {
            TimerPoll::Ticking
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const fn ms(millis: u64) -> Duration {
        Duration::from_millis(millis)
    }

    #[test]
    fn counts_down_from_deadline_regardless_of_poll_rate() {
        let t0 = Instant::now();
        let mut timer = Countdown::new(ms(1_000));
        timer.resume(t0);

        assert_eq!(timer.poll(t0 + ms(13)), TimerPoll::Ticking);
        assert_eq!(timer.remaining(), ms(987));
        // one very late poll lands on the same deadline
        assert_eq!(timer.poll(t0 + ms(600)), TimerPoll::Ticking);
        assert_eq!(timer.remaining(), ms(400));
    }

    #[test]
    fn expires_exactly_once() {
        let t0 = Instant::now();
        let mut timer = Countdown::new(ms(500));
        timer.resume(t0);

        assert_eq!(timer.poll(t0 + ms(800)), TimerPoll::Expired);
        assert_eq!(timer.remaining(), Duration::ZERO);
        assert!(!timer.is_running());
        assert_eq!(timer.poll(t0 + ms(900)), TimerPoll::Idle);

        timer.resume(t0 + ms(1_000));
        assert!(!timer.is_running());
    }

    #[test]
    fn suspended_time_is_not_charged() {
        let t0 = Instant::now();
        let mut timer = Countdown::new(ms(1_000));
        timer.resume(t0);
        timer.poll(t0 + ms(300));
        timer.suspend(t0 + ms(400));
        assert_eq!(timer.remaining(), ms(600));

        // suspended for 5 seconds
        assert_eq!(timer.poll(t0 + ms(5_400)), TimerPoll::Idle);
        timer.resume(t0 + ms(5_400));
        assert_eq!(timer.poll(t0 + ms(5_500)), TimerPoll::Ticking);
        assert_eq!(timer.remaining(), ms(500));
        assert_eq!(timer.elapsed(), ms(500));
    }

    #[test]
    fn resume_is_idempotent() {
        let t0 = Instant::now();
        let mut timer = Countdown::new(ms(1_000));
        timer.resume(t0);
        timer.resume(t0 + ms(500));
        assert_eq!(timer.poll(t0 + ms(1_000)), TimerPoll::Expired);
    }

    #[test]
    fn zero_budget_expires_on_first_poll() {
        let t0 = Instant::now();
        let mut timer = Countdown::new(Duration::ZERO);
        assert_eq!(timer.poll(t0), TimerPoll::Idle);

        timer.resume(t0);
        assert!(timer.is_running());
        assert_eq!(timer.poll(t0), TimerPoll::Expired);
        assert!(timer.is_expired());
        assert_eq!(timer.poll(t0 + ms(10)), TimerPoll::Idle);
    }

    #[test]
    fn suspended_at_deadline_expires_after_resume() {
        let t0 = Instant::now();
        let mut timer = Countdown::new(ms(100));
        timer.resume(t0);
        timer.suspend(t0 + ms(250));
        assert_eq!(timer.remaining(), Duration::ZERO);
        assert!(!timer.is_expired());

        timer.resume(t0 + ms(300));
        assert_eq!(timer.poll(t0 + ms(300)), TimerPoll::Expired);
    }
}
