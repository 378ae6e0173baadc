use alloc::format;
use alloc::string::String;
use alloc::vec::Vec;
use serde::{Deserialize, Serialize};

use crate::*;

/// What the result screen shows for the current session.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ResultView {
    /// Still playing or celebrating, nothing to show yet.
    Pending,
    Won {
        record: String,
        rank: Option<u32>,
        rank_loading: bool,
    },
    TimedOut,
}

impl ResultView {
    pub fn of(session: &GameSession) -> Self {
        match session.phase() {
            Phase::Won => Self::Won {
                record: session.record_string().unwrap_or_default(),
                rank: session.rank(),
                rank_loading: session.submission_state() == SubmissionState::Submitting,
            },
            Phase::TimedOut => Self::TimedOut,
            _ => Self::Pending,
        }
    }
}

/// Clear time as seconds with two decimals, e.g. `12.34`.
pub fn format_record(ms: u32) -> String {
    format!("{}.{:02}", ms / 1000, (ms % 1000) / 10)
}

/// Countdown display: `01:00` while the full minute is left, `SS.CC` otherwise.
pub fn format_countdown(ms: u32) -> String {
    if ms >= 60_000 {
        let total = ms / 1000;
        format!("{:02}:{:02}", total / 60, total % 60)
    } else {
        format!("{:02}.{:02}", ms / 1000, (ms % 1000) / 10)
    }
}

impl GameSession {
    pub fn record_string(&self) -> Option<String> {
        self.record_ms().map(format_record)
    }

    pub fn result_view(&self) -> ResultView {
        ResultView::of(self)
    }

    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            session: self.id().0,
            phase: self.phase(),
            remaining_ms: self.remaining_ms(),
            countdown: format_countdown(self.remaining_ms()),
            hint_remaining_ms: self.hint_remaining_ms(),
            hint_available: self.hint_available(),
            submission: self.submission_state(),
            board: self.board().ids().collect(),
            selected: self.selected(),
            record: self.record_string(),
            rank: self.rank(),
            retryable: self.failure().is_some_and(SubmissionError::is_transient),
            result: self.result_view(),
        }
    }
}

/// Everything the presentation layer reads, in one serializable value.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    pub session: u64,
    pub phase: Phase,
    pub remaining_ms: u32,
    pub countdown: String,
    pub hint_remaining_ms: u32,
    pub hint_available: bool,
    pub submission: SubmissionState,
    pub board: Vec<TileId>,
    pub selected: Option<usize>,
    pub record: Option<String>,
    pub rank: Option<u32>,
    /// The submission failed for a reason that a new game may not hit again.
    pub retryable: bool,
    pub result: ResultView,
}

#[cfg(test)]
mod tests {
    use super::*;
    use core::time::Duration;

    #[test]
    fn record_has_two_decimals() {
        assert_eq!(format_record(12_340), "12.34");
        assert_eq!(format_record(5_009), "5.00");
        assert_eq!(format_record(59_999), "59.99");
        assert_eq!(format_record(0), "0.00");
    }

    #[test]
    fn countdown_shows_minute_at_full_budget() {
        assert_eq!(format_countdown(60_000), "01:00");
        assert_eq!(format_countdown(59_990), "59.99");
        assert_eq!(format_countdown(7_050), "07.05");
        assert_eq!(format_countdown(0), "00.00");
    }

    #[test]
    fn pending_until_finished() {
        let session = GameSession::new(GameConfig::standard(), 3);
        assert_eq!(session.result_view(), ResultView::Pending);
        let snapshot = session.snapshot();
        assert_eq!(snapshot.phase, Phase::Loading);
        assert_eq!(snapshot.countdown, "01:00");
        assert_eq!(snapshot.board.len(), 16);
        assert!(snapshot.hint_available);
        assert!(!snapshot.retryable);
    }

    fn won_and_submitting() -> (GameSession, SubmissionTicket) {
        let t0 = Instant::now();
        let mut session = GameSession::with_generator(GameConfig::standard(), SolvedGenerator);
        session.mark_ready(t0);
        session.swap(0, 1, t0).unwrap();
        session.swap(0, 1, t0 + Duration::from_millis(4_000)).unwrap();
        let events = session.tick(t0 + Duration::from_millis(6_000));
        let Some(SessionEvent::Won { ticket }) = events.into_iter().next() else {
            panic!("session did not win");
        };
        (session, ticket)
    }

    #[test]
    fn server_failure_is_retryable() {
        let (mut session, ticket) = won_and_submitting();
        session.resolve_submission(ticket, Err(SubmissionError::Server { status: 503 }));
        assert!(session.snapshot().retryable);
    }

    #[test]
    fn rejected_record_is_not_retryable() {
        let (mut session, ticket) = won_and_submitting();
        let rejected = SubmissionError::Rejected {
            detail: "Invalid record time".into(),
        };
        session.resolve_submission(ticket, Err(rejected));
        let snapshot = session.snapshot();
        assert_eq!(snapshot.submission, SubmissionState::Failed);
        assert!(!snapshot.retryable);
    }
}
