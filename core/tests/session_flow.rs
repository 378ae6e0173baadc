use core::time::Duration;

use sos_core::*;

const fn ms(millis: u64) -> Duration {
    Duration::from_millis(millis)
}

/// Running session whose board is solved by swapping slots 0 and 1.
fn one_swap_from_solved(t0: Instant) -> GameSession {
    let mut session = GameSession::with_generator(GameConfig::standard(), SolvedGenerator);
    session.mark_ready(t0);
    session.swap(0, 1, t0).unwrap();
    session
}

fn win(session: &mut GameSession, at: Instant) {
    assert_eq!(session.swap(0, 1, at), Ok(MoveOutcome::Solved));
}

#[test]
fn uninterrupted_countdown_times_out_exactly_once() {
    let t0 = Instant::now();
    let mut session = GameSession::new(GameConfig::standard(), 11);
    session.mark_ready(t0);

    let mut timeouts = 0;
    let mut now = t0;
    for _ in 0..6_200 {
        now += ms(10);
        timeouts += session
            .tick(now)
            .iter()
            .filter(|event| **event == SessionEvent::TimedOut)
            .count();
    }
    assert_eq!(timeouts, 1);
    assert_eq!(session.phase(), Phase::TimedOut);
    assert_eq!(session.remaining_ms(), 0);
    assert_eq!(session.result_view(), ResultView::TimedOut);
    assert_eq!(session.submission_state(), SubmissionState::NotSubmitted);
}

#[test]
fn late_single_tick_still_times_out() {
    let t0 = Instant::now();
    let mut session = GameSession::new(GameConfig::standard(), 11);
    session.mark_ready(t0);
    // a throttled background tab only ticks once, long after the deadline
    assert_eq!(session.tick(t0 + ms(95_000)), vec![SessionEvent::TimedOut]);
    assert_eq!(session.remaining_ms(), 0);
}

#[test]
fn hint_time_is_not_charged_to_the_countdown() {
    let t0 = Instant::now();
    let mut session = GameSession::new(GameConfig::standard(), 5);
    session.mark_ready(t0);
    session.tick(t0 + ms(20_000));
    assert_eq!(session.remaining_ms(), 40_000);

    session.activate_hint(t0 + ms(20_000)).unwrap();
    assert_eq!(session.phase(), Phase::HintActive);

    let mut now = t0 + ms(20_000);
    let mut ended = 0;
    for _ in 0..1_000 {
        now += ms(10);
        ended += session
            .tick(now)
            .iter()
            .filter(|event| **event == SessionEvent::HintEnded)
            .count();
        if session.phase() == Phase::HintActive {
            assert_eq!(session.remaining_ms(), 40_000);
        }
    }
    assert_eq!(ended, 1);
    assert_eq!(session.phase(), Phase::Running);
    assert_eq!(session.hint_remaining_ms(), 0);

    // 10 s of hint, then 10 s more of play
    session.tick(t0 + ms(40_000));
    assert_eq!(session.remaining_ms(), 30_000);
}

#[test]
fn second_hint_is_rejected() {
    let t0 = Instant::now();
    let mut session = GameSession::new(GameConfig::standard(), 5);
    session.mark_ready(t0);
    session.activate_hint(t0).unwrap();
    assert_eq!(
        session.activate_hint(t0 + ms(1_000)),
        Err(GameError::HintUnavailable)
    );
    session.tick(t0 + ms(10_000));
    assert_eq!(session.phase(), Phase::Running);
    assert_eq!(
        session.activate_hint(t0 + ms(11_000)),
        Err(GameError::HintUnavailable)
    );
    assert_eq!(session.phase(), Phase::Running);
}

#[test]
fn classic_hint_is_three_seconds() {
    let t0 = Instant::now();
    let mut session = GameSession::new(GameConfig::classic(), 5);
    session.mark_ready(t0);
    session.activate_hint(t0).unwrap();
    assert!(session.tick(t0 + ms(2_990)).is_empty());
    assert_eq!(session.tick(t0 + ms(3_000)), vec![SessionEvent::HintEnded]);
}

#[test]
fn solved_board_is_not_a_win_until_a_swap() {
    let t0 = Instant::now();
    let mut session = GameSession::with_generator(GameConfig::standard(), SolvedGenerator);
    session.mark_ready(t0);
    assert!(session.board().is_solved());
    assert!(session.tick(t0 + ms(1_000)).is_empty());
    assert_eq!(session.phase(), Phase::Running);

    // two swaps away and back, the second one wins
    assert_eq!(session.swap(3, 7, t0 + ms(2_000)), Ok(MoveOutcome::Swapped));
    assert_eq!(session.swap(7, 3, t0 + ms(3_000)), Ok(MoveOutcome::Solved));
    assert_eq!(session.phase(), Phase::Glowing);
}

#[test]
fn glow_then_exactly_one_submission() {
    let t0 = Instant::now();
    let mut session = one_swap_from_solved(t0);
    win(&mut session, t0 + ms(12_340));

    assert!(session.tick(t0 + ms(14_000)).is_empty());
    assert_eq!(session.phase(), Phase::Glowing);
    assert_eq!(session.submission_state(), SubmissionState::NotSubmitted);

    let events = session.tick(t0 + ms(14_340));
    let [SessionEvent::Won { ticket }] = events.as_slice() else {
        panic!("expected a single Won event, got {events:?}");
    };
    assert_eq!(ticket.clear_time_ms, 12_340);
    assert_eq!(ticket.session, session.id());
    assert_eq!(session.phase(), Phase::Won);
    assert_eq!(session.submission_state(), SubmissionState::Submitting);

    // later ticks and direct requests never hand out a second ticket
    assert!(session.tick(t0 + ms(14_350)).is_empty());
    assert!(session.tick(t0 + ms(14_360)).is_empty());
    assert_eq!(session.begin_submission(t0 + ms(14_370)), None);

    assert_eq!(
        session.result_view(),
        ResultView::Won {
            record: "12.34".into(),
            rank: None,
            rank_loading: true,
        }
    );

    let ticket = *ticket;
    assert_eq!(
        session.resolve_submission(ticket, Ok(3)),
        ResolveOutcome::Recorded { rank: 3 }
    );
    assert_eq!(session.submission_state(), SubmissionState::Submitted);
    assert_eq!(session.rank(), Some(3));
    assert_eq!(session.begin_submission(t0 + ms(15_000)), None);
    assert_eq!(
        session.resolve_submission(ticket, Ok(1)),
        ResolveOutcome::Stale
    );
    assert_eq!(session.rank(), Some(3));
}

#[test]
fn rejected_record_fails_with_one_notice() {
    let t0 = Instant::now();
    let mut session = one_swap_from_solved(t0);
    win(&mut session, t0 + ms(900));
    let Some(SessionEvent::Won { ticket }) = session.tick(t0 + ms(2_900)).pop() else {
        panic!("no submission ticket");
    };

    let rejection = SubmissionError::Rejected {
        detail: "Invalid record time".into(),
    };
    assert_eq!(
        session.resolve_submission(ticket, Err(rejection.clone())),
        ResolveOutcome::Failed {
            message: "Invalid record time".into()
        }
    );
    assert_eq!(session.submission_state(), SubmissionState::Failed);
    assert_eq!(session.rank(), None);
    assert_eq!(session.failure(), Some(&rejection));

    // a duplicate answer produces no second notice
    assert_eq!(
        session.resolve_submission(ticket, Err(rejection)),
        ResolveOutcome::Stale
    );
    assert!(session.tick(t0 + ms(30_000)).is_empty());
    assert_eq!(session.begin_submission(t0 + ms(30_000)), None);
}

#[test]
fn unanswered_submission_times_out() {
    let t0 = Instant::now();
    let mut session = one_swap_from_solved(t0);
    win(&mut session, t0 + ms(5_000));
    let Some(SessionEvent::Won { ticket }) = session.tick(t0 + ms(7_000)).pop() else {
        panic!("no submission ticket");
    };

    assert!(session.tick(t0 + ms(16_990)).is_empty());
    let events = session.tick(t0 + ms(17_000));
    assert!(matches!(
        events.as_slice(),
        [SessionEvent::SubmissionFailed { .. }]
    ));
    assert_eq!(session.submission_state(), SubmissionState::Failed);
    assert_eq!(session.failure(), Some(&SubmissionError::TimedOut));

    // the server answers after all, too late
    assert_eq!(
        session.resolve_submission(ticket, Ok(2)),
        ResolveOutcome::Stale
    );
    assert_eq!(session.rank(), None);
}

#[test]
fn result_for_reset_session_is_ignored() {
    let t0 = Instant::now();
    let mut session = one_swap_from_solved(t0);
    win(&mut session, t0 + ms(4_000));
    let Some(SessionEvent::Won { ticket }) = session.tick(t0 + ms(6_000)).pop() else {
        panic!("no submission ticket");
    };

    session.reset(77, t0 + ms(7_000));
    assert_eq!(session.phase(), Phase::Running);
    assert_eq!(session.submission_state(), SubmissionState::NotSubmitted);
    assert_ne!(session.id(), ticket.session);

    assert_eq!(
        session.resolve_submission(ticket, Ok(1)),
        ResolveOutcome::Stale
    );
    assert_eq!(session.rank(), None);
    assert_eq!(session.submission_state(), SubmissionState::NotSubmitted);
}

#[test]
fn win_and_timeout_at_the_same_instant_times_out() {
    let t0 = Instant::now();
    let mut session = one_swap_from_solved(t0);
    assert_eq!(session.swap(0, 1, t0 + ms(60_000)), Err(GameError::AlreadyEnded));
    assert_eq!(session.phase(), Phase::TimedOut);
    assert_eq!(session.record_ms(), None);
}

#[test]
fn win_just_before_deadline_stops_the_clock() {
    let t0 = Instant::now();
    let mut session = one_swap_from_solved(t0);
    win(&mut session, t0 + ms(59_990));
    assert!(session.tick(t0 + ms(61_000)).is_empty());
    assert_eq!(session.phase(), Phase::Glowing);
    assert_eq!(session.remaining_ms(), 10);
    assert_eq!(session.record_string().as_deref(), Some("59.99"));
}
