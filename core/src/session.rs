use alloc::string::String;
use alloc::vec::Vec;
use serde::{Deserialize, Serialize};

use crate::*;

/// Phase of a game session.
///
/// Valid transitions:
/// - Loading -> Running
/// - Running -> HintActive -> Running
/// - Running -> Glowing -> Won
/// - Running -> TimedOut
///
/// Won and TimedOut are final, only a reset starts over.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    #[default]
    Loading,
    Running,
    HintActive,
    Glowing,
    Won,
    TimedOut,
}

impl Phase {
    /// Board input is locked from the moment the puzzle is solved.
    pub const fn is_locked(self) -> bool {
        matches!(self, Self::Glowing | Self::Won | Self::TimedOut)
    }

    pub const fn as_str(self) -> &'static str {
        use Phase::*;
        match self {
            Loading => "loading",
            Running => "running",
            HintActive => "hint_active",
            Glowing => "glowing",
            Won => "won",
            TimedOut => "timed_out",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SessionEvent {
    TimedOut,
    HintEnded,
    /// Glow finished and the record is official. The ticket must be used for the
    /// one and only submission of this session.
    Won { ticket: SubmissionTicket },
    /// The outstanding submission was given up on, `message` is the notice to show.
    SubmissionFailed { message: String },
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum MoveOutcome {
    Selected(usize),
    Deselected,
    Swapped,
    /// The swap completed the picture.
    Solved,
    Ignored,
}

/// One attempt at the puzzle, from shuffle to final outcome.
///
/// Every operation takes the current instant, the session never reads a clock.
/// Events raised while handling a command (such as the countdown expiring right
/// when a tap comes in) are queued and returned by the next [`GameSession::tick`].
#[derive(Clone, Debug)]
pub struct GameSession {
    id: SessionId,
    config: GameConfig,
    board: Board,
    input: InputMode,
    phase: Phase,
    countdown: Countdown,
    hint: Countdown,
    hint_used: bool,
    glow_until: Option<Instant>,
    record_ms: Option<u32>,
    submission: SubmissionState,
    outstanding: Option<SubmissionTicket>,
    rank: Option<u32>,
    failure: Option<SubmissionError>,
    events: Vec<SessionEvent>,
}

impl GameSession {
    pub fn new(config: GameConfig, seed: u64) -> Self {
        Self::with_generator(config, ShuffleGenerator::new(seed))
    }

    pub fn with_generator(config: GameConfig, generator: impl BoardGenerator) -> Self {
        Self {
            id: SessionId(1),
            config,
            board: generator.generate(config),
            input: InputMode::default(),
            phase: Phase::Loading,
            countdown: Countdown::new(config.time_budget()),
            hint: Countdown::new(config.hint_budget()),
            hint_used: false,
            glow_until: None,
            record_ms: None,
            submission: SubmissionState::NotSubmitted,
            outstanding: None,
            rank: None,
            failure: None,
            events: Vec::new(),
        }
    }

    pub fn with_input(mut self, input: InputMode) -> Self {
        self.input = input;
        self
    }

    pub fn id(&self) -> SessionId {
        self.id
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn selected(&self) -> Option<usize> {
        self.input.selected()
    }

    pub fn remaining_ms(&self) -> u32 {
        self.countdown.remaining_ms()
    }

    pub fn hint_remaining_ms(&self) -> u32 {
        self.hint.remaining_ms()
    }

    pub fn hint_available(&self) -> bool {
        !self.hint_used && !self.phase.is_locked()
    }

    pub fn submission_state(&self) -> SubmissionState {
        self.submission
    }

    /// Clear time frozen when the solved board was detected.
    pub fn record_ms(&self) -> Option<u32> {
        self.record_ms
    }

    pub fn rank(&self) -> Option<u32> {
        self.rank
    }

    pub fn failure(&self) -> Option<&SubmissionError> {
        self.failure.as_ref()
    }

    /// Whether anything in the session still changes with time.
    pub fn needs_ticks(&self) -> bool {
        matches!(
            self.phase,
            Phase::Running | Phase::HintActive | Phase::Glowing
        ) || self.submission == SubmissionState::Submitting
            || !self.events.is_empty()
    }

    /// Starts a fresh attempt with a new board and a new session identity.
    ///
    /// A session that was past loading starts running right away, the puzzle image
    /// is already there.
    pub fn reset(&mut self, seed: u64, now: Instant) {
        let ready = self.phase != Phase::Loading;
        let next_id = self.id.next();
        let input = match self.input {
            InputMode::Tap(_) => InputMode::tap(),
            InputMode::Drag(_) => InputMode::drag(),
        };
        *self = Self::new(self.config, seed).with_input(input);
        self.id = next_id;
        log::debug!("Session {:?} reset", self.id);
        if ready {
            self.mark_ready(now);
        }
    }

    /// The puzzle image and board are ready, start the clock.
    pub fn mark_ready(&mut self, now: Instant) {
        if self.phase == Phase::Loading {
            self.phase = Phase::Running;
            self.countdown.resume(now);
            log::debug!("Session {:?} running", self.id);
        }
    }

    /// Replaces the board with a new random arrangement.
    pub fn shuffle(&mut self, seed: u64, now: Instant) -> Result<()> {
        self.poll_hint(now);
        self.poll_countdown(now);
        match self.phase {
            Phase::Loading | Phase::Running => {}
            Phase::HintActive => return Err(GameError::HintActive),
            Phase::Glowing | Phase::Won | Phase::TimedOut => return Err(GameError::AlreadyEnded),
        }
        self.board = ShuffleGenerator::new(seed).generate(self.config);
        self.input.clear();
        Ok(())
    }

    /// Press on a tile. With tap input this is the whole gesture.
    pub fn select_tile(&mut self, index: usize, now: Instant) -> Result<MoveOutcome> {
        let index = self.check_move(index, now)?;
        let gesture = self.input.press(index);
        self.apply_gesture(gesture, now)
    }

    /// Release over a tile. Only drag input reacts to this.
    pub fn release_tile(&mut self, index: usize, now: Instant) -> Result<MoveOutcome> {
        let index = self.check_move(index, now)?;
        let gesture = self.input.release(index);
        self.apply_gesture(gesture, now)
    }

    /// Exchanges two slots directly, bypassing the input binding.
    ///
    /// Dropping a tile back on its own slot moves nothing and is not a swap.
    pub fn swap(&mut self, from: usize, to: usize, now: Instant) -> Result<MoveOutcome> {
        self.check_move(from, now)?;
        let to = self.board.validate_index(to)?;
        self.input.clear();
        if from == to {
            return Ok(MoveOutcome::Deselected);
        }
        self.apply_swap(SwapRequest { from, to }, now)
    }

    pub fn activate_hint(&mut self, now: Instant) -> Result<()> {
        self.poll_hint(now);
        self.poll_countdown(now);
        match self.phase {
            Phase::Loading => return Err(GameError::NotStarted),
            Phase::Running => {}
            Phase::HintActive => return Err(GameError::HintUnavailable),
            Phase::Glowing | Phase::Won | Phase::TimedOut => return Err(GameError::AlreadyEnded),
        }
        if self.hint_used {
            return Err(GameError::HintUnavailable);
        }
        self.hint_used = true;
        self.countdown.suspend(now);
        self.hint.resume(now);
        self.input.clear();
        self.phase = Phase::HintActive;
        log::debug!(
            "Hint shown with {} ms left on the clock",
            self.countdown.remaining_ms()
        );
        Ok(())
    }

    /// Closes the hint before it runs out. Returns whether a hint was showing.
    pub fn dismiss_hint(&mut self, now: Instant) -> bool {
        self.poll_hint(now);
        if self.phase != Phase::HintActive {
            return false;
        }
        self.hint.suspend(now);
        self.end_hint(now);
        true
    }

    /// Advances every time-driven part of the session to `now`.
    pub fn tick(&mut self, now: Instant) -> Vec<SessionEvent> {
        match self.phase {
            Phase::Loading | Phase::TimedOut => {}
            Phase::Running => self.poll_countdown(now),
            Phase::HintActive => {
                self.poll_hint(now);
                self.poll_countdown(now);
            }
            Phase::Glowing => {
                if self.glow_until.is_some_and(|until| now >= until) {
                    self.enter_won(now);
                }
            }
            Phase::Won => self.check_submission_timeout(now),
        }
        core::mem::take(&mut self.events)
    }

    /// Hands out the submission ticket, once per session and only after the win is official.
    pub fn begin_submission(&mut self, now: Instant) -> Option<SubmissionTicket> {
        if self.phase != Phase::Won || self.submission != SubmissionState::NotSubmitted {
            return None;
        }
        let clear_time_ms = self.record_ms?;
        let ticket = SubmissionTicket {
            session: self.id,
            clear_time_ms,
            issued_at: now,
        };
        self.submission = SubmissionState::Submitting;
        self.outstanding = Some(ticket);
        log::debug!("Submitting record {} ms for {:?}", clear_time_ms, self.id);
        Some(ticket)
    }

    /// Applies the ranking service's answer to a ticket.
    pub fn resolve_submission(
        &mut self,
        ticket: SubmissionTicket,
        result: core::result::Result<u32, SubmissionError>,
    ) -> ResolveOutcome {
        if self.outstanding != Some(ticket) || self.submission != SubmissionState::Submitting {
            log::debug!(
                "Discarding stale submission result for {:?} (current {:?})",
                ticket.session,
                self.id
            );
            return ResolveOutcome::Stale;
        }
        self.outstanding = None;
        match result {
            Ok(rank) => {
                self.submission = SubmissionState::Submitted;
                self.rank = Some(rank);
                log::debug!("Record saved with rank {}", rank);
                ResolveOutcome::Recorded { rank }
            }
            Err(err) => ResolveOutcome::Failed {
                message: self.fail_submission(err),
            },
        }
    }

    fn fail_submission(&mut self, err: SubmissionError) -> String {
        log::warn!("Record submission failed: {}", err);
        let message = err.user_message();
        self.submission = SubmissionState::Failed;
        self.failure = Some(err);
        message
    }

    fn check_submission_timeout(&mut self, now: Instant) {
        let Some(ticket) = self.outstanding else {
            return;
        };
        if now.saturating_duration_since(ticket.issued_at) >= self.config.submission_timeout() {
            self.outstanding = None;
            let message = self.fail_submission(SubmissionError::TimedOut);
            self.events.push(SessionEvent::SubmissionFailed { message });
        }
    }

    fn check_move(&mut self, index: usize, now: Instant) -> Result<usize> {
        self.poll_hint(now);
        self.poll_countdown(now);
        match self.phase {
            Phase::Loading => Err(GameError::NotStarted),
            Phase::Running => self.board.validate_index(index),
            Phase::HintActive => Err(GameError::HintActive),
            Phase::Glowing | Phase::Won | Phase::TimedOut => Err(GameError::AlreadyEnded),
        }
    }

    fn apply_gesture(&mut self, gesture: Gesture, now: Instant) -> Result<MoveOutcome> {
        Ok(match gesture {
            Gesture::Selected(index) => MoveOutcome::Selected(index),
            Gesture::Deselected => MoveOutcome::Deselected,
            Gesture::Ignored => MoveOutcome::Ignored,
            Gesture::Swap(request) => self.apply_swap(request, now)?,
        })
    }

    /// Swaps and runs the win check. The board is only checked here, after a swap.
    fn apply_swap(&mut self, request: SwapRequest, now: Instant) -> Result<MoveOutcome> {
        self.board.swap(request.from, request.to)?;
        log::trace!("Swapped {} <-> {}", request.from, request.to);
        if self.board.is_solved() {
            self.enter_glow(now);
            Ok(MoveOutcome::Solved)
        } else {
            Ok(MoveOutcome::Swapped)
        }
    }

    fn poll_countdown(&mut self, now: Instant) {
        if self.phase == Phase::Running && self.countdown.poll(now) == TimerPoll::Expired {
            self.phase = Phase::TimedOut;
            self.input.clear();
            self.events.push(SessionEvent::TimedOut);
            log::debug!("Session {:?} timed out", self.id);
        }
    }

    /// An expired hint hands the clock back at its own deadline, however late
    /// the poll comes.
    fn poll_hint(&mut self, now: Instant) {
        if self.phase != Phase::HintActive {
            return;
        }
        let deadline = self.hint.deadline();
        if self.hint.poll(now) == TimerPoll::Expired {
            self.end_hint(deadline.unwrap_or(now));
            self.events.push(SessionEvent::HintEnded);
        }
    }

    fn end_hint(&mut self, now: Instant) {
        self.phase = Phase::Running;
        self.countdown.resume(now);
        log::debug!(
            "Hint closed, clock resumes at {} ms",
            self.countdown.remaining_ms()
        );
    }

    fn enter_glow(&mut self, now: Instant) {
        self.countdown.suspend(now);
        self.record_ms = Some(as_millis(self.countdown.elapsed()));
        self.glow_until = Some(now + self.config.glow_delay());
        self.input.clear();
        self.phase = Phase::Glowing;
        log::debug!("Puzzle solved in {:?} ms", self.record_ms);
    }

    fn enter_won(&mut self, now: Instant) {
        self.glow_until = None;
        self.phase = Phase::Won;
        if let Some(ticket) = self.begin_submission(now) {
            self.events.push(SessionEvent::Won { ticket });
        }
    }
}
