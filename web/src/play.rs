//! Drives one [`GameSession`] in the browser.
//!
//! The controller owns the session and everything with a lifetime tied to it:
//! the 10 ms tick interval and the in-flight submission. Timer callbacks and
//! spawned futures only hold a `Weak` handle, so once the controller is dropped
//! they do nothing.

use std::cell::RefCell;
use std::pin::pin;
use std::rc::{Rc, Weak};

use futures_util::future::{Either, select};
use gloo::timers::callback::Interval;
use gloo::timers::future::TimeoutFuture;
use js_sys::Function;
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::spawn_local;

use sos_core::*;

use crate::api::ApiClient;
use crate::auth::TokenStore;
use crate::config::{self, Config};
use crate::utils::{NoticeKind, call_js, js_random_seed, notify};

const TICK_MS: u32 = 10;

struct PlayState {
    session: GameSession,
    interval: Option<Interval>,
    image_url: Option<String>,
    on_change: Option<Function>,
    on_notice: Option<Function>,
}

struct Inner {
    api: ApiClient,
    seed: Option<u64>,
    state: RefCell<PlayState>,
}

#[derive(Clone)]
pub struct PlayController {
    inner: Rc<Inner>,
}

impl PlayController {
    pub fn new(config: &Config) -> Self {
        let seed = config.seed;
        let session = GameSession::new(config.game, seed.unwrap_or_else(js_random_seed))
            .with_input(config.input);
        log::debug!("New play session, seed: {:?}", seed);
        Self {
            inner: Rc::new(Inner {
                api: ApiClient::new(config.api_base.as_str()),
                seed,
                state: RefCell::new(PlayState {
                    session,
                    interval: None,
                    image_url: None,
                    on_change: None,
                    on_notice: None,
                }),
            }),
        }
    }

    fn next_seed(&self) -> u64 {
        self.inner.seed.unwrap_or_else(js_random_seed)
    }

    fn weak(&self) -> Weak<Inner> {
        Rc::downgrade(&self.inner)
    }

    fn upgrade(weak: &Weak<Inner>) -> Option<Self> {
        weak.upgrade().map(|inner| Self { inner })
    }

    pub fn with_session<R>(&self, f: impl FnOnce(&GameSession) -> R) -> R {
        f(&self.inner.state.borrow().session)
    }

    pub fn image_url(&self) -> Option<String> {
        self.inner.state.borrow().image_url.clone()
    }

    pub fn set_on_change(&self, callback: Option<Function>) {
        self.inner.state.borrow_mut().on_change = callback;
    }

    pub fn set_on_notice(&self, callback: Option<Function>) {
        self.inner.state.borrow_mut().on_notice = callback;
    }

    fn changed(&self) {
        let callback = self.inner.state.borrow().on_change.clone();
        call_js(callback, &[]);
    }

    fn notice(&self, kind: NoticeKind, message: &str) {
        let callback = self.inner.state.borrow().on_notice.clone();
        notify(callback, kind, message);
    }

    /// Checks the sign-in and starts fetching the puzzle image.
    pub fn start(&self) {
        if !TokenStore.is_signed_in() {
            log::info!("Not signed in, play is unavailable");
            self.notice(NoticeKind::Warning, "Please sign in to play.");
            return;
        }
        self.load_image();
    }

    fn load_image(&self) {
        let weak = self.weak();
        let api = self.inner.api.clone();
        spawn_local(async move {
            let result = api.puzzle_image().await;
            let Some(controller) = Self::upgrade(&weak) else {
                return;
            };
            match result {
                Ok(image) => {
                    log::debug!("Puzzle image: {}", image.url);
                    controller.inner.state.borrow_mut().image_url = Some(image.url);
                    controller.changed();
                }
                Err(err) => {
                    log::error!("Failed to fetch the puzzle image: {}", err);
                    controller.notice(NoticeKind::Error, "Could not load the puzzle image.");
                }
            }
        });
    }

    /// The image finished loading on the page, the clock starts now.
    pub fn image_ready(&self) {
        self.inner
            .state
            .borrow_mut()
            .session
            .mark_ready(Instant::now());
        self.after_command();
    }

    fn command<T>(&self, f: impl FnOnce(&mut GameSession, Instant) -> Result<T>) -> Result<T> {
        let result = f(&mut self.inner.state.borrow_mut().session, Instant::now());
        if let Err(err) = &result {
            log::debug!("Command rejected: {}", err);
        }
        self.after_command();
        result
    }

    /// Events can be queued by a command, such as a timeout noticed on a tap.
    fn after_command(&self) {
        self.ensure_ticking();
        self.changed();
    }

    pub fn press_tile(&self, index: usize) -> Result<MoveOutcome> {
        self.command(|session, now| session.select_tile(index, now))
    }

    pub fn release_tile(&self, index: usize) -> Result<MoveOutcome> {
        self.command(|session, now| session.release_tile(index, now))
    }

    pub fn swap(&self, from: usize, to: usize) -> Result<MoveOutcome> {
        self.command(|session, now| session.swap(from, to, now))
    }

    pub fn shuffle(&self) -> Result<()> {
        let seed = self.next_seed();
        self.command(|session, now| session.shuffle(seed, now))
    }

    pub fn activate_hint(&self) -> Result<()> {
        self.command(|session, now| session.activate_hint(now))
    }

    pub fn dismiss_hint(&self) -> bool {
        let dismissed = self
            .inner
            .state
            .borrow_mut()
            .session
            .dismiss_hint(Instant::now());
        self.after_command();
        dismissed
    }

    /// Throws the current attempt away and deals a new board.
    pub fn reset(&self) {
        let seed = self.next_seed();
        self.inner
            .state
            .borrow_mut()
            .session
            .reset(seed, Instant::now());
        self.after_command();
    }

    fn ensure_ticking(&self) {
        let mut state = self.inner.state.borrow_mut();
        if state.interval.is_some() || !state.session.needs_ticks() {
            return;
        }
        let weak = self.weak();
        state.interval = Some(Interval::new(TICK_MS, move || {
            if let Some(controller) = Self::upgrade(&weak) {
                controller.tick();
            }
        }));
    }

    pub fn tick(&self) {
        let events = {
            let mut state = self.inner.state.borrow_mut();
            let events = state.session.tick(Instant::now());
            if !state.session.needs_ticks() {
                if let Some(interval) = state.interval.take() {
                    log::trace!("Session idle, stopping ticks");
                    // this may run inside the interval's own callback
                    spawn_local(async move { drop(interval) });
                }
            }
            events
        };
        for event in events {
            self.handle_event(event);
        }
        self.changed();
    }

    fn handle_event(&self, event: SessionEvent) {
        match event {
            SessionEvent::TimedOut => log::info!("Time is up"),
            SessionEvent::HintEnded => log::debug!("Hint ended"),
            SessionEvent::Won { ticket } => {
                log::info!("Solved in {} ms", ticket.clear_time_ms);
                self.submit(ticket);
            }
            SessionEvent::SubmissionFailed { message } => {
                self.notice(NoticeKind::Error, &message);
            }
        }
    }

    fn submit(&self, ticket: SubmissionTicket) {
        let weak = self.weak();
        let api = self.inner.api.clone();
        let timeout =
            self.with_session(|session| as_millis(session.config().submission_timeout()));
        spawn_local(async move {
            let request = pin!(api.submit_record(ticket.clear_time_ms));
            let deadline = pin!(TimeoutFuture::new(timeout));
            let result = match select(request, deadline).await {
                Either::Left((result, _)) => result,
                Either::Right(_) => Err(SubmissionError::TimedOut),
            };
            match Self::upgrade(&weak) {
                Some(controller) => controller.finish_submission(ticket, result),
                None => log::debug!("Play view gone, dropping submission result"),
            }
        });
    }

    fn finish_submission(
        &self,
        ticket: SubmissionTicket,
        result: core::result::Result<u32, SubmissionError>,
    ) {
        let outcome = self
            .inner
            .state
            .borrow_mut()
            .session
            .resolve_submission(ticket, result);
        match outcome {
            ResolveOutcome::Recorded { rank } => log::info!("Record saved, rank {}", rank),
            ResolveOutcome::Failed { message } => self.notice(NoticeKind::Error, &message),
            ResolveOutcome::Stale => {}
        }
        self.changed();
    }
}

/// Play view handle exported to the page.
#[wasm_bindgen]
pub struct PlayHandle {
    controller: PlayController,
}

#[wasm_bindgen]
impl PlayHandle {
    #[wasm_bindgen(constructor)]
    pub fn new() -> Self {
        let controller = PlayController::new(&config::current());
        controller.start();
        Self { controller }
    }

    #[wasm_bindgen(js_name = onChange)]
    pub fn on_change(&self, callback: Option<Function>) {
        self.controller.set_on_change(callback);
    }

    /// `callback(message, kind)` with kind one of `info`, `warning`, `error`.
    #[wasm_bindgen(js_name = onNotice)]
    pub fn on_notice(&self, callback: Option<Function>) {
        self.controller.set_on_notice(callback);
    }

    #[wasm_bindgen(js_name = imageReady)]
    pub fn image_ready(&self) {
        self.controller.image_ready();
    }

    /// Returns whether the tap was accepted.
    #[wasm_bindgen(js_name = selectTile)]
    pub fn select_tile(&self, index: usize) -> bool {
        self.controller.press_tile(index).is_ok()
    }

    #[wasm_bindgen(js_name = releaseTile)]
    pub fn release_tile(&self, index: usize) -> bool {
        self.controller.release_tile(index).is_ok()
    }

    #[wasm_bindgen(js_name = dragSwap)]
    pub fn drag_swap(&self, from: usize, to: usize) -> bool {
        self.controller.swap(from, to).is_ok()
    }

    pub fn shuffle(&self) -> bool {
        self.controller.shuffle().is_ok()
    }

    #[wasm_bindgen(js_name = activateHint)]
    pub fn activate_hint(&self) -> bool {
        self.controller.activate_hint().is_ok()
    }

    #[wasm_bindgen(js_name = dismissHint)]
    pub fn dismiss_hint(&self) -> bool {
        self.controller.dismiss_hint()
    }

    pub fn reset(&self) {
        self.controller.reset();
    }

    #[wasm_bindgen(getter, js_name = remainingMs)]
    pub fn remaining_ms(&self) -> u32 {
        self.controller.with_session(GameSession::remaining_ms)
    }

    #[wasm_bindgen(getter, js_name = hintRemainingMs)]
    pub fn hint_remaining_ms(&self) -> u32 {
        self.controller.with_session(GameSession::hint_remaining_ms)
    }

    #[wasm_bindgen(getter)]
    pub fn countdown(&self) -> String {
        self.controller
            .with_session(|session| format_countdown(session.remaining_ms()))
    }

    #[wasm_bindgen(getter)]
    pub fn phase(&self) -> String {
        self.controller
            .with_session(|session| session.phase().as_str().to_owned())
    }

    #[wasm_bindgen(getter)]
    pub fn submission(&self) -> String {
        self.controller
            .with_session(|session| session.submission_state().as_str().to_owned())
    }

    /// Tile ids in slot order.
    #[wasm_bindgen(getter)]
    pub fn board(&self) -> Vec<u16> {
        self.controller
            .with_session(|session| session.board().ids().collect())
    }

    #[wasm_bindgen(getter)]
    pub fn selected(&self) -> Option<u32> {
        self.controller
            .with_session(|session| session.selected().map(|index| index as u32))
    }

    #[wasm_bindgen(getter)]
    pub fn record(&self) -> Option<String> {
        self.controller.with_session(GameSession::record_string)
    }

    #[wasm_bindgen(getter)]
    pub fn rank(&self) -> Option<u32> {
        self.controller.with_session(GameSession::rank)
    }

    #[wasm_bindgen(getter, js_name = imageUrl)]
    pub fn image_url(&self) -> Option<String> {
        self.controller.image_url()
    }

    /// The whole observable state as JSON.
    pub fn snapshot(&self) -> core::result::Result<String, JsError> {
        let snapshot = self.controller.with_session(GameSession::snapshot);
        Ok(serde_json::to_string(&snapshot)?)
    }
}

impl Default for PlayHandle {
    fn default() -> Self {
        Self::new()
    }
}
