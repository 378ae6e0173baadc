//! Browser tests, run with `wasm-pack test --headless --firefox web`.
#![cfg(target_arch = "wasm32")]

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use gloo::timers::future::TimeoutFuture;
use js_sys::Function;
use sos_core::{GameError, MoveOutcome, Phase, SubmissionState, TileId};
use sos_web::{Config, PlayController, TOKEN_KEY, TokenStore};
use wasm_bindgen::JsCast;
use wasm_bindgen::closure::Closure;
use wasm_bindgen_test::*;

wasm_bindgen_test_configure!(run_in_browser);

fn seeded() -> Config {
    Config {
        seed: Some(42),
        ..Config::default()
    }
}

fn board_ids(play: &PlayController) -> Vec<TileId> {
    play.with_session(|session| session.board().ids().collect())
}

/// Swaps every tile home, the last swap wins the game.
fn solve(play: &PlayController) {
    let mut ids = board_ids(play);
    for slot in 0..ids.len() {
        let want = (slot + 1) as TileId;
        if ids[slot] == want {
            continue;
        }
        let from = ids.iter().position(|&id| id == want).unwrap();
        play.swap(from, slot).unwrap();
        ids.swap(from, slot);
    }
}

fn as_function(closure: &Closure<dyn FnMut()>) -> Function {
    closure.as_ref().unchecked_ref::<Function>().clone()
}

fn counter() -> (Rc<Cell<u32>>, Closure<dyn FnMut()>) {
    let count = Rc::new(Cell::new(0));
    let calls = count.clone();
    let closure = Closure::<dyn FnMut()>::new(move || calls.set(calls.get() + 1));
    (count, closure)
}

#[wasm_bindgen_test]
fn token_round_trip() {
    let tokens = TokenStore;
    tokens.clear();
    assert!(!tokens.is_signed_in());

    tokens.set("abc.def.ghi");
    assert_eq!(tokens.get().as_deref(), Some("abc.def.ghi"));
    // stored raw, the sign-in page reads it back with getItem
    let raw = gloo::utils::window()
        .local_storage()
        .unwrap()
        .unwrap()
        .get_item(TOKEN_KEY)
        .unwrap();
    assert_eq!(raw.as_deref(), Some("abc.def.ghi"));

    tokens.clear();
    assert_eq!(tokens.get(), None);
}

#[wasm_bindgen_test]
fn board_is_locked_until_image_is_ready() {
    let play = PlayController::new(&seeded());
    assert_eq!(play.press_tile(0), Err(GameError::NotStarted));
    assert_eq!(play.with_session(|session| session.phase()), Phase::Loading);

    play.image_ready();
    assert_eq!(play.with_session(|session| session.phase()), Phase::Running);
    assert_eq!(play.press_tile(0), Ok(MoveOutcome::Selected(0)));
    assert_eq!(play.press_tile(99), Err(GameError::InvalidIndex));
}

#[wasm_bindgen_test]
fn hint_locks_the_board_once() {
    let play = PlayController::new(&seeded());
    play.image_ready();
    assert_eq!(play.activate_hint(), Ok(()));
    assert_eq!(play.press_tile(1), Err(GameError::HintActive));
    assert!(play.dismiss_hint());
    assert_eq!(play.activate_hint(), Err(GameError::HintUnavailable));
}

#[wasm_bindgen_test]
fn fixed_seed_deals_the_same_board() {
    let a = PlayController::new(&seeded());
    let b = PlayController::new(&seeded());
    assert_eq!(board_ids(&a), board_ids(&b));

    a.image_ready();
    a.reset();
    assert_eq!(board_ids(&a), board_ids(&b));
    assert_eq!(a.with_session(|session| session.phase()), Phase::Running);
}

#[wasm_bindgen_test]
async fn dropped_controller_stops_ticking() {
    let (changes, on_change) = counter();
    let play = PlayController::new(&seeded());
    play.set_on_change(Some(as_function(&on_change)));
    play.image_ready();

    TimeoutFuture::new(50).await;
    assert!(changes.get() > 1, "clock ticks report changes");

    drop(play);
    let before = changes.get();
    TimeoutFuture::new(50).await;
    assert_eq!(changes.get(), before);
}

#[wasm_bindgen_test]
async fn submission_resolving_after_teardown_does_nothing() {
    let config = Config {
        api_base: "http://127.0.0.1:9".to_owned(),
        ..seeded()
    };
    let play = PlayController::new(&config);
    let slot = Rc::new(RefCell::new(Some(play.clone())));
    let changes_after_drop = Rc::new(Cell::new(0));

    // dropped from inside the change that reports the submission starting
    let on_change = {
        let slot = slot.clone();
        let changes_after_drop = changes_after_drop.clone();
        Closure::<dyn FnMut()>::new(move || {
            let Some(play) = slot.borrow().clone() else {
                changes_after_drop.set(changes_after_drop.get() + 1);
                return;
            };
            let state = play.with_session(|session| session.submission_state());
            if state == SubmissionState::Submitting {
                slot.borrow_mut().take();
            }
        })
    };
    let (notices, on_notice) = counter();
    play.set_on_change(Some(as_function(&on_change)));
    play.set_on_notice(Some(as_function(&on_notice)));

    play.image_ready();
    solve(&play);
    assert_eq!(play.with_session(|session| session.phase()), Phase::Glowing);
    drop(play);

    // glow, then the request fails against the closed port
    TimeoutFuture::new(2_500).await;
    assert!(slot.borrow().is_none(), "submission started");
    assert_eq!(changes_after_drop.get(), 0);
    assert_eq!(notices.get(), 0);
}
