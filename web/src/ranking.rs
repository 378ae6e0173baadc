use std::cell::RefCell;
use std::rc::{Rc, Weak};

use futures_util::future::join;
use js_sys::Function;
use serde::Serialize;
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::spawn_local;

use sos_core::{Leaderboard, mask_name};
use sos_protocol::RankEntry;

use crate::api::ApiClient;
use crate::auth::TokenStore;
use crate::config::{self, Config};
use crate::push::PushChannel;
use crate::utils::{NoticeKind, call_js, notify};

#[derive(Default)]
struct RankingState {
    board: Leaderboard,
    refreshing: bool,
    queued: bool,
    push: Option<PushChannel>,
    on_change: Option<Function>,
    on_notice: Option<Function>,
}

struct Inner {
    api: ApiClient,
    limit: u32,
    state: RefCell<RankingState>,
}

/// Keeps a [`Leaderboard`] up to date with the ranking service.
#[derive(Clone)]
pub struct LeaderboardController {
    inner: Rc<Inner>,
}

impl LeaderboardController {
    pub fn new(config: &Config) -> Self {
        Self {
            inner: Rc::new(Inner {
                api: ApiClient::new(config.api_base.as_str()),
                limit: config.rank_limit,
                state: RefCell::default(),
            }),
        }
    }

    fn weak(&self) -> Weak<Inner> {
        Rc::downgrade(&self.inner)
    }

    fn upgrade(weak: &Weak<Inner>) -> Option<Self> {
        weak.upgrade().map(|inner| Self { inner })
    }

    pub fn with_board<R>(&self, f: impl FnOnce(&Leaderboard) -> R) -> R {
        f(&self.inner.state.borrow().board)
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

    /// Subscribes to pushed ranking updates, refetching on each one.
    pub fn subscribe(&self, url: &str) {
        let weak = self.weak();
        let channel = PushChannel::open(url, move || {
            if let Some(controller) = Self::upgrade(&weak) {
                controller.notice(NoticeKind::Info, "The rankings were updated!");
                controller.refresh();
            }
        });
        self.inner.state.borrow_mut().push = Some(channel);
    }

    /// Refetches standings and the player's own rank. A refresh requested while
    /// one is running is queued and runs right after.
    pub fn refresh(&self) {
        {
            let mut state = self.inner.state.borrow_mut();
            if state.refreshing {
                state.queued = true;
                return;
            }
            state.refreshing = true;
        }
        let weak = self.weak();
        let api = self.inner.api.clone();
        let limit = self.inner.limit;
        spawn_local(async move {
            let signed_in = TokenStore.is_signed_in();
            let standings = api.standings(limit);
            let mine = async {
                if signed_in {
                    Some(api.my_rank().await)
                } else {
                    None
                }
            };
            let (standings, mine) = join(standings, mine).await;
            let Some(controller) = Self::upgrade(&weak) else {
                return;
            };

            let (was_stale, champion) = {
                let mut state = controller.inner.state.borrow_mut();
                let was_stale = state.board.is_stale();
                state.board.apply_standings(standings);
                if let Some(mine) = mine {
                    state.board.apply_my_rank(mine);
                }
                (was_stale, state.board.is_champion())
            };
            if !was_stale && controller.with_board(Leaderboard::is_stale) {
                controller.notice(NoticeKind::Error, "Could not refresh the rankings.");
            }
            if champion {
                controller.load_hidden_messages().await;
            }
            controller.changed();

            let again = {
                let mut state = controller.inner.state.borrow_mut();
                state.refreshing = false;
                std::mem::take(&mut state.queued)
            };
            if again {
                controller.refresh();
            }
        });
    }

    /// Only first place is allowed to read these. They are fetched once per
    /// stretch in first place, the board drops them when the title is lost.
    async fn load_hidden_messages(&self) {
        if self.with_board(|board| board.hidden_messages().is_some()) {
            return;
        }
        match self.inner.api.hidden_messages().await {
            Ok(hidden) => {
                log::debug!("Loaded {} hidden messages", hidden.messages.len());
                self.inner
                    .state
                    .borrow_mut()
                    .board
                    .apply_hidden_messages(hidden.messages);
            }
            Err(err) => log::warn!("Failed to fetch hidden messages: {}", err),
        }
    }
}

/// A standings row as handed to the page, with the name masked.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct RankRow<'a> {
    rank: u32,
    name: String,
    record: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    date: Option<&'a str>,
}

impl<'a> From<&'a RankEntry> for RankRow<'a> {
    fn from(entry: &'a RankEntry) -> Self {
        Self {
            rank: entry.rank,
            name: mask_name(&entry.name),
            record: &entry.record,
            date: entry.date.as_deref(),
        }
    }
}

/// Leaderboard view handle exported to the page.
#[wasm_bindgen]
pub struct LeaderboardHandle {
    controller: LeaderboardController,
}

#[wasm_bindgen]
impl LeaderboardHandle {
    #[wasm_bindgen(constructor)]
    pub fn new() -> Self {
        let config = config::current();
        let controller = LeaderboardController::new(&config);
        let location = gloo::utils::window().location();
        let protocol = location.protocol().unwrap_or_default();
        let host = location.host().unwrap_or_default();
        controller.subscribe(&config.push_url_for(&protocol, &host));
        controller.refresh();
        Self { controller }
    }

    #[wasm_bindgen(js_name = onChange)]
    pub fn on_change(&self, callback: Option<Function>) {
        self.controller.set_on_change(callback);
    }

    #[wasm_bindgen(js_name = onNotice)]
    pub fn on_notice(&self, callback: Option<Function>) {
        self.controller.set_on_notice(callback);
    }

    pub fn refresh(&self) {
        self.controller.refresh();
    }

    /// Rows of one page (counted from 1) as JSON, names masked.
    pub fn page(&self, page: usize) -> Result<String, JsError> {
        self.controller.with_board(|board| {
            let rows: Vec<RankRow> = board.page(page).iter().map(RankRow::from).collect();
            Ok(serde_json::to_string(&rows)?)
        })
    }

    #[wasm_bindgen(getter, js_name = pageCount)]
    pub fn page_count(&self) -> usize {
        self.controller.with_board(Leaderboard::page_count)
    }

    #[wasm_bindgen(getter)]
    pub fn stale(&self) -> bool {
        self.controller.with_board(Leaderboard::is_stale)
    }

    /// `None` until known, `0` when the player has no record yet.
    #[wasm_bindgen(getter, js_name = myRank)]
    pub fn my_rank(&self) -> Option<u32> {
        self.controller
            .with_board(|board| board.my_rank().map(|mine| mine.rank))
    }

    #[wasm_bindgen(getter, js_name = myRecord)]
    pub fn my_record(&self) -> Option<String> {
        self.controller.with_board(|board| {
            board
                .my_rank()
                .filter(|mine| mine.has_record())
                .map(|mine| mine.record.clone())
        })
    }

    #[wasm_bindgen(getter, js_name = isChampion)]
    pub fn is_champion(&self) -> bool {
        self.controller.with_board(Leaderboard::is_champion)
    }

    /// Messages for first place as a JSON array, `null` unless the player holds it.
    #[wasm_bindgen(js_name = hiddenMessages)]
    pub fn hidden_messages(&self) -> Result<String, JsError> {
        self.controller
            .with_board(|board| Ok(serde_json::to_string(&board.hidden_messages())?))
    }
}

impl Default for LeaderboardHandle {
    fn default() -> Self {
        Self::new()
    }
}
